use std::path::PathBuf;

use rocket::fs::NamedFile;
use rocket::State;

use crate::config::Config;

/// Client-side assets from `<public_content>/static`.
#[get("/static/<path..>")]
pub async fn static_file(path: PathBuf, c: &State<Config>) -> Option<NamedFile> {
    NamedFile::open(c.public_content.join("static").join(path))
        .await
        .ok()
}
