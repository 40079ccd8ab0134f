use std::fs;
use std::io::Cursor;
use std::path::Path;

use rocket::http::ContentType;
use rocket::response::Responder;
use rocket::{response, Request, Response};
use serde::Serialize;
use serde_json::Value;

use crate::config::Config;

pub const CONTEXT_ELEMENT_ID: &str = "page-context";

const FALLBACK_SHELL: &str = "<!DOCTYPE html>
<html lang=\"en\">
<head><meta charset=\"utf-8\"><title>{page}</title></head>
<body data-page=\"{page}\"></body>
</html>
";

/// A server-rendered page.
///
/// The shell is `<public_content>/<name>.html`, and the context is injected into it as a JSON
/// script element. The client-side scripts do the actual rendering.
#[derive(Debug, Clone)]
pub struct Page {
    name: &'static str,
    context: Value,
}

impl Page {
    pub fn new(name: &'static str, context: impl Serialize) -> Result<Page, serde_json::Error> {
        Ok(Page {
            name,
            context: serde_json::to_value(context)?,
        })
    }

    fn load_shell(&self, public_content: Option<&Path>) -> String {
        public_content
            .map(|dir| dir.join(format!("{}.html", self.name)))
            .and_then(|path| fs::read_to_string(path).ok())
            .unwrap_or_else(|| FALLBACK_SHELL.replace("{page}", self.name))
    }

    /// Inserts the context script right before `</body>`, or appends it if there is none.
    pub fn render(&self, shell: &str) -> String {
        // `</` inside a script element would end it early.
        let json = self.context.to_string().replace("</", "<\\/");
        let script = format!(
            "<script id=\"{}\" type=\"application/json\">{}</script>\n",
            CONTEXT_ELEMENT_ID, json
        );

        match shell.rfind("</body>") {
            Some(at) => {
                let mut html = String::with_capacity(shell.len() + script.len());
                html.push_str(&shell[..at]);
                html.push_str(&script);
                html.push_str(&shell[at..]);
                html
            }
            None => format!("{}{}", shell, script),
        }
    }
}

impl<'r> Responder<'r, 'static> for Page {
    fn respond_to(self, request: &'r Request<'_>) -> response::Result<'static> {
        let public_content = request
            .rocket()
            .state::<Config>()
            .map(|c| c.public_content.as_path());
        let html = self.render(&self.load_shell(public_content));

        Response::build()
            .header(ContentType::HTML)
            .sized_body(html.len(), Cursor::new(html))
            .ok()
    }
}
