use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;
use crate::util;
use std::env;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

pub const IN_MEMORY_DATABASE: &str = ":memory:";

fn default_database_path() -> String {
    env::var("DATABASE_PATH").unwrap_or("./students.db".to_string())
}

fn default_public_content() -> PathBuf {
    PathBuf::from(env::var("PUBLIC_CONTENT_PATH").unwrap_or("./public".to_string()))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(skip)]
    file_path: PathBuf,

    /// SQLite database file, or `:memory:`.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Page shells (`classes.html`, `index.html`, `student.html`) and the `static/` directory.
    #[serde(default = "default_public_content")]
    pub public_content: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            file_path: config_dir().join("settings.yml"),
            database_path: default_database_path(),
            public_content: default_public_content(),
        }
    }
}

#[inline]
fn config_dir() -> PathBuf {
    PathBuf::from(env::var("CONFIG_DIR").unwrap_or("./config".to_string()))
}

impl Config {
    pub fn load() -> Result<Config, ConfigurationError> {
        let config_file = util::find_first_subpath(
            config_dir(),
            &["settings.yml", "settings.yaml"],
            Path::exists,
        )
        .ok_or_else(|| ConfigurationError::NotFound(config_dir()))?;

        let file = File::open(&config_file)?;
        let mut config: Config = serde_yaml::from_reader(BufReader::new(file))?;
        config.file_path = config_file;

        Ok(config)
    }

    /// Configuration backed by a private in-memory database. Nothing is read from or written to disk.
    pub fn in_memory() -> Config {
        Config {
            database_path: IN_MEMORY_DATABASE.to_string(),
            ..Default::default()
        }
    }

    pub fn save(&self) -> Result<(), ConfigurationError> {
        if let Some(parent) = self.file_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(&self.file_path)?;
        let mut out = BufWriter::new(file);
        serde_yaml::to_writer(&mut out, self)?;
        out.flush()?;
        Ok(())
    }
}
