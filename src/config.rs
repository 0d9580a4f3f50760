use std::path::PathBuf;

use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct Config {
    /// Fully qualified instance name; becomes part of the output file name
    pub name: String,
    pub listen_addr: String,
    /// Where the record log is written at shutdown
    pub output_dir: PathBuf,
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name: "/instrumented_service_node".to_string(),
            listen_addr: "0.0.0.0:3000".to_string(),
            output_dir: PathBuf::from("."),
            debug: false,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Config("instance name must not be empty".into()));
        }
        if self.listen_addr.trim().is_empty() {
            return Err(Error::Config("listen address must not be empty".into()));
        }
        Ok(())
    }
}

pub fn load_config() -> Result<Config> {
    let defaults = Config::default();

    let name = std::env::var("INSTRUMENTED_NAME").unwrap_or(defaults.name);

    let listen_addr =
        std::env::var("INSTRUMENTED_LISTEN_ADDR").unwrap_or(defaults.listen_addr);

    let output_dir = std::env::var("INSTRUMENTED_OUTPUT_DIR")
        .map(PathBuf::from)
        .unwrap_or(defaults.output_dir);

    let debug = std::env::var("INSTRUMENTED_DEBUG").is_ok();

    let cfg = Config {
        name,
        listen_addr,
        output_dir,
        debug,
    };
    cfg.validate()?;
    Ok(cfg)
}
