use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use log::debug;

use crate::bencode::{Decoder, DEFAULT_MAX_DEPTH};

pub const CONFIG_FILE: &str = "bdecoder.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub max_depth: usize,
    pub show_piece_hashes: bool,
    pub pretty_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            show_piece_hashes: true,
            pretty_json: false,
        }
    }
}

impl Config {
    /// Reads `bdecoder.toml` from the working directory, falling back to defaults.
    pub fn load() -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let config_path = Path::new(CONFIG_FILE);
        if config_path.exists() {
            Self::load_from(config_path)
        } else {
            debug!("no {} found, using defaults", CONFIG_FILE);
            Ok(Self::default())
        }
    }

    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let contents = fs::read_to_string(path.as_ref())?;
        let config: Config = toml::from_str(&contents)?;
        debug!("loaded config from {}", path.as_ref().display());
        Ok(config)
    }

    pub fn decoder(&self) -> Decoder {
        Decoder::with_max_depth(self.max_depth)
    }
}
