//! HTTP server configuration.

use serde::{Deserialize, Serialize};

fn default_bind() -> String {
    "127.0.0.1:8000".to_string()
}

fn default_media_dir() -> String {
    "media".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Socket address the server listens on.
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Directory where uploaded photos and attachments are stored.
    #[serde(default = "default_media_dir")]
    pub media_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            media_dir: default_media_dir(),
        }
    }
}
