use std::collections::HashMap;
use std::path::PathBuf;

use serde::Deserialize;

use crate::options::DownloadMode;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub port: u16,
    pub address: String,
    pub user_agent: String,
    // Network timeout in seconds
    pub timeout: u64,
    // Download cap in bytes
    pub max_img_dl: u64,
    pub max_width: u32,
    pub max_height: u32,
    pub download_mode: DownloadMode,
    pub cache_dir: PathBuf,
    // Thumbnail freshness in days
    pub cache_duration: u64,
    pub document_root: Option<String>,
    pub script_name: Option<String>,
    pub sizes: HashMap<String, u32>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let sizes = [("small", 130), ("medium", 320), ("large", 640)]
            .into_iter()
            .map(|(name, px)| (name.to_string(), px))
            .collect();

        Self {
            port: 8000,
            address: "127.0.0.1".to_string(),
            user_agent: "Mozilla/5.0 (compatible; webthumbnailer/0.1)".to_string(),
            timeout: 30,
            max_img_dl: 4 * 1024 * 1024,
            max_width: 160,
            max_height: 160,
            download_mode: DownloadMode::Download,
            cache_dir: PathBuf::from("public/cache"),
            cache_duration: 31,
            document_root: Some("public".to_string()),
            script_name: None,
            sizes,
        }
    }
}
