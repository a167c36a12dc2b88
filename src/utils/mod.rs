use std::borrow::Cow;
use std::path::Path;

use lazy_static::lazy_static;
use regex::Regex;
use url::Url;

use crate::config::AppConfig;

lazy_static! {
    static ref EXTENSION_REGEX: Regex = Regex::new(r"\.(\w+)$").unwrap();
    // "/site/thumbs/index.php" -> "site/thumbs/"
    static ref SCRIPT_DIR_REGEX: Regex = Regex::new(r"^/?(.+/)[^/]+$").unwrap();
}

/// Where the thumbnails are served from. Used to turn absolute cache paths
/// into URLs relative to the serving root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerContext {
    pub context_document_root: Option<String>,
    pub document_root: Option<String>,
    pub script_name: Option<String>,
}

impl ServerContext {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            context_document_root: None,
            document_root: config.document_root.clone(),
            script_name: config.script_name.clone(),
        }
    }
}

fn with_scheme(url: &str) -> Cow<'_, str> {
    if url.contains("://") {
        Cow::Borrowed(url)
    } else {
        Cow::Owned(format!("http://{}", url))
    }
}

/// Lower-cased host of `url`, assuming `http` when no scheme is given.
pub fn get_domain(url: &str) -> String {
    Url::parse(&with_scheme(url.trim()))
        .ok()
        .and_then(|parsed| parsed.host_str().map(|host| host.to_lowercase()))
        .unwrap_or_default()
}

/// Lower-cased file extension of the URL path, or an empty string.
pub fn get_url_file_extension(url: &str) -> String {
    let path = match Url::parse(&with_scheme(url.trim())) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url.split(['?', '#']).next().unwrap_or_default().to_string(),
    };

    EXTENSION_REGEX
        .captures(&path)
        .map(|caps| caps[1].to_lowercase())
        .unwrap_or_default()
}

/// Turn a local path into a URL relative to the serving root: strip the
/// document root, then the directory of the invoking script.
pub fn generate_relative_url_from_path(server: &ServerContext, path: &Path) -> String {
    let mut relative = path.to_string_lossy().into_owned();

    let root = server
        .context_document_root
        .as_ref()
        .or(server.document_root.as_ref());

    if let Some(root) = root {
        if !root.is_empty() {
            let prefix = format!("{}/", root.trim_end_matches('/'));
            if let Some(stripped) = relative.strip_prefix(&prefix) {
                relative = stripped.to_string();
            }
        }
    }

    if let Some(script_name) = &server.script_name {
        if let Some(caps) = SCRIPT_DIR_REGEX.captures(script_name) {
            if let Some(stripped) = relative.strip_prefix(&caps[1]) {
                relative = stripped.to_string();
            }
        }
    }

    relative
}
