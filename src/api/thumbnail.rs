use rocket::serde::json::Json;
use rocket::State;
use serde_json::{json, Value};
use webthumbnailer::{DownloadMode, SizeOption, UserOptions, WebThumbnailer};

use crate::api::ApiError;

#[derive(Debug, FromForm)]
pub struct ThumbnailQuery {
    pub url: String,
    // One mode, or several separated by commas (which is an error)
    pub mode: Option<String>,
    pub max_width: Option<String>,
    pub max_height: Option<String>,
    pub download_timeout: Option<u64>,
    pub download_max_size: Option<u64>,
    pub nocache: Option<bool>,
    pub crop: Option<bool>,
    pub debug: Option<bool>,
    pub verbose: Option<bool>,
}

impl ThumbnailQuery {
    fn to_user_options(&self) -> Result<UserOptions, ApiError> {
        let mut modes = Vec::new();
        if let Some(mode) = &self.mode {
            for flag in mode.split(',').filter(|flag| !flag.trim().is_empty()) {
                let mode = flag
                    .parse::<DownloadMode>()
                    .map_err(|e| ApiError::BadRequest(e.to_string()))?;
                modes.push(mode);
            }
        }

        Ok(UserOptions {
            modes,
            max_width: self.max_width.as_deref().map(SizeOption::parse),
            max_height: self.max_height.as_deref().map(SizeOption::parse),
            download_timeout: self.download_timeout,
            download_max_size: self.download_max_size,
            no_cache: self.nocache,
            crop: self.crop,
            debug: self.debug,
            verbose: self.verbose,
        })
    }
}

#[get("/thumbnail?<query..>")]
pub async fn get_thumbnail(
    query: ThumbnailQuery,
    thumbnailer: &State<WebThumbnailer>,
) -> Result<Json<Value>, ApiError> {
    log::debug!("Thumbnail requested for {}", query.url);

    let options = query.to_user_options()?;
    let thumbnail = thumbnailer.thumbnail(&query.url, &options).await?;

    let thumbnail = match thumbnail {
        Some(url) => Value::String(url),
        None => Value::Bool(false),
    };

    Ok(Json(json!({
        "url": query.url,
        "thumbnail": thumbnail
    })))
}
