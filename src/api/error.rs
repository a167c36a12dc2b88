use rocket::http::Status;
use serde_json::json;
use webthumbnailer::ThumbnailError;

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    ThumbnailError(ThumbnailError),
}

impl From<ThumbnailError> for ApiError {
    fn from(error: ThumbnailError) -> Self {
        ApiError::ThumbnailError(error)
    }
}

impl ApiError {
    fn status_and_title(&self) -> (Status, &'static str) {
        match self {
            ApiError::BadRequest(_) => (Status::BadRequest, "Bad request"),
            ApiError::ThumbnailError(error) => match error {
                ThumbnailError::ConfigurationError(_) => (Status::BadRequest, "Invalid options"),
                ThumbnailError::NotFound { .. } => (Status::NotFound, "Thumbnail not found"),
                ThumbnailError::HotlinkNotSupported => {
                    (Status::Forbidden, "Hotlink not supported")
                }
                ThumbnailError::UnreachableThumbnail { .. } => {
                    (Status::BadGateway, "Thumbnail unreachable")
                }
                ThumbnailError::DownloadFailed { .. } | ThumbnailError::NetworkError(_) => {
                    (Status::BadGateway, "Download failed")
                }
                ThumbnailError::NotAnImage(_) => (Status::UnsupportedMediaType, "Not an image"),
                ThumbnailError::RequirementMissing(_) => {
                    (Status::InternalServerError, "Server misconfigured")
                }
                ThumbnailError::ConversionError(_)
                | ThumbnailError::GenerationFailed(_)
                | ThumbnailError::IoError(_) => {
                    (Status::InternalServerError, "Thumbnail generation failed")
                }
            },
        }
    }
}

impl<'r> rocket::response::Responder<'r, 'static> for ApiError {
    fn respond_to(self, _: &'r rocket::Request<'_>) -> rocket::response::Result<'static> {
        let (status, title) = self.status_and_title();
        let message = match &self {
            ApiError::BadRequest(message) => message.clone(),
            ApiError::ThumbnailError(error) => error.to_string(),
        };

        let body = json!({
            "error": title,
            "message": message
        })
        .to_string();

        rocket::Response::build()
            .status(status)
            .header(rocket::http::ContentType::JSON)
            .sized_body(None, std::io::Cursor::new(body))
            .ok()
    }
}
