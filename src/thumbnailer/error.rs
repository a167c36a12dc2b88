use thiserror::Error;

pub type ThumbnailResult<T> = Result<T, ThumbnailError>;

#[derive(Error, Debug)]
pub enum ThumbnailError {
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Missing requirement: {0}")]
    RequirementMissing(String),

    #[error("No thumbnail could be found for this URL using {finder} finder")]
    NotFound { finder: String },

    #[error("Hotlink is not supported for this URL")]
    HotlinkNotSupported,

    #[error("Unreachable thumbnail URL. HTTP {status}. Original thumbnail URL: {original}. Redirected thumbnail URL: {redirected}")]
    UnreachableThumbnail {
        status: u16,
        original: String,
        redirected: String,
    },

    #[error("Couldn't download the thumbnail at {url}: {reason}")]
    DownloadFailed { url: String, reason: String },

    #[error("Not an image: {0}")]
    NotAnImage(String),

    #[error("Image conversion error: {0}")]
    ConversionError(String),

    #[error("Thumbnail was not generated at {0}")]
    GenerationFailed(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ThumbnailError {
    /// Requirement failures describe a broken environment, not a bad URL, and
    /// are never converted into a `false` result.
    pub fn is_requirement_missing(&self) -> bool {
        matches!(self, ThumbnailError::RequirementMissing(_))
    }
}

/// How the facade surfaces pipeline failures to its caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ErrorPolicy {
    pub debug: bool,
    pub verbose: bool,
}

impl ErrorPolicy {
    pub fn new(debug: bool, verbose: bool) -> Self {
        Self { debug, verbose }
    }

    // Ok(None) stands for "no thumbnail"
    pub fn apply(&self, result: ThumbnailResult<String>) -> ThumbnailResult<Option<String>> {
        match result {
            Ok(url) => Ok(Some(url)),
            Err(err) if err.is_requirement_missing() => Err(err),
            Err(err) => {
                if self.verbose {
                    log::error!("{}", err);
                }

                if self.debug {
                    Err(err)
                } else {
                    Ok(None)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_swallows_errors() {
        let policy = ErrorPolicy::default();
        let result = policy.apply(Err(ThumbnailError::HotlinkNotSupported));
        assert!(matches!(result, Ok(None)));
    }

    #[test]
    fn test_debug_policy_keeps_error_kind() {
        let policy = ErrorPolicy::new(true, false);
        let result = policy.apply(Err(ThumbnailError::NotFound {
            finder: "default".to_string(),
        }));
        assert!(matches!(result, Err(ThumbnailError::NotFound { .. })));
    }

    #[test]
    fn test_requirement_missing_always_propagates() {
        for policy in [ErrorPolicy::new(false, false), ErrorPolicy::new(false, true)] {
            let result = policy.apply(Err(ThumbnailError::RequirementMissing(
                "cache directory".to_string(),
            )));
            assert!(matches!(result, Err(ThumbnailError::RequirementMissing(_))));
        }
    }

    #[test]
    fn test_success_is_wrapped() {
        let policy = ErrorPolicy::new(true, true);
        let result = policy.apply(Ok("http://x/img.jpg".to_string())).unwrap();
        assert_eq!(result.as_deref(), Some("http://x/img.jpg"));
    }
}
