pub mod sizes;

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::thumbnailer::{ThumbnailError, ThumbnailResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DownloadMode {
    // Download, resize and serve from the local cache
    #[default]
    Download,
    // Hotlink when the domain allows it, download otherwise
    Hotlink,
    // Hotlink only, fail when the domain doesn't allow it
    HotlinkStrict,
}

impl DownloadMode {
    pub fn as_flag(&self) -> &'static str {
        match self {
            DownloadMode::Download => "DOWNLOAD",
            DownloadMode::Hotlink => "HOTLINK",
            DownloadMode::HotlinkStrict => "HOTLINK_STRICT",
        }
    }
}

impl fmt::Display for DownloadMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_flag())
    }
}

impl FromStr for DownloadMode {
    type Err = ThumbnailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "DOWNLOAD" => Ok(DownloadMode::Download),
            "HOTLINK" => Ok(DownloadMode::Hotlink),
            "HOTLINK_STRICT" => Ok(DownloadMode::HotlinkStrict),
            other => Err(ThumbnailError::ConfigurationError(format!(
                "Unknown download mode: {}",
                other
            ))),
        }
    }
}

/// A width or height as given by the caller: pixels or a size name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SizeOption {
    Pixels(i64),
    Name(String),
}

impl SizeOption {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        match raw.parse::<i64>() {
            Ok(px) => SizeOption::Pixels(px),
            Err(_) => SizeOption::Name(raw.to_string()),
        }
    }
}

impl From<u32> for SizeOption {
    fn from(px: u32) -> Self {
        SizeOption::Pixels(i64::from(px))
    }
}

impl From<&str> for SizeOption {
    fn from(name: &str) -> Self {
        SizeOption::Name(name.to_string())
    }
}

/// Caller supplied options. Every field is optional; unset fields fall back
/// to the instance defaults, then to the configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserOptions {
    pub modes: Vec<DownloadMode>,
    pub max_width: Option<SizeOption>,
    pub max_height: Option<SizeOption>,
    pub download_timeout: Option<u64>,
    pub download_max_size: Option<u64>,
    pub no_cache: Option<bool>,
    pub crop: Option<bool>,
    pub debug: Option<bool>,
    pub verbose: Option<bool>,
}

impl UserOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(mut self, mode: DownloadMode) -> Self {
        self.modes.push(mode);
        self
    }

    pub fn max_width(mut self, width: impl Into<SizeOption>) -> Self {
        self.max_width = Some(width.into());
        self
    }

    pub fn max_height(mut self, height: impl Into<SizeOption>) -> Self {
        self.max_height = Some(height.into());
        self
    }

    pub fn download_timeout(mut self, seconds: u64) -> Self {
        self.download_timeout = Some(seconds);
        self
    }

    pub fn download_max_size(mut self, bytes: u64) -> Self {
        self.download_max_size = Some(bytes);
        self
    }

    pub fn no_cache(mut self, no_cache: bool) -> Self {
        self.no_cache = Some(no_cache);
        self
    }

    pub fn crop(mut self, crop: bool) -> Self {
        self.crop = Some(crop);
        self
    }

    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = Some(debug);
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = Some(verbose);
        self
    }

    /// Overlay these options on top of `defaults`, field by field. Mode
    /// flags add up: the result holds the default modes then these.
    pub fn merged_over(&self, defaults: &UserOptions) -> UserOptions {
        UserOptions {
            modes: defaults
                .modes
                .iter()
                .chain(self.modes.iter())
                .copied()
                .collect(),
            max_width: self.max_width.clone().or_else(|| defaults.max_width.clone()),
            max_height: self.max_height.clone().or_else(|| defaults.max_height.clone()),
            download_timeout: self.download_timeout.or(defaults.download_timeout),
            download_max_size: self.download_max_size.or(defaults.download_max_size),
            no_cache: self.no_cache.or(defaults.no_cache),
            crop: self.crop.or(defaults.crop),
            debug: self.debug.or(defaults.debug),
            verbose: self.verbose.or(defaults.verbose),
        }
    }
}

/// Only one download mode may be requested at a time.
pub fn check_options(options: &UserOptions) -> ThumbnailResult<()> {
    let mut modes = options.modes.clone();
    modes.sort_by_key(|mode| mode.as_flag());
    modes.dedup();

    if modes.len() > 1 {
        return Err(ThumbnailError::ConfigurationError(format!(
            "Only one of these flags can be set between: {} {} {}",
            DownloadMode::Download,
            DownloadMode::Hotlink,
            DownloadMode::HotlinkStrict
        )));
    }

    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOptions {
    pub download_mode: DownloadMode,
    pub max_width: u32,
    pub max_height: u32,
    pub crop: bool,
    pub no_cache: bool,
    pub download_max_size: u64,
    pub download_timeout: u64,
    pub debug: bool,
    pub verbose: bool,
}

impl ResolvedOptions {
    /// Merge the caller's `overrides` over the instance `defaults`, check
    /// that at most one download mode remains, and resolve everything into
    /// concrete values.
    pub fn resolve(
        defaults: &UserOptions,
        overrides: &UserOptions,
        config: &AppConfig,
    ) -> ThumbnailResult<Self> {
        let merged = overrides.merged_over(defaults);
        check_options(&merged)?;

        let download_mode = merged
            .modes
            .first()
            .copied()
            .unwrap_or(config.download_mode);

        // Zero counts as unset
        let download_max_size = match merged.download_max_size {
            Some(bytes) if bytes > 0 => bytes,
            _ => config.max_img_dl,
        };

        let download_timeout = match merged.download_timeout {
            Some(seconds) if seconds > 0 => seconds,
            _ => config.timeout,
        };

        let mut max_width = sizes::resolve_size(merged.max_width.as_ref(), &config.sizes);
        let mut max_height = sizes::resolve_size(merged.max_height.as_ref(), &config.sizes);
        // Both or neither
        if max_width == 0 && max_height == 0 {
            max_width = config.max_width;
            max_height = config.max_height;
        }

        Ok(Self {
            download_mode,
            max_width,
            max_height,
            crop: merged.crop.unwrap_or(false),
            no_cache: merged.no_cache.unwrap_or(false),
            download_max_size,
            download_timeout,
            debug: merged.debug.unwrap_or(false),
            verbose: merged.verbose.unwrap_or(false),
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(overrides: UserOptions) -> ThumbnailResult<ResolvedOptions> {
        ResolvedOptions::resolve(&UserOptions::default(), &overrides, &AppConfig::default())
    }

    #[test]
    fn test_defaults() {
        let options = resolve(UserOptions::new()).unwrap();
        assert_eq!(options.download_mode, DownloadMode::Download);
        assert_eq!((options.max_width, options.max_height), (160, 160));
        assert_eq!(options.download_max_size, 4194304);
        assert_eq!(options.download_timeout, 30);
        assert!(!options.crop);
        assert!(!options.no_cache);
        assert!(!options.debug);
        assert!(!options.verbose);
    }

    #[test]
    fn test_conflicting_modes_rejected() {
        let overrides = UserOptions::new()
            .mode(DownloadMode::Download)
            .mode(DownloadMode::HotlinkStrict);
        assert!(matches!(
            resolve(overrides),
            Err(ThumbnailError::ConfigurationError(_))
        ));
    }

    #[test]
    fn test_repeated_mode_is_not_a_conflict() {
        let overrides = UserOptions::new()
            .mode(DownloadMode::Hotlink)
            .mode(DownloadMode::Hotlink);
        assert_eq!(resolve(overrides).unwrap().download_mode, DownloadMode::Hotlink);
    }

    #[test]
    fn test_caller_mode_conflicts_with_instance_default() {
        let defaults = UserOptions::new().mode(DownloadMode::HotlinkStrict);
        let overrides = UserOptions::new().mode(DownloadMode::Download);
        assert!(matches!(
            ResolvedOptions::resolve(&defaults, &overrides, &AppConfig::default()),
            Err(ThumbnailError::ConfigurationError(_))
        ));

        let options =
            ResolvedOptions::resolve(&defaults, &UserOptions::new(), &AppConfig::default())
                .unwrap();
        assert_eq!(options.download_mode, DownloadMode::HotlinkStrict);
    }

    #[test]
    fn test_caller_repeating_instance_mode_is_accepted() {
        let defaults = UserOptions::new().mode(DownloadMode::Hotlink);
        let overrides = UserOptions::new().mode(DownloadMode::Hotlink);
        let options =
            ResolvedOptions::resolve(&defaults, &overrides, &AppConfig::default()).unwrap();
        assert_eq!(options.download_mode, DownloadMode::Hotlink);
    }

    #[test]
    fn test_merged_modes_add_up() {
        let defaults = UserOptions::new().mode(DownloadMode::Download);
        let merged = UserOptions::new()
            .mode(DownloadMode::Hotlink)
            .merged_over(&defaults);
        assert_eq!(merged.modes, vec![DownloadMode::Download, DownloadMode::Hotlink]);
    }

    #[test]
    fn test_config_download_mode_fallback() {
        let config = AppConfig {
            download_mode: DownloadMode::Hotlink,
            ..AppConfig::default()
        };
        let options =
            ResolvedOptions::resolve(&UserOptions::new(), &UserOptions::new(), &config).unwrap();
        assert_eq!(options.download_mode, DownloadMode::Hotlink);
    }

    #[test]
    fn test_single_dimension_is_kept() {
        let options = resolve(UserOptions::new().max_width(300u32)).unwrap();
        assert_eq!((options.max_width, options.max_height), (300, 0));

        let options = resolve(UserOptions::new().max_height("small")).unwrap();
        assert_eq!((options.max_width, options.max_height), (0, 130));
    }

    #[test]
    fn test_invalid_dimensions_fall_back_together() {
        let options = resolve(
            UserOptions::new()
                .max_width(SizeOption::Pixels(-10))
                .max_height("gigantic"),
        )
        .unwrap();
        assert_eq!((options.max_width, options.max_height), (160, 160));
    }

    #[test]
    fn test_symbolic_sizes() {
        let options = resolve(UserOptions::new().max_width("large").max_height("medium")).unwrap();
        assert_eq!((options.max_width, options.max_height), (640, 320));
    }

    #[test]
    fn test_download_max_size_zero_uses_default() {
        let options = resolve(UserOptions::new().download_max_size(0)).unwrap();
        assert_eq!(options.download_max_size, 4194304);

        let options = resolve(UserOptions::new().download_max_size(1024)).unwrap();
        assert_eq!(options.download_max_size, 1024);
    }

    #[test]
    fn test_parse_download_mode() {
        assert_eq!("hotlink".parse::<DownloadMode>().unwrap(), DownloadMode::Hotlink);
        assert_eq!(
            "HOTLINK_STRICT".parse::<DownloadMode>().unwrap(),
            DownloadMode::HotlinkStrict
        );
        assert!("sometimes".parse::<DownloadMode>().is_err());
    }

    #[test]
    fn test_size_option_parse() {
        assert_eq!(SizeOption::parse("240"), SizeOption::Pixels(240));
        assert_eq!(SizeOption::parse(" small "), SizeOption::Name("small".to_string()));
    }
}
