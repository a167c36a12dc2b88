use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};

use crate::config::AppConfig;
use crate::thumbnailer::{ThumbnailError, ThumbnailResult};

// Keeps chrono's Duration in range
const MAX_CACHE_DAYS: i64 = 100 * 365;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheType {
    Thumb,
}

impl CacheType {
    fn folder(&self) -> &'static str {
        match self {
            CacheType::Thumb => "thumb",
        }
    }
}

// Thumbnail cache stored on disk, one file per (url, domains, size)
#[derive(Debug, Clone)]
pub struct CacheManager {
    cache_dir: PathBuf,
    thumb_duration: Duration,
}

impl CacheManager {
    pub fn new(cache_dir: impl Into<PathBuf>, thumb_cache_days: u64) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            thumb_duration: Duration::days(
                i64::try_from(thumb_cache_days)
                    .unwrap_or(MAX_CACHE_DAYS)
                    .min(MAX_CACHE_DAYS),
            ),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.cache_dir.clone(), config.cache_duration)
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Deterministic cache location for a thumbnail; touches nothing on disk.
    pub fn cache_file_path(
        &self,
        url: &str,
        domains: &[String],
        cache_type: CacheType,
        width: u32,
        height: u32,
    ) -> PathBuf {
        let filename = format!("{:x}{}x{}.jpg", md5::compute(url.as_bytes()), width, height);

        self.cache_dir
            .join(cache_type.folder())
            .join(domain_folder(domains))
            .join(filename)
    }

    /// Same as [`CacheManager::cache_file_path`], making sure the directory
    /// exists. An unusable cache directory is a missing requirement.
    pub async fn get_cache_file_path(
        &self,
        url: &str,
        domains: &[String],
        cache_type: CacheType,
        width: u32,
        height: u32,
    ) -> ThumbnailResult<PathBuf> {
        let path = self.cache_file_path(url, domains, cache_type, width, height);

        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir).await.map_err(|e| {
                ThumbnailError::RequirementMissing(format!(
                    "Cache directory {} is not writable: {}",
                    dir.display(),
                    e
                ))
            })?;
        }

        Ok(path)
    }

    pub async fn is_cache_valid(&self, path: &Path, cache_type: CacheType) -> bool {
        let metadata = match tokio::fs::metadata(path).await {
            Ok(metadata) if metadata.is_file() => metadata,
            _ => return false,
        };

        let modified: DateTime<Utc> = match metadata.modified() {
            Ok(modified) => modified.into(),
            Err(_) => return false,
        };

        Utc::now().signed_duration_since(modified) < self.duration(cache_type)
    }

    fn duration(&self, cache_type: CacheType) -> Duration {
        match cache_type {
            CacheType::Thumb => self.thumb_duration,
        }
    }
}

// "example.com", or "a.com+b.com" when a finder covers several domains
fn domain_folder(domains: &[String]) -> String {
    let mut domains: Vec<&str> = domains
        .iter()
        .map(|domain| domain.as_str())
        .filter(|domain| !domain.is_empty())
        .collect();
    domains.sort_unstable();
    domains.dedup();

    if domains.is_empty() {
        return "_".to_string();
    }

    domains
        .join("+")
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '+' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn domains(list: &[&str]) -> Vec<String> {
        list.iter().map(|d| d.to_string()).collect()
    }

    #[test]
    fn test_cache_file_path_is_deterministic() {
        let cache = CacheManager::new("/tmp/cache", 31);
        let first = cache.cache_file_path(
            "http://x.com/img.jpg",
            &domains(&["x.com"]),
            CacheType::Thumb,
            160,
            120,
        );
        for _ in 0..3 {
            let again = cache.cache_file_path(
                "http://x.com/img.jpg",
                &domains(&["x.com"]),
                CacheType::Thumb,
                160,
                120,
            );
            assert_eq!(first, again);
        }

        let expected = format!("/tmp/cache/thumb/x.com/{:x}160x120.jpg", md5::compute("http://x.com/img.jpg"));
        assert_eq!(first, PathBuf::from(expected));
    }

    #[test]
    fn test_cache_file_path_varies_with_inputs() {
        let cache = CacheManager::new("/tmp/cache", 31);
        let base = cache.cache_file_path("http://x.com/a.jpg", &domains(&["x.com"]), CacheType::Thumb, 160, 160);

        assert_ne!(base, cache.cache_file_path("http://x.com/b.jpg", &domains(&["x.com"]), CacheType::Thumb, 160, 160));
        assert_ne!(base, cache.cache_file_path("http://x.com/a.jpg", &domains(&["y.com"]), CacheType::Thumb, 160, 160));
        assert_ne!(base, cache.cache_file_path("http://x.com/a.jpg", &domains(&["x.com"]), CacheType::Thumb, 320, 160));
    }

    #[test]
    fn test_domain_folder() {
        assert_eq!(domain_folder(&domains(&["example.com"])), "example.com");
        assert_eq!(domain_folder(&domains(&["b.com", "a.com", "b.com"])), "a.com+b.com");
        assert_eq!(domain_folder(&domains(&["we ird/host"])), "we_ird_host");
        assert_eq!(domain_folder(&[]), "_");
    }

    #[tokio::test]
    async fn test_get_cache_file_path_creates_directory() {
        let temp = TempDir::new().unwrap();
        let cache = CacheManager::new(temp.path(), 31);

        let path = cache
            .get_cache_file_path("http://x.com/a.jpg", &domains(&["x.com"]), CacheType::Thumb, 160, 160)
            .await
            .unwrap();

        assert!(path.parent().unwrap().is_dir());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_unwritable_cache_dir_is_missing_requirement() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("blocker");
        std::fs::write(&blocker, b"not a directory").unwrap();
        let cache = CacheManager::new(&blocker, 31);

        let result = cache
            .get_cache_file_path("http://x.com/a.jpg", &domains(&["x.com"]), CacheType::Thumb, 160, 160)
            .await;

        assert!(matches!(result, Err(ThumbnailError::RequirementMissing(_))));
    }

    #[tokio::test]
    async fn test_cache_validity() {
        let temp = TempDir::new().unwrap();
        let cache = CacheManager::new(temp.path(), 31);
        let path = temp.path().join("thumb.jpg");

        assert!(!cache.is_cache_valid(&path, CacheType::Thumb).await);

        std::fs::write(&path, b"jpeg").unwrap();
        assert!(cache.is_cache_valid(&path, CacheType::Thumb).await);

        let expired = CacheManager::new(temp.path(), 0);
        assert!(!expired.is_cache_valid(&path, CacheType::Thumb).await);
    }

    #[tokio::test]
    async fn test_directory_is_not_a_valid_entry() {
        let temp = TempDir::new().unwrap();
        let cache = CacheManager::new(temp.path(), 31);
        assert!(!cache.is_cache_valid(temp.path(), CacheType::Thumb).await);
    }
}
