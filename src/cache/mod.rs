mod image;

pub use self::image::{CacheManager, CacheType};
