use std::collections::HashMap;
use std::sync::Arc;

use super::{DefaultFinder, Finder, FinderContext};
use crate::options::ResolvedOptions;
use crate::utils::get_domain;
use crate::web::WebAccess;

pub type FinderFactory = fn(FinderContext) -> Box<dyn Finder>;

#[derive(Clone)]
struct FinderEntry {
    factory: FinderFactory,
    rules: serde_json::Value,
}

/// Domain to finder lookup table. Domains without an entry get the
/// [`DefaultFinder`].
#[derive(Clone, Default)]
pub struct FinderRegistry {
    entries: HashMap<String, FinderEntry>,
}

impl FinderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        domain: &str,
        factory: FinderFactory,
        rules: serde_json::Value,
    ) -> &mut Self {
        self.entries.insert(
            domain.trim().to_lowercase(),
            FinderEntry { factory, rules },
        );
        self
    }

    // "www.example.com" also matches an "example.com" entry
    fn lookup(&self, domain: &str) -> Option<&FinderEntry> {
        self.entries.get(domain).or_else(|| {
            domain
                .strip_prefix("www.")
                .and_then(|bare| self.entries.get(bare))
        })
    }

    /// Build the finder responsible for `url`.
    pub fn get_finder(
        &self,
        url: &str,
        options: &ResolvedOptions,
        web_access: Arc<dyn WebAccess>,
    ) -> Box<dyn Finder> {
        let domain = get_domain(url);
        let entry = self.lookup(&domain);

        let context = FinderContext {
            domain: domain.clone(),
            url: url.to_string(),
            rules: entry
                .map(|entry| entry.rules.clone())
                .unwrap_or(serde_json::Value::Null),
            options: options.clone(),
            web_access,
        };

        let finder: Box<dyn Finder> = match entry {
            Some(entry) => (entry.factory)(context),
            None => Box::new(DefaultFinder::new(context)),
        };

        log::debug!("Using {} finder for domain {}", finder.name(), domain);
        finder
    }
}
