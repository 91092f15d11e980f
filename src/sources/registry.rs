use std::sync::Arc;

use crate::errors::{NewsError, NewsResult};
use crate::sources::traits::SourceAdapter;
use crate::sources::{
    cls::ClsSource, cls_headline::ClsHeadlineSource, eastmoney::EastMoneySource, jqka::JqkaSource,
    wallstreetcn::WallStreetCnSource,
};

pub struct SourceRegistry {
    sources: Vec<Arc<dyn SourceAdapter>>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        let mut registry = Self::empty();

        registry.register(Arc::new(EastMoneySource::new()));
        registry.register(Arc::new(ClsSource::new()));
        registry.register(Arc::new(ClsHeadlineSource::new()));
        registry.register(Arc::new(JqkaSource::new()));
        registry.register(Arc::new(WallStreetCnSource::new()));

        registry
    }

    pub fn empty() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    pub fn register(&mut self, source: Arc<dyn SourceAdapter>) {
        self.sources.push(source);
    }

    /// Find a source by display name or alias (aliases are case-insensitive)
    pub fn find(&self, name: &str) -> Option<Arc<dyn SourceAdapter>> {
        let name = name.trim();
        self.sources
            .iter()
            .find(|s| {
                s.name() == name || s.aliases().iter().any(|alias| alias.eq_ignore_ascii_case(name))
            })
            .cloned()
    }

    pub fn get(&self, name: &str) -> NewsResult<Arc<dyn SourceAdapter>> {
        self.find(name)
            .ok_or_else(|| NewsError::UnknownSource(name.to_string()))
    }

    pub fn all(&self) -> &[Arc<dyn SourceAdapter>] {
        &self.sources
    }

    pub fn names(&self) -> Vec<String> {
        self.sources.iter().map(|s| s.name().to_string()).collect()
    }
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
