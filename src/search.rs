use anyhow::Result;
use async_trait::async_trait;

/// A related result attached to a search answer.
#[derive(Debug, Clone, PartialEq)]
pub struct RelatedTopic {
    pub text: String,
    pub url: Option<String>,
}

/// The distilled answer for one lookup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchAnswer {
    pub heading: String,
    pub summary: String,
    pub source_url: Option<String>,
    pub related: Vec<RelatedTopic>,
}

impl SearchAnswer {
    pub fn is_empty(&self) -> bool {
        self.summary.is_empty() && self.related.is_empty()
    }
}

/// Trait representing a web-search backend.
///
/// One lookup per request, no retries: a failed request surfaces as an
/// error and the caller converts it into a fixed apology string.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Name of the provider.
    fn name(&self) -> &str;

    /// Run a single lookup for the query.
    async fn lookup(&self, query: &str) -> Result<SearchAnswer>;
}
