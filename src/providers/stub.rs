use anyhow::Result;
use async_trait::async_trait;

use crate::search::{SearchAnswer, SearchProvider};

/// Offline stand-in used when search is disabled in the configuration.
/// Answers every query with a fixed "coming soon" summary.
pub struct StubSearchProvider;

pub const COMING_SOON: &str =
    "Web search is coming soon! In the meantime I can handle calculations, \
     your todo list, and voice dictation.";

#[async_trait]
impl SearchProvider for StubSearchProvider {
    fn name(&self) -> &str {
        "stub"
    }

    async fn lookup(&self, query: &str) -> Result<SearchAnswer> {
        Ok(SearchAnswer {
            heading: query.to_string(),
            summary: COMING_SOON.to_string(),
            source_url: None,
            related: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stub_always_answers() {
        let provider = StubSearchProvider;
        let answer = provider.lookup("anything at all").await.unwrap();
        assert_eq!(answer.summary, COMING_SOON);
        assert!(answer.related.is_empty());
    }
}
