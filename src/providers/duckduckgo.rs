use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use log::debug;

use crate::search::{RelatedTopic, SearchAnswer, SearchProvider};

/// DuckDuckGo Instant Answer API provider. Unauthenticated, JSON-only.
pub struct DuckDuckGoProvider {
    base_url: String,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct InstantAnswerResponse {
    #[serde(rename = "Heading", default)]
    heading: String,
    #[serde(rename = "AbstractText", default)]
    abstract_text: String,
    #[serde(rename = "AbstractURL", default)]
    abstract_url: String,
    #[serde(rename = "RelatedTopics", default)]
    related_topics: Vec<RelatedTopicNode>,
}

/// Related topics arrive either as plain entries or as named groups that
/// nest further entries under `Topics`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RelatedTopicNode {
    // Groups are tried first: they are the only nodes carrying `Topics`,
    // while plain entries are the only ones carrying `Text`.
    Group {
        #[serde(rename = "Topics")]
        topics: Vec<RelatedTopicNode>,
    },
    Entry {
        #[serde(rename = "Text")]
        text: String,
        #[serde(rename = "FirstURL", default)]
        first_url: String,
    },
}

impl RelatedTopicNode {
    fn flatten_into(self, out: &mut Vec<RelatedTopic>) {
        match self {
            RelatedTopicNode::Entry { text, first_url } => {
                if !text.is_empty() {
                    out.push(RelatedTopic {
                        text,
                        url: if first_url.is_empty() { None } else { Some(first_url) },
                    });
                }
            }
            RelatedTopicNode::Group { topics } => {
                for topic in topics {
                    topic.flatten_into(out);
                }
            }
        }
    }
}

impl DuckDuckGoProvider {
    pub fn new(base_url: String, timeout_secs: u64) -> Self {
        Self {
            base_url,
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    fn parse_response(&self, response: InstantAnswerResponse) -> SearchAnswer {
        let mut related = Vec::new();
        for node in response.related_topics {
            node.flatten_into(&mut related);
        }

        SearchAnswer {
            heading: response.heading,
            summary: response.abstract_text,
            source_url: if response.abstract_url.is_empty() {
                None
            } else {
                Some(response.abstract_url)
            },
            related,
        }
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoProvider {
    fn name(&self) -> &str {
        "DuckDuckGo"
    }

    async fn lookup(&self, query: &str) -> Result<SearchAnswer> {
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .context("Failed to build HTTP client")?;

        let response = client
            .get(&self.base_url)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
            ])
            .send()
            .await
            .context("Failed to reach the search API")?;

        if !response.status().is_success() {
            return Err(anyhow!("search API returned HTTP {}", response.status()));
        }

        let body: InstantAnswerResponse = response
            .json()
            .await
            .context("Failed to parse the search API response")?;
        debug!("Instant answer for '{}': heading='{}'", query, body.heading);

        Ok(self.parse_response(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flattens_topic_groups() {
        let raw = r#"{
            "Heading": "Rust (programming language)",
            "AbstractText": "Rust is a general-purpose programming language.",
            "AbstractURL": "https://en.wikipedia.org/wiki/Rust_(programming_language)",
            "RelatedTopics": [
                { "Text": "Cargo - the Rust package manager", "FirstURL": "https://duckduckgo.com/c1" },
                { "Name": "Related", "Topics": [
                    { "Text": "Ownership in Rust", "FirstURL": "https://duckduckgo.com/c2" },
                    { "Text": "Borrow checker", "FirstURL": "" }
                ]}
            ]
        }"#;

        let provider = DuckDuckGoProvider::new("https://api.duckduckgo.com/".to_string(), 10);
        let parsed: InstantAnswerResponse = serde_json::from_str(raw).unwrap();
        let answer = provider.parse_response(parsed);

        assert_eq!(answer.heading, "Rust (programming language)");
        assert!(answer.summary.starts_with("Rust is"));
        assert_eq!(answer.related.len(), 3);
        assert_eq!(answer.related[1].text, "Ownership in Rust");
        assert_eq!(answer.related[2].url, None);
    }

    #[test]
    fn test_parse_empty_answer() {
        let provider = DuckDuckGoProvider::new("https://api.duckduckgo.com/".to_string(), 10);
        let parsed: InstantAnswerResponse =
            serde_json::from_str(r#"{"Heading": "", "AbstractText": ""}"#).unwrap();
        let answer = provider.parse_response(parsed);
        assert!(answer.is_empty());
        assert_eq!(answer.source_url, None);
    }
}
