use std::sync::Arc;

use anyhow::Result;
use rand::Rng;
use regex::Regex;

use crate::error::AssistantError;
use crate::eval::evaluate;
use crate::event_bus::{Event, EventBus, EventEmitter};
use crate::impl_event_emitter;
use crate::intent::Intent;
use crate::normalize::normalize;
use crate::search::SearchProvider;

/// What the assistant hands back for one classified input: either literal
/// chat text, or a sentinel telling the host UI to open a panel instead of
/// appending a bubble.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Text(String),
    OpenTodoPanel,
    OpenVoicePanel,
}

pub const CALCULATION_HELP: &str =
    "Invalid calculation. Try examples like: 2+3, sqrt(16), sin(90), 2^3, log(100)";

pub const SEARCH_APOLOGY: &str =
    "Sorry, I couldn't complete that search. The network may be offline or the \
     search service may have blocked the request - please try again in a moment.";

pub const EMPTY_QUERY_PROMPT: &str =
    "What would you like me to search for? For example: search for rust programming";

const FALLBACK_POOL: [&str; 4] = [
    "I'm V, your AI assistant. I can handle calculations with scientific functions \
     like sqrt(), sin(), cos(), tan(), log(), ln(), pi and e. I also keep a todo \
     list, take voice dictation, and search the web. Try 'calculate 2^8 + sqrt(144)', \
     'show todo list', or 'search for rust programming'!",
    "Not sure I caught that. Ask me to calculate something, show your todo list, \
     start voice to text, or search the web.",
    "I'm best with concrete commands: try 'calculate 15% tip on $45', 'add a task', \
     or 'search for the latest news'.",
    "Hmm, that one's beyond me. Calculations, todo lists, voice dictation and web \
     search are my strong suits!",
];

/// Turns a classified [`Intent`] into a [`Response`].
pub struct Responder {
    search: Arc<dyn SearchProvider>,
    tip_pattern: Regex,
    fixed_fallback: Option<usize>,
    event_bus: Option<Arc<EventBus>>,
}

impl Responder {
    pub fn new(search: Arc<dyn SearchProvider>) -> Self {
        Self {
            search,
            // e.g. "15% tip on $45" or "20 % tip on 80.50"
            tip_pattern: Regex::new(
                r"(\d+(?:\.\d+)?)\s*%\s*tip\s+on\s+\$?\s*(\d+(?:\.\d+)?)",
            )
            .expect("tip pattern is valid"),
            fixed_fallback: None,
            event_bus: None,
        }
    }

    /// Set event bus for event handling
    pub fn with_event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(bus);
        self
    }

    /// Pin the fallback choice to a fixed pool index (deterministic tests).
    #[allow(dead_code)]
    pub fn with_fixed_fallback(mut self, index: usize) -> Self {
        self.fixed_fallback = Some(index % FALLBACK_POOL.len());
        self
    }

    /// Dispatch on the intent and produce the reply.
    pub async fn respond(&self, intent: Intent) -> Response {
        match intent {
            Intent::Calculate(expression) => Response::Text(self.answer_calculation(&expression).await),
            Intent::ShowTodoList => Response::OpenTodoPanel,
            Intent::ShowVoiceToText => Response::OpenVoicePanel,
            Intent::Search(query) => Response::Text(self.answer_search(&query).await),
            Intent::SmallTalk => Response::Text(self.pick_fallback()),
        }
    }

    async fn answer_calculation(&self, expression: &str) -> String {
        // Tip phrasing is answered directly; it is not an expression.
        if let Some(reply) = self.answer_tip(expression) {
            return reply;
        }

        let normalized = normalize(expression);
        match evaluate(&normalized) {
            Ok(value) => {
                let _ = self
                    .emit_event(Event::CalculationEvaluated {
                        expression: normalized.clone(),
                        value,
                    })
                    .await;
                format!("{} = {}", expression.trim(), format_value(value))
            }
            Err(err) => {
                let _ = self
                    .emit_event(Event::CalculationFailed {
                        expression: normalized,
                        error: err.to_string(),
                    })
                    .await;
                CALCULATION_HELP.to_string()
            }
        }
    }

    fn answer_tip(&self, expression: &str) -> Option<String> {
        let captures = self.tip_pattern.captures(expression)?;
        let percent: f64 = captures[1].parse().ok()?;
        let amount: f64 = captures[2].parse().ok()?;
        let tip = amount * percent / 100.0;
        Some(format!(
            "A {}% tip on ${:.2} is ${:.2}, bringing the total to ${:.2}.",
            format_value(percent),
            amount,
            tip,
            amount + tip
        ))
    }

    async fn answer_search(&self, query: &str) -> String {
        if query.is_empty() {
            return EMPTY_QUERY_PROMPT.to_string();
        }

        let _ = self
            .emit_event(Event::SearchStarted {
                provider: self.search.name().to_string(),
                query: query.to_string(),
            })
            .await;

        match self.search.lookup(query).await {
            Ok(answer) => {
                let _ = self
                    .emit_event(Event::SearchCompleted {
                        provider: self.search.name().to_string(),
                        query: query.to_string(),
                        related_topics: answer.related.len(),
                    })
                    .await;
                self.format_answer(query, answer)
            }
            Err(err) => {
                let network = AssistantError::Network(err.to_string());
                let _ = self
                    .emit_event(Event::SearchFailed {
                        provider: self.search.name().to_string(),
                        query: query.to_string(),
                        error: network.to_string(),
                    })
                    .await;
                SEARCH_APOLOGY.to_string()
            }
        }
    }

    fn format_answer(&self, query: &str, answer: crate::search::SearchAnswer) -> String {
        if answer.is_empty() {
            return format!("I couldn't find anything about '{}'.", query);
        }

        let mut lines = Vec::new();
        if !answer.summary.is_empty() {
            if answer.heading.is_empty() {
                lines.push(answer.summary.clone());
            } else {
                lines.push(format!("{}: {}", answer.heading, answer.summary));
            }
            if let Some(url) = &answer.source_url {
                lines.push(format!("Source: {}", url));
            }
        }

        if !answer.related.is_empty() {
            lines.push("Related:".to_string());
            for topic in answer.related.iter().take(3) {
                lines.push(format!("  - {}", topic.text));
            }
        }

        lines.join("\n")
    }

    fn pick_fallback(&self) -> String {
        let index = match self.fixed_fallback {
            Some(index) => index,
            None => rand::thread_rng().gen_range(0..FALLBACK_POOL.len()),
        };
        FALLBACK_POOL[index].to_string()
    }
}

impl_event_emitter!(Responder);

/// Render a value the way a person would write it: integral results lose
/// the trailing `.0`, everything else keeps the shortest round-trip form.
fn format_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}
