use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json;
use std::sync::Arc;
use tokio::sync::{RwLock, broadcast};

/// Events that can be emitted by components
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Conversation events
    MessageReceived {
        message_id: String,
        text: String,
    },
    ThinkingStarted {
        message_id: String,
    },
    ResponseReady {
        message_id: String,
        text: String,
    },
    ConversationCleared,

    // Interpreter events
    CalculationEvaluated {
        expression: String,
        value: f64,
    },
    CalculationFailed {
        expression: String,
        error: String,
    },

    // Panel events
    PanelOpened {
        panel: String,
    },
    PanelClosed {
        panel: String,
    },

    // Search events
    SearchStarted {
        provider: String,
        query: String,
    },
    SearchCompleted {
        provider: String,
        query: String,
        related_topics: usize,
    },
    SearchFailed {
        provider: String,
        query: String,
        error: String,
    },

    // Dictation events
    DictationStarted,
    DictationTranscript {
        text: String,
        is_final: bool,
    },
    DictationStopped,

    // Todo events
    TodoAdded {
        todo_id: String,
        text: String,
    },
    TodoToggled {
        todo_id: String,
        completed: bool,
    },
    TodoRemoved {
        todo_id: String,
    },

    // System events
    ConfigLoaded {
        path: Option<String>,
    },
    SystemReady,
    ShutdownRequested,

    // Custom events
    Custom {
        event_type: String,
        data: serde_json::Value,
    },
}

/// Event bus for component communication
pub struct EventBus {
    sender: broadcast::Sender<Event>,
    metrics: Arc<RwLock<Metrics>>,
}

/// Accumulated metrics from events
#[derive(Debug, Default, Clone)]
pub struct Metrics {
    pub messages_processed: usize,
    pub calculations_evaluated: usize,
    pub calculations_failed: usize,
    pub searches_completed: usize,
    pub searches_failed: usize,
    pub panels_opened: usize,
    pub todos_created: usize,
}

impl EventBus {
    /// Create a new event bus with specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            metrics: Arc::new(RwLock::new(Metrics::default())),
        }
    }

    /// Subscribe to events
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }

    /// Emit an event to all subscribers
    pub async fn emit(&self, event: Event) -> Result<()> {
        // Update metrics based on event
        self.update_metrics(&event).await;

        // Send event to subscribers
        match self.sender.send(event) {
            Ok(_) => Ok(()),
            Err(_) => {
                // No receivers, but that's okay
                Ok(())
            }
        }
    }

    /// Get current metrics
    pub async fn get_metrics(&self) -> Metrics {
        self.metrics.read().await.clone()
    }

    /// Update metrics based on event
    async fn update_metrics(&self, event: &Event) {
        let mut metrics = self.metrics.write().await;

        match event {
            Event::ResponseReady { .. } => {
                metrics.messages_processed += 1;
            }
            Event::CalculationEvaluated { .. } => {
                metrics.calculations_evaluated += 1;
            }
            Event::CalculationFailed { .. } => {
                metrics.calculations_failed += 1;
            }
            Event::SearchCompleted { .. } => {
                metrics.searches_completed += 1;
            }
            Event::SearchFailed { .. } => {
                metrics.searches_failed += 1;
            }
            Event::PanelOpened { .. } => {
                metrics.panels_opened += 1;
            }
            Event::TodoAdded { .. } => {
                metrics.todos_created += 1;
            }
            _ => {}
        }
    }
}

/// Trait for components that can emit events
#[async_trait::async_trait]
pub trait EventEmitter {
    fn set_event_bus(&mut self, bus: Arc<EventBus>);

    #[allow(dead_code)]
    async fn emit_event(&self, event: Event) -> Result<()>;
}

/// Helper macro to implement EventEmitter trait
#[macro_export]
macro_rules! impl_event_emitter {
    ($type:ty) => {
        #[async_trait::async_trait]
        impl EventEmitter for $type {
            fn set_event_bus(&mut self, bus: Arc<EventBus>) {
                self.event_bus = Some(bus);
            }

            async fn emit_event(&self, event: Event) -> Result<()> {
                if let Some(bus) = &self.event_bus {
                    bus.emit(event).await
                } else {
                    Ok(())
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_event_emission() {
        let bus = EventBus::new(100);
        let mut receiver = bus.subscribe();

        let event = Event::MessageReceived {
            message_id: "user-1".to_string(),
            text: "calculate 2+3".to_string(),
        };

        bus.emit(event.clone()).await.unwrap();

        let received = receiver.recv().await.unwrap();
        match received {
            Event::MessageReceived { message_id, .. } => {
                assert_eq!(message_id, "user-1");
            }
            _ => panic!("Wrong event type"),
        }
    }

    #[tokio::test]
    async fn test_metrics_update() {
        let bus = EventBus::new(100);

        bus.emit(Event::CalculationEvaluated {
            expression: "2+3".to_string(),
            value: 5.0,
        })
        .await
        .unwrap();

        bus.emit(Event::SearchFailed {
            provider: "DuckDuckGo".to_string(),
            query: "rust".to_string(),
            error: "timed out".to_string(),
        })
        .await
        .unwrap();

        let metrics = bus.get_metrics().await;
        assert_eq!(metrics.calculations_evaluated, 1);
        assert_eq!(metrics.searches_failed, 1);
        assert_eq!(metrics.messages_processed, 0);
    }
}
