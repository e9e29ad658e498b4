use std::ops::Range;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Utc};
use log::info;
use rand::Rng;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::event_bus::{Event, EventBus, EventEmitter};
use crate::impl_event_emitter;
use crate::intent::{Intent, classify};
use crate::responder::{Responder, Response};

/// One bubble in the transcript. Immutable once created; the transcript is
/// an append-only sequence owned by the [`ChatController`].
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub id: String,
    pub text: String,
    pub from_user: bool,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    fn user(text: &str) -> Self {
        Self {
            id: format!("user-{}", Uuid::new_v4()),
            text: text.to_string(),
            from_user: true,
            created_at: Utc::now(),
        }
    }

    fn assistant(text: String) -> Self {
        Self {
            id: format!("vee-{}", Uuid::new_v4()),
            text,
            from_user: false,
            created_at: Utc::now(),
        }
    }
}

/// The single state record the host UI renders from. Panel visibility lives
/// here rather than in ad hoc flags scattered around the UI.
#[derive(Debug, Default, Clone)]
pub struct AssistantState {
    pub messages: Vec<ChatMessage>,
    pub busy: bool,
    pub todo_panel_open: bool,
    pub voice_panel_open: bool,
}

/// Drives the classify -> respond pipeline and owns all conversation state.
///
/// One submission is fully answered before the next is accepted; all state
/// mutation goes through `&mut self`, so nothing can write to a conversation
/// whose controller is gone.
pub struct ChatController {
    state: AssistantState,
    responder: Responder,
    thinking_delay_ms: Range<u64>,
    cancel: CancellationToken,
    event_bus: Option<Arc<EventBus>>,
}

impl ChatController {
    pub fn new(responder: Responder) -> Self {
        Self {
            state: AssistantState::default(),
            responder,
            thinking_delay_ms: 1000..3000,
            cancel: CancellationToken::new(),
            event_bus: None,
        }
    }

    /// Set event bus for event handling
    pub fn with_event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(bus);
        self
    }

    /// Override the simulated thinking delay (zero in tests).
    pub fn with_thinking_delay_ms(mut self, delay: Range<u64>) -> Self {
        self.thinking_delay_ms = delay;
        self
    }

    /// Token cancelled when the host shuts down; aborts in-flight delays.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn state(&self) -> &AssistantState {
        &self.state
    }

    pub fn close_todo_panel(&mut self) {
        self.state.todo_panel_open = false;
    }

    pub fn close_voice_panel(&mut self) {
        self.state.voice_panel_open = false;
    }

    /// Process one user submission end to end. Returns the assistant reply
    /// when the response is chat text; panel-opening responses set the
    /// matching state flag instead and return `None`, as does a blank
    /// submission or a shutdown mid-delay.
    pub async fn send_message(&mut self, text: &str) -> Result<Option<ChatMessage>> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }

        let user_message = ChatMessage::user(text);
        let message_id = user_message.id.clone();
        self.state.messages.push(user_message);
        self.state.busy = true;
        let _ = self
            .emit_event(Event::MessageReceived {
                message_id: message_id.clone(),
                text: text.to_string(),
            })
            .await;

        let intent = classify(text);

        // A fixed delay simulates "thinking" for every local reply; the
        // networked search path already has real latency and is exempt.
        if !matches!(intent, Intent::Search(_)) {
            let _ = self
                .emit_event(Event::ThinkingStarted {
                    message_id: message_id.clone(),
                })
                .await;
            if !self.pause_for_thought().await {
                self.state.busy = false;
                return Ok(None);
            }
        }

        let response = self.responder.respond(intent).await;
        let reply = match response {
            Response::Text(reply_text) => {
                let message = ChatMessage::assistant(reply_text);
                let _ = self
                    .emit_event(Event::ResponseReady {
                        message_id: message.id.clone(),
                        text: message.text.clone(),
                    })
                    .await;
                self.state.messages.push(message.clone());
                Some(message)
            }
            Response::OpenTodoPanel => {
                self.state.todo_panel_open = true;
                let _ = self
                    .emit_event(Event::PanelOpened {
                        panel: "todo".to_string(),
                    })
                    .await;
                None
            }
            Response::OpenVoicePanel => {
                self.state.voice_panel_open = true;
                let _ = self
                    .emit_event(Event::PanelOpened {
                        panel: "voice".to_string(),
                    })
                    .await;
                None
            }
        };

        self.state.busy = false;
        Ok(reply)
    }

    /// Reset the transcript. Panel flags are untouched: closing a panel is
    /// its own action.
    pub async fn clear(&mut self) {
        let count = self.state.messages.len();
        self.state.messages.clear();
        info!("cleared {} messages", count);
        let _ = self.emit_event(Event::ConversationCleared).await;
    }

    /// Sleep for the randomized thinking window. Returns false when the
    /// shutdown token fired first.
    async fn pause_for_thought(&self) -> bool {
        let delay_ms = if self.thinking_delay_ms.is_empty() {
            self.thinking_delay_ms.start
        } else {
            rand::thread_rng().gen_range(self.thinking_delay_ms.clone())
        };
        if delay_ms == 0 {
            return true;
        }
        tokio::select! {
            _ = self.cancel.cancelled() => false,
            _ = tokio::time::sleep(Duration::from_millis(delay_ms)) => true,
        }
    }
}

impl_event_emitter!(ChatController);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::stub::StubSearchProvider;
    use crate::responder::CALCULATION_HELP;

    fn controller() -> ChatController {
        let responder = Responder::new(Arc::new(StubSearchProvider)).with_fixed_fallback(0);
        ChatController::new(responder).with_thinking_delay_ms(0..0)
    }

    #[tokio::test]
    async fn test_transcript_is_append_only_and_ordered() {
        let mut chat = controller();
        chat.send_message("2 + 3").await.unwrap();
        chat.send_message("10 / 4").await.unwrap();

        let messages = &chat.state().messages;
        assert_eq!(messages.len(), 4);
        assert!(messages[0].from_user);
        assert_eq!(messages[1].text, "2 + 3 = 5");
        assert!(messages[2].from_user);
        assert_eq!(messages[3].text, "10 / 4 = 2.5");

        let mut ids: Vec<_> = messages.iter().map(|m| m.id.clone()).collect();
        ids.dedup();
        assert_eq!(ids.len(), 4);
    }

    #[tokio::test]
    async fn test_blank_input_is_ignored() {
        let mut chat = controller();
        assert!(chat.send_message("   ").await.unwrap().is_none());
        assert!(chat.state().messages.is_empty());
    }

    #[tokio::test]
    async fn test_panel_request_sets_flag_without_bubble() {
        let mut chat = controller();
        let reply = chat.send_message("show my todo list").await.unwrap();
        assert!(reply.is_none());
        assert!(chat.state().todo_panel_open);
        // Only the user message lands in the transcript, never a sentinel.
        assert_eq!(chat.state().messages.len(), 1);
        assert!(chat.state().messages[0].from_user);
    }

    #[tokio::test]
    async fn test_invalid_expression_surfaces_help_not_error() {
        let mut chat = controller();
        let reply = chat.send_message("calculate 1/0").await.unwrap().unwrap();
        assert_eq!(reply.text, CALCULATION_HELP);
    }

    #[tokio::test]
    async fn test_clear_resets_transcript_only() {
        let mut chat = controller();
        chat.send_message("show my todo list").await.unwrap();
        chat.send_message("hello").await.unwrap();
        assert!(!chat.state().messages.is_empty());

        chat.clear().await;
        assert!(chat.state().messages.is_empty());
        assert!(chat.state().todo_panel_open);
    }

    #[tokio::test]
    async fn test_cancelled_controller_stops_quietly() {
        let cancel = CancellationToken::new();
        let responder = Responder::new(Arc::new(StubSearchProvider)).with_fixed_fallback(0);
        let mut chat = ChatController::new(responder)
            .with_thinking_delay_ms(5000..5001)
            .with_cancellation(cancel.clone());

        cancel.cancel();
        let reply = chat.send_message("2 + 3").await.unwrap();
        // The user message is recorded but no reply is produced.
        assert!(reply.is_none());
        assert_eq!(chat.state().messages.len(), 1);
        assert!(!chat.state().busy);
    }

    #[tokio::test]
    async fn test_busy_is_cleared_after_reply() {
        let mut chat = controller();
        chat.send_message("hello").await.unwrap();
        assert!(!chat.state().busy);
    }
}
