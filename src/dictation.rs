use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use log::{info, warn};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::AssistantError;

/// One step of a dictation transcript stream.
#[derive(Debug, Clone, PartialEq)]
pub enum TranscriptEvent {
    /// An interim hypothesis, may be revised by the next event.
    Partial(String),
    /// A finalized utterance, safe to append to the transcript.
    Final(String),
    /// The recognizer finished on its own.
    Ended,
}

/// A speech recognition backend. Implementations push transcript events
/// into the sink until they finish or the token is cancelled.
#[async_trait]
pub trait DictationBackend: Send + Sync {
    /// Name of the backend.
    fn name(&self) -> &str;

    /// Whether this environment can actually recognize speech.
    fn is_supported(&self) -> bool;

    async fn run(
        &self,
        sink: mpsc::Sender<TranscriptEvent>,
        cancel: CancellationToken,
    ) -> Result<()>;
}

/// A live dictation session: an event stream plus a cancel handle.
///
/// Dropping the session cancels the backend worker, so a torn-down host
/// view can never receive (or be mutated by) a late transcript event.
pub struct DictationSession {
    pub events: mpsc::Receiver<TranscriptEvent>,
    cancel: CancellationToken,
    worker: JoinHandle<()>,
}

impl DictationSession {
    /// Ask the backend to stop; remaining queued events can still be drained.
    pub fn stop(&self) {
        self.cancel.cancel();
    }
}

impl Drop for DictationSession {
    fn drop(&mut self) {
        self.cancel.cancel();
        self.worker.abort();
    }
}

/// Entry point the host UI talks to.
pub struct DictationService {
    backend: Arc<dyn DictationBackend>,
}

impl DictationService {
    pub fn new(backend: Arc<dyn DictationBackend>) -> Self {
        Self { backend }
    }

    /// Start listening. On an environment without speech recognition this
    /// returns [`AssistantError::UnsupportedEnvironment`] as a value - it
    /// never panics.
    pub fn start(&self) -> Result<DictationSession, AssistantError> {
        if !self.backend.is_supported() {
            warn!("dictation requested but backend '{}' is unsupported", self.backend.name());
            return Err(AssistantError::UnsupportedEnvironment);
        }

        info!("starting dictation via '{}'", self.backend.name());
        let (sink, events) = mpsc::channel(32);
        let cancel = CancellationToken::new();
        let backend = self.backend.clone();
        let worker_cancel = cancel.clone();
        let worker = tokio::spawn(async move {
            if let Err(err) = backend.run(sink, worker_cancel).await {
                warn!("dictation backend stopped with error: {}", err);
            }
        });

        Ok(DictationSession {
            events,
            cancel,
            worker,
        })
    }
}

/// Replays configured utterances word by word, emitting partial hypotheses
/// followed by a final transcript per utterance. Stands in for a platform
/// recognizer in the terminal build and in tests.
pub struct ScriptedBackend {
    utterances: Vec<String>,
    word_delay: Duration,
}

impl ScriptedBackend {
    pub fn new(utterances: Vec<String>, word_delay: Duration) -> Self {
        Self {
            utterances,
            word_delay,
        }
    }
}

#[async_trait]
impl DictationBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    fn is_supported(&self) -> bool {
        true
    }

    async fn run(
        &self,
        sink: mpsc::Sender<TranscriptEvent>,
        cancel: CancellationToken,
    ) -> Result<()> {
        for utterance in &self.utterances {
            let mut spoken = String::new();
            for word in utterance.split_whitespace() {
                tokio::select! {
                    _ = cancel.cancelled() => return Ok(()),
                    _ = tokio::time::sleep(self.word_delay) => {}
                }
                if !spoken.is_empty() {
                    spoken.push(' ');
                }
                spoken.push_str(word);
                if sink.send(TranscriptEvent::Partial(spoken.clone())).await.is_err() {
                    return Ok(());
                }
            }
            if sink.send(TranscriptEvent::Final(spoken)).await.is_err() {
                return Ok(());
            }
        }
        let _ = sink.send(TranscriptEvent::Ended).await;
        Ok(())
    }
}

/// Backend used when no recognizer exists on this machine; `start` refuses.
pub struct UnavailableBackend;

#[async_trait]
impl DictationBackend for UnavailableBackend {
    fn name(&self) -> &str {
        "unavailable"
    }

    fn is_supported(&self) -> bool {
        false
    }

    async fn run(
        &self,
        _sink: mpsc::Sender<TranscriptEvent>,
        _cancel: CancellationToken,
    ) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scripted(utterances: &[&str]) -> DictationService {
        let backend = ScriptedBackend::new(
            utterances.iter().map(|s| s.to_string()).collect(),
            Duration::from_millis(1),
        );
        DictationService::new(Arc::new(backend))
    }

    #[tokio::test]
    async fn test_partials_then_final_then_ended() {
        let service = scripted(&["hello world"]);
        let mut session = service.start().unwrap();

        let mut events = Vec::new();
        while let Some(event) = session.events.recv().await {
            let done = event == TranscriptEvent::Ended;
            events.push(event);
            if done {
                break;
            }
        }

        assert_eq!(
            events,
            vec![
                TranscriptEvent::Partial("hello".to_string()),
                TranscriptEvent::Partial("hello world".to_string()),
                TranscriptEvent::Final("hello world".to_string()),
                TranscriptEvent::Ended,
            ]
        );
    }

    #[tokio::test]
    async fn test_unsupported_environment_is_an_error_value() {
        let service = DictationService::new(Arc::new(UnavailableBackend));
        match service.start() {
            Err(AssistantError::UnsupportedEnvironment) => {}
            other => panic!("expected UnsupportedEnvironment, got {:?}", other.is_ok()),
        }
    }

    #[tokio::test]
    async fn test_stop_cancels_the_stream() {
        let backend = ScriptedBackend::new(
            vec!["a very long utterance that keeps going for a while".to_string()],
            Duration::from_millis(50),
        );
        let service = DictationService::new(Arc::new(backend));
        let mut session = service.start().unwrap();

        // Let at least one partial through, then cancel.
        let first = session.events.recv().await;
        assert!(matches!(first, Some(TranscriptEvent::Partial(_))));
        session.stop();

        // The stream drains and closes without reaching Ended.
        let mut saw_ended = false;
        while let Some(event) = session.events.recv().await {
            saw_ended |= event == TranscriptEvent::Ended;
        }
        assert!(!saw_ended);
    }
}
