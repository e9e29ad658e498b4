use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use log::debug;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;

mod config;
mod conversation;
mod dictation;
mod error;
mod eval;
mod event_bus;
mod intent;
mod logger;
mod normalize;
mod providers;
mod responder;
mod search;
mod todo;
mod ui_chat;

use config::Config;
use conversation::ChatController;
use dictation::{
    DictationBackend, DictationService, ScriptedBackend, TranscriptEvent, UnavailableBackend,
};
use event_bus::{Event, EventBus};
use providers::duckduckgo::DuckDuckGoProvider;
use providers::stub::StubSearchProvider;
use responder::Responder;
use search::SearchProvider;
use todo::TodoStore;
use ui_chat::ChatUI;

#[derive(Parser)]
#[command(name = "vee", version, about = "A terminal AI assistant for calculations, todo lists, voice dictation, and web search")]
struct Args {
    /// Run without colors, spinners, or suggestions
    #[arg(long)]
    headless: bool,
    /// Verbose logging (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
    /// Path to a config file
    #[arg(short, long)]
    config: Option<String>,
    /// Message to answer in one-shot mode
    #[arg(last = true)]
    message: Vec<String>,
}

/// Everything the interactive loop needs in one place.
struct App {
    controller: ChatController,
    todos: TodoStore,
    dictation: DictationService,
    transcript: String,
    ui: ChatUI,
    event_bus: Arc<EventBus>,
    shutdown: CancellationToken,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logger::init(args.verbose);

    let mut config = Config::load(&args.config)?;
    config.merge_with_args(args.headless, args.verbose > 0);

    let event_bus = Arc::new(EventBus::new(100));
    let _ = event_bus
        .emit(Event::ConfigLoaded {
            path: args.config.clone(),
        })
        .await;

    // Debug trace of everything crossing the bus.
    let mut receiver = event_bus.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = receiver.recv().await {
            debug!("event: {:?}", event);
        }
    });

    let shutdown = CancellationToken::new();
    let mut app = App::new(&config, event_bus.clone(), shutdown.clone());

    let _ = event_bus.emit(Event::SystemReady).await;

    if !args.message.is_empty() {
        let message = args.message.join(" ");
        app.answer_once(&message).await?;
        return Ok(());
    }

    // Ctrl-C cancels any in-flight delay and ends the loop.
    {
        let shutdown = shutdown.clone();
        let event_bus = event_bus.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                let _ = event_bus.emit(Event::ShutdownRequested).await;
                shutdown.cancel();
            }
        });
    }

    app.run().await
}

impl App {
    fn new(config: &Config, event_bus: Arc<EventBus>, shutdown: CancellationToken) -> Self {
        let search: Arc<dyn SearchProvider> = if config.search.enabled {
            Arc::new(DuckDuckGoProvider::new(
                config.search.base_url.clone(),
                config.search.timeout_secs,
            ))
        } else {
            Arc::new(StubSearchProvider)
        };

        let responder = Responder::new(search).with_event_bus(event_bus.clone());
        let controller = ChatController::new(responder)
            .with_event_bus(event_bus.clone())
            .with_thinking_delay_ms(config.thinking_delay_ms())
            .with_cancellation(shutdown.clone());

        let backend: Arc<dyn DictationBackend> = if config.dictation.enabled {
            Arc::new(ScriptedBackend::new(
                config.dictation.script.clone(),
                Duration::from_millis(config.dictation.word_delay_ms),
            ))
        } else {
            Arc::new(UnavailableBackend)
        };

        let ui = ChatUI::new(
            config.ui.colorful,
            config.ui.timestamps,
            config.assistant.name.clone(),
        );

        Self {
            controller,
            todos: TodoStore::new(),
            dictation: DictationService::new(backend),
            transcript: String::new(),
            ui,
            event_bus,
            shutdown,
        }
    }

    /// One-shot mode: answer a single message and print the plain result.
    async fn answer_once(&mut self, message: &str) -> Result<()> {
        if let Some(reply) = self.controller.send_message(message).await? {
            println!("{}", reply.text);
        }
        if self.controller.state().todo_panel_open {
            self.ui.render_todo_panel(&self.todos);
        }
        if self.controller.state().voice_panel_open {
            self.ui.render_voice_panel(&self.transcript, false);
        }
        Ok(())
    }

    /// The interactive chat loop.
    async fn run(&mut self) -> Result<()> {
        self.ui.start()?;
        if self.controller.state().messages.is_empty() {
            self.ui.show_suggestions();
        }

        let stdin = BufReader::new(tokio::io::stdin());
        let mut lines = stdin.lines();

        loop {
            let line = tokio::select! {
                _ = self.shutdown.cancelled() => break,
                line = lines.next_line() => line?,
            };
            let Some(line) = line else { break };
            let line = line.trim().to_string();
            if line.is_empty() {
                continue;
            }

            if let Some(command) = line.strip_prefix('/') {
                if !self.handle_command(command).await {
                    break;
                }
                continue;
            }

            self.answer_in_chat(&line).await?;
        }

        let metrics = self.event_bus.get_metrics().await;
        self.ui.finish(&metrics);
        Ok(())
    }

    async fn answer_in_chat(&mut self, line: &str) -> Result<()> {
        let todo_was_open = self.controller.state().todo_panel_open;
        let voice_was_open = self.controller.state().voice_panel_open;

        let spinner = self.ui.begin_thinking();
        let result = self.controller.send_message(line).await;
        self.ui.end_thinking(spinner);

        match result {
            Ok(Some(reply)) => self.ui.render_message(&reply),
            Ok(None) => {
                let state = self.controller.state();
                if state.todo_panel_open && !todo_was_open {
                    self.ui.render_todo_panel(&self.todos);
                }
                if state.voice_panel_open && !voice_was_open {
                    self.ui.render_voice_panel(&self.transcript, false);
                }
            }
            // Transient failure: notify and keep the conversation alive.
            Err(err) => self.ui.notify_error(&format!("Failed to process your message: {}", err)),
        }
        Ok(())
    }

    /// Slash commands. Returns false when the loop should exit.
    async fn handle_command(&mut self, command: &str) -> bool {
        let mut parts = command.splitn(2, ' ');
        let head = parts.next().unwrap_or_default();
        let rest = parts.next().unwrap_or_default().trim();

        match head {
            "quit" | "exit" => return false,
            "clear" => {
                self.controller.clear().await;
                self.ui.notify("Chat history cleared");
            }
            "todo" => self.handle_todo_command(rest).await,
            "voice" => self.handle_voice_command(rest).await,
            _ => self.ui.notify_error(&format!("Unknown command '/{}'", head)),
        }
        true
    }

    async fn handle_todo_command(&mut self, rest: &str) {
        let mut parts = rest.splitn(2, ' ');
        let action = parts.next().unwrap_or_default();
        let payload = parts.next().unwrap_or_default().trim();

        match action {
            "" => {}
            "add" => {
                if let Some(item) = self.todos.add(payload) {
                    let _ = self
                        .event_bus
                        .emit(Event::TodoAdded {
                            todo_id: item.id.to_string(),
                            text: item.text.clone(),
                        })
                        .await;
                } else {
                    self.ui.notify_error("Usage: /todo add <text>");
                    return;
                }
            }
            "done" => {
                let Some(id) = payload
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| self.todos.at_position(n))
                    .map(|item| item.id)
                else {
                    self.ui.notify_error("Usage: /todo done <number>");
                    return;
                };
                if let Some(completed) = self.todos.toggle(id) {
                    let _ = self
                        .event_bus
                        .emit(Event::TodoToggled {
                            todo_id: id.to_string(),
                            completed,
                        })
                        .await;
                }
            }
            "rm" => {
                let Some(id) = payload
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| self.todos.at_position(n))
                    .map(|item| item.id)
                else {
                    self.ui.notify_error("Usage: /todo rm <number>");
                    return;
                };
                if self.todos.remove(id) {
                    let _ = self
                        .event_bus
                        .emit(Event::TodoRemoved {
                            todo_id: id.to_string(),
                        })
                        .await;
                }
            }
            "close" => {
                self.controller.close_todo_panel();
                let _ = self
                    .event_bus
                    .emit(Event::PanelClosed {
                        panel: "todo".to_string(),
                    })
                    .await;
                self.ui.notify("Todo panel closed");
                return;
            }
            _ => {
                self.ui.notify_error("Usage: /todo [add <text> | done <n> | rm <n> | close]");
                return;
            }
        }

        self.ui.render_todo_panel(&self.todos);
    }

    async fn handle_voice_command(&mut self, rest: &str) {
        match rest {
            "" => self.ui.render_voice_panel(&self.transcript, false),
            "start" => self.run_dictation().await,
            "stop" => self.ui.notify("Voice recognition isn't running."),
            "copy" => {
                let text = self.transcript.trim();
                if text.is_empty() {
                    self.ui.notify("Nothing to copy yet.");
                } else {
                    match ui_chat::copy_to_clipboard(text) {
                        Ok(()) => self.ui.notify("Text copied to clipboard!"),
                        Err(err) => self.ui.notify_error(&err),
                    }
                }
            }
            "clear" => {
                self.transcript.clear();
                self.ui.render_voice_panel(&self.transcript, false);
            }
            "close" => {
                self.controller.close_voice_panel();
                let _ = self
                    .event_bus
                    .emit(Event::PanelClosed {
                        panel: "voice".to_string(),
                    })
                    .await;
                self.ui.notify("Voice panel closed");
            }
            _ => self.ui.notify_error("Usage: /voice [start | stop | copy | clear | close]"),
        }
    }

    /// Run one dictation session to completion, streaming partials to the
    /// terminal. Ctrl-C tears the session down mid-utterance.
    async fn run_dictation(&mut self) {
        let mut session = match self.dictation.start() {
            Ok(session) => session,
            Err(err) => {
                // e.g. no recognition backend on this machine
                self.ui.notify_error(&err.to_string());
                return;
            }
        };

        let _ = self.event_bus.emit(Event::DictationStarted).await;
        self.ui.render_voice_panel(&self.transcript, true);

        loop {
            let event = tokio::select! {
                _ = self.shutdown.cancelled() => {
                    session.stop();
                    break;
                }
                event = session.events.recv() => event,
            };
            match event {
                Some(TranscriptEvent::Partial(text)) => {
                    let _ = self
                        .event_bus
                        .emit(Event::DictationTranscript {
                            text: text.clone(),
                            is_final: false,
                        })
                        .await;
                    self.ui.notify(&format!("... {}", text));
                }
                Some(TranscriptEvent::Final(text)) => {
                    let _ = self
                        .event_bus
                        .emit(Event::DictationTranscript {
                            text: text.clone(),
                            is_final: true,
                        })
                        .await;
                    if !self.transcript.is_empty() {
                        self.transcript.push(' ');
                    }
                    self.transcript.push_str(&text);
                }
                Some(TranscriptEvent::Ended) | None => break,
            }
        }

        let _ = self.event_bus.emit(Event::DictationStopped).await;
        self.ui.render_voice_panel(&self.transcript, false);
    }
}
