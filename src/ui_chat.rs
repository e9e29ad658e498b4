use std::io;
use std::time::Duration;

use anyhow::Result;
use arboard::Clipboard;
use colored::*;
use crossterm::{
    cursor::MoveTo,
    execute,
    terminal::{Clear, ClearType},
};
use indicatif::{ProgressBar, ProgressStyle};
use log::error;

use crate::conversation::ChatMessage;
use crate::event_bus::Metrics;
use crate::todo::TodoStore;

/// Commands offered on an empty transcript, one per feature.
const SUGGESTIONS: [&str; 5] = [
    "Calculate 15% tip on $45",
    "calculate 2^8 + sqrt(144)",
    "show my todo list",
    "start voice to text",
    "search for rust programming",
];

/// Terminal chat renderer: transcript bubbles, the thinking spinner, and
/// the todo / voice side panels.
pub struct ChatUI {
    colorful: bool,
    timestamps: bool,
    assistant_name: String,
}

impl ChatUI {
    pub fn new(colorful: bool, timestamps: bool, assistant_name: String) -> Self {
        Self {
            colorful,
            timestamps,
            assistant_name,
        }
    }

    pub fn start(&self) -> Result<()> {
        if !self.colorful {
            return Ok(());
        }

        // Clear screen and print header
        execute!(io::stdout(), Clear(ClearType::All), MoveTo(0, 0))?;
        println!("{}", "=".repeat(72).bright_blue());
        println!(
            "{}",
            format!("{} - AI Assistant for Calculations & Search", self.assistant_name)
                .bright_white()
                .bold()
        );
        println!("{}", "=".repeat(72).bright_blue());
        println!(
            "{}",
            "Type a message, or /todo, /voice, /clear, /quit.".dimmed()
        );
        println!();
        Ok(())
    }

    pub fn show_suggestions(&self) {
        println!("{}", "Try these commands:".bold());
        for suggestion in SUGGESTIONS {
            if self.colorful {
                println!("  {} {}", "•".bright_cyan(), suggestion);
            } else {
                println!("  - {}", suggestion);
            }
        }
        println!();
    }

    pub fn render_message(&self, message: &ChatMessage) {
        let speaker = if message.from_user {
            "You".to_string()
        } else {
            self.assistant_name.clone()
        };
        let stamp = if self.timestamps {
            format!(" {}", message.created_at.format("%H:%M"))
        } else {
            String::new()
        };

        if self.colorful {
            let name = if message.from_user {
                speaker.bright_green().bold()
            } else {
                speaker.bright_magenta().bold()
            };
            println!("{}{}", name, stamp.dimmed());
        } else {
            println!("{}{}", speaker, stamp);
        }
        println!("  {}", message.text);
        println!();
    }

    /// Spinner shown while the assistant "thinks". The caller keeps the
    /// handle and clears it when the reply lands.
    pub fn begin_thinking(&self) -> Option<ProgressBar> {
        if !self.colorful {
            return None;
        }
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.magenta} {msg}")
                .unwrap(),
        );
        spinner.set_message(format!("{} is thinking...", self.assistant_name));
        spinner.enable_steady_tick(Duration::from_millis(120));
        Some(spinner)
    }

    pub fn end_thinking(&self, spinner: Option<ProgressBar>) {
        if let Some(spinner) = spinner {
            spinner.finish_and_clear();
        }
    }

    pub fn render_todo_panel(&self, todos: &TodoStore) {
        self.panel_header("Todo List");
        if todos.is_empty() {
            println!("  No tasks yet. Add one with /todo add <text>");
        } else {
            for (index, item) in todos.items().iter().enumerate() {
                let mark = if item.completed { "[x]" } else { "[ ]" };
                if self.colorful && item.completed {
                    println!("  {} {} {}", index + 1, mark, item.text.dimmed().strikethrough());
                } else {
                    println!("  {} {} {}", index + 1, mark, item.text);
                }
            }
            println!(
                "  {} pending, {} completed",
                todos.pending_count(),
                todos.completed_count()
            );
        }
        println!("  Commands: /todo add <text> | /todo done <n> | /todo rm <n> | /todo close");
        println!();
    }

    pub fn render_voice_panel(&self, transcript: &str, listening: bool) {
        self.panel_header("Voice to Text");
        if listening {
            println!("  Listening... use /voice stop to finish");
        }
        if transcript.is_empty() {
            println!("  Transcribed text will appear here.");
        } else {
            println!("  {}", transcript);
            println!("  {} characters", transcript.trim().len());
        }
        println!("  Commands: /voice start | /voice stop | /voice copy | /voice clear | /voice close");
        println!();
    }

    fn panel_header(&self, title: &str) {
        if self.colorful {
            println!("{}", format!("--- {} ---", title).bright_cyan().bold());
        } else {
            println!("--- {} ---", title);
        }
    }

    /// Show final session summary
    pub fn finish(&self, metrics: &Metrics) {
        if !self.colorful {
            return;
        }

        println!();
        println!("{}", "=".repeat(72).bright_blue());
        println!("{}", "Session Summary".bright_white().bold());
        println!("{}", "=".repeat(72).bright_blue());
        println!(
            "Messages answered: {}",
            metrics.messages_processed.to_string().bright_green()
        );
        println!(
            "Calculations: {} ok, {} failed",
            metrics.calculations_evaluated.to_string().bright_cyan(),
            metrics.calculations_failed.to_string().bright_red()
        );
        println!(
            "Searches: {} ok, {} failed",
            metrics.searches_completed.to_string().bright_cyan(),
            metrics.searches_failed.to_string().bright_red()
        );
        println!(
            "Panels opened: {} | Todos created: {}",
            metrics.panels_opened.to_string().bright_magenta(),
            metrics.todos_created.to_string().bright_magenta()
        );
        println!();
    }

    pub fn notify(&self, text: &str) {
        if self.colorful {
            println!("{}", text.dimmed());
        } else {
            println!("{}", text);
        }
    }

    pub fn notify_error(&self, text: &str) {
        if self.colorful {
            println!("{} {}", "!".red().bold(), text);
        } else {
            println!("! {}", text);
        }
    }
}

/// Copies the given text to the system clipboard.
pub fn copy_to_clipboard(text: &str) -> Result<(), String> {
    match Clipboard::new() {
        Ok(mut clipboard) => {
            if let Err(e) = clipboard.set_text(text) {
                let err_msg = format!("Failed to set clipboard text: {}", e);
                error!("{}", err_msg);
                Err(err_msg)
            } else {
                Ok(())
            }
        }
        Err(e) => {
            let err_msg = format!("Failed to initialize clipboard: {}", e);
            error!("{}", err_msg);
            Err(err_msg)
        }
    }
}
