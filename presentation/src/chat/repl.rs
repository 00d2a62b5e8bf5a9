//! REPL (Read-Eval-Print Loop) for interactive chat
//!
//! Bare input is sent to the council on the active conversation; slash
//! commands drive everything else. Controller events are drained and
//! rendered after each intent.

use crate::ConsoleFormatter;
use council_application::{CouncilGateway, SessionController, SessionError, UiEvent};
use council_domain::{Attachment, Stage};
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};
use std::path::PathBuf;
use tokio::sync::mpsc::UnboundedReceiver;

/// Interactive chat REPL
pub struct ChatRepl<G: CouncilGateway + 'static> {
    session: SessionController<G>,
    events: UnboundedReceiver<UiEvent>,
    history_file: Option<PathBuf>,
}

impl<G: CouncilGateway + 'static> ChatRepl<G> {
    /// Create a new ChatRepl over a controller and its event channel
    pub fn new(session: SessionController<G>, events: UnboundedReceiver<UiEvent>) -> Self {
        Self {
            session,
            events,
            history_file: None,
        }
    }

    /// Override the readline history file location
    pub fn with_history_file(mut self, path: Option<PathBuf>) -> Self {
        self.history_file = path;
        self
    }

    fn history_path(&self) -> Option<PathBuf> {
        self.history_file.clone().or_else(|| {
            dirs::data_dir().map(|p| p.join("llm-council").join("history.txt"))
        })
    }

    /// Run the interactive REPL
    pub async fn run(&mut self) -> RlResult<()> {
        let mut rl = DefaultEditor::new()?;

        let history_path = self.history_path();
        if let Some(ref path) = history_path {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let _ = rl.load_history(path);
        }

        self.session.initialize().await;
        self.drain_events();
        self.print_welcome();
        self.show_conversations();

        loop {
            let readline = rl.readline(">>> ");

            match readline {
                Ok(line) => {
                    let line = line.trim();

                    if line.is_empty() {
                        continue;
                    }

                    let _ = rl.add_history_entry(line);

                    if line.starts_with('/') {
                        if self.handle_command(line).await {
                            break;
                        }
                    } else {
                        self.process_message(line, None).await;
                    }
                    self.drain_events();
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("Bye!");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {:?}", err);
                    break;
                }
            }
        }

        if let Some(ref path) = history_path {
            let _ = rl.save_history(path);
        }

        Ok(())
    }

    fn print_welcome(&self) {
        println!();
        println!("╭─────────────────────────────────────────────╮");
        println!("│           LLM Council - Chat Mode           │");
        println!("╰─────────────────────────────────────────────╯");
        println!();
        println!("Type a message to ask the council, or:");
        println!("  /list, /new, /open <n>, /delete <n>, /trace <n>");
        println!("  /help for everything else, /quit to leave");
        println!();
    }

    /// Drain pending controller events and render the notices
    fn drain_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            match event {
                UiEvent::Notice(notice) => {
                    println!("{}", ConsoleFormatter::format_notice(&notice));
                }
                UiEvent::DeleteArmed { conversation_id } => {
                    println!(
                        "Delete {} ? /confirm within the window, /cancel to keep it.",
                        conversation_id
                    );
                }
                // List and timeline changes are rendered by the intent
                // handlers themselves; trace open/close likewise.
                UiEvent::ConversationsChanged
                | UiEvent::TimelineChanged { .. }
                | UiEvent::TraceOpened { .. }
                | UiEvent::TraceClosed => {}
            }
        }
    }

    /// Handle slash commands. Returns true if the REPL should exit.
    async fn handle_command(&mut self, line: &str) -> bool {
        let mut parts = line.splitn(2, char::is_whitespace);
        let command = parts.next().unwrap_or(line);
        let argument = parts.next().map(str::trim).unwrap_or("");

        match command {
            "/quit" | "/exit" | "/q" => {
                println!("Bye!");
                return true;
            }
            "/help" | "/h" | "/?" => self.print_help(),
            "/list" | "/ls" => self.show_conversations(),
            "/new" => {
                let id = self.session.new_conversation().await;
                println!("Started conversation {}", id);
            }
            "/open" => match self.conversation_id_at(argument) {
                Some(id) => {
                    match self.session.select_conversation(&id).await {
                        Ok(()) => self.show_timeline(),
                        Err(e) => self.report(e),
                    }
                }
                None => println!("Usage: /open <n>  (see /list)"),
            },
            "/delete" | "/rm" => match self.conversation_id_at(argument) {
                Some(id) => self.session.request_delete(&id),
                None => println!("Usage: /delete <n>  (see /list)"),
            },
            "/confirm" => {
                if self.session.confirm_delete().await {
                    println!("Deleted.");
                    self.show_conversations();
                } else {
                    println!("Nothing pending to confirm.");
                }
            }
            "/cancel" => {
                self.session.cancel_delete();
                println!("Kept.");
            }
            "/messages" | "/timeline" => self.show_timeline(),
            "/trace" => match self.message_id_at(argument) {
                Some(id) => match self.session.open_deliberation(&id) {
                    Ok(()) => self.show_trace(),
                    Err(e) => self.report(e),
                },
                None => println!("Usage: /trace <n>  (a message index from the timeline)"),
            },
            "/close" => {
                self.session.close_deliberation();
            }
            "/step" => {
                let moved = argument
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| n.checked_sub(1))
                    .filter(|&index| index < self.session.navigation().step_count())
                    .is_some_and(|index| self.session.select_step(index));
                if moved {
                    self.show_trace();
                } else {
                    println!("Usage: /step <n>  (with an open /trace)");
                }
            }
            "/stage" => match argument.parse::<u8>().ok().and_then(Stage::from_number) {
                Some(stage) => {
                    self.session.select_stage(stage);
                    self.show_trace();
                }
                None => println!("Usage: /stage <1|2|3>"),
            },
            _ => {
                println!("Unknown command: {}", command);
                println!("Type /help for available commands");
            }
        }
        false
    }

    fn print_help(&self) {
        println!();
        println!("Commands:");
        println!("  /list             - List conversations");
        println!("  /new              - Start a conversation");
        println!("  /open <n>         - Switch to conversation n");
        println!("  /delete <n>       - Arm deletion of conversation n");
        println!("  /confirm          - Fire the pending deletion");
        println!("  /cancel           - Keep the conversation");
        println!("  /messages         - Show the active timeline");
        println!("  /trace <n>        - Open the deliberation behind message n");
        println!("  /step <n>         - Switch deliberation step");
        println!("  /stage <1|2|3>    - Switch deliberation stage");
        println!("  /close            - Close the trace view");
        println!("  /quit             - Exit chat");
        println!();
        println!("Anything else is sent to the council.");
        println!();
    }

    /// Resolve a 1-based list index to a conversation id
    fn conversation_id_at(&self, argument: &str) -> Option<String> {
        let index = argument.parse::<usize>().ok()?.checked_sub(1)?;
        self.session
            .conversations()
            .conversations
            .get(index)
            .map(|c| c.id.clone())
    }

    /// Resolve a 1-based timeline index to a message id
    fn message_id_at(&self, argument: &str) -> Option<String> {
        let index = argument.parse::<usize>().ok()?.checked_sub(1)?;
        self.session.timeline().get(index).map(|m| m.id.clone())
    }

    fn show_conversations(&self) {
        print!(
            "{}",
            ConsoleFormatter::format_conversation_list(
                &self.session.conversations().conversations,
                self.session.active_conversation(),
                |id| self.session.sync_state(id),
            )
        );
    }

    fn show_timeline(&self) {
        print!("{}", ConsoleFormatter::format_timeline(self.session.timeline()));
    }

    fn show_trace(&self) {
        if let Some(record) = self.session.trace() {
            print!(
                "{}",
                ConsoleFormatter::format_trace(record, self.session.navigation())
            );
        }
    }

    fn report(&self, error: SessionError) {
        eprintln!("Error: {}", error);
    }

    async fn process_message(&mut self, content: &str, attachment: Option<Attachment>) {
        // A bare message with no conversation yet starts one implicitly
        if self.session.active_conversation().is_none() {
            self.session.new_conversation().await;
        }

        println!();
        match self.session.send(content, attachment).await {
            Ok(()) => {
                // Render the newest assistant reply, if the send settled
                if let Some(message) = self.session.timeline().last()
                    && message.role == council_domain::Role::Assistant
                {
                    let index = self.session.timeline().len();
                    print!("{}", ConsoleFormatter::format_message(index, message));
                }
            }
            Err(e) => self.report(e),
        }
        println!();
    }
}
