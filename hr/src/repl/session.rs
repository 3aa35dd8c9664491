//! REPL session management

use colored::Colorize;
use eyre::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::debug;

use crate::orchestrator::{Driver, Phase, Rejected};

/// Slash commands understood by the REPL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplCommand {
    Continue,
    Show,
    Cancel,
    Help,
    Quit,
}

impl ReplCommand {
    /// Parse a line starting with `/`; None for unknown commands
    pub fn parse(input: &str) -> Option<Self> {
        let cmd = input.split_whitespace().next().unwrap_or("");
        match cmd {
            "/continue" | "/c" => Some(Self::Continue),
            "/show" | "/s" => Some(Self::Show),
            "/cancel" => Some(Self::Cancel),
            "/help" | "/h" => Some(Self::Help),
            "/quit" | "/q" | "/exit" => Some(Self::Quit),
            _ => None,
        }
    }
}

/// What the main loop should do after a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlashResult {
    Continue,
    Quit,
}

/// Interactive REPL session
pub struct ReplSession {
    driver: Driver,
}

impl ReplSession {
    pub fn new(driver: Driver) -> Self {
        Self { driver }
    }

    pub fn driver(&self) -> &Driver {
        &self.driver
    }

    /// Run the REPL main loop
    pub async fn run(&mut self, initial: Option<String>) -> Result<()> {
        self.print_welcome();

        if let Some(concern) = initial {
            println!("{} {}", ">".bright_green(), concern);
            self.handle_line(&concern).await;
        }

        let mut rl = DefaultEditor::new().map_err(|e| eyre::eyre!("Failed to initialize readline: {}", e))?;

        loop {
            match rl.readline(&format!("{} ", ">".bright_green())) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        let _ = rl.add_history_entry(line.trim());
                    }
                    if self.handle_line(&line).await == SlashResult::Quit {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!();
                    break;
                }
                Err(err) => {
                    return Err(eyre::eyre!("Readline error: {}", err));
                }
            }
        }

        println!("Go in peace.");
        Ok(())
    }

    /// Handle one input line: a slash command or a concern
    pub async fn handle_line(&mut self, line: &str) -> SlashResult {
        let input = line.trim();
        debug!(input_len = input.len(), "handle_line: called");

        if input.starts_with('/') {
            return match ReplCommand::parse(input) {
                Some(cmd) => self.handle_command(cmd).await,
                None => {
                    println!("{} Unknown command: {}", "?".yellow(), input);
                    println!("Type {} for available commands", "/help".yellow());
                    SlashResult::Continue
                }
            };
        }

        match self.driver.submit(input) {
            Ok(_) => self.await_reflection().await,
            Err(Rejected::Blank(_)) => self.print_error(),
            Err(e) => println!("{}", e.to_string().yellow()),
        }
        SlashResult::Continue
    }

    async fn handle_command(&mut self, cmd: ReplCommand) -> SlashResult {
        match cmd {
            ReplCommand::Continue => match self.driver.advance() {
                Ok(_) => self.await_reflection().await,
                Err(e) => println!("{}", e.to_string().yellow()),
            },
            ReplCommand::Show => self.print_session(),
            ReplCommand::Cancel => {
                if self.driver.cancel().is_some() {
                    println!("{}", "Cancelled.".dimmed());
                } else {
                    println!("{}", "No reflection is being prepared.".dimmed());
                }
            }
            ReplCommand::Help => self.print_help(),
            ReplCommand::Quit => return SlashResult::Quit,
        }
        SlashResult::Continue
    }

    /// Block until the outstanding call finishes; Ctrl-C abandons it
    async fn await_reflection(&mut self) {
        println!("{}", "Seeking insight...".dimmed().italic());

        let interrupted = tokio::select! {
            _ = self.driver.wait() => false,
            _ = tokio::signal::ctrl_c() => true,
        };
        if interrupted {
            debug!("await_reflection: interrupted");
            self.driver.cancel();
            println!("{}", "Cancelled.".dimmed());
            return;
        }

        match self.driver.session().phase() {
            Phase::Ready => {
                self.print_initial();
                println!(
                    "Type {} to reflect through the lens of {}.",
                    "/continue".yellow(),
                    self.driver.session().lens()
                );
                println!();
            }
            Phase::Complete => self.print_secondary(),
            Phase::Error => self.print_error(),
            _ => {}
        }
    }

    fn print_initial(&self) {
        if let Some(text) = self.driver.session().initial_text() {
            println!();
            println!("{}", "Your Reflection".bright_blue().bold());
            println!("{}", text);
            println!();
        }
    }

    fn print_secondary(&self) {
        if let Some(text) = self.driver.session().secondary_text() {
            println!();
            println!(
                "{}",
                format!("Through the Lens of {}", self.driver.session().lens()).yellow().bold()
            );
            println!("{}", text);
            println!();
        }
    }

    fn print_error(&self) {
        if let Some(message) = self.driver.session().error_message() {
            println!("{} {}", "!".red().bold(), message.red());
        }
    }

    /// Reprint everything the session currently holds
    fn print_session(&self) {
        let session = self.driver.session();
        if session.initial().is_none() && session.error().is_none() {
            println!("{}", "Nothing to show yet. Share a concern to begin.".dimmed());
            return;
        }
        if !session.description().is_empty() {
            println!("{} {}", "Concern:".dimmed(), session.description());
        }
        self.print_initial();
        self.print_secondary();
        self.print_error();
        if session.continue_visible() {
            println!("Type {} to continue.", "/continue".yellow());
        }
    }

    fn print_welcome(&self) {
        println!();
        println!(
            "{}",
            format!("Guidance through {}", self.driver.session().lens()).bright_cyan().bold()
        );
        println!("Model: {}", self.driver.reflector().describe());
        println!("Share your concern, or type {} for help, {} to quit", "/help".yellow(), "/quit".yellow());
        println!();
    }

    fn print_help(&self) {
        println!();
        println!("{}", "Available Commands:".bright_cyan());
        println!("  {:14} Continue through the lens", "/continue".yellow());
        println!("  {:14} Show the current reflection", "/show".yellow());
        println!("  {:14} Abandon a pending request", "/cancel".yellow());
        println!("  {:14} Show this help", "/help".yellow());
        println!("  {:14} Exit the REPL", "/quit".yellow());
        println!();
        println!("Any other line is taken as a concern. Ctrl-C while waiting cancels the request.");
        println!();
    }
}
