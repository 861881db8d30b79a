//! The interactive chat loop.
//!
//! Each iteration reads one line, sends it to the backend as a standalone
//! single-message conversation, and prints either the reply or the error.
//! A failed turn never ends the session; only `exit` (or closed input) does.

use crate::llm::ChatBackend;
use crate::protocol::{ChatRequest, ChatTurn};
use crate::spinner::Spinner;
use chrono::Local;
use std::io::{self, Write};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, error, info};

const WELCOME: &str = "Welcome to the Ollama chat. Type 'exit' to quit.";
const PROMPT: &str = "You: ";
const FAREWELL: &str = "Goodbye!";
const SPINNER_TITLE: &str = "Working on response...";

/// What the user asked for on one line of input.
#[derive(Debug, PartialEq, Eq)]
pub enum Command<'a> {
    Exit,
    Message(&'a str),
}

impl<'a> Command<'a> {
    /// Classify a raw input line. Surrounding whitespace is dropped.
    pub fn parse(line: &'a str) -> Self {
        let text = line.trim();
        if text.eq_ignore_ascii_case("exit") {
            Command::Exit
        } else {
            Command::Message(text)
        }
    }
}

/// Whether the loop should keep going after a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    Exit,
}

/// Read-eval-print loop over a chat backend.
pub struct Session<B, R, W> {
    backend: B,
    input: R,
    output: W,
    spinner: bool,
}

impl<B, R, W> Session<B, R, W>
where
    B: ChatBackend,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    /// Create a session reading from `input` and printing to `output`.
    pub fn new(backend: B, input: R, output: W) -> Self {
        Self {
            backend,
            input,
            output,
            spinner: true,
        }
    }

    /// Don't draw the busy indicator.
    pub fn without_spinner(mut self) -> Self {
        self.spinner = false;
        self
    }

    /// Run until the user exits or input closes.
    pub async fn run(&mut self) -> io::Result<()> {
        info!("=== Starting Ollama Chat Session ===");
        writeln!(self.output, "{WELCOME}")?;

        while self.step().await? == Step::Continue {}
        Ok(())
    }

    /// Prompt for and handle a single line of input.
    pub async fn step(&mut self) -> io::Result<Step> {
        write!(self.output, "{PROMPT}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line).await? == 0 {
            info!("Input closed; ending chat session.");
            writeln!(self.output)?;
            writeln!(self.output, "{FAREWELL}")?;
            return Ok(Step::Exit);
        }

        match Command::parse(&line) {
            Command::Exit => {
                info!("User requested to exit the chat.");
                writeln!(self.output, "{FAREWELL}")?;
                Ok(Step::Exit)
            }
            Command::Message(text) => {
                self.dispatch(text).await?;
                Ok(Step::Continue)
            }
        }
    }

    /// Send one message and report the outcome.
    ///
    /// Backend failures are reported to the user and logged; only a failure
    /// to write to the terminal is returned as an error.
    pub async fn dispatch(&mut self, text: &str) -> io::Result<ChatTurn> {
        let mut turn = ChatTurn::new(text);
        info!("User input: {}", turn.user_text);

        let request = ChatRequest::single(self.backend.model(), turn.user_text.as_str());
        let result = {
            let _spinner = Spinner::start(SPINNER_TITLE, self.spinner);
            self.backend.chat(&request).await
        };

        match result {
            Ok(response) => {
                let reply = response.message.content;
                info!("AI response: {}", reply);
                writeln!(self.output, "AI: {reply}")?;
                turn.reply(reply);
            }
            Err(err) => {
                let description = err.to_string();
                // `{:?}` renders the message followed by its `Caused by` chain.
                error!("API call failed: {:?}", anyhow::Error::new(err));
                writeln!(self.output, "Error: {description}")?;
                turn.fail(description);
            }
        }

        let elapsed = Local::now().signed_duration_since(turn.timestamp);
        debug!(
            elapsed_ms = elapsed.num_milliseconds(),
            outcome = ?turn.outcome,
            "Turn finished"
        );
        Ok(turn)
    }
}
