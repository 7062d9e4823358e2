//! Operator console.
//!
//! Every trade passes through a yes/no confirmation. The gate also carries
//! the human-readable session reports so that everything the operator sees
//! goes through one writer.

use std::io::{self, BufRead, Write};
use tracing::warn;

use crate::types::MarketMakerError;

/// A human-in-the-loop decision point.
pub trait ConfirmationGate {
    /// Ask a yes/no question. Any answer other than yes is a no.
    fn confirm(&mut self, question: &str) -> Result<bool, MarketMakerError>;

    /// Show a line of session output to the operator.
    fn report(&mut self, message: &str);
}

/// Interpret a raw answer line.
///
/// Empty input, a bare newline, or anything starting with `y`/`Y` is yes.
pub fn interpret_answer(answer: &str) -> bool {
    let answer = answer.trim_end_matches(['\r', '\n']);
    match answer.chars().next() {
        None => true,
        Some(c) => c.eq_ignore_ascii_case(&'y'),
    }
}

/// Gate backed by a line reader and a writer (stdin/stdout in the binary).
pub struct ConsoleGate<R, W> {
    input: R,
    output: W,
}

impl ConsoleGate<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> ConsoleGate<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

impl<R: BufRead, W: Write> ConfirmationGate for ConsoleGate<R, W> {
    fn confirm(&mut self, question: &str) -> Result<bool, MarketMakerError> {
        write!(self.output, "{question} [Y/n] ").map_err(MarketMakerError::InputRead)?;
        self.output.flush().map_err(MarketMakerError::InputRead)?;

        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .map_err(MarketMakerError::InputRead)?;

        // EOF is not an answer and must never read as the default yes.
        if read == 0 {
            return Err(MarketMakerError::InputRead(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed",
            )));
        }

        Ok(interpret_answer(&line))
    }

    fn report(&mut self, message: &str) {
        if let Err(e) = writeln!(self.output, "{message}") {
            warn!(error = %e, "Failed to write session output");
        }
    }
}
