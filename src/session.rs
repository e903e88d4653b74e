//! Interactive read-eval-print loop over a `BufRead`/`Write` pair.

use crate::inspect;
use crate::ledger::Ledger;
use anyhow::{Context, Result};
use std::io::{BufRead, Write};

const EXIT_COMMAND: &str = "exit";
const PROMPT: &str = "Enter a task (type 'exit' to quit): ";

/// One line of user input, classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Task(String),
    Exit,
}

impl Input {
    /// `exit` in any case ends the session. Nothing is trimmed, so ` exit`
    /// is a task.
    pub fn parse(line: &str) -> Self {
        if line.eq_ignore_ascii_case(EXIT_COMMAND) {
            Input::Exit
        } else {
            Input::Task(line.to_string())
        }
    }
}

pub struct Session<R, W> {
    input: R,
    output: W,
    ledger: Ledger,
}

impl<R: BufRead, W: Write> Session<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            ledger: Ledger::new(),
        }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Mutable access to the console, for the finalizer that runs after the loop.
    pub fn output(&mut self) -> &mut W {
        &mut self.output
    }

    /// Prompt until `exit` or end of input. Returns the number of tasks added.
    pub fn run(&mut self) -> Result<usize> {
        let mut added = 0;
        loop {
            writeln!(self.output, "\n==== To-Do List ====")?;
            writeln!(self.output, "{}", self.ledger)?;
            write!(self.output, "\n{PROMPT}")?;
            self.output.flush()?;

            let Some(line) = self.read_line()? else {
                tracing::info!("end of input, treating as exit");
                writeln!(self.output)?;
                break;
            };

            match Input::parse(&line) {
                Input::Exit => break,
                Input::Task(text) => {
                    self.add_task(text)?;
                    added += 1;
                }
            }
        }

        writeln!(self.output, "\n==== Final To-Do List ====")?;
        writeln!(self.output, "{}", self.ledger)?;
        writeln!(self.output, "Exiting the to-do list program.")?;
        tracing::info!(tasks = self.ledger.len(), "session ended");
        Ok(added)
    }

    /// Append a task and print its confirmation and derived views.
    pub fn add_task(&mut self, text: String) -> Result<()> {
        let inspection = inspect::inspect(&text);
        let record = self.ledger.append(text);
        writeln!(self.output, "Task \"{}\" added to the to-do list.", record.text)?;
        writeln!(self.output, "{inspection}")?;
        Ok(())
    }

    pub fn into_parts(self) -> (Ledger, W) {
        (self.ledger, self.output)
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        let mut buf = String::new();
        let n = self
            .input
            .read_line(&mut buf)
            .context("Failed to read from stdin")?;
        if n == 0 {
            return Ok(None);
        }
        if buf.ends_with('\n') {
            buf.pop();
            if buf.ends_with('\r') {
                buf.pop();
            }
        }
        Ok(Some(buf))
    }
}
