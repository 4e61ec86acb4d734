use std::io::{BufRead, Write};

use anyhow::{Context, Result};

/// Line-oriented terminal: prompts are written without a trailing newline
/// and answers are read one line at a time. Generic so sessions can be
/// driven from scripted input in tests.
#[derive(Debug)]
pub struct Console<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Writes `message` and reads one answer. Returns `None` at end of input.
    pub fn prompt(&mut self, message: &str) -> Result<Option<String>> {
        write!(self.output, "{message}").context("failed to write console prompt")?;
        self.output
            .flush()
            .context("failed to flush console output")?;

        let mut answer = String::new();
        let read = self
            .input
            .read_line(&mut answer)
            .context("failed to read console input")?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(answer.trim_end_matches(['\n', '\r']).to_string()))
    }

    /// Asks a yes/no question; only `y`/`Y` counts as yes.
    pub fn confirm(&mut self, message: &str) -> Result<bool> {
        Ok(self
            .prompt(message)?
            .is_some_and(|answer| answer.eq_ignore_ascii_case("y")))
    }

    pub fn line(&mut self, text: impl AsRef<str>) -> Result<()> {
        writeln!(self.output, "{}", text.as_ref()).context("failed to write console output")
    }

    pub fn blank_line(&mut self) -> Result<()> {
        self.line("")
    }

    pub fn into_output(self) -> W {
        self.output
    }
}
