//! Terminal notifier.
//!
//! One `Console` owns the input and output streams. The shell reads commands
//! through it and the domain crates reach it as their [`Notifier`], so a
//! confirmation prompt reads its answer from the same input as the commands.

use std::cell::RefCell;
use std::io::{self, BufRead, Write};

use stockroom_core::{Confirmation, Notification, Notifier};

pub struct Console<R, W> {
    input: RefCell<R>,
    output: RefCell<W>,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input: RefCell::new(input),
            output: RefCell::new(output),
        }
    }

    /// Next line without its terminator; `None` at end of input.
    pub fn read_line(&self) -> io::Result<Option<String>> {
        let mut line = String::new();
        let n = self.input.borrow_mut().read_line(&mut line)?;
        if n == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\r', '\n']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }

    pub fn print(&self, text: &str) -> io::Result<()> {
        let mut out = self.output.borrow_mut();
        out.write_all(text.as_bytes())?;
        out.flush()
    }

    pub fn println(&self, text: &str) -> io::Result<()> {
        let mut out = self.output.borrow_mut();
        out.write_all(text.as_bytes())?;
        out.write_all(b"\n")?;
        out.flush()
    }

    pub fn with_output<T>(&self, f: impl FnOnce(&W) -> T) -> T {
        f(&self.output.borrow())
    }
}

impl<R: BufRead, W: Write> Notifier for Console<R, W> {
    fn notify(&self, notification: Notification) {
        let line = format!("[{}] {}", notification.severity, notification.message);
        if let Err(err) = self.println(&line) {
            tracing::warn!(error = %err, "failed to print notification");
        }
    }

    fn confirm(&self, confirmation: &Confirmation) -> bool {
        let prompt = format!(
            "{}: {} [{}? y/N] ",
            confirmation.header, confirmation.message, confirmation.confirm_label
        );
        if let Err(err) = self.print(&prompt) {
            tracing::warn!(error = %err, "failed to print confirmation");
            return false;
        }

        match self.read_line() {
            Ok(Some(answer)) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
            Ok(None) => false,
            Err(err) => {
                tracing::warn!(error = %err, "failed to read confirmation");
                false
            }
        }
    }
}
