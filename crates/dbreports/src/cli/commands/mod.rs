use std::io::{BufRead, Write};

use anyhow::Result;

use crate::cli::console::Console;
use crate::sqlite::StoreError;

pub mod movies;
pub mod traffic;

pub const MENU_PROMPT: &str = "Your choice --> ";
pub const EXIT_CHOICE: &str = "x";
pub const UNKNOWN_COMMAND: &str = "Error, unknown command, try again...";

/// A failed query aborts the command, not the session: store errors are
/// reported on the console and the menu loop carries on. Anything else
/// (console I/O) is returned to the caller.
pub(crate) fn report_command_outcome<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    outcome: Result<()>,
) -> Result<()> {
    let Err(error) = outcome else {
        return Ok(());
    };
    match error.downcast_ref::<StoreError>() {
        Some(store_error) => console.line(format!("Error: {store_error}")),
        None => Err(error),
    }
}

/// Parses an integer the way the menus accept them: surrounding whitespace
/// is ignored, anything else non-numeric is rejected.
pub(crate) fn parse_int(raw: &str) -> Option<i64> {
    raw.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::{parse_int, report_command_outcome};
    use crate::cli::console::Console;
    use crate::sqlite::Store;

    #[test]
    fn parse_int_trims_and_rejects_garbage() {
        assert_eq!(parse_int(" 42 "), Some(42));
        assert_eq!(parse_int("-3"), Some(-3));
        assert_eq!(parse_int("4.5"), None);
        assert_eq!(parse_int(""), None);
    }

    #[test]
    fn store_failures_are_reported_and_swallowed() {
        let store = Store::open_in_memory().expect("in-memory sqlite should open");
        let failure = store
            .fetch_one("SELECT * FROM Movies", [], |row| row.get::<usize, i64>(0))
            .map(|_| ())
            .map_err(anyhow::Error::from);
        let mut console = Console::new("".as_bytes(), Vec::new());

        report_command_outcome(&mut console, failure).expect("store error should not escape");

        let output = String::from_utf8(console.into_output()).expect("output should be utf-8");
        assert!(output.starts_with("Error: fetch_one failed: no such table: Movies"));
    }

    #[test]
    fn other_failures_propagate() {
        let mut console = Console::new("".as_bytes(), Vec::new());
        let error = report_command_outcome(&mut console, Err(anyhow::anyhow!("broken pipe")))
            .expect_err("non-store errors must propagate");

        assert_eq!(error.to_string(), "broken pipe");
    }
}
