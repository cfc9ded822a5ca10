//! Console dialog presenter.

use std::io::{self, BufRead, Write};

use symrel_core::DialogPresenter;

/// Talks to the user on stdout/stdin.
///
/// With `assume_yes` every confirmation is answered positively, for
/// scripted use.
pub struct ConsoleDialog {
    assume_yes: bool,
}

impl ConsoleDialog {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }

    fn read_line(&self) -> Option<String> {
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
            Err(_) => None,
        }
    }
}

impl DialogPresenter for ConsoleDialog {
    fn notify(&self, text: &str) {
        println!("{text}");
    }

    fn confirm(&self, text: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        print!("{text} [y/N] ");
        let _ = io::stdout().flush();
        matches!(
            self.read_line().as_deref().map(str::trim),
            Some("y") | Some("Y") | Some("yes") | Some("YES")
        )
    }

    fn prompt(&self, text: &str, default: &str) -> Option<String> {
        print!("{text} [{default}] ");
        let _ = io::stdout().flush();
        let line = self.read_line()?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            Some(default.to_string())
        } else {
            Some(trimmed.to_string())
        }
    }
}
