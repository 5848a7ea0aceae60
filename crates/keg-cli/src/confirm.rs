//! Confirmation prompts for destructive commands.

use std::io::{self, BufRead, Write};

use crate::error::CliError;

/// Asks the user to confirm an action.
pub trait Confirm {
    /// Show `prompt` and return whether the user agreed.
    ///
    /// # Errors
    ///
    /// Returns an error if the prompt cannot be shown or answered.
    fn confirm(&mut self, prompt: &str) -> Result<bool, CliError>;
}

/// Prompts on stderr and reads the answer from stdin. Only `y` or `yes`
/// agrees.
#[derive(Debug, Default)]
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&mut self, prompt: &str) -> Result<bool, CliError> {
        let mut stderr = io::stderr().lock();
        write!(stderr, "{prompt} [y/N] ")?;
        stderr.flush()?;
        let mut answer = String::new();
        io::stdin().lock().read_line(&mut answer)?;
        Ok(is_yes(&answer))
    }
}

/// Agrees to everything (`--yes`).
#[derive(Debug, Default)]
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&mut self, _prompt: &str) -> Result<bool, CliError> {
        Ok(true)
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("y\n", true ; "y")]
    #[test_case("YES\n", true ; "yes uppercase")]
    #[test_case("\n", false ; "empty defaults to no")]
    #[test_case("nope\n", false ; "other")]
    fn answers(input: &str, expected: bool) {
        assert_eq!(is_yes(input), expected);
    }
}
