use crate::error::Result;
use console::Term;
use std::io::BufRead;

pub const CONFIRM_PROMPT: &str = "Continue? (y/N): ";

/// Only `y` and `yes` (any case, surrounding whitespace ignored) confirm.
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Asks on stdout and reads one line from stdin, which may be piped. Anything
/// but an explicit yes declines, including a closed stdin.
pub fn confirm(prompt: &str) -> Result<bool> {
    let term = Term::stdout();
    term.write_str(prompt)?;
    term.flush()?;

    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(is_affirmative(&answer))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_affirmative_answers() {
        assert!(is_affirmative("y"));
        assert!(is_affirmative("Y"));
        assert!(is_affirmative("yes"));
        assert!(is_affirmative("  YES \n"));
    }

    #[test]
    fn test_everything_else_declines() {
        assert!(!is_affirmative(""));
        assert!(!is_affirmative("n"));
        assert!(!is_affirmative("no"));
        assert!(!is_affirmative("yep"));
        assert!(!is_affirmative("y e s"));
    }
}
