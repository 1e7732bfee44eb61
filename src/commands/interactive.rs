//! Terminal prompts.

use std::io::{self, BufRead, Write};

use crate::error::Result;

/// Prompt for a yes/no answer. Only `y` or `yes` confirm.
pub fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt} ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(is_yes(&input))
}

fn is_yes(input: &str) -> bool {
    let input = input.trim();
    input.eq_ignore_ascii_case("y") || input.eq_ignore_ascii_case("yes")
}

/// Read one line from stdin, e.g. a password piped in by a script.
pub fn read_line(prompt: &str) -> Result<String> {
    if is_stdin_tty() {
        eprint!("{prompt}: ");
        io::stderr().flush()?;
    }
    let mut input = String::new();
    io::stdin().lock().read_line(&mut input)?;
    Ok(input.trim_end_matches(['\r', '\n']).to_string())
}

pub fn is_stdin_tty() -> bool {
    atty::is(atty::Stream::Stdin)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_yes() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" YES "));
        assert!(!is_yes(""));
        assert!(!is_yes("n"));
        assert!(!is_yes("yep"));
    }
}
