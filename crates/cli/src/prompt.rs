//! Terminal input

use anyhow::{Result, bail};
use portal_frontend::Confirm;
use std::io::{self, BufRead, IsTerminal, Write};

/// Read one trimmed line after printing `label`
pub fn read_line(label: &str) -> Result<String> {
    let mut stdout = io::stdout();
    write!(stdout, "{label}")?;
    stdout.flush()?;

    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        bail!("input closed");
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Read a password after printing `label`
///
/// On a terminal, echo is turned off while typing. Piped input is read as a
/// plain line.
pub fn read_password(label: &str) -> Result<String> {
    if io::stdin().is_terminal() {
        return Ok(rpassword::prompt_password(label)?);
    }
    read_password_from(&mut io::stdin().lock(), &mut io::stdout(), label)
}

fn read_password_from(
    reader: &mut impl BufRead,
    writer: &mut impl Write,
    label: &str,
) -> Result<String> {
    match rpassword::prompt_password_from_bufread(reader, writer, label) {
        Ok(password) => Ok(password),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => bail!("input closed"),
        Err(e) => Err(e.into()),
    }
}

/// Asks on stdin and treats anything but `y`/`yes` as no
#[derive(Debug, Clone, Copy, Default)]
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&self, question: &str) -> bool {
        match read_line(&format!("{question} [y/N] ")) {
            Ok(answer) => is_yes(&answer),
            Err(e) => {
                tracing::debug!(error = %e, "no answer to confirmation");
                false
            }
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_explicit_yes_confirms() {
        assert!(is_yes("y"));
        assert!(is_yes(" YES "));
        assert!(!is_yes(""));
        assert!(!is_yes("n"));
        assert!(!is_yes("yep"));
    }

    #[test]
    fn test_password_is_not_written_back() {
        let mut input = io::Cursor::new("s3cret pass\r\n");
        let mut output = Vec::new();

        let password = read_password_from(&mut input, &mut output, "Password: ").unwrap();
        assert_eq!(password, "s3cret pass");

        let shown = String::from_utf8(output).unwrap();
        assert!(shown.starts_with("Password: "));
        assert!(!shown.contains("s3cret"));
    }

    #[test]
    fn test_password_needs_a_full_line() {
        let mut output = Vec::new();
        assert!(read_password_from(&mut io::Cursor::new(""), &mut output, "Password: ").is_err());
    }
}
