use crate::utils::error::{MaintError, Result};
use std::io::{BufRead, Write};
use std::path::PathBuf;

/// Asks `question` on `output` and reads one path from `input`.
///
/// Surrounding whitespace and one pair of matching quotes are stripped, so a
/// path dragged into a terminal window works as typed.
pub fn prompt_path<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    question: &str,
) -> Result<PathBuf> {
    write!(output, "{}: ", question)?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(MaintError::MissingConfigError {
            field: question.to_string(),
        });
    }

    let answer = strip_quotes(line.trim());
    if answer.is_empty() {
        return Err(MaintError::MissingConfigError {
            field: question.to_string(),
        });
    }

    Ok(PathBuf::from(answer))
}

fn strip_quotes(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}
