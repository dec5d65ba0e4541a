//! Interactive prompts for the `metacrew` binary.
//!
//! Generic over reader and writer so the prompts can be driven from tests.

use std::io::{self, BufRead, Write};

use crate::llms::catalog::LlmSpec;

/// Re-prompt text for an unusable model choice.
pub const INVALID_CHOICE: &str = "Invalid choice. Please enter a number from the list.";

/// Read one trimmed line, or `UnexpectedEof` when input is exhausted.
fn read_line<R: BufRead>(reader: &mut R) -> io::Result<String> {
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed"));
    }
    Ok(line.trim().to_string())
}

/// Ask the operator to describe the problem.
pub fn prompt_problem<R: BufRead, W: Write>(reader: &mut R, writer: &mut W) -> io::Result<String> {
    write!(writer, "Please describe the problem you want to solve: ")?;
    writer.flush()?;
    read_line(reader)
}

/// List `specs` numbered from 1 and read a choice, re-prompting until one
/// is valid.
pub fn select_model<'a, R: BufRead, W: Write>(
    reader: &mut R,
    writer: &mut W,
    label: &str,
    specs: &'a [LlmSpec],
) -> io::Result<&'a LlmSpec> {
    writeln!(writer, "\nAvailable LLMs:")?;
    for (i, spec) in specs.iter().enumerate() {
        writeln!(writer, "{}. {}", i + 1, spec.name)?;
    }

    loop {
        write!(writer, "Enter the number of the LLM to use for {}: ", label)?;
        writer.flush()?;
        let answer = read_line(reader)?;
        match answer.parse::<usize>() {
            Ok(n) if (1..=specs.len()).contains(&n) => return Ok(&specs[n - 1]),
            _ => {
                log::debug!("Rejected model choice '{}'", answer);
                writeln!(writer, "{}", INVALID_CHOICE)?;
            }
        }
    }
}
