//! Program loading
//!
//! Two encodings are accepted. A binary image is a sequence of little-endian
//! instruction words. A textual image has one instruction per line:
//!
//! ```text
//! tag    binary_vector    description
//! 0      00000000000000001111100000100001    ADDI r0, r31, 0
//! ```
//!
//! The decimal tag and the trailing description are ignored.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use tracing::info;

use crate::error::LoadError;
use crate::error::SimulatorResult;

/// Encoding of a program file
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ProgramKind {
    #[default]
    Binary,
    Textual,
}

impl FromStr for ProgramKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "binary" => Ok(ProgramKind::Binary),
            "textual" => Ok(ProgramKind::Textual),
            _ => Err(format!(
                "Invalid program kind: '{}'. Expected 'binary' or 'textual'.",
                s
            )),
        }
    }
}

/// Reads a program from disk into a vector of instruction words
pub fn load_program(path: &Path, kind: ProgramKind) -> SimulatorResult<Vec<u32>> {
    let bytes =
        fs::read(path).map_err(|e| LoadError::FileReadError(path.into(), e))?;

    let code = match kind {
        ProgramKind::Binary => parse_binary(path, &bytes)?,
        ProgramKind::Textual => {
            let text = String::from_utf8_lossy(&bytes);
            parse_textual(path, &text)?
        }
    };

    if code.is_empty() {
        return Err(LoadError::EmptyProgram(path.into()).into());
    }

    info!(path = %path.display(), ?kind, instructions = code.len(), "program loaded");
    Ok(code)
}

/// Splits a binary image into little-endian words
pub fn parse_binary(path: &Path, bytes: &[u8]) -> SimulatorResult<Vec<u32>> {
    if bytes.len() % 4 != 0 {
        return Err(LoadError::Misaligned(path.into(), bytes.len()).into());
    }

    Ok(bytes
        .chunks_exact(4)
        .map(|word| u32::from_le_bytes([word[0], word[1], word[2], word[3]]))
        .collect())
}

/// Parses the textual encoding. Blank lines are skipped.
pub fn parse_textual(path: &Path, text: &str) -> SimulatorResult<Vec<u32>> {
    let mut code = Vec::new();

    for (line_num, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let inst = parse_line(line).ok_or_else(|| {
            LoadError::ParseError(
                path.into(),
                line_num + 1,
                "expected a decimal tag followed by a binary vector".into(),
            )
        })?;
        code.push(inst);
    }

    Ok(code)
}

/// Reads `tag whitespace bits` from one line; everything after the bits
/// is ignored. Bits are shifted in MSB first.
fn parse_line(line: &str) -> Option<u32> {
    let rest = line.trim_start_matches(|c: char| c.is_ascii_digit());
    let rest = rest.trim_start();

    let bits: Vec<u32> = rest
        .chars()
        .map_while(|c| c.to_digit(2))
        .collect();
    if bits.is_empty() {
        return None;
    }

    Some(bits.into_iter().fold(0u32, |acc, bit| (acc << 1) | bit))
}
