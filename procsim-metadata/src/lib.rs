//! Meta-data program loader
//!
//! Parses simulator programs into validated [`Operation`]s. The expected
//! format is:
//!
//! ```text
//! Start Program Meta-Data Code:
//! S{begin}0; A{begin}0; P{run}11; M{allocate}2;
//! O{monitor}7; I{hard drive}8; A{finish}0; S{finish}0.
//! End Program Meta-Data Code.
//! ```
//!
//! Each token is `<code>{<label>}<cycles>` followed by `;` or `.`. Whitespace
//! is insignificant, so `{hard drive}` and `{harddrive}` are the same label.
//!
//! This parser uses nom version 8 for the token grammar; kind/label pairing
//! is checked by [`Operation::new`].

use std::path::{Path, PathBuf};

use nom::{
    bytes::complete::{take_until, take_while},
    character::complete::{anychar, char, one_of},
    combinator::opt,
    sequence::delimited,
    IResult, Parser,
};
use thiserror::Error;
use tracing::debug;

use procsim_core::{OpKind, OpLabel, Operation, OperationError};

pub const METADATA_HEADER: &str = "Start Program Meta-Data Code:";
pub const METADATA_FOOTER: &str = "End Program Meta-Data Code.";

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("Meta-data file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Meta-data must start with '{0}'")]
    MissingHeader(&'static str),

    #[error("Line {line}: malformed token '{token}'")]
    Syntax { line: usize, token: String },

    #[error("Line {line}: code error in '{token}'")]
    Code {
        line: usize,
        token: String,
        #[source]
        source: OperationError,
    },

    #[error("Line {line}: description error in '{token}'")]
    Description {
        line: usize,
        token: String,
        #[source]
        source: OperationError,
    },

    #[error("Line {line}: cycle error in '{token}'")]
    Cycles { line: usize, token: String },

    #[error("Meta-data I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A token before any semantic checks.
#[derive(Debug, PartialEq, Eq)]
struct RawToken<'a> {
    code: char,
    label: &'a str,
    cycles: &'a str,
}

impl RawToken<'_> {
    fn text(&self) -> String {
        format!("{}{{{}}}{}", self.code, self.label, self.cycles)
    }

    fn into_operation(self, line: usize) -> Result<Operation, MetadataError> {
        let kind = OpKind::from_code(self.code).map_err(|source| MetadataError::Code {
            line,
            token: self.text(),
            source,
        })?;
        let label: OpLabel = self.label.parse().map_err(|source| MetadataError::Description {
            line,
            token: self.text(),
            source,
        })?;
        let cycles: u64 = self.cycles.parse().map_err(|_| MetadataError::Cycles {
            line,
            token: self.text(),
        })?;
        Operation::new(kind, label, cycles).map_err(|source| MetadataError::Description {
            line,
            token: self.text(),
            source,
        })
    }
}

/// Nom-based token parser.
fn token(input: &str) -> IResult<&str, RawToken<'_>> {
    let (input, code) = anychar(input)?;
    let (input, label) = delimited(char('{'), take_until("}"), char('}')).parse(input)?;
    let (input, cycles) = take_while(|c: char| c != ';' && c != '.').parse(input)?;
    let (input, _) = opt(one_of(";.")).parse(input)?;
    Ok((
        input,
        RawToken {
            code,
            label,
            cycles,
        },
    ))
}

/// Parses one body line into operations. `line` is only used for errors.
pub fn parse_line(text: &str, line: usize) -> Result<Vec<Operation>, MetadataError> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    let mut rest = compact.as_str();
    let mut operations = Vec::new();

    while !rest.is_empty() {
        match token(rest) {
            Ok((remaining, raw)) => {
                operations.push(raw.into_operation(line)?);
                rest = remaining;
            }
            Err(_) => {
                let end = rest.find([';', '.']).map_or(rest.len(), |i| i + 1);
                return Err(MetadataError::Syntax {
                    line,
                    token: rest[..end].to_string(),
                });
            }
        }
    }
    Ok(operations)
}

/// Parses a whole program: header, body lines, optional footer.
pub fn parse_program(text: &str) -> Result<Vec<Operation>, MetadataError> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty());

    match lines.next() {
        Some((_, METADATA_HEADER)) => {}
        _ => return Err(MetadataError::MissingHeader(METADATA_HEADER)),
    }

    let mut operations = Vec::new();
    for (number, line) in lines {
        if line == METADATA_FOOTER {
            break;
        }
        operations.extend(parse_line(line, number)?);
    }
    debug!(operations = operations.len(), "Meta-data program parsed");
    Ok(operations)
}

/// Reads and parses a meta-data file.
pub fn load_program<P: AsRef<Path>>(path: P) -> Result<Vec<Operation>, MetadataError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(MetadataError::FileNotFound(path.to_path_buf()));
    }
    let text = std::fs::read_to_string(path)?;
    parse_program(&text)
}
