use std::{io, path::PathBuf};

use crate::CardId;

/// Malformed input: a missing column or a value of the wrong type.
///
/// `line` is the 1-based line of the input file the offending row starts on
/// (the header is line 1).
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("line {line}, column `{column}`: {kind}")]
pub struct SchemaError {
    pub line: usize,
    pub column: String,
    pub kind: SchemaErrorKind,
}

impl SchemaError {
    pub(crate) fn new(line: usize, column: impl Into<String>, kind: SchemaErrorKind) -> Self {
        Self {
            line,
            column: column.into(),
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum SchemaErrorKind {
    #[display("required column is missing")]
    MissingColumn,
    #[display("cannot parse `{value}` as {expected}")]
    InvalidValue {
        value: String,
        expected: &'static str,
    },
    #[display("unknown {what} code {code}")]
    UnknownCode { what: &'static str, code: i64 },
    #[display("expected {expected} fields, found {found}")]
    FieldCount { expected: String, found: usize },
    #[display("duplicate card id {_0}")]
    DuplicateCard(CardId),
    #[display("unterminated quoted field")]
    UnterminatedQuote,
}

/// A review-log row referencing a card that is not in the card export.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("review {review_id} references unknown card {card_id}")]
pub struct ReferentialError {
    pub review_id: i64,
    pub card_id: CardId,
}

/// Failure to load a collection. Every variant is fatal for the run.
#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum LoadError {
    #[display("failed to read {}", path.display())]
    #[from(skip)]
    Io { path: PathBuf, source: io::Error },
    #[display("invalid input: {_0}")]
    Schema(#[error(not(source))] SchemaError),
    #[display("invalid review log: {_0}")]
    Referential(#[error(not(source))] ReferentialError),
}
