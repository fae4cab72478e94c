use std::fmt::{self, Display, Formatter};

use floorstat_device::RangeError;

use crate::script::SyntaxError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PblockError {
    UnknownPartition(String),
    DuplicatePartition(String),
    UnsupportedOperation(String),
    EmptyPartition(String),
    Range(RangeError),
    Syntax(SyntaxError),
}

impl From<RangeError> for PblockError {
    fn from(value: RangeError) -> Self {
        Self::Range(value)
    }
}

impl From<SyntaxError> for PblockError {
    fn from(value: SyntaxError) -> Self {
        Self::Syntax(value)
    }
}

impl Display for PblockError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            PblockError::UnknownPartition(name) => write!(f, "unknown pblock `{name}`"),
            PblockError::DuplicatePartition(name) => write!(f, "pblock `{name}` created twice"),
            PblockError::UnsupportedOperation(what) => write!(f, "unsupported: {what}"),
            PblockError::EmptyPartition(name) => write!(f, "pblock `{name}` has no ranges"),
            PblockError::Range(e) => write!(f, "{e}"),
            PblockError::Syntax(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for PblockError {}

/// A [`PblockError`] located in the constraint script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptError {
    pub kind: PblockError,
    pub line: usize,
    pub text: String,
}

impl Display for ScriptError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "constraint line {line}: {kind} (`{text}`)",
            line = self.line,
            kind = self.kind,
            text = self.text.trim()
        )
    }
}

impl std::error::Error for ScriptError {}
