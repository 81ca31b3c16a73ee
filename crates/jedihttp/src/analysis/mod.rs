//! Code analysis behind the route handlers.
//!
//! Handlers only see the [`Analyzer`] trait. The server ships with
//! [`LexicalAnalyzer`], a Python-aware engine working from tokens alone: it
//! knows the bindings a file makes but does not import modules or infer
//! types beyond literals.

mod builtins;
mod index;
mod lexical;
pub mod scanner;

pub use lexical::LexicalAnalyzer;

use crate::domain::types::{AnalysisRequest, Completion, Definition};

/// Analysis engine queried by the route handlers.
///
/// Implementations are CPU-bound and synchronous; handlers run them on the
/// blocking pool.
pub trait Analyzer: Send + Sync + 'static {
    /// Candidates for the identifier ending at the cursor
    fn completions(&self, request: &AnalysisRequest) -> Result<Vec<Completion>, AnalysisError>;

    /// Where the name under the cursor is defined, following aliases
    fn goto_definitions(&self, request: &AnalysisRequest)
        -> Result<Vec<Definition>, AnalysisError>;

    /// Where the name under the cursor was last bound
    fn goto_assignments(&self, request: &AnalysisRequest)
        -> Result<Vec<Definition>, AnalysisError>;

    /// Every occurrence of the name under the cursor
    fn usages(&self, request: &AnalysisRequest) -> Result<Vec<Definition>, AnalysisError>;
}

/// Cursor outside the buffer
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnalysisError {
    #[error("line {line} is out of range, the buffer has {lines} lines")]
    LineOutOfRange { line: usize, lines: usize },

    #[error("column {col} is out of range, line {line} has {len} characters")]
    ColumnOutOfRange { line: usize, col: usize, len: usize },
}

impl AnalysisError {
    /// Short kind name reported to clients
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisError::LineOutOfRange { .. } => "LineOutOfRange",
            AnalysisError::ColumnOutOfRange { .. } => "ColumnOutOfRange",
        }
    }
}

/// Check a 1-based `line` and 0-based `col` against `source`.
///
/// Lines are split on `\n` only, so a buffer ending in a newline has an
/// empty last line the cursor may sit on.
pub fn check_position(source: &str, line: usize, col: usize) -> Result<(), AnalysisError> {
    let lines = source.split('\n').count();
    if line == 0 || line > lines {
        return Err(AnalysisError::LineOutOfRange { line, lines });
    }

    let len = source
        .split('\n')
        .nth(line - 1)
        .map(|text| text.trim_end_matches('\r').chars().count())
        .unwrap_or(0);
    if col > len {
        return Err(AnalysisError::ColumnOutOfRange { line, col, len });
    }

    Ok(())
}
