//! Wire types for the JediHTTP endpoints.
//!
//! Field names follow the JSON existing editor clients speak:
//! `col` on requests, `column` on results.

use serde::{Deserialize, Serialize};

/// Body of `/completions`, `/gotodefinition`, `/gotoassignment` and `/usages`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// Full buffer contents
    pub source: String,
    /// Cursor line, 1-based
    pub line: usize,
    /// Cursor column, 0-based, counted in characters
    pub col: usize,
    /// Path the buffer belongs to
    pub source_path: String,
}

/// One completion candidate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    pub name: String,
    pub description: String,
    pub docstring: String,
    pub module_path: Option<String>,
    pub line: Option<usize>,
    pub column: Option<usize>,
}

/// A definition, assignment or usage site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definition {
    pub module_path: Option<String>,
    pub line: Option<usize>,
    pub column: Option<usize>,
    pub in_builtin_module: bool,
    pub is_keyword: bool,
    pub description: String,
    pub docstring: String,
}

/// Response of `/completions`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionsResponse {
    /// Candidates in presentation order
    pub completions: Vec<Completion>,
}

/// Response of `/gotodefinition`, `/gotoassignment` and `/usages`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinitionsResponse {
    /// Matching definitions, possibly empty
    pub definitions: Vec<Definition>,
}

/// Body of every 500 response.
///
/// Kept verbose on purpose: clients are local editors and show this to the
/// developer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Error kind, e.g. `LineOutOfRange`
    pub exception: String,
    /// Human readable message
    pub message: String,
    /// Cause chain and, when captured, a backtrace
    pub traceback: String,
}
