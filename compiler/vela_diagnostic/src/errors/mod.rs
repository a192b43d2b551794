//! Embedded error documentation for `velac explain`.
//!
//! Each error code has a markdown file in this directory, embedded at
//! compile time.

use crate::ErrorCode;

/// Registry of embedded error documentation.
pub struct ErrorDocs;

impl ErrorDocs {
    /// Get the documentation for an error code.
    pub fn get(code: ErrorCode) -> Option<&'static str> {
        DOCS.iter().find(|(c, _)| *c == code).map(|(_, doc)| *doc)
    }

    /// Get all documented error codes.
    pub fn all_codes() -> impl Iterator<Item = ErrorCode> {
        DOCS.iter().map(|(code, _)| *code)
    }

    pub fn has_docs(code: ErrorCode) -> bool {
        DOCS.iter().any(|(c, _)| *c == code)
    }
}

static DOCS: &[(ErrorCode, &str)] = &[
    // Dispatch errors (E3xxx)
    (ErrorCode::E3001, include_str!("E3001.md")),
    (ErrorCode::E3002, include_str!("E3002.md")),
    (ErrorCode::E3003, include_str!("E3003.md")),
    (ErrorCode::E3004, include_str!("E3004.md")),
    (ErrorCode::E3005, include_str!("E3005.md")),
    // Codegen errors (E5xxx)
    (ErrorCode::E5001, include_str!("E5001.md")),
    (ErrorCode::E5002, include_str!("E5002.md")),
    // Internal errors (E9xxx)
    (ErrorCode::E9001, include_str!("E9001.md")),
    (ErrorCode::E9002, include_str!("E9002.md")),
];
