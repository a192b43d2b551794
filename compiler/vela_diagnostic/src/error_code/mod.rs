//! Error codes for all code generator diagnostics.
//!
//! Each code is a unique identifier (e.g. `E3001`) whose first digit names
//! the stage that produced it. Used for `velac explain` lookups.

use std::fmt;

/// Error codes for all code generator diagnostics.
///
/// Format: E#### where the first digit indicates the stage:
/// - E3xxx: virtual dispatch and override signature errors
/// - E5xxx: code generation errors
/// - E9xxx: internal compiler errors
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum ErrorCode {
    // Dispatch Errors (E3xxx)
    /// Override signature incompatible with the overridden method
    E3001,
    /// Concrete class does not implement an abstract method
    E3002,
    /// Override accepts a different number of arguments
    E3003,
    /// Abstract method redeclares a concrete ancestor method
    E3004,
    /// Class reached twice while walking a hierarchy
    E3005,

    // Codegen Errors (E5xxx)
    /// TL common header requested without a TL schema
    E5001,
    /// Function referenced before its files were assigned
    E5002,

    // Internal Errors (E9xxx)
    /// Internal compiler error
    E9001,
    /// Code generation is not idempotent
    E9002,
}

impl ErrorCode {
    /// All error code variants.
    ///
    /// Kept in sync with `as_str()`; `all_codes_round_trip` catches omissions.
    pub const ALL: &[ErrorCode] = &[
        ErrorCode::E3001,
        ErrorCode::E3002,
        ErrorCode::E3003,
        ErrorCode::E3004,
        ErrorCode::E3005,
        ErrorCode::E5001,
        ErrorCode::E5002,
        ErrorCode::E9001,
        ErrorCode::E9002,
    ];

    /// Get the numeric code as a string (e.g., "E3001").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E3001 => "E3001",
            ErrorCode::E3002 => "E3002",
            ErrorCode::E3003 => "E3003",
            ErrorCode::E3004 => "E3004",
            ErrorCode::E3005 => "E3005",
            ErrorCode::E5001 => "E5001",
            ErrorCode::E5002 => "E5002",
            ErrorCode::E9001 => "E9001",
            ErrorCode::E9002 => "E9002",
        }
    }

    /// One-line summary shown by `velac explain` when no long form exists.
    pub fn summary(&self) -> &'static str {
        match self {
            ErrorCode::E3001 => "override signature is incompatible",
            ErrorCode::E3002 => "abstract method is not implemented",
            ErrorCode::E3003 => "override argument count differs",
            ErrorCode::E3004 => "abstract method hides a concrete one",
            ErrorCode::E3005 => "class appears twice in a hierarchy",
            ErrorCode::E5001 => "TL schema is required",
            ErrorCode::E5002 => "function has no assigned files",
            ErrorCode::E9001 => "internal compiler error",
            ErrorCode::E9002 => "non-deterministic code generation",
        }
    }

    /// Check if this is a dispatch/signature error (E3xxx range).
    pub fn is_dispatch_error(&self) -> bool {
        matches!(
            self,
            ErrorCode::E3001
                | ErrorCode::E3002
                | ErrorCode::E3003
                | ErrorCode::E3004
                | ErrorCode::E3005
        )
    }

    /// Check if this is a codegen error (E5xxx range).
    pub fn is_codegen_error(&self) -> bool {
        matches!(self, ErrorCode::E5001 | ErrorCode::E5002)
    }

    /// Check if this is an internal compiler error (E9xxx range).
    pub fn is_internal_error(&self) -> bool {
        matches!(self, ErrorCode::E9001 | ErrorCode::E9002)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parse an error code string like `"E3001"`. Case-insensitive.
impl std::str::FromStr for ErrorCode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_uppercase();
        Self::ALL
            .iter()
            .find(|code| code.as_str() == upper)
            .copied()
            .ok_or(())
    }
}

#[cfg(test)]
mod tests;
