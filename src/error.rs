//! Error Types
//!
//! Every failure aborts the whole parse; no partial schema is ever returned.

use std::fmt;

use thiserror::Error;

use crate::schema::ReferenceEnd;

pub type Result<T> = std::result::Result<T, Error>;

/// Kind of staging record that can be dropped or rejected for missing data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Table,
    Column,
    Reference,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Entity::Table => "table",
            Entity::Column => "column",
            Entity::Reference => "reference",
        })
    }
}

/// Schema decoding error
#[derive(Debug, Error)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────────────────────
    // Document Errors
    // ─────────────────────────────────────────────────────────────────────────────
    #[error("malformed document at byte {position}: {message}")]
    MalformedDocument { message: String, position: usize },

    // ─────────────────────────────────────────────────────────────────────────────
    // Column Errors
    // ─────────────────────────────────────────────────────────────────────────────
    #[error(
        "unknown column type '{type_name}'{}",
        .column.as_ref().map(|c| format!(" on column '{c}'")).unwrap_or_default()
    )]
    UnknownColumnType {
        type_name: String,
        column: Option<String>,
    },

    #[error("invalid {field} '{value}' on column '{column}'")]
    InvalidNumber {
        column: String,
        field: &'static str,
        value: String,
    },

    // ─────────────────────────────────────────────────────────────────────────────
    // Graph Errors
    // ─────────────────────────────────────────────────────────────────────────────
    #[error("unresolved reference: {end} table id '{id}' was never committed")]
    UnresolvedReference { id: String, end: ReferenceEnd },

    #[error("duplicate table id '{id}'")]
    DuplicateTableId { id: String },

    #[error("{entity} '{id}' is missing required field '{field}'")]
    MissingField {
        entity: Entity,
        id: String,
        field: &'static str,
    },

    // ─────────────────────────────────────────────────────────────────────────────
    // Stream/IO Errors
    // ─────────────────────────────────────────────────────────────────────────────
    #[error("schema stream was aborted by an earlier error")]
    StreamAborted,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn malformed(message: impl Into<String>, position: usize) -> Self {
        Error::MalformedDocument {
            message: message.into(),
            position,
        }
    }

    /// Stable error code for tooling output
    pub fn code(&self) -> &'static str {
        match self {
            Error::MalformedDocument { .. } => "MALFORMED_DOCUMENT",
            Error::UnknownColumnType { .. } => "UNKNOWN_COLUMN_TYPE",
            Error::InvalidNumber { .. } => "INVALID_NUMBER",
            Error::UnresolvedReference { .. } => "UNRESOLVED_REFERENCE",
            Error::DuplicateTableId { .. } => "DUPLICATE_TABLE_ID",
            Error::MissingField { .. } => "MISSING_FIELD",
            Error::StreamAborted => "STREAM_ABORTED",
            Error::Io(_) => "IO_ERROR",
        }
    }

    /// Attach the owning column name to a catalog lookup failure
    pub(crate) fn on_column(self, name: &str) -> Self {
        match self {
            Error::UnknownColumnType { type_name, .. } => Error::UnknownColumnType {
                type_name,
                column: Some(name.to_string()),
            },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_type_message() {
        let bare = Error::UnknownColumnType {
            type_name: "geometry".into(),
            column: None,
        };
        assert_eq!(bare.to_string(), "unknown column type 'geometry'");

        let named = bare.on_column("location");
        assert_eq!(
            named.to_string(),
            "unknown column type 'geometry' on column 'location'"
        );
        assert_eq!(named.code(), "UNKNOWN_COLUMN_TYPE");
    }

    #[test]
    fn test_unresolved_message() {
        let err = Error::UnresolvedReference {
            id: "o12".into(),
            end: ReferenceEnd::Parent,
        };
        assert_eq!(
            err.to_string(),
            "unresolved reference: parent table id 'o12' was never committed"
        );
    }

    #[test]
    fn test_missing_field_message() {
        let err = Error::MissingField {
            entity: Entity::Table,
            id: "o3".into(),
            field: "code",
        };
        assert_eq!(err.to_string(), "table 'o3' is missing required field 'code'");
        assert_eq!(err.code(), "MISSING_FIELD");
    }
}
