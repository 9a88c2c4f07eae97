//! Error types.
//!
//! Every fallible operation returns [`Result`]. Persistence failures are
//! logged once where the statement runs and then handed back to the caller;
//! nothing in this crate retries.

use std::error::Error as StdError;
use std::fmt;

/// Boxed source error carried by the error structs.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Result alias used throughout rowmodel.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error.
#[derive(Debug)]
pub enum Error {
    /// Model declaration or initialization misuse.
    Schema(SchemaError),
    /// Statement preparation, binding or execution failed.
    Query(QueryError),
    /// The database connection could not be opened or configured.
    Connection(ConnectionError),
    /// The pending insert batch is inconsistent with the field set.
    Batch(BatchError),
}

/// What went wrong while declaring a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorKind {
    /// A table or column name is not a valid identifier.
    InvalidName,
    /// Two fields share a name.
    DuplicateField,
    /// `init()` was called on an initialized model.
    AlreadyInitialized,
    /// The model was used before `init()`.
    NotInitialized,
    /// A field index or name does not exist.
    UnknownField,
    /// A multi-row insert has no column to list besides the generated key.
    NoInsertableColumns,
}

/// Model declaration error.
#[derive(Debug)]
pub struct SchemaError {
    pub kind: SchemaErrorKind,
    pub table: String,
    pub message: String,
}

/// Which step of running a statement failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryErrorKind {
    /// The driver rejected the SQL text.
    Prepare,
    /// A parameter could not be bound.
    Bind,
    /// The statement failed while executing.
    Execute,
}

/// Statement error.
#[derive(Debug)]
pub struct QueryError {
    pub kind: QueryErrorKind,
    pub sql: Option<String>,
    pub message: String,
    pub source: Option<BoxError>,
}

/// Why a connection could not be established.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionErrorKind {
    /// Opening the database failed.
    Connect,
    /// Applying connection settings failed.
    Configure,
}

/// Connection error.
#[derive(Debug)]
pub struct ConnectionError {
    pub kind: ConnectionErrorKind,
    pub message: String,
    pub source: Option<BoxError>,
}

/// A batch row has a different number of values than the column list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchError {
    pub table: String,
    pub row: usize,
    pub expected: usize,
    pub actual: usize,
}

impl Error {
    pub(crate) fn schema(
        kind: SchemaErrorKind,
        table: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Error::Schema(SchemaError {
            kind,
            table: table.into(),
            message: message.into(),
        })
    }

    /// Build a query error without a source.
    pub fn query(kind: QueryErrorKind, sql: Option<&str>, message: impl Into<String>) -> Self {
        Error::Query(QueryError {
            kind,
            sql: sql.map(str::to_string),
            message: message.into(),
            source: None,
        })
    }

    /// Wrap a driver error raised while running `sql`.
    pub fn from_driver(
        kind: QueryErrorKind,
        sql: &str,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Error::Query(QueryError {
            kind,
            sql: Some(sql.to_string()),
            message: source.to_string(),
            source: Some(Box::new(source)),
        })
    }

    /// The query error kind, if this is a query error.
    pub fn query_kind(&self) -> Option<QueryErrorKind> {
        match self {
            Error::Query(q) => Some(q.kind),
            _ => None,
        }
    }

    /// The schema error kind, if this is a schema error.
    pub fn schema_kind(&self) -> Option<SchemaErrorKind> {
        match self {
            Error::Schema(s) => Some(s.kind),
            _ => None,
        }
    }
}

impl fmt::Display for SchemaErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SchemaErrorKind::InvalidName => "invalid name",
            SchemaErrorKind::DuplicateField => "duplicate field",
            SchemaErrorKind::AlreadyInitialized => "already initialized",
            SchemaErrorKind::NotInitialized => "not initialized",
            SchemaErrorKind::UnknownField => "unknown field",
            SchemaErrorKind::NoInsertableColumns => "no insertable columns",
        };
        f.write_str(s)
    }
}

impl fmt::Display for QueryErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            QueryErrorKind::Prepare => "prepare",
            QueryErrorKind::Bind => "bind",
            QueryErrorKind::Execute => "execute",
        };
        f.write_str(s)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Schema(e) => write!(f, "schema error on {}: {}: {}", e.table, e.kind, e.message),
            Error::Query(e) => match &e.sql {
                Some(sql) => write!(f, "{} failed: {} (sql: {})", e.kind, e.message, sql),
                None => write!(f, "{} failed: {}", e.kind, e.message),
            },
            Error::Connection(e) => write!(f, "connection error: {}", e.message),
            Error::Batch(e) => write!(
                f,
                "batch row {} for {} has {} values, expected {}",
                e.row, e.table, e.actual, e.expected
            ),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::Query(QueryError {
                source: Some(source),
                ..
            })
            | Error::Connection(ConnectionError {
                source: Some(source),
                ..
            }) => Some(&**source as &(dyn StdError + 'static)),
            _ => None,
        }
    }
}
