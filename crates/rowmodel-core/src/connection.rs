//! Database connection contract.
//!
//! Models never look up a connection themselves: every persistence call
//! takes the connection to run on. Implementations are synchronous; a call
//! blocks until the database answers.

use crate::error::Result;
use crate::types::Dialect;
use crate::value::Value;

/// What kind of identifier is being escaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierKind {
    /// A column name.
    FieldName,
    /// A table name.
    TableName,
}

/// Engine-specific SQL rendering.
pub trait Driver {
    /// The dialect statements are rendered in.
    fn dialect(&self) -> Dialect;

    /// Escape a table or column name.
    fn escape_identifier(&self, name: &str, kind: IdentifierKind) -> String {
        let _ = kind;
        self.dialect().quote_identifier(name)
    }

    /// Placeholder for the parameter at `index` (1-based).
    fn placeholder(&self, index: usize) -> String {
        self.dialect().placeholder(index)
    }
}

/// A dialect on its own is enough to render SQL without a connection.
impl Driver for Dialect {
    fn dialect(&self) -> Dialect {
        *self
    }
}

/// A prepared statement.
pub trait Statement {
    /// Bind `value` to the parameter at `position` (0-based, in placeholder order).
    fn bind(&mut self, position: usize, value: &Value) -> Result<()>;

    /// Run the statement, returning the number of rows affected.
    fn execute(&mut self) -> Result<u64>;

    /// The row id generated by the last successful `execute`, or NULL.
    fn last_insert_id(&self) -> Value;
}

/// A live database connection.
pub trait Connection {
    /// Driver used for escaping and placeholders.
    type Driver: Driver;

    /// Statement type borrowing this connection.
    type Statement<'conn>: Statement
    where
        Self: 'conn;

    fn driver(&self) -> &Self::Driver;

    /// Prepare `sql` for binding and execution.
    fn prepare<'conn>(&'conn self, sql: &str) -> Result<Self::Statement<'conn>>;

    /// Prepare and run a statement that takes no parameters.
    fn execute_sql(&self, sql: &str) -> Result<u64> {
        let mut stmt = self.prepare(sql)?;
        stmt.execute()
    }
}
