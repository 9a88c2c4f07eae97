//! rusqlite-backed implementation of the rowmodel connection contract.

use rowmodel_core::{
    Connection, ConnectionError, ConnectionErrorKind, Dialect, Error, QueryErrorKind, Result,
    Statement, Value,
};
use rusqlite::types::{Value as SqliteValue, ValueRef};

use crate::config::SqliteConfig;

/// An open SQLite database.
pub struct SqliteConnection {
    conn: rusqlite::Connection,
}

impl std::fmt::Debug for SqliteConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteConnection").finish_non_exhaustive()
    }
}

impl SqliteConnection {
    /// Open the database described by `config` and apply its PRAGMAs.
    pub fn open(config: &SqliteConfig) -> Result<Self> {
        let conn = match &config.path {
            Some(path) => rusqlite::Connection::open(path),
            None => rusqlite::Connection::open_in_memory(),
        }
        .map_err(|e| connection_error(ConnectionErrorKind::Connect, "could not open database", e))?;

        conn.busy_timeout(config.busy_timeout).map_err(|e| {
            connection_error(ConnectionErrorKind::Configure, "could not set busy timeout", e)
        })?;

        let initial_sql = config.initial_sql();
        conn.execute_batch(&initial_sql).map_err(|e| {
            connection_error(ConnectionErrorKind::Configure, "could not apply pragmas", e)
        })?;

        tracing::info!(
            path = ?config.path,
            foreign_keys = config.foreign_keys,
            "Opened SQLite database"
        );
        tracing::debug!(sql = %initial_sql, "Applied initial pragmas");
        Ok(Self { conn })
    }

    /// Open a private in-memory database with default settings.
    pub fn open_in_memory() -> Result<Self> {
        Self::open(&SqliteConfig::in_memory())
    }

    /// Run a query and collect every row.
    pub fn query_rows(&self, sql: &str, params: &[Value]) -> Result<Vec<Vec<Value>>> {
        let mut stmt = self
            .conn
            .prepare(sql)
            .map_err(|e| Error::from_driver(QueryErrorKind::Prepare, sql, e))?;
        let columns = stmt.column_count();

        let mut rows = stmt
            .query(rusqlite::params_from_iter(params.iter().map(to_sqlite)))
            .map_err(|e| Error::from_driver(QueryErrorKind::Execute, sql, e))?;

        let mut out = Vec::new();
        while let Some(row) = rows
            .next()
            .map_err(|e| Error::from_driver(QueryErrorKind::Execute, sql, e))?
        {
            let mut values = Vec::with_capacity(columns);
            for idx in 0..columns {
                let value = row
                    .get_ref(idx)
                    .map_err(|e| Error::from_driver(QueryErrorKind::Execute, sql, e))?;
                values.push(from_sqlite(value, sql)?);
            }
            out.push(values);
        }
        Ok(out)
    }
}

impl Connection for SqliteConnection {
    type Driver = Dialect;
    type Statement<'conn>
        = SqliteStatement<'conn>
    where
        Self: 'conn;

    fn driver(&self) -> &Dialect {
        &Dialect::Sqlite
    }

    fn prepare<'conn>(&'conn self, sql: &str) -> Result<SqliteStatement<'conn>> {
        tracing::trace!(sql = %sql, "Preparing statement");
        let stmt = self
            .conn
            .prepare(sql)
            .map_err(|e| Error::from_driver(QueryErrorKind::Prepare, sql, e))?;
        Ok(SqliteStatement {
            conn: &self.conn,
            stmt,
            sql: sql.to_string(),
            last_insert_id: Value::Null,
        })
    }
}

/// A prepared statement on a [`SqliteConnection`].
pub struct SqliteStatement<'conn> {
    conn: &'conn rusqlite::Connection,
    stmt: rusqlite::Statement<'conn>,
    sql: String,
    last_insert_id: Value,
}

impl Statement for SqliteStatement<'_> {
    fn bind(&mut self, position: usize, value: &Value) -> Result<()> {
        // SQLite parameters are 1-based.
        self.stmt
            .raw_bind_parameter(position + 1, to_sqlite(value))
            .map_err(|e| Error::from_driver(QueryErrorKind::Bind, &self.sql, e))
    }

    fn execute(&mut self) -> Result<u64> {
        let changed = self
            .stmt
            .raw_execute()
            .map_err(|e| Error::from_driver(QueryErrorKind::Execute, &self.sql, e))?;

        let rowid = self.conn.last_insert_rowid();
        self.last_insert_id = if rowid == 0 {
            Value::Null
        } else {
            Value::BigInt(rowid)
        };
        Ok(changed as u64)
    }

    fn last_insert_id(&self) -> Value {
        self.last_insert_id.clone()
    }
}

fn to_sqlite(value: &Value) -> SqliteValue {
    match value {
        Value::Null => SqliteValue::Null,
        Value::Bool(b) => SqliteValue::Integer(i64::from(*b)),
        Value::BigInt(v) | Value::Timestamp(v) => SqliteValue::Integer(*v),
        Value::Double(v) => SqliteValue::Real(*v),
        Value::Text(s) => SqliteValue::Text(s.clone()),
    }
}

fn from_sqlite(value: ValueRef<'_>, sql: &str) -> Result<Value> {
    match value {
        ValueRef::Null => Ok(Value::Null),
        ValueRef::Integer(v) => Ok(Value::BigInt(v)),
        ValueRef::Real(v) => Ok(Value::Double(v)),
        ValueRef::Text(bytes) => Ok(Value::Text(String::from_utf8_lossy(bytes).into_owned())),
        ValueRef::Blob(_) => Err(Error::query(
            QueryErrorKind::Execute,
            Some(sql),
            "blob columns are not supported",
        )),
    }
}

fn connection_error(kind: ConnectionErrorKind, message: &str, source: rusqlite::Error) -> Error {
    Error::Connection(ConnectionError {
        kind,
        message: format!("{}: {}", message, source),
        source: Some(Box::new(source)),
    })
}
