//! SQL column types and dialects.

/// SQL dialect a statement is rendered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    /// SQLite.
    #[default]
    Sqlite,
    /// PostgreSQL.
    Postgres,
    /// MySQL / MariaDB.
    Mysql,
}

impl Dialect {
    /// Quote an identifier for this dialect.
    ///
    /// Embedded quote characters are doubled.
    pub fn quote_identifier(self, name: &str) -> String {
        match self {
            Dialect::Sqlite | Dialect::Postgres => crate::identifiers::quote_ident(name),
            Dialect::Mysql => crate::identifiers::quote_ident_mysql(name),
        }
    }

    /// Render the placeholder for the parameter at `index` (1-based).
    pub fn placeholder(self, index: usize) -> String {
        match self {
            Dialect::Postgres => format!("${}", index),
            Dialect::Sqlite | Dialect::Mysql => "?".to_string(),
        }
    }

    /// Keyword appended to an auto-incrementing primary key column.
    ///
    /// PostgreSQL expresses this through the column type instead.
    pub const fn auto_increment_keyword(self) -> Option<&'static str> {
        match self {
            Dialect::Sqlite => Some("AUTOINCREMENT"),
            Dialect::Mysql => Some("AUTO_INCREMENT"),
            Dialect::Postgres => None,
        }
    }
}

/// Column types understood by the field declarations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    /// 32-bit integer (`INTEGER`).
    Integer,
    /// 64-bit integer (`BIGINT`).
    BigInt,
    /// Double precision float.
    Double,
    /// Unbounded text.
    Text,
    /// Bounded text.
    VarChar(u32),
    /// Boolean.
    Boolean,
    /// Date and time.
    DateTime,
}

impl SqlType {
    /// The type name used in DDL for the given dialect.
    pub fn sql_name(self, dialect: Dialect) -> String {
        match (self, dialect) {
            (SqlType::Integer, _) => "INTEGER".to_string(),
            (SqlType::BigInt, _) => "BIGINT".to_string(),
            (SqlType::Double, Dialect::Sqlite) => "REAL".to_string(),
            (SqlType::Double, Dialect::Postgres) => "DOUBLE PRECISION".to_string(),
            (SqlType::Double, Dialect::Mysql) => "DOUBLE".to_string(),
            (SqlType::Text, _) => "TEXT".to_string(),
            (SqlType::VarChar(len), _) => format!("VARCHAR({})", len),
            (SqlType::Boolean, _) => "BOOLEAN".to_string(),
            (SqlType::DateTime, Dialect::Postgres) => "TIMESTAMP".to_string(),
            (SqlType::DateTime, Dialect::Sqlite | Dialect::Mysql) => "DATETIME".to_string(),
        }
    }

    /// The serial type PostgreSQL uses for an auto-incrementing column of this type.
    pub const fn postgres_serial(self) -> Option<&'static str> {
        match self {
            SqlType::Integer => Some("SERIAL"),
            SqlType::BigInt => Some("BIGSERIAL"),
            _ => None,
        }
    }
}
