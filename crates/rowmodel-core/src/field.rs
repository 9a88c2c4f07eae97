//! Field (column) declarations.
//!
//! A [`FieldInfo`] is the immutable description of one column: name, type
//! and flags. The live value and modified flag of the current row are kept
//! by the owning `Model`, indexed by the field's position, and surfaced
//! together with the descriptor through [`FieldRef`].

use crate::relationship::ForeignKeyInfo;
use crate::types::{Dialect, SqlType};
use crate::value::Value;

/// Whether a field is a plain column or references another table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldKind {
    /// Ordinary column.
    #[default]
    Scalar,
    /// Column referencing another table's key.
    ForeignKey(ForeignKeyInfo),
}

/// Metadata about a model field/column.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldInfo {
    /// Column name.
    pub name: String,
    /// SQL type for this field.
    pub sql_type: SqlType,
    /// Whether this field is nullable.
    pub nullable: bool,
    /// Whether this is a primary key.
    pub primary_key: bool,
    /// Whether this field auto-increments.
    pub auto_increment: bool,
    /// Whether this field has a unique constraint.
    pub unique: bool,
    /// Default value expression (SQL).
    pub default: Option<String>,
    /// Scalar or foreign key.
    pub kind: FieldKind,
}

impl FieldInfo {
    /// Create a new nullable scalar field.
    pub fn new(name: impl Into<String>, sql_type: SqlType) -> Self {
        Self {
            name: name.into(),
            sql_type,
            nullable: true,
            primary_key: false,
            auto_increment: false,
            unique: false,
            default: None,
            kind: FieldKind::Scalar,
        }
    }

    /// The implicit `id` key added to models that declare none.
    pub fn implicit_primary_key() -> Self {
        Self::new("id", SqlType::Integer)
            .primary_key(true)
            .auto_increment(true)
    }

    /// Set nullable flag.
    pub fn nullable(mut self, value: bool) -> Self {
        self.nullable = value;
        self
    }

    /// Set primary key flag.
    pub fn primary_key(mut self, value: bool) -> Self {
        self.primary_key = value;
        self
    }

    /// Set auto-increment flag.
    pub fn auto_increment(mut self, value: bool) -> Self {
        self.auto_increment = value;
        self
    }

    /// Set unique flag.
    pub fn unique(mut self, value: bool) -> Self {
        self.unique = value;
        self
    }

    /// Set default value expression.
    pub fn default(mut self, expr: impl Into<String>) -> Self {
        self.default = Some(expr.into());
        self
    }

    /// Turn this field into a foreign key.
    pub fn references(mut self, fk: ForeignKeyInfo) -> Self {
        self.kind = FieldKind::ForeignKey(fk);
        self
    }

    /// Whether this field references another table.
    pub fn is_foreign_key(&self) -> bool {
        matches!(self.kind, FieldKind::ForeignKey(_))
    }

    /// The foreign key target, if any.
    pub fn foreign_key(&self) -> Option<&ForeignKeyInfo> {
        match &self.kind {
            FieldKind::ForeignKey(fk) => Some(fk),
            FieldKind::Scalar => None,
        }
    }

    /// Column type and constraints as they appear in CREATE TABLE.
    pub fn sql_description(&self, dialect: Dialect) -> String {
        let serial = match dialect {
            Dialect::Postgres if self.primary_key && self.auto_increment => {
                self.sql_type.postgres_serial()
            }
            _ => None,
        };
        let mut sql = serial.map_or_else(|| self.sql_type.sql_name(dialect), str::to_string);

        if self.primary_key {
            sql.push_str(" PRIMARY KEY");
            if self.auto_increment {
                if let Some(keyword) = dialect.auto_increment_keyword() {
                    sql.push(' ');
                    sql.push_str(keyword);
                }
            }
        } else {
            if !self.nullable {
                sql.push_str(" NOT NULL");
            }
            if self.unique {
                sql.push_str(" UNIQUE");
            }
        }

        if let Some(default) = &self.default {
            sql.push_str(" DEFAULT ");
            sql.push_str(default);
        }

        if let FieldKind::ForeignKey(fk) = &self.kind {
            sql.push_str(&format!(
                " REFERENCES {}({})",
                dialect.quote_identifier(&fk.target_table),
                dialect.quote_identifier(&fk.target_column)
            ));
            if let Some(action) = fk.on_delete {
                sql.push_str(" ON DELETE ");
                sql.push_str(action.as_sql());
            }
            if let Some(action) = fk.on_update {
                sql.push_str(" ON UPDATE ");
                sql.push_str(action.as_sql());
            }
        }

        sql
    }
}

/// Read-only view of one field of a model: its declaration plus the
/// current row's value and modified flag.
#[derive(Debug, Clone, Copy)]
pub struct FieldRef<'a> {
    pub(crate) index: usize,
    pub(crate) info: &'a FieldInfo,
    pub(crate) value: &'a Value,
    pub(crate) modified: bool,
}

impl<'a> FieldRef<'a> {
    /// Position of the field in the model's column order.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> &'a str {
        &self.info.name
    }

    pub fn info(&self) -> &'a FieldInfo {
        self.info
    }

    pub fn is_primary_key(&self) -> bool {
        self.info.primary_key
    }

    pub fn is_auto_increment(&self) -> bool {
        self.info.auto_increment
    }

    pub fn is_nullable(&self) -> bool {
        self.info.nullable
    }

    /// Whether the current value is NULL.
    pub fn is_null(&self) -> bool {
        self.value.is_null()
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// The current value.
    pub fn data(&self) -> &'a Value {
        self.value
    }

    pub fn sql_description(&self, dialect: Dialect) -> String {
        self.info.sql_description(dialect)
    }

    pub fn is_foreign_key(&self) -> bool {
        self.info.is_foreign_key()
    }

    pub fn foreign_key(&self) -> Option<&'a ForeignKeyInfo> {
        self.info.foreign_key()
    }
}
