//! Foreign-key metadata.
//!
//! A foreign-key field carries a [`ForeignKeyInfo`] naming the referenced
//! table and column. External relationship code enumerates them through
//! `Model::foreign_keys` and matches targets against other models' table
//! names or table numbers.

/// Referential action for foreign key constraints (ON DELETE / ON UPDATE).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReferentialAction {
    /// Reject the change while referencing rows exist (checked at commit).
    #[default]
    NoAction,
    /// Reject the change immediately.
    Restrict,
    /// Apply the delete or update to referencing rows.
    Cascade,
    /// Set the referencing column to NULL.
    SetNull,
    /// Set the referencing column to its default.
    SetDefault,
}

impl ReferentialAction {
    /// Keyword rendered after ON DELETE / ON UPDATE.
    #[must_use]
    pub const fn as_sql(&self) -> &'static str {
        match self {
            ReferentialAction::NoAction => "NO ACTION",
            ReferentialAction::Restrict => "RESTRICT",
            ReferentialAction::Cascade => "CASCADE",
            ReferentialAction::SetNull => "SET NULL",
            ReferentialAction::SetDefault => "SET DEFAULT",
        }
    }
}

/// The model and column a foreign-key field points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyInfo {
    /// Referenced table name.
    pub target_table: String,
    /// Referenced column, usually the target's primary key.
    pub target_column: String,
    /// ON DELETE action, rendered only when set.
    pub on_delete: Option<ReferentialAction>,
    /// ON UPDATE action, rendered only when set.
    pub on_update: Option<ReferentialAction>,
}

impl ForeignKeyInfo {
    /// Reference `target_table.target_column`.
    pub fn new(target_table: impl Into<String>, target_column: impl Into<String>) -> Self {
        Self {
            target_table: target_table.into(),
            target_column: target_column.into(),
            on_delete: None,
            on_update: None,
        }
    }

    /// Set the ON DELETE action.
    #[must_use]
    pub fn on_delete(mut self, action: ReferentialAction) -> Self {
        self.on_delete = Some(action);
        self
    }

    /// Set the ON UPDATE action.
    #[must_use]
    pub fn on_update(mut self, action: ReferentialAction) -> Self {
        self.on_update = Some(action);
        self
    }

    /// Whether this key points at `table`.
    pub fn targets(&self, table: &str) -> bool {
        self.target_table == table
    }
}
