//! Runtime-declared table models.
//!
//! A [`Model`] is declared once (fields, then [`Model::init`]) and then
//! reused for many rows: callers assign values, call [`Model::save`] or
//! [`Model::remove`], reset the modified flags, and repeat.
//!
//! # Example
//!
//! ```
//! use rowmodel_core::{Dialect, Model};
//!
//! let mut heroes = Model::new("heroes");
//! heroes.string_field("name").unwrap();
//! heroes.int_field("age").unwrap();
//! heroes.init().unwrap();
//!
//! // No key was declared, so `id` was added in front.
//! assert_eq!(heroes.field(0).unwrap().name(), "id");
//!
//! heroes.set("name", "Deadpond").unwrap();
//! heroes.set("age", 30).unwrap();
//! heroes.add_in_batch().unwrap();
//!
//! let (sql, params) = heroes.insert_sql(&Dialect::Sqlite).unwrap().unwrap();
//! assert_eq!(sql, r#"INSERT INTO "heroes" ("name", "age") VALUES (?, ?);"#);
//! assert_eq!(params.len(), 2);
//! ```

use crate::connection::{Connection, Driver, IdentifierKind, Statement};
use crate::error::{BatchError, Error, Result, SchemaErrorKind};
use crate::field::{FieldInfo, FieldRef};
use crate::fields_set::FieldsSet;
use crate::identifiers::is_valid_identifier;
use crate::relationship::ForeignKeyInfo;
use crate::types::SqlType;
use crate::value::Value;

/// Number of rows a statement touched.
pub type RowsAffected = u64;

/// A table definition bundled with the current row's values and a pending
/// insert batch.
#[derive(Debug, Clone)]
pub struct Model {
    table_name: String,
    table_number: i32,
    fields: Vec<FieldInfo>,
    values: Vec<Value>,
    modified: FieldsSet,
    /// Index into `fields`; `None` until `init()`.
    primary_key: Option<usize>,
    batch: Vec<Vec<Value>>,
}

impl Model {
    /// Create an empty model for `table_name`.
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            table_number: 0,
            fields: Vec::new(),
            values: Vec::new(),
            modified: FieldsSet::empty(0),
            primary_key: None,
            batch: Vec::new(),
        }
    }

    // ========================================================================
    // Declaration
    // ========================================================================

    /// Unquoted table name.
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Rename the table. The name must be a valid identifier.
    pub fn set_table_name(&mut self, table_name: impl Into<String>) -> Result<()> {
        let table_name = table_name.into();
        if !is_valid_identifier(&table_name) {
            return Err(Error::schema(
                SchemaErrorKind::InvalidName,
                &table_name,
                "invalid table name",
            ));
        }
        self.table_name = table_name;
        Ok(())
    }

    /// Opaque ordinal used by relationship code to tell models apart.
    pub fn table_number(&self) -> i32 {
        self.table_number
    }

    /// Assign the ordinal returned by [`Model::table_number`].
    pub fn set_table_number(&mut self, table_number: i32) {
        self.table_number = table_number;
    }

    /// Declare a field. Returns its index in column order.
    pub fn add_field(&mut self, field: FieldInfo) -> Result<usize> {
        if self.is_initialized() {
            return Err(Error::schema(
                SchemaErrorKind::AlreadyInitialized,
                &self.table_name,
                format!("cannot declare field {} after init()", field.name),
            ));
        }
        if !is_valid_identifier(&field.name) {
            return Err(Error::schema(
                SchemaErrorKind::InvalidName,
                &self.table_name,
                format!("invalid column name {:?}", field.name),
            ));
        }
        if self.index_of(&field.name).is_some() {
            return Err(Error::schema(
                SchemaErrorKind::DuplicateField,
                &self.table_name,
                format!("column {} declared twice", field.name),
            ));
        }

        self.fields.push(field);
        self.values.push(Value::Null);
        self.modified.push();
        Ok(self.fields.len() - 1)
    }

    /// Declare a text field.
    pub fn string_field(&mut self, name: impl Into<String>) -> Result<usize> {
        self.add_field(FieldInfo::new(name, SqlType::Text))
    }

    /// Declare an integer field.
    pub fn int_field(&mut self, name: impl Into<String>) -> Result<usize> {
        self.add_field(FieldInfo::new(name, SqlType::Integer))
    }

    /// Declare a floating point field.
    pub fn double_field(&mut self, name: impl Into<String>) -> Result<usize> {
        self.add_field(FieldInfo::new(name, SqlType::Double))
    }

    /// Declare a date/time field.
    pub fn date_time_field(&mut self, name: impl Into<String>) -> Result<usize> {
        self.add_field(FieldInfo::new(name, SqlType::DateTime))
    }

    /// Declare an integer field referencing `target_table.target_column`.
    pub fn foreign_key_field(
        &mut self,
        name: impl Into<String>,
        target_table: impl Into<String>,
        target_column: impl Into<String>,
    ) -> Result<usize> {
        self.add_field(
            FieldInfo::new(name, SqlType::Integer)
                .references(ForeignKeyInfo::new(target_table, target_column)),
        )
    }

    /// Resolve the primary key. Must run once, after every field is declared.
    ///
    /// The first field flagged as primary key wins; later flags are cleared.
    /// Without one, an auto-increment integer `id` is inserted at index 0.
    pub fn init(&mut self) -> Result<()> {
        if self.is_initialized() {
            return Err(Error::schema(
                SchemaErrorKind::AlreadyInitialized,
                &self.table_name,
                "init() called twice",
            ));
        }
        if !is_valid_identifier(&self.table_name) {
            return Err(Error::schema(
                SchemaErrorKind::InvalidName,
                &self.table_name,
                "invalid table name",
            ));
        }

        let mut found = None;
        for (idx, field) in self.fields.iter_mut().enumerate() {
            if !field.primary_key {
                continue;
            }
            if found.is_none() {
                found = Some(idx);
            } else {
                tracing::warn!(
                    table = %self.table_name,
                    column = %field.name,
                    "Ignoring extra primary key declaration"
                );
                field.primary_key = false;
            }
        }

        let pk = if let Some(idx) = found {
            idx
        } else {
            if self.index_of("id").is_some() {
                return Err(Error::schema(
                    SchemaErrorKind::DuplicateField,
                    &self.table_name,
                    "no primary key declared and column id is taken",
                ));
            }
            self.fields.insert(0, FieldInfo::implicit_primary_key());
            self.values.insert(0, Value::Null);
            self.modified.insert_front();
            0
        };

        self.primary_key = Some(pk);
        tracing::debug!(
            table = %self.table_name,
            primary_key = %self.fields[pk].name,
            fields = self.fields.len(),
            "Model initialized"
        );
        Ok(())
    }

    /// Whether `init()` has resolved the primary key.
    pub fn is_initialized(&self) -> bool {
        self.primary_key.is_some()
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    /// Number of declared fields, including a synthesized key.
    pub fn fields_count(&self) -> usize {
        self.fields.len()
    }

    /// The field at `index`, if any.
    pub fn field(&self, index: usize) -> Option<FieldRef<'_>> {
        let info = self.fields.get(index)?;
        Some(FieldRef {
            index,
            info,
            value: &self.values[index],
            modified: self.modified.is_set(index),
        })
    }

    pub fn field_by_name(&self, name: &str) -> Option<FieldRef<'_>> {
        self.index_of(name).and_then(|idx| self.field(idx))
    }

    /// Fields in column order.
    pub fn fields(&self) -> impl Iterator<Item = FieldRef<'_>> + '_ {
        (0..self.fields.len()).filter_map(move |idx| self.field(idx))
    }

    /// Column index of `name`.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// The primary key field; `None` before `init()`.
    pub fn pk(&self) -> Option<FieldRef<'_>> {
        self.primary_key.and_then(|idx| self.field(idx))
    }

    /// The primary key's current value; `None` before `init()`.
    pub fn pk_value(&self) -> Option<&Value> {
        self.primary_key.map(|idx| &self.values[idx])
    }

    pub fn primary_key_index(&self) -> Option<usize> {
        self.primary_key
    }

    /// Foreign-key fields with their targets, in column order.
    pub fn foreign_keys(&self) -> Vec<(FieldRef<'_>, &ForeignKeyInfo)> {
        self.fields()
            .filter_map(|field| field.foreign_key().map(|fk| (field, fk)))
            .collect()
    }

    /// The current row as a JSON object keyed by column name.
    pub fn dump(&self) -> serde_json::Map<String, serde_json::Value> {
        self.fields()
            .map(|f| (f.name().to_string(), f.data().to_json()))
            .collect()
    }

    // ========================================================================
    // Row state
    // ========================================================================

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.index_of(name).map(|idx| &self.values[idx])
    }

    /// Assign a value by column name and mark the field modified.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        let idx = self.require_index(name)?;
        self.set_at(idx, value)
    }

    /// Assign a value by index and mark the field modified.
    pub fn set_at(&mut self, index: usize, value: impl Into<Value>) -> Result<()> {
        self.check_index(index)?;
        self.values[index] = value.into();
        self.modified.set(index);
        Ok(())
    }

    /// Assign a value without touching the modified flag.
    pub fn set_raw(&mut self, index: usize, value: impl Into<Value>) -> Result<()> {
        self.check_index(index)?;
        self.values[index] = value.into();
        Ok(())
    }

    /// Set a field to NULL without touching the modified flag.
    pub fn set_null(&mut self, index: usize) -> Result<()> {
        self.set_raw(index, Value::Null)
    }

    pub fn set_modified(&mut self, index: usize, modified: bool) -> Result<()> {
        self.check_index(index)?;
        self.modified.assign(index, modified);
        Ok(())
    }

    pub fn is_modified(&self, index: usize) -> bool {
        self.modified.is_set(index)
    }

    /// Whether any field was assigned since the last reset.
    pub fn has_modifications(&self) -> bool {
        self.modified.any()
    }

    /// Mark every field clean.
    pub fn reset_modified(&mut self) {
        self.modified.clear();
    }

    // ========================================================================
    // Batch
    // ========================================================================

    /// Drop every pending snapshot.
    pub fn clear_batch(&mut self) {
        self.batch.clear();
    }

    /// Snapshot the current values into the pending batch.
    ///
    /// A NULL primary key is left out so the database can generate it.
    pub fn add_in_batch(&mut self) -> Result<()> {
        let row = self
            .insert_columns()?
            .into_iter()
            .map(|idx| self.values[idx].clone())
            .collect();
        self.batch.push(row);
        Ok(())
    }

    /// Number of pending snapshots.
    pub fn batch_len(&self) -> usize {
        self.batch.len()
    }

    // ========================================================================
    // SQL generation
    // ========================================================================

    /// CREATE TABLE statement listing every field in column order.
    pub fn create_table_sql(&self, driver: &impl Driver) -> String {
        let dialect = driver.dialect();
        let columns: Vec<String> = self
            .fields
            .iter()
            .map(|f| {
                format!(
                    "    {} {}",
                    driver.escape_identifier(&f.name, IdentifierKind::FieldName),
                    f.sql_description(dialect)
                )
            })
            .collect();

        format!(
            "CREATE TABLE {} (\n{}\n);",
            driver.escape_identifier(&self.table_name, IdentifierKind::TableName),
            columns.join(",\n")
        )
    }

    /// Multi-row INSERT for the pending batch, with values in row-major order.
    ///
    /// Returns `None` when the batch is empty.
    pub fn insert_sql(&self, driver: &impl Driver) -> Result<Option<(String, Vec<Value>)>> {
        let columns = self.insert_columns()?;
        if self.batch.is_empty() {
            return Ok(None);
        }

        for (row, snapshot) in self.batch.iter().enumerate() {
            if snapshot.len() != columns.len() {
                return Err(Error::Batch(BatchError {
                    table: self.table_name.clone(),
                    row,
                    expected: columns.len(),
                    actual: snapshot.len(),
                }));
            }
        }

        let table = driver.escape_identifier(&self.table_name, IdentifierKind::TableName);
        if columns.is_empty() {
            // DEFAULT VALUES cannot be repeated within one statement.
            if self.batch.len() > 1 {
                return Err(Error::schema(
                    SchemaErrorKind::NoInsertableColumns,
                    &self.table_name,
                    format!(
                        "{} rows batched but only the generated key column exists",
                        self.batch.len()
                    ),
                ));
            }
            return Ok(Some((
                format!("INSERT INTO {} DEFAULT VALUES;", table),
                Vec::new(),
            )));
        }

        let field_list: Vec<String> = columns
            .iter()
            .map(|idx| driver.escape_identifier(&self.fields[*idx].name, IdentifierKind::FieldName))
            .collect();

        let width = columns.len();
        let groups: Vec<String> = (0..self.batch.len())
            .map(|row| {
                let placeholders: Vec<String> = (1..=width)
                    .map(|col| driver.placeholder(row * width + col))
                    .collect();
                format!("({})", placeholders.join(", "))
            })
            .collect();

        let sql = format!(
            "INSERT INTO {} ({}) VALUES {};",
            table,
            field_list.join(", "),
            groups.join(", ")
        );
        let params = self.batch.iter().flatten().cloned().collect();
        Ok(Some((sql, params)))
    }

    /// UPDATE of the modified fields, keyed on the primary key.
    ///
    /// Returns `None` when no field is modified.
    pub fn update_sql(&self, driver: &impl Driver) -> Result<Option<(String, Vec<Value>)>> {
        let pk = self.require_pk()?;
        let modified: Vec<usize> = self.modified.iter().collect();
        if modified.is_empty() {
            return Ok(None);
        }

        let assignments: Vec<String> = modified
            .iter()
            .enumerate()
            .map(|(pos, idx)| {
                format!(
                    "{}={}",
                    driver.escape_identifier(&self.fields[*idx].name, IdentifierKind::FieldName),
                    driver.placeholder(pos + 1)
                )
            })
            .collect();

        let sql = format!(
            "UPDATE {} SET {} WHERE {}={};",
            driver.escape_identifier(&self.table_name, IdentifierKind::TableName),
            assignments.join(", "),
            driver.escape_identifier(&self.fields[pk].name, IdentifierKind::FieldName),
            driver.placeholder(modified.len() + 1)
        );

        let mut params: Vec<Value> = modified.iter().map(|idx| self.values[*idx].clone()).collect();
        params.push(self.values[pk].clone());
        Ok(Some((sql, params)))
    }

    /// DELETE of the row identified by the primary key.
    pub fn delete_sql(&self, driver: &impl Driver) -> Result<(String, Vec<Value>)> {
        let pk = self.require_pk()?;
        let sql = format!(
            "DELETE FROM {} WHERE {}={};",
            driver.escape_identifier(&self.table_name, IdentifierKind::TableName),
            driver.escape_identifier(&self.fields[pk].name, IdentifierKind::FieldName),
            driver.placeholder(1)
        );
        Ok((sql, vec![self.values[pk].clone()]))
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// Run `create_table_sql` on `conn`.
    #[tracing::instrument(level = "debug", skip(self, conn), fields(table = %self.table_name))]
    pub fn create_table<C: Connection>(&self, conn: &C) -> Result<RowsAffected> {
        let sql = self.create_table_sql(conn.driver());
        tracing::trace!(sql = %sql, "Creating table");
        conn.execute_sql(&sql).inspect_err(|e| {
            tracing::error!(table = %self.table_name, error = %e, "Could not create table");
        })
    }

    /// Insert every pending snapshot with one statement.
    ///
    /// The batch is kept after the call. When the key column was left out of
    /// the insert, it is set to the connection's last insert id, which for a
    /// multi-row insert identifies only one of the rows. A key that was set
    /// explicitly, and therefore inserted, is kept as is.
    #[tracing::instrument(level = "debug", skip(self, conn), fields(table = %self.table_name))]
    pub fn save_batch<C: Connection>(&mut self, conn: &C) -> Result<RowsAffected> {
        let Some((sql, params)) = self.insert_sql(conn.driver())? else {
            tracing::trace!("Batch is empty, nothing to insert");
            return Ok(0);
        };
        let pk = self.require_pk()?;

        tracing::debug!(rows = self.batch.len(), sql = %sql, "Inserting batch");
        let (affected, last_id) = run(conn, &sql, &params).inspect_err(|e| {
            tracing::error!(
                table = %self.table_name,
                rows = self.batch.len(),
                error = %e,
                "Could not save object"
            );
        })?;

        if self.values[pk].is_null() {
            self.values[pk] = last_id;
        }
        Ok(affected)
    }

    /// Insert the current row if it was never persisted (or `force_insert`),
    /// otherwise update its modified fields.
    ///
    /// Modified flags are left as they are; see [`Model::reset_modified`].
    #[tracing::instrument(level = "debug", skip(self, conn), fields(table = %self.table_name))]
    pub fn save<C: Connection>(&mut self, conn: &C, force_insert: bool) -> Result<RowsAffected> {
        let pk = self.require_pk()?;

        if force_insert || self.values[pk].is_null() {
            self.clear_batch();
            self.add_in_batch()?;
            return self.save_batch(conn);
        }

        let Some((sql, params)) = self.update_sql(conn.driver())? else {
            tracing::debug!("No modified fields, skipping update");
            return Ok(0);
        };

        tracing::debug!(sql = %sql, "Updating object");
        run(conn, &sql, &params)
            .map(|(affected, _)| affected)
            .inspect_err(|e| {
                tracing::error!(table = %self.table_name, error = %e, "Could not update object");
            })
    }

    /// Delete the current row. The primary key is NULL afterwards, even when
    /// the statement fails.
    #[tracing::instrument(level = "debug", skip(self, conn), fields(table = %self.table_name))]
    pub fn remove<C: Connection>(&mut self, conn: &C) -> Result<RowsAffected> {
        let pk = self.require_pk()?;
        let (sql, params) = self.delete_sql(conn.driver())?;

        tracing::debug!(sql = %sql, "Deleting object");
        let result = run(conn, &sql, &params);
        self.values[pk] = Value::Null;

        result.map(|(affected, _)| affected).inspect_err(|e| {
            tracing::error!(table = %self.table_name, error = %e, "Could not delete object");
        })
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn require_pk(&self) -> Result<usize> {
        self.primary_key.ok_or_else(|| {
            Error::schema(
                SchemaErrorKind::NotInitialized,
                &self.table_name,
                "init() must run before the model is used",
            )
        })
    }

    fn require_index(&self, name: &str) -> Result<usize> {
        self.index_of(name).ok_or_else(|| {
            Error::schema(
                SchemaErrorKind::UnknownField,
                &self.table_name,
                format!("no column named {}", name),
            )
        })
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.fields.len() {
            Ok(())
        } else {
            Err(Error::schema(
                SchemaErrorKind::UnknownField,
                &self.table_name,
                format!("no column at index {}", index),
            ))
        }
    }

    /// Columns taking part in an INSERT: every field except a NULL primary key.
    fn insert_columns(&self) -> Result<Vec<usize>> {
        let pk = self.require_pk()?;
        Ok((0..self.fields.len())
            .filter(|idx| !(*idx == pk && self.values[pk].is_null()))
            .collect())
    }
}

/// Prepare, bind in order, execute. Returns rows affected and the last insert id.
fn run<C: Connection>(conn: &C, sql: &str, params: &[Value]) -> Result<(RowsAffected, Value)> {
    let mut stmt = conn.prepare(sql)?;
    for (position, value) in params.iter().enumerate() {
        stmt.bind(position, value)?;
    }
    let affected = stmt.execute()?;
    Ok((affected, stmt.last_insert_id()))
}
