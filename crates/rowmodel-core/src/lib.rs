//! Core types and traits for rowmodel.
//!
//! `rowmodel-core` is the **foundation layer**. It defines the runtime
//! [`Model`] and the connection contract that database drivers implement.
//!
//! # Role In The Architecture
//!
//! - **Model layer**: [`Model`] holds a table's field declarations, the
//!   current row's values and modified flags, and a pending insert batch.
//!   It generates INSERT, UPDATE, DELETE and CREATE TABLE statements.
//! - **Contract layer**: [`Connection`], [`Statement`] and [`Driver`] are
//!   implemented by driver crates. Every persistence call takes the
//!   connection explicitly.
//! - **Data model**: [`Value`], [`SqlType`] and [`Dialect`] are shared by the
//!   model and the drivers.
//!
//! # Who Uses This Crate
//!
//! - `rowmodel-sqlite` implements `Connection` on top of rusqlite.
//! - The `rowmodel` facade re-exports everything here.

pub mod connection;
pub mod error;
pub mod field;
pub mod fields_set;
pub mod identifiers;
pub mod model;
pub mod relationship;
pub mod types;
pub mod value;

pub use connection::{Connection, Driver, IdentifierKind, Statement};
pub use error::{
    BatchError, BoxError, ConnectionError, ConnectionErrorKind, Error, QueryError, QueryErrorKind,
    Result, SchemaError, SchemaErrorKind,
};
pub use field::{FieldInfo, FieldKind, FieldRef};
pub use fields_set::FieldsSet;
pub use identifiers::{is_valid_identifier, quote_ident, quote_ident_mysql};
pub use model::{Model, RowsAffected};
pub use relationship::{ForeignKeyInfo, ReferentialAction};
pub use types::{Dialect, SqlType};
pub use value::Value;
