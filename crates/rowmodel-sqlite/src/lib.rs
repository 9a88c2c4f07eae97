//! SQLite driver for rowmodel.
//!
//! Wraps a synchronous `rusqlite::Connection` and implements the
//! `rowmodel_core::Connection` contract, so models can be saved and removed
//! against a SQLite file or an in-memory database.
//!
//! ```
//! use rowmodel_core::{Model, Value};
//! use rowmodel_sqlite::SqliteConnection;
//!
//! let conn = SqliteConnection::open_in_memory().unwrap();
//! let mut notes = Model::new("notes");
//! notes.string_field("body").unwrap();
//! notes.init().unwrap();
//! notes.create_table(&conn).unwrap();
//!
//! notes.set("body", "hello").unwrap();
//! notes.save(&conn, false).unwrap();
//! assert_eq!(notes.pk_value(), Some(&Value::BigInt(1)));
//! ```

pub mod config;
pub mod connection;

pub use config::SqliteConfig;
pub use connection::{SqliteConnection, SqliteStatement};
