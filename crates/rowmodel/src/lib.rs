//! rowmodel: declare table models at runtime and persist rows with
//! generated SQL.
//!
//! A [`Model`] is a table definition plus the values of one current row.
//! Declare its fields, call [`Model::init`] to resolve the primary key, then
//! reuse it: assign values, [`Model::save`] (INSERT for a new row, UPDATE of
//! the modified columns otherwise), [`Model::remove`], and
//! [`Model::reset_modified`] between rows. Several rows can be collected with
//! [`Model::add_in_batch`] and written by one multi-row INSERT through
//! [`Model::save_batch`].
//!
//! Every persistence call takes the [`Connection`] to run on. The `sqlite`
//! feature (on by default) provides one backed by rusqlite.
//!
//! ```
//! use rowmodel::prelude::*;
//!
//! let conn = SqliteConnection::open_in_memory().unwrap();
//!
//! let mut heroes = Model::new("heroes");
//! heroes.string_field("name").unwrap();
//! heroes.int_field("age").unwrap();
//! heroes.init().unwrap();
//! heroes.create_table(&conn).unwrap();
//!
//! heroes.set("name", "Spider-Boy").unwrap();
//! heroes.set("age", 16).unwrap();
//! heroes.save(&conn, false).unwrap();
//! heroes.reset_modified();
//!
//! heroes.set("age", 17).unwrap();
//! assert_eq!(heroes.save(&conn, false).unwrap(), 1);
//! ```

pub use rowmodel_core::*;

#[cfg(feature = "sqlite")]
pub use rowmodel_sqlite::{SqliteConfig, SqliteConnection, SqliteStatement};

/// The types most programs need.
pub mod prelude {
    pub use rowmodel_core::{
        Connection, Dialect, Driver, Error, FieldInfo, FieldRef, ForeignKeyInfo, Model,
        ReferentialAction, Result, RowsAffected, SqlType, Statement, Value,
    };

    #[cfg(feature = "sqlite")]
    pub use rowmodel_sqlite::{SqliteConfig, SqliteConnection};
}
