//! Shared test fixtures: a connection that records every statement instead
//! of talking to a database.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};

use rowmodel::{Connection, Dialect, Error, QueryErrorKind, Result, Statement, Value};

/// One statement as it reached `execute`.
#[derive(Debug, Clone, PartialEq)]
pub struct Executed {
    pub sql: String,
    pub params: Vec<Value>,
}

/// Records prepared SQL and bound values. INSERTs hand out sequential ids.
pub struct RecordingConnection {
    dialect: Dialect,
    log: RefCell<Vec<Executed>>,
    next_id: Cell<i64>,
    fail_on: RefCell<Option<String>>,
}

impl RecordingConnection {
    pub fn new() -> Self {
        Self::with_dialect(Dialect::Sqlite)
    }

    pub fn with_dialect(dialect: Dialect) -> Self {
        Self {
            dialect,
            log: RefCell::new(Vec::new()),
            next_id: Cell::new(1),
            fail_on: RefCell::new(None),
        }
    }

    /// Fail every statement whose SQL contains `fragment`.
    pub fn fail_on(&self, fragment: &str) {
        *self.fail_on.borrow_mut() = Some(fragment.to_string());
    }

    pub fn stop_failing(&self) {
        *self.fail_on.borrow_mut() = None;
    }

    pub fn set_next_id(&self, id: i64) {
        self.next_id.set(id);
    }

    /// Every executed statement, failed ones included.
    pub fn executed(&self) -> Vec<Executed> {
        self.log.borrow().clone()
    }

    pub fn last(&self) -> Option<Executed> {
        self.log.borrow().last().cloned()
    }

    pub fn count(&self) -> usize {
        self.log.borrow().len()
    }
}

impl Connection for RecordingConnection {
    type Driver = Dialect;
    type Statement<'conn>
        = RecordingStatement<'conn>
    where
        Self: 'conn;

    fn driver(&self) -> &Dialect {
        &self.dialect
    }

    fn prepare<'conn>(&'conn self, sql: &str) -> Result<RecordingStatement<'conn>> {
        Ok(RecordingStatement {
            conn: self,
            sql: sql.to_string(),
            params: Vec::new(),
            last_insert_id: Value::Null,
        })
    }
}

pub struct RecordingStatement<'conn> {
    conn: &'conn RecordingConnection,
    sql: String,
    params: Vec<Value>,
    last_insert_id: Value,
}

impl Statement for RecordingStatement<'_> {
    fn bind(&mut self, position: usize, value: &Value) -> Result<()> {
        if self.params.len() <= position {
            self.params.resize(position + 1, Value::Null);
        }
        self.params[position] = value.clone();
        Ok(())
    }

    fn execute(&mut self) -> Result<u64> {
        self.conn.log.borrow_mut().push(Executed {
            sql: self.sql.clone(),
            params: self.params.clone(),
        });

        if let Some(fragment) = self.conn.fail_on.borrow().as_deref() {
            if self.sql.contains(fragment) {
                return Err(Error::query(
                    QueryErrorKind::Execute,
                    Some(&self.sql),
                    "injected failure",
                ));
            }
        }

        if self.sql.starts_with("INSERT") {
            let rows = self.sql.matches("), (").count() as i64 + 1;
            let first = self.conn.next_id.get();
            self.conn.next_id.set(first + rows);
            self.last_insert_id = Value::BigInt(first + rows - 1);
            Ok(rows as u64)
        } else {
            Ok(1)
        }
    }

    fn last_insert_id(&self) -> Value {
        self.last_insert_id.clone()
    }
}

/// Route `tracing` output to the test harness.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// `heroes(id, name, age)` with an implicit key.
pub fn hero_model() -> rowmodel::Model {
    let mut model = rowmodel::Model::new("heroes");
    model.string_field("name").unwrap();
    model.int_field("age").unwrap();
    model.init().unwrap();
    model
}
