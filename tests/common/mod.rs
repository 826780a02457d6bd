//! An in-memory stand-in for a Teradata session.
//!
//! Understands just enough SQL over INTEGER tables to exercise the parcel
//! layer: CREATE/DROP TABLE, INSERT ... VALUES, DELETE FROM, SELECT * with
//! ORDER BY 1 [DESC], SELECT COUNT(*), HELP SESSION and the transaction
//! statements. Several servers may share one database to model concurrent
//! sessions.

#![allow(dead_code)]

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};

use zero_teradata::error::{Error, Result};
use zero_teradata::protocol::parcel::{Parcel, PrepInfoColumn};
use zero_teradata::script::Response;
use zero_teradata::sync::{Conn, Transport};
use zero_teradata::value::Value;

pub const ERROR_OBJECT_MISSING: u16 = 3807;
pub const ERROR_OBJECT_EXISTS: u16 = 3803;
pub const ERROR_SYNTAX: u16 = 3706;
pub const ERROR_ABORT: u16 = 3514;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

#[derive(Debug, Clone)]
struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Option<i32>>>,
}

type Tables = BTreeMap<String, Table>;

/// Tables shared by every server created from it
#[derive(Debug, Clone, Default)]
pub struct SharedDb(Arc<Mutex<Tables>>);

impl SharedDb {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn server(&self) -> FakeServer {
        FakeServer {
            db: self.clone(),
            snapshot: None,
            pending: VecDeque::new(),
            requests: Vec::new(),
            logged_on: true,
            in_request: false,
        }
    }

    pub fn connect(&self) -> Conn<FakeServer> {
        init_tracing();
        Conn::new(self.server(), "dbc/tester,secret").unwrap()
    }

    pub fn row_count(&self, table: &str) -> usize {
        self.0.lock().unwrap()[table].rows.len()
    }
}

type Outcome = std::result::Result<Statement, (u16, String)>;

enum Statement {
    Done(u32),
    Rows {
        columns: Vec<String>,
        rows: Vec<Vec<Value>>,
    },
    Text {
        columns: Vec<String>,
        row: Vec<Value>,
    },
    Abort,
}

pub struct FakeServer {
    db: SharedDb,
    /// Tables as of BEGIN TRANSACTION
    snapshot: Option<Tables>,
    pending: VecDeque<Parcel>,
    requests: Vec<String>,
    logged_on: bool,
    in_request: bool,
}

impl FakeServer {
    /// Request texts received so far
    pub fn requests(&self) -> &[String] {
        &self.requests
    }

    fn respond(&mut self, text: &str) -> Result<Vec<Parcel>> {
        let mut response = Response::new();
        for sql in text.replace('\r', " ").split(';') {
            let sql = sql.trim();
            if sql.is_empty() {
                continue;
            }
            match self.execute(sql) {
                Ok(Statement::Done(count)) => response = response.success(count),
                Ok(Statement::Rows { columns, rows }) => {
                    let names: Vec<PrepInfoColumn<'_>> = columns
                        .iter()
                        .map(|name| PrepInfoColumn::named(name, 497, 4))
                        .collect();
                    response = response.rows(&names, &rows)?;
                }
                Ok(Statement::Text { columns, row }) => {
                    let names: Vec<PrepInfoColumn<'_>> = columns
                        .iter()
                        .map(|name| PrepInfoColumn::named(name, 449, 60))
                        .collect();
                    response = response.rows(&names, &[row])?;
                }
                Ok(Statement::Abort) => {
                    return Ok(response
                        .failure(ERROR_ABORT, "User-generated transaction ABORT.")
                        .into_parcels());
                }
                Err((code, message)) => {
                    return Ok(response.failure(code, &message).into_parcels());
                }
            }
        }
        Ok(response.into_parcels())
    }

    fn execute(&mut self, sql: &str) -> Outcome {
        let upper = sql.to_ascii_uppercase();
        let words: Vec<&str> = upper.split_whitespace().collect();
        match words.as_slice() {
            ["BEGIN", "TRANSACTION"] | ["BT"] => {
                self.snapshot = Some(self.db.0.lock().unwrap().clone());
                Ok(Statement::Done(0))
            }
            ["END", "TRANSACTION"] | ["ET"] => {
                self.snapshot = None;
                Ok(Statement::Done(0))
            }
            ["ABORT"] | ["ROLLBACK"] => {
                if let Some(snapshot) = self.snapshot.take() {
                    *self.db.0.lock().unwrap() = snapshot;
                }
                Ok(Statement::Abort)
            }
            ["HELP", "SESSION"] => Ok(Statement::Text {
                columns: ["User Name", "Account Name", "Logon Date", "Logon Time"]
                    .map(String::from)
                    .to_vec(),
                row: ["TESTER", "ACCT", "10/19/26", "09:00:00"]
                    .map(|s| Value::Text(s.to_string()))
                    .to_vec(),
            }),
            ["CREATE", "TABLE", ..] => self.create(sql),
            ["DROP", "TABLE", name] => {
                let name = name.to_lowercase();
                match self.db.0.lock().unwrap().remove(&name) {
                    Some(_) => Ok(Statement::Done(0)),
                    None => Err(missing(&name)),
                }
            }
            ["INSERT", "INTO", name, ..] => self.insert(&name.to_lowercase(), sql),
            ["DELETE", "FROM", name] => {
                let name = name.to_lowercase();
                let mut db = self.db.0.lock().unwrap();
                let table = db.get_mut(&name).ok_or_else(|| missing(&name))?;
                let count = table.rows.len() as u32;
                table.rows.clear();
                Ok(Statement::Done(count))
            }
            ["SELECT", "COUNT(*)", "FROM", name] => {
                let name = name.to_lowercase();
                let db = self.db.0.lock().unwrap();
                let table = db.get(&name).ok_or_else(|| missing(&name))?;
                Ok(Statement::Rows {
                    columns: vec!["Count(*)".to_string()],
                    rows: vec![vec![Value::Integer(table.rows.len() as i32)]],
                })
            }
            ["SELECT", "*", "FROM", name, rest @ ..] => {
                let descending = match rest {
                    [] | ["ORDER", "BY", "1"] => false,
                    ["ORDER", "BY", "1", "DESC"] => true,
                    _ => return Err(syntax(sql)),
                };
                self.select(&name.to_lowercase(), !rest.is_empty(), descending)
            }
            _ => Err(syntax(sql)),
        }
    }

    fn create(&mut self, sql: &str) -> Outcome {
        let open = sql.find('(').ok_or_else(|| syntax(sql))?;
        let close = sql.rfind(')').ok_or_else(|| syntax(sql))?;
        let name = sql[..open]
            .split_whitespace()
            .nth(2)
            .ok_or_else(|| syntax(sql))?
            .to_lowercase();
        let columns: Vec<String> = sql[open + 1..close]
            .split(',')
            .filter_map(|c| c.split_whitespace().next())
            .map(str::to_string)
            .collect();
        let mut db = self.db.0.lock().unwrap();
        if db.contains_key(&name) {
            return Err((
                ERROR_OBJECT_EXISTS,
                format!("Table '{}' already exists.", name),
            ));
        }
        db.insert(
            name,
            Table {
                columns,
                rows: Vec::new(),
            },
        );
        Ok(Statement::Done(0))
    }

    fn insert(&mut self, name: &str, sql: &str) -> Outcome {
        let open = sql.rfind('(').ok_or_else(|| syntax(sql))?;
        let close = sql.rfind(')').ok_or_else(|| syntax(sql))?;
        let row = sql[open + 1..close]
            .split(',')
            .map(|v| match v.trim() {
                n if n.eq_ignore_ascii_case("NULL") => Ok(None),
                n => n.parse::<i32>().map(Some).map_err(|_| syntax(sql)),
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let mut db = self.db.0.lock().unwrap();
        let table = db.get_mut(name).ok_or_else(|| missing(name))?;
        if row.len() != table.columns.len() {
            return Err(syntax(sql));
        }
        table.rows.push(row);
        Ok(Statement::Done(1))
    }

    fn select(&mut self, name: &str, ordered: bool, descending: bool) -> Outcome {
        let db = self.db.0.lock().unwrap();
        let table = db.get(name).ok_or_else(|| missing(name))?;
        let mut rows = table.rows.clone();
        if ordered {
            rows.sort_by_key(|row| row.first().copied().flatten());
        }
        if descending {
            rows.reverse();
        }
        Ok(Statement::Rows {
            columns: table.columns.clone(),
            rows: rows
                .into_iter()
                .map(|row| {
                    row.into_iter()
                        .map(|v| v.map_or(Value::Null, Value::Integer))
                        .collect()
                })
                .collect(),
        })
    }
}

fn missing(name: &str) -> (u16, String) {
    (
        ERROR_OBJECT_MISSING,
        format!("Object '{}' does not exist.", name),
    )
}

fn syntax(sql: &str) -> (u16, String) {
    (ERROR_SYNTAX, format!("Syntax error: {}", sql))
}

impl Transport for FakeServer {
    fn send_request(&mut self, request: &[u8]) -> Result<()> {
        if !self.logged_on {
            return Err(Error::TransportError("session is logged off".to_string()));
        }
        if self.in_request {
            return Err(Error::TransportError("request already active".to_string()));
        }
        let text = String::from_utf8(request.to_vec())
            .map_err(|e| Error::TransportError(format!("request is not UTF-8: {}", e)))?;
        self.pending = self.respond(&text)?.into();
        self.requests.push(text);
        self.in_request = true;
        Ok(())
    }

    fn fetch(&mut self, buffer: &mut Vec<u8>) -> Result<u16> {
        let parcel = self
            .pending
            .pop_front()
            .ok_or_else(|| Error::TransportError("request exhausted".to_string()))?;
        buffer.clear();
        buffer.extend_from_slice(&parcel.payload);
        Ok(parcel.flavor.code())
    }

    fn end_request(&mut self) -> Result<()> {
        self.pending.clear();
        self.in_request = false;
        Ok(())
    }

    fn is_logged_on(&self) -> bool {
        self.logged_on
    }

    fn logoff(&mut self) -> Result<()> {
        self.logged_on = false;
        Ok(())
    }
}
