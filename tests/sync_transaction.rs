//! Tests for sync transaction behavior

mod common;

use std::sync::atomic::{AtomicU32, Ordering};

use common::{ERROR_ABORT, ERROR_OBJECT_MISSING, FakeServer, SharedDb};
use zero_teradata::error::Error;
use zero_teradata::sync::Conn;

static TABLE_COUNTER: AtomicU32 = AtomicU32::new(0);

struct TestTable {
    name: String,
}

impl TestTable {
    fn new(conn: &mut Conn<FakeServer>) -> Self {
        let id = TABLE_COUNTER.fetch_add(1, Ordering::SeqCst);
        let name = format!("tx_test_{}", id);
        conn.execute_update(&format!("CREATE TABLE {} (id INTEGER, value INTEGER)", name))
            .unwrap();
        Self { name }
    }

    fn insert(&self, conn: &mut Conn<FakeServer>, id: i32) -> zero_teradata::error::Result<()> {
        conn.execute_update(&format!("INSERT INTO {} VALUES ({}, 42)", self.name, id))?;
        Ok(())
    }

    fn count(&self, conn: &mut Conn<FakeServer>) -> i64 {
        let records = conn
            .entries(&format!("SELECT COUNT(*) FROM {}", self.name))
            .unwrap();
        records[0].get(0_usize).unwrap()
    }
}

fn last_request(conn: &Conn<FakeServer>) -> &str {
    conn.transport().requests().last().unwrap()
}

#[test]
fn transaction_explicit_commit() {
    let db = SharedDb::new();
    let mut conn = db.connect();
    let table = TestTable::new(&mut conn);

    conn.transaction(|conn, tx| {
        table.insert(conn, 1)?;
        tx.commit(conn)
    })
    .unwrap();

    assert!(!conn.in_transaction());
    assert_eq!(table.count(&mut conn), 1);
}

#[test]
fn transaction_implicit_commit_on_ok() {
    let db = SharedDb::new();
    let mut conn = db.connect();
    let table = TestTable::new(&mut conn);

    let value = conn
        .transaction(|conn, _tx| {
            assert!(conn.in_transaction());
            table.insert(conn, 1)?;
            table.insert(conn, 2)?;
            Ok(7)
        })
        .unwrap();

    assert_eq!(value, 7);
    assert_eq!(last_request(&conn), "END TRANSACTION");
    assert_eq!(table.count(&mut conn), 2);
}

#[test]
fn transaction_explicit_abort() {
    let db = SharedDb::new();
    let mut conn = db.connect();
    let table = TestTable::new(&mut conn);

    let result = conn.transaction(|conn, tx| {
        table.insert(conn, 1)?;
        tx.abort(conn)
    });

    let err = result.unwrap_err();
    assert!(err.is_user_abort());
    assert_eq!(err.sql_error().unwrap().code, ERROR_ABORT);
    assert!(!conn.in_transaction());
    // ABORT is sent once, by the token
    assert_eq!(
        conn.transport()
            .requests()
            .iter()
            .filter(|r| *r == "ABORT")
            .count(),
        1
    );
    assert_eq!(table.count(&mut conn), 0);
}

#[test]
fn transaction_aborts_on_sql_error() {
    let db = SharedDb::new();
    let mut conn = db.connect();
    let table = TestTable::new(&mut conn);

    let result = conn.transaction(|conn, _tx| {
        table.insert(conn, 1)?;
        conn.execute_update("DELETE FROM missing")?;
        Ok(())
    });

    let err = result.unwrap_err();
    assert!(matches!(err, Error::SqlError(_)));
    assert_eq!(err.sql_error().unwrap().code, ERROR_OBJECT_MISSING);
    assert_eq!(last_request(&conn), "ABORT");
    assert!(!conn.in_transaction());
    assert_eq!(table.count(&mut conn), 0);
}

#[test]
fn transaction_aborts_on_user_error() {
    let db = SharedDb::new();
    let mut conn = db.connect();
    let table = TestTable::new(&mut conn);

    let result: zero_teradata::error::Result<()> = conn.transaction(|conn, _tx| {
        table.insert(conn, 1)?;
        Err(Error::BadUsageError("changed my mind".to_string()))
    });

    assert!(matches!(result, Err(Error::BadUsageError(_))));
    assert_eq!(table.count(&mut conn), 0);
}

#[test]
fn transaction_nested_is_rejected() {
    let db = SharedDb::new();
    let mut conn = db.connect();
    let table = TestTable::new(&mut conn);

    conn.transaction(|conn, _tx| {
        table.insert(conn, 1)?;
        let nested = conn.transaction(|_conn, _tx| Ok(()));
        assert!(matches!(nested, Err(Error::BadUsageError(_))));
        assert!(conn.in_transaction());
        Ok(())
    })
    .unwrap();

    assert_eq!(table.count(&mut conn), 1);
}

#[test]
fn abort_outside_transaction() {
    let db = SharedDb::new();
    let mut conn = db.connect();
    assert!(matches!(conn.abort(), Err(Error::UserAbort(_))));
    assert!(!conn.in_transaction());
}

#[test]
fn transactions_are_isolated_per_session() {
    let db = SharedDb::new();
    let mut first = db.connect();
    let mut second = db.connect();
    let table = TestTable::new(&mut first);
    table.insert(&mut second, 1).unwrap();

    let result = first.transaction(|conn, tx| {
        table.insert(conn, 2)?;
        tx.abort(conn)
    });
    assert!(result.unwrap_err().is_user_abort());
    assert_eq!(table.count(&mut second), 1);
}
