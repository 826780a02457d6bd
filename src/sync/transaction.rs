use super::Conn;
use super::transport::Transport;
use crate::error::Result;

/// Token for an open transaction, handed to the closure of
/// `Conn::transaction`.
///
/// Ending the transaction through the token makes `Conn::transaction` skip
/// its own `END TRANSACTION`.
pub struct Transaction {
    _private: (),
}

impl Transaction {
    pub(crate) fn new() -> Self {
        Self { _private: () }
    }

    /// Commit with `END TRANSACTION`
    pub fn commit<T: Transport>(self, conn: &mut Conn<T>) -> Result<()> {
        conn.end_transaction()
    }

    /// Roll back with `ABORT`.
    ///
    /// The database answers `ABORT` with a 3514 failure, so a successful
    /// rollback returns `Error::UserAbort`.
    pub fn abort<T: Transport>(self, conn: &mut Conn<T>) -> Result<()> {
        conn.abort()
    }
}
