use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::opts::Opts;
use crate::protocol::status::SuccessStatus;
use crate::record::{FromRecord, Record};
use crate::session::SessionInfo;
use crate::sync::cli::Cli;
use crate::sync::result_set::{FetchedResultSet, ResultSet};
use crate::sync::transaction::Transaction;
use crate::sync::transport::Transport;

/// A logged-on session issuing SQL requests over a `Transport`
pub struct Conn<T: Transport> {
    cli: Cli<T>,
    opts: Opts,
    pub(crate) in_transaction: bool,
}

impl<T: Transport> Conn<T> {
    /// Wrap a transport that is already logged on
    pub fn new<O: TryInto<Opts>>(transport: T, opts: O) -> Result<Self>
    where
        Error: From<O::Error>,
    {
        let opts: Opts = opts.try_into()?;
        if !transport.is_logged_on() {
            return Err(Error::ConnectionError(format!(
                "session {} is not logged on",
                opts.logon.safe_string()
            )));
        }
        info!(
            logon = %opts.logon.safe_string(),
            charset = %opts.session_charset,
            "session opened"
        );
        let extractor = opts.extractor();
        Ok(Self {
            cli: Cli::new(transport, extractor),
            opts,
            in_transaction: false,
        })
    }

    pub fn opts(&self) -> &Opts {
        &self.opts
    }

    pub fn transport(&self) -> &T {
        self.cli.transport()
    }

    pub fn in_transaction(&self) -> bool {
        self.in_transaction
    }

    pub fn is_closed(&self) -> bool {
        !self.cli.is_logged_on()
    }

    /// Log off the session
    pub fn close(&mut self) -> Result<()> {
        if self.is_closed() {
            return Err(Error::ConnectionError("session is already logged off".to_string()));
        }
        info!(logon = %self.opts.logon.safe_string(), "logoff");
        self.cli.logoff()
    }

    /// Unwrap the transport
    pub fn into_transport(self) -> T {
        self.cli.into_transport()
    }

    /// Line terminators become `\r`, then the text is encoded with the
    /// session charset
    fn canonicalize(&self, sql: &str) -> Result<Vec<u8>> {
        let text = sql.replace("\r\n", "\r").replace('\n', "\r");
        self.opts.session_charset.encode(&text)
    }

    /// Send `sql`, hand the head result set to `f`, then discard whatever
    /// `f` left unread and release the request.
    ///
    /// The error of `f` is returned in preference to a cleanup error.
    fn run_request<F, R>(&mut self, sql: &str, f: F) -> Result<R>
    where
        F: FnOnce(ResultSet<'_, T>) -> Result<R>,
    {
        if self.is_closed() {
            return Err(Error::ConnectionError("session is logged off".to_string()));
        }
        let request = self.canonicalize(sql)?;
        self.cli.request(&request)?;

        let result = match self.cli.read_status() {
            Ok(Some(status)) => f(ResultSet::new(&mut self.cli, status)),
            Ok(None) => Err(Error::ConnectionError(
                "request returned no statement status".to_string(),
            )),
            Err(e) => Err(e),
        };

        let skipped = self.cli.skip_request();
        let ended = self.cli.end_request();
        let value = result?;
        skipped?;
        ended?;
        Ok(value)
    }

    /// Run statements that return no rows and collect each statement's
    /// success status
    #[tracing::instrument(skip_all)]
    pub fn execute_update(&mut self, sql: &str) -> Result<Vec<SuccessStatus>> {
        info!(sql, "[UPD]");
        self.run_request(sql, |result_set| result_set.value_all())
    }

    /// Hand the validated head result set to `f`.
    ///
    /// Later result sets are reached with `ResultSet::next`; anything left
    /// unread when `f` returns is discarded.
    #[tracing::instrument(skip_all)]
    pub fn execute_query<F, R>(&mut self, sql: &str, f: F) -> Result<R>
    where
        F: FnOnce(ResultSet<'_, T>) -> Result<R>,
    {
        info!(sql, "[SEL]");
        self.run_request(sql, |mut result_set| {
            result_set.validate()?;
            f(result_set)
        })
    }

    /// Read the head result set to the end
    #[tracing::instrument(skip_all)]
    pub fn execute_query_all(&mut self, sql: &str) -> Result<FetchedResultSet> {
        info!(sql, "[SEL]");
        self.run_request(sql, |mut result_set| {
            result_set.validate()?;
            let records = result_set.entries()?;
            Ok(FetchedResultSet {
                status: result_set.status().clone(),
                metadata: result_set.metadata()?,
                records,
            })
        })
    }

    /// Records of the head result set
    pub fn entries(&mut self, sql: &str) -> Result<Vec<Record>> {
        Ok(self.execute_query_all(sql)?.records)
    }

    /// Records of the head result set, converted with `FromRecord`
    pub fn query_as<R: FromRecord>(&mut self, sql: &str) -> Result<Vec<R>> {
        self.entries(sql)?.iter().map(R::from_record).collect()
    }

    /// The current session's attributes from `HELP SESSION`
    pub fn info(&mut self) -> Result<SessionInfo> {
        SessionInfo::from_records(&self.entries("HELP SESSION")?)
    }

    pub fn begin_transaction(&mut self) -> Result<()> {
        self.execute_update("BEGIN TRANSACTION")?;
        self.in_transaction = true;
        Ok(())
    }

    pub fn end_transaction(&mut self) -> Result<()> {
        self.in_transaction = false;
        self.execute_update("END TRANSACTION")?;
        Ok(())
    }

    /// Roll back the current transaction.
    ///
    /// The database reports a successful `ABORT` as a 3514 failure, which
    /// surfaces as `Error::UserAbort`.
    pub fn abort(&mut self) -> Result<()> {
        self.in_transaction = false;
        self.execute_update("ABORT")?;
        Ok(())
    }

    /// Execute a closure within a transaction
    ///
    /// The transaction is ended when `f` returns `Ok` and it was not ended
    /// through the token. When `f` fails the transaction is aborted, unless
    /// the failure is itself an abort; the error of `f` is returned.
    pub fn transaction<F, R>(&mut self, f: F) -> Result<R>
    where
        F: FnOnce(&mut Conn<T>, Transaction) -> Result<R>,
    {
        if self.in_transaction {
            return Err(Error::BadUsageError(
                "Cannot nest transactions - a transaction is already active".to_string(),
            ));
        }

        self.begin_transaction()?;

        match f(self, Transaction::new()) {
            Ok(value) => {
                if self.in_transaction {
                    self.end_transaction()?;
                }
                Ok(value)
            }
            Err(err) if err.is_user_abort() => {
                self.in_transaction = false;
                Err(err)
            }
            Err(err) => {
                if self.in_transaction {
                    match self.abort() {
                        Ok(()) | Err(Error::UserAbort(_)) => {}
                        Err(abort_err) => {
                            warn!(error = %abort_err, "ABORT after a failed transaction failed");
                        }
                    }
                }
                Err(err)
            }
        }
    }
}
