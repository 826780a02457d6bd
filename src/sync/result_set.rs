use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result, eyre};
use crate::protocol::metadata::MetaData;
use crate::protocol::status::{Status, SuccessStatus};
use crate::record::Record;
use crate::sync::cli::Cli;
use crate::sync::transport::Transport;

/// Position of a `ResultSet` in its statement's parcel stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultSetState {
    /// Status read, not yet validated
    StatusKnown,
    /// Validated, metadata not yet read
    MetadataPending,
    /// Metadata read, records may follow
    Streaming,
    /// The statement's parcels were consumed
    Closed,
}

/// The outcome of one statement of a request.
///
/// Records are streamed lazily from the session. Advancing with `next`
/// consumes this set, so the chain can only be walked forward.
pub struct ResultSet<'c, T: Transport> {
    cli: &'c mut Cli<T>,
    status: Status,
    state: ResultSetState,
    validated: bool,
    metadata: Option<Arc<MetaData>>,
    /// Records kept by `fetch_all`
    entries: Option<Vec<Record>>,
}

impl<'c, T: Transport> ResultSet<'c, T> {
    pub(crate) fn new(cli: &'c mut Cli<T>, status: Status) -> Self {
        Self {
            cli,
            status,
            state: ResultSetState::StatusKnown,
            validated: false,
            metadata: None,
            entries: None,
        }
    }

    pub(crate) fn transport(&self) -> &T {
        self.cli.transport()
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn state(&self) -> ResultSetState {
        self.state
    }

    pub fn is_closed(&self) -> bool {
        self.state == ResultSetState::Closed
    }

    /// Raise the statement's failure, if any. Idempotent.
    pub fn validate(&mut self) -> Result<()> {
        if self.validated {
            return Ok(());
        }
        self.status.check()?;
        self.validated = true;
        if self.state == ResultSetState::StatusKnown {
            self.state = ResultSetState::MetadataPending;
        }
        Ok(())
    }

    /// Column descriptions, read from the session on first use.
    ///
    /// `None` for statements that return no columns.
    pub fn metadata(&mut self) -> Result<Option<Arc<MetaData>>> {
        self.validate()?;
        if self.state == ResultSetState::MetadataPending {
            match self.cli.read_metadata()? {
                Some(metadata) => {
                    self.metadata = Some(Arc::new(metadata));
                    self.state = ResultSetState::Streaming;
                }
                None => self.state = ResultSetState::Closed,
            }
        }
        Ok(self.metadata.clone())
    }

    /// Decode the next record of the statement
    pub fn next_record(&mut self) -> Result<Option<Record>> {
        self.metadata()?;
        if self.state != ResultSetState::Streaming {
            return Ok(None);
        }
        let Some(metadata) = &self.metadata else {
            return Err(Error::LibraryBug(eyre!("streaming result set without metadata")));
        };
        match self.cli.read_record()? {
            Some(payload) => metadata.decode_record(payload).map(Some),
            None => {
                self.state = ResultSetState::Closed;
                Ok(None)
            }
        }
    }

    /// Iterate the records: the cached ones after `fetch_all`, otherwise
    /// the ones still unread on the session
    pub fn records(&mut self) -> Result<Records<'_, 'c, T>> {
        if self.entries.is_none() {
            if self.is_closed() {
                return Err(Error::ConnectionError(
                    "already closed ResultSet".to_string(),
                ));
            }
            self.validate()?;
        }
        Ok(Records {
            result_set: self,
            position: 0,
            done: false,
        })
    }

    /// All remaining records
    pub fn entries(&mut self) -> Result<Vec<Record>> {
        if let Some(entries) = &self.entries {
            return Ok(entries.clone());
        }
        self.records()?.collect()
    }

    /// Read all remaining records and keep them for later iteration
    pub fn fetch_all(&mut self) -> Result<()> {
        if self.entries.is_none() {
            let entries = self.entries()?;
            self.entries = Some(entries);
        }
        Ok(())
    }

    /// Discard the rest of the statement. A no-op on a closed set.
    pub fn close(&mut self) -> Result<()> {
        if self.is_closed() {
            return Ok(());
        }
        self.cli.skip_statement()?;
        self.state = ResultSetState::Closed;
        Ok(())
    }

    pub fn skip(&mut self) -> Result<()> {
        self.close()
    }

    /// Close this set and move to the next statement of the request.
    ///
    /// The current statement is validated first; the next one is validated
    /// when it is used.
    pub fn next(mut self) -> Result<Option<ResultSet<'c, T>>> {
        self.close()?;
        self.validate()?;
        let cli = self.cli;
        Ok(cli.read_status()?.map(|status| ResultSet::new(cli, status)))
    }

    /// Call `f` for this and every following set of the request.
    ///
    /// Each set is closed before the next one is read, also when `f` fails;
    /// the error of `f` is returned in preference to a close error.
    pub fn for_each_result_set<F>(self, mut f: F) -> Result<()>
    where
        F: FnMut(&mut ResultSet<'c, T>) -> Result<()>,
    {
        let mut current = Some(self);
        while let Some(mut result_set) = current {
            let result = f(&mut result_set);
            let closed = result_set.close();
            result?;
            closed?;
            current = result_set.next()?;
        }
        Ok(())
    }

    /// Validate every remaining set and collect the success statuses
    pub fn value_all(self) -> Result<Vec<SuccessStatus>> {
        let mut statuses = Vec::new();
        self.for_each_result_set(|result_set| {
            result_set.validate()?;
            if let Some(success) = result_set.status.success() {
                statuses.push(success.clone());
            }
            Ok(())
        })?;
        Ok(statuses)
    }

    pub fn statement_no(&self) -> u16 {
        self.status.statement_no()
    }

    pub fn activity_count(&self) -> Option<u32> {
        self.status.success().map(|s| s.activity_count)
    }

    pub fn warning_code(&self) -> Option<u16> {
        self.status.success().map(|s| s.warning_code)
    }

    pub fn warning(&self) -> Option<&str> {
        self.status.success().map(|s| s.warning.as_str())
    }

    pub fn field_count(&self) -> Option<u16> {
        self.status.success().map(|s| s.field_count)
    }

    pub fn is_echo(&self) -> bool {
        self.status.success().is_some_and(SuccessStatus::is_echo)
    }

    pub fn error_code(&self) -> u16 {
        self.status.error_code()
    }

    pub fn info(&self) -> Option<u16> {
        match &self.status {
            Status::Success(_) => None,
            Status::Failure(f) | Status::Error(f) => Some(f.info),
        }
    }

    pub fn message(&self) -> &str {
        self.status.message()
    }
}

impl<T: Transport> fmt::Debug for ResultSet<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultSet")
            .field("status", &self.status)
            .field("state", &self.state)
            .field("cached", &self.entries.as_ref().map(Vec::len))
            .finish()
    }
}

/// Iterator over the records of a `ResultSet`
pub struct Records<'r, 'c, T: Transport> {
    result_set: &'r mut ResultSet<'c, T>,
    position: usize,
    done: bool,
}

impl<T: Transport> Iterator for Records<'_, '_, T> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if let Some(entries) = &self.result_set.entries {
            let record = entries.get(self.position).cloned();
            self.position += 1;
            return record.map(Ok);
        }
        let item = self.result_set.next_record().transpose();
        if !matches!(item, Some(Ok(_))) {
            self.done = true;
        }
        item
    }
}

/// A statement's status, metadata and records, read to the end
#[derive(Debug, Clone)]
pub struct FetchedResultSet {
    pub status: Status,
    pub metadata: Option<Arc<MetaData>>,
    pub records: Vec<Record>,
}
