//! A `Transport` that replays recorded responses.
//!
//! Each sent request consumes the next queued response. Useful for tests
//! and for replaying captured sessions without a database.

use std::collections::VecDeque;
use std::sync::Arc;

use crate::charset::Utf8Extractor;
use crate::constant::Flavor;
use crate::error::{Error, Result};
use crate::protocol::metadata::MetaData;
use crate::protocol::parcel::{Parcel, PrepInfoColumn, RecordWriter};
use crate::protocol::status::{FailureStatus, SuccessStatus};
use crate::sync::Transport;
use crate::value::Value;

/// The parcels answering one request
#[derive(Debug, Clone, Default)]
pub struct Response {
    parcels: Vec<Parcel>,
    statement_no: u16,
    terminated: bool,
}

impl Response {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_statement(&mut self) -> u16 {
        self.statement_no += 1;
        self.statement_no
    }

    fn success_status(&mut self, activity_count: u32, field_count: u16) -> SuccessStatus {
        SuccessStatus {
            statement_no: self.next_statement(),
            activity_count,
            warning_code: 0,
            field_count,
            activity_type: 0,
            warning: String::new(),
        }
    }

    /// Append a parcel as is
    pub fn parcel(mut self, parcel: Parcel) -> Self {
        if parcel.flavor.terminates_request() || parcel.flavor == Flavor::EndRequest {
            self.terminated = true;
        }
        self.parcels.push(parcel);
        self
    }

    /// A statement without rows
    pub fn success(mut self, activity_count: u32) -> Self {
        let status = self.success_status(activity_count, 0);
        self.parcel(Parcel::success(&status))
            .parcel(Parcel::end_statement())
    }

    /// A statement returning `rows` with the given columns
    pub fn rows(mut self, columns: &[PrepInfoColumn<'_>], rows: &[Vec<Value>]) -> Result<Self> {
        let prep_info = Parcel::prep_info(columns);
        let metadata = MetaData::parse_prep_info(&prep_info.payload, Arc::new(Utf8Extractor))?;
        let writer = RecordWriter::new(&metadata);
        let data_info: Vec<(u16, u16)> = columns.iter().map(|c| (c.type_code, c.length)).collect();

        let status = self.success_status(rows.len() as u32, columns.len() as u16);
        let mut response = self
            .parcel(Parcel::success(&status))
            .parcel(prep_info)
            .parcel(Parcel::data_info(&data_info));
        for row in rows {
            response = response.parcel(Parcel::record(writer.write(row)?));
        }
        Ok(response.parcel(Parcel::end_statement()))
    }

    /// A statement failure; nothing follows it
    pub fn failure(mut self, error_code: u16, message: &str) -> Self {
        let status = FailureStatus {
            statement_no: self.next_statement(),
            info: 0,
            error_code,
            message: message.to_string(),
        };
        self.parcel(Parcel::failure(&status))
    }

    /// A CLI error; nothing follows it
    pub fn error(mut self, error_code: u16, message: &str) -> Self {
        let status = FailureStatus {
            statement_no: self.next_statement(),
            info: 0,
            error_code,
            message: message.to_string(),
        };
        self.parcel(Parcel::error(&status))
    }

    /// The parcels, closed with EndRequest unless a terminating parcel was
    /// already added
    pub fn into_parcels(mut self) -> Vec<Parcel> {
        if !self.terminated {
            self.parcels.push(Parcel::end_request());
        }
        self.parcels
    }
}

impl From<Response> for Vec<Parcel> {
    fn from(response: Response) -> Self {
        response.into_parcels()
    }
}

/// Replays queued responses, one per request
#[derive(Debug)]
pub struct ScriptedTransport {
    responses: VecDeque<Vec<Parcel>>,
    current: VecDeque<Parcel>,
    requests: Vec<Vec<u8>>,
    fetch_count: usize,
    logged_on: bool,
    in_request: bool,
}

impl Default for ScriptedTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self {
            responses: VecDeque::new(),
            current: VecDeque::new(),
            requests: Vec::new(),
            fetch_count: 0,
            logged_on: true,
            in_request: false,
        }
    }

    /// Queue the response to a future request
    pub fn push_response<P: Into<Vec<Parcel>>>(&mut self, parcels: P) -> &mut Self {
        self.responses.push_back(parcels.into());
        self
    }

    pub fn with_response<P: Into<Vec<Parcel>>>(mut self, parcels: P) -> Self {
        self.push_response(parcels);
        self
    }

    /// Requests sent so far, as encoded bytes
    pub fn requests(&self) -> &[Vec<u8>] {
        &self.requests
    }

    /// Number of parcels fetched so far
    pub fn fetch_count(&self) -> usize {
        self.fetch_count
    }

    /// Parcels of the current request not yet fetched
    pub fn pending(&self) -> usize {
        self.current.len()
    }

    /// Responses not yet consumed by a request
    pub fn queued(&self) -> usize {
        self.responses.len()
    }
}

impl Transport for ScriptedTransport {
    fn send_request(&mut self, request: &[u8]) -> Result<()> {
        if !self.logged_on {
            return Err(Error::TransportError("session is logged off".to_string()));
        }
        if self.in_request {
            return Err(Error::TransportError("request already active".to_string()));
        }
        let response = self
            .responses
            .pop_front()
            .ok_or_else(|| Error::TransportError("no scripted response left".to_string()))?;
        self.requests.push(request.to_vec());
        self.current = response.into();
        self.in_request = true;
        Ok(())
    }

    fn fetch(&mut self, buffer: &mut Vec<u8>) -> Result<u16> {
        if !self.in_request {
            return Err(Error::TransportError("no active request".to_string()));
        }
        let parcel = self
            .current
            .pop_front()
            .ok_or_else(|| Error::TransportError("request exhausted".to_string()))?;
        self.fetch_count += 1;
        buffer.clear();
        buffer.extend_from_slice(&parcel.payload);
        Ok(parcel.flavor.code())
    }

    fn end_request(&mut self) -> Result<()> {
        self.in_request = false;
        self.current.clear();
        Ok(())
    }

    fn is_logged_on(&self) -> bool {
        self.logged_on
    }

    fn logoff(&mut self) -> Result<()> {
        if !self.logged_on {
            return Err(Error::TransportError("session is already logged off".to_string()));
        }
        self.logged_on = false;
        Ok(())
    }
}
