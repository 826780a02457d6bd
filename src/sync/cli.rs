use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::charset::StringExtractor;
use crate::constant::Flavor;
use crate::error::{Error, Result};
use crate::protocol::metadata::MetaData;
use crate::protocol::status::Status;
use crate::sync::transport::Transport;

/// Parcel reader for one session.
///
/// Owns the single read buffer of the session; a parcel's payload stays
/// valid until the next fetch.
pub struct Cli<T: Transport> {
    transport: T,
    read_buffer: Vec<u8>,
    extractor: Arc<dyn StringExtractor>,
    /// No parcel of the current request is left to fetch
    end_of_request: bool,
    /// A request was sent and not yet released with `end_request`
    in_request: bool,
}

impl<T: Transport> Cli<T> {
    pub fn new(transport: T, extractor: Arc<dyn StringExtractor>) -> Self {
        Self {
            transport,
            read_buffer: Vec::new(),
            extractor,
            end_of_request: true,
            in_request: false,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    pub fn extractor(&self) -> &Arc<dyn StringExtractor> {
        &self.extractor
    }

    pub fn is_end_of_request(&self) -> bool {
        self.end_of_request
    }

    pub fn in_request(&self) -> bool {
        self.in_request
    }

    /// Send request text; the previous request must have been ended
    #[tracing::instrument(skip_all)]
    pub fn request(&mut self, request: &[u8]) -> Result<()> {
        if self.in_request {
            return Err(Error::ConnectionError(
                "previous request is not ended".to_string(),
            ));
        }
        self.transport.send_request(request)?;
        self.in_request = true;
        self.end_of_request = false;
        Ok(())
    }

    /// Fetch one parcel into the read buffer.
    ///
    /// Returns `None` once the request is exhausted. A Failure or Error
    /// parcel is returned and exhausts the request.
    fn fetch_parcel(&mut self) -> Result<Option<Flavor>> {
        if self.end_of_request {
            return Ok(None);
        }
        let code = match self.transport.fetch(&mut self.read_buffer) {
            Ok(code) => code,
            Err(e) => {
                self.end_of_request = true;
                return Err(e);
            }
        };
        let flavor = Flavor::from_u16(code);
        trace!(?flavor, len = self.read_buffer.len(), "fetched parcel");
        match flavor {
            Flavor::EndRequest => {
                self.end_of_request = true;
                Ok(None)
            }
            flavor if flavor.terminates_request() => {
                self.end_of_request = true;
                Ok(Some(flavor))
            }
            flavor => Ok(Some(flavor)),
        }
    }

    /// Skip ahead to the next statement status
    #[tracing::instrument(skip_all)]
    pub fn read_status(&mut self) -> Result<Option<Status>> {
        while let Some(flavor) = self.fetch_parcel()? {
            if flavor.is_status() {
                let status = Status::parse(flavor, &self.read_buffer, self.extractor.as_ref())?;
                debug!(?status, "statement status");
                return Ok(Some(status));
            }
        }
        Ok(None)
    }

    /// Read the column descriptions of the current statement.
    ///
    /// `None` when the statement ends without a PrepInfo parcel.
    #[tracing::instrument(skip_all)]
    pub fn read_metadata(&mut self) -> Result<Option<MetaData>> {
        while let Some(flavor) = self.fetch_parcel()? {
            match flavor {
                Flavor::PrepInfo => {
                    let metadata =
                        MetaData::parse_prep_info(&self.read_buffer, Arc::clone(&self.extractor))?;
                    debug!(columns = metadata.column_count(), "metadata");
                    return Ok(Some(metadata));
                }
                Flavor::EndStatement => return Ok(None),
                _ => {}
            }
        }
        warn!("request ended before the end of the statement while reading metadata");
        Ok(None)
    }

    /// Payload of the next Record parcel of the current statement
    pub fn read_record(&mut self) -> Result<Option<&[u8]>> {
        while let Some(flavor) = self.fetch_parcel()? {
            match flavor {
                Flavor::Record => return Ok(Some(&self.read_buffer)),
                Flavor::EndStatement => return Ok(None),
                _ => {}
            }
        }
        warn!("request ended before the end of the statement while reading records");
        Ok(None)
    }

    /// Discard parcels through the end of the current statement
    pub fn skip_statement(&mut self) -> Result<()> {
        while let Some(flavor) = self.fetch_parcel()? {
            if flavor == Flavor::EndStatement {
                return Ok(());
            }
        }
        Ok(())
    }

    /// Discard parcels through the end of the current request
    pub fn skip_request(&mut self) -> Result<()> {
        while self.fetch_parcel()?.is_some() {}
        Ok(())
    }

    /// Release the current request; a no-op when none is in flight
    pub fn end_request(&mut self) -> Result<()> {
        self.end_of_request = true;
        if !self.in_request {
            return Ok(());
        }
        self.in_request = false;
        self.transport.end_request()
    }

    pub fn is_logged_on(&self) -> bool {
        self.transport.is_logged_on()
    }

    pub fn logoff(&mut self) -> Result<()> {
        self.transport.logoff()
    }
}
