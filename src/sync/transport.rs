use auto_impl::auto_impl;

use crate::error::Result;

/// A logged-on CLI session that moves request text out and parcels in.
///
/// Logon, buffer management and the wire protocol below parcels belong to
/// the implementation. Errors it reports (CLI return codes, I/O failures)
/// are expected to be `Error::TransportError` or `Error::IoError`.
#[auto_impl(&mut, Box)]
pub trait Transport {
    /// Start a request. Only one request may be in flight per session.
    fn send_request(&mut self, request: &[u8]) -> Result<()>;

    /// Fetch the next parcel of the current request into `buffer`, replacing
    /// its content, and return the parcel's flavor code
    fn fetch(&mut self, buffer: &mut Vec<u8>) -> Result<u16>;

    /// Release the current request so the next one can be sent
    fn end_request(&mut self) -> Result<()>;

    fn is_logged_on(&self) -> bool;

    fn logoff(&mut self) -> Result<()>;
}
