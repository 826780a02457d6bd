use crate::charset::StringExtractor;
use crate::constant::{ACTIVITY_ECHO, Flavor};
use crate::error::{ERROR_CODE_ABORT, Error, Result, SqlError, eyre};
use crate::protocol::primitive::*;

/// Outcome of one statement, taken from the parcel that opens its response
#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    Success(SuccessStatus),
    Failure(FailureStatus),
    /// CLI or MTDP error
    Error(FailureStatus),
}

impl Status {
    /// Parse the payload of a Success, Failure or Error parcel.
    ///
    /// Warning and error texts are extracted with the session's extractor.
    pub fn parse(flavor: Flavor, payload: &[u8], extractor: &dyn StringExtractor) -> Result<Self> {
        match flavor {
            Flavor::Success => Ok(Status::Success(SuccessStatus::parse(payload, extractor)?)),
            Flavor::Failure => Ok(Status::Failure(FailureStatus::parse(payload, extractor)?)),
            Flavor::Error => Ok(Status::Error(FailureStatus::parse(payload, extractor)?)),
            other => Err(Error::LibraryBug(eyre!(
                "status requested for non-status parcel {:?}",
                other
            ))),
        }
    }

    /// Raise the error this status stands for
    ///
    /// A Failure with code 3514 becomes `UserAbort`, any other Failure a
    /// `SqlError`, and an Error parcel a `TransportError`.
    pub fn check(&self) -> Result<()> {
        match self {
            Status::Success(_) => Ok(()),
            Status::Failure(failure) => {
                let err = SqlError {
                    code: failure.error_code,
                    info: failure.info,
                    message: failure.message.clone(),
                };
                if failure.error_code == ERROR_CODE_ABORT {
                    Err(Error::UserAbort(err))
                } else {
                    Err(Error::SqlError(err))
                }
            }
            Status::Error(failure) => Err(Error::TransportError(format!(
                "[{}] {}",
                failure.error_code, failure.message
            ))),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Status::Success(_))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Status::Failure(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Status::Error(_))
    }

    pub fn statement_no(&self) -> u16 {
        match self {
            Status::Success(s) => s.statement_no,
            Status::Failure(f) | Status::Error(f) => f.statement_no,
        }
    }

    pub fn error_code(&self) -> u16 {
        match self {
            Status::Success(_) => 0,
            Status::Failure(f) | Status::Error(f) => f.error_code,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Status::Success(_) => "",
            Status::Failure(f) | Status::Error(f) => &f.message,
        }
    }

    pub fn success(&self) -> Option<&SuccessStatus> {
        match self {
            Status::Success(s) => Some(s),
            _ => None,
        }
    }
}

/// Success parcel body
///
/// Layout (little-endian):
/// - statement_no: 2 bytes
/// - activity_count: 4 bytes
/// - warning_code: 2 bytes
/// - field_count: 2 bytes
/// - activity_type: 2 bytes
/// - warning_length: 2 bytes
/// - warning: `warning_length` bytes
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SuccessStatus {
    pub statement_no: u16,
    pub activity_count: u32,
    pub warning_code: u16,
    pub field_count: u16,
    pub activity_type: u16,
    pub warning: String,
}

/// Text the extractor rejects is kept lossily rather than failing the status
fn extract_text(bytes: &[u8], extractor: &dyn StringExtractor) -> String {
    extractor
        .extract(bytes)
        .unwrap_or_else(|_| String::from_utf8_lossy(bytes).into_owned())
}

impl SuccessStatus {
    pub fn parse(payload: &[u8], extractor: &dyn StringExtractor) -> Result<Self> {
        let (statement_no, rest) = read_int_2(payload)?;
        let (activity_count, rest) = read_int_4(rest)?;
        let (warning_code, rest) = read_int_2(rest)?;
        let (field_count, rest) = read_int_2(rest)?;
        let (activity_type, rest) = read_int_2(rest)?;
        // a parcel ending after activity_type carries no warning at all
        let warning = if rest.is_empty() {
            String::new()
        } else {
            let (text, _rest) = read_string_var(rest)?;
            extract_text(text, extractor)
        };
        Ok(Self {
            statement_no,
            activity_count,
            warning_code,
            field_count,
            activity_type,
            warning,
        })
    }

    pub fn is_warned(&self) -> bool {
        self.warning_code != 0
    }

    pub fn is_echo(&self) -> bool {
        self.activity_type == ACTIVITY_ECHO
    }
}

/// Failure and Error parcel body
///
/// Layout (little-endian):
/// - statement_no: 2 bytes
/// - info: 2 bytes
/// - error_code: 2 bytes
/// - message_length: 2 bytes
/// - message: `message_length` bytes
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FailureStatus {
    pub statement_no: u16,
    pub info: u16,
    pub error_code: u16,
    pub message: String,
}

impl FailureStatus {
    pub fn parse(payload: &[u8], extractor: &dyn StringExtractor) -> Result<Self> {
        let (statement_no, rest) = read_int_2(payload)?;
        let (info, rest) = read_int_2(rest)?;
        let (error_code, rest) = read_int_2(rest)?;
        let (message, _rest) = read_string_var(rest)?;
        Ok(Self {
            statement_no,
            info,
            error_code,
            message: extract_text(message, extractor),
        })
    }
}
