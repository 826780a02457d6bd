use thiserror::Error;

pub use color_eyre::eyre::eyre;

/// Error code the database reports for a statement aborted by the user (`ABORT`).
pub const ERROR_CODE_ABORT: u16 = 3514;

/// A statement failure reported by the database in a Failure parcel
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("SQL error [{code}]: {message}")]
pub struct SqlError {
    pub code: u16,
    /// Error-code dependent additional information
    pub info: u16,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    SqlError(SqlError),

    #[error("user abort: {0}")]
    UserAbort(SqlError),

    #[error("CLI error: {0}")]
    TransportError(String),

    #[error("Metadata format error: {0}")]
    FormatError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Bad config error: {0}")]
    BadConfigError(String),

    #[error("Bad usage error: {0}")]
    BadUsageError(String),

    #[error("Unexpected end of parcel")]
    UnexpectedEof,

    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("Missing column: {0}")]
    MissingColumn(&'static str),

    #[error("Library bug: {0}")]
    LibraryBug(color_eyre::Report),
}

impl Error {
    /// The SQL failure behind this error, for both `SqlError` and `UserAbort`
    pub fn sql_error(&self) -> Option<&SqlError> {
        match self {
            Error::SqlError(err) | Error::UserAbort(err) => Some(err),
            _ => None,
        }
    }

    pub fn is_user_abort(&self) -> bool {
        matches!(self, Error::UserAbort(_))
    }
}

impl From<std::convert::Infallible> for Error {
    fn from(err: std::convert::Infallible) -> Self {
        match err {}
    }
}

pub type Result<T> = std::result::Result<T, Error>;
