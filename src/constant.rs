/// Parcel flavors returned by the CLI fetch call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flavor {
    Success,
    Failure,
    Record,
    EndStatement,
    EndRequest,
    /// CLI or MTDP error; same layout as `Failure`
    Error,
    DataInfo,
    PrepInfo,
    /// Any flavor the decoder has no use for (titles, options, ...)
    Other(u16),
}

impl Flavor {
    pub const PCL_SUCCESS: u16 = 8;
    pub const PCL_FAILURE: u16 = 9;
    pub const PCL_RECORD: u16 = 10;
    pub const PCL_END_STATEMENT: u16 = 11;
    pub const PCL_END_REQUEST: u16 = 12;
    pub const PCL_ERROR: u16 = 49;
    pub const PCL_DATA_INFO: u16 = 71;
    pub const PCL_PREP_INFO: u16 = 86;

    pub fn from_u16(code: u16) -> Self {
        match code {
            Self::PCL_SUCCESS => Self::Success,
            Self::PCL_FAILURE => Self::Failure,
            Self::PCL_RECORD => Self::Record,
            Self::PCL_END_STATEMENT => Self::EndStatement,
            Self::PCL_END_REQUEST => Self::EndRequest,
            Self::PCL_ERROR => Self::Error,
            Self::PCL_DATA_INFO => Self::DataInfo,
            Self::PCL_PREP_INFO => Self::PrepInfo,
            other => Self::Other(other),
        }
    }

    pub fn code(self) -> u16 {
        match self {
            Self::Success => Self::PCL_SUCCESS,
            Self::Failure => Self::PCL_FAILURE,
            Self::Record => Self::PCL_RECORD,
            Self::EndStatement => Self::PCL_END_STATEMENT,
            Self::EndRequest => Self::PCL_END_REQUEST,
            Self::Error => Self::PCL_ERROR,
            Self::DataInfo => Self::PCL_DATA_INFO,
            Self::PrepInfo => Self::PCL_PREP_INFO,
            Self::Other(code) => code,
        }
    }

    /// Success, Failure and Error parcels open a statement's response
    pub fn is_status(self) -> bool {
        matches!(self, Self::Success | Self::Failure | Self::Error)
    }

    /// No parcel follows a Failure or Error parcel within the same request
    pub fn terminates_request(self) -> bool {
        matches!(self, Self::Failure | Self::Error)
    }
}

/// Activity type reported in a Success parcel for an `ECHO` statement
pub const ACTIVITY_ECHO: u16 = 33;

/// Column data type codes found in PrepInfo/DataInfo parcels.
///
/// `*_NN` is the NOT NULL variant, `*_N` the nullable one (always `NN + 1`).
#[allow(non_camel_case_types)]
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCode {
    VARCHAR_NN = 448,
    VARCHAR_N = 449,
    CHAR_NN = 452,
    CHAR_N = 453,
    FLOAT_NN = 480,
    FLOAT_N = 481,
    DECIMAL_NN = 484,
    DECIMAL_N = 485,
    INTEGER_NN = 496,
    INTEGER_N = 497,
    SMALLINT_NN = 500,
    SMALLINT_N = 501,
    BIGINT_NN = 600,
    BIGINT_N = 601,
    VARBYTE_NN = 688,
    VARBYTE_N = 689,
    BYTE_NN = 692,
    BYTE_N = 693,
    DATE_NN = 752,
    DATE_N = 753,
    BYTEINT_NN = 756,
    BYTEINT_N = 757,
}

impl TypeCode {
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            448 => Some(Self::VARCHAR_NN),
            449 => Some(Self::VARCHAR_N),
            452 => Some(Self::CHAR_NN),
            453 => Some(Self::CHAR_N),
            480 => Some(Self::FLOAT_NN),
            481 => Some(Self::FLOAT_N),
            484 => Some(Self::DECIMAL_NN),
            485 => Some(Self::DECIMAL_N),
            496 => Some(Self::INTEGER_NN),
            497 => Some(Self::INTEGER_N),
            500 => Some(Self::SMALLINT_NN),
            501 => Some(Self::SMALLINT_N),
            600 => Some(Self::BIGINT_NN),
            601 => Some(Self::BIGINT_N),
            688 => Some(Self::VARBYTE_NN),
            689 => Some(Self::VARBYTE_N),
            692 => Some(Self::BYTE_NN),
            693 => Some(Self::BYTE_N),
            752 => Some(Self::DATE_NN),
            753 => Some(Self::DATE_N),
            756 => Some(Self::BYTEINT_NN),
            757 => Some(Self::BYTEINT_N),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::VARCHAR_NN => "VARCHAR_NN",
            Self::VARCHAR_N => "VARCHAR_N",
            Self::CHAR_NN => "CHAR_NN",
            Self::CHAR_N => "CHAR_N",
            Self::FLOAT_NN => "FLOAT_NN",
            Self::FLOAT_N => "FLOAT_N",
            Self::DECIMAL_NN => "DECIMAL_NN",
            Self::DECIMAL_N => "DECIMAL_N",
            Self::INTEGER_NN => "INTEGER_NN",
            Self::INTEGER_N => "INTEGER_N",
            Self::SMALLINT_NN => "SMALLINT_NN",
            Self::SMALLINT_N => "SMALLINT_N",
            Self::BIGINT_NN => "BIGINT_NN",
            Self::BIGINT_N => "BIGINT_N",
            Self::VARBYTE_NN => "VARBYTE_NN",
            Self::VARBYTE_N => "VARBYTE_N",
            Self::BYTE_NN => "BYTE_NN",
            Self::BYTE_N => "BYTE_N",
            Self::DATE_NN => "DATE_NN",
            Self::DATE_N => "DATE_N",
            Self::BYTEINT_NN => "BYTEINT_NN",
            Self::BYTEINT_N => "BYTEINT_N",
        }
    }

    pub fn is_nullable(self) -> bool {
        (self as u16) & 1 == 1
    }
}
