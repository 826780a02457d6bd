pub mod field_type;
pub mod indicator;
pub mod metadata;
pub mod parcel;
pub mod primitive;
pub mod status;

pub use field_type::{FieldKind, FieldType};
pub use metadata::MetaData;
pub use parcel::{Parcel, PrepInfoColumn, RecordWriter};
pub use status::{FailureStatus, Status, SuccessStatus};

#[cfg(test)]
mod status_test;
