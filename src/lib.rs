pub mod charset;
pub mod constant;
pub mod error;
mod opts;
pub mod protocol;
pub mod record;
pub mod script;
pub mod session;
pub mod sync;
pub mod value;

pub use opts::{LogonString, Opts};
pub use record::{Field, FromRecord, Record};
pub use value::{FromValue, Value};

#[cfg(feature = "derive")]
pub mod r#macro {
    pub use zero_teradata_derive::FromRecord;
}
