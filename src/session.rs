//! `HELP SESSION` output.

use crate::error::{Error, Result};
use crate::record::Record;
use crate::value::Value;

/// Attribute names of the single `HELP SESSION` row, in column order
pub const SESSION_ATTRIBUTES: [&str; 44] = [
    "user_name",
    "account_name",
    "logon_date",
    "logon_time",
    "current_database",
    "collation",
    "character_set",
    "transaction_semantics",
    "current_dateform",
    "timezone",
    "default_character_type",
    "export_latin",
    "export_unicode",
    "export_unicode_adjust",
    "export_kanjisjis",
    "export_graphic",
    "default_date_format",
    "radix_separator",
    "group_separator",
    "grouping_rule",
    "currency_radix_separator",
    "currency_graphic_rule",
    "currency_grouping_rule",
    "currency_name",
    "currency",
    "iso_currency",
    "dual_currency_name",
    "dual_currency",
    "dual_iso_currency",
    "default_byteint_format",
    "default_integer_format",
    "default_smallint_format",
    "default_numeric_format",
    "default_real_format",
    "default_time_format",
    "default_timestamp_format",
    "current_role",
    "logon_account",
    "profile",
    "ldap",
    "audit_trail_id",
    "current_isolation_level",
    "default_bigint_format",
    "query_band",
];

/// Session attributes by position. Servers that return fewer columns leave
/// the remaining attributes `Null`; extra columns are dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionInfo {
    values: Vec<Value>,
}

impl SessionInfo {
    pub fn from_record(record: &Record) -> Self {
        let mut values: Vec<Value> = record
            .values()
            .iter()
            .take(SESSION_ATTRIBUTES.len())
            .cloned()
            .collect();
        values.resize(SESSION_ATTRIBUTES.len(), Value::Null);
        Self { values }
    }

    /// Exactly one row is expected
    pub fn from_records(records: &[Record]) -> Result<Self> {
        match records {
            [record] => Ok(Self::from_record(record)),
            _ => Err(Error::BadUsageError(format!(
                "HELP SESSION did not return 1 record: {}",
                records.len()
            ))),
        }
    }

    pub fn get(&self, attribute: &str) -> Option<&Value> {
        let idx = SESSION_ATTRIBUTES.iter().position(|a| *a == attribute)?;
        self.values.get(idx)
    }

    /// Attribute names paired with their values
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Value)> {
        SESSION_ATTRIBUTES.iter().copied().zip(&self.values)
    }

    fn text(&self, attribute: &str) -> Option<&str> {
        self.get(attribute).and_then(Value::as_str).map(str::trim_end)
    }

    pub fn user_name(&self) -> Option<&str> {
        self.text("user_name")
    }

    pub fn account_name(&self) -> Option<&str> {
        self.text("account_name")
    }

    pub fn current_database(&self) -> Option<&str> {
        self.text("current_database")
    }

    pub fn character_set(&self) -> Option<&str> {
        self.text("character_set")
    }

    pub fn transaction_semantics(&self) -> Option<&str> {
        self.text("transaction_semantics")
    }

    pub fn query_band(&self) -> Option<&str> {
        self.text("query_band")
    }
}
