use crate::charset::{AsciiExtractor, Latin1Extractor, Utf8Extractor};
use crate::constant::Flavor;
use crate::error::Error;
use crate::protocol::parcel::{write_failure, write_success};
use crate::protocol::primitive::*;
use crate::protocol::status::{FailureStatus, Status, SuccessStatus};

fn success(activity_count: u32, warning_code: u16, warning: &str) -> SuccessStatus {
    SuccessStatus {
        statement_no: 1,
        activity_count,
        warning_code,
        field_count: 2,
        activity_type: 0,
        warning: warning.to_string(),
    }
}

fn failure(error_code: u16, message: &str) -> FailureStatus {
    FailureStatus {
        statement_no: 2,
        info: 11,
        error_code,
        message: message.to_string(),
    }
}

#[test]
fn success_layout() {
    let mut payload = Vec::new();
    write_success(&mut payload, &success(3, 0, ""));
    assert_eq!(payload.len(), 14);
    assert_eq!(SuccessStatus::parse(&payload, &Utf8Extractor).unwrap(), success(3, 0, ""));
}

#[test]
fn success_warning_starts_at_offset_14() {
    let mut payload = Vec::new();
    write_success(&mut payload, &success(1, 5, "careful"));
    assert_eq!(&payload[14..], b"careful");

    let status = SuccessStatus::parse(&payload, &Utf8Extractor).unwrap();
    assert!(status.is_warned());
    assert_eq!(status.warning, "careful");
}

#[test]
fn success_without_warning_length() {
    let mut payload = Vec::new();
    write_int_2(&mut payload, 1);
    write_int_4(&mut payload, 9);
    write_int_2(&mut payload, 0);
    write_int_2(&mut payload, 0);
    write_int_2(&mut payload, 33);
    let status = SuccessStatus::parse(&payload, &Utf8Extractor).unwrap();
    assert_eq!(status.activity_count, 9);
    assert!(status.is_echo());
    assert_eq!(status.warning, "");
}

#[test]
fn failure_layout() {
    let mut payload = Vec::new();
    write_failure(&mut payload, &failure(3807, "Object 'x' does not exist."));
    assert_eq!(&payload[8..], b"Object 'x' does not exist.");

    let status = FailureStatus::parse(&payload, &Utf8Extractor).unwrap();
    assert_eq!(status.error_code, 3807);
    assert_eq!(status.info, 11);
}

#[test]
fn check_maps_errors() {
    assert!(Status::Success(success(0, 0, "")).check().is_ok());

    let err = Status::Failure(failure(3807, "missing")).check().unwrap_err();
    assert!(matches!(&err, Error::SqlError(e) if e.code == 3807 && e.message == "missing"));

    let err = Status::Failure(failure(3514, "aborted")).check().unwrap_err();
    assert!(err.is_user_abort());
    assert_eq!(err.sql_error().unwrap().code, 3514);

    let err = Status::Error(failure(220, "no session")).check().unwrap_err();
    assert!(matches!(err, Error::TransportError(_)));
}

#[test]
fn parse_requires_status_flavor() {
    let mut payload = Vec::new();
    write_success(&mut payload, &success(0, 0, ""));
    assert!(Status::parse(Flavor::Success, &payload, &Utf8Extractor).unwrap().is_success());
    assert!(matches!(
        Status::parse(Flavor::Record, &payload, &Utf8Extractor),
        Err(Error::LibraryBug(_))
    ));
}

#[test]
fn truncated_failure() {
    assert!(matches!(
        FailureStatus::parse(&[1, 0, 0], &Utf8Extractor),
        Err(Error::UnexpectedEof)
    ));
}

#[test]
fn success_warning_cut_short() {
    let mut payload = Vec::new();
    write_success(&mut payload, &success(1, 5, "careful"));
    payload.truncate(payload.len() - 3);
    assert!(matches!(
        SuccessStatus::parse(&payload, &Utf8Extractor),
        Err(Error::UnexpectedEof)
    ));
}

fn raw_failure(message: &[u8]) -> Vec<u8> {
    let mut payload = Vec::new();
    write_int_2(&mut payload, 1);
    write_int_2(&mut payload, 0);
    write_int_2(&mut payload, 3807);
    write_bytes_var(&mut payload, message);
    payload
}

#[test]
fn failure_message_uses_session_charset() {
    let payload = raw_failure(b"caf\xE9");
    let status = FailureStatus::parse(&payload, &Latin1Extractor).unwrap();
    assert_eq!(status.message, "caf\u{e9}");

    let status = Status::parse(Flavor::Failure, &payload, &Latin1Extractor).unwrap();
    assert_eq!(status.message(), "caf\u{e9}");
}

#[test]
fn rejected_message_is_kept_lossily() {
    let status = FailureStatus::parse(&raw_failure(b"caf\xE9"), &AsciiExtractor).unwrap();
    assert_eq!(status.message, "caf\u{fffd}");
}
