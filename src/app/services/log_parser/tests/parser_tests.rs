//! Tests for parser configuration, index resolution and buffer lifecycle

use super::*;
use crate::Error;
use crate::app::models::ScanMode;
use crate::app::services::log_parser::{LogParser, UnsetValueNormalizer};
use crate::config::ProcessorConfig;
use std::path::Path;

#[test]
fn test_new_requires_existing_file() {
    let result = LogParser::new("/nonexistent/conn.log", false);

    match result {
        Err(Error::FileNotFound { path }) => {
            assert_eq!(path, Path::new("/nonexistent/conn.log"));
        }
        other => panic!("Expected FileNotFound, got {:?}", other),
    }
}

#[test]
fn test_new_rejects_directory() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let result = LogParser::new(temp_dir.path(), true);
    assert!(matches!(result, Err(Error::FileNotFound { .. })));
}

#[test]
fn test_new_rejects_invalid_config() {
    let temp_file = create_temp_file(&create_abc_log());
    let config = ProcessorConfig::default().with_separator('#');
    let result = LogParser::with_config(temp_file.path(), false, config);
    assert!(matches!(result, Err(Error::Configuration { .. })));
}

#[test]
fn test_parser_mode() {
    let temp_file = create_temp_file(&create_abc_log());

    let parser = LogParser::new(temp_file.path(), true).unwrap();
    assert_eq!(parser.mode(), ScanMode::AllFields);
    assert_eq!(parser.path(), temp_file.path());

    let parser = LogParser::new(temp_file.path(), false).unwrap();
    assert_eq!(parser.mode(), ScanMode::SelectedFields);
    assert!(parser.fields().is_none());
}

#[test]
fn test_fields_to_underscore() {
    let temp_file = create_temp_file(&create_test_conn_log());
    let mut parser = LogParser::new(temp_file.path(), false).unwrap();

    assert!(matches!(
        parser.fields_to_underscore(),
        Err(Error::ConfigurationMissing { .. })
    ));

    parser.set_fields(fields(&["id.orig_h", "id.resp_p", "uid"]));
    assert_eq!(
        parser.fields_to_underscore().unwrap(),
        fields(&["id_orig_h", "id_resp_p", "uid"])
    );
    // the selection itself is untouched
    assert_eq!(
        parser.fields().unwrap(),
        &fields(&["id.orig_h", "id.resp_p", "uid"])[..]
    );
}

#[test]
fn test_resolve_indices() {
    let temp_file = create_temp_file(&create_test_conn_log());
    let mut parser = LogParser::new(temp_file.path(), false).unwrap();
    parser.set_fields(fields(&["id.resp_h", "ts", "proto"]));

    let indices = parser.resolve_indices().unwrap().to_vec();
    assert_eq!(indices, vec![4, 0, 6]);
    assert_eq!(parser.field_index().unwrap().len(), 3);
}

#[test]
fn test_resolve_without_fields() {
    let temp_file = create_temp_file(&create_abc_log());
    let mut parser = LogParser::new(temp_file.path(), false).unwrap();

    assert!(matches!(
        parser.resolve_indices(),
        Err(Error::ConfigurationMissing { .. })
    ));
}

#[test]
fn test_resolve_unknown_field_names_it() {
    let temp_file = create_temp_file("#fields\ta\tb\n1\t2\n");
    let mut parser = LogParser::new(temp_file.path(), false).unwrap();
    parser.set_fields(fields(&["z"]));

    let err = parser.resolve_indices().unwrap_err();
    assert!(matches!(&err, Error::NotFound { field } if field == "z"));
    assert!(err.to_string().contains("z"));
    assert!(parser.field_index().is_none());
}

#[test]
fn test_set_fields_discards_stale_indices() {
    let temp_file = create_temp_file(&create_abc_log());
    let mut parser = LogParser::new(temp_file.path(), false).unwrap();

    parser.set_fields(fields(&["c"]));
    parser.resolve_indices().unwrap();
    assert!(parser.field_index().is_some());

    parser.set_fields(fields(&["a", "b"]));
    assert!(parser.field_index().is_none());
    assert_eq!(parser.resolve_indices().unwrap(), &[0, 1]);
}

#[test]
fn test_resolve_rescans_header() {
    let temp_file = create_temp_file("#fields\ta\tb\n");
    let mut parser = LogParser::new(temp_file.path(), false).unwrap();
    parser.set_fields(fields(&["b"]));
    assert_eq!(parser.resolve_indices().unwrap(), &[1]);

    std::fs::write(temp_file.path(), "#fields\tb\ta\n").unwrap();
    assert_eq!(parser.resolve_indices().unwrap(), &[0]);
}

#[test]
fn test_count_lines() {
    let temp_file = create_temp_file(&create_abc_log());
    let parser = LogParser::new(temp_file.path(), true).unwrap();
    assert_eq!(parser.count_lines().unwrap(), 3);
}

#[test]
fn test_create_buffer() {
    let temp_file = create_temp_file(&create_abc_log());
    let mut parser = LogParser::new(temp_file.path(), true).unwrap();

    assert_eq!(parser.buffer_capacity(), None);
    parser.create_buffer(10);
    assert_eq!(parser.buffer_capacity(), Some(10));
    parser.create_buffer(0);
    assert_eq!(parser.buffer_capacity(), Some(1));
}

#[test]
fn test_auto_create_buffer_uses_line_count() {
    let temp_file = create_temp_file(&create_test_conn_log());
    let mut parser = LogParser::new(temp_file.path(), true).unwrap();

    // 12 lines, the last one unterminated
    assert_eq!(parser.auto_create_buffer().unwrap(), 11);
    assert_eq!(parser.buffer_capacity(), Some(11));
}

#[test]
fn test_auto_create_buffer_clamps() {
    let temp_file = create_temp_file("");
    let mut parser = LogParser::new(temp_file.path(), true).unwrap();
    assert_eq!(parser.auto_create_buffer().unwrap(), 1);

    let temp_file = create_temp_file(&create_test_conn_log());
    let config = ProcessorConfig::default().with_max_buffer_capacity(4);
    let mut parser = LogParser::with_config(temp_file.path(), true, config).unwrap();
    assert_eq!(parser.auto_create_buffer().unwrap(), 4);
}

#[test]
fn test_create_configured_buffer() {
    let temp_file = create_temp_file(&create_abc_log());
    let config = ProcessorConfig::default().with_buffer_capacity(7);
    let mut parser = LogParser::with_config(temp_file.path(), true, config).unwrap();
    assert_eq!(parser.create_configured_buffer().unwrap(), 7);

    let mut parser = LogParser::new(temp_file.path(), true).unwrap();
    assert_eq!(parser.create_configured_buffer().unwrap(), 3);
}

#[tokio::test]
async fn test_start_without_buffer() {
    let temp_file = create_temp_file(&create_abc_log());
    let mut parser = LogParser::new(temp_file.path(), true).unwrap();

    assert!(matches!(parser.start(), Err(Error::BufferNotInitialized)));
}

#[tokio::test]
async fn test_start_without_fields() {
    let temp_file = create_temp_file(&create_abc_log());
    let mut parser = LogParser::new(temp_file.path(), false).unwrap();
    parser.create_buffer(4);

    assert!(matches!(
        parser.start(),
        Err(Error::ConfigurationMissing { .. })
    ));
    // a failed start keeps the buffer for the next attempt
    assert_eq!(parser.buffer_capacity(), Some(4));
}

#[tokio::test]
async fn test_start_consumes_buffer() {
    let temp_file = create_temp_file(&create_abc_log());
    let mut parser = LogParser::new(temp_file.path(), true).unwrap();
    parser.create_buffer(4);

    let stream = parser.start().unwrap();
    assert_eq!(stream.capacity(), 4);
    assert_eq!(parser.buffer_capacity(), None);
    assert!(matches!(parser.start(), Err(Error::BufferNotInitialized)));

    stream.finish().await.unwrap();
}

#[tokio::test]
async fn test_start_unknown_field_fails_before_scanning() {
    let temp_file = create_temp_file("#fields\ta\tb\n1\t2\n");
    let mut parser = LogParser::new(temp_file.path(), false).unwrap();
    parser.set_fields(fields(&["z"]));
    parser.create_buffer(4);

    match parser.start() {
        Err(Error::NotFound { field }) => assert_eq!(field, "z"),
        other => panic!("Expected NotFound, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn test_start_malformed_header() {
    let temp_file = create_temp_file("#fields\n1\t2\n");
    let mut parser = LogParser::new(temp_file.path(), true).unwrap();
    parser.create_buffer(4);

    assert!(matches!(
        parser.start(),
        Err(Error::MalformedHeader { .. })
    ));
}

#[test]
fn test_start_outside_runtime_is_an_error() {
    let temp_file = create_temp_file(&create_abc_log());
    let mut parser = LogParser::new(temp_file.path(), true).unwrap();
    parser.create_buffer(4);

    let err = parser.start().unwrap_err();
    assert!(matches!(err, Error::Configuration { .. }));
    assert!(err.to_string().contains("Tokio runtime"));
    // the buffer survives for a later start inside a runtime
    assert_eq!(parser.buffer_capacity(), Some(4));

    assert!(matches!(
        parser.start_with_transform(UnsetValueNormalizer::default()),
        Err(Error::Configuration { .. })
    ));
}
