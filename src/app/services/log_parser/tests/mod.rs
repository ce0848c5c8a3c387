//! Test utilities and fixtures for Bro log parser testing
//!
//! This module provides common log contents and helper functions used
//! across the parser test modules.

use std::io::Write;
use tempfile::NamedTempFile;

mod parser_tests;

/// Helper to create a realistic conn.log excerpt
pub fn create_test_conn_log() -> String {
    [
        "#separator \\x09",
        "#set_separator\t,",
        "#empty_field\t(empty)",
        "#unset_field\t-",
        "#path\tconn",
        "#open\t2019-03-01-10-00-00",
        "#fields\tts\tuid\tid.orig_h\tid.orig_p\tid.resp_h\tid.resp_p\tproto\tservice",
        "#types\ttime\tstring\taddr\tport\taddr\tport\tenum\tstring",
        "1551434400.000001\tCx1\t10.0.0.1\t51000\t8.8.8.8\t53\tudp\tdns",
        "1551434401.000002\tCx2\t10.0.0.2\t51001\t1.1.1.1\t443\ttcp\t-",
        "1551434402.000003\tCx3\t10.0.0.3\t51002\t9.9.9.9\t80\ttcp\thttp",
        "#close\t2019-03-01-11-00-00",
    ]
    .join("\n")
}

/// Helper to create the minimal three-column log
pub fn create_abc_log() -> String {
    "#fields\ta\tb\tc\n1\t2\t3\n4\t5\t6\n".to_string()
}

/// Helper to create a temporary file with given content
pub fn create_temp_file(content: &str) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().unwrap();
    write!(temp_file, "{}", content).unwrap();
    temp_file.flush().unwrap();
    temp_file
}

/// Helper to build owned field names
pub fn fields(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}
