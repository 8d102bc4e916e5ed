//! Shared fixtures for the integration tests: the test catalog, frame
//! builders from hex strings and log capture.
#![allow(dead_code)]

use korri_codec::protocol::transport::can_frame::CanFrame;
use korri_codec::protocol::transport::can_id::CanId;
use korri_codec::SchemaRegistry;
use std::sync::Arc;

/// Catalog shipped with the tests.
pub const CATALOG_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/catalog.json");

/// Route `tracing` output to the test harness. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn registry() -> Arc<SchemaRegistry> {
    init_tracing();
    Arc::new(SchemaRegistry::from_path(CATALOG_PATH).expect("fixture catalog loads"))
}

/// Bytes of a hex string; whitespace is ignored.
pub fn hex(text: &str) -> Vec<u8> {
    let digits: Vec<char> = text.chars().filter(|c| !c.is_whitespace()).collect();
    assert!(digits.len() % 2 == 0, "odd number of hex digits in {text:?}");
    digits
        .chunks(2)
        .map(|pair| {
            let pair: String = pair.iter().collect();
            u8::from_str_radix(&pair, 16).expect("valid hex")
        })
        .collect()
}

/// Frame on `id` carrying the hex `data`.
pub fn frame(id: u32, data: &str) -> CanFrame {
    CanFrame::new(CanId(id), hex(data))
}

/// Frames on `id`, one per hex string.
pub fn frames(id: u32, data: &[&str]) -> Vec<CanFrame> {
    data.iter().map(|d| frame(id, d)).collect()
}

/// Float comparison with an absolute tolerance.
pub fn assert_close(actual: Option<f64>, expected: f64) {
    let actual = actual.unwrap_or_else(|| panic!("expected {expected}, got no number"));
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}
