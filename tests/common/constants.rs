//! Shared constants for end-to-end tests

/// Per-request timeout for the test client
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

// ============================================================================
// Locale codes used across the suite
// ============================================================================

pub const LOCALE_EN_US: &str = "en_US";
pub const LOCALE_FR_FR: &str = "fr_FR";
pub const LOCALE_ES_ES: &str = "es_ES";
