//! Shared constants for end-to-end tests
//!
//! This module contains all constants used across the test suite.
//! When test data changes (source name, tokens, timeouts), update
//! only this file.

// ============================================================================
// Test Gateway Configuration
// ============================================================================

/// Search source the test gateway exposes
pub const TEST_SOURCE: &str = "twitter";

/// Bearer token the test gateway presents to the mock upstream
pub const TEST_UPSTREAM_TOKEN: &str = "test-upstream-token";

/// API key accepted by the mock Gemini endpoint
pub const TEST_GEMINI_KEY: &str = "test-gemini-key";

/// Model name used against the mock Gemini endpoint
pub const TEST_GEMINI_MODEL: &str = "gemini-1.5-flash";

// ============================================================================
// Test Timeouts and Configuration
// ============================================================================

/// Maximum time to wait for a server to become ready (milliseconds)
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Timeout for individual HTTP requests (seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Polling interval when waiting for server ready (milliseconds)
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 50;
