//! Shared constants for end-to-end tests
//!
//! When the fallback set or the stub provider data changes, update only this file.

// ============================================================================
// Server
// ============================================================================

/// Maximum time to wait for a spawned server to answer
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Delay between readiness checks
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 20;

/// Timeout for every test client request
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

pub const TEST_ARTIST: &str = "Michael Jackson";

// ============================================================================
// Fallback set
// ============================================================================

pub const FALLBACK_QUOTE_COUNT: usize = 10;

pub const FALLBACK_ALBUM_COUNT: usize = 6;

/// Only quote whose text contains "criminal"
pub const SMOOTH_CRIMINAL_SONG: &str = "Smooth Criminal";

pub const BILLIE_JEAN_SONG: &str = "Billie Jean";

// ============================================================================
// Stub provider API
// ============================================================================

pub const STUB_GENIUS_TOKEN: &str = "stub-genius-token";

pub const STUB_MUSIXMATCH_KEY: &str = "stub-musixmatch-key";

/// Songs returned by the stub Genius search, in order
pub const STUB_GENIUS_SONGS: &[&str] = &["Thriller", "Bad", "Dangerous"];

/// Musixmatch track served by the stub
pub const STUB_MUSIXMATCH_TRACK: &str = "Human Nature";

/// Lines the stub Musixmatch lyrics yield after extraction
pub const STUB_MUSIXMATCH_LINES: &[&str] = &[
    "Looking out across the nighttime",
    "The city winks a sleepless eye",
    "Hear her voice, shake my window",
];
