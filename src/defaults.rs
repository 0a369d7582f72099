//! Default configuration constants for signscribe.
//!
//! Shared between `Config`, `SegmenterConfig` and the driver so the timing
//! thresholds stay consistent everywhere.

/// Side length in pixels of the square single-channel frame the classifiers expect.
pub const FRAME_SIDE: u32 = 128;

/// Continuous hold needed before a letter is confirmed, in milliseconds.
///
/// The same symbol must win resolution on every sampled frame for this long.
pub const CONFIRM_HOLD_MS: u64 = 1000;

/// Blank hold needed before the pending letters are flushed into a word, in milliseconds.
pub const FLUSH_BLANK_MS: u64 = 2000;

/// Driver cadence in milliseconds. At most one frame is processed per tick.
pub const TICK_MS: u64 = 10;

/// Symbol shown before the first frame has been resolved.
pub const EMPTY_SYMBOL: &str = "Empty";

/// Name of the configuration directory under the XDG config home.
pub const CONFIG_DIR_NAME: &str = "signscribe";

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";
