//! Stable exit codes for analyst CLI commands.

/// Command succeeded (run produced a validated document, check passed).
pub const OK: i32 = 0;
/// Invalid usage, config, or input file; nothing was run.
pub const INVALID: i32 = 1;
/// `analyst run` ended without a validated document, or `analyst check` failed.
pub const FAILED: i32 = 2;
