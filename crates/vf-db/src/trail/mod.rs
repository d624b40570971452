//! JSONL mirror of the verification log.
//!
//! When a trail directory is configured, every verification-log entry is also
//! appended to `{trail_dir}/{vendor_slug}.jsonl`, one JSON object per line.

pub mod writer;
