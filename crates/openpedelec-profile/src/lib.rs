//! Controller tuning profiles.
//!
//! A profile is a named set of parameter values bound to the EB3 schema.
//! Profiles persist as `.asv` text files (one value per line, CR+LF
//! records, `:`-prefixed trailing comments ignored) and are mutated only
//! through an explicit edit transaction that is committed or discarded as
//! a whole.

pub mod error;
pub mod profile;
pub mod store;

pub use error::{FormatError, ProfileError};
pub use profile::{EditSession, Profile};
pub use store::{ScanOutcome, scan_dir};

/// File extension of persisted profiles.
pub const PROFILE_EXTENSION: &str = "asv";
