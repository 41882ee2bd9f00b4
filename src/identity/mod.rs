//! Configuration identity resolution.
//!
//! # Responsibilities
//! - Map a filename (`<primary>[-<secondary>].<ext>`) to a [`ConfigIdentity`]
//! - Compute the canonical origin URI that binds a configuration to its file
//!
//! # Design Decisions
//! - Split at the first hyphen only; later hyphens belong to the secondary id
//! - Origins are lexically normalized, never resolved through the filesystem,
//!   so a deleted file still maps to the same origin

pub mod filename;
pub mod origin;

pub use filename::{parse_identity, ConfigIdentity, MalformedFilename};
pub use origin::canonical_origin;
