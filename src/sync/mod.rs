//! File-to-registry synchronization.
//!
//! # Data Flow
//! ```text
//! install / update(file)
//!     → read + parse JSON → ConfigValue (top level must be a mapping)
//!     → value::flatten → FlatDict
//!     → identity::parse_identity + identity::canonical_origin
//!     → [registry read lock]
//!         find configuration whose origin marker == origin
//!         else factory instance (secondary id) / get-or-create (primary id)
//!         candidate = FlatDict + origin marker
//!         candidate == current ? no-op : full replace
//!
//! uninstall(file)
//!     → canonical_origin → [registry read lock] find bound configuration → delete
//! ```
//!
//! # Design Decisions
//! - Everything that can fail without the registry runs before the lock
//! - A found binding wins over the identity derived from the filename
//! - One registry write per file, carrying the complete property set

pub mod installer;
pub mod types;

pub use installer::{ConfigSync, ORIGIN_KEY};
pub use types::{SyncError, SyncOutcome, SyncResult};
