//! Configuration value model and flattening.
//!
//! # Data Flow
//! ```text
//! JSON text
//!     → serde_json::Value (parser)
//!     → ConfigValue (closed tree: scalar / sequence / mapping)
//!     → flatten.rs (depth-first, dotted-path keys)
//!     → FlatDict (sorted key → Scalar)
//! ```
//!
//! # Design Decisions
//! - Exhaustive match over `ConfigValue`; no runtime type inspection
//! - Null and out-of-range numbers survive decoding so flatten can
//!   report the key they sit at
//! - `FlatDict` is a `BTreeMap`, so output order never depends on input order

pub mod flatten;
pub mod types;

pub use flatten::{flatten, flatten_json, unflatten_sequence, FlattenJsonError, InvalidValue};
pub use types::{ConfigValue, FlatDict, Scalar};
