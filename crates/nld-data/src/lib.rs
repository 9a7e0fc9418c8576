//! nld-data: access to the NetHack session dataset
//!
//! Reads per-session array files, the metadata table, and resolves the
//! `<username>/<session_id>.npz` directory layout.

pub mod error;
pub mod layout;
pub mod metadata;
pub mod session;

pub use error::DataError;
pub use layout::{Dataset, SessionFile};
pub use metadata::{MetadataTable, SessionMetadata};
pub use session::{Session, fields};

/// Extension of session files.
pub const SESSION_EXTENSION: &str = "npz";
