//! Domain models for PLSS land descriptions.
//!
//! This module contains the core domain types: the normalized Twp/Rge/Sec
//! identifier, tracts, parsed descriptions, parse configuration, layouts,
//! and diagnostic flags.

/// Normalized Township/Range/Section identifier types and parsing.
pub mod trs;
pub use trs::{Ew, Ns, Rge, Sec, Trs, Twp};
pub use trs::Error as TrsError;

mod config;
pub use config::{ConfigFileError, ParseConfig, ParseConfigError};

/// Description layouts.
pub mod layout;
pub use layout::Layout;

/// Diagnostic flags raised during parsing.
pub mod flag;
pub use flag::{Flag, FlagKind};

/// The tract record: one section of land plus its description block.
pub mod tract;
pub use tract::Tract;

/// A parsed land description that owns its tracts.
pub mod description;
pub use description::PlssDescription;
