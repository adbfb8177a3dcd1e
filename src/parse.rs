//! The parsing engine.
//!
//! Pipeline: preprocessing ([`preprocess`]) → layout detection
//! ([`detect`]) → optional segmentation ([`segment`]) → tract extraction
//! ([`extract`]) → per-tract lot/aliquot parsing ([`tract_parse`]) →
//! aliquot expansion ([`aliquot`]). The compiled pattern tables live in
//! [`rgx`] and are shared, read-only, across all parses.

pub(crate) mod aliquot;
pub(crate) mod detect;
pub(crate) mod extract;
pub(crate) mod preprocess;
pub(crate) mod rgx;
pub(crate) mod segment;
pub(crate) mod tract_parse;
pub(crate) mod unpack;
