use std::collections::BTreeMap;

use crate::{
    domain::{Flag, ParseConfig, Trs},
    parse::tract_parse,
};

/// One section of land paired with the description block that covers it.
///
/// Tracts are the atoms of the parser's output. They are plain owned
/// values: the diagnostics and source annotation of the parent description
/// are copied in when the tract is emitted, so a tract remains valid after
/// its parent is gone.
///
/// `lots` and `qqs` are empty until the tract text is parsed (either
/// because the description was parsed with `parse_qq`, or by calling
/// [`Tract::parse_lots_qqs`] directly).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Tract {
    pub(crate) trs: Trs,
    pub(crate) desc: String,
    pub(crate) pp_desc: String,
    pub(crate) orig_desc: String,
    pub(crate) orig_index: usize,
    pub(crate) source: Option<String>,
    pub(crate) lots: Vec<String>,
    pub(crate) qqs: Vec<String>,
    pub(crate) lot_acres: BTreeMap<String, String>,
    pub(crate) w_flags: Vec<Flag>,
    pub(crate) e_flags: Vec<Flag>,
    pub(crate) parsed: bool,
}

impl Tract {
    /// Construct a tract directly from an identifier and description block.
    ///
    /// This is the entry point for callers who already have tract-level
    /// text (most tracts are created by parsing a full description).
    #[must_use]
    pub fn new(trs: Trs, desc: impl Into<String>) -> Self {
        let desc = desc.into();
        Self {
            trs,
            pp_desc: desc.clone(),
            orig_desc: desc.clone(),
            desc,
            ..Self::default()
        }
    }

    /// The normalized Twp/Rge/Sec identifier.
    #[must_use]
    pub const fn trs(&self) -> &Trs {
        &self.trs
    }

    /// The raw description block for this tract.
    #[must_use]
    pub fn desc(&self) -> &str {
        &self.desc
    }

    /// The preprocessed copy of the description block.
    ///
    /// Identical to [`Tract::desc`] until the tract has been parsed into
    /// lots and quarter-quarters.
    #[must_use]
    pub fn pp_desc(&self) -> &str {
        &self.pp_desc
    }

    /// The full original description this tract was extracted from.
    #[must_use]
    pub fn orig_desc(&self) -> &str {
        &self.orig_desc
    }

    /// Creation-order index within the parent description (0-based, dense).
    #[must_use]
    pub const fn orig_index(&self) -> usize {
        self.orig_index
    }

    /// Opaque source annotation inherited from the parent description.
    #[must_use]
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// The lots named in the description, as `L1`, `L2`, ...
    #[must_use]
    pub fn lots(&self) -> &[String] {
        &self.lots
    }

    /// The quarter-quarters (or configured-depth subdivisions) covered by
    /// the description, deepest piece first (`SWNE` is the SW quarter of
    /// the NE quarter).
    #[must_use]
    pub fn qqs(&self) -> &[String] {
        &self.qqs
    }

    /// Lots followed by quarter-quarters, in one list.
    #[must_use]
    pub fn lots_qqs(&self) -> Vec<String> {
        self.lots.iter().chain(self.qqs.iter()).cloned().collect()
    }

    /// Stated acreages keyed by lot, e.g. `L1 -> 38.29`.
    #[must_use]
    pub const fn lot_acres(&self) -> &BTreeMap<String, String> {
        &self.lot_acres
    }

    /// Warning flags, inherited from the parent plus any raised while
    /// parsing this tract's own text.
    #[must_use]
    pub fn w_flags(&self) -> &[Flag] {
        &self.w_flags
    }

    /// Error flags inherited from the parent description.
    #[must_use]
    pub fn e_flags(&self) -> &[Flag] {
        &self.e_flags
    }

    /// Whether the parent description raised any error flag.
    #[must_use]
    pub fn desc_is_flawed(&self) -> bool {
        !self.e_flags.is_empty()
    }

    /// Whether this tract's text has been parsed into lots and QQs.
    #[must_use]
    pub const fn parse_complete(&self) -> bool {
        self.parsed
    }

    /// Parse (or re-parse) this tract's description block into lots and
    /// quarter-quarters.
    ///
    /// Re-parsing replaces the previous lots, QQs, and acreages; flags are
    /// additive.
    pub fn parse_lots_qqs(&mut self, config: &ParseConfig) {
        let outcome = tract_parse::parse_tract_text(&self.desc, config);
        self.pp_desc = outcome.text;
        self.lots = outcome.lots;
        self.qqs = outcome.qqs;
        self.lot_acres = outcome.lot_acres;
        self.w_flags.extend(outcome.w_flags);
        self.parsed = true;
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::{FlagKind, Sec, Trs};

    use super::*;

    fn quarter_tract() -> Tract {
        let trs: Trs = "154n97w14".parse().unwrap();
        Tract::new(trs, "NE/4")
    }

    #[test]
    fn new_tract_is_unparsed() {
        let tract = quarter_tract();
        assert!(!tract.parse_complete());
        assert!(tract.lots().is_empty());
        assert!(tract.qqs().is_empty());
        assert_eq!(tract.pp_desc(), tract.desc());
    }

    #[test]
    fn parse_populates_qqs() {
        let mut tract = quarter_tract();
        tract.parse_lots_qqs(&ParseConfig::default());

        assert!(tract.parse_complete());
        assert_eq!(tract.qqs(), ["NENE", "NWNE", "SENE", "SWNE"]);
        assert!(tract.lots().is_empty());
    }

    #[test]
    fn lots_qqs_is_lots_then_qqs() {
        let trs: Trs = "154n97w01".parse().unwrap();
        let mut tract = Tract::new(trs, "Lots 1 - 2, SE/4NE/4");
        tract.parse_lots_qqs(&ParseConfig::default());

        assert_eq!(tract.lots(), ["L1", "L2"]);
        assert_eq!(tract.qqs(), ["SENE"]);
        assert_eq!(tract.lots_qqs(), ["L1", "L2", "SENE"]);
    }

    #[test]
    fn reparse_replaces_derived_fields() {
        let mut tract = quarter_tract();
        tract.parse_lots_qqs(&ParseConfig::default());
        tract.parse_lots_qqs(&ParseConfig::default());

        assert_eq!(tract.qqs(), ["NENE", "NWNE", "SENE", "SWNE"]);
    }

    #[test]
    fn flawed_bit_follows_error_flags() {
        let mut tract = quarter_tract();
        assert!(!tract.desc_is_flawed());

        tract
            .e_flags
            .push(crate::domain::Flag::bare(FlagKind::NoTwpRge));
        assert!(tract.desc_is_flawed());
    }

    #[test]
    fn sentinel_section_renders_in_trs() {
        let trs = Trs::new(
            crate::domain::Twp::Error,
            crate::domain::Rge::Error,
            Sec::Defined(14),
        );
        let tract = Tract::new(trs, "-R97W Sec 14: NE/4");
        assert_eq!(tract.trs().to_string(), "XXXzXXXz14");
    }
}
