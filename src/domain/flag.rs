use std::fmt;

/// The closed set of diagnostic conditions the parser can raise.
///
/// Flags are additive: once raised they are never erased by the success of
/// a later stage. Each kind belongs to one channel — warnings for
/// interpretive judgement calls, errors for structural failures that set
/// the flawed bit on the description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum FlagKind {
    /// A Twp/Rge was completed with a default direction during preprocessing.
    TwpRgeFixed,
    /// A Twp/Rge was repaired by the OCR scrubber.
    OcrFixed,
    /// A multi-section enumeration or range was expanded into tracts.
    MultiSecFound,
    /// A section range ran high-to-low and was honored in that order.
    NonSequentialSecs,
    /// A lot range ran high-to-low and was honored in that order.
    NonSequentialLots,
    /// A section without a trailing colon was accepted on the second pass.
    PulledSecWithoutColon,
    /// A section match was ruled out as a continuation of running prose.
    SecIgnored,
    /// A multi-section match was ruled out as a continuation of running prose.
    MultiSecIgnored,
    /// A Twp/Rge match was ruled out by its surrounding context.
    TwpRgeIgnored,
    /// A matched Twp/Rge was never claimed by any tract.
    TwpRgeNotPulled,
    /// A matched section was never claimed by any tract.
    SecNotPulled,
    /// A block of text was not claimed by any tract.
    UnusedDesc,
    /// Text inside a tract's description resisted lot/aliquot parsing.
    UnparsedText,
    /// A duplicate lot was dropped.
    DupLot,
    /// A duplicate quarter-quarter was dropped.
    DupQq,
    /// Conflicting acreages were stated for the same lot.
    DupLotAcreage,
    /// An unused block was re-attached to a lone tract (`sec_within`).
    SecWithin,
    /// The word "well" or "wellbore" appeared near a tract.
    Well,
    /// Depth-limiting language appeared near a tract.
    Depth,
    /// The word "including" appeared near a tract.
    Including,
    /// "Less", "except", or "limit" language appeared near a tract.
    LessExcept,
    /// "Insofar" language appeared near a tract.
    Insofar,
    /// The layout changed within a single Twp/Rge segment.
    LayoutChangeInSegment,
    /// `qq_depth_max` was set below `qq_depth_min`.
    QqDepthConflict,
    /// A requested expansion depth exceeded the hard cap and was clamped.
    QqDepthClamped,
    /// A configuration entry could not be understood and was skipped.
    BadConfig,
    /// No Twp/Rge could be found anywhere in the description.
    NoTwpRge,
    /// No section could be found anywhere in the description.
    NoSection,
    /// The description was empty.
    NoText,
}

impl FlagKind {
    /// The stable code used in rendered flags and exports.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::TwpRgeFixed => "TR_fixed",
            Self::OcrFixed => "ocr_fixed",
            Self::MultiSecFound => "multiSec_found",
            Self::NonSequentialSecs => "nonSequen_sec",
            Self::NonSequentialLots => "nonSequen_lots",
            Self::PulledSecWithoutColon => "pulled_sec_without_colon",
            Self::SecIgnored => "sec_ignored",
            Self::MultiSecIgnored => "multiSec_ignored",
            Self::TwpRgeIgnored => "TR_ignored",
            Self::TwpRgeNotPulled => "TR_not_pulled",
            Self::SecNotPulled => "sec_not_pulled",
            Self::UnusedDesc => "unused_desc",
            Self::UnparsedText => "unparsed_text",
            Self::DupLot => "dup_lot",
            Self::DupQq => "dup_qq",
            Self::DupLotAcreage => "dup_lot_acreage",
            Self::SecWithin => "sec_within",
            Self::Well => "well",
            Self::Depth => "depth",
            Self::Including => "including",
            Self::LessExcept => "less_except",
            Self::Insofar => "isfa",
            Self::LayoutChangeInSegment => "layout_change_in_segment",
            Self::QqDepthConflict => "qq_depth_conflict",
            Self::QqDepthClamped => "qq_depth_clamped",
            Self::BadConfig => "bad_config",
            Self::NoTwpRge => "no_tr",
            Self::NoSection => "no_section",
            Self::NoText => "no_text",
        }
    }

    /// Whether this kind is recorded on the error channel.
    ///
    /// Error flags on a description set its `desc_is_flawed` bit.
    #[must_use]
    pub const fn is_error(self) -> bool {
        matches!(self, Self::NoTwpRge | Self::NoSection | Self::NoText)
    }
}

impl fmt::Display for FlagKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A diagnostic raised during parsing: a kind plus the supporting text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flag {
    kind: FlagKind,
    context: String,
}

impl Flag {
    /// Create a flag with supporting context text.
    pub fn new(kind: FlagKind, context: impl Into<String>) -> Self {
        Self {
            kind,
            context: context.into(),
        }
    }

    /// Create a flag with no supporting context.
    #[must_use]
    pub const fn bare(kind: FlagKind) -> Self {
        Self {
            kind,
            context: String::new(),
        }
    }

    /// The kind of anomaly.
    #[must_use]
    pub const fn kind(&self) -> FlagKind {
        self.kind
    }

    /// The supporting context text (may be empty).
    #[must_use]
    pub fn context(&self) -> &str {
        &self.context
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.context.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}<{}>", self.kind, self.context)
        }
    }
}
