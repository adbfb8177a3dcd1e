use std::{fmt, str::FromStr};

/// The syntactic order in which Twp/Rge, Section, and the description
/// body appear in a land description.
///
/// ```text
/// TRS_desc    T154N-R97W Section 14: NE/4
/// desc_STR    NE/4 of Section 14, T154N-R97W
/// S_desc_TR   Section 14: NE/4, T154N-R97W
/// TR_desc_S   T154N-R97W NE/4 of Section 14
/// copy_all    (stopgap: the whole text becomes one tract's description)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Layout {
    /// Twp/Rge, then section, then description.
    #[serde(rename = "TRS_desc")]
    TrsDesc,
    /// Description, then section, then Twp/Rge.
    #[serde(rename = "desc_STR")]
    DescStr,
    /// Section, then description, then Twp/Rge.
    #[serde(rename = "S_desc_TR")]
    SDescTr,
    /// Twp/Rge, then description, then section.
    #[serde(rename = "TR_desc_S")]
    TrDescS,
    /// No meaningful layout could be identified; copy the whole text.
    #[serde(rename = "copy_all")]
    CopyAll,
}

impl Layout {
    /// All implemented layouts.
    pub const ALL: [Self; 5] = [
        Self::TrsDesc,
        Self::DescStr,
        Self::SDescTr,
        Self::TrDescS,
        Self::CopyAll,
    ];

    /// The conventional spelling of this layout.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TrsDesc => "TRS_desc",
            Self::DescStr => "desc_STR",
            Self::SDescTr => "S_desc_TR",
            Self::TrDescS => "TR_desc_S",
            Self::CopyAll => "copy_all",
        }
    }

    /// Whether the description block follows its section in this layout.
    ///
    /// The colon policy applies only to these layouts.
    #[must_use]
    pub(crate) const fn sec_then_desc(self) -> bool {
        matches!(self, Self::TrsDesc | Self::SDescTr)
    }

    /// Whether Twp/Rge opens each block in this layout.
    #[must_use]
    pub(crate) const fn twprge_first(self) -> bool {
        matches!(self, Self::TrsDesc | Self::TrDescS)
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when a string names no implemented layout.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown layout {0:?}; expected one of TRS_desc, desc_STR, S_desc_TR, TR_desc_S, copy_all")]
pub struct UnknownLayout(String);

impl FromStr for Layout {
    type Err = UnknownLayout;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|layout| layout.as_str() == s)
            .ok_or_else(|| UnknownLayout(s.to_string()))
    }
}
