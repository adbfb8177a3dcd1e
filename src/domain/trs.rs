use std::{fmt, str::FromStr, sync::LazyLock};

use regex::Regex;

/// North/south direction of a township.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub enum Ns {
    /// North of the baseline.
    #[serde(rename = "n")]
    North,
    /// South of the baseline.
    #[serde(rename = "s")]
    South,
}

impl Ns {
    /// The single-letter abbreviation (`'n'` or `'s'`).
    #[must_use]
    pub const fn letter(self) -> char {
        match self {
            Self::North => 'n',
            Self::South => 's',
        }
    }

    pub(crate) fn from_letter(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'n' => Some(Self::North),
            's' => Some(Self::South),
            _ => None,
        }
    }
}

impl fmt::Display for Ns {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// East/west direction of a range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub enum Ew {
    /// East of the principal meridian.
    #[serde(rename = "e")]
    East,
    /// West of the principal meridian.
    #[serde(rename = "w")]
    West,
}

impl Ew {
    /// The single-letter abbreviation (`'e'` or `'w'`).
    #[must_use]
    pub const fn letter(self) -> char {
        match self {
            Self::East => 'e',
            Self::West => 'w',
        }
    }

    pub(crate) fn from_letter(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'e' => Some(Self::East),
            'w' => Some(Self::West),
            _ => None,
        }
    }
}

impl fmt::Display for Ew {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// A township component: number and direction, or one of the sentinels.
///
/// Renders as e.g. `154n`, or `___z` (undefined) / `XXXz` (error).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Twp {
    /// A well-formed township (1-3 digit number plus direction).
    Defined {
        /// Township number (1-999).
        num: u16,
        /// North/south direction.
        dir: Ns,
    },
    /// No township was provided.
    Undefined,
    /// A township was expected but could not be recovered.
    Error,
}

impl fmt::Display for Twp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Defined { num, dir } => write!(f, "{num}{dir}"),
            Self::Undefined => write!(f, "___z"),
            Self::Error => write!(f, "XXXz"),
        }
    }
}

/// A range component: number and direction, or one of the sentinels.
///
/// Renders as e.g. `97w`, or `___z` (undefined) / `XXXz` (error).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rge {
    /// A well-formed range (1-3 digit number plus direction).
    Defined {
        /// Range number (1-999).
        num: u16,
        /// East/west direction.
        dir: Ew,
    },
    /// No range was provided.
    Undefined,
    /// A range was expected but could not be recovered.
    Error,
}

impl fmt::Display for Rge {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Defined { num, dir } => write!(f, "{num}{dir}"),
            Self::Undefined => write!(f, "___z"),
            Self::Error => write!(f, "XXXz"),
        }
    }
}

/// A section component: a zero-padded 2-digit number, or a sentinel.
///
/// Renders as e.g. `14` or `06`, or `__` (undefined) / `XX` (error).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sec {
    /// A well-formed section number.
    Defined(u8),
    /// No section was provided.
    Undefined,
    /// A section was expected but could not be recovered.
    Error,
}

impl fmt::Display for Sec {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Defined(num) => write!(f, "{num:02}"),
            Self::Undefined => write!(f, "__"),
            Self::Error => write!(f, "XX"),
        }
    }
}

/// A normalized Township/Range/Section identifier.
///
/// The composed form is the concatenation of the three components, e.g.
/// `154n97w14`. Undefined and error components use the sentinel spellings
/// (`___z` / `XXXz` for Twp and Rge, `__` / `XX` for Sec), so every `Trs`
/// round-trips through its string form:
///
/// ```
/// use landlex::Trs;
///
/// let trs: Trs = "154n97w14".parse().unwrap();
/// assert_eq!(trs.twp_num(), Some(154));
/// assert_eq!(trs.sec_num(), Some(14));
/// assert_eq!(trs.to_string(), "154n97w14");
///
/// let error: Trs = "XXXzXXXz14".parse().unwrap();
/// assert!(error.is_error());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Trs {
    twp: Twp,
    rge: Rge,
    sec: Sec,
}

static TRS_UNPACKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<twp>\d{1,3}[nsNS]|XXXz|___z)(?P<rge>\d{1,3}[ewEW]|XXXz|___z)(?P<sec>\d{2}|XX|__)?$",
    )
    .expect("static pattern must compile")
});

impl Trs {
    /// The fully-undefined identifier, `___z___z__`.
    pub const UNDEFINED: Self = Self {
        twp: Twp::Undefined,
        rge: Rge::Undefined,
        sec: Sec::Undefined,
    };

    /// The fully-errored identifier, `XXXzXXXzXX`.
    pub const ERROR: Self = Self {
        twp: Twp::Error,
        rge: Rge::Error,
        sec: Sec::Error,
    };

    /// Construct from pre-validated components.
    #[must_use]
    pub const fn new(twp: Twp, rge: Rge, sec: Sec) -> Self {
        Self { twp, rge, sec }
    }

    /// The township component.
    #[must_use]
    pub const fn twp(&self) -> Twp {
        self.twp
    }

    /// The range component.
    #[must_use]
    pub const fn rge(&self) -> Rge {
        self.rge
    }

    /// The section component.
    #[must_use]
    pub const fn sec(&self) -> Sec {
        self.sec
    }

    /// Township number, if the township is well-formed.
    #[must_use]
    pub const fn twp_num(&self) -> Option<u16> {
        match self.twp {
            Twp::Defined { num, .. } => Some(num),
            _ => None,
        }
    }

    /// Township direction, if the township is well-formed.
    #[must_use]
    pub const fn twp_ns(&self) -> Option<Ns> {
        match self.twp {
            Twp::Defined { dir, .. } => Some(dir),
            _ => None,
        }
    }

    /// Range number, if the range is well-formed.
    #[must_use]
    pub const fn rge_num(&self) -> Option<u16> {
        match self.rge {
            Rge::Defined { num, .. } => Some(num),
            _ => None,
        }
    }

    /// Range direction, if the range is well-formed.
    #[must_use]
    pub const fn rge_ew(&self) -> Option<Ew> {
        match self.rge {
            Rge::Defined { dir, .. } => Some(dir),
            _ => None,
        }
    }

    /// Section number, if the section is well-formed.
    #[must_use]
    pub const fn sec_num(&self) -> Option<u8> {
        match self.sec {
            Sec::Defined(num) => Some(num),
            _ => None,
        }
    }

    /// The Twp/Rge portion of the composed form, e.g. `154n97w`.
    #[must_use]
    pub fn twprge(&self) -> String {
        format!("{}{}", self.twp, self.rge)
    }

    /// Whether any component is the undefined sentinel.
    ///
    /// Error components do *not* count as undefined.
    #[must_use]
    pub const fn is_undef(&self) -> bool {
        matches!(self.twp, Twp::Undefined)
            || matches!(self.rge, Rge::Undefined)
            || matches!(self.sec, Sec::Undefined)
    }

    /// Whether any component is the error sentinel.
    ///
    /// Undefined components do *not* count as errors.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self.twp, Twp::Error)
            || matches!(self.rge, Rge::Error)
            || matches!(self.sec, Sec::Error)
    }
}

impl Default for Trs {
    fn default() -> Self {
        Self::UNDEFINED
    }
}

impl fmt::Display for Trs {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}{}", self.twp, self.rge, self.sec)
    }
}

/// Errors that can occur when parsing a composed `Trs` string.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    /// The string does not have the `<twp><rge><sec>` shape.
    #[error("invalid TRS format: {0:?}")]
    Syntax(String),

    /// A numeric component is out of range.
    #[error("invalid {component} number in TRS {trs:?}")]
    Number {
        /// Which component was out of range.
        component: &'static str,
        /// The offending input.
        trs: String,
    },
}

fn parse_twp(s: &str) -> Result<Twp, Error> {
    match s {
        "XXXz" => Ok(Twp::Error),
        "___z" => Ok(Twp::Undefined),
        _ => {
            let (num, dir) = s.split_at(s.len() - 1);
            let dir = Ns::from_letter(dir.chars().next().expect("regex guarantees a direction"))
                .ok_or_else(|| Error::Syntax(s.to_string()))?;
            let num = num.parse::<u16>().map_err(|_| Error::Number {
                component: "township",
                trs: s.to_string(),
            })?;
            Ok(Twp::Defined { num, dir })
        }
    }
}

fn parse_rge(s: &str) -> Result<Rge, Error> {
    match s {
        "XXXz" => Ok(Rge::Error),
        "___z" => Ok(Rge::Undefined),
        _ => {
            let (num, dir) = s.split_at(s.len() - 1);
            let dir = Ew::from_letter(dir.chars().next().expect("regex guarantees a direction"))
                .ok_or_else(|| Error::Syntax(s.to_string()))?;
            let num = num.parse::<u16>().map_err(|_| Error::Number {
                component: "range",
                trs: s.to_string(),
            })?;
            Ok(Rge::Defined { num, dir })
        }
    }
}

fn parse_sec(s: &str) -> Result<Sec, Error> {
    match s {
        "XX" => Ok(Sec::Error),
        "__" => Ok(Sec::Undefined),
        _ => {
            let num = s.parse::<u8>().map_err(|_| Error::Number {
                component: "section",
                trs: s.to_string(),
            })?;
            Ok(Sec::Defined(num))
        }
    }
}

impl FromStr for Trs {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = TRS_UNPACKER
            .captures(s)
            .ok_or_else(|| Error::Syntax(s.to_string()))?;

        let twp = parse_twp(&caps["twp"])?;
        let rge = parse_rge(&caps["rge"])?;
        let sec = caps
            .name("sec")
            .map_or(Ok(Sec::Undefined), |m| parse_sec(m.as_str()))?;

        Ok(Self { twp, rge, sec })
    }
}

impl TryFrom<&str> for Trs {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::from_str(value)
    }
}
