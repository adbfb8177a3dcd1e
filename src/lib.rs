//! Parsing of U.S. Public Land Survey System (PLSS) land descriptions.
//!
//! A raw description such as `"T154N-R97W Sec 14: NE/4"` is parsed into one
//! [`Tract`] per section, each carrying a normalized [`Trs`] identifier and
//! (optionally) the lots and quarter-quarters described for that section.
//!
//! ```
//! use landlex::{ParseConfig, PlssDescription};
//!
//! let config: ParseConfig = "parse_qq".parse().unwrap();
//! let parsed = PlssDescription::parse("T154N-R97W Sec 14: NE/4", config);
//!
//! let tract = &parsed.tracts()[0];
//! assert_eq!(tract.trs().to_string(), "154n97w14");
//! assert_eq!(tract.qqs(), ["NENE", "NWNE", "SENE", "SWNE"]);
//! ```
//!
//! Parsing never fails: anomalies are recorded as warning and error
//! [`Flag`]s on the description and its tracts, and the caller decides
//! whether a flawed description is disqualifying.

mod domain;
pub use domain::{
    ConfigFileError, Ew, Flag, FlagKind, Layout, Ns, ParseConfig, ParseConfigError,
    PlssDescription, Rge, Sec, Tract, Trs, TrsError, Twp,
};

mod parse;

pub mod export;
