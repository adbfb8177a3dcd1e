use std::{
    io,
    path::{Path, PathBuf},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::domain::{Ew, Layout, Ns};

/// Configuration for a single parse.
///
/// All options are per-parse; nothing is persisted unless the caller
/// round-trips through [`ParseConfig::load`] / [`ParseConfig::save`].
/// Invalid entries in the string surface never abort construction — they
/// are collected as warnings and surfaced on the next parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct ParseConfig {
    /// Direction filled in for a township with no N/S.
    pub default_ns: Ns,

    /// Direction filled in for a range with no E/W.
    pub default_ew: Ew,

    /// Force a specific layout instead of auto-detecting.
    pub layout: Option<Layout>,

    /// Build the description object without parsing until commanded.
    pub wait_to_parse: bool,

    /// Parse each produced tract into lots and quarter-quarters.
    pub parse_qq: bool,

    /// Admit bare quarter tokens (`NE`) without a fraction context.
    pub clean_qq: bool,

    /// Require `:` after a section before accepting its description on
    /// the first pass (layouts where the description follows the section).
    pub require_colon: bool,

    /// Represent `N/2 of Lot 1` as `N2 of L1` (else just `L1`).
    pub include_lot_divisions: bool,

    /// Apply the narrow OCR normalizations during preprocessing.
    pub ocr_scrub: bool,

    /// Split the description at Twp/Rge seams and parse each segment
    /// under its own detected layout.
    pub segment: bool,

    /// Minimum aliquot expansion depth (2 = quarter-quarters).
    pub qq_depth_min: u8,

    /// Maximum aliquot expansion depth (unbounded if unset).
    pub qq_depth_max: Option<u8>,

    /// If set, overrides both minimum and maximum depth.
    pub qq_depth: Option<u8>,

    /// Break halves into quarters at every depth.
    pub break_halves: bool,

    /// Re-attach unclaimed text to a lone tract ("section within" parsing).
    pub sec_within: bool,

    /// Hard cap on expansion depth; requests beyond it are clamped and
    /// flagged. Counts grow as `4^depth`.
    pub qq_depth_cap: u8,

    /// Entries of the string surface that could not be understood.
    #[serde(skip)]
    pub(crate) warnings: Vec<String>,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            default_ns: Ns::North,
            default_ew: Ew::West,
            layout: None,
            wait_to_parse: false,
            parse_qq: false,
            clean_qq: false,
            require_colon: true,
            include_lot_divisions: true,
            ocr_scrub: false,
            segment: false,
            qq_depth_min: default_qq_depth_min(),
            qq_depth_max: None,
            qq_depth: None,
            break_halves: false,
            sec_within: false,
            qq_depth_cap: default_qq_depth_cap(),
            warnings: Vec::new(),
        }
    }
}

/// Errors that can occur loading or saving a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigFileError {
    /// The file could not be read.
    #[error("could not read configuration from {path}")]
    Read {
        /// The path that was being read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The file's content is not valid configuration TOML.
    #[error("invalid configuration TOML")]
    Parse(#[from] toml::de::Error),

    /// The configuration could not be serialized to TOML.
    #[error("configuration could not be serialized")]
    Serialize(#[from] toml::ser::Error),

    /// The file could not be written.
    #[error("could not write configuration to {path}")]
    Write {
        /// The path that was being written.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },
}

impl ParseConfig {
    /// Read a configuration from a TOML file.
    ///
    /// Options absent from the file keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigFileError::Read`] if the file cannot be read, or
    /// [`ConfigFileError::Parse`] if its content is not valid
    /// configuration TOML.
    pub fn load(path: &Path) -> Result<Self, ConfigFileError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigFileError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&content)?)
    }

    /// Write this configuration to a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigFileError::Serialize`] if the configuration cannot
    /// be rendered as TOML, or [`ConfigFileError::Write`] if the file
    /// cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), ConfigFileError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|source| ConfigFileError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

const fn default_qq_depth_min() -> u8 {
    2
}

const fn default_qq_depth_cap() -> u8 {
    6
}

/// Parse one `key.value` / `key=value` entry into `config`.
///
/// Returns `false` if the entry was not understood.
fn apply_entry(config: &mut ParseConfig, entry: &str) -> bool {
    let (key, value) = match entry.split_once(['.', '=']) {
        Some((key, value)) => (key, Some(value)),
        None => (entry, None),
    };

    fn as_bool(value: Option<&str>) -> Option<bool> {
        match value {
            // A bare flag name means "on".
            None | Some("True" | "true") => Some(true),
            Some("False" | "false") => Some(false),
            _ => None,
        }
    }

    fn as_depth(value: Option<&str>) -> Option<Option<u8>> {
        match value {
            Some("None") => Some(None),
            Some(v) => v.parse::<u8>().ok().map(Some),
            None => None,
        }
    }

    match key {
        "default_ns" => match value.and_then(|v| v.chars().next()) {
            Some(c) => match Ns::from_letter(c) {
                Some(ns) => {
                    config.default_ns = ns;
                    true
                }
                None => false,
            },
            None => false,
        },
        "default_ew" => match value.and_then(|v| v.chars().next()) {
            Some(c) => match Ew::from_letter(c) {
                Some(ew) => {
                    config.default_ew = ew;
                    true
                }
                None => false,
            },
            None => false,
        },
        "layout" => match value.and_then(|v| v.parse::<Layout>().ok()) {
            Some(layout) => {
                config.layout = Some(layout);
                true
            }
            None => false,
        },
        "wait_to_parse" => as_bool(value).map(|v| config.wait_to_parse = v).is_some(),
        "parse_qq" => as_bool(value).map(|v| config.parse_qq = v).is_some(),
        "clean_qq" => as_bool(value).map(|v| config.clean_qq = v).is_some(),
        "require_colon" => as_bool(value).map(|v| config.require_colon = v).is_some(),
        "include_lot_divisions" => as_bool(value)
            .map(|v| config.include_lot_divisions = v)
            .is_some(),
        "ocr_scrub" => as_bool(value).map(|v| config.ocr_scrub = v).is_some(),
        "segment" => as_bool(value).map(|v| config.segment = v).is_some(),
        "break_halves" => as_bool(value).map(|v| config.break_halves = v).is_some(),
        "sec_within" => as_bool(value).map(|v| config.sec_within = v).is_some(),
        "qq_depth_min" => match value.and_then(|v| v.parse::<u8>().ok()) {
            Some(depth) => {
                config.qq_depth_min = depth;
                true
            }
            None => false,
        },
        "qq_depth_max" => as_depth(value)
            .map(|depth| config.qq_depth_max = depth)
            .is_some(),
        "qq_depth" => as_depth(value).map(|depth| config.qq_depth = depth).is_some(),
        "qq_depth_cap" => match value.and_then(|v| v.parse::<u8>().ok()) {
            Some(cap) => {
                config.qq_depth_cap = cap;
                true
            }
            None => false,
        },
        _ => false,
    }
}

/// The comma-separated string surface never fails outright, so this error
/// is uninhabited; it exists to satisfy the [`FromStr`] contract.
#[derive(Debug, thiserror::Error)]
pub enum ParseConfigError {}

impl FromStr for ParseConfig {
    type Err = ParseConfigError;

    /// Parse the comma-separated convenience surface.
    ///
    /// Entries are separated by `,` or `;`; spaces are ignored. A bare
    /// `n`/`s` or `e`/`w` sets the matching default direction; a bare
    /// layout name forces that layout; a bare option name turns a boolean
    /// option on; `key.value` or `key=value` sets anything else.
    /// Unrecognized entries are collected as warnings, never errors.
    ///
    /// ```
    /// use landlex::ParseConfig;
    ///
    /// let config: ParseConfig = "s, e, parse_qq, qq_depth.3".parse().unwrap();
    /// assert_eq!(config.default_ns.letter(), 's');
    /// assert!(config.parse_qq);
    /// assert_eq!(config.qq_depth, Some(3));
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut config = Self::default();
        let text: String = s.chars().filter(|c| *c != ' ').collect();

        for entry in text.split([',', ';']).filter(|entry| !entry.is_empty()) {
            let understood = match entry {
                "n" | "s" => {
                    config.default_ns = Ns::from_letter(entry.chars().next().expect("non-empty"))
                        .expect("matched above");
                    true
                }
                "e" | "w" => {
                    config.default_ew = Ew::from_letter(entry.chars().next().expect("non-empty"))
                        .expect("matched above");
                    true
                }
                _ => match entry.parse::<Layout>() {
                    Ok(layout) => {
                        config.layout = Some(layout);
                        true
                    }
                    Err(_) => apply_entry(&mut config, entry),
                },
            };

            if !understood {
                config.warnings.push(entry.to_string());
            }
        }

        Ok(config)
    }
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the
/// domain type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_ns")]
        default_ns: Ns,

        #[serde(default = "default_ew")]
        default_ew: Ew,

        #[serde(default, skip_serializing_if = "Option::is_none")]
        layout: Option<Layout>,

        #[serde(default)]
        wait_to_parse: bool,

        #[serde(default)]
        parse_qq: bool,

        #[serde(default)]
        clean_qq: bool,

        #[serde(default = "yes")]
        require_colon: bool,

        #[serde(default = "yes")]
        include_lot_divisions: bool,

        #[serde(default)]
        ocr_scrub: bool,

        #[serde(default)]
        segment: bool,

        #[serde(default = "default_qq_depth_min")]
        qq_depth_min: u8,

        #[serde(default, skip_serializing_if = "Option::is_none")]
        qq_depth_max: Option<u8>,

        #[serde(default, skip_serializing_if = "Option::is_none")]
        qq_depth: Option<u8>,

        #[serde(default)]
        break_halves: bool,

        #[serde(default)]
        sec_within: bool,

        #[serde(default = "default_qq_depth_cap")]
        qq_depth_cap: u8,
    },
}

const fn default_ns() -> Ns {
    Ns::North
}

const fn default_ew() -> Ew {
    Ew::West
}

const fn yes() -> bool {
    true
}

impl From<Versions> for ParseConfig {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                default_ns,
                default_ew,
                layout,
                wait_to_parse,
                parse_qq,
                clean_qq,
                require_colon,
                include_lot_divisions,
                ocr_scrub,
                segment,
                qq_depth_min,
                qq_depth_max,
                qq_depth,
                break_halves,
                sec_within,
                qq_depth_cap,
            } => Self {
                default_ns,
                default_ew,
                layout,
                wait_to_parse,
                parse_qq,
                clean_qq,
                require_colon,
                include_lot_divisions,
                ocr_scrub,
                segment,
                qq_depth_min,
                qq_depth_max,
                qq_depth,
                break_halves,
                sec_within,
                qq_depth_cap,
                warnings: Vec::new(),
            },
        }
    }
}

impl From<ParseConfig> for Versions {
    fn from(config: ParseConfig) -> Self {
        Self::V1 {
            default_ns: config.default_ns,
            default_ew: config.default_ew,
            layout: config.layout,
            wait_to_parse: config.wait_to_parse,
            parse_qq: config.parse_qq,
            clean_qq: config.clean_qq,
            require_colon: config.require_colon,
            include_lot_divisions: config.include_lot_divisions,
            ocr_scrub: config.ocr_scrub,
            segment: config.segment,
            qq_depth_min: config.qq_depth_min,
            qq_depth_max: config.qq_depth_max,
            qq_depth: config.qq_depth,
            break_halves: config.break_halves,
            sec_within: config.sec_within,
            qq_depth_cap: config.qq_depth_cap,
        }
    }
}
