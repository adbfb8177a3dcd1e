//! Minimal tabular export: one CSV row per tract.
//!
//! Fields are a closed enumeration with typed accessors — an unknown
//! field name is a recoverable error at this boundary, never a runtime
//! lookup failure. Rows are written in tract order, and flags never
//! suppress output; the caller decides what a flawed row means.

use std::{
    fmt,
    fs::{File, OpenOptions},
    io::{self, BufWriter, Write},
    path::Path,
    str::FromStr,
};

use crate::{PlssDescription, Tract};

/// One exportable tract attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum TractField {
    /// The composed Twp/Rge/Sec identifier (`154n97w14`).
    Trs,
    /// The township component (`154n`).
    Twp,
    /// The range component (`97w`).
    Rge,
    /// The section component (`14`).
    Sec,
    /// The raw description block.
    Desc,
    /// The preprocessed description block.
    PpDesc,
    /// Creation-order index within the parent description.
    OrigIndex,
    /// The opaque source annotation.
    Source,
    /// The lots, comma-joined.
    Lots,
    /// The quarter-quarters, comma-joined.
    Qqs,
    /// Lots then quarter-quarters, comma-joined.
    LotsQqs,
    /// Stated lot acreages, as `L1:38.29` pairs.
    LotAcres,
    /// Warning flags.
    WFlags,
    /// Error flags.
    EFlags,
    /// Whether the parent description raised any error flag.
    DescIsFlawed,
}

impl TractField {
    /// Every exportable field, in the conventional column order.
    pub const ALL: [Self; 15] = [
        Self::Trs,
        Self::Twp,
        Self::Rge,
        Self::Sec,
        Self::Desc,
        Self::PpDesc,
        Self::OrigIndex,
        Self::Source,
        Self::Lots,
        Self::Qqs,
        Self::LotsQqs,
        Self::LotAcres,
        Self::WFlags,
        Self::EFlags,
        Self::DescIsFlawed,
    ];

    /// The stable attribute name, as used in headers and [`FromStr`].
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Trs => "trs",
            Self::Twp => "twp",
            Self::Rge => "rge",
            Self::Sec => "sec",
            Self::Desc => "desc",
            Self::PpDesc => "pp_desc",
            Self::OrigIndex => "orig_index",
            Self::Source => "source",
            Self::Lots => "lots",
            Self::Qqs => "qqs",
            Self::LotsQqs => "lots_qqs",
            Self::LotAcres => "lot_acres",
            Self::WFlags => "w_flags",
            Self::EFlags => "e_flags",
            Self::DescIsFlawed => "desc_is_flawed",
        }
    }

    /// Render this field of `tract` as a cell value.
    #[must_use]
    pub fn value(self, tract: &Tract) -> String {
        match self {
            Self::Trs => tract.trs().to_string(),
            Self::Twp => tract.trs().twp().to_string(),
            Self::Rge => tract.trs().rge().to_string(),
            Self::Sec => tract.trs().sec().to_string(),
            Self::Desc => tract.desc().to_string(),
            Self::PpDesc => tract.pp_desc().to_string(),
            Self::OrigIndex => tract.orig_index().to_string(),
            Self::Source => tract.source().unwrap_or_default().to_string(),
            Self::Lots => tract.lots().join(", "),
            Self::Qqs => tract.qqs().join(", "),
            Self::LotsQqs => tract.lots_qqs().join(", "),
            Self::LotAcres => tract
                .lot_acres()
                .iter()
                .map(|(lot, acres)| format!("{lot}:{acres}"))
                .collect::<Vec<_>>()
                .join(","),
            Self::WFlags => join_flags(tract.w_flags()),
            Self::EFlags => join_flags(tract.e_flags()),
            Self::DescIsFlawed => tract.desc_is_flawed().to_string(),
        }
    }
}

fn join_flags(flags: &[crate::Flag]) -> String {
    flags
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

impl fmt::Display for TractField {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Error returned when a string names no exportable field.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown tract field {0:?}")]
pub struct UnknownField(String);

impl FromStr for TractField {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.name() == s)
            .ok_or_else(|| UnknownField(s.to_string()))
    }
}

/// Whether to replace the destination file or extend it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// Truncate the destination and write a fresh header.
    #[default]
    Overwrite,
    /// Extend the destination; the header is written only if the file
    /// is new or empty.
    Append,
}

/// Writes one CSV row per tract to any [`Write`] sink.
///
/// The same fields are written for every tract, in construction order.
///
/// ```
/// use landlex::{export::{TractField, TractWriter}, ParseConfig, PlssDescription};
///
/// let parsed = PlssDescription::parse("T154N-R97W Sec 14: NE/4", ParseConfig::default());
///
/// let mut out = Vec::new();
/// let mut writer = TractWriter::new(&mut out, &[TractField::Trs, TractField::Desc]).unwrap();
/// writer.write_description(&parsed).unwrap();
/// drop(writer);
///
/// let csv = String::from_utf8(out).unwrap();
/// assert_eq!(csv, "trs,desc\n154n97w14,NE/4\n");
/// ```
#[derive(Debug)]
pub struct TractWriter<W: Write> {
    sink: W,
    fields: Vec<TractField>,
}

impl<W: Write> TractWriter<W> {
    /// Create a writer and emit the header row (the field names).
    ///
    /// # Errors
    ///
    /// Returns an error if the header cannot be written.
    pub fn new(sink: W, fields: &[TractField]) -> io::Result<Self> {
        let headers: Vec<String> = fields.iter().map(|f| f.name().to_string()).collect();
        Self::with_headers(sink, fields, &headers)
    }

    /// Create a writer with custom header labels (one per field).
    ///
    /// # Errors
    ///
    /// Returns an error if the header cannot be written, or an
    /// [`io::ErrorKind::InvalidInput`] error if the label count does not
    /// match the field count.
    pub fn with_headers(sink: W, fields: &[TractField], headers: &[String]) -> io::Result<Self> {
        if headers.len() != fields.len() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} headers for {} fields", headers.len(), fields.len()),
            ));
        }
        let mut writer = Self::headerless(sink, fields);
        writer.write_row(headers.iter().map(String::as_str))?;
        Ok(writer)
    }

    fn headerless(sink: W, fields: &[TractField]) -> Self {
        Self {
            sink,
            fields: fields.to_vec(),
        }
    }

    /// Write one row for `tract`.
    ///
    /// # Errors
    ///
    /// Returns an error if the row cannot be written.
    pub fn write_tract(&mut self, tract: &Tract) -> io::Result<()> {
        let cells: Vec<String> = self.fields.iter().map(|f| f.value(tract)).collect();
        self.write_row(cells.iter().map(String::as_str))
    }

    /// Write one row per tract of `description`, in tract order.
    ///
    /// Returns the number of rows written. Flags on the description do
    /// not suppress any row.
    ///
    /// # Errors
    ///
    /// Returns an error if a row cannot be written.
    pub fn write_description(&mut self, description: &PlssDescription) -> io::Result<usize> {
        let mut written = 0;
        for tract in description {
            self.write_tract(tract)?;
            written += 1;
        }
        Ok(written)
    }

    fn write_row<'a>(&mut self, cells: impl Iterator<Item = &'a str>) -> io::Result<()> {
        let mut first = true;
        for cell in cells {
            if !first {
                self.sink.write_all(b",")?;
            }
            first = false;
            self.sink.write_all(escape(cell).as_bytes())?;
        }
        self.sink.write_all(b"\n")
    }

    /// Flush and hand back the sink.
    ///
    /// # Errors
    ///
    /// Returns an error if flushing fails.
    pub fn finish(mut self) -> io::Result<W> {
        self.sink.flush()?;
        Ok(self.sink)
    }
}

impl TractWriter<BufWriter<File>> {
    /// Open a CSV file at `path` for tract export.
    ///
    /// In [`WriteMode::Append`] the header row is suppressed when the
    /// file already has content.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or the header
    /// cannot be written.
    pub fn create(path: &Path, fields: &[TractField], mode: WriteMode) -> io::Result<Self> {
        let (file, want_header) = match mode {
            WriteMode::Overwrite => (File::create(path)?, true),
            WriteMode::Append => {
                let file = OpenOptions::new().create(true).append(true).open(path)?;
                let empty = file.metadata()?.len() == 0;
                (file, empty)
            }
        };
        let sink = BufWriter::new(file);
        if want_header {
            Self::new(sink, fields)
        } else {
            Ok(Self::headerless(sink, fields))
        }
    }
}

/// Quote a cell per RFC 4180 when it contains a delimiter, quote, or
/// newline.
fn escape(cell: &str) -> String {
    if cell.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}
