use std::fmt;

use crate::{
    domain::{Flag, Layout, ParseConfig, Tract},
    parse::extract,
};

/// A full PLSS land description, parsed into an ordered collection of
/// [`Tract`]s.
///
/// Parsing never fails: every anomaly is recorded as a warning or error
/// [`Flag`], and a structurally flawed description still yields a
/// stopgap tract holding the complete text so nothing is lost for
/// review.
///
/// ```
/// use landlex::{ParseConfig, PlssDescription};
///
/// let parsed = PlssDescription::parse(
///     "T154N-R97W Sec 14: NE/4, Sec 15: W/2",
///     ParseConfig::default(),
/// );
///
/// let trs: Vec<String> = parsed.tracts().iter().map(|t| t.trs().to_string()).collect();
/// assert_eq!(trs, ["154n97w14", "154n97w15"]);
/// ```
#[derive(Debug, Clone)]
pub struct PlssDescription {
    orig_desc: String,
    pp_desc: String,
    layout: Option<Layout>,
    source: Option<String>,
    tracts: Vec<Tract>,
    w_flags: Vec<Flag>,
    e_flags: Vec<Flag>,
    config: ParseConfig,
    parsed: bool,
}

impl PlssDescription {
    /// Build a description and parse it, honoring `wait_to_parse`: with
    /// that option set the object is returned unparsed and
    /// [`PlssDescription::parse_text`] triggers the work later.
    #[must_use]
    pub fn new(text: impl Into<String>, config: ParseConfig) -> Self {
        let mut description = Self {
            orig_desc: text.into(),
            pp_desc: String::new(),
            layout: None,
            source: None,
            tracts: Vec::new(),
            w_flags: Vec::new(),
            e_flags: Vec::new(),
            config,
            parsed: false,
        };
        if !description.config.wait_to_parse {
            description.parse_text();
        }
        description
    }

    /// Build a description and parse it unconditionally.
    #[must_use]
    pub fn parse(text: impl Into<String>, config: ParseConfig) -> Self {
        let mut description = Self::new(text, config);
        if !description.parsed {
            description.parse_text();
        }
        description
    }

    /// Attach an opaque source annotation (a file name, a database key,
    /// ...) that every tract will inherit. Set it before parsing.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        if self.parsed {
            // Already-emitted tracts hold copies; keep them consistent.
            let source = self.source.clone();
            for tract in &mut self.tracts {
                tract.source.clone_from(&source);
            }
        }
        self
    }

    /// Parse (or re-parse) the description text.
    ///
    /// Re-parsing replaces the tracts and flags; it does not accumulate
    /// across runs.
    pub fn parse_text(&mut self) {
        let outcome =
            extract::parse_description(&self.orig_desc, &self.config, self.source.as_deref());
        self.pp_desc = outcome.pp_text;
        self.layout = Some(outcome.layout);
        self.tracts = outcome.tracts;
        self.w_flags = outcome.w_flags;
        self.e_flags = outcome.e_flags;
        self.parsed = true;
    }

    /// The raw text this description was built from.
    #[must_use]
    pub fn orig_desc(&self) -> &str {
        &self.orig_desc
    }

    /// The preprocessed text (empty until parsed).
    #[must_use]
    pub fn pp_desc(&self) -> &str {
        &self.pp_desc
    }

    /// The layout the parse used (forced or detected); `None` until
    /// parsed.
    #[must_use]
    pub const fn layout(&self) -> Option<Layout> {
        self.layout
    }

    /// The opaque source annotation, if any.
    #[must_use]
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// The parsed tracts, in creation order.
    #[must_use]
    pub fn tracts(&self) -> &[Tract] {
        &self.tracts
    }

    /// Mutable access to the tracts (e.g. to re-parse one with a
    /// different depth).
    pub fn tracts_mut(&mut self) -> &mut [Tract] {
        &mut self.tracts
    }

    /// Warning flags, in emission order.
    #[must_use]
    pub fn w_flags(&self) -> &[Flag] {
        &self.w_flags
    }

    /// Error flags, in emission order.
    #[must_use]
    pub fn e_flags(&self) -> &[Flag] {
        &self.e_flags
    }

    /// Whether any error flag was raised. The caller decides whether a
    /// flawed description is disqualifying.
    #[must_use]
    pub fn desc_is_flawed(&self) -> bool {
        !self.e_flags.is_empty()
    }

    /// Whether the text has been parsed.
    #[must_use]
    pub const fn parse_complete(&self) -> bool {
        self.parsed
    }

    /// The configuration this description parses under.
    #[must_use]
    pub const fn config(&self) -> &ParseConfig {
        &self.config
    }
}

impl fmt::Display for PlssDescription {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, tract) in self.tracts.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}: {}", tract.trs(), tract.desc())?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a PlssDescription {
    type Item = &'a Tract;
    type IntoIter = std::slice::Iter<'a, Tract>;

    fn into_iter(self) -> Self::IntoIter {
        self.tracts.iter()
    }
}
