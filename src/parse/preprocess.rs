//! Text normalization ahead of parsing: Twp/Rge completion (filling in
//! missing directions from the configured defaults), optional OCR
//! repairs, Principal Meridian scrubbing, and whitespace canonicalization.
//!
//! Preprocessing is idempotent: feeding its output back through produces
//! identical text, and no completion flags re-fire because no new Twp/Rge
//! becomes recoverable on the second run.

use std::sync::LazyLock;

use regex::Regex;

use crate::{
    domain::{Ew, Ns},
    parse::{rgx, unpack},
};

/// The result of preprocessing one description.
#[derive(Debug)]
pub(crate) struct Preprocessed {
    /// The normalized text.
    pub(crate) text: String,
    /// Twp/Rge's (standard abbreviation) that became recoverable through
    /// preprocessing — i.e. had been missing a direction or both.
    pub(crate) fixed_twprges: Vec<String>,
    /// Twp/Rge's whose digits were repaired by the OCR scrubber.
    pub(crate) ocr_fixed: Vec<String>,
}

/// Normalize `text` for parsing.
pub(crate) fn preprocess(
    text: &str,
    default_ns: Ns,
    default_ew: Ew,
    ocr_scrub: bool,
) -> Preprocessed {
    // Twp/Rge's recoverable before any rewriting, so completions can be
    // told apart from what was already present.
    let original = find_twprge(text, default_ns, default_ew);

    let mut working = text.to_string();
    let mut ocr_fixed = Vec::new();

    if ocr_scrub {
        working = scrub(&rgx::PP_TWPRGE_OCR, &working, default_ns, default_ew, true, &mut ocr_fixed);
    }

    let mut sink = Vec::new();
    for pattern in [
        &*rgx::TWPRGE,
        &*rgx::PP_TWPRGE_NO_NSWE,
        &*rgx::PP_TWPRGE_NO_NSR,
        &*rgx::PP_TWPRGE_NO_EWT,
        &*rgx::PP_TWPRGE_PM,
        &*rgx::PP_TWPRGE_COMMA,
    ] {
        working = scrub(pattern, &working, default_ns, default_ew, false, &mut sink);
    }

    let working = reduce_whitespace(&working);

    let mut fixed_twprges = find_twprge(&working, default_ns, default_ew);
    for twprge in &original {
        if let Some(pos) = fixed_twprges.iter().position(|t| t == twprge) {
            fixed_twprges.remove(pos);
        }
    }

    tracing::debug!(
        fixed = fixed_twprges.len(),
        ocr = ocr_fixed.len(),
        "preprocessed description"
    );

    Preprocessed {
        text: working,
        fixed_twprges,
        ocr_fixed,
    }
}

/// All Twp/Rge's recoverable from `text` by the strict pattern, in the
/// standard abbreviation (`154n97w`).
pub(crate) fn find_twprge(text: &str, default_ns: Ns, default_ew: Ew) -> Vec<String> {
    rgx::TWPRGE
        .captures_iter(text)
        .map(|caps| {
            unpack::twprge_natural_to_short(&unpack::unpack_twprge(
                &caps, default_ns, default_ew, false,
            ))
        })
        .collect()
}

/// Rewrite every match of `pattern` into the clean natural form, keeping
/// a trailing space so the Twp/Rge stays separated from what follows.
///
/// Spans are rebuilt left-to-right; text between matches is untouched.
fn scrub(
    pattern: &Regex,
    text: &str,
    default_ns: Ns,
    default_ew: Ew,
    ocr: bool,
    ocr_fixed: &mut Vec<String>,
) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;

    for caps in pattern.captures_iter(text) {
        let whole = caps.get(0).expect("match exists");
        let natural = unpack::unpack_twprge(&caps, default_ns, default_ew, ocr);

        if ocr && twprge_digits_were_repaired(&caps) {
            ocr_fixed.push(unpack::twprge_natural_to_short(&natural));
        }

        out.push_str(&text[last..whole.start()]);
        out.push_str(&natural);
        out.push(' ');
        last = whole.end();
    }
    out.push_str(&text[last..]);
    out
}

fn twprge_digits_were_repaired(caps: &regex::Captures) -> bool {
    let digits_only = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    !digits_only(&caps["twpnum"])
        || !caps
            .name("rgenum")
            .or_else(|| caps.name("rgenum_edge"))
            .is_some_and(|m| digits_only(m.as_str()))
}

static SPACES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]+").expect("static pattern must compile"));
static BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("static pattern must compile"));

/// Canonicalize whitespace: runs of spaces and tabs collapse to one
/// space, carriage returns become newlines, and blank-line runs cap at
/// one blank line.
pub(crate) fn reduce_whitespace(text: &str) -> String {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    let text = SPACES.replace_all(&text, " ");
    let text = BLANK_LINES.replace_all(&text, "\n\n");
    text.trim().to_string()
}
