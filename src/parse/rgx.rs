//! The token library: every textual pattern the parser matches.
//!
//! All patterns are compiled once into process-wide statics and shared
//! read-only across parses; matcher construction is never on the hot
//! path. Matchers return spans through `regex::Captures` and never mutate
//! their input.
//!
//! The `regex` crate has no look-around, so boundary conditions the
//! patterns cannot express (e.g. "an aliquot must not be followed by a
//! degree symbol") are enforced by neighbor-character checks at the call
//! sites, using the spans reported here.

use std::sync::LazyLock;

use regex::Regex;

fn rx(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static pattern must compile")
}

// Deadspace between the pieces of a Twp/Rge: periods, dashes, commas.
const D: &str = r"[.,\-–—\s]*";
// Deadspace between the Twp and the Rge, which also tolerates stray
// semicolons, pipes, underscores, and tildes from scanned documents.
const D_TR: &str = r"[.,;|_~\-–—\s]";

// The word "Township", down to a bare "T", tolerating common misspellings.
const TWP_WORD: &str = r"T(?:w\.?|wp\.?|[ownship]{3,9})?";
// As above, but the misspelling tolerance extends to characters OCR
// commonly swaps into the word (0 for o, 1/l/I interchange, 5 for s).
const TWP_WORD_OCR: &str = r"T(?:w\.?|wp\.?|[ownship0l1I5]{3,9})?";
// The word "Range", down to a bare "R".
const RGE_WORD: &str = r"R[ange]{0,6}";

const NS: &str = r"N[orth]{0,5}|S[outh]{0,5}";
const EW: &str = r"W[est]{0,3}|E[ast]{0,3}";

// Digits as OCR might have mangled them (S/s for 5, O for 0, I/l/1
// interchange, stray brackets and pipes for 1).
const OCR_DIGITS: &str = r"[0-9SOIl|\]]";

/// The strict Twp/Rge pattern: the form the preprocessor rewrites text
/// *into*, and the only form the extractor trusts.
///
/// A range of a lone `2` is only accepted when written with an explicit
/// `R`/`Range`; otherwise aliquot text like `Lot 2, N2 W2` would be eaten
/// as `T2N-R2W`.
pub(crate) static TWPRGE: LazyLock<Regex> = LazyLock::new(|| rx(&twprge_pattern()));

fn twprge_pattern() -> String {
    let twp = format!(r"(?i)\b(?:{TWP_WORD}{D})?(?P<twpnum>\d{{1,3}}){D}(?P<ns>{NS}){D_TR}*");
    let rge = format!(
        r"(?:(?:{RGE_WORD}{D})?(?P<rgenum>\d{{2,3}}|[013-9])|{RGE_WORD}{D}(?P<rgenum_edge>2)){D}(?P<ew>{EW})"
    );
    format!("{twp}{rge}")
}

/// Preprocessor pattern: `T` and `R` present, either direction may be
/// missing (`T154-R97` and friends).
pub(crate) static PP_TWPRGE_NO_NSWE: LazyLock<Regex> = LazyLock::new(|| {
    let twp = format!(r"(?i)\b{TWP_WORD}{D}(?P<twpnum>\d{{1,3}}){D}(?P<ns>{NS})?{D_TR}+");
    let rge = format!(r"{RGE_WORD}{D}(?P<rgenum>\d{{1,3}}){D}(?P<ew>{EW})?");
    rx(&format!("{twp}{rge}"))
});

/// Preprocessor pattern: `T` and an E/W direction present, `R` and N/S
/// may be missing (`T154 97W`).
pub(crate) static PP_TWPRGE_NO_NSR: LazyLock<Regex> = LazyLock::new(|| {
    let twp = format!(r"(?i)\b{TWP_WORD}{D}(?P<twpnum>\d{{1,3}}){D}(?P<ns>{NS})?{D_TR}+");
    let rge = format!(r"(?:{RGE_WORD}{D})?(?P<rgenum>\d{{1,3}}){D}(?P<ew>{EW})");
    rx(&format!("{twp}{rge}"))
});

/// Preprocessor pattern: N/S direction and `R` present, `T` and E/W may
/// be missing (`154N R97`).
pub(crate) static PP_TWPRGE_NO_EWT: LazyLock<Regex> = LazyLock::new(|| {
    let twp = format!(r"(?i)\b(?:{TWP_WORD}{D})?(?P<twpnum>\d{{1,3}}){D}(?P<ns>{NS}){D_TR}+");
    let rge = format!(r"{RGE_WORD}{D}(?P<rgenum>\d{{1,3}}){D}(?P<ew>{EW})?");
    rx(&format!("{twp}{rge}"))
});

/// OCR-tolerant Twp/Rge: both directions required for context, but the
/// numbers may contain characters OCR swaps for digits (`TIS4N-R97W`).
pub(crate) static PP_TWPRGE_OCR: LazyLock<Regex> = LazyLock::new(|| {
    let twp = format!(r"(?i)\b{TWP_WORD_OCR}{D}(?P<twpnum>{OCR_DIGITS}{{1,3}}){D}(?P<ns>{NS}){D_TR}*");
    let rge = format!(r"(?:{RGE_WORD}{D})?(?P<rgenum>{OCR_DIGITS}{{2,3}}|[013-9SOIl|\]]){D}(?P<ew>{EW})");
    rx(&format!("{twp}{rge}"))
});

// "Principal Meridian", abbreviated or spelled out, with misspelling slack.
const PM: &str = r"(?:P\.?\s{0,10}M\.?|P{1,2}r{1,2}i{0,2}n{0,2}c{0,2}i{0,2}p{0,2}a{0,2}l{0,2}\s{0,10}M{1,2}e{0,2}r{0,2}i{0,2}d{0,2}i{0,2}a{0,2}n{0,2})";

/// A Twp/Rge followed (within a short gap) by a Principal Meridian
/// reference, which the preprocessor scrubs away.
pub(crate) static PP_TWPRGE_PM: LazyLock<Regex> = LazyLock::new(|| {
    rx(&format!(
        r"{}(?:\s*[:,;.\-–—]*\s*)(?:o*f*)?\s*(?:t*h*e*|t*e*h*|h*t*e|h*e*t*)?\s*(?:.{{0,25}})(?:\s*[:,;.\-–—]*){PM}",
        twprge_pattern()
    ))
});

/// A Twp/Rge with trailing commas and similar characters, which the
/// preprocessor trims off.
pub(crate) static PP_TWPRGE_COMMA: LazyLock<Regex> =
    LazyLock::new(|| rx(&format!(r"{}[\s:,;.\-–—]*", twprge_pattern())));

// The word "Section" or an equivalent symbol, tolerating misspellings.
const SEC_WORD: &str = r"(?:Section|Sect\.?|Sec\.?|Secion|Seciton|Secton|Sectn|Secn|§)";

// "through" or an equivalent symbol or abbreviation, for elided lists.
const THROUGH: &str = r"(?:[\-–—]|th[rough]{3,6}\.?|thru\.?|to)";

// What may come between the entries of an elided list. The section
// variant must not treat a colon as a separator: a colon after a section
// is the signal the colon policy keys on.
const INTERVENER: &str = r"(?:\s*(?:[/.,;:]|(?:[\-–—]|th[rough]{3,6}\.?|thru\.?|to)|and|&)\s*)+";
const SEC_INTERVENER: &str = r"(?:\s*(?:[/.,;]|(?:[\-–—]|th[rough]{3,6}\.?|thru\.?|to)|and|&)\s*)+";

/// The word "Section" with no number, used only to position the section
/// signature during layout detection.
pub(crate) static NO_NUM_SEC: LazyLock<Regex> =
    LazyLock::new(|| rx(&format!(r"(?i){SEC_WORD}(?P<plural>s)?")));

/// A section or multi-section: `Sections 14, 15 and 16`, `Secs 3 - 9`,
/// with an optional trailing colon captured for the colon policy.
///
/// Also matches a single section; `secnum_rightmost` is present only for
/// genuine multi-section matches (it reports the last repetition).
pub(crate) static MULTISEC: LazyLock<Regex> = LazyLock::new(|| {
    let first = format!(r"(?i){SEC_WORD}(?P<plural>s)?[.\-–—\s]*(?P<secnum>\d{{1,3}})");
    let rest = format!(
        r"(?:(?P<intervener>{SEC_INTERVENER})(?:{SEC_WORD}s?)?[.\-–—\s]*(?P<secnum_rightmost>\d{{1,3}}))*"
    );
    rx(&format!(r"{first}{rest}\s*(?P<colon>:)?"))
});

/// A (multi)section linked to a following Twp/Rge by a containment phrase
/// (`... of Section 4 of T154N-R97W ...`): evidence that the Twp/Rge is a
/// continuation of the same tract, not the start of a new block.
pub(crate) static SEC_TWPRGE_IN_BETWEEN: LazyLock<Regex> = LazyLock::new(|| {
    let secs = format!(
        r"(?i){SEC_WORD}s?[.\-–—\s]*\d{{1,3}}(?:(?:{SEC_INTERVENER})(?:{SEC_WORD}s?)?[.\-–—\s]*\d{{1,3}})*\s*"
    );
    let between =
        r"(?P<between>in|of|,|all\s*of|all\s*(?:with)?in|lying\s*(?:with)?in|that\s*lies\s*(?:with)?in)\s*";
    rx(&format!("{secs}{between}{}", twprge_pattern()))
});

// Stated lot acreage, in parentheses or square brackets: (38.29).
const ACREAGE: &str = r"(?:\(\d{0,3}\.?\d{0,6}\)|\[\d{0,3}\.?\d{0,6}\])";

const LOT_WORD: &str = r"(?:L\.?|Lt\.?|Lot)";

/// A lot or multi-lot: `Lot 3`, `L3`, `Lots 1 - 3, and Lot 5(38.29)`.
pub(crate) static MULTILOT: LazyLock<Regex> = LazyLock::new(|| rx(&multilot_pattern()));

fn multilot_pattern() -> String {
    let first = format!(r"(?i)\b{LOT_WORD}(?P<plural>s)?\s*(?P<lotnum>\d{{1,3}})\s*(?P<acreage>{ACREAGE})?");
    let rest = format!(
        r"(?:(?P<intervener>{INTERVENER})(?P<word_lot_rightmost>{LOT_WORD}(?:s)?\s*)?(?P<lotnum_rightmost>\d{{1,3}})\s*(?P<acreage_rightmost>{ACREAGE})?)*"
    );
    format!("{first}{rest}")
}

/// A multi-lot with an optional leading aliquot division (`N½ of Lots 1 -
/// 3`). Only meaningful after aliquots have been scrubbed to their
/// canonical glyph forms.
pub(crate) static MULTILOT_WITH_ALIQUOT: LazyLock<Regex> = LazyLock::new(|| {
    rx(&format!(
        r"(?:(?P<aliquot>(?:[NESW]½|(?:NE|NW|SE|SW)¼)+)\s*(?:(?i)of)?\s*)?(?P<lots>{})",
        multilot_pattern()
    ))
});

/// Extracts the acreage component adjacent to a lot number.
pub(crate) static LOT_ACRES_UNPACKER: LazyLock<Regex> =
    LazyLock::new(|| rx(&format!(r"\d{{1,3}}\s*(?P<acreage>{ACREAGE})")));

// Aliquot spellings without their fraction: quarters...
const NE_SIMPLE: &str = r"(?:N\s{0,2}E|North?[\s\-]*East|N\.\s{0,2}E\.)";
const NW_SIMPLE: &str = r"(?:N\s{0,2}W|North?[\s\-]*West|N\.\s{0,2}W\.)";
const SE_SIMPLE: &str = r"(?:S\s{0,2}E|South?[\s\-]*East|S\.\s{0,2}E\.)";
const SW_SIMPLE: &str = r"(?:S\s{0,2}W|South?[\s\-]*West|S\.\s{0,2}W\.)";
// ...and directions (for halves).
const N_SIMPLE: &str = r"(?:N\.?|No\.?|North?)";
const S_SIMPLE: &str = r"(?:S\.?|So\.?|South?)";
const E_SIMPLE: &str = r"(?:E\.?|East)";
const W_SIMPLE: &str = r"(?:W\.?|West)";

// "Quarter" / "One Quarter" / "1/4" / "¼".
const QUARTER_FRACTION: &str = r"(?:(?:One)?[\s\-]*Q[uarter]{3,7}|1\s*/\s*4|¼)";
// "Half" / "One Half" / "1/2" / "½".
const HALF_FRACTION: &str = r"(?:(?:One)?[\s\-]*Half|1\s*/\s*2|½)";

// Abbreviated forms with a short fraction. If whitespace separates the
// slash from the digit, whitespace is also required before the slash:
// "NE / 4" and "NE /4" are fine, "NE/ 4" is not.
const NE_SHORT: &str = r"(?:NE/?4|NE\s{1,2}(?:4|/\s{0,2}4))";
const NW_SHORT: &str = r"(?:NW/?4|NW\s{1,2}(?:4|/\s{0,2}4))";
const SE_SHORT: &str = r"(?:SE/?4|SE\s{1,2}(?:4|/\s{0,2}4))";
const SW_SHORT: &str = r"(?:SW/?4|SW\s{1,2}(?:4|/\s{0,2}4))";
const N2_SHORT: &str = r"(?:N/?2|N\s{1,2}(?:2|/\s{0,2}2))";
const S2_SHORT: &str = r"(?:S/?2|S\s{1,2}(?:2|/\s{0,2}2))";
const E2_SHORT: &str = r"(?:E/?2|E\s{1,2}(?:2|/\s{0,2}2))";
const W2_SHORT: &str = r"(?:W/?2|W\s{1,2}(?:2|/\s{0,2}2))";

fn quarter_rx(simple: &str, short: &str) -> Regex {
    rx(&format!(r"(?i)(?:{simple}\s*{QUARTER_FRACTION}|{short})"))
}

fn half_rx(simple: &str, short: &str) -> Regex {
    rx(&format!(r"(?i)(?:{simple}\s*{HALF_FRACTION}|{short})"))
}

fn clean_quarter_rx(simple: &str) -> Regex {
    rx(&format!(r"(?i){simple}\s*(?:{QUARTER_FRACTION})?"))
}

/// `NE/4`, `NE4`, `Northeast Quarter`, `NE¼`, ... in fraction-marked form.
pub(crate) static NE_QUARTER: LazyLock<Regex> = LazyLock::new(|| quarter_rx(NE_SIMPLE, NE_SHORT));
/// See [`NE_QUARTER`].
pub(crate) static NW_QUARTER: LazyLock<Regex> = LazyLock::new(|| quarter_rx(NW_SIMPLE, NW_SHORT));
/// See [`NE_QUARTER`].
pub(crate) static SE_QUARTER: LazyLock<Regex> = LazyLock::new(|| quarter_rx(SE_SIMPLE, SE_SHORT));
/// See [`NE_QUARTER`].
pub(crate) static SW_QUARTER: LazyLock<Regex> = LazyLock::new(|| quarter_rx(SW_SIMPLE, SW_SHORT));

/// `N/2`, `N2`, `North Half`, `N½`, ...
pub(crate) static N_HALF: LazyLock<Regex> = LazyLock::new(|| half_rx(N_SIMPLE, N2_SHORT));
/// See [`N_HALF`].
pub(crate) static S_HALF: LazyLock<Regex> = LazyLock::new(|| half_rx(S_SIMPLE, S2_SHORT));
/// See [`N_HALF`].
pub(crate) static E_HALF: LazyLock<Regex> = LazyLock::new(|| half_rx(E_SIMPLE, E2_SHORT));
/// See [`N_HALF`].
pub(crate) static W_HALF: LazyLock<Regex> = LazyLock::new(|| half_rx(W_SIMPLE, W2_SHORT));

/// Bare quarters admitted only under `clean_qq`: `NE` with no fraction.
pub(crate) static NE_CLEAN: LazyLock<Regex> = LazyLock::new(|| clean_quarter_rx(NE_SIMPLE));
/// See [`NE_CLEAN`].
pub(crate) static NW_CLEAN: LazyLock<Regex> = LazyLock::new(|| clean_quarter_rx(NW_SIMPLE));
/// See [`NE_CLEAN`].
pub(crate) static SE_CLEAN: LazyLock<Regex> = LazyLock::new(|| clean_quarter_rx(SE_SIMPLE));
/// See [`NE_CLEAN`].
pub(crate) static SW_CLEAN: LazyLock<Regex> = LazyLock::new(|| clean_quarter_rx(SW_SIMPLE));

/// `ALL`, with up to a few characters of trailing context. A context
/// capture means the `ALL` is qualified ("All of the ...") and must not
/// be taken as the whole section.
pub(crate) static ALL: LazyLock<Regex> =
    LazyLock::new(|| rx(r"(?i)\b(?P<all>ALL)(?P<context>.{1,6})?"));

/// A bare quarter that chains onto a cleaned half (`E½NE` → the NE part),
/// anchored so the caller can walk a chain step by step. The optional
/// leading `of the` is consumed with the step.
pub(crate) static HALF_CHAIN_STEP: LazyLock<Regex> = LazyLock::new(|| {
    rx(&format!(
        r"(?i)^\s*(?:of\s*(?:the\s*)?)?\s*(?P<q>{NE_SIMPLE}|{NW_SIMPLE}|{SE_SIMPLE}|{SW_SIMPLE})"
    ))
});

/// A canonical half glyph pair, the seed of a half-plus-quarter chain.
pub(crate) static HALF_GLYPH: LazyLock<Regex> = LazyLock::new(|| rx(r"[NESW]½"));

/// A run of canonical aliquot components: `N½NE¼`, `SE¼`, ...
pub(crate) static ALIQUOT_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| rx(r"(?:[NESW]½|(?:NE|NW|SE|SW)¼)+"));

/// One canonical aliquot component, with or without its fraction glyph.
/// Applied only to already-canonical blocks (or `ALL`).
pub(crate) static SINGLE_ALIQUOT: LazyLock<Regex> =
    LazyLock::new(|| rx(r"(?:(?P<comp>[NESW]{1,2}|ALL)[½¼]?)"));

/// Whitespace and `of`/`of the` between two canonical aliquot components,
/// to be removed: `N½ of NE¼` → `N½NE¼`.
pub(crate) static ALIQUOT_INTERVENER: LazyLock<Regex> = LazyLock::new(|| {
    rx(
        r"(?P<a1>(?:[NESW]½|(?:NE|NW|SE|SW)¼)+)(?:\s*(?:\s+|(?i:o+f*)|(?i:f))\s*(?i:t+h+e+|t+e+h+|t+h+|t+)?\s*)(?P<a2>[NESW]½|(?:NE|NW|SE|SW)¼)",
    )
});

/// Wellbore language worth a human look.
pub(crate) static WELL: LazyLock<Regex> = LazyLock::new(|| rx(r"(?i)\b(?:wellbore|well)\b"));

/// Depth-limiting language worth a human look.
pub(crate) static DEPTH: LazyLock<Regex> = LazyLock::new(|| {
    rx(r"(?i)(?:depths?|surf(?:ace)?|\bdown\b|form(?:ation)?|\btop\b|\bbase\b)")
});

/// "Including" language worth a human look.
pub(crate) static INCLUDING: LazyLock<Regex> = LazyLock::new(|| rx(r"(?i)\bincl"));

/// "Less and except" language worth a human look.
pub(crate) static LESS_EXCEPT: LazyLock<Regex> =
    LazyLock::new(|| rx(r"(?i)(?:\bless(?:\s*and\s*except)?|\bexcept|\blimit)"));

/// "Insofar" language worth a human look.
pub(crate) static ISFA: LazyLock<Regex> =
    LazyLock::new(|| rx(r"(?i)(?:(?:but\s*)?only\s*)?in\s*so\s*far"));

/// The thru-word matcher, used to classify a captured intervener.
pub(crate) static THROUGH_WORD: LazyLock<Regex> = LazyLock::new(|| rx(THROUGH));

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case("T154N-R97W"; "compact")]
    #[test_case("T-154-N-R-97-W"; "fully dashed")]
    #[test_case("Township 154 North, Range 97 West"; "verbose")]
    #[test_case("154N-97W"; "no T or R")]
    #[test_case("Twp. 154 N., Rge. 97 W."; "abbreviated with periods")]
    #[test_case("T2N-R2W"; "range two with explicit R")]
    fn twprge_matches(text: &str) {
        assert!(TWPRGE.is_match(text), "expected a Twp/Rge in {text:?}");
    }

    #[test]
    fn twprge_does_not_eat_aliquots() {
        // A lone rgenum of 2 requires an explicit "R"/"Range".
        assert!(!TWPRGE.is_match("Lot 2, N2 W2"));
    }

    #[test]
    fn twprge_capture_groups() {
        let caps = TWPRGE.captures("T154N-R97W").unwrap();
        assert_eq!(&caps["twpnum"], "154");
        assert_eq!(&caps["ns"], "N");
        assert_eq!(&caps["rgenum"], "97");
        assert_eq!(&caps["ew"], "W");
    }

    #[test]
    fn twprge_range_two_uses_edge_group() {
        let caps = TWPRGE.captures("T2N-R2W").unwrap();
        assert!(caps.name("rgenum").is_none());
        assert_eq!(&caps["rgenum_edge"], "2");
    }

    #[test_case("T154-R97"; "both directions missing")]
    #[test_case("T154N-R97"; "ew missing")]
    fn pp_no_nswe_matches(text: &str) {
        assert!(PP_TWPRGE_NO_NSWE.is_match(text));
    }

    #[test]
    fn ocr_pattern_accepts_mangled_digits() {
        let caps = PP_TWPRGE_OCR.captures("TIS4N-R97W").unwrap();
        assert_eq!(&caps["twpnum"], "IS4");
    }

    #[test_case("Section 14", "14"; "spelled out")]
    #[test_case("Sec. 14", "14"; "abbreviated")]
    #[test_case("§14", "14"; "symbol")]
    fn sec_matches(text: &str, num: &str) {
        let caps = MULTISEC.captures(text).unwrap();
        assert_eq!(&caps["secnum"], num);
    }

    #[test]
    fn multisec_single_section_has_no_rightmost()  {
        let caps = MULTISEC.captures("Sec 14: NE/4").unwrap();
        assert_eq!(&caps["secnum"], "14");
        assert!(caps.name("secnum_rightmost").is_none());
        assert_eq!(caps.name("colon").unwrap().as_str(), ":");
    }

    #[test]
    fn multisec_enumeration() {
        let caps = MULTISEC.captures("Sections 14, 15 and 16: ALL").unwrap();
        assert_eq!(&caps["secnum"], "14");
        assert_eq!(&caps["secnum_rightmost"], "16");
    }

    #[test]
    fn multisec_range_keeps_thru_intervener() {
        let caps = MULTISEC.captures("Sections 3 - 9").unwrap();
        assert_eq!(&caps["secnum"], "3");
        assert_eq!(&caps["secnum_rightmost"], "9");
        assert!(THROUGH_WORD.is_match(caps.name("intervener").unwrap().as_str()));
    }

    #[test]
    fn multisec_stops_before_prose() {
        let m = MULTISEC.find("Sec 14: NE/4, Sec 15: W/2").unwrap();
        assert_eq!(m.as_str().trim_end(), "Sec 14:");
    }

    #[test]
    fn multilot_with_acreage() {
        let caps = MULTILOT.captures("Lots 1 - 3, and Lot 5(38.29)").unwrap();
        assert_eq!(&caps["lotnum"], "1");
        assert_eq!(&caps["lotnum_rightmost"], "5");
        assert_eq!(&caps["acreage_rightmost"], "(38.29)");
    }

    #[test]
    fn multilot_with_leading_aliquot() {
        let caps = MULTILOT_WITH_ALIQUOT.captures("N½ of Lots 1 - 3").unwrap();
        assert_eq!(&caps["aliquot"], "N½");
        assert_eq!(&caps["lotnum"], "1");
    }

    #[test_case("NE/4"; "slash four")]
    #[test_case("NE4"; "bare four")]
    #[test_case("NE¼"; "glyph")]
    #[test_case("Northeast Quarter"; "verbose")]
    #[test_case("NE /4"; "space before slash")]
    fn ne_quarter_matches(text: &str) {
        assert!(NE_QUARTER.is_match(text), "expected NE quarter in {text:?}");
    }

    #[test]
    fn bare_ne_needs_clean_qq() {
        assert!(!NE_QUARTER.is_match("NE"));
        assert!(NE_CLEAN.is_match("NE"));
    }

    #[test_case("N/2"; "slash two")]
    #[test_case("N2"; "bare two")]
    #[test_case("North Half"; "verbose")]
    #[test_case("N½"; "glyph")]
    fn n_half_matches(text: &str) {
        assert!(N_HALF.is_match(text), "expected N half in {text:?}");
    }

    #[test]
    fn all_captures_context() {
        let caps = ALL.captures("All of the NE/4").unwrap();
        assert!(caps.name("context").is_some());

        let caps = ALL.captures("ALL").unwrap();
        assert!(caps.name("context").is_none());
    }

    #[test]
    fn aliquot_block_runs() {
        let m = ALIQUOT_BLOCK.find("the N½NE¼ of").unwrap();
        assert_eq!(m.as_str(), "N½NE¼");
    }

    #[test]
    fn aliquot_intervener_spans_of_the() {
        let caps = ALIQUOT_INTERVENER.captures("N½ of the NE¼").unwrap();
        assert_eq!(&caps["a1"], "N½");
        assert_eq!(&caps["a2"], "NE¼");
    }
}
