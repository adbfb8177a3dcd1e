//! Unpackers that turn regex matches into normalized components: Twp/Rge
//! matches into the standard abbreviation, and (multi)section and
//! (multi)lot text blocks into their full enumerated lists.

use std::collections::BTreeMap;

use regex::Captures;

use crate::{
    domain::{Ew, Flag, FlagKind, Ns},
    parse::rgx,
};

/// Convert a Twp/Rge match into the natural form `T154N-R97W`.
///
/// Missing directions are filled from the defaults. With `ocr_scrub`, the
/// numeric groups are first run through the character repairs.
pub(crate) fn unpack_twprge(
    caps: &Captures,
    default_ns: Ns,
    default_ew: Ew,
    ocr_scrub: bool,
) -> String {
    let mut twp_num = caps["twpnum"].to_string();
    if ocr_scrub {
        twp_num = ocr_scrub_alpha_to_num(&twp_num);
    }
    if let Ok(n) = twp_num.parse::<u32>() {
        twp_num = n.to_string();
    }

    let ns = caps.name("ns").map_or(default_ns.letter(), |m| {
        m.as_str().chars().next().expect("ns group is non-empty")
    });

    // "Range 2 [East/West]" alone requires "Range" before the number, to
    // avoid over-matching aliquot text; it lands in its own group.
    let mut rge_num = caps
        .name("rgenum")
        .or_else(|| caps.name("rgenum_edge"))
        .expect("every Twp/Rge pattern captures a range number")
        .as_str()
        .to_string();
    if ocr_scrub {
        rge_num = ocr_scrub_alpha_to_num(&rge_num);
    }
    if let Ok(n) = rge_num.parse::<u32>() {
        rge_num = n.to_string();
    }

    let ew = caps.name("ew").map_or(default_ew.letter(), |m| {
        m.as_str().chars().next().expect("ew group is non-empty")
    });

    format!(
        "T{twp_num}{}-R{rge_num}{}",
        ns.to_ascii_uppercase(),
        ew.to_ascii_uppercase()
    )
}

/// Convert a natural Twp/Rge (`T154N-R97W`) into the standard
/// abbreviation used throughout this crate (`154n97w`).
pub(crate) fn twprge_natural_to_short(twprge: &str) -> String {
    twprge
        .to_lowercase()
        .chars()
        .filter(|c| !matches!(c, 'r' | 't' | '-'))
        .collect()
}

/// Convert characters commonly mis-recognized by OCR to their apparently
/// intended numeric counterparts. Only safe on text that must be numeric
/// (the digit groups of a Twp/Rge match).
pub(crate) fn ocr_scrub_alpha_to_num(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            'S' | 's' => '5',
            'O' | 'o' => '0',
            'I' | 'i' | 'l' | 'L' | '|' | ']' => '1',
            other => other,
        })
        .collect()
}

fn is_multi(caps: &Captures, rightmost_group: &str) -> bool {
    caps.name(rightmost_group).is_some()
}

fn thru_rightmost(caps: &Captures) -> bool {
    // The intervener group reports the rightmost separator; a "through"
    // word earlier in the list must not count for this match.
    caps.name("intervener")
        .is_some_and(|m| rgx::THROUGH_WORD.is_match(m.as_str()))
}

fn start_of_rightmost(caps: &Captures) -> usize {
    caps.name("intervener")
        .map_or_else(|| caps.get(0).expect("match exists").start(), |m| m.start())
}

/// The sections pulled from one (multi)section text block, in the order
/// the text enumerates them, zero-padded to two digits.
#[derive(Debug, Default)]
pub(crate) struct SecUnpack {
    pub(crate) secs: Vec<String>,
    pub(crate) flags: Vec<Flag>,
}

/// Unpack a text block that matched the (multi)section pattern.
///
/// Elided lists are expanded; a high-to-low range is honored in that
/// order and flagged. The block is consumed right-to-left, shrinking the
/// search window to the start of the rightmost entry each round.
pub(crate) fn unpack_sections(text: &str) -> SecUnpack {
    let mut unpack = SecUnpack::default();
    let mut working: Vec<u32> = Vec::new();

    let mut endpos = text.len();
    let mut found_through = false;
    loop {
        let slice = &text[..endpos];
        let Some(caps) = rgx::MULTISEC.captures(slice) else {
            break;
        };

        let multi = is_multi(&caps, "secnum_rightmost");
        let num_str = if multi {
            &caps["secnum_rightmost"]
        } else {
            &caps["secnum"]
        };
        let sec_num: u32 = num_str.parse().expect("group is 1-3 digits");

        endpos = if multi { start_of_rightmost(&caps) } else { 0 };

        if found_through {
            let previous = *working.last().expect("through implies a prior entry");
            if sec_num < previous {
                for n in (sec_num..previous).rev() {
                    working.push(n);
                }
            } else {
                unpack.flags.push(Flag::new(
                    FlagKind::NonSequentialSecs,
                    format!("{sec_num} - {previous}"),
                ));
                for n in (previous + 1)..=sec_num {
                    working.push(n);
                }
            }
        } else {
            working.push(sec_num);
        }

        found_through = thru_rightmost(&caps);
        if endpos == 0 {
            break;
        }
    }

    working.reverse();
    unpack.secs = working.into_iter().map(|n| format!("{n:02}")).collect();
    unpack
}

/// Whether a (multi)section match covers more than one section.
pub(crate) fn sec_match_is_multi(caps: &Captures) -> bool {
    is_multi(caps, "secnum_rightmost")
}

/// The lots pulled from one (multi)lot text block, as `L1`, `L2`, ...
#[derive(Debug, Default)]
pub(crate) struct LotUnpack {
    pub(crate) lots: Vec<String>,
    pub(crate) lot_acres: BTreeMap<String, String>,
    pub(crate) flags: Vec<Flag>,
    /// How many lots (from the left) a leading aliquot division applies
    /// to: everything up to the second occurrence of the word "Lot(s)".
    pub(crate) aliquots_through: usize,
}

/// Unpack a text block that matched the (multi)lot pattern.
pub(crate) fn unpack_lots(text: &str) -> LotUnpack {
    let mut unpack = LotUnpack::default();
    let mut working: Vec<u32> = Vec::new();
    let mut word_lot_encountered = 0;

    let mut endpos = text.len();
    let mut found_through = false;
    loop {
        let slice = &text[..endpos];
        let Some(caps) = rgx::MULTILOT.captures(slice) else {
            break;
        };

        let multi = is_multi(&caps, "lotnum_rightmost");
        let num_str = if multi {
            &caps["lotnum_rightmost"]
        } else {
            &caps["lotnum"]
        };
        let lot_num: u32 = num_str.parse().expect("group is 1-3 digits");

        let acreage = rightmost_acreage(&caps, slice);

        endpos = if multi { start_of_rightmost(&caps) } else { 0 };

        if found_through {
            let previous = *working.last().expect("through implies a prior entry");
            if lot_num < previous {
                for n in (lot_num..previous).rev() {
                    working.push(n);
                }
            } else {
                unpack.flags.push(Flag::new(
                    FlagKind::NonSequentialLots,
                    format!("{lot_num} - {previous}"),
                ));
                for n in (previous + 1)..=lot_num {
                    working.push(n);
                }
            }
        } else {
            working.push(lot_num);
        }

        if multi && caps.name("word_lot_rightmost").is_some() {
            word_lot_encountered = working.len();
        }

        if let Some(acres) = acreage {
            let lot_name = format!("L{lot_num}");
            if let Some(existing) = unpack.lot_acres.get(&lot_name) {
                unpack.flags.push(Flag::new(
                    FlagKind::DupLotAcreage,
                    format!("{lot_name}({existing})"),
                ));
            }
            unpack.lot_acres.insert(lot_name, acres);
        }

        found_through = thru_rightmost(&caps);
        if endpos == 0 {
            break;
        }
    }

    working.reverse();
    unpack.aliquots_through = working.len() - word_lot_encountered;
    unpack.lots = working.into_iter().map(|n| format!("L{n}")).collect();
    unpack
}

/// The stated acreage (if any) next to the rightmost lot of a match.
fn rightmost_acreage(caps: &Captures, slice: &str) -> Option<String> {
    let i = start_of_rightmost(caps);
    let j = caps.get(0).expect("match exists").end();
    let acreage_caps = rgx::LOT_ACRES_UNPACKER.captures(&slice[i..j])?;
    let raw = acreage_caps.name("acreage").expect("pattern requires it");
    Some(
        raw.as_str()
            .chars()
            .filter(|c| !matches!(c, '(' | ')' | '[' | ']'))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    fn natural(text: &str) -> String {
        let caps = rgx::TWPRGE.captures(text).expect("test input must match");
        unpack_twprge(&caps, Ns::North, Ew::West, false)
    }

    #[test_case("T154N-R97W", "T154N-R97W"; "already natural")]
    #[test_case("Township 154 North, Range 97 West", "T154N-R97W"; "verbose")]
    #[test_case("154n-97w", "T154N-R97W"; "lowercase compact")]
    #[test_case("T054N-R097W", "T54N-R97W"; "leading zeros stripped")]
    #[test_case("T2N-R2W", "T2N-R2W"; "range two edge case")]
    fn twprge_unpacks_to_natural(text: &str, expected: &str) {
        assert_eq!(natural(text), expected);
    }

    #[test]
    fn missing_directions_take_defaults() {
        let caps = rgx::PP_TWPRGE_NO_NSWE.captures("T154-R97").unwrap();
        assert_eq!(unpack_twprge(&caps, Ns::North, Ew::West, false), "T154N-R97W");
        assert_eq!(unpack_twprge(&caps, Ns::South, Ew::East, false), "T154S-R97E");
    }

    #[test]
    fn ocr_digits_are_repaired() {
        let caps = rgx::PP_TWPRGE_OCR.captures("TIS4N-R97W").unwrap();
        assert_eq!(unpack_twprge(&caps, Ns::North, Ew::West, true), "T154N-R97W");
    }

    #[test]
    fn natural_to_short() {
        assert_eq!(twprge_natural_to_short("T154N-R97W"), "154n97w");
    }

    #[test_case("Section 14", &["14"]; "single")]
    #[test_case("Sections 14, 15 and 16", &["14", "15", "16"]; "enumeration")]
    #[test_case("Sections 14 - 17", &["14", "15", "16", "17"]; "range")]
    #[test_case("Sections 1 - 3, and 5 - 7", &["01", "02", "03", "05", "06", "07"]; "two ranges")]
    #[test_case("Sec 3", &["03"]; "zero padded")]
    fn sections_unpack(text: &str, expected: &[&str]) {
        let unpack = unpack_sections(text);
        assert_eq!(unpack.secs, expected);
        assert!(unpack.flags.is_empty());
    }

    #[test]
    fn descending_section_range_is_honored_and_flagged() {
        let unpack = unpack_sections("Sections 9 - 3");
        assert_eq!(unpack.secs, ["09", "08", "07", "06", "05", "04", "03"]);
        assert_eq!(unpack.flags.len(), 1);
        assert_eq!(unpack.flags[0].kind(), FlagKind::NonSequentialSecs);
        assert_eq!(unpack.flags[0].context(), "9 - 3");
    }

    #[test_case("Lot 3", &["L3"]; "single")]
    #[test_case("Lots 1 - 3", &["L1", "L2", "L3"]; "range")]
    #[test_case("Lots 1 - 4 and 6", &["L1", "L2", "L3", "L4", "L6"]; "range then standalone")]
    #[test_case("L1, L2", &["L1", "L2"]; "abbreviated")]
    fn lots_unpack(text: &str, expected: &[&str]) {
        let unpack = unpack_lots(text);
        assert_eq!(unpack.lots, expected);
    }

    #[test]
    fn descending_lot_range_is_flagged() {
        let unpack = unpack_lots("Lots 4 - 1");
        assert_eq!(unpack.lots, ["L4", "L3", "L2", "L1"]);
        assert_eq!(unpack.flags[0].kind(), FlagKind::NonSequentialLots);
    }

    #[test]
    fn lot_acreage_is_captured_without_brackets() {
        let unpack = unpack_lots("Lot 1(38.29), Lot 2[40.00]");
        assert_eq!(unpack.lots, ["L1", "L2"]);
        assert_eq!(unpack.lot_acres["L1"], "38.29");
        assert_eq!(unpack.lot_acres["L2"], "40.00");
    }

    #[test]
    fn aliquots_through_stops_at_second_lot_word() {
        // A leading aliquot would apply to Lots 1-3 but not Lot 5.
        let unpack = unpack_lots("Lots 1 - 3, and Lot 5");
        assert_eq!(unpack.lots, ["L1", "L2", "L3", "L5"]);
        assert_eq!(unpack.aliquots_through, 3);
    }

    #[test]
    fn aliquots_through_covers_all_without_second_lot_word() {
        let unpack = unpack_lots("Lots 1 - 3");
        assert_eq!(unpack.aliquots_through, 3);
    }
}
