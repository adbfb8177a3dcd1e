//! Per-tract lot and aliquot parsing: scrub the description block into
//! canonical tokens, pull the lots (with acreages and divisions), pull
//! the aliquot blocks, and expand each block to the configured depth.

use std::collections::BTreeMap;

use regex::Regex;

use crate::{
    domain::{Flag, FlagKind, ParseConfig},
    parse::{aliquot, extract, rgx, unpack},
};

/// Everything one tract-text parse produces.
#[derive(Debug, Default)]
pub(crate) struct TractParseOutcome {
    /// The scrubbed (preprocessed) copy of the tract text.
    pub(crate) text: String,
    pub(crate) lots: Vec<String>,
    pub(crate) qqs: Vec<String>,
    pub(crate) lot_acres: BTreeMap<String, String>,
    pub(crate) w_flags: Vec<Flag>,
}

/// Parse one tract's description block.
pub(crate) fn parse_tract_text(text: &str, config: &ParseConfig) -> TractParseOutcome {
    let mut outcome = TractParseOutcome::default();

    let scrubbed = scrub_aliquots(text, config.clean_qq);
    outcome.text.clone_from(&scrubbed);
    let mut working = scrubbed;

    // Lots come out first, together with any leading aliquot division
    // ('N½ of Lot 1' must read as a whole, not as 'N½' and 'Lot 1').
    // Extracted spans are replaced with ';;' so the leftovers cannot
    // recombine into false aliquots.
    let mut rounds = working.len() + 1;
    loop {
        if rounds == 0 {
            break;
        }
        rounds -= 1;

        let (start, end, leading_aliquot, lots_text) = {
            let Some(caps) = rgx::MULTILOT_WITH_ALIQUOT.captures(&working) else {
                break;
            };
            let whole = caps.get(0).expect("match exists");
            (
                whole.start(),
                whole.end(),
                caps.name("aliquot").map(|m| m.as_str().to_string()),
                caps["lots"].to_string(),
            )
        };
        working = format!("{};;{}", &working[..start], &working[end..]);

        let unpacked = unpack::unpack_lots(&lots_text);
        outcome.w_flags.extend(unpacked.flags);

        let mut new_lots = unpacked.lots;
        if config.include_lot_divisions {
            if let Some(division) = leading_aliquot {
                let division = division.replace('¼', "").replace('½', "2");
                for lot in new_lots.iter_mut().take(unpacked.aliquots_through) {
                    *lot = format!("{division} of {lot}");
                }
            }
        }
        outcome.lots.extend(new_lots);

        for (lot, acres) in unpacked.lot_acres {
            if let Some(existing) = outcome.lot_acres.get(&lot) {
                outcome
                    .w_flags
                    .push(Flag::new(FlagKind::DupLotAcreage, format!("{lot}({existing})")));
            }
            outcome.lot_acres.insert(lot, acres);
        }
    }

    // Then the aliquot blocks, same replacement scheme.
    let mut blocks = Vec::new();
    let mut search_from = 0;
    let mut rounds = working.len() + 1;
    while search_from < working.len() && rounds > 0 {
        rounds -= 1;
        let (start, end) = {
            let Some(found) = rgx::ALIQUOT_BLOCK.find_at(&working, search_from) else {
                break;
            };
            (found.start(), found.end())
        };
        if !block_boundary_ok(&working, start, end) {
            search_from = next_char_boundary(&working, start);
            continue;
        }
        blocks.push(working[start..end].to_string());
        working = format!("{};;{}", &working[..start], &working[end..]);
        search_from = 0;
    }

    // 'ALL' counts as the whole section only when free of any context
    // ("All of the ..." must not).
    let collapsed = collapse_whitespace(&working);
    if let Some(caps) = rgx::ALL.captures(&collapsed) {
        if caps.name("context").is_none() {
            blocks.push("ALL".to_string());
            working = working.replacen("ALL", ";;", 1);
        }
    }

    let bounds = aliquot::resolve_depths(config, &mut outcome.w_flags);
    for block in &blocks {
        outcome.qqs.extend(aliquot::expand_aliquot(block, bounds));
    }

    dedupe(&mut outcome.lots, FlagKind::DupLot, &mut outcome.w_flags);
    dedupe(&mut outcome.qqs, FlagKind::DupQq, &mut outcome.w_flags);

    // Whatever text neither the lots nor the aliquots claimed.
    let residue = extract::cleanup_desc(&working.replace(";;", " "));
    if residue.len() >= extract::MIN_REPORTABLE_UNUSED_LEN
        && residue.chars().any(char::is_alphanumeric)
    {
        outcome
            .w_flags
            .push(Flag::new(FlagKind::UnparsedText, extract::excerpt(&residue, 0, 60)));
    }

    outcome
}

/// Drop duplicate entries (keeping first occurrences) and flag them.
fn dedupe(items: &mut Vec<String>, kind: FlagKind, flags: &mut Vec<Flag>) {
    let mut seen = Vec::new();
    let mut duplicates = Vec::new();
    items.retain(|item| {
        if seen.contains(item) {
            duplicates.push(item.clone());
            false
        } else {
            seen.push(item.clone());
            true
        }
    });
    if !duplicates.is_empty() {
        flags.push(Flag::new(kind, duplicates.join(",")));
    }
}

/// Convert every aliquot spelling in `text` to the canonical glyph form:
/// `NE/4` / `Northeast Quarter` -> `NE¼`, `N/2` -> `N½`, compound
/// `E½NE` -> `E½NE¼`, and drop intervening `of the` between components.
pub(crate) fn scrub_aliquots(text: &str, clean_qq: bool) -> String {
    let mut text = text.to_string();

    let quarters: [(&Regex, &str); 4] = [
        (&rgx::NE_QUARTER, "NE¼"),
        (&rgx::NW_QUARTER, "NW¼"),
        (&rgx::SE_QUARTER, "SE¼"),
        (&rgx::SW_QUARTER, "SW¼"),
    ];
    let halves: [(&Regex, &str); 4] = [
        (&rgx::N_HALF, "N½"),
        (&rgx::S_HALF, "S½"),
        (&rgx::E_HALF, "E½"),
        (&rgx::W_HALF, "W½"),
    ];
    for (pattern, replacement) in quarters.into_iter().chain(halves) {
        text = sub_scrub(&text, pattern, replacement);
    }

    if clean_qq {
        // The clean patterns run with no boundary guards at all: under
        // clean_qq a bare 'NE' is taken at face value, even mid-word.
        // That is the documented hazard of the option.
        let clean: [(&Regex, &str); 4] = [
            (&rgx::NE_CLEAN, "NE¼"),
            (&rgx::NW_CLEAN, "NW¼"),
            (&rgx::SE_CLEAN, "SE¼"),
            (&rgx::SW_CLEAN, "SW¼"),
        ];
        for (pattern, replacement) in clean {
            text = sub_scrub_unchecked(&text, pattern, replacement);
        }
    }

    text = compound_half_quarters(&text);
    remove_aliquot_interveners(&text)
}

/// Replace boundary-clean matches of `pattern` with `replacement`,
/// repeating until the text settles.
fn sub_scrub(text: &str, pattern: &Regex, replacement: &str) -> String {
    let mut text = text.to_string();
    for _ in 0..8 {
        let mut out = String::with_capacity(text.len());
        let mut pos = 0;
        while pos < text.len() {
            let Some(found) = pattern.find_at(&text, pos) else {
                break;
            };
            if aliquot_boundary_ok(&text, found.start(), found.end()) {
                out.push_str(&text[pos..found.start()]);
                out.push_str(replacement);
                pos = found.end();
            } else {
                let skip_to = next_char_boundary(&text, found.start());
                out.push_str(&text[pos..skip_to]);
                pos = skip_to;
            }
        }
        out.push_str(&text[pos..]);
        if out == text {
            break;
        }
        text = out;
    }
    text
}

/// Fixpoint replacement with no boundary checks, for the clean-qq pass.
fn sub_scrub_unchecked(text: &str, pattern: &Regex, replacement: &str) -> String {
    let mut text = text.to_string();
    for _ in 0..8 {
        let replaced = pattern.replace_all(&text, replacement).into_owned();
        if replaced == text {
            break;
        }
        text = replaced;
    }
    text
}

/// The boundary rules the patterns themselves cannot express.
///
/// Before an aliquot: a fraction mark (`¼`, `4`, `½`, `2`) from an
/// adjacent aliquot, or a non-word character. After: the start of
/// another aliquot, whitespace or clause punctuation, or end of text.
/// The trailing rule keeps `100 feet NE of ...` and `N 2° 37'` from
/// reading as aliquots.
fn aliquot_boundary_ok(text: &str, start: usize, end: usize) -> bool {
    let prev_ok = text[..start].chars().next_back().is_none_or(|c| {
        matches!(c, '¼' | '4' | '½' | '2') || !c.is_alphanumeric()
    });
    let next_ok = text[end..]
        .chars()
        .next()
        .is_none_or(|c| matches!(c, 'N' | 'S' | 'E' | 'W' | 'n' | 's' | 'e' | 'w') || c.is_whitespace() || matches!(c, ',' | '.' | ';'));
    prev_ok && next_ok
}

/// Boundary rules for a canonical aliquot block: nothing alphanumeric
/// may touch either side.
fn block_boundary_ok(text: &str, start: usize, end: usize) -> bool {
    let prev_ok = text[..start]
        .chars()
        .next_back()
        .is_none_or(|c| !c.is_alphanumeric());
    let next_ok = text[end..].chars().next().is_none_or(|c| !c.is_alphanumeric());
    prev_ok && next_ok
}

fn next_char_boundary(text: &str, index: usize) -> usize {
    let mut index = index + 1;
    while index < text.len() && !text.is_char_boundary(index) {
        index += 1;
    }
    index
}

/// `E2NE` carries enough context to read as the E½NE¼: after the halves
/// are scrubbed (`E2` -> `E½`), bare quarters chained onto a cleaned
/// half get their fraction appended.
fn compound_half_quarters(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    let mut pos = 0;

    while let Some(half) = rgx::HALF_GLYPH.find_at(text, pos) {
        out.push_str(&text[pos..half.end()]);
        pos = half.end();

        // Walk the chain of bare quarters hanging off this half.
        struct Step {
            step_start: usize,
            q_start: usize,
            q_end: usize,
            code: &'static str,
        }
        let mut steps: Vec<Step> = Vec::new();
        let mut cursor = pos;
        while let Some(caps) = rgx::HALF_CHAIN_STEP.captures(&text[cursor..]) {
            let q = caps.name("q").expect("pattern requires the group");
            let Some(code) = quarter_code(q.as_str()) else {
                break;
            };
            steps.push(Step {
                step_start: cursor,
                q_start: cursor + q.start(),
                q_end: cursor + q.end(),
                code,
            });
            cursor = cursor + caps.get(0).expect("match exists").end();
        }

        // The chain must end cleanly; otherwise drop quarters off its
        // tail until it does (a trailing 'NE' of 'NE corner' is prose,
        // not an aliquot).
        while let Some(last) = steps.last() {
            if chain_tail_ok(text, last.q_end) {
                break;
            }
            steps.pop();
        }

        for step in &steps {
            out.push_str(&text[step.step_start..step.q_start]);
            out.push_str(step.code);
            out.push('¼');
        }
        pos = steps.last().map_or(pos, |last| last.q_end);
    }

    out.push_str(&text[pos..]);
    out
}

fn chain_tail_ok(text: &str, end: usize) -> bool {
    let rest = &text[end..];
    rest.is_empty()
        || rest
            .chars()
            .next()
            .is_some_and(|c| c.is_whitespace() || matches!(c, ',' | '.' | ';'))
        || rgx::HALF_GLYPH.find(rest).is_some_and(|m| m.start() == 0)
        || rgx::ALIQUOT_BLOCK.find(rest).is_some_and(|m| m.start() == 0)
}

/// Which quarter a matched spelling denotes.
fn quarter_code(text: &str) -> Option<&'static str> {
    let lower = text.to_lowercase();
    let mut chars = lower.chars();
    let ns = chars.next()?;
    let ew = chars.find(|c| matches!(c, 'e' | 'w'))?;
    match (ns, ew) {
        ('n', 'e') => Some("NE"),
        ('n', 'w') => Some("NW"),
        ('s', 'e') => Some("SE"),
        ('s', 'w') => Some("SW"),
        _ => None,
    }
}

/// Remove whitespace and `of`/`of the` between canonical components:
/// `N½ of NE¼ of the SW¼` -> `N½NE¼SW¼`.
fn remove_aliquot_interveners(text: &str) -> String {
    let mut text = text.to_string();
    for _ in 0..16 {
        let replaced = rgx::ALIQUOT_INTERVENER
            .replace_all(&text, "${a1}${a2}")
            .into_owned();
        if replaced == text {
            break;
        }
        text = replaced;
    }
    text
}

fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.trim().chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    fn parse(text: &str, config: &str) -> TractParseOutcome {
        let config: ParseConfig = config.parse().unwrap();
        parse_tract_text(text, &config)
    }

    #[test_case("NE/4", "NE¼"; "slash quarter")]
    #[test_case("Northeast Quarter", "NE¼"; "verbose quarter")]
    #[test_case("N/2", "N½"; "slash half")]
    #[test_case("North Half", "N½"; "verbose half")]
    #[test_case("W/2 of the NE/4", "W½NE¼"; "of the removed")]
    #[test_case("E2NE", "E½NE¼"; "half plus quarter compounded")]
    #[test_case("E½NENW", "E½NE¼NW¼"; "half plus quarter run")]
    #[test_case("S/2N/2", "S½N½"; "stacked halves")]
    fn scrubbing(input: &str, expected: &str) {
        assert_eq!(scrub_aliquots(input, false), expected);
    }

    #[test]
    fn bare_quarters_need_clean_qq() {
        assert_eq!(scrub_aliquots("NE", false), "NE");
        assert_eq!(scrub_aliquots("NE", true), "NE¼");
    }

    #[test]
    fn prose_compass_references_are_left_alone() {
        let text = "100 feet NE of the corner";
        assert_eq!(scrub_aliquots(text, false), text);
        let text = "N 2° 37' E";
        assert_eq!(scrub_aliquots(text, false), text);
    }

    #[test]
    fn simple_quarter_parses() {
        let outcome = parse("NE/4", "");
        assert_eq!(outcome.qqs, ["NENE", "NWNE", "SENE", "SWNE"]);
        assert!(outcome.lots.is_empty());
        assert!(outcome.w_flags.is_empty());
    }

    #[test]
    fn bare_quarter_without_clean_qq_yields_nothing() {
        let outcome = parse("NE", "");
        assert!(outcome.qqs.is_empty());

        let outcome = parse("NE", "clean_qq");
        assert_eq!(outcome.qqs, ["NENE", "NWNE", "SENE", "SWNE"]);
    }

    #[test]
    fn all_expands_only_without_context() {
        let outcome = parse("ALL", "");
        assert_eq!(outcome.qqs.len(), 16);

        let outcome = parse("All of the riverbed", "");
        assert!(outcome.qqs.is_empty());
    }

    #[test]
    fn lots_and_aliquots_mix() {
        let outcome = parse("Lots 1 - 3, SE/4NE/4, Lot 2", "");
        assert_eq!(outcome.lots, ["L1", "L2", "L3"]);
        assert_eq!(outcome.qqs, ["SENE"]);
        assert!(outcome
            .w_flags
            .iter()
            .any(|f| f.kind() == FlagKind::DupLot && f.context() == "L2"));
    }

    #[test]
    fn lot_division_is_attached_when_enabled() {
        let outcome = parse("N/2 of Lot 1", "");
        assert_eq!(outcome.lots, ["N2 of L1"]);

        let outcome = parse("N/2 of Lot 1", "include_lot_divisions.False");
        assert_eq!(outcome.lots, ["L1"]);
    }

    #[test]
    fn lot_division_stops_at_second_lot_word() {
        let outcome = parse("N/2 of Lots 1 - 3, and Lot 5", "");
        assert_eq!(outcome.lots, ["N2 of L1", "N2 of L2", "N2 of L3", "L5"]);
    }

    #[test]
    fn lot_acreage_is_collected() {
        let outcome = parse("Lot 1(38.29), Lot 4(40.00)", "");
        assert_eq!(outcome.lot_acres["L1"], "38.29");
        assert_eq!(outcome.lot_acres["L4"], "40.00");
    }

    #[test]
    fn duplicate_qqs_are_dropped_and_flagged() {
        let outcome = parse("NE/4NE/4, NE/4NE/4", "");
        assert_eq!(outcome.qqs, ["NENE"]);
        assert!(outcome.w_flags.iter().any(|f| f.kind() == FlagKind::DupQq));
    }

    #[test]
    fn qq_depth_one_keeps_quarters() {
        let outcome = parse("NE/4", "qq_depth.1");
        assert_eq!(outcome.qqs, ["NE"]);
    }

    #[test]
    fn unclaimed_prose_is_flagged() {
        let outcome = parse("NE/4, thence along the river to the point of beginning", "");
        assert_eq!(outcome.qqs, ["NENE", "NWNE", "SENE", "SWNE"]);
        assert!(outcome
            .w_flags
            .iter()
            .any(|f| f.kind() == FlagKind::UnparsedText));
    }

    #[test]
    fn scrubbed_text_is_reported_as_pp_text() {
        // The half nests inside the quarter: the parent comes last in
        // the canonical block and the expansion stays inside the NE¼.
        let outcome = parse("W/2 of the NE/4", "");
        assert_eq!(outcome.text, "W½NE¼");
        assert_eq!(outcome.qqs, ["NWNE", "SWNE"]);
    }
}
