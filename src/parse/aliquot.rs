//! Aliquot tree expansion: turn a canonical aliquot block (`N½SW¼`,
//! `ALL`) into the list of subdivisions at the configured depth.
//!
//! A block decomposes into components ordered largest-first. The
//! components are standardized (quarters written deeper than halves are
//! pushed back; cross-axis half pairs merge into a quarter), truncated at
//! the maximum depth, subdivided through the quarter tree to the minimum
//! depth, and rebuilt into deepest-piece-first labels (`SWNE` is the SW
//! quarter of the NE quarter).
//!
//! Expansion is deterministic and idempotent: the same block and bounds
//! always produce the same list, and re-expanding an expansion's own
//! labels reproduces it.

use crate::{
    domain::{Flag, FlagKind, ParseConfig},
    parse::rgx,
};

const HALVES: [&str; 4] = ["N", "S", "E", "W"];
const QUARTERS: [&str; 4] = ["NE", "NW", "SE", "SW"];

fn is_half(comp: &str) -> bool {
    HALVES.contains(&comp)
}

fn is_quarter(comp: &str) -> bool {
    QUARTERS.contains(&comp)
}

/// The two subdivisions of a half (or four of `ALL`); `None` for
/// quarters, which subdivide into the full quarter set.
fn children(comp: &str) -> Option<&'static [&'static str]> {
    match comp {
        "ALL" => Some(&QUARTERS),
        "N" => Some(&["NE", "NW"]),
        "S" => Some(&["SE", "SW"]),
        "E" => Some(&["NE", "SE"]),
        "W" => Some(&["NW", "SW"]),
        _ => None,
    }
}

fn same_axis(a: &str, b: &str) -> bool {
    let ns = ["N", "S"];
    (ns.contains(&a) && ns.contains(&b)) || (!ns.contains(&a) && !ns.contains(&b))
}

/// The expansion depth bounds, resolved from configuration once per
/// tract parse.
#[derive(Debug, Clone, Copy)]
pub(crate) struct DepthBounds {
    pub(crate) min: u8,
    pub(crate) max: Option<u8>,
    pub(crate) break_halves: bool,
}

/// Resolve `qq_depth` / `qq_depth_min` / `qq_depth_max` into working
/// bounds, clamping to the hard cap and reconciling conflicts.
pub(crate) fn resolve_depths(config: &ParseConfig, flags: &mut Vec<Flag>) -> DepthBounds {
    let (mut min, mut max) = match config.qq_depth {
        Some(depth) => (depth, Some(depth)),
        None => (config.qq_depth_min, config.qq_depth_max),
    };

    let cap = config.qq_depth_cap;
    if min > cap {
        flags.push(Flag::new(FlagKind::QqDepthClamped, format!("{min} -> {cap}")));
        min = cap;
    }
    if let Some(m) = max {
        if m > cap {
            flags.push(Flag::new(FlagKind::QqDepthClamped, format!("{m} -> {cap}")));
            max = Some(cap);
        }
    }

    if let Some(m) = max {
        if m < min {
            flags.push(Flag::new(FlagKind::QqDepthConflict, format!("max {m} < min {min}")));
            min = m;
        }
    }

    DepthBounds {
        min,
        max,
        break_halves: config.break_halves,
    }
}

/// Expand one canonical aliquot block into subdivision labels.
pub(crate) fn expand_aliquot(text: &str, bounds: DepthBounds) -> Vec<String> {
    // Largest component first: 'N½SW¼NE¼' -> [NE, SW, N].
    let mut components: Vec<String> = rgx::SINGLE_ALIQUOT
        .captures_iter(text)
        .map(|caps| caps["comp"].to_string())
        .collect();
    components.reverse();

    if components.is_empty() {
        return Vec::new();
    }

    let components = standardize_components(components);

    // Anything deeper than the maximum depth coalesces into its
    // ancestor at the cap.
    let mut components = components;
    if let Some(max) = bounds.max {
        components.truncate(max as usize);
    }

    let len = components.len();
    let min = bounds.min as usize;
    let mut subdivided: Vec<Vec<String>> = Vec::with_capacity(len);
    for (i, comp) in components.iter().enumerate() {
        let i = i + 1;
        let mut depth: i32 = if i == min {
            1
        } else if i == len && len < min {
            (min - i + 1) as i32
        } else if is_half(comp) && (i < min || bounds.break_halves) {
            1
        } else {
            0
        };
        // Quarters are already one step deeper than halves or ALL.
        if is_quarter(comp) {
            depth -= 1;
        }

        subdivided.push(subdivide(comp, depth));
    }

    rebuild(subdivided)
}

/// Iron out nonstandard component sequences: quarters occurring deeper
/// than halves ('NE¼N½' -> 'N½NE¼'), and consecutive cross-axis halves
/// ('N½E½' -> 'NE¼'). Runs to a fixed point.
fn standardize_components(mut components: Vec<String>) -> Vec<String> {
    let mut previous = Vec::new();
    // Each pass strictly shrinks or reorders; the cap only guards
    // against a cycle that should not exist.
    let mut passes_left = components.len() * 4 + 8;
    while components != previous && passes_left > 0 {
        previous.clone_from(&components);
        components = pass_back_halves(components);
        components = combine_consecutive_halves(components);
        passes_left -= 1;
    }
    components
}

/// A quarter written deeper than a half is technically accurate but
/// nonstandard; rewrite to the half-before-quarter equivalent.
/// ('NE¼N½', here `[N, NE]` deepest-first after the local reverse,
/// becomes the 'N½NE¼'.) Single pass.
fn pass_back_halves(mut components: Vec<String>) -> Vec<String> {
    components.reverse();
    let mut i = 0;
    while i + 1 < components.len() {
        let deep = components[i].clone();
        let shallow = components[i + 1].clone();

        if !(is_half(&shallow) && is_quarter(&deep)) {
            i += 1;
            continue;
        }

        let mut chars = deep.chars();
        let ns = chars.next().expect("quarters have two letters").to_string();
        let ew = chars.next().expect("quarters have two letters").to_string();

        if shallow == "N" || shallow == "S" {
            components[i + 1] = format!("{shallow}{ew}");
            components[i] = ns;
        } else {
            components[i + 1] = format!("{ns}{shallow}");
            components[i] = ew;
        }
        i += 1;
    }
    components.reverse();
    components
}

/// Consecutive halves on opposite axes combine into a quarter (`N½E½` ->
/// `NE¼`); same-axis pairs (`W½E½`) are left alone. Single pass.
fn combine_consecutive_halves(components: Vec<String>) -> Vec<String> {
    let mut clean = Vec::with_capacity(components.len());
    let mut i = 0;
    while i < components.len() {
        let a = &components[i];
        let Some(b) = components.get(i + 1) else {
            clean.push(a.clone());
            break;
        };

        if is_half(a) && is_half(b) && !same_axis(a, b) {
            let quarter = if a == "E" || a == "W" {
                format!("{b}{a}")
            } else {
                format!("{a}{b}")
            };
            clean.push(quarter);
            i += 2;
        } else {
            clean.push(a.clone());
            i += 1;
        }
    }
    clean
}

/// Subdivide one component `depth` more times through the quarter tree.
///
/// Depth 0 or less just normalizes the spelling (`N` -> `N2`).
fn subdivide(comp: &str, depth: i32) -> Vec<String> {
    if depth <= 0 {
        if is_half(comp) {
            return vec![format!("{comp}2")];
        }
        return vec![comp.to_string()];
    }

    let mut divided: Vec<Vec<String>> = vec![vec![comp.to_string()]];
    for _ in 0..depth {
        let deepest_first = &divided.last().expect("never empty")[0];
        if let Some(kids) = children(deepest_first) {
            divided.pop();
            divided.push(kids.iter().map(ToString::to_string).collect());
        } else {
            divided.push(QUARTERS.iter().map(ToString::to_string).collect());
        }
    }

    rebuild(divided)
}

/// Collapse a largest-to-smallest nested component list into flat labels,
/// deepest piece first: `[[SE], [NW, SW], [E2]]` -> `[E2NWSE, E2SWSE]`.
fn rebuild(mut nested: Vec<Vec<String>>) -> Vec<String> {
    loop {
        let Some(deepest) = nested.pop() else {
            return Vec::new();
        };
        let Some(shallower) = nested.pop() else {
            return deepest;
        };

        let rebuilt = shallower
            .iter()
            .flat_map(|shallow| deepest.iter().map(move |deep| format!("{deep}{shallow}")))
            .collect();
        nested.push(rebuilt);
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    fn bounds(min: u8, max: Option<u8>) -> DepthBounds {
        DepthBounds {
            min,
            max,
            break_halves: false,
        }
    }

    #[test]
    fn quarter_expands_to_four_qqs() {
        assert_eq!(
            expand_aliquot("NE¼", bounds(2, None)),
            ["NENE", "NWNE", "SENE", "SWNE"]
        );
    }

    #[test]
    fn half_expands_to_eight_qqs() {
        assert_eq!(
            expand_aliquot("W½", bounds(2, None)),
            ["NENW", "NWNW", "SENW", "SWNW", "NESW", "NWSW", "SESW", "SWSW"]
        );
    }

    #[test]
    fn all_expands_to_the_canonical_sixteen() {
        let qqs = expand_aliquot("ALL", bounds(2, None));
        assert_eq!(
            qqs,
            [
                "NENE", "NWNE", "SENE", "SWNE", "NENW", "NWNW", "SENW", "SWNW", "NESE", "NWSE",
                "SESE", "SWSE", "NESW", "NWSW", "SESW", "SWSW"
            ]
        );
    }

    #[test]
    fn quarter_quarter_stays_put_at_depth_two() {
        assert_eq!(expand_aliquot("SE¼NW¼", bounds(2, Some(2))), ["SENW"]);
    }

    #[test]
    fn half_below_depth_is_coalesced_by_max() {
        // E½NE¼NW¼ at a fixed depth of 2: the half is dropped into its
        // enclosing quarter-quarter.
        assert_eq!(expand_aliquot("E½NE¼NW¼", bounds(2, Some(2))), ["NENW"]);
    }

    #[test]
    fn depth_three_subdivides_further() {
        assert_eq!(
            expand_aliquot("SE¼NW¼", bounds(3, None)),
            ["NESENW", "NWSENW", "SESENW", "SWSENW"]
        );
        assert_eq!(
            expand_aliquot("E½NE¼NW¼", bounds(3, None)),
            ["NENENW", "SENENW"]
        );
    }

    #[test]
    fn half_is_retained_beyond_min_depth() {
        // N½SW¼NE¼ is already 2.5 steps deep; the half survives as N2.
        assert_eq!(expand_aliquot("N½SW¼NE¼", bounds(2, None)), ["N2SWNE"]);
    }

    #[test]
    fn break_halves_forces_quarters() {
        let b = DepthBounds {
            min: 2,
            max: None,
            break_halves: true,
        };
        assert_eq!(expand_aliquot("N½SW¼NE¼", b), ["NESWNE", "NWSWNE"]);
    }

    #[test_case("N½E½", &["NE"]; "cross axis halves merge")]
    #[test_case("W½E½", &["W2E2"]; "same axis halves are left alone")]
    fn half_standardization(text: &str, expected: &[&str]) {
        assert_eq!(expand_aliquot(text, bounds(0, None)), expected);
    }

    #[test]
    fn quarter_before_half_is_passed_back() {
        // 'NE¼N½' is better described as the N½NE¼.
        assert_eq!(expand_aliquot("NE¼N½", bounds(0, None)), ["N2NE"]);
    }

    #[test]
    fn empty_text_expands_to_nothing() {
        assert!(expand_aliquot("no aliquots here", bounds(2, None)).is_empty());
    }

    #[test]
    fn expansion_is_deterministic() {
        let a = expand_aliquot("N½SW¼", bounds(3, None));
        let b = expand_aliquot("N½SW¼", bounds(3, None));
        assert_eq!(a, b);
    }

    #[test]
    fn conflicting_bounds_collapse_to_max() {
        let mut flags = Vec::new();
        let config: ParseConfig = "qq_depth_min.3,qq_depth_max.2".parse().unwrap();
        let resolved = resolve_depths(&config, &mut flags);
        assert_eq!(resolved.min, 2);
        assert_eq!(resolved.max, Some(2));
        assert!(flags.iter().any(|f| f.kind() == FlagKind::QqDepthConflict));
    }

    #[test]
    fn depths_beyond_the_cap_are_clamped() {
        let mut flags = Vec::new();
        let config: ParseConfig = "qq_depth.9".parse().unwrap();
        let resolved = resolve_depths(&config, &mut flags);
        assert_eq!(resolved.min, 6);
        assert_eq!(resolved.max, Some(6));
        assert!(flags.iter().any(|f| f.kind() == FlagKind::QqDepthClamped));
    }

    #[test]
    fn qq_depth_overrides_min_and_max() {
        let mut flags = Vec::new();
        let config: ParseConfig = "qq_depth_min.1,qq_depth_max.5,qq_depth.2".parse().unwrap();
        let resolved = resolve_depths(&config, &mut flags);
        assert_eq!((resolved.min, resolved.max), (2, Some(2)));
    }
}
