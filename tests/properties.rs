//! Property-based invariants over the public parsing surface.

use landlex::{ParseConfig, PlssDescription, Tract, Trs};
use proptest::prelude::*;

/// Realistic description fragments: Twp/Rge in assorted spellings,
/// optionally missing directions.
fn twprge_strategy() -> impl Strategy<Value = String> {
    (
        1u16..=299,
        prop_oneof![Just(Some('N')), Just(Some('S')), Just(None)],
        1u16..=199,
        prop_oneof![Just(Some('E')), Just(Some('W')), Just(None)],
        prop_oneof![
            Just("T{t}{ns}-R{r}{ew}"),
            Just("T{t}{ns} R{r}{ew}"),
            Just("Township {t} {NS}, Range {r} {EW}"),
        ],
    )
        .prop_map(|(twp, ns, rge, ew, template)| {
            let ns_letter = ns.map(|c| c.to_string()).unwrap_or_default();
            let ew_letter = ew.map(|c| c.to_string()).unwrap_or_default();
            let ns_word = match ns {
                Some('N') => "North",
                Some('S') => "South",
                _ => "",
            };
            let ew_word = match ew {
                Some('E') => "East",
                _ => "West",
            };
            template
                .replace("{t}", &twp.to_string())
                .replace("{ns}", &ns_letter)
                .replace("{r}", &rge.to_string())
                .replace("{ew}", &ew_letter)
                .replace("{NS}", ns_word)
                .replace("{EW}", ew_word)
        })
}

fn aliquot_strategy() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("NE/4"),
        Just("W/2"),
        Just("SE/4NE/4"),
        Just("N/2NE/4"),
        Just("E/2 of the NW/4"),
        Just("ALL"),
        Just("Lots 1 - 3"),
        Just("Lot 7(38.29), SE/4"),
    ]
}

fn description_strategy() -> impl Strategy<Value = String> {
    (
        twprge_strategy(),
        prop::collection::vec((1u8..=36, aliquot_strategy()), 1..4),
    )
        .prop_map(|(twprge, sections)| {
            let body: Vec<String> = sections
                .iter()
                .map(|(sec, aliquot)| format!("Sec {sec}: {aliquot}"))
                .collect();
            format!("{twprge} {}", body.join(", "))
        })
}

/// Free-form text drawn from the character set land descriptions
/// actually use.
fn loose_text_strategy() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[A-Za-z0-9 ,.;:()/\\-\n¼½§]{0,80}")
        .expect("valid strategy regex")
}

proptest! {
    /// Preprocessing is idempotent: a second pass changes nothing and
    /// re-fires no completion flags.
    #[test]
    fn preprocessing_is_idempotent(text in loose_text_strategy()) {
        let config = ParseConfig::default();
        let once = PlssDescription::parse(text.clone(), config.clone());
        let twice = PlssDescription::parse(once.pp_desc().to_string(), config);
        prop_assert_eq!(once.pp_desc(), twice.pp_desc());
    }

    /// Structured descriptions also preprocess idempotently.
    #[test]
    fn structured_preprocessing_is_idempotent(text in description_strategy()) {
        let config = ParseConfig::default();
        let once = PlssDescription::parse(text, config.clone());
        let twice = PlssDescription::parse(once.pp_desc().to_string(), config);
        prop_assert_eq!(once.pp_desc(), twice.pp_desc());
    }

    /// Every tract belongs to its description: same original text, same
    /// source, and a dense 0..n index range.
    #[test]
    fn tract_ownership_and_density(text in description_strategy()) {
        let config: ParseConfig = "wait_to_parse".parse().unwrap();
        let mut parsed = PlssDescription::new(text.clone(), config).with_source("prop");
        parsed.parse_text();

        for (i, tract) in parsed.tracts().iter().enumerate() {
            prop_assert_eq!(tract.orig_index(), i);
            prop_assert_eq!(tract.orig_desc(), text.as_str());
            prop_assert_eq!(tract.source(), Some("prop"));
        }
    }

    /// lots_qqs is always the concatenation of lots then qqs.
    #[test]
    fn lots_qqs_concatenation(text in description_strategy()) {
        let config: ParseConfig = "parse_qq".parse().unwrap();
        let parsed = PlssDescription::parse(text, config);

        for tract in &parsed {
            let expected: Vec<String> = tract
                .lots()
                .iter()
                .chain(tract.qqs().iter())
                .cloned()
                .collect();
            prop_assert_eq!(tract.lots_qqs(), expected);
        }
    }

    /// With break_halves off, every leaf label's depth (halves count a
    /// half step) lies within the configured bounds.
    #[test]
    fn expansion_depth_bounds(
        aliquot in aliquot_strategy(),
        min in 1u8..=4,
        extra in 0u8..=2,
    ) {
        let max = min + extra;
        let config: ParseConfig = format!("qq_depth_min.{min},qq_depth_max.{max}")
            .parse()
            .unwrap();

        let trs: Trs = "154n97w14".parse().unwrap();
        let mut tract = Tract::new(trs, aliquot);
        tract.parse_lots_qqs(&config);

        for qq in tract.qqs() {
            let pieces: Vec<&str> = qq
                .as_bytes()
                .chunks(2)
                .map(|pair| std::str::from_utf8(pair).unwrap())
                .collect();
            let depth: f64 = pieces
                .iter()
                .map(|piece| if piece.ends_with('2') { 0.5 } else { 1.0 })
                .sum();
            prop_assert!(
                depth >= f64::from(min) && depth <= f64::from(max),
                "{} has depth {} outside [{}, {}]",
                qq,
                depth,
                min,
                max
            );
        }
    }

    /// Expansion is deterministic: the same text and configuration
    /// always produce identical tracts.
    #[test]
    fn parsing_is_deterministic(text in description_strategy()) {
        let config: ParseConfig = "parse_qq".parse().unwrap();
        let a = PlssDescription::parse(text.clone(), config.clone());
        let b = PlssDescription::parse(text, config);

        prop_assert_eq!(a.tracts(), b.tracts());
    }

    /// Expanding ALL at a depth and re-parsing the joined labels under
    /// clean_qq reproduces the identical set.
    #[test]
    fn all_round_trips_through_clean_qq(depth in 1u8..=3) {
        let config: ParseConfig = format!("qq_depth.{depth}").parse().unwrap();
        let trs: Trs = "154n97w14".parse().unwrap();

        let mut whole = Tract::new(trs, "ALL");
        whole.parse_lots_qqs(&config);
        let expanded = whole.qqs().join(", ");

        let reparse_config: ParseConfig = format!("clean_qq,qq_depth.{depth}").parse().unwrap();
        let mut reparsed = Tract::new(trs, expanded);
        reparsed.parse_lots_qqs(&reparse_config);

        prop_assert_eq!(whole.qqs(), reparsed.qqs());
    }
}
