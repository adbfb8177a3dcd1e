//! Tract extraction: the per-layout state machine that walks a
//! description and yields `(Twp/Rge, sections, description-block)`
//! components, which the description parser turns into [`Tract`]s.
//!
//! Matched Twp/Rge's and (multi)sections become position markers; walking
//! the sorted markers under the layout's rules decides which description
//! block belongs to which section(s). A chunk that stages nothing is
//! re-run under the `copy_all` stopgap so its text is never lost.

use std::collections::{BTreeMap, VecDeque};

use regex::Regex;

use crate::{
    domain::{Flag, FlagKind, Layout, ParseConfig, Tract, Trs},
    parse::{detect, preprocess, rgx, segment, unpack},
};

/// The minimum length of a substring before it is reported as unused.
pub(crate) const MIN_REPORTABLE_UNUSED_LEN: usize = 4;

const ERR_TWPRGE: &str = "XXXzXXXz";
const ERR_SEC: &str = "XX";

/// A matched Twp/Rge, in the standard abbreviation, with its span.
#[derive(Debug, Clone)]
pub(crate) struct TwprgeMatch {
    pub(crate) twprge: String,
    pub(crate) start: usize,
    pub(crate) end: usize,
}

/// A matched (multi)section, fully enumerated, with its span.
#[derive(Debug, Clone)]
struct SecMatch {
    secs: Vec<String>,
    start: usize,
    end: usize,
}

/// One staged tract-to-be: a Twp/Rge, the sections it covers, and the
/// description block they share.
#[derive(Debug, Clone)]
pub(crate) struct TractComponent {
    pub(crate) twprge: String,
    pub(crate) secs: Vec<String>,
    pub(crate) desc: String,
    pub(crate) sec_within: bool,
}

/// Everything one chunk parse hands back to the description parser.
#[derive(Debug, Default)]
pub(crate) struct ChunkOutcome {
    pub(crate) components: Vec<TractComponent>,
    /// Unclaimed blocks, tagged with the number of components staged at
    /// the time each was found (0 = before any tract).
    pub(crate) unused: Vec<(usize, String)>,
    pub(crate) w_flags: Vec<Flag>,
}

/// Find the Twp/Rge's that count as tract boundaries under `layout`.
///
/// In the section-first layouts, a Twp/Rge linked to a preceding section
/// by a containment phrase (`... of Section 4 of T154N-R97W ...`) is a
/// continuation of running prose, not a boundary; those are skipped and
/// flagged.
pub(crate) fn find_matching_twprge(
    text: &str,
    layout: Layout,
    config: &ParseConfig,
) -> (Vec<TwprgeMatch>, Vec<Flag>) {
    let mut matches = Vec::new();
    let mut flags = Vec::new();

    let mut sec_scan_from = 0;
    for caps in rgx::TWPRGE.captures_iter(text) {
        let whole = caps.get(0).expect("match exists");
        let twprge = unpack::twprge_natural_to_short(&unpack::unpack_twprge(
            &caps,
            config.default_ns,
            config.default_ew,
            false,
        ));

        if !layout.sec_then_desc() {
            matches.push(TwprgeMatch {
                twprge,
                start: whole.start(),
                end: whole.end(),
            });
            continue;
        }

        // The rightmost section match left of this Twp/Rge.
        let mut sec_start = None;
        for m in rgx::MULTISEC.find_iter(&text[sec_scan_from..whole.start()]) {
            sec_start = Some(sec_scan_from + m.start());
        }
        if let Some(start) = sec_start {
            sec_scan_from = start;
        }

        let legit = sec_start.is_none_or(|start| {
            !rgx::SEC_TWPRGE_IN_BETWEEN.is_match(&text[start..whole.end()])
        });

        if legit {
            matches.push(TwprgeMatch {
                twprge,
                start: whole.start(),
                end: whole.end(),
            });
        } else {
            flags.push(Flag::new(FlagKind::TwpRgeIgnored, twprge));
        }
    }

    (matches, flags)
}

/// Find the (multi)sections that count under `layout`, honoring the
/// colon policy.
///
/// With `require_colon` (the default), a first pass accepts only
/// sections trailed by a colon in the section-then-description layouts;
/// if that pass comes up empty, a second pass relaxes the requirement
/// and flags the relaxation.
fn find_matching_sec(text: &str, layout: Layout, config: &ParseConfig) -> (Vec<SecMatch>, Vec<Flag>) {
    let cautious = config.require_colon && layout.sec_then_desc();

    let (matches, flags) = sec_pass(text, layout, cautious);
    if !matches.is_empty() || !cautious {
        return (matches, flags);
    }

    // Second pass: the colon requirement found nothing. Flags staged by
    // the first pass are discarded along with its (empty) matches.
    let (matches, mut flags) = sec_pass(text, layout, false);
    if !matches.is_empty() {
        let pulled: Vec<String> = matches.iter().flat_map(|m| m.secs.clone()).collect();
        flags.push(Flag::new(FlagKind::PulledSecWithoutColon, pulled.join(",")));
    }
    (matches, flags)
}

fn sec_pass(text: &str, layout: Layout, need_colon: bool) -> (Vec<SecMatch>, Vec<Flag>) {
    let mut matches = Vec::new();
    let mut flags = Vec::new();

    for caps in rgx::MULTISEC.captures_iter(text) {
        let whole = caps.get(0).expect("match exists");
        let unpacked = unpack::unpack_sections(whole.as_str());
        let secs = unpacked.secs;
        if secs.is_empty() {
            continue;
        }

        let mut legit = true;
        if layout.sec_then_desc() {
            // A section right after "of", "said", "in", or "within" is a
            // continuation of the prior description, not a new tract.
            let prior = text[..whole.start()].trim_end().to_lowercase();
            let continuation = ["of", "said", "in", "within"]
                .iter()
                .any(|word| prior.ends_with(&format!(" {word}")) || prior == *word);
            if continuation {
                legit = false;
            }
            if need_colon && caps.name("colon").is_none() {
                legit = false;
            }
        }

        if !legit {
            let kind = if secs.len() > 1 {
                FlagKind::MultiSecIgnored
            } else {
                FlagKind::SecIgnored
            };
            flags.push(Flag::new(kind, secs.join(",")));
            continue;
        }

        if unpack::sec_match_is_multi(&caps) {
            flags.push(Flag::new(FlagKind::MultiSecFound, secs.join(",")));
        }
        flags.extend(unpacked.flags);

        matches.push(SecMatch {
            secs,
            start: whole.start(),
            end: whole.end(),
        });
    }

    (matches, flags)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Marker {
    TextStart,
    TextEnd,
    TwprgeStart,
    TwprgeEnd,
    SecStart,
    SecEnd,
}

/// Parse one chunk of (preprocessed) text into staged tract components.
pub(crate) fn parse_chunk(
    text: &str,
    layout: Layout,
    config: &ParseConfig,
    segmenting: bool,
) -> ChunkOutcome {
    let mut outcome = parse_chunk_once(text, layout, config);

    if config.sec_within {
        rebuild_sec_within(&mut outcome.components, &mut outcome.unused);
    }

    if outcome.components.is_empty() && layout != Layout::CopyAll {
        // Nothing staged under the deduced layout: degrade to the
        // copy_all stopgap so the text is preserved for review.
        outcome = parse_chunk_once(text, Layout::CopyAll, config);
        if segmenting {
            outcome.w_flags.push(Flag::new(
                FlagKind::LayoutChangeInSegment,
                excerpt(text, 0, 40),
            ));
        }
    }

    warning_language_flags(text, &mut outcome.w_flags);
    outcome
}

fn parse_chunk_once(text: &str, layout: Layout, config: &ParseConfig) -> ChunkOutcome {
    let mut outcome = ChunkOutcome::default();

    let (twprge_matches, tr_flags) = find_matching_twprge(text, layout, config);
    outcome.w_flags.extend(tr_flags);
    let (sec_matches, sec_flags) = find_matching_sec(text, layout, config);
    outcome.w_flags.extend(sec_flags);

    // Marker insertion order matters: a Twp/Rge boundary wins over a
    // section boundary at the same position, and both win over the text
    // endpoints.
    let mut markers: BTreeMap<usize, Marker> = BTreeMap::new();
    markers.insert(0, Marker::TextStart);
    markers.insert(text.len(), Marker::TextEnd);
    let mut working_sec_list: VecDeque<Vec<String>> = VecDeque::new();
    for m in &sec_matches {
        markers.insert(m.start, Marker::SecStart);
        markers.insert(m.end, Marker::SecEnd);
        working_sec_list.push_back(m.secs.clone());
    }
    let mut working_twprge_list: VecDeque<String> = VecDeque::new();
    for m in &twprge_matches {
        markers.insert(m.start, Marker::TwprgeStart);
        markers.insert(m.end, Marker::TwprgeEnd);
        working_twprge_list.push_back(m.twprge.clone());
    }

    let mut machine = ChunkMachine {
        outcome: &mut outcome,
        working_twprge_list,
        working_sec_list,
        working_twprge: None,
        working_sec: None,
        last_twprge_used: false,
        last_sec_used: false,
    };

    if layout == Layout::CopyAll {
        machine.parse_copyall(text);
        return outcome;
    }

    machine.walk_markers(text, layout, &markers);
    machine.flush_unclaimed();

    outcome
}

struct ChunkMachine<'a> {
    outcome: &'a mut ChunkOutcome,
    working_twprge_list: VecDeque<String>,
    working_sec_list: VecDeque<Vec<String>>,
    working_twprge: Option<String>,
    working_sec: Option<Vec<String>>,
    last_twprge_used: bool,
    last_sec_used: bool,
}

impl ChunkMachine<'_> {
    /// Stage the next Twp/Rge, flagging the outgoing one if it was never
    /// claimed by a tract.
    fn next_twprge(&mut self) {
        if !self.last_twprge_used {
            if let Some(twprge) = &self.working_twprge {
                if twprge != ERR_TWPRGE {
                    self.outcome
                        .w_flags
                        .push(Flag::new(FlagKind::TwpRgeNotPulled, twprge.clone()));
                }
            }
        }
        self.last_twprge_used = false;
        self.working_twprge = Some(
            self.working_twprge_list
                .pop_front()
                .unwrap_or_else(|| ERR_TWPRGE.to_string()),
        );
    }

    /// Stage the next section list, flagging the outgoing one if it was
    /// never claimed.
    fn next_sec(&mut self) {
        if !self.last_sec_used {
            if let Some(secs) = &self.working_sec {
                if secs.as_slice() != [ERR_SEC] {
                    self.outcome
                        .w_flags
                        .push(Flag::new(FlagKind::SecNotPulled, secs.join(",")));
                }
            }
        }
        self.last_sec_used = false;
        self.working_sec = Some(
            self.working_sec_list
                .pop_front()
                .unwrap_or_else(|| vec![ERR_SEC.to_string()]),
        );
    }

    fn stage(&mut self, desc: &str) {
        let desc = cleanup_desc(desc);
        self.outcome.components.push(TractComponent {
            twprge: self
                .working_twprge
                .clone()
                .unwrap_or_else(|| ERR_TWPRGE.to_string()),
            secs: self
                .working_sec
                .clone()
                .unwrap_or_else(|| vec![ERR_SEC.to_string()]),
            desc,
            sec_within: false,
        });
        self.last_twprge_used = true;
        self.last_sec_used = true;
        // A section can carry only one description block.
        self.working_sec = Some(vec![ERR_SEC.to_string()]);
    }

    fn walk_markers(&mut self, text: &str, layout: Layout, markers: &BTreeMap<usize, Marker>) {
        let positions: Vec<(usize, Marker)> = markers.iter().map(|(&p, &m)| (p, m)).collect();
        let last = positions.len() - 1;

        // Forward-looking layouts stage their first section and/or
        // Twp/Rge before any marker is reached.
        if !layout.sec_then_desc() {
            self.next_sec();
        }
        if !layout.twprge_first() {
            self.next_twprge();
        }

        for (count, &(pos, marker)) in positions.iter().enumerate() {
            let (next_pos, next_marker) = positions[last.min(count + 1)];

            match marker {
                Marker::TwprgeStart => {
                    self.next_twprge();
                    continue;
                }
                Marker::SecStart => {
                    self.next_sec();
                    continue;
                }
                Marker::TextEnd => continue,
                Marker::TextStart | Marker::TwprgeEnd | Marker::SecEnd => {}
            }

            let block = &text[pos..next_pos];

            if layout.sec_then_desc() && marker == Marker::SecEnd {
                // Section then description: the end of a section match
                // opens this tract's description block.
                self.stage(block);
                continue;
            }
            if !layout.sec_then_desc() && next_marker == Marker::SecStart {
                // Description then section: looking ahead to a section
                // closes this tract's description block.
                self.stage(block);
                continue;
            }

            self.outcome
                .unused
                .push((self.outcome.components.len(), block.to_string()));
        }
    }

    /// Re-queue the working Twp/Rge and sections if unclaimed, then flag
    /// everything still waiting in the lists.
    fn flush_unclaimed(&mut self) {
        if !self.last_twprge_used {
            if let Some(twprge) = self.working_twprge.take() {
                if twprge != ERR_TWPRGE {
                    self.working_twprge_list.push_front(twprge);
                }
            }
        }
        if !self.last_sec_used {
            if let Some(secs) = self.working_sec.take() {
                if secs.as_slice() != [ERR_SEC] {
                    self.working_sec_list.push_front(secs);
                }
            }
        }

        for twprge in self.working_twprge_list.drain(..) {
            self.outcome
                .w_flags
                .push(Flag::new(FlagKind::TwpRgeNotPulled, twprge));
        }
        for secs in self.working_sec_list.drain(..) {
            self.outcome
                .w_flags
                .push(Flag::new(FlagKind::SecNotPulled, secs.join(",")));
        }
    }

    /// The stopgap: the whole text becomes one tract's description,
    /// under the first section and Twp/Rge found (error sentinels when
    /// even those are missing).
    fn parse_copyall(&mut self, text: &str) {
        self.next_sec();
        let sec = self
            .working_sec
            .as_ref()
            .and_then(|secs| secs.first().cloned())
            .unwrap_or_else(|| ERR_SEC.to_string());
        self.next_twprge();
        let twprge = self
            .working_twprge
            .clone()
            .unwrap_or_else(|| ERR_TWPRGE.to_string());

        self.outcome.components.push(TractComponent {
            twprge,
            secs: vec![sec],
            desc: text.to_string(),
            sec_within: false,
        });
    }
}

/// Re-attach unclaimed blocks to a lone tract candidate.
///
/// Only meaningful when exactly one component was staged (a multi-section
/// counts as one). Blocks found before the description go in front;
/// blocks found after go behind. Consumes the unused list either way.
pub(crate) fn rebuild_sec_within(
    components: &mut [TractComponent],
    unused: &mut Vec<(usize, String)>,
) {
    let [component] = components else {
        return;
    };

    let mut reattached = false;
    for (position, block) in unused.drain(..) {
        let block = cleanup_desc(&block);
        if block.len() < MIN_REPORTABLE_UNUSED_LEN {
            continue;
        }
        component.desc = if position == 0 {
            format!("{block} {}", component.desc)
        } else {
            format!("{} {block}", component.desc)
        };
        reattached = true;
    }
    component.sec_within = reattached;
}

/// Strip parsing artifacts from a staged description block: edge
/// punctuation and dangling connectives.
pub(crate) fn cleanup_desc(text: &str) -> String {
    const CULL: [&str; 6] = [" the", " all in", " all of", " of", " in", " and"];

    let mut text = text.to_string();
    let mut previous = String::new();
    while text != previous {
        previous.clone_from(&text);
        text = text
            .trim_start_matches('.')
            .trim_matches(|c: char| ",;:-–—\t\n ".contains(c))
            .to_string();
        for cull in CULL {
            if text.to_lowercase().ends_with(cull) {
                text.truncate(text.len() - cull.len());
            }
        }
    }
    text
}

/// A short boundary-safe excerpt for flag context.
pub(crate) fn excerpt(text: &str, from: usize, len: usize) -> String {
    let start = floor_char_boundary(text, from.min(text.len()));
    let end = floor_char_boundary(text, (from + len).min(text.len()));
    text[start..end].replace('\n', " ").trim().to_string()
}

fn floor_char_boundary(text: &str, mut index: usize) -> usize {
    while index > 0 && !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

/// Sweep the chunk for limiting language worth a human look. Adjacent
/// matches of the same pattern are merged into one context excerpt.
fn warning_language_flags(text: &str, flags: &mut Vec<Flag>) {
    let rules: [(&Regex, FlagKind, usize, usize); 5] = [
        (&rgx::WELL, FlagKind::Well, 5, 25),
        (&rgx::DEPTH, FlagKind::Depth, 10, 20),
        (&rgx::INCLUDING, FlagKind::Including, 0, 40),
        (&rgx::LESS_EXCEPT, FlagKind::LessExcept, 0, 40),
        (&rgx::ISFA, FlagKind::Insofar, 0, 40),
    ];

    for (pattern, kind, left_context, right_context) in rules {
        let mut scan_from = 0;
        while scan_from < text.len() {
            let Some(found) = pattern.find_at(text, scan_from) else {
                break;
            };

            // Keep extending rightward while more matches of the same
            // pattern sit within the context window.
            let mut final_end = found.end();
            loop {
                let window_end = floor_char_boundary(text, (final_end + right_context).min(text.len()));
                match pattern.find_at(&text[..window_end], final_end) {
                    Some(more) if more.start() >= final_end => final_end = more.end(),
                    _ => break,
                }
            }

            let context_start = found.start().saturating_sub(left_context);
            let context_end = (final_end + right_context).min(text.len());
            flags.push(Flag::new(
                kind,
                excerpt(text, context_start, context_end - context_start),
            ));

            scan_from = floor_char_boundary(text, context_end).max(found.end());
        }
    }
}

/// Everything a full description parse produces.
#[derive(Debug)]
pub(crate) struct ParseOutcome {
    pub(crate) layout: Layout,
    pub(crate) pp_text: String,
    pub(crate) tracts: Vec<Tract>,
    pub(crate) w_flags: Vec<Flag>,
    pub(crate) e_flags: Vec<Flag>,
}

/// Parse a full description: preprocess, detect (or honor the forced)
/// layout, optionally segment, extract tract components per chunk, and
/// construct the tracts.
pub(crate) fn parse_description(
    text: &str,
    config: &ParseConfig,
    source: Option<&str>,
) -> ParseOutcome {
    let mut w_flags: Vec<Flag> = config
        .warnings
        .iter()
        .map(|entry| Flag::new(FlagKind::BadConfig, entry.clone()))
        .collect();
    let mut e_flags = Vec::new();

    let preprocessed = preprocess::preprocess(text, config.default_ns, config.default_ew, config.ocr_scrub);
    if !preprocessed.fixed_twprges.is_empty() {
        w_flags.push(Flag::new(
            FlagKind::TwpRgeFixed,
            preprocessed.fixed_twprges.join(","),
        ));
    }
    for repaired in &preprocessed.ocr_fixed {
        w_flags.push(Flag::new(FlagKind::OcrFixed, repaired.clone()));
    }
    let pp_text = preprocessed.text;

    let layout = config
        .layout
        .unwrap_or_else(|| detect::deduce_layout(&pp_text));

    if pp_text.trim().is_empty() {
        e_flags.push(Flag::bare(FlagKind::NoText));
    } else {
        if !rgx::TWPRGE.is_match(&pp_text) {
            e_flags.push(Flag::bare(FlagKind::NoTwpRge));
        }
        if !rgx::MULTISEC.is_match(&pp_text) {
            e_flags.push(Flag::bare(FlagKind::NoSection));
        }
    }

    tracing::debug!(%layout, segment = config.segment, "extracting tracts");

    let (blocks, mut unused) = if config.segment {
        let segmented = segment::segment_text(&pp_text, layout, config);
        (segmented.blocks, segmented.unused)
    } else {
        (vec![pp_text.clone()], Vec::new())
    };

    let mut components = Vec::new();
    for block in &blocks {
        let chunk_layout = if layout == Layout::CopyAll {
            Layout::CopyAll
        } else if config.layout.is_some() && !config.segment {
            layout
        } else {
            detect::deduce_layout(block)
        };

        let chunk = parse_chunk(block, chunk_layout, config, config.segment);
        let staged_before = components.len();
        components.extend(chunk.components);
        unused.extend(
            chunk
                .unused
                .into_iter()
                .map(|(position, block)| (staged_before + position, block)),
        );
        w_flags.extend(chunk.w_flags);
    }

    if config.sec_within {
        rebuild_sec_within(&mut components, &mut unused);
    }

    // Construct the tracts, one per enumerated section, in order.
    let clean_up = layout != Layout::CopyAll;
    let mut tracts: Vec<Tract> = Vec::new();
    for component in components {
        let desc = if clean_up {
            cleanup_desc(&component.desc)
        } else {
            component.desc
        };
        for sec in &component.secs {
            let trs = format!("{}{sec}", component.twprge)
                .parse::<Trs>()
                .unwrap_or(Trs::ERROR);
            if component.sec_within {
                w_flags.push(Flag::new(FlagKind::SecWithin, trs.to_string()));
            }
            tracts.push(Tract {
                trs,
                desc: desc.clone(),
                pp_desc: desc.clone(),
                orig_desc: text.to_string(),
                orig_index: tracts.len(),
                source: source.map(ToString::to_string),
                ..Tract::default()
            });
        }
    }

    for (_, block) in unused {
        let block = cleanup_desc(&block);
        if block.len() >= MIN_REPORTABLE_UNUSED_LEN {
            w_flags.push(Flag::new(FlagKind::UnusedDesc, block));
        }
    }

    // Tracts inherit the description's flags by copy, then parse their
    // own text if asked (appending any tract-level flags).
    for tract in &mut tracts {
        tract.w_flags.clone_from(&w_flags);
        tract.e_flags.clone_from(&e_flags);
    }
    if config.parse_qq {
        for tract in &mut tracts {
            tract.parse_lots_qqs(config);
        }
    }

    tracing::debug!(
        tracts = tracts.len(),
        warnings = w_flags.len(),
        errors = e_flags.len(),
        "parse complete"
    );

    ParseOutcome {
        layout,
        pp_text,
        tracts,
        w_flags,
        e_flags,
    }
}
