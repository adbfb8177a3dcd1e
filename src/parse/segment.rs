//! Segmentation: break a description into layout-homogeneous chunks at
//! Twp/Rge seams, so a description whose layout changes between Twp/Rge
//! blocks can be parsed piecewise.
//!
//! In Twp/Rge-first layouts each chunk starts at a Twp/Rge; in
//! Twp/Rge-last layouts each chunk ends at one. Text outside every chunk
//! is reported back as unused. A layout change *within* a single Twp/Rge
//! region is not recoverable here; the extractor flags it and degrades
//! that chunk to a stopgap.

use crate::{
    domain::{Layout, ParseConfig},
    parse::extract,
};

/// The chunks of one segmented description.
#[derive(Debug, Default)]
pub(crate) struct Segmented {
    pub(crate) blocks: Vec<String>,
    /// Out-of-chunk text: `(0, _)` came before the first chunk,
    /// `(1, _)` after the last.
    pub(crate) unused: Vec<(usize, String)>,
}

/// Split `text` into one chunk per matching Twp/Rge, according to the
/// (detected or forced) layout of the overall description.
pub(crate) fn segment_text(text: &str, layout: Layout, config: &ParseConfig) -> Segmented {
    // Finder flags are not collected here; the extractor re-finds and
    // flags when each chunk is parsed.
    let (matches, _) = extract::find_matching_twprge(text, layout, config);

    let mut segmented = Segmented::default();
    if matches.is_empty() || layout == Layout::CopyAll {
        segmented.blocks.push(text.to_string());
        return segmented;
    }

    if layout.twprge_first() {
        split_twprge_first(text, &matches, &mut segmented);
    } else {
        split_twprge_last(text, &matches, &mut segmented);
    }
    segmented
}

/// Chunk for layouts where Twp/Rge opens each block (`TRS_desc`,
/// `TR_desc_S`): each chunk runs from one Twp/Rge to the next.
fn split_twprge_first(text: &str, matches: &[extract::TwprgeMatch], segmented: &mut Segmented) {
    for (i, m) in matches.iter().enumerate() {
        let next_start = matches.get(i + 1).map_or(text.len(), |next| next.start);

        if i == 0 && m.start != 0 {
            // Text before the first Twp/Rge, in a layout that wants
            // Twp/Rge first.
            segmented.unused.push((0, text[..m.start].to_string()));
        }

        segmented
            .blocks
            .push(extract::cleanup_desc(&text[m.start..next_start]));
    }
}

/// Chunk for layouts where Twp/Rge closes each block (`desc_STR`,
/// `S_desc_TR`): each chunk runs from the previous Twp/Rge's end through
/// this one's end.
fn split_twprge_last(text: &str, matches: &[extract::TwprgeMatch], segmented: &mut Segmented) {
    for (i, m) in matches.iter().enumerate() {
        let previous_end = if i == 0 { 0 } else { matches[i - 1].end };

        if i == matches.len() - 1 && m.end != text.len() {
            // Text after the last Twp/Rge, in a layout that wants
            // Twp/Rge last.
            segmented.unused.push((1, text[m.end..].to_string()));
        }

        segmented
            .blocks
            .push(extract::cleanup_desc(&text[previous_end..m.end]));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ParseConfig {
        ParseConfig::default()
    }

    #[test]
    fn twprge_last_layout_splits_after_each_twprge() {
        let text = "Sec 14: NE/4, T154N-R97W\nSec 22: ALL, T155N-R97W";
        let segmented = segment_text(text, Layout::SDescTr, &config());

        assert_eq!(
            segmented.blocks,
            ["Sec 14: NE/4, T154N-R97W", "Sec 22: ALL, T155N-R97W"]
        );
        assert!(segmented.unused.is_empty());
    }

    #[test]
    fn twprge_first_layout_splits_before_each_twprge() {
        let text = "T154N-R97W Sec 14: NE/4 T155N-R97W Sec 22: ALL";
        let segmented = segment_text(text, Layout::TrsDesc, &config());

        assert_eq!(
            segmented.blocks,
            ["T154N-R97W Sec 14: NE/4", "T155N-R97W Sec 22: ALL"]
        );
    }

    #[test]
    fn leading_text_is_unused_in_twprge_first_layout() {
        let text = "Preamble text here. T154N-R97W Sec 14: NE/4";
        let segmented = segment_text(text, Layout::TrsDesc, &config());

        assert_eq!(segmented.blocks.len(), 1);
        assert_eq!(segmented.unused, [(0, "Preamble text here. ".to_string())]);
    }

    #[test]
    fn trailing_text_is_unused_in_twprge_last_layout() {
        let text = "Sec 14: NE/4, T154N-R97W with a trailer";
        let segmented = segment_text(text, Layout::SDescTr, &config());

        assert_eq!(segmented.blocks.len(), 1);
        assert_eq!(segmented.unused, [(1, " with a trailer".to_string())]);
    }

    #[test]
    fn no_twprge_yields_single_block() {
        let segmented = segment_text("Sec 14: NE/4", Layout::CopyAll, &config());
        assert_eq!(segmented.blocks.len(), 1);
    }
}
