//! Layout detection: classify the ordering of Twp/Rge, Section, and the
//! description body. Detection is free of side effects; it only reads.

use crate::{domain::Layout, parse::rgx};

/// Deduce the layout of (already preprocessed) description text.
///
/// The first section signature and the first Twp/Rge signature decide the
/// classification. A section-first reading is only accepted as
/// `S_desc_TR` when the section opens the text (offset ≤ 1) — that layout
/// is unusual enough to get no more room for error than that. When the
/// Twp/Rge comes first, at least four characters of material between it
/// and the section mean the description sits between them (`TR_desc_S`);
/// otherwise ties break in favor of `TRS_desc`. Text missing either
/// signature is an insurmountable flaw, classified `copy_all`.
pub(crate) fn deduce_layout(text: &str) -> Layout {
    let text = text.trim();

    let Some(sec) = rgx::NO_NUM_SEC.find(text) else {
        return Layout::CopyAll;
    };
    let Some(twprge) = rgx::TWPRGE.find(text) else {
        return Layout::CopyAll;
    };

    if sec.start() < twprge.start() {
        if sec.start() <= 1 {
            return Layout::SDescTr;
        }
        return Layout::DescStr;
    }

    if twprge.end() <= sec.start() {
        let between = text[twprge.end()..sec.start()].trim();
        if between.len() >= 4 {
            return Layout::TrDescS;
        }
    }

    Layout::TrsDesc
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case("T154N-R97W\nSection 14: NE/4", Layout::TrsDesc; "trs desc")]
    #[test_case("NE/4 of Section 14, T154N-R97W", Layout::DescStr; "desc str")]
    #[test_case("Section 14: NE/4, T154N-R97W", Layout::SDescTr; "s desc tr")]
    #[test_case("T154N-R97W\nNE/4 of Section 14", Layout::TrDescS; "tr desc s")]
    #[test_case("NE/4 of nothing in particular", Layout::CopyAll; "no twprge")]
    #[test_case("T154N-R97W and nothing else", Layout::CopyAll; "no section")]
    #[test_case("", Layout::CopyAll; "empty")]
    fn classifies(text: &str, expected: Layout) {
        assert_eq!(deduce_layout(text), expected);
    }

    #[test]
    fn section_first_but_late_is_desc_str() {
        // The section signature comes before the Twp/Rge but not at the
        // head of the text, so this reads as description-first.
        let text = "The NE/4 of Section 14, T154N-R97W";
        assert_eq!(deduce_layout(text), Layout::DescStr);
    }

    #[test]
    fn short_gap_between_twprge_and_section_is_trs_desc() {
        assert_eq!(deduce_layout("T154N-R97W, Sec 14: NE/4"), Layout::TrsDesc);
    }
}
