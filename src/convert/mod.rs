//! Heuristic conversion between plain text and markdown.
//!
//! Both directions are line-oriented and lossy:
//! - [`text_to_markdown`] synthesizes headings and normalizes list markers
//! - [`markdown_to_text`] strips markup down to readable text
//!
//! Neither is the inverse of the other. Feeding the output of one into the
//! other does not, in general, give back the input.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

/// Lines at or above this many characters are never promoted to headings.
const MAX_HEADING_CHARS: usize = 50;

static HEADING_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#{1,6}\s").expect("heading marker pattern"));
static BULLET_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-*•]\s").expect("bullet marker pattern"));
static ORDINAL_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\s").expect("ordinal marker pattern"));

static MD_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#{1,6}[ \t]+").expect("heading pattern"));
static MD_BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("bold pattern"));
// The opening `*` must touch its text, so a `* item` list marker is left for
// the list pass instead of pairing with a later emphasis star.
static MD_ITALIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\*([^\s*](?:[^*]*?[^\s*])?)\*").expect("italic pattern")
});
static MD_CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`(.*?)`").expect("code pattern"));
static MD_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\([^)]+\)").expect("link pattern"));
static MD_BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-*+][ \t]+").expect("bullet pattern"));
static MD_ORDINAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.[ \t]+").expect("ordinal pattern"));

/// Glyph used for list items in plain text.
pub const TEXT_BULLET: &str = "• ";

/// Convert plain text into an approximation of markdown.
///
/// Each line is trimmed and classified on its own, in priority order:
/// blank, existing heading, short all-caps line (becomes `## `), list item
/// (normalized to `- `), paragraph.
pub fn text_to_markdown(text: &str) -> String {
    text.split('\n')
        .map(|line| convert_line(line.trim()))
        .collect::<Vec<_>>()
        .join("\n")
}

fn convert_line(line: &str) -> Cow<'_, str> {
    if line.is_empty() || HEADING_MARKER.is_match(line) {
        return Cow::Borrowed(line);
    }
    if is_shouted(line) {
        return Cow::Owned(format!("## {line}"));
    }
    if let Some(marker) = BULLET_MARKER
        .find(line)
        .or_else(|| ORDINAL_MARKER.find(line))
    {
        return Cow::Owned(format!("- {}", &line[marker.end()..]));
    }
    Cow::Borrowed(line)
}

/// A short line with at least one capital and nothing in lower case.
fn is_shouted(line: &str) -> bool {
    line.chars().count() < MAX_HEADING_CHARS
        && line.chars().any(char::is_uppercase)
        && !line.chars().any(char::is_lowercase)
}

/// Strip markdown markup down to plain text.
///
/// Each line goes through a fixed order of substitutions: heading marker,
/// bold, italic, inline code, links, then list markers. A heading line skips
/// the list pass, so `## 1. Intro` keeps its `1.`. Literal markup characters
/// are not unescaped.
pub fn markdown_to_text(markdown: &str) -> String {
    markdown
        .split('\n')
        .map(strip_line)
        .collect::<Vec<_>>()
        .join("\n")
}

fn strip_line(line: &str) -> String {
    if let Some(marker) = MD_HEADING.find(line) {
        return strip_inline(&line[marker.end()..]);
    }
    let text = strip_inline(line);
    let text = MD_BULLET.replace(&text, TEXT_BULLET);
    MD_ORDINAL.replace(&text, TEXT_BULLET).into_owned()
}

fn strip_inline(line: &str) -> String {
    let text = MD_BOLD.replace_all(line, "$1");
    let text = MD_ITALIC.replace_all(&text, "$1");
    let text = MD_CODE.replace_all(&text, "$1");
    MD_LINK.replace_all(&text, "$1").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_to_markdown_promotes_caps_and_normalizes_bullets() {
        let text = "HELLO WORLD\n- item one\n* item two\nplain line";
        assert_eq!(
            text_to_markdown(text),
            "## HELLO WORLD\n- item one\n- item two\nplain line"
        );
    }

    #[test]
    fn test_markdown_to_text_strips_inline_markup() {
        let md = "## Title\n**bold** and *italic* and `code`\n[link](http://x)";
        assert_eq!(markdown_to_text(md), "Title\nbold and italic and code\nlink");
    }

    #[test]
    fn test_existing_heading_passes_through() {
        assert_eq!(text_to_markdown("### Already a heading"), "### Already a heading");
        assert_eq!(text_to_markdown("# lower case"), "# lower case");
    }

    #[test]
    fn test_seven_hashes_is_not_a_heading() {
        assert_eq!(text_to_markdown("####### too deep"), "####### too deep");
    }

    #[test]
    fn test_caps_heading_wins_over_list_marker() {
        assert_eq!(text_to_markdown("- TODO"), "## - TODO");
    }

    #[test]
    fn test_long_caps_line_is_not_promoted() {
        let line = "A".repeat(50);
        assert_eq!(text_to_markdown(&line), line);
        let shorter = "A".repeat(49);
        assert_eq!(text_to_markdown(&shorter), format!("## {shorter}"));
    }

    #[test]
    fn test_caps_requires_a_letter() {
        assert_eq!(text_to_markdown("1234 !!"), "1234 !!");
        assert_eq!(text_to_markdown("---"), "---");
    }

    #[test]
    fn test_uncased_script_is_not_promoted() {
        assert_eq!(text_to_markdown("今天的笔记"), "今天的笔记");
    }

    #[test]
    fn test_ordinal_and_glyph_bullets_normalize() {
        let text = "1. first\n12. twelfth\n• dot";
        assert_eq!(text_to_markdown(text), "- first\n- twelfth\n- dot");
    }

    #[test]
    fn test_lines_are_trimmed_and_blank_lines_kept() {
        let text = "  indented  \n\n\t- tabbed item\n   ";
        assert_eq!(text_to_markdown(text), "indented\n\n- tabbed item\n");
    }

    #[test]
    fn test_crlf_input_loses_carriage_returns() {
        assert_eq!(text_to_markdown("one\r\ntwo\r\n"), "one\ntwo\n");
    }

    #[test]
    fn test_markdown_lists_become_bullet_glyphs() {
        let md = "- dash\n* star\n+ plus\n3. third";
        assert_eq!(markdown_to_text(md), "• dash\n• star\n• plus\n• third");
    }

    #[test]
    fn test_star_bullet_with_emphasis_keeps_marker() {
        assert_eq!(markdown_to_text("* item with *emph*"), "• item with emph");
    }

    #[test]
    fn test_heading_with_list_like_suffix_is_stripped_once() {
        assert_eq!(markdown_to_text("## 1. Intro"), "1. Intro");
    }

    #[test]
    fn test_link_label_survives_list_normalization() {
        assert_eq!(markdown_to_text("- [docs](https://example.com)"), "• docs");
    }

    #[test]
    fn test_round_trip_is_not_identity() {
        let text = "NOTES\n1. buy milk";
        let back = markdown_to_text(&text_to_markdown(text));
        assert_eq!(back, "NOTES\n• buy milk");
        assert_ne!(back, text);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn caps_lines_gain_exactly_one_heading_marker(line in "[A-Z][A-Z0-9 ]{0,40}") {
                let line = line.trim().to_string();
                let once = text_to_markdown(&line);
                prop_assert_eq!(&once, &format!("## {line}"));
                prop_assert_eq!(text_to_markdown(&once), once);
            }

            #[test]
            fn heading_lines_are_identity(
                level in 1..=6usize,
                body in "[a-zA-Z0-9][a-zA-Z0-9 ]{0,30}",
            ) {
                let line = format!("{} {}", "#".repeat(level), body.trim_end());
                prop_assert_eq!(text_to_markdown(&line), line);
            }

            #[test]
            fn line_count_is_preserved(lines in prop::collection::vec("[ -~]{0,40}", 0..8)) {
                let text = lines.join("\n");
                let lines = text.split('\n').count();
                prop_assert_eq!(text_to_markdown(&text).split('\n').count(), lines);
                prop_assert_eq!(markdown_to_text(&text).split('\n').count(), lines);
            }

            #[test]
            fn text_to_markdown_is_idempotent(lines in prop::collection::vec("[ -~]{0,40}", 0..8)) {
                let text = lines.join("\n");
                let once = text_to_markdown(&text);
                prop_assert_eq!(text_to_markdown(&once), once);
            }
        }
    }
}
