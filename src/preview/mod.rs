//! Markdown preview rendering.
//!
//! HTML comes from comrak with GFM extensions and hard line breaks; fenced
//! code is highlighted by syntect through comrak's adapter, using a palette
//! that follows the editor theme.

use std::sync::LazyLock;

use comrak::plugins::syntect::SyntectAdapter;
use comrak::{Options, Plugins, markdown_to_html_with_plugins};

const LIGHT_THEME: &str = "InspiredGitHub";
const DARK_THEME: &str = "base16-ocean.dark";

static LIGHT_HIGHLIGHTER: LazyLock<SyntectAdapter> =
    LazyLock::new(|| SyntectAdapter::new(Some(LIGHT_THEME)));
static DARK_HIGHLIGHTER: LazyLock<SyntectAdapter> =
    LazyLock::new(|| SyntectAdapter::new(Some(DARK_THEME)));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewTheme {
    Light,
    Dark,
}

impl PreviewTheme {
    pub const fn from_dark(is_dark: bool) -> Self {
        if is_dark { Self::Dark } else { Self::Light }
    }

    /// Name of the syntect theme used for code blocks.
    pub const fn highlight_theme(self) -> &'static str {
        match self {
            Self::Light => LIGHT_THEME,
            Self::Dark => DARK_THEME,
        }
    }

    fn highlighter(self) -> &'static SyntectAdapter {
        match self {
            Self::Light => &LIGHT_HIGHLIGHTER,
            Self::Dark => &DARK_HIGHLIGHTER,
        }
    }
}

/// Render markdown to an HTML fragment.
pub fn render_html(markdown: &str, theme: PreviewTheme) -> String {
    let mut options = Options::default();
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    // Single newlines inside a paragraph render as line breaks, as notes expect.
    options.render.hardbreaks = true;

    let mut plugins = Plugins::default();
    plugins.render.codefence_syntax_highlighter = Some(theme.highlighter());

    markdown_to_html_with_plugins(markdown, &options, &plugins)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_headings_and_emphasis() {
        let html = render_html("# Hi\n\n**bold** and *it*", PreviewTheme::Light);
        assert!(html.contains("<h1>Hi</h1>"));
        assert!(html.contains("<strong>bold</strong>"));
        assert!(html.contains("<em>it</em>"));
    }

    #[test]
    fn test_single_newline_becomes_break() {
        let html = render_html("one\ntwo", PreviewTheme::Light);
        assert!(html.contains("<br />"));
    }

    #[test]
    fn test_gfm_extensions_enabled() {
        let html = render_html("~~gone~~\n\n- [x] done", PreviewTheme::Light);
        assert!(html.contains("<del>gone</del>"));
        assert!(html.contains("checkbox"));
    }

    #[test]
    fn test_raw_html_is_not_passed_through() {
        let html = render_html("<script>alert(1)</script>", PreviewTheme::Light);
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_code_highlight_follows_theme() {
        let md = "```rust\nfn main() {}\n```";
        let light = render_html(md, PreviewTheme::Light);
        let dark = render_html(md, PreviewTheme::Dark);
        assert!(light.contains("<pre"));
        assert!(light.contains("main"));
        assert_ne!(light, dark);
    }

    #[test]
    fn test_theme_names() {
        assert_eq!(PreviewTheme::from_dark(true), PreviewTheme::Dark);
        assert_eq!(PreviewTheme::Dark.highlight_theme(), "base16-ocean.dark");
        assert_eq!(PreviewTheme::from_dark(false).highlight_theme(), "InspiredGitHub");
    }
}
