//! Markdown to HTML for agent replies
//!
//! Agents answer in markdown with tables. Raw HTML in a reply is shown as
//! text, never passed through to the page.

use pulldown_cmark::{Event, Options, Parser, html};

/// Render a markdown reply as an HTML fragment
pub fn render_markdown(text: &str) -> String {
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
    let events = Parser::new_ext(text, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });

    let mut out = String::with_capacity(text.len() * 3 / 2);
    html::push_html(&mut out, events);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_renders() {
        let html = render_markdown(
            "## Ranking\n\n| Symbol | Change |\n|---|---|\n| AAPL | +10% |\n| TSLA | -5% |\n",
        );
        assert!(html.contains("<h2>Ranking</h2>"));
        assert!(html.contains("<table>"));
        assert!(html.contains("<th>Symbol</th>"));
        assert!(html.contains("<td>TSLA</td>"));
    }

    #[test]
    fn test_raw_html_is_escaped() {
        let html = render_markdown("Buy <script>alert(1)</script> now");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(render_markdown("NVDA **up** 3%"), "<p>NVDA <strong>up</strong> 3%</p>\n");
    }
}
