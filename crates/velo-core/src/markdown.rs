//! Markdown-like assistant text to an HTML fragment.
//!
//! The renderer is an ordered cascade of regex rules, each one rewriting the
//! output of the previous one. Order is part of the contract:
//!
//! 1. horizontal rules
//! 2. headers, `###` before `##` before `#`
//! 3. bold, then 4. italic, so doubled markers are not split
//! 5. ordered and bulleted list lines
//! 6. newline collapsing and `<br>` conversion
//! 7. `[docN]` citation placeholders are deleted
//!
//! Text is not escaped. The fragment is only safe to inject when the host
//! treats anything outside this tag vocabulary as untrusted.

use std::sync::LazyLock;

use regex::Regex;

/// Class carried by every list line block.
pub const LIST_ITEM_CLASS: &str = "md-list-item";

/// Glyph every bulleted list marker is normalized to.
pub const BULLET: &str = "•";

/// One rewrite step of the cascade.
#[derive(Debug)]
pub struct Rule {
    pub name: &'static str,
    pattern: Regex,
    replacement: String,
}

impl Rule {
    fn new(name: &'static str, pattern: &str, replacement: impl Into<String>) -> Self {
        Self {
            name,
            pattern: Regex::new(pattern).expect("built-in markdown pattern must compile"),
            replacement: replacement.into(),
        }
    }

    fn apply(&self, input: &str) -> String {
        self.pattern
            .replace_all(input, self.replacement.as_str())
            .into_owned()
    }
}

static RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        Rule::new("horizontal_rule", r"(?m)^(?:-{3,}|\*{3,})$", "<hr>"),
        Rule::new("h3", r"(?m)^### (.*)$", "<h3>${1}</h3>"),
        Rule::new("h2", r"(?m)^## (.*)$", "<h2>${1}</h2>"),
        Rule::new("h1", r"(?m)^# (.*)$", "<h1>${1}</h1>"),
        Rule::new("bold_stars", r"\*\*(.+?)\*\*", "<strong>${1}</strong>"),
        Rule::new("bold_underscores", r"__(.+?)__", "<strong>${1}</strong>"),
        Rule::new("italic_star", r"\*(.+?)\*", "<em>${1}</em>"),
        Rule::new("italic_underscore", r"_(.+?)_", "<em>${1}</em>"),
        Rule::new(
            "ordered_list",
            r"(?m)^(\d+)\.[ \t]+(.*)$",
            format!(r#"<div class="{LIST_ITEM_CLASS}">${{1}}. ${{2}}</div>"#),
        ),
        Rule::new(
            "bullet_list",
            r"(?m)^[-*][ \t]+(.*)$",
            format!(r#"<div class="{LIST_ITEM_CLASS}">{BULLET} ${{1}}</div>"#),
        ),
        Rule::new("collapse_blank_lines", r"\n{3,}", "\n\n"),
        Rule::new("paragraph_break", r"\n\n", "<br><br>"),
        Rule::new("line_break", r"\n", "<br>"),
        Rule::new("strip_citations", r"\[doc\d+\]", ""),
    ]
});

/// Names of the cascade steps in application order.
#[cfg(test)]
fn rule_names() -> Vec<&'static str> {
    RULES.iter().map(|rule| rule.name).collect()
}

/// Render assistant text into an HTML fragment. Never fails.
pub fn render(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    RULES.iter().fold(text.to_string(), |buffer, rule| {
        let next = rule.apply(&buffer);
        if next != buffer {
            tracing::trace!(rule = rule.name, "markdown rule applied");
        }
        next
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_is_unchanged() {
        assert_eq!(render(""), "");
    }

    #[test]
    fn test_headers_most_specific_first() {
        assert_eq!(render("### a"), "<h3>a</h3>");
        assert_eq!(render("## b"), "<h2>b</h2>");
        assert_eq!(render("# c"), "<h1>c</h1>");
        assert_eq!(
            render("# c\n## d\n### e"),
            "<h1>c</h1><br><h2>d</h2><br><h3>e</h3>"
        );
    }

    #[test]
    fn test_h3_never_degrades_to_generic_header() {
        let html = render("### Federgabel");
        assert!(!html.contains("<h1>"));
        assert!(!html.contains("<h2>"));
        assert!(!html.contains('#'));
    }

    #[test]
    fn test_header_needs_line_start() {
        assert_eq!(render("Preis # 1"), "Preis # 1");
    }

    #[test]
    fn test_bold_before_italic() {
        assert_eq!(render("**Stereo**"), "<strong>Stereo</strong>");
        assert_eq!(render("__Stereo__"), "<strong>Stereo</strong>");
        assert_eq!(render("*leicht*"), "<em>leicht</em>");
        assert_eq!(render("_leicht_"), "<em>leicht</em>");
        assert_eq!(
            render("**Carbon** und *Alu*"),
            "<strong>Carbon</strong> und <em>Alu</em>"
        );
    }

    #[test]
    fn test_unclosed_markers_pass_through() {
        assert_eq!(render("**offen"), "**offen");
        assert_eq!(render("5 * 3"), "5 * 3");
    }

    #[test]
    fn test_horizontal_rules() {
        assert_eq!(render("---"), "<hr>");
        assert_eq!(render("*****"), "<hr>");
        assert_eq!(render("a\n---\nb"), "a<br><hr><br>b");
        // Rule markers must fill the whole line.
        assert_eq!(render("-- x"), "-- x");
    }

    #[test]
    fn test_ordered_list_keeps_digits() {
        assert_eq!(
            render("1. Rahmen\n12. Gabel"),
            format!(
                r#"<div class="{LIST_ITEM_CLASS}">1. Rahmen</div><br><div class="{LIST_ITEM_CLASS}">12. Gabel</div>"#
            )
        );
    }

    #[test]
    fn test_bullets_normalized() {
        assert_eq!(
            render("- Alu\n* Carbon"),
            format!(
                r#"<div class="{LIST_ITEM_CLASS}">• Alu</div><br><div class="{LIST_ITEM_CLASS}">• Carbon</div>"#
            )
        );
    }

    #[test]
    fn test_line_break_normalization() {
        assert_eq!(render("a\nb"), "a<br>b");
        assert_eq!(render("a\n\nb"), "a<br><br>b");
        assert_eq!(render("a\n\n\n\n\nb"), "a<br><br>b");
    }

    #[test]
    fn test_citations_stripped() {
        assert_eq!(
            render("Das Stereo [doc1] ist top [doc12]."),
            "Das Stereo  ist top ."
        );
        let html = render("[doc1][doc2][doc3] Reaction [doc42]");
        for n in [1, 2, 3, 42] {
            assert!(!html.contains(&format!("[doc{n}]")));
        }
        // Other bracketed text is left alone.
        assert_eq!(render("[Seite 3]"), "[Seite 3]");
    }

    #[test]
    fn test_plain_text_is_idempotent() {
        for plain in ["Hallo Welt", "Erste Zeile\nZweite Zeile", "a\n\n\nb", "UVP 1299 EUR"] {
            let once = render(plain);
            assert_eq!(render(&once), once, "input: {plain:?}");
        }
    }

    #[test]
    fn test_rule_order() {
        let names = rule_names();
        let pos = |name: &str| names.iter().position(|n| *n == name).unwrap();
        assert!(pos("horizontal_rule") < pos("h1"));
        assert!(pos("h3") < pos("h2") && pos("h2") < pos("h1"));
        assert!(pos("bold_stars") < pos("italic_star"));
        assert!(pos("bullet_list") < pos("line_break"));
        assert_eq!(names.last(), Some(&"strip_citations"));
    }
}
