//! Turns the markup produced by `velo_core::markdown` into terminal lines.
//!
//! Only the renderer's own vocabulary is interpreted. Anything else that looks
//! like a tag is shown as typed.

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use velo_core::markdown::LIST_ITEM_CLASS;

const RULE_WIDTH: usize = 32;
const LIST_INDENT: &str = "  ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
    Break,
    Rule,
    Strong,
    StrongEnd,
    Em,
    EmEnd,
    Heading(u8),
    HeadingEnd,
    ListItem,
    ListItemEnd,
}

const FIXED_TAGS: &[(&str, Tag)] = &[
    ("<br>", Tag::Break),
    ("<hr>", Tag::Rule),
    ("<strong>", Tag::Strong),
    ("</strong>", Tag::StrongEnd),
    ("<em>", Tag::Em),
    ("</em>", Tag::EmEnd),
    ("<h1>", Tag::Heading(1)),
    ("<h2>", Tag::Heading(2)),
    ("<h3>", Tag::Heading(3)),
    ("</h1>", Tag::HeadingEnd),
    ("</h2>", Tag::HeadingEnd),
    ("</h3>", Tag::HeadingEnd),
    ("</div>", Tag::ListItemEnd),
];

fn tag_at(rest: &str, list_item_open: &str) -> Option<(Tag, usize)> {
    if let Some((text, tag)) = FIXED_TAGS.iter().find(|(text, _)| rest.starts_with(*text)) {
        return Some((*tag, text.len()));
    }
    rest.starts_with(list_item_open)
        .then(|| (Tag::ListItem, list_item_open.len()))
}

#[derive(Default)]
struct LineBuilder {
    lines: Vec<Line<'static>>,
    spans: Vec<Span<'static>>,
    text: String,
    bold: bool,
    italic: bool,
    heading: Option<u8>,
    after_rule: bool,
}

impl LineBuilder {
    fn style(&self) -> Style {
        let mut style = match self.heading {
            Some(1) => Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            Some(2) => Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            Some(_) => Style::default().add_modifier(Modifier::BOLD),
            None => Style::default(),
        };
        if self.bold {
            style = style.add_modifier(Modifier::BOLD);
        }
        if self.italic {
            style = style.add_modifier(Modifier::ITALIC);
        }
        style
    }

    fn flush_text(&mut self) {
        if !self.text.is_empty() {
            let text = std::mem::take(&mut self.text);
            self.spans.push(Span::styled(text, self.style()));
        }
    }

    fn end_line(&mut self) {
        self.flush_text();
        self.lines.push(Line::from(std::mem::take(&mut self.spans)));
    }

    fn apply(&mut self, tag: Tag) {
        // A rule is a line of its own, so the break that follows it is dropped.
        let after_rule = std::mem::take(&mut self.after_rule);
        self.flush_text();

        match tag {
            Tag::Break => {
                if !(after_rule && self.spans.is_empty()) {
                    self.end_line();
                }
            }
            Tag::Rule => {
                if !self.spans.is_empty() {
                    self.end_line();
                }
                self.lines.push(Line::from(Span::styled(
                    "─".repeat(RULE_WIDTH),
                    Style::default().fg(Color::DarkGray),
                )));
                self.after_rule = true;
            }
            Tag::Strong => self.bold = true,
            Tag::StrongEnd => self.bold = false,
            Tag::Em => self.italic = true,
            Tag::EmEnd => self.italic = false,
            Tag::Heading(level) => self.heading = Some(level),
            Tag::HeadingEnd => self.heading = None,
            Tag::ListItem => self.spans.push(Span::raw(LIST_INDENT)),
            Tag::ListItemEnd => {}
        }
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        self.flush_text();
        if !self.spans.is_empty() {
            self.end_line();
        }
        self.lines
    }
}

/// Convert rendered assistant markup into styled lines.
pub fn to_lines(html: &str) -> Vec<Line<'static>> {
    let list_item_open = format!("<div class=\"{}\">", LIST_ITEM_CLASS);
    let mut builder = LineBuilder::default();
    let mut rest = html;

    while let Some(c) = rest.chars().next() {
        if c == '<' {
            if let Some((tag, len)) = tag_at(rest, &list_item_open) {
                builder.apply(tag);
                rest = &rest[len..];
                continue;
            }
        }
        builder.after_rule = false;
        builder.text.push(c);
        rest = &rest[c.len_utf8()..];
    }

    builder.finish()
}
