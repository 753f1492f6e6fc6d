//! Markdown rendering for agent answers
//!
//! Answers are untrusted. Raw HTML is dropped and control characters are
//! stripped so the text cannot drive the terminal.

use pulldown_cmark::{Event, Parser, Tag, TagEnd};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

/// Render markdown into styled terminal lines
pub fn render(markdown: &str) -> Vec<Line<'static>> {
    let mut renderer = Renderer::default();
    for event in Parser::new(markdown) {
        renderer.handle(event);
    }
    renderer.finish()
}

/// Remove characters that a terminal would interpret (ESC, BEL, CR...)
pub fn sanitize(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .map(|c| if c == '\t' { ' ' } else { c })
        .collect()
}

#[derive(Default)]
struct Renderer {
    lines: Vec<Line<'static>>,
    current: Vec<Span<'static>>,
    bold: usize,
    italic: usize,
    heading: bool,
    code_block: bool,
    /// Next item number per open list; `None` for bullet lists
    lists: Vec<Option<u64>>,
    link: Option<String>,
}

impl Renderer {
    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => {
                if self.code_block {
                    self.push_code_block(&text);
                } else {
                    self.push_text(&text, self.style());
                }
            }
            Event::Code(code) => {
                self.push_text(&code, Style::default().fg(Color::Yellow));
            }
            Event::SoftBreak => self.push_text(" ", self.style()),
            Event::HardBreak => self.flush(),
            Event::Rule => {
                self.flush();
                self.lines.push(Line::styled(
                    "────────",
                    Style::default().fg(Color::DarkGray),
                ));
            }
            // Raw HTML never reaches the screen
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {}
            Tag::Heading { .. } => {
                self.flush();
                self.heading = true;
            }
            Tag::Strong => self.bold += 1,
            Tag::Emphasis => self.italic += 1,
            Tag::List(start) => {
                self.flush();
                self.lists.push(start);
            }
            Tag::Item => {
                self.flush();
                let depth = self.lists.len().saturating_sub(1);
                let marker = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        let marker = format!("{n}. ");
                        *n += 1;
                        marker
                    }
                    _ => "• ".to_string(),
                };
                self.current
                    .push(Span::raw(format!("{}{marker}", "  ".repeat(depth))));
            }
            Tag::CodeBlock(_) => {
                self.flush();
                self.code_block = true;
            }
            Tag::Link { dest_url, .. } => {
                self.link = Some(sanitize(&dest_url));
            }
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => {
                self.flush();
                self.blank_line();
            }
            TagEnd::Heading(_) => {
                self.flush();
                self.heading = false;
                self.blank_line();
            }
            TagEnd::Strong => self.bold = self.bold.saturating_sub(1),
            TagEnd::Emphasis => self.italic = self.italic.saturating_sub(1),
            TagEnd::List(_) => {
                self.flush();
                self.lists.pop();
                if self.lists.is_empty() {
                    self.blank_line();
                }
            }
            TagEnd::Item => self.flush(),
            TagEnd::CodeBlock => {
                self.flush();
                self.code_block = false;
                self.blank_line();
            }
            TagEnd::Link => {
                if let Some(url) = self.link.take() {
                    self.current.push(Span::styled(
                        format!(" <{url}>"),
                        Style::default().fg(Color::Cyan),
                    ));
                }
            }
            _ => {}
        }
    }

    fn style(&self) -> Style {
        let mut style = Style::default();
        if self.heading {
            style = style.fg(Color::Magenta).add_modifier(Modifier::BOLD);
        }
        if self.bold > 0 {
            style = style.add_modifier(Modifier::BOLD);
        }
        if self.italic > 0 {
            style = style.add_modifier(Modifier::ITALIC);
        }
        if self.link.is_some() {
            style = style.add_modifier(Modifier::UNDERLINED);
        }
        style
    }

    fn push_text(&mut self, text: &str, style: Style) {
        let clean = sanitize(text).replace('\n', " ");
        if !clean.is_empty() {
            self.current.push(Span::styled(clean, style));
        }
    }

    fn push_code_block(&mut self, text: &str) {
        let style = Style::default().fg(Color::Green);
        for line in sanitize(text).lines() {
            self.lines
                .push(Line::from(Span::styled(format!("  {line}"), style)));
        }
    }

    fn flush(&mut self) {
        if !self.current.is_empty() {
            self.lines.push(Line::from(std::mem::take(&mut self.current)));
        }
    }

    fn blank_line(&mut self) {
        if self.lines.last().is_some_and(|l| !l.spans.is_empty()) {
            self.lines.push(Line::default());
        }
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        self.flush();
        while self.lines.last().is_some_and(|l| l.spans.is_empty()) {
            self.lines.pop();
        }
        self.lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(lines: &[Line<'_>]) -> Vec<String> {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn bold_and_italic_are_styled() {
        let lines = render("**Welcome** aboard *navigator*");
        assert_eq!(plain(&lines), vec!["Welcome aboard navigator"]);

        let spans = &lines[0].spans;
        assert!(spans[0].style.add_modifier.contains(Modifier::BOLD));
        assert!(spans[2].style.add_modifier.contains(Modifier::ITALIC));
    }

    #[test]
    fn paragraphs_are_separated_by_blank_lines() {
        let lines = render("First.\n\nSecond.");
        assert_eq!(plain(&lines), vec!["First.", "", "Second."]);
    }

    #[test]
    fn lists_get_markers() {
        let lines = render("- red giant\n- white dwarf\n\n1. one\n2. two");
        let text = plain(&lines);
        assert!(text.contains(&"• red giant".to_string()));
        assert!(text.contains(&"• white dwarf".to_string()));
        assert!(text.contains(&"1. one".to_string()));
        assert!(text.contains(&"2. two".to_string()));
    }

    #[test]
    fn raw_html_is_dropped() {
        let lines = render("Hello <script>alert(1)</script> world\n\n<div>block</div>");
        let text = plain(&lines).join("\n");
        assert!(!text.contains("<script>"));
        assert!(!text.contains("<div>"));
        assert!(text.contains("Hello"));
    }

    #[test]
    fn control_characters_are_stripped() {
        let lines = render("safe \u{1b}[31mred\u{7} text");
        let text = plain(&lines).join("");
        assert!(!text.contains('\u{1b}'));
        assert!(!text.contains('\u{7}'));
        assert!(text.contains("red"));
    }

    #[test]
    fn links_show_their_target() {
        let lines = render("[NASA](https://nasa.gov)");
        assert_eq!(plain(&lines), vec!["NASA <https://nasa.gov>"]);
    }

    #[test]
    fn empty_input_renders_nothing() {
        assert!(render("").is_empty());
    }
}
