use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::app::App;
use crate::theme::Teletext;

/// Classic teletext page width in characters
const PAGE_COLUMNS: u16 = 40;

pub struct PageViewWidget;

impl PageViewWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let state = app.nav_state();
        let settings = app.settings();
        let highlight = settings.highlight_links;

        let lines: Vec<Line> = if state.is_loading_page {
            vec![Line::from(Span::styled(
                "Loading page...",
                Style::default().fg(Teletext::DIM),
            ))]
        } else if let Some(ref response) = state.response {
            response
                .lines
                .iter()
                .map(|line| page_line(line, highlight))
                .collect()
        } else {
            vec![Line::from(Span::styled(
                "No page loaded",
                Style::default().fg(Teletext::DIM),
            ))]
        };

        // Center the 40-column page horizontally
        let content_width = lines
            .iter()
            .map(|line| line.width() as u16)
            .max()
            .unwrap_or(0)
            .max(PAGE_COLUMNS)
            .min(area.width);
        let x = area.x + (area.width.saturating_sub(content_width)) / 2;

        // The screen ratio setting frames the page box to at least the
        // chosen proportions (a cell is roughly twice as tall as wide);
        // content is never clipped to it
        let frame_rows = match settings.screen_ratio.factor() {
            Some(factor) => (content_width as f32 / factor / 2.0).ceil() as u16,
            None => area.height,
        };
        let height = (lines.len() as u16)
            .max(frame_rows)
            .clamp(1, area.height);

        let page_area = Rect {
            x,
            y: area.y,
            width: content_width,
            height,
        };

        let paragraph = Paragraph::new(lines).style(Style::default().bg(Teletext::BG));
        frame.render_widget(paragraph, page_area);
    }
}

/// Split a content row into spans, optionally styling 3-digit page
/// tokens as links.
fn page_line(line: &str, highlight: bool) -> Line<'static> {
    if !highlight {
        return Line::from(Span::styled(
            line.to_string(),
            Style::default().fg(Teletext::FG),
        ));
    }

    let mut spans = Vec::new();
    let mut plain = String::new();

    for token in split_tokens(line) {
        if is_page_token(&token) {
            if !plain.is_empty() {
                spans.push(Span::styled(
                    std::mem::take(&mut plain),
                    Style::default().fg(Teletext::FG),
                ));
            }
            spans.push(Span::styled(
                token,
                Style::default()
                    .fg(Teletext::PAGE_LINK)
                    .add_modifier(Modifier::UNDERLINED),
            ));
        } else {
            plain.push_str(&token);
        }
    }
    if !plain.is_empty() {
        spans.push(Span::styled(plain, Style::default().fg(Teletext::FG)));
    }

    Line::from(spans)
}

/// Chunk a line into maximal digit runs and everything between them
fn split_tokens(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut current_is_digit = false;

    for c in line.chars() {
        let is_digit = c.is_ascii_digit();
        if !current.is_empty() && is_digit != current_is_digit {
            tokens.push(std::mem::take(&mut current));
        }
        current_is_digit = is_digit;
        current.push(c);
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

fn is_page_token(token: &str) -> bool {
    token.len() == 3
        && token.bytes().all(|b| b.is_ascii_digit())
        && token.width() == 3
        && tekstitv_core::PageId::parse(token).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_tokens_separates_digit_runs() {
        assert_eq!(
            split_tokens("Uutiset 101, saa 400"),
            vec!["Uutiset ", "101", ", saa ", "400"]
        );
    }

    #[test]
    fn test_page_tokens() {
        assert!(is_page_token("101"));
        assert!(!is_page_token("099"));
        assert!(!is_page_token("1234"));
        assert!(!is_page_token("10"));
    }

    #[test]
    fn test_highlighted_line_keeps_text_intact() {
        let line = page_line("Etusivu 100 -> 101", true);
        let flattened: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(flattened, "Etusivu 100 -> 101");
    }
}
