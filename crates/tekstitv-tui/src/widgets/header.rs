use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use tekstitv_core::PageErrorKind;

use crate::app::App;
use crate::theme::Teletext;

pub struct HeaderWidget;

impl HeaderWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let state = app.nav_state();

        // Page indicator: a partial entry shows in place of the page
        // number with dashes for the missing digits
        let page_str = if app.entry_active() {
            format!("{:-<3}", app.entry)
        } else {
            state.page.to_string()
        };

        let sub_str = match state.response.as_ref().map(|r| r.sub_page_count) {
            Some(count) if count > 1 => format!(" {}/{}", state.sub_page, count),
            _ => String::new(),
        };

        let loading = if state.is_loading_content { " *" } else { "" };

        let mut spans = vec![
            Span::styled(
                " TEKSTI-TV ",
                Style::default()
                    .fg(Teletext::ACCENT)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(" P{}{}{} ", page_str, sub_str, loading),
                Style::default().fg(Teletext::FG),
            ),
        ];

        // Transient toast first, then a persistent line for blocking errors
        if let Some(ref notice) = app.notice {
            spans.push(Span::styled(
                format!("  {}", notice),
                Style::default().fg(Teletext::ACCENT),
            ));
        } else if let Some(ref error) = state.error {
            if error.kind != PageErrorKind::NotFound {
                spans.push(Span::styled(
                    format!("  {} (r to retry)", error),
                    Style::default().fg(Teletext::ERROR),
                ));
            }
        }

        let paragraph =
            Paragraph::new(Line::from(spans)).style(Style::default().bg(Teletext::HEADER_BG));
        frame.render_widget(paragraph, area);
    }
}
