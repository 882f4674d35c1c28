use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use tekstitv_core::settings::FavoriteIcon;

use crate::app::App;
use crate::theme::Teletext;

pub struct LinksBarWidget;

impl LinksBarWidget {
    /// Render the link bar: a vertical column in the wide layout, a
    /// horizontal strip at the bottom otherwise. Favorites replace the
    /// generated list entirely and get their own title and icon.
    pub fn render(frame: &mut Frame, area: Rect, app: &App, vertical: bool) {
        let settings = app.settings();
        let links = app.link_targets();
        let has_favorites = !settings.favorites.is_empty();

        let title = if has_favorites {
            "Favorites"
        } else {
            "Page links"
        };

        let icon = match (has_favorites, settings.favorite_icon) {
            (true, FavoriteIcon::Heart) => "\u{2665} ",
            (true, FavoriteIcon::Star) => "\u{2605} ",
            _ => "",
        };

        let chip = |index: usize, page: &tekstitv_core::PageId| {
            // Alternate the two gradient endpoint colors of the original
            let bg = if index % 2 == 0 {
                Teletext::LINK_BG
            } else {
                Teletext::LINK_BG_ALT
            };
            Span::styled(
                format!(" {}{} ", icon, page),
                Style::default().fg(Teletext::LINK_FG).bg(bg),
            )
        };

        let mut lines = vec![Line::from(Span::styled(
            format!(" {} ", title),
            Style::default().fg(Teletext::DIM),
        ))];

        if vertical {
            for (i, link) in links.iter().enumerate() {
                lines.push(Line::from(chip(i, link)));
            }
        } else {
            let mut spans = Vec::new();
            for (i, link) in links.iter().enumerate() {
                spans.push(chip(i, link));
                spans.push(Span::raw(" "));
            }
            lines.push(Line::from(spans));
        }

        let paragraph = Paragraph::new(lines).style(Style::default().bg(Teletext::BG));
        frame.render_widget(paragraph, area);
    }
}
