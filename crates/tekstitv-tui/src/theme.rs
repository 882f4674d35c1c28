use ratatui::style::Color;

/// Fixed teletext palette: black screen, light text, the blue/violet
/// link chips of the original app.
pub struct Teletext;

impl Teletext {
    pub const BG: Color = Color::Rgb(0x00, 0x00, 0x00);
    pub const HEADER_BG: Color = Color::Rgb(0x1c, 0x1c, 0x1c);
    pub const FG: Color = Color::Rgb(0xee, 0xee, 0xee);
    pub const DIM: Color = Color::Rgb(0x9e, 0x9e, 0x9e);
    /// Link chip gradient endpoints, used flat here
    pub const LINK_BG: Color = Color::Rgb(0x2b, 0x58, 0x76);
    pub const LINK_BG_ALT: Color = Color::Rgb(0x4e, 0x43, 0x76);
    pub const LINK_FG: Color = Color::Rgb(0xff, 0xff, 0xff);
    /// In-page highlighted link tokens
    pub const PAGE_LINK: Color = Color::Rgb(0x6c, 0xb6, 0xff);
    pub const ACCENT: Color = Color::Rgb(0x00, 0xd7, 0xd7);
    pub const ERROR: Color = Color::Rgb(0xe0, 0x4a, 0x3a);
}
