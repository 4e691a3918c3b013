//! Document session: the per-render drawing cursor and an ordered command log.
//!
//! Coordinates are top-down (y grows toward the bottom of the page), the way
//! the layout is described; the encoder flips them into PDF space. Every
//! primitive appends a [`DrawCommand`] to the current page in call order,
//! and that order is the paint order.
//!
//! The session owns its [`DocumentState`] outright. Two renders never share
//! a session, so concurrent renders cannot disturb each other's cursor.

use crate::config::PageGeometry;
use crate::pipeline::metrics::{self, Font};

/// An sRGB colour with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const BLACK: Color = Color::hex(0x000000);
    pub const WHITE: Color = Color::hex(0xFFFFFF);

    /// Build a colour from `0xRRGGBB`.
    pub const fn hex(rgb: u32) -> Self {
        Self {
            r: ((rgb >> 16) & 0xFF) as f32 / 255.0,
            g: ((rgb >> 8) & 0xFF) as f32 / 255.0,
            b: (rgb & 0xFF) as f32 / 255.0,
        }
    }
}

/// Horizontal alignment of a text block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// Styling for [`DocumentSession::draw_text`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub font: Font,
    pub font_size: f32,
    pub color: Color,
    pub align: Align,
    /// Wrap width. Text never wraps when this is `None`.
    pub max_width: Option<f32>,
}

impl TextStyle {
    pub fn new(font_size: f32) -> Self {
        Self {
            font: Font::Helvetica,
            font_size,
            color: Color::BLACK,
            align: Align::Left,
            max_width: None,
        }
    }

    pub fn bold(mut self) -> Self {
        self.font = Font::HelveticaBold;
        self
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub fn max_width(mut self, width: f32) -> Self {
        self.max_width = Some(width);
        self
    }
}

/// One recorded drawing operation, in page coordinates (top-down).
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Rounded rectangle, filled and then stroked.
    Box {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        radius: f32,
        fill: Color,
        stroke: Color,
    },
    /// A single line of text; `y` is the top of the line box.
    Text {
        x: f32,
        y: f32,
        text: String,
        font: Font,
        font_size: f32,
        color: Color,
    },
    /// Horizontal rule.
    Line {
        x1: f32,
        x2: f32,
        y: f32,
        color: Color,
        width: f32,
    },
}

/// The commands that make up one page, in paint order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub commands: Vec<DrawCommand>,
}

impl Page {
    /// Every text run on the page, in draw order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

/// Layout state for one render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DocumentState {
    pub cursor_y: f32,
    pub page_width: f32,
    pub page_height: f32,
    pub margin: f32,
}

impl DocumentState {
    pub fn new(geometry: &PageGeometry) -> Self {
        Self {
            cursor_y: geometry.margin,
            page_width: geometry.width,
            page_height: geometry.height,
            margin: geometry.margin,
        }
    }

    /// Width between the left and right margins.
    pub fn content_width(&self) -> f32 {
        self.page_width - 2.0 * self.margin
    }

    /// Lowest y content may reach on this page.
    pub fn bottom_limit(&self) -> f32 {
        self.page_height - self.margin
    }

    /// Whether a block of `height` fits below the cursor.
    pub fn fits(&self, height: f32) -> bool {
        self.cursor_y + height <= self.bottom_limit()
    }
}

/// Drawing surface for one render.
#[derive(Debug)]
pub struct DocumentSession {
    state: DocumentState,
    finished: Vec<Page>,
    current: Page,
}

impl DocumentSession {
    pub fn new(geometry: &PageGeometry) -> Self {
        Self {
            state: DocumentState::new(geometry),
            finished: Vec::new(),
            current: Page::default(),
        }
    }

    pub fn state(&self) -> &DocumentState {
        &self.state
    }

    pub fn cursor(&self) -> f32 {
        self.state.cursor_y
    }

    /// Move the cursor down. Negative deltas are ignored; use
    /// [`set_cursor`](Self::set_cursor) to reposition explicitly.
    pub fn advance_cursor(&mut self, delta: f32) {
        self.state.cursor_y += delta.max(0.0);
    }

    /// Place the cursor at an absolute y.
    pub fn set_cursor(&mut self, y: f32) {
        self.state.cursor_y = y;
    }

    /// Advance by `lines` text lines at `font_size`.
    pub fn move_down(&mut self, lines: f32, font_size: f32) {
        self.advance_cursor(lines * metrics::line_height(font_size));
    }

    /// Rounded rectangle, filled then stroked.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_box(
        &mut self,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        radius: f32,
        fill: Color,
        stroke: Color,
    ) {
        self.current.commands.push(DrawCommand::Box {
            x,
            y,
            width,
            height,
            radius: radius.clamp(0.0, width.min(height) / 2.0),
            fill,
            stroke,
        });
    }

    /// Place text with its top-left (or aligned) corner at `(x, y)`.
    ///
    /// The cursor does not move. Returns the height of the text block.
    pub fn draw_text(&mut self, content: &str, x: f32, y: f32, style: TextStyle) -> f32 {
        let lines = match style.max_width {
            Some(width) => metrics::wrap_text(content, style.font, style.font_size, width),
            None => vec![content.to_string()],
        };
        let box_width = style.max_width.unwrap_or(self.state.page_width - self.state.margin - x);
        let step = metrics::line_height(style.font_size);

        for (i, line) in lines.iter().enumerate() {
            if line.is_empty() {
                continue;
            }
            let line_width = metrics::text_width(line, style.font, style.font_size);
            let line_x = match style.align {
                Align::Left => x,
                Align::Center => x + (box_width - line_width) / 2.0,
                Align::Right => x + box_width - line_width,
            };
            self.current.commands.push(DrawCommand::Text {
                x: line_x,
                y: y + i as f32 * step,
                text: line.clone(),
                font: style.font,
                font_size: style.font_size,
                color: style.color,
            });
        }

        lines.len() as f32 * step
    }

    /// Text at the cursor, spanning the content width, advancing the cursor
    /// past it.
    pub fn draw_text_flow(&mut self, content: &str, style: TextStyle) -> f32 {
        let style = TextStyle {
            max_width: Some(style.max_width.unwrap_or(self.state.content_width())),
            ..style
        };
        let (x, y) = (self.state.margin, self.state.cursor_y);
        let height = self.draw_text(content, x, y, style);
        self.advance_cursor(height);
        height
    }

    /// Horizontal separator at `y`.
    pub fn draw_line(&mut self, x1: f32, x2: f32, y: f32, color: Color) {
        self.current.commands.push(DrawCommand::Line {
            x1,
            x2,
            y,
            color,
            width: 1.0,
        });
    }

    /// Close the current page and continue at the top margin of a new one.
    pub fn new_page(&mut self) {
        self.finished.push(std::mem::take(&mut self.current));
        self.state.cursor_y = self.state.margin;
    }

    /// Pages started so far, including the one being drawn.
    pub fn page_count(&self) -> usize {
        self.finished.len() + 1
    }

    /// Commands recorded on the page currently being drawn.
    pub fn current_page(&self) -> &Page {
        &self.current
    }

    pub fn finish(mut self) -> Vec<Page> {
        self.finished.push(self.current);
        self.finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> DocumentSession {
        DocumentSession::new(&PageGeometry::a4())
    }

    #[test]
    fn cursor_starts_at_margin_and_only_moves_down() {
        let mut s = session();
        assert_eq!(s.cursor(), 45.0);
        s.advance_cursor(10.0);
        s.advance_cursor(-50.0);
        assert_eq!(s.cursor(), 55.0);
        s.set_cursor(20.0);
        assert_eq!(s.cursor(), 20.0);
    }

    #[test]
    fn draw_text_does_not_move_cursor() {
        let mut s = session();
        let h = s.draw_text("INVOICE", 60.0, 100.0, TextStyle::new(22.0));
        assert!(h > 22.0);
        assert_eq!(s.cursor(), 45.0);
        assert_eq!(s.current_page().texts().collect::<Vec<_>>(), vec!["INVOICE"]);
    }

    #[test]
    fn flow_text_advances_cursor() {
        let mut s = session();
        let h = s.draw_text_flow("Thank you!", TextStyle::new(10.0).align(Align::Center));
        assert_eq!(s.cursor(), 45.0 + h);
        match &s.current_page().commands[0] {
            DrawCommand::Text { x, .. } => assert!(*x > 45.0, "centred text should be indented"),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn wrapped_text_emits_one_command_per_line() {
        let mut s = session();
        let style = TextStyle::new(11.0).max_width(60.0);
        let h = s.draw_text("Temple Street Palladam Tamil Nadu", 320.0, 200.0, style);
        let texts: Vec<_> = s.current_page().texts().collect();
        assert!(texts.len() > 1);
        assert!((h - texts.len() as f32 * metrics::line_height(11.0)).abs() < 1e-4);
    }

    #[test]
    fn commands_keep_call_order() {
        let mut s = session();
        s.draw_box(40.0, 100.0, 520.0, 70.0, 10.0, Color::hex(0x5A189A), Color::hex(0xD9D9D9));
        s.draw_text("INVOICE", 60.0, 130.0, TextStyle::new(22.0).color(Color::WHITE));
        s.draw_line(40.0, 550.0, 180.0, Color::hex(0xE5E7EB));
        let cmds = &s.current_page().commands;
        assert!(matches!(cmds[0], DrawCommand::Box { .. }));
        assert!(matches!(cmds[1], DrawCommand::Text { .. }));
        assert!(matches!(cmds[2], DrawCommand::Line { .. }));
    }

    #[test]
    fn corner_radius_is_clamped() {
        let mut s = session();
        s.draw_box(0.0, 0.0, 10.0, 8.0, 50.0, Color::WHITE, Color::BLACK);
        match s.current_page().commands[0] {
            DrawCommand::Box { radius, .. } => assert_eq!(radius, 4.0),
            _ => unreachable!(),
        }
    }

    #[test]
    fn new_page_resets_cursor_and_splits_commands() {
        let mut s = session();
        s.draw_text("one", 60.0, 60.0, TextStyle::new(12.0));
        s.advance_cursor(500.0);
        s.new_page();
        assert_eq!(s.cursor(), 45.0);
        assert_eq!(s.page_count(), 2);
        s.draw_text("two", 60.0, 60.0, TextStyle::new(12.0));
        let pages = s.finish();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].texts().collect::<Vec<_>>(), vec!["one"]);
        assert_eq!(pages[1].texts().collect::<Vec<_>>(), vec!["two"]);
    }

    #[test]
    fn fits_respects_bottom_margin() {
        let mut s = session();
        s.set_cursor(700.0);
        assert!(s.state().fits(96.0));
        assert!(!s.state().fits(97.0));
    }

    #[test]
    fn hex_colour_components() {
        let c = Color::hex(0xFF8000);
        assert_eq!(c.r, 1.0);
        assert!((c.g - 128.0 / 255.0).abs() < 1e-6);
        assert_eq!(c.b, 0.0);
    }
}
