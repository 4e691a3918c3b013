//! Text metrics for the two standard-14 fonts the invoice uses.
//!
//! Helvetica and Helvetica-Bold are guaranteed to exist in every PDF
//! viewer, so nothing is embedded and the advance widths below (from the
//! Adobe AFM files, in 1/1000 em) are all we need to centre and wrap text.
//! Characters outside printable ASCII fall back to the width of `n`.

/// Font faces available to the document session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Font {
    #[default]
    Helvetica,
    HelveticaBold,
}

impl Font {
    /// PostScript base-font name written into the font dictionary.
    pub fn base_name(self) -> &'static str {
        match self {
            Font::Helvetica => "Helvetica",
            Font::HelveticaBold => "Helvetica-Bold",
        }
    }

    /// Resource name used in content streams.
    pub fn resource_name(self) -> &'static str {
        match self {
            Font::Helvetica => "F1",
            Font::HelveticaBold => "F2",
        }
    }

    fn widths(self) -> &'static [u16; 95] {
        match self {
            Font::Helvetica => &HELVETICA_WIDTHS,
            Font::HelveticaBold => &HELVETICA_BOLD_WIDTHS,
        }
    }
}

/// Ascender height as a fraction of the font size.
pub const ASCENT: f32 = 0.718;

/// Ascender minus descender, without line gap.
pub const TEXT_HEIGHT: f32 = 0.925;

/// Baseline-to-baseline distance, including the font's line gap.
pub const LINE_HEIGHT: f32 = 1.156;

const FALLBACK_WIDTH: u16 = 556;

/// Width of `text` in points at `size`.
pub fn text_width(text: &str, font: Font, size: f32) -> f32 {
    let widths = font.widths();
    let units: u32 = text
        .chars()
        .map(|c| match c as u32 {
            code @ 32..=126 => u32::from(widths[(code - 32) as usize]),
            _ => u32::from(FALLBACK_WIDTH),
        })
        .sum();
    units as f32 * size / 1000.0
}

/// Distance the cursor moves for one line of text at `size`.
pub fn line_height(size: f32) -> f32 {
    size * LINE_HEIGHT
}

/// Greedy word wrap. Words wider than `max_width` are broken by character.
pub fn wrap_text(text: &str, font: Font, size: f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };
            if text_width(&candidate, font, size) <= max_width {
                current = candidate;
                continue;
            }
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if text_width(word, font, size) <= max_width {
                current = word.to_string();
            } else {
                let mut pieces = break_word(word, font, size, max_width);
                current = pieces.pop().unwrap_or_default();
                lines.extend(pieces);
            }
        }
        lines.push(current);
    }

    lines
}

fn break_word(word: &str, font: Font, size: f32, max_width: f32) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    for c in word.chars() {
        current.push(c);
        if current.chars().count() > 1 && text_width(&current, font, size) > max_width {
            current.pop();
            pieces.push(std::mem::take(&mut current));
            current.push(c);
        }
    }
    pieces.push(current);
    pieces
}

#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 0..?
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // @..O
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // P.._
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // `..o
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,      // p..~
];

#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_widths() {
        // "INVOICE" in Helvetica: I278 N722 V667 O778 I278 C722 E667 = 4112
        let w = text_width("INVOICE", Font::Helvetica, 10.0);
        assert!((w - 41.12).abs() < 1e-3, "got {w}");
        assert!(text_width("Total", Font::HelveticaBold, 12.0) > text_width("Total", Font::Helvetica, 12.0));
        assert_eq!(text_width("", Font::Helvetica, 12.0), 0.0);
    }

    #[test]
    fn non_ascii_uses_fallback() {
        let w = text_width("₹", Font::Helvetica, 1000.0);
        assert_eq!(w, f32::from(FALLBACK_WIDTH));
    }

    #[test]
    fn wrap_keeps_short_text_on_one_line() {
        assert_eq!(wrap_text("Silk Saree", Font::Helvetica, 12.0, 170.0), vec!["Silk Saree"]);
    }

    #[test]
    fn wrap_breaks_on_words() {
        let lines = wrap_text(
            "12 Temple Street, Palladam, Tamil Nadu - 641664",
            Font::Helvetica,
            11.0,
            120.0,
        );
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(text_width(line, Font::Helvetica, 11.0) <= 120.0, "too wide: {line}");
        }
        assert_eq!(lines.join(" "), "12 Temple Street, Palladam, Tamil Nadu - 641664");
    }

    #[test]
    fn wrap_breaks_oversized_words() {
        let word = "X".repeat(60);
        let lines = wrap_text(&word, Font::Helvetica, 12.0, 50.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), word);
    }

    #[test]
    fn wrap_empty_text_is_one_empty_line() {
        assert_eq!(wrap_text("", Font::Helvetica, 12.0, 100.0), vec![String::new()]);
    }
}
