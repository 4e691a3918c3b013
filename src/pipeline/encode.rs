//! PDF encoding: laid-out [`Page`]s → PDF bytes on any `io::Write`.
//!
//! The layout works top-down from the page's upper-left corner; PDF user
//! space starts bottom-left. Every y coordinate is flipped here and nowhere
//! else.
//!
//! Text uses the two standard-14 Helvetica faces with WinAnsiEncoding, so no
//! font program is embedded. Characters outside that code page print as `?`.

use crate::config::PageGeometry;
use crate::error::InvoiceError;
use crate::pipeline::metrics::{self, Font};
use crate::pipeline::session::{Color, DrawCommand, Page};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use std::io::Write;
use tracing::debug;

/// Bezier handle length for a quarter circle of radius 1.
const KAPPA: f32 = 0.552_284_8;

/// Document-level metadata written into the Info dictionary.
#[derive(Debug, Clone, Default)]
pub struct DocumentInfo {
    pub title: String,
}

/// Encode `pages` as a complete PDF into `out`.
///
/// The writer sees the document front to back in one pass; nothing is
/// buffered here beyond the lopdf object graph.
pub fn write_pdf<W: Write>(
    pages: &[Page],
    geometry: &PageGeometry,
    info: &DocumentInfo,
    compress: bool,
    out: &mut W,
) -> Result<(), InvoiceError> {
    let mut doc = build_document(pages, geometry, info)?;
    if compress {
        doc.compress();
    }
    doc.save_to(out)
        .map_err(|e| InvoiceError::Encode(e.to_string()))?;
    debug!("Encoded {} page(s)", pages.len());
    Ok(())
}

fn build_document(
    pages: &[Page],
    geometry: &PageGeometry,
    info: &DocumentInfo,
) -> Result<Document, InvoiceError> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let regular_id = doc.add_object(font_dict(Font::Helvetica));
    let bold_id = doc.add_object(font_dict(Font::HelveticaBold));
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            Font::Helvetica.resource_name() => regular_id,
            Font::HelveticaBold.resource_name() => bold_id,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len().max(1));
    let blank = [Page::default()];
    let pages = if pages.is_empty() { &blank[..] } else { pages };

    for page in pages {
        let content = Content {
            operations: page_operations(page, geometry.height),
        };
        let bytes = content
            .encode()
            .map_err(|e| InvoiceError::Encode(e.to_string()))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, bytes));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                geometry.width.into(),
                geometry.height.into(),
            ],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(win_ansi_bytes(&info.title)),
        "Producer" => Object::string_literal("invoice2pdf"),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);

    Ok(doc)
}

fn font_dict(font: Font) -> lopdf::Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => font.base_name(),
        "Encoding" => "WinAnsiEncoding",
    }
}

fn page_operations(page: &Page, page_height: f32) -> Vec<Operation> {
    let mut ops = Vec::new();
    for command in &page.commands {
        match command {
            DrawCommand::Box {
                x,
                y,
                width,
                height,
                radius,
                fill,
                stroke,
            } => {
                ops.push(Operation::new("q", vec![]));
                ops.push(color_op("rg", *fill));
                ops.push(color_op("RG", *stroke));
                let bottom = page_height - y - height;
                rounded_rect(&mut ops, *x, bottom, *width, *height, *radius);
                ops.push(Operation::new("B", vec![]));
                ops.push(Operation::new("Q", vec![]));
            }
            DrawCommand::Text {
                x,
                y,
                text,
                font,
                font_size,
                color,
            } => {
                let baseline = page_height - (y + metrics::ASCENT * font_size);
                ops.push(Operation::new("BT", vec![]));
                ops.push(color_op("rg", *color));
                ops.push(Operation::new(
                    "Tf",
                    vec![Object::Name(font.resource_name().as_bytes().to_vec()), (*font_size).into()],
                ));
                ops.push(Operation::new("Td", vec![(*x).into(), baseline.into()]));
                ops.push(Operation::new(
                    "Tj",
                    vec![Object::string_literal(win_ansi_bytes(text))],
                ));
                ops.push(Operation::new("ET", vec![]));
            }
            DrawCommand::Line {
                x1,
                x2,
                y,
                color,
                width,
            } => {
                let py = page_height - y;
                ops.push(Operation::new("q", vec![]));
                ops.push(color_op("RG", *color));
                ops.push(Operation::new("w", vec![(*width).into()]));
                ops.push(Operation::new("m", vec![(*x1).into(), py.into()]));
                ops.push(Operation::new("l", vec![(*x2).into(), py.into()]));
                ops.push(Operation::new("S", vec![]));
                ops.push(Operation::new("Q", vec![]));
            }
        }
    }
    ops
}

fn color_op(operator: &str, color: Color) -> Operation {
    Operation::new(
        operator,
        vec![color.r.into(), color.g.into(), color.b.into()],
    )
}

/// Path for a rectangle with corner radius `r`, `(x, y)` being the
/// bottom-left corner in PDF space.
fn rounded_rect(ops: &mut Vec<Operation>, x: f32, y: f32, w: f32, h: f32, r: f32) {
    let pt = |op: &str, coords: &[f32]| {
        Operation::new(op, coords.iter().map(|v| Object::from(*v)).collect())
    };
    if r <= 0.0 {
        ops.push(pt("re", &[x, y, w, h]));
        return;
    }
    let k = r * KAPPA;
    let (right, top) = (x + w, y + h);

    ops.push(pt("m", &[x + r, y]));
    ops.push(pt("l", &[right - r, y]));
    ops.push(pt("c", &[right - r + k, y, right, y + r - k, right, y + r]));
    ops.push(pt("l", &[right, top - r]));
    ops.push(pt("c", &[right, top - r + k, right - r + k, top, right - r, top]));
    ops.push(pt("l", &[x + r, top]));
    ops.push(pt("c", &[x + r - k, top, x, top - r + k, x, top - r]));
    ops.push(pt("l", &[x, y + r]));
    ops.push(pt("c", &[x, y + r - k, x + r - k, y, x + r, y]));
    ops.push(pt("h", &[]));
}

/// Map text onto the WinAnsi code page used by the standard fonts.
pub fn win_ansi_bytes(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            ' '..='~' => c as u8,
            '\u{A0}'..='\u{FF}' => c as u32 as u8,
            '€' => 0x80,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            _ => b'?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::session::{DocumentSession, TextStyle};

    fn sample_pages() -> Vec<Page> {
        let mut s = DocumentSession::new(&PageGeometry::a4());
        s.draw_box(40.0, 100.0, 520.0, 70.0, 10.0, Color::hex(0x5A189A), Color::hex(0xD9D9D9));
        s.draw_text("Hello world", 60.0, 120.0, TextStyle::new(12.0));
        s.draw_line(40.0, 550.0, 200.0, Color::hex(0xE5E7EB));
        s.new_page();
        s.draw_text("Second", 60.0, 60.0, TextStyle::new(12.0).bold());
        s.finish()
    }

    fn encode(pages: &[Page], compress: bool) -> Vec<u8> {
        let mut out = Vec::new();
        let info = DocumentInfo {
            title: "INV-1".into(),
        };
        write_pdf(pages, &PageGeometry::a4(), &info, compress, &mut out).unwrap();
        out
    }

    #[test]
    fn output_is_a_parseable_pdf() {
        let bytes = encode(&sample_pages(), true);
        assert!(bytes.starts_with(b"%PDF-"));
        let tail = String::from_utf8_lossy(&bytes[bytes.len().saturating_sub(16)..]).to_string();
        assert!(tail.contains("%%EOF"));

        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 2);
    }

    #[test]
    fn uncompressed_output_contains_text_and_fonts() {
        let bytes = encode(&sample_pages(), false);
        let raw = String::from_utf8_lossy(&bytes);
        assert!(raw.contains("Helvetica-Bold"));
        assert!(raw.contains("WinAnsiEncoding"));
        assert!(raw.contains("(Hello world)"));
        assert!(raw.contains("Second"));
    }

    #[test]
    fn empty_page_list_still_yields_one_page() {
        let bytes = encode(&[], true);
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn text_baseline_is_flipped() {
        let mut s = DocumentSession::new(&PageGeometry::a4());
        s.draw_text("x", 10.0, 100.0, TextStyle::new(10.0));
        let ops = page_operations(&s.finish()[0], 800.0);
        let td = ops.iter().find(|o| o.operator == "Td").unwrap();
        let y = td.operands[1].as_float().unwrap();
        assert!((y - (800.0 - 100.0 - 7.18)).abs() < 1e-3);
    }

    #[test]
    fn boxes_fill_and_stroke_in_one_operator() {
        let mut s = DocumentSession::new(&PageGeometry::a4());
        s.draw_box(0.0, 0.0, 100.0, 50.0, 10.0, Color::WHITE, Color::BLACK);
        let ops = page_operations(&s.finish()[0], 800.0);
        let names: Vec<&str> = ops.iter().map(|o| o.operator.as_str()).collect();
        assert_eq!(names.iter().filter(|n| **n == "c").count(), 4);
        assert!(names.contains(&"B"));
        assert!(!names.contains(&"f"));
    }

    #[test]
    fn win_ansi_mapping() {
        assert_eq!(win_ansi_bytes("Abc"), b"Abc".to_vec());
        assert_eq!(win_ansi_bytes("é"), vec![0xE9]);
        assert_eq!(win_ansi_bytes("€"), vec![0x80]);
        assert_eq!(win_ansi_bytes("₹5"), b"?5".to_vec());
    }
}
