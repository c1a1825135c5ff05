// Paginated-document export
// A4 portrait, one titled table section; rows continue on new pages with a
// repeated header when they would cross the bottom margin.

use super::{ExportArtifact, ExportFormat, ExportReport, TABLE_HEADER};
use crate::application::constants::PDF_TITLE;
use crate::error::Result;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream, StringFormat};

const MM: f32 = 72.0 / 25.4;
const PAGE_WIDTH: f32 = 595.28;
const PAGE_HEIGHT: f32 = 841.89;

const MARGIN_X: f32 = 14.0 * MM;
const TITLE_BASELINE: f32 = 20.0 * MM; // from page top
const TABLE_TOP: f32 = 30.0 * MM; // first page, from page top
const CONTINUATION_TOP: f32 = 15.0 * MM;
const BOTTOM_MARGIN: f32 = 15.0 * MM;

const TABLE_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN_X;
const FIELD_COLUMN_WIDTH: f32 = 110.0;
const VALUE_COLUMN_WIDTH: f32 = TABLE_WIDTH - FIELD_COLUMN_WIDTH;

const TITLE_SIZE: f32 = 18.0;
const BODY_SIZE: f32 = 10.0;
const LINE_HEIGHT: f32 = 12.0;
const CELL_PADDING: f32 = 5.0;
const HEADER_HEIGHT: f32 = LINE_HEIGHT + 2.0 * CELL_PADDING;

// Wrapping is by character count against an average Helvetica glyph width
const AVG_GLYPH_WIDTH: f32 = 0.55 * BODY_SIZE;

const BLACK: [f32; 3] = [0.0, 0.0, 0.0];
const WHITE: [f32; 3] = [1.0, 1.0, 1.0];
const HEADER_FILL: [f32; 3] = [0.16, 0.5, 0.73];
const GRID: [f32; 3] = [0.78, 0.78, 0.78];

const REGULAR_FONT: &str = "F1";
const BOLD_FONT: &str = "F2";

/// Render the report as a PDF document
///
/// The document carries no creation date or file id, so identical reports
/// produce identical bytes.
pub fn render(report: &ExportReport) -> Result<ExportArtifact> {
    let field_chars = chars_per_line(FIELD_COLUMN_WIDTH);
    let value_chars = chars_per_line(VALUE_COLUMN_WIDTH);

    let mut layout = Layout::new();
    for (field, value) in report.rows() {
        layout.row(&wrap(field, field_chars), &wrap(&value, value_chars));
    }

    let bytes = assemble(layout.finish())?;
    Ok(ExportArtifact {
        format: ExportFormat::Pdf,
        bytes,
    })
}

fn chars_per_line(column_width: f32) -> usize {
    (((column_width - 2.0 * CELL_PADDING) / AVG_GLYPH_WIDTH).floor() as usize).max(1)
}

/// Greedy word wrap; words longer than a line are hard-split
fn wrap(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if current_len > 0 && current_len + 1 + word_len <= max_chars {
            current.push(' ');
            current.push_str(word);
            current_len += 1 + word_len;
            continue;
        }
        if current_len > 0 {
            lines.push(std::mem::take(&mut current));
        }

        if word_len <= max_chars {
            current.push_str(word);
            current_len = word_len;
        } else {
            let chars: Vec<char> = word.chars().collect();
            let mut chunks = chars.chunks(max_chars).peekable();
            while let Some(chunk) = chunks.next() {
                let piece: String = chunk.iter().collect();
                if chunks.peek().is_some() {
                    lines.push(piece);
                } else {
                    current_len = chunk.len();
                    current = piece;
                }
            }
        }
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Page-by-page content stream builder
struct Layout {
    pages: Vec<Vec<Operation>>,
    ops: Vec<Operation>,
    // Top edge of the next row, in PDF user space (origin bottom-left)
    cursor: f32,
    rows_on_page: usize,
}

impl Layout {
    fn new() -> Self {
        let mut layout = Self {
            pages: Vec::new(),
            ops: Vec::new(),
            cursor: PAGE_HEIGHT - TABLE_TOP,
            rows_on_page: 0,
        };
        layout.text(
            BOLD_FONT,
            TITLE_SIZE,
            MARGIN_X,
            PAGE_HEIGHT - TITLE_BASELINE,
            PDF_TITLE,
            BLACK,
        );
        layout.header();
        layout
    }

    fn finish(mut self) -> Vec<Vec<Operation>> {
        self.pages.push(self.ops);
        self.pages
    }

    fn new_page(&mut self) {
        self.pages.push(std::mem::take(&mut self.ops));
        self.cursor = PAGE_HEIGHT - CONTINUATION_TOP;
        self.rows_on_page = 0;
        self.header();
    }

    fn header(&mut self) {
        let top = self.cursor;
        self.fill_rect(MARGIN_X, top - HEADER_HEIGHT, TABLE_WIDTH, HEADER_HEIGHT, HEADER_FILL);
        let baseline = Self::baseline(top, 0);
        self.text(BOLD_FONT, BODY_SIZE, MARGIN_X + CELL_PADDING, baseline, TABLE_HEADER[0], WHITE);
        self.text(
            BOLD_FONT,
            BODY_SIZE,
            MARGIN_X + FIELD_COLUMN_WIDTH + CELL_PADDING,
            baseline,
            TABLE_HEADER[1],
            WHITE,
        );
        self.cursor -= HEADER_HEIGHT;
    }

    /// Whole lines that fit between the cursor and the bottom margin
    fn line_capacity(&self) -> usize {
        ((self.cursor - BOTTOM_MARGIN - 2.0 * CELL_PADDING) / LINE_HEIGHT)
            .floor()
            .max(0.0) as usize
    }

    fn fresh_page_capacity() -> usize {
        ((PAGE_HEIGHT - CONTINUATION_TOP - HEADER_HEIGHT - BOTTOM_MARGIN - 2.0 * CELL_PADDING)
            / LINE_HEIGHT)
            .floor() as usize
    }

    /// Place one table row, moving or splitting it across pages as needed
    fn row(&mut self, field: &[String], value: &[String]) {
        let mut field_lines = field;
        let mut value_lines = value;

        loop {
            let remaining = field_lines.len().max(value_lines.len());
            let capacity = self.line_capacity();

            if remaining <= capacity {
                self.segment(field_lines, value_lines);
                return;
            }
            // A row that fits on a fresh page is moved there whole
            if capacity == 0 || (self.rows_on_page > 0 && remaining <= Self::fresh_page_capacity()) {
                self.new_page();
                continue;
            }

            let (field_now, field_rest) = field_lines.split_at(capacity.min(field_lines.len()));
            let (value_now, value_rest) = value_lines.split_at(capacity.min(value_lines.len()));
            self.segment(field_now, value_now);
            field_lines = field_rest;
            value_lines = value_rest;
            self.new_page();
        }
    }

    fn segment(&mut self, field: &[String], value: &[String]) {
        let lines = field.len().max(value.len()).max(1);
        let height = lines as f32 * LINE_HEIGHT + 2.0 * CELL_PADDING;
        let top = self.cursor;

        self.stroke_rect(MARGIN_X, top - height, FIELD_COLUMN_WIDTH, height);
        self.stroke_rect(MARGIN_X + FIELD_COLUMN_WIDTH, top - height, VALUE_COLUMN_WIDTH, height);

        for (i, line) in field.iter().enumerate() {
            self.text(REGULAR_FONT, BODY_SIZE, MARGIN_X + CELL_PADDING, Self::baseline(top, i), line, BLACK);
        }
        for (i, line) in value.iter().enumerate() {
            self.text(
                REGULAR_FONT,
                BODY_SIZE,
                MARGIN_X + FIELD_COLUMN_WIDTH + CELL_PADDING,
                Self::baseline(top, i),
                line,
                BLACK,
            );
        }

        self.cursor -= height;
        self.rows_on_page += 1;
    }

    fn baseline(top: f32, line: usize) -> f32 {
        top - CELL_PADDING - LINE_HEIGHT * (line as f32 + 1.0) + 2.5
    }

    fn text(&mut self, font: &str, size: f32, x: f32, y: f32, text: &str, color: [f32; 3]) {
        self.ops.push(Operation::new("BT", vec![]));
        self.ops.push(Operation::new("rg", rgb(color)));
        self.ops.push(Operation::new(
            "Tf",
            vec![Object::Name(font.as_bytes().to_vec()), Object::Real(size)],
        ));
        self.ops.push(Operation::new("Td", vec![Object::Real(x), Object::Real(y)]));
        self.ops.push(Operation::new(
            "Tj",
            vec![Object::String(to_win_ansi(text), StringFormat::Literal)],
        ));
        self.ops.push(Operation::new("ET", vec![]));
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: [f32; 3]) {
        self.ops.push(Operation::new("rg", rgb(color)));
        self.ops.push(Operation::new("re", rect(x, y, width, height)));
        self.ops.push(Operation::new("f", vec![]));
    }

    fn stroke_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.ops.push(Operation::new("w", vec![Object::Real(0.5)]));
        self.ops.push(Operation::new("RG", rgb(GRID)));
        self.ops.push(Operation::new("re", rect(x, y, width, height)));
        self.ops.push(Operation::new("S", vec![]));
    }
}

fn rgb(color: [f32; 3]) -> Vec<Object> {
    color.iter().map(|c| Object::Real(*c)).collect()
}

fn rect(x: f32, y: f32, width: f32, height: f32) -> Vec<Object> {
    vec![
        Object::Real(x),
        Object::Real(y),
        Object::Real(width),
        Object::Real(height),
    ]
}

// Standard fonts only cover a single-byte encoding
fn to_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

fn assemble(pages: Vec<Vec<Operation>>) -> Result<Vec<u8>> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let bold_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            REGULAR_FONT => regular_id,
            BOLD_FONT => bold_id,
        },
    });

    let mut kids = Vec::with_capacity(pages.len());
    for operations in pages {
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    let pages_dict = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => count,
        "Resources" => resources_id,
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(PAGE_WIDTH),
            Object::Real(PAGE_HEIGHT),
        ],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}
