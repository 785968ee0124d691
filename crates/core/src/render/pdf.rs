//! PDF serialization of print and multi-up page streams.
//!
//! Geometry stays in millimetres (Decimal) until an operand is emitted; only then is it
//! converted to points and handed to the object model as `f32`. PDF space has its origin at
//! the bottom-left, so every `y` is flipped against the page height.

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use tracing::debug;

use super::error::RenderError;
use super::mm_to_pt;
use super::print::{DrawInstruction, PrintStream};
use crate::layout::{CellRect, PageStream, RenderedUnit};

const REGULAR_FONT: &[u8] = b"F1";
const BOLD_FONT: &[u8] = b"F2";

fn name(value: &[u8]) -> Object {
    Object::Name(value.to_vec())
}

fn real(value: Decimal) -> Object {
    Object::Real(value.round_dp(3).to_f32().unwrap_or_default())
}

/// Helvetica uses WinAnsi; anything outside ASCII prints as `?`.
fn encode_text(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(c).ok().filter(u8::is_ascii).unwrap_or(b'?'))
        .collect()
}

/// Incrementally builds a document with a flat page tree.
struct PdfWriter {
    doc: Document,
    pages_id: ObjectId,
    page_ids: Vec<ObjectId>,
}

impl PdfWriter {
    fn new() -> Self {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        Self {
            doc,
            pages_id,
            page_ids: Vec::new(),
        }
    }

    fn add_font(&mut self, base_font: &[u8]) -> ObjectId {
        self.doc.add_object(Dictionary::from_iter(vec![
            ("Type", name(b"Font")),
            ("Subtype", name(b"Type1")),
            ("BaseFont", name(base_font)),
            ("Encoding", name(b"WinAnsiEncoding")),
        ]))
    }

    fn add_image(&mut self, unit: &RenderedUnit) -> ObjectId {
        let dict = Dictionary::from_iter(vec![
            ("Type", name(b"XObject")),
            ("Subtype", name(b"Image")),
            ("Width", Object::Integer(i64::from(unit.width_px()))),
            ("Height", Object::Integer(i64::from(unit.height_px()))),
            ("ColorSpace", name(b"DeviceRGB")),
            ("BitsPerComponent", Object::Integer(8)),
        ]);
        self.doc.add_object(Stream::new(dict, unit.pixels().to_vec()))
    }

    fn add_page(
        &mut self,
        width_mm: Decimal,
        height_mm: Decimal,
        operations: Vec<Operation>,
        resources: Dictionary,
    ) -> Result<(), RenderError> {
        let content = Content { operations }
            .encode()
            .map_err(|e| RenderError::Pdf(format!("content stream: {e}")))?;
        let content_id = self.doc.add_object(Stream::new(Dictionary::new(), content));

        let page = Dictionary::from_iter(vec![
            ("Type", name(b"Page")),
            ("Parent", Object::Reference(self.pages_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    real(mm_to_pt(width_mm)),
                    real(mm_to_pt(height_mm)),
                ]),
            ),
            ("Contents", Object::Reference(content_id)),
            ("Resources", Object::Dictionary(resources)),
        ]);
        let page_id = self.doc.add_object(page);
        self.page_ids.push(page_id);
        Ok(())
    }

    fn finish(mut self) -> Result<Vec<u8>, RenderError> {
        if self.page_ids.is_empty() {
            return Err(RenderError::Pdf("document has no pages".to_string()));
        }

        let count = i64::try_from(self.page_ids.len())
            .map_err(|_| RenderError::Pdf("too many pages".to_string()))?;
        let pages = Dictionary::from_iter(vec![
            ("Type", name(b"Pages")),
            ("Count", Object::Integer(count)),
            (
                "Kids",
                Object::Array(self.page_ids.iter().map(|id| Object::Reference(*id)).collect()),
            ),
        ]);
        self.doc.objects.insert(self.pages_id, Object::Dictionary(pages));

        let catalog = Dictionary::from_iter(vec![
            ("Type", name(b"Catalog")),
            ("Pages", Object::Reference(self.pages_id)),
        ]);
        let catalog_id = self.doc.add_object(catalog);
        self.doc.trailer.set("Root", Object::Reference(catalog_id));

        self.doc.compress();

        let mut buffer = Vec::new();
        self.doc
            .save_to(&mut buffer)
            .map_err(|e| RenderError::Pdf(format!("save failed: {e}")))?;
        Ok(buffer)
    }
}

fn draw_operations(instruction: &DrawInstruction, page_height: Decimal) -> Vec<Operation> {
    match instruction {
        DrawInstruction::Text {
            x,
            y,
            size_pt,
            bold,
            text,
        } => {
            let font = if *bold { BOLD_FONT } else { REGULAR_FONT };
            vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec![name(font), real(*size_pt)]),
                Operation::new(
                    "Td",
                    vec![real(mm_to_pt(*x)), real(mm_to_pt(page_height - *y))],
                ),
                Operation::new(
                    "Tj",
                    vec![Object::String(encode_text(text), StringFormat::Literal)],
                ),
                Operation::new("ET", vec![]),
            ]
        }
        DrawInstruction::Rule { x, y, width } => {
            let y = real(mm_to_pt(page_height - *y));
            vec![
                Operation::new("w", vec![real(Decimal::new(5, 1))]),
                Operation::new("m", vec![real(mm_to_pt(*x)), y.clone()]),
                Operation::new("l", vec![real(mm_to_pt(*x + *width)), y]),
                Operation::new("S", vec![]),
            ]
        }
    }
}

/// Serializes a print stream, one PDF page per physical page.
pub fn write_print_stream(stream: &PrintStream) -> Result<Vec<u8>, RenderError> {
    let mut writer = PdfWriter::new();
    let regular = writer.add_font(b"Helvetica");
    let bold = writer.add_font(b"Helvetica-Bold");
    let fonts = Dictionary::from_iter(vec![
        (REGULAR_FONT, Object::Reference(regular)),
        (BOLD_FONT, Object::Reference(bold)),
    ]);
    let resources = Dictionary::from_iter(vec![("Font", Object::Dictionary(fonts))]);

    for page in &stream.pages {
        let operations = page
            .instructions
            .iter()
            .flat_map(|i| draw_operations(i, stream.page_height))
            .collect();
        writer.add_page(
            stream.page_width,
            stream.page_height,
            operations,
            resources.clone(),
        )?;
    }

    debug!(pages = stream.page_count(), "serialized print stream");
    writer.finish()
}

/// Scales the unit to fit the cell, keeping its aspect ratio, and centres it.
fn place_image(
    image: &[u8],
    unit: &RenderedUnit,
    rect: &CellRect,
    page_height: Decimal,
) -> Vec<Operation> {
    let px_width = Decimal::from(unit.width_px());
    let px_height = Decimal::from(unit.height_px());
    let scale = (rect.width / px_width).min(rect.height / px_height);
    let width = px_width * scale;
    let height = px_height * scale;
    let left = rect.x + (rect.width - width) / Decimal::TWO;
    let top = rect.y + (rect.height - height) / Decimal::TWO;

    vec![
        Operation::new("q", vec![]),
        Operation::new(
            "cm",
            vec![
                real(mm_to_pt(width)),
                Object::Integer(0),
                Object::Integer(0),
                real(mm_to_pt(height)),
                real(mm_to_pt(left)),
                real(mm_to_pt(page_height - top - height)),
            ],
        ),
        Operation::new("Do", vec![name(image)]),
        Operation::new("Q", vec![]),
    ]
}

/// Serializes a multi-up page stream.
///
/// Each distinct raster is embedded once as an image XObject and referenced from every
/// cell that shows it, so a replicated snapshot costs one image however many cells it fills.
/// Blank cells draw nothing.
pub fn write_page_stream(stream: &PageStream) -> Result<Vec<u8>, RenderError> {
    let (width, height) = stream.target.page_size();
    let mut writer = PdfWriter::new();
    let mut images: Vec<(RenderedUnit, ObjectId)> = Vec::new();

    for page in &stream.pages {
        let mut operations = Vec::new();
        let mut xobjects = Dictionary::new();

        for placement in &page.placements {
            let Some(unit) = &placement.unit else {
                continue;
            };
            let index = if let Some(i) = images.iter().position(|(u, _)| u.shares_raster_with(unit)) {
                i
            } else {
                let id = writer.add_image(unit);
                images.push((unit.clone(), id));
                images.len() - 1
            };

            let image = format!("Im{index}");
            xobjects.set(image.clone(), Object::Reference(images[index].1));
            operations.extend(place_image(image.as_bytes(), unit, &placement.rect, height));
        }

        let resources = Dictionary::from_iter(vec![("XObject", Object::Dictionary(xobjects))]);
        writer.add_page(width, height, operations, resources)?;
    }

    debug!(
        pages = stream.page_count(),
        images = images.len(),
        layout = %stream.layout,
        "serialized page stream"
    );
    writer.finish()
}
