//! Output page rendering for card sheets

use crate::constants::{PLACEHOLDER_GRAY, PLACEHOLDER_LINE_WIDTH};
use crate::layout::{CardSlot, PageGeometry, Rect, SheetSide, fit_image, side_slots};
use crate::options::ImageFit;
use crate::types::{CardImagePair, ImageRef, Result};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::HashMap;

use super::image::EmbeddedImage;

/// An image embedded once in the output document
#[derive(Debug, Clone, PartialEq)]
pub struct CachedImage {
    /// Resource name used in content streams
    pub name: String,
    /// Object ID of the image XObject
    pub id: ObjectId,
    pub width: u32,
    pub height: u32,
}

/// Embedded images of one document, keyed by image ref.
///
/// Failures are remembered too, so a broken shared back is read once.
#[derive(Debug, Default)]
pub struct ImageCache {
    entries: HashMap<ImageRef, std::result::Result<CachedImage, String>>,
}

impl ImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Embed `image_ref` into `output` on first use and return its handle
    pub fn embed(
        &mut self,
        output: &mut Document,
        image_ref: &ImageRef,
    ) -> std::result::Result<CachedImage, String> {
        if let Some(entry) = self.entries.get(image_ref) {
            return entry.clone();
        }

        let entry = match EmbeddedImage::load(image_ref) {
            Ok(image) => {
                let id = output.add_object(image.to_pdf_stream());
                let name = format!("Im{}", self.entries.len());
                log::debug!(
                    "Embedded {} as /{} ({}x{} {}, {})",
                    image_ref,
                    name,
                    image.width,
                    image.height,
                    image.color_space,
                    image.filter
                );
                Ok(CachedImage {
                    name,
                    id,
                    width: image.width,
                    height: image.height,
                })
            }
            Err(e) => Err(e.to_string()),
        };

        self.entries.insert(image_ref.clone(), entry.clone());
        entry
    }

    /// Number of distinct images seen so far, failed ones included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// An image that could not be drawn; its cell holds a placeholder instead
#[derive(Debug, Clone, PartialEq)]
pub struct ImageFailure {
    pub side: SheetSide,
    /// Index of the card within its group
    pub card_index: usize,
    pub image: ImageRef,
    pub message: String,
}

/// Result of rendering one page
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub page_id: ObjectId,
    pub failures: Vec<ImageFailure>,
}

/// Everything a page needs besides the cards themselves
pub struct PageContext<'a> {
    pub geometry: &'a PageGeometry,
    pub image_fit: ImageFit,
    /// Crop mark operators, shared verbatim by every page
    pub marks_ops: &'a str,
    pub parent_pages_id: ObjectId,
}

/// Render one side of a group as a page of `output`.
///
/// Fronts are drawn row-major; backs land in the mirrored cells. Unreadable
/// images leave a placeholder outline so both sides keep the same slots.
pub fn render_card_page(
    output: &mut Document,
    images: &mut ImageCache,
    ctx: &PageContext<'_>,
    group: &[CardImagePair],
    side: SheetSide,
) -> Result<RenderedPage> {
    let geometry = ctx.geometry;

    // Create page dictionary
    let mut page_dict = Dictionary::new();
    page_dict.set("Type", Object::Name(b"Page".to_vec()));
    page_dict.set("Parent", Object::Reference(ctx.parent_pages_id));
    page_dict.set(
        "MediaBox",
        Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(geometry.page_width),
            Object::Real(geometry.page_height),
        ]),
    );

    let mut content_ops = Vec::new();
    let mut xobjects = Dictionary::new();
    let mut failures = Vec::new();

    for slot in side_slots(geometry, group.len(), side) {
        let card = &group[slot.card_index];
        let image_ref = match side {
            SheetSide::Front => &card.front,
            SheetSide::Back => &card.back,
        };

        match images.embed(output, image_ref) {
            Ok(image) => {
                content_ops.push(generate_image_command(&image, &slot, ctx.image_fit));
                xobjects.set(image.name.as_bytes(), Object::Reference(image.id));
            }
            Err(message) => {
                log::warn!(
                    "Placeholder for {:?} of card {} ({}): {}",
                    side,
                    slot.card_index,
                    image_ref,
                    message
                );
                content_ops.push(generate_placeholder(&slot.cell));
                failures.push(ImageFailure {
                    side,
                    card_index: slot.card_index,
                    image: image_ref.clone(),
                    message,
                });
            }
        }
    }

    content_ops.push(ctx.marks_ops.to_string());

    // Set up resources
    let mut resources = Dictionary::new();
    resources.set("XObject", Object::Dictionary(xobjects));

    // Create content stream
    let content = content_ops.join("");
    let content_id = output.add_object(Stream::new(Dictionary::new(), content.into_bytes()));

    page_dict.set("Contents", Object::Reference(content_id));
    page_dict.set("Resources", Object::Dictionary(resources));

    Ok(RenderedPage {
        page_id: output.add_object(page_dict),
        failures,
    })
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Generate the PDF content stream command to draw an image in its cell.
fn generate_image_command(image: &CachedImage, slot: &CardSlot, fit: ImageFit) -> String {
    let placement = fit_image(&slot.cell, image.width, image.height, fit);
    let draw = placement.draw;
    match placement.clip {
        Some(clip) => format!(
            "q {} {} {} {} re W n {} 0 0 {} {} {} cm /{} Do Q\n",
            clip.x, clip.y, clip.width, clip.height, draw.width, draw.height, draw.x, draw.y, image.name
        ),
        None => format!(
            "q {} 0 0 {} {} {} cm /{} Do Q\n",
            draw.width, draw.height, draw.x, draw.y, image.name
        ),
    }
}

/// Outline drawn in place of an image that could not be read
fn generate_placeholder(cell: &Rect) -> String {
    format!(
        "q {} {} {} RG {} w {} {} {} {} re S Q\n",
        PLACEHOLDER_GRAY,
        PLACEHOLDER_GRAY,
        PLACEHOLDER_GRAY,
        PLACEHOLDER_LINE_WIDTH,
        cell.x,
        cell.y,
        cell.width,
        cell.height
    )
}
