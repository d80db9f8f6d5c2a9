//! Card sheet assembly
//!
//! This module orchestrates a document build:
//! 1. Compute the page geometry once from the options
//! 2. Split the cards into page groups
//! 3. Render each group as a front page followed by its mirrored back page
//! 4. Seal the document into PDF bytes

mod io;

pub use io::{generate_pdf, generate_pdf_with_observer, write_pdf_atomic};

use crate::layout::{PageGeometry, SheetSide, compute_geometry, group_cards};
use crate::marks::{generate_crop_marks, marks_within_page};
use crate::options::{ImageFit, SheetOptions};
use crate::render::{ImageCache, ImageFailure, PageContext, render_card_page};
use crate::types::*;
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::io::Write;

/// Notification sent after a page has been written
#[derive(Debug, Clone, PartialEq)]
pub struct PageEvent {
    /// Zero-based index of the page in the output document
    pub page_index: usize,
    /// Zero-based index of the group (physical sheet) the page belongs to
    pub group_index: usize,
    pub side: SheetSide,
    /// Number of cards drawn on the page
    pub cards: usize,
}

/// Receives progress from a [`SheetDocument`].
///
/// Any `FnMut(&PageEvent)` closure is an observer.
pub trait SheetObserver {
    /// Called once for every page, after it has been added to the document
    fn page_sealed(&mut self, event: &PageEvent);

    /// Called for every image that was replaced by a placeholder
    fn image_failed(&mut self, _failure: &ImageFailure) {}
}

impl<F> SheetObserver for F
where
    F: FnMut(&PageEvent),
{
    fn page_sealed(&mut self, event: &PageEvent) {
        self(event)
    }
}

/// Observer that ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl SheetObserver for NoopObserver {
    fn page_sealed(&mut self, _event: &PageEvent) {}
}

/// Lifecycle of a [`SheetDocument`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentState {
    /// No group emitted yet
    Empty,
    /// The group with this index was the last one emitted
    Emitting { group_index: usize },
    /// Written out; no further changes allowed
    Sealed,
}

/// A card sheet PDF under construction.
///
/// Groups are emitted one at a time, each producing a front page and then
/// its back page. [`SheetDocument::seal`] writes the page tree and returns
/// the PDF bytes; a sealed document rejects any further use.
pub struct SheetDocument<'a> {
    geometry: PageGeometry,
    image_fit: ImageFit,
    marks_ops: String,
    output: Document,
    pages_id: ObjectId,
    page_ids: Vec<ObjectId>,
    images: ImageCache,
    state: DocumentState,
    observer: Box<dyn SheetObserver + 'a>,
}

impl<'a> SheetDocument<'a> {
    /// Start a document. Fails with [`SheetError::Config`] if the options
    /// produce no usable geometry.
    pub fn new(options: &SheetOptions) -> Result<Self> {
        let geometry = compute_geometry(options)?;

        if !marks_within_page(&geometry, &options.crop_marks) {
            log::warn!(
                "Crop marks extend past the page edge ({:.2}pt margin); they will be cut off",
                geometry.margin
            );
        }

        let mut output = Document::with_version("1.7");
        let pages_id = output.new_object_id();

        Ok(Self {
            geometry,
            image_fit: options.image_fit,
            marks_ops: generate_crop_marks(&geometry, &options.crop_marks),
            output,
            pages_id,
            page_ids: Vec::new(),
            images: ImageCache::new(),
            state: DocumentState::Empty,
            observer: Box::new(NoopObserver),
        })
    }

    /// Report progress to `observer`
    pub fn with_observer(mut self, observer: impl SheetObserver + 'a) -> Self {
        self.observer = Box::new(observer);
        self
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    pub fn state(&self) -> DocumentState {
        self.state
    }

    /// Pages written so far
    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    /// Render one group as a front page and its back page.
    ///
    /// The group must hold between one and `capacity` cards.
    pub fn emit_group(&mut self, group: &[CardImagePair]) -> Result<()> {
        let group_index = match self.state {
            DocumentState::Sealed => {
                return Err(SheetError::IllegalState(
                    "cannot emit a group into a sealed document".to_string(),
                ));
            }
            DocumentState::Empty => 0,
            DocumentState::Emitting { group_index } => group_index + 1,
        };

        let capacity = self.geometry.capacity();
        if group.is_empty() || group.len() > capacity {
            return Err(SheetError::Config(format!(
                "A group must hold 1 to {} cards, got {}",
                capacity,
                group.len()
            )));
        }

        for side in [SheetSide::Front, SheetSide::Back] {
            self.emit_page(group, group_index, side)?;
        }

        self.state = DocumentState::Emitting { group_index };
        Ok(())
    }

    fn emit_page(
        &mut self,
        group: &[CardImagePair],
        group_index: usize,
        side: SheetSide,
    ) -> Result<()> {
        let ctx = PageContext {
            geometry: &self.geometry,
            image_fit: self.image_fit,
            marks_ops: &self.marks_ops,
            parent_pages_id: self.pages_id,
        };
        let page = render_card_page(&mut self.output, &mut self.images, &ctx, group, side)?;

        let event = PageEvent {
            page_index: self.page_ids.len(),
            group_index,
            side,
            cards: group.len(),
        };
        self.page_ids.push(page.page_id);

        log::debug!(
            "Page {}: {:?} of sheet {} with {} cards",
            event.page_index + 1,
            side,
            group_index + 1,
            group.len()
        );

        for failure in &page.failures {
            self.observer.image_failed(failure);
        }
        self.observer.page_sealed(&event);
        Ok(())
    }

    /// Write the page tree and catalog and return the finished PDF.
    ///
    /// A document with no groups seals into a valid zero-page PDF.
    pub fn seal(&mut self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        self.seal_to(&mut bytes)?;
        log::debug!("Card sheet PDF is {} bytes", bytes.len());
        Ok(bytes)
    }

    /// Write the finished PDF into `target`.
    ///
    /// The pages are handed to the writer, so the document counts as sealed
    /// even when the write fails.
    pub fn seal_to<W: Write>(&mut self, target: &mut W) -> Result<()> {
        if self.state == DocumentState::Sealed {
            return Err(SheetError::IllegalState(
                "document is already sealed".to_string(),
            ));
        }

        let mut output = std::mem::replace(&mut self.output, Document::with_version("1.7"));
        self.state = DocumentState::Sealed;

        // Create pages tree
        let kids: Vec<Object> = self
            .page_ids
            .iter()
            .map(|&id| Object::Reference(id))
            .collect();
        let pages_dict = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Kids", Object::Array(kids)),
            ("Count", Object::Integer(self.page_ids.len() as i64)),
        ]);
        output
            .objects
            .insert(self.pages_id, Object::Dictionary(pages_dict));

        // Create catalog
        let catalog_id = output.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(self.pages_id)),
        ]));
        output.trailer.set("Root", catalog_id);

        output.save_to(target)?;

        log::info!(
            "Sealed card sheet: {} pages, {} distinct images",
            self.page_ids.len(),
            self.images.len()
        );

        Ok(())
    }
}

/// Build the whole card sheet PDF in memory.
///
/// Cards fill the pages in order; zero cards produce a zero-page document.
pub fn build_document(
    cards: &[CardImagePair],
    options: &SheetOptions,
    observer: impl SheetObserver,
) -> Result<Vec<u8>> {
    let mut document = SheetDocument::new(options)?.with_observer(observer);
    let capacity = document.geometry().capacity();

    log::info!("Laying out {} cards, {} per page", cards.len(), capacity);

    for group in group_cards(cards, capacity) {
        document.emit_group(group)?;
    }

    document.seal()
}
