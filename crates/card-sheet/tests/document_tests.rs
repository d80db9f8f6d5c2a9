use card_sheet::layout::{GridPosition, PageGeometry};
use card_sheet::marks::generate_crop_marks;
use card_sheet::*;
use image::{DynamicImage, ImageFormat, RgbImage};
use lopdf::content::Content;
use lopdf::{Document, ObjectId};
use std::io::Cursor;

const EPS: f32 = 0.01;

/// PNG whose pixel size encodes `id`: (id*5) x (id*7), the card aspect ratio
fn png(id: u32) -> Vec<u8> {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(RgbImage::new(id * 5, id * 7))
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

/// Card k has front id 100+k and back id k
fn unique_cards(count: u32) -> Vec<CardImagePair> {
    (1..=count)
        .map(|k| {
            CardImagePair::new(
                ImageRef::memory(format!("front{}", k), png(100 + k)),
                ImageRef::memory(format!("back{}", k), png(k)),
            )
        })
        .collect()
}

fn shared_back_cards(count: u32) -> Vec<CardImagePair> {
    let back = ImageRef::memory("back", png(1));
    (1..=count)
        .map(|k| {
            let front = ImageRef::memory(format!("front{}", k), png(100 + k));
            CardImagePair::new(front, back.clone())
        })
        .collect()
}

fn page_ids(doc: &Document) -> Vec<ObjectId> {
    doc.get_pages().values().copied().collect()
}

/// Image id and cell of every image drawn on a page, in drawing order
fn placed_images(
    doc: &Document,
    page_id: ObjectId,
    geometry: &PageGeometry,
) -> Vec<(u32, GridPosition)> {
    let page = doc.get_object(page_id).unwrap().as_dict().unwrap();
    let resources = page.get(b"Resources").unwrap().as_dict().unwrap();
    let xobjects = resources.get(b"XObject").unwrap().as_dict().unwrap();

    let content = Content::decode(&doc.get_page_content(page_id).unwrap()).unwrap();
    let mut origin = (0.0, 0.0);
    let mut placed = Vec::new();

    for op in content.operations {
        match op.operator.as_str() {
            "cm" => {
                origin = (
                    op.operands[4].as_float().unwrap(),
                    op.operands[5].as_float().unwrap(),
                );
            }
            "Do" => {
                let name = op.operands[0].as_name().unwrap();
                let id = xobjects.get(name).unwrap().as_reference().unwrap();
                let stream = doc.get_object(id).unwrap().as_stream().unwrap();
                let width = stream.dict.get(b"Width").unwrap().as_i64().unwrap() as u32;
                placed.push((width / 5, cell_at(geometry, origin.0, origin.1)));
            }
            _ => {}
        }
    }

    placed
}

fn cell_at(geometry: &PageGeometry, x: f32, y: f32) -> GridPosition {
    for row in 0..geometry.rows {
        for col in 0..geometry.columns {
            let pos = GridPosition::new(row, col);
            let cell = geometry.cell_rect(pos);
            if (cell.x - x).abs() < EPS && (cell.y - y).abs() < EPS {
                return pos;
            }
        }
    }
    panic!("No cell at ({}, {})", x, y);
}

fn page_text(doc: &Document, page_id: ObjectId) -> String {
    String::from_utf8(doc.get_page_content(page_id).unwrap()).unwrap()
}

#[test]
fn test_ten_cards_make_four_pages() {
    let options = SheetOptions::default();
    let geometry = compute_geometry(&options).unwrap();
    let bytes = build_document(&unique_cards(10), &options, NoopObserver).unwrap();

    let doc = Document::load_mem(&bytes).unwrap();
    let pages = page_ids(&doc);
    assert_eq!(pages.len(), 4);

    // Front of sheet 1: cards 1-9 row-major
    let front = placed_images(&doc, pages[0], &geometry);
    let expected: Vec<(u32, GridPosition)> = (1..=9)
        .map(|k| (100 + k, GridPosition::new((k as usize - 1) / 3, (k as usize - 1) % 3)))
        .collect();
    assert_eq!(front, expected);

    // Back of sheet 1: each row mirrored, so the top row reads 3, 2, 1
    let back = placed_images(&doc, pages[1], &geometry);
    let mut top_row: Vec<(usize, u32)> = back
        .iter()
        .filter(|(_, pos)| pos.row == 0)
        .map(|&(id, pos)| (pos.col, id))
        .collect();
    top_row.sort();
    assert_eq!(top_row, vec![(0, 3), (1, 2), (2, 1)]);

    // Sheet 2 holds card 10 alone, its back in the mirrored top-right cell
    assert_eq!(
        placed_images(&doc, pages[2], &geometry),
        vec![(110, GridPosition::new(0, 0))]
    );
    assert_eq!(
        placed_images(&doc, pages[3], &geometry),
        vec![(10, GridPosition::new(0, 2))]
    );
}

#[test]
fn test_zero_cards_make_empty_document() {
    let mut pages = 0;
    let bytes = build_document(&[], &SheetOptions::default(), |_: &PageEvent| pages += 1).unwrap();

    let doc = Document::load_mem(&bytes).unwrap();
    assert!(doc.get_pages().is_empty());
    assert_eq!(pages, 0);
}

#[test]
fn test_backs_align_with_fronts() {
    let options = SheetOptions {
        paper_size: PaperSize::Letter,
        grid: GridPolicy::FitToPage { min_margin_mm: 5.0 },
        ..Default::default()
    };
    let geometry = compute_geometry(&options).unwrap();
    let bytes = build_document(&unique_cards(11), &options, NoopObserver).unwrap();
    let doc = Document::load_mem(&bytes).unwrap();
    let pages = page_ids(&doc);
    assert_eq!(pages.len(), 4);

    for sheet in pages.chunks(2) {
        let fronts = placed_images(&doc, sheet[0], &geometry);
        let backs = placed_images(&doc, sheet[1], &geometry);
        assert_eq!(fronts.len(), backs.len());

        for (front_id, front_pos) in &fronts {
            let card = front_id - 100;
            let (_, back_pos) = backs.iter().find(|(id, _)| *id == card).unwrap();

            assert_eq!(back_pos.row, front_pos.row);
            assert_eq!(back_pos.col, geometry.columns - 1 - front_pos.col);

            // Flipped about the vertical centerline the back lands on the front
            let front_cell = geometry.cell_rect(*front_pos);
            let back_cell = geometry.cell_rect(*back_pos);
            let flipped_x = geometry.page_width - back_cell.right();
            assert!((flipped_x - front_cell.x).abs() < EPS);
            assert!((back_cell.y - front_cell.y).abs() < EPS);
        }
    }
}

#[test]
fn test_crop_marks_match_on_both_sides() {
    let options = SheetOptions::default();
    let geometry = compute_geometry(&options).unwrap();
    let marks = generate_crop_marks(&geometry, &options.crop_marks);
    assert!(!marks.is_empty());

    let bytes = build_document(&unique_cards(10), &options, NoopObserver).unwrap();
    let doc = Document::load_mem(&bytes).unwrap();

    for page_id in page_ids(&doc) {
        assert!(page_text(&doc, page_id).ends_with(&marks));
    }
}

#[test]
fn test_crop_marks_can_be_disabled() {
    let mut options = SheetOptions::default();
    options.crop_marks.enabled = false;

    let bytes = build_document(&unique_cards(2), &options, NoopObserver).unwrap();
    let doc = Document::load_mem(&bytes).unwrap();

    for page_id in page_ids(&doc) {
        assert!(!page_text(&doc, page_id).contains(" l S"));
    }
}

#[test]
fn test_output_is_deterministic() {
    let cards = unique_cards(12);
    let options = SheetOptions::default();

    let first = build_document(&cards, &options, NoopObserver).unwrap();
    let second = build_document(&cards, &options, NoopObserver).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_shared_back_is_embedded_once() {
    let cards = shared_back_cards(10);
    let bytes = build_document(&cards, &SheetOptions::default(), NoopObserver).unwrap();
    let doc = Document::load_mem(&bytes).unwrap();

    let images = doc
        .objects
        .values()
        .filter_map(|o| o.as_stream().ok())
        .filter(|s| {
            s.dict
                .get(b"Subtype")
                .and_then(|t| t.as_name())
                .map(|n| n == b"Image")
                .unwrap_or(false)
        })
        .count();
    assert_eq!(images, 11);
}

struct FailureLog<'a>(&'a mut Vec<ImageFailure>);

impl SheetObserver for FailureLog<'_> {
    fn page_sealed(&mut self, _event: &PageEvent) {}

    fn image_failed(&mut self, failure: &ImageFailure) {
        self.0.push(failure.clone());
    }
}

#[test]
fn test_missing_image_keeps_its_slot() {
    let options = SheetOptions::default();
    let geometry = compute_geometry(&options).unwrap();
    let mut cards = unique_cards(9);
    cards[1].front = ImageRef::path("/nonexistent/card.png");

    let mut failures = Vec::new();
    let bytes = build_document(&cards, &options, FailureLog(&mut failures)).unwrap();
    let doc = Document::load_mem(&bytes).unwrap();
    let pages = page_ids(&doc);

    // Card 3 still sits in the third cell, not the second
    let front = placed_images(&doc, pages[0], &geometry);
    assert_eq!(front.len(), 8);
    assert!(front.contains(&(103, GridPosition::new(0, 2))));
    let cell = geometry.cell_rect(GridPosition::new(0, 1));
    let outline = format!("{} {} {} {} re S", cell.x, cell.y, cell.width, cell.height);
    assert!(page_text(&doc, pages[0]).contains(&outline));

    // The back side is unaffected
    assert_eq!(placed_images(&doc, pages[1], &geometry).len(), 9);

    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].side, SheetSide::Front);
    assert_eq!(failures[0].card_index, 1);
}

/// JPEG that keeps its frame header but loses everything after it
fn damaged_jpeg() -> Vec<u8> {
    let mut jpeg = Vec::new();
    DynamicImage::ImageRgb8(RgbImage::new(50, 70))
        .write_to(&mut Cursor::new(&mut jpeg), ImageFormat::Jpeg)
        .unwrap();

    let sof = jpeg.windows(2).position(|w| w == [0xFF, 0xC0]).unwrap();
    let end = sof + 2 + u16::from_be_bytes([jpeg[sof + 2], jpeg[sof + 3]]) as usize;
    let len = jpeg.len();
    jpeg[end..].fill(0);
    jpeg.truncate(len / 2 + end);
    jpeg
}

#[test]
fn test_damaged_jpeg_gets_placeholder() {
    let options = SheetOptions::default();
    let geometry = compute_geometry(&options).unwrap();
    let mut cards = unique_cards(3);
    cards[0].back = ImageRef::memory("damaged.jpg", damaged_jpeg());

    let mut failures = Vec::new();
    let bytes = build_document(&cards, &options, FailureLog(&mut failures)).unwrap();
    let doc = Document::load_mem(&bytes).unwrap();
    let pages = page_ids(&doc);

    // Card 1's back is mirrored into the top-right cell and drawn as an outline
    let back = placed_images(&doc, pages[1], &geometry);
    assert_eq!(back.len(), 2);
    assert!(!back.iter().any(|&(id, _)| id == 1));
    let cell = geometry.cell_rect(GridPosition::new(0, 2));
    let outline = format!("{} {} {} {} re S", cell.x, cell.y, cell.width, cell.height);
    assert!(page_text(&doc, pages[1]).contains(&outline));

    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].side, SheetSide::Back);
    assert_eq!(failures[0].card_index, 0);
    assert_eq!(failures[0].image, cards[0].back);
}

#[test]
fn test_sealed_document_cannot_be_reused() {
    let cards = unique_cards(3);
    let mut document = SheetDocument::new(&SheetOptions::default()).unwrap();
    document.emit_group(&cards).unwrap();
    document.seal().unwrap();

    assert!(matches!(
        document.emit_group(&cards),
        Err(SheetError::IllegalState(_))
    ));
    assert!(matches!(document.seal(), Err(SheetError::IllegalState(_))));
}

#[test]
fn test_impossible_grid_fails_fast() {
    let options = SheetOptions {
        grid: GridPolicy::Fixed { columns: 4, rows: 3 },
        ..Default::default()
    };
    assert!(matches!(
        build_document(&unique_cards(1), &options, NoopObserver),
        Err(SheetError::Config(_))
    ));
}

#[tokio::test]
async fn test_generate_pdf_writes_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cards.pdf");

    let pages = generate_pdf(&shared_back_cards(10), &SheetOptions::default(), &path)
        .await
        .unwrap();

    assert_eq!(pages, 4);
    let doc = Document::load(&path).unwrap();
    assert_eq!(doc.get_pages().len(), 4);
    assert!(!dir.path().join("cards.pdf.tmp").exists());
}

#[tokio::test]
async fn test_generate_pdf_failure_leaves_no_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cards.pdf");
    let options = SheetOptions {
        scale: -1.0,
        ..Default::default()
    };

    assert!(generate_pdf(&shared_back_cards(1), &options, &path).await.is_err());
    assert!(!path.exists());
}
