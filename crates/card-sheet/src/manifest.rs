//! CSV card manifests
//!
//! A manifest lists card images directly:
//!
//! ```text
//! front,back,quantity
//! cards/bolt.png,,4
//! cards/delver.png,cards/delver_back.png,1
//! ```
//!
//! `back` and `quantity` are optional columns. An empty back falls back to
//! the default back; relative paths are taken from the manifest's directory.

use crate::types::{CardImagePair, ImageRef, Result, SheetError};
use std::path::{Path, PathBuf};

/// Load a manifest file into card pairs, quantities expanded
pub async fn load_manifest(
    path: impl AsRef<Path>,
    default_back: Option<ImageRef>,
) -> Result<Vec<CardImagePair>> {
    let path = path.as_ref().to_owned();
    let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();

    let contents = tokio::fs::read_to_string(&path).await?;

    // CSV parsing is CPU-bound, spawn blocking
    let cards = tokio::task::spawn_blocking(move || {
        parse_manifest(&contents, &base_dir, default_back.as_ref())
    })
    .await??;

    log::info!("Loaded {} cards from {}", cards.len(), path.display());
    Ok(cards)
}

/// Parse manifest text, resolving relative paths against `base_dir`
pub fn parse_manifest(
    contents: &str,
    base_dir: &Path,
    default_back: Option<&ImageRef>,
) -> Result<Vec<CardImagePair>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(contents.as_bytes());

    let headers = reader.headers()?.clone();
    let column = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));
    let Some(front_col) = column("front") else {
        return Err(SheetError::Manifest {
            line: 1,
            message: "missing 'front' column".to_string(),
        });
    };
    let back_col = column("back");
    let quantity_col = column("quantity");

    let mut cards = Vec::new();

    for result in reader.records() {
        let record = result?;
        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or_default();
        let error = |message: String| SheetError::Manifest { line, message };
        let field = |col: Option<usize>| col.and_then(|c| record.get(c)).unwrap_or("");

        let front = field(Some(front_col));
        if front.is_empty() {
            return Err(error("empty front".to_string()));
        }

        let back = match field(back_col) {
            "" => default_back
                .cloned()
                .ok_or_else(|| error("no back image and no default back".to_string()))?,
            back => ImageRef::Path(resolve(base_dir, back)),
        };

        let quantity = match field(quantity_col) {
            "" => 1,
            text => text
                .parse::<u32>()
                .ok()
                .filter(|&q| q > 0)
                .ok_or_else(|| error(format!("invalid quantity '{}'", text)))?,
        };

        let pair = CardImagePair::new(ImageRef::Path(resolve(base_dir, front)), back);
        for _ in 0..quantity {
            cards.push(pair.clone());
        }
    }

    Ok(cards)
}

fn resolve(base_dir: &Path, path: &str) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}
