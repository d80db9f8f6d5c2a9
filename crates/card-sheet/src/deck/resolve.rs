use super::DeckEntry;
use crate::types::{CardImagePair, ImageRef, Result};
use std::path::{Path, PathBuf};

/// File extensions tried for every card image, in order
pub const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Suffix of a card's own back image, e.g. `Delver_of_Secrets_back.jpg`
const BACK_SUFFIX: &str = "_back";

/// A directory of card images named after the cards
#[derive(Debug, Clone)]
pub struct ImageDirectory {
    pub dir: PathBuf,
    /// Back used for every card without its own `_back` image
    pub default_back: ImageRef,
}

impl ImageDirectory {
    pub fn new(dir: impl Into<PathBuf>, default_back: ImageRef) -> Self {
        Self {
            dir: dir.into(),
            default_back,
        }
    }
}

/// Outcome of matching a decklist against an image directory
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// One pair per printed card, quantities expanded, in decklist order
    pub pairs: Vec<CardImagePair>,
    /// Entries without a front image; they are left out of `pairs`
    pub missing: Vec<DeckEntry>,
}

/// File-name form of a card name: spaces become underscores and characters
/// that cannot appear in a file name are replaced as well.
pub fn safe_name(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| match c {
            ' ' | '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c => c,
        })
        .collect()
}

/// Match every entry to its front (and optional back) image.
///
/// For an entry with a set annotation, `<name>_<set>_<number>` and
/// `<name>_<set>` are tried before the plain `<name>`.
pub async fn resolve_deck(entries: &[DeckEntry], images: &ImageDirectory) -> Result<Resolution> {
    let mut resolution = Resolution::default();

    for entry in entries {
        let Some((stem, front)) = find_front(&images.dir, entry).await else {
            log::warn!("No image found for '{}' in {}", entry.name, images.dir.display());
            resolution.missing.push(entry.clone());
            continue;
        };

        let back = match find_image(&images.dir, &format!("{}{}", stem, BACK_SUFFIX)).await {
            Some(path) => {
                log::debug!("'{}' has its own back {}", entry.name, path.display());
                ImageRef::Path(path)
            }
            None => images.default_back.clone(),
        };

        let pair = CardImagePair::new(ImageRef::Path(front), back);
        for _ in 0..entry.quantity {
            resolution.pairs.push(pair.clone());
        }
    }

    log::info!(
        "Resolved {} cards, {} entries without images",
        resolution.pairs.len(),
        resolution.missing.len()
    );

    Ok(resolution)
}

/// First matching front image and the stem it was found under
async fn find_front(dir: &Path, entry: &DeckEntry) -> Option<(String, PathBuf)> {
    for stem in candidate_stems(entry) {
        if let Some(path) = find_image(dir, &stem).await {
            return Some((stem, path));
        }
    }
    None
}

fn candidate_stems(entry: &DeckEntry) -> Vec<String> {
    let name = safe_name(&entry.name);
    let mut stems = Vec::new();

    if let Some(set) = &entry.set_code {
        let set = set.to_lowercase();
        if let Some(number) = &entry.collector_number {
            stems.push(format!("{}_{}_{}", name, set, safe_name(number)));
        }
        stems.push(format!("{}_{}", name, set));
    }
    stems.push(name);

    stems
}

async fn find_image(dir: &Path, stem: &str) -> Option<PathBuf> {
    for ext in IMAGE_EXTENSIONS {
        let path = dir.join(format!("{}.{}", stem, ext));
        if tokio::fs::metadata(&path)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false)
        {
            return Some(path);
        }
    }
    None
}
