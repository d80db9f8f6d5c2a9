use super::{NoopObserver, SheetDocument, SheetObserver};
use crate::layout::group_cards;
use crate::options::SheetOptions;
use crate::types::*;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Build the card sheet and write it to `output_path`.
///
/// Returns the number of pages written.
pub async fn generate_pdf(
    cards: &[CardImagePair],
    options: &SheetOptions,
    output_path: impl AsRef<Path>,
) -> Result<usize> {
    generate_pdf_with_observer(cards, options, output_path, NoopObserver).await
}

/// Like [`generate_pdf`], reporting each page to `observer`
pub async fn generate_pdf_with_observer<O>(
    cards: &[CardImagePair],
    options: &SheetOptions,
    output_path: impl AsRef<Path>,
    observer: O,
) -> Result<usize>
where
    O: SheetObserver + Send + 'static,
{
    options.validate()?;

    let cards = cards.to_vec();
    let options = options.clone();

    let (bytes, pages) = tokio::task::spawn_blocking(move || {
        let mut document = SheetDocument::new(&options)?.with_observer(observer);
        for group in group_cards(&cards, document.geometry().capacity()) {
            document.emit_group(group)?;
        }
        let pages = document.page_count();
        Ok::<_, SheetError>((document.seal()?, pages))
    })
    .await??;

    write_pdf_atomic(&bytes, output_path).await?;
    Ok(pages)
}

/// Write `bytes` to `path` without ever leaving a partial file behind.
///
/// The data goes to a temporary sibling first and is renamed into place.
pub async fn write_pdf_atomic(bytes: &[u8], path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let temp_path = temp_sibling(path);

    if let Err(e) = tokio::fs::write(&temp_path, bytes).await {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(e.into());
    }

    if let Err(e) = tokio::fs::rename(&temp_path, path).await {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(e.into());
    }

    log::info!("Wrote {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}

/// `<path>.tmp` in the same directory, so the rename stays on one filesystem
fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("cardsheet"));
    name.push(".tmp");
    path.with_file_name(name)
}
