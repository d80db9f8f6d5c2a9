use card_sheet::*;
use std::path::Path;

async fn write_manifest(dir: &Path, text: &str) -> std::path::PathBuf {
    let path = dir.join("cards.csv");
    tokio::fs::write(&path, text).await.unwrap();
    path
}

#[tokio::test]
async fn test_load_manifest_resolves_relative_paths() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_manifest(
        dir.path(),
        "front,back,quantity\nimages/bolt.png,,3\nimages/delver.png,images/delver_back.png,1\n",
    )
    .await;
    let default_back = ImageRef::path("/shared/back.png");

    let cards = load_manifest(&path, Some(default_back.clone())).await.unwrap();

    assert_eq!(cards.len(), 4);
    assert_eq!(cards[0].front, ImageRef::path(dir.path().join("images/bolt.png")));
    assert_eq!(cards[2].back, default_back);
    assert_eq!(cards[3].front, ImageRef::path(dir.path().join("images/delver.png")));
    assert_eq!(cards[3].back, ImageRef::path(dir.path().join("images/delver_back.png")));
}

#[tokio::test]
async fn test_load_manifest_reports_line() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_manifest(dir.path(), "front,quantity\na.png,1\nb.png,lots\n").await;

    match load_manifest(&path, Some(ImageRef::path("back.png"))).await {
        Err(SheetError::Manifest { line, message }) => {
            assert_eq!(line, 3);
            assert!(message.contains("lots"));
        }
        other => panic!("Expected manifest error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_load_manifest_missing_file() {
    let result = load_manifest("/nonexistent/cards.csv", None).await;
    assert!(matches!(result, Err(SheetError::Io(_))));
}

#[tokio::test]
async fn test_header_only_manifest_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_manifest(dir.path(), "front,back,quantity\n").await;

    let cards = load_manifest(&path, None).await.unwrap();
    assert!(cards.is_empty());
}
