//! End-to-end export against the stub backend

mod common;

use casino_desk::{
    export::UTF8_BOM, export_profile_to_interactive_html, load_snapshot, HttpImageEmbedder, ImageEmbedder,
    SnapshotOptions,
};
use common::TestContext;

#[tokio::test]
async fn test_snapshot_collects_geos_and_recipients() {
    let ctx = TestContext::new("good-token").await;

    let snapshot = load_snapshot(&ctx.api, 7, &SnapshotOptions::default()).await.unwrap();

    assert_eq!(snapshot.casino.name, "Lucky Star");
    assert_eq!(snapshot.geos, vec!["DE", "FI", "PL", "RU"]);
    assert_eq!(snapshot.recipients, vec!["alerts@desk.example", "ops@desk.example"]);
    assert_eq!(snapshot.bonuses.len(), 2);
    assert_eq!(snapshot.emails.len(), 3);

    // fields come back ordered by sort_order
    let labels: Vec<_> = snapshot.profile.iter().map(|(field, _)| field.label.as_str()).collect();
    assert_eq!(labels, vec!["License", "Support hours"]);
    assert_eq!(snapshot.profile[0].1.as_ref().and_then(|v| v.value.as_deref()), Some("Curacao"));
    assert!(snapshot.profile[1].1.is_none());

    assert_eq!(snapshot.bonus_images[&2], vec!["/uploads/shared.png", "/uploads/missing.png"]);
    assert_eq!(snapshot.image_urls(), vec!["/uploads/shared.png", "/uploads/missing.png"]);
}

#[tokio::test]
async fn test_snapshot_geo_subset() {
    let ctx = TestContext::new("good-token").await;

    let options = SnapshotOptions::with_geos(["de", "pl"]);
    let snapshot = load_snapshot(&ctx.api, 7, &options).await.unwrap();

    assert_eq!(snapshot.geos, vec!["DE", "PL"]);
    assert_eq!(snapshot.bonuses.len(), 1);
    assert_eq!(snapshot.bonuses[0].geo, "DE");
    assert_eq!(snapshot.payments.len(), 1);
    assert!(snapshot.settings.is_empty());
    assert_eq!(ctx.state.hits("GET", "/api/bonuses/1/images"), 0);
}

#[tokio::test]
async fn test_export_embeds_shared_image_once() {
    let ctx = TestContext::new("good-token").await;
    let snapshot = load_snapshot(&ctx.api, 7, &SnapshotOptions::default()).await.unwrap();
    let embedder = HttpImageEmbedder::new(ctx.api.client().clone(), 2);
    assert_eq!(embedder.concurrency(), 2);

    let document = export_profile_to_interactive_html(&snapshot, Some(&embedder)).await.unwrap();

    assert_eq!(ctx.state.hits("GET", "/uploads/shared.png"), 1);
    assert_eq!(ctx.state.hits("GET", "/uploads/missing.png"), 1);

    let html = document.html();
    assert!(html.contains("data:image/png;base64,"));
    assert!(!html.contains("src=\"/uploads/shared.png\""));
    // unresolved images keep their remote URL
    assert!(html.contains("/uploads/missing.png"));
}

#[tokio::test]
async fn test_export_document_is_saved_with_bom() {
    let ctx = TestContext::new("good-token").await;
    let snapshot = load_snapshot(&ctx.api, 7, &SnapshotOptions::default()).await.unwrap();

    let document = export_profile_to_interactive_html(&snapshot, None).await.unwrap();
    let out_dir = tempfile::tempdir().unwrap();
    let path = document.save_to(out_dir.path()).unwrap();

    assert_eq!(path.file_name().unwrap(), "LuckyStar_profile.html");
    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(&bytes[..3], &UTF8_BOM[..]);

    let html = String::from_utf8(bytes[3..].to_vec()).unwrap();
    assert!(html.contains("<p>Hello <b>team</b></p>"));
    assert!(html.contains("data-recipient=\"ops@desk.example\""));
    assert!(html.contains("data-geo=\"RU\""));
    assert!(html.contains("data-direction=\"withdrawal\""));
    assert_eq!(ctx.state.hits("GET", "/uploads/shared.png"), 0);
}
