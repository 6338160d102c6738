use modbridge::cli::commands::{preview, process, strategies};
use modbridge::Config;
use std::fs;
use tempfile::TempDir;

const BATCH: &str = r"
context:
  mod_id: industrial_plus
  mod_version: 1.4.0
features:
  - id: alloy_furnace_screen
    name: Alloy Furnace
    type: gui
    compatibility_tier: 3
    properties:
      ui:
        slot_count: 4
        progress_bars: 1
  - id: copper_ore
    name: Copper Ore
    type: block
    compatibility_tier: 1
  - id: deep_realm
    name: Deep Realm
    type: dimension
    compatibility_tier: 4
    properties:
      dimension:
        custom_terrain: true
        has_portal: true
";

fn write_batch(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("batch.yaml");
    fs::write(&path, BATCH).unwrap();
    path
}

#[tokio::test]
async fn test_process_writes_guide() {
    let dir = TempDir::new().unwrap();
    let input = write_batch(&dir);
    let guide = dir.path().join("GUIDE.md");

    process::execute(
        process::ProcessArgs {
            input,
            guide: Some(guide.clone()),
        },
        &Config::default(),
        true,
    )
    .await
    .unwrap();

    let contents = fs::read_to_string(&guide).unwrap();
    assert!(contents.starts_with("# Manual Post-Processing Guide"));
    assert!(contents.contains("alloy_furnace_screen"));
    assert!(contents.contains("deep_realm"));
}

#[tokio::test]
async fn test_process_rejects_guide_when_reports_disabled() {
    let dir = TempDir::new().unwrap();
    let input = write_batch(&dir);
    let mut config = Config::default();
    config.engine.generate_reports = false;

    let err = process::execute(
        process::ProcessArgs {
            input,
            guide: Some(dir.path().join("GUIDE.md")),
        },
        &config,
        true,
    )
    .await
    .unwrap_err();

    assert!(err.to_string().contains("generate_reports"));
    assert!(!dir.path().join("GUIDE.md").exists());
}

#[tokio::test]
async fn test_process_missing_input_fails() {
    let dir = TempDir::new().unwrap();
    let result = process::execute(
        process::ProcessArgs {
            input: dir.path().join("missing.yaml"),
            guide: None,
        },
        &Config::default(),
        true,
    )
    .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_preview_unknown_feature_fails() {
    let dir = TempDir::new().unwrap();
    let input = write_batch(&dir);

    let err = preview::execute(
        preview::PreviewArgs {
            input,
            feature: Some("nope".to_string()),
        },
        &Config::default(),
        true,
    )
    .await
    .unwrap_err();

    assert!(err.to_string().contains("nope"));
}

#[tokio::test]
async fn test_preview_single_feature() {
    let dir = TempDir::new().unwrap();
    let input = write_batch(&dir);

    preview::execute(
        preview::PreviewArgs {
            input,
            feature: Some("alloy_furnace_screen".to_string()),
        },
        &Config::default(),
        true,
    )
    .await
    .unwrap();
}

#[test]
fn test_strategies_listing_succeeds() {
    strategies::execute(&Config::default(), true).unwrap();
}
