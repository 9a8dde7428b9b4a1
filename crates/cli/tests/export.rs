use cli::export::{write_plan, ConflictPolicy, ExportStatus};
use cli::ingest;
use sorter_core::config::AppConfig;
use sorter_core::export::plan;
use sorter_core::{CategoryId, SampleLibrary};
use std::fs;
use tempfile::tempdir;
use tokio_util::sync::CancellationToken;

fn seed(root: &std::path::Path) {
    let files = [
        ("Drop/kick_01.wav", "k1"),
        ("Drop/Hat_Closed.wav", "h1"),
        ("Drop/Kicks/Heavy/sample017.wav", "k2"),
        ("Drop/Snares/Clap_Big.aif", "s1"),
        ("Drop/xyz123.wav", "o1"),
        ("Drop/readme.txt", "not audio"),
    ];
    for (rel, body) in files {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, body).unwrap();
    }
}

async fn import(root: &std::path::Path) -> SampleLibrary {
    let cfg = AppConfig::default();
    let mut library = SampleLibrary::new();
    let added = ingest::import(
        &cfg,
        &[root.join("Drop")],
        &mut library,
        &CancellationToken::new(),
        None,
    )
    .await
    .unwrap();
    assert_eq!(added, 5);
    library
}

#[tokio::test]
async fn import_counts_every_audio_file_once() {
    let temp = tempdir().unwrap();
    seed(temp.path());
    let library = import(temp.path()).await;

    let table = library.categories();
    assert_eq!(table.total(), 5);
    assert_eq!(table.count(CategoryId::Kicks), 2);
    assert_eq!(table.count(CategoryId::Hihats), 1);
    assert_eq!(table.count(CategoryId::Snares), 1);
    assert_eq!(table.count(CategoryId::Other), 1);
}

#[tokio::test]
async fn export_copies_selected_categories_into_folders() {
    let temp = tempdir().unwrap();
    seed(temp.path());
    let mut library = import(temp.path()).await;
    library.set_selected_by_name(&["kicks", "snares"]).unwrap();

    let out = temp.path().join("out");
    let outcomes = write_plan(&plan(&library), &out, ConflictPolicy::Rename, false).unwrap();
    assert_eq!(outcomes.len(), 3);
    assert!(outcomes.iter().all(|o| o.status == ExportStatus::Copied));

    assert_eq!(
        fs::read_to_string(out.join("Kicks/kick_01.wav")).unwrap(),
        "k1"
    );
    assert_eq!(
        fs::read_to_string(out.join("Kicks/sample017.wav")).unwrap(),
        "k2"
    );
    assert_eq!(
        fs::read_to_string(out.join("Snares_Claps/Clap_Big.aif")).unwrap(),
        "s1"
    );
    assert!(!out.join("Hi-Hats").exists());
    assert!(!out.join("Other").exists());
}

#[tokio::test]
async fn dry_run_writes_nothing() {
    let temp = tempdir().unwrap();
    seed(temp.path());
    let library = import(temp.path()).await;

    let out = temp.path().join("out");
    let outcomes = write_plan(&plan(&library), &out, ConflictPolicy::Rename, true).unwrap();
    assert_eq!(outcomes.len(), 5);
    assert!(outcomes.iter().all(|o| o.status == ExportStatus::Planned));
    assert!(!out.exists());
}

#[tokio::test]
async fn conflict_policies_apply_to_existing_targets() {
    let temp = tempdir().unwrap();
    seed(temp.path());
    let mut library = import(temp.path()).await;
    library.set_selected_by_name(&["hihats"]).unwrap();
    let export_plan = plan(&library);
    let out = temp.path().join("out");
    fs::create_dir_all(out.join("Hi-Hats")).unwrap();
    fs::write(out.join("Hi-Hats/Hat_Closed.wav"), "old").unwrap();

    let skipped = write_plan(&export_plan, &out, ConflictPolicy::Skip, false).unwrap();
    assert_eq!(skipped[0].status, ExportStatus::Skipped);
    assert_eq!(
        fs::read_to_string(out.join("Hi-Hats/Hat_Closed.wav")).unwrap(),
        "old"
    );

    let renamed = write_plan(&export_plan, &out, ConflictPolicy::Rename, false).unwrap();
    assert_eq!(renamed[0].target, out.join("Hi-Hats/Hat_Closed_1.wav"));
    assert_eq!(
        fs::read_to_string(out.join("Hi-Hats/Hat_Closed_1.wav")).unwrap(),
        "h1"
    );

    write_plan(&export_plan, &out, ConflictPolicy::Overwrite, false).unwrap();
    assert_eq!(
        fs::read_to_string(out.join("Hi-Hats/Hat_Closed.wav")).unwrap(),
        "h1"
    );
}

#[tokio::test]
async fn cancelled_import_leaves_library_empty() {
    let temp = tempdir().unwrap();
    seed(temp.path());
    let cancel = CancellationToken::new();
    cancel.cancel();
    let mut library = SampleLibrary::new();
    let result = ingest::import(
        &AppConfig::default(),
        &[temp.path().join("Drop")],
        &mut library,
        &cancel,
        None,
    )
    .await;
    assert!(result.is_err());
    assert!(library.samples().is_empty());
    assert_eq!(library.categories().total(), 0);
}
