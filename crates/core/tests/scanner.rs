use sorter_core::scanner::{scan, HashMode};
use sorter_core::CategoryId;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn touch(path: &Path, bytes: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, bytes).unwrap();
}

#[tokio::test]
async fn dropped_folder_keeps_relative_paths() {
    let dir = tempdir().unwrap();
    let kicks = dir.path().join("Kicks");
    touch(&kicks.join("Heavy/sample017.wav"), b"RIFF");
    touch(&kicks.join("Heavy/notes.txt"), b"not audio");
    touch(&kicks.join("boom.AIFF"), b"FORM");

    let files = scan(&[kicks], &[], &HashMode::None).await.unwrap();
    let rels: Vec<&str> = files
        .iter()
        .map(|f| f.relative_path.as_deref().unwrap())
        .collect();
    assert_eq!(rels, vec!["Kicks/Heavy/sample017.wav", "Kicks/boom.AIFF"]);
    assert!(files.iter().all(|f| f.location.is_some()));
    assert!(files.iter().all(|f| f.fingerprint.is_none()));

    let sample = &files[0];
    assert_eq!(sample.file_name, "sample017.wav");
    assert_eq!(sample.size, 4);
    assert_eq!(
        sorter_core::classify(&sample.file_name, sample.relative_path.as_deref()),
        CategoryId::Kicks
    );
}

#[tokio::test]
async fn single_file_root_has_no_relative_path() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("Hat_Closed.wav");
    touch(&file, b"RIFF");

    let files = scan(&[file], &[], &HashMode::None).await.unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].relative_path, None);
    assert_eq!(files[0].file_name, "Hat_Closed.wav");
}

#[tokio::test]
async fn skips_hidden_and_excluded_entries() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("Pack");
    touch(&root.join("kick.wav"), b"a");
    touch(&root.join(".hidden/snare.wav"), b"b");
    touch(&root.join("._kick.wav"), b"c");
    touch(&root.join("Backup/clap.wav"), b"d");

    let files = scan(&[root], &["**/Backup".to_string()], &HashMode::None)
        .await
        .unwrap();
    let names: Vec<&str> = files.iter().map(|f| f.file_name.as_str()).collect();
    assert_eq!(names, vec!["kick.wav"]);
}

#[tokio::test]
async fn fingerprints_follow_hash_mode() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("Drums");
    touch(&root.join("a.wav"), b"same bytes");
    touch(&root.join("b.wav"), b"same bytes");
    touch(&root.join("c.wav"), b"other bytes");

    let fast = scan(&[root.clone()], &[], &HashMode::Fast).await.unwrap();
    let full = scan(&[root], &[], &HashMode::Full).await.unwrap();
    let fp: Vec<&str> = fast
        .iter()
        .map(|f| f.fingerprint.as_deref().unwrap())
        .collect();
    assert_eq!(fp[0], fp[1]);
    assert_ne!(fp[0], fp[2]);
    // Small files fit in the fast window, so both modes agree.
    assert_eq!(fast[0].fingerprint, full[0].fingerprint);
}

#[tokio::test]
async fn bad_exclude_glob_is_an_error() {
    let dir = tempdir().unwrap();
    let result = scan(&[dir.path().to_path_buf()], &["[".to_string()], &HashMode::None).await;
    assert!(result.is_err());
}
