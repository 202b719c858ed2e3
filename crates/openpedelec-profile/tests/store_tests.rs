//! Filesystem round trips for profile storage.

use openpedelec_profile::{Profile, ProfileError, scan_dir};
use pedelec_infineon_protocol::{ParamId, Value};
use tempfile::TempDir;

#[test]
fn test_save_load_round_trip() {
    let dir = TempDir::new().expect("temp dir should be created");

    let mut profile = Profile::new("commute");
    let mut session = profile.edit();
    session.set(ParamId::BatteryCurrent, Value::Float(17.5));
    session.set(ParamId::Speed3, Value::Int(90));
    session.commit();
    profile.save_in(dir.path()).expect("save should succeed");

    let path = dir.path().join("commute.asv");
    assert!(path.exists());

    let loaded = Profile::load(&path).expect("load should succeed");
    assert_eq!(loaded.description(), "commute");
    assert_eq!(
        loaded.values().get(ParamId::BatteryCurrent),
        Value::Float(17.5)
    );
    assert_eq!(loaded.values().get(ParamId::Speed3), Value::Int(90));
}

#[test]
fn test_saved_files_use_crlf_records() {
    let dir = TempDir::new().expect("temp dir should be created");

    let mut profile = Profile::new("endings");
    profile.save_in(dir.path()).expect("save should succeed");

    let bytes = std::fs::read(dir.path().join("endings.asv")).expect("file should exist");
    let text = String::from_utf8(bytes).expect("profile files are ASCII");
    for line in text.split_terminator('\n') {
        assert!(line.ends_with('\r'), "record '{line}' lacks CR");
    }
}

#[test]
fn test_rename_preserves_directory_and_extension() {
    let dir = TempDir::new().expect("temp dir should be created");

    let mut profile = Profile::new("old-name");
    profile.save_in(dir.path()).expect("save should succeed");
    profile.rename("new-name").expect("rename should succeed");

    assert_eq!(profile.description(), "new-name");
    assert!(!dir.path().join("old-name.asv").exists());
    assert!(dir.path().join("new-name.asv").exists());
    assert_eq!(
        profile.path().and_then(|p| p.parent()),
        Some(dir.path())
    );
}

#[test]
fn test_rename_unsaved_profile_updates_description_only() {
    let mut profile = Profile::new("draft");
    profile.rename("tuned draft").expect("rename without file is fine");
    assert_eq!(profile.description(), "tuned draft");
    assert!(profile.path().is_none());
}

#[test]
fn test_failed_rename_keeps_state() {
    let dir = TempDir::new().expect("temp dir should be created");

    let mut profile = Profile::new("stable");
    profile.save_in(dir.path()).expect("save should succeed");
    std::fs::remove_file(dir.path().join("stable.asv")).expect("remove backing file");

    let err = profile.rename("other").expect_err("rename must fail");
    assert!(matches!(err, ProfileError::Io { op: "rename", .. }));
    assert_eq!(profile.description(), "stable");
    assert_eq!(
        profile.path().and_then(|p| p.file_name()).and_then(|n| n.to_str()),
        Some("stable.asv")
    );
}

#[test]
fn test_remove_deletes_file_and_unbinds() {
    let dir = TempDir::new().expect("temp dir should be created");

    let mut profile = Profile::new("doomed");
    profile.save_in(dir.path()).expect("save should succeed");
    profile.remove().expect("remove should succeed");

    assert!(!dir.path().join("doomed.asv").exists());
    assert!(profile.path().is_none());

    // Second remove is a no-op.
    profile.remove().expect("removing an unsaved profile is fine");
}

#[test]
fn test_save_without_backing_file_fails() {
    let profile = Profile::new("floating");
    let err = profile.save().expect_err("save needs a backing file");
    assert!(matches!(err, ProfileError::Unsaved(_)));
}

#[test]
fn test_scan_dir_skips_malformed_profiles() {
    let dir = TempDir::new().expect("temp dir should be created");

    let mut good = Profile::new("good");
    good.save_in(dir.path()).expect("save should succeed");
    let mut also_good = Profile::new("also-good");
    also_good.save_in(dir.path()).expect("save should succeed");
    std::fs::write(dir.path().join("broken.asv"), "only\r\nthree\r\nlines\r\n")
        .expect("write should succeed");
    std::fs::write(dir.path().join("notes.txt"), "not a profile")
        .expect("write should succeed");

    let outcome = scan_dir(dir.path()).expect("scan should succeed");
    let names: Vec<&str> = outcome.profiles.iter().map(|p| p.description()).collect();
    assert_eq!(names, vec!["also-good", "good"]);
    assert_eq!(outcome.failures.len(), 1);
    assert!(
        outcome.failures[0]
            .0
            .to_str()
            .expect("path")
            .ends_with("broken.asv")
    );
}
