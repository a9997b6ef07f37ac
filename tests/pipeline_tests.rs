//! End-to-end runs of the walk → digest → collect pipeline over temp trees.

use snookr::engine::hash_bytes;
use snookr::metadata::NoMetadata;
use snookr::{
    CancelCause, CancelToken, DigestAlgorithm, Opts, RunError, digest_dir, digest_dir_report,
    digest_dir_streaming, digest_dir_with_cancel, digest_roots, scan_dir,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

fn tree(files: &[(&str, &[u8])]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (rel, data) in files {
        let p = dir.path().join(rel);
        fs::create_dir_all(p.parent().unwrap()).unwrap();
        fs::write(p, data).unwrap();
    }
    dir
}

fn many_images(n: usize) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for i in 0..n {
        let sub = dir.path().join(format!("d{}", i % 7));
        fs::create_dir_all(&sub).unwrap();
        fs::write(sub.join(format!("img_{i:04}.jpg")), format!("image {i}")).unwrap();
    }
    dir
}

/// `first/img_0000.jpg` .. `first/img_{n-1}.jpg`, then `last/z.jpg`. With one worker on
/// rendezvous channels the walk stays a few paths ahead of the collector, so anything near the
/// end of `first/` or under `last/` is still unvisited when the first digest arrives.
fn long_tree(n: usize) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("first");
    fs::create_dir_all(&first).unwrap();
    for i in 0..n {
        fs::write(first.join(format!("img_{i:04}.jpg")), format!("image {i}")).unwrap();
    }
    fs::create_dir_all(dir.path().join("last")).unwrap();
    fs::write(dir.path().join("last/z.jpg"), b"z").unwrap();
    dir
}

fn one_worker() -> Opts {
    Opts {
        num_workers: 1,
        ..Default::default()
    }
}

fn keys(m: &snookr::Digests) -> Vec<PathBuf> {
    m.keys().cloned().collect()
}

/// On Unix, make `path` unreadable. Returns false when permissions are not enforced (e.g. running as root).
#[cfg(unix)]
fn make_unreadable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o000)).unwrap();
    if path.is_dir() {
        fs::read_dir(path).is_err()
    } else {
        fs::File::open(path).is_err()
    }
}

#[cfg(unix)]
fn restore(path: &Path, mode: u32) {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode)).unwrap();
}

#[test]
fn test_only_images_are_digested() {
    let dir = tree(&[
        ("a.jpg", b"a"),
        ("b.JPG", b"b"),
        ("c.txt", b"c"),
        ("sub/d.jpeg", b"d"),
    ]);
    let m = digest_dir(dir.path(), &Opts::default()).unwrap();
    assert_eq!(
        keys(&m),
        vec![
            PathBuf::from("a.jpg"),
            PathBuf::from("b.JPG"),
            PathBuf::from("sub/d.jpeg"),
        ]
    );
    assert_eq!(m[Path::new("a.jpg")], hash_bytes(b"a", DigestAlgorithm::Md5));
    assert_eq!(
        m[Path::new("sub/d.jpeg")],
        hash_bytes(b"d", DigestAlgorithm::Md5)
    );
}

#[test]
fn test_empty_root_is_success() {
    let dir = tempfile::tempdir().unwrap();
    let m = digest_dir(dir.path(), &Opts::default()).unwrap();
    assert!(m.is_empty());
}

#[test]
fn test_directories_named_like_images_are_not_entries() {
    let dir = tree(&[("album.jpg/inner.jpg", b"x")]);
    let m = digest_dir(dir.path(), &Opts::default()).unwrap();
    assert_eq!(keys(&m), vec![PathBuf::from("album.jpg/inner.jpg")]);
}

#[test]
fn test_missing_root_is_root_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope");
    let r = digest_dir(&missing, &Opts::default());
    assert!(matches!(r, Err(RunError::RootNotFound(p)) if p == missing));
}

#[test]
fn test_file_root_is_rejected() {
    let dir = tree(&[("a.jpg", b"a")]);
    let r = digest_dir(&dir.path().join("a.jpg"), &Opts::default());
    assert!(matches!(r, Err(RunError::NotADirectory(_))));
}

#[test]
fn test_roots_are_independent() {
    let good = tree(&[("a.jpg", b"a")]);
    let missing = good.path().join("missing");
    let reports = digest_roots(&[missing.clone(), good.path().to_path_buf()], &Opts::default(), None);
    assert_eq!(reports.len(), 2);
    assert!(matches!(reports[0].outcome, Err(RunError::RootNotFound(_))));
    assert!(reports[0].skipped.is_empty());
    assert_eq!(reports[1].outcome.as_ref().unwrap().len(), 1);
    assert_eq!(reports[1].root, good.path());
}

#[test]
fn test_runs_are_deterministic() {
    let dir = many_images(60);
    let opts = Opts::default();
    let first = digest_dir(dir.path(), &opts).unwrap();
    let second = digest_dir(dir.path(), &opts).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_identical_content_has_identical_digest() {
    let dir = tree(&[("x/one.jpg", b"same"), ("y/two.jpg", b"same")]);
    let m = digest_dir(dir.path(), &Opts::default()).unwrap();
    assert_eq!(m[Path::new("x/one.jpg")], m[Path::new("y/two.jpg")]);
}

#[test]
fn test_worker_count_does_not_change_result() {
    let dir = many_images(200);
    let base = digest_dir(
        dir.path(),
        &Opts {
            num_workers: 1,
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(base.len(), 200);
    for n in [2, 7, 20, 64] {
        let m = digest_dir(
            dir.path(),
            &Opts {
                num_workers: n,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(m, base, "num_workers = {n}");
    }
}

#[test]
fn test_buffered_channels_match_rendezvous() {
    let dir = many_images(50);
    let a = digest_dir(dir.path(), &Opts::default()).unwrap();
    let b = digest_dir(
        dir.path(),
        &Opts {
            channel_cap: 16,
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_blake3_algorithm() {
    let dir = tree(&[("a.jpg", b"a")]);
    let m = digest_dir(
        dir.path(),
        &Opts {
            algorithm: DigestAlgorithm::Blake3,
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(
        m[Path::new("a.jpg")],
        hash_bytes(b"a", DigestAlgorithm::Blake3)
    );
}

#[test]
fn test_custom_extensions_and_exclude() {
    let dir = tree(&[
        ("a.png", b"a"),
        ("b.jpg", b"b"),
        ("thumbs/c.png", b"c"),
        ("d_small.png", b"d"),
    ]);
    let m = digest_dir(
        dir.path(),
        &Opts {
            extensions: vec!["PNG".into()],
            exclude: vec!["thumbs".into(), "*_small.png".into()],
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(keys(&m), vec![PathBuf::from("a.png")]);
}

#[test]
fn test_streaming_hook_sees_every_digest_once() {
    let dir = many_images(40);
    let mut seen = Vec::new();
    let m = digest_dir_streaming(dir.path(), &Opts::default(), None, |p, d| {
        seen.push((p.to_path_buf(), *d))
    })
    .unwrap();
    assert_eq!(seen.len(), m.len());
    seen.sort_by(|a, b| a.0.cmp(&b.0));
    let from_map: Vec<_> = m.into_iter().collect();
    assert_eq!(seen, from_map);
}

#[cfg(unix)]
#[test]
fn test_symlinks_are_not_followed() {
    let dir = tree(&[("real/a.jpg", b"a")]);
    std::os::unix::fs::symlink(dir.path().join("real/a.jpg"), dir.path().join("link.jpg")).unwrap();
    std::os::unix::fs::symlink(dir.path().join("real"), dir.path().join("linkdir")).unwrap();
    let m = digest_dir(dir.path(), &Opts::default()).unwrap();
    assert_eq!(keys(&m), vec![PathBuf::from("real/a.jpg")]);
}

#[cfg(unix)]
#[test]
fn test_unreadable_file_fails_whole_run() {
    let dir = tree(&[("a.jpg", b"a"), ("b.jpg", b"b")]);
    let locked = dir.path().join("a.jpg");
    if !make_unreadable(&locked) {
        restore(&locked, 0o644);
        eprintln!("skipped: permissions not enforced for this user");
        return;
    }
    for n in [1, 2, 20] {
        let r = digest_dir(
            dir.path(),
            &Opts {
                num_workers: n,
                ..Default::default()
            },
        );
        match r {
            Err(RunError::Read { path, source }) => {
                assert_eq!(path, locked);
                assert_eq!(source.kind(), std::io::ErrorKind::PermissionDenied);
            }
            other => panic!("expected read error, got {:?}", other),
        }
    }
    restore(&locked, 0o644);
}

#[cfg(unix)]
#[test]
fn test_unreadable_folder_is_skipped_unless_strict() {
    let dir = tree(&[("ok/a.jpg", b"a"), ("locked/b.jpg", b"b")]);
    let locked = dir.path().join("locked");
    if !make_unreadable(&locked) {
        restore(&locked, 0o755);
        eprintln!("skipped: permissions not enforced for this user");
        return;
    }
    let m = digest_dir(dir.path(), &Opts::default()).unwrap();
    assert_eq!(keys(&m), vec![PathBuf::from("ok/a.jpg")]);

    let r = digest_dir(
        dir.path(),
        &Opts {
            strict: true,
            ..Default::default()
        },
    );
    assert!(matches!(r, Err(RunError::Walk { .. })));
    restore(&locked, 0o755);
}

#[test]
fn test_file_vanishing_mid_run_fails_whole_run() {
    let dir = long_tree(300);
    let doomed = dir.path().join("first/img_0299.jpg");
    let mut seen = 0;
    let r = digest_dir_streaming(dir.path(), &one_worker(), None, |_, _| {
        seen += 1;
        if seen == 1 {
            fs::remove_file(&doomed).unwrap();
        }
    });
    match r {
        Err(RunError::Read { path, source }) => {
            assert_eq!(path, doomed);
            assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
        }
        other => panic!("expected read error, got {:?}", other),
    }
    // One worker takes paths in walk order, so everything before the missing file was digested.
    assert_eq!(seen, 299);
}

#[test]
fn test_skipped_folders_are_reported() {
    let dir = long_tree(300);
    let doomed = dir.path().join("last");
    let mut removed = false;
    let report = snookr::pipeline::digest_root(dir.path(), &one_worker(), None, |_, _| {
        if !removed {
            fs::remove_dir_all(&doomed).unwrap();
            removed = true;
        }
    });
    assert_eq!(report.outcome.as_ref().unwrap().len(), 300);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].path.as_deref(), Some(doomed.as_path()));
    assert!(!report.skipped[0].message.is_empty());

    let dir = long_tree(300);
    let doomed = dir.path().join("last");
    let mut removed = false;
    let strict = Opts {
        strict: true,
        ..one_worker()
    };
    let report = snookr::pipeline::digest_root(dir.path(), &strict, None, |_, _| {
        if !removed {
            fs::remove_dir_all(&doomed).unwrap();
            removed = true;
        }
    });
    assert!(matches!(report.outcome, Err(RunError::Walk { path: Some(p), .. }) if p == doomed));
    assert!(report.skipped.is_empty());
}

#[test]
fn test_clean_run_reports_nothing_skipped() {
    let dir = many_images(20);
    let report = digest_dir_report(dir.path(), &Opts::default(), None);
    assert_eq!(report.root, dir.path());
    assert_eq!(report.outcome.unwrap().len(), 20);
    assert!(report.skipped.is_empty());
}

#[test]
fn test_cancel_before_run() {
    let dir = many_images(10);
    let cancel = CancelToken::new();
    cancel.cancel(CancelCause::External);
    let r = digest_dir_with_cancel(dir.path(), &Opts::default(), &cancel);
    assert!(matches!(r, Err(RunError::Canceled)));
}

#[test]
fn test_cancel_mid_run_discards_partial_map() {
    let dir = many_images(300);
    let cancel = CancelToken::new();
    let trigger = cancel.clone();
    let mut seen = 0;
    let r = digest_dir_streaming(
        dir.path(),
        &Opts {
            num_workers: 4,
            ..Default::default()
        },
        Some(&cancel),
        |_, _| {
            seen += 1;
            trigger.cancel(CancelCause::External);
        },
    );
    assert!(matches!(r, Err(RunError::Canceled)));
    assert!(seen >= 1);
}

#[test]
fn test_deadline_exceeded() {
    let dir = many_images(5);
    let r = digest_dir_streaming(
        dir.path(),
        &Opts {
            num_workers: 1,
            timeout: Some(Duration::from_millis(30)),
            ..Default::default()
        },
        None,
        |_, _| std::thread::sleep(Duration::from_millis(200)),
    );
    assert!(matches!(r, Err(RunError::DeadlineExceeded)));
}

#[test]
fn test_parent_token_survives_child_failure() {
    let parent = CancelToken::new();
    let dir = tempfile::tempdir().unwrap();
    let r = digest_dir_with_cancel(&dir.path().join("missing"), &Opts::default(), &parent);
    assert!(r.is_err());
    let good = tree(&[("a.jpg", b"a")]);
    assert_eq!(
        digest_dir_with_cancel(good.path(), &Opts::default(), &parent)
            .unwrap()
            .len(),
        1
    );
    assert!(!parent.is_cancelled());
}

#[test]
fn test_scan_dir_builds_sorted_records() {
    let dir = tree(&[("b.jpg", b"bb"), ("a.jpg", b"a"), ("notes.txt", b"n")]);
    let records = scan_dir(dir.path(), &Opts::default(), &NoMetadata, None).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].file_name, dir.path().join("a.jpg"));
    assert_eq!(records[0].size, 1);
    assert_eq!(records[1].size, 2);
    assert_eq!(records[1].digest, hash_bytes(b"bb", DigestAlgorithm::Md5));
    assert!(records[0].last_modified_ns > 0);
    assert!(records.iter().all(|r| r.metadata.is_empty()));
}

#[cfg(target_os = "linux")]
#[test]
fn test_scan_dir_keeps_non_utf8_names() {
    use snookr::engine::write_records;
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let dir = tree(&[("ok.jpg", b"ok")]);
    fs::write(dir.path().join(OsStr::from_bytes(b"caf\xe9.jpg")), b"cafe").unwrap();
    let records = scan_dir(dir.path(), &Opts::default(), &NoMetadata, None).unwrap();
    assert_eq!(records.len(), 2);

    let mut out = Vec::new();
    write_records(&mut out, &records, true).unwrap();
    let text = String::from_utf8(out).unwrap();
    let names: Vec<String> = text
        .lines()
        .map(|l| {
            let v: serde_json::Value = serde_json::from_str(l).unwrap();
            v["file_name"].as_str().unwrap().to_string()
        })
        .collect();
    assert_eq!(names.len(), 2);
    assert!(names.iter().any(|n| n.ends_with("caf\u{FFFD}.jpg")));
    assert!(names.iter().any(|n| n.ends_with("ok.jpg")));
}

#[test]
fn test_scan_dir_tolerates_undecodable_metadata() {
    use snookr::metadata::{ExifConfig, ExifExtractor};
    let dir = tree(&[("broken.jpg", b"definitely not a jpeg")]);
    let extractor = ExifExtractor::new(ExifConfig::default());
    let records = scan_dir(dir.path(), &Opts::default(), &extractor, None).unwrap();
    assert_eq!(records.len(), 1);
    assert!(records[0].metadata.is_empty());
}
