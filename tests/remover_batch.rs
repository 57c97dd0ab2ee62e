//! Batch removal: per-path isolation, modes and basket contents.

use assert_fs::TempDir;
use assert_fs::prelude::*;
use std::fs;
use std::path::Path;

use smart_rm::{
    BasketMover, CandidatePath, Config, ConfirmMode, ItemMover, MovedItem, RemovalOutcome, Remover,
    SmartRmError, TrashRecord, allow_all,
};

fn remover(td: &TempDir) -> Remover {
    let cfg = Config::new(td.path().join("basket")).with_confirm(ConfirmMode::Never);
    Remover::new(&cfg, Box::new(allow_all()))
}

fn basket_entries(td: &TempDir, sub: &str) -> Vec<String> {
    let mut names: Vec<_> = fs::read_dir(td.path().join("basket").join(sub))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn tree_lands_in_basket_with_one_record_per_item() {
    let td = TempDir::new().unwrap();
    td.child("t/a.txt").write_str("a").unwrap();
    td.child("t/b/c.txt").write_str("c").unwrap();
    let root = td.path().join("t");

    let report = remover(&td).remove_trees(&[&root]).unwrap();
    assert!(!report.has_failures());
    assert_eq!(report.moved_count(), 4);
    assert!(!root.exists());

    assert_eq!(basket_entries(&td, "files"), vec!["a.txt", "b", "c.txt", "t"]);
    assert_eq!(
        basket_entries(&td, "info"),
        vec!["a.txt.trashinfo", "b.trashinfo", "c.txt.trashinfo", "t.trashinfo"]
    );
    let rec = TrashRecord::parse(
        &fs::read_to_string(td.path().join("basket/info/c.txt.trashinfo")).unwrap(),
    )
    .unwrap();
    assert_eq!(rec.original_path, fs::canonicalize(&root).unwrap().join("b/c.txt"));
}

#[test]
fn failing_path_does_not_stop_the_batch() {
    let td = TempDir::new().unwrap();
    td.child("one.txt").write_str("1").unwrap();
    td.child("two.txt").write_str("2").unwrap();
    let one = td.path().join("one.txt");
    let gone = td.path().join("gone.txt");
    let two = td.path().join("two.txt");

    let report = remover(&td).remove_files(&[&one, &gone, &two]).unwrap();
    assert_eq!(report.outcomes.len(), 3);
    assert!(report.has_failures());
    let failures: Vec<_> = report.failures().collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0, gone.as_path());
    assert!(matches!(failures[0].1, SmartRmError::NotFound(_)));
    assert!(!one.exists());
    assert!(!two.exists());
}

#[test]
fn files_mode_refuses_directory_and_leaves_it() {
    let td = TempDir::new().unwrap();
    td.child("d/x").write_str("x").unwrap();
    let dir = td.path().join("d");
    let report = remover(&td).remove_files(&[&dir]).unwrap();
    let (_, outcome) = &report.outcomes[0];
    assert!(matches!(
        outcome,
        RemovalOutcome::Failed(SmartRmError::WrongKind { .. })
    ));
    assert!(dir.join("x").exists());
}

#[test]
fn directories_mode_only_takes_empty_directories() {
    let td = TempDir::new().unwrap();
    td.child("full/x").write_str("x").unwrap();
    td.child("empty").create_dir_all().unwrap();
    let full = td.path().join("full");
    let empty = td.path().join("empty");

    let report = remover(&td).remove_directories(&[&full, &empty]).unwrap();
    assert!(matches!(
        report.outcomes[0].1,
        RemovalOutcome::Failed(SmartRmError::NotEmpty(_))
    ));
    assert!(matches!(report.outcomes[1].1, RemovalOutcome::Completed(_)));
    assert!(full.exists());
    assert!(!empty.exists());
    assert_eq!(basket_entries(&td, "files"), vec!["empty"]);
}

#[test]
fn same_base_name_gets_distinct_entries_and_records() {
    let td = TempDir::new().unwrap();
    td.child("x/report.txt").write_str("first").unwrap();
    td.child("y/report.txt").write_str("second").unwrap();
    let first = td.path().join("x/report.txt");
    let second = td.path().join("y/report.txt");

    let (first_abs, second_abs) = (
        fs::canonicalize(&first).unwrap(),
        fs::canonicalize(&second).unwrap(),
    );
    let report = remover(&td).remove_files(&[&first, &second]).unwrap();
    assert!(!report.has_failures());
    assert_eq!(
        basket_entries(&td, "files"),
        vec!["report (2).txt", "report.txt"]
    );

    let info = td.path().join("basket/info");
    let a = TrashRecord::parse(&fs::read_to_string(info.join("report.txt.trashinfo")).unwrap())
        .unwrap();
    let b = TrashRecord::parse(
        &fs::read_to_string(info.join("report (2).txt.trashinfo")).unwrap(),
    )
    .unwrap();
    assert_eq!(a.original_path, first_abs);
    assert_eq!(b.original_path, second_abs);
    assert_ne!(a.fingerprint, b.fingerprint);
    assert_eq!(
        fs::read_to_string(td.path().join("basket/files/report (2).txt")).unwrap(),
        "second"
    );
}

#[test]
fn dry_run_touches_nothing() {
    let td = TempDir::new().unwrap();
    td.child("t/a.txt").write_str("a").unwrap();
    let root = td.path().join("t");
    let mut cfg = Config::new(td.path().join("basket")).with_confirm(ConfirmMode::Never);
    cfg.dry_run = true;

    let report = Remover::new(&cfg, Box::new(allow_all()))
        .remove_trees(&[&root])
        .unwrap();
    let RemovalOutcome::Completed(summary) = &report.outcomes[0].1 else {
        panic!("dry run should complete");
    };
    assert_eq!(summary.would_move.len(), 2);
    assert!(summary.moved.is_empty());
    assert!(root.join("a.txt").exists());
    assert!(!td.path().join("basket").exists());
}

#[test]
fn refuses_paths_inside_the_basket() {
    let td = TempDir::new().unwrap();
    td.child("victim.txt").write_str("v").unwrap();
    let r = remover(&td);
    r.remove_files(&[td.path().join("victim.txt")]).unwrap();

    let entry = td.path().join("basket/files/victim.txt");
    let report = r.remove_files(&[&entry]).unwrap();
    assert!(matches!(
        report.outcomes[0].1,
        RemovalOutcome::Failed(SmartRmError::PermissionDenied { .. })
    ));
    assert!(entry.exists());
}

#[test]
fn tree_containing_the_basket_leaves_basket_and_ancestors() {
    let td = TempDir::new().unwrap();
    td.child("home/notes.txt").write_str("n").unwrap();
    let home = td.path().join("home");
    let cfg = Config::new(home.join("basket")).with_confirm(ConfirmMode::Never);

    let report = Remover::new(&cfg, Box::new(allow_all()))
        .remove_trees(&[&home])
        .unwrap();
    assert!(!report.has_failures());
    assert!(!home.join("notes.txt").exists());
    assert!(home.join("basket/files/notes.txt").exists());
}

#[test]
fn moved_item_keeps_absolute_original() {
    let td = TempDir::new().unwrap();
    td.child("item.txt").write_str("r").unwrap();
    let abs = td.path().join("item.txt");
    let report = remover(&td).remove_files(&[&abs]).unwrap();
    let RemovalOutcome::Completed(summary) = &report.outcomes[0].1 else {
        panic!("expected completion");
    };
    assert!(summary.moved[0].original.is_absolute());
    let files = fs::canonicalize(td.path()).unwrap().join("basket/files");
    assert!(summary.moved[0].dest.starts_with(files));
}

#[test]
fn dot_dot_root_never_walks_into_the_basket() {
    let td = TempDir::new().unwrap();
    td.child("home/sub/keep.txt").write_str("k").unwrap();
    td.child("home/notes.txt").write_str("n").unwrap();
    td.child("old.txt").write_str("o").unwrap();
    let home = fs::canonicalize(td.path()).unwrap().join("home");
    let cfg = Config::new(home.join("basket")).with_confirm(ConfirmMode::Never);
    let r = Remover::new(&cfg, Box::new(allow_all()));
    r.remove_files(&[td.path().join("old.txt")]).unwrap();

    let report = r.remove_trees(&[home.join("sub").join("..")]).unwrap();
    assert!(!report.has_failures());
    let RemovalOutcome::Completed(summary) = &report.outcomes[0].1 else {
        panic!("expected completion");
    };
    assert_eq!(summary.vanished, 0);
    assert!(summary.moved.iter().all(|m| !m.original.starts_with(home.join("basket"))));

    let files = home.join("basket/files");
    assert!(files.join("old.txt").exists());
    assert!(files.join("notes.txt").exists());
    assert!(files.join("keep.txt").exists());
    assert!(!files.join("old (2).txt").exists());
    assert!(!home.join("sub").exists());
    assert!(home.exists(), "the basket keeps its parent in place");

    let rec = TrashRecord::parse(
        &fs::read_to_string(home.join("basket/info/sub.trashinfo")).unwrap(),
    )
    .unwrap();
    assert_eq!(rec.original_path, home.join("sub"));
}

#[cfg(unix)]
#[test]
fn basket_reached_through_symlink_is_refused() {
    let td = TempDir::new().unwrap();
    td.child("victim.txt").write_str("v").unwrap();
    let r = remover(&td);
    r.remove_files(&[td.path().join("victim.txt")]).unwrap();
    let alias = td.path().join("alias");
    std::os::unix::fs::symlink(td.path().join("basket"), &alias).unwrap();

    let entry = alias.join("files/victim.txt");
    let report = r.remove_files(&[&entry]).unwrap();
    assert!(matches!(
        report.outcomes[0].1,
        RemovalOutcome::Failed(SmartRmError::PermissionDenied { .. })
    ));
    assert!(td.path().join("basket/files/victim.txt").exists());
}

#[cfg(unix)]
#[test]
fn newline_in_file_name_does_not_forge_the_record() {
    let td = TempDir::new().unwrap();
    let evil = td.path().join("evil\nPath=injected");
    fs::write(&evil, b"e").unwrap();
    let evil_abs = fs::canonicalize(&evil).unwrap();

    let report = remover(&td).remove_files(&[&evil]).unwrap();
    assert!(!report.has_failures());
    let info = td.path().join("basket/info/evil\nPath=injected.trashinfo");
    let text = fs::read_to_string(info).unwrap();
    assert_eq!(text.lines().filter(|l| l.starts_with("Path=")).count(), 1);
    let rec = TrashRecord::parse(&text).unwrap();
    assert_eq!(rec.original_path, evil_abs);
}

/// Deletes `gone.txt` just before it is moved, as a concurrent process might.
struct RacingMover {
    inner: BasketMover,
}

impl ItemMover for RacingMover {
    fn move_item(&self, item: &CandidatePath, files_dir: &Path) -> smart_rm::Result<MovedItem> {
        if item.path.ends_with("gone.txt") {
            fs::remove_file(&item.path).unwrap();
        }
        self.inner.move_item(item, files_dir)
    }
}

#[test]
fn item_vanishing_after_planning_is_skipped() {
    let td = TempDir::new().unwrap();
    td.child("t/a.txt").write_str("a").unwrap();
    td.child("t/gone.txt").write_str("g").unwrap();
    td.child("t/b/c.txt").write_str("c").unwrap();
    let root = td.path().join("t");
    let r = remover(&td);
    let mover = RacingMover {
        inner: BasketMover::new(r.basket().info_dir()),
    };

    let report = r.with_mover(Box::new(mover)).remove_trees(&[&root]).unwrap();
    assert!(!report.has_failures());
    let RemovalOutcome::Completed(summary) = &report.outcomes[0].1 else {
        panic!("a vanished item is not a failure");
    };
    assert_eq!(summary.vanished, 1);
    assert_eq!(summary.moved.len(), 4);
    assert!(!root.exists());
    assert_eq!(basket_entries(&td, "files"), vec!["a.txt", "b", "c.txt", "t"]);
}

struct BrokenMover;

impl ItemMover for BrokenMover {
    fn move_item(&self, item: &CandidatePath, _files_dir: &Path) -> smart_rm::Result<MovedItem> {
        Err(SmartRmError::Io {
            op: "move to basket",
            path: item.path.clone(),
            source: std::io::Error::other("disk on fire"),
        })
    }
}

#[test]
fn unexpected_io_error_stops_the_batch() {
    let td = TempDir::new().unwrap();
    td.child("a.txt").write_str("a").unwrap();
    td.child("b.txt").write_str("b").unwrap();
    let err = remover(&td)
        .with_mover(Box::new(BrokenMover))
        .remove_files(&[td.path().join("a.txt"), td.path().join("b.txt")])
        .unwrap_err();
    assert!(matches!(err, SmartRmError::Io { .. }));
    assert!(!err.is_recoverable());
    assert!(td.path().join("b.txt").exists());
}
