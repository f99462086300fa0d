//! Filesystem behavior against every bundled ledger

use galactic_fs::{
    Entry, FsError, GalacticFs, Layout, Listing, ReadOptions, TreeNode, WriteData, WriteOptions,
};
use galactic_ledger::{MemoryLedger, SqliteLedger};
use parking_lot::Mutex;
use std::sync::Arc;
use tempfile::TempDir;

fn memory_fs() -> GalacticFs {
    GalacticFs::new(Arc::new(MemoryLedger::new()))
}

fn sqlite_fs() -> (TempDir, GalacticFs) {
    let temp = TempDir::new().unwrap();
    let ledger = SqliteLedger::open(&temp.path().join("ledger.sqlite3")).unwrap();
    (temp, GalacticFs::new(Arc::new(ledger)))
}

/// Run a check once per ledger implementation
macro_rules! on_each_ledger {
    ($($name:ident => $check:ident),* $(,)?) => {
        mod memory {
            $(
                #[tokio::test]
                async fn $name() {
                    super::$check(super::memory_fs()).await;
                }
            )*
        }

        mod sqlite {
            $(
                #[tokio::test]
                async fn $name() {
                    let (_temp, fs) = super::sqlite_fs();
                    super::$check(fs).await;
                }
            )*
        }
    };
}

on_each_ledger! {
    round_trip => check_round_trip,
    delete_is_idempotent => check_delete_is_idempotent,
    append => check_append,
    overwrite_guard => check_overwrite_guard,
    folder_enumeration => check_folder_enumeration,
    recursive_copy => check_recursive_copy,
    recursive_move => check_recursive_move,
    glob_read => check_glob_read,
    tree_reconstruction => check_tree_reconstruction,
    depth_filter => check_depth_filter,
    filter_and_sort => check_filter_and_sort,
    watch_filtering => check_watch_filtering,
    folder_delete => check_folder_delete,
}

fn opts() -> WriteOptions {
    WriteOptions::default()
}

async fn text_of(fs: &GalacticFs, path: &str) -> String {
    fs.read(path)
        .await
        .unwrap()
        .into_file()
        .unwrap()
        .text()
        .await
        .unwrap()
}

async fn check_round_trip(fs: GalacticFs) {
    for (path, content) in [
        ("/test.txt", "Hello, World!"),
        ("/deep/nested/path/file.md", "# Title\n\nbody"),
        ("/unicode/ファイル.txt", "こんにちは"),
        ("/empty.txt", ""),
    ] {
        fs.write(path, content, opts()).await.unwrap();
        assert_eq!(text_of(&fs, path).await, content, "content of {}", path);
    }
}

async fn check_delete_is_idempotent(fs: GalacticFs) {
    assert_eq!(fs.delete("/missing.txt").await.unwrap(), 0);
    assert_eq!(fs.delete("/missing/").await.unwrap(), 0);

    fs.write("/once.txt", "x", opts()).await.unwrap();
    assert_eq!(fs.delete("/once.txt").await.unwrap(), 1);
    assert_eq!(fs.delete("/once.txt").await.unwrap(), 0);
    assert!(fs.read("/once.txt").await.unwrap_err().is_not_found());
}

async fn check_append(fs: GalacticFs) {
    fs.write("/log.txt", "first line\n", opts()).await.unwrap();
    fs.write("/log.txt", "second line\n", WriteOptions::append())
        .await
        .unwrap();
    assert_eq!(text_of(&fs, "/log.txt").await, "first line\nsecond line\n");

    // Appending to a missing file just writes it
    fs.write("/new.txt", "only", WriteOptions::append())
        .await
        .unwrap();
    assert_eq!(text_of(&fs, "/new.txt").await, "only");
}

async fn check_overwrite_guard(fs: GalacticFs) {
    fs.write("/keep.txt", "original", opts()).await.unwrap();

    let err = fs
        .write("/keep.txt", "replacement", WriteOptions::no_overwrite())
        .await
        .unwrap_err();
    assert!(matches!(err, FsError::AlreadyExists(ref p) if p == "/keep.txt"));
    assert_eq!(text_of(&fs, "/keep.txt").await, "original");

    fs.write("/fresh.txt", "ok", WriteOptions::no_overwrite())
        .await
        .unwrap();
}

async fn check_folder_enumeration(fs: GalacticFs) {
    fs.write(
        "/folder/",
        WriteData::tree([
            ("file1.txt", "content1"),
            ("file2.txt", "content2"),
            ("file3.txt", "content3"),
        ]),
        opts(),
    )
    .await
    .unwrap();

    let folder = fs.read("/folder/").await.unwrap().into_folder().unwrap();
    let Listing::Array(entries) = folder.get(Layout::Array) else {
        panic!("expected array listing");
    };
    assert_eq!(entries.len(), 3);

    for (i, entry) in entries.iter().enumerate() {
        let file = entry.as_file().unwrap();
        assert_eq!(file.path(), format!("/folder/file{}.txt", i + 1));
        assert_eq!(file.text().await.unwrap(), format!("content{}", i + 1));
    }
}

async fn write_nested(fs: &GalacticFs) {
    fs.write(
        "/f/",
        WriteData::tree([
            ("top.txt", WriteData::from("top")),
            ("sub/", WriteData::tree([("x.txt", "nested")])),
        ]),
        opts(),
    )
    .await
    .unwrap();
}

async fn check_recursive_copy(fs: GalacticFs) {
    write_nested(&fs).await;
    fs.copy("/f/", "/g/", opts()).await.unwrap();

    assert_eq!(text_of(&fs, "/g/sub/x.txt").await, "nested");
    assert_eq!(text_of(&fs, "/g/top.txt").await, "top");
    assert!(fs.read("/g/sub/").await.unwrap().is_folder());

    // Source is untouched
    assert_eq!(text_of(&fs, "/f/sub/x.txt").await, "nested");

    // A destination without a trailing separator is still a folder
    fs.copy("/f/", "/h", opts()).await.unwrap();
    assert_eq!(text_of(&fs, "/h/sub/x.txt").await, "nested");

    // Single files copy verbatim
    fs.copy("/f/top.txt", "/top-copy.txt", opts()).await.unwrap();
    assert_eq!(text_of(&fs, "/top-copy.txt").await, "top");
}

async fn check_recursive_move(fs: GalacticFs) {
    write_nested(&fs).await;
    fs.move_to("/f/", "/g/", opts()).await.unwrap();

    assert_eq!(text_of(&fs, "/g/sub/x.txt").await, "nested");
    assert!(fs.read("/f/sub/x.txt").await.unwrap_err().is_not_found());
    assert!(fs.read("/f/").await.unwrap_err().is_not_found());

    fs.move_to("/g/top.txt", "/renamed.txt", opts()).await.unwrap();
    assert_eq!(text_of(&fs, "/renamed.txt").await, "top");
    assert!(fs.read("/g/top.txt").await.unwrap_err().is_not_found());
}

async fn check_glob_read(fs: GalacticFs) {
    for path in ["/a1.txt", "/a2.txt", "/b.txt"] {
        fs.write(path, "x", opts()).await.unwrap();
    }

    let matches = fs.read("/a*").await.unwrap().into_folder().unwrap();
    let paths: Vec<&str> = matches.entries().iter().map(Entry::path).collect();
    assert_eq!(paths, vec!["/a1.txt", "/a2.txt"]);

    let none = fs.read("/z*").await.unwrap().into_folder().unwrap();
    assert!(none.is_empty());
}

async fn check_tree_reconstruction(fs: GalacticFs) {
    fs.write("/t/x.txt", "x", opts()).await.unwrap();
    fs.write("/t/sub/y.txt", "y", opts()).await.unwrap();

    let folder = fs.read("/t/").await.unwrap().into_folder().unwrap();
    let tree = folder.tree();

    let keys: Vec<&str> = tree.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["sub", "x.txt"]);
    assert_eq!(tree["x.txt"].as_file().unwrap().path(), "/t/x.txt");

    let TreeNode::Folder { folder, children } = &tree["sub"] else {
        panic!("expected a folder node");
    };
    // No marker was written for /t/sub/
    assert!(folder.is_none());
    assert_eq!(children["y.txt"].as_file().unwrap().path(), "/t/sub/y.txt");
}

async fn check_depth_filter(fs: GalacticFs) {
    fs.write("/d/one.txt", "1", opts()).await.unwrap();
    fs.write("/d/a/two.txt", "2", opts()).await.unwrap();
    fs.write("/d/a/b/three.txt", "3", opts()).await.unwrap();

    let shallow = fs
        .read(ReadOptions::new("/d/").depth(1))
        .await
        .unwrap()
        .into_folder()
        .unwrap();
    let paths: Vec<&str> = shallow.entries().iter().map(Entry::path).collect();
    assert_eq!(paths, vec!["/d/one.txt"]);

    let deeper = fs
        .read(ReadOptions::new("/d/").depth(2))
        .await
        .unwrap()
        .into_folder()
        .unwrap();
    assert_eq!(deeper.len(), 2);

    let all = fs.read("/d/").await.unwrap().into_folder().unwrap();
    assert_eq!(all.len(), 3);
}

async fn check_filter_and_sort(fs: GalacticFs) {
    fs.write(
        "/s/",
        WriteData::tree([
            ("b.txt", WriteData::from("bb")),
            ("a.md", WriteData::from("a")),
            ("c.txt", WriteData::from("ccc")),
        ]),
        opts(),
    )
    .await
    .unwrap();

    let folder = fs
        .read(
            ReadOptions::new("/s/")
                .filter(|entry| entry.name().ends_with(".txt"))
                .sort(|a, b| b.path().cmp(a.path())),
        )
        .await
        .unwrap()
        .into_folder()
        .unwrap();

    let names: Vec<&str> = folder.entries().iter().map(Entry::name).collect();
    assert_eq!(names, vec!["c.txt", "b.txt"]);
}

async fn check_watch_filtering(fs: GalacticFs) {
    let seen = Arc::new(Mutex::new(Vec::<String>::new()));
    let sink = seen.clone();
    let subscription = fs
        .watch("/a*")
        .unwrap()
        .subscribe(move |entries| {
            assert!(!entries.is_empty());
            sink.lock()
                .extend(entries.into_iter().map(|e| e.path().to_string()));
        })
        .unwrap();

    fs.write("/b.txt", "ignored", opts()).await.unwrap();
    fs.write("/a1.txt", "seen", opts()).await.unwrap();
    fs.write("/other/a.txt", "ignored", opts()).await.unwrap();
    fs.delete("/a1.txt").await.unwrap();

    assert_eq!(*seen.lock(), vec!["/a1.txt", "/a1.txt"]);

    subscription.unsubscribe();
    fs.write("/a2.txt", "late", opts()).await.unwrap();
    assert_eq!(seen.lock().len(), 2);
}

async fn check_folder_delete(fs: GalacticFs) {
    write_nested(&fs).await;
    fs.write("/f-sibling.txt", "stays", opts()).await.unwrap();

    // marker, top.txt, sub/ marker, sub/x.txt
    assert_eq!(fs.delete("/f/").await.unwrap(), 4);
    assert!(fs.read("/f/").await.unwrap_err().is_not_found());
    assert_eq!(text_of(&fs, "/f-sibling.txt").await, "stays");
}

#[tokio::test]
async fn sqlite_ledger_persists_across_reopen() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("ledger.sqlite3");

    {
        let fs = GalacticFs::new(Arc::new(SqliteLedger::open(&path).unwrap()));
        write_nested(&fs).await;
    }

    let fs = GalacticFs::new(Arc::new(SqliteLedger::open(&path).unwrap()));
    assert_eq!(text_of(&fs, "/f/sub/x.txt").await, "nested");
    assert!(fs.capabilities().persistent);
}

#[tokio::test]
async fn memory_ledger_is_not_persistent() {
    let fs = memory_fs();
    let caps = fs.capabilities();
    assert!(!caps.persistent);
    assert!(caps.writeable);
}
