mod common;

use common::write_file;
use orma::tree::{read_tree, walk_tree, write_tree};
use orma::*;

#[test]
fn snapshot_is_independent_of_creation_order() {
    let a = tempfile::tempdir().unwrap();
    let b = tempfile::tempdir().unwrap();

    for name in ["zeta.txt", "alpha.txt", "sub/m.txt", "sub/b.txt"] {
        write_file(a.path(), name, name.as_bytes());
    }
    for name in ["sub/b.txt", "alpha.txt", "sub/m.txt", "zeta.txt"] {
        write_file(b.path(), name, name.as_bytes());
    }

    let repo_a = common::init_repo(a.path());
    let repo_b = common::init_repo(b.path());
    assert_eq!(repo_a.write_tree().unwrap(), repo_b.write_tree().unwrap());
}

#[test]
fn write_tree_sorts_entries() {
    let dir = tempfile::tempdir().unwrap();
    let odb = ObjectStore::new(dir.path().join("objects"));
    let x = odb.write(ObjectKind::Blob, b"x").unwrap();
    let y = odb.write(ObjectKind::Blob, b"y").unwrap();

    let forward = write_tree(
        &odb,
        vec![TreeEntry::blob("a", x), TreeEntry::blob("b", y)],
    )
    .unwrap();
    let reversed = write_tree(
        &odb,
        vec![TreeEntry::blob("b", y), TreeEntry::blob("a", x)],
    )
    .unwrap();
    assert_eq!(forward, reversed);

    let names: Vec<String> = read_tree(&odb, &forward)
        .unwrap()
        .into_iter()
        .map(|e| e.name)
        .collect();
    assert_eq!(names, vec!["a", "b"]);
}

#[test]
fn empty_directory_is_the_empty_tree() {
    let dir = tempfile::tempdir().unwrap();
    let repo = common::init_repo(dir.path());
    let tree = repo.write_tree().unwrap();
    assert_eq!(tree.to_string(), "4b825dc642cb6eb9a060e54bf8d69288fbee4904");
    assert!(repo.ls_tree(&tree).unwrap().is_empty());
}

#[test]
fn metadata_directory_is_never_tracked() {
    let dir = tempfile::tempdir().unwrap();
    let repo = common::init_repo(dir.path());
    write_file(dir.path(), "file.txt", b"data");
    write_file(dir.path(), "nested/.orma/stray", b"stray");

    let tree = repo.write_tree().unwrap();
    let paths: Vec<String> = walk_tree(repo.odb(), &tree)
        .unwrap()
        .into_iter()
        .map(|(p, _)| p)
        .collect();
    assert_eq!(paths, vec!["file.txt"]);
}

#[test]
fn nested_directories_become_subtrees() {
    let dir = tempfile::tempdir().unwrap();
    let repo = common::init_repo(dir.path());
    write_file(dir.path(), "top.txt", b"top");
    write_file(dir.path(), "a/b/c/deep.txt", b"deep");
    std::fs::create_dir_all(dir.path().join("empty")).unwrap();

    let tree = repo.write_tree().unwrap();
    let root = repo.ls_tree(&tree).unwrap();
    let names: Vec<(&str, bool)> = root.iter().map(|e| (e.name.as_str(), e.is_tree())).collect();
    assert_eq!(names, vec![("a", true), ("empty", true), ("top.txt", false)]);

    let a = root.iter().find(|e| e.name == "a").unwrap();
    assert_eq!(a.mode, MODE_TREE);
    let top = root.iter().find(|e| e.name == "top.txt").unwrap();
    assert_eq!(top.mode, MODE_BLOB);

    let files: Vec<String> = walk_tree(repo.odb(), &tree)
        .unwrap()
        .into_iter()
        .map(|(p, _)| p)
        .collect();
    assert_eq!(files, vec!["a/b/c/deep.txt", "top.txt"]);
}

#[test]
fn identical_files_share_one_blob() {
    let dir = tempfile::tempdir().unwrap();
    let repo = common::init_repo(dir.path());
    write_file(dir.path(), "one.txt", b"same bytes");
    write_file(dir.path(), "two.txt", b"same bytes");

    let tree = repo.write_tree().unwrap();
    let entries = repo.ls_tree(&tree).unwrap();
    assert_eq!(entries[0].oid, entries[1].oid);
    // one blob plus the root tree
    assert_eq!(common::object_count(&repo), 2);
}

#[test]
fn ignore_file_excludes_matches() {
    let dir = tempfile::tempdir().unwrap();
    let repo = common::init_repo(dir.path());
    write_file(dir.path(), ".ormaignore", b"*.log\nbuild/\n!keep.log\n");
    write_file(dir.path(), "main.rs", b"fn main() {}");
    write_file(dir.path(), "debug.log", b"noise");
    write_file(dir.path(), "keep.log", b"wanted");
    write_file(dir.path(), "build/out.bin", b"binary");
    write_file(dir.path(), "src/build", b"a file named build");

    let tree = repo.write_tree().unwrap();
    let files: Vec<String> = walk_tree(repo.odb(), &tree)
        .unwrap()
        .into_iter()
        .map(|(p, _)| p)
        .collect();
    assert_eq!(files, vec![".ormaignore", "keep.log", "main.rs", "src/build"]);
}

#[test]
fn content_change_changes_tree() {
    let dir = tempfile::tempdir().unwrap();
    let repo = common::init_repo(dir.path());
    write_file(dir.path(), "f.txt", b"v1");
    let first = repo.write_tree().unwrap();
    assert_eq!(repo.write_tree().unwrap(), first);

    write_file(dir.path(), "f.txt", b"v2");
    assert_ne!(repo.write_tree().unwrap(), first);
}

#[cfg(unix)]
#[test]
fn symlinks_are_followed_and_dangling_links_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let repo = common::init_repo(dir.path());
    write_file(dir.path(), "real.txt", b"target content");
    std::os::unix::fs::symlink(dir.path().join("real.txt"), dir.path().join("link.txt")).unwrap();
    std::os::unix::fs::symlink(dir.path().join("missing"), dir.path().join("dangling")).unwrap();

    let tree = repo.write_tree().unwrap();
    let entries = repo.ls_tree(&tree).unwrap();
    let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["link.txt", "real.txt"]);
    assert_eq!(entries[0].oid, entries[1].oid);
}

#[test]
fn ls_tree_on_blob_is_not_a_tree() {
    let dir = tempfile::tempdir().unwrap();
    let repo = common::init_repo(dir.path());
    let blob = repo.odb().write(ObjectKind::Blob, b"flat").unwrap();
    assert!(matches!(repo.ls_tree(&blob), Err(Error::NotATree(_))));
}
