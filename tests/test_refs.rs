mod common;

use orma::refs::{self, read_ref};
use orma::*;

#[test]
fn init_points_head_at_main() {
    let dir = tempfile::tempdir().unwrap();
    let repo = common::init_repo(dir.path());

    assert_eq!(repo.head().unwrap(), Head::Symbolic("refs/heads/main".into()));
    assert_eq!(repo.current_branch().unwrap().as_deref(), Some("main"));
    let text = std::fs::read_to_string(dir.path().join(".orma/HEAD")).unwrap();
    assert_eq!(text, "ref: refs/heads/main\n");
    // no branch file until the first save
    assert!(!dir.path().join(".orma/refs/heads/main").exists());
}

#[test]
fn save_writes_branch_file() {
    let dir = tempfile::tempdir().unwrap();
    let repo = common::init_repo(dir.path());
    let saved = repo.save("first").unwrap();

    let text = std::fs::read_to_string(dir.path().join(".orma/refs/heads/main")).unwrap();
    assert_eq!(text.trim(), saved.commit.to_string());
    assert_eq!(
        read_ref(repo.meta_dir(), "refs/heads/main").unwrap(),
        Some(saved.commit)
    );
}

#[test]
fn custom_branch_name() {
    let dir = tempfile::tempdir().unwrap();
    let (repo, _) = Repository::init(
        dir.path(),
        OpenOptions {
            branch: Some("feature/x".into()),
            ..Default::default()
        },
    )
    .unwrap();
    let saved = repo.save("on feature").unwrap();
    assert_eq!(repo.current_branch().unwrap().as_deref(), Some("feature/x"));
    assert!(dir.path().join(".orma/refs/heads/feature/x").is_file());
    assert_eq!(repo.resolve_head().unwrap(), Some(saved.commit));
}

#[test]
fn detached_head_is_followed_and_advanced() {
    let dir = tempfile::tempdir().unwrap();
    let (repo, commits) = common::repo_with_saves(dir.path(), &["one", "two"]);
    refs::set_head(repo.meta_dir(), &Head::Detached(commits[0])).unwrap();

    assert_eq!(repo.head().unwrap(), Head::Detached(commits[0]));
    assert_eq!(repo.current_branch().unwrap(), None);
    assert_eq!(repo.resolve_head().unwrap(), Some(commits[0]));
    assert_eq!(repo.history(HistoryOptions::default()).unwrap().len(), 1);

    let next = repo.save("detached save").unwrap();
    assert_eq!(next.parent, Some(commits[0]));
    assert_eq!(repo.head().unwrap(), Head::Detached(next.commit));

    // the branch did not move
    assert_eq!(
        read_ref(repo.meta_dir(), "refs/heads/main").unwrap(),
        Some(commits[1])
    );
}

#[test]
fn corrupt_branch_file_is_missing_reference() {
    let dir = tempfile::tempdir().unwrap();
    let (repo, _) = common::repo_with_saves(dir.path(), &["one"]);
    std::fs::write(dir.path().join(".orma/refs/heads/main"), "not-a-hash").unwrap();

    assert!(matches!(repo.resolve_head(), Err(Error::MissingReference(_))));
    assert!(matches!(
        repo.history(HistoryOptions::default()),
        Err(Error::MissingReference(_))
    ));
}

#[test]
fn truncated_branch_file_is_missing_reference() {
    let dir = tempfile::tempdir().unwrap();
    let (repo, commits) = common::repo_with_saves(dir.path(), &["one"]);
    let hex = commits[0].to_string();
    std::fs::write(dir.path().join(".orma/refs/heads/main"), &hex[..20]).unwrap();
    assert!(matches!(repo.resolve_head(), Err(Error::MissingReference(_))));
}

#[test]
fn garbage_head_is_missing_reference() {
    let dir = tempfile::tempdir().unwrap();
    let repo = common::init_repo(dir.path());
    std::fs::write(dir.path().join(".orma/HEAD"), "garbage").unwrap();
    assert!(matches!(repo.head(), Err(Error::MissingReference(_))));

    std::fs::remove_file(dir.path().join(".orma/HEAD")).unwrap();
    assert!(matches!(repo.head(), Err(Error::MissingReference(_))));
}

#[test]
fn reflog_records_saves_and_reverts() {
    let dir = tempfile::tempdir().unwrap();
    let (repo, commits) = common::repo_with_saves(dir.path(), &["one", "two"]);
    repo.revert(&commits[0], RevertOptions::default()).unwrap();

    let log = repo.reflog().unwrap();
    assert_eq!(log.len(), 3);

    assert_eq!(log[0].old_sha, refs_zero());
    assert_eq!(log[0].new_sha, commits[0].to_string());
    assert_eq!(log[0].message, "save: one");
    assert_eq!(log[0].committer, "orma <orma@localhost>");

    assert_eq!(log[1].old_sha, commits[0].to_string());
    assert_eq!(log[1].new_sha, commits[1].to_string());

    assert_eq!(log[2].old_sha, commits[1].to_string());
    assert_eq!(log[2].new_sha, commits[0].to_string());
    assert_eq!(log[2].message, format!("revert: moving to {}", commits[0]));
}

#[test]
fn reflog_empty_before_first_save() {
    let dir = tempfile::tempdir().unwrap();
    let repo = common::init_repo(dir.path());
    assert!(repo.reflog().unwrap().is_empty());
}

fn refs_zero() -> String {
    orma::reflog::ZERO_SHA.to_string()
}
