use std::path::Path;

use orma::*;

pub fn init_repo(dir: &Path) -> Repository {
    let (repo, outcome) = Repository::init(dir, OpenOptions::default()).unwrap();
    assert_eq!(outcome, InitOutcome::Created);
    repo
}

#[allow(dead_code)]
pub fn write_file(root: &Path, rel: &str, content: &[u8]) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
}

#[allow(dead_code)]
pub fn read_file(root: &Path, rel: &str) -> Vec<u8> {
    std::fs::read(root.join(rel)).unwrap()
}

/// Number of object files under `.orma/objects`.
#[allow(dead_code)]
pub fn object_count(repo: &Repository) -> usize {
    let mut count = 0;
    for shard in std::fs::read_dir(repo.odb().dir()).unwrap() {
        let shard = shard.unwrap();
        if shard.file_type().unwrap().is_dir() {
            count += std::fs::read_dir(shard.path()).unwrap().count();
        }
    }
    count
}

#[allow(dead_code)]
pub fn repo_with_saves(dir: &Path, messages: &[&str]) -> (Repository, Vec<Oid>) {
    let repo = init_repo(dir);
    let mut commits = Vec::new();
    for (i, message) in messages.iter().enumerate() {
        write_file(dir, "counter.txt", format!("{}", i).as_bytes());
        commits.push(repo.save(message).unwrap().commit);
    }
    (repo, commits)
}
