use crate::common::file::{FileSpec, write_file};
use assert_cmd::Command;
use assert_fs::TempDir;
use rstest::fixture;
use std::path::Path;
use twig::areas::repository::Repository;
use twig::artifacts::objects::commit::Commit;
use twig::artifacts::objects::object_id::ObjectId;

/// Timestamp of every commit made through `run_twig_command`
pub const COMMIT_DATE: &str = "2023-01-01 12:00:00 +0000";

/// `COMMIT_DATE` as printed by `log`
pub const READABLE_COMMIT_DATE: &str = "Sun Jan 1 12:00:00 2023 +0000";

#[fixture]
pub fn repository_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

/// Repository with `1.txt` and `a/2.txt` committed on master
#[fixture]
pub fn init_repository_dir(repository_dir: TempDir) -> TempDir {
    run_twig_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    write_file(FileSpec::new(
        repository_dir.path().join("1.txt"),
        "one\n".to_string(),
    ));
    write_file(FileSpec::new(
        repository_dir.path().join("a").join("2.txt"),
        "two\n".to_string(),
    ));

    twig_add(repository_dir.path(), &["1.txt", "a/2.txt"]);
    twig_commit(repository_dir.path(), "Initial files")
        .assert()
        .success();

    repository_dir
}

pub fn run_twig_command(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("twig").expect("Failed to find twig binary");
    cmd.envs(vec![
        ("NO_PAGER", "1"),
        ("NO_COLOR", "1"),
        ("TWIG_COMMIT_DATE", COMMIT_DATE),
    ]);
    cmd.current_dir(dir);
    for arg in args {
        cmd.arg(arg);
    }
    cmd
}

pub fn twig_commit(dir: &Path, message: &str) -> Command {
    run_twig_command(dir, &["commit", message])
}

/// Stage every given path, asserting success
pub fn twig_add(dir: &Path, paths: &[&str]) {
    for path in paths {
        run_twig_command(dir, &["add", path]).assert().success();
    }
}

/// Write, stage and commit files in one go
pub fn commit_files(dir: &Path, files: &[(&str, &str)], message: &str) {
    for (path, content) in files {
        write_file(FileSpec::new(dir.join(path), content.to_string()));
        twig_add(dir, &[*path]);
    }
    twig_commit(dir, message).assert().success();
}

pub fn stdout_of(cmd: &mut Command) -> String {
    let output = cmd.output().expect("Failed to run twig");
    assert!(
        output.status.success(),
        "twig failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).expect("stdout is not UTF-8")
}

fn open_repository(dir: &Path) -> Repository {
    Repository::new(dir, Box::new(std::io::sink())).expect("Failed to open repository")
}

pub fn head_commit_id(dir: &Path) -> ObjectId {
    open_repository(dir)
        .head_oid()
        .expect("Failed to read HEAD")
}

pub fn branch_commit_id(dir: &Path, branch: &str) -> ObjectId {
    let ref_path = dir.join(".twig").join("refs").join("heads").join(branch);
    let content = std::fs::read_to_string(ref_path).expect("Failed to read branch");
    ObjectId::try_parse(content.trim().to_string()).expect("Invalid branch content")
}

pub fn load_commit(dir: &Path, oid: &ObjectId) -> Commit {
    open_repository(dir)
        .load_commit(oid)
        .expect("Failed to load commit")
}
