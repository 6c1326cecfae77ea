use crate::common::command::{repository_dir, run_twig_command};
use assert_fs::TempDir;
use assert_fs::prelude::*;
use predicates::prelude::predicate;
use rstest::rstest;

mod common;

#[rstest]
fn init_creates_the_repository_layout(repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let dir_absolute_path = repository_dir.path().canonicalize()?.display().to_string();

    run_twig_command(repository_dir.path(), &["init"])
        .assert()
        .success()
        .stdout(predicate::str::is_match(
            r"^Initialized empty twig repository in .+\n$",
        )?)
        .stdout(predicate::str::contains(dir_absolute_path));

    repository_dir
        .child(".twig/HEAD")
        .assert("ref: refs/heads/master");
    repository_dir
        .child(".twig/refs/heads/master")
        .assert(predicate::path::is_file());
    repository_dir
        .child(".twig/index")
        .assert(predicate::path::is_file());
    repository_dir
        .child(".twig/objects")
        .assert(predicate::path::is_dir());

    Ok(())
}

#[rstest]
fn init_starts_with_the_epoch_commit(repository_dir: TempDir) {
    run_twig_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    run_twig_command(repository_dir.path(), &["log"])
        .assert()
        .success()
        .stdout(predicate::str::is_match(
            r"^===\ncommit [0-9a-f]{40}\nDate: Thu Jan 1 00:00:00 1970 \+0000\ninitial commit\n\n$",
        ).unwrap());
}

#[rstest]
fn the_initial_commit_is_the_same_everywhere(repository_dir: TempDir) {
    let other_dir = TempDir::new().expect("Failed to create temp dir");

    for dir in [repository_dir.path(), other_dir.path()] {
        run_twig_command(dir, &["init"]).assert().success();
    }

    let read_master =
        |dir: &std::path::Path| std::fs::read_to_string(dir.join(".twig/refs/heads/master")).unwrap();
    assert_eq!(read_master(repository_dir.path()), read_master(other_dir.path()));
}

#[rstest]
fn init_twice_fails(repository_dir: TempDir) {
    run_twig_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    run_twig_command(repository_dir.path(), &["init"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains(
            "A twig version-control system already exists in the current directory.",
        ));
}

#[rstest]
#[case(&["status"])]
#[case(&["log"])]
#[case(&["add", "file.txt"])]
#[case(&["commit", "message"])]
#[case(&["merge", "other"])]
fn commands_outside_a_repository_fail(repository_dir: TempDir, #[case] args: &[&str]) {
    run_twig_command(repository_dir.path(), args)
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Not in an initialized twig directory.",
        ));

    repository_dir
        .child(".twig")
        .assert(predicate::path::missing());
}
