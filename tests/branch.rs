use crate::common::command::{
    branch_commit_id, commit_files, head_commit_id, init_repository_dir, run_twig_command,
};
use assert_fs::TempDir;
use assert_fs::prelude::*;
use predicates::prelude::predicate;
use pretty_assertions::assert_eq;
use rstest::rstest;

mod common;

#[rstest]
fn branch_points_at_head_without_switching(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();

    run_twig_command(dir, &["branch", "feature/login"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    assert_eq!(branch_commit_id(dir, "feature/login"), head_commit_id(dir));
    init_repository_dir
        .child(".twig/HEAD")
        .assert("ref: refs/heads/master");

    // new commits only move the current branch
    commit_files(dir, &[("3.txt", "three\n")], "Third file");
    assert_eq!(branch_commit_id(dir, "master"), head_commit_id(dir));
    assert_ne!(branch_commit_id(dir, "feature/login"), head_commit_id(dir));
}

#[rstest]
fn creating_an_existing_branch_fails(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    run_twig_command(dir, &["branch", "other"]).assert().success();

    run_twig_command(dir, &["branch", "other"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "A branch with that name already exists.",
        ));
    run_twig_command(dir, &["branch", "master"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "A branch with that name already exists.",
        ));
}

#[rstest]
#[case("bad name")]
#[case("..")]
#[case("trailing/")]
#[case("ends.lock")]
fn invalid_branch_names_are_rejected(init_repository_dir: TempDir, #[case] name: &str) {
    run_twig_command(init_repository_dir.path(), &["branch", name])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid branch name"));
}

#[rstest]
fn rm_branch_deletes_only_the_pointer(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    run_twig_command(dir, &["branch", "topic/one"]).assert().success();
    let topic_oid = branch_commit_id(dir, "topic/one");

    run_twig_command(dir, &["rm-branch", "topic/one"])
        .assert()
        .success();

    init_repository_dir
        .child(".twig/refs/heads/topic")
        .assert(predicate::path::missing());
    // the commit itself is still reachable by id
    run_twig_command(dir, &["checkout", &topic_oid.to_short_oid(), "--", "1.txt"])
        .assert()
        .success();
}

#[rstest]
fn rm_branch_of_a_missing_branch_fails(init_repository_dir: TempDir) {
    run_twig_command(init_repository_dir.path(), &["rm-branch", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "A branch with that name does not exist.",
        ));
}

#[rstest]
fn rm_branch_of_the_current_branch_fails(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();

    run_twig_command(dir, &["rm-branch", "master"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot remove the current branch."));

    assert_eq!(branch_commit_id(dir, "master"), head_commit_id(dir));
}

#[rstest]
#[case("topic", "topic/one")]
#[case("topic/one", "topic")]
fn branch_names_nesting_into_each_other_clash(
    init_repository_dir: TempDir,
    #[case] existing: &str,
    #[case] new: &str,
) {
    let dir = init_repository_dir.path();
    run_twig_command(dir, &["branch", existing]).assert().success();

    run_twig_command(dir, &["branch", new])
        .assert()
        .failure()
        .stderr(predicate::str::contains(format!(
            "Cannot create branch {}: it clashes with refs/heads/{}.",
            new, existing
        )));

    assert_eq!(branch_commit_id(dir, existing), head_commit_id(dir));
}
