use crate::common::command::{init_repository_dir, run_twig_command, stdout_of, twig_add};
use crate::common::file::{FileSpec, write_file};
use assert_fs::TempDir;
use pretty_assertions::assert_eq;
use rstest::rstest;

mod common;

#[rstest]
fn clean_repository(init_repository_dir: TempDir) {
    let status = stdout_of(&mut run_twig_command(init_repository_dir.path(), &["status"]));

    assert_eq!(
        status,
        "=== Branches ===\n*master\n\n\
         === Staged Files ===\n\n\
         === Removed Files ===\n\n\
         === Modifications Not Staged For Commit ===\n\n\
         === Untracked Files ===\n\n"
    );
}

#[rstest]
fn every_section_is_filled_and_sorted(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    run_twig_command(dir, &["branch", "zeta"]).assert().success();
    run_twig_command(dir, &["branch", "alpha"]).assert().success();

    // staged, then changed again
    write_file(FileSpec::new(dir.join("staged.txt"), "v1\n".to_string()));
    twig_add(dir, &["staged.txt"]);
    write_file(FileSpec::new(dir.join("staged.txt"), "v2\n".to_string()));

    // staged, then deleted
    write_file(FileSpec::new(dir.join("gone.txt"), "gone\n".to_string()));
    twig_add(dir, &["gone.txt"]);
    std::fs::remove_file(dir.join("gone.txt")).unwrap();

    // tracked and modified
    write_file(FileSpec::new(dir.join("1.txt"), "changed\n".to_string()));

    // tracked and removed
    run_twig_command(dir, &["rm", "a/2.txt"]).assert().success();

    // untracked
    write_file(FileSpec::new(dir.join("b/untracked.txt"), "?\n".to_string()));

    let status = stdout_of(&mut run_twig_command(dir, &["status"]));

    assert_eq!(
        status,
        "=== Branches ===\nalpha\n*master\nzeta\n\n\
         === Staged Files ===\ngone.txt\nstaged.txt\n\n\
         === Removed Files ===\na/2.txt\n\n\
         === Modifications Not Staged For Commit ===\n\
         1.txt (modified)\ngone.txt (deleted)\nstaged.txt (modified)\n\n\
         === Untracked Files ===\nb/untracked.txt\n\n"
    );
}

#[rstest]
fn deleted_tracked_file_is_reported(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    std::fs::remove_file(dir.join("1.txt")).unwrap();

    let status = stdout_of(&mut run_twig_command(dir, &["status"]));

    assert!(status.contains("=== Modifications Not Staged For Commit ===\n1.txt (deleted)\n\n"));
}

#[rstest]
fn removed_file_that_reappears_is_untracked(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    run_twig_command(dir, &["rm", "1.txt"]).assert().success();
    write_file(FileSpec::new(dir.join("1.txt"), "back\n".to_string()));

    let status = stdout_of(&mut run_twig_command(dir, &["status"]));

    assert!(status.contains("=== Removed Files ===\n1.txt\n\n"));
    assert!(status.contains("=== Untracked Files ===\n1.txt\n\n"));
}
