use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn idx_pack_cmd() -> Command {
    Command::cargo_bin("idx-pack").unwrap()
}

fn write_artifact(repo: &std::path::Path, group_path: &str, artifact: &str, version: &str) {
    let dir = repo.join(group_path).join(artifact).join(version);
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join(format!("{artifact}-{version}.pom")),
        format!(
            "<project><groupId>org.ex</groupId><artifactId>{artifact}</artifactId><version>{version}</version><packaging>jar</packaging></project>"
        ),
    )
    .unwrap();
    fs::write(dir.join(format!("{artifact}-{version}.jar")), b"DATA").unwrap();
}

#[test]
fn pack_writes_a_full_dump_and_descriptor() {
    let repo = TempDir::new().unwrap();
    write_artifact(repo.path(), "org/ex", "a", "1.0");
    let index = TempDir::new().unwrap();
    let target = TempDir::new().unwrap();

    idx_pack_cmd()
        .args([
            "pack",
            "--repository",
            repo.path().to_str().unwrap(),
            "--index",
            index.path().to_str().unwrap(),
            "--target",
            target.path().to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("nexus-maven-repository-index.gz"));

    assert!(target
        .path()
        .join("nexus-maven-repository-index.gz")
        .exists());
    assert!(target
        .path()
        .join("nexus-maven-repository-index.properties")
        .exists());
}

#[test]
fn pack_with_checksums_emits_sha1_and_md5_siblings() {
    let repo = TempDir::new().unwrap();
    write_artifact(repo.path(), "org/ex", "a", "1.0");
    let index = TempDir::new().unwrap();
    let target = TempDir::new().unwrap();

    idx_pack_cmd()
        .args([
            "pack",
            "--repository",
            repo.path().to_str().unwrap(),
            "--index",
            index.path().to_str().unwrap(),
            "--target",
            target.path().to_str().unwrap(),
            "--checksums",
        ])
        .assert()
        .success();

    assert!(target
        .path()
        .join("nexus-maven-repository-index.gz.sha1")
        .exists());
    assert!(target
        .path()
        .join("nexus-maven-repository-index.gz.md5")
        .exists());
}

#[test]
fn pack_invalid_format_fails_with_exit_code_one() {
    let repo = TempDir::new().unwrap();
    write_artifact(repo.path(), "org/ex", "a", "1.0");
    let index = TempDir::new().unwrap();
    let target = TempDir::new().unwrap();

    idx_pack_cmd()
        .args([
            "pack",
            "--repository",
            repo.path().to_str().unwrap(),
            "--index",
            index.path().to_str().unwrap(),
            "--target",
            target.path().to_str().unwrap(),
            "--format",
            "bogus",
        ])
        .assert()
        .failure()
        .code(1);
}

#[test]
fn pack_target_path_that_is_a_file_fails() {
    let repo = TempDir::new().unwrap();
    write_artifact(repo.path(), "org/ex", "a", "1.0");
    let index = TempDir::new().unwrap();
    let not_a_dir = TempDir::new().unwrap();
    let target_file = not_a_dir.path().join("not-a-directory");
    fs::write(&target_file, b"oops").unwrap();

    idx_pack_cmd()
        .args([
            "pack",
            "--repository",
            repo.path().to_str().unwrap(),
            "--index",
            index.path().to_str().unwrap(),
            "--target",
            target_file.to_str().unwrap(),
        ])
        .assert()
        .failure()
        .code(1);
}

#[test]
fn sequential_packs_against_the_same_index_both_succeed() {
    let repo = TempDir::new().unwrap();
    write_artifact(repo.path(), "org/ex", "a", "1.0");
    let index = TempDir::new().unwrap();
    let target_a = TempDir::new().unwrap();
    let target_b = TempDir::new().unwrap();

    // The write lock is held only for the lifetime of the process, so a
    // second invocation against the same index directory after the first
    // has exited must succeed, not fail.
    idx_pack_cmd()
        .args([
            "pack",
            "--repository",
            repo.path().to_str().unwrap(),
            "--index",
            index.path().to_str().unwrap(),
            "--target",
            target_a.path().to_str().unwrap(),
        ])
        .assert()
        .success();

    idx_pack_cmd()
        .args([
            "pack",
            "--repository",
            repo.path().to_str().unwrap(),
            "--index",
            index.path().to_str().unwrap(),
            "--target",
            target_b.path().to_str().unwrap(),
        ])
        .assert()
        .success();
}
