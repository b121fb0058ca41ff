mod common;

use common::{dirdelta_cmd, tree_pair, write_both};
use predicates::prelude::*;
use std::fs;

#[test]
fn identical_trees_exit_zero() {
    let (_temp, first, second) = tree_pair();
    write_both(&first, &second, "file.txt", "hello");

    dirdelta_cmd(&first, &second)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 identical"));
}

#[test]
fn extra_file_is_reported_and_exits_one() {
    let (_temp, first, second) = tree_pair();
    write_both(&first, &second, "file.txt", "hello");
    fs::write(second.join("x"), "extra").unwrap();

    dirdelta_cmd(&first, &second)
        .assert()
        .code(1)
        .stdout(predicate::str::contains(">  x"))
        .stdout(predicate::str::contains("1 only in second"));
}

#[test]
fn changed_file_shows_size_detail() {
    let (_temp, first, second) = tree_pair();
    fs::create_dir(first.join("docs")).unwrap();
    fs::create_dir(second.join("docs")).unwrap();
    fs::write(first.join("docs/report.txt"), "hello").unwrap();
    fs::write(second.join("docs/report.txt"), "hello!").unwrap();

    dirdelta_cmd(&first, &second)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("!  docs/report.txt"))
        .stdout(predicate::str::contains("size: 5 bytes -> 6 bytes"));
}

#[test]
fn type_mismatch_is_flagged() {
    let (_temp, first, second) = tree_pair();
    fs::create_dir(first.join("docs")).unwrap();
    fs::write(second.join("docs"), "i am a file").unwrap();

    dirdelta_cmd(&first, &second)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("T  docs"))
        .stdout(predicate::str::contains("first: directory"))
        .stdout(predicate::str::contains("second: file"));
}

#[test]
fn identical_entries_hidden_by_default() {
    let (_temp, first, second) = tree_pair();
    write_both(&first, &second, "quiet.txt", "same");
    fs::write(first.join("loud.txt"), "only here").unwrap();

    dirdelta_cmd(&first, &second)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("quiet.txt").not())
        .stdout(predicate::str::contains("<  loud.txt"));
}

#[test]
fn all_flag_shows_identical_entries() {
    let (_temp, first, second) = tree_pair();
    write_both(&first, &second, "quiet.txt", "same");

    dirdelta_cmd(&first, &second)
        .arg("--all")
        .assert()
        .success()
        .stdout(predicate::str::contains(".  quiet.txt"));
}

#[test]
fn expand_unique_flag_lists_one_sided_directory_contents() {
    let (_temp, first, second) = tree_pair();
    fs::create_dir(first.join("solo")).unwrap();
    fs::write(first.join("solo/nested.txt"), "n").unwrap();

    dirdelta_cmd(&first, &second)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("<  solo"))
        .stdout(predicate::str::contains("solo/nested.txt").not());

    dirdelta_cmd(&first, &second)
        .arg("--expand-unique")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("<  solo/nested.txt"))
        .stdout(predicate::str::contains("2 only in first"));
}

#[test]
fn content_flag_detects_silent_change() {
    use filetime::{FileTime, set_file_mtime};

    let (_temp, first, second) = tree_pair();
    fs::write(first.join("f.txt"), "aaaa").unwrap();
    fs::write(second.join("f.txt"), "bbbb").unwrap();
    let mtime = FileTime::from_unix_time(1_000_000_000, 0);
    set_file_mtime(first.join("f.txt"), mtime).unwrap();
    set_file_mtime(second.join("f.txt"), mtime).unwrap();

    dirdelta_cmd(&first, &second).assert().success();

    dirdelta_cmd(&first, &second)
        .arg("--content")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("!  f.txt"));
}

#[test]
fn missing_root_exits_255() {
    let (temp, first, _second) = tree_pair();

    dirdelta_cmd(&first, &temp.path().join("gone"))
        .assert()
        .code(255)
        .stderr(predicate::str::contains("existing directory"));
}

#[test]
fn same_root_twice_exits_255() {
    let (_temp, first, _second) = tree_pair();

    dirdelta_cmd(&first, &first)
        .assert()
        .code(255)
        .stderr(predicate::str::contains("same directory"));
}

#[test]
fn repeated_runs_print_the_same_digest() {
    let (_temp, first, second) = tree_pair();
    write_both(&first, &second, "a.txt", "a");
    fs::write(first.join("b.txt"), "b").unwrap();

    let first_run = dirdelta_cmd(&first, &second).output().unwrap();
    let second_run = dirdelta_cmd(&first, &second).output().unwrap();

    assert_eq!(first_run.stdout, second_run.stdout);
}
