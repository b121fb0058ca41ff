use super::*;
use std::os::unix::fs::symlink;

fn follow_options() -> CompareOptions {
    let mut options = CompareOptions::default();
    options.follow_symlinks = true;
    options
}

#[test]
fn symlink_back_to_root_terminates_with_error_entry() {
    let (_temp, first, second) = tree_pair();
    fs::write(first.join("a.txt"), "a").unwrap();
    fs::write(second.join("a.txt"), "a").unwrap();
    symlink(&first, first.join("back")).unwrap();
    symlink(&second, second.join("back")).unwrap();

    let report = compare_with(&first, &second, &follow_options());

    let back = entry_for(&report, "back");
    assert_eq!(back.status, FileStatus::ComparisonError);
    assert!(
        back.cause
            .as_deref()
            .unwrap_or("")
            .contains("traversal loop detected")
    );
    // The cycle was cut, nothing below the link was walked.
    assert_eq!(
        report
            .entries
            .iter()
            .filter(|e| e.path.starts_with("back"))
            .count(),
        1
    );
}

#[test]
fn loop_on_one_side_only_is_still_cut() {
    let (_temp, first, second) = tree_pair();
    symlink(&first, first.join("cycle")).unwrap();
    fs::create_dir(second.join("cycle")).unwrap();

    let report = compare_with(&first, &second, &follow_options());

    let cycle = entry_for(&report, "cycle");
    assert_eq!(cycle.status, FileStatus::ComparisonError);
}

#[test]
fn nested_symlink_loop_names_the_ancestor() {
    let (_temp, first, second) = tree_pair();
    for root in [&first, &second] {
        fs::create_dir_all(root.join("a/b")).unwrap();
        symlink(root.join("a"), root.join("a/b/up")).unwrap();
    }

    let report = compare_with(&first, &second, &follow_options());

    let up = entry_for(&report, "a/b/up");
    assert_eq!(up.status, FileStatus::ComparisonError);
    assert!(up.cause.as_deref().unwrap_or("").contains("cycles back to"));
    assert_eq!(entry_for(&report, "a/b").status, FileStatus::Identical);
}

#[test]
fn sibling_links_to_a_shared_target_are_not_a_loop() {
    let (_temp, first, second) = tree_pair();
    for root in [&first, &second] {
        fs::create_dir(root.join("shared")).unwrap();
        fs::write(root.join("shared/data.txt"), "d").unwrap();
        symlink(root.join("shared"), root.join("l1")).unwrap();
        symlink(root.join("shared"), root.join("l2")).unwrap();
    }

    let report = compare_with(&first, &second, &follow_options());

    assert_eq!(report.counts.comparison_error, 0);
    assert_eq!(entry_for(&report, "l1/data.txt").status, FileStatus::Identical);
    assert_eq!(entry_for(&report, "l2/data.txt").status, FileStatus::Identical);
}

#[test]
fn unfollowed_loop_symlink_is_just_a_symlink() {
    let (_temp, first, second) = tree_pair();
    symlink(&first, first.join("back")).unwrap();
    symlink(&second, second.join("back")).unwrap();

    let report = compare(&first, &second);

    // Targets differ (absolute paths into different roots), but nothing
    // loops because links are not followed.
    let back = entry_for(&report, "back");
    assert_eq!(back.first_type, FileType::Symlink);
    assert_eq!(back.status, FileStatus::Different);
}
