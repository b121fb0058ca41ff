use crate::compare::FileStatus;
use crate::entry::FileType;
use crate::report::{ComparisonEntry, ComparisonReport};
use std::path::Path;

/// Prints one line per entry plus detail lines for differences.
///
/// Identical entries are skipped unless `show_identical` is set; the
/// report itself always carries them.
pub fn print_report(report: &ComparisonReport, show_identical: bool) {
    for entry in &report.entries {
        if !show_identical && entry.status == FileStatus::Identical {
            continue;
        }

        println!("{:<2} {}", entry.status_code(), display_path(&entry.path));

        for line in format_detail_lines(entry) {
            println!("{}", line);
        }
    }
}

pub fn print_summary(report: &ComparisonReport) {
    let counts = &report.counts;
    println!();
    println!(
        "Compared {} entries: {} identical, {} different, {} only in first, \
         {} only in second, {} type mismatches, {} errors",
        counts.total(),
        counts.identical,
        counts.different,
        counts.only_in_first,
        counts.only_in_second,
        counts.type_mismatch,
        counts.comparison_error
    );
    println!("Digest: {}", report.digest());
}

fn display_path(path: &Path) -> String {
    if path.as_os_str().is_empty() {
        ".".to_string()
    } else {
        path.display().to_string()
    }
}

fn format_detail_lines(entry: &ComparisonEntry) -> Vec<String> {
    match entry.status {
        FileStatus::Identical => Vec::new(),
        FileStatus::OnlyInFirst => {
            vec![format!("   first: {}", format_side(entry, Side::First))]
        }
        FileStatus::OnlyInSecond => {
            vec![format!("   second: {}", format_side(entry, Side::Second))]
        }
        FileStatus::TypeMismatch => vec![
            format!("   first: {}", format_side(entry, Side::First)),
            format!("   second: {}", format_side(entry, Side::Second)),
        ],
        FileStatus::ComparisonError => entry
            .cause
            .as_ref()
            .map(|cause| vec![format!("   cause: {}", cause)])
            .unwrap_or_default(),
        FileStatus::Different => format_difference(entry),
    }
}

enum Side {
    First,
    Second,
}

fn format_side(entry: &ComparisonEntry, side: Side) -> String {
    let (file_type, size, target) = match side {
        Side::First => (entry.first_type, entry.first_size, &entry.first_target),
        Side::Second => (entry.second_type, entry.second_size, &entry.second_target),
    };

    match file_type {
        FileType::Regular => match size {
            Some(size) => format!("file ({})", format_size(size)),
            None => "file".to_string(),
        },
        FileType::Symlink => match target {
            Some(target) => format!("symlink -> {}", target.display()),
            None => "symlink".to_string(),
        },
        other => other.describe().to_string(),
    }
}

fn format_difference(entry: &ComparisonEntry) -> Vec<String> {
    let mut lines = Vec::new();

    if entry.first_type == FileType::Symlink && entry.second_type == FileType::Symlink {
        if let (Some(old), Some(new)) = (&entry.first_target, &entry.second_target) {
            lines.push(format!("   target: {} -> {}", old.display(), new.display()));
        }
        return lines;
    }

    if let (Some(first_size), Some(second_size)) = (entry.first_size, entry.second_size)
        && first_size != second_size
    {
        lines.push(format!(
            "   size: {} -> {}",
            format_size(first_size),
            format_size(second_size)
        ));
    }
    if let (Some(first_mtime), Some(second_mtime)) =
        (entry.first_mtime_nanos, entry.second_mtime_nanos)
        && first_mtime != second_mtime
    {
        lines.push(format!(
            "   mtime: {} -> {}",
            format_mtime(first_mtime),
            format_mtime(second_mtime)
        ));
    }

    lines
}

fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * 1024;
    const GB: u64 = 1024 * 1024 * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

fn format_mtime(nanos: u64) -> String {
    use std::time::{Duration, UNIX_EPOCH};

    let system_time = UNIX_EPOCH + Duration::from_nanos(nanos);
    let datetime: chrono::DateTime<chrono::Local> = system_time.into();
    datetime.format("%Y-%m-%d %H:%M:%S%.3f").to_string()
}
