mod checksum;
mod cli;
mod compare;
mod dir_list;
mod entry;
mod guard;
mod render;
mod report;
mod util;
mod walk;

use cli::Cli;
use compare::CompareOptions;
use std::fmt as stdfmt;
use std::io::{IsTerminal, stderr};
use std::process::ExitCode;
use std::time::Duration;
use tracing::{Event, Level, Subscriber, error, info};
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt as tracing_fmt;
use tracing_subscriber::fmt::FmtContext;
use tracing_subscriber::fmt::format::{FormatEvent, FormatFields, Writer};
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::LookupSpan;
use walk::compare_trees;

struct DeltaExitCode;

impl DeltaExitCode {
    /// Exit code used when the trees differ (or entries could not be compared).
    fn differences_found() -> ExitCode {
        ExitCode::from(1)
    }

    /// Exit code used for other errors (invalid roots, I/O errors, etc.).
    fn any_error() -> ExitCode {
        ExitCode::from(255)
    }
}

fn options_from_cli(cli: &Cli) -> CompareOptions {
    CompareOptions {
        follow_symlinks: cli.follow_symlinks,
        content_compare: cli.content,
        time_tolerance: Duration::from_secs_f64(cli.time_tolerance.max(0.0)),
        expand_unique: cli.expand_unique,
        cancel: None,
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    let options = options_from_cli(&cli);

    let result: anyhow::Result<ExitCode> = run(&cli, &options);

    match result {
        Ok(exit_code) => exit_code,
        Err(err) => {
            error!("{err}");
            DeltaExitCode::any_error()
        }
    }
}

fn run(cli: &Cli, options: &CompareOptions) -> anyhow::Result<ExitCode> {
    let report = compare_trees(&cli.first, &cli.second, options)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        render::print_report(&report, cli.all);
        render::print_summary(&report);
    }

    if report.has_differences() {
        info!(
            "Trees differ: {} of {} entries are not identical",
            report.counts.total() - report.counts.identical,
            report.counts.total()
        );
        return Ok(DeltaExitCode::differences_found());
    }

    info!("Trees are identical ({} entries)", report.counts.total());
    Ok(ExitCode::SUCCESS)
}

fn init_tracing(verbose: u8) {
    let stderr_is_terminal = stderr().is_terminal();
    let formatter = EmojiFormatter { stderr_is_terminal };

    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let fmt_layer = tracing_fmt::layer()
        .event_format(formatter)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

struct EmojiFormatter {
    stderr_is_terminal: bool,
}

impl<S, N> FormatEvent<S, N> for EmojiFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> stdfmt::Result {
        if self.stderr_is_terminal {
            match *event.metadata().level() {
                Level::DEBUG => write!(writer, "🔍 ")?,
                Level::INFO => write!(writer, "ℹ️ ")?,
                Level::WARN => write!(writer, "⚠️  ")?,
                Level::ERROR => write!(writer, "❌️ ")?,
                _ => {}
            }
        } else {
            match *event.metadata().level() {
                Level::DEBUG => writer.write_str("DEBUG: ")?,
                Level::INFO => writer.write_str("INFO: ")?,
                Level::WARN => writer.write_str("WARN: ")?,
                Level::ERROR => writer.write_str("ERROR: ")?,
                _ => {}
            }
        }

        ctx.format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}
