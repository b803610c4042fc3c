// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Dispatch to the appropriate subcommand handler
// 3. Drive the session (load -> check -> select -> save) and print
//    progress and results
// 4. Exit with proper code (0 = all links ok, 1 = failures found,
//    2 = error)
//
// Rust concepts used:
// - async/await: Because we need to make many network requests concurrently
// - Result<T, E>: For error handling (T = success type, E = error type)
// - match: Pattern matching to handle different subcommands
// =============================================================================

// Module declarations - tells Rust about our other source files
mod checker; // src/checker/ - link health checking
mod cli; //     src/cli.rs - command-line parsing
mod codec; //   src/codec/ - JSON and Netscape HTML conversion
mod session; // src/session.rs - per-run state (tree, statuses, selection)
mod tree; //    src/tree/ - the canonical bookmark tree

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser; // Parser trait enables the parse() method
use tokio::sync::mpsc;

use checker::{CheckOutcome, CheckReport, HttpProbe, LinkStatus, Probe, StatusCounts};
use cli::{Cli, Commands, FormatArg};
use codec::BookmarkFormat;
use session::Session;

// The #[tokio::main] attribute transforms our async main into a real main
// function. It creates a tokio runtime and runs our async code inside it.
#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // If an unexpected error occurred, print it and exit with code 2
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// This is the main application logic
// Returns:
//   Ok(0) = no failing links
//   Ok(1) = failing links found
//   Err = unexpected error (becomes exit code 2)
async fn run() -> Result<i32> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check {
            file,
            json,
            concurrency,
            recheck,
        } => handle_check(&file, json, concurrency, recheck).await,
        Commands::Prune {
            file,
            output,
            to,
            all_failures,
            recheck,
            concurrency,
        } => handle_prune(&file, output, to, all_failures, recheck, concurrency).await,
        Commands::Convert { file, to, output } => handle_convert(&file, to, output),
    }
}

// Handles the 'check' subcommand: probe everything, report, don't write
async fn handle_check(file: &Path, json: bool, concurrency: usize, recheck: bool) -> Result<i32> {
    let mut session = load_session(file)?;

    if !json {
        println!(
            "📚 Loaded {} bookmark(s) from {}",
            session.link_count(),
            file.display()
        );
        println!("\n🌐 Checking {} link(s)...\n", session.link_count());
    }

    let probe = HttpProbe::new()?;
    let report = run_pass(&mut session, &probe, concurrency, false, json).await;

    if recheck && !session.failed_ids().is_empty() {
        if !json {
            println!(
                "\n🔁 Rechecking {} failed link(s)...\n",
                session.failed_ids().len()
            );
        }
        run_pass(&mut session, &probe, concurrency, true, json).await;
    }

    // Fold the recheck pass (if any) into the full run's outcomes, so
    // the final listing shows each link's latest status
    let outcomes: Vec<CheckOutcome> = report
        .outcomes
        .into_iter()
        .map(|mut outcome| {
            if let Some(status) = session.status_of(&outcome.id) {
                outcome.status = status.clone();
            }
            outcome
        })
        .collect();

    if json {
        // Serialize results to JSON and print
        println!("{}", serde_json::to_string_pretty(&outcomes)?);
    } else {
        print_table(&outcomes);
    }

    if session.failed_ids().is_empty() {
        Ok(0) // Exit code 0 = all good
    } else {
        Ok(1) // Exit code 1 = failing links found
    }
}

// Handles the 'prune' subcommand: check, select the dead ones, write a
// pruned copy
async fn handle_prune(
    file: &Path,
    output: Option<PathBuf>,
    to: Option<FormatArg>,
    all_failures: bool,
    recheck: bool,
    concurrency: usize,
) -> Result<i32> {
    let mut session = load_session(file)?;
    let total = session.link_count();

    println!("📚 Loaded {} bookmark(s) from {}", total, file.display());
    println!("\n🌐 Checking {} link(s)...\n", total);

    let probe = HttpProbe::new()?;
    run_pass(&mut session, &probe, concurrency, false, false).await;

    if recheck && !session.failed_ids().is_empty() {
        println!(
            "\n🔁 Rechecking {} failed link(s)...\n",
            session.failed_ids().len()
        );
        run_pass(&mut session, &probe, concurrency, true, false).await;
    }

    // Confirmed 404s are already pre-selected by the session;
    // --all-failures widens the selection to every failing link
    if all_failures {
        session.select_failures();
    }

    let pruned_count = session.selection().len();
    if pruned_count == 0 {
        println!("\n✅ Nothing to prune - keeping all {} bookmark(s)", total);
    }

    // Keep the input's format unless the user asked to convert
    let format: BookmarkFormat = to
        .map(Into::into)
        .or(session.source_format())
        .unwrap_or(BookmarkFormat::Json);

    let content = session.save(format)?;
    let path = output.unwrap_or_else(|| PathBuf::from(session::default_export_name(format)));
    std::fs::write(&path, content)
        .with_context(|| format!("could not write {}", path.display()))?;

    println!(
        "\n💾 Wrote {} bookmark(s) to {} ({} pruned)",
        total - pruned_count,
        path.display(),
        pruned_count
    );

    Ok(0)
}

// Handles the 'convert' subcommand: pure codec work, no probing
fn handle_convert(file: &Path, to: FormatArg, output: Option<PathBuf>) -> Result<i32> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("could not read {}", file.display()))?;
    let (tree, detected) = codec::decode(&content, BookmarkFormat::from_path(file))?;

    let target: BookmarkFormat = to.into();
    let encoded = codec::encode(&tree, target)?;

    let path = output.unwrap_or_else(|| PathBuf::from(session::default_export_name(target)));
    std::fs::write(&path, encoded)
        .with_context(|| format!("could not write {}", path.display()))?;

    println!(
        "🔄 Converted {} ({}) -> {} ({})",
        file.display(),
        detected,
        path.display(),
        target
    );

    Ok(0)
}

// Reads a bookmark export from disk into a fresh session
//
// The file extension is passed along as a format hint; the codec sniffs
// the content when the extension says nothing.
fn load_session(file: &Path) -> Result<Session> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("could not read {}", file.display()))?;
    let mut session = Session::new();
    session.load(&content, BookmarkFormat::from_path(file))?;
    Ok(session)
}

// Runs one check pass (full or failures-only) while printing progress
// incrementally as results come in
//
// The pool and the progress printer run concurrently on the same task:
// the pool sends each outcome over the channel the moment it completes,
// and the printer drains the channel until the pool drops the sender.
async fn run_pass<P: Probe>(
    session: &mut Session,
    probe: &P,
    concurrency: usize,
    failures_only: bool,
    quiet: bool,
) -> CheckReport {
    let total = if failures_only {
        session.failed_ids().len()
    } else {
        session.link_count()
    };

    let (tx, mut rx) = mpsc::unbounded_channel();

    let check = async {
        if failures_only {
            session.recheck(probe, concurrency, tx).await
        } else {
            session.check_all(probe, concurrency, tx).await
        }
    };

    let progress = async move {
        let mut done = 0usize;
        while let Some(outcome) = rx.recv().await {
            done += 1;
            if !quiet {
                println!(
                    "  [{}/{}] {} {}",
                    done,
                    total,
                    format_status(&outcome.status),
                    truncate(display_target(&outcome), 60)
                );
            }
        }
    };

    let (report, ()) = tokio::join!(check, progress);
    report
}

// What to show for a link in progress lines: the URL when there is one,
// the display name otherwise
fn display_target(outcome: &CheckOutcome) -> &str {
    if outcome.url.is_empty() {
        &outcome.name
    } else {
        &outcome.url
    }
}

// Truncates long URLs so the table stays readable in the terminal
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let cut: String = text.chars().take(max - 3).collect();
        format!("{cut}...")
    } else {
        text.to_string()
    }
}

// Prints results as a human-readable table in the terminal
fn print_table(outcomes: &[CheckOutcome]) {
    println!();
    println!("{:<30} {:<50} {:<20}", "NAME", "URL", "STATUS");
    println!("{}", "=".repeat(100));

    for outcome in outcomes {
        println!(
            "{:<30} {:<50} {:<20}",
            truncate(&outcome.name, 27),
            truncate(&outcome.url, 47),
            format_status(&outcome.status)
        );
    }

    println!();

    // Print summary
    let counts = StatusCounts::tally(outcomes);
    println!("📊 Summary:");
    println!("   ✅ OK: {}", counts.ok);
    println!("   💀 Not found: {}", counts.not_found);
    println!("   ⚠️  HTTP errors: {}", counts.http_error);
    println!("   ⏱️  Timeouts: {}", counts.timeout);
    println!("   🚫 Blocked: {}", counts.blocked);
    println!("   ⏭️  Skipped: {}", counts.skipped);
    println!("   📋 Total: {}", outcomes.len());
}

// Formats the status enum as a short labelled string
fn format_status(status: &LinkStatus) -> String {
    match status {
        LinkStatus::Ok => "✅ OK".to_string(),
        LinkStatus::NotFound => "💀 NOT FOUND".to_string(),
        LinkStatus::HttpError { code } => format!("⚠️  HTTP {}", code),
        LinkStatus::Timeout => "⏱️  TIMEOUT".to_string(),
        LinkStatus::Blocked => "🚫 BLOCKED".to_string(),
        LinkStatus::Unchecked => "⏭️  SKIPPED".to_string(),
    }
}
