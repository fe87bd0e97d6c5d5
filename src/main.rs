//! bcpack CLI - inspect and diff encrypted `.list`/`.pack` game archives.

use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use bcpack::prelude::*;

/// bcpack - encrypted game archive inspection and version diffing
#[derive(Parser)]
#[command(name = "bcpack")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GlobalArgs {
    /// Archive source: an http(s) base URL or a local mirror directory
    #[arg(short, long, global = true, env = "BCPACK_SOURCE")]
    source: Option<String>,

    /// Fetch timeout in seconds
    #[arg(long, global = true, env = "BCPACK_TIMEOUT", default_value_t = 30)]
    timeout: u64,

    /// Archive locale (JP, TW, EN, KR)
    #[arg(short, long, global = true, env = "BCPACK_LOCALE", default_value = "JP")]
    locale: Locale,

    /// Asset category
    #[arg(short, long, global = true, env = "BCPACK_CATEGORY", default_value = "DataLocal")]
    category: Category,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Where to read a single archive from.
#[derive(Args)]
struct ArchiveArgs {
    /// Version to read from the source
    #[arg(long, required_unless_present = "list")]
    version: Option<String>,

    /// Local encrypted index file
    #[arg(long, requires = "pack", conflicts_with = "version")]
    list: Option<PathBuf>,

    /// Local pack file
    #[arg(long, requires = "list")]
    pack: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the files in an archive
    List {
        #[command(flatten)]
        archive: ArchiveArgs,

        /// Only show names containing this text
        #[arg(short, long)]
        filter: Option<String>,
    },

    /// Decrypt files from an archive to disk
    Extract {
        #[command(flatten)]
        archive: ArchiveArgs,

        /// Output directory
        #[arg(short, long, env = "BCPACK_OUTPUT")]
        output: PathBuf,

        /// Only extract names containing this text
        #[arg(short, long)]
        filter: Option<String>,
    },

    /// Compare the file lists of two versions
    Diff {
        /// Base version
        #[arg(long)]
        version: String,

        /// Version to compare against
        #[arg(long)]
        compared: String,

        /// Only show names containing this text
        #[arg(short, long)]
        filter: Option<String>,

        /// Only show files with this label (unchanged, added, removed, modified)
        #[arg(long)]
        label: Option<Label>,
    },

    /// Line diff of one file between two versions
    FileDiff {
        /// Base version
        #[arg(long)]
        version: String,

        /// Version to compare against
        #[arg(long)]
        compared: String,

        /// File name as listed in the index
        #[arg(long)]
        file: String,
    },
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.global.verbose);

    let global = &cli.global;
    match cli.command {
        Commands::List { archive, filter } => {
            cmd_list(global, &archive, filter.as_deref()).await?;
        }
        Commands::Extract {
            archive,
            output,
            filter,
        } => {
            cmd_extract(global, &archive, &output, filter.as_deref()).await?;
        }
        Commands::Diff {
            version,
            compared,
            filter,
            label,
        } => {
            cmd_diff(global, &version, &compared, filter, label).await?;
        }
        Commands::FileDiff {
            version,
            compared,
            file,
        } => {
            cmd_file_diff(global, &version, &compared, &file).await?;
        }
    }

    Ok(())
}

fn fetcher(global: &GlobalArgs) -> Result<Arc<dyn Fetcher>> {
    let Some(ref source) = global.source else {
        bail!("no archive source given (use --source or BCPACK_SOURCE)");
    };
    let config = FetchConfig::default().with_timeout(Duration::from_secs(global.timeout));
    from_source(source, config).with_context(|| format!("Failed to set up source {}", source))
}

async fn open_archive(global: &GlobalArgs, args: &ArchiveArgs) -> Result<PackArchive> {
    let (list, pack) = match (&args.list, &args.pack, &args.version) {
        (Some(list), Some(pack), _) => {
            debug!("reading {} and {}", list.display(), pack.display());
            let list = fs::read(list).with_context(|| format!("Failed to read {}", list.display()))?;
            let pack = fs::read(pack).with_context(|| format!("Failed to read {}", pack.display()))?;
            (list, pack)
        }
        (_, _, Some(version)) => {
            let key = ArchiveKey::new(global.locale, version.clone(), global.category);
            let pair = fetcher(global)?
                .fetch_pair(&key)
                .await
                .with_context(|| format!("Failed to fetch {}", key))?;
            (pair.list, pair.pack)
        }
        _ => bail!("either --version or --list/--pack is required"),
    };

    let archive = PackArchive::open(global.locale, global.category, &list, pack)
        .context("Failed to decode archive index")?;
    debug!(
        entries = archive.entry_count(),
        skipped = archive.index().skipped().len(),
        "archive opened"
    );

    Ok(archive)
}

fn name_matches(name: &str, filter: Option<&str>) -> bool {
    filter.map_or(true, |keyword| name.contains(keyword))
}

async fn cmd_list(global: &GlobalArgs, args: &ArchiveArgs, filter: Option<&str>) -> Result<()> {
    let archive = open_archive(global, args).await?;
    let entries: Vec<&FileDescriptor> = archive
        .iter()
        .filter(|entry| name_matches(&entry.name, filter))
        .collect();

    if global.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    for entry in &entries {
        println!("{:>12} {:>10} {}", entry.start, entry.length, entry.name);
    }
    println!();
    println!("Total: {} of {} entries", entries.len(), archive.entry_count());

    Ok(())
}

/// Output path for an archive entry, refusing names that escape `root`.
fn output_path(root: &Path, name: &str) -> Option<PathBuf> {
    let relative = Path::new(name);
    let safe = !name.is_empty()
        && relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    safe.then(|| root.join(relative))
}

fn write_entry(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(path, bytes).with_context(|| format!("Failed to write {}", path.display()))
}

async fn cmd_extract(
    global: &GlobalArgs,
    args: &ArchiveArgs,
    output: &Path,
    filter: Option<&str>,
) -> Result<()> {
    let start = Instant::now();
    let archive = open_archive(global, args).await?;
    println!("Loaded {} entries in {:?}", archive.entry_count(), start.elapsed());

    let entries: Vec<&FileDescriptor> = archive
        .iter()
        .filter(|entry| name_matches(&entry.name, filter))
        .collect();

    println!("Extracting {} entries...", entries.len());

    let pb = ProgressBar::new(entries.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );

    fs::create_dir_all(output)
        .with_context(|| format!("Failed to create {}", output.display()))?;

    let start = Instant::now();
    let mut failed = 0usize;
    for entry in &entries {
        pb.inc(1);

        let Some(path) = output_path(output, &entry.name) else {
            warn!("refusing to extract {:?} outside the output directory", entry.name);
            failed += 1;
            continue;
        };

        let content = match archive.read(entry) {
            Ok(content) => content,
            Err(e) => {
                warn!("failed to extract {}: {}", entry.name, e);
                failed += 1;
                continue;
            }
        };

        write_entry(&path, content.as_bytes())?;
    }

    pb.finish_with_message("Done");
    println!(
        "Extracted {} entries ({} failed) in {:?}",
        entries.len() - failed,
        failed,
        start.elapsed()
    );

    Ok(())
}

async fn compare(global: &GlobalArgs, version: &str, compared: &str) -> Result<Session> {
    let mut session = Session::new(fetcher(global)?);
    let events = session.events();

    let selection = Selection::new(global.locale, version, global.category).with_compared(compared);
    session.refresh(selection).await;

    for event in events.try_iter() {
        match event {
            SessionEvent::FetchFailed { slot, error, .. } => {
                eprintln!("warning: {} version unavailable: {}", slot, error);
            }
            SessionEvent::DecodeFailed { slot, error, .. } => {
                eprintln!("warning: {} index unreadable: {}", slot, error);
            }
            _ => {}
        }
    }

    Ok(session)
}

async fn cmd_diff(
    global: &GlobalArgs,
    version: &str,
    compared: &str,
    filter: Option<String>,
    label: Option<Label>,
) -> Result<()> {
    let mut session = compare(global, version, compared).await?;

    let mut list_filter = ListFilter::new();
    if let Some(keyword) = filter {
        list_filter = list_filter.with_keyword(keyword);
    }
    if let Some(label) = label {
        list_filter = list_filter.with_label(label);
    }
    session.set_filter(list_filter);

    let files = session.filtered();
    if global.json {
        println!("{}", serde_json::to_string_pretty(&files)?);
        return Ok(());
    }

    for file in &files {
        println!("{} {}", file.label.marker(), file.name());
    }

    let summary = session.summary();
    println!();
    println!(
        "{} files: {} added, {} removed, {} modified, {} unchanged",
        session.merged().len(),
        summary.added,
        summary.removed,
        summary.modified,
        summary.unchanged
    );

    Ok(())
}

async fn cmd_file_diff(global: &GlobalArgs, version: &str, compared: &str, file: &str) -> Result<()> {
    let session = compare(global, version, compared).await?;
    let diff = session
        .file_diff(file)
        .with_context(|| format!("Failed to diff {}", file))?;

    if global.json {
        println!("{}", serde_json::to_string_pretty(&diff)?);
        return Ok(());
    }

    let label = diff.label.map_or("unknown", |label| label.as_str());
    println!("{} ({})", diff.name, label);

    let Some(ref lines) = diff.lines else {
        let size = |content: &Option<Content>| content.as_ref().map_or(0, Content::len);
        println!(
            "no text diff available: base {} bytes, compared {} bytes",
            size(&diff.base),
            size(&diff.compared)
        );
        return Ok(());
    };

    println!("+{} -{}", lines.added, lines.removed);
    let number = |n: Option<usize>| n.map_or(String::new(), |n| n.to_string());
    for line in &lines.lines {
        println!(
            "{:>6} {:>6} {} {}",
            number(line.old_line),
            number(line.new_line),
            line.kind.prefix(),
            line.content
        );
    }

    Ok(())
}
