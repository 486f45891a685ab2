// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Command-line interface for slack-export-viewer.
//!
//! This binary provides the `sev` command for rendering the channels of an
//! extracted Slack export as static HTML pages, or for listing the avatars
//! and files those pages expect to find on disk.

use lexopt::prelude::*;
use slack_export_viewer::archive::{Archive, ArchiveError};
use slack_export_viewer::message::Message;
use slack_export_viewer::parser::RawMessage;
use slack_export_viewer::{manifest, page};
use snafu::{ensure, prelude::*};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Environment variable supplying the default archive path.
const ARCHIVE_ENV: &str = "SEV_ARCHIVE";

/// Where to write the rendered output.
#[derive(Clone)]
enum OutputTarget {
    /// Write each channel page to the specified directory.
    Directory(PathBuf),
    /// Write to stdout.
    Stdout,
}

#[allow(clippy::struct_excessive_bools)]
struct Cli {
    archive: PathBuf,
    channels: Vec<String>,
    output: Option<OutputTarget>,
    manifest: bool,
    quiet: bool,
    verbose: bool,
    dry_run: bool,
    force: bool,
}

#[derive(Debug, Snafu)]
enum Error {
    #[snafu(display("failed to parse arguments: {source}"))]
    ParseArgs { source: lexopt::Error },

    #[snafu(display("cannot output multiple channels to stdout"))]
    MultipleChannelsToStdout,

    #[snafu(display("failed to open archive: {source}"))]
    OpenArchive { source: ArchiveError },

    #[snafu(display("failed to read channel: {source}"))]
    ReadChannel { source: ArchiveError },

    #[snafu(display("failed to create output directory: {source}"))]
    CreateOutputDir { source: std::io::Error },

    #[snafu(display("failed to write {}: {source}", path.display()))]
    WriteFile {
        path: PathBuf,
        source: std::io::Error,
    },
}

fn print_help() {
    println!(
        "\
{name} {version}
Render Slack export archives as HTML

Usage: {bin} [OPTIONS] -z <ARCHIVE> -o <OUTPUT>
       {bin} [OPTIONS] -z <ARCHIVE> --manifest

Options:
  -z, --archive <ARCHIVE>   Extracted export directory (default: ${ARCHIVE_ENV})
  -c, --channel <NAME>      Channel to render; repeatable (default: all)
  -o, --output <OUTPUT>     Output directory for <channel>.html (or - for stdout)
      --manifest            Print avatar and file downloads as URL<TAB>PATH lines

Other options:
  -q, --quiet               Suppress progress messages
  -v, --verbose             Log archive loading and rendering details
  -n, --dry-run             Show what would be written without writing
  -f, --force               Overwrite existing output files
  -h, --help                Print help
  -V, --version             Print version

Logging honors RUST_LOG (default: warn).",
        name = env!("CARGO_PKG_NAME"),
        version = env!("CARGO_PKG_VERSION"),
        bin = env!("CARGO_BIN_NAME"),
    );
}

fn parse_args() -> Result<Cli, lexopt::Error> {
    // Show help if no arguments provided
    if std::env::args().len() == 1 {
        print_help();
        std::process::exit(0);
    }

    let mut archive: Option<PathBuf> = std::env::var_os(ARCHIVE_ENV)
        .filter(|val| !val.is_empty())
        .map(PathBuf::from);
    let mut channels = Vec::new();
    let mut output: Option<OutputTarget> = None;
    let mut manifest = false;
    let mut quiet = false;
    let mut verbose = false;
    let mut dry_run = false;
    let mut force = false;

    let mut parser = lexopt::Parser::from_env();
    while let Some(arg) = parser.next()? {
        match arg {
            Short('z') | Long("archive") => archive = Some(parser.value()?.parse()?),
            Short('c') | Long("channel") => channels.push(parser.value()?.string()?),
            Short('o') | Long("output") => {
                let val: PathBuf = parser.value()?.parse()?;
                output = Some(if val == Path::new("-") {
                    OutputTarget::Stdout
                } else {
                    OutputTarget::Directory(val)
                });
            }
            Long("manifest") => manifest = true,
            Short('q') | Long("quiet") => quiet = true,
            Short('v') | Long("verbose") => verbose = true,
            Short('n') | Long("dry-run") => dry_run = true,
            Short('f') | Long("force") => force = true,
            Short('h') | Long("help") => {
                print_help();
                std::process::exit(0);
            }
            Short('V') | Long("version") => {
                println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            _ => return Err(arg.unexpected()),
        }
    }

    if output.is_none() && !manifest {
        return Err("missing required option: --output".into());
    }

    Ok(Cli {
        archive: archive.ok_or("missing required option: --archive")?,
        channels,
        output,
        manifest,
        quiet,
        verbose,
        dry_run,
        force,
    })
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<(), Error> {
    let cli = parse_args().context(ParseArgsSnafu)?;
    init_tracing(cli.verbose);

    let archive = Archive::open(&cli.archive).context(OpenArchiveSnafu)?;

    // Without explicit channels, render every channel in the directory
    let explicit = !cli.channels.is_empty();
    let channels: Vec<String> = if explicit {
        cli.channels.clone()
    } else {
        archive
            .channel_names()
            .into_iter()
            .map(str::to_owned)
            .collect()
    };

    if cli.manifest {
        return print_manifest(&archive, &channels, explicit);
    }

    match &cli.output {
        Some(OutputTarget::Stdout) => {
            ensure!(channels.len() == 1, MultipleChannelsToStdoutSnafu);
            process_to_stdout(&archive, &channels[0], &cli)?;
        }
        Some(OutputTarget::Directory(dir)) => {
            if !cli.dry_run {
                std::fs::create_dir_all(dir).context(CreateOutputDirSnafu)?;
            }
            for name in &channels {
                process_channel(&archive, name, dir, explicit, &cli)?;
            }
        }
        None => {}
    }

    Ok(())
}

/// Reads a channel's messages.
///
/// Channels listed in the directory but absent from disk are skipped
/// unless they were asked for by name.
fn load_channel(
    archive: &Archive,
    name: &str,
    explicit: bool,
) -> Result<Option<Vec<RawMessage>>, Error> {
    match archive.channel_messages(name) {
        Ok(messages) => Ok(Some(messages)),
        Err(ArchiveError::UnknownChannel { .. }) if !explicit => {
            tracing::warn!(channel = name, "channel has no message directory, skipping");
            Ok(None)
        }
        Err(source) => Err(Error::ReadChannel { source }),
    }
}

/// Renders a channel page from the archive.
fn render_channel(archive: &Archive, name: &str, explicit: bool) -> Result<Option<String>, Error> {
    let Some(raw) = load_channel(archive, name, explicit)? else {
        return Ok(None);
    };
    let messages: Vec<_> = raw
        .iter()
        .map(|m| Message::new(m, archive.directory(), name))
        .collect();
    Ok(Some(page::render_channel_page(name, &messages)))
}

/// Prints the download manifest for the selected channels.
fn print_manifest(archive: &Archive, channels: &[String], explicit: bool) -> Result<(), Error> {
    for download in manifest::avatar_downloads(archive.directory()) {
        println!("{download}");
    }
    for name in channels {
        if let Some(raw) = load_channel(archive, name, explicit)? {
            for download in manifest::file_downloads(&raw, name) {
                println!("{download}");
            }
        }
    }
    Ok(())
}

/// Renders a single channel to stdout.
fn process_to_stdout(archive: &Archive, name: &str, cli: &Cli) -> Result<(), Error> {
    if cli.dry_run {
        eprintln!("Would output #{name}");
        return Ok(());
    }

    if let Some(html) = render_channel(archive, name, true)? {
        print!("{html}");
    }
    Ok(())
}

/// Renders a channel and writes it to the output directory.
fn process_channel(
    archive: &Archive,
    name: &str,
    out_dir: &Path,
    explicit: bool,
    cli: &Cli,
) -> Result<(), Error> {
    let out_path = out_dir.join(format!("{name}.html"));

    // Handle dry-run mode
    if cli.dry_run {
        eprintln!("Would write {}", out_path.display());
        return Ok(());
    }

    // Check if output exists and handle overwrite
    if out_path.exists() && !cli.force {
        eprintln!(
            "Skipping {} (already exists, use --force to overwrite)",
            out_path.display()
        );
        return Ok(());
    }

    let Some(html) = render_channel(archive, name, explicit)? else {
        return Ok(());
    };

    std::fs::write(&out_path, &html).context(WriteFileSnafu { path: &out_path })?;

    if !cli.quiet {
        eprintln!("Wrote {}", out_path.display());
    }
    Ok(())
}
