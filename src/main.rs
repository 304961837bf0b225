//! Main entry point for the memzip CLI application.
//!
//! Reads a ZIP archive from the local filesystem or an HTTP URL into memory,
//! then lists, tests or pipes its entries. Nothing is written to disk.

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::AsyncWriteExt;

use memzip::{
    ArchiveBytes, ByteSource, CentralDirectoryEntry, Cli, Extractor, HttpSource, LocalFileSource,
};

/// Application entry point.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.debug {
        StderrLogger::install();
    }

    let bytes = read_source(&cli)
        .await
        .with_context(|| format!("cannot read {}", cli.file))?;

    let extractor = Extractor::new(cli.extract_options());

    if cli.list || cli.verbose {
        return list_files(&extractor, &bytes, cli.verbose);
    }

    process_zip(&extractor, &bytes, &cli).await
}

/// Materialize the archive named on the command line.
async fn read_source(cli: &Cli) -> memzip::Result<ArchiveBytes> {
    if cli.is_http_url() {
        HttpSource::new(cli.file.clone())?.read_all().await
    } else {
        LocalFileSource::new(&cli.file).read_all().await
    }
}

/// Decode every selected entry, either testing it or piping it to stdout.
///
/// Stops at the first failing entry. Entries the extractor skips (`-s` with an
/// unsupported compression method) are counted and reported at the end.
async fn process_zip(extractor: &Extractor, bytes: &ArchiveBytes, cli: &Cli) -> Result<()> {
    let entries = extractor.list_files(bytes)?;

    let selected: Vec<&CentralDirectoryEntry> = entries
        .iter()
        .filter(|e| !e.is_directory && cli.selects(&e.file_name))
        .collect();

    let show_filename = cli.pipe && selected.len() > 1;
    let mut stdout = tokio::io::stdout();
    let mut skipped = 0usize;

    for entry in &selected {
        let file = match extractor
            .extract_entry(bytes, entry)
            .with_context(|| format!("failed on {}", entry.file_name))?
        {
            Some(file) => file,
            None => {
                if !cli.is_very_quiet() {
                    eprintln!("Skipping: {}", entry.file_name);
                }
                skipped += 1;
                continue;
            }
        };

        if cli.pipe {
            if show_filename {
                stdout
                    .write_all(format!("--- {} ---\n", file.name()).as_bytes())
                    .await?;
            }
            stdout.write_all(file.content().as_bytes()).await?;
        } else if !cli.is_quiet() {
            println!("    testing: {:<40}  OK", file.name());
        }
    }
    stdout.flush().await?;

    if !cli.is_very_quiet() && !cli.pipe {
        if skipped > 0 {
            println!("{} entries skipped in {}.", skipped, cli.file);
        } else {
            println!("No errors detected in {}.", cli.file);
        }
    }

    Ok(())
}

/// List files in the ZIP archive.
///
/// Supports two output formats:
/// - Simple format (`-l`): Just file names, one per line
/// - Verbose format (`-v`): Detailed table with size, compression ratio, and timestamps
fn list_files(extractor: &Extractor, bytes: &ArchiveBytes, verbose: bool) -> Result<()> {
    let entries = extractor.list_files(bytes)?;

    if verbose {
        println!(
            "{:>10}  {:>10}  {:>5}  {:>10}  {:>5}  Name",
            "Length", "Size", "Cmpr", "Date", "Time"
        );
        println!("{}", "-".repeat(70));
    }

    let mut total_uncompressed = 0u64;
    let mut total_compressed = 0u64;
    let mut file_count = 0usize;

    for entry in &entries {
        if !verbose {
            println!("{}", entry.file_name);
            continue;
        }

        let (year, month, day) = entry.mod_date();
        let (hour, minute, _second) = entry.mod_time();

        println!(
            "{:>10}  {:>10}  {}  {:04}-{:02}-{:02}  {:02}:{:02}  {}",
            entry.uncompressed_size,
            entry.compressed_size,
            ratio(entry.compressed_size, entry.uncompressed_size),
            year,
            month,
            day,
            hour,
            minute,
            entry.file_name
        );

        if !entry.is_directory {
            total_uncompressed += entry.uncompressed_size;
            total_compressed += entry.compressed_size;
            file_count += 1;
        }
    }

    if verbose {
        println!("{}", "-".repeat(70));
        println!(
            "{:>10}  {:>10}  {}  {:>21}  {} files",
            total_uncompressed,
            total_compressed,
            ratio(total_compressed, total_uncompressed),
            "",
            file_count
        );
    }

    Ok(())
}

/// Space saved by compression, as a right-aligned percentage.
fn ratio(compressed: u64, uncompressed: u64) -> String {
    if uncompressed > 0 && compressed <= uncompressed {
        format!("{:>4}%", 100 - (compressed * 100 / uncompressed))
    } else {
        "  0%".to_string()
    }
}

/// Minimal `log` backend writing to stderr, enabled by `--debug`.
struct StderrLogger;

static LOGGER: StderrLogger = StderrLogger;

impl StderrLogger {
    fn install() {
        if log::set_logger(&LOGGER).is_ok() {
            log::set_max_level(log::LevelFilter::Debug);
        }
    }
}

impl log::Log for StderrLogger {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record<'_>) {
        if self.enabled(record.metadata()) {
            eprintln!("[{:<5} {}] {}", record.level(), record.target(), record.args());
        }
    }

    fn flush(&self) {}
}
