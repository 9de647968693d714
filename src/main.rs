use std::thread;
use std::time::Duration;

use clap::{ArgAction, Parser, ValueEnum};
use log::{info, LevelFilter};
use simple_logger::SimpleLogger;

use rustbrute::charset::{DIGITS, LOWERCASE, SYMBOLS, UPPERCASE};
use rustbrute::progress::progress_bar;
use rustbrute::{
    Algorithm, CancelToken, Charset, Cracker, Digest, Keyspace, NoProgress, Outcome,
    DEFAULT_CHARSET, DEFAULT_MAX_LENGTH,
};

/// Recover a password from its digest by trying every string over a charset.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Target digest, hex encoded
    hash: String,

    /// Longest candidate to try
    #[arg(short = 'l', long = "max-length", default_value_t = DEFAULT_MAX_LENGTH)]
    max_length: usize,

    /// Characters candidates are built from, in enumeration order
    #[arg(short = 'c', long = "charset", default_value = DEFAULT_CHARSET, conflicts_with = "preset")]
    charset: String,

    /// Use a predefined charset instead of --charset
    #[arg(short = 'p', long = "preset", value_enum)]
    preset: Option<Preset>,

    /// Hash algorithm that produced the target
    #[arg(short = 'a', long = "algorithm", value_enum, default_value_t = Algorithm::Sha256)]
    algorithm: Algorithm,

    /// Number of worker threads (default: all cores)
    #[arg(short = 't', long = "threads", value_name = "N")]
    threads: Option<usize>,

    /// Give up after this many seconds
    #[arg(long = "timeout", value_name = "SECS")]
    timeout: Option<u64>,

    /// Do not draw a progress bar
    #[arg(long = "no-progress")]
    no_progress: bool,

    /// More log output (-v info, -vv debug)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Preset {
    Lower,
    Upper,
    Digits,
    Alnum,
    Hex,
    Printable,
}

impl Preset {
    fn chars(self) -> String {
        match self {
            Preset::Lower => LOWERCASE.to_string(),
            Preset::Upper => UPPERCASE.to_string(),
            Preset::Digits => DIGITS.to_string(),
            Preset::Alnum => format!("{LOWERCASE}{UPPERCASE}{DIGITS}"),
            Preset::Hex => "0123456789abcdef".to_string(),
            Preset::Printable => format!("{LOWERCASE}{UPPERCASE}{DIGITS}{SYMBOLS} "),
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    SimpleLogger::new().with_level(level).init()?;

    // The cracker rejects a target of the wrong length before hashing anything
    let algorithm = cli.algorithm;
    let target = Digest::from_hex(&cli.hash)?;

    let charset = match cli.preset {
        Some(preset) => Charset::new(&preset.chars())?,
        None => Charset::new(&cli.charset)?,
    };
    let threads = cli
        .threads
        .unwrap_or_else(|| thread::available_parallelism().map_or(1, |n| n.get()));
    let keyspace = Keyspace::new(charset, cli.max_length)?;

    println!("Searching for the preimage of {target}");
    println!("  Algorithm:  {algorithm}");
    println!("  Max length: {}", keyspace.max_length());
    println!("  Charset:    {}", keyspace.charset());
    println!("  Candidates: {}", keyspace.total());
    println!("  Threads:    {threads}");

    let cracker = Cracker::new(algorithm, keyspace).with_threads(threads);

    let cancel = CancelToken::new();
    if let Some(secs) = cli.timeout {
        let cancel = cancel.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_secs(secs));
            info!("timeout of {secs}s reached, cancelling");
            cancel.cancel();
        });
    }

    let report = if cli.no_progress {
        cracker.crack_with(&target, &NoProgress, &cancel)?
    } else {
        cracker.crack_with(&target, &progress_bar(), &cancel)?
    };

    match &report.outcome {
        Outcome::Found { candidate, index } => {
            println!("✓ Hash cracked!");
            println!("  Password: {candidate}");
            println!("  {algorithm}({candidate}) = {target}");
            println!("  Position: {} of {}", index + 1, report.total);
        }
        Outcome::NotFound => {
            println!("✗ Password not found in the search space");
        }
        Outcome::Cancelled => {
            println!(
                "✗ Search cancelled after {} of {} candidates",
                report.processed, report.total
            );
        }
    }
    println!(
        "Elapsed: {:.2?} ({:.0} hashes/s)",
        report.elapsed,
        report.rate()
    );

    if report.is_cancelled() {
        std::process::exit(2);
    }
    Ok(())
}
