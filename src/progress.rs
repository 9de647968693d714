use indicatif::{ProgressBar, ProgressStyle};

/// Observer for search progress. Purely informational: the search behaves the
/// same whichever implementation is plugged in.
///
/// Workers call `advance` from several threads at once.
pub trait Progress: Sync {
    /// Called once before the first candidate with the number the search will
    /// try if nothing matches.
    fn start(&self, _total: u64) {}

    /// `processed` more candidates have been hashed.
    fn advance(&self, processed: u64);

    fn finish(&self) {}
}

/// Discards every update.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProgress;

impl Progress for NoProgress {
    fn advance(&self, _processed: u64) {}
}

impl Progress for ProgressBar {
    fn start(&self, total: u64) {
        self.set_length(total);
        self.set_position(0);
    }

    fn advance(&self, processed: u64) {
        self.inc(processed);
    }

    fn finish(&self) {
        self.finish_and_clear();
    }
}

/// Progress bar used by the command-line tool.
pub fn progress_bar() -> ProgressBar {
    let bar = ProgressBar::new(0);
    if let Ok(style) = ProgressStyle::with_template(
        "{spinner:.green} {percent:>3}% [{wide_bar:.cyan/blue}] {human_pos}/{human_len} ({per_sec}, {eta} remaining)",
    ) {
        bar.set_style(style.progress_chars("=> "));
    }
    bar
}
