// file: src/pipeline/progress.rs
// description: upload progress bar with per-batch extraction and storage counts
// reference: https://docs.rs/indicatif

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Counts for one upload as seen by the progress display.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UploadStats {
    pub extracted: usize,
    pub unreadable: usize,
    pub stored: usize,
    pub bytes_read: u64,
    pub elapsed: Duration,
}

/// One bar advancing per file; the message shows the file being read and
/// the running counts.
pub struct ProgressTracker {
    bar: ProgressBar,
    extracted: AtomicUsize,
    unreadable: AtomicUsize,
    stored: AtomicUsize,
    bytes_read: AtomicU64,
    started: Instant,
}

impl ProgressTracker {
    pub fn new(total_files: usize, colored: bool) -> Self {
        let bar = ProgressBar::new(total_files as u64);
        let template = if colored {
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}"
        } else {
            "{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} {msg}"
        };
        bar.set_style(
            ProgressStyle::default_bar()
                .template(template)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        Self::with_bar(bar)
    }

    /// Tracks counts without drawing anything.
    pub fn hidden(total_files: usize) -> Self {
        Self::with_bar(ProgressBar::with_draw_target(
            Some(total_files as u64),
            ProgressDrawTarget::hidden(),
        ))
    }

    fn with_bar(bar: ProgressBar) -> Self {
        Self {
            bar,
            extracted: AtomicUsize::new(0),
            unreadable: AtomicUsize::new(0),
            stored: AtomicUsize::new(0),
            bytes_read: AtomicU64::new(0),
            started: Instant::now(),
        }
    }

    pub fn file_started(&self, name: &str) {
        self.bar.set_message(format!("{} | {}", name, self.counts()));
    }

    pub fn file_extracted(&self, bytes: u64) {
        self.extracted.fetch_add(1, Ordering::Relaxed);
        self.bytes_read.fetch_add(bytes, Ordering::Relaxed);
        self.bar.inc(1);
    }

    pub fn file_unreadable(&self) {
        self.unreadable.fetch_add(1, Ordering::Relaxed);
        self.bar.inc(1);
    }

    pub fn storing(&self, count: usize) {
        self.bar
            .set_message(format!("storing {} resume(s) | {}", count, self.counts()));
    }

    pub fn documents_stored(&self, count: usize) {
        self.stored.fetch_add(count, Ordering::Relaxed);
        self.bar.set_message(self.counts());
    }

    pub fn finish(&self) {
        self.bar.finish_with_message(self.counts());
    }

    pub fn stats(&self) -> UploadStats {
        UploadStats {
            extracted: self.extracted.load(Ordering::Relaxed),
            unreadable: self.unreadable.load(Ordering::Relaxed),
            stored: self.stored.load(Ordering::Relaxed),
            bytes_read: self.bytes_read.load(Ordering::Relaxed),
            elapsed: self.started.elapsed(),
        }
    }

    fn counts(&self) -> String {
        format!(
            "{} read, {} unreadable, {} stored",
            self.extracted.load(Ordering::Relaxed),
            self.unreadable.load(Ordering::Relaxed),
            self.stored.load(Ordering::Relaxed)
        )
    }
}
