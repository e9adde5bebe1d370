use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Synchronous, fire-and-forget milestone callback for long operations.
///
/// Managers call this at named stages ("validating", "creating archive",
/// "computing checksum", ...). Implementations must not block.
pub trait ProgressSink {
    fn milestone(&self, vendor_id: &str, stage: &str);
}

/// Default no-op sink.
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn milestone(&self, _vendor_id: &str, _stage: &str) {}
}

/// Console spinner used by the CLI.
pub struct SpinnerProgress {
    bar: ProgressBar,
}

impl SpinnerProgress {
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl Default for SpinnerProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for SpinnerProgress {
    fn milestone(&self, vendor_id: &str, stage: &str) {
        self.bar.set_message(format!("{}: {}", vendor_id, stage));
    }
}
