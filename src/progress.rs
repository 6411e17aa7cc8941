//! Spinner shown while a download is in flight.

use std::io::IsTerminal;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Label shown next to the spinner.
const DOWNLOADING_LABEL: &str = "ダウンロード中...";

/// Spinner only when stderr is a terminal and output is not suppressed.
pub(crate) fn should_use_spinner(stderr_is_terminal: bool, quiet: bool) -> bool {
    stderr_is_terminal && !quiet
}

/// Starts the spinner when the environment allows it.
pub(crate) fn start_spinner(quiet: bool) -> Option<ProgressBar> {
    if !should_use_spinner(std::io::stderr().is_terminal(), quiet) {
        return None;
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(DOWNLOADING_LABEL);
    spinner.enable_steady_tick(Duration::from_millis(100));
    Some(spinner)
}
