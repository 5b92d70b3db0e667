//! Spinner shown while a visible refresh is in flight

use std::future::Future;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::cli::OutputFormat;

/// Await `work` behind a stderr spinner.
///
/// JSON output gets no spinner; indicatif also hides it when stderr is not a
/// terminal.
pub async fn with_spinner<T, F>(format: OutputFormat, message: &str, work: F) -> T
where
    F: Future<Output = T>,
{
    if format == OutputFormat::Json {
        return work.await;
    }

    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(80));

    let result = work.await;
    spinner.finish_and_clear();
    result
}
