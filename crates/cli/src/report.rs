//! Console progress and the closing summary.
//!
//! stdout carries only these lines; tracing output goes to stderr.

use std::io::{self, Write};
use std::path::Path;

use dayfetch_core::{AttemptFailure, Error, ExhaustedReason, FetchOutcome, Origin, Reporter};

/// Exit code when downloaded data could not be saved (`EX_IOERR`).
pub const PERSISTENCE_EXIT_CODE: u8 = 74;

/// Prints one line per download attempt and per save.
#[derive(Debug, Default)]
pub struct ConsoleReporter;

fn emit(text: &str) {
    write_progress(&mut io::stdout().lock(), text);
}

/// Progress is best effort: a closed or full stdout must not end the run.
fn write_progress(out: &mut impl Write, text: &str) {
    if let Err(e) = out.write_all(text.as_bytes()).and_then(|()| out.flush()) {
        tracing::debug!("failed to write progress: {}", e);
    }
}

impl Reporter for ConsoleReporter {
    fn attempt_started(&self, url: &str, attempt: u32, limit: u32) {
        emit(&format!("Trying to get {url}... ({attempt}/{limit})"));
    }

    fn attempt_finished(&self, _url: &str, _attempt: u32, _limit: u32, failure: Option<&AttemptFailure>) {
        emit(if failure.is_some() { " FAILED!\n" } else { " SUCCESS.\n" });
    }

    fn saving(&self, path: &Path) {
        emit(&format!("Saving data to {}...", path.display()));
    }

    fn saved(&self, _path: &Path) {
        emit(" DONE.\n");
    }
}

/// Summary text for a finished run.
pub fn summary(outcome: &FetchOutcome) -> String {
    match outcome {
        FetchOutcome::Found { location, origin, .. } => {
            let path = location.local_path.display();
            match (outcome.fell_back(), origin) {
                (false, Origin::AlreadyCached) => {
                    format!("Today's data already downloaded.\nYou can use the file:\n{path}")
                }
                (false, Origin::Downloaded) => {
                    format!("Download finished successfully.\nYou can use the new file:\n{path}")
                }
                (true, Origin::AlreadyCached) => format!(
                    "Failed to download daily file.\nYou can use nearest available file and data from here:\n{path}"
                ),
                (true, Origin::Downloaded) => format!(
                    "Failed to download daily file.\nNo newer dataset is present but this one was downloaded \
                     successfully.\nYou can use file and data from here:\n{path}"
                ),
            }
        }
        FetchOutcome::NotFound(ExhaustedReason::NoFallback) => "Failed to download daily file.\n\
             No fallback is set, nothing downloaded.\n\
             Set --fallback-days above 0 to download data from previous day(s)."
            .to_string(),
        FetchOutcome::NotFound(ExhaustedReason::WindowExhausted { days }) => format!(
            "Failed to download daily file.\nFallback to the previous {days} day(s) also failed.\n\
             To solve this issue try a higher --fallback-days value."
        ),
    }
}

/// Summary text when the run ended in an error.
pub fn error_summary(err: &Error) -> String {
    match err {
        Error::Persistence { path, source } => format!(
            "Data was downloaded but could not be saved to:\n{}\n{source}\nNothing usable is in the cache for that day.",
            path.display()
        ),
        other => format!("Run failed:\n{other}"),
    }
}

/// Print `text` under the summary header.
pub fn print_summary(text: &str) {
    println!();
    println!("Summary:");
    println!("--------");
    println!("{text}");
}

/// Process exit code for a finished run.
pub fn exit_code(outcome: &FetchOutcome, exhausted_exit_code: u8) -> u8 {
    if outcome.is_found() { 0 } else { exhausted_exit_code }
}

/// Dedicated exit code for a failed run, if it has one. Other errors leave
/// through `main`'s error return.
pub fn error_exit_code(err: &Error) -> Option<u8> {
    err.is_persistence().then_some(PERSISTENCE_EXIT_CODE)
}
