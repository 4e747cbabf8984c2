//! The interactive check-in loop.
//!
//! Call signs are read one per line. Each one is handed to its own task, so
//! the prompt comes straight back while the registry lookup is in flight;
//! results are printed as they complete.

use crate::state::AppState;
use netlog_db::checkins;
use netlog_lookup::ResolutionOutcome;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufRead, Lines};
use tokio::task::JoinSet;

/// Line-oriented console output shared between the prompt and the tasks.
#[derive(Clone)]
pub struct Console {
    out: Arc<Mutex<dyn Write + Send>>,
}

impl Console {
    /// Console writing to standard output.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    /// Console writing to any writer.
    pub fn new(out: impl Write + Send + 'static) -> Self {
        Self {
            out: Arc::new(Mutex::new(out)),
        }
    }

    fn write(&self, text: &str) {
        if let Ok(mut out) = self.out.lock() {
            let _ = out.write_all(text.as_bytes());
            let _ = out.flush();
        }
    }

    /// Print a prompt without a trailing newline.
    pub fn prompt(&self, text: &str) {
        self.write(text);
    }

    /// Print one line.
    pub fn line(&self, text: &str) {
        self.write(&format!("{text}\n"));
    }
}

/// What happened to the call signs entered in one session.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    /// Call signs handed to a check-in task
    pub submitted: usize,
    /// Check-ins appended to the database
    pub stored: usize,
    /// Check-ins rejected or lost to a database error
    pub storage_failures: usize,
}

/// Ask which repeater the net is on.
///
/// With `accept_defaults` the default is used without asking; otherwise a
/// blank answer or end of input selects it.
pub async fn read_repeater<R>(
    lines: &mut Lines<R>,
    console: &Console,
    default: &str,
    accept_defaults: bool,
) -> io::Result<String>
where
    R: AsyncBufRead + Unpin,
{
    let repeater = if accept_defaults {
        default.to_string()
    } else {
        console.prompt(&format!("Repeater (default: {default}): "));
        match lines.next_line().await? {
            Some(answer) if !answer.trim().is_empty() => answer.trim().to_uppercase(),
            _ => default.to_string(),
        }
    };
    console.line(&format!("Using repeater: {repeater}"));
    Ok(repeater)
}

/// Resolve one call sign, store it, and report the result.
///
/// Returns whether the check-in was stored.
pub async fn check_in(state: Arc<AppState>, call_sign: String, console: Console) -> bool {
    let resolution = match state.resolver.resolve(&call_sign, &state.repeater).await {
        Ok(resolution) => resolution,
        Err(e) => {
            tracing::error!(call_sign = %call_sign, error = %e, "Check-in rejected");
            console.line(&format!("Could not check in '{call_sign}': {e}"));
            return false;
        }
    };

    match checkins::insert_checkin(state.database.pool(), &resolution.record).await {
        Ok(id) => {
            tracing::debug!(call_sign = %resolution.record.call_sign, id, "Check-in recorded");
            match &resolution.outcome {
                ResolutionOutcome::Found(_) => console.line(&resolution.record.to_string()),
                outcome => console.line(&format!("{} ({outcome})", resolution.record)),
            }
            true
        }
        Err(e) => {
            tracing::error!(
                call_sign = %resolution.record.call_sign,
                error = %e,
                "Failed to store check-in"
            );
            console.line(&format!(
                "Could not save check-in for {}: {e}",
                resolution.record.call_sign
            ));
            false
        }
    }
}

/// Read call signs until end of input, checking each one in concurrently.
///
/// Waits for every in-flight check-in before returning. Dropping the returned
/// future aborts the check-ins still running.
pub async fn run_checkins<R>(
    state: Arc<AppState>,
    lines: &mut Lines<R>,
    console: &Console,
) -> io::Result<SessionSummary>
where
    R: AsyncBufRead + Unpin,
{
    let mut summary = SessionSummary::default();
    let mut tasks = JoinSet::new();

    loop {
        while let Some(result) = tasks.try_join_next() {
            record(&mut summary, result);
        }

        console.prompt("Callsign: ");
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let call_sign = line.trim().to_uppercase();
        if call_sign.is_empty() {
            continue;
        }

        summary.submitted += 1;
        tasks.spawn(check_in(state.clone(), call_sign, console.clone()));
    }

    console.line("");
    if !tasks.is_empty() {
        tracing::info!("Waiting for {} check-in(s) to finish", tasks.len());
    }
    while let Some(result) = tasks.join_next().await {
        record(&mut summary, result);
    }

    tracing::info!(
        submitted = summary.submitted,
        stored = summary.stored,
        storage_failures = summary.storage_failures,
        "Session ended"
    );
    Ok(summary)
}

fn record(summary: &mut SessionSummary, result: Result<bool, tokio::task::JoinError>) {
    match result {
        Ok(true) => summary.stored += 1,
        Ok(false) => summary.storage_failures += 1,
        Err(e) => tracing::error!(error = %e, "Check-in task failed"),
    }
}
