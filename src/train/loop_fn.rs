use std::sync::atomic::Ordering;
use std::time::Instant;

use log::{debug, info};

use crate::data::sample::SampleSource;
use crate::error::{NnError, Result};
use crate::train::coordinator::Coordinator;
use crate::train::cost_window::CostReport;
use crate::train::train_config::TrainConfig;

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Feeds samples from `source` to every replica of `coordinator` and returns
/// the last cost report.
///
/// # Early termination
/// The loop ends when:
/// - `config.steps` steps have run, or the source is exhausted,
/// - the `progress_tx` receiver has been dropped, **or**
/// - `config.stop_flag` (or the coordinator's own stop flag) is set.
///
/// Flags are only checked between steps; a running step always completes.
/// Per-replica sample errors skip that replica's cycle and never end the loop.
pub fn train_loop<S: SampleSource + ?Sized>(
    coordinator: &mut Coordinator,
    source: &mut S,
    config: &TrainConfig,
) -> Result<Option<CostReport>> {
    if config.report_every == 0 {
        return Err(NnError::configuration("report_every must be at least 1"));
    }

    let t_start = Instant::now();
    let mut last_report = None;
    let mut since_report = 0;

    loop {
        if stop_requested(coordinator, config) {
            debug!("stop requested after {} steps", coordinator.steps());
            break;
        }
        if config.steps.is_some_and(|limit| coordinator.steps() >= limit) {
            break;
        }
        let Some(sample) = source.next_sample() else {
            debug!("sample source exhausted after {} steps", coordinator.steps());
            break;
        };

        coordinator.train_sample(&sample)?;
        since_report += 1;

        // ── Report ────────────────────────────────────────────────────────
        if since_report == config.report_every {
            since_report = 0;
            let report = coordinator.report_cost();
            last_report = Some(report.clone());
            if let Some(ref tx) = config.progress_tx {
                // If the receiver has been dropped, stop training.
                if tx.send(report).is_err() {
                    break;
                }
            }
        }
    }

    info!(
        "training loop finished: {} steps in {} ms, {} cycles not yet reported",
        coordinator.steps(),
        t_start.elapsed().as_millis(),
        coordinator.pending_cycles()
    );
    Ok(last_report)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn stop_requested(coordinator: &Coordinator, config: &TrainConfig) -> bool {
    if coordinator.is_stopped() {
        return true;
    }
    match config.stop_flag {
        Some(ref flag) => flag.load(Ordering::Relaxed),
        None => false,
    }
}
