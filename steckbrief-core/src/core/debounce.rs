//! Turns raw keystroke input into rate-limited, de-duplicated search queries.
//!
//! The pipeline is: wait for a quiet period, drop a value equal to the
//! previous quiet-period value, drop values shorter than the minimum length.
//! The de-duplication looks at what survived the quiet period, not at what
//! was finally emitted, so clearing the input and retyping the same query
//! searches again.

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceConfig {
    pub quiet: Duration,
    /// Values with fewer characters than this are never emitted.
    pub min_chars: usize,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            quiet: Duration::from_millis(300),
            min_chars: 2,
        }
    }
}

/// Input side of one debounced query stream.
///
/// Each stream owns its timer; cancelling the token (or dropping every
/// handle) ends the background task and closes the output receiver.
#[derive(Debug)]
pub struct SearchDebouncer {
    input: mpsc::UnboundedSender<String>,
    cancel: CancellationToken,
}

impl SearchDebouncer {
    /// Starts the debounce task on the current tokio runtime.
    ///
    /// Returns the input handle and the receiver of emitted queries.
    #[must_use]
    pub fn spawn(
        config: DebounceConfig,
        cancel: CancellationToken,
    ) -> (Self, mpsc::UnboundedReceiver<String>) {
        let (input_tx, input_rx) = mpsc::unbounded_channel();
        let (output_tx, output_rx) = mpsc::unbounded_channel();
        tokio::spawn(run(config, input_rx, output_tx, cancel.clone()));
        (
            Self {
                input: input_tx,
                cancel,
            },
            output_rx,
        )
    }

    /// Feeds the current text of the input.
    pub fn push(&self, value: impl Into<String>) {
        if self.input.send(value.into()).is_err() {
            log::debug!("debouncer already stopped; input dropped");
        }
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

async fn run(
    config: DebounceConfig,
    mut input: mpsc::UnboundedReceiver<String>,
    output: mpsc::UnboundedSender<String>,
    cancel: CancellationToken,
) {
    let mut pending: Option<String> = None;
    let mut last_settled: Option<String> = None;
    let timer = sleep(config.quiet);
    tokio::pin!(timer);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            next = input.recv() => match next {
                Some(value) => {
                    pending = Some(value);
                    timer.as_mut().reset(Instant::now() + config.quiet);
                }
                None => break,
            },
            _ = &mut timer, if pending.is_some() => {
                let Some(value) = pending.take() else { continue };
                if last_settled.as_deref() == Some(value.as_str()) {
                    continue;
                }
                last_settled = Some(value.clone());
                if value.chars().count() < config.min_chars {
                    continue;
                }
                if output.send(value).is_err() {
                    break;
                }
            }
        }
    }
}
