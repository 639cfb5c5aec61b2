//! Waiting on task events

use media_dl::{Event, Observer, TaskId};
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;

/// Result of waiting for a task to reach a terminal event
#[derive(Debug)]
pub enum WaitResult {
    /// Task finished with this filename and size
    Finished { filename: String, file_size: u64 },
    /// Task failed with this description
    Failed(String),
    /// No terminal event within the timeout
    Timeout,
    /// Event channel closed unexpectedly
    ChannelClosed,
}

/// Collect every event for `id` until `finished` or `error`
///
/// Events for other tasks are skipped. The observer must have been
/// subscribed before the task was submitted.
pub async fn collect_task_events(
    observer: &mut Observer,
    id: &TaskId,
    timeout: Duration,
) -> (Vec<Event>, WaitResult) {
    let mut events = Vec::new();

    let result = tokio::time::timeout(timeout, async {
        loop {
            match observer.recv().await {
                Ok(event) if event.id() == id => {
                    let outcome = match &event {
                        Event::Finished {
                            filename,
                            file_size,
                            ..
                        } => Some(WaitResult::Finished {
                            filename: filename.clone(),
                            file_size: *file_size,
                        }),
                        Event::Error { error, .. } => Some(WaitResult::Failed(error.clone())),
                        Event::Progress { .. } => None,
                    };
                    events.push(event);
                    if let Some(outcome) = outcome {
                        return outcome;
                    }
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    panic!("test observer lagged by {skipped} events");
                }
                Err(RecvError::Closed) => return WaitResult::ChannelClosed,
            }
        }
    })
    .await;

    (events, result.unwrap_or(WaitResult::Timeout))
}

/// Progress statuses in order, plus `finished`/`error` for the terminal event
pub fn event_labels(events: &[Event]) -> Vec<String> {
    events
        .iter()
        .map(|event| match event {
            Event::Progress { status, .. } => serde_json::to_value(status)
                .ok()
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_default(),
            other => other.event_type().to_string(),
        })
        .collect()
}
