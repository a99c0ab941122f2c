// ABOUTME: Progress events emitted once per processed container during an extraction.
// ABOUTME: Sinks can be closures, tokio channels, or NoProgress; the extractor works with none.

use tokio::sync::mpsc::UnboundedSender;

/// `completed` of `total` containers have been processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

/// Receives progress events.
pub trait ProgressSink {
    fn report(&mut self, progress: Progress);
}

impl<F> ProgressSink for F
where
    F: FnMut(Progress),
{
    fn report(&mut self, progress: Progress) {
        self(progress)
    }
}

/// Forwards events to a channel. A dropped receiver is ignored.
impl ProgressSink for UnboundedSender<Progress> {
    fn report(&mut self, progress: Progress) {
        let _ = self.send(progress);
    }
}

/// Discards all events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&mut self, _progress: Progress) {}
}
