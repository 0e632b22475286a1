use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub enum MapStatus {
    Closed,
    Loading,
    Ready,
    /// Map never signalled readiness; the manual-entry fallback is shown.
    Error,
}

/// Readiness of the interactive map picker. The ready timeout is a deadline
/// armed on `open` and dropped by `mark_ready` or `close`.
#[derive(Clone, Debug)]
pub struct MapPicker {
    status: MapStatus,
    deadline: Option<Instant>,
    ready_timeout: Duration,
}

impl MapPicker {
    pub fn new(ready_timeout: Duration) -> Self {
        Self {
            status: MapStatus::Closed,
            deadline: None,
            ready_timeout,
        }
    }

    pub fn status(&self) -> MapStatus {
        self.status
    }

    pub fn is_open(&self) -> bool {
        self.status != MapStatus::Closed
    }

    pub fn shows_manual_fallback(&self) -> bool {
        self.status == MapStatus::Error
    }

    /// Every open starts over in `Loading`, whatever happened last time.
    pub fn open(&mut self, now: Instant) {
        self.status = MapStatus::Loading;
        self.deadline = Some(now + self.ready_timeout);
    }

    pub fn mark_ready(&mut self) {
        if self.status == MapStatus::Loading {
            self.status = MapStatus::Ready;
            self.deadline = None;
        }
    }

    pub fn close(&mut self) {
        self.status = MapStatus::Closed;
        self.deadline = None;
    }

    /// Fires the ready timeout if it is due.
    pub fn tick(&mut self, now: Instant) -> MapStatus {
        if let Some(deadline) = self.deadline {
            if self.status == MapStatus::Loading && now >= deadline {
                warn!("Map did not become ready within {:?}, falling back to manual entry", self.ready_timeout);
                self.status = MapStatus::Error;
                self.deadline = None;
            }
        }
        self.status
    }
}
