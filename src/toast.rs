use std::collections::BTreeMap;
use std::time::{Duration, Instant};

pub type ToastId = u64;

pub const DEFAULT_TOAST_LIFETIME: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub id: ToastId,
    pub kind: ToastKind,
    pub title: Option<String>,
    pub message: String,
}

/// Pending expiry deadlines, one per live toast.
#[derive(Debug, Default)]
pub struct ToastScheduler {
    deadlines: BTreeMap<ToastId, Instant>,
}

impl ToastScheduler {
    pub fn schedule(&mut self, id: ToastId, deadline: Instant) {
        self.deadlines.insert(id, deadline);
    }

    /// Drops the expiry for `id`. Returns false if nothing was scheduled.
    pub fn cancel(&mut self, id: ToastId) -> bool {
        self.deadlines.remove(&id).is_some()
    }

    /// Removes and returns every id whose deadline is at or before `now`, oldest id first.
    pub fn due(&mut self, now: Instant) -> Vec<ToastId> {
        let due: Vec<ToastId> = self
            .deadlines
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(id, _)| *id)
            .collect();
        for id in &due {
            self.deadlines.remove(id);
        }
        due
    }

    pub fn pending(&self) -> usize {
        self.deadlines.len()
    }

    pub fn clear(&mut self) {
        self.deadlines.clear();
    }
}
