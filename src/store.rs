use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::catalog::Catalog;
use crate::db::{Slice, SliceStore};
use crate::models::{Application, JobId, Resume, User};
use crate::state::{reduce, Action, AppState};
use crate::toast::{Toast, ToastId, ToastKind, ToastScheduler};

/// Last values written to storage, used to detect which slices changed.
#[derive(Debug, Default)]
struct Persisted {
    saved_jobs: Vec<JobId>,
    applications: Vec<Application>,
    user: Option<User>,
    resume: Resume,
}

/// Owns the state tree, mirrors the persisted slices into `S`, and expires toasts.
pub struct Store<S: SliceStore> {
    storage: S,
    state: AppState,
    persisted: Persisted,
    scheduler: ToastScheduler,
    toast_lifetime: Duration,
    next_toast_id: ToastId,
}

impl<S: SliceStore> Store<S> {
    pub fn load(storage: S, catalog: Catalog, toast_lifetime: Duration) -> Result<Self> {
        let saved_jobs: Vec<JobId> = read_slice(&storage, Slice::SavedJobs)?.unwrap_or_default();
        let applications: Vec<Application> =
            read_slice(&storage, Slice::Applications)?.unwrap_or_default();
        let user: Option<User> = read_slice::<Option<User>>(&storage, Slice::User)?.flatten();
        let resume: Resume = read_slice(&storage, Slice::Resume)?.unwrap_or_default();

        debug!(
            saved = saved_jobs.len(),
            applications = applications.len(),
            signed_in = user.is_some(),
            "loaded persisted state"
        );

        let mut state = AppState::new(catalog);
        state.saved_jobs = saved_jobs.clone();
        state.applications = applications.clone();
        state.user = user.clone();
        state.resume = resume.clone();

        Ok(Self {
            storage,
            state,
            persisted: Persisted {
                saved_jobs,
                applications,
                user,
                resume,
            },
            scheduler: ToastScheduler::default(),
            toast_lifetime,
            next_toast_id: 1,
        })
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn dispatch(&mut self, action: Action) -> Result<()> {
        self.dispatch_at(action, Utc::now())
    }

    pub fn dispatch_at(&mut self, action: Action, now: DateTime<Utc>) -> Result<()> {
        self.transition(action, now);
        self.persist_changed()
    }

    fn transition(&mut self, action: Action, now: DateTime<Utc>) {
        debug!(?action, "dispatch");
        let current = std::mem::take(&mut self.state);
        self.state = reduce(current, action, now);
    }

    fn persist_changed(&mut self) -> Result<()> {
        if self.state.saved_jobs != self.persisted.saved_jobs {
            write_slice(&self.storage, Slice::SavedJobs, &self.state.saved_jobs)?;
            self.persisted.saved_jobs = self.state.saved_jobs.clone();
        }
        if self.state.applications != self.persisted.applications {
            write_slice(&self.storage, Slice::Applications, &self.state.applications)?;
            self.persisted.applications = self.state.applications.clone();
        }
        if self.state.user != self.persisted.user {
            write_slice(&self.storage, Slice::User, &self.state.user)?;
            self.persisted.user = self.state.user.clone();
        }
        if self.state.resume != self.persisted.resume {
            write_slice(&self.storage, Slice::Resume, &self.state.resume)?;
            self.persisted.resume = self.state.resume.clone();
        }
        Ok(())
    }

    // --- Toasts ---

    pub fn add_toast(&mut self, kind: ToastKind, title: Option<&str>, message: impl Into<String>) -> ToastId {
        self.add_toast_at(kind, title, message, Instant::now())
    }

    pub fn add_toast_at(
        &mut self,
        kind: ToastKind,
        title: Option<&str>,
        message: impl Into<String>,
        now: Instant,
    ) -> ToastId {
        let id = self.next_toast_id;
        self.next_toast_id += 1;

        let toast = Toast {
            id,
            kind,
            title: title.map(str::to_string),
            message: message.into(),
        };
        self.transition(Action::AddToast(toast), Utc::now());
        self.scheduler.schedule(id, now + self.toast_lifetime);
        id
    }

    /// Removes a toast before it expires. Unknown ids are ignored.
    pub fn dismiss_toast(&mut self, id: ToastId) {
        self.scheduler.cancel(id);
        self.transition(Action::RemoveToast(id), Utc::now());
    }

    /// Removes every toast whose lifetime has elapsed. Returns how many were removed.
    pub fn expire_toasts(&mut self, now: Instant) -> usize {
        let due = self.scheduler.due(now);
        for id in &due {
            self.transition(Action::RemoveToast(*id), Utc::now());
        }
        if !due.is_empty() {
            debug!(expired = due.len(), pending = self.scheduler.pending(), "expired toasts");
        }
        due.len()
    }

    /// Drains all toasts, e.g. to print them once a command finishes.
    pub fn take_toasts(&mut self) -> Vec<Toast> {
        let toasts = self.state.toasts.clone();
        for toast in &toasts {
            self.dismiss_toast(toast.id);
        }
        self.scheduler.clear();
        toasts
    }
}

fn read_slice<T: DeserializeOwned>(storage: &impl SliceStore, slice: Slice) -> Result<Option<T>> {
    let Some(json) = storage.read(slice)? else {
        return Ok(None);
    };
    match serde_json::from_str(&json) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            warn!(slice = slice.key(), error = %e, "ignoring malformed stored slice");
            Ok(None)
        }
    }
}

fn write_slice<T: Serialize>(storage: &impl SliceStore, slice: Slice, value: &T) -> Result<()> {
    let json = serde_json::to_string(value)
        .with_context(|| format!("Failed to serialize slice '{}'", slice.key()))?;
    storage.write(slice, &json)?;
    debug!(slice = slice.key(), bytes = json.len(), "persisted slice");
    Ok(())
}
