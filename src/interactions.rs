//! User-facing flows shared by the CLI and the terminal browser. Each pairs a
//! state transition with the toast the user sees afterwards.

use anyhow::{anyhow, Result};
use chrono::Utc;
use tracing::{info, warn};

use crate::auth::{social_user, AuthForm, AuthMode, SocialProvider};
use crate::clipboard::Clipboard;
use crate::db::SliceStore;
use crate::error::BoardError;
use crate::models::{ApplicationId, Education, Experience, JobId, PersonalInfoPatch, Project, Resume, User};
use crate::routes::{share_link, Route};
use crate::state::{next_id, Action, ApplyRequest, Identified};
use crate::store::Store;
use crate::toast::ToastKind;

/// A resume list (experience, education, projects) edited item by item.
pub trait ResumeEntry: Identified + Clone {
    const LABEL: &'static str;
    fn entries(resume: &Resume) -> &[Self];
    fn with_id(self, id: i64) -> Self;
    fn add(self) -> Action;
    fn update(self) -> Action;
    fn delete(id: i64) -> Action;
}

impl ResumeEntry for Experience {
    const LABEL: &'static str = "Experience";
    fn entries(resume: &Resume) -> &[Self] {
        &resume.experience
    }
    fn with_id(self, id: i64) -> Self {
        Self { id, ..self }
    }
    fn add(self) -> Action {
        Action::AddExperience(self)
    }
    fn update(self) -> Action {
        Action::UpdateExperience(self)
    }
    fn delete(id: i64) -> Action {
        Action::DeleteExperience(id)
    }
}

impl ResumeEntry for Education {
    const LABEL: &'static str = "Education";
    fn entries(resume: &Resume) -> &[Self] {
        &resume.education
    }
    fn with_id(self, id: i64) -> Self {
        Self { id, ..self }
    }
    fn add(self) -> Action {
        Action::AddEducation(self)
    }
    fn update(self) -> Action {
        Action::UpdateEducation(self)
    }
    fn delete(id: i64) -> Action {
        Action::DeleteEducation(id)
    }
}

impl ResumeEntry for Project {
    const LABEL: &'static str = "Project";
    fn entries(resume: &Resume) -> &[Self] {
        &resume.projects
    }
    fn with_id(self, id: i64) -> Self {
        Self { id, ..self }
    }
    fn add(self) -> Action {
        Action::AddProject(self)
    }
    fn update(self) -> Action {
        Action::UpdateProject(self)
    }
    fn delete(id: i64) -> Action {
        Action::DeleteProject(id)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub title: Option<String>,
}

impl<S: SliceStore> Store<S> {
    /// Toggles a saved job. Returns whether the job is saved afterwards.
    pub fn toggle_save(&mut self, job_id: JobId) -> Result<bool> {
        let was_saved = self.state().is_job_saved(job_id);
        self.dispatch(Action::ToggleSaveJob(job_id))?;
        if was_saved {
            self.add_toast(ToastKind::Info, None, "Removed from saved jobs");
        } else {
            self.add_toast(ToastKind::Success, None, "Job saved successfully");
        }
        Ok(!was_saved)
    }

    /// Submits an application with a snapshot of the current resume.
    /// Returns `None` when the user is signed out, the job is unknown, or
    /// an application for the job already exists.
    pub fn submit_application(
        &mut self,
        job_id: JobId,
        cover_letter: Option<String>,
    ) -> Result<Option<ApplicationId>> {
        if self.state().user.is_none() {
            self.add_toast(
                ToastKind::Warning,
                Some("Sign in required"),
                "Please sign in to apply for jobs",
            );
            return Ok(None);
        }

        let Some(job) = self.state().job_by_id(job_id) else {
            return Ok(None);
        };
        let (title, company) = (job.title.clone(), job.company.clone());

        if self.state().has_applied(job_id) {
            self.add_toast(ToastKind::Info, None, format!("You already applied to {}", title));
            return Ok(None);
        }

        let cover_letter = cover_letter.filter(|c| !c.trim().is_empty());
        let resume = self.state().resume.clone();
        let before = self.state().applications.len();
        self.dispatch(Action::ApplyToJob(ApplyRequest {
            job_id,
            cover_letter,
            resume: Some(resume),
        }))?;

        let id = match self.state().applications.get(before) {
            Some(app) => app.id,
            None => return Err(anyhow!("No application id left to assign for job #{}", job_id)),
        };

        info!(job_id, application_id = id, "application submitted");
        self.add_toast(
            ToastKind::Success,
            Some("Application Submitted"),
            format!("You've successfully applied to {} at {}", title, company),
        );
        Ok(Some(id))
    }

    /// Copies the job's link. Failure is reported as a toast, never as an error.
    pub fn share_job(&mut self, job_id: JobId, clipboard: &dyn Clipboard, base_url: &str) -> bool {
        let link = share_link(base_url, Route::Job(job_id));
        match clipboard.copy(&link) {
            Ok(()) => {
                self.add_toast(ToastKind::Success, None, "Link copied to clipboard");
                true
            }
            Err(e) => {
                warn!(clipboard = clipboard.name(), error = %e, "failed to copy link");
                self.add_toast(ToastKind::Error, None, "Failed to copy link");
                false
            }
        }
    }

    /// Simulated sign-in. Invalid forms fail with `BoardError::Validation`
    /// and leave the state untouched.
    pub fn sign_in(&mut self, form: AuthForm) -> Result<User> {
        let mode = form.mode;
        let user = form.into_user(Utc::now())?;
        self.dispatch(Action::Login(user.clone()))?;

        let title = match mode {
            AuthMode::SignIn => "Welcome back!",
            AuthMode::SignUp => "Account created!",
        };
        self.add_toast(
            ToastKind::Success,
            Some(title),
            format!("You're now signed in as {}", user.email),
        );
        Ok(user)
    }

    pub fn sign_in_with(&mut self, provider: SocialProvider) -> Result<User> {
        let user = social_user(provider, Utc::now());
        self.dispatch(Action::Login(user.clone()))?;
        self.add_toast(
            ToastKind::Success,
            Some("Welcome!"),
            format!("Signed in with {}", provider.label()),
        );
        Ok(user)
    }

    pub fn sign_out(&mut self) -> Result<()> {
        self.dispatch(Action::Logout)?;
        self.add_toast(ToastKind::Info, None, "You have been signed out");
        Ok(())
    }

    /// Updates the signed-in user and the matching resume contact fields.
    pub fn update_profile(&mut self, update: ProfileUpdate) -> Result<()> {
        let Some(current) = self.state().user.clone() else {
            return Err(anyhow!("Sign in to update your profile"));
        };

        let user = User {
            name: update.name.unwrap_or(current.name),
            email: update.email.unwrap_or(current.email),
            ..current
        };
        self.dispatch(Action::Login(user))?;
        self.dispatch(Action::UpdatePersonalInfo(PersonalInfoPatch {
            phone: update.phone,
            location: update.location,
            title: update.title,
            ..Default::default()
        }))?;
        self.add_toast(ToastKind::Success, None, "Profile updated successfully");
        Ok(())
    }

    // --- Resume editing ---

    pub fn entry<T: ResumeEntry>(&self, id: i64) -> Option<T> {
        T::entries(&self.state().resume).iter().find(|e| e.id() == id).cloned()
    }

    /// Adds an entry under a freshly generated id and returns that id.
    pub fn add_entry<T: ResumeEntry>(&mut self, entry: T) -> Result<i64> {
        let id = next_id(Utc::now(), T::entries(&self.state().resume).iter().map(|e| e.id()))
            .ok_or_else(|| anyhow!("No {} id left to assign", T::LABEL.to_lowercase()))?;
        self.dispatch(entry.with_id(id).add())?;
        self.add_toast(ToastKind::Success, None, format!("{} added", T::LABEL));
        Ok(id)
    }

    /// Replaces the entry with the same id. Returns false if there is none.
    pub fn update_entry<T: ResumeEntry>(&mut self, entry: T) -> Result<bool> {
        let exists = T::entries(&self.state().resume).iter().any(|e| e.id() == entry.id());
        if !exists {
            return Ok(false);
        }
        self.dispatch(entry.update())?;
        self.add_toast(ToastKind::Success, None, format!("{} updated", T::LABEL));
        Ok(true)
    }

    pub fn remove_entry<T: ResumeEntry>(&mut self, id: i64) -> Result<bool> {
        let exists = T::entries(&self.state().resume).iter().any(|e| e.id() == id);
        self.dispatch(T::delete(id))?;
        if exists {
            self.add_toast(ToastKind::Info, None, format!("{} removed", T::LABEL));
        }
        Ok(exists)
    }

    /// Adds a trimmed, non-empty skill. Returns false for blanks and duplicates.
    pub fn add_skill(&mut self, skill: &str) -> Result<bool> {
        let skill = skill.trim();
        if skill.is_empty() || self.state().resume.skills.iter().any(|s| s == skill) {
            return Ok(false);
        }
        self.dispatch(Action::AddSkill(skill.to_string()))?;
        Ok(true)
    }

    pub fn remove_skill(&mut self, skill: &str) -> Result<bool> {
        let present = self.state().resume.skills.iter().any(|s| s == skill);
        self.dispatch(Action::RemoveSkill(skill.to_string()))?;
        Ok(present)
    }
}

/// Pulls the field errors out of a failed sign-in, if that is what failed.
pub fn validation_errors(err: &anyhow::Error) -> Option<&crate::auth::FieldErrors> {
    match err.downcast_ref::<BoardError>() {
        Some(BoardError::Validation(errors)) => Some(errors),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::db::memory::MemoryStore;
    use crate::db::Slice;
    use crate::toast::DEFAULT_TOAST_LIFETIME;
    use std::cell::RefCell;

    fn store() -> Store<MemoryStore> {
        Store::load(MemoryStore::default(), Catalog::builtin().unwrap(), DEFAULT_TOAST_LIFETIME)
            .unwrap()
    }

    fn signed_in() -> Store<MemoryStore> {
        let mut store = store();
        store
            .sign_in(AuthForm {
                mode: AuthMode::SignIn,
                email: "ada@example.com".to_string(),
                password: "secret1".to_string(),
                ..Default::default()
            })
            .unwrap();
        store.take_toasts();
        store
    }

    #[derive(Default)]
    struct RecordingClipboard {
        copied: RefCell<Vec<String>>,
    }

    impl Clipboard for RecordingClipboard {
        fn copy(&self, text: &str) -> Result<()> {
            self.copied.borrow_mut().push(text.to_string());
            Ok(())
        }
        fn name(&self) -> &str {
            "recording"
        }
    }

    struct BrokenClipboard;

    impl Clipboard for BrokenClipboard {
        fn copy(&self, _text: &str) -> Result<()> {
            Err(anyhow!("permission denied"))
        }
        fn name(&self) -> &str {
            "broken"
        }
    }

    #[test]
    fn test_toggle_save_raises_matching_toasts() {
        let mut store = store();
        assert!(store.toggle_save(2).unwrap());
        assert!(!store.toggle_save(2).unwrap());
        let messages: Vec<_> = store.take_toasts().into_iter().map(|t| t.message).collect();
        assert_eq!(messages, vec!["Job saved successfully", "Removed from saved jobs"]);
    }

    #[test]
    fn test_apply_requires_sign_in() {
        let mut store = store();
        assert_eq!(store.submit_application(3, None).unwrap(), None);
        assert!(store.state().applications.is_empty());
        let toast = &store.state().toasts[0];
        assert_eq!(toast.kind, ToastKind::Warning);
        assert_eq!(toast.title.as_deref(), Some("Sign in required"));
    }

    #[test]
    fn test_apply_once_per_job() {
        let mut store = signed_in();
        let id = store.submit_application(3, Some("Hi".to_string())).unwrap();
        assert!(id.is_some());
        assert_eq!(store.submit_application(3, None).unwrap(), None);
        assert_eq!(store.state().applications.len(), 1);
        assert_eq!(
            store.state().toasts[0].message,
            "You've successfully applied to Backend Engineer at CloudScale"
        );
    }

    #[test]
    fn test_apply_to_unknown_job() {
        let mut store = signed_in();
        assert_eq!(store.submit_application(999, None).unwrap(), None);
        assert!(store.state().applications.is_empty());
    }

    #[test]
    fn test_blank_cover_letter_is_dropped() {
        let mut store = signed_in();
        store.submit_application(1, Some("   ".to_string())).unwrap();
        assert_eq!(store.state().applications[0].cover_letter, None);
    }

    #[test]
    fn test_share_copies_job_link() {
        let mut store = store();
        let clipboard = RecordingClipboard::default();
        assert!(store.share_job(3, &clipboard, "http://localhost:5173"));
        assert_eq!(clipboard.copied.borrow().as_slice(), ["http://localhost:5173/job/3"]);
        assert_eq!(store.state().toasts[0].message, "Link copied to clipboard");
    }

    #[test]
    fn test_share_failure_becomes_error_toast() {
        let mut store = store();
        assert!(!store.share_job(3, &BrokenClipboard, "http://localhost:5173"));
        let toast = &store.state().toasts[0];
        assert_eq!(toast.kind, ToastKind::Error);
        assert_eq!(toast.message, "Failed to copy link");
    }

    #[test]
    fn test_invalid_sign_in_leaves_user_unset() {
        let mut store = store();
        let err = store
            .sign_in(AuthForm {
                mode: AuthMode::SignIn,
                email: "nope".to_string(),
                password: "123".to_string(),
                ..Default::default()
            })
            .unwrap_err();
        let errors = validation_errors(&err).unwrap();
        assert_eq!(errors.email.as_deref(), Some("Invalid email format"));
        assert!(store.state().user.is_none());
        assert_eq!(store.storage().writes(Slice::User), 0);
    }

    #[test]
    fn test_sign_up_and_out() {
        let mut store = store();
        let user = store
            .sign_in(AuthForm {
                mode: AuthMode::SignUp,
                name: "Ada Lovelace".to_string(),
                email: "ada@example.com".to_string(),
                password: "secret1".to_string(),
            })
            .unwrap();
        assert_eq!(user.name, "Ada Lovelace");
        assert_eq!(store.state().toasts[0].title.as_deref(), Some("Account created!"));

        store.sign_out().unwrap();
        assert!(store.state().user.is_none());
        assert_eq!(store.storage().value(Slice::User).as_deref(), Some("null"));
    }

    #[test]
    fn test_social_sign_in() {
        let mut store = store();
        let user = store.sign_in_with(SocialProvider::Linkedin).unwrap();
        assert_eq!(user.email, "user@linkedin.com");
        assert_eq!(store.state().user.as_ref(), Some(&user));
    }

    #[test]
    fn test_update_profile_touches_user_and_resume() {
        let mut store = signed_in();
        store
            .update_profile(ProfileUpdate {
                name: Some("Ada".to_string()),
                phone: Some("555-0100".to_string()),
                title: Some("Engineer".to_string()),
                ..Default::default()
            })
            .unwrap();
        let state = store.state();
        let user = state.user.as_ref().unwrap();
        assert_eq!(user.name, "Ada");
        assert_eq!(user.email, "ada@example.com");
        assert_eq!(state.resume.personal_info.phone, "555-0100");
        assert_eq!(state.resume.personal_info.title, "Engineer");
    }

    #[test]
    fn test_update_profile_requires_user() {
        let mut store = store();
        assert!(store.update_profile(ProfileUpdate::default()).is_err());
    }

    #[test]
    fn test_resume_entry_lifecycle() {
        let mut store = store();
        let id = store
            .add_entry(Experience {
                title: "Engineer".to_string(),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(store.state().resume.experience[0].id, id);

        let updated = store
            .update_entry(Experience {
                id,
                title: "Staff Engineer".to_string(),
                ..Default::default()
            })
            .unwrap();
        assert!(updated);
        assert_eq!(store.state().resume.experience[0].title, "Staff Engineer");

        assert!(!store.update_entry(Experience { id: id + 1, ..Default::default() }).unwrap());
        assert!(store.remove_entry::<Experience>(id).unwrap());
        assert!(!store.remove_entry::<Experience>(id).unwrap());

        let messages: Vec<_> = store.take_toasts().into_iter().map(|t| t.message).collect();
        assert_eq!(
            messages,
            vec!["Experience added", "Experience updated", "Experience removed"]
        );
    }

    #[test]
    fn test_entry_ids_unique_when_added_quickly() {
        let mut store = store();
        let a = store.add_entry(Project::default()).unwrap();
        let b = store.add_entry(Project::default()).unwrap();
        assert_ne!(a, b);
        assert_eq!(store.state().resume.projects.len(), 2);
    }

    #[test]
    fn test_add_entry_fails_when_ids_exhausted() {
        let mut store = store();
        store
            .dispatch(Action::UpdateResume(crate::models::ResumePatch {
                experience: Some(vec![Experience {
                    id: i64::MAX,
                    ..Default::default()
                }]),
                ..Default::default()
            }))
            .unwrap();
        assert!(store.add_entry(Experience::default()).is_err());
        assert_eq!(store.state().resume.experience.len(), 1);
    }

    #[test]
    fn test_apply_fails_when_ids_exhausted() {
        let json = format!(
            r#"[{{"id":{},"jobId":1,"appliedAt":"2024-12-10T09:30:00Z","status":"pending","resume":{{}}}}]"#,
            i64::MAX
        );
        let mut store = Store::load(
            MemoryStore::with(Slice::Applications, &json),
            Catalog::builtin().unwrap(),
            DEFAULT_TOAST_LIFETIME,
        )
        .unwrap();
        store.dispatch(Action::Login(crate::models::User {
            id: 1,
            name: "ada".to_string(),
            email: "ada@example.com".to_string(),
            avatar: None,
        }))
        .unwrap();
        assert!(store.submit_application(3, None).is_err());
        assert_eq!(store.state().applications.len(), 1);
    }

    #[test]
    fn test_skills_are_trimmed_and_unique() {
        let mut store = store();
        assert!(store.add_skill(" Rust ").unwrap());
        assert!(!store.add_skill("Rust").unwrap());
        assert!(!store.add_skill("   ").unwrap());
        assert_eq!(store.state().resume.skills, vec!["Rust".to_string()]);
        assert!(store.remove_skill("Rust").unwrap());
        assert!(!store.remove_skill("Rust").unwrap());
    }
}
