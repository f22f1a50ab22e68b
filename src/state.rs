use chrono::{DateTime, Utc};

use crate::catalog::Catalog;
use crate::models::{
    Application, ApplicationId, ApplicationStatus, Education, Experience, Filters, FiltersPatch,
    JobId, PersonalInfoPatch, Project, Resume, ResumePatch, User,
};
use crate::toast::{Toast, ToastId};

/// The whole state tree. Only `reduce` produces new versions of it.
#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub catalog: Catalog,
    pub saved_jobs: Vec<JobId>,
    pub applications: Vec<Application>,
    pub user: Option<User>,
    pub resume: Resume,
    pub filters: Filters,
    pub toasts: Vec<Toast>,
}

impl AppState {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            saved_jobs: Vec::new(),
            applications: Vec::new(),
            user: None,
            resume: Resume::default(),
            filters: Filters::default(),
            toasts: Vec::new(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Catalog::default())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApplyRequest {
    pub job_id: JobId,
    pub cover_letter: Option<String>,
    /// Resume to attach; the live resume is copied when absent.
    pub resume: Option<Resume>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SetFilters(FiltersPatch),
    ResetFilters,
    ToggleSaveJob(JobId),
    ApplyToJob(ApplyRequest),
    UpdateApplicationStatus {
        id: ApplicationId,
        status: ApplicationStatus,
    },
    Login(User),
    Logout,
    UpdateResume(ResumePatch),
    UpdatePersonalInfo(PersonalInfoPatch),
    AddExperience(Experience),
    UpdateExperience(Experience),
    DeleteExperience(i64),
    AddEducation(Education),
    UpdateEducation(Education),
    DeleteEducation(i64),
    AddProject(Project),
    UpdateProject(Project),
    DeleteProject(i64),
    AddSkill(String),
    RemoveSkill(String),
    AddToast(Toast),
    RemoveToast(ToastId),
}

/// Applies one action. `now` stamps new applications and seeds their ids.
pub fn reduce(mut state: AppState, action: Action, now: DateTime<Utc>) -> AppState {
    match action {
        Action::SetFilters(patch) => {
            let filters = &mut state.filters;
            if let Some(search) = patch.search {
                filters.search = search;
            }
            if let Some(location) = patch.location {
                filters.location = location;
            }
            if let Some(job_type) = patch.job_type {
                filters.job_type = job_type;
            }
            if let Some(level) = patch.experience_level {
                filters.experience_level = level;
            }
            if let Some(range) = patch.salary_range {
                filters.salary_range = range;
            }
            if let Some(category) = patch.category {
                filters.category = category;
            }
        }

        Action::ResetFilters => {
            state.filters = Filters::default();
        }

        Action::ToggleSaveJob(job_id) => {
            if state.saved_jobs.contains(&job_id) {
                state.saved_jobs.retain(|id| *id != job_id);
            } else {
                state.saved_jobs.push(job_id);
            }
        }

        Action::ApplyToJob(request) => {
            if !state.catalog.jobs().iter().any(|j| j.id == request.job_id) {
                return state;
            }
            let Some(id) = next_id(now, state.applications.iter().map(|a| a.id)) else {
                return state;
            };
            let resume = request.resume.unwrap_or_else(|| state.resume.clone());
            state.applications.push(Application {
                id,
                job_id: request.job_id,
                applied_at: now,
                status: ApplicationStatus::Pending,
                cover_letter: request.cover_letter,
                resume,
            });
        }

        Action::UpdateApplicationStatus { id, status } => {
            if let Some(app) = state.applications.iter_mut().find(|a| a.id == id) {
                app.status = status;
            }
        }

        Action::Login(user) => {
            state.user = Some(user);
        }

        Action::Logout => {
            state.user = None;
        }

        Action::UpdateResume(patch) => {
            let resume = &mut state.resume;
            if let Some(info) = patch.personal_info {
                resume.personal_info = info;
            }
            if let Some(experience) = patch.experience {
                resume.experience = experience;
            }
            if let Some(education) = patch.education {
                resume.education = education;
            }
            if let Some(skills) = patch.skills {
                resume.skills = skills;
            }
            if let Some(projects) = patch.projects {
                resume.projects = projects;
            }
        }

        Action::UpdatePersonalInfo(patch) => {
            let info = &mut state.resume.personal_info;
            if let Some(v) = patch.full_name {
                info.full_name = v;
            }
            if let Some(v) = patch.email {
                info.email = v;
            }
            if let Some(v) = patch.phone {
                info.phone = v;
            }
            if let Some(v) = patch.location {
                info.location = v;
            }
            if let Some(v) = patch.title {
                info.title = v;
            }
            if let Some(v) = patch.summary {
                info.summary = v;
            }
        }

        Action::AddExperience(item) => state.resume.experience.push(item),
        Action::UpdateExperience(item) => replace_by_id(&mut state.resume.experience, item),
        Action::DeleteExperience(id) => state.resume.experience.retain(|e| e.id != id),

        Action::AddEducation(item) => state.resume.education.push(item),
        Action::UpdateEducation(item) => replace_by_id(&mut state.resume.education, item),
        Action::DeleteEducation(id) => state.resume.education.retain(|e| e.id != id),

        Action::AddProject(item) => state.resume.projects.push(item),
        Action::UpdateProject(item) => replace_by_id(&mut state.resume.projects, item),
        Action::DeleteProject(id) => state.resume.projects.retain(|p| p.id != id),

        Action::AddSkill(skill) => {
            if !state.resume.skills.contains(&skill) {
                state.resume.skills.push(skill);
            }
        }

        Action::RemoveSkill(skill) => {
            state.resume.skills.retain(|s| *s != skill);
        }

        Action::AddToast(toast) => state.toasts.push(toast),
        Action::RemoveToast(id) => state.toasts.retain(|t| t.id != id),
    }

    state
}

/// Resume list entries addressed by id.
pub trait Identified {
    fn id(&self) -> i64;
}

impl Identified for Experience {
    fn id(&self) -> i64 {
        self.id
    }
}

impl Identified for Education {
    fn id(&self) -> i64 {
        self.id
    }
}

impl Identified for Project {
    fn id(&self) -> i64 {
        self.id
    }
}

fn replace_by_id<T: Identified>(items: &mut [T], item: T) {
    if let Some(slot) = items.iter_mut().find(|existing| existing.id() == item.id()) {
        *slot = item;
    }
}

/// Millisecond timestamp id, bumped past the largest existing id so ids stay unique
/// and increase in creation order. `None` once the largest id is `i64::MAX`.
pub fn next_id(now: DateTime<Utc>, existing: impl Iterator<Item = i64>) -> Option<i64> {
    let millis = now.timestamp_millis();
    match existing.max() {
        Some(max) if max >= millis => max.checked_add(1),
        _ => Some(millis),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fixtures::{company, job};
    use crate::models::{ExperienceLevel, JobType};
    use crate::toast::ToastKind;
    use chrono::TimeZone;

    fn state() -> AppState {
        let catalog = Catalog::new(
            vec![job(1, "Frontend", 100, 200), job(3, "Backend", 100, 200)],
            vec![company(1, "Acme"), company(3, "Globex")],
        )
        .unwrap();
        AppState::new(catalog)
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 12, 10, 9, 30, 0).unwrap()
    }

    fn apply(state: AppState, job_id: JobId) -> AppState {
        reduce(
            state,
            Action::ApplyToJob(ApplyRequest {
                job_id,
                cover_letter: None,
                resume: None,
            }),
            now(),
        )
    }

    fn experience(id: i64, title: &str) -> Experience {
        Experience {
            id,
            title: title.to_string(),
            company: "Acme".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_toggle_save_twice_restores_membership() {
        let state = reduce(state(), Action::ToggleSaveJob(3), now());
        assert_eq!(state.saved_jobs, vec![3]);
        let state = reduce(state, Action::ToggleSaveJob(1), now());
        let state = reduce(state, Action::ToggleSaveJob(3), now());
        assert_eq!(state.saved_jobs, vec![1]);
        let state = reduce(state, Action::ToggleSaveJob(3), now());
        assert_eq!(state.saved_jobs, vec![1, 3]);
    }

    #[test]
    fn test_set_filters_merges_only_given_fields() {
        let state = reduce(
            state(),
            Action::SetFilters(FiltersPatch {
                search: Some("rust".to_string()),
                job_type: Some(vec![JobType::Contract]),
                ..Default::default()
            }),
            now(),
        );
        let state = reduce(
            state,
            Action::SetFilters(FiltersPatch {
                location: Some("Austin".to_string()),
                ..Default::default()
            }),
            now(),
        );
        assert_eq!(state.filters.search, "rust");
        assert_eq!(state.filters.location, "Austin");
        assert_eq!(state.filters.job_type, vec![JobType::Contract]);
        assert_eq!(state.filters.salary_range, (0, 300_000));
    }

    #[test]
    fn test_reset_filters_restores_defaults_exactly() {
        let state = reduce(
            state(),
            Action::SetFilters(FiltersPatch {
                search: Some("x".to_string()),
                location: Some("y".to_string()),
                job_type: Some(vec![JobType::Remote]),
                experience_level: Some(vec![ExperienceLevel::Lead]),
                salary_range: Some((10, 20)),
                category: Some("Design".to_string()),
            }),
            now(),
        );
        let state = reduce(state, Action::ResetFilters, now());
        assert_eq!(state.filters, Filters::default());
        assert_eq!(state.filters.salary_range, (0, 300_000));
    }

    #[test]
    fn test_apply_then_update_status() {
        let state = apply(state(), 3);
        assert_eq!(state.applications.len(), 1);
        let app = &state.applications[0];
        assert_eq!(app.status, ApplicationStatus::Pending);
        assert_eq!(app.applied_at, now());
        assert_eq!(app.id, now().timestamp_millis());

        let id = app.id;
        let state = reduce(
            state,
            Action::UpdateApplicationStatus {
                id,
                status: ApplicationStatus::Interview,
            },
            now(),
        );
        let for_job: Vec<_> = state.applications.iter().filter(|a| a.job_id == 3).collect();
        assert_eq!(for_job.len(), 1);
        assert_eq!(for_job[0].status, ApplicationStatus::Interview);
    }

    #[test]
    fn test_application_ids_unique_within_same_instant() {
        let state = apply(apply(apply(state(), 1), 3), 1);
        let ids: Vec<_> = state.applications.iter().map(|a| a.id).collect();
        assert_eq!(ids.len(), 3);
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_apply_to_unknown_job_is_ignored() {
        let state = apply(state(), 99);
        assert!(state.applications.is_empty());
    }

    #[test]
    fn test_update_status_of_unknown_application_is_ignored() {
        let before = apply(state(), 1);
        let after = reduce(
            before.clone(),
            Action::UpdateApplicationStatus {
                id: 42,
                status: ApplicationStatus::Accepted,
            },
            now(),
        );
        assert_eq!(before, after);
    }

    #[test]
    fn test_application_keeps_resume_snapshot() {
        let state = reduce(state(), Action::AddSkill("Rust".to_string()), now());
        let state = apply(state, 1);
        let state = reduce(state, Action::AddSkill("Go".to_string()), now());
        let state = reduce(state, Action::AddExperience(experience(1, "Engineer")), now());

        let snapshot = &state.applications[0].resume;
        assert_eq!(snapshot.skills, vec!["Rust".to_string()]);
        assert!(snapshot.experience.is_empty());
        assert_eq!(state.resume.skills.len(), 2);
    }

    #[test]
    fn test_add_skill_ignores_duplicates() {
        let state = reduce(state(), Action::AddSkill("Python".to_string()), now());
        let state = reduce(state, Action::AddSkill("Python".to_string()), now());
        assert_eq!(state.resume.skills, vec!["Python".to_string()]);
    }

    #[test]
    fn test_remove_skill() {
        let state = reduce(state(), Action::AddSkill("Python".to_string()), now());
        let state = reduce(state, Action::AddSkill("SQL".to_string()), now());
        let state = reduce(state, Action::RemoveSkill("Python".to_string()), now());
        assert_eq!(state.resume.skills, vec!["SQL".to_string()]);
    }

    #[test]
    fn test_experience_update_and_delete_by_id() {
        let state = reduce(state(), Action::AddExperience(experience(1, "Engineer")), now());
        let state = reduce(state, Action::AddExperience(experience(2, "Manager")), now());
        let state = reduce(state, Action::UpdateExperience(experience(2, "Director")), now());
        assert_eq!(state.resume.experience[1].title, "Director");

        let state = reduce(state, Action::UpdateExperience(experience(9, "Ghost")), now());
        assert_eq!(state.resume.experience.len(), 2);

        let state = reduce(state, Action::DeleteExperience(1), now());
        assert_eq!(state.resume.experience.len(), 1);
        assert_eq!(state.resume.experience[0].id, 2);
    }

    #[test]
    fn test_delete_unknown_experience_leaves_list_unchanged() {
        let state = reduce(state(), Action::AddExperience(experience(1, "Engineer")), now());
        let before = state.resume.experience.clone();
        let state = reduce(state, Action::DeleteExperience(404), now());
        assert_eq!(state.resume.experience, before);
    }

    #[test]
    fn test_education_and_projects_follow_list_semantics() {
        let edu = Education {
            id: 5,
            degree: "BSc".to_string(),
            ..Default::default()
        };
        let project = Project {
            id: 6,
            name: "jobhunt".to_string(),
            ..Default::default()
        };
        let state = reduce(state(), Action::AddEducation(edu.clone()), now());
        let state = reduce(state, Action::AddProject(project.clone()), now());
        let state = reduce(
            state,
            Action::UpdateEducation(Education {
                degree: "MSc".to_string(),
                ..edu
            }),
            now(),
        );
        assert_eq!(state.resume.education[0].degree, "MSc");
        let state = reduce(
            state,
            Action::UpdateProject(Project {
                name: "jobboard".to_string(),
                ..project.clone()
            }),
            now(),
        );
        assert_eq!(state.resume.projects[0].name, "jobboard");

        let before = state.resume.clone();
        let state = reduce(
            state,
            Action::UpdateEducation(Education {
                id: 99,
                degree: "PhD".to_string(),
                ..Default::default()
            }),
            now(),
        );
        let state = reduce(
            state,
            Action::UpdateProject(Project {
                id: 99,
                ..project
            }),
            now(),
        );
        assert_eq!(state.resume, before);

        let state = reduce(state, Action::DeleteProject(6), now());
        let state = reduce(state, Action::DeleteEducation(5), now());
        assert!(state.resume.projects.is_empty());
        assert!(state.resume.education.is_empty());
    }

    #[test]
    fn test_personal_info_merge() {
        let state = reduce(
            state(),
            Action::UpdatePersonalInfo(PersonalInfoPatch {
                full_name: Some("Ada Lovelace".to_string()),
                title: Some("Engineer".to_string()),
                ..Default::default()
            }),
            now(),
        );
        let state = reduce(
            state,
            Action::UpdatePersonalInfo(PersonalInfoPatch {
                phone: Some("555-0100".to_string()),
                ..Default::default()
            }),
            now(),
        );
        let info = &state.resume.personal_info;
        assert_eq!(info.full_name, "Ada Lovelace");
        assert_eq!(info.title, "Engineer");
        assert_eq!(info.phone, "555-0100");
    }

    #[test]
    fn test_update_resume_replaces_top_level_fields() {
        let state = reduce(state(), Action::AddSkill("Rust".to_string()), now());
        let state = reduce(
            state,
            Action::UpdateResume(ResumePatch {
                skills: Some(vec!["Go".to_string(), "SQL".to_string()]),
                ..Default::default()
            }),
            now(),
        );
        assert_eq!(state.resume.skills, vec!["Go".to_string(), "SQL".to_string()]);
    }

    #[test]
    fn test_login_replaces_and_logout_clears() {
        let user = User {
            id: 1,
            name: "ada".to_string(),
            email: "ada@example.com".to_string(),
            avatar: None,
        };
        let state = reduce(state(), Action::Login(user.clone()), now());
        assert_eq!(state.user.as_ref(), Some(&user));
        let state = reduce(state, Action::Logout, now());
        assert!(state.user.is_none());
    }

    #[test]
    fn test_remove_toast_is_idempotent() {
        let toast = Toast {
            id: 1,
            kind: ToastKind::Info,
            title: None,
            message: "hi".to_string(),
        };
        let state = reduce(state(), Action::AddToast(toast), now());
        let state = reduce(state, Action::RemoveToast(1), now());
        let state = reduce(state, Action::RemoveToast(1), now());
        assert!(state.toasts.is_empty());
    }

    #[test]
    fn test_next_id() {
        assert_eq!(next_id(now(), std::iter::empty()), Some(now().timestamp_millis()));
        let future = now().timestamp_millis() + 10;
        assert_eq!(next_id(now(), [1, future].into_iter()), Some(future + 1));
    }

    #[test]
    fn test_next_id_exhausted_at_max() {
        assert_eq!(next_id(now(), [5, i64::MAX].into_iter()), None);
    }

    #[test]
    fn test_apply_without_free_id_is_ignored() {
        let mut state = apply(state(), 1);
        state.applications[0].id = i64::MAX;
        let before = state.clone();
        let after = apply(state, 3);
        assert_eq!(before, after);
    }
}
