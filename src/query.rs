use serde::Serialize;

use crate::models::{
    Application, ApplicationId, ApplicationStatus, Company, CompanyId, Filters, Job, JobId,
};
use crate::state::AppState;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum JobSort {
    /// Newest postings first
    #[default]
    Recent,
    /// Highest maximum salary first
    SalaryHigh,
    /// Lowest minimum salary first
    SalaryLow,
    /// Most applicants first
    Applicants,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum CompanySort {
    #[default]
    Rating,
    /// Most open positions first
    Jobs,
    Name,
    /// Most recently founded first
    Newest,
}

#[derive(Debug, Clone, Default)]
pub struct CompanyFilters {
    pub search: String,
    pub industry: String,
    pub size: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ApplicationStats {
    pub total: usize,
    pub pending: usize,
    pub reviewing: usize,
    pub interview: usize,
    pub rejected: usize,
    pub accepted: usize,
}

impl ApplicationStats {
    pub fn count(&self, status: ApplicationStatus) -> usize {
        match status {
            ApplicationStatus::Pending => self.pending,
            ApplicationStatus::Reviewing => self.reviewing,
            ApplicationStatus::Interview => self.interview,
            ApplicationStatus::Rejected => self.rejected,
            ApplicationStatus::Accepted => self.accepted,
        }
    }
}

/// Jobs passing every active filter, in catalog order.
pub fn filter_jobs<'a>(jobs: &'a [Job], filters: &Filters) -> Vec<&'a Job> {
    let search = filters.search.to_lowercase();
    let location = filters.location.to_lowercase();
    let (salary_floor, salary_ceiling) = filters.salary_range;

    jobs.iter()
        .filter(|job| {
            search.is_empty()
                || job.title.to_lowercase().contains(&search)
                || job.company.to_lowercase().contains(&search)
                || job.description.to_lowercase().contains(&search)
                || job.skills.iter().any(|s| s.to_lowercase().contains(&search))
        })
        .filter(|job| location.is_empty() || job.location.to_lowercase().contains(&location))
        .filter(|job| filters.job_type.is_empty() || filters.job_type.contains(&job.job_type))
        .filter(|job| {
            filters.experience_level.is_empty()
                || filters.experience_level.contains(&job.experience_level)
        })
        .filter(|job| filters.category.is_empty() || job.category == filters.category)
        .filter(|job| job.salary_min >= salary_floor && job.salary_max <= salary_ceiling)
        .collect()
}

/// Stable sort: ties keep their incoming order.
pub fn sort_jobs(jobs: &mut [&Job], sort: JobSort) {
    match sort {
        JobSort::Recent => jobs.sort_by(|a, b| b.posted_at.cmp(&a.posted_at)),
        JobSort::SalaryHigh => jobs.sort_by(|a, b| b.salary_max.cmp(&a.salary_max)),
        JobSort::SalaryLow => jobs.sort_by(|a, b| a.salary_min.cmp(&b.salary_min)),
        JobSort::Applicants => jobs.sort_by(|a, b| b.applicants.cmp(&a.applicants)),
    }
}

pub fn sort_companies(companies: &mut [&Company], sort: CompanySort) {
    match sort {
        CompanySort::Rating => companies.sort_by(|a, b| b.rating.total_cmp(&a.rating)),
        CompanySort::Jobs => companies.sort_by(|a, b| b.open_positions.cmp(&a.open_positions)),
        CompanySort::Name => {
            companies.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        }
        CompanySort::Newest => companies.sort_by(|a, b| b.founded.cmp(&a.founded)),
    }
}

impl AppState {
    pub fn filtered_jobs(&self) -> Vec<&Job> {
        filter_jobs(self.catalog.jobs(), &self.filters)
    }

    /// Saved jobs in catalog order, not save order.
    pub fn saved_jobs(&self) -> Vec<&Job> {
        self.catalog
            .jobs()
            .iter()
            .filter(|job| self.saved_jobs.contains(&job.id))
            .collect()
    }

    pub fn is_job_saved(&self, job_id: JobId) -> bool {
        self.saved_jobs.contains(&job_id)
    }

    pub fn has_applied(&self, job_id: JobId) -> bool {
        self.applications.iter().any(|app| app.job_id == job_id)
    }

    pub fn job_by_id(&self, id: JobId) -> Option<&Job> {
        self.catalog.jobs().iter().find(|job| job.id == id)
    }

    pub fn company_by_id(&self, id: CompanyId) -> Option<&Company> {
        self.catalog.companies().iter().find(|c| c.id == id)
    }

    pub fn jobs_by_company(&self, company_id: CompanyId) -> Vec<&Job> {
        self.catalog
            .jobs()
            .iter()
            .filter(|job| job.company_id == company_id)
            .collect()
    }

    pub fn application_by_id(&self, id: ApplicationId) -> Option<&Application> {
        self.applications.iter().find(|app| app.id == id)
    }

    pub fn application_stats(&self) -> ApplicationStats {
        let mut stats = ApplicationStats {
            total: self.applications.len(),
            ..Default::default()
        };
        for app in &self.applications {
            match app.status {
                ApplicationStatus::Pending => stats.pending += 1,
                ApplicationStatus::Reviewing => stats.reviewing += 1,
                ApplicationStatus::Interview => stats.interview += 1,
                ApplicationStatus::Rejected => stats.rejected += 1,
                ApplicationStatus::Accepted => stats.accepted += 1,
            }
        }
        stats
    }

    pub fn featured_jobs(&self, limit: usize) -> Vec<&Job> {
        self.catalog
            .jobs()
            .iter()
            .filter(|job| job.featured)
            .take(limit)
            .collect()
    }

    /// Job count per category, in order of first appearance.
    pub fn category_counts(&self) -> Vec<(&str, usize)> {
        let mut counts: Vec<(&str, usize)> = Vec::new();
        for job in self.catalog.jobs() {
            match counts.iter_mut().find(|(name, _)| *name == job.category) {
                Some((_, n)) => *n += 1,
                None => counts.push((job.category.as_str(), 1)),
            }
        }
        counts
    }

    pub fn filter_companies(&self, filters: &CompanyFilters) -> Vec<&Company> {
        let search = filters.search.to_lowercase();
        self.catalog
            .companies()
            .iter()
            .filter(|c| {
                c.name.to_lowercase().contains(&search)
                    || c.description.to_lowercase().contains(&search)
                    || c.industry.to_lowercase().contains(&search)
            })
            .filter(|c| filters.industry.is_empty() || c.industry == filters.industry)
            .filter(|c| filters.size.is_empty() || c.size == filters.size)
            .collect()
    }

    pub fn industries(&self) -> Vec<&str> {
        let mut industries: Vec<&str> = Vec::new();
        for company in self.catalog.companies() {
            if !industries.contains(&company.industry.as_str()) {
                industries.push(&company.industry);
            }
        }
        industries
    }

    pub fn top_rated_companies(&self) -> usize {
        self.catalog
            .companies()
            .iter()
            .filter(|c| c.rating >= 4.5)
            .count()
    }
}
