use anyhow::{anyhow, Context, Result};
use std::collections::HashSet;

use crate::models::{Company, Job};

const JOBS_JSON: &str = include_str!("../data/jobs.json");
const COMPANIES_JSON: &str = include_str!("../data/companies.json");

/// The fixed set of job listings and companies shipped with the app.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    jobs: Vec<Job>,
    companies: Vec<Company>,
}

impl Catalog {
    pub fn new(jobs: Vec<Job>, companies: Vec<Company>) -> Result<Self> {
        let mut seen = HashSet::new();
        for job in &jobs {
            if !seen.insert(job.id) {
                return Err(anyhow!("Duplicate job id {} in catalog", job.id));
            }
            if job.salary_min > job.salary_max {
                return Err(anyhow!(
                    "Job #{} has salary_min {} above salary_max {}",
                    job.id,
                    job.salary_min,
                    job.salary_max
                ));
            }
        }

        let mut seen = HashSet::new();
        for company in &companies {
            if !seen.insert(company.id) {
                return Err(anyhow!("Duplicate company id {} in catalog", company.id));
            }
        }

        Ok(Self { jobs, companies })
    }

    pub fn builtin() -> Result<Self> {
        let jobs: Vec<Job> =
            serde_json::from_str(JOBS_JSON).context("Failed to parse built-in job listings")?;
        let companies: Vec<Company> = serde_json::from_str(COMPANIES_JSON)
            .context("Failed to parse built-in companies")?;
        tracing::debug!(jobs = jobs.len(), companies = companies.len(), "loaded catalog");
        Self::new(jobs, companies)
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn companies(&self) -> &[Company] {
        &self.companies
    }
}
