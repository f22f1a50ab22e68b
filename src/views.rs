//! Plain-text renderings of each page, printed by the CLI.

use std::fmt::Write;

use crate::auth::AuthMode;
use crate::models::{Application, ApplicationStatus, Company, Job, Resume};
use crate::query::{sort_companies, sort_jobs, CompanyFilters, CompanySort, JobSort};
use crate::routes::Route;
use crate::state::AppState;
use crate::toast::{Toast, ToastKind};

const FEATURED_LIMIT: usize = 4;

pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// "$120k - $160k"
pub fn salary(min: i64, max: i64) -> String {
    format!("${}k - ${}k", min / 1000, max / 1000)
}

pub fn job_table(state: &AppState, jobs: &[&Job]) -> String {
    if jobs.is_empty() {
        return "No jobs found.\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<4} {:<30} {:<20} {:<18} {:<10} {:>15}",
        "ID", "TITLE", "COMPANY", "LOCATION", "TYPE", "SALARY"
    );
    let _ = writeln!(out, "{}", "-".repeat(102));
    for job in jobs {
        let marker = if state.is_job_saved(job.id) { "*" } else { " " };
        let _ = writeln!(
            out,
            "{:<4} {:<30} {:<20} {:<18} {:<10} {:>15}",
            format!("{}{}", job.id, marker),
            truncate(&job.title, 28),
            truncate(&job.company, 18),
            truncate(&job.location, 16),
            job.job_type.label(),
            salary(job.salary_min, job.salary_max)
        );
    }
    let _ = writeln!(out, "\n{} job(s) found. * = saved", jobs.len());
    out
}

fn bullet_list(out: &mut String, heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    let _ = writeln!(out, "\n{}:", heading);
    for item in items {
        let _ = writeln!(out, "  - {}", item);
    }
}

pub fn job_detail(state: &AppState, job: &Job) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Job #{}", job.id);
    let _ = writeln!(out, "Title: {}", job.title);
    let _ = writeln!(out, "Company: {}", job.company);
    let _ = writeln!(out, "Location: {}", job.location);
    let _ = writeln!(out, "Type: {} | Level: {}", job.job_type, job.experience_level);
    let _ = writeln!(out, "Category: {}", job.category);
    let _ = writeln!(out, "Salary: {}", salary(job.salary_min, job.salary_max));
    let _ = writeln!(out, "Posted: {} | Applicants: {}", job.posted_at, job.applicants);

    let mut flags = Vec::new();
    if job.featured {
        flags.push("featured");
    }
    if state.is_job_saved(job.id) {
        flags.push("saved");
    }
    if state.has_applied(job.id) {
        flags.push("applied");
    }
    if !flags.is_empty() {
        let _ = writeln!(out, "Status: {}", flags.join(", "));
    }

    let _ = writeln!(out, "\n{}", textwrap::fill(&job.description, 80));
    bullet_list(&mut out, "Responsibilities", &job.responsibilities);
    bullet_list(&mut out, "Requirements", &job.requirements);
    bullet_list(&mut out, "Benefits", &job.benefits);
    if !job.skills.is_empty() {
        let _ = writeln!(out, "\nSkills: {}", job.skills.join(", "));
    }

    if let Some(company) = state.company_by_id(job.company_id) {
        let _ = writeln!(
            out,
            "\nAbout {}: {} | {} employees | rated {:.1}",
            company.name, company.industry, company.size, company.rating
        );
    }

    let similar: Vec<&Job> = state
        .catalog
        .jobs()
        .iter()
        .filter(|j| j.category == job.category && j.id != job.id)
        .take(3)
        .collect();
    if !similar.is_empty() {
        let _ = writeln!(out, "\nSimilar jobs:");
        for j in similar {
            let _ = writeln!(out, "  #{} - {} at {}", j.id, j.title, j.company);
        }
    }
    out
}

pub fn company_table(state: &AppState, filters: &CompanyFilters, sort: CompanySort) -> String {
    let mut companies = state.filter_companies(filters);
    if companies.is_empty() {
        return "No companies found.\n".to_string();
    }
    sort_companies(&mut companies, sort);

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<4} {:<22} {:<24} {:<10} {:>6} {:>5}",
        "ID", "NAME", "INDUSTRY", "SIZE", "RATING", "JOBS"
    );
    let _ = writeln!(out, "{}", "-".repeat(76));
    for company in &companies {
        let _ = writeln!(
            out,
            "{:<4} {:<22} {:<24} {:<10} {:>6.1} {:>5}",
            company.id,
            truncate(&company.name, 20),
            truncate(&company.industry, 22),
            company.size,
            company.rating,
            company.open_positions
        );
    }
    let _ = writeln!(
        out,
        "\n{} of {} companies. Industries: {}",
        companies.len(),
        state.catalog.companies().len(),
        state.industries().join(", ")
    );
    out
}

pub fn company_detail(state: &AppState, company: &Company) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Company #{}", company.id);
    let _ = writeln!(out, "Name: {}", company.name);
    let _ = writeln!(out, "Industry: {}", company.industry);
    let _ = writeln!(out, "Size: {} employees", company.size);
    let _ = writeln!(out, "Location: {}", company.location);
    let _ = writeln!(out, "Founded: {}", company.founded);
    let _ = writeln!(out, "Rating: {:.1} ({} reviews)", company.rating, company.reviews);
    if !company.website.is_empty() {
        let _ = writeln!(out, "Website: {}", company.website);
    }
    let _ = writeln!(out, "\n{}", textwrap::fill(&company.about, 80));
    if !company.culture.is_empty() {
        let _ = writeln!(out, "\nCulture:\n{}", textwrap::fill(&company.culture, 80));
    }
    bullet_list(&mut out, "Benefits", &company.benefits);

    let jobs = state.jobs_by_company(company.id);
    let _ = writeln!(out, "\nOpen jobs ({}):", jobs.len());
    for job in jobs {
        let _ = writeln!(out, "  #{} - {} ({})", job.id, job.title, job.location);
    }
    out
}

pub fn saved(state: &AppState) -> String {
    let jobs = state.saved_jobs();
    if jobs.is_empty() {
        return "No saved jobs yet. Save one with `jobhunt save <id>`.\n".to_string();
    }
    job_table(state, &jobs)
}

fn application_line(state: &AppState, app: &Application) -> String {
    let (title, company) = match state.job_by_id(app.job_id) {
        Some(job) => (job.title.as_str(), job.company.as_str()),
        None => ("(removed listing)", ""),
    };
    format!(
        "{:<14} {:<28} {:<18} {:<13} {}",
        app.id,
        truncate(title, 26),
        truncate(company, 16),
        app.status.label(),
        app.applied_at.format("%Y-%m-%d")
    )
}

pub fn applications(state: &AppState) -> String {
    if state.applications.is_empty() {
        return "No applications yet.\n".to_string();
    }

    let stats = state.application_stats();
    let mut out = String::new();
    let summary: Vec<String> = ApplicationStatus::ALL
        .iter()
        .map(|s| format!("{} {}", s.label(), stats.count(*s)))
        .collect();
    let _ = writeln!(out, "Total {} | {}\n", stats.total, summary.join(" | "));

    let _ = writeln!(
        out,
        "{:<14} {:<28} {:<18} {:<13} {}",
        "ID", "JOB", "COMPANY", "STATUS", "APPLIED"
    );
    let _ = writeln!(out, "{}", "-".repeat(86));

    let mut apps: Vec<&Application> = state.applications.iter().collect();
    apps.sort_by(|a, b| b.applied_at.cmp(&a.applied_at));
    for app in apps {
        let _ = writeln!(out, "{}", application_line(state, app));
    }
    out
}

pub fn home(state: &AppState) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} jobs | {} companies | {} top rated",
        state.catalog.jobs().len(),
        state.catalog.companies().len(),
        state.top_rated_companies()
    );

    let mut featured = state.featured_jobs(FEATURED_LIMIT);
    sort_jobs(&mut featured, JobSort::Recent);
    let _ = writeln!(out, "\nFeatured jobs:");
    for job in featured {
        let _ = writeln!(
            out,
            "  #{:<3} {:<30} {:<20} {}",
            job.id,
            truncate(&job.title, 28),
            truncate(&job.company, 18),
            salary(job.salary_min, job.salary_max)
        );
    }

    let _ = writeln!(out, "\nCategories:");
    for (category, count) in state.category_counts() {
        let _ = writeln!(out, "  {:<20} {}", category, count);
    }
    out
}

/// Resume as stored, with the ids needed to edit individual entries.
pub fn resume(resume: &Resume) -> String {
    let info = &resume.personal_info;
    let mut out = String::new();
    let _ = writeln!(out, "Name: {}", info.full_name);
    let _ = writeln!(out, "Title: {}", info.title);
    let _ = writeln!(out, "Email: {} | Phone: {} | Location: {}", info.email, info.phone, info.location);
    if !info.summary.is_empty() {
        let _ = writeln!(out, "\n{}", textwrap::fill(&info.summary, 80));
    }

    let _ = writeln!(out, "\nExperience:");
    for exp in &resume.experience {
        let end = if exp.current { "Present" } else { exp.end_date.as_str() };
        let _ = writeln!(
            out,
            "  [{}] {} at {} ({} - {})",
            exp.id, exp.title, exp.company, exp.start_date, end
        );
    }
    let _ = writeln!(out, "\nEducation:");
    for edu in &resume.education {
        let _ = writeln!(out, "  [{}] {}, {} ({} - {})", edu.id, edu.degree, edu.school, edu.start_date, edu.end_date);
    }
    let _ = writeln!(out, "\nProjects:");
    for proj in &resume.projects {
        let _ = writeln!(out, "  [{}] {} {}", proj.id, proj.name, proj.link);
    }
    let _ = writeln!(out, "\nSkills: {}", resume.skills.join(", "));
    out
}

pub fn profile(state: &AppState) -> String {
    let Some(user) = state.user.as_ref() else {
        return auth_help(AuthMode::SignIn);
    };
    let resume = &state.resume;
    let info = &resume.personal_info;
    let mut out = String::new();
    let _ = writeln!(out, "Name: {}", user.name);
    let _ = writeln!(out, "Email: {}", user.email);
    for (label, value) in [("Phone", &info.phone), ("Location", &info.location), ("Title", &info.title)] {
        if !value.is_empty() {
            let _ = writeln!(out, "{}: {}", label, value);
        }
    }
    let _ = writeln!(
        out,
        "\nApplications: {} | Saved jobs: {} | Skills: {}",
        state.applications.len(),
        state.saved_jobs.len(),
        resume.skills.len()
    );
    out
}

pub fn auth_help(mode: AuthMode) -> String {
    match mode {
        AuthMode::SignIn => {
            "Not signed in. Run `jobhunt login --email <email> --password <password>`\n\
             or `jobhunt social <google|github|linkedin>`.\n"
                .to_string()
        }
        AuthMode::SignUp => {
            "Create an account with `jobhunt login --signup --name <name> --email <email> --password <password>`.\n"
                .to_string()
        }
    }
}

/// The page for a route path, as the web app would show it.
pub fn render_route(state: &AppState, route: Route) -> String {
    match route {
        Route::Home => home(state),
        Route::Jobs => {
            let mut jobs = state.filtered_jobs();
            sort_jobs(&mut jobs, JobSort::default());
            job_table(state, &jobs)
        }
        Route::Job(id) => match state.job_by_id(id) {
            Some(job) => job_detail(state, job),
            None => format!("Job #{} not found.\n", id),
        },
        Route::Saved => saved(state),
        Route::Applications => applications(state),
        Route::Companies => company_table(state, &CompanyFilters::default(), CompanySort::default()),
        Route::Company(id) => match state.company_by_id(id) {
            Some(company) => company_detail(state, company),
            None => format!("Company #{} not found.\n", id),
        },
        Route::Resume => resume(&state.resume),
        Route::Auth(mode) => auth_help(mode),
        Route::Profile => profile(state),
    }
}

pub fn toast_line(toast: &Toast) -> String {
    let tag = match toast.kind {
        ToastKind::Success => "ok",
        ToastKind::Error => "error",
        ToastKind::Warning => "warning",
        ToastKind::Info => "info",
    };
    match &toast.title {
        Some(title) => format!("[{}] {}: {}", tag, title, toast.message),
        None => format!("[{}] {}", tag, toast.message),
    }
}
