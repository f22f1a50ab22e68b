mod auth;
mod catalog;
mod clipboard;
mod config;
mod db;
mod error;
mod interactions;
mod models;
mod query;
mod resume;
mod routes;
mod state;
mod store;
mod toast;
mod tui;
mod views;

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use auth::{AuthForm, AuthMode, SocialProvider};
use catalog::Catalog;
use clipboard::detect_clipboard;
use config::Config;
use db::{Database, Slice};
use interactions::{validation_errors, ProfileUpdate, ResumeEntry};
use models::{
    ApplicationStatus, Education, Experience, ExperienceLevel, FiltersPatch, JobType,
    PersonalInfoPatch, Project, Resume, ResumePatch, DEFAULT_SALARY_RANGE,
};
use query::{sort_jobs, CompanyFilters, CompanySort, JobSort};
use routes::{parse_id, Route};
use state::Action;
use store::Store;

#[derive(Parser)]
#[command(name = "jobhunt")]
#[command(about = "Browse job listings, save and apply to jobs, and keep your resume")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Featured jobs and categories
    Home,

    /// List jobs matching the given filters
    Jobs {
        /// Matches title, company, description or skills
        #[arg(short, long)]
        search: Option<String>,

        #[arg(short, long)]
        location: Option<String>,

        /// Job types, comma separated
        #[arg(short = 't', long = "type", value_delimiter = ',')]
        job_type: Vec<JobType>,

        /// Experience levels, comma separated
        #[arg(short = 'e', long = "level", value_delimiter = ',')]
        level: Vec<ExperienceLevel>,

        #[arg(short, long)]
        category: Option<String>,

        #[arg(long, default_value_t = DEFAULT_SALARY_RANGE.0)]
        min_salary: i64,

        #[arg(long, default_value_t = DEFAULT_SALARY_RANGE.1)]
        max_salary: i64,

        #[arg(long, value_enum, default_value_t = JobSort::Recent)]
        sort: JobSort,
    },

    /// Show job details
    Show {
        /// Job ID
        id: String,
    },

    /// List companies
    Companies {
        #[arg(short, long, default_value = "")]
        search: String,

        #[arg(short, long, default_value = "")]
        industry: String,

        /// Headcount bucket, e.g. 50-200
        #[arg(long, default_value = "")]
        size: String,

        #[arg(long, value_enum, default_value_t = CompanySort::Rating)]
        sort: CompanySort,
    },

    /// Show company details and open jobs
    Company {
        /// Company ID
        id: String,
    },

    /// Save a job, or unsave it if already saved
    Save {
        /// Job ID
        id: String,
    },

    /// List saved jobs
    Saved,

    /// Apply to a job with the current resume
    Apply {
        /// Job ID
        id: String,

        #[arg(long)]
        cover_letter: Option<String>,
    },

    /// List applications and their status
    Applications {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Change an application's status
    Status {
        /// Application ID
        id: String,

        #[arg(value_enum)]
        status: ApplicationStatus,
    },

    /// Copy a job's link to the clipboard
    Share {
        /// Job ID
        id: String,
    },

    /// Sign in (or sign up) with email and password
    Login {
        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,

        /// Required with --signup
        #[arg(long, default_value = "")]
        name: String,

        /// Create an account instead of signing in
        #[arg(long)]
        signup: bool,
    },

    /// Sign in with a social account
    Social {
        #[arg(value_enum)]
        provider: SocialProvider,
    },

    /// Sign out
    Logout,

    /// View or edit your profile
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },

    /// View or edit your resume
    Resume {
        #[command(subcommand)]
        command: ResumeCommands,
    },

    /// Render the page for a path, e.g. /job/3 or /auth?mode=signup
    Open { path: String },

    /// Interactive TUI browser
    Browse,

    /// Delete all saved data (saved jobs, applications, user, resume)
    Reset {
        /// Skip the confirmation check
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum ProfileCommands {
    Show,
    Update {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        title: Option<String>,
    },
}

#[derive(Subcommand)]
enum ResumeCommands {
    /// Show the resume with entry IDs
    Show,

    /// Write the resume as plain text
    Export {
        /// Output file (defaults to "<name>_resume.txt")
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Replace the resume with a JSON document
    Import { path: PathBuf },

    /// Edit contact details
    Info {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        title: Option<String>,
    },

    /// Set the professional summary
    Summary { text: String },

    Skill {
        #[command(subcommand)]
        command: SkillCommands,
    },

    Experience {
        #[command(subcommand)]
        command: ExperienceCommands,
    },

    Education {
        #[command(subcommand)]
        command: EducationCommands,
    },

    Project {
        #[command(subcommand)]
        command: ProjectCommands,
    },
}

#[derive(Subcommand)]
enum SkillCommands {
    Add { skill: String },
    Remove { skill: String },
}

#[derive(Subcommand)]
enum ExperienceCommands {
    Add(ExperienceArgs),
    /// Change the given fields of an existing entry
    Update {
        id: String,
        #[command(flatten)]
        fields: ExperienceArgs,
    },
    Remove {
        id: String,
    },
}

#[derive(Subcommand)]
enum EducationCommands {
    Add(EducationArgs),
    /// Change the given fields of an existing entry
    Update {
        id: String,
        #[command(flatten)]
        fields: EducationArgs,
    },
    Remove {
        id: String,
    },
}

#[derive(Subcommand)]
enum ProjectCommands {
    Add(ProjectArgs),
    /// Change the given fields of an existing entry
    Update {
        id: String,
        #[command(flatten)]
        fields: ProjectArgs,
    },
    Remove {
        id: String,
    },
}

enum EntryOp<A> {
    Add(A),
    Update(String, A),
    Remove(String),
}

impl From<ExperienceCommands> for EntryOp<ExperienceArgs> {
    fn from(command: ExperienceCommands) -> Self {
        match command {
            ExperienceCommands::Add(fields) => EntryOp::Add(fields),
            ExperienceCommands::Update { id, fields } => EntryOp::Update(id, fields),
            ExperienceCommands::Remove { id } => EntryOp::Remove(id),
        }
    }
}

impl From<EducationCommands> for EntryOp<EducationArgs> {
    fn from(command: EducationCommands) -> Self {
        match command {
            EducationCommands::Add(fields) => EntryOp::Add(fields),
            EducationCommands::Update { id, fields } => EntryOp::Update(id, fields),
            EducationCommands::Remove { id } => EntryOp::Remove(id),
        }
    }
}

impl From<ProjectCommands> for EntryOp<ProjectArgs> {
    fn from(command: ProjectCommands) -> Self {
        match command {
            ProjectCommands::Add(fields) => EntryOp::Add(fields),
            ProjectCommands::Update { id, fields } => EntryOp::Update(id, fields),
            ProjectCommands::Remove { id } => EntryOp::Remove(id),
        }
    }
}

/// Command-line fields for one resume entry type; unset fields are left alone.
trait EntryFields {
    type Entry: ResumeEntry + Default;
    fn merge_into(self, entry: Self::Entry) -> Self::Entry;
}

#[derive(Args)]
struct ExperienceArgs {
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    company: Option<String>,
    #[arg(long)]
    location: Option<String>,
    #[arg(long)]
    start: Option<String>,
    #[arg(long)]
    end: Option<String>,
    /// Still in this role
    #[arg(long)]
    current: Option<bool>,
    #[arg(long)]
    description: Option<String>,
}

impl EntryFields for ExperienceArgs {
    type Entry = Experience;

    fn merge_into(self, entry: Experience) -> Experience {
        Experience {
            id: entry.id,
            title: self.title.unwrap_or(entry.title),
            company: self.company.unwrap_or(entry.company),
            location: self.location.unwrap_or(entry.location),
            start_date: self.start.unwrap_or(entry.start_date),
            end_date: self.end.unwrap_or(entry.end_date),
            current: self.current.unwrap_or(entry.current),
            description: self.description.unwrap_or(entry.description),
        }
    }
}

#[derive(Args)]
struct EducationArgs {
    #[arg(long)]
    degree: Option<String>,
    #[arg(long)]
    school: Option<String>,
    #[arg(long)]
    location: Option<String>,
    #[arg(long)]
    start: Option<String>,
    #[arg(long)]
    end: Option<String>,
    #[arg(long)]
    description: Option<String>,
}

impl EntryFields for EducationArgs {
    type Entry = Education;

    fn merge_into(self, entry: Education) -> Education {
        Education {
            id: entry.id,
            degree: self.degree.unwrap_or(entry.degree),
            school: self.school.unwrap_or(entry.school),
            location: self.location.unwrap_or(entry.location),
            start_date: self.start.unwrap_or(entry.start_date),
            end_date: self.end.unwrap_or(entry.end_date),
            description: self.description.unwrap_or(entry.description),
        }
    }
}

#[derive(Args)]
struct ProjectArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    link: Option<String>,
    /// Free text, e.g. "Rust, SQLite"
    #[arg(long)]
    technologies: Option<String>,
}

impl EntryFields for ProjectArgs {
    type Entry = Project;

    fn merge_into(self, entry: Project) -> Project {
        Project {
            id: entry.id,
            name: self.name.unwrap_or(entry.name),
            description: self.description.unwrap_or(entry.description),
            link: self.link.unwrap_or(entry.link),
            technologies: self.technologies.unwrap_or(entry.technologies),
        }
    }
}

fn run_entry_command<A: EntryFields>(store: &mut Store<Database>, op: EntryOp<A>) -> Result<()> {
    let label = <A::Entry as ResumeEntry>::LABEL;
    match op {
        EntryOp::Add(fields) => {
            let id = store.add_entry(fields.merge_into(A::Entry::default()))?;
            println!("Added {} #{}", label.to_lowercase(), id);
        }
        EntryOp::Update(id, fields) => {
            let id = parse_id(&id)?;
            match store.entry::<A::Entry>(id) {
                Some(entry) => {
                    store.update_entry(fields.merge_into(entry))?;
                }
                None => println!("{} #{} not found.", label, id),
            }
        }
        EntryOp::Remove(id) => {
            let id = parse_id(&id)?;
            if !store.remove_entry::<A::Entry>(id)? {
                println!("{} #{} not found.", label, id);
            }
        }
    }
    Ok(())
}

fn init_tracing(filter: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn print_toasts(store: &mut Store<Database>) {
    for toast in store.take_toasts() {
        println!("{}", views::toast_line(&toast));
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;
    init_tracing(&config.log_filter);

    let db = Database::open(&config.db_path)?;
    info!(db = %db.path().display(), "opened database");

    let catalog = Catalog::builtin()?;
    let mut store = Store::load(db, catalog, config.toast_lifetime)?;

    match cli.command {
        Commands::Home => print!("{}", views::home(store.state())),

        Commands::Jobs {
            search,
            location,
            job_type,
            level,
            category,
            min_salary,
            max_salary,
            sort,
        } => {
            if min_salary > max_salary {
                return Err(anyhow!(
                    "--min-salary ({}) must not exceed --max-salary ({})",
                    min_salary,
                    max_salary
                ));
            }
            store.dispatch(Action::SetFilters(FiltersPatch {
                search,
                location,
                job_type: Some(job_type),
                experience_level: Some(level),
                salary_range: Some((min_salary, max_salary)),
                category,
            }))?;
            let state = store.state();
            let mut jobs = state.filtered_jobs();
            sort_jobs(&mut jobs, sort);
            print!("{}", views::job_table(state, &jobs));
        }

        Commands::Show { id } => {
            let route = Route::Job(parse_id(&id)?);
            print!("{}", views::render_route(store.state(), route));
        }

        Commands::Companies {
            search,
            industry,
            size,
            sort,
        } => {
            let filters = CompanyFilters {
                search,
                industry,
                size,
            };
            print!("{}", views::company_table(store.state(), &filters, sort));
        }

        Commands::Company { id } => {
            let route = Route::Company(parse_id(&id)?);
            print!("{}", views::render_route(store.state(), route));
        }

        Commands::Save { id } => {
            let id = parse_id(&id)?;
            if store.state().job_by_id(id).is_none() {
                println!("Job #{} not found.", id);
            } else {
                store.toggle_save(id)?;
            }
        }

        Commands::Saved => print!("{}", views::saved(store.state())),

        Commands::Apply { id, cover_letter } => {
            let id = parse_id(&id)?;
            if store.state().job_by_id(id).is_none() {
                println!("Job #{} not found.", id);
            } else if let Some(app_id) = store.submit_application(id, cover_letter)? {
                println!("Application #{}", app_id);
            }
        }

        Commands::Applications { json } => {
            let state = store.state();
            if json {
                let out = serde_json::json!({
                    "stats": state.application_stats(),
                    "applications": state.applications,
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                print!("{}", views::applications(state));
            }
        }

        Commands::Status { id, status } => {
            let id = parse_id(&id)?;
            if store.state().application_by_id(id).is_none() {
                println!("Application #{} not found.", id);
            } else {
                store.dispatch(Action::UpdateApplicationStatus { id, status })?;
                println!("Application #{} is now {}", id, status);
            }
        }

        Commands::Share { id } => {
            let id = parse_id(&id)?;
            if store.state().job_by_id(id).is_none() {
                println!("Job #{} not found.", id);
            } else {
                let clipboard = detect_clipboard();
                if !store.share_job(id, clipboard.as_ref(), &config.base_url) {
                    // Still useful without a clipboard.
                    println!("{}", routes::share_link(&config.base_url, Route::Job(id)));
                }
            }
        }

        Commands::Login {
            email,
            password,
            name,
            signup,
        } => {
            let form = AuthForm {
                mode: if signup { AuthMode::SignUp } else { AuthMode::SignIn },
                name,
                email,
                password,
            };
            if let Err(e) = store.sign_in(form) {
                let Some(errors) = validation_errors(&e) else {
                    return Err(e);
                };
                for (field, message) in errors.iter() {
                    println!("{}: {}", field, message);
                }
            }
        }

        Commands::Social { provider } => {
            store.sign_in_with(provider)?;
        }

        Commands::Logout => {
            if store.state().user.is_none() {
                println!("Not signed in.");
            } else {
                store.sign_out()?;
            }
        }

        Commands::Profile { command } => match command {
            ProfileCommands::Show => {
                print!("{}", views::profile(store.state()));
            }
            ProfileCommands::Update {
                name,
                email,
                phone,
                location,
                title,
            } => {
                store.update_profile(ProfileUpdate {
                    name,
                    email,
                    phone,
                    location,
                    title,
                })?;
            }
        },

        Commands::Resume { command } => run_resume_command(&mut store, command)?,

        Commands::Open { path } => {
            let route: Route = path.parse()?;
            print!("{}", views::render_route(store.state(), route));
        }

        Commands::Browse => {
            let clipboard = detect_clipboard();
            tui::run_browse(&mut store, clipboard.as_ref(), &config.base_url)?;
        }

        Commands::Reset { yes } => return run_reset(store.storage(), yes),
    }

    print_toasts(&mut store);
    Ok(())
}

fn run_reset(db: &Database, yes: bool) -> Result<()> {
    if !yes {
        println!("This deletes saved jobs, applications, your account and resume.");
        println!("Re-run with --yes to confirm.");
        return Ok(());
    }
    for slice in Slice::ALL {
        if let Some(updated) = db.slice_updated_at(slice)? {
            println!("  {} (last saved {})", slice.key(), updated);
        }
    }
    let removed = db.clear()?;
    println!("Removed {} slice(s) from {}", removed, db.path().display());
    Ok(())
}

fn run_resume_command(store: &mut Store<Database>, command: ResumeCommands) -> Result<()> {
    match command {
        ResumeCommands::Show => {
            print!("{}", views::resume(&store.state().resume));
            if let Some(updated) = store.storage().slice_updated_at(Slice::Resume)? {
                println!("\nLast saved {}", updated);
            }
        }

        ResumeCommands::Export { output } => {
            let current = &store.state().resume;
            let path = output.unwrap_or_else(|| PathBuf::from(resume::export_file_name(current)));
            std::fs::write(&path, resume::render_text(current))
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Resume written to {}", path.display());
            store.add_toast(toast::ToastKind::Success, None, "Resume downloaded!");
        }

        ResumeCommands::Import { path } => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let imported: Resume = serde_json::from_str(&json)
                .with_context(|| format!("{} is not a valid resume document", path.display()))?;
            store.dispatch(Action::UpdateResume(ResumePatch {
                personal_info: Some(imported.personal_info),
                experience: Some(imported.experience),
                education: Some(imported.education),
                skills: Some(imported.skills),
                projects: Some(imported.projects),
            }))?;
            println!("Imported resume from {}", path.display());
        }

        ResumeCommands::Info {
            name,
            email,
            phone,
            location,
            title,
        } => {
            store.dispatch(Action::UpdatePersonalInfo(PersonalInfoPatch {
                full_name: name,
                email,
                phone,
                location,
                title,
                summary: None,
            }))?;
        }

        ResumeCommands::Summary { text } => {
            store.dispatch(Action::UpdatePersonalInfo(PersonalInfoPatch {
                summary: Some(text),
                ..Default::default()
            }))?;
        }

        ResumeCommands::Skill { command } => match command {
            SkillCommands::Add { skill } => {
                if !store.add_skill(&skill)? {
                    println!("Skill '{}' not added (blank or already listed).", skill.trim());
                }
            }
            SkillCommands::Remove { skill } => {
                if !store.remove_skill(&skill)? {
                    println!("Skill '{}' not found.", skill);
                }
            }
        },

        ResumeCommands::Experience { command } => run_entry_command(store, command.into())?,
        ResumeCommands::Education { command } => run_entry_command(store, command.into())?,
        ResumeCommands::Project { command } => run_entry_command(store, command.into())?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use db::SliceStore;

    #[test]
    fn test_reset_requires_confirmation() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(&dir.path().join("board.db")).unwrap();
        db.write(Slice::SavedJobs, "[3]").unwrap();

        run_reset(&db, false).unwrap();
        assert_eq!(db.read(Slice::SavedJobs).unwrap().as_deref(), Some("[3]"));

        run_reset(&db, true).unwrap();
        assert_eq!(db.read(Slice::SavedJobs).unwrap(), None);
    }
}
