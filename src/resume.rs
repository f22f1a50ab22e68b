use crate::models::Resume;

/// Plain-text rendering of a resume, suitable for saving to a `.txt` file.
pub fn render_text(resume: &Resume) -> String {
    let info = &resume.personal_info;
    let mut out = String::new();

    out.push_str(&format!("{}\n", info.full_name));
    out.push_str(&format!("{}\n\n", info.title));
    out.push_str(&format!(
        "Contact: {} | {} | {}\n\n",
        info.email, info.phone, info.location
    ));

    if !info.summary.is_empty() {
        out.push_str(&format!("SUMMARY\n{}\n\n", info.summary));
    }

    if !resume.experience.is_empty() {
        out.push_str("EXPERIENCE\n");
        for exp in &resume.experience {
            let end = if exp.current { "Present" } else { exp.end_date.as_str() };
            out.push_str(&format!("{} at {}\n", exp.title, exp.company));
            out.push_str(&format!("{} - {} | {}\n", exp.start_date, end, exp.location));
            out.push_str(&format!("{}\n\n", exp.description));
        }
    }

    if !resume.education.is_empty() {
        out.push_str("EDUCATION\n");
        for edu in &resume.education {
            out.push_str(&format!("{} - {}\n", edu.degree, edu.school));
            out.push_str(&format!("{} - {} | {}\n", edu.start_date, edu.end_date, edu.location));
            if !edu.description.is_empty() {
                out.push_str(&format!("{}\n", edu.description));
            }
            out.push('\n');
        }
    }

    if !resume.skills.is_empty() {
        out.push_str(&format!("SKILLS\n{}\n\n", resume.skills.join(", ")));
    }

    if !resume.projects.is_empty() {
        out.push_str("PROJECTS\n");
        for proj in &resume.projects {
            out.push_str(&format!("{}\n", proj.name));
            out.push_str(&format!("{}\n", proj.description));
            if !proj.technologies.is_empty() {
                out.push_str(&format!("Technologies: {}\n", proj.technologies));
            }
            if !proj.link.is_empty() {
                out.push_str(&format!("Link: {}\n", proj.link));
            }
            out.push('\n');
        }
    }

    out
}

/// `{full_name}_resume.txt`, reduced to a bare file name in the current directory.
pub fn export_file_name(resume: &Resume) -> String {
    let cleaned: String = resume
        .personal_info
        .full_name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let name = cleaned.trim().trim_start_matches('.');
    if name.is_empty() {
        "resume_resume.txt".to_string()
    } else {
        format!("{}_resume.txt", name)
    }
}
