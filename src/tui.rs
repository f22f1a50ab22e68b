use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};
use std::io::stdout;
use std::time::{Duration, Instant};

use crate::clipboard::Clipboard;
use crate::db::SliceStore;
use crate::models::{FiltersPatch, Job, JobId};
use crate::query::{sort_jobs, JobSort};
use crate::state::{Action, AppState};
use crate::store::Store;
use crate::toast::{Toast, ToastKind};
use crate::views::{salary, truncate};

const TICK: Duration = Duration::from_millis(250);
const MAX_TOAST_ROWS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputMode {
    Normal,
    Search,
}

fn next_sort(sort: JobSort) -> JobSort {
    match sort {
        JobSort::Recent => JobSort::SalaryHigh,
        JobSort::SalaryHigh => JobSort::SalaryLow,
        JobSort::SalaryLow => JobSort::Applicants,
        JobSort::Applicants => JobSort::Recent,
    }
}

fn sort_label(sort: JobSort) -> &'static str {
    match sort {
        JobSort::Recent => "most recent",
        JobSort::SalaryHigh => "salary high-low",
        JobSort::SalaryLow => "salary low-high",
        JobSort::Applicants => "most applicants",
    }
}

/// View-only browser state; everything else lives in the store.
struct Browser {
    sort: JobSort,
    saved_only: bool,
    selected: usize,
    scroll_offset: u16,
    mode: InputMode,
}

impl Browser {
    fn new() -> Self {
        Self {
            sort: JobSort::default(),
            saved_only: false,
            selected: 0,
            scroll_offset: 0,
            mode: InputMode::Normal,
        }
    }

    fn visible<'a>(&self, state: &'a AppState) -> Vec<&'a Job> {
        let mut jobs = if self.saved_only {
            state.saved_jobs()
        } else {
            state.filtered_jobs()
        };
        sort_jobs(&mut jobs, self.sort);
        jobs
    }

    fn clamp(&mut self, len: usize) {
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }

    fn next(&mut self, len: usize) {
        if len > 0 && self.selected < len - 1 {
            self.selected += 1;
            self.scroll_offset = 0;
        }
    }

    fn prev(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
            self.scroll_offset = 0;
        }
    }

    fn scroll_down(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_add(3);
    }

    fn scroll_up(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_sub(3);
    }
}

pub fn run_browse<S: SliceStore>(
    store: &mut Store<S>,
    clipboard: &dyn Clipboard,
    base_url: &str,
) -> Result<()> {
    let mut browser = Browser::new();

    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = run_loop(&mut terminal, store, &mut browser, clipboard, base_url);

    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

fn run_loop<S: SliceStore>(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    store: &mut Store<S>,
    browser: &mut Browser,
    clipboard: &dyn Clipboard,
    base_url: &str,
) -> Result<()> {
    let mut list_state = ListState::default();

    loop {
        let ids: Vec<JobId> = browser.visible(store.state()).iter().map(|j| j.id).collect();
        browser.clamp(ids.len());
        list_state.select(if ids.is_empty() { None } else { Some(browser.selected) });

        terminal.draw(|frame| draw(frame, store.state(), browser, &mut list_state))?;

        if event::poll(TICK)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    let current = ids.get(browser.selected).copied();
                    let keep_going = match browser.mode {
                        InputMode::Search => {
                            handle_search_key(key.code, store, browser)?;
                            true
                        }
                        InputMode::Normal => handle_key(
                            key.code,
                            store,
                            browser,
                            ids.len(),
                            current,
                            clipboard,
                            base_url,
                        )?,
                    };
                    if !keep_going {
                        break;
                    }
                }
            }
        }

        store.expire_toasts(Instant::now());
    }
    Ok(())
}

fn handle_search_key<S: SliceStore>(
    code: KeyCode,
    store: &mut Store<S>,
    browser: &mut Browser,
) -> Result<()> {
    let mut search = store.state().filters.search.clone();
    match code {
        KeyCode::Enter | KeyCode::Esc => {
            browser.mode = InputMode::Normal;
            return Ok(());
        }
        KeyCode::Backspace => {
            search.pop();
        }
        KeyCode::Char(c) => search.push(c),
        _ => return Ok(()),
    }
    browser.selected = 0;
    store.dispatch(Action::SetFilters(FiltersPatch {
        search: Some(search),
        ..Default::default()
    }))
}

/// Returns false when the user asked to quit.
fn handle_key<S: SliceStore>(
    code: KeyCode,
    store: &mut Store<S>,
    browser: &mut Browser,
    len: usize,
    current: Option<JobId>,
    clipboard: &dyn Clipboard,
    base_url: &str,
) -> Result<bool> {
    match code {
        KeyCode::Char('q') | KeyCode::Esc => return Ok(false),
        KeyCode::Down | KeyCode::Char('j') => browser.next(len),
        KeyCode::Up | KeyCode::Char('k') => browser.prev(),
        KeyCode::Char('J') | KeyCode::PageDown => browser.scroll_down(),
        KeyCode::Char('K') | KeyCode::PageUp => browser.scroll_up(),
        KeyCode::Char('/') => browser.mode = InputMode::Search,
        KeyCode::Char('o') => browser.sort = next_sort(browser.sort),
        KeyCode::Char('v') => {
            browser.saved_only = !browser.saved_only;
            browser.selected = 0;
        }
        KeyCode::Char('r') => {
            store.dispatch(Action::ResetFilters)?;
            browser.selected = 0;
        }
        KeyCode::Char('x') => {
            if let Some(toast) = store.state().toasts.first() {
                let id = toast.id;
                store.dismiss_toast(id);
            }
        }
        KeyCode::Char('s') => {
            if let Some(id) = current {
                store.toggle_save(id)?;
            }
        }
        KeyCode::Char('a') => {
            if let Some(id) = current {
                store.submit_application(id, None)?;
            }
        }
        KeyCode::Char('y') => {
            if let Some(id) = current {
                store.share_job(id, clipboard, base_url);
            }
        }
        _ => {}
    }
    Ok(true)
}

fn draw(frame: &mut Frame, state: &AppState, browser: &Browser, list_state: &mut ListState) {
    let toast_rows = state.toasts.len().min(MAX_TOAST_ROWS) as u16;
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(toast_rows),
            Constraint::Length(1),
        ])
        .split(frame.area());

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(rows[0]);

    let jobs = browser.visible(state);

    // Left panel: job list
    let items: Vec<ListItem> = jobs
        .iter()
        .map(|job| {
            let icon = match (state.has_applied(job.id), state.is_job_saved(job.id)) {
                (true, _) => "+",
                (false, true) => "*",
                (false, false) => " ",
            };
            ListItem::new(format!(
                "{} #{:<3} {} | {}",
                icon,
                job.id,
                truncate(&job.title, 28),
                job.company
            ))
        })
        .collect();

    let view = if browser.saved_only { "Saved" } else { "Jobs" };
    let search = &state.filters.search;
    let mut title = format!(" {} ({}) by {} ", view, jobs.len(), sort_label(browser.sort));
    if !search.is_empty() || browser.mode == InputMode::Search {
        title.push_str(&format!("[/{}] ", search));
    }

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, chunks[0], list_state);

    // Right panel: job detail
    let detail = build_detail(state, jobs.get(browser.selected).copied());
    let detail_widget = Paragraph::new(detail)
        .block(Block::default().borders(Borders::ALL).title(" Detail "))
        .wrap(Wrap { trim: false })
        .scroll((browser.scroll_offset, 0));

    frame.render_widget(detail_widget, chunks[1]);

    // Toasts, newest last
    let toast_lines: Vec<Line> = state
        .toasts
        .iter()
        .rev()
        .take(MAX_TOAST_ROWS)
        .rev()
        .map(toast_line)
        .collect();
    frame.render_widget(Paragraph::new(toast_lines), rows[1]);

    let help = match browser.mode {
        InputMode::Search => " type to search  backspace:delete  enter/esc:done".to_string(),
        InputMode::Normal => {
            " j/k:navigate  J/K:scroll  s:save a:apply y:share  /:search o:sort v:saved r:reset  x:dismiss  q:quit"
                .to_string()
        }
    };
    let help = Paragraph::new(help).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, rows[2]);
}

fn toast_line(toast: &Toast) -> Line<'_> {
    let color = match toast.kind {
        ToastKind::Success => Color::Green,
        ToastKind::Error => Color::Red,
        ToastKind::Warning => Color::Yellow,
        ToastKind::Info => Color::Cyan,
    };
    let text = match &toast.title {
        Some(title) => format!(" {}: {}", title, toast.message),
        None => format!(" {}", toast.message),
    };
    Line::from(Span::styled(text, Style::default().fg(color)))
}

fn build_detail<'a>(state: &'a AppState, job: Option<&'a Job>) -> Text<'a> {
    let Some(job) = job else {
        return Text::raw("No jobs match the current filters (r to reset)");
    };

    let bold = Style::default().add_modifier(Modifier::BOLD);
    let mut lines: Vec<Line> = Vec::new();

    lines.push(Line::from(Span::styled(&job.title, bold)));
    lines.push(Line::from(format!("at {} | {}", job.company, job.location)));
    lines.push(Line::from(format!(
        "{} | {} | {}",
        job.job_type,
        job.experience_level,
        salary(job.salary_min, job.salary_max)
    )));
    lines.push(Line::from(format!(
        "Posted {} | {} applicants",
        job.posted_at, job.applicants
    )));

    if state.has_applied(job.id) {
        lines.push(Line::from(Span::styled("Applied", Style::default().fg(Color::Cyan))));
    } else if state.is_job_saved(job.id) {
        lines.push(Line::from(Span::styled("Saved", Style::default().fg(Color::Yellow))));
    }
    lines.push(Line::from(""));

    for line in textwrap::fill(&job.description, 70).lines() {
        lines.push(Line::from(line.to_string()));
    }

    for (heading, items) in [
        ("Responsibilities", &job.responsibilities),
        ("Requirements", &job.requirements),
        ("Benefits", &job.benefits),
    ] {
        if items.is_empty() {
            continue;
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(heading, bold)));
        for item in items {
            lines.push(Line::from(format!("  - {}", item)));
        }
    }

    if !job.skills.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            job.skills.join("  "),
            Style::default().fg(Color::Cyan),
        )));
    }

    Text::from(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::state::reduce;
    use chrono::Utc;

    #[test]
    fn test_sort_cycle_returns_to_start() {
        let mut sort = JobSort::default();
        for _ in 0..4 {
            sort = next_sort(sort);
        }
        assert_eq!(sort, JobSort::default());
    }

    #[test]
    fn test_saved_only_view() {
        let state = AppState::new(Catalog::builtin().unwrap());
        let state = reduce(state, Action::ToggleSaveJob(7), Utc::now());
        let mut browser = Browser::new();
        assert_eq!(browser.visible(&state).len(), 16);
        browser.saved_only = true;
        let ids: Vec<_> = browser.visible(&state).iter().map(|j| j.id).collect();
        assert_eq!(ids, vec![7]);
    }

    #[test]
    fn test_selection_stays_in_bounds() {
        let mut browser = Browser::new();
        browser.next(2);
        browser.next(2);
        assert_eq!(browser.selected, 1);
        browser.clamp(0);
        assert_eq!(browser.selected, 0);
        browser.prev();
        assert_eq!(browser.selected, 0);
    }
}
