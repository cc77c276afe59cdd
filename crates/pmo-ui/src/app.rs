//! Main application state and TUI event loop for the PMO dashboard.
//!
//! [`App`] owns the loaded data store, the active view, and the project
//! filter selections. Every navigation or filter change triggers a full
//! synchronous recomputation of the active view from the store; there is no
//! intermediate state to invalidate.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};

use pmo_runtime::store::DataStore;
use pmo_runtime::views::{self, ProjectFilter, ViewFigures, ViewId};

use crate::charts;
use crate::themes::Theme;

// ── Filter focus ──────────────────────────────────────────────────────────────

/// Which filter dimension the cursor is in, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterDim {
    Type,
    Status,
    Priority,
}

impl FilterDim {
    fn column(self) -> &'static str {
        match self {
            FilterDim::Type => "type",
            FilterDim::Status => "status",
            FilterDim::Priority => "priority",
        }
    }

    fn title(self) -> &'static str {
        match self {
            FilterDim::Type => "Project Type",
            FilterDim::Status => "Status",
            FilterDim::Priority => "Priority",
        }
    }
}

// ── App ───────────────────────────────────────────────────────────────────────

/// Root application state for the interactive dashboard.
pub struct App {
    pub theme: Theme,
    store: DataStore,
    active: usize,
    filter: ProjectFilter,
    filter_focus: Option<FilterDim>,
    cursor: usize,
    figures: ViewFigures,
    should_quit: bool,
}

impl App {
    /// Construct the app and compute the first view.
    pub fn new(theme_name: &str, store: DataStore) -> Self {
        let figures = views::build_view(&store, ViewId::ALL[0], &ProjectFilter::default());
        Self {
            theme: Theme::from_name(theme_name),
            store,
            active: 0,
            filter: ProjectFilter::default(),
            filter_focus: None,
            cursor: 0,
            figures,
            should_quit: false,
        }
    }

    /// The view currently on screen.
    pub fn active_view(&self) -> ViewId {
        ViewId::ALL[self.active]
    }

    /// Figures of the active view (recomputed on every change).
    pub fn figures(&self) -> &ViewFigures {
        &self.figures
    }

    /// Run the dashboard event loop until quit.
    ///
    /// Uses `crossterm::event::poll` with a 250 ms timeout so the loop stays
    /// responsive without spinning. Exits on `q`, `Q`, or Ctrl+C.
    pub async fn run(mut self) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let tick_rate = Duration::from_millis(250);

        let result = loop {
            terminal.draw(|frame| self.render(frame))?;

            if event::poll(tick_rate)? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key(key);
                }
            }
            if self.should_quit {
                break Ok(());
            }
        };

        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        result
    }

    // ── Event handling ────────────────────────────────────────────────────────

    /// Apply one key event to the application state.
    pub fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,

            KeyCode::Tab | KeyCode::Right => self.switch_view((self.active + 1) % ViewId::ALL.len()),
            KeyCode::BackTab | KeyCode::Left => {
                self.switch_view((self.active + ViewId::ALL.len() - 1) % ViewId::ALL.len())
            }
            KeyCode::Char(c @ '1'..='6') => {
                self.switch_view(c as usize - '1' as usize);
            }

            // Filter interaction, only on filterable views.
            KeyCode::Char('t') if self.filterable() => self.focus(FilterDim::Type),
            KeyCode::Char('s') if self.filterable() => self.focus(FilterDim::Status),
            KeyCode::Char('p') if self.filterable() => self.focus(FilterDim::Priority),
            KeyCode::Esc => self.filter_focus = None,
            KeyCode::Up if self.filter_focus.is_some() => {
                self.cursor = self.cursor.saturating_sub(1);
            }
            KeyCode::Down if self.filter_focus.is_some() => {
                let len = self.focused_options().len();
                if len > 0 && self.cursor + 1 < len {
                    self.cursor += 1;
                }
            }
            KeyCode::Char(' ') => {
                if let Some(dim) = self.filter_focus {
                    let options = self.focused_options();
                    if let Some(value) = options.get(self.cursor) {
                        self.filter.toggle(dim.column(), value);
                        self.recompute();
                    }
                }
            }
            KeyCode::Char('c') if self.filterable() => {
                self.filter.clear();
                self.recompute();
            }
            _ => {}
        }
    }

    fn filterable(&self) -> bool {
        views::spec(self.active_view()).filterable
    }

    fn focus(&mut self, dim: FilterDim) {
        if self.filter_focus == Some(dim) {
            self.filter_focus = None;
        } else {
            self.filter_focus = Some(dim);
            self.cursor = 0;
        }
    }

    fn switch_view(&mut self, index: usize) {
        self.active = index;
        self.filter_focus = None;
        self.recompute();
    }

    /// Full synchronous recomputation of the active view from the store.
    fn recompute(&mut self) {
        self.figures = views::build_view(&self.store, self.active_view(), &self.filter);
    }

    /// Selectable values for the focused filter dimension.
    fn focused_options(&self) -> Vec<String> {
        match (self.filter_focus, self.store.table("projects")) {
            (Some(dim), Some(projects)) => projects.distinct_labels(dim.column()),
            _ => Vec::new(),
        }
    }

    // ── Rendering ─────────────────────────────────────────────────────────────

    fn render(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(4),
                Constraint::Min(4),
                Constraint::Length(2),
            ])
            .split(frame.area());

        self.render_tabs(frame, chunks[0]);
        charts::render_kpis(frame, chunks[1], &self.figures.kpis, &self.theme);
        self.render_body(frame, chunks[2]);
        self.render_footer(frame, chunks[3]);
    }

    fn render_tabs(&self, frame: &mut Frame, area: Rect) {
        let mut spans: Vec<Span> = vec![Span::styled(" PMO Analytics ", self.theme.header)];
        for (i, id) in ViewId::ALL.iter().enumerate() {
            let style = if i == self.active {
                self.theme.tab_active
            } else {
                self.theme.tab_inactive
            };
            spans.push(Span::styled(format!(" {} {} ", i + 1, id.title()), style));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_body(&self, frame: &mut Frame, area: Rect) {
        let chart_area = if self.filter_focus.is_some() {
            let halves = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Length(30), Constraint::Min(10)])
                .split(area);
            self.render_filter_panel(frame, halves[0]);
            halves[1]
        } else {
            area
        };

        let charts = &self.figures.charts;
        if charts.is_empty() {
            frame.render_widget(
                Paragraph::new(Line::from(Span::styled(
                    "No data available for this view",
                    self.theme.warning,
                )))
                .block(Block::default().borders(Borders::ALL)),
                chart_area,
            );
            return;
        }

        // Two charts per row.
        let row_count = charts.len().div_ceil(2);
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(vec![Constraint::Ratio(1, row_count as u32); row_count])
            .split(chart_area);

        for (i, chart) in charts.iter().enumerate() {
            let row = rows[i / 2];
            let cols = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)])
                .split(row);
            let cell = if charts.len() % 2 == 1 && i == charts.len() - 1 {
                row // last odd chart takes the full row
            } else {
                cols[i % 2]
            };
            charts::render_chart(frame, cell, chart, &self.theme);
        }
    }

    fn render_filter_panel(&self, frame: &mut Frame, area: Rect) {
        let Some(dim) = self.filter_focus else { return };
        let options = self.focused_options();

        let selected = match dim {
            FilterDim::Type => &self.filter.types,
            FilterDim::Status => &self.filter.statuses,
            FilterDim::Priority => &self.filter.priorities,
        };

        let mut lines: Vec<Line> = Vec::with_capacity(options.len());
        for (i, option) in options.iter().enumerate() {
            let mark = if selected.contains(option) { "[x]" } else { "[ ]" };
            let style = if i == self.cursor {
                self.theme.cursor
            } else if selected.contains(option) {
                self.theme.selected
            } else {
                self.theme.text
            };
            lines.push(Line::from(Span::styled(
                format!(" {} {}", mark, option),
                style,
            )));
        }

        frame.render_widget(
            Paragraph::new(lines).block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" {} ", dim.title())),
            ),
            area,
        );
    }

    fn render_footer(&self, frame: &mut Frame, area: Rect) {
        let hints = if self.filterable() {
            "q quit \u{2502} tab/1-6 views \u{2502} t/s/p filters \u{2502} space toggle \u{2502} c clear"
        } else {
            "q quit \u{2502} tab/1-6 views"
        };

        let mut status = self.store.report().summary();
        if !self.figures.notes.is_empty() {
            status.push_str(" \u{2502} ");
            status.push_str(&self.figures.notes.join("; "));
        }

        let lines = vec![
            Line::from(Span::styled(hints, self.theme.dim)),
            Line::from(Span::styled(status, self.theme.dim)),
        ];
        frame.render_widget(Paragraph::new(lines), area);
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pmo_runtime::data::loader::DataSet;
    use pmo_runtime::data::table::Table;
    use ratatui::backend::TestBackend;

    fn store() -> DataStore {
        let mut ds = DataSet::default();

        let mut projects = Table::with_columns(
            "projects",
            &[
                "project_id", "project_name", "type", "status", "priority",
                "budget_aed", "completion_percentage", "location",
            ],
        );
        projects.push_row(vec![
            "P1".into(), "Tower".into(), "Construction".into(), "In Progress".into(),
            "High".into(), 100.0.into(), 40.0.into(), "Marina".into(),
        ]);
        projects.push_row(vec![
            "P2".into(), "Metro".into(), "Infrastructure".into(), "Completed".into(),
            "Low".into(), 200.0.into(), 100.0.into(), "Deira".into(),
        ]);
        ds.tables.insert("projects".into(), projects);

        let mut tasks = Table::with_columns("tasks", &["task_id", "status"]);
        tasks.push_row(vec!["T1".into(), "Completed".into()]);
        ds.tables.insert("tasks".into(), tasks);

        DataStore::from_dataset(ds)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_starts_on_executive_overview() {
        let app = App::new("dark", store());
        assert_eq!(app.active_view(), ViewId::ExecutiveOverview);
        assert!(!app.figures().kpis.is_empty());
    }

    #[test]
    fn test_tab_cycles_views() {
        let mut app = App::new("dark", store());
        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.active_view(), ViewId::ProjectAnalytics);
        app.handle_key(key(KeyCode::BackTab));
        assert_eq!(app.active_view(), ViewId::ExecutiveOverview);
        app.handle_key(key(KeyCode::BackTab));
        assert_eq!(app.active_view(), ViewId::VendorAnalysis);
    }

    #[test]
    fn test_number_keys_jump() {
        let mut app = App::new("dark", store());
        app.handle_key(key(KeyCode::Char('5')));
        assert_eq!(app.active_view(), ViewId::RiskCompliance);
        app.handle_key(key(KeyCode::Char('1')));
        assert_eq!(app.active_view(), ViewId::ExecutiveOverview);
    }

    #[test]
    fn test_quit_keys() {
        let mut app = App::new("dark", store());
        app.handle_key(key(KeyCode::Char('q')));
        assert!(app.should_quit);

        let mut app = App::new("dark", store());
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
    }

    #[test]
    fn test_filter_toggle_recomputes() {
        let mut app = App::new("dark", store());
        app.handle_key(key(KeyCode::Char('2'))); // Project Analytics
        let before = app
            .figures()
            .kpis
            .iter()
            .find(|k| k.label == "Projects")
            .unwrap()
            .render();
        assert_eq!(before, "2");

        // Focus status filter and toggle the first option ("Completed").
        app.handle_key(key(KeyCode::Char('s')));
        app.handle_key(key(KeyCode::Char(' ')));

        let after = app
            .figures()
            .kpis
            .iter()
            .find(|k| k.label == "Projects")
            .unwrap()
            .render();
        assert_eq!(after, "1");

        // Clearing restores the unfiltered count.
        app.handle_key(key(KeyCode::Esc));
        app.handle_key(key(KeyCode::Char('c')));
        let cleared = app
            .figures()
            .kpis
            .iter()
            .find(|k| k.label == "Projects")
            .unwrap()
            .render();
        assert_eq!(cleared, "2");
    }

    #[test]
    fn test_filter_keys_ignored_on_non_filterable_views() {
        let mut app = App::new("dark", store());
        app.handle_key(key(KeyCode::Char('t')));
        assert_eq!(app.filter_focus, None);
    }

    #[test]
    fn test_cursor_stays_in_bounds() {
        let mut app = App::new("dark", store());
        app.handle_key(key(KeyCode::Char('2')));
        app.handle_key(key(KeyCode::Char('t')));
        app.handle_key(key(KeyCode::Up));
        assert_eq!(app.cursor, 0);
        for _ in 0..10 {
            app.handle_key(key(KeyCode::Down));
        }
        // Two distinct types in the fixture.
        assert_eq!(app.cursor, 1);
    }

    #[test]
    fn test_render_smoke_all_views() {
        let mut app = App::new("dark", store());
        let backend = TestBackend::new(120, 40);
        let mut terminal = Terminal::new(backend).unwrap();
        for i in 0..ViewId::ALL.len() {
            app.switch_view(i);
            terminal.draw(|frame| app.render(frame)).unwrap();
        }
    }

    #[test]
    fn test_render_smoke_with_filter_panel() {
        let mut app = App::new("dark", store());
        app.handle_key(key(KeyCode::Char('2')));
        app.handle_key(key(KeyCode::Char('p')));
        let backend = TestBackend::new(120, 40);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| app.render(frame)).unwrap();
    }
}
