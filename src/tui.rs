use anyhow::Result;
use chrono::Local;
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
use std::path::Path;

use crate::export::{dated_filename, write_csv};
use crate::models::JobPosting;
use crate::view::{apply_view, stats, Filter, SortKey, Stats};

struct AppState<'a> {
    postings: &'a [JobPosting],
    view: Vec<&'a JobPosting>,
    filter: Filter,
    sort: SortKey,
    stats: Stats,
    selected: usize,
    scroll_offset: u16,
    notice: Option<String>,
}

impl<'a> AppState<'a> {
    fn new(postings: &'a [JobPosting], filter: Filter, sort: SortKey) -> Self {
        Self {
            postings,
            view: apply_view(postings, filter, sort),
            filter,
            sort,
            stats: stats(postings),
            selected: 0,
            scroll_offset: 0,
            notice: None,
        }
    }

    fn current_posting(&self) -> Option<&'a JobPosting> {
        self.view.get(self.selected).copied()
    }

    fn rebuild_view(&mut self) {
        self.view = apply_view(self.postings, self.filter, self.sort);
        self.selected = 0;
        self.scroll_offset = 0;
    }

    fn cycle_filter(&mut self) {
        self.filter = self.filter.next();
        self.rebuild_view();
    }

    fn toggle_sort(&mut self) {
        self.sort = self.sort.toggle();
        self.rebuild_view();
    }

    fn next(&mut self) {
        if !self.view.is_empty() && self.selected < self.view.len() - 1 {
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

    fn export_current_view(&mut self) {
        let name = dated_filename(Local::now().date_naive());
        self.notice = Some(match write_csv(&self.view, Path::new(&name)) {
            Ok(()) => format!("Exported {} rows to {}", self.view.len(), name),
            Err(err) => format!("Export failed: {err:#}"),
        });
    }
}

pub fn run_browse(postings: &[JobPosting], filter: Filter, sort: SortKey) -> Result<()> {
    if postings.is_empty() {
        println!("No positions to browse.");
        return Ok(());
    }

    let mut state = AppState::new(postings, filter, sort);

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = run_loop(&mut terminal, &mut state);

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    state: &mut AppState,
) -> Result<()> {
    let mut list_state = ListState::default();
    list_state.select(Some(0));

    loop {
        terminal.draw(|frame| draw(frame, state, &mut list_state))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => break,
                KeyCode::Down | KeyCode::Char('j') => state.next(),
                KeyCode::Up | KeyCode::Char('k') => state.prev(),
                KeyCode::Char('J') | KeyCode::PageDown => state.scroll_down(),
                KeyCode::Char('K') | KeyCode::PageUp => state.scroll_up(),
                KeyCode::Char('f') => state.cycle_filter(),
                KeyCode::Char('s') => state.toggle_sort(),
                KeyCode::Char('e') => state.export_current_view(),
                _ => {}
            }
            if state.view.is_empty() {
                list_state.select(None);
            } else {
                list_state.select(Some(state.selected));
            }
        }
    }
    Ok(())
}

fn draw(frame: &mut Frame, state: &AppState, list_state: &mut ListState) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(35),
            Constraint::Percentage(65),
        ])
        .split(frame.area());

    // Left panel: position list for the active view
    let items: Vec<ListItem> = state
        .view
        .iter()
        .map(|posting| {
            let percent = (posting.effective_score() * 100.0).round() as u32;
            let title = if posting.title.chars().count() > 35 {
                let short: String = posting.title.chars().take(32).collect();
                format!("{short}...")
            } else {
                posting.title.clone()
            };
            ListItem::new(format!("{percent:>3}% {title} | {}", posting.company))
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(format!(
            " Positions ({}/{}) ", state.view.len(), state.stats.total
        )))
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, chunks[0], list_state);

    // Right panel: posting detail
    let detail = build_detail(state);
    let detail_widget = Paragraph::new(detail)
        .block(Block::default().borders(Borders::ALL).title(" Detail "))
        .wrap(Wrap { trim: false })
        .scroll((state.scroll_offset, 0));

    frame.render_widget(detail_widget, chunks[1]);

    // Footer: stats or last notice, then key help
    let footer_area = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(2)])
        .split(frame.area());

    let summary = match &state.notice {
        Some(notice) => format!(" {notice}"),
        None => format!(
            " {} found | {} remote | {} local | avg match {}%   filter:{}  sort:{}",
            state.stats.total,
            state.stats.remote,
            state.stats.local,
            state.stats.average_match_percent,
            state.filter.label(),
            state.sort.label(),
        ),
    };
    let footer = Paragraph::new(format!(
        "{summary}\n f:filter  s:sort  e:export  j/k:navigate  J/K:scroll  q:quit"
    ))
    .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, footer_area[1]);
}

fn build_detail<'a>(state: &'a AppState) -> Text<'a> {
    let Some(posting) = state.current_posting() else {
        return Text::raw("No positions match this filter");
    };

    let mut lines: Vec<Line> = Vec::new();

    lines.push(Line::from(Span::styled(
        &posting.title,
        Style::default().add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(format!("at {}", posting.company)));

    let location_style = if posting.is_remote() {
        Style::default().fg(Color::Green)
    } else {
        Style::default()
    };
    lines.push(Line::from(Span::styled(
        format!("Location: {}", posting.location),
        location_style,
    )));

    let score = posting.effective_score();
    let score_style = if score >= 0.8 {
        Style::default().fg(Color::Green)
    } else if score >= 0.6 {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::Red)
    };
    lines.push(Line::from(Span::styled(
        format!("Match: {}%", (score * 100.0).round() as u32),
        score_style,
    )));

    lines.push(Line::from(format!("Source: {}", posting.source.label())));

    if let Some(url) = &posting.url {
        lines.push(Line::from(format!("URL: {url}")));
    }

    lines.push(Line::from(""));

    if !posting.tags.is_empty() {
        lines.push(Line::from(Span::styled(
            "TAGS",
            Style::default().add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(format!("  {}", posting.tags.join(", "))));
        lines.push(Line::from(""));
    }

    if posting.summary.is_empty() {
        lines.push(Line::from(Span::styled(
            "(No summary returned)",
            Style::default().fg(Color::DarkGray),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            "SUMMARY",
            Style::default().add_modifier(Modifier::BOLD),
        )));
        for line in textwrap::fill(&posting.summary, 70).lines() {
            lines.push(Line::from(format!("  {line}")));
        }
    }

    Text::from(lines)
}
