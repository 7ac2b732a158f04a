//! Interactive terminal session.
//!
//! Channel-based architecture: a dedicated thread forwards crossterm input
//! events, request completions arrive on a tokio channel, and a tick
//! interval drives the in-flight throbber. All state mutation funnels
//! through [`App::handle_key`] and the session reducer.

pub mod widgets;

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context as _, Result};
use crossterm::event::{self, Event as TermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Paragraph, Wrap};
use tokio::sync::mpsc;

use crate::api::{ChatContext, ChromosClient};
use crate::export;
use crate::model::Settings;
use crate::session::history::LumaNode;
use crate::session::{Event, Origin, Session};
use widgets::{IslaPanel, SwatchGrid};

const THROBBER: [char; 8] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧'];

/// Which interaction affordances this session exposes.
#[derive(Debug, Clone, Copy)]
pub struct Capabilities {
    pub chat: bool,
    pub ada: bool,
    pub evolve: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            chat: true,
            ada: true,
            evolve: true,
        }
    }
}

/// Which input box has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Prompt,
    Chat,
    Evolve,
}

/// An operation the event loop performs on the app's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Quit,
    Generate { prompt: String, origin: Origin },
    Chat { prompt: String },
    Fix { node: usize },
    Export,
}

/// Central application state for the interactive session.
pub struct App {
    pub session: Session,
    pub settings: Settings,
    pub caps: Capabilities,
    focus: Focus,
    prompt_input: String,
    chat_input: String,
    evolve_input: String,
    evolve_parent: usize,
    selected_swatch: Option<usize>,
    /// History node being viewed; `None` means the latest.
    viewing: Option<usize>,
    chat_scroll: u16,
    status: Option<String>,
    throbber_frame: usize,
    last_ctrl_c: Option<Instant>,
}

impl App {
    pub fn new(settings: Settings, caps: Capabilities) -> Self {
        Self {
            session: Session::new(),
            settings: settings.clamped(),
            caps,
            focus: Focus::Prompt,
            prompt_input: String::new(),
            chat_input: String::new(),
            evolve_input: String::new(),
            evolve_parent: 0,
            selected_swatch: None,
            viewing: None,
            chat_scroll: 0,
            status: None,
            throbber_frame: 0,
            last_ctrl_c: None,
        }
    }

    /// Index of the node on screen: explicit selection or the latest.
    fn viewed_index(&self) -> Option<usize> {
        self.viewing
            .or_else(|| self.session.history.latest().map(|(i, _)| i))
    }

    fn viewed_node(&self) -> Option<&LumaNode> {
        self.viewed_index().and_then(|i| self.session.history.get(i))
    }

    /// Advance the throbber while a request is outstanding.
    pub fn tick(&mut self) {
        if self.session.in_flight() {
            self.throbber_frame = (self.throbber_frame + 1) % THROBBER.len();
        }
    }

    fn throbber_char(&self) -> char {
        THROBBER[self.throbber_frame]
    }

    /// Apply a completion event and keep view selections in bounds.
    pub fn apply(&mut self, event: Event) {
        let nodes_before = self.session.history.len();
        self.session.apply(event);
        if self.session.history.len() != nodes_before {
            // A new result arrived: jump the view to it.
            self.viewing = None;
            self.selected_swatch = None;
        }
        if let Some(node) = self.viewed_node() {
            if let Some(i) = self.selected_swatch {
                if i >= node.luma.palette.len() {
                    self.selected_swatch = None;
                }
            }
        }
    }

    /// Handle a key event, returning an action for the event loop.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Action> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Char('q') if ctrl => return Some(Action::Quit),
            KeyCode::Char('c') if ctrl => {
                if let Some(last) = self.last_ctrl_c {
                    if last.elapsed() < Duration::from_millis(500) {
                        return Some(Action::Quit);
                    }
                }
                self.last_ctrl_c = Some(Instant::now());
                return None;
            }
            _ => {}
        }

        match key.code {
            KeyCode::Tab => self.cycle_focus(),
            KeyCode::Esc if self.focus == Focus::Evolve => {
                self.evolve_input.clear();
                self.focus = Focus::Prompt;
            }
            KeyCode::Char('e') if ctrl && self.caps.evolve => {
                if let Some(i) = self.viewed_index() {
                    self.evolve_parent = i;
                    self.focus = Focus::Evolve;
                }
            }
            KeyCode::Char('f') if ctrl && self.caps.ada => {
                if !self.session.in_flight() {
                    if let Some(i) = self.viewed_index() {
                        let has_palette = self
                            .session
                            .history
                            .get(i)
                            .is_some_and(|n| !n.luma.palette.is_empty());
                        if has_palette {
                            return Some(Action::Fix { node: i });
                        }
                    }
                }
            }
            KeyCode::Char('t') if ctrl && self.caps.ada => {
                if let Some(i) = self.viewed_index() {
                    if let Some(node) = self.session.history.get_mut(i) {
                        node.luma.toggle_fixed_view();
                    }
                }
            }
            KeyCode::Char('s') if ctrl => {
                if self.viewed_node().is_some() {
                    return Some(Action::Export);
                }
            }
            KeyCode::Left => self.move_swatch_selection(-1),
            KeyCode::Right => self.move_swatch_selection(1),
            KeyCode::Up => self.move_history_view(-1),
            KeyCode::Down => self.move_history_view(1),
            KeyCode::PageUp => self.chat_scroll = self.chat_scroll.saturating_add(3),
            KeyCode::PageDown => self.chat_scroll = self.chat_scroll.saturating_sub(3),
            KeyCode::Enter => return self.submit(),
            KeyCode::Backspace => {
                self.focused_input_mut().pop();
            }
            KeyCode::Char(c) if !ctrl => {
                self.focused_input_mut().push(c);
            }
            _ => {}
        }
        None
    }

    fn cycle_focus(&mut self) {
        let chat_available = self.caps.chat && !self.session.history.is_empty();
        self.focus = match self.focus {
            Focus::Prompt if chat_available => Focus::Chat,
            Focus::Prompt => Focus::Prompt,
            Focus::Chat => Focus::Prompt,
            Focus::Evolve => Focus::Prompt,
        };
    }

    fn focused_input_mut(&mut self) -> &mut String {
        match self.focus {
            Focus::Prompt => &mut self.prompt_input,
            Focus::Chat => &mut self.chat_input,
            Focus::Evolve => &mut self.evolve_input,
        }
    }

    /// Submit the focused input. While a request is outstanding the
    /// affordance is disabled and blank input never dispatches.
    fn submit(&mut self) -> Option<Action> {
        if self.session.in_flight() {
            return None;
        }
        match self.focus {
            Focus::Prompt => {
                let prompt = self.prompt_input.trim().to_string();
                if prompt.is_empty() {
                    return None;
                }
                Some(Action::Generate {
                    prompt,
                    origin: Origin::Root,
                })
            }
            Focus::Evolve => {
                let prompt = self.evolve_input.trim().to_string();
                if prompt.is_empty() {
                    return None;
                }
                let parent = self.evolve_parent;
                self.evolve_input.clear();
                self.focus = Focus::Prompt;
                Some(Action::Generate {
                    prompt,
                    origin: Origin::Evolve(parent),
                })
            }
            Focus::Chat => {
                if self.session.history.is_empty() {
                    return None;
                }
                let prompt = self.chat_input.trim().to_string();
                if prompt.is_empty() {
                    return None;
                }
                self.chat_input.clear();
                Some(Action::Chat { prompt })
            }
        }
    }

    fn move_swatch_selection(&mut self, delta: i32) {
        let Some(node) = self.viewed_node() else {
            return;
        };
        let len = node.luma.palette.len();
        if len == 0 {
            return;
        }
        let current = self.selected_swatch.unwrap_or(0) as i32;
        let next = if self.selected_swatch.is_none() {
            0
        } else {
            (current + delta).clamp(0, len as i32 - 1) as usize
        };
        self.selected_swatch = Some(next);
    }

    fn move_history_view(&mut self, delta: i32) {
        let len = self.session.history.len();
        if len < 2 {
            return;
        }
        let current = self.viewed_index().unwrap_or(0) as i32;
        let next = (current + delta).clamp(0, len as i32 - 1) as usize;
        self.viewing = if next == len - 1 { None } else { Some(next) };
        self.selected_swatch = None;
    }

    /// Conversation context for the chat endpoint, taken from the result on
    /// screen.
    fn chat_context(&self) -> ChatContext {
        let tone = self
            .settings
            .tone_preset
            .clone()
            .unwrap_or_else(|| "resilient".to_string());
        match self.viewed_node() {
            Some(node) => ChatContext {
                label: node.luma.label.clone(),
                tags: node.luma.tags.clone(),
                tone,
            },
            None => ChatContext {
                tone,
                ..ChatContext::default()
            },
        }
    }
}

/// Launch the interactive session and block until the user quits.
pub async fn run(client: ChromosClient, settings: Settings, caps: Capabilities) -> Result<()> {
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = std::io::stdout();
    crossterm::execute!(stdout, EnterAlternateScreen)
        .context("failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, client, settings, caps).await;

    disable_raw_mode().ok();
    crossterm::execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();
    result
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    client: ChromosClient,
    settings: Settings,
    caps: Capabilities,
) -> Result<()> {
    let mut app = App::new(settings, caps);
    let client = Arc::new(client);
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();

    // Dedicated input thread: crossterm reads are blocking.
    let (input_tx, mut input_rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        while let Ok(ev) = event::read() {
            if input_tx.send(ev).is_err() {
                break;
            }
        }
    });

    let mut tick = tokio::time::interval(Duration::from_millis(120));
    loop {
        terminal.draw(|frame| render(frame, &app))?;
        tokio::select! {
            Some(ev) = input_rx.recv() => {
                if let TermEvent::Key(key) = ev {
                    if key.kind == KeyEventKind::Press {
                        match app.handle_key(key) {
                            Some(Action::Quit) => break,
                            Some(action) => dispatch(&mut app, action, &client, &event_tx),
                            None => {}
                        }
                    }
                }
            }
            Some(event) = event_rx.recv() => app.apply(event),
            _ = tick.tick() => app.tick(),
        }
    }
    Ok(())
}

/// Start the async work an action asks for. Each network dispatch takes a
/// sequence number from the session so a superseded completion is dropped
/// by the reducer instead of overwriting newer state.
fn dispatch(
    app: &mut App,
    action: Action,
    client: &Arc<ChromosClient>,
    tx: &mpsc::UnboundedSender<Event>,
) {
    match action {
        Action::Quit => {}
        Action::Generate { prompt, origin } => {
            let seq = app.session.begin_request();
            let client = Arc::clone(client);
            let tx = tx.clone();
            let settings = app.settings.clone();
            tokio::spawn(async move {
                let event = match client.generate(&prompt, &settings).await {
                    Ok(luma) => Event::Generated {
                        seq,
                        origin,
                        prompt,
                        luma,
                    },
                    Err(err) => Event::Failed {
                        seq,
                        message: err.to_string(),
                    },
                };
                let _ = tx.send(event);
            });
        }
        Action::Chat { prompt } => {
            let context = app.chat_context();
            let thread = app.session.transcript.clone();
            let seq = app.session.begin_request();
            let client = Arc::clone(client);
            let tx = tx.clone();
            tokio::spawn(async move {
                let event = match client.chat(&prompt, &context, &thread).await {
                    Ok(turn) => Event::Replied { seq, turn },
                    Err(err) => Event::Failed {
                        seq,
                        message: err.to_string(),
                    },
                };
                let _ = tx.send(event);
            });
        }
        Action::Fix { node } => {
            let Some(palette) = app
                .session
                .history
                .get(node)
                .map(|n| n.luma.palette.clone())
            else {
                return;
            };
            let seq = app.session.begin_request();
            let client = Arc::clone(client);
            let tx = tx.clone();
            tokio::spawn(async move {
                let event = match client.make_ada_compliant(&palette).await {
                    Ok(fixed) => Event::Fixed { seq, node, fixed },
                    Err(err) => Event::Failed {
                        seq,
                        message: err.to_string(),
                    },
                };
                let _ = tx.send(event);
            });
        }
        Action::Export => {
            let path = Path::new(export::DEFAULT_EXPORT_FILE);
            let outcome = app
                .viewed_node()
                .map(|node| export::write_to(&node.luma, path));
            app.status = match outcome {
                Some(Ok(())) => Some(format!("wrote {}", path.display())),
                Some(Err(err)) => Some(err.to_string()),
                None => None,
            };
        }
    }
}

fn render(frame: &mut Frame, app: &App) {
    let show_chat_input = app.caps.chat && !app.session.history.is_empty();
    let mut constraints = vec![Constraint::Length(3), Constraint::Min(8)];
    if show_chat_input {
        constraints.push(Constraint::Length(3));
    }
    constraints.push(Constraint::Length(1));
    let chunks = Layout::vertical(constraints).split(frame.area());

    render_prompt_bar(frame, chunks[0], app);
    render_main(frame, chunks[1], app);
    if show_chat_input {
        render_chat_bar(frame, chunks[2], app);
        render_status(frame, chunks[3], app);
    } else {
        render_status(frame, chunks[2], app);
    }
}

fn input_paragraph(text: &str, focused: bool) -> Paragraph<'static> {
    let mut display = text.to_string();
    if focused {
        display.push('▏');
    }
    Paragraph::new(display)
}

fn render_prompt_bar(frame: &mut Frame, area: Rect, app: &App) {
    let (title, text) = match app.focus {
        Focus::Evolve => (
            format!("Evolve from result {}", app.evolve_parent + 1),
            app.evolve_input.as_str(),
        ),
        _ => ("Describe a feeling".to_string(), app.prompt_input.as_str()),
    };
    let focused = app.focus != Focus::Chat;
    let mut block = Block::bordered().title(title);
    if focused {
        block = block.border_style(Style::default().fg(Color::Yellow));
    }
    frame.render_widget(input_paragraph(text, focused).block(block), area);
}

fn render_chat_bar(frame: &mut Frame, area: Rect, app: &App) {
    let focused = app.focus == Focus::Chat;
    let mut block = Block::bordered().title("Ask Isla");
    if focused {
        block = block.border_style(Style::default().fg(Color::Yellow));
    }
    frame.render_widget(
        input_paragraph(app.chat_input.as_str(), focused).block(block),
        area,
    );
}

fn render_main(frame: &mut Frame, area: Rect, app: &App) {
    let Some(node) = app.viewed_node() else {
        let welcome = Paragraph::new(vec![
            Line::from(""),
            Line::from("  Describe a feeling. It will be translated to color."),
            Line::from(""),
            Line::from(Span::styled(
                "  enter to generate · tab to switch inputs · ctrl+q to quit",
                Style::default().fg(Color::DarkGray),
            )),
        ])
        .block(Block::bordered().title("Chromos"));
        frame.render_widget(welcome, area);
        return;
    };

    let show_isla = app.caps.chat && !app.session.transcript.is_empty();
    let (palette_area, isla_area) = if show_isla {
        let halves =
            Layout::horizontal([Constraint::Percentage(62), Constraint::Percentage(38)])
                .split(area);
        (halves[0], Some(halves[1]))
    } else {
        (area, None)
    };

    let parts =
        Layout::vertical([Constraint::Min(6), Constraint::Length(6)]).split(palette_area);
    frame.render_widget(SwatchGrid::new(&node.luma, app.selected_swatch), parts[0]);

    let narrative = Paragraph::new(node.luma.narrative.clone())
        .wrap(Wrap { trim: true })
        .block(Block::bordered().title("Narrative"));
    frame.render_widget(narrative, parts[1]);

    if let Some(isla_area) = isla_area {
        frame.render_widget(
            IslaPanel::new(&app.session.transcript, app.chat_scroll),
            isla_area,
        );
    }
}

fn render_status(frame: &mut Frame, area: Rect, app: &App) {
    let line = if app.session.in_flight() {
        Line::from(Span::styled(
            format!(" {} waiting for the service…", app.throbber_char()),
            Style::default().fg(Color::Yellow),
        ))
    } else if let Some(error) = app.session.error() {
        Line::from(Span::styled(
            format!(" {error}"),
            Style::default().fg(Color::Red),
        ))
    } else if let Some(status) = &app.status {
        Line::from(Span::styled(
            format!(" {status}"),
            Style::default().fg(Color::Green),
        ))
    } else {
        let mut hints = vec!["enter generate".to_string()];
        if app.caps.evolve && !app.session.history.is_empty() {
            hints.push("ctrl+e evolve".into());
        }
        if app.caps.ada && !app.session.history.is_empty() {
            hints.push("ctrl+f ada fix".into());
        }
        if app.caps.ada
            && app
                .viewed_node()
                .is_some_and(|n| n.luma.fixed_palette.is_some())
        {
            hints.push("ctrl+t original/fixed".into());
        }
        if !app.session.history.is_empty() {
            hints.push("ctrl+s export".into());
            hints.push("←/→ swatch".into());
        }
        if app.session.history.len() > 1 {
            hints.push(format!(
                "↑/↓ result {}/{}",
                app.viewed_index().map(|i| i + 1).unwrap_or(0),
                app.session.history.len()
            ));
        }
        hints.push("ctrl+q quit".into());
        Line::from(Span::styled(
            format!(" {}", hints.join(" · ")),
            Style::default().fg(Color::DarkGray),
        ))
    };
    frame.render_widget(Paragraph::new(line), area);
}
