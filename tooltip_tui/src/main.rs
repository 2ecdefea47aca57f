use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};
use std::io;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tooltip_core::graphics::Graphics;
use tooltip_core::types::{FontAlign, HAlign};
use tooltip_core::{
    AdvancedTooltip, Clipboard, ConfigError, FrameCapture, HotkeyState, HoverSnapshot,
    ModRecordStore, Rarity, RectF, Rgba, Settings, Vec2,
};
use tracing_subscriber::filter::EnvFilter;

const SETTINGS_PATH: &str = "settings.toml";
const MODS_DIR: &str = "data/mods";
const CAPTURE_PATH: &str = "data/captures/demo.json";
const LOG_PATH: &str = "tooltip.log";

/// Screen pixels covered by one terminal cell
const CELL_WIDTH: f32 = 8.0;
const CELL_HEIGHT: f32 = 16.0;
/// Room left of the tooltip for the fast mods column
const VIEW_MARGIN_X: f32 = 12.0 * CELL_WIDTH;

const DEFAULT_OVERRIDE_KEY: &str = "o";
const DEFAULT_DUMP_MODS_KEY: &str = "n";
const DEFAULT_DUMP_STATS_KEY: &str = "s";

fn main() -> Result<(), io::Error> {
    let settings = Settings::load_or_default(Path::new(SETTINGS_PATH));
    let show_debug = settings.as_ref().map_or(false, |s| s.debug.show_debug);
    init_logging(show_debug);

    let mut app = match settings.and_then(|s| {
        ModRecordStore::load_from_dir(Path::new(MODS_DIR)).map(|store| (s, store))
    }) {
        Ok((settings, store)) => App::new(settings, store),
        Err(e) => App::with_config_error(e),
    };

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("Error: {err:?}");
    }

    Ok(())
}

/// Log to a file; the terminal belongs to the UI
fn init_logging(show_debug: bool) {
    let level = if show_debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(LOG_PATH)
    {
        Ok(file) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init(),
        Err(_) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::sink)
            .init(),
    }
}

/// Clipboard that keeps the last copied text for the status bar
#[derive(Default)]
struct MemoryClipboard {
    text: Mutex<Option<String>>,
}

impl MemoryClipboard {
    fn last(&self) -> Option<String> {
        self.text.lock().ok().and_then(|text| text.clone())
    }
}

impl Clipboard for MemoryClipboard {
    fn set_text(&self, text: &str) {
        if let Ok(mut slot) = self.text.lock() {
            *slot = Some(text.to_string());
        }
    }
}

struct App {
    overlay: Option<AdvancedTooltip>,
    capture: FrameCapture,
    frame_state: ListState,
    /// Terminals report no key releases, so the override key toggles
    override_held: bool,
    pending: HotkeyState,
    clipboard: Arc<MemoryClipboard>,
    /// Vertical view offset in screen pixels
    scroll: f32,
    message: Option<String>,
    /// Config error if loading failed
    config_error: Option<ConfigError>,
}

impl App {
    fn new(settings: Settings, store: ModRecordStore) -> Self {
        let (capture, message) = match FrameCapture::load_from_file(Path::new(CAPTURE_PATH)) {
            Ok(capture) => (capture, None),
            Err(e) => {
                tracing::warn!(error = %e, path = CAPTURE_PATH, "could not load capture");
                (FrameCapture::new(), Some(format!("No capture loaded: {e}")))
            }
        };
        tracing::info!(records = store.len(), frames = capture.frames.len(), "overlay ready");

        let mut frame_state = ListState::default();
        if !capture.frames.is_empty() {
            frame_state.select(Some(0));
        }

        App {
            overlay: Some(AdvancedTooltip::new(settings, Arc::new(store))),
            capture,
            frame_state,
            override_held: false,
            pending: HotkeyState::default(),
            clipboard: Arc::new(MemoryClipboard::default()),
            scroll: 0.0,
            message,
            config_error: None,
        }
    }

    fn with_config_error(error: ConfigError) -> Self {
        App {
            overlay: None,
            capture: FrameCapture::new(),
            frame_state: ListState::default(),
            override_held: false,
            pending: HotkeyState::default(),
            clipboard: Arc::new(MemoryClipboard::default()),
            scroll: 0.0,
            message: None,
            config_error: Some(error),
        }
    }

    fn settings(&self) -> Option<&Settings> {
        self.overlay.as_ref().map(AdvancedTooltip::settings)
    }

    fn binding(&self, pick: fn(&Settings) -> Option<&str>, default: &'static str) -> String {
        self.settings()
            .and_then(pick)
            .unwrap_or(default)
            .to_string()
    }

    /// One host frame: hand the selected capture entry to the overlay
    fn tick(&mut self) {
        let Some(overlay) = self.overlay.as_mut() else {
            return;
        };
        let index = self.frame_state.selected().unwrap_or(0);
        let hotkeys = HotkeyState {
            override_tooltip_held: self.override_held,
            ..self.pending
        };
        let clipboard: Arc<dyn Clipboard> = self.clipboard.clone();
        overlay.tick(self.capture.host_frame(index), hotkeys, &clipboard);
        self.pending = HotkeyState::default();
    }

    fn select_frame(&mut self, delta: isize) {
        let count = self.capture.frames.len();
        if count == 0 {
            return;
        }
        let current = self.frame_state.selected().unwrap_or(0) as isize;
        let next = (current + delta).clamp(0, count as isize - 1) as usize;
        self.frame_state.select(Some(next));
        self.scroll = 0.0;
    }
}

fn key_matches(binding: &str, code: KeyCode) -> bool {
    match code {
        KeyCode::Char(c) => {
            let mut chars = binding.chars();
            chars.next() == Some(c) && chars.next().is_none()
        }
        _ => false,
    }
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> io::Result<()> {
    loop {
        app.tick();
        terminal.draw(|f| ui(f, app))?;

        // Redraw periodically so finished clipboard dumps show up
        if !event::poll(Duration::from_millis(100))? {
            continue;
        }
        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }

            match key.code {
                KeyCode::Char('q') => return Ok(()),
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    return Ok(())
                }
                _ => {}
            }
            if app.config_error.is_some() {
                continue;
            }

            app.message = None;
            let override_key = app.binding(|s| s.item_mods.override_tooltip_key.as_deref(), DEFAULT_OVERRIDE_KEY);
            let dump_mods_key = app.binding(|s| s.item_mods.dump_mod_names_key.as_deref(), DEFAULT_DUMP_MODS_KEY);
            let dump_stats_key = app.binding(|s| s.item_mods.dump_stat_names_key.as_deref(), DEFAULT_DUMP_STATS_KEY);

            match key.code {
                KeyCode::Left | KeyCode::Char('h') => app.select_frame(-1),
                KeyCode::Right | KeyCode::Char('l') => app.select_frame(1),
                KeyCode::Up | KeyCode::Char('k') => app.scroll -= CELL_HEIGHT,
                KeyCode::Down | KeyCode::Char('j') => app.scroll += CELL_HEIGHT,
                code if key_matches(&override_key, code) => {
                    app.override_held = !app.override_held;
                }
                code if key_matches(&dump_mods_key, code) => {
                    app.pending.dump_mod_names_pressed = true;
                    app.message = Some("Copying mod names...".to_string());
                }
                code if key_matches(&dump_stats_key, code) => {
                    app.pending.dump_stat_names_pressed = true;
                    app.message = Some("Copying stat names...".to_string());
                }
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    if let Some(ref error) = app.config_error {
        render_config_error(f, error);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(f.area());

    let main_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(25), Constraint::Percentage(75)])
        .split(chunks[0]);

    render_frames(f, app, main_chunks[0]);
    render_overlay(f, app, main_chunks[1]);
    render_help(f, app, chunks[1]);
}

fn render_config_error(f: &mut Frame, error: &ConfigError) {
    let error_area = centered_rect(80, 60, f.area());

    let error_type = match error {
        ConfigError::Io { .. } => "File I/O Error",
        ConfigError::Parse { .. } => "TOML Parse Error",
        ConfigError::DuplicateRecord { .. } => "Duplicate Mod Record",
    };

    let mut lines = vec![
        Line::from(vec![Span::styled(
            "Configuration Error",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
        Line::from(vec![
            Span::styled("Type: ", Style::default().fg(Color::Yellow)),
            Span::raw(error_type),
        ]),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Location:",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )]),
    ];
    for line in error.location_description().lines() {
        lines.push(Line::from(vec![
            Span::raw("  "),
            Span::styled(line.to_string(), Style::default().fg(Color::Cyan)),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(vec![Span::styled(
        "Error:",
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
    )]));
    for line in error.error_message().lines() {
        lines.push(Line::from(vec![Span::raw("  "), Span::raw(line.to_string())]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("Press ", Style::default().fg(Color::DarkGray)),
        Span::styled("q", Style::default().fg(Color::White).add_modifier(Modifier::BOLD)),
        Span::styled(" to quit and fix the file.", Style::default().fg(Color::DarkGray)),
    ]));

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red))
                .title(" Config Error ")
                .title_style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(ratatui::widgets::Clear, error_area);
    f.render_widget(paragraph, error_area);
}

fn rarity_color(rarity: Rarity) -> Color {
    match rarity {
        Rarity::Normal => Color::White,
        Rarity::Magic => Color::Blue,
        Rarity::Rare => Color::Yellow,
        Rarity::Unique => Color::Rgb(175, 96, 37),
    }
}

fn render_frames(f: &mut Frame, app: &mut App, area: Rect) {
    let items: Vec<ListItem> = app
        .capture
        .frames
        .iter()
        .map(|hover| {
            let rarity = hover.item.mods.as_ref().map_or(Rarity::Normal, |m| m.rarity);
            let label = if hover.item.base_class.is_empty() {
                format!("#{}", hover.item.address)
            } else {
                hover.item.base_class.clone()
            };
            ListItem::new(Line::from(Span::styled(label, Style::default().fg(rarity_color(rarity)))))
        })
        .collect();

    let title = format!(" Captured Items ({}) ", app.capture.frames.len());
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");

    f.render_stateful_widget(list, area, &mut app.frame_state);
}

fn render_overlay(f: &mut Frame, app: &mut App, area: Rect) {
    let title = if app.override_held {
        " Tooltip [override] "
    } else {
        " Tooltip "
    };
    let block = Block::default().borders(Borders::ALL).title(title);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some(overlay) = app.overlay.as_mut() else {
        return;
    };
    let Some(hover) = overlay.hovered().cloned() else {
        f.render_widget(
            Paragraph::new(Span::styled("Nothing hovered", Style::default().fg(Color::DarkGray))),
            inner,
        );
        return;
    };
    let Some(rect) = hover.tooltip.as_ref().map(|t| t.rect) else {
        return;
    };

    let view = Vec2::new(rect.x - VIEW_MARGIN_X, rect.y - CELL_HEIGHT + app.scroll);
    let mut gfx = TerminalGraphics::new(f.buffer_mut(), inner, view);
    draw_native_tooltip(&mut gfx, &hover, rect);
    overlay.render(&mut gfx);
}

/// Stand-in for the game's own tooltip
fn draw_native_tooltip(gfx: &mut TerminalGraphics<'_>, hover: &HoverSnapshot, rect: RectF) {
    gfx.draw_box(rect, Rgba::rgb(12, 10, 8));
    gfx.draw_frame(rect, Rgba::rgb(120, 100, 70), 1.0);

    let center = FontAlign::CENTER;
    let title = Vec2::new(rect.x + rect.width / 2.0, rect.y + CELL_HEIGHT);
    gfx.draw_text(&hover.item.base_class, title, Rgba::rgb(200, 200, 200), center);

    let Some(mods) = hover.item.mods.as_ref() else {
        return;
    };
    let mut position = Vec2::new(title.x, rect.y + mods.header_offset());
    for m in &mods.item_mods {
        let text = if m.display_name.is_empty() { &m.name } else { &m.display_name };
        position.y += gfx
            .draw_text(text, position, Rgba::rgb(136, 136, 255), center)
            .y;
    }
}

fn render_help(f: &mut Frame, app: &App, area: Rect) {
    let help_text = if let Some(ref msg) = app.message {
        match app.clipboard.last() {
            Some(copied) if msg.starts_with("Copying") => Span::styled(
                format!("Clipboard: {}", copied.trim_end().replace('\n', " | ")),
                Style::default().fg(Color::Green),
            ),
            _ => Span::styled(msg.clone(), Style::default().fg(Color::Yellow)),
        }
    } else {
        Span::raw(format!(
            "←/→: Item | ↑/↓: Scroll | {}: Override | {}: Copy mods | {}: Copy stats | q: Quit",
            app.binding(|s| s.item_mods.override_tooltip_key.as_deref(), DEFAULT_OVERRIDE_KEY),
            app.binding(|s| s.item_mods.dump_mod_names_key.as_deref(), DEFAULT_DUMP_MODS_KEY),
            app.binding(|s| s.item_mods.dump_stat_names_key.as_deref(), DEFAULT_DUMP_STATS_KEY),
        ))
    };

    let help = Paragraph::new(Line::from(help_text))
        .block(Block::default().borders(Borders::ALL).title(" Help "));

    f.render_widget(help, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// Draws overlay primitives into a terminal buffer, one cell per
/// `CELL_WIDTH` x `CELL_HEIGHT` screen pixels. Glyphs cannot scale, so the
/// text scale is tracked but does not change measurements.
struct TerminalGraphics<'b> {
    buf: &'b mut Buffer,
    area: Rect,
    /// Screen position shown at the area's top-left cell
    view: Vec2,
    scale: f32,
}

impl<'b> TerminalGraphics<'b> {
    fn new(buf: &'b mut Buffer, area: Rect, view: Vec2) -> Self {
        TerminalGraphics {
            buf,
            area,
            view,
            scale: 1.0,
        }
    }

    fn cell_at(&self, position: Vec2) -> Option<(u16, u16)> {
        let col = ((position.x - self.view.x) / CELL_WIDTH).floor();
        let row = ((position.y - self.view.y) / CELL_HEIGHT).floor();
        if col < 0.0 || row < 0.0 || col >= self.area.width as f32 || row >= self.area.height as f32 {
            return None;
        }
        Some((self.area.x + col as u16, self.area.y + row as u16))
    }

    /// Cells covered by a screen rectangle, clipped to the area
    fn cells_in(&self, rect: RectF) -> impl Iterator<Item = (u16, u16)> {
        let left = ((rect.left() - self.view.x) / CELL_WIDTH).floor().max(0.0) as u16;
        let top = ((rect.top() - self.view.y) / CELL_HEIGHT).floor().max(0.0) as u16;
        let right = (((rect.right() - self.view.x) / CELL_WIDTH).ceil().max(0.0) as u16).min(self.area.width);
        let bottom = (((rect.bottom() - self.view.y) / CELL_HEIGHT).ceil().max(0.0) as u16).min(self.area.height);
        let (x0, y0) = (self.area.x, self.area.y);
        (top..bottom).flat_map(move |row| (left..right).map(move |col| (x0 + col, y0 + row)))
    }
}

/// Alpha-blend onto black; terminals have no transparency
fn to_color(color: Rgba) -> Color {
    let blend = |c: u8| (c as u16 * color.a as u16 / 255) as u8;
    Color::Rgb(blend(color.r), blend(color.g), blend(color.b))
}

impl Graphics for TerminalGraphics<'_> {
    fn measure_text(&self, text: &str) -> Vec2 {
        if text.is_empty() {
            return Vec2::ZERO;
        }
        Vec2::new(text.chars().count() as f32 * CELL_WIDTH, CELL_HEIGHT)
    }

    fn draw_text(&mut self, text: &str, position: Vec2, color: Rgba, align: FontAlign) -> Vec2 {
        let size = self.measure_text(text);
        let mut start = position;
        match align.horizontal {
            HAlign::Left => {}
            HAlign::Center => start.x -= size.x / 2.0,
            HAlign::Right => start.x -= size.x,
        }
        if align.vertical_center {
            start.y -= size.y / 2.0;
        }

        let fg = Color::Rgb(color.r, color.g, color.b);
        for (i, ch) in text.chars().enumerate() {
            let Some(cell) = self.cell_at(start.translate(i as f32 * CELL_WIDTH, 0.0)) else {
                continue;
            };
            if let Some(c) = self.buf.cell_mut(cell) {
                c.set_char(ch).set_fg(fg);
            }
        }
        size
    }

    fn draw_box(&mut self, rect: RectF, color: Rgba) {
        if color.a == 0 {
            return;
        }
        let bg = to_color(color);
        let cells: Vec<_> = self.cells_in(rect).collect();
        for cell in cells {
            if let Some(c) = self.buf.cell_mut(cell) {
                c.set_bg(bg);
            }
        }
    }

    fn draw_frame(&mut self, rect: RectF, color: Rgba, _thickness: f32) {
        let fg = Color::Rgb(color.r, color.g, color.b);
        let cells: Vec<_> = self.cells_in(rect).collect();
        let Some(&(first_x, first_y)) = cells.first() else {
            return;
        };
        let Some(&(last_x, last_y)) = cells.last() else {
            return;
        };
        for (x, y) in cells {
            let symbol = match (x == first_x || x == last_x, y == first_y || y == last_y) {
                (true, true) => "+",
                (false, true) => "-",
                (true, false) => "|",
                (false, false) => continue,
            };
            if let Some(c) = self.buf.cell_mut((x, y)) {
                c.set_symbol(symbol).set_fg(fg);
            }
        }
    }

    fn draw_image(&mut self, name: &str, rect: RectF, tint: Rgba) {
        tracing::trace!(image = name, "drawing image as shaded box");
        let shade = Rgba::rgba(tint.r / 4, tint.g / 4, tint.b / 4, tint.a);
        self.draw_box(rect, shade);
    }

    fn text_scale(&self) -> f32 {
        self.scale
    }

    fn set_text_scale(&mut self, scale: f32) {
        self.scale = scale;
    }
}
