use anyhow::Result;
use cash_checker::{
    denomination_label, format_amount, normalize_digits, save_theme, FormSession, Locale, Theme,
    DENOMINATIONS, VERSION,
};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};
use rusqlite::Connection;
use std::io;
use tracing::{info, warn};

/// Which input currently receives keystrokes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    ClaimedTotal,
    /// Index into DENOMINATIONS
    Count(usize),
}

impl Field {
    pub fn next(&self) -> Self {
        match self {
            Field::ClaimedTotal => Field::Count(0),
            Field::Count(i) if i + 1 < DENOMINATIONS.len() => Field::Count(i + 1),
            Field::Count(_) => Field::ClaimedTotal,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Field::ClaimedTotal => Field::Count(DENOMINATIONS.len() - 1),
            Field::Count(0) => Field::ClaimedTotal,
            Field::Count(i) => Field::Count(i - 1),
        }
    }
}

pub struct App {
    pub form: FormSession,
    pub focus: Field,
    pub theme: Theme,
    pub locale: Locale,
    conn: Connection,
}

impl App {
    pub fn new(conn: Connection, theme: Theme, locale: Locale) -> Self {
        Self {
            form: FormSession::new(),
            focus: Field::ClaimedTotal,
            theme,
            locale,
            conn,
        }
    }

    /// Text of the focused field
    pub fn focused_text(&self) -> &str {
        match self.focus {
            Field::ClaimedTotal => self.form.claimed_total(),
            Field::Count(i) => DENOMINATIONS
                .get(i)
                .and_then(|&d| self.form.ledger().count(d))
                .unwrap_or(""),
        }
    }

    fn set_focused_text(&mut self, text: &str) {
        match self.focus {
            Field::ClaimedTotal => self.form.set_claimed_total(text),
            Field::Count(i) => {
                if let Some(&denomination) = DENOMINATIONS.get(i) {
                    if let Err(e) = self.form.set_count(denomination, text) {
                        warn!("{}", e);
                    }
                }
            }
        }
    }

    pub fn push_char(&mut self, c: char) {
        let text = format!("{}{}", self.focused_text(), c);
        self.set_focused_text(&text);
    }

    pub fn backspace(&mut self) {
        let mut digits = normalize_digits(self.focused_text());
        digits.pop();
        self.set_focused_text(&digits);
    }

    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggle();
        match save_theme(&self.conn, self.theme) {
            Ok(()) => info!(theme = %self.theme, "theme saved"),
            Err(e) => warn!("could not save theme: {}", e),
        }
    }

    /// Apply one key press. Returns true when the user asked to quit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Esc => return true,
            KeyCode::Char('c') | KeyCode::Char('q') if ctrl => return true,
            KeyCode::Char('r') if ctrl => self.form.reset(),
            KeyCode::Char('t') if ctrl => self.toggle_theme(),
            KeyCode::Char('l') if ctrl => self.locale = self.locale.toggle(),
            KeyCode::Enter => {
                self.form.compare();
            }
            KeyCode::Tab | KeyCode::Down => self.focus = self.focus.next(),
            KeyCode::BackTab | KeyCode::Up => self.focus = self.focus.previous(),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Char(c) if !ctrl => self.push_char(c),
            _ => {}
        }

        false
    }

    fn palette(&self) -> Palette {
        match self.theme {
            Theme::Light => Palette {
                bg: Color::Gray,
                fg: Color::Black,
                accent: Color::Blue,
                muted: Color::DarkGray,
            },
            Theme::Dark => Palette {
                bg: Color::Black,
                fg: Color::White,
                accent: Color::Cyan,
                muted: Color::Gray,
            },
        }
    }
}

struct Palette {
    bg: Color,
    fg: Color,
    accent: Color,
    muted: Color,
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res?;
    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press && app.handle_key(key) {
                return Ok(());
            }
        }
    }
}

fn ui(f: &mut Frame, app: &App) {
    let palette = app.palette();
    let base = Style::default().bg(palette.bg).fg(palette.fg);

    f.render_widget(Block::default().style(base), f.size());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(3), // Claimed total
            Constraint::Length(9), // Denomination grid
            Constraint::Length(3), // Result banner
            Constraint::Min(0),
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app, &palette);
    render_field(
        f,
        chunks[1],
        app.locale.claimed_total_label(),
        app.form.claimed_total(),
        app.focus == Field::ClaimedTotal,
        &palette,
    );
    render_denominations(f, chunks[2], app, &palette);
    render_result(f, chunks[3], app);
    render_status_bar(f, chunks[5], app, &palette);
}

fn render_header(f: &mut Frame, area: Rect, app: &App, palette: &Palette) {
    let spans = vec![
        Span::styled(
            "Cash",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!(" v{}", VERSION), Style::default().fg(palette.muted)),
        Span::raw("  |  "),
        Span::styled(
            format!("notes: {}", format_amount(app.form.ledger().note_count())),
            Style::default().fg(palette.fg),
        ),
        Span::raw("  |  "),
        Span::styled(
            format!("theme: {}", app.theme),
            Style::default().fg(palette.muted),
        ),
        Span::raw("  |  "),
        Span::styled(
            format!("lang: {}", app.locale),
            Style::default().fg(palette.muted),
        ),
    ];

    let header = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.accent)),
    );
    f.render_widget(header, area);
}

fn render_field(
    f: &mut Frame,
    area: Rect,
    label: &str,
    value: &str,
    focused: bool,
    palette: &Palette,
) {
    let border = if focused {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(palette.muted)
    };

    let text = if focused {
        format!("{}▏", value)
    } else {
        value.to_string()
    };

    let field = Paragraph::new(text)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border)
                .title(format!(" {} ", label)),
        );
    f.render_widget(field, area);
}

fn render_denominations(f: &mut Frame, area: Rect, app: &App, palette: &Palette) {
    // Two columns, three rows, in denomination order
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
        ])
        .split(area);

    for (i, entry) in app.form.ledger().entries().iter().enumerate() {
        let Some(row) = rows.get(i / 2) else {
            continue;
        };
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(*row);

        if let Some(cell) = cols.get(i % 2) {
            render_field(
                f,
                *cell,
                &denomination_label(entry.denomination, app.locale),
                &entry.count,
                app.focus == Field::Count(i),
                palette,
            );
        }
    }
}

fn render_result(f: &mut Frame, area: Rect, app: &App) {
    let (Some(result), Some(message)) = (app.form.result(), app.form.message(app.locale)) else {
        return;
    };

    let bg = if result.balanced {
        Color::Green
    } else {
        Color::Red
    };
    let fg = if app.theme.is_dark() {
        Color::White
    } else {
        Color::Black
    };

    let banner = Paragraph::new(message)
        .alignment(Alignment::Center)
        .style(Style::default().bg(bg).fg(fg).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(banner, area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App, palette: &Palette) {
    let key = Style::default().fg(Color::Yellow);

    let spans = vec![
        Span::styled("Enter", key),
        Span::raw(format!(" {} | ", app.locale.compare_label())),
        Span::styled("Ctrl-R", key),
        Span::raw(format!(" {} | ", app.locale.reset_label())),
        Span::styled("Tab/↑/↓", key),
        Span::raw(" Field | "),
        Span::styled("Ctrl-T", key),
        Span::raw(" Theme | "),
        Span::styled("Ctrl-L", key),
        Span::raw(" Lang | "),
        Span::styled("Esc", Style::default().fg(Color::Red)),
        Span::raw(" Quit"),
    ];

    let status_bar = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.muted)),
    );
    f.render_widget(status_bar, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use cash_checker::{load_theme, setup_database, Sign};
    use ratatui::backend::TestBackend;

    fn test_app() -> App {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();
        App::new(conn, Theme::Light, Locale::English)
    }

    fn press(app: &mut App, code: KeyCode) -> bool {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn ctrl(app: &mut App, c: char) -> bool {
        app.handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_focus_cycles_through_all_fields() {
        let mut field = Field::ClaimedTotal;
        for _ in 0..=DENOMINATIONS.len() {
            field = field.next();
        }
        assert_eq!(field, Field::ClaimedTotal);
        assert_eq!(Field::ClaimedTotal.previous(), Field::Count(5));
        assert_eq!(Field::Count(0).previous(), Field::ClaimedTotal);
    }

    #[test]
    fn test_typing_formats_and_ignores_letters() {
        let mut app = test_app();
        type_text(&mut app, "5x000");
        assert_eq!(app.form.claimed_total(), "5,000");

        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.form.claimed_total(), "500");
    }

    #[test]
    fn test_compare_and_reset_via_keys() {
        let mut app = test_app();
        type_text(&mut app, "5000");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "3");
        assert_eq!(app.form.ledger().count(1000), Some("3"));

        press(&mut app, KeyCode::Enter);
        let result = app.form.result().unwrap();
        assert_eq!(result.sign, Sign::Over);
        assert_eq!(result.difference, 2000);

        ctrl(&mut app, 'r');
        assert!(app.form.is_empty());
    }

    #[test]
    fn test_theme_toggle_is_saved() {
        let mut app = test_app();
        ctrl(&mut app, 't');

        assert_eq!(app.theme, Theme::Dark);
        assert_eq!(load_theme(&app.conn).unwrap(), Theme::Dark);
    }

    #[test]
    fn test_quit_keys() {
        let mut app = test_app();
        assert!(!press(&mut app, KeyCode::Char('q')));
        assert!(press(&mut app, KeyCode::Esc));
        assert!(ctrl(&mut app, 'c'));
    }

    #[test]
    fn test_render_shows_labels_and_banner() {
        let mut app = test_app();
        type_text(&mut app, "3000");
        press(&mut app, KeyCode::Enter);

        let mut terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();
        terminal.draw(|f| ui(f, &app)).unwrap();

        let buffer = terminal.backend().buffer();
        let screen: String = buffer.content.iter().map(|cell| cell.symbol()).collect();

        assert!(screen.contains("Total sales"));
        assert!(screen.contains("1000 EGP"));
        assert!(screen.contains("3,000"));
        assert!(screen.contains("You have a shortfall of 3,000 EGP"));
    }

    #[test]
    fn test_header_shows_version_and_note_count() {
        let mut app = test_app();
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "2");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "1500");

        let mut terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();
        terminal.draw(|f| ui(f, &app)).unwrap();

        let buffer = terminal.backend().buffer();
        let screen: String = buffer.content.iter().map(|cell| cell.symbol()).collect();

        assert!(screen.contains(&format!("Cash v{}", VERSION)));
        assert!(screen.contains("notes: 1,502"));
    }
}
