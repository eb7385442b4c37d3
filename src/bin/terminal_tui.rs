//! chatreel terminal demo.
//!
//! Plays the landing page conversation in a terminal using ratatui.
//! App logic lives in `chatreel::tui::terminal_app`.
//!
//! Usage: `terminal_tui [config.yaml]`

#![forbid(unsafe_code)]

#[cfg(feature = "tui")]
fn main() -> std::io::Result<()> {
    use chatreel::config::LandingConfig;
    use chatreel::tui::terminal_app::TerminalApp;

    tui::init_tracing();

    let app = match std::env::args().nth(1) {
        Some(path) => match LandingConfig::load(&path) {
            Ok(config) => TerminalApp::from_config(config),
            Err(e) => {
                eprintln!("✗ Error loading {path}: {e}");
                std::process::exit(1);
            }
        },
        None => TerminalApp::new(),
    };
    tui::run(app)
}

#[cfg(not(feature = "tui"))]
fn main() {
    eprintln!("TUI feature not enabled. Run with --features tui");
    std::process::exit(1);
}

#[cfg(feature = "tui")]
mod tui {
    use chatreel::playback::render::MessageKind;
    use chatreel::playback::transcript::RenderedMessage;
    use chatreel::tui::terminal_app::TerminalApp;
    use crossterm::{
        event::{self, Event, KeyEventKind},
        execute,
        terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    };
    use ratatui::{
        backend::CrosstermBackend,
        layout::{Constraint, Direction, Layout, Rect},
        style::{Color, Modifier, Style},
        text::{Line, Span},
        widgets::{Block, Borders, Paragraph, Wrap},
        Frame, Terminal,
    };
    use std::io;
    use std::time::{Duration, Instant};
    use tracing_subscriber::EnvFilter;

    const EMERALD: Color = Color::Rgb(16, 185, 129);

    /// Log to stderr only when asked; the alternate screen owns stdout.
    pub fn init_tracing() {
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::stderr)
                .init();
        }
    }

    /// Run the TUI application.
    pub fn run(mut app: TerminalApp) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let tick_rate = Duration::from_millis(33);
        let mut last_frame = Instant::now();

        loop {
            let start = Instant::now();
            terminal.draw(|f| ui(f, &app))?;

            let timeout = tick_rate.saturating_sub(start.elapsed());
            if event::poll(timeout)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        app.handle_key(key.code);
                    }
                }
            }

            if app.should_quit() {
                break;
            }

            app.update(last_frame.elapsed());
            last_frame = Instant::now();
        }

        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        Ok(())
    }

    fn ui(f: &mut Frame, app: &TerminalApp) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(10),
                Constraint::Length(3),
            ])
            .split(f.area());

        render_title(f, chunks[0], app);
        render_conversation(f, chunks[1], app);
        render_status(f, chunks[2], app);
    }

    fn render_title(f: &mut Frame, area: Rect, app: &TerminalApp) {
        let title = Paragraph::new(vec![Line::from(vec![
            Span::styled(
                " 🤖 ATLAS COPILOT ",
                Style::default().fg(EMERALD).add_modifier(Modifier::BOLD),
            ),
            Span::raw(" | "),
            Span::styled(
                if app.paused { "[PAUSED]" } else { "[PLAYING]" },
                Style::default().fg(if app.paused {
                    Color::Yellow
                } else {
                    Color::Green
                }),
            ),
        ])])
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Controls: [Space] Pause  [R] Restart  [+/-] Speed  [Q] Quit"),
        );
        f.render_widget(title, area);
    }

    fn message_lines(message: &RenderedMessage, app: &TerminalApp) -> Vec<Line<'static>> {
        let (align, author_style) = match message.kind {
            MessageKind::Incoming => ("", Style::default().fg(Color::Cyan)),
            MessageKind::Outgoing => (
                "  ",
                Style::default().fg(EMERALD).add_modifier(Modifier::BOLD),
            ),
        };

        let mut lines = vec![Line::from(Span::styled(
            format!("{align}{}", message.author),
            author_style,
        ))];
        if message.is_typing() {
            lines.push(Line::from(Span::styled(
                format!("{align}  {}", app.typing_dots()),
                Style::default().fg(Color::DarkGray),
            )));
        } else {
            for text in message.plain_text().split('\n') {
                lines.push(Line::from(format!("{align}  {text}")));
            }
        }
        if let Some(time) = &message.time {
            lines.push(Line::from(Span::styled(
                format!("{align}  {time}"),
                Style::default().fg(Color::DarkGray),
            )));
        }
        lines.push(Line::from(""));
        lines
    }

    fn render_conversation(f: &mut Frame, area: Rect, app: &TerminalApp) {
        let lines: Vec<Line> = app
            .transcript
            .borrow()
            .messages()
            .iter()
            .flat_map(|m| message_lines(m, app))
            .collect();

        let body = Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title("atlas@whatsapp"));
        f.render_widget(body, area);
    }

    fn render_status(f: &mut Frame, area: Rect, app: &TerminalApp) {
        let status = Paragraph::new(Line::from(Span::styled(
            app.status_line(),
            Style::default().fg(Color::Gray),
        )))
        .block(Block::default().borders(Borders::ALL));
        f.render_widget(status, area);
    }
}
