use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};
use std::{
    io::{stdout, Stdout},
    path::PathBuf,
    time::Duration,
};

use brick_tetris::{
    figure::FIGURE_SIZE, storage::HIGH_SCORE_FILE, FileHighScoreStore, Game, GameSnapshot,
    HighScoreStore, MemoryHighScoreStore, RandomPieceProvider, State, SystemClock, UserAction,
    HEIGHT, WIDTH,
};

/// Falling-block puzzle in the terminal.
#[derive(Debug, Parser)]
#[command(name = "brick-tetris", version)]
struct Args {
    /// File holding the best score as plain decimal text.
    #[arg(long, default_value = HIGH_SCORE_FILE, value_name = "PATH")]
    high_score_file: PathBuf,

    /// Keep the high score in memory only.
    #[arg(long)]
    no_persist: bool,

    /// Seed for a reproducible piece sequence.
    #[arg(long, value_name = "N")]
    seed: Option<u64>,

    /// Driver loop cadence in milliseconds.
    #[arg(long, default_value = "10", value_name = "MS")]
    tick_ms: u64,
}

// ============================================================================
// Visual Constants
// ============================================================================

const CELL_WIDTH: u16 = 2;
const BLOCK_CHAR: &str = "██";
const EMPTY_CHAR: &str = "  ";

// ============================================================================
// Input
// ============================================================================

fn convert_key(code: KeyCode) -> Option<UserAction> {
    match code {
        KeyCode::Left => Some(UserAction::Left),
        KeyCode::Right => Some(UserAction::Right),
        KeyCode::Up => Some(UserAction::Up),
        KeyCode::Down => Some(UserAction::Down),
        KeyCode::Char(' ') => Some(UserAction::Action),
        KeyCode::Enter => Some(UserAction::Start),
        KeyCode::Char('p') | KeyCode::Char('P') => Some(UserAction::Pause),
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => Some(UserAction::Terminate),
        _ => None,
    }
}

fn poll_action(timeout: Duration) -> Result<Option<UserAction>> {
    if !event::poll(timeout)? {
        return Ok(None);
    }
    match event::read()? {
        Event::Key(key) if key.kind == KeyEventKind::Press => Ok(convert_key(key.code)),
        _ => Ok(None),
    }
}

// ============================================================================
// Rendering
// ============================================================================

fn render(frame: &mut Frame, snapshot: &GameSnapshot) {
    let area = frame.size();
    render_game(frame, snapshot, area);

    match snapshot.state {
        State::Start => render_popup(
            frame,
            area,
            " Tetris ",
            Color::Cyan,
            "BRICK TETRIS",
            &["Press Enter to start", "Press Q to quit"],
        ),
        State::GameOver => {
            let score = format!("Score: {}", snapshot.score);
            let level = format!("Level: {}", snapshot.level);
            render_popup(
                frame,
                area,
                " Game Over ",
                Color::Red,
                "GAME OVER",
                &[&score, &level, "", "Enter: title screen", "Q/ESC: quit"],
            );
        }
        _ if snapshot.pause => render_popup(
            frame,
            area,
            " Paused ",
            Color::Yellow,
            "PAUSED",
            &["Press P to continue", "Press Q to quit"],
        ),
        _ => {}
    }
}

fn render_game(frame: &mut Frame, snapshot: &GameSnapshot, area: Rect) {
    let grid_display_width = (WIDTH as u16 * CELL_WIDTH) + 2;
    let grid_display_height = HEIGHT as u16 + 2;
    let side_width = 16;
    let total_width = grid_display_width + side_width + 2;
    let total_height = grid_display_height + 3;

    let main_area = centered_rect(total_width, total_height, area);

    let vertical = Layout::vertical([
        Constraint::Length(grid_display_height),
        Constraint::Fill(1),
    ])
    .split(main_area);

    let game_row = vertical[0];

    // Layout: [Grid][Next + Info]
    let horizontal = Layout::horizontal([
        Constraint::Length(grid_display_width),
        Constraint::Length(side_width),
    ])
    .split(game_row);

    let side = Layout::vertical([
        Constraint::Length(FIGURE_SIZE as u16 + 2),
        Constraint::Fill(1),
    ])
    .split(horizontal[1]);

    render_grid(frame, snapshot, horizontal[0]);
    render_preview(frame, snapshot, side[0]);
    render_info(frame, snapshot, side[1]);

    let controls_area = Rect {
        x: area.x,
        y: game_row.y + game_row.height,
        width: area.width,
        height: 2,
    };

    if controls_area.y + 1 < area.height {
        let controls = Paragraph::new(vec![Line::from(
            "←→: Move | Space: Rotate | ↓: Drop | P: Pause | Q/ESC: Quit",
        )])
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(controls, controls_area);
    }
}

fn cells_line(cells: impl Iterator<Item = bool>) -> Line<'static> {
    cells
        .map(|filled| {
            if filled {
                Span::styled(BLOCK_CHAR, Style::default().fg(Color::White))
            } else {
                Span::raw(EMPTY_CHAR)
            }
        })
        .collect::<Vec<_>>()
        .into()
}

fn render_grid(frame: &mut Frame, snapshot: &GameSnapshot, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Tetris ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let grid = snapshot.composed();
    let lines: Vec<Line> = grid
        .rows()
        .map(|row| cells_line(row.iter().copied()))
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_preview(frame: &mut Frame, snapshot: &GameSnapshot, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Next ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines: Vec<Line> = snapshot
        .next
        .iter()
        .map(|row| cells_line(row.iter().copied()))
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_info(frame: &mut Frame, snapshot: &GameSnapshot, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Info ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines = vec![
        Line::from(Span::styled("Score", Style::default().fg(Color::Yellow))),
        Line::from(format!("{}", snapshot.score)),
        Line::from(Span::styled("High", Style::default().fg(Color::Magenta))),
        Line::from(format!("{}", snapshot.high_score)),
        Line::from(Span::styled("Level", Style::default().fg(Color::Green))),
        Line::from(format!("{}", snapshot.level)),
        Line::from(Span::styled("Speed", Style::default().fg(Color::Cyan))),
        Line::from(format!("{} ms", snapshot.speed)),
    ];

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(paragraph, inner);
}

fn render_popup(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    color: Color,
    headline: &str,
    hints: &[&str],
) {
    let mut text = vec![
        Line::from(""),
        Line::from(Span::styled(headline.to_string(), Style::default().fg(color))),
        Line::from(""),
    ];
    text.extend(hints.iter().map(|hint| {
        Line::from(Span::styled(
            hint.to_string(),
            Style::default().fg(Color::DarkGray),
        ))
    }));

    let height = text.len() as u16 + 2;
    let paragraph = Paragraph::new(text).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title.to_string())
            .title_alignment(Alignment::Center)
            .style(Style::default().bg(Color::Black)),
    );

    let popup_area = centered_rect(26, height, area);
    frame.render_widget(paragraph, popup_area);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let horizontal = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Length(width.min(area.width)),
        Constraint::Fill(1),
    ])
    .split(area);

    let vertical = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(height.min(area.height)),
        Constraint::Fill(1),
    ])
    .split(horizontal[1]);

    vertical[1]
}

// ============================================================================
// Main Loop
// ============================================================================

fn build_game(args: &Args) -> Result<Game> {
    let provider = match args.seed {
        Some(seed) => RandomPieceProvider::seeded(seed),
        None => RandomPieceProvider::new(),
    };
    let store: Box<dyn HighScoreStore> = if args.no_persist {
        Box::new(MemoryHighScoreStore::new())
    } else {
        Box::new(FileHighScoreStore::new(args.high_score_file.clone()))
    };

    Game::with_parts(Box::new(provider), Box::new(SystemClock::new()), store)
        .context("could not set up the game")
}

fn run(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    game: &mut Game,
    tick: Duration,
) -> Result<()> {
    let mut snapshot = game.snapshot();

    loop {
        terminal.draw(|frame| render(frame, &snapshot))?;

        let action = poll_action(tick)?;
        snapshot = game.update(action);
        // Drawing works from snapshots alone.
        game.take_events();

        if action == Some(UserAction::Terminate) {
            return Ok(());
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut game = build_game(&args)?;

    enable_raw_mode().context("could not enable raw mode")?;
    stdout().execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, &mut game, Duration::from_millis(args.tick_ms));

    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    let snapshot = game.snapshot();
    println!(
        "score {} | high score {} | level {}",
        snapshot.score, snapshot.high_score, snapshot.level
    );

    result
}
