//! Play command implementation.
//!
//! Keys are read on their own thread and reach the render loop over a
//! channel, so neither input nor a slow backend ever stalls a frame.

use std::io;
use std::time::Duration;

use anyhow::Result;
use console::{Key, Term, style};
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, error::TryRecvError};
use tokio::time::MissedTickBehavior;
use tracing::debug;

use qcoin_flip::animator::BOUNCE_AMPLITUDE;
use qcoin_flip::{CoinFlipSession, CoinShape, DeviceSelector, Face, RenderState, RunStatus};

use super::common::BackendArgs;

/// Coins per drawn row.
const COINS_PER_ROW: usize = 12;

/// Text lines a coin can bounce through above its resting line.
const LIFT_LINES: usize = 3;

/// A user command decoded from a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Flip,
    Select(DeviceSelector),
    Adjust(isize),
    Quit,
}

fn command_for(key: &Key) -> Option<Command> {
    match key {
        Key::Char(' ') | Key::Enter => Some(Command::Flip),
        Key::Char(c @ '1'..='4') => {
            let index = (*c as usize) - ('1' as usize);
            Some(Command::Select(DeviceSelector::ALL[index]))
        }
        Key::Char('+' | '=') => Some(Command::Adjust(1)),
        Key::Char('-' | '_') => Some(Command::Adjust(-1)),
        Key::Char('q' | 'Q') | Key::Escape => Some(Command::Quit),
        _ => None,
    }
}

/// Execute the play command.
pub async fn execute(args: &BackendArgs, fps: u32) -> Result<()> {
    let term = Term::stdout();
    if !term.is_term() {
        anyhow::bail!("play needs an interactive terminal; try `qcoin flip`");
    }

    let mut session = args.session(Handle::current())?;
    let mut keys = spawn_key_reader(term.clone())?;
    let _guard = TerminalGuard::new(&term)?;

    let mut frames = tokio::time::interval(Duration::from_secs(1) / fps);
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        frames.tick().await;

        loop {
            match keys.try_recv() {
                Ok(key) => match command_for(&key) {
                    Some(Command::Quit) => return Ok(()),
                    Some(command) => apply(&mut session, command),
                    None => {}
                },
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => return Ok(()),
            }
        }

        session.tick();
        draw(&term, &session)?;
    }
}

fn apply(session: &mut CoinFlipSession, command: Command) {
    match command {
        Command::Flip => {
            if !session.trigger_flip() {
                debug!("Flip ignored: run in flight or coins landing");
            }
        }
        Command::Select(selector) => {
            if let Err(e) = session.select_device(selector) {
                debug!("Device selection rejected: {e}");
            }
        }
        Command::Adjust(delta) => {
            if let Err(e) = session.adjust_coins(delta) {
                debug!("Coin adjustment rejected: {e}");
            }
        }
        Command::Quit => {}
    }
}

fn spawn_key_reader(term: Term) -> io::Result<UnboundedReceiver<Key>> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::Builder::new()
        .name("qcoin-keys".into())
        .spawn(move || {
            while let Ok(key) = term.read_key() {
                if tx.send(key).is_err() {
                    break;
                }
            }
        })?;
    Ok(rx)
}

/// Hides the cursor for the lifetime of the loop.
struct TerminalGuard<'a> {
    term: &'a Term,
}

impl<'a> TerminalGuard<'a> {
    fn new(term: &'a Term) -> io::Result<Self> {
        term.hide_cursor()?;
        term.clear_screen()?;
        Ok(Self { term })
    }
}

impl Drop for TerminalGuard<'_> {
    fn drop(&mut self) {
        let _ = self.term.show_cursor();
        let _ = self.term.write_line("");
    }
}

fn draw(term: &Term, session: &CoinFlipSession) -> io::Result<()> {
    term.move_cursor_to(0, 0)?;
    for line in render_lines(session) {
        term.clear_line()?;
        term.write_line(&line)?;
    }
    term.clear_to_end_of_screen()
}

fn render_lines(session: &CoinFlipSession) -> Vec<String> {
    let profile = session.profile();
    let mut lines = vec![
        format!(
            "{}  Device: {} ({})  Coins: {}",
            style("qcoin").cyan().bold(),
            style(profile.selector).yellow(),
            profile.backend_id,
            session.total_bits()
        ),
        String::new(),
    ];

    let states = session.render_states();
    for row in states.chunks(COINS_PER_ROW) {
        for height in (0..=LIFT_LINES).rev() {
            let cells: String = row
                .iter()
                .map(|state| {
                    if lift_lines(state) == height {
                        format!(" {} ", styled_glyph(state))
                    } else {
                        "     ".to_string()
                    }
                })
                .collect();
            lines.push(cells);
        }
        lines.push(String::new());
    }

    let message = match session.status() {
        RunStatus::Failed => style(session.status_message()).red().to_string(),
        RunStatus::Running => style(session.status_message()).yellow().to_string(),
        RunStatus::Idle | RunStatus::ResultReady => session.status_message().to_string(),
    };
    lines.push(message);
    lines.push(
        style("[space] flip  [1-4] device  [+/-] coins (Simulation)  [q] quit")
            .dim()
            .to_string(),
    );
    lines
}

/// How many text lines above its resting line a coin is drawn.
fn lift_lines(state: &RenderState) -> usize {
    match state.shape {
        CoinShape::Flat => 0,
        CoinShape::Tumbling { lift, .. } => {
            let lines = (lift / BOUNCE_AMPLITUDE * LIFT_LINES as f64).round();
            (lines.max(0.0) as usize).min(LIFT_LINES)
        }
    }
}

/// Three-character coin: face-on, tilted, or seen on edge.
fn glyph(state: &RenderState) -> String {
    let label = state.face.label();
    match state.shape {
        CoinShape::Flat => format!("({label})"),
        CoinShape::Tumbling { edge_scale, .. } if edge_scale >= 0.66 => format!("({label})"),
        CoinShape::Tumbling { edge_scale, .. } if edge_scale >= 0.33 => format!("[{label}]"),
        CoinShape::Tumbling { .. } => " | ".to_string(),
    }
}

fn styled_glyph(state: &RenderState) -> String {
    let glyph = style(glyph(state));
    let glyph = match state.face {
        Face::Heads => glyph.yellow(),
        Face::Tails => glyph.cyan(),
    };
    match state.shape {
        CoinShape::Flat => glyph.bold().to_string(),
        CoinShape::Tumbling { .. } => glyph.to_string(),
    }
}
