mod display;

use std::collections::HashMap;
use std::fs::File;
use std::io::{stdout, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, KeyboardEnhancementFlags, MouseEvent, MouseEventKind,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal, ExecutableCommand,
};
use log::{info, warn, LevelFilter};
use rand::rngs::StdRng;
use rand::SeedableRng;

use gap_runner::compute::{start_run, tick};
use gap_runner::config::GameConfig;
use gap_runner::entities::{GameState, InputState};
use gap_runner::events::GameEvent;

#[derive(Parser, Debug)]
#[command(about = "Fly through the gaps; touch a pipe and the run is over", version)]
struct Args {
    /// TOML file overriding the default tuning.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Seed for the gap generator (random if omitted).
    #[arg(long)]
    seed: Option<u64>,
    /// Write logs here; logging is off otherwise since the game owns the terminal.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

// ── Held-input tracking ───────────────────────────────────────────────────────

/// A key is considered "held" if its last press/repeat event arrived within
/// this many frames.  Covers terminals that don't emit key-release events:
/// the OS key-repeat rate is ≥ 15 Hz, so a window of 4 frames (≈133 ms) is
/// always refreshed before expiry once repeats are flowing.
const HOLD_WINDOW: u64 = 4;

/// Window used until the first auto-repeat arrives.  The OS waits roughly
/// 250-500 ms before it starts repeating, so 18 frames (≈600 ms) bridges that
/// delay.  On such terminals a second tap inside this window reads as the
/// same hold and does not flap again.
const FIRST_HOLD_WINDOW: u64 = 18;

const FLAP_KEYS: [KeyCode; 4] = [
    KeyCode::Char(' '),
    KeyCode::Up,
    KeyCode::Char('w'),
    KeyCode::Char('W'),
];

/// Frames of the first and latest event of one continuous hold.
#[derive(Clone, Copy, Debug)]
struct KeyHold {
    first: u64,
    last: u64,
}

fn is_held(holds: &HashMap<KeyCode, KeyHold>, key: &KeyCode, frame: u64) -> bool {
    holds.get(key).is_some_and(|hold| {
        let window = if hold.last == hold.first {
            FIRST_HOLD_WINDOW
        } else {
            HOLD_WINDOW
        };
        frame.saturating_sub(hold.last) <= window
    })
}

/// Record a press or repeat of `key`, starting a new hold if the old one
/// lapsed.
fn note_key(holds: &mut HashMap<KeyCode, KeyHold>, key: KeyCode, frame: u64) {
    if is_held(holds, &key, frame) {
        if let Some(hold) = holds.get_mut(&key) {
            hold.last = frame;
        }
    } else {
        holds.insert(
            key,
            KeyHold {
                first: frame,
                last: frame,
            },
        );
    }
}

// ── Menu ──────────────────────────────────────────────────────────────────────

enum MenuResult {
    Start,
    Quit,
}

fn show_menu<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    last: Option<u32>,
    best: u32,
) -> std::io::Result<MenuResult> {
    display::render_menu(out, last, best)?;

    // Block until the user makes a choice
    loop {
        match rx.recv() {
            Ok(Event::Key(KeyEvent {
                code,
                kind: KeyEventKind::Press,
                ..
            })) => match code {
                KeyCode::Char(' ') | KeyCode::Enter => return Ok(MenuResult::Start),
                KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                    return Ok(MenuResult::Quit);
                }
                _ => {}
            },
            Ok(Event::Mouse(MouseEvent {
                kind: MouseEventKind::Down(_),
                ..
            })) => return Ok(MenuResult::Start),
            Ok(Event::Resize(..)) => display::render_menu(out, last, best)?,
            Ok(_) => {}
            Err(_) => return Ok(MenuResult::Quit),
        }
    }
}

// ── Game loop ─────────────────────────────────────────────────────────────────

enum RunExit {
    Menu,
    Quit,
}

/// Drive one run until the player goes back to the menu or quits.
///
/// Keyboard input uses the hold window above; the mouse reports explicit
/// down/up events so the pointer state is tracked directly.  The simulation
/// receives real elapsed time each frame, which keeps the row cadence on the
/// wall clock even when frames run late.
fn game_loop<W: Write>(
    out: &mut W,
    state: &mut GameState,
    rx: &mpsc::Receiver<Event>,
    rng: &mut StdRng,
) -> std::io::Result<RunExit> {
    let frame_budget = state.config.frame_duration();
    let mut holds: HashMap<KeyCode, KeyHold> = HashMap::new();
    let mut pointer_held = false;
    let mut frame: u64 = 0;
    let mut last_tick = Instant::now();

    loop {
        let frame_start = Instant::now();
        frame += 1;

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(ev) = rx.try_recv() {
            match ev {
                Event::Key(KeyEvent {
                    code,
                    kind,
                    modifiers,
                    ..
                }) => match kind {
                    KeyEventKind::Press => {
                        note_key(&mut holds, code, frame);
                        match code {
                            KeyCode::Char('q') | KeyCode::Char('Q') => return Ok(RunExit::Quit),
                            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                                return Ok(RunExit::Quit);
                            }
                            KeyCode::Esc | KeyCode::Backspace => {
                                info!("run abandoned with score {}", state.score);
                                return Ok(RunExit::Menu);
                            }
                            _ => {}
                        }
                    }
                    KeyEventKind::Repeat => note_key(&mut holds, code, frame),
                    KeyEventKind::Release => {
                        holds.remove(&code);
                    }
                },
                Event::Mouse(MouseEvent { kind, .. }) => match kind {
                    MouseEventKind::Down(_) | MouseEventKind::Drag(_) => pointer_held = true,
                    MouseEventKind::Up(_) => pointer_held = false,
                    _ => {}
                },
                _ => {}
            }
        }

        let input = InputState {
            key_held: FLAP_KEYS.iter().any(|k| is_held(&holds, k, frame)),
            pointer_held,
        };

        let now = Instant::now();
        let events = tick(state, input, now - last_tick, rng);
        last_tick = now;

        let mut leave = false;
        for ev in &events {
            match ev {
                GameEvent::Collided | GameEvent::Died(_) => {
                    // Terminal bell stands in for the collision sound.
                    out.write_all(b"\x07")?;
                }
                GameEvent::ReturnToMenu => leave = true,
                _ => {}
            }
        }

        display::render(out, state)?;
        if leave {
            return Ok(RunExit::Menu);
        }

        let elapsed = frame_start.elapsed();
        if elapsed < frame_budget {
            std::thread::sleep(frame_budget - elapsed);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn init_logging(log_file: Option<&Path>) -> anyhow::Result<()> {
    let mut builder = env_logger::Builder::new();
    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("creating log file {}", path.display()))?;
            builder
                .filter_level(LevelFilter::Info)
                .parse_default_env()
                .target(env_logger::Target::Pipe(Box::new(file)));
        }
        None => {
            builder.filter_level(LevelFilter::Off);
        }
    }
    builder.init();
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref())?;

    let config = match &args.config {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => GameConfig::default(),
    };
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;
    out.execute(EnableMouseCapture)?;

    // Request key-release (and key-repeat) events from the terminal.
    // Ghostty / kitty-protocol terminals support this; others fall back gracefully.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Dedicate a thread exclusively to blocking event reads, sending them
    // through a channel so the game loop never has to block on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || loop {
        match event::read() {
            Ok(ev) => {
                if tx.send(ev).is_err() {
                    break; // receiver dropped → program exiting
                }
            }
            Err(_) => break,
        }
    });

    let result = run(&mut out, &rx, config, &mut rng);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(DisableMouseCapture);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    result.context("terminal I/O failed")
}

fn run<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    config: GameConfig,
    rng: &mut StdRng,
) -> std::io::Result<()> {
    let mut last: Option<u32> = None;
    let mut best: u32 = 0;

    loop {
        match show_menu(out, rx, last, best)? {
            MenuResult::Quit => break,
            MenuResult::Start => {
                let (cols, rows) = terminal::size()?;
                let viewport = display::viewport_for(cols, rows);
                if viewport.height < 7.0 {
                    warn!("terminal only {rows} rows tall; slots will be under one row");
                }
                let mut state = start_run(config.clone(), viewport, rng);
                let exit = game_loop(out, &mut state, rx, rng)?;

                last = Some(state.score);
                best = best.max(state.score);

                if let RunExit::Quit = exit {
                    break;
                }
            }
        }
    }
    Ok(())
}
