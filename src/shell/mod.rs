//! Interactive terminal shell: pick a PDF, watch the spinner, read the result.
//!
//! ## Threading model
//!
//! One foreground loop owns the [`ShellState`] and the terminal. Everything
//! else talks to it through a single `mpsc` channel of [`UiMessage`]s:
//!
//! * the spinner [`Ticker`] posts `Tick` every 100 ms for the life of the
//!   shell;
//! * each job task posts `JobFinished` once;
//! * each return timer posts `ReturnToList` once.
//!
//! Background tasks never touch the state or the terminal directly, so all
//! screen changes happen on the loop's redraw path.

pub mod state;
pub mod view;

use crate::generate::QuizGenerator;
use crate::pipeline::llm::CompletionTransport;
use crossterm::cursor::{Hide, Show};
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use futures::StreamExt;
use state::{Effect, JobOutcome, Key, ShellState, UiMessage, SPINNER_INTERVAL};
use std::future::Future;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{error, info};

pub use state::Screen;

/// Repeating timer that posts [`UiMessage::Tick`]; stops when dropped.
#[derive(Debug)]
pub struct Ticker {
    handle: JoinHandle<()>,
}

impl Ticker {
    pub fn start(period: Duration, tx: UnboundedSender<UiMessage>) -> Self {
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                if tx.send(UiMessage::Tick).is_err() {
                    break;
                }
            }
        });
        Self { handle }
    }

    pub fn stop(&self) {
        self.handle.abort();
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Raw mode + alternate screen for the guard's lifetime.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen, Hide) {
            let _ = terminal::disable_raw_mode();
            return Err(e);
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), Show, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

/// Map a crossterm key event to a shell [`Key`].
pub fn map_key(event: KeyEvent) -> Option<Key> {
    if event.kind != KeyEventKind::Press {
        return None;
    }
    match event.code {
        KeyCode::Char('c') if event.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(Key::Interrupt)
        }
        KeyCode::Up => Some(Key::Up),
        KeyCode::Down => Some(Key::Down),
        KeyCode::Enter => Some(Key::Enter),
        KeyCode::Esc => Some(Key::Esc),
        KeyCode::Char(c) => Some(Key::Char(c)),
        _ => None,
    }
}

/// Run one job to completion and describe the result for the UI.
pub async fn run_job<T: CompletionTransport>(
    generator: &QuizGenerator<T>,
    pdf: &Path,
) -> JobOutcome {
    let result = generator.run(pdf).await;
    if let Err(ref e) = result {
        error!("Job for {} failed: {}", pdf.display(), e);
    }
    JobOutcome::from(result)
}

/// Run `job` on its own task and post its outcome. A panicking job is
/// reported as a failure so the loading screen always ends.
fn spawn_job<F>(job: F, tx: UnboundedSender<UiMessage>)
where
    F: Future<Output = JobOutcome> + Send + 'static,
{
    let handle = tokio::spawn(job);
    tokio::spawn(async move {
        let outcome = match handle.await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Job task failed: {}", e);
                JobOutcome::Failure(format!("job panicked: {e}"))
            }
        };
        let _ = tx.send(UiMessage::JobFinished(outcome));
    });
}

fn schedule_return(delay: Duration, tx: UnboundedSender<UiMessage>) {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        let _ = tx.send(UiMessage::ReturnToList);
    });
}

fn redraw(out: &mut impl Write, state: &ShellState) -> io::Result<()> {
    let size = terminal::size()?;
    view::draw(out, state, size)
}

/// Take over the terminal and run the shell until the user quits.
pub async fn run<T>(generator: Arc<QuizGenerator<T>>, pdfs: Vec<PathBuf>) -> io::Result<()>
where
    T: CompletionTransport + 'static,
{
    let _guard = TerminalGuard::enter()?;
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let _ticker = Ticker::start(SPINNER_INTERVAL, tx.clone());
    let mut events = EventStream::new();
    let mut state = ShellState::new(pdfs);
    let mut stdout = io::stdout();

    info!(
        "Shell started with {} PDFs from {} ({} questions per quiz, model {})",
        state.entries().len(),
        generator.workspace().pdfs().display(),
        generator.config().question_count,
        generator.config().model
    );
    redraw(&mut stdout, &state)?;

    loop {
        let effect = tokio::select! {
            event = events.next() => match event {
                Some(Ok(Event::Key(key))) => map_key(key).map_or(Effect::None, |k| state.handle_key(k)),
                Some(Ok(Event::Resize(..))) => Effect::Redraw,
                Some(Ok(_)) => Effect::None,
                Some(Err(e)) => return Err(e),
                None => Effect::Quit,
            },
            Some(msg) = rx.recv() => state.handle_message(msg),
        };

        match effect {
            Effect::None => continue,
            Effect::Quit => break,
            Effect::Redraw => {}
            Effect::StartJob(pdf) => {
                info!("Selected {}", pdf.display());
                let generator = Arc::clone(&generator);
                spawn_job(async move { run_job(&generator, &pdf).await }, tx.clone());
            }
            Effect::ScheduleReturn(delay) => schedule_return(delay, tx.clone()),
        }
        redraw(&mut stdout, &state)?;
    }

    info!("Shell exiting");
    Ok(())
}
