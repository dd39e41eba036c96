//! Screen state machine for the interactive shell.
//!
//! ```text
//!            select PDF                 job finished
//!   List ───────────────▶ Loading ─────────────────▶ Final
//!    ▲                                                 │
//!    └──────────── ReturnToList (after 2s / 3s) ───────┘
//! ```
//!
//! The state never performs I/O. Key presses and [`UiMessage`]s go in,
//! an [`Effect`] comes out, and the event loop carries it out (spawn the
//! job, schedule the return timer, redraw, quit).
//!
//! A new job can only start from the `List` screen with no job in flight.
//! The flag clears when the delayed return to `List` fires, so the result
//! screen can never be cut short by a second selection.

use crate::error::Pdf2QuizError;
use std::path::PathBuf;
use std::time::Duration;

/// Spinner animation frames, cycled every [`SPINNER_INTERVAL`].
pub const SPINNER_FRAMES: [&str; 4] = ["|", "/", "-", "\\"];

/// Period of the spinner ticker.
pub const SPINNER_INTERVAL: Duration = Duration::from_millis(100);

/// How long a success message stays up.
pub const SUCCESS_DELAY: Duration = Duration::from_secs(2);

/// How long an error message stays up.
pub const ERROR_DELAY: Duration = Duration::from_secs(3);

/// Caption under the spinner.
pub const LOADING_CAPTION: &str = "Generating...";

/// Result of one render-then-synthesize job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    /// Questions written to this file.
    Success(PathBuf),
    /// Human-readable failure description.
    Failure(String),
}

impl JobOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, JobOutcome::Success(_))
    }

    /// Text shown on the result screen.
    pub fn message(&self) -> String {
        match self {
            JobOutcome::Success(_) => "Process Finished!".to_string(),
            JobOutcome::Failure(msg) => msg.clone(),
        }
    }

    /// How long the result screen stays before returning to the list.
    pub fn return_delay(&self) -> Duration {
        if self.is_success() {
            SUCCESS_DELAY
        } else {
            ERROR_DELAY
        }
    }
}

impl From<Result<PathBuf, Pdf2QuizError>> for JobOutcome {
    fn from(result: Result<PathBuf, Pdf2QuizError>) -> Self {
        match result {
            Ok(path) => JobOutcome::Success(path),
            Err(e) => JobOutcome::Failure(e.to_string()),
        }
    }
}

/// Messages posted to the UI loop by background tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiMessage {
    /// Spinner ticker fired.
    Tick,
    /// The in-flight job completed.
    JobFinished(JobOutcome),
    /// Result-screen delay elapsed.
    ReturnToList,
}

/// Key presses the shell reacts to, independent of the terminal backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Enter,
    Esc,
    Char(char),
    /// Ctrl-C: quit from any screen.
    Interrupt,
}

/// What the event loop must do after a state transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// No visible change.
    None,
    Redraw,
    /// Spawn a job for this PDF, then redraw.
    StartJob(PathBuf),
    /// Post [`UiMessage::ReturnToList`] after the delay, then redraw.
    ScheduleReturn(Duration),
    Quit,
}

/// The three mutually exclusive screens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    List,
    Loading,
    Final(JobOutcome),
}

impl Screen {
    /// Title drawn in the screen's border.
    pub fn title(&self) -> &'static str {
        match self {
            Screen::List => "Select PDF File!",
            Screen::Loading => "Generating Questions!",
            Screen::Final(_) => "Operations Complete!",
        }
    }
}

/// One selectable PDF.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfEntry {
    pub path: PathBuf,
    /// File name shown in the list.
    pub label: String,
    /// `'1'`..`'9'` for the first nine entries.
    pub shortcut: Option<char>,
}

impl PdfEntry {
    fn new(index: usize, path: PathBuf) -> Self {
        let label = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        let shortcut = u32::try_from(index + 1)
            .ok()
            .filter(|n| *n <= 9)
            .and_then(|n| char::from_digit(n, 10));
        Self {
            path,
            label,
            shortcut,
        }
    }
}

/// Full UI state.
#[derive(Debug, Clone)]
pub struct ShellState {
    entries: Vec<PdfEntry>,
    selected: usize,
    screen: Screen,
    spinner_frame: usize,
    job_in_flight: bool,
}

impl ShellState {
    pub fn new(pdfs: Vec<PathBuf>) -> Self {
        let entries = pdfs
            .into_iter()
            .enumerate()
            .map(|(i, p)| PdfEntry::new(i, p))
            .collect();
        Self {
            entries,
            selected: 0,
            screen: Screen::List,
            spinner_frame: 0,
            job_in_flight: false,
        }
    }

    pub fn entries(&self) -> &[PdfEntry] {
        &self.entries
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn job_in_flight(&self) -> bool {
        self.job_in_flight
    }

    /// Current spinner text, e.g. `"/ Generating..."`.
    pub fn spinner_text(&self) -> String {
        format!("{} {}", SPINNER_FRAMES[self.spinner_frame], LOADING_CAPTION)
    }

    pub fn handle_key(&mut self, key: Key) -> Effect {
        if key == Key::Interrupt {
            return Effect::Quit;
        }
        if self.screen != Screen::List {
            return Effect::None;
        }

        match key {
            Key::Up | Key::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
                Effect::Redraw
            }
            Key::Down | Key::Char('j') => {
                if self.selected + 1 < self.entries.len() {
                    self.selected += 1;
                }
                Effect::Redraw
            }
            Key::Enter => self.select(self.selected),
            Key::Esc | Key::Char('q') => Effect::Quit,
            Key::Char(c) => match self.entries.iter().position(|e| e.shortcut == Some(c)) {
                Some(idx) => {
                    self.selected = idx;
                    self.select(idx)
                }
                None => Effect::None,
            },
            Key::Interrupt => Effect::Quit,
        }
    }

    pub fn handle_message(&mut self, msg: UiMessage) -> Effect {
        match msg {
            UiMessage::Tick => {
                self.spinner_frame = (self.spinner_frame + 1) % SPINNER_FRAMES.len();
                if self.screen == Screen::Loading {
                    Effect::Redraw
                } else {
                    Effect::None
                }
            }
            UiMessage::JobFinished(outcome) => {
                let delay = outcome.return_delay();
                self.screen = Screen::Final(outcome);
                Effect::ScheduleReturn(delay)
            }
            UiMessage::ReturnToList => {
                self.screen = Screen::List;
                self.job_in_flight = false;
                Effect::Redraw
            }
        }
    }

    fn select(&mut self, idx: usize) -> Effect {
        if self.job_in_flight {
            return Effect::None;
        }
        let Some(entry) = self.entries.get(idx) else {
            return Effect::None;
        };
        let path = entry.path.clone();
        self.job_in_flight = true;
        self.screen = Screen::Loading;
        Effect::StartJob(path)
    }
}
