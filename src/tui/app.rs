//! Application state and main loop

use std::sync::Arc;
use std::time::{Duration, Instant};

use color_eyre::Result;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use ratatui::Frame;
use tokio::sync::mpsc;
use tracing::{debug, info};

use super::terminal::{self, Tui};
use super::ui;
use crate::canvas::{Point, Surface};
use crate::client::{Prediction, Predictor};
use crate::errors;
use crate::session::{Session, SessionState};

/// Events from async tasks
#[derive(Debug)]
pub enum AsyncEvent {
    PredictionDone {
        revision: u64,
        result: errors::Result<Prediction>,
    },
}

/// Main TUI application state
pub struct App {
    /// Should the app exit?
    pub should_quit: bool,
    pub session: Session,
    /// Where predictions are sent, shown in the header
    pub endpoint: String,
    /// Screen rectangle of the grid from the last render, in terminal cells
    pub surface: Option<Surface>,
    /// One-line feedback for actions without a session state (copy, refused keys)
    pub notice: Option<String>,

    /// Last tick time (for animations)
    pub last_tick: Instant,
    /// Spinner frame index
    pub spinner_frame: usize,
    /// Window title last written to the terminal
    title: String,

    predictor: Arc<dyn Predictor>,
    async_tx: mpsc::UnboundedSender<AsyncEvent>,
    async_rx: mpsc::UnboundedReceiver<AsyncEvent>,
}

impl App {
    /// Tick rate for animations (16ms = ~60fps)
    const TICK_RATE: Duration = Duration::from_millis(16);

    /// Spinner characters
    const SPINNER: &'static [&'static str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

    pub fn new(predictor: Arc<dyn Predictor>, endpoint: impl Into<String>) -> Self {
        let (async_tx, async_rx) = mpsc::unbounded_channel();
        Self {
            should_quit: false,
            session: Session::new(),
            endpoint: endpoint.into(),
            surface: None,
            notice: None,

            last_tick: Instant::now(),
            spinner_frame: 0,
            title: String::new(),

            predictor,
            async_tx,
            async_rx,
        }
    }

    /// Run the main event loop
    pub fn run(&mut self, terminal: &mut Tui) -> Result<()> {
        while !self.should_quit {
            self.process_async_events();
            self.sync_title();

            terminal.draw(|frame| self.draw(frame))?;

            let timeout = Self::TICK_RATE.saturating_sub(self.last_tick.elapsed());
            if event::poll(timeout)? {
                self.handle_event(event::read()?);
            }

            if self.last_tick.elapsed() >= Self::TICK_RATE {
                self.on_tick();
                self.last_tick = Instant::now();
            }
        }

        Ok(())
    }

    /// Apply finished predictions
    pub fn process_async_events(&mut self) {
        while let Ok(event) = self.async_rx.try_recv() {
            match event {
                AsyncEvent::PredictionDone { revision, result } => {
                    self.session.finish_prediction(revision, result);
                }
            }
        }
    }

    /// Window title for the current session state
    pub fn window_title(&self) -> String {
        match (self.session.state(), self.session.prediction()) {
            (SessionState::Predicting, _) => "MNIST Canvas - predicting".to_string(),
            (SessionState::Predicted, Some(prediction)) => format!(
                "MNIST Canvas - {} ({}%)",
                prediction.predicted_digit,
                prediction.confidence_percent()
            ),
            (SessionState::PredictionFailed, _) => "MNIST Canvas - prediction failed".to_string(),
            _ => "MNIST Canvas".to_string(),
        }
    }

    /// Write the title only when it changed
    fn sync_title(&mut self) {
        let title = self.window_title();
        if title != self.title {
            terminal::set_title(&title);
            self.title = title;
        }
    }

    fn draw(&mut self, frame: &mut Frame) {
        ui::render(frame, self);
    }

    /// Dispatch one terminal event
    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            // Touch-cancel equivalents: the pointer can no longer be tracked
            Event::FocusLost | Event::Resize(_, _) => self.session.end_gesture(),
            _ => {}
        }
    }

    /// Terminal cell under the mouse, as a point at that cell's center
    fn mouse_point(mouse: &MouseEvent) -> Point {
        Point::new(
            f64::from(mouse.column) + 0.5,
            f64::from(mouse.row) + 0.5,
        )
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        let point = Self::mouse_point(&mouse);

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(surface) = self.surface {
                    self.session.begin_gesture(&surface, point);
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => match self.surface {
                Some(surface) => {
                    self.session.move_gesture(&surface, point);
                }
                None => self.session.end_gesture(),
            },
            // A plain move is only reported with no button held, so any
            // gesture still open missed its release
            MouseEventKind::Up(_) | MouseEventKind::Moved => self.session.end_gesture(),
            _ => {}
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            if key.code == KeyCode::Char('c') {
                self.should_quit = true;
            }
            return;
        }

        self.notice = None;
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('c') => {
                debug!("Clearing grid");
                self.session.clear();
            }
            KeyCode::Char('e') => {
                // Failures are kept on the session and rendered from there
                let _ = self.session.extract();
            }
            KeyCode::Char('p') | KeyCode::Enter => self.start_prediction(),
            KeyCode::Char('y') => self.copy_pixels(),
            _ => {}
        }
    }

    /// Submit the extracted vector on a background task
    fn start_prediction(&mut self) {
        if self.session.is_pending() {
            self.notice = Some("Prediction already in progress".to_string());
            return;
        }

        let Ok(submission) = self.session.begin_prediction() else {
            return;
        };

        info!("Submitting pixel vector (revision {})", submission.revision);
        let predictor = Arc::clone(&self.predictor);
        let tx = self.async_tx.clone();
        tokio::spawn(async move {
            let result = predictor.predict(&submission.pixels).await;
            let _ = tx.send(AsyncEvent::PredictionDone {
                revision: submission.revision,
                result,
            });
        });
    }

    /// Copy the extracted vector as a JSON array
    fn copy_pixels(&mut self) {
        let Some(pixels) = self.session.pixels() else {
            self.notice = Some("Nothing extracted to copy".to_string());
            return;
        };

        let json = match serde_json::to_string(pixels) {
            Ok(json) => json,
            Err(e) => {
                self.notice = Some(format!("Copy failed: {e}"));
                return;
            }
        };

        let copied = arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(json));
        self.notice = Some(match copied {
            Ok(()) => format!("Copied {} values to clipboard", pixels.len()),
            Err(e) => format!("Clipboard unavailable: {e}"),
        });
    }

    fn on_tick(&mut self) {
        if self.session.is_pending() {
            self.spinner_frame = (self.spinner_frame + 1) % Self::SPINNER.len();
        }
    }

    pub fn spinner_char(&self) -> &'static str {
        Self::SPINNER[self.spinner_frame]
    }
}
