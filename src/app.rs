use std::cell::Cell;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::debug;

use crate::{
    controller::{PendingRequest, UploadController, View},
    error::UserError,
    quiz::QuestionCount,
    runtime::AppEvent,
    session::Phase,
};

/// What the event loop should do after an event was handled
#[derive(Debug)]
pub enum Command {
    Idle,
    Redraw,
    /// Hand this request to a worker
    Dispatch(PendingRequest),
    Quit,
}

/// The controller plus the bits of state only the terminal needs
#[derive(Debug)]
pub struct App {
    pub controller: UploadController,
    /// Path being typed on the upload screen
    pub path_input: String,
    /// Option under the cursor on the quiz screen
    pub highlighted: usize,
    pub recap_scroll: u16,
    /// Furthest the recap can scroll at the last drawn size, `None` until drawn
    pub recap_max_scroll: Cell<Option<u16>>,
    /// Popup shown until the next key press
    pub alert: Option<String>,
    pub spinner_frame: usize,
}

impl App {
    pub fn new(question_count: QuestionCount) -> Self {
        Self {
            controller: UploadController::new(question_count),
            path_input: String::new(),
            highlighted: 0,
            recap_scroll: 0,
            recap_max_scroll: Cell::new(None),
            alert: None,
            spinner_frame: 0,
        }
    }

    /// Select `path` as if it had been typed and confirmed
    pub fn preselect(&mut self, path: &str) {
        self.path_input = path.to_string();
        self.confirm_path();
    }

    pub fn handle(&mut self, event: AppEvent) -> Command {
        match event {
            AppEvent::Key(key) => self.on_key(key),
            AppEvent::Resize => Command::Redraw,
            AppEvent::Tick => {
                if self.controller.is_busy() {
                    self.spinner_frame = self.spinner_frame.wrapping_add(1);
                    Command::Redraw
                } else {
                    Command::Idle
                }
            }
            AppEvent::Service(completion) => {
                if self.controller.complete(completion) {
                    self.highlighted = 0;
                    self.reset_recap_scroll();
                }
                Command::Redraw
            }
        }
    }

    pub fn on_key(&mut self, key: KeyEvent) -> Command {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Command::Quit;
        }
        if self.alert.take().is_some() {
            return Command::Redraw;
        }

        match self.controller.view() {
            View::Uploading => self.on_upload_key(key),
            View::ShowingQuiz(_) => self.on_quiz_key(key),
            View::ShowingRecap(_) => self.on_recap_key(key),
        }
    }

    fn on_upload_key(&mut self, key: KeyEvent) -> Command {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => return Command::Quit,
            KeyCode::Char('g') if ctrl => {
                let count = self.controller.question_count();
                let request = self.controller.request_quiz(count);
                return self.start(request);
            }
            KeyCode::Char('r') if ctrl => {
                let request = self.controller.request_recap();
                return self.start(request);
            }
            KeyCode::Tab => self.cycle_count(QuestionCount::next),
            KeyCode::BackTab => self.cycle_count(QuestionCount::prev),
            _ if self.controller.is_busy() => return Command::Idle,
            KeyCode::Enter => self.confirm_path(),
            KeyCode::Backspace => {
                self.path_input.pop();
            }
            KeyCode::Char(c) if !ctrl => self.path_input.push(c),
            _ => return Command::Idle,
        }
        Command::Redraw
    }

    fn on_quiz_key(&mut self, key: KeyEvent) -> Command {
        match key.code {
            KeyCode::Esc => return Command::Quit,
            KeyCode::Char('u') => self.back_to_upload(),
            _ => {
                let Some(session) = self.controller.session_mut() else {
                    return Command::Idle;
                };
                let option_count = session.current_question().map_or(0, |q| q.options.len());

                match (session.phase().clone(), key.code) {
                    (Phase::Answering { .. }, KeyCode::Up | KeyCode::Char('k')) => {
                        self.highlighted = self.highlighted.saturating_sub(1);
                    }
                    (Phase::Answering { .. }, KeyCode::Down | KeyCode::Char('j')) => {
                        if self.highlighted + 1 < option_count {
                            self.highlighted += 1;
                        }
                    }
                    (Phase::Answering { .. }, KeyCode::Enter | KeyCode::Char(' ')) => {
                        session.select_index(self.highlighted);
                    }
                    (Phase::Answering { .. }, KeyCode::Char(c @ '1'..='9')) => {
                        let position = c as usize - '1' as usize;
                        if session.select_index(position) {
                            self.highlighted = position;
                        }
                    }
                    (Phase::Revealed { .. }, KeyCode::Enter | KeyCode::Char('n' | ' ')) => {
                        session.advance();
                        self.highlighted = 0;
                    }
                    (Phase::Complete, KeyCode::Enter) => self.back_to_upload(),
                    _ => return Command::Idle,
                }
            }
        }
        Command::Redraw
    }

    fn on_recap_key(&mut self, key: KeyEvent) -> Command {
        match key.code {
            KeyCode::Esc => return Command::Quit,
            KeyCode::Char('u' | 'b') | KeyCode::Backspace => self.back_to_upload(),
            KeyCode::Up | KeyCode::Char('k') => self.scroll_recap(-1),
            KeyCode::Down | KeyCode::Char('j') => self.scroll_recap(1),
            KeyCode::PageUp => self.scroll_recap(-10),
            KeyCode::PageDown => self.scroll_recap(10),
            KeyCode::Home => self.recap_scroll = 0,
            KeyCode::End => self.recap_scroll = self.recap_max_scroll.get().unwrap_or(0),
            _ => return Command::Idle,
        }
        Command::Redraw
    }

    fn start(&mut self, request: Result<PendingRequest, UserError>) -> Command {
        match request {
            Ok(request) => {
                self.spinner_frame = 0;
                Command::Dispatch(request)
            }
            // the triggers are inert while busy
            Err(UserError::Busy) => Command::Idle,
            Err(e) => {
                self.alert = Some(e.to_string());
                Command::Redraw
            }
        }
    }

    fn confirm_path(&mut self) {
        let path = self.path_input.trim();
        if path.is_empty() {
            return;
        }
        if let Err(e) = self.controller.select_file(path) {
            debug!("file rejected: {}", e);
            self.alert = Some(e.to_string());
        }
    }

    fn cycle_count(&mut self, step: fn(QuestionCount) -> QuestionCount) {
        let next = step(self.controller.question_count());
        // refused while a request is running, same as a disabled selector
        let _ = self.controller.set_question_count(next);
    }

    fn scroll_recap(&mut self, delta: i32) {
        let scroll = (i32::from(self.recap_scroll) + delta).clamp(0, i32::from(u16::MAX)) as u16;
        self.recap_scroll = match self.recap_max_scroll.get() {
            Some(limit) => scroll.min(limit),
            None => scroll,
        };
    }

    fn reset_recap_scroll(&mut self) {
        self.recap_scroll = 0;
        self.recap_max_scroll.set(None);
    }

    fn back_to_upload(&mut self) {
        self.controller.return_to_upload();
        self.path_input.clear();
        self.highlighted = 0;
        self.reset_recap_scroll();
    }
}
