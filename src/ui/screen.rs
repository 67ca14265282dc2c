use ratatui::Frame;

use crate::{
    app::App,
    controller::View,
    ui::{render_quiz, render_recap, render_upload},
};

/// A UI Screen boundary: responsible for rendering one view
pub trait Screen {
    fn render(&self, app: &App, f: &mut Frame);
}

/// Upload form: path entry, question count, triggers and status
pub struct UploadScreen;

impl Screen for UploadScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        render_upload(app, f);
    }
}

pub struct QuizScreen;

impl Screen for QuizScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        if let Some(session) = app.controller.session() {
            render_quiz(app, session, f);
        }
    }
}

pub struct RecapScreen;

impl Screen for RecapScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        if let Some(recap) = app.controller.recap() {
            render_recap(app, recap, f);
        }
    }
}

/// Helper to construct the appropriate screen for the current view
pub fn current_screen(view: &View) -> Box<dyn Screen> {
    match view {
        View::Uploading => Box::new(UploadScreen),
        View::ShowingQuiz(_) => Box::new(QuizScreen),
        View::ShowingRecap(_) => Box::new(RecapScreen),
    }
}
