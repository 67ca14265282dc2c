use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::{
    client::{QuizService, Reply},
    error::{ServiceError, UserError},
    quiz::{QuestionCount, QuizPayload},
    session::QuizSession,
};

pub const UNEXPECTED_STATUS: &str = "Received an unexpected response from server.";
pub const FAILURE_STATUS: &str = "Upload failed. See the log for details.";

/// A PDF the user picked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub name: String,
}

impl SelectedFile {
    /// Accept `path` if it names an existing regular file ending in `.pdf`
    pub fn open(path: impl AsRef<Path>) -> Result<Self, UserError> {
        let path = path.as_ref();
        let is_pdf = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
        if !is_pdf {
            return Err(UserError::NotPdf(path.to_path_buf()));
        }
        if !path.is_file() {
            return Err(UserError::Unreadable(path.to_path_buf()));
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "notes.pdf".to_string());

        Ok(Self {
            path: path.to_path_buf(),
            name,
        })
    }
}

/// The request currently in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Operation {
    Generating,
    Recapping,
}

/// Identifies one request from start to completion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Job {
    Quiz(QuestionCount),
    Recap,
}

/// Everything a worker needs to perform a started request
#[derive(Debug, Clone)]
pub struct PendingRequest {
    pub ticket: Ticket,
    pub file: SelectedFile,
    pub job: Job,
}

impl PendingRequest {
    /// Call the service and package whatever happened
    pub fn run<S: QuizService + ?Sized>(&self, service: &S) -> Completion {
        let outcome = match self.job {
            Job::Quiz(count) => service.generate_quiz(&self.file, count).map(Outcome::Quiz),
            Job::Recap => service.recap(&self.file).map(Outcome::Recap),
        };

        Completion {
            ticket: self.ticket,
            outcome: outcome.unwrap_or_else(Outcome::Failed),
        }
    }
}

#[derive(Debug)]
pub enum Outcome {
    Quiz(Reply<QuizPayload>),
    Recap(Reply<String>),
    Failed(ServiceError),
}

/// The result of a request, handed back to the controller
#[derive(Debug)]
pub struct Completion {
    pub ticket: Ticket,
    pub outcome: Outcome,
}

/// What the user is looking at. Quiz and recap never coexist.
#[derive(Debug, Clone)]
pub enum View {
    Uploading,
    ShowingQuiz(QuizSession),
    ShowingRecap(String),
}

#[derive(Debug, Clone, Default)]
pub struct UploadState {
    pub selected_file: Option<SelectedFile>,
    pub status: String,
    pub question_count: QuestionCount,
    pending: Option<(Operation, Ticket)>,
}

/// Drives file selection, service requests and which view is shown
#[derive(Debug)]
pub struct UploadController {
    state: UploadState,
    view: View,
    next_ticket: u64,
}

impl UploadController {
    pub fn new(question_count: QuestionCount) -> Self {
        Self {
            state: UploadState {
                question_count,
                ..UploadState::default()
            },
            view: View::Uploading,
            next_ticket: 0,
        }
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn session(&self) -> Option<&QuizSession> {
        match &self.view {
            View::ShowingQuiz(session) => Some(session),
            _ => None,
        }
    }

    pub fn session_mut(&mut self) -> Option<&mut QuizSession> {
        match &mut self.view {
            View::ShowingQuiz(session) => Some(session),
            _ => None,
        }
    }

    pub fn recap(&self) -> Option<&str> {
        match &self.view {
            View::ShowingRecap(text) => Some(text),
            _ => None,
        }
    }

    pub fn state(&self) -> &UploadState {
        &self.state
    }

    pub fn status(&self) -> &str {
        &self.state.status
    }

    pub fn selected_file(&self) -> Option<&SelectedFile> {
        self.state.selected_file.as_ref()
    }

    pub fn question_count(&self) -> QuestionCount {
        self.state.question_count
    }

    pub fn pending(&self) -> Option<Operation> {
        self.state.pending.map(|(op, _)| op)
    }

    pub fn is_busy(&self) -> bool {
        self.state.pending.is_some()
    }

    /// Whether the generate/recap triggers are usable right now
    pub fn can_request(&self) -> bool {
        !self.is_busy() && self.state.selected_file.is_some()
    }

    /// Pick a new file, throwing away any previous quiz, recap and status
    pub fn select_file(&mut self, path: impl AsRef<Path>) -> Result<(), UserError> {
        if self.is_busy() {
            return Err(UserError::Busy);
        }
        let file = SelectedFile::open(path)?;

        info!("selected {}", file.path.display());
        self.state.selected_file = Some(file);
        self.state.status.clear();
        self.view = View::Uploading;
        Ok(())
    }

    pub fn set_question_count(&mut self, count: QuestionCount) -> Result<(), UserError> {
        if self.is_busy() {
            return Err(UserError::Busy);
        }
        self.state.question_count = count;
        Ok(())
    }

    pub fn request_quiz(&mut self, count: QuestionCount) -> Result<PendingRequest, UserError> {
        let request = self.begin(Operation::Generating, Job::Quiz(count))?;
        self.state.question_count = count;
        self.state.status = format!("Uploading and generating {count}-question quiz...");
        Ok(request)
    }

    pub fn request_recap(&mut self) -> Result<PendingRequest, UserError> {
        let request = self.begin(Operation::Recapping, Job::Recap)?;
        self.state.status = "Uploading and generating recap...".to_string();
        Ok(request)
    }

    fn begin(&mut self, op: Operation, job: Job) -> Result<PendingRequest, UserError> {
        let Some(file) = self.state.selected_file.clone() else {
            return Err(UserError::NoFileSelected);
        };
        if self.is_busy() {
            return Err(UserError::Busy);
        }

        self.next_ticket += 1;
        let ticket = Ticket(self.next_ticket);
        self.state.pending = Some((op, ticket));
        self.view = View::Uploading;

        info!("{} {} ({:?})", op, file.name, job);
        Ok(PendingRequest { ticket, file, job })
    }

    /// Apply the result of the in-flight request.
    ///
    /// The pending flag is released before the outcome is looked at, so every
    /// path leaves the controls usable. Returns `false` for a completion that
    /// does not belong to the in-flight request.
    pub fn complete(&mut self, completion: Completion) -> bool {
        let Some((op, ticket)) = self.state.pending else {
            warn!("completion {:?} arrived with nothing pending", completion.ticket);
            return false;
        };
        if ticket != completion.ticket {
            warn!(
                "completion {:?} does not match in-flight {:?}",
                completion.ticket, ticket
            );
            return false;
        }
        self.state.pending = None;

        match completion.outcome {
            Outcome::Quiz(Reply::Success(payload)) => {
                info!("quiz ready with {} questions", payload.len());
                self.state.status.clear();
                self.view = View::ShowingQuiz(QuizSession::new(payload));
            }
            Outcome::Recap(Reply::Success(text)) => {
                info!("recap ready ({} bytes)", text.len());
                self.state.status.clear();
                self.view = View::ShowingRecap(text);
            }
            Outcome::Quiz(Reply::Failed(message)) | Outcome::Recap(Reply::Failed(message)) => {
                warn!("{} rejected by service: {}", op, message);
                self.state.status = format!("Error: {message}");
            }
            Outcome::Quiz(Reply::Unexpected) | Outcome::Recap(Reply::Unexpected) => {
                warn!("{} got an unexpected response", op);
                self.state.status = UNEXPECTED_STATUS.to_string();
            }
            Outcome::Failed(err) => {
                error!("{} failed: {:?}", op, err);
                self.state.status = FAILURE_STATUS.to_string();
            }
        }
        true
    }

    /// Leave the quiz or recap and start over with no file chosen
    pub fn return_to_upload(&mut self) {
        self.view = View::Uploading;
        self.state.selected_file = None;
    }
}
