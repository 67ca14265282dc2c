use std::time::Duration;

use reqwest::blocking::{
    multipart::{Form, Part},
    Client,
};
use serde_json::Value;
use tracing::{info, warn};

use crate::{
    controller::SelectedFile,
    error::ServiceError,
    quiz::{Question, QuestionCount, QuizPayload},
};

pub const UPLOAD_PATH: &str = "api/upload";
pub const RECAP_PATH: &str = "api/recap";

/// What the service answered, once the body decoded as JSON
#[derive(Debug, Clone, PartialEq)]
pub enum Reply<T> {
    Success(T),
    /// The body carried an explicit `error`
    Failed(String),
    /// Valid JSON, but not a shape we understand
    Unexpected,
}

/// The remote quiz/recap generator.
///
/// Calls block; callers run them off the event loop.
pub trait QuizService: Send + Sync + 'static {
    fn generate_quiz(
        &self,
        file: &SelectedFile,
        count: QuestionCount,
    ) -> Result<Reply<QuizPayload>, ServiceError>;

    fn recap(&self, file: &SelectedFile) -> Result<Reply<String>, ServiceError>;
}

#[derive(Debug, Clone)]
pub struct HttpQuizService {
    base_url: String,
    http: Client,
}

impl HttpQuizService {
    /// `timeout` of `None` waits for the service indefinitely
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, ServiceError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self { base_url, http })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn file_part(file: &SelectedFile) -> Result<Part, ServiceError> {
        let bytes = std::fs::read(&file.path).map_err(|source| ServiceError::Io {
            path: file.path.clone(),
            source,
        })?;

        Ok(Part::bytes(bytes)
            .file_name(file.name.clone())
            .mime_str("application/pdf")?)
    }

    fn post_form(&self, path: &str, form: Form) -> Result<Value, ServiceError> {
        let url = self.url(path);
        info!("POST {}", url);

        let response = self.http.post(&url).multipart(form).send()?;
        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            warn!("{} answered {}: {}", url, status, body);
        }

        // the service reports its own failures as JSON bodies, so read them
        // whatever the status code
        Ok(serde_json::from_str(&body)?)
    }
}

impl QuizService for HttpQuizService {
    fn generate_quiz(
        &self,
        file: &SelectedFile,
        count: QuestionCount,
    ) -> Result<Reply<QuizPayload>, ServiceError> {
        let form = Form::new()
            .part("file", Self::file_part(file)?)
            .text("num_questions", count.to_string());

        let body = self.post_form(UPLOAD_PATH, form)?;
        Ok(classify_quiz(body))
    }

    fn recap(&self, file: &SelectedFile) -> Result<Reply<String>, ServiceError> {
        let form = Form::new().part("file", Self::file_part(file)?);

        let body = self.post_form(RECAP_PATH, form)?;
        Ok(classify_recap(body))
    }
}

fn reported_error(body: &Value) -> Option<String> {
    match body.get("error")? {
        Value::Null | Value::Bool(false) => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Sort an `/api/upload` body into success, reported error, or nonsense
pub fn classify_quiz(body: Value) -> Reply<QuizPayload> {
    if let Some(message) = reported_error(&body) {
        return Reply::Failed(message);
    }

    let Some(questions) = body.get("questions").filter(|q| q.is_array()) else {
        return Reply::Unexpected;
    };

    match serde_json::from_value::<Vec<Question>>(questions.clone()) {
        Ok(questions) => match QuizPayload::new(questions) {
            Some(payload) => Reply::Success(payload),
            None => {
                warn!("quiz payload had no usable questions");
                Reply::Unexpected
            }
        },
        Err(e) => {
            warn!("could not decode questions: {}", e);
            Reply::Unexpected
        }
    }
}

/// Sort an `/api/recap` body into success, reported error, or nonsense
pub fn classify_recap(body: Value) -> Reply<String> {
    if let Some(message) = reported_error(&body) {
        return Reply::Failed(message);
    }

    match body.get("recap") {
        Some(Value::String(recap)) if !recap.is_empty() => Reply::Success(recap.clone()),
        _ => Reply::Unexpected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    fn question(options: &[&str]) -> Value {
        json!({
            "question": "What is it?",
            "options": options,
            "answer": options[0],
            "difficulty": "Medium"
        })
    }

    #[test]
    fn well_formed_quiz_is_success() {
        let body = json!({ "questions": vec![question(&["a", "b", "c", "d"]); 5] });
        assert_matches!(classify_quiz(body), Reply::Success(p) if p.len() == 5);
    }

    #[test]
    fn error_field_wins() {
        let body = json!({ "error": "file too large" });
        assert_eq!(classify_quiz(body), Reply::Failed("file too large".into()));

        let body = json!({ "error": "boom", "questions": [question(&["a", "b"])] });
        assert_eq!(classify_quiz(body), Reply::Failed("boom".into()));
    }

    #[test]
    fn falsy_error_is_ignored() {
        let body = json!({ "error": "", "recap": "all good" });
        assert_eq!(classify_recap(body), Reply::Success("all good".into()));

        let body = json!({ "error": null, "questions": [question(&["a", "b"])] });
        assert_matches!(classify_quiz(body), Reply::Success(_));

        let body = json!({ "error": 0, "recap": "still fine" });
        assert_eq!(classify_recap(body), Reply::Success("still fine".into()));

        let body = json!({ "error": 0.0, "questions": [question(&["a", "b"])] });
        assert_matches!(classify_quiz(body), Reply::Success(_));
    }

    #[test]
    fn non_string_error_is_reported_as_json() {
        let body = json!({ "error": { "code": 7 } });
        assert_eq!(classify_recap(body), Reply::Failed(r#"{"code":7}"#.into()));

        let body = json!({ "error": 503 });
        assert_eq!(classify_recap(body), Reply::Failed("503".into()));
    }

    #[test]
    fn unknown_shape_is_unexpected() {
        assert_eq!(classify_quiz(json!({ "foo": "bar" })), Reply::Unexpected);
        assert_eq!(classify_quiz(json!(["questions"])), Reply::Unexpected);
        assert_eq!(classify_quiz(json!({ "questions": "many" })), Reply::Unexpected);
        assert_eq!(classify_recap(json!({ "foo": "bar" })), Reply::Unexpected);
        assert_eq!(classify_recap(json!({ "recap": 42 })), Reply::Unexpected);
    }

    #[test]
    fn zero_questions_is_unexpected() {
        assert_eq!(classify_quiz(json!({ "questions": [] })), Reply::Unexpected);
    }

    #[test]
    fn undecodable_or_one_option_questions_are_unexpected() {
        let body = json!({ "questions": [{ "question": "no options" }] });
        assert_eq!(classify_quiz(body), Reply::Unexpected);

        let body = json!({ "questions": [question(&["only"])] });
        assert_eq!(classify_quiz(body), Reply::Unexpected);
    }

    #[test]
    fn url_joins_without_double_slash() {
        let svc = HttpQuizService::new("http://localhost:5000/", None).unwrap();
        assert_eq!(svc.url(UPLOAD_PATH), "http://localhost:5000/api/upload");
        assert_eq!(svc.url(RECAP_PATH), "http://localhost:5000/api/recap");
    }

    #[test]
    fn missing_file_is_io_error() {
        let svc = HttpQuizService::new("http://127.0.0.1:9", None).unwrap();
        let file = SelectedFile {
            path: "/definitely/not/here.pdf".into(),
            name: "here.pdf".into(),
        };
        assert_matches!(svc.recap(&file), Err(ServiceError::Io { .. }));
    }

    #[test]
    fn refused_connection_is_http_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.pdf");
        std::fs::write(&path, b"%PDF-1.4 test").unwrap();
        let file = SelectedFile {
            path,
            name: "notes.pdf".into(),
        };

        // grab a free port, then close it so nothing is listening
        let addr = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap();
        let svc = HttpQuizService::new(format!("http://{addr}"), Some(Duration::from_secs(5)))
            .unwrap();

        assert_matches!(
            svc.generate_quiz(&file, QuestionCount::Five),
            Err(ServiceError::Http(_))
        );
    }

    /// Whether `raw` holds a whole HTTP request, headers and body
    fn request_complete(raw: &[u8]) -> bool {
        let Some(split) = raw.windows(4).position(|w| w == b"\r\n\r\n") else {
            return false;
        };
        let head = String::from_utf8_lossy(&raw[..split]).to_ascii_lowercase();
        let body = &raw[split + 4..];
        match head.lines().find_map(|l| l.strip_prefix("content-length:")) {
            Some(len) => body.len() >= len.trim().parse::<usize>().unwrap(),
            None => body.ends_with(b"0\r\n\r\n"),
        }
    }

    /// Answer a single request with `status` and `body`, handing back what was sent
    fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            while !request_complete(&request) {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }

            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).unwrap();
            String::from_utf8_lossy(&request).into_owned()
        });

        (format!("http://{addr}"), handle)
    }

    fn notes_pdf(dir: &tempfile::TempDir) -> SelectedFile {
        let path = dir.path().join("notes.pdf");
        std::fs::write(&path, b"%PDF-1.4 test").unwrap();
        SelectedFile {
            path,
            name: "notes.pdf".into(),
        }
    }

    #[test]
    fn upload_posts_file_and_count_and_reads_error_body_of_4xx() {
        let dir = tempfile::tempdir().unwrap();
        let file = notes_pdf(&dir);
        let (base, server) = serve_once("413 Payload Too Large", r#"{"error":"file too large"}"#);

        let svc = HttpQuizService::new(base, Some(Duration::from_secs(5))).unwrap();
        let reply = svc.generate_quiz(&file, QuestionCount::Ten).unwrap();
        assert_eq!(reply, Reply::Failed("file too large".into()));

        let request = server.join().unwrap();
        assert!(request.starts_with("POST /api/upload HTTP/1.1\r\n"));
        assert!(request.contains("multipart/form-data; boundary="));
        assert!(request.contains(r#"name="file"; filename="notes.pdf""#));
        assert!(request.contains("application/pdf"));
        assert!(request.contains("%PDF-1.4 test"));
        assert!(request.contains("name=\"num_questions\"\r\n\r\n10\r\n"));
    }

    #[test]
    fn recap_posts_only_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = notes_pdf(&dir);
        let (base, server) = serve_once("200 OK", r#"{"recap":"Cells divide."}"#);

        let svc = HttpQuizService::new(format!("{base}/"), Some(Duration::from_secs(5))).unwrap();
        assert_eq!(svc.recap(&file).unwrap(), Reply::Success("Cells divide.".into()));

        let request = server.join().unwrap();
        assert!(request.starts_with("POST /api/recap HTTP/1.1\r\n"));
        assert!(request.contains(r#"name="file"; filename="notes.pdf""#));
        assert!(!request.contains("num_questions"));
    }

    #[test]
    fn non_json_body_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = notes_pdf(&dir);
        let (base, server) = serve_once("502 Bad Gateway", "<html>bad gateway</html>");

        let svc = HttpQuizService::new(base, Some(Duration::from_secs(5))).unwrap();
        assert_matches!(svc.recap(&file), Err(ServiceError::Decode(_)));
        server.join().unwrap();
    }
}
