use super::*;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
};
use serde_json::{json, Value};
use studyhub_common::{
    config::AppConfig,
    db::MemoryStore,
    llm::ScriptedModel,
    storage::{LocalBlobStore, MemoryBlobStore},
};
use tower::ServiceExt;

const BOUNDARY: &str = "studyhub-test-boundary";
const FILES_BASE: &str = "http://localhost:8080/files";

struct TestApp {
    router: Router,
    store: Arc<MemoryStore>,
    blobs: Arc<MemoryBlobStore>,
    model: Arc<ScriptedModel>,
}

fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.storage.backend = "memory".to_string();
    config.rate_limit.enabled = false;
    config
}

fn test_content() -> ContentCatalog {
    serde_json::from_value(json!({
        "syllabus": [{
            "id": "physics-1",
            "name": "Engineering Physics",
            "code": "PH101",
            "description": "Mechanics and optics.",
            "modules": []
        }],
        "quizzes": [{
            "subjectId": "physics-1",
            "subjectName": "Engineering Physics",
            "questions": [
                {
                    "question": "Unit of force?",
                    "options": ["Newton", "Joule"],
                    "correctAnswer": "Newton"
                },
                {
                    "question": "Unit of energy?",
                    "options": ["Newton", "Joule"],
                    "correctAnswer": "Joule"
                }
            ]
        }],
        "resources": [],
        "faqs": [
            {"subject": "Engineering Physics", "questions": ["Explain wave-particle duality."]},
            {"subject": "Basic Electrical Engineering", "questions": ["State Kirchhoff's laws."]}
        ],
        "chapterNotes": [{
            "subject": "Basic Electrical Engineering",
            "chapters": [{"title": "AC circuit", "link": "https://example.org/ac"}]
        }]
    }))
    .unwrap()
}

fn app_with(config: AppConfig, model: ScriptedModel) -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let blobs = Arc::new(MemoryBlobStore::new(FILES_BASE));
    let model = Arc::new(model);
    let content = test_content();

    let state = AppState::from_parts(config, store.clone(), blobs.clone(), model.clone(), content);
    TestApp {
        router: create_router(state),
        store,
        blobs,
        model,
    }
}

fn app(model: ScriptedModel) -> TestApp {
    app_with(test_config(), model)
}

enum Part<'a> {
    Text(&'a str, &'a str),
    File(&'a str, &'a str, &'a str, &'a [u8]),
}

fn multipart(uri: &str, parts: &[Part]) -> Request<Body> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File(name, file_name, content_type, bytes) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                        name, file_name, content_type
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, value: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(value.to_string()))
        .unwrap()
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn test_health() {
    let t = app(ScriptedModel::new());
    let (status, body) = send(&t.router, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_ready_reports_down_store() {
    let t = app(ScriptedModel::new());
    let (status, body) = send(&t.router, get("/ready")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["checks"]["documents"]["status"], "up");

    t.store.set_unavailable(true);
    let (status, body) = send(&t.router, get("/ready")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "not_ready");
    assert_eq!(body["checks"]["documents"]["status"], "down");
    assert_eq!(body["checks"]["blobs"]["status"], "up");
}

#[tokio::test]
async fn test_add_note_then_list() {
    let t = app(ScriptedModel::new());
    let request = multipart(
        "/api/notes",
        &[Part::File("noteFile", "board.png", "image/png", b"\x89PNG-bytes")],
    );

    let (status, body) = send(&t.router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true}));

    let (status, notes) = send(&t.router, get("/api/notes")).await;
    assert_eq!(status, StatusCode::OK);
    let url = notes[0]["imageUrl"].as_str().unwrap();
    assert!(url.starts_with("http://localhost:8080/files/notes/"));
    assert!(notes[0]["createdAt"].is_string());
    assert_eq!(t.blobs.resolve(url).await.unwrap().bytes, b"\x89PNG-bytes");
}

#[tokio::test]
async fn test_add_note_rejects_non_image() {
    let t = app(ScriptedModel::new());
    let request = multipart(
        "/api/notes",
        &[Part::File("noteFile", "notes.pdf", "application/pdf", b"%PDF")],
    );

    let (status, body) = send(&t.router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Only image files are allowed.");
    assert_eq!(body["fieldErrors"]["noteFile"][0], "Only image files are allowed.");
    assert_eq!(t.blobs.calls(), 0);
    assert_eq!(t.store.calls(), 0);
}

#[tokio::test]
async fn test_add_note_without_file() {
    let t = app(ScriptedModel::new());
    let (status, body) = send(&t.router, multipart("/api/notes", &[])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Image is required.");
}

#[tokio::test]
async fn test_add_note_storage_failure_is_upstream_error() {
    let t = app(ScriptedModel::new());
    t.blobs.set_unavailable(true);
    let request = multipart(
        "/api/notes",
        &[Part::File("noteFile", "board.png", "image/png", b"png")],
    );

    let (status, body) = send(&t.router, request).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "blob store unavailable");
}

#[tokio::test]
async fn test_add_book_without_pdf() {
    let t = app(ScriptedModel::new());
    let request = multipart(
        "/api/books",
        &[
            Part::Text("title", "Calculus"),
            Part::Text("subject", "Mathematics"),
            Part::Text("description", "Intro calculus"),
            Part::File("pdfFile", "", "application/octet-stream", b""),
        ],
    );

    let (status, body) = send(&t.router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (_, books) = send(&t.router, get("/api/books")).await;
    assert_eq!(books[0]["title"], "Calculus");
    assert_eq!(books[0]["category"], "Textbook");
    assert_eq!(books[0]["link"], "#");
    assert_eq!(t.blobs.calls(), 0);
}

#[tokio::test]
async fn test_add_book_reports_every_missing_field() {
    let t = app(ScriptedModel::new());
    let request = multipart("/api/books", &[Part::Text("title", "Calculus")]);

    let (status, body) = send(&t.router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Description is required., Subject is required.");
    assert!(body["fieldErrors"]["subject"].is_array());
}

#[tokio::test]
async fn test_summarize_text() {
    let t = app(ScriptedModel::replying("Vectors have magnitude and direction."));
    let request = multipart("/api/summarize", &[Part::Text("notesText", "Lecture 3: vectors")]);

    let (status, body) = send(&t.router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"summary": "Vectors have magnitude and direction."}));
    assert!(t.store.list_notes().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_summarize_image_saves_note() {
    let t = app(ScriptedModel::replying("Ohm's law."));
    let request = multipart(
        "/api/summarize",
        &[Part::File("notesFile", "circuit.jpg", "image/jpeg", b"jpeg")],
    );

    let (status, body) = send(&t.router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["summary"], "Ohm's law.");
    assert_eq!(body["noteSaved"], true);
    assert_eq!(t.store.list_notes().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_summarize_photo_data_uri() {
    let t = app(ScriptedModel::replying("Diagram summary."));
    let request = multipart(
        "/api/summarize",
        &[Part::Text("photoDataUri", "data:image/png;base64,aGk=")],
    );

    let (status, body) = send(&t.router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["noteSaved"], true);
    let note = &t.store.list_notes().await.unwrap()[0];
    assert_eq!(t.blobs.resolve(&note.image_url).await.unwrap().bytes, b"hi");
    assert_eq!(t.model.requests().await[0].media().count(), 1);
}

#[tokio::test]
async fn test_summarize_no_output() {
    let t = app(ScriptedModel::new());
    let request = multipart("/api/summarize", &[Part::Text("notesText", "some notes")]);

    let (status, body) = send(&t.router, request).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body, json!({"error": "No output from AI model"}));
}

#[tokio::test]
async fn test_summarize_requires_input() {
    let t = app(ScriptedModel::new());
    let (status, body) = send(&t.router, multipart("/api/summarize", &[])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Please enter some notes or upload a file to summarize.");
    assert_eq!(t.model.calls(), 0);
}

#[tokio::test]
async fn test_questions_echo_input() {
    let t = app(ScriptedModel::replying(
        r#"{"importantQuestions":["State Newton's second law."]}"#,
    ));
    let request = multipart(
        "/api/important-questions",
        &[Part::Text("material", "Newton's laws of motion")],
    );

    let (status, body) = send(&t.router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["input"], "Newton's laws of motion");
    assert_eq!(body["questions"], json!(["State Newton's second law."]));
}

#[tokio::test]
async fn test_questions_short_material() {
    let t = app(ScriptedModel::new());
    let request = multipart("/api/important-questions", &[Part::Text("material", "too short")]);

    let (status, body) = send(&t.router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["input"], "too short");
    assert_eq!(
        body["error"],
        "Course material must be at least 10 characters long."
    );
    assert!(body.get("questions").is_none());
    assert_eq!(t.model.calls(), 0);
}

#[tokio::test]
async fn test_model_endpoints_are_rate_limited() {
    let mut config = test_config();
    config.rate_limit.enabled = true;
    config.rate_limit.requests_per_second = 1;
    config.rate_limit.burst = 1;
    let t = app_with(config, ScriptedModel::new());

    let first = multipart("/api/important-questions", &[Part::Text("material", "x")]);
    let (status, _) = send(&t.router, first).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let second = multipart("/api/important-questions", &[Part::Text("material", "x")]);
    let (status, body) = send(&t.router, second).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"]["code"], "RATE_LIMITED");

    // Non-model routes are unaffected
    let (status, _) = send(&t.router, get("/api/notes")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_oversized_upload_is_rejected() {
    let mut config = test_config();
    config.server.max_upload_bytes = 64;
    let t = app_with(config, ScriptedModel::new());
    let big = vec![0u8; 1024];
    let request = multipart(
        "/api/notes",
        &[Part::File("noteFile", "big.png", "image/png", &big)],
    );

    let (status, body) = send(&t.router, request).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["success"], false);
    assert_eq!(t.blobs.calls(), 0);
}

#[tokio::test]
async fn test_content_and_quiz_grading() {
    let t = app(ScriptedModel::new());

    let (status, subject) = send(&t.router, get("/api/syllabus/physics-1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(subject["code"], "PH101");

    let (status, _) = send(&t.router, get("/api/syllabus/chemistry")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, quiz) = send(&t.router, get("/api/quizzes/physics-1")).await;
    assert_eq!(quiz["questions"].as_array().unwrap().len(), 2);
    assert!(quiz["questions"][0].get("correctAnswer").is_none());

    let (status, result) = send(
        &t.router,
        post_json("/api/quizzes/physics-1/grade", json!({"answers": {"0": "Newton"}})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["score"], 1);
    assert_eq!(result["percent"], 50);
    assert_eq!(result["feedback"][1]["correct"], false);
}

#[tokio::test]
async fn test_timetable_tool() {
    let t = app(ScriptedModel::new());
    let (status, table) = send(
        &t.router,
        post_json(
            "/api/tools/timetable",
            json!({"subjects": ["physics-1"], "availableSlots": {"Tuesday": ["2pm - 4pm"]}}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(table["days"][0]["day"], "Tuesday");
    assert_eq!(table["days"][0]["sessions"][0]["subject"], "Engineering Physics");

    let (status, body) = send(
        &t.router,
        post_json("/api/tools/timetable", json!({"subjects": [], "availableSlots": {}})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Please select at least one subject.");
}

#[tokio::test]
async fn test_summarize_empty_file_part_falls_back_to_photo_data_uri() {
    let t = app(ScriptedModel::replying("Board summary."));
    let request = multipart(
        "/api/summarize",
        &[
            Part::File("notesFile", "", "application/octet-stream", b""),
            Part::Text("photoDataUri", "data:image/png;base64,aGk="),
        ],
    );

    let (status, body) = send(&t.router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["summary"], "Board summary.");
    assert_eq!(body["noteSaved"], true);

    let note = &t.store.list_notes().await.unwrap()[0];
    assert!(note.image_url.ends_with("-photo.png"), "{}", note.image_url);
    let stored = t.blobs.resolve(&note.image_url).await.unwrap();
    assert_eq!(stored.bytes, b"hi");
    assert_eq!(stored.content_type, "image/png");
}

#[tokio::test]
async fn test_summarize_malformed_photo_data_uri_is_field_error() {
    let t = app(ScriptedModel::new());
    let request = multipart("/api/summarize", &[Part::Text("photoDataUri", "not-a-uri")]);

    let (status, body) = send(&t.router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Data URI must start with 'data:'");
    assert_eq!(
        body["fieldErrors"]["photoDataUri"][0],
        "Data URI must start with 'data:'"
    );

    let request = multipart(
        "/api/summarize",
        &[Part::Text("photoDataUri", "data:image/png;base64,@@@")],
    );
    let (status, body) = send(&t.router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fieldErrors"]["photoDataUri"].is_array());
    assert_eq!(t.model.calls(), 0);
}

#[tokio::test]
async fn test_local_upload_is_served_back_byte_identical() {
    let root = tempfile::tempdir().unwrap();
    let mut config = test_config();
    config.storage.backend = "local".to_string();
    config.storage.root_dir = root.path().to_path_buf();

    let store = Arc::new(MemoryStore::new());
    let blobs = Arc::new(LocalBlobStore::new(root.path(), FILES_BASE).await.unwrap());
    let state = AppState::from_parts(
        config,
        store.clone(),
        blobs,
        Arc::new(ScriptedModel::new()),
        test_content(),
    );
    let router = create_router(state);

    let request = multipart(
        "/api/notes",
        &[Part::File("noteFile", "board.png", "image/png", b"PIXELS")],
    );
    let (status, _) = send(&router, request).await;
    assert_eq!(status, StatusCode::OK);

    let note = &store.list_notes().await.unwrap()[0];
    let path = note.image_url.strip_prefix("http://localhost:8080").unwrap();
    assert!(path.starts_with("/files/notes/"));

    let response = router.clone().oneshot(get(path)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"PIXELS");
}

#[tokio::test]
async fn test_faqs_and_chapter_notes() {
    let t = app(ScriptedModel::new());

    let (status, faqs) = send(&t.router, get("/api/faqs")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(faqs.as_array().unwrap().len(), 2);

    let (_, faqs) = send(&t.router, get("/api/faqs?subject=Engineering%20Physics")).await;
    assert_eq!(faqs.as_array().unwrap().len(), 1);
    assert_eq!(faqs[0]["questions"][0], "Explain wave-particle duality.");

    let (status, notes) = send(
        &t.router,
        get("/api/chapter-notes?subject=basic%20electrical%20engineering"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(notes[0]["chapters"][0]["title"], "AC circuit");

    let (_, notes) = send(&t.router, get("/api/chapter-notes?subject=Physics")).await;
    assert_eq!(notes, json!([]));
}
