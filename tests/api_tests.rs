// tests/api_tests.rs

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use fillquiz::{
    config::{Config, GeminiConfig},
    db::{FailPoint, MemoryQuizStore},
    error::GenerationError,
    routes,
    services::gemini::TextGenerator,
    state::AppState,
    utils::jwt::sign_jwt,
};
use serde_json::{Value, json};
use uuid::Uuid;

const JWT_SECRET: &str = "test_secret_for_integration_tests";

const TWO_QUIZZES: &str = "```json\n[\n  {\"question\":\"She ____ to school every day.\",\"correctAnswer\":\"walks\"},\n  {\"question\":\"The capital of France is ____.\",\"correctAnswer\":\"Paris\"}\n]\n```";

/// Replies with queued model outputs, then with `[]`.
#[derive(Default)]
struct ScriptedGenerator {
    replies: Mutex<Vec<Result<String, GenerationError>>>,
}

impl ScriptedGenerator {
    fn push(&self, reply: Result<String, GenerationError>) {
        self.replies.lock().unwrap().insert(0, reply);
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        self.replies
            .lock()
            .unwrap()
            .pop()
            .unwrap_or_else(|| Ok("[]".to_string()))
    }
}

struct TestApp {
    address: String,
    store: Arc<MemoryQuizStore>,
    generator: Arc<ScriptedGenerator>,
    client: reqwest::Client,
}

impl TestApp {
    fn token(&self, user_id: Uuid) -> String {
        sign_jwt(user_id, "authenticated", JWT_SECRET, 600).expect("Failed to sign token")
    }

    async fn generate(&self, user_id: Uuid, text: &str) -> reqwest::Response {
        self.client
            .post(format!("{}/api/quiz/generate", self.address))
            .bearer_auth(self.token(user_id))
            .json(&json!({ "text": text }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    async fn fetch(&self, user_id: Uuid, quiz_set_id: &str) -> reqwest::Response {
        self.client
            .get(format!("{}/api/quizsets/{}", self.address, quiz_set_id))
            .bearer_auth(self.token(user_id))
            .send()
            .await
            .expect("Failed to execute request")
    }

    async fn submit(&self, user_id: Uuid, quiz_set_id: &str, body: Value) -> reqwest::Response {
        self.client
            .post(format!("{}/api/quizsets/{}/answers", self.address, quiz_set_id))
            .bearer_auth(self.token(user_id))
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Generates a set from `TWO_QUIZZES` and returns its JSON body.
    async fn seeded_set(&self, user_id: Uuid) -> Value {
        self.generator.push(Ok(TWO_QUIZZES.to_string()));
        let response = self.generate(user_id, "She walks to school every day. The capital of France is Paris.").await;
        assert_eq!(response.status().as_u16(), 200);
        response.json().await.expect("Failed to parse JSON")
    }
}

/// Spawns the app on a random port, backed by the in-memory store and a
/// scripted generator.
async fn spawn_app() -> TestApp {
    let store = Arc::new(MemoryQuizStore::new());
    let generator = Arc::new(ScriptedGenerator::default());

    let config = Config {
        database_url: "postgres://unused".to_string(),
        jwt_secret: JWT_SECRET.to_string(),
        rust_log: "error".to_string(),
        port: 0,
        gemini: GeminiConfig::new("unused"),
    };

    let state = AppState {
        store: store.clone(),
        generator: generator.clone(),
        config,
    };

    let app = routes::create_router(state);

    // Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        store,
        generator,
        client: reqwest::Client::new(),
    }
}

#[tokio::test]
async fn requests_without_token_are_unauthorized() {
    let app = spawn_app().await;

    let response = app
        .client
        .post(format!("{}/api/quiz/generate", app.address))
        .json(&json!({ "text": "Some text." }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 401);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].is_string());

    let response = app
        .client
        .get(format!("{}/api/texts", app.address))
        .bearer_auth("not-a-jwt")
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn generate_returns_questions_without_answers() {
    let app = spawn_app().await;
    let user = Uuid::new_v4();

    let body = app.seeded_set(user).await;

    let quizzes = body["quizzes"].as_array().expect("quizzes array");
    assert_eq!(quizzes.len(), 2);
    assert!(body["quizSetId"].is_string());
    for quiz in quizzes {
        assert!(quiz["quizId"].is_string());
        assert_eq!(quiz["type"], "fill_in_the_blank");
        assert!(quiz["question"].as_str().unwrap().contains("____"));
        assert!(quiz.get("correctAnswer").is_none());
    }
    assert!(!body.to_string().contains("walks"));
    assert_eq!(app.store.row_counts(), (1, 1, 2, 0));
}

#[tokio::test]
async fn generate_rejects_blank_text() {
    let app = spawn_app().await;

    let response = app.generate(Uuid::new_v4(), "   \n  ").await;
    assert_eq!(response.status().as_u16(), 400);

    let response = app
        .client
        .post(format!("{}/api/quiz/generate", app.address))
        .bearer_auth(app.token(Uuid::new_v4()))
        .header("Content-Type", "application/json")
        .body("{not json")
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 400);

    assert_eq!(app.store.row_counts(), (0, 0, 0, 0));
}

#[tokio::test]
async fn empty_model_answer_is_unprocessable_and_rolled_back() {
    let app = spawn_app().await;
    app.generator.push(Ok("[]".to_string()));

    let response = app.generate(Uuid::new_v4(), "The cat sat on the mat.").await;

    assert_eq!(response.status().as_u16(), 422);
    assert_eq!(app.store.row_counts(), (0, 0, 0, 0));
}

#[tokio::test]
async fn content_block_is_unprocessable_and_model_error_is_bad_gateway() {
    let app = spawn_app().await;
    let user = Uuid::new_v4();

    app.generator.push(Err(GenerationError::ContentPolicyBlocked {
        reason: "SAFETY".to_string(),
        detail: "Prompt blocked".to_string(),
    }));
    let response = app.generate(user, "Some text.").await;
    assert_eq!(response.status().as_u16(), 422);

    app.generator.push(Ok("no json at all".to_string()));
    let response = app.generate(user, "Some text.").await;
    assert_eq!(response.status().as_u16(), 502);

    assert_eq!(app.store.row_counts(), (0, 0, 0, 0));
}

#[tokio::test]
async fn quiz_insert_failure_leaves_nothing_behind() {
    let app = spawn_app().await;
    app.store.fail_on(FailPoint::InsertQuizzes);
    app.generator.push(Ok(TWO_QUIZZES.to_string()));

    let response = app.generate(Uuid::new_v4(), "Some text.").await;

    assert_eq!(response.status().as_u16(), 500);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Internal Server Error");
    assert_eq!(app.store.row_counts(), (0, 0, 0, 0));
}

#[tokio::test]
async fn fetch_is_idempotent() {
    let app = spawn_app().await;
    let user = Uuid::new_v4();
    let created = app.seeded_set(user).await;
    let id = created["quizSetId"].as_str().unwrap();

    let first: Value = app.fetch(user, id).await.json().await.unwrap();
    let second: Value = app.fetch(user, id).await.json().await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first["quizzes"], created["quizzes"]);
}

#[tokio::test]
async fn fetch_missing_is_not_found_and_foreign_is_forbidden() {
    let app = spawn_app().await;
    let owner = Uuid::new_v4();
    let created = app.seeded_set(owner).await;
    let id = created["quizSetId"].as_str().unwrap();

    let missing = app.fetch(owner, &Uuid::new_v4().to_string()).await;
    assert_eq!(missing.status().as_u16(), 404);

    let foreign = app.fetch(Uuid::new_v4(), id).await;
    assert_eq!(foreign.status().as_u16(), 403);
}

#[tokio::test]
async fn grading_ignores_case_and_whitespace() {
    let app = spawn_app().await;
    let user = Uuid::new_v4();
    let created = app.seeded_set(user).await;
    let id = created["quizSetId"].as_str().unwrap();
    let quizzes = created["quizzes"].as_array().unwrap();

    let response = app
        .submit(
            user,
            id,
            json!({
                "userId": user.to_string(),
                "answers": [
                    { "quizId": quizzes[0]["quizId"], "submittedAnswer": "walk" },
                    { "quizId": quizzes[1]["quizId"], "submittedAnswer": " paris " }
                ]
            }),
        )
        .await;

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);

    assert_eq!(results[0]["isCorrect"], false);
    assert_eq!(results[0]["correctAnswer"], "walks");
    assert_eq!(results[0]["feedback"], "오답입니다. 정답은 \"walks\" 입니다.");

    assert_eq!(results[1]["isCorrect"], true);
    assert_eq!(results[1]["submittedAnswer"], " paris ");
    assert_eq!(results[1]["feedback"], "정답입니다!");

    assert_eq!(app.store.answers().len(), 2);
}

#[tokio::test]
async fn mismatched_user_id_is_forbidden_before_any_lookup() {
    let app = spawn_app().await;
    let user = Uuid::new_v4();
    let created = app.seeded_set(user).await;
    let id = created["quizSetId"].as_str().unwrap();
    let quiz_id = created["quizzes"][0]["quizId"].clone();

    // A lookup would surface as a 500.
    app.store.fail_on(FailPoint::FindAnswerKeys);

    let response = app
        .submit(
            user,
            id,
            json!({
                "userId": Uuid::new_v4().to_string(),
                "answers": [{ "quizId": quiz_id, "submittedAnswer": "walks" }]
            }),
        )
        .await;

    assert_eq!(response.status().as_u16(), 403);
    assert!(app.store.answers().is_empty());
}

#[tokio::test]
async fn quiz_from_another_set_is_rejected_without_records() {
    let app = spawn_app().await;
    let user = Uuid::new_v4();
    let set_a = app.seeded_set(user).await;
    let set_b = app.seeded_set(user).await;

    let response = app
        .submit(
            user,
            set_a["quizSetId"].as_str().unwrap(),
            json!({
                "userId": user.to_string(),
                "answers": [
                    { "quizId": set_a["quizzes"][0]["quizId"], "submittedAnswer": "walks" },
                    { "quizId": set_b["quizzes"][1]["quizId"], "submittedAnswer": "Paris" }
                ]
            }),
        )
        .await;

    assert_eq!(response.status().as_u16(), 403);
    assert!(app.store.answers().is_empty());
}

#[tokio::test]
async fn malformed_submissions_are_bad_requests() {
    let app = spawn_app().await;
    let user = Uuid::new_v4();
    let created = app.seeded_set(user).await;
    let id = created["quizSetId"].as_str().unwrap();

    let empty = app
        .submit(user, id, json!({ "userId": user.to_string(), "answers": [] }))
        .await;
    assert_eq!(empty.status().as_u16(), 400);

    let unknown = app
        .submit(
            user,
            id,
            json!({
                "userId": user.to_string(),
                "answers": [{ "quizId": Uuid::new_v4().to_string(), "submittedAnswer": "x" }]
            }),
        )
        .await;
    assert_eq!(unknown.status().as_u16(), 400);

    assert!(app.store.answers().is_empty());
}

#[tokio::test]
async fn repeated_quiz_id_is_rejected_without_records() {
    let app = spawn_app().await;
    let user = Uuid::new_v4();
    let created = app.seeded_set(user).await;
    let id = created["quizSetId"].as_str().unwrap();
    let quiz_id = created["quizzes"][0]["quizId"].clone();

    let response = app
        .submit(
            user,
            id,
            json!({
                "userId": user.to_string(),
                "answers": [
                    { "quizId": quiz_id, "submittedAnswer": "walks" },
                    { "quizId": quiz_id, "submittedAnswer": "walk" }
                ]
            }),
        )
        .await;

    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].is_string());
    assert!(app.store.answers().is_empty());
}

#[tokio::test]
async fn non_uuid_quiz_set_id_gets_json_error() {
    let app = spawn_app().await;
    let user = Uuid::new_v4();

    let response = app.fetch(user, "not-a-uuid").await;
    assert_eq!(response.status().as_u16(), 400);
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("application/json"));
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().starts_with("Invalid path"));

    let response = app
        .submit(
            user,
            "not-a-uuid",
            json!({ "userId": user.to_string(), "answers": [] }),
        )
        .await;
    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn list_texts_returns_only_own_texts() {
    let app = spawn_app().await;
    let user = Uuid::new_v4();
    app.seeded_set(user).await;
    app.seeded_set(Uuid::new_v4()).await;

    let response = app
        .client
        .get(format!("{}/api/texts", app.address))
        .bearer_auth(app.token(user))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 200);
    let texts: Vec<Value> = response.json().await.unwrap();
    assert_eq!(texts.len(), 1);
    assert!(texts[0]["content"].as_str().unwrap().starts_with("She walks"));
    assert!(texts[0].get("userId").is_none());
}
