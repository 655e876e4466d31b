//! Mock API for E2E tests.
//!
//! Starts an in-process HTTP server with a form login endpoint and a
//! llama.cpp-style `/completion` endpoint, both with canned behaviour.

use actix_web::{App, HttpResponse, HttpServer, post, web};
use serde::Deserialize;
use serde_json::{Value, json};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};

pub const VALID_EMAIL: &str = "qa@example.com";
pub const VALID_PASSWORD: &str = "correct-horse";
pub const ISSUED_TOKEN: &str = "tok-8f14e45f";

/// How the login endpoint answers a correct password.
#[derive(Debug, Clone)]
pub enum LoginBehaviour {
    Success,
    SuccessFalse(Option<String>),
    MissingToken,
    NotJson,
    ServerError,
}

/// Shared state for the mock API.
pub struct MockApiState {
    pub login: LoginBehaviour,
    pub completion: String,
    pub completion_requests: Vec<Value>,
}

#[derive(Deserialize)]
struct LoginForm {
    email: String,
    password: String,
}

#[post("/users/login")]
async fn login(
    state: web::Data<Arc<Mutex<MockApiState>>>,
    form: web::Form<LoginForm>,
) -> HttpResponse {
    if form.email != VALID_EMAIL || form.password != VALID_PASSWORD {
        return HttpResponse::Unauthorized().body("invalid credentials");
    }

    let behaviour = state.lock().unwrap().login.clone();
    match behaviour {
        LoginBehaviour::Success => HttpResponse::Ok().json(json!({
            "success": true,
            "data": {"token": ISSUED_TOKEN, "user": {"email": VALID_EMAIL}}
        })),
        LoginBehaviour::SuccessFalse(message) => HttpResponse::Ok().json(match message {
            Some(message) => json!({"success": false, "message": message}),
            None => json!({"success": false}),
        }),
        LoginBehaviour::MissingToken => {
            HttpResponse::Ok().json(json!({"success": true, "data": {}}))
        }
        LoginBehaviour::NotJson => HttpResponse::Ok().body("<html>maintenance</html>"),
        LoginBehaviour::ServerError => HttpResponse::InternalServerError().body("boom"),
    }
}

#[post("/completion")]
async fn completion(
    state: web::Data<Arc<Mutex<MockApiState>>>,
    body: web::Json<Value>,
) -> HttpResponse {
    let mut state = state.lock().unwrap();
    state.completion_requests.push(body.into_inner());
    HttpResponse::Ok().json(json!({"content": state.completion, "stop": true}))
}

/// Mock API server on an ephemeral port.
pub struct MockApi {
    pub base_url: String,
    pub state: Arc<Mutex<MockApiState>>,
}

impl MockApi {
    pub async fn start(behaviour: LoginBehaviour) -> Self {
        let state = Arc::new(Mutex::new(MockApiState {
            login: behaviour,
            completion: String::new(),
            completion_requests: Vec::new(),
        }));

        let listener = TcpListener::bind("127.0.0.1:0").expect("failed to bind");
        let port = listener.local_addr().unwrap().port();
        let base_url = format!("http://127.0.0.1:{}", port);

        let state_data = state.clone();
        let server = HttpServer::new(move || {
            App::new()
                .app_data(web::Data::new(state_data.clone()))
                .service(login)
                .service(completion)
        })
        .workers(1)
        .listen(listener)
        .expect("failed to listen")
        .disable_signals()
        .run();

        tokio::spawn(server);

        MockApi { base_url, state }
    }

    /// Text returned by the next `/completion` calls.
    pub fn set_completion(&self, text: &str) {
        self.state.lock().unwrap().completion = text.to_string();
    }

    pub fn completion_requests(&self) -> Vec<Value> {
        self.state.lock().unwrap().completion_requests.clone()
    }
}
