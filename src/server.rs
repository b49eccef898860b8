//! Bundled answer server
//!
//! Serves the routes the chat client talks to:
//! - `GET /` liveness and feature list
//! - `POST /ask` question in, answer out
//! - `GET /status` operational summary

use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use crate::tutor;

pub const SERVICE_STATUS: &str = "AI Tutoring Bot Backend is running";
pub const SERVICE_VERSION: &str = "4.0";
pub const MODEL_NAME: &str = "AI Tutoring Bot v4.0";

pub const EMPTY_QUESTION_ANSWER: &str = "Please ask a question! I'm here to help you learn.";
pub const PROCESSING_ERROR_ANSWER: &str = "I apologize, but I encountered an error while processing your question. Please try again in a moment.";

const FEATURES: &[&str] = &[
    "Enhanced responses",
    "Multiple subjects",
    "Interactive learning",
];

/// The answer server's routes
pub fn router() -> Router {
    Router::new()
        .route("/", get(home))
        .route("/ask", post(ask))
        .route("/status", get(status))
}

/// Answer server bound to a socket
pub struct Server {
    listener: TcpListener,
}

impl Server {
    /// Bind the listener. Port 0 picks a free port.
    pub async fn bind(addr: SocketAddr) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind answer server to {}", addr))?;
        Ok(Self { listener })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener
            .local_addr()
            .context("Failed to read listener address")
    }

    /// Serve until the process exits
    pub async fn run(self) -> Result<()> {
        let addr = self.local_addr()?;
        tracing::info!("Answer server listening on http://{}", addr);
        axum::serve(self.listener, router())
            .await
            .context("Answer server failed")
    }
}

async fn home() -> Json<Value> {
    Json(json!({
        "status": SERVICE_STATUS,
        "version": SERVICE_VERSION,
        "features": FEATURES,
    }))
}

async fn ask(payload: Result<Json<Value>, JsonRejection>) -> (StatusCode, Json<Value>) {
    let question = match payload {
        Ok(Json(body)) if !body.is_object() => {
            tracing::warn!("/ask body is not a JSON object: {}", body);
            return processing_error();
        }
        Ok(Json(body)) => match body.get("question") {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(q)) => q.trim().to_string(),
            Some(other) => {
                tracing::warn!("question is not a string: {}", other);
                return processing_error();
            }
        },
        Err(rejection) => {
            tracing::warn!("Rejected /ask body: {}", rejection);
            return processing_error();
        }
    };

    if question.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "answer": EMPTY_QUESTION_ANSWER })),
        );
    }

    tracing::info!("Question received: {}", question);
    let answer = tutor::answer(&question);
    tracing::debug!("Answer: {}", answer);

    (
        StatusCode::OK,
        Json(json!({
            "answer": answer,
            "timestamp": now(),
        })),
    )
}

async fn status() -> Json<Value> {
    Json(json!({
        "status": "operational",
        "model": MODEL_NAME,
        "subjects_supported": tutor::SUBJECTS_SUPPORTED,
        "timestamp": now(),
    }))
}

fn processing_error() -> (StatusCode, Json<Value>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "answer": PROCESSING_ERROR_ANSWER,
            "error": true,
        })),
    )
}

fn now() -> String {
    chrono::Local::now().to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn spawn_server() -> String {
        let server = Server::bind("127.0.0.1:0".parse().unwrap()).await.unwrap();
        let addr = server.local_addr().unwrap();
        tokio::spawn(server.run());
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_home_reports_running() {
        let base = spawn_server().await;
        let body: Value = reqwest::get(&base).await.unwrap().json().await.unwrap();
        assert_eq!(body["status"], SERVICE_STATUS);
        assert_eq!(body["version"], "4.0");
        assert!(body["features"].is_array());
    }

    #[tokio::test]
    async fn test_ask_answers_question() {
        let base = spawn_server().await;
        let response = reqwest::Client::new()
            .post(format!("{}/ask", base))
            .json(&json!({ "question": "  What is mitosis?  " }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);

        let body: Value = response.json().await.unwrap();
        assert!(body["answer"].as_str().unwrap().starts_with("**Mitosis**:"));
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_ask_empty_question_is_bad_request() {
        let base = spawn_server().await;
        let client = reqwest::Client::new();

        for body in [json!({ "question": "   " }), json!({})] {
            let response = client
                .post(format!("{}/ask", base))
                .json(&body)
                .send()
                .await
                .unwrap();
            assert_eq!(response.status(), 400);
            let body: Value = response.json().await.unwrap();
            assert_eq!(body["answer"], EMPTY_QUESTION_ANSWER);
        }
    }

    #[tokio::test]
    async fn test_ask_malformed_json_is_server_error() {
        let base = spawn_server().await;
        let response = reqwest::Client::new()
            .post(format!("{}/ask", base))
            .header("content-type", "application/json")
            .body("{not json")
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 500);

        let body: Value = response.json().await.unwrap();
        assert_eq!(body["answer"], PROCESSING_ERROR_ANSWER);
        assert_eq!(body["error"], true);
    }

    #[tokio::test]
    async fn test_ask_non_object_body_is_server_error() {
        let base = spawn_server().await;
        let client = reqwest::Client::new();

        for body in [json!([1]), json!("hello"), json!(42)] {
            let response = client
                .post(format!("{}/ask", base))
                .json(&body)
                .send()
                .await
                .unwrap();
            assert_eq!(response.status(), 500);
            let body: Value = response.json().await.unwrap();
            assert_eq!(body["answer"], PROCESSING_ERROR_ANSWER);
            assert_eq!(body["error"], true);
        }
    }

    #[tokio::test]
    async fn test_status_lists_subjects() {
        let base = spawn_server().await;
        let body: Value = reqwest::get(format!("{}/status", base))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["status"], "operational");
        assert_eq!(body["subjects_supported"].as_array().unwrap().len(), 5);
    }
}
