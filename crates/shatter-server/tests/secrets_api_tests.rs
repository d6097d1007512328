// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP-level tests for the note lifecycle.

use axum::{
	body::Body,
	http::{Request, StatusCode},
	Router,
};
use std::sync::Arc;

use chrono::{Duration, Utc};
use serde_json::{json, Value};
use shatter_server::{create_app_state, create_router, ServerConfig};
use shatter_server_secrets::{MasterKey, SecretsService, TokenCodec};
use tempfile::tempdir;
use tower::ServiceExt;

fn test_codec() -> TokenCodec {
	TokenCodec::new(MasterKey::from_bytes(vec![0x24; 32]).unwrap())
}

async fn setup_test_app() -> (Router, tempfile::TempDir) {
	let (app, _, dir) = setup_test_app_with_service().await;
	(app, dir)
}

async fn setup_test_app_with_service() -> (Router, Arc<SecretsService>, tempfile::TempDir) {
	let dir = tempdir().unwrap();
	let db_path = dir.path().join("test_secrets.db");
	let db_url = format!("sqlite:{}?mode=rwc", db_path.display());
	let pool = shatter_server::db::create_pool(&db_url).await.unwrap();
	shatter_server::db::run_migrations(&pool).await.unwrap();

	let mut config = ServerConfig::default();
	config.http.base_url = "https://notes.test".to_string();

	let state = create_app_state(pool, test_codec(), &config);
	let secrets = state.secrets.clone();
	(create_router(state), secrets, dir)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
	let request = Request::builder().method(method).uri(uri);
	let request = match body {
		Some(body) => request
			.header("content-type", "application/json")
			.body(Body::from(body.to_string()))
			.unwrap(),
		None => request.body(Body::empty()).unwrap(),
	};

	let response = app.clone().oneshot(request).await.unwrap();
	let status = response.status();
	let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
		.await
		.unwrap();
	let json = if bytes.is_empty() {
		Value::Null
	} else {
		serde_json::from_slice(&bytes).unwrap()
	};
	(status, json)
}

/// Create a note and fetch its reveal token through the status page.
async fn create_and_issue(app: &Router, message: &str, passphrase: Option<&str>) -> String {
	let (status, created) = send(
		app,
		"POST",
		"/api/secrets",
		Some(json!({ "message": message, "passphrase": passphrase })),
	)
	.await;
	assert_eq!(status, StatusCode::CREATED);

	let status_id = created["status_id"].as_str().unwrap();
	assert_eq!(
		created["status_url"],
		format!("https://notes.test/status/{status_id}")
	);

	let (status, view) = send(app, "GET", &format!("/api/status/{status_id}"), None).await;
	assert_eq!(status, StatusCode::OK);
	let reveal_url = view["reveal_url"].as_str().unwrap();
	reveal_url
		.strip_prefix("https://notes.test/s/")
		.unwrap()
		.to_string()
}

#[tokio::test]
async fn passphrase_note_lifecycle() {
	let (app, _dir) = setup_test_app().await;
	let token = create_and_issue(&app, "hello", Some("pw1")).await;

	let (status, lookup) = send(&app, "GET", &format!("/api/secrets/{token}"), None).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(lookup["locked"], true);

	let (status, body) = send(&app, "POST", &format!("/api/secrets/{token}/reveal"), None).await;
	assert_eq!(status, StatusCode::LOCKED);
	assert_eq!(body["error"], "locked");

	let (status, body) = send(
		&app,
		"POST",
		&format!("/api/secrets/{token}/unlock"),
		Some(json!({ "passphrase": "wrong" })),
	)
	.await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["unlocked"], false);

	let (_, lookup) = send(&app, "GET", &format!("/api/secrets/{token}"), None).await;
	assert_eq!(lookup["locked"], true);

	let (_, body) = send(
		&app,
		"POST",
		&format!("/api/secrets/{token}/unlock"),
		Some(json!({ "passphrase": "pw1" })),
	)
	.await;
	assert_eq!(body["unlocked"], true);

	let (status, body) = send(&app, "POST", &format!("/api/secrets/{token}/reveal"), None).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["message"], "hello");
	assert_eq!(body["undecodable"], false);

	let (status, body) = send(&app, "POST", &format!("/api/secrets/{token}/reveal"), None).await;
	assert_eq!(status, StatusCode::NOT_FOUND);
	assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn plain_note_is_read_once() {
	let (app, _dir) = setup_test_app().await;
	let token = create_and_issue(&app, "hello", None).await;

	let (_, lookup) = send(&app, "GET", &format!("/api/secrets/{token}"), None).await;
	assert_eq!(lookup["locked"], false);

	// Checking the link does not consume it.
	let (status, _) = send(&app, "GET", &format!("/api/secrets/{token}"), None).await;
	assert_eq!(status, StatusCode::OK);

	let (_, body) = send(&app, "POST", &format!("/api/secrets/{token}/reveal"), None).await;
	assert_eq!(body["message"], "hello");

	let (status, _) = send(&app, "GET", &format!("/api/secrets/{token}"), None).await;
	assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn wrong_key_reveals_garbage_and_deletes() {
	let (app, _dir) = setup_test_app().await;
	let message = "the deploy password rotates on the first of each month ".repeat(8);
	let token = create_and_issue(&app, &message, None).await;

	let codec = test_codec();
	let (id, key) = codec.unpack_reveal(&token).unwrap();
	let mut key = key.expose().clone();
	key[0] ^= 0x01;
	let forged = codec.pack_reveal(id, &key).unwrap();

	let (status, body) = send(&app, "POST", &format!("/api/secrets/{forged}/reveal"), None).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["undecodable"], true);
	assert!(body.get("message").is_none());

	for uri in [
		format!("/api/secrets/{token}"),
		format!("/api/secrets/{forged}"),
	] {
		let (status, body) = send(&app, "GET", &uri, None).await;
		assert_eq!(status, StatusCode::NOT_FOUND);
		assert_eq!(body["error"], "not_found");
	}
	let (status, _) = send(&app, "POST", &format!("/api/secrets/{token}/reveal"), None).await;
	assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn purged_notes_are_not_found() {
	let (app, secrets, _dir) = setup_test_app_with_service().await;
	let (_, created) = send(
		&app,
		"POST",
		"/api/secrets",
		Some(json!({ "message": "hello" })),
	)
	.await;
	let status_uri = format!("/api/status/{}", created["status_id"].as_str().unwrap());
	let (_, view) = send(&app, "GET", &status_uri, None).await;
	let token = view["reveal_url"]
		.as_str()
		.unwrap()
		.strip_prefix("https://notes.test/s/")
		.unwrap()
		.to_string();

	// Just inside the retention window nothing goes.
	let early = Utc::now() + Duration::days(7) - Duration::minutes(1);
	assert_eq!(secrets.purge_expired_at(early).await.unwrap(), 0);
	let (status, _) = send(&app, "GET", &format!("/api/secrets/{token}"), None).await;
	assert_eq!(status, StatusCode::OK);

	let late = Utc::now() + Duration::days(7) + Duration::seconds(1);
	assert_eq!(secrets.purge_expired_at(late).await.unwrap(), 1);
	assert_eq!(secrets.purge_expired_at(late).await.unwrap(), 0);

	let (status, body) = send(&app, "GET", &format!("/api/secrets/{token}"), None).await;
	assert_eq!(status, StatusCode::NOT_FOUND);
	assert_eq!(body["error"], "not_found");
	let (status, _) = send(&app, "POST", &format!("/api/secrets/{token}/reveal"), None).await;
	assert_eq!(status, StatusCode::NOT_FOUND);
	let (status, _) = send(&app, "GET", &status_uri, None).await;
	assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn status_shows_reveal_url_once() {
	let (app, _dir) = setup_test_app().await;
	let (_, created) = send(
		&app,
		"POST",
		"/api/secrets",
		Some(json!({ "message": "hello", "passphrase": "" })),
	)
	.await;
	let uri = format!("/api/status/{}", created["status_id"].as_str().unwrap());

	let (_, first) = send(&app, "GET", &uri, None).await;
	assert!(first["reveal_url"].is_string());
	assert_eq!(first["secret"]["locked"], false);
	assert!(first["expires_in"].as_str().unwrap().starts_with("6 days"));

	let (status, second) = send(&app, "GET", &uri, None).await;
	assert_eq!(status, StatusCode::OK);
	assert!(second.get("reveal_url").is_none());
}

#[tokio::test]
async fn bad_links_are_indistinguishable() {
	let (app, _dir) = setup_test_app().await;
	let token = create_and_issue(&app, "hello", None).await;
	let mut tampered = token.clone().into_bytes();
	let last = tampered.len() - 5;
	tampered[last] = if tampered[last] == b'A' { b'B' } else { b'A' };
	let tampered = String::from_utf8(tampered).unwrap();

	let mut bodies = Vec::new();
	for bad in ["garbage", "AAAA", tampered.as_str()] {
		for (method, uri) in [
			("GET", format!("/api/secrets/{bad}")),
			("POST", format!("/api/secrets/{bad}/reveal")),
			("GET", format!("/api/status/{bad}")),
		] {
			let (status, body) = send(&app, method, &uri, None).await;
			assert_eq!(status, StatusCode::NOT_FOUND, "{method} {uri}");
			bodies.push(body);
		}
		let (status, body) = send(
			&app,
			"POST",
			&format!("/api/secrets/{bad}/unlock"),
			Some(json!({ "passphrase": "pw" })),
		)
		.await;
		assert_eq!(status, StatusCode::NOT_FOUND);
		bodies.push(body);
	}
	assert!(bodies.windows(2).all(|pair| pair[0] == pair[1]));

	// The real link still works.
	let (_, body) = send(&app, "POST", &format!("/api/secrets/{token}/reveal"), None).await;
	assert_eq!(body["message"], "hello");
}

#[tokio::test]
async fn rejects_empty_and_oversized_messages() {
	let (app, _dir) = setup_test_app().await;

	let (status, body) = send(&app, "POST", "/api/secrets", Some(json!({ "message": "" }))).await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(body["error"], "bad_request");

	let long = "x".repeat(25_001);
	let (status, _) = send(&app, "POST", "/api/secrets", Some(json!({ "message": long }))).await;
	assert_eq!(status, StatusCode::BAD_REQUEST);

	let (status, _) = send(
		&app,
		"POST",
		"/api/secrets",
		Some(json!({ "message": "ok", "passphrase": "p".repeat(101) })),
	)
	.await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn openapi_document_is_served() {
	let (app, _dir) = setup_test_app().await;
	let (status, doc) = send(&app, "GET", "/api/openapi.json", None).await;
	assert_eq!(status, StatusCode::OK);
	assert!(doc["paths"]["/api/secrets/{token}/reveal"].is_object());
}
