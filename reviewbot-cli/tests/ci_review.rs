//! End-to-end runs of `reviewbot ci` against mocked inference and GitHub APIs

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const EVENT: &str = r#"{
    "action": "synchronize",
    "number": 42,
    "pull_request": {
        "number": 42,
        "base": {"ref": "main", "sha": "aaaaaaa"},
        "head": {"ref": "feature", "sha": "bbbbbbb"}
    }
}"#;

fn reviewbot(home: &Path, server_uri: &str) -> Command {
    let mut cmd = Command::cargo_bin("reviewbot").unwrap();
    cmd.env_clear()
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env("REVIEWBOT_ENDPOINT", format!("{}/chat/completions", server_uri))
        .env("GITHUB_TOKEN", "ghs_ci")
        .env("GITHUB_REPOSITORY", "acme/widgets")
        .env("GITHUB_EVENT_PATH", home.join("event.json"))
        .env("GITHUB_API_URL", server_uri);
    cmd
}

fn setup() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("event.json"), EVENT).unwrap();
    std::fs::write(dir.path().join("pr_diff.txt"), "+ print('hello')\n").unwrap();
    dir
}

#[tokio::test(flavor = "multi_thread")]
async fn writes_artifact_and_posts_comment() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": "## Review\n- Looks fine"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/repos/acme/widgets/issues/42/comments"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "id": 9,
            "html_url": "https://github.com/acme/widgets/pull/42#issuecomment-9"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = setup();
    let home = dir.path().to_path_buf();
    let uri = server.uri();

    tokio::task::spawn_blocking(move || {
        reviewbot(&home, &uri)
            .arg("ci")
            .arg("--diff-file")
            .arg(home.join("pr_diff.txt"))
            .arg("--output")
            .arg(home.join("ai_review.md"))
            .assert()
            .success()
            .stdout(predicate::str::contains("Review written to"))
            .stdout(predicate::str::contains("comment on pull request #42"));

        let artifact = std::fs::read_to_string(home.join("ai_review.md")).unwrap();
        assert_eq!(artifact, "## Review\n- Looks fine\n");
    })
    .await
    .unwrap();

    let requests = server.received_requests().await.unwrap();
    let comment = requests
        .iter()
        .find(|r| r.url.path().ends_with("/comments"))
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&comment.body).unwrap();
    let text = body["body"].as_str().unwrap();
    assert!(text.starts_with("## 🤖 AI Code Review"));
    assert!(text.contains("- Looks fine"));
}

#[tokio::test(flavor = "multi_thread")]
async fn failed_review_writes_nothing_and_posts_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": null}}]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/repos/acme/widgets/issues/42/comments"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let dir = setup();
    let home = dir.path().to_path_buf();
    let uri = server.uri();

    tokio::task::spawn_blocking(move || {
        reviewbot(&home, &uri)
            .arg("ci")
            .arg("--diff-file")
            .arg(home.join("pr_diff.txt"))
            .arg("--output")
            .arg(home.join("ai_review.md"))
            .assert()
            .code(2)
            .stderr(predicate::str::contains("empty completion"));

        assert!(!home.join("ai_review.md").exists());
    })
    .await
    .unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn no_comment_only_writes_artifact() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{"message": {"content": "ok"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = setup();
    let home = dir.path().to_path_buf();
    let uri = server.uri();

    tokio::task::spawn_blocking(move || {
        reviewbot(&home, &uri)
            .env("REVIEWBOT_OUTPUT", home.join("out").join("review.md"))
            .args(["ci", "--no-comment", "--diff-file"])
            .arg(home.join("pr_diff.txt"))
            .assert()
            .success();

        let artifact = std::fs::read_to_string(home.join("out").join("review.md")).unwrap();
        assert_eq!(artifact, "ok\n");
    })
    .await
    .unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_token_is_review_failure_without_calls() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = setup();
    let home = dir.path().to_path_buf();
    let uri = server.uri();

    tokio::task::spawn_blocking(move || {
        reviewbot(&home, &uri)
            .env_remove("GITHUB_TOKEN")
            .arg("ci")
            .arg("--diff-file")
            .arg(home.join("pr_diff.txt"))
            .arg("--output")
            .arg(home.join("ai_review.md"))
            .assert()
            .code(2)
            .stderr(predicate::str::contains("Authentication error"))
            .stderr(predicate::str::contains("GITHUB_TOKEN"));

        assert!(!home.join("ai_review.md").exists());
    })
    .await
    .unwrap();
}
