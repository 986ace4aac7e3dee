use std::io::Write;

use assert_cmd::Command;
use httpmock::MockServer;
use predicates::str::contains;
use serde_json::json;
use tempfile::NamedTempFile;

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::with_suffix(".toml").expect("tmp file");
    file.write_all(contents.as_bytes()).expect("write config");
    file
}

fn pawboard(server: &MockServer) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("pawboard"));
    cmd.env_remove("PAWBOARD_CONFIG_FILE")
        .env_remove("PAWBOARD_API_TOKEN")
        .arg("--api-url")
        .arg(server.base_url());
    cmd
}

fn mock_news_page(server: &MockServer) {
    server.mock(|when, then| {
        when.method("GET").path("/news");
        then.status(200).json_body(json!({
            "data": [{
                "id": "n-1",
                "title": "Adoption day",
                "slug": "adoption-day",
                "published": true,
                "publishedAt": "2026-02-01T08:00:00Z",
                "updatedAt": "2026-02-01T08:00:00Z"
            }],
            "total": 1
        }));
    });
}

#[test]
fn reports_list_prints_page_with_window() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method("GET")
            .path("/reports")
            .query_param("status", "pending")
            .header("authorization", "Bearer cli-token");
        then.status(200).json_body(json!({
            "data": [{
                "id": "r-1",
                "subject": "listing/1",
                "reason": "spam",
                "reportedBy": "u-1",
                "createdAt": "2026-03-02T10:00:00Z",
                "status": "pending"
            }],
            "total": 1
        }));
    });

    let assert = pawboard(&server)
        .env("PAWBOARD_API_TOKEN", "cli-token")
        .args(["reports", "list", "--status", "pending"])
        .assert()
        .success();

    let output = String::from_utf8_lossy(&assert.get_output().stdout);
    assert!(output.contains("\"totalPages\": 1"));
    assert!(output.contains("\"reportedBy\": \"u-1\""));
    mock.assert();
}

#[test]
fn unknown_status_is_rejected_before_any_request() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method("GET").path("/reports");
        then.status(200).json_body(json!({ "data": [], "total": 0 }));
    });

    pawboard(&server)
        .args(["reports", "list", "--status", "archived"])
        .assert()
        .code(2)
        .stderr(contains("unknown status"));
    mock.assert_calls(0);
}

#[test]
fn destructive_action_without_phrase_is_refused() {
    let server = MockServer::start();
    mock_news_page(&server);
    let delete = server.mock(|when, then| {
        when.method("DELETE").path("/news/n-1");
        then.status(204);
    });

    pawboard(&server)
        .args(["news", "delete", "n-1"])
        .assert()
        .code(2)
        .stderr(contains("needs confirmation"));

    pawboard(&server)
        .args(["news", "delete", "n-1", "--confirm", "delete"])
        .assert()
        .code(2)
        .stderr(contains("confirmation phrase does not match"));

    delete.assert_calls(0);
}

#[test]
fn destructive_action_with_phrase_is_sent() {
    let server = MockServer::start();
    mock_news_page(&server);
    let delete = server.mock(|when, then| {
        when.method("DELETE").path("/news/n-1");
        then.status(204);
    });

    pawboard(&server)
        .args(["news", "delete", "n-1", "--confirm", "DELETE"])
        .assert()
        .success()
        .stdout(contains("\"outcome\": \"committed\""));

    delete.assert();
}

#[test]
fn refused_bulk_publish_exits_with_api_code() {
    let server = MockServer::start();
    mock_news_page(&server);
    let bulk = server.mock(|when, then| {
        when.method("PATCH")
            .path("/news/bulk")
            .json_body(json!({ "ids": ["n-1", "n-9"], "action": "publish" }));
        then.status(422).body("n-9 does not exist");
    });

    pawboard(&server)
        .args(["--bulk-strategy", "batched", "news", "publish", "n-1", "n-9"])
        .assert()
        .code(3)
        .stdout(contains("\"outcome\": \"failed\""));

    bulk.assert();
}

#[test]
fn config_file_can_relax_the_delete_phrase() {
    let server = MockServer::start();
    mock_news_page(&server);
    let delete = server.mock(|when, then| {
        when.method("DELETE")
            .path("/news/n-1")
            .header("authorization", "Bearer file-token");
        then.status(204);
    });

    let config = config_file(&format!(
        "[api]\nbase_url = \"{}\"\ntoken = \"file-token\"\n\n[moderation]\nconfirm_phrase = \"\"\n",
        server.base_url()
    ));

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("pawboard"));
    cmd.env_remove("PAWBOARD_API_TOKEN")
        .arg("--config-file")
        .arg(config.path())
        .args(["news", "delete", "n-1", "--yes"])
        .assert()
        .success()
        .stdout(contains("\"outcome\": \"committed\""));

    delete.assert();
}

#[test]
fn partially_refused_bulk_reports_the_first_failure() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method("GET").path("/reports");
        then.status(200).json_body(json!({
            "data": [
                {
                    "id": "r-1",
                    "subject": "listing/1",
                    "reason": "spam",
                    "reportedBy": "u-1",
                    "createdAt": "2026-03-02T10:00:00Z",
                    "status": "pending"
                },
                {
                    "id": "r-2",
                    "subject": "listing/2",
                    "reason": "spam",
                    "reportedBy": "u-2",
                    "createdAt": "2026-03-02T11:00:00Z",
                    "status": "pending"
                }
            ],
            "total": 2
        }));
    });
    let accepted = server.mock(|when, then| {
        when.method("POST").path("/reports/r-1/action");
        then.status(204);
    });
    let refused = server.mock(|when, then| {
        when.method("POST").path("/reports/r-2/action");
        then.status(409).body("report r-2 already closed");
    });

    pawboard(&server)
        .args(["--bulk-mode", "per_item", "reports", "act", "dismiss", "r-1", "r-2"])
        .assert()
        .code(3)
        .stdout(contains("\"outcome\": \"partial\""))
        .stdout(contains("\"stillSelected\": [\n    \"r-2\"\n  ]"))
        .stderr(contains("report r-2 already closed"));

    accepted.assert();
    refused.assert();
}
