// tests/http_deploy.rs

use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::sync::Arc;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use tower::ServiceExt;

use deployd::config::Config;
use deployd::deploy::Orchestrator;
use deployd::exec::{ProcessRunner, TerminationOutcome};
use deployd::http::router;
use deployd_test_utils::builders::ConfigBuilder;
use deployd_test_utils::fake_runner::RecordingRunner;
use deployd_test_utils::init_tracing;
use deployd_test_utils::scripts::ScriptDir;

const BOUNDARY: &str = "deployd-test-boundary";

fn multipart(fields: &[(&str, &str)], env_json: Option<&str>) -> Vec<u8> {
    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    if let Some(json) = env_json {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"env_file\"; filename=\"env.json\"\r\nContent-Type: application/json\r\n\r\n{json}\r\n"
        ));
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));
    body.into_bytes()
}

fn deploy_request(body: Vec<u8>, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/deploy")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
    if let Some(token) = token {
        builder = builder.header("X-ADMIN-TOKEN", token);
    }
    builder.body(Body::from(body)).unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn fake_app(config: Config, runner: &RecordingRunner) -> axum::Router {
    router(Orchestrator::new(config, Arc::new(runner.clone())))
}

#[tokio::test]
async fn root_reports_ok() {
    init_tracing();
    let runner = RecordingRunner::default();
    let app = fake_app(ConfigBuilder::new().build(), &runner);

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json["ok"], true);
}

#[tokio::test]
async fn admin_token_is_enforced_when_configured() {
    init_tracing();
    let runner = RecordingRunner::new(&["deploying\n"]);
    let config = ConfigBuilder::new().admin_token("s3cret").build();
    let body = || multipart(&[("repo_url", "https://github.com/acme/shop.git")], None);

    for token in [None, Some("wrong")] {
        let response = fake_app(config.clone(), &runner)
            .oneshot(deploy_request(body(), token))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(body_text(response).await.contains("invalid admin token"));
    }
    assert!(runner.invocations().is_empty());

    let response = fake_app(config, &runner)
        .oneshot(deploy_request(body(), Some("s3cret")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(runner.invocations().len(), 1);
}

#[tokio::test]
async fn streams_runner_output_as_plain_text() {
    init_tracing();
    let runner = RecordingRunner::new(&["cloning\n", "building\n"]);
    let app = fake_app(ConfigBuilder::new().build(), &runner);

    let response = app
        .oneshot(deploy_request(
            multipart(&[("repo_url", "https://github.com/acme/shop.git")], None),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/plain; charset=utf-8"
    );
    assert_eq!(
        body_text(response).await,
        format!(
            "cloning\nbuilding\n{}",
            TerminationOutcome::NormalExit(0).status_line()
        )
    );
}

#[tokio::test]
async fn picks_script_arguments_and_timeout_from_the_form() {
    init_tracing();
    let runner = RecordingRunner::default();
    let config = ConfigBuilder::new()
        .cert_script("/srv/cert.sh")
        .spa_script("/srv/spa.sh")
        .default_timeout(900)
        .build();

    let response = fake_app(config.clone(), &runner)
        .oneshot(deploy_request(
            multipart(&[("repo_url", "https://github.com/acme/shop.git")], None),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = fake_app(config, &runner)
        .oneshot(deploy_request(
            multipart(
                &[
                    ("repo_url", "https://github.com/acme/site.git"),
                    ("domain", "site.example.com"),
                    ("is_spa", "true"),
                    ("timeout_seconds", "42"),
                ],
                None,
            ),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let calls = runner.invocations();
    assert_eq!(calls.len(), 2);

    assert_eq!(calls[0].program(), Path::new("/srv/cert.sh"));
    assert_eq!(calls[0].args(), ["https://github.com/acme/shop.git"]);
    assert_eq!(calls[0].timeout_secs(), 900);

    assert_eq!(calls[1].program(), Path::new("/srv/spa.sh"));
    assert_eq!(
        calls[1].args(),
        ["https://github.com/acme/site.git", "site.example.com"]
    );
    assert_eq!(calls[1].timeout_secs(), 42);
}

#[tokio::test]
async fn env_file_upload_is_written_with_private_mode() {
    init_tracing();
    let apps = tempfile::tempdir().unwrap();
    let runner = RecordingRunner::default();
    let config = ConfigBuilder::new().apps_base(apps.path()).build();

    let response = fake_app(config, &runner)
        .oneshot(deploy_request(
            multipart(
                &[("repo_url", "https://github.com/acme/shop.git")],
                Some(r#"{"API_KEY": "abc\"123", "WORKERS": 4}"#),
            ),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let env_path = apps.path().join(".env");
    assert_eq!(
        std::fs::read_to_string(&env_path).unwrap(),
        "API_KEY=\"abc\\\"123\"\nWORKERS=\"4\"\n"
    );
    let mode = std::fs::metadata(&env_path).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode, 0o600);
}

#[tokio::test]
async fn bad_requests_are_rejected_before_anything_runs() {
    init_tracing();
    let apps = tempfile::tempdir().unwrap();
    let runner = RecordingRunner::default();
    let config = ConfigBuilder::new().apps_base(apps.path()).build();

    let cases: Vec<(Vec<u8>, &str)> = vec![
        (multipart(&[("domain", "x.example.com")], None), "repo_url is required"),
        (
            multipart(&[("repo_url", "https://github.com/")], None),
            "cannot derive safe app name",
        ),
        (
            multipart(
                &[("repo_url", "https://github.com/acme/shop.git"), ("is_spa", "maybe")],
                None,
            ),
            "is_spa",
        ),
        (
            multipart(
                &[("repo_url", "https://github.com/acme/shop.git"), ("timeout_seconds", "soon")],
                None,
            ),
            "timeout_seconds",
        ),
        (
            multipart(&[("repo_url", "https://github.com/acme/shop.git")], Some("[1, 2]")),
            "JSON object",
        ),
    ];

    for (body, expected) in cases {
        let response = fake_app(config.clone(), &runner)
            .oneshot(deploy_request(body, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let text = body_text(response).await;
        assert!(text.contains(expected), "{text} should mention {expected}");
    }

    assert!(runner.invocations().is_empty());
    assert!(!apps.path().join(".env").exists());
}

#[tokio::test]
async fn real_script_failure_still_streams_with_200() {
    init_tracing();
    let dir = ScriptDir::new();
    let script = dir.script("deploy.sh", "echo \"deploying $1\"\necho oops >&2\nexit 3");
    let config = ConfigBuilder::new().cert_script(&script).build();
    let app = router(Orchestrator::new(config, Arc::new(ProcessRunner)));

    let response = app
        .oneshot(deploy_request(
            multipart(&[("repo_url", "https://github.com/acme/shop.git")], None),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let text = body_text(response).await;
    assert_eq!(
        text,
        format!(
            "deploying https://github.com/acme/shop.git\noops\n{}",
            TerminationOutcome::NormalExit(3).status_line()
        )
    );
}

#[tokio::test]
async fn missing_script_is_reported_in_the_stream() {
    init_tracing();
    let dir = ScriptDir::new();
    let config = ConfigBuilder::new()
        .spa_script(dir.path().join("absent.sh"))
        .build();
    let app = router(Orchestrator::new(config, Arc::new(ProcessRunner)));

    let response = app
        .oneshot(deploy_request(
            multipart(
                &[("repo_url", "https://github.com/acme/site.git"), ("is_spa", "1")],
                None,
            ),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let text = body_text(response).await;
    assert!(text.starts_with("ERROR: script not found or not executable"));
    assert_eq!(text.lines().count(), 1);
}
