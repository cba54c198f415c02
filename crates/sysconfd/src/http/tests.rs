//! Router assembly and plugin dispatch tests driven through `tower`.

use std::path::PathBuf;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use rstest::{fixture, rstest};
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

use sysconfd_config::Config;
use sysconfd_plugins::{CommandExecutor, PluginInvoker, PluginRecord, PluginRegistry, RouteMethod};

use super::{ExecutableAudit, audit_executable};
use crate::http::{RoutePlan, build_router};
use crate::test_support::{EchoExecutor, FailingExecutor, GarbageExecutor, RecordingReporter};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

const KEYBOARD_DESCRIPTOR: &str = r#"{
    "name": "Keyboard Configuration",
    "apiMountPoint": "/hardware",
    "apiName": "keyboard",
    "apiPaths": {
        "/discover": {"method": "GET"},
        "/apply": {"method": "POST"},
        "/purge": {"method": "DELETE"}
    }
}"#;

struct Workspace {
    _dir: TempDir,
    registry: PluginRegistry,
}

fn workspace_with(descriptor: &str, enabled: bool) -> Workspace {
    let dir = TempDir::new().expect("create temp dir");
    let meta = dir.path().join("keyboard.json");
    std::fs::write(&meta, descriptor).expect("write descriptor");
    let record = PluginRecord::new("keyboard", "/plugins/keyboard", &meta, enabled);
    Workspace {
        _dir: dir,
        registry: PluginRegistry::new(vec![record]),
    }
}

#[fixture]
fn keyboard_workspace() -> Workspace {
    workspace_with(KEYBOARD_DESCRIPTOR, true)
}

fn router_with<E>(workspace: &Workspace, executor: E) -> (Router, Vec<RoutePlan>)
where
    E: CommandExecutor + 'static,
{
    let reporter = RecordingReporter::default();
    build_router(&Config::default(), &workspace.registry, executor, &reporter)
}

fn empty_router() -> Router {
    let reporter = RecordingReporter::default();
    let (router, _) = build_router(
        &Config::default(),
        &PluginRegistry::new(Vec::new()),
        EchoExecutor::default(),
        &reporter,
    );
    router
}

async fn get(router: Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let request = Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("build request");
    let response = router.oneshot(request).await.expect("route request");
    let status = response.status();
    let body = response
        .into_body()
        .collect()
        .await
        .expect("collect body")
        .to_bytes();
    (status, body.to_vec())
}

fn parse(body: &[u8]) -> Value {
    serde_json::from_slice(body).expect("JSON body")
}

// ---------------------------------------------------------------------------
// Built-in endpoints
// ---------------------------------------------------------------------------

#[rstest]
#[case::health("/api/v1/health", json!({"status": "ok", "message": "System Confd is running"}))]
#[case::version("/api/v1/version", json!({"version": env!("CARGO_PKG_VERSION")}))]
#[tokio::test]
async fn builtin_endpoints_answer(#[case] uri: &str, #[case] expected: Value) {
    let (status, body) = get(empty_router(), uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse(&body), expected);
}

#[tokio::test]
async fn metadata_endpoint_reports_service_identity() {
    let (status, body) = get(empty_router(), "/api/v1").await;
    assert_eq!(status, StatusCode::OK);
    let metadata = &parse(&body)["metadata"];
    assert_eq!(metadata["name"], "System Confd");
    assert_eq!(metadata["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn config_endpoint_is_reserved_but_empty() {
    let (status, body) = get(empty_router(), "/api/v1/config").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());
}

// ---------------------------------------------------------------------------
// Plugin route binding
// ---------------------------------------------------------------------------

#[rstest]
#[tokio::test]
async fn keyboard_discover_invokes_plugin_and_echoes_envelope(keyboard_workspace: Workspace) {
    let executor = EchoExecutor::default();
    let (router, plans) = router_with(&keyboard_workspace, executor.clone());

    let (status, body) = get(
        router,
        "/api/v1/system/plugins/hardware/keyboard/discover",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse(&body), json!({"version": 1, "action": "discover"}));

    let calls = executor.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0].0,
        PathBuf::from("/plugins/keyboard/keyboard.plugin")
    );
    assert_eq!(
        parse(&calls[0].1),
        json!({"version": 1, "action": "discover"})
    );

    let discover = plans
        .iter()
        .find(|plan| plan.action() == "discover")
        .expect("discover plan");
    assert_eq!(discover.method(), RouteMethod::Get);
    assert_eq!(discover.path(), "/hardware/keyboard/discover");
    assert_eq!(discover.plugin(), "keyboard");
}

#[rstest]
#[tokio::test]
async fn post_route_answers_with_placeholder(keyboard_workspace: Workspace) {
    let executor = EchoExecutor::default();
    let (router, _) = router_with(&keyboard_workspace, executor.clone());

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/system/plugins/hardware/keyboard/apply")
        .body(Body::empty())
        .expect("build request");
    let response = router.oneshot(request).await.expect("route request");

    assert_eq!(response.status(), StatusCode::OK);
    let body = response
        .into_body()
        .collect()
        .await
        .expect("collect body")
        .to_bytes();
    assert_eq!(
        parse(&body),
        json!({"status": "accepted", "message": "POST handling not yet implemented"})
    );
    assert!(executor.calls().is_empty(), "POST must not invoke plugins");
}

#[rstest]
#[tokio::test]
async fn unsupported_method_suffix_is_silently_skipped(keyboard_workspace: Workspace) {
    let (router, plans) = router_with(&keyboard_workspace, EchoExecutor::default());

    assert_eq!(plans.len(), 2, "only GET and POST suffixes bind");
    assert!(plans.iter().all(|plan| !plan.path().ends_with("/purge")));

    let (status, _) = get(router, "/api/v1/system/plugins/hardware/keyboard/purge").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn disabled_record_binds_no_routes() {
    let workspace = workspace_with(KEYBOARD_DESCRIPTOR, false);
    let (router, plans) = router_with(&workspace, EchoExecutor::default());

    assert!(plans.is_empty());
    let (status, _) = get(
        router,
        "/api/v1/system/plugins/hardware/keyboard/discover",
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn disallowed_mount_point_skips_only_that_plugin() {
    let dir = TempDir::new().expect("create temp dir");
    let good = dir.path().join("keyboard.json");
    std::fs::write(&good, KEYBOARD_DESCRIPTOR).expect("write descriptor");
    let bad = dir.path().join("rogue.json");
    std::fs::write(
        &bad,
        r#"{"apiMountPoint": "/sys", "apiName": "rogue", "apiPaths": {"/discover": {"method": "GET"}}}"#,
    )
    .expect("write descriptor");

    let registry = PluginRegistry::new(vec![
        PluginRecord::new("rogue", "/plugins/rogue", &bad, true),
        PluginRecord::new("keyboard", "/plugins/keyboard", &good, true),
    ]);

    let reporter = RecordingReporter::default();
    let (router, plans) = build_router(
        &Config::default(),
        &registry,
        EchoExecutor::default(),
        &reporter,
    );

    assert_eq!(reporter.skipped(), vec!["rogue".to_owned()]);
    assert_eq!(reporter.bound(), vec![("keyboard".to_owned(), 2)]);
    assert!(plans.iter().all(|plan| plan.plugin() == "keyboard"));

    let (status, _) = get(
        router.clone(),
        "/api/v1/system/plugins/hardware/keyboard/discover",
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = get(router, "/api/v1/system/plugins/sys/rogue/discover").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn missing_descriptor_skips_plugin() {
    let dir = TempDir::new().expect("create temp dir");
    let registry = PluginRegistry::new(vec![PluginRecord::new(
        "keyboard",
        "/plugins/keyboard",
        dir.path().join("absent.json"),
        true,
    )]);

    let reporter = RecordingReporter::default();
    let (_, plans) = build_router(
        &Config::default(),
        &registry,
        EchoExecutor::default(),
        &reporter,
    );

    assert!(plans.is_empty());
    assert_eq!(reporter.skipped(), vec!["keyboard".to_owned()]);
}

#[tokio::test]
async fn colliding_route_paths_skip_the_later_plugin() {
    let dir = TempDir::new().expect("create temp dir");
    let meta = dir.path().join("keyboard.json");
    std::fs::write(&meta, KEYBOARD_DESCRIPTOR).expect("write descriptor");

    // Same descriptor, distinct record names: identical route paths.
    let registry = PluginRegistry::new(vec![
        PluginRecord::new("keyboard", "/plugins/keyboard", &meta, true),
        PluginRecord::new("keyboard-clone", "/plugins/keyboard-clone", &meta, true),
    ]);

    let reporter = RecordingReporter::default();
    let (router, plans) = build_router(
        &Config::default(),
        &registry,
        EchoExecutor::default(),
        &reporter,
    );

    assert_eq!(reporter.bound(), vec![("keyboard".to_owned(), 2)]);
    assert_eq!(reporter.skipped(), vec!["keyboard-clone".to_owned()]);
    assert!(plans.iter().all(|plan| plan.plugin() == "keyboard"));

    let (status, _) = get(
        router,
        "/api/v1/system/plugins/hardware/keyboard/discover",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Startup executable audit
// ---------------------------------------------------------------------------

#[test]
fn audit_reports_missing_directory_and_executable() {
    let dir = TempDir::new().expect("create temp dir");
    let invoker = PluginInvoker::new(EchoExecutor::default(), "");

    let absent = PluginRecord::new(
        "keyboard",
        dir.path().join("not-installed"),
        "/unused/meta.json",
        true,
    );
    assert_eq!(
        audit_executable(&invoker, &absent),
        ExecutableAudit {
            directory_present: false,
            executable_present: false,
        }
    );

    let plugin_dir = dir.path().join("keyboard");
    std::fs::create_dir(&plugin_dir).expect("create plugin dir");
    let installed_dir_only = PluginRecord::new("keyboard", &plugin_dir, "/unused/meta.json", true);
    assert_eq!(
        audit_executable(&invoker, &installed_dir_only),
        ExecutableAudit {
            directory_present: true,
            executable_present: false,
        }
    );

    std::fs::write(plugin_dir.join("keyboard.plugin"), b"#!/bin/sh\n").expect("write executable");
    let installed = PluginRecord::new("keyboard", &plugin_dir, "/unused/meta.json", true);
    assert_eq!(
        audit_executable(&invoker, &installed),
        ExecutableAudit {
            directory_present: true,
            executable_present: true,
        }
    );
}

// ---------------------------------------------------------------------------
// Failure translation
// ---------------------------------------------------------------------------

#[rstest]
#[tokio::test]
async fn non_zero_exit_yields_generic_internal_error(keyboard_workspace: Workspace) {
    let (router, _) = router_with(&keyboard_workspace, FailingExecutor);

    let (status, body) = get(
        router,
        "/api/v1/system/plugins/hardware/keyboard/discover",
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(parse(&body), json!({"error": "internal server error"}));
}

#[rstest]
#[tokio::test]
async fn malformed_plugin_output_yields_generic_internal_error(keyboard_workspace: Workspace) {
    let (router, _) = router_with(&keyboard_workspace, GarbageExecutor);

    let (status, body) = get(
        router,
        "/api/v1/system/plugins/hardware/keyboard/discover",
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(parse(&body), json!({"error": "internal server error"}));
}
