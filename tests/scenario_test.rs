use std::fs;

use rukite::ScenarioContext;
use rukite::http::Client;
use rukite::runner::{CommandOutcome, RunSummary, ScenarioExecutor};
use rukite::scenario::ScenarioLoader;
use rukite::variable::ConfigLoader;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn write_config(dir: &TempDir, server: &MockServer) -> std::path::PathBuf {
    let config = format!(
        r#"
default_service = "api"

[services.api]
base_uri = "{}"
base_path = "/api"

[settings]
logRequest = "false"
token = "base-token"

[environments.dev]
token = "dev-token"
"#,
        server.uri()
    );
    let config_path = dir.path().join(ConfigLoader::CONFIG_FILE);
    fs::write(&config_path, config).unwrap();
    config_path
}

/// 配置文件 + 场景文件的完整流程
#[tokio::test]
async fn test_scenario_end_to_end() {
    let server = MockServer::start().await;
    let location = format!("{}/api/users/7", server.uri());

    Mock::given(method("POST"))
        .and(path("/api/users"))
        .and(header("Authorization", "dev-token"))
        .respond_with(
            ResponseTemplate::new(201)
                .insert_header("Location", location.as_str())
                .set_body_json(json!({"id": 7, "name": "alice"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/users/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 7, "name": "alice"})))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/users/7"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config_path = write_config(&dir, &server);
    let scenario_path = dir.path().join("users.json");
    fs::write(
        &scenario_path,
        r#"{
  "description": "User lifecycle",
  "variables": { "userName": "alice" },
  "commands": [
    {
      "name": "create",
      "verb": "POST",
      "uri": "/users",
      "headers": { "Authorization": "{{token}}" },
      "body": { "name": "{{userName}}" }
    },
    {
      "name": "fetch",
      "verb": "GET",
      "uri": "{{location:create}}",
      "checks": [
        { "description": "same id", "field": "$.id", "expected": "{{lookup:create:$.id}}" },
        { "description": "name", "field": "$.name", "operator": "contains", "expected": "ali" }
      ]
    },
    { "verb": "GET", "uri": "/disabled", "disabled": true },
    { "verb": "DELETE", "uri": "/users/7" }
  ]
}"#,
    )
    .unwrap();

    let config = ConfigLoader::load_from_path(&config_path).unwrap();
    let settings = ConfigLoader::build_settings(&config, Some("dev"), &[]).unwrap();
    let registry = ConfigLoader::build_registry(&config).unwrap();
    let scenario = ScenarioLoader::load_file(&scenario_path).unwrap();

    let mut context = ScenarioContext::new(registry).with_variables(settings);
    let results = ScenarioExecutor::new(Client::new().unwrap())
        .execute_all(&scenario, &mut context)
        .await;

    let outcomes: Vec<_> = results.iter().map(|r| r.outcome.clone()).collect();
    assert_eq!(
        outcomes,
        vec![
            CommandOutcome::Passed,
            CommandOutcome::Passed,
            CommandOutcome::Skipped,
            CommandOutcome::Passed,
        ]
    );
    assert_eq!(context.location("create"), Some(location.as_str()));

    let summary = RunSummary::from_results(&results);
    assert!(summary.is_success());
    assert_eq!(summary.skipped, 1);
}

/// 第一条失败的命令之后不再执行
#[tokio::test]
async fn test_scenario_stops_at_first_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/users"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config_path = write_config(&dir, &server);
    let config = ConfigLoader::load_from_path(&config_path).unwrap();

    let scenario = ScenarioLoader::parse_content(
        r#"{
  "commands": [
    { "name": "health", "description": "Service is up", "verb": "GET", "uri": "/health" },
    { "verb": "GET", "uri": "/users" }
  ]
}"#,
    )
    .unwrap();

    let mut context = ScenarioContext::new(ConfigLoader::build_registry(&config).unwrap())
        .with_variables(ConfigLoader::build_settings(&config, None, &[]).unwrap());
    let results = ScenarioExecutor::new(Client::new().unwrap())
        .execute_all(&scenario, &mut context)
        .await;

    assert_eq!(
        results[0].error(),
        Some("Service is up | 200 expected but 503 received.")
    );
    assert_eq!(results[1].outcome, CommandOutcome::NotRun);

    let summary = RunSummary::from_results(&results);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.not_run, 1);
    assert!(!summary.is_success());
}

/// 场景变量覆盖配置中的设置
#[tokio::test]
async fn test_scenario_variables_override_settings() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/me"))
        .and(header("Authorization", "scenario-token"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = ConfigLoader::load_from_path(write_config(&dir, &server)).unwrap();
    let scenario = ScenarioLoader::parse_content(
        r#"{
  "variables": { "token": "scenario-token" },
  "commands": [
    { "verb": "get", "uri": "/me", "headers": { "Authorization": "{{token}}" } }
  ]
}"#,
    )
    .unwrap();

    let mut context = ScenarioContext::new(ConfigLoader::build_registry(&config).unwrap())
        .with_variables(ConfigLoader::build_settings(&config, None, &[]).unwrap());
    let results = ScenarioExecutor::new(Client::new().unwrap())
        .execute_all(&scenario, &mut context)
        .await;

    assert_eq!(results[0].outcome, CommandOutcome::Passed);
    assert_eq!(results[0].verb, "GET");
}
