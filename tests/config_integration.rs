use chatbot_widget::chat::controller::DEFAULT_ENDPOINT_URL;
use chatbot_widget::config::AppConfig;
use serial_test::serial;
use std::env;
use std::io::Write;
use std::time::Duration;

// Helper to clear environment variables that might interfere with tests
fn clear_env_vars() {
    unsafe {
        for key in [
            "CHATBOT_CONFIG_FILE",
            "CHATBOT_URL",
            "CHATBOT_TIMEOUT_SECS",
            "CHATBOT_SESSION_FILE",
            "CHATBOT_START_OPEN",
            "CHATBOT_WIDGET__ENDPOINT_URL",
            "CHATBOT_WIDGET__REQUEST_TIMEOUT_SECS",
            "CHATBOT_WIDGET__TITLE",
            "CHATBOT_STORAGE__SESSION_FILE",
        ] {
            env::remove_var(key);
        }
    }
}

#[test]
#[serial]
fn test_default_config() {
    clear_env_vars();

    let config = AppConfig::load_from_args(["chatbot-widget"]).expect("defaults should load");
    assert_eq!(config.widget.endpoint_url, DEFAULT_ENDPOINT_URL);
    assert_eq!(config.widget.request_timeout_secs, 30);
    assert_eq!(config.widget.title, "Chat with RK Nature");
    assert!(config.widget.start_open);
    assert!(config.storage.session_file.is_none());
    assert!(!config.no_color);
}

#[test]
#[serial]
fn test_env_override() {
    clear_env_vars();
    unsafe {
        env::set_var(
            "CHATBOT_WIDGET__ENDPOINT_URL",
            "http://localhost:5000/submit_query",
        );
        env::set_var("CHATBOT_WIDGET__REQUEST_TIMEOUT_SECS", "12");
    }

    let config = AppConfig::load_from_args(["chatbot-widget"]).expect("Failed to load config");
    assert_eq!(
        config.widget.endpoint_url,
        "http://localhost:5000/submit_query"
    );
    assert_eq!(config.widget.request_timeout_secs, 12);

    clear_env_vars();
}

#[test]
#[serial]
fn test_cli_beats_env() {
    clear_env_vars();
    unsafe {
        env::set_var("CHATBOT_WIDGET__ENDPOINT_URL", "http://from-env/submit_query");
    }

    let config = AppConfig::load_from_args([
        "chatbot-widget",
        "--url",
        "http://from-cli/submit_query",
        "--timeout-secs",
        "3",
        "--session-file",
        "/tmp/chatbot-session.json",
        "--no-color",
    ])
    .expect("Failed to load config");

    assert_eq!(config.widget.endpoint_url, "http://from-cli/submit_query");
    assert_eq!(
        config.controller().request_timeout,
        Duration::from_secs(3)
    );
    assert_eq!(
        config.storage.session_file.as_deref(),
        Some("/tmp/chatbot-session.json")
    );
    assert!(config.no_color);

    clear_env_vars();
}

#[test]
#[serial]
fn test_file_load() {
    clear_env_vars();

    let mut file = tempfile::Builder::new()
        .suffix(".yaml")
        .tempfile()
        .expect("Failed to create temp config");
    write!(
        file,
        r#"
widget:
  endpoint_url: "https://shop.example/submit_query"
  request_timeout_secs: 8
  title: "Ask the shop"
storage:
  session_file: "session.json"
"#
    )
    .unwrap();

    let path = file.path().to_str().unwrap().to_string();
    let config = AppConfig::load_from_args(["chatbot-widget", "--config", &path])
        .expect("Failed to load config file");

    assert_eq!(
        config.widget.endpoint_url,
        "https://shop.example/submit_query"
    );
    assert_eq!(config.widget.request_timeout_secs, 8);
    assert_eq!(config.chrome().title, "Ask the shop");
    // Untouched keys keep their defaults.
    assert_eq!(config.chrome().footer, "Powered by R K Nature");
    assert_eq!(config.storage.session_file.as_deref(), Some("session.json"));
}

#[test]
#[serial]
fn test_missing_config_file() {
    clear_env_vars();

    let result = AppConfig::load_from_args([
        "chatbot-widget",
        "--config",
        "/nonexistent/chatbot.yaml",
    ]);
    assert!(result.is_err());
}

#[test]
#[serial]
fn test_invalid_values_rejected() {
    clear_env_vars();

    assert!(AppConfig::load_from_args(["chatbot-widget", "--timeout-secs", "0"]).is_err());
    assert!(AppConfig::load_from_args(["chatbot-widget", "--url", "not a url"]).is_err());
}
