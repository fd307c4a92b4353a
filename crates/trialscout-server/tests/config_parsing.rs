use std::{env, fs};

use trialscout_server::config::loader::load_config;

#[test]
fn config_parsing_and_env_overrides_and_validation() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = dir.path().join("trialscout.toml");

    let toml_content = r#"
[server]
host = "127.0.0.1"
port = 8081

[registry]
base_url = "http://localhost:9999/api/v2"
page_size = 10
candidate_timeout_ms = 2500

[analyzer]
api_key = "sk-from-file"
model = "gpt-4o-mini"
temperature = 0.2

[transcripts]
transcripts_path = "fixtures/transcripts.json"
messages_path = "fixtures/messages.json"

[logging]
level = "debug"
ansi = false
"#;
    fs::write(&path, toml_content).expect("write toml");

    // 1) Valid config parses
    let cfg = load_config(path.to_str()).expect("should parse config");
    assert_eq!(cfg.server.port, 8081);
    assert_eq!(cfg.registry.page_size, 10);
    assert_eq!(cfg.registry.sort, "@relevance");
    assert!(cfg.registry.count_total);
    assert_eq!(cfg.registry.candidate_timeout_ms, Some(2500));
    assert_eq!(cfg.analyzer.api_key.as_deref(), Some("sk-from-file"));
    assert_eq!(cfg.analyzer.model.as_deref(), Some("gpt-4o-mini"));
    assert_eq!(cfg.analyzer.store, None);
    assert_eq!(cfg.transcripts.messages_path, "fixtures/messages.json");
    assert_eq!(cfg.logging.level.to_ascii_lowercase(), "debug");
    assert!(!cfg.logging.ansi);

    // 2) Env override should win over file
    unsafe {
        env::set_var("TRIALSCOUT__REGISTRY__PAGE_SIZE", "25");
    }
    let cfg_env = load_config(path.to_str()).expect("should parse config with env overrides");
    assert_eq!(cfg_env.registry.page_size, 25);
    unsafe {
        env::remove_var("TRIALSCOUT__REGISTRY__PAGE_SIZE");
    }

    // 3) OPENAI_API_KEY fills a missing key only
    let keyless = dir.path().join("keyless.toml");
    fs::write(&keyless, "[server]\nport = 8082\n").expect("write keyless toml");
    unsafe {
        env::set_var("OPENAI_API_KEY", "sk-from-env");
    }
    let cfg_key = load_config(keyless.to_str()).expect("keyless config");
    assert_eq!(cfg_key.analyzer.api_key.as_deref(), Some("sk-from-env"));
    let cfg_file_key = load_config(path.to_str()).expect("config with key");
    assert_eq!(cfg_file_key.analyzer.api_key.as_deref(), Some("sk-from-file"));
    unsafe {
        env::remove_var("OPENAI_API_KEY");
    }

    // 4) Invalid config should error
    let invalid_path = dir.path().join("invalid.toml");
    let invalid_toml = r#"
[registry]
page_size = 5000
"#;
    fs::write(&invalid_path, invalid_toml).expect("write invalid toml");
    let err = load_config(invalid_path.to_str()).expect_err("expected validation error");
    assert!(err.contains("page_size must be between"));

    // 5) Missing file falls back to defaults
    let missing = dir.path().join("missing.toml");
    let cfg_default = load_config(missing.to_str()).expect("defaults");
    assert_eq!(cfg_default.server.port, 3000);
    assert_eq!(cfg_default.registry.base_url, "https://clinicaltrials.gov/api/v2");
}
