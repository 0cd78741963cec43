use std::collections::HashMap;

use super::*;

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

fn with_token(host: &str) -> Settings {
    Settings {
        host: host.to_string(),
        token: Some("squ_test".into()),
        ..Settings::default()
    }
}

#[test]
fn missing_settings_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let settings = read_settings_file(&dir.path().join("absent.toml")).expect("defaults");
    assert_eq!(settings, Settings::default());
    assert_eq!(settings.host, "http://127.0.0.1:9000");
}

#[test]
fn reads_settings_file_with_partial_keys() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(DEFAULT_SETTINGS_FILE);
    fs::write(
        &path,
        "host = \"https://sonar.example.com\"\nuser = \"admin\"\npass = \"secret\"\n",
    )
    .expect("write settings");

    let settings = read_settings_file(&path).expect("parse");
    assert_eq!(settings.host, "https://sonar.example.com");
    assert_eq!(settings.user.as_deref(), Some("admin"));
    assert_eq!(settings.pass.as_deref(), Some("secret"));
    assert_eq!(settings.token, None);
    assert!(!settings.tls_insecure_skip_verify);
}

#[test]
fn malformed_settings_file_is_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(DEFAULT_SETTINGS_FILE);
    fs::write(&path, "host = [").expect("write settings");

    let err = read_settings_file(&path).expect_err("must fail");
    assert!(err.to_string().contains("failed to parse settings file"));
}

#[test]
fn environment_overrides_file_values() {
    let mut settings = Settings {
        host: "https://from-file".into(),
        user: Some("file-user".into()),
        ..Settings::default()
    };

    apply_env_overrides(
        &mut settings,
        env(&[
            ("SONARQUBE_HOST", "https://legacy"),
            ("SONAR_HOST", "https://from-env"),
            ("SONAR_TOKEN", "squ_env"),
            ("SONAR_TLS_INSECURE_SKIP_VERIFY", "true"),
        ]),
    );

    assert_eq!(settings.host, "https://from-env");
    assert_eq!(settings.user.as_deref(), Some("file-user"));
    assert_eq!(settings.token.as_deref(), Some("squ_env"));
    assert!(settings.tls_insecure_skip_verify);
}

#[test]
fn ignores_unparseable_tls_flag() {
    let mut settings = Settings {
        tls_insecure_skip_verify: true,
        ..Settings::default()
    };
    apply_env_overrides(&mut settings, env(&[("SONAR_TLS_INSECURE_SKIP_VERIFY", "maybe")]));
    assert!(settings.tls_insecure_skip_verify);
}

#[test]
fn prefers_token_over_basic_credentials() {
    let settings = Settings {
        user: Some("admin".into()),
        pass: Some("secret".into()),
        ..with_token("http://localhost:9000")
    };
    let config = ProviderConfiguration::new(&settings).expect("config");
    assert_eq!(config.credentials(), &Credentials::Token("squ_test".into()));
}

#[test]
fn uses_basic_credentials_without_token() {
    let settings = Settings {
        user: Some("admin".into()),
        pass: Some("secret".into()),
        ..Settings::default()
    };
    let config = ProviderConfiguration::new(&settings).expect("config");
    assert_eq!(
        config.credentials(),
        &Credentials::Basic {
            user: "admin".into(),
            pass: "secret".into(),
        }
    );
}

#[test]
fn rejects_missing_credentials() {
    let settings = Settings {
        user: Some("admin".into()),
        token: Some(String::new()),
        ..Settings::default()
    };
    let err = ProviderConfiguration::new(&settings).expect_err("must fail");
    assert!(matches!(err, ClientError::MissingCredentials));
}

#[test]
fn rejects_hosts_that_are_not_http_urls() {
    for host in ["not a url", "ftp://sonar.example.com", "sonar.example.com:9000"] {
        let err = ProviderConfiguration::new(&with_token(host)).expect_err(host);
        assert!(matches!(err, ClientError::InvalidHost { .. }), "{host}: {err}");
    }
}

#[test]
fn endpoint_resolves_under_host_root() {
    let config = ProviderConfiguration::new(&with_token("http://localhost:9000")).expect("config");
    assert_eq!(
        config.endpoint("api/qualitygates/select").as_str(),
        "http://localhost:9000/api/qualitygates/select"
    );
}

#[test]
fn endpoint_keeps_context_path_and_drops_query() {
    for host in [
        "https://ci.example.com/sonar",
        "https://ci.example.com/sonar/",
        "https://ci.example.com/sonar/?foo=bar",
    ] {
        let config = ProviderConfiguration::new(&with_token(host)).expect("config");
        assert_eq!(
            config.endpoint("api/qualitygates/search").as_str(),
            "https://ci.example.com/sonar/api/qualitygates/search",
            "{host}"
        );
    }
}

#[test]
fn debug_output_redacts_secrets() {
    let settings = Settings {
        user: Some("admin".into()),
        pass: Some("hunter2".into()),
        token: Some("squ_secret".into()),
        ..Settings::default()
    };
    let rendered = format!("{settings:?}");
    assert!(!rendered.contains("hunter2"));
    assert!(!rendered.contains("squ_secret"));

    let config = ProviderConfiguration::new(&settings).expect("config");
    assert!(!format!("{config:?}").contains("squ_secret"));
}
