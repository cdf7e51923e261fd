use super::{apply_env, apply_file, load_settings, Settings};

use std::{
    collections::HashMap,
    env, fs,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name| map.get(name).cloned()
}

#[test]
fn file_values_override_defaults() {
    let mut settings = Settings::default();
    apply_file(
        &mut settings,
        r#"
service_url = "https://packs.example"
session = "npub1xyz"
search_limit = 5
request_timeout_secs = 3
"#,
    );

    assert_eq!(settings.service_url, "https://packs.example");
    assert_eq!(settings.session_identity.as_deref(), Some("npub1xyz"));
    assert_eq!(settings.search_limit, 5);
    assert_eq!(settings.request_timeout(), Duration::from_secs(3));
    assert_eq!(settings.nip05_scheme, "https");
}

#[test]
fn malformed_file_is_ignored() {
    let mut settings = Settings::default();
    apply_file(&mut settings, "service_url = [unterminated");
    assert_eq!(settings, Settings::default());
}

#[test]
fn app_prefixed_env_wins_over_plain_env() {
    let mut settings = Settings::default();
    apply_env(
        &mut settings,
        env_from(&[
            ("FOLLOWPACK_SERVICE_URL", "http://plain"),
            ("APP__SERVICE_URL", "http://app"),
            ("APP__SEARCH_LIMIT", "7"),
        ]),
    );
    assert_eq!(settings.service_url, "http://app");
    assert_eq!(settings.search_limit, 7);
}

#[test]
fn unparsable_numeric_env_keeps_previous_value() {
    let mut settings = Settings::default();
    apply_env(
        &mut settings,
        env_from(&[
            ("APP__REQUEST_TIMEOUT_SECS", "soon"),
            ("APP__SEARCH_LIMIT", "lots"),
        ]),
    );
    assert_eq!(settings.request_timeout_secs, 10);
    assert_eq!(settings.search_limit, Settings::default().search_limit);
}

#[test]
fn zero_timeout_is_clamped() {
    let settings = Settings {
        request_timeout_secs: 0,
        ..Settings::default()
    };
    assert_eq!(settings.request_timeout(), Duration::from_secs(1));
}

#[test]
fn load_settings_reads_file_from_disk() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let temp_root = env::temp_dir().join(format!("followpack_settings_test_{suffix}"));
    fs::create_dir_all(&temp_root).expect("temp root");
    let path = temp_root.join("followpack.toml");
    fs::write(&path, "nip05_scheme = \"http\"\n").expect("write settings");

    let settings = load_settings(&path);
    assert_eq!(settings.nip05_scheme, "http");

    fs::remove_dir_all(temp_root).expect("cleanup");
}
