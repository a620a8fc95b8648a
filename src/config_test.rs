use std::collections::HashMap;

use super::*;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();
    move |key| map.get(key).cloned()
}

#[test]
fn from_lookup_defaults() {
    let cfg = ClientConfig::from_lookup(lookup_from(&[("BOOKSHARE_TOKEN_PATH", "/tmp/bookshare/slot")])).unwrap();
    assert_eq!(cfg.api_url, DEFAULT_API_URL);
    assert_eq!(cfg.token_path, PathBuf::from("/tmp/bookshare/slot"));
    assert_eq!(cfg.timeouts, Timeouts::default());
}

#[test]
fn from_lookup_trims_trailing_slash_from_api_url() {
    let cfg = ClientConfig::from_lookup(lookup_from(&[
        ("BOOKSHARE_API_URL", "https://books.example.test/"),
        ("BOOKSHARE_TOKEN_PATH", "/tmp/slot"),
    ]))
    .unwrap();
    assert_eq!(cfg.api_url, "https://books.example.test");
}

#[test]
fn from_lookup_rejects_url_without_scheme() {
    let err = ClientConfig::from_lookup(lookup_from(&[
        ("BOOKSHARE_API_URL", "books.example.test"),
        ("BOOKSHARE_TOKEN_PATH", "/tmp/slot"),
    ]))
    .unwrap_err();
    assert!(err.to_string().contains("BOOKSHARE_API_URL"));
}

#[test]
fn from_lookup_rejects_url_without_host() {
    let err = ClientConfig::from_lookup(lookup_from(&[
        ("BOOKSHARE_API_URL", "http://"),
        ("BOOKSHARE_TOKEN_PATH", "/tmp/slot"),
    ]))
    .unwrap_err();
    assert!(err.to_string().contains("missing host"));
}

#[test]
fn from_lookup_parses_timeouts() {
    let cfg = ClientConfig::from_lookup(lookup_from(&[
        ("BOOKSHARE_TOKEN_PATH", "/tmp/slot"),
        ("BOOKSHARE_REQUEST_TIMEOUT_SECS", "30"),
        ("BOOKSHARE_CONNECT_TIMEOUT_SECS", " 5 "),
    ]))
    .unwrap();
    assert_eq!(
        cfg.timeouts,
        Timeouts { request: Some(Duration::from_secs(30)), connect: Some(Duration::from_secs(5)) }
    );
}

#[test]
fn zero_timeout_means_disabled() {
    let cfg = ClientConfig::from_lookup(lookup_from(&[
        ("BOOKSHARE_TOKEN_PATH", "/tmp/slot"),
        ("BOOKSHARE_REQUEST_TIMEOUT_SECS", "0"),
    ]))
    .unwrap();
    assert_eq!(cfg.timeouts.request, None);
}

#[test]
fn invalid_timeout_errors() {
    let err = ClientConfig::from_lookup(lookup_from(&[
        ("BOOKSHARE_TOKEN_PATH", "/tmp/slot"),
        ("BOOKSHARE_CONNECT_TIMEOUT_SECS", "soon"),
    ]))
    .unwrap_err();
    assert!(err.to_string().contains("BOOKSHARE_CONNECT_TIMEOUT_SECS"));
}

#[test]
fn default_token_path_ends_with_token_key() {
    if let Ok(path) = default_token_path() {
        assert!(path.ends_with(PathBuf::from("bookshare").join(TOKEN_KEY)));
    }
}

#[test]
fn overrides_take_precedence_over_lookup() {
    let overrides = Overrides {
        api_url: Some("http://localhost:8080/".to_owned()),
        token_path: Some(PathBuf::from("/tmp/override/slot")),
    };
    let cfg = ClientConfig::from_lookup_with(
        lookup_from(&[
            ("BOOKSHARE_API_URL", "https://books.example.test"),
            ("BOOKSHARE_TOKEN_PATH", "/tmp/slot"),
        ]),
        &overrides,
    )
    .unwrap();
    assert_eq!(cfg.api_url, "http://localhost:8080");
    assert_eq!(cfg.token_path, PathBuf::from("/tmp/override/slot"));
}

#[test]
fn override_shadows_malformed_variable() {
    let overrides = Overrides { api_url: Some("http://localhost:8080".to_owned()), token_path: None };
    let cfg = ClientConfig::from_lookup_with(
        lookup_from(&[("BOOKSHARE_API_URL", "not a url"), ("BOOKSHARE_TOKEN_PATH", "/tmp/slot")]),
        &overrides,
    )
    .unwrap();
    assert_eq!(cfg.api_url, "http://localhost:8080");
}

#[test]
fn malformed_override_is_rejected() {
    let overrides = Overrides { api_url: Some("ftp://nope".to_owned()), token_path: None };
    let err = ClientConfig::from_lookup_with(lookup_from(&[("BOOKSHARE_TOKEN_PATH", "/tmp/slot")]), &overrides)
        .unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { var: "BOOKSHARE_API_URL", .. }));
}

#[test]
fn empty_overrides_fall_back_to_lookup() {
    let cfg = ClientConfig::from_lookup_with(
        lookup_from(&[("BOOKSHARE_API_URL", "https://books.example.test"), ("BOOKSHARE_TOKEN_PATH", "/tmp/slot")]),
        &Overrides::default(),
    )
    .unwrap();
    assert_eq!(cfg.api_url, "https://books.example.test");
    assert_eq!(cfg.token_path, PathBuf::from("/tmp/slot"));
}

#[test]
fn http_client_builds_with_timeouts() {
    let cfg = ClientConfig {
        api_url: DEFAULT_API_URL.to_owned(),
        token_path: PathBuf::from("/tmp/slot"),
        timeouts: Timeouts { request: Some(Duration::from_secs(1)), connect: Some(Duration::from_secs(1)) },
    };
    assert!(cfg.http_client().is_ok());
}
