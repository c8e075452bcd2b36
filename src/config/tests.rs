use super::*;
use serial_test::serial;
use std::env;

fn with_env_vars<F, R>(vars: &[(&str, &str)], f: F) -> R
where
    F: FnOnce() -> R,
{
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for (key, value) in vars {
        unsafe { env::set_var(key, value) };
    }

    let result = f();

    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for (key, _) in vars {
        unsafe { env::remove_var(key) };
    }

    result
}

fn clear_matchscore_env() {
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    unsafe {
        env::remove_var("MATCHSCORE_CACHE_TTL_SECS");
        env::remove_var("MATCHSCORE_CACHE_MAX_SIZE");
        env::remove_var("MATCHSCORE_SIGMOID_X0");
        env::remove_var("MATCHSCORE_SIGMOID_K");
        env::remove_var("MATCHSCORE_EMBEDDING_TIMEOUT_SECS");
        env::remove_var("MATCHSCORE_MAX_RETRIES");
        env::remove_var("MATCHSCORE_RETRY_BASE_DELAY_MS");
        env::remove_var("MATCHSCORE_RETRY_MAX_DELAY_MS");
        env::remove_var("MATCHSCORE_EMBEDDING_URL");
        env::remove_var("MATCHSCORE_EMBEDDING_MODEL");
        env::remove_var("MATCHSCORE_EMBEDDING_API_KEY");
    }
}

#[test]
fn test_default_config() {
    let config = Config::default();

    assert_eq!(config.cache_ttl, Duration::from_secs(3600));
    assert_eq!(config.cache_max_size, 1000);
    assert_eq!(config.sigmoid_x0, 0.373);
    assert_eq!(config.sigmoid_k, 15.0);
    assert_eq!(config.embedding_timeout, Duration::from_secs(30));
    assert_eq!(config.max_retries, 3);
    assert_eq!(config.retry_base_delay, Duration::from_secs(1));
    assert_eq!(config.retry_max_delay, Duration::from_secs(8));
    assert!(config.embedding_url.is_none());
    assert_eq!(config.embedding_model, "text-embedding-3-small");
    assert!(config.validate().is_ok());
}

#[test]
fn test_derived_views() {
    let config = Config {
        sigmoid_x0: 0.4,
        sigmoid_k: 12.0,
        max_retries: 5,
        retry_base_delay: Duration::from_millis(250),
        retry_max_delay: Duration::from_secs(2),
        ..Default::default()
    };

    assert_eq!(config.sigmoid_params(), SigmoidParams::new(0.4, 12.0));

    let policy = config.retry_policy();
    assert_eq!(policy.max_attempts, 5);
    assert_eq!(policy.base_delay, Duration::from_millis(250));
    assert_eq!(policy.max_delay, Duration::from_secs(2));
}

#[test]
fn test_http_gateway_config_only_with_url() {
    assert!(Config::default().http_gateway_config().is_none());

    let config = Config {
        embedding_url: Some("http://localhost:9000/v1/embeddings".to_string()),
        embedding_api_key: Some("secret".to_string()),
        ..Default::default()
    };
    let http = config.http_gateway_config().expect("url is set");

    assert_eq!(http.url, "http://localhost:9000/v1/embeddings");
    assert_eq!(http.model, "text-embedding-3-small");
    assert_eq!(http.api_key.as_deref(), Some("secret"));
    assert_eq!(http.request_timeout, Duration::from_secs(30));
}

#[test]
#[serial]
fn test_from_env_with_defaults() {
    clear_matchscore_env();

    let config = Config::from_env().expect("should parse with defaults");

    assert_eq!(config, Config::default());
}

#[test]
#[serial]
fn test_from_env_overrides() {
    clear_matchscore_env();

    with_env_vars(
        &[
            ("MATCHSCORE_CACHE_TTL_SECS", "120"),
            ("MATCHSCORE_CACHE_MAX_SIZE", "50"),
            ("MATCHSCORE_SIGMOID_X0", "0.4"),
            ("MATCHSCORE_SIGMOID_K", "10"),
            ("MATCHSCORE_EMBEDDING_TIMEOUT_SECS", "5"),
            ("MATCHSCORE_MAX_RETRIES", "4"),
            ("MATCHSCORE_RETRY_BASE_DELAY_MS", "100"),
            ("MATCHSCORE_RETRY_MAX_DELAY_MS", "400"),
            ("MATCHSCORE_EMBEDDING_URL", " https://api.example.com/v1/embeddings "),
            ("MATCHSCORE_EMBEDDING_MODEL", "custom-model"),
            ("MATCHSCORE_EMBEDDING_API_KEY", "key"),
        ],
        || {
            let config = Config::from_env().expect("should parse");

            assert_eq!(config.cache_ttl, Duration::from_secs(120));
            assert_eq!(config.cache_max_size, 50);
            assert_eq!(config.sigmoid_x0, 0.4);
            assert_eq!(config.sigmoid_k, 10.0);
            assert_eq!(config.embedding_timeout, Duration::from_secs(5));
            assert_eq!(config.max_retries, 4);
            assert_eq!(config.retry_base_delay, Duration::from_millis(100));
            assert_eq!(config.retry_max_delay, Duration::from_millis(400));
            assert_eq!(
                config.embedding_url.as_deref(),
                Some("https://api.example.com/v1/embeddings")
            );
            assert_eq!(config.embedding_model, "custom-model");
            assert_eq!(config.embedding_api_key.as_deref(), Some("key"));
            assert!(config.validate().is_ok());
        },
    );
}

#[test]
#[serial]
fn test_from_env_invalid_number() {
    clear_matchscore_env();

    with_env_vars(&[("MATCHSCORE_CACHE_MAX_SIZE", "lots")], || {
        let err = Config::from_env().unwrap_err();
        match err {
            ConfigError::InvalidValue { name, value, .. } => {
                assert_eq!(name, "MATCHSCORE_CACHE_MAX_SIZE");
                assert_eq!(value, "lots");
            }
            other => panic!("unexpected error: {other}"),
        }
    });
}

#[test]
#[serial]
fn test_from_env_blank_strings_are_unset() {
    clear_matchscore_env();

    with_env_vars(
        &[
            ("MATCHSCORE_EMBEDDING_URL", "   "),
            ("MATCHSCORE_EMBEDDING_MODEL", ""),
        ],
        || {
            let config = Config::from_env().expect("should parse");
            assert!(config.embedding_url.is_none());
            assert_eq!(config.embedding_model, "text-embedding-3-small");
        },
    );
}

#[test]
#[serial]
fn test_from_env_blank_numbers_are_unset() {
    clear_matchscore_env();

    with_env_vars(
        &[
            ("MATCHSCORE_CACHE_MAX_SIZE", ""),
            ("MATCHSCORE_SIGMOID_K", "  "),
            ("MATCHSCORE_MAX_RETRIES", "\t"),
        ],
        || {
            let config = Config::from_env().expect("should parse");
            assert_eq!(config.cache_max_size, 1000);
            assert_eq!(config.sigmoid_k, 15.0);
            assert_eq!(config.max_retries, Config::default().max_retries);
        },
    );
}

fn rejected_setting(config: Config) -> &'static str {
    match config.validate() {
        Err(ConfigError::InvalidSetting { name, .. }) => name,
        other => panic!("expected InvalidSetting, got {other:?}"),
    }
}

#[test]
fn test_validate_rejects_bad_settings() {
    let base = Config::default;

    assert_eq!(
        rejected_setting(Config {
            cache_max_size: 0,
            ..base()
        }),
        "cache_max_size"
    );
    assert_eq!(
        rejected_setting(Config {
            cache_ttl: Duration::ZERO,
            ..base()
        }),
        "cache_ttl"
    );
    assert_eq!(
        rejected_setting(Config {
            sigmoid_x0: 1.5,
            ..base()
        }),
        "sigmoid_x0"
    );
    assert_eq!(
        rejected_setting(Config {
            sigmoid_x0: f64::NAN,
            ..base()
        }),
        "sigmoid_x0"
    );
    assert_eq!(
        rejected_setting(Config {
            sigmoid_k: 0.0,
            ..base()
        }),
        "sigmoid_k"
    );
    assert_eq!(
        rejected_setting(Config {
            sigmoid_k: f64::INFINITY,
            ..base()
        }),
        "sigmoid_k"
    );
    assert_eq!(
        rejected_setting(Config {
            embedding_timeout: Duration::ZERO,
            ..base()
        }),
        "embedding_timeout"
    );
    assert_eq!(
        rejected_setting(Config {
            max_retries: 0,
            ..base()
        }),
        "max_retries"
    );
    assert_eq!(
        rejected_setting(Config {
            retry_base_delay: Duration::from_secs(10),
            ..base()
        }),
        "retry_max_delay"
    );
    assert_eq!(
        rejected_setting(Config {
            embedding_url: Some("localhost:9000".to_string()),
            ..base()
        }),
        "embedding_url"
    );
}
