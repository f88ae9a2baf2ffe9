//! Tests for layered gateway configuration.

use std::io::Write;
use tollgate::{GatewayConfig, ProviderKind};

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("create temp config");
    file.write_all(contents.as_bytes()).expect("write temp config");
    file
}

#[test]
fn test_file_overrides_bundled_defaults() {
    let file = write_config(
        r#"
[quota]
rpm = 5

[models.profiles.technical]
temperature = 0.1

[provider]
kind = "alternate"
app_title = "tollgate-tests"
"#,
    );

    let config = GatewayConfig::from_file(file.path()).unwrap();

    // Overridden
    assert_eq!(config.quota.rpm, 5);
    assert_eq!(config.provider.kind, ProviderKind::Alternate);
    assert_eq!(config.provider.app_title.as_deref(), Some("tollgate-tests"));
    assert_eq!(
        config.models.resolve_profile("technical"),
        ("gpt-4-turbo-preview", 0.1)
    );

    // Bundled
    assert_eq!(config.quota.tpm, 1_000_000);
    assert_eq!(config.retry.max_attempts, 3);
    assert_eq!(config.models.embedding_model, "text-embedding-ada-002");
    assert_eq!(config.models.resolve_profile("news").1, 0.7);
    assert!(config.ledger.enabled);
}

#[test]
fn test_bundled_pricing_keeps_dotted_model_names() {
    let file = write_config("");
    let config = GatewayConfig::from_file(file.path()).unwrap();

    let price = config.pricing.get("gpt-3.5-turbo").unwrap();
    assert_eq!(*price.input(), 0.0005);
    assert_eq!(*price.output(), 0.0015);
    assert_eq!(config.pricing.fallback_model(), "gpt-3.5-turbo");
}

#[test]
fn test_unknown_profile_uses_defaults() {
    let config = GatewayConfig::default();
    assert_eq!(
        config.models.resolve_profile("poetry"),
        ("gpt-4-turbo-preview", 0.7)
    );
}

#[test]
fn test_out_of_range_temperature_is_rejected() {
    let file = write_config(
        r#"
[models.profiles.wild]
temperature = 3.5
"#,
    );

    let err = GatewayConfig::from_file(file.path()).unwrap_err();
    assert!(err.to_string().contains("wild"), "{err}");
}

#[test]
fn test_zero_quota_is_rejected() {
    let file = write_config("[quota]\nrpm = 0\n");
    assert!(GatewayConfig::from_file(file.path()).is_err());
}

#[test]
fn test_missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.toml");
    assert!(GatewayConfig::from_file(&missing).is_err());
}

#[test]
fn test_default_config_validates() {
    GatewayConfig::default().validate().unwrap();
}
