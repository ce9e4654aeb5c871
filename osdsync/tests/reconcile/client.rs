use super::{FakeDashboards, BASE_URL};
use anyhow::Result;
use http::header;
use osdsync::aws::StaticCredentialProvider;
use osdsync::hash::hex_sha256;
use osdsync::{Config, DashboardsClient, ErrorKind, SavedObject};
use pretty_assertions::assert_eq;
use serde_json::json;

fn search() -> SavedObject {
    SavedObject::new(
        "search",
        "s1",
        json!({"title": "Sales"}).as_object().cloned().unwrap(),
    )
}

#[tokio::test]
async fn test_requests_are_signed() -> Result<()> {
    let fake = FakeDashboards::new();
    let config = Config::new(BASE_URL).with_region("eu-central-1");

    let client = DashboardsClient::with_credential_provider(
        fake.context(),
        config,
        StaticCredentialProvider::new("access_key_id", "secret_access_key")
            .with_session_token("session_token"),
    )?;
    client.saved_objects().save(&search()).await?;
    client.default_index_pattern().set(Some("p1")).await?;

    let requests = fake.requests();
    assert_eq!(requests.len(), 2);
    for req in &requests {
        let headers = req.headers();
        let authorization = headers[header::AUTHORIZATION].to_str()?;
        assert!(authorization.starts_with("AWS4-HMAC-SHA256 Credential=access_key_id/"));
        assert!(authorization.contains("/eu-central-1/es/aws4_request"));
        assert_eq!(headers["x-amz-content-sha256"], hex_sha256(req.body()));
        assert_eq!(headers["x-amz-security-token"], "session_token");
        assert_eq!(headers[header::CONTENT_TYPE], "application/json");
        assert_eq!(headers["osd-xsrf"], "true");
    }
    Ok(())
}

#[tokio::test]
async fn test_field_sync_follows_config() -> Result<()> {
    let fake = FakeDashboards::new();
    fake.insert("index-pattern", "p1", json!({"title": "Logs", "fields": {"a": 1}}));

    let config = Config::new(BASE_URL)
        .with_disable_authentication()
        .with_sync_index_pattern_fields();
    let client = DashboardsClient::new(fake.context(), config)?;

    let got = client
        .saved_objects()
        .get("index-pattern", "p1")
        .await?
        .expect("object must exist");
    assert_eq!(got.attributes, r#"{"fields":{"a":1},"title":"Logs"}"#);
    Ok(())
}

#[tokio::test]
async fn test_disabled_authentication_sends_unsigned() -> Result<()> {
    let fake = FakeDashboards::new();
    let config = Config::new(BASE_URL).with_disable_authentication();

    let client = DashboardsClient::new(fake.context(), config)?;
    client.saved_objects().save(&search()).await?;

    let requests = fake.requests();
    assert!(requests[0].headers().get(header::AUTHORIZATION).is_none());
    assert!(requests[0].headers().get("x-amz-date").is_none());
    Ok(())
}

#[tokio::test]
async fn test_missing_credentials_are_a_signing_error() -> Result<()> {
    let fake = FakeDashboards::new();
    let config = Config::new(BASE_URL).with_region("eu-central-1");

    // The fake context has no environment, so no credential can be found.
    let client = DashboardsClient::new(fake.context(), config)?;
    let err = client
        .saved_objects()
        .get("search", "s1")
        .await
        .expect_err("request must not be signed");

    assert!(err.is_signing_error());
    assert!(err.is_credential_error());
    assert_eq!(err.kind(), ErrorKind::CredentialInvalid);
    assert!(fake.requests().is_empty());
    Ok(())
}

#[test]
fn test_invalid_config_is_rejected() {
    let fake = FakeDashboards::new();

    let err = DashboardsClient::new(fake.context(), Config::default())
        .expect_err("config without base url and region must fail");
    assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
}
