use super::{FakeDashboards, BASE_URL};
use anyhow::Result;
use http::{Method, StatusCode};
use osdsync::{DefaultIndexPatternClient, ErrorKind};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn client(fake: &Arc<FakeDashboards>) -> DefaultIndexPatternClient {
    DefaultIndexPatternClient::new(fake.context(), BASE_URL, "/_dashboards")
}

#[tokio::test]
async fn test_set_then_unset() -> Result<()> {
    let fake = FakeDashboards::new();
    let client = client(&fake);

    client.set(Some("p1")).await?;
    assert_eq!(client.get().await?.as_deref(), Some("p1"));

    client.set(None).await?;
    assert_eq!(client.get().await?, None);
    Ok(())
}

#[tokio::test]
async fn test_clear() -> Result<()> {
    let fake = FakeDashboards::new();
    let client = client(&fake);

    client.set(Some("p1")).await?;
    client.clear().await?;
    assert_eq!(client.get().await?, None);

    let bodies = fake
        .requests()
        .iter()
        .filter(|r| r.method() == Method::POST)
        .map(|r| String::from_utf8(r.body().to_vec()).unwrap())
        .collect::<Vec<_>>();
    assert_eq!(
        bodies,
        vec![
            r#"{"changes":{"defaultIndex":"p1"}}"#,
            r#"{"changes":{"defaultIndex":null}}"#,
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_request() -> Result<()> {
    let fake = FakeDashboards::new();

    client(&fake).get().await?;

    let req = &fake.requests()[0];
    assert_eq!(req.method(), Method::GET);
    assert_eq!(
        req.uri().to_string(),
        format!("{BASE_URL}/_dashboards/api/opensearch-dashboards/settings")
    );
    assert_eq!(req.headers()["osd-xsrf"], "true");
    Ok(())
}

#[tokio::test]
async fn test_get_absent_settings() -> Result<()> {
    let fake = FakeDashboards::new();
    fake.remove_settings();

    assert_eq!(client(&fake).get().await?, None);
    Ok(())
}

#[tokio::test]
async fn test_get_changes_envelope() -> Result<()> {
    let fake = FakeDashboards::new();
    fake.respond_with(StatusCode::OK, br#"{"changes":{"defaultIndex":"p9"}}"#);

    assert_eq!(client(&fake).get().await?.as_deref(), Some("p9"));
    Ok(())
}

#[tokio::test]
async fn test_set_unexpected_status() {
    let fake = FakeDashboards::new();
    fake.respond_with(StatusCode::FORBIDDEN, b"{\"message\":\"forbidden\"}");

    let err = client(&fake)
        .set(Some("p1"))
        .await
        .expect_err("403 must fail");
    assert_eq!(err.kind(), ErrorKind::Remote);
    assert_eq!(err.status(), Some(StatusCode::FORBIDDEN));
    assert_eq!(
        err.request_body(),
        Some(r#"{"changes":{"defaultIndex":"p1"}}"#)
    );
    assert_eq!(err.response_body(), Some("{\"message\":\"forbidden\"}"));
}
