use super::{FakeDashboards, BASE_URL};
use anyhow::Result;
use http::{header, Method, StatusCode};
use osdsync::{DeclaredObject, ErrorKind, Reference, SavedObject, SavedObjectsClient};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::Arc;
use test_case::test_case;

fn client(fake: &Arc<FakeDashboards>) -> SavedObjectsClient {
    SavedObjectsClient::new(fake.context(), BASE_URL, "/_dashboards")
}

fn search(id: &str, attributes: Value) -> SavedObject {
    SavedObject::new(
        "search",
        id,
        attributes.as_object().cloned().expect("attributes must be an object"),
    )
}

#[tokio::test]
async fn test_save_then_get() -> Result<()> {
    let fake = FakeDashboards::new();
    let client = client(&fake);

    client.save(&search("s1", json!({"title": "Sales"}))).await?;
    let obj = client.get("search", "s1").await?.expect("object must exist");

    assert_eq!(
        obj,
        DeclaredObject {
            object_type: "search".to_string(),
            id: "s1".to_string(),
            attributes: r#"{"title":"Sales"}"#.to_string(),
            references: vec![],
        }
    );
    Ok(())
}

#[tokio::test]
async fn test_save_is_idempotent() -> Result<()> {
    let fake = FakeDashboards::new();
    let client = client(&fake);
    let obj = search("s1", json!({"title": "Sales", "columns": ["_source"]}))
        .with_references(vec![Reference::new("index-pattern", "p1").with_name("index")]);

    client.save(&obj).await?;
    client.save(&obj).await?;

    let got = client.get("search", "s1").await?.expect("object must exist");
    assert_eq!(SavedObject::try_from(got)?, obj);
    Ok(())
}

#[tokio::test]
async fn test_save_overwrites() -> Result<()> {
    let fake = FakeDashboards::new();
    let client = client(&fake);

    client.save(&search("s1", json!({"title": "Sales"}))).await?;
    client.save(&search("s1", json!({"title": "Revenue"}))).await?;

    let got = client.get("search", "s1").await?.expect("object must exist");
    assert_eq!(got.attributes, r#"{"title":"Revenue"}"#);
    Ok(())
}

#[tokio::test]
async fn test_save_request() -> Result<()> {
    let fake = FakeDashboards::new();
    let obj = search("s1", json!({"title": "Sales"}))
        .with_references(vec![Reference::new("index-pattern", "p1")]);

    client(&fake).save(&obj).await?;

    let requests = fake.requests();
    assert_eq!(requests.len(), 1);
    let req = &requests[0];
    assert_eq!(req.method(), Method::POST);
    assert_eq!(
        req.uri().to_string(),
        format!("{BASE_URL}/_dashboards/api/saved_objects/search/s1?overwrite=true")
    );
    assert_eq!(req.headers()["osd-xsrf"], "true");
    assert_eq!(req.headers()[header::CONTENT_TYPE], "application/json");
    assert_eq!(
        serde_json::from_slice::<Value>(req.body())?,
        json!({
            "attributes": {"title": "Sales"},
            "references": [{"id": "p1", "type": "index-pattern"}]
        })
    );
    Ok(())
}

#[tokio::test]
async fn test_get_absent() -> Result<()> {
    let fake = FakeDashboards::new();

    let got = client(&fake).get("search", "never-saved").await?;
    assert_eq!(got, None);
    Ok(())
}

#[test_case("index-pattern", false, false ; "index pattern without sync")]
#[test_case("index-pattern", true, true ; "index pattern with sync")]
#[test_case("search", false, true ; "other type without sync")]
#[test_case("search", true, true ; "other type with sync")]
#[tokio::test]
async fn test_index_pattern_fields(object_type: &str, sync: bool, kept: bool) -> Result<()> {
    let fake = FakeDashboards::new();
    fake.insert(object_type, "p1", json!({"title": "Logs", "fields": {"a": 1}}));

    let client = client(&fake).with_sync_index_pattern_fields(sync);
    let got = client.get(object_type, "p1").await?.expect("object must exist");

    let expected = if kept {
        json!({"title": "Logs", "fields": {"a": 1}})
    } else {
        json!({"title": "Logs"})
    };
    assert_eq!(serde_json::from_str::<Value>(&got.attributes)?, expected);
    Ok(())
}

#[tokio::test]
async fn test_delete() -> Result<()> {
    let fake = FakeDashboards::new();
    let client = client(&fake);

    client.save(&search("s1", json!({"title": "Sales"}))).await?;
    client.delete("search", "s1").await?;

    assert_eq!(client.get("search", "s1").await?, None);
    assert_eq!(fake.requests()[1].method(), Method::DELETE);
    Ok(())
}

#[tokio::test]
async fn test_delete_absent_is_an_error() {
    let fake = FakeDashboards::new();

    let err = client(&fake)
        .delete("search", "missing")
        .await
        .expect_err("delete of a missing object must fail");
    assert_eq!(err.kind(), ErrorKind::Remote);
    assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
    assert!(err
        .response_body()
        .expect("body must be captured")
        .contains("search/missing"));
}

#[tokio::test]
async fn test_ids_are_escaped() -> Result<()> {
    let fake = FakeDashboards::new();
    let client = client(&fake);

    client.save(&search("a,b/c", json!({}))).await?;
    let got = client.get("search", "a,b/c").await?.expect("object must exist");

    assert_eq!(got.id, "a,b/c");
    assert_eq!(
        fake.requests()[0].uri().path(),
        "/_dashboards/api/saved_objects/search/a%2Cb%2Fc"
    );
    Ok(())
}

#[tokio::test]
async fn test_get_unexpected_status() {
    let fake = FakeDashboards::new();
    fake.respond_with(StatusCode::INTERNAL_SERVER_ERROR, b"boom");

    let err = client(&fake)
        .get("search", "s1")
        .await
        .expect_err("500 must fail");
    assert_eq!(err.kind(), ErrorKind::Remote);
    assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
    assert_eq!(err.response_body(), Some("boom"));
    assert_eq!(err.request_body(), None);
}

#[tokio::test]
async fn test_save_unexpected_status_keeps_bodies() {
    let fake = FakeDashboards::new();
    fake.respond_with(StatusCode::BAD_REQUEST, b"{\"message\":\"bad attributes\"}");

    let err = client(&fake)
        .save(&search("s1", json!({"title": "Sales"})))
        .await
        .expect_err("400 must fail");
    assert_eq!(err.kind(), ErrorKind::Remote);
    assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
    assert_eq!(
        err.request_body(),
        Some(r#"{"attributes":{"title":"Sales"},"references":[]}"#)
    );
    assert_eq!(err.response_body(), Some("{\"message\":\"bad attributes\"}"));
    // The request body is redacted in debug output.
    assert!(!format!("{err:?}").contains("Sales"));
}

#[tokio::test]
async fn test_get_undecodable_body() {
    let fake = FakeDashboards::new();
    fake.respond_with(StatusCode::OK, b"<html>login</html>");

    let err = client(&fake)
        .get("search", "s1")
        .await
        .expect_err("html must not decode");
    assert_eq!(err.kind(), ErrorKind::Decode);
}

#[tokio::test]
async fn test_invalid_object_is_not_sent() {
    let fake = FakeDashboards::new();

    let err = client(&fake)
        .save(&search("", json!({})))
        .await
        .expect_err("empty id must be rejected");
    assert_eq!(err.kind(), ErrorKind::ValidationFailed);
    assert!(fake.requests().is_empty());
}
