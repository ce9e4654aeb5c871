mod client;
mod default_index_pattern;
mod saved_objects;

use async_trait::async_trait;
use bytes::Bytes;
use http::{header, Method, Request, Response, StatusCode};
use osdsync::{Context, HttpSend, Result, SavedObject};
use percent_encoding::percent_decode_str;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

pub const BASE_URL: &str = "https://search-test.eu-central-1.es.amazonaws.com";

/// In-memory dashboards api.
///
/// Stores saved objects and the default index pattern, records every request
/// and can be told to answer every request with a fixed status instead.
#[derive(Debug, Default)]
pub struct FakeDashboards {
    objects: Mutex<BTreeMap<(String, String), SavedObject>>,
    default_index: Mutex<Option<String>>,
    settings_missing: Mutex<bool>,
    canned: Mutex<Option<(StatusCode, Bytes)>>,
    requests: Mutex<Vec<Request<Bytes>>>,
}

impl FakeDashboards {
    pub fn new() -> Arc<Self> {
        let _ = env_logger::builder().is_test(true).try_init();
        Arc::new(Self::default())
    }

    pub fn context(self: &Arc<Self>) -> Context {
        Context::new().with_shared_http_send(self.clone())
    }

    /// Store an object as if it was created by someone else.
    pub fn insert(&self, object_type: &str, id: &str, attributes: Value) {
        let obj = SavedObject::new(
            object_type,
            id,
            attributes.as_object().cloned().expect("attributes must be an object"),
        );
        self.objects
            .lock()
            .unwrap()
            .insert((object_type.to_string(), id.to_string()), obj);
    }

    /// Answer every following request with `status` and `body`.
    pub fn respond_with(&self, status: StatusCode, body: &'static [u8]) {
        *self.canned.lock().unwrap() = Some((status, Bytes::from_static(body)));
    }

    /// Answer the settings endpoint with 404.
    pub fn remove_settings(&self) {
        *self.settings_missing.lock().unwrap() = true;
    }

    pub fn requests(&self) -> Vec<Request<Bytes>> {
        self.requests.lock().unwrap().clone()
    }

    fn route(&self, req: &Request<Bytes>) -> (StatusCode, Value) {
        let headers = req.headers();
        if headers.get("osd-xsrf").map(|v| v.as_bytes()) != Some(b"true") {
            return (
                StatusCode::BAD_REQUEST,
                json!({"message": "Request must contain a osd-xsrf header."}),
            );
        }

        let path = req.uri().path();
        if path == "/_dashboards/api/opensearch-dashboards/settings" {
            return self.settings(req);
        }

        let Some(rest) = path.strip_prefix("/_dashboards/api/saved_objects/") else {
            return (StatusCode::NOT_FOUND, json!({"message": "Not Found"}));
        };
        let segments = rest
            .split('/')
            .map(|s| percent_decode_str(s).decode_utf8_lossy().to_string())
            .collect::<Vec<_>>();
        let [object_type, id] = segments.as_slice() else {
            return (StatusCode::NOT_FOUND, json!({"message": "Not Found"}));
        };
        let key = (object_type.clone(), id.clone());

        let mut objects = self.objects.lock().unwrap();
        match req.method().as_str() {
            "GET" => match objects.get(&key) {
                Some(obj) => {
                    let mut body = serde_json::to_value(obj).unwrap();
                    body["version"] = json!("WzEsMV0=");
                    (StatusCode::OK, body)
                }
                None => (StatusCode::NOT_FOUND, not_found(&key)),
            },
            "POST" => {
                let overwrite = req.uri().query() == Some("overwrite=true");
                if objects.contains_key(&key) && !overwrite {
                    return (StatusCode::CONFLICT, json!({"message": "Saved object conflict"}));
                }
                let payload: Value = serde_json::from_slice(req.body()).unwrap();
                let obj = SavedObject {
                    object_type: key.0.clone(),
                    id: key.1.clone(),
                    attributes: payload["attributes"].as_object().cloned().unwrap_or_default(),
                    references: serde_json::from_value(payload["references"].clone())
                        .unwrap_or_default(),
                };
                let body = serde_json::to_value(&obj).unwrap();
                objects.insert(key, obj);
                (StatusCode::OK, body)
            }
            "DELETE" => match objects.remove(&key) {
                Some(_) => (StatusCode::OK, json!({})),
                None => (StatusCode::NOT_FOUND, not_found(&key)),
            },
            _ => (StatusCode::METHOD_NOT_ALLOWED, json!({})),
        }
    }

    fn settings(&self, req: &Request<Bytes>) -> (StatusCode, Value) {
        if *self.settings_missing.lock().unwrap() {
            return (StatusCode::NOT_FOUND, json!({"message": "Not Found"}));
        }

        let mut default_index = self.default_index.lock().unwrap();
        if req.method() == Method::POST {
            let payload: Value = serde_json::from_slice(req.body()).unwrap();
            *default_index = payload["changes"]["defaultIndex"].as_str().map(String::from);
        }

        let mut settings = Map::new();
        settings.insert("buildNum".to_string(), json!({"userValue": 2}));
        if let Some(id) = default_index.as_ref() {
            settings.insert("defaultIndex".to_string(), json!({"userValue": id}));
        }
        (StatusCode::OK, json!({ "settings": settings }))
    }
}

fn not_found((object_type, id): &(String, String)) -> Value {
    json!({
        "statusCode": 404,
        "error": "Not Found",
        "message": format!("Saved object [{object_type}/{id}] not found"),
    })
}

#[async_trait]
impl HttpSend for FakeDashboards {
    async fn http_send(&self, req: Request<Bytes>) -> Result<Response<Bytes>> {
        self.requests.lock().unwrap().push(req.clone());

        let (status, body) = match self.canned.lock().unwrap().clone() {
            Some(canned) => canned,
            None => {
                let (status, body) = self.route(&req);
                (status, Bytes::from(serde_json::to_vec(&body).unwrap()))
            }
        };

        Ok(Response::builder()
            .status(status)
            .header(header::CONTENT_TYPE, "application/json; charset=utf-8")
            .body(body)?)
    }
}
