//! RPC method handler for the dashboard JSON-RPC protocol.
//!
//! Dispatch for `rpc_server.rs`; tests call `handle_method` directly. Each
//! mutation responds with the events it caused, which a front-end mirror
//! applies in place of a refetch.

use std::sync::mpsc::Sender;
use std::sync::Mutex;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde_json::{json, Value};
use tokio::runtime::Handle;
use uuid::Uuid;

use crate::app::App;
use crate::managers::service_registry::ServiceRegistryTrait;
use crate::services::favicon_fetcher::{fetch_favicon_with, to_https_url, FaviconFetcher};
use crate::services::settings_engine::SettingsEngineTrait;
use crate::types::icon::{Icon, IconDisplayPolicy};
use crate::types::service::{NewService, Service, ServiceUpdate};

/// Encode bytes to base64 string.
pub fn base64_encode(data: &[u8]) -> String {
    BASE64.encode(data)
}

/// Decode base64 string to bytes.
pub fn base64_decode(input: &str) -> Result<Vec<u8>, String> {
    BASE64
        .decode(input)
        .map_err(|e| format!("base64 decode error: {}", e))
}

fn str_param<'a>(params: &'a Value, key: &str) -> Result<&'a str, String> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| format!("missing {}", key))
}

fn usize_param(params: &Value, key: &str) -> Result<usize, String> {
    params
        .get(key)
        .and_then(|v| v.as_u64())
        .map(|v| v as usize)
        .ok_or_else(|| format!("missing {}", key))
}

/// Optional base64 `icon` param, decoded and validated as an image.
fn icon_param(params: &Value) -> Result<Option<Icon>, String> {
    match params.get("icon").and_then(|v| v.as_str()) {
        Some(encoded) => {
            let bytes = base64_decode(encoded)?;
            Icon::decode(bytes).map(Some).map_err(|e| e.to_string())
        }
        None => Ok(None),
    }
}

fn icon_json(policy: IconDisplayPolicy, icon: &Icon) -> Value {
    json!({
        "data": base64_encode(&icon.bytes),
        "content_type": icon.content_type,
        "width": icon.width,
        "height": icon.height,
        "is_placeholder": icon.is_placeholder,
        "fit": policy.fit_for(icon),
    })
}

fn service_json(app: &App, service: &Service) -> Value {
    json!({
        "id": service.id,
        "name": service.name,
        "url": service.url,
        "position": service.position,
        "last_seen_online": service.last_seen_online,
        "online_recently": app.is_online_recently(service),
        "icon": icon_json(app.icon_policy(), &service.icon),
    })
}

/// Dispatch a JSON-RPC method call.
///
/// `favicon.fetch` returns a `fetch_id` at once; the icon follows later on
/// `notify` as `{"event":"favicon","fetch_id":...,"url":...,"icon":{...}}`,
/// sent from a task on `runtime`.
pub fn handle_method(
    app: &Mutex<App>,
    runtime: &Handle,
    notify: &Sender<Value>,
    method: &str,
    params: &Value,
) -> Result<Value, String> {
    match method {
        // ─── Services ───
        "service.list" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            let arr: Vec<Value> = a
                .registry
                .services()
                .iter()
                .map(|s| service_json(&a, s))
                .collect();
            Ok(json!(arr))
        }
        "service.add" => {
            let name = str_param(params, "name")?;
            let url = str_param(params, "url")?;
            let mut new_service = NewService::new(name, url);
            new_service.icon = icon_param(params)?;

            let mut a = app.lock().map_err(|e| e.to_string())?;
            let id = a.registry.add(new_service).map_err(|e| e.to_string())?;
            Ok(json!({"id": id, "events": a.drain_events()}))
        }
        "service.update" => {
            let id = str_param(params, "id")?;
            let name = str_param(params, "name")?;
            let url = str_param(params, "url")?;
            let mut fields = ServiceUpdate::new(name, url);
            fields.icon = icon_param(params)?;

            let mut a = app.lock().map_err(|e| e.to_string())?;
            a.registry.update(id, fields).map_err(|e| e.to_string())?;
            Ok(json!({"events": a.drain_events()}))
        }
        "service.move" => {
            let id = str_param(params, "id")?;
            let to = usize_param(params, "to")?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            a.registry.move_service(id, to).map_err(|e| e.to_string())?;
            Ok(json!({"events": a.drain_events()}))
        }
        "service.move_offset" => {
            let from = usize_param(params, "from")?;
            let offset = usize_param(params, "offset")?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            a.registry
                .move_to_offset(from, offset)
                .map_err(|e| e.to_string())?;
            Ok(json!({"events": a.drain_events()}))
        }
        "service.delete" => {
            let id = str_param(params, "id")?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            a.registry.delete(id).map_err(|e| e.to_string())?;
            Ok(json!({"events": a.drain_events()}))
        }
        "service.seen" => {
            let id = str_param(params, "id")?;
            let timestamp = params
                .get("timestamp")
                .and_then(|v| v.as_i64())
                .ok_or("missing timestamp")?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            a.registry
                .mark_seen_online(id, timestamp)
                .map_err(|e| e.to_string())?;
            Ok(json!({"events": a.drain_events()}))
        }

        // ─── Favicons ───
        "favicon.fetch" => {
            let url = str_param(params, "url")?;
            let (fetcher, policy) = {
                let a = app.lock().map_err(|e| e.to_string())?;
                (a.favicon_fetcher.clone(), a.icon_policy())
            };
            let https_url = to_https_url(url);
            let fetch_id = Uuid::new_v4().to_string();

            let notify = notify.clone();
            let (event_id, event_url) = (fetch_id.clone(), https_url.clone());
            fetch_favicon_with(&fetcher, runtime, url, move |icon| {
                let event = json!({
                    "event": "favicon",
                    "fetch_id": event_id,
                    "url": event_url,
                    "icon": icon_json(policy, &icon),
                });
                if notify.send(event).is_err() {
                    log::debug!("favicon {} finished after the client went away", event_id);
                }
            });
            Ok(json!({"fetch_id": fetch_id, "url": https_url}))
        }

        // ─── Settings ───
        "settings.get" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            serde_json::to_value(a.settings_engine.get_settings()).map_err(|e| e.to_string())
        }
        "settings.set" => {
            let key = str_param(params, "key")?;
            let value = params.get("value").cloned().ok_or("missing value")?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            a.settings_engine
                .set_value(key, value)
                .map_err(|e| e.to_string())?;
            if key.starts_with("network.") {
                let fetcher = FaviconFetcher::new(&a.settings_engine.get_settings().network)
                    .map_err(|e| e.to_string())?;
                a.favicon_fetcher = fetcher;
            }
            Ok(json!({"ok": true}))
        }

        _ => Err(format!("unknown method: {}", method)),
    }
}
