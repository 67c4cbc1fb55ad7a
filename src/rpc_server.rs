//! Dashboard RPC server: JSON-RPC over stdin/stdout for a UI front-end.
//!
//! Protocol: one JSON object per line.
//! Request:  {"id":1, "method":"service.add", "params":{"name":"NAS","url":"http://nas.local"}}
//! Response: {"id":1, "result":{...}} or {"id":1, "error":"..."}
//! Event:    {"event":"favicon", "fetch_id":"...", ...}, unsolicited, after a `favicon.fetch`.

use std::io::{self, BufRead, Write};
use std::sync::mpsc;
use std::sync::Mutex;
use std::thread;

use dashboard::app::App;
use dashboard::rpc_handler::handle_method;

use serde_json::{json, Value};

/// Writes every line received on `lines` to stdout until all senders are gone.
fn spawn_writer(lines: mpsc::Receiver<Value>) -> thread::JoinHandle<io::Result<()>> {
    thread::spawn(move || {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        for line in lines {
            writeln!(out, "{}", line)?;
            out.flush()?;
        }
        Ok(())
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let runtime = tokio::runtime::Runtime::new()?;
    let app = Mutex::new(App::new()?);
    log::info!("dashboard rpc server ready");

    let (tx, rx) = mpsc::channel();
    let writer = spawn_writer(rx);
    tx.send(json!({"event": "ready", "version": env!("CARGO_PKG_VERSION")}))?;

    for line in io::stdin().lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let req: Value = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                log::warn!("unparseable request: {}", e);
                tx.send(json!({"id": null, "error": format!("parse error: {}", e)}))?;
                continue;
            }
        };

        let id = req.get("id").cloned().unwrap_or(Value::Null);
        let method = req.get("method").and_then(|v| v.as_str()).unwrap_or("");
        let params = req.get("params").cloned().unwrap_or(json!({}));

        let response = match handle_method(&app, runtime.handle(), &tx, method, &params) {
            Ok(val) => json!({"id": id, "result": val}),
            Err(err) => {
                log::debug!("{} failed: {}", method, err);
                json!({"id": id, "error": err})
            }
        };
        tx.send(response)?;
    }

    log::info!("stdin closed, shutting down");
    // Pending fetches hold sender clones; dropping the runtime cancels them.
    drop(tx);
    drop(runtime);
    match writer.join() {
        Ok(result) => result?,
        Err(_) => log::error!("stdout writer panicked"),
    }
    Ok(())
}
