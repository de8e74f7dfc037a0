//! JSON-lines bridge: one request per stdin line, one response per stdout line.
//!
//! Request:  `{"id": 1, "channel": "orders:list", "payload": {"tab": "ready"}}`
//! Response: `{"id": 1, "ok": true, "data": {...}}` or `{"id": 1, "ok": false, "error": "..."}`
//!
//! `--ephemeral` keeps settings in memory instead of the data directory.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info};

use ezeats_staff_lib::config::AppConfig;
use ezeats_staff_lib::navigation::Route;
use ezeats_staff_lib::{db, init_logging, invoke, AppState};

#[derive(Debug, Deserialize)]
struct Request {
    #[serde(default)]
    id: Value,
    channel: String,
    #[serde(default)]
    payload: Option<Value>,
}

fn respond(id: Value, result: Result<Value, String>) -> Value {
    match result {
        Ok(data) => json!({ "id": id, "ok": true, "data": data }),
        Err(error) => json!({ "id": id, "ok": false, "error": error }),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let ephemeral = std::env::args().skip(1).any(|arg| arg == "--ephemeral");
    let config = AppConfig::from_env();
    let _guard = init_logging(&config.log_dir);

    info!("Starting EZ EATS Staff v{}", env!("CARGO_PKG_VERSION"));

    let db = if ephemeral {
        db::open_in_memory()
    } else {
        db::init(&config.data_dir)
    }
    .map_err(|e| anyhow!(e))
    .context("failed to open settings database")?;

    let mut state = AppState::new(config, Arc::new(db)).context("failed to load orders")?;
    state.spawn_language_init();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    let mut ticker = tokio::time::interval(Duration::from_secs(1));

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read stdin")? else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                let response = match serde_json::from_str::<Request>(&line) {
                    Ok(request) => {
                        debug!(channel = %request.channel, "request");
                        let result = invoke(&mut state, &request.channel, request.payload).await;
                        respond(request.id, result)
                    }
                    Err(e) => respond(Value::Null, Err(format!("malformed request: {e}"))),
                };
                let mut out = serde_json::to_vec(&response)?;
                out.push(b'\n');
                stdout.write_all(&out).await?;
                stdout.flush().await?;
            }
            _ = ticker.tick() => {
                if matches!(state.nav.current(), Route::Verify { .. }) {
                    state.resend.tick();
                }
            }
        }
    }

    info!("stdin closed, shutting down");
    Ok(())
}
