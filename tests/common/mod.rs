#![allow(dead_code)]

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use satrec::config::{AppConfig, GateConfig, RealmTarget};
use std::collections::HashMap;
use std::path::Path as FsPath;
use std::sync::{Arc, Mutex};
use std::time::Duration;

type Behavior = dyn Fn(u32, usize) -> (StatusCode, String) + Send + Sync;
type Delay = dyn Fn(usize) -> Duration + Send + Sync;

#[derive(Clone)]
struct UpstreamState {
    behavior: Arc<Behavior>,
    delay: Arc<Delay>,
    hits: Arc<Mutex<HashMap<u32, usize>>>,
}

/// Fake `resources-retail-info` endpoint.
///
/// `behavior(realm, call_number)` decides each response; call numbers start
/// at 1 and are counted per realm.
pub struct Upstream {
    pub base_url: String,
    hits: Arc<Mutex<HashMap<u32, usize>>>,
}

impl Upstream {
    pub async fn spawn<F>(behavior: F) -> Self
    where
        F: Fn(u32, usize) -> (StatusCode, String) + Send + Sync + 'static,
    {
        Self::spawn_with_delay(behavior, |_| Duration::ZERO).await
    }

    /// Like `spawn`, but holds call `n` back for `delay(n)` before answering
    pub async fn spawn_with_delay<F, D>(behavior: F, delay: D) -> Self
    where
        F: Fn(u32, usize) -> (StatusCode, String) + Send + Sync + 'static,
        D: Fn(usize) -> Duration + Send + Sync + 'static,
    {
        let hits = Arc::new(Mutex::new(HashMap::new()));
        let state = UpstreamState {
            behavior: Arc::new(behavior),
            delay: Arc::new(delay),
            hits: hits.clone(),
        };
        let app = Router::new()
            .route("/api/v4/:realm/resources-retail-info", get(retail_info))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}/api/v4", addr),
            hits,
        }
    }

    pub fn hits(&self, realm: u32) -> usize {
        self.hits.lock().unwrap().get(&realm).copied().unwrap_or(0)
    }
}

async fn retail_info(
    State(state): State<UpstreamState>,
    Path(realm): Path<u32>,
) -> (StatusCode, String) {
    let call = {
        let mut hits = state.hits.lock().unwrap();
        let n = hits.entry(realm).or_insert(0);
        *n += 1;
        *n
    };
    let delay = (state.delay)(call);
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
    (state.behavior)(realm, call)
}

/// JSON body shaped like the live API
pub fn retail_body(pairs: &[(u32, f64)]) -> String {
    let records: Vec<serde_json::Value> = pairs
        .iter()
        .map(|(id, saturation)| {
            serde_json::json!({
                "dbLetter": id,
                "quality": 0,
                "saturation": saturation,
                "averagePrice": 1.0,
            })
        })
        .collect();
    serde_json::Value::Array(records).to_string()
}

/// Configuration pointing at `upstream` that never sleeps between attempts
pub fn fast_config(base_url: &str, dir: &FsPath, realms: &[u32]) -> AppConfig {
    let mut config = AppConfig::default();
    config.market.base_url = base_url.to_string();
    config.market.timeout_ms = 2000;
    config.market.max_retries = 1;
    config.market.retry_delay_ms = 0;
    config.gate = GateConfig {
        sentinel_id: "3".to_string(),
        poll_interval_ms: 0,
        max_attempts: 3,
        max_wait_secs: 30,
    };
    config.realms = realms
        .iter()
        .map(|id| RealmTarget::new(*id, dir.join(format!("R{}_saturation.json", id + 1))))
        .collect();
    config
}

pub fn short_timeout() -> Duration {
    Duration::from_millis(200)
}
