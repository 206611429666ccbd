//! Load check: concurrent coaches hitting both endpoints of a running gateway.
//! Reports how many requests were answered by a model versus the fallback text.
//! Run with gateway up: cargo run --bin load_check
//! Target another host with COACH_BASE_URL=http://host:port.

use reqwest::Client;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
const CONCURRENT_CLIENTS: usize = 8;
const REQUESTS_PER_CLIENT: usize = 4;

const VIRTUES: &[&str] = &[
    "Honesty",
    "Patience",
    "Courage",
    "Temperance",
    "Gratitude",
    "Humility",
];

const ANALYSES: &[&str] = &[
    "I caught myself exaggerating at work twice this week.",
    "Traffic still gets to me, but I breathed through it on Tuesday.",
    "Spoke up in the team meeting even though my voice shook.",
    "Skipped the second coffee three days in a row.",
];

fn recommendation_body(seed: usize) -> Value {
    let first = VIRTUES[seed % VIRTUES.len()];
    let second = VIRTUES[(seed + 1) % VIRTUES.len()];
    json!({
        "prioritizedVirtues": [
            { "virtue": first, "id": seed + 1, "defectIntensity": 7.5 },
            { "virtue": second, "id": seed + 2, "defectIntensity": 4.0 },
        ],
        "stageProgress": {
            format!("{}-1", seed + 1): "completed",
            format!("{}-2", seed + 1): "in-progress",
        },
        "recentUpdate": ANALYSES[seed % ANALYSES.len()],
        "isFirstTime": seed % 3 == 0,
    })
}

fn synthesis_body(seed: usize) -> Value {
    let first = VIRTUES[seed % VIRTUES.len()];
    let second = VIRTUES[(seed + 2) % VIRTUES.len()];
    json!({
        "analyses": [
            { "virtue": first, "analysis": ANALYSES[seed % ANALYSES.len()] },
            { "virtue": second, "analysis": ANALYSES[(seed + 1) % ANALYSES.len()] },
        ],
        "prioritizedVirtues": [
            { "virtue": first, "defectIntensity": 6.0 },
            { "virtue": second, "defectIntensity": 5.0 },
        ],
    })
}

#[tokio::main]
async fn main() {
    let base_url = std::env::var("COACH_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
    println!(
        "[LOAD CHECK] Starting: {} clients x {} requests = {} total",
        CONCURRENT_CLIENTS,
        REQUESTS_PER_CLIENT,
        CONCURRENT_CLIENTS * REQUESTS_PER_CLIENT
    );
    println!("[LOAD CHECK] Target: {} (ensure gateway is running)", base_url);

    let generated = Arc::new(AtomicU32::new(0));
    let fallback = Arc::new(AtomicU32::new(0));
    let failure = Arc::new(AtomicU32::new(0));
    let latencies: Arc<RwLock<Vec<u64>>> = Arc::new(RwLock::new(Vec::new()));

    let client = Client::builder()
        .timeout(Duration::from_secs(120))
        .build()
        .unwrap_or_else(|_| Client::new());

    let mut handles = Vec::new();
    for client_id in 0..CONCURRENT_CLIENTS {
        let client = client.clone();
        let base_url = base_url.clone();
        let generated = Arc::clone(&generated);
        let fallback = Arc::clone(&fallback);
        let failure = Arc::clone(&failure);
        let latencies = Arc::clone(&latencies);

        let h = tokio::spawn(async move {
            for r in 0..REQUESTS_PER_CLIENT {
                let seed = client_id * REQUESTS_PER_CLIENT + r;
                let (path, body) = if seed % 2 == 0 {
                    ("/api/generate-recommendation", recommendation_body(seed))
                } else {
                    ("/api/generate-synthesis", synthesis_body(seed))
                };

                let start = Instant::now();
                let res = client
                    .post(format!("{}{}", base_url, path))
                    .json(&body)
                    .send()
                    .await;
                let elapsed_ms = start.elapsed().as_millis() as u64;

                let resp = match res {
                    Ok(resp) if resp.status().is_success() => resp,
                    Ok(resp) => {
                        eprintln!("[LOAD CHECK] {} -> HTTP {}", path, resp.status());
                        failure.fetch_add(1, Ordering::Relaxed);
                        continue;
                    }
                    Err(e) => {
                        eprintln!("[LOAD CHECK] {} -> {}", path, e);
                        failure.fetch_add(1, Ordering::Relaxed);
                        continue;
                    }
                };

                match resp.json::<Value>().await {
                    Ok(json) => {
                        if json["model"] == "fallback" {
                            fallback.fetch_add(1, Ordering::Relaxed);
                        } else {
                            generated.fetch_add(1, Ordering::Relaxed);
                        }
                        latencies.write().await.push(elapsed_ms);
                    }
                    Err(_) => {
                        failure.fetch_add(1, Ordering::Relaxed);
                    }
                }
            }
        });
        handles.push(h);
    }

    for h in handles {
        let _ = h.await;
    }

    let g = generated.load(Ordering::Relaxed);
    let fb = fallback.load(Ordering::Relaxed);
    let f = failure.load(Ordering::Relaxed);
    let total = g + fb + f;
    let answered_rate = if total > 0 {
        ((g + fb) as f64 / total as f64) * 100.0
    } else {
        0.0
    };
    let latencies_guard = latencies.read().await;
    let avg_latency_ms = if latencies_guard.is_empty() {
        0.0
    } else {
        latencies_guard.iter().sum::<u64>() as f64 / latencies_guard.len() as f64
    };

    println!(
        "[LOAD CHECK] Answered: {:.1}% | Average Latency: {:.0}ms",
        answered_rate, avg_latency_ms
    );
    println!(
        "[LOAD CHECK] Total: {} | Model: {} | Fallback: {} | Failure: {}",
        total, g, fb, f
    );
}
