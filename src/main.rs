mod fixtures;
mod ipc;
mod ledger;
mod model;
mod simulate;
mod store;

use std::io::{self, BufRead, Write};
use std::time::Duration;

use simulate::{InstantPacer, Pacer, TimedPacer};

fn main() {
    // stdout carries the line protocol; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    // --instant swaps the timed simulation pacer for a no-delay one.
    let pacer: Box<dyn Pacer> = if std::env::args().any(|a| a == "--instant") {
        Box::new(InstantPacer)
    } else {
        Box::new(TimedPacer {
            step: Duration::from_millis(400),
        })
    };
    let mut state = ipc::AppState::seeded(pacer);

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(_) => break,
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: ipc::Request = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                // Can't reply without id; best-effort error line.
                let _ = writeln!(
                    stdout,
                    "{{\"ok\":false,\"error\":{{\"code\":\"bad_json\",\"message\":\"{}\"}}}}",
                    e
                );
                let _ = stdout.flush();
                continue;
            }
        };

        let resp = ipc::handle_request(&mut state, req);
        let _ = writeln!(
            stdout,
            "{}",
            serde_json::to_string(&resp).unwrap_or_else(|_| "{\"ok\":false}".to_string())
        );
        let _ = stdout.flush();
    }
}
