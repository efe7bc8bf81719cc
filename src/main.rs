//! Navigation router driver.
//!
//! Loads a route configuration, starts a router on an in-memory history
//! and replays a script of navigation steps, printing one JSON line per
//! step.
//!
//! ```text
//! nav-router --config demos/routes.toml push:/manual/intro push:/account back forward
//! ```

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use serde_json::json;
use tokio::sync::{mpsc, watch};

use nav_router::config::{build_router, load_config};
use nav_router::history::{History, MemoryHistory};
use nav_router::lifecycle::Shutdown;
use nav_router::location::Location;
use nav_router::observability::logging::init_logging;

#[derive(Parser)]
#[command(name = "nav-router")]
#[command(about = "Replay navigation steps against a configured router", long_about = None)]
struct Cli {
    /// Route configuration (TOML).
    #[arg(short, long)]
    config: PathBuf,

    /// Initial history entry.
    #[arg(short, long, default_value = "/")]
    initial: String,

    /// How long to wait for a history-driven navigation to settle.
    #[arg(long, default_value_t = 500)]
    settle_ms: u64,

    /// Steps: `push:<target>`, `replace:<target>`, `back`, `forward`.
    steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Step {
    Push(String),
    Replace(String),
    Back,
    Forward,
}

impl FromStr for Step {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "back" => return Ok(Step::Back),
            "forward" => return Ok(Step::Forward),
            _ => {}
        }
        match raw.split_once(':') {
            Some(("push", target)) if !target.is_empty() => Ok(Step::Push(target.to_string())),
            Some(("replace", target)) if !target.is_empty() => {
                Ok(Step::Replace(target.to_string()))
            }
            _ => Err(format!(
                "invalid step '{}': expected push:<target>, replace:<target>, back or forward",
                raw
            )),
        }
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Step::Push(target) => write!(f, "push:{}", target),
            Step::Replace(target) => write!(f, "replace:{}", target),
            Step::Back => f.write_str("back"),
            Step::Forward => f.write_str("forward"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    if let Err(err) = init_logging(&config.observability) {
        eprintln!("logging disabled: {}", err);
    }
    tracing::info!(
        config = %cli.config.display(),
        initial = %cli.initial,
        steps = cli.steps.len(),
        "nav-router starting"
    );

    let history = Arc::new(MemoryHistory::new(&cli.initial));
    let (route_tx, mut route_rx) = watch::channel(Arc::new(Location::start()));
    let router = Arc::new(build_router(&config, history.clone(), Arc::new(route_tx))?);

    let (error_tx, mut error_rx) = mpsc::unbounded_channel();
    router.on_error(move |err| {
        let _ = error_tx.send(err.to_string());
    });

    let shutdown = Shutdown::new();
    let listener = router.listen(shutdown.subscribe());
    let settle = Duration::from_millis(cli.settle_ms);

    let initial = router.initial_navigation().await.map_err(|e| e.to_string());
    print_step("initial", initial)?;

    for step in &cli.steps {
        while error_rx.try_recv().is_ok() {}
        route_rx.borrow_and_update();

        let outcome = match step {
            Step::Push(target) => router.push(target.as_str()).await.map_err(|e| e.to_string()),
            Step::Replace(target) => router
                .replace(target.as_str())
                .await
                .map_err(|e| e.to_string()),
            Step::Back | Step::Forward => {
                let position = history.position();
                if *step == Step::Back {
                    history.back(true);
                } else {
                    history.forward(true);
                }
                if history.position() == position {
                    Err("no history entry in that direction".to_string())
                } else {
                    tokio::select! {
                        changed = route_rx.changed() => changed
                            .map(|_| route_rx.borrow_and_update().clone())
                            .map_err(|e| e.to_string()),
                        Some(err) = error_rx.recv() => Err(err),
                        _ = tokio::time::sleep(settle) => {
                            Err("navigation did not settle".to_string())
                        }
                    }
                }
            }
        };
        print_step(&step.to_string(), outcome)?;
    }

    shutdown.trigger();
    listener.await?;
    tracing::info!(entries = ?history.entries(), "nav-router finished");
    Ok(())
}

fn print_step(
    step: &str,
    outcome: Result<Arc<Location>, String>,
) -> Result<(), serde_json::Error> {
    let line = match outcome {
        Ok(route) => json!({ "step": step, "ok": true, "route": &*route }),
        Err(error) => json!({ "step": step, "ok": false, "error": error }),
    };
    println!("{}", serde_json::to_string(&line)?);
    Ok(())
}
