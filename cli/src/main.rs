//! robotctl: command and real-time monitoring client for the robot controller.
//!
//! Issues imperative commands over the HTTP API (`robot-api`) and follows
//! state/task-progress events over the persistent stream (`robot-stream`).

mod menu;

use clap::Parser;
use robot_api::ApiClient;
use robot_event::EventKind;
use robot_stream::StreamClient;
use tracing_subscriber::EnvFilter;

const DEFAULT_BASE_URL: &str = "http://localhost:8000";

#[derive(Parser, Debug)]
#[command(name = "robotctl")]
#[command(about = "robotctl — command and monitoring client for the robot controller")]
struct Args {
    /// Controller base URL
    #[arg(long, value_name = "URL", env = "ROBOT_URL", default_value = DEFAULT_BASE_URL)]
    url: String,

    /// Print every status frame (default: the status stream is silent)
    #[arg(short, long)]
    verbose: bool,
}

/// Derives the stream URL from the HTTP base URL (`http`→`ws`, `https`→`wss`).
fn ws_base_url(http_url: &str) -> String {
    if let Some(rest) = http_url.strip_prefix("https://") {
        format!("wss://{}", rest)
    } else if let Some(rest) = http_url.strip_prefix("http://") {
        format!("ws://{}", rest)
    } else {
        http_url.to_string()
    }
}

fn register_stream_handlers(stream: &StreamClient, verbose: bool) {
    stream.on_connected(|| println!("[ws] connected"));
    stream.on_disconnected(|| println!("[ws] disconnected"));

    if verbose {
        stream.subscribe(EventKind::Status, |env| {
            if let Some(pos) = &env.position {
                println!(
                    "[ws] status: x={:?} y={:?} z={:?}",
                    pos.x_millimeters(),
                    pos.y_millimeters(),
                    pos.z_millimeters()
                );
            }
        });
    }

    stream.subscribe(EventKind::Error, |env| {
        println!(
            "[ws] error ({}): {}",
            env.severity.as_deref().unwrap_or("unspecified"),
            env.error
                .as_deref()
                .or(env.message.as_deref())
                .unwrap_or("<no detail>")
        );
    });
    stream.subscribe(EventKind::TaskUpdate, |env| {
        println!(
            "[ws] task {}: {} ({}%)",
            env.task_id.as_deref().unwrap_or("?"),
            env.status.as_deref().unwrap_or("update"),
            env.progress.unwrap_or(0)
        );
    });
    stream.subscribe(EventKind::TaskCompleted, |env| {
        println!(
            "[ws] task {} completed: {}",
            env.task_id.as_deref().unwrap_or("?"),
            env.result.as_deref().unwrap_or("ok")
        );
    });
    stream.subscribe(EventKind::TaskFailed, |env| {
        println!(
            "[ws] task {} failed: {} ({})",
            env.task_id.as_deref().unwrap_or("?"),
            env.error.as_deref().unwrap_or("unknown error"),
            env.details.as_deref().unwrap_or("-")
        );
    });
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    tracing::debug!(url = %args.url, "starting robotctl");
    let api = ApiClient::new(&args.url);
    let stream = StreamClient::new(ws_base_url(&args.url));
    register_stream_handlers(&stream, args.verbose);

    println!("=== Robot Control Client — Monitoring Mode ===\n");
    println!("Connecting to event stream...");
    if let Err(e) = stream.connect().await {
        // Commands still work without the stream; the menu shows the state.
        eprintln!("Could not connect to event stream: {}", e);
    }

    menu::run(&api, &stream).await?;

    stream.disconnect().await;
    println!("\nBye.");
    Ok(())
}
