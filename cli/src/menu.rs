//! Numbered menu loop over stdin. On command error, prints to stderr and
//! continues; only option 0 / EOF leaves the loop.

use std::io::Write;

use robot_api::{ApiClient, ApiError, ApiResponse, StatusQuery};
use robot_stream::StreamClient;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

type Reader = Lines<BufReader<Stdin>>;

pub async fn run(
    api: &ApiClient,
    stream: &StreamClient,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print_menu(stream.is_connected());
        print!("\nSelect option: ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break; // EOF
        };
        match line.trim() {
            "" => continue,
            "1" => show_status(api).await,
            "2" => connection_test(api, stream).await,
            "3" => print_ack(api.emergency_stop(true).await),
            "4" => print_ack(api.emergency_stop(false).await),
            "5" => print_ack(api.home("big").await),
            "6" => print_ack(api.set_worker_enabled(true).await),
            "7" => print_ack(api.set_worker_enabled(false).await),
            "8" => list_tasks(api).await,
            "9" => cancel_task(api, &mut lines).await?,
            "10" => smart_task(api, &mut lines).await?,
            "0" | "q" | "quit" | "exit" => break,
            other => println!("Invalid option: {}", other),
        }
    }
    Ok(())
}

fn print_menu(stream_connected: bool) {
    println!("\n--- Main Menu (stream: {}) ---", if stream_connected { "connected" } else { "disconnected" });
    println!("1. Robot system status");
    println!("2. Connection test");
    println!("3. Emergency stop");
    println!("4. Clear emergency stop");
    println!("5. Home robot");
    println!("6. Enable worker");
    println!("7. Disable worker");
    println!("8. List queued tasks");
    println!("9. Cancel a task");
    println!("10. Create smart task");
    println!("0. Exit");
}

fn print_ack(result: Result<ApiResponse, ApiError>) {
    match result {
        Ok(resp) => println!(
            "{}: {}",
            resp.status.as_deref().unwrap_or("ok"),
            resp.message.as_deref().unwrap_or("")
        ),
        Err(e) => eprintln!("command failed: {}", e),
    }
}

async fn show_status(api: &ApiClient) {
    println!("\nFetching robot system status...");
    let status = match api.system_status(&StatusQuery::default()).await {
        Ok(s) => s,
        Err(e) => {
            eprintln!("status request failed: {}", e);
            return;
        }
    };

    println!("\n--- Robot System Status ---");
    println!("Hardware initialized: {}", status.hardware_initialized);
    println!("Homed:                {}", status.homed);
    println!("Emergency stopped:    {}", status.emergency_stopped);
    if let Some(pos) = &status.position {
        println!(
            "Position (mm):        x={} y={} z={}",
            fmt_axis(pos.x_millimeters()),
            fmt_axis(pos.y_millimeters()),
            fmt_axis(pos.z_millimeters())
        );
    }
    if let Some(worker) = &status.worker {
        println!("Worker enabled:       {}", worker.enabled);
        println!("Queue size:           {}", worker.queue_size);
    }
    if let Some(gripper) = &status.gripper {
        println!("Vacuum enabled:       {}", gripper.vacuum_enabled);
        println!("Holding item:         {}", gripper.holding_item);
    }
    if let Some(stats) = &status.system_stats {
        println!("CPU:                  {:.1}%", stats.cpu_percent);
        println!("Memory:               {:.1}%", stats.memory_percent);
    }
}

/// Quick end-to-end check: health endpoint, a trimmed status fetch, and the
/// event stream state.
async fn connection_test(api: &ApiClient, stream: &StreamClient) {
    println!("\n[1/2] Testing controller API...");
    match api.health_check().await {
        Ok(body) => {
            println!("API reachable, health response: {}", body.trim());
            let query = StatusQuery {
                include_system_stats: false, // faster response
                include_camera: false,
                ..StatusQuery::default()
            };
            match api.system_status(&query).await {
                Ok(status) => {
                    println!("Hardware initialized: {}", status.hardware_initialized);
                    println!("Homed:                {}", status.homed);
                    println!("Emergency stopped:    {}", status.emergency_stopped);
                }
                Err(e) => eprintln!("status request failed: {}", e),
            }
        }
        Err(e) => eprintln!("API unreachable: {}", e),
    }
    println!(
        "[2/2] Event stream: {}",
        if stream.is_connected() { "connected" } else { "disconnected" }
    );
}

fn fmt_axis(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.1}", v))
        .unwrap_or_else(|| "-".to_string())
}

async fn list_tasks(api: &ApiClient) {
    match api.tasks().await {
        Ok(tasks) if tasks.is_empty() => println!("No queued tasks."),
        Ok(tasks) => {
            for task in tasks {
                println!(
                    "{}  {}  {}",
                    task.task_id.as_deref().unwrap_or("?"),
                    task.task_type.as_deref().unwrap_or("-"),
                    task.status.as_deref().unwrap_or("-")
                );
            }
        }
        Err(e) => eprintln!("task list failed: {}", e),
    }
}

async fn cancel_task(
    api: &ApiClient,
    lines: &mut Reader,
) -> Result<(), Box<dyn std::error::Error>> {
    print!("Task ID to cancel: ");
    std::io::stdout().flush()?;
    if let Some(id) = lines.next_line().await? {
        let id = id.trim();
        if !id.is_empty() {
            print_ack(api.cancel_task(id).await);
        }
    }
    Ok(())
}

async fn smart_task(
    api: &ApiClient,
    lines: &mut Reader,
) -> Result<(), Box<dyn std::error::Error>> {
    print!("Barcode: ");
    std::io::stdout().flush()?;
    if let Some(barcode) = lines.next_line().await? {
        let barcode = barcode.trim();
        if !barcode.is_empty() {
            print_ack(api.create_smart_task(barcode).await);
        }
    }
    Ok(())
}
