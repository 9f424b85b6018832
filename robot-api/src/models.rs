//! Typed request/response bodies for the controller HTTP API.

use robot_event::Position;
use serde::{Deserialize, Serialize};

/// Generic command acknowledgment returned by most endpoints.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ApiResponse {
    pub status: Option<String>,
    pub message: Option<String>,
    pub task_id: Option<String>,
    pub details: Option<serde_json::Value>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct GripperStatus {
    pub vacuum_enabled: bool,
    pub holding_item: bool,
    pub held_barcode: Option<String>,
    pub is_homed: bool,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct WorkerStatus {
    pub enabled: bool,
    pub processing: bool,
    pub current_task: Option<String>,
    pub queue_size: u32,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct SystemStats {
    pub cpu_percent: f64,
    pub memory_percent: f64,
    pub disk_usage_percent: f64,
    pub temperature: f64,
    pub uptime: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct RobotStatus {
    pub hardware_initialized: bool,
    pub homed: bool,
    pub emergency_stopped: bool,
    pub position: Option<Position>,
    pub gripper: Option<GripperStatus>,
    pub worker: Option<WorkerStatus>,
    pub system_stats: Option<SystemStats>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct TaskInfo {
    pub task_id: Option<String>,
    #[serde(rename = "type")]
    pub task_type: Option<String>,
    pub status: Option<String>,
    pub description: Option<String>,
    pub created_at: Option<i64>,
    pub error: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct QueueMoveRequest {
    pub x_mm: f64,
    pub y_mm: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rpm_x: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rpm_y: Option<u32>,
}

/// Which sections `GET /robot/system/status` should include.
#[derive(Clone, Copy, Debug)]
pub struct StatusQuery {
    pub include_worker: bool,
    pub include_gripper: bool,
    pub include_motion: bool,
    pub include_system_stats: bool,
    pub include_workspace: bool,
    pub include_camera: bool,
    pub quick_cpu: bool,
}

impl Default for StatusQuery {
    fn default() -> Self {
        Self {
            include_worker: true,
            include_gripper: true,
            include_motion: true,
            include_system_stats: true,
            include_workspace: true,
            include_camera: true,
            quick_cpu: true,
        }
    }
}
