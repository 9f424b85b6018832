//! Request/response command client for the robot controller.
//!
//! Stateless: one call in, one decoded value out. Everything long-lived
//! (the event stream, its lifecycle, subscriptions) lives in `robot-stream`.

pub mod client;
pub mod models;

pub use client::{ApiClient, ApiError};
pub use models::{
    ApiResponse, GripperStatus, QueueMoveRequest, RobotStatus, StatusQuery, SystemStats, TaskInfo,
    WorkerStatus,
};
