//! ApiClient: one method per controller endpoint, JSON in/out.

use thiserror::Error;

use crate::models::{ApiResponse, QueueMoveRequest, RobotStatus, StatusQuery, TaskInfo};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Creates a client for `base_url` (e.g. `http://localhost:8000`).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // Connection test

    /// True when `GET /health` answers with a success status; any transport
    /// or HTTP failure reads as "not reachable".
    pub async fn test_connection(&self) -> bool {
        match self.http.get(self.url("/health")).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    /// Raw `GET /health` body, for display.
    pub async fn health_check(&self) -> Result<String, ApiError> {
        let resp = self.http.get(self.url("/health")).send().await?;
        Ok(resp.text().await?)
    }

    // System endpoints

    pub async fn emergency_stop(&self, enabled: bool) -> Result<ApiResponse, ApiError> {
        tracing::info!(enabled, "setting emergency stop");
        let resp = self
            .http
            .put(self.url("/robot/system/e_stop"))
            .query(&[("enabled", enabled)])
            .send()
            .await?;
        Ok(resp.json().await?)
    }

    pub async fn set_worker_enabled(&self, enabled: bool) -> Result<ApiResponse, ApiError> {
        let resp = self
            .http
            .put(self.url("/robot/system/worker"))
            .query(&[("enabled", enabled)])
            .send()
            .await?;
        Ok(resp.json().await?)
    }

    pub async fn system_status(&self, query: &StatusQuery) -> Result<RobotStatus, ApiError> {
        let resp = self
            .http
            .get(self.url("/robot/system/status"))
            .query(&[
                ("include_worker", query.include_worker),
                ("include_gripper", query.include_gripper),
                ("include_motion", query.include_motion),
                ("include_system_stats", query.include_system_stats),
                ("include_workspace", query.include_workspace),
                ("include_camera", query.include_camera),
                ("quick_cpu", query.quick_cpu),
            ])
            .send()
            .await?;
        Ok(resp.json().await?)
    }

    // Motion endpoints

    pub async fn home(&self, mode: &str) -> Result<ApiResponse, ApiError> {
        tracing::info!(mode, "homing robot");
        let resp = self
            .http
            .post(self.url("/robot/motion/home"))
            .query(&[("mode", mode)])
            .send()
            .await?;
        Ok(resp.json().await?)
    }

    /// Direct move; only the axes given are sent.
    pub async fn move_direct(
        &self,
        x: Option<f64>,
        y: Option<f64>,
        z: Option<f64>,
    ) -> Result<ApiResponse, ApiError> {
        let mut query: Vec<(&str, f64)> = Vec::new();
        if let Some(x) = x {
            query.push(("x", x));
        }
        if let Some(y) = y {
            query.push(("y", y));
        }
        if let Some(z) = z {
            query.push(("z", z));
        }
        let resp = self
            .http
            .post(self.url("/robot/motion/move_direct"))
            .query(&query)
            .send()
            .await?;
        Ok(resp.json().await?)
    }

    pub async fn queue_move(&self, request: &QueueMoveRequest) -> Result<ApiResponse, ApiError> {
        let resp = self
            .http
            .post(self.url("/robot/motion/queue_move"))
            .json(request)
            .send()
            .await?;
        Ok(resp.json().await?)
    }

    // Queue endpoints

    pub async fn tasks(&self) -> Result<Vec<TaskInfo>, ApiError> {
        let resp = self.http.get(self.url("/robot/queue/tasks")).send().await?;
        Ok(resp.json().await?)
    }

    pub async fn cancel_task(&self, task_id: &str) -> Result<ApiResponse, ApiError> {
        let resp = self
            .http
            .delete(self.url(&format!("/robot/queue/tasks/{}", task_id)))
            .send()
            .await?;
        Ok(resp.json().await?)
    }

    pub async fn create_smart_task(&self, barcode: &str) -> Result<ApiResponse, ApiError> {
        let resp = self
            .http
            .post(self.url("/robot/queue/tasks/smart_task"))
            .json(&serde_json::json!({ "barcode": barcode }))
            .send()
            .await?;
        Ok(resp.json().await?)
    }
}
