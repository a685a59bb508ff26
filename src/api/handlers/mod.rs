pub mod achievements;
pub mod health;
pub mod leagues;
pub mod markets;
pub mod members;
pub mod metrics;
pub mod positions;
pub mod tasks;
pub mod trades;

use serde::Serialize;

/// Standard response envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}
