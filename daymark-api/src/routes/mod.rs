/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Authentication and profile endpoints
/// - `projects`: Project CRUD plus board and gantt views
/// - `tasks`: Task CRUD, subtasks, comments, and day views
/// - `habits`: Habit CRUD, log toggling, and the weekly grid

use serde::{Deserialize, Serialize};

pub mod auth;
pub mod habits;
pub mod health;
pub mod projects;
pub mod tasks;

/// Plain confirmation body returned by delete endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
