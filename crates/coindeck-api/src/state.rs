//! Shared handler state.

use std::sync::Arc;

use coindeck_automation::Controller;

/// State shared by all HTTP handlers.
pub struct ApiState {
    /// The automation controller this API fronts.
    pub controller: Arc<Controller>,
}

impl ApiState {
    /// Create handler state around a controller.
    pub fn new(controller: Arc<Controller>) -> Self {
        Self { controller }
    }
}
