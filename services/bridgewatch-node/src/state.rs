use std::sync::Arc;

use bridgewatch_fleet::{BroadcastSink, MonitorService};

pub struct AppState {
    pub service: Arc<MonitorService>,
    pub events: BroadcastSink,
}

impl AppState {
    pub fn new(service: Arc<MonitorService>, events: BroadcastSink) -> Self {
        AppState { service, events }
    }
}
