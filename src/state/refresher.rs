use crate::state::messages::LoadRequest;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::interval;

pub const RELOAD_INTERVAL: Duration = Duration::from_secs(30);

/// Periodic snapshot reload. Picks up results the data layer exported since
/// the last pass. Only sends Reload; the first load happens on startup.
pub struct PeriodicRefresher {
    load_requests: mpsc::Sender<LoadRequest>,
    every: Duration,
}

impl PeriodicRefresher {
    pub fn new(load_requests: mpsc::Sender<LoadRequest>) -> Self {
        Self { load_requests, every: RELOAD_INTERVAL }
    }

    pub async fn run(self) {
        let mut reload_interval = interval(self.every);
        // Skip the immediate first tick so startup loading isn't double-triggered.
        reload_interval.tick().await;

        loop {
            reload_interval.tick().await;
            if self.load_requests.send(LoadRequest::Reload).await.is_err() {
                break;
            }
        }
    }
}
