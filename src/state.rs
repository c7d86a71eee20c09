use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Utc};

use crate::config::PortalConfig;
use crate::services::backend::Backend;
use crate::services::clock::{Clock, SystemClock};
use crate::services::login_guard::LoginThrottle;
use crate::services::sessions::InFlight;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<PortalConfig>,
    pub backend: Arc<dyn Backend>,
    pub in_flight: InFlight,
    pub logins: LoginThrottle,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(config: PortalConfig, backend: Arc<dyn Backend>) -> Self {
        AppState {
            config: Arc::new(config),
            backend,
            in_flight: InFlight::new(),
            logins: LoginThrottle::new(),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Wall time at the institute, used for "this month".
    pub fn local_now(&self) -> DateTime<FixedOffset> {
        self.now().with_timezone(&self.config.local_offset)
    }
}
