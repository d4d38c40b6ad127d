use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::services::lifecycle::AdminLifecycle;
use crate::services::notification::{NotificationGateway, SmtpGateway};
use crate::services::presenter::AdminPresenter;
use crate::services::workers::{WorkerRegistry, WorkerStatusView};

pub use crate::application::database::DbConn;

/// Shared notification gateway
pub type SharedGateway = Arc<dyn NotificationGateway>;

/// Shared worker registry
pub type SharedWorkers = Arc<WorkerRegistry>;

/// Application state containing all shared resources
#[derive(Clone)]
pub struct AppState {
    pub db: DbConn,
    pub config: Arc<Config>,
    pub gateway: SharedGateway,
    pub workers: SharedWorkers,
}

impl AppState {
    pub fn new(db: DbConn, config: Config, gateway: SharedGateway, workers: SharedWorkers) -> Self {
        Self {
            db,
            config: Arc::new(config),
            gateway,
            workers,
        }
    }

    /// State that delivers notifications over the configured SMTP relay
    pub fn with_smtp(db: DbConn, config: Config) -> Result<Self> {
        let gateway: SharedGateway = Arc::new(SmtpGateway::from_config(&config.mail)?);
        Ok(Self::new(db, config, gateway, Arc::new(WorkerRegistry::new())))
    }

    pub fn lifecycle(&self) -> AdminLifecycle {
        AdminLifecycle::new(
            self.db.clone(),
            &self.config.site,
            &self.config.mail,
            self.gateway.clone(),
        )
    }

    pub fn presenter(&self) -> AdminPresenter {
        AdminPresenter::new(&self.config.site)
    }

    pub fn worker_view(&self) -> WorkerStatusView {
        WorkerStatusView::new(&self.config.site)
    }

    /// Render the worker monitoring list from the live registry
    pub fn render_workers(&self) -> String {
        self.worker_view().render_registry(&self.workers)
    }
}
