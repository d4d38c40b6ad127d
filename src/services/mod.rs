pub mod credentials;
pub mod lifecycle;
pub mod notification;
pub mod presenter;
pub mod security;
pub mod workers;

pub use credentials::{rules_for, RuleSet, RuleTarget};
pub use lifecycle::{AdminLifecycle, Delivery, SaveOutcome};
pub use notification::{NotificationGateway, SmtpGateway};
pub use presenter::AdminPresenter;
pub use security::*;
pub use workers::{WorkerRegistry, WorkerStatus, WorkerStatusView};
