//! Worker heartbeat monitoring list.
//!
//! Health is computed by the workers themselves; this module only reads
//! their status through [`WorkerStatus`] and renders it.

use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;

use crate::config::site::SiteConfig;
use crate::services::presenter::html_escape;

/// How a worker's polling interval should be formatted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalFormat {
    /// Whole seconds, e.g. `300`
    Raw,
    /// Short units, e.g. `5m`
    Abbreviated,
    /// Long units, e.g. `5 minutes`
    Default,
}

/// Read-only status of a background worker
pub trait WorkerStatus: Send + Sync {
    /// Colon-namespaced name, e.g. `mail:queue`
    fn name(&self) -> String;

    /// Description, may contain markup
    fn description(&self) -> String;

    fn is_running(&self) -> bool;

    fn current_interval(&self, format: IntervalFormat) -> String;

    /// When the worker last executed
    fn last_heartbeat(&self) -> String;

    /// When the worker's liveness was last probed
    fn last_heartbeat_check(&self) -> String;
}

/// Format a duration the way worker intervals are displayed
pub fn format_interval(interval: Duration, format: IntervalFormat) -> String {
    let total = interval.as_secs();
    if format == IntervalFormat::Raw {
        return total.to_string();
    }

    let units = [
        (86_400, "d", "day"),
        (3_600, "h", "hour"),
        (60, "m", "minute"),
        (1, "s", "second"),
    ];

    let mut remaining = total;
    let mut parts = Vec::new();
    for (size, short, long) in units {
        let count = remaining / size;
        remaining %= size;
        if count == 0 {
            continue;
        }
        parts.push(match format {
            IntervalFormat::Abbreviated => format!("{}{}", count, short),
            _ if count == 1 => format!("1 {}", long),
            _ => format!("{} {}s", count, long),
        });
    }

    if parts.is_empty() {
        return match format {
            IntervalFormat::Abbreviated => "0s".to_string(),
            _ => "0 seconds".to_string(),
        };
    }

    parts.join(" ")
}

/// A plain snapshot of a worker's status, for monitors that push data
#[derive(Debug, Clone)]
pub struct WorkerSnapshot {
    pub name: String,
    pub description: String,
    pub running: bool,
    pub interval: Duration,
    pub last_heartbeat: String,
    pub last_heartbeat_check: String,
}

impl WorkerStatus for WorkerSnapshot {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn description(&self) -> String {
        self.description.clone()
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn current_interval(&self, format: IntervalFormat) -> String {
        format_interval(self.interval, format)
    }

    fn last_heartbeat(&self) -> String {
        self.last_heartbeat.clone()
    }

    fn last_heartbeat_check(&self) -> String {
        self.last_heartbeat_check.clone()
    }
}

/// Live collection of monitored workers
#[derive(Default)]
pub struct WorkerRegistry {
    workers: RwLock<Vec<Arc<dyn WorkerStatus>>>,
}

impl WorkerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a worker, replacing any existing worker with the same name
    pub fn register(&self, worker: Arc<dyn WorkerStatus>) {
        let name = worker.name();
        let mut workers = self.workers.write();
        workers.retain(|w| w.name() != name);
        workers.push(worker);
        tracing::debug!(worker = %name, "Registered worker");
    }

    pub fn unregister(&self, name: &str) -> bool {
        let mut workers = self.workers.write();
        let before = workers.len();
        workers.retain(|w| w.name() != name);
        workers.len() != before
    }

    /// Current workers, in registration order
    pub fn snapshot(&self) -> Vec<Arc<dyn WorkerStatus>> {
        self.workers.read().clone()
    }

    pub fn len(&self) -> usize {
        self.workers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.read().is_empty()
    }
}

/// `mail:queue` becomes `Mail : Queue`
pub fn format_worker_name(name: &str) -> String {
    let spaced = name.replace(':', " : ");
    let mut out = String::with_capacity(spaced.len());
    let mut word_start = true;
    for c in spaced.chars() {
        if word_start {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        word_start = c.is_whitespace();
    }
    out
}

/// Renders the worker monitoring list
#[derive(Debug, Clone)]
pub struct WorkerStatusView {
    site: SiteConfig,
}

impl WorkerStatusView {
    pub fn new(site: &SiteConfig) -> Self {
        Self { site: site.clone() }
    }

    /// URL the log panel fetches its contents from. The encoded name is
    /// lowercased as a whole, escapes included (`mail%3aqueue`).
    pub fn log_url(&self, name: &str) -> String {
        format!(
            "{}/workers/tail/{}",
            self.site.admin_url(),
            urlencoding::encode(name).to_lowercase()
        )
    }

    pub fn render_registry(&self, registry: &WorkerRegistry) -> String {
        self.render(&registry.snapshot())
    }

    pub fn render(&self, workers: &[Arc<dyn WorkerStatus>]) -> String {
        let mut html = String::from("<ul id=\"workers\" class=\"list-unstyled\">\n");
        for worker in workers {
            html.push_str(&self.render_worker(worker.as_ref()));
        }
        html.push_str("</ul>\n");
        html
    }

    fn render_worker(&self, worker: &dyn WorkerStatus) -> String {
        let name = worker.name();
        let running = worker.is_running();

        // A stopped worker's last heartbeat is also its last execution
        let heartbeat_label = if running {
            "Last heartbeat"
        } else {
            "Last heartbeat (and execution)"
        };

        format!(
            concat!(
                "<li data-js-view=\"worker\" data-log-url=\"{log_url}\" data-interval=\"{raw}\">\n",
                "<div class=\"pull-right actions\">\n",
                "<span class=\"status {status}\">Rate: <strong>{abbreviated}</strong></span>\n",
                "<a class=\"btn btn-default\">Logs</a>\n",
                "</div>\n",
                "<h3>{title}</h3>\n",
                "<p>{description}</p>\n",
                "<ul>\n",
                "<li>Last worker execution: {last_heartbeat}</li>\n",
                "<li>{heartbeat_label}: {last_check}</li>\n",
                "<li>Currently executing every: {interval}</li>\n",
                "</ul>\n",
                "<div class=\"log closed\">Loading...</div>\n",
                "</li>\n",
            ),
            log_url = html_escape(&self.log_url(&name)),
            raw = html_escape(&worker.current_interval(IntervalFormat::Raw)),
            status = if running { "ok" } else { "fail" },
            abbreviated = html_escape(&worker.current_interval(IntervalFormat::Abbreviated)),
            title = html_escape(&format_worker_name(&name)),
            description = worker.description(),
            last_heartbeat = html_escape(&worker.last_heartbeat()),
            heartbeat_label = heartbeat_label,
            last_check = html_escape(&worker.last_heartbeat_check()),
            interval = html_escape(&worker.current_interval(IntervalFormat::Default)),
        )
    }
}
