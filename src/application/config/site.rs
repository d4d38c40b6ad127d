use std::env;

/// Site-wide settings used to build links and email subjects
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// Human readable site name, used in notification subjects
    pub name: String,
    /// Scheme and host of the public site, without a trailing slash
    pub root_url: String,
    /// Path segment the admin panel is mounted under
    pub admin_dir: String,
}

impl SiteConfig {
    pub fn from_env() -> Self {
        Self {
            name: env::var("STEWARD_SITE_NAME").unwrap_or_else(|_| "Admin".to_string()),
            root_url: env::var("STEWARD_ROOT_URL")
                .unwrap_or_else(|_| "http://localhost:8000".to_string())
                .trim_end_matches('/')
                .to_string(),
            admin_dir: env::var("STEWARD_ADMIN_DIR")
                .unwrap_or_else(|_| "admin".to_string())
                .trim_matches('/')
                .to_string(),
        }
    }

    /// Absolute URL of the admin panel
    pub fn admin_url(&self) -> String {
        format!("{}/{}", self.root_url, self.admin_dir)
    }
}
