//! Display helpers for admin rows in the admin panel.

use crate::config::site::SiteConfig;
use crate::models::admin;
use crate::services::security::gravatar_hash;

const GRAVATAR_BASE: &str = "https://www.gravatar.com/avatar/";

/// Derives display-only values from an admin and the current actor
#[derive(Debug, Clone)]
pub struct AdminPresenter {
    site: SiteConfig,
}

impl AdminPresenter {
    pub fn new(site: &SiteConfig) -> Self {
        Self { site: site.clone() }
    }

    /// Full name, used both as the admin's name and as their list title
    pub fn display_name(&self, admin: &admin::Model) -> String {
        format!("{} {}", admin.first_name, admin.last_name)
            .trim()
            .to_string()
    }

    /// List title with a leading thumbnail: the uploaded image if there is
    /// one, otherwise the gravatar for the admin's email
    pub fn title_html(&self, admin: &admin::Model) -> String {
        let name = html_escape(&self.display_name(admin));
        match admin.image.as_deref().filter(|i| !i.is_empty()) {
            Some(image) => format!(
                "<img src='{}' class='img-thumbnail'/> {}",
                html_escape(&self.image_url(image)),
                name
            ),
            None => format!(
                "<img src='{}' class='gravatar'/> {}",
                gravatar_url(&admin.email),
                name
            ),
        }
    }

    /// "You" and "Disabled" badges for the admin list
    pub fn status_html(&self, admin: &admin::Model, actor_id: i64) -> String {
        let mut html = String::new();

        if admin.id == actor_id {
            html.push_str(r#"<span class="label label-info">You</span>"#);
        }

        if self.disabled(admin) {
            html.push_str(&format!(
                r#"<a href="{}" class="label label-warning js-tooltip" title="Click to enable login">Disabled</a>"#,
                self.enable_url(admin.id)
            ));
        }

        html
    }

    pub fn disabled(&self, admin: &admin::Model) -> bool {
        admin.disabled()
    }

    /// Target of the enable action for an admin
    pub fn enable_url(&self, id: i64) -> String {
        format!("{}/admins/enable/{}", self.site.admin_url(), id)
    }

    fn image_url(&self, image: &str) -> String {
        if image.starts_with("http://") || image.starts_with("https://") {
            image.to_string()
        } else {
            format!("{}/{}", self.site.root_url, image.trim_start_matches('/'))
        }
    }
}

/// Deterministic avatar URL for an email address
pub fn gravatar_url(email: &str) -> String {
    format!("{}{}", GRAVATAR_BASE, gravatar_hash(email))
}

pub(crate) fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn site() -> SiteConfig {
        SiteConfig {
            name: "Acme".to_string(),
            root_url: "https://acme.test".to_string(),
            admin_dir: "admin".to_string(),
        }
    }

    fn admin(id: i64, active: bool) -> admin::Model {
        admin::Model {
            id,
            first_name: "Ann".to_string(),
            last_name: "Lee".to_string(),
            email: "ann@x.com".to_string(),
            password: "$2b$12$hash".to_string(),
            image: None,
            active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_display_name() {
        let presenter = AdminPresenter::new(&site());
        assert_eq!(presenter.display_name(&admin(1, true)), "Ann Lee");
    }

    #[test]
    fn test_title_uses_gravatar_without_image() {
        let presenter = AdminPresenter::new(&site());
        let html = presenter.title_html(&admin(1, true));
        assert_eq!(
            html,
            format!("<img src='{}' class='gravatar'/> Ann Lee", gravatar_url("ann@x.com"))
        );
    }

    #[test]
    fn test_title_uses_uploaded_image() {
        let presenter = AdminPresenter::new(&site());
        let mut model = admin(1, true);
        model.image = Some("/uploads/ann.png".to_string());
        assert_eq!(
            presenter.title_html(&model),
            "<img src='https://acme.test/uploads/ann.png' class='img-thumbnail'/> Ann Lee"
        );
    }

    #[test]
    fn test_title_escapes_name() {
        let presenter = AdminPresenter::new(&site());
        let mut model = admin(1, true);
        model.first_name = "<b>Ann</b>".to_string();
        assert!(presenter.title_html(&model).contains("&lt;b&gt;Ann&lt;/b&gt; Lee"));
    }

    #[test]
    fn test_status_badges() {
        let presenter = AdminPresenter::new(&site());

        assert_eq!(presenter.status_html(&admin(1, true), 2), "");

        let you = presenter.status_html(&admin(1, true), 1);
        assert!(you.contains(">You<"));
        assert!(!you.contains("Disabled"));

        let disabled = presenter.status_html(&admin(1, false), 2);
        assert!(!disabled.contains(">You<"));
        assert!(disabled.contains(r#"href="https://acme.test/admin/admins/enable/1""#));

        let both = presenter.status_html(&admin(1, false), 1);
        assert!(both.contains(">You<") && both.contains(">Disabled<"));
        assert!(both.find("You").unwrap() < both.find("Disabled").unwrap());
    }

    #[test]
    fn test_disabled() {
        let presenter = AdminPresenter::new(&site());
        assert!(!presenter.disabled(&admin(1, true)));
        assert!(presenter.disabled(&admin(1, false)));
    }
}
