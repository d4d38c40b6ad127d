use serde::{Deserialize, Deserializer, Serialize};

use crate::models::admin;

/// Fields submitted by the admin create/edit form.
///
/// `active` is not a form field: it is defaulted on create and only
/// changed by the enable/disable action.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminInput {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub confirm_password: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(rename = "_send_email", default, deserialize_with = "flag_present")]
    pub send_email: bool,
}

impl AdminInput {
    /// The submitted password, treating an empty form field as absent
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref().filter(|p| !p.is_empty())
    }

    pub fn image(&self) -> Option<&str> {
        self.image.as_deref().filter(|i| !i.is_empty())
    }
}

/// A checkbox counts as set whenever it is submitted with a truthy value.
fn flag_present<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => false,
        Some(serde_json::Value::Bool(b)) => b,
        Some(serde_json::Value::String(s)) => !matches!(s.as_str(), "" | "0" | "false"),
        Some(serde_json::Value::Number(n)) => n.as_i64() != Some(0),
        Some(_) => true,
    })
}

/// The authenticated admin performing a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentActor {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl From<&admin::Model> for CurrentActor {
    fn from(model: &admin::Model) -> Self {
        Self {
            id: model.id,
            first_name: model.first_name.clone(),
            last_name: model.last_name.clone(),
            email: model.email.clone(),
        }
    }
}

impl From<admin::Model> for CurrentActor {
    fn from(model: admin::Model) -> Self {
        Self {
            id: model.id,
            first_name: model.first_name,
            last_name: model.last_name,
            email: model.email,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_email_flag_variants() {
        let cases = [
            (r#"{"_send_email": true}"#, true),
            (r#"{"_send_email": "1"}"#, true),
            (r#"{"_send_email": "on"}"#, true),
            (r#"{"_send_email": 1}"#, true),
            (r#"{"_send_email": false}"#, false),
            (r#"{"_send_email": "0"}"#, false),
            (r#"{"_send_email": ""}"#, false),
            (r#"{"_send_email": null}"#, false),
            (r#"{}"#, false),
        ];
        for (json, expected) in cases {
            let input: AdminInput = serde_json::from_str(json).unwrap();
            assert_eq!(input.send_email, expected, "input: {}", json);
        }
    }

    #[test]
    fn test_empty_password_is_absent() {
        let input: AdminInput = serde_json::from_str(r#"{"password": ""}"#).unwrap();
        assert_eq!(input.password(), None);

        let input: AdminInput = serde_json::from_str(r#"{"password": "secret123"}"#).unwrap();
        assert_eq!(input.password(), Some("secret123"));
    }

    #[test]
    fn test_active_is_not_accepted() {
        // Unknown fields are ignored, so a submitted `active` has no effect
        let input: AdminInput =
            serde_json::from_str(r#"{"first_name": "Ann", "active": false}"#).unwrap();
        assert_eq!(input.first_name, "Ann");
    }
}
