use crate::store::StoredRecord;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;

/// A cloud project allowed to talk to this device.
///
/// Read from the config file in snake_case, written to the wire in camelCase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct AuthorizedApp {
    pub project_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub icon_url: String,
    #[serde(default)]
    pub android_apps: Vec<AndroidApp>,
}

/// An Android package acting on behalf of the project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AndroidApp {
    pub package_name: String,
    pub certificate_hash: String,
}

/// Payload of `AuthorizedApps.Get`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizedAppsListResponse {
    pub id: String,
    pub kind: String,
    pub authorized_apps: Vec<AuthorizedApp>,
}

// Authorized apps are provisioned at boot and read-only afterwards.
impl StoredRecord for AuthorizedApp {
    type Change = Infallible;
    type Error = Infallible;

    fn id(&self) -> &str {
        &self.project_id
    }

    fn apply(&mut self, change: Infallible) -> Result<(), Infallible> {
        match change {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_shape() {
        let app = AuthorizedApp {
            project_id: "home-automation".to_string(),
            display_name: String::new(),
            icon_url: "https://example.com/icon.png".to_string(),
            android_apps: vec![AndroidApp {
                package_name: "com.example.home".to_string(),
                certificate_hash: "AB:CD".to_string(),
            }],
        };
        assert_eq!(
            serde_json::to_value(&app).unwrap(),
            json!({
                "projectId": "home-automation",
                "iconUrl": "https://example.com/icon.png",
                "androidApps": [{"package_name": "com.example.home", "certificate_hash": "AB:CD"}]
            })
        );
    }
}
