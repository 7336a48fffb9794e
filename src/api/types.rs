//! Client-facing schemas that differ from the backend's.
//!
//! Where the client sees exactly what the backend sent (settings, whitelist,
//! events, issued profiles) the wire types in `upstream::types` are reused.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::GatewayError;
use crate::upstream::types::{CertSummary, Settings};

/// Machine timestamp format used by the backend.
const BACKEND_TIMESTAMP: &str = "%Y-%m-%dT%H:%M:%SZ";
/// Date-only display form sent to clients.
const DISPLAY_DATE: &str = "%Y-%m-%d";

/// Client landing page for each role.
pub mod landing {
    pub const DISALLOWED: &str = "/sorry";
    pub const ALLOWED: &str = "/devices";
    pub const ADMIN: &str = "/users";
}

/// Initial client state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InitArtifact {
    pub is_admin: bool,
    pub service_name: String,
    pub default_path: String,
    pub max_clients: u32,
}

/// Partial settings sent by an administrator. Absent fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SettingsUpdate {
    pub service_name: Option<String>,
    pub client_limit: Option<u32>,
    pub issued_cert_duration: Option<u32>,
    pub whitelisted_domains: Option<Vec<String>>,
    pub whitelisted_users: Option<Vec<String>>,
}

impl SettingsUpdate {
    pub fn apply(self, mut settings: Settings) -> Settings {
        if let Some(service_name) = self.service_name {
            settings.service_name = service_name;
        }
        if let Some(client_limit) = self.client_limit {
            settings.client_limit = client_limit;
        }
        if let Some(duration) = self.issued_cert_duration {
            settings.issued_cert_duration = duration;
        }
        if let Some(domains) = self.whitelisted_domains {
            settings.whitelisted_domains = domains;
        }
        if let Some(users) = self.whitelisted_users {
            settings.whitelisted_users = users;
        }
        settings
    }
}

/// Active certificates of one owner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CertsArtifact {
    pub certs: Vec<CertSummary>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TotpStatus {
    pub configured: bool,
}

/// Freshly generated second-factor seed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotpSeed {
    #[serde(rename = "ImageURL")]
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeletedUser {
    pub email: String,
}

/// Reformat a backend timestamp as `YYYY-MM-DD`.
pub fn display_date(timestamp: &str) -> Result<String, GatewayError> {
    NaiveDateTime::parse_from_str(timestamp, BACKEND_TIMESTAMP)
        .map(|parsed| parsed.format(DISPLAY_DATE).to_string())
        .map_err(|source| GatewayError::Timestamp {
            value: timestamp.to_string(),
            source,
        })
}

/// Rewrite every certificate's expiry into display form.
pub fn format_expiries(certs: &mut [CertSummary]) -> Result<(), GatewayError> {
    for cert in certs {
        cert.expires = display_date(&cert.expires)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_display_date() {
        assert_eq!(display_date("2024-01-02T03:04:05Z").unwrap(), "2024-01-02");
        assert_eq!(display_date("1999-12-31T23:59:59Z").unwrap(), "1999-12-31");
    }

    #[test]
    fn test_malformed_timestamp_is_fatal() {
        for bad in ["", "2024-01-02", "2024-13-02T03:04:05Z", "yesterday"] {
            let err = display_date(bad).unwrap_err();
            assert!(matches!(err, GatewayError::Timestamp { .. }), "{bad}");
        }
    }

    #[test]
    fn test_format_expiries_stops_at_first_bad_record() {
        let mut certs = vec![
            CertSummary {
                expires: "2024-01-02T03:04:05Z".into(),
                ..Default::default()
            },
            CertSummary {
                expires: "garbage".into(),
                ..Default::default()
            },
        ];
        assert!(format_expiries(&mut certs).is_err());
        assert_eq!(certs[0].expires, "2024-01-02");
    }

    #[test]
    fn test_settings_update_merges_present_fields_only() {
        let current = Settings {
            service_name: "VPN".into(),
            client_limit: 2,
            issued_cert_duration: 90,
            whitelisted_domains: vec!["example.com".into()],
            whitelisted_users: vec![],
        };
        let update: SettingsUpdate =
            serde_json::from_value(json!({ "ClientLimit": 5, "WhitelistedDomains": [] })).unwrap();

        let merged = update.apply(current);
        assert_eq!(merged.service_name, "VPN");
        assert_eq!(merged.client_limit, 5);
        assert_eq!(merged.issued_cert_duration, 90);
        assert!(merged.whitelisted_domains.is_empty());
    }

    #[test]
    fn test_init_artifact_wire_names() {
        let artifact = InitArtifact {
            is_admin: false,
            service_name: "VPN".into(),
            default_path: landing::ALLOWED.into(),
            max_clients: 2,
        };
        assert_eq!(
            serde_json::to_value(artifact).unwrap(),
            json!({
                "IsAdmin": false,
                "ServiceName": "VPN",
                "DefaultPath": "/devices",
                "MaxClients": 2
            })
        );
    }
}
