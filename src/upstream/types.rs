//! Wire schemas of the certificate-management backend.
//!
//! Field names are PascalCase on the wire. The backend encodes empty lists
//! and strings as `null` at times, so every field tolerates `null` and
//! falls back to its default.

use serde::{Deserialize, Deserializer, Serialize};

/// Backend endpoint names, also used as metric labels.
pub mod endpoint {
    pub const SETTINGS: &str = "settings";
    pub const WHITELIST: &str = "whitelist";
    pub const USERS: &str = "users";
    pub const USER: &str = "user";
    pub const CERTS: &str = "certs";
    pub const CERT: &str = "cert";
    pub const EVENTS: &str = "events";
}

fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Empty JSON object sent on body-less mutations.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct Empty {}

/// Service-wide settings held by the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Settings {
    #[serde(deserialize_with = "nullable")]
    pub service_name: String,
    #[serde(deserialize_with = "nullable")]
    pub client_limit: u32,
    #[serde(deserialize_with = "nullable")]
    pub issued_cert_duration: u32,
    #[serde(deserialize_with = "nullable")]
    pub whitelisted_domains: Vec<String>,
    /// Always serialized: an empty list must reach the backend to clear it.
    #[serde(deserialize_with = "nullable")]
    pub whitelisted_users: Vec<String>,
}

/// Explicitly whitelisted user emails.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Whitelist {
    #[serde(deserialize_with = "nullable")]
    pub users: Vec<String>,
}

/// A user known to the backend with certificate aggregates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct UserSummary {
    #[serde(deserialize_with = "nullable")]
    pub email: String,
    #[serde(deserialize_with = "nullable")]
    pub active_certs: u32,
    #[serde(deserialize_with = "nullable")]
    pub inactive_certs: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct UserList {
    #[serde(deserialize_with = "nullable")]
    pub users: Vec<UserSummary>,
}

/// Certificate as listed per user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CertSummary {
    #[serde(deserialize_with = "nullable")]
    pub fingerprint: String,
    #[serde(deserialize_with = "nullable")]
    pub description: String,
    #[serde(deserialize_with = "nullable")]
    pub expires: String,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub created: String,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub revoked: String,
}

/// One user's account with active certificates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct UserDetail {
    #[serde(deserialize_with = "nullable")]
    pub email: String,
    #[serde(deserialize_with = "nullable")]
    pub created: String,
    #[serde(deserialize_with = "nullable")]
    pub active_certs: Vec<CertSummary>,
}

/// Complete certificate history of one owner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CertListing {
    #[serde(deserialize_with = "nullable")]
    pub email: String,
    #[serde(deserialize_with = "nullable")]
    pub created: String,
    #[serde(deserialize_with = "nullable")]
    pub active_certs: Vec<CertSummary>,
    #[serde(deserialize_with = "nullable")]
    pub revoked_certs: Vec<CertSummary>,
}

/// Metadata of a single certificate, looked up by fingerprint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CertRecord {
    #[serde(deserialize_with = "nullable")]
    pub email: String,
    #[serde(deserialize_with = "nullable")]
    pub fingerprint: String,
    #[serde(deserialize_with = "nullable")]
    pub description: String,
    #[serde(deserialize_with = "nullable")]
    pub created: String,
    #[serde(deserialize_with = "nullable")]
    pub expires: String,
    #[serde(deserialize_with = "nullable")]
    pub revoked: String,
}

impl CertRecord {
    pub fn is_revoked(&self) -> bool {
        !self.revoked.is_empty()
    }
}

/// Certificate creation request; also the client's `POST /api/certs` body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct NewCert {
    #[serde(deserialize_with = "nullable")]
    pub email: String,
    #[serde(deserialize_with = "nullable")]
    pub description: String,
}

/// Freshly issued client profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IssuedCert {
    #[serde(rename = "OVPNDataURL", deserialize_with = "nullable")]
    pub ovpn_data_url: String,
}

/// Second-factor state of a user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TotpUser {
    #[serde(rename = "Email", deserialize_with = "nullable")]
    pub email: String,
    #[serde(rename = "TOTPURL", deserialize_with = "nullable")]
    pub totp_url: String,
}

/// Audit record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct EventRecord {
    #[serde(deserialize_with = "nullable")]
    pub event: String,
    #[serde(deserialize_with = "nullable")]
    pub email: String,
    #[serde(deserialize_with = "nullable")]
    pub value: String,
    #[serde(deserialize_with = "nullable")]
    pub timestamp: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct EventPage {
    #[serde(deserialize_with = "nullable")]
    pub events: Vec<EventRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_null_lists_decode_as_empty() {
        let listing: CertListing = serde_json::from_value(json!({
            "Email": "alice@example.com",
            "Created": null,
            "ActiveCerts": null,
            "RevokedCerts": [{ "Fingerprint": "ab:cd", "Revoked": "2024-02-01T00:00:00Z" }]
        }))
        .unwrap();

        assert_eq!(listing.email, "alice@example.com");
        assert!(listing.active_certs.is_empty());
        assert_eq!(listing.revoked_certs[0].fingerprint, "ab:cd");
    }

    #[test]
    fn test_settings_keep_empty_user_whitelist() {
        let settings = Settings {
            service_name: "VPN".into(),
            client_limit: 2,
            issued_cert_duration: 90,
            whitelisted_domains: vec!["example.com".into()],
            whitelisted_users: Vec::new(),
        };
        assert_eq!(
            serde_json::to_value(&settings).unwrap(),
            json!({
                "ServiceName": "VPN",
                "ClientLimit": 2,
                "IssuedCertDuration": 90,
                "WhitelistedDomains": ["example.com"],
                "WhitelistedUsers": []
            })
        );
    }

    #[test]
    fn test_acronym_field_names() {
        let issued = IssuedCert { ovpn_data_url: "data:x".into() };
        assert_eq!(serde_json::to_value(&issued).unwrap(), json!({ "OVPNDataURL": "data:x" }));

        let totp: TotpUser =
            serde_json::from_value(json!({ "Email": "a@b.c", "TOTPURL": "otpauth://x" })).unwrap();
        assert_eq!(totp.totp_url, "otpauth://x");
    }
}
