//! Organization settings form submission.

use std::collections::BTreeMap;
use std::fmt;

use uuid::Uuid;

use crate::apis::OrganizationsApi;
use crate::error::{ApiError, ValidationError};
use crate::types::{Organization, OrganizationUpdate};

pub const DESCRIPTION_MAX_CHARS: usize = 160;

/// Validation messages keyed by dotted field path, e.g. `profile_settings.description`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    /// Maps server validation errors onto form fields. The first location
    /// segment names the request part (`body`, `query`) and is dropped.
    pub fn from_validation(errors: &[ValidationError]) -> Self {
        let mut fields = Self::default();
        for error in errors {
            let path = error
                .loc
                .iter()
                .skip(1)
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(".");
            fields.add(path, error.msg.clone());
        }
        fields
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, messages)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {}", messages.join(", "))?;
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid organization settings: {0}")]
    Invalid(FieldErrors),

    #[error(transparent)]
    Api(ApiError),
}

/// Checks `update` locally, then submits it. A 422 from the server is mapped
/// onto form fields.
pub async fn save_organization_settings(
    api: &OrganizationsApi,
    id: Uuid,
    update: &OrganizationUpdate,
) -> Result<Organization, SettingsError> {
    let local = validate(update);
    if !local.is_empty() {
        return Err(SettingsError::Invalid(local));
    }

    match api.update(id, update).await {
        Ok(organization) => Ok(organization),
        Err(ApiError::Response(response)) if response.status() == 422 => {
            let errors = response.validation_errors();
            if errors.is_empty() {
                Err(SettingsError::Api(ApiError::Response(response)))
            } else {
                Err(SettingsError::Invalid(FieldErrors::from_validation(&errors)))
            }
        }
        Err(err) => Err(SettingsError::Api(err)),
    }
}

fn validate(update: &OrganizationUpdate) -> FieldErrors {
    let mut errors = FieldErrors::default();
    let description = update
        .profile_settings
        .as_ref()
        .and_then(|settings| settings.description.as_deref());
    if let Some(description) = description {
        // Counted in UTF-16 units, as the browser form does.
        if description.encode_utf16().count() > DESCRIPTION_MAX_CHARS {
            errors.add(
                "profile_settings.description",
                format!("Description cannot exceed {DESCRIPTION_MAX_CHARS} characters"),
            );
        }
    }
    errors
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::client::ApiClient;
    use crate::config::Configuration;
    use crate::testing::{json_response, RecordingTransport};
    use crate::types::OrganizationProfileSettings;

    fn api(status: u16, body: &'static str) -> (OrganizationsApi, Arc<RecordingTransport>) {
        let transport = Arc::new(RecordingTransport::new(move |_| json_response(status, body)));
        let config = Configuration::builder("http://api.test").access_token("pat").build().unwrap();
        let client = ApiClient::with_transport(Arc::new(config), transport.clone());
        (client.organizations(), transport)
    }

    fn rename(name: &str) -> OrganizationUpdate {
        OrganizationUpdate {
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn location_drops_request_part() {
        let errors: Vec<ValidationError> = serde_json::from_str(
            r#"[{"loc":["body","profile_settings","description"],"msg":"too long","type":"value_error"},
                {"loc":["body","links",2],"msg":"bad url","type":"value_error"},
                {"loc":["body","links",2],"msg":"not https","type":"value_error"}]"#,
        )
        .unwrap();
        let fields = FieldErrors::from_validation(&errors);
        assert_eq!(fields.get("profile_settings.description"), Some(&["too long".to_string()][..]));
        assert_eq!(fields.get("links.2").map(<[String]>::len), Some(2));
    }

    #[tokio::test]
    async fn server_validation_maps_to_field() {
        let (orgs, _) = api(422, r#"{"detail":[{"location":["body","name"],"message":"required"}]}"#);
        let err = save_organization_settings(&orgs, Uuid::from_u128(1), &rename(""))
            .await
            .unwrap_err();
        let SettingsError::Invalid(fields) = err else {
            panic!("expected field errors, got {err:?}");
        };
        assert_eq!(fields.get("name"), Some(&["required".to_string()][..]));
    }

    #[tokio::test]
    async fn long_description_is_rejected_before_sending() {
        let (orgs, transport) = api(200, "{}");
        let update = OrganizationUpdate {
            profile_settings: Some(OrganizationProfileSettings {
                description: Some("x".repeat(DESCRIPTION_MAX_CHARS + 1)),
                enabled: None,
            }),
            ..Default::default()
        };
        let err = save_organization_settings(&orgs, Uuid::from_u128(1), &update)
            .await
            .unwrap_err();
        assert!(matches!(err, SettingsError::Invalid(ref f) if f.get("profile_settings.description").is_some()));
        assert_eq!(transport.calls(), 0);
    }

    #[test]
    fn description_length_counts_utf16_units() {
        let describe = |text: String| OrganizationUpdate {
            profile_settings: Some(OrganizationProfileSettings {
                description: Some(text),
                enabled: None,
            }),
            ..Default::default()
        };
        // Each emoji is one char but two UTF-16 units.
        assert!(validate(&describe("\u{1F600}".repeat(80))).is_empty());
        assert!(!validate(&describe("\u{1F600}".repeat(81))).is_empty());
        assert!(validate(&describe("\u{e9}".repeat(DESCRIPTION_MAX_CHARS))).is_empty());
    }

    #[test]
    fn invalid_settings_message_lists_fields() {
        let mut fields = FieldErrors::default();
        fields.add("name", "required");
        fields.add("links.2", "bad url");
        fields.add("links.2", "not https");
        assert_eq!(
            SettingsError::Invalid(fields).to_string(),
            "invalid organization settings: links.2: bad url, not https; name: required"
        );
    }

    #[tokio::test]
    async fn saved_organization_is_returned() {
        let (orgs, transport) = api(
            200,
            r#"{"id":"00000000-0000-0000-0000-000000000001","name":"Acme 2","slug":"acme"}"#,
        );
        let org = save_organization_settings(&orgs, Uuid::from_u128(1), &rename("Acme 2"))
            .await
            .unwrap();
        assert_eq!(org.name, "Acme 2");
        assert_eq!(transport.requests()[0].body.as_deref(), Some(r#"{"name":"Acme 2"}"#));
    }

    #[tokio::test]
    async fn other_failures_stay_api_errors() {
        let (orgs, _) = api(403, r#"{"detail":"forbidden"}"#);
        let err = save_organization_settings(&orgs, Uuid::from_u128(1), &rename("x"))
            .await
            .unwrap_err();
        assert!(matches!(err, SettingsError::Api(ref api) if api.status() == Some(403)));
    }
}
