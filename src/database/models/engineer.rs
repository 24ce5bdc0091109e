use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Engineer profile row. `username` is the primary key and never changes
/// after creation.
///
/// Profile fields use lowercase JSON names while the lifecycle columns keep
/// their capitalized names; existing clients depend on both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Engineer {
    pub username: String,
    #[serde(rename = "firstname", default)]
    pub first_name: String,
    #[serde(rename = "lastname", default)]
    pub last_name: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub division: String,
    #[serde(default)]
    pub position: String,
    #[serde(rename = "CreatedAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "UpdatedAt")]
    pub updated_at: DateTime<Utc>,
    #[serde(rename = "DeletedAt", default, with = "zero_time")]
    pub deleted_at: Option<DateTime<Utc>>,
    #[serde(rename = "Version")]
    pub version: i64,
}

impl Engineer {
    /// Whether the record has been soft deleted.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Merge a patch into this profile. Only non-empty first name, last name,
    /// city and division overwrite; username and position are left alone.
    pub fn apply_patch(&mut self, patch: EngineerTemplate) {
        overwrite(&mut self.first_name, patch.first_name);
        overwrite(&mut self.last_name, patch.last_name);
        overwrite(&mut self.city, patch.city);
        overwrite(&mut self.division, patch.division);
    }
}

fn overwrite(field: &mut String, incoming: Option<String>) {
    if let Some(value) = incoming.filter(|value| !value.is_empty()) {
        *field = value;
    }
}

/// Request body for create and update. Every field is optional at the
/// binding level; handlers decide which ones matter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EngineerTemplate {
    pub username: Option<String>,
    #[serde(rename = "firstname")]
    pub first_name: Option<String>,
    #[serde(rename = "lastname")]
    pub last_name: Option<String>,
    pub city: Option<String>,
    pub division: Option<String>,
    pub position: Option<String>,
}

impl EngineerTemplate {
    pub fn username(&self) -> &str {
        self.username.as_deref().unwrap_or_default()
    }
}

/// Unsaved record built from a create body. Version 0 marks it as not yet
/// persisted; the store assigns timestamps and version on insert.
impl From<EngineerTemplate> for Engineer {
    fn from(template: EngineerTemplate) -> Self {
        let now = Utc::now();
        Self {
            username: template.username.unwrap_or_default(),
            first_name: template.first_name.unwrap_or_default(),
            last_name: template.last_name.unwrap_or_default(),
            city: template.city.unwrap_or_default(),
            division: template.division.unwrap_or_default(),
            position: template.position.unwrap_or_default(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
            version: 0,
        }
    }
}

/// Exact-match filters for listing active engineers.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EngineerFilter {
    pub city: Option<String>,
    pub division: Option<String>,
    pub position: Option<String>,
}

impl EngineerFilter {
    pub fn matches(&self, engineer: &Engineer) -> bool {
        fn field_matches(wanted: &Option<String>, actual: &str) -> bool {
            wanted.as_deref().map_or(true, |wanted| wanted == actual)
        }

        field_matches(&self.city, &engineer.city)
            && field_matches(&self.division, &engineer.division)
            && field_matches(&self.position, &engineer.position)
    }
}

/// `DeletedAt` travels as the zero timestamp while a record is active.
mod zero_time {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub const ZERO_TIME: &str = "0001-01-01T00:00:00Z";

    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(at) => at.serialize(serializer),
            None => serializer.serialize_str(ZERO_TIME),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw.as_deref() {
            None | Some("") | Some(ZERO_TIME) => Ok(None),
            Some(text) => DateTime::parse_from_rfc3339(text)
                .map(|at| Some(at.with_timezone(&Utc)))
                .map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Engineer {
        Engineer::from(EngineerTemplate {
            username: Some("masud".into()),
            first_name: Some("Masudur".into()),
            last_name: Some("Rahman".into()),
            city: Some("Madaripur".into()),
            division: Some("Dhaka".into()),
            position: Some("Software Engineer".into()),
        })
    }

    #[test]
    fn serializes_with_mixed_field_casing() {
        let value = serde_json::to_value(sample()).unwrap();
        let object = value.as_object().unwrap();

        for key in [
            "username", "firstname", "lastname", "city", "division", "position",
            "CreatedAt", "UpdatedAt", "DeletedAt", "Version",
        ] {
            assert!(object.contains_key(key), "missing {key} in {value}");
        }
        assert_eq!(object.len(), 10);
        assert_eq!(value["DeletedAt"], json!("0001-01-01T00:00:00Z"));
    }

    #[test]
    fn zero_deleted_at_reads_back_as_active() {
        let text = serde_json::to_string(&sample()).unwrap();
        let parsed: Engineer = serde_json::from_str(&text).unwrap();
        assert!(!parsed.is_deleted());
        assert_eq!(parsed.first_name, "Masudur");
    }

    #[test]
    fn patch_only_overwrites_non_empty_profile_fields() {
        let mut engineer = sample();
        let patch: EngineerTemplate = serde_json::from_value(json!({
            "username": "someone-else",
            "firstname": "",
            "city": "Khulna",
            "division": "Khulna",
            "position": "Manager"
        }))
        .unwrap();

        engineer.apply_patch(patch);

        assert_eq!(engineer.username, "masud");
        assert_eq!(engineer.first_name, "Masudur");
        assert_eq!(engineer.last_name, "Rahman");
        assert_eq!(engineer.city, "Khulna");
        assert_eq!(engineer.division, "Khulna");
        assert_eq!(engineer.position, "Software Engineer");
    }

    #[test]
    fn template_tolerates_nulls_and_unknown_fields() {
        let template: EngineerTemplate = serde_json::from_value(json!({
            "username": "fahim",
            "city": null,
            "Version": 42
        }))
        .unwrap();
        assert_eq!(template.username(), "fahim");
        assert!(template.city.is_none());
    }

    #[test]
    fn filter_matches_on_every_given_field() {
        let engineer = sample();
        let by_city = EngineerFilter { city: Some("Madaripur".into()), ..Default::default() };
        let wrong_division = EngineerFilter {
            city: Some("Madaripur".into()),
            division: Some("Chittagong".into()),
            ..Default::default()
        };

        assert!(EngineerFilter::default().matches(&engineer));
        assert!(by_city.matches(&engineer));
        assert!(!wrong_division.matches(&engineer));
    }
}
