use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};
use utoipa::ToSchema;
use validator::Validate;

use super::employee::Employee;

/// Attendance status. No other value is accepted anywhere in the kiosk.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    ToSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum PresenceStatus {
    Present,
    Absent,
    /// Late arrival.
    Retard,
    /// Half day.
    DemiJournee,
}

impl PresenceStatus {
    pub fn label(&self) -> &'static str {
        match self {
            PresenceStatus::Present => "Présent",
            PresenceStatus::Absent => "Absent",
            PresenceStatus::Retard => "Retard",
            PresenceStatus::DemiJournee => "Demi-journée",
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            PresenceStatus::Present => "status-present",
            PresenceStatus::Absent => "status-absent",
            PresenceStatus::Retard => "status-retard",
            PresenceStatus::DemiJournee => "status-demi",
        }
    }
}

/// Check-in or check-out.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
pub enum PointageKind {
    #[default]
    #[serde(rename = "ENTREE")]
    #[strum(serialize = "ENTREE")]
    CheckIn,
    #[serde(rename = "SORTIE")]
    #[strum(serialize = "SORTIE")]
    CheckOut,
}

/// One row of the presences screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Presence {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub employee_id: u64,
    #[serde(default)]
    pub employee_name: String,
    #[schema(value_type = String, format = "date", example = "2024-01-15")]
    pub date_presence: NaiveDate,
    #[serde(default, with = "hhmm", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, example = "08:30")]
    pub heure_entree: Option<NaiveTime>,
    #[serde(default, with = "hhmm", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, example = "17:30")]
    pub heure_sortie: Option<NaiveTime>,
    pub statut: PresenceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub motif_absence: Option<String>,
}

impl Presence {
    /// Text the free-text filter matches against, one entry per displayed column.
    pub fn filter_haystack(&self) -> String {
        let mut columns = vec![
            self.employee_name.clone(),
            self.date_presence.to_string(),
            self.statut.to_string(),
            self.statut.label().to_string(),
        ];
        columns.extend(self.heure_entree.map(|t| t.format(hhmm::FORMAT).to_string()));
        columns.extend(self.heure_sortie.map(|t| t.format(hhmm::FORMAT).to_string()));
        columns.extend(self.motif_absence.clone());
        columns.join(" ").to_lowercase()
    }
}

/// Payload for `POST /presences`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPresence {
    pub employee_id: u64,
    pub date_presence: NaiveDate,
    #[serde(default, with = "hhmm", skip_serializing_if = "Option::is_none")]
    pub heure_entree: Option<NaiveTime>,
    #[serde(default, with = "hhmm", skip_serializing_if = "Option::is_none")]
    pub heure_sortie: Option<NaiveTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statut: Option<PresenceStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub motif_absence: Option<String>,
}

/// What the backend answers after recording a presence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PresenceReceipt {
    #[serde(default)]
    pub id: Option<u64>,
    pub employee: Employee,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PresenceStats {
    pub total_presences: u64,
    pub presents_today: u64,
    pub absents_today: u64,
    pub retards_today: u64,
}

/// Manual presence entry from the presences screen.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ManualPresenceForm {
    #[validate(
        required(message = "employeeId is required"),
        range(min = 1, message = "employeeId must be positive")
    )]
    pub employee_id: Option<u64>,
    #[validate(required(message = "datePresence is required"))]
    #[schema(value_type = Option<String>, format = "date")]
    pub date_presence: Option<NaiveDate>,
    #[serde(default, with = "hhmm")]
    #[schema(value_type = Option<String>, example = "08:30")]
    pub heure_entree: Option<NaiveTime>,
    #[serde(default, with = "hhmm")]
    #[schema(value_type = Option<String>, example = "17:30")]
    pub heure_sortie: Option<NaiveTime>,
    #[validate(required(message = "statut is required"))]
    pub statut: Option<PresenceStatus>,
    #[validate(length(max = 255, message = "motifAbsence is too long"))]
    pub motif_absence: Option<String>,
}

impl ManualPresenceForm {
    pub fn wire_name(field: &str) -> &str {
        match field {
            "employee_id" => "employeeId",
            "date_presence" => "datePresence",
            "motif_absence" => "motifAbsence",
            other => other,
        }
    }

    /// Call only after `validate()` succeeded.
    pub fn into_new_presence(self) -> NewPresence {
        NewPresence {
            employee_id: self.employee_id.unwrap_or_default(),
            date_presence: self.date_presence.unwrap_or_default(),
            heure_entree: self.heure_entree,
            heure_sortie: self.heure_sortie,
            statut: self.statut,
            motif_absence: self.motif_absence.filter(|m| !m.trim().is_empty()),
        }
    }
}

/// `HH:MM` times, the format the backend and the screens use.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%H:%M";

    pub fn serialize<S>(value: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(time) => serializer.serialize_str(&time.format(FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            // the backend sometimes answers with seconds
            Some(text) => NaiveTime::parse_from_str(text, FORMAT)
                .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M:%S"))
                .map(Some)
                .map_err(serde::de::Error::custom),
        }
    }
}
