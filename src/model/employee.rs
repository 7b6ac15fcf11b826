use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Employee as exchanged with the HR backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(
    example = json!({
        "id": 1,
        "matricule": "EMP001",
        "nom": "Dupont",
        "prenom": "Jean",
        "email": "jean.dupont@email.com",
        "poste": "Développeur",
        "salaireBase": 2500.0,
        "dateEmbauche": "2023-01-15"
    })
)]
pub struct Employee {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = 1)]
    pub id: Option<u64>,

    #[schema(example = "EMP001")]
    pub matricule: String,

    /// Last name.
    #[serde(rename = "nom")]
    #[schema(example = "Dupont")]
    pub last_name: String,

    /// First name.
    #[serde(rename = "prenom")]
    #[schema(example = "Jean")]
    pub first_name: String,

    #[schema(example = "jean.dupont@email.com")]
    pub email: String,

    /// Job title.
    #[serde(rename = "poste")]
    #[schema(example = "Développeur")]
    pub role: String,

    #[serde(rename = "salaireBase")]
    #[schema(example = 2500.0)]
    pub base_salary: f64,

    #[serde(rename = "dateEmbauche", default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "2023-01-15", value_type = Option<String>, format = "date")]
    pub hire_date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qr_code_base64: Option<String>,
}

impl Employee {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Employee form as submitted from the admin screen.
///
/// Every field is optional on the wire so that a missing field reports a
/// "required" error instead of failing deserialization as a whole.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeForm {
    #[validate(
        required(message = "matricule is required"),
        length(min = 3, message = "matricule must be at least 3 characters")
    )]
    #[schema(example = "EMP003")]
    pub matricule: Option<String>,

    #[serde(rename = "nom")]
    #[validate(
        required(message = "nom is required"),
        length(min = 2, message = "nom must be at least 2 characters")
    )]
    #[schema(example = "Durand")]
    pub last_name: Option<String>,

    #[serde(rename = "prenom")]
    #[validate(
        required(message = "prenom is required"),
        length(min = 2, message = "prenom must be at least 2 characters")
    )]
    #[schema(example = "Paul")]
    pub first_name: Option<String>,

    #[validate(
        required(message = "email is required"),
        email(message = "email must be a valid address")
    )]
    #[schema(example = "paul.durand@email.com", format = "email")]
    pub email: Option<String>,

    #[serde(rename = "poste")]
    #[validate(
        required(message = "poste is required"),
        length(min = 1, message = "poste is required")
    )]
    #[schema(example = "Comptable")]
    pub role: Option<String>,

    #[serde(rename = "salaireBase")]
    #[validate(
        required(message = "salaireBase is required"),
        range(min = 0.0, message = "salaireBase must not be negative")
    )]
    #[schema(example = 2100.0)]
    pub base_salary: Option<f64>,
}

impl EmployeeForm {
    /// Maps a Rust field name reported by `validator` to its wire name.
    pub fn wire_name(field: &str) -> &str {
        match field {
            "last_name" => "nom",
            "first_name" => "prenom",
            "role" => "poste",
            "base_salary" => "salaireBase",
            other => other,
        }
    }

    /// Builds the employee payload. Call only after `validate()` succeeded.
    pub fn into_employee(self, id: Option<u64>, hire_date: Option<NaiveDate>) -> Employee {
        Employee {
            id,
            matricule: self.matricule.unwrap_or_default(),
            last_name: self.last_name.unwrap_or_default(),
            first_name: self.first_name.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
            role: self.role.unwrap_or_default(),
            base_salary: self.base_salary.unwrap_or_default(),
            hire_date,
            qr_code_base64: None,
        }
    }
}
