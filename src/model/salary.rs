use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Payroll statement for one employee and one month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "id": 1,
    "employeeId": 1,
    "employeeName": "Jean Dupont",
    "mois": "Janvier",
    "annee": 2024,
    "salaireBase": 2500.0,
    "heuresTravaillees": 160.0,
    "heuresSupplementaires": 8.0,
    "deductions": 150.0,
    "salaireNet": 2420.0,
    "dateGeneration": "2024-01-31"
}))]
pub struct SalaryBulletin {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub employee_id: u64,
    #[serde(default)]
    pub employee_name: String,
    /// Month, either a French name or `"01"`..`"12"` depending on the backend.
    #[serde(rename = "mois")]
    pub month: String,
    #[serde(rename = "annee")]
    pub year: i32,
    #[serde(rename = "salaireBase")]
    pub base_salary: f64,
    #[serde(rename = "heuresTravaillees")]
    pub worked_hours: f64,
    #[serde(rename = "heuresSupplementaires")]
    pub overtime_hours: f64,
    pub deductions: f64,
    #[serde(rename = "salaireNet")]
    pub net_salary: f64,
    #[serde(rename = "dateGeneration")]
    #[schema(value_type = String, format = "date")]
    pub generated_on: NaiveDate,
}

impl SalaryBulletin {
    /// Same bulletin with the month shown as a French month name.
    pub fn with_month_name(mut self) -> Self {
        self.month = month_name(&self.month).to_string();
        self
    }

    pub fn filter_haystack(&self) -> String {
        format!(
            "{} {} {} {} {} {}",
            self.employee_name,
            self.month,
            self.year,
            self.base_salary,
            self.net_salary,
            self.generated_on
        )
        .to_lowercase()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SalaryStats {
    pub total_bulletins: u64,
    pub total_salaries: f64,
    pub average_salary: f64,
    pub current_month_bulletins: u64,
}

const MONTHS: [&str; 12] = [
    "Janvier",
    "Février",
    "Mars",
    "Avril",
    "Mai",
    "Juin",
    "Juillet",
    "Août",
    "Septembre",
    "Octobre",
    "Novembre",
    "Décembre",
];

/// `"01"`..`"12"` to the French month name; anything else is returned as is.
pub fn month_name(month: &str) -> &str {
    if month.len() != 2 {
        return month;
    }
    match month.parse::<usize>() {
        Ok(n @ 1..=12) => MONTHS[n - 1],
        _ => month,
    }
}

/// Position of a month in the year, from a French name or `"01"`..`"12"`.
/// Unknown values sort last.
pub fn month_number(month: &str) -> usize {
    MONTHS
        .iter()
        .position(|m| m.eq_ignore_ascii_case(month))
        .map(|i| i + 1)
        .or_else(|| month.parse::<usize>().ok().filter(|n| (1..=12).contains(n)))
        .unwrap_or(13)
}
