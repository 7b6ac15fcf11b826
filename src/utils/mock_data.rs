use chrono::{NaiveDate, NaiveTime};
use once_cell::sync::Lazy;

use crate::model::{
    dashboard::DashboardStats,
    employee::Employee,
    presence::{Presence, PresenceStats, PresenceStatus},
    salary::{SalaryBulletin, SalaryStats},
};

/// ===============================
/// Demo data shown when the backend is unreachable
/// ===============================

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

fn time(h: u32, m: u32) -> Option<NaiveTime> {
    NaiveTime::from_hms_opt(h, m, 0)
}

pub static EMPLOYEES: Lazy<Vec<Employee>> = Lazy::new(|| {
    vec![
        Employee {
            id: Some(1),
            matricule: "EMP001".to_string(),
            last_name: "Dupont".to_string(),
            first_name: "Jean".to_string(),
            email: "jean.dupont@email.com".to_string(),
            role: "Développeur".to_string(),
            base_salary: 2500.0,
            hire_date: Some(date(2023, 1, 15)),
            qr_code_base64: None,
        },
        Employee {
            id: Some(2),
            matricule: "EMP002".to_string(),
            last_name: "Martin".to_string(),
            first_name: "Marie".to_string(),
            email: "marie.martin@email.com".to_string(),
            role: "Designer".to_string(),
            base_salary: 2300.0,
            hire_date: Some(date(2023, 2, 1)),
            qr_code_base64: None,
        },
    ]
});

pub static PRESENCES: Lazy<Vec<Presence>> = Lazy::new(|| {
    vec![
        Presence {
            id: Some(1),
            employee_id: 1,
            employee_name: "Jean Dupont".to_string(),
            date_presence: date(2024, 1, 15),
            heure_entree: time(8, 30),
            heure_sortie: time(17, 30),
            statut: PresenceStatus::Present,
            motif_absence: None,
        },
        Presence {
            id: Some(2),
            employee_id: 2,
            employee_name: "Marie Martin".to_string(),
            date_presence: date(2024, 1, 15),
            heure_entree: time(9, 15),
            heure_sortie: None,
            statut: PresenceStatus::Retard,
            motif_absence: Some("Retard transport".to_string()),
        },
        Presence {
            id: Some(3),
            employee_id: 3,
            employee_name: "Paul Durand".to_string(),
            date_presence: date(2024, 1, 15),
            heure_entree: None,
            heure_sortie: None,
            statut: PresenceStatus::Absent,
            motif_absence: Some("Maladie".to_string()),
        },
    ]
});

pub static PRESENCE_STATS: PresenceStats = PresenceStats {
    total_presences: 1247,
    presents_today: 18,
    absents_today: 7,
    retards_today: 3,
};

pub static BULLETINS: Lazy<Vec<SalaryBulletin>> = Lazy::new(|| {
    vec![
        SalaryBulletin {
            id: Some(1),
            employee_id: 1,
            employee_name: "Jean Dupont".to_string(),
            month: "Janvier".to_string(),
            year: 2024,
            base_salary: 2500.0,
            worked_hours: 160.0,
            overtime_hours: 8.0,
            deductions: 150.0,
            net_salary: 2420.0,
            generated_on: date(2024, 1, 31),
        },
        SalaryBulletin {
            id: Some(2),
            employee_id: 2,
            employee_name: "Marie Martin".to_string(),
            month: "Janvier".to_string(),
            year: 2024,
            base_salary: 2300.0,
            worked_hours: 152.0,
            overtime_hours: 0.0,
            deductions: 200.0,
            net_salary: 2180.0,
            generated_on: date(2024, 1, 31),
        },
    ]
});

pub static SALARY_STATS: SalaryStats = SalaryStats {
    total_bulletins: 45,
    total_salaries: 112500.0,
    average_salary: 2500.0,
    current_month_bulletins: 12,
};

pub static DASHBOARD_STATS: DashboardStats = DashboardStats {
    total_employees: 25,
    present_today: 18,
    absent_today: 7,
    total_presences: 1247,
};
