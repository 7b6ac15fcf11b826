//! In-memory backend used by the unit tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::Semaphore;

use super::{BackendError, BackendResult, HrBackend};
use crate::model::{
    employee::Employee,
    presence::{NewPresence, PointageKind, Presence, PresenceReceipt, PresenceStats},
    salary::{SalaryBulletin, SalaryStats},
};

pub struct FakeBackend {
    offline: AtomicBool,
    fail_records: AtomicBool,
    hold_records: AtomicBool,
    record_gate: Semaphore,
    record_calls: AtomicUsize,
    pub employees: Mutex<Vec<Employee>>,
    pub recorded: Mutex<Vec<NewPresence>>,
    pub pointages: Mutex<Vec<(String, PointageKind)>>,
    pub calls: Mutex<Vec<String>>,
    pub presences: Mutex<Vec<Presence>>,
    pub bulletins: Mutex<Vec<SalaryBulletin>>,
    pub scan_answer: Mutex<Option<String>>,
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self {
            offline: AtomicBool::new(false),
            fail_records: AtomicBool::new(false),
            hold_records: AtomicBool::new(false),
            record_gate: Semaphore::new(0),
            record_calls: AtomicUsize::new(0),
            employees: Mutex::default(),
            recorded: Mutex::default(),
            pointages: Mutex::default(),
            calls: Mutex::default(),
            presences: Mutex::default(),
            bulletins: Mutex::default(),
            scan_answer: Mutex::default(),
        }
    }
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_employees(employees: Vec<Employee>) -> Self {
        let backend = Self::new();
        *backend.employees.lock().unwrap() = employees;
        backend
    }

    /// Every call fails as if the backend were down.
    pub fn offline() -> Self {
        let backend = Self::new();
        backend.offline.store(true, Ordering::SeqCst);
        backend
    }

    pub fn fail_records(&self, fail: bool) {
        self.fail_records.store(fail, Ordering::SeqCst);
    }

    /// Record calls block until [`FakeBackend::release_record`] is called.
    pub fn hold_records(&self) {
        self.hold_records.store(true, Ordering::SeqCst);
    }

    pub fn release_record(&self) {
        self.record_gate.add_permits(1);
    }

    pub fn record_calls(&self) -> usize {
        self.record_calls.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn enter(&self, call: impl Into<String>) -> BackendResult<()> {
        self.calls.lock().unwrap().push(call.into());
        if self.offline.load(Ordering::SeqCst) {
            Err(BackendError::Unavailable("connection refused".to_string()))
        } else {
            Ok(())
        }
    }

    fn find(&self, id: u64) -> BackendResult<Employee> {
        self.employees
            .lock()
            .unwrap()
            .iter()
            .find(|e| e.id == Some(id))
            .cloned()
            .ok_or_else(|| BackendError::NotFound(format!("employee {id}")))
    }
}

pub fn employee(id: u64, matricule: &str, first_name: &str, last_name: &str) -> Employee {
    Employee {
        id: Some(id),
        matricule: matricule.to_string(),
        last_name: last_name.to_string(),
        first_name: first_name.to_string(),
        email: format!("{}.{}@email.com", first_name, last_name).to_lowercase(),
        role: "Technicien".to_string(),
        base_salary: 2000.0,
        hire_date: NaiveDate::from_ymd_opt(2023, 3, 1),
        qr_code_base64: None,
    }
}

#[async_trait]
impl HrBackend for FakeBackend {
    async fn list_employees(&self) -> BackendResult<Vec<Employee>> {
        self.enter("list_employees")?;
        Ok(self.employees.lock().unwrap().clone())
    }

    async fn get_employee(&self, id: u64) -> BackendResult<Employee> {
        self.enter(format!("get_employee {id}"))?;
        self.find(id)
    }

    async fn create_employee(&self, employee: &Employee) -> BackendResult<Employee> {
        self.enter(format!("create_employee {}", employee.matricule))?;
        let mut employees = self.employees.lock().unwrap();
        let id = employees.iter().filter_map(|e| e.id).max().unwrap_or(0) + 1;
        let created = Employee {
            id: Some(id),
            ..employee.clone()
        };
        employees.push(created.clone());
        Ok(created)
    }

    async fn update_employee(&self, id: u64, employee: &Employee) -> BackendResult<Employee> {
        self.enter(format!("update_employee {id}"))?;
        let mut employees = self.employees.lock().unwrap();
        let slot = employees
            .iter_mut()
            .find(|e| e.id == Some(id))
            .ok_or_else(|| BackendError::NotFound(format!("employee {id}")))?;
        *slot = Employee {
            id: Some(id),
            ..employee.clone()
        };
        Ok(slot.clone())
    }

    async fn delete_employee(&self, id: u64) -> BackendResult<()> {
        self.enter(format!("delete_employee {id}"))?;
        self.employees.lock().unwrap().retain(|e| e.id != Some(id));
        Ok(())
    }

    async fn employee_qr_png(&self, id: u64) -> BackendResult<Vec<u8>> {
        self.enter(format!("employee_qr_png {id}"))?;
        self.find(id)?;
        Ok(b"\x89PNG\r\n\x1a\n".to_vec())
    }

    async fn employee_qr_base64(&self, id: u64) -> BackendResult<String> {
        self.enter(format!("employee_qr_base64 {id}"))?;
        self.find(id)?;
        Ok("iVBORw0KGgo=".to_string())
    }

    async fn scan_qr(&self, image: Vec<u8>, file_name: &str) -> BackendResult<String> {
        self.enter(format!("scan_qr {file_name} {}", image.len()))?;
        self.scan_answer
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| BackendError::Validation("no QR code found".to_string()))
    }

    async fn record_pointage(&self, matricule: &str, kind: PointageKind) -> BackendResult<()> {
        self.enter(format!("record_pointage {matricule} {kind}"))?;
        self.pointages
            .lock()
            .unwrap()
            .push((matricule.to_string(), kind));
        Ok(())
    }

    async fn record_presence(&self, presence: &NewPresence) -> BackendResult<PresenceReceipt> {
        self.record_calls.fetch_add(1, Ordering::SeqCst);
        self.enter(format!("record_presence {}", presence.employee_id))?;
        if self.hold_records.load(Ordering::SeqCst) {
            let permit = self
                .record_gate
                .acquire()
                .await
                .map_err(|e| BackendError::Unavailable(e.to_string()))?;
            permit.forget();
        }
        if self.fail_records.load(Ordering::SeqCst) {
            return Err(BackendError::Status {
                status: 500,
                body: "database error".to_string(),
            });
        }
        let employee = self.find(presence.employee_id)?;
        self.recorded.lock().unwrap().push(presence.clone());
        Ok(PresenceReceipt {
            id: Some(self.record_calls() as u64),
            employee,
        })
    }

    async fn list_presences(&self) -> BackendResult<Vec<Presence>> {
        self.enter("list_presences")?;
        Ok(self.presences.lock().unwrap().clone())
    }

    async fn presence_stats(&self, date: NaiveDate) -> BackendResult<PresenceStats> {
        self.enter(format!("presence_stats {date}"))?;
        Ok(PresenceStats {
            total_presences: 40,
            presents_today: 4,
            absents_today: 1,
            retards_today: 1,
        })
    }

    async fn list_bulletins(&self) -> BackendResult<Vec<SalaryBulletin>> {
        self.enter("list_bulletins")?;
        Ok(self.bulletins.lock().unwrap().clone())
    }

    async fn salary_stats(&self) -> BackendResult<SalaryStats> {
        self.enter("salary_stats")?;
        Ok(SalaryStats {
            total_bulletins: 0,
            total_salaries: 0.0,
            average_salary: 0.0,
            current_month_bulletins: 0,
        })
    }

    async fn generate_bulletin(&self, employee_id: u64) -> BackendResult<()> {
        self.enter(format!("generate_bulletin {employee_id}"))?;
        self.find(employee_id).map(|_| ())
    }

    async fn bulletin_pdf(&self, id: u64) -> BackendResult<Vec<u8>> {
        self.enter(format!("bulletin_pdf {id}"))?;
        Ok(b"%PDF-1.4".to_vec())
    }

    async fn send_bulletin(&self, id: u64) -> BackendResult<()> {
        self.enter(format!("send_bulletin {id}"))
    }

    async fn calculate_all(&self) -> BackendResult<()> {
        self.enter("calculate_all")
    }
}
