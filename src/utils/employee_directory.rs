use std::sync::RwLock;

use crate::model::employee::Employee;

/// The employees screen's own copy of the roster.
///
/// Refreshed on every successful listing; edits are applied here directly
/// when the backend is down so the screen stays usable.
#[derive(Default)]
pub struct EmployeeDirectory {
    employees: RwLock<Vec<Employee>>,
}

impl EmployeeDirectory {
    pub fn replace(&self, employees: Vec<Employee>) {
        *self.employees.write().expect("employee directory poisoned") = employees;
    }

    pub fn get(&self, id: u64) -> Option<Employee> {
        self.employees
            .read()
            .expect("employee directory poisoned")
            .iter()
            .find(|e| e.id == Some(id))
            .cloned()
    }

    /// Next free id for an employee created while offline.
    pub fn next_id(&self) -> u64 {
        self.employees
            .read()
            .expect("employee directory poisoned")
            .iter()
            .filter_map(|e| e.id)
            .max()
            .unwrap_or(0)
            + 1
    }

    /// Replaces the entry with the same id, or appends.
    pub fn upsert(&self, employee: Employee) {
        let mut employees = self.employees.write().expect("employee directory poisoned");
        match employees
            .iter_mut()
            .find(|e| e.id.is_some() && e.id == employee.id)
        {
            Some(slot) => *slot = employee,
            None => employees.push(employee),
        }
    }

    pub fn remove(&self, id: u64) -> bool {
        let mut employees = self.employees.write().expect("employee directory poisoned");
        let before = employees.len();
        employees.retain(|e| e.id != Some(id));
        employees.len() != before
    }
}
