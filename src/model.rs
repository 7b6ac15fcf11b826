pub mod dashboard;
pub mod employee;
pub mod presence;
pub mod salary;
