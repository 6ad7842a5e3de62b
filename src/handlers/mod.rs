mod employees;
mod health;
mod metrics;

pub use employees::{
    create_employee, delete_employee, get_employee, search_employees, update_employee,
};
pub use health::root_handler;
pub use metrics::metrics_handler;
