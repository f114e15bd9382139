pub mod billing;
pub mod dashboard;
pub mod overdue;
pub mod providers;
pub mod schema;
