pub mod analytics;
pub mod auth;
pub mod password;
pub mod tasks;
pub mod workers;
