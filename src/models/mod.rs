//! Domain rows shared by both storage backends and the views.

pub mod activity;
pub mod analytics;
pub mod prediction;
pub mod status;
pub mod task;
pub mod user;
pub mod worker;
