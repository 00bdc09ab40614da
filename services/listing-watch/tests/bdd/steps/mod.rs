//! BDD step definitions for listing-watch service

pub mod checking_steps;
pub mod fetching_steps;
pub mod monitoring_steps;
