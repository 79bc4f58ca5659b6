pub mod config;
pub mod domain;

pub use domain::credentials;
