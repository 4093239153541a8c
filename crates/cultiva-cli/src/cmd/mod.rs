pub mod config;
pub mod login;
pub mod set;
pub mod status;
