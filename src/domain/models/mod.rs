pub mod config;
pub mod notification;
pub mod repo;
pub mod run;
