pub mod external_apis;
pub mod persistence;
pub mod process;
