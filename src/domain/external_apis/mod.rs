pub mod github;
pub mod process;
pub mod speech;
