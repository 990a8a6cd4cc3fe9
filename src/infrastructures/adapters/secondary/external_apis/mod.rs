pub mod github;
pub mod speech;
