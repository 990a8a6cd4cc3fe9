pub mod application;
pub mod domain;
pub mod infrastructures;

#[cfg(test)]
pub(crate) mod test_utils;
