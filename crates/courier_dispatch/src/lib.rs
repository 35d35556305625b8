pub mod error;
pub mod json;
pub mod problem;
pub mod query;
pub mod solver;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_utils;
