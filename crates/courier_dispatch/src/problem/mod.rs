pub mod distance_matrix;
pub mod fleet;
pub mod location;
pub mod miles;
pub mod mph;
pub mod package;
pub mod package_store;
pub mod trip;
pub mod vehicle;
