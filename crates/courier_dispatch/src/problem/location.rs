use crate::define_index_newtype;

/// A canonical stop address known to the distance matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    address: String,
}

define_index_newtype!(LocationIdx, Location);

impl Location {
    pub fn new(address: impl Into<String>) -> Self {
        Location {
            address: address.into(),
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }
}
