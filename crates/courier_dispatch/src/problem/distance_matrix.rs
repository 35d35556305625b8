use fxhash::FxHashMap;
use geo::{Distance, Euclidean};
use thiserror::Error;
use tracing::warn;

use crate::problem::{
    location::{Location, LocationIdx},
    miles::Miles,
};

#[derive(Debug, Error, PartialEq)]
pub enum MatrixError {
    #[error("unknown address '{address}', known addresses: {known:?}")]
    UnknownAddress { address: String, known: Vec<String> },

    #[error("distance table has {rows} rows for {addresses} addresses")]
    DimensionMismatch { rows: usize, addresses: usize },

    #[error("row {row} has {found} cells, expected at least {expected}")]
    ShortRow {
        row: usize,
        found: usize,
        expected: usize,
    },

    #[error("negative or non-finite distance {value} between '{from}' and '{to}'")]
    InvalidDistance { from: String, to: String, value: f64 },

    #[error("duplicate address '{0}'")]
    DuplicateAddress(String),
}

/// Symmetric distances between canonical stop addresses.
///
/// Only the lower triangle is stored: row `i` holds `i + 1` cells, so the cell
/// for a pair is found at `row * (row + 1) / 2 + col` with `row >= col`.
#[derive(Debug, Clone)]
pub struct DistanceMatrix {
    locations: Vec<Location>,
    index: FxHashMap<String, LocationIdx>,
    distances: Vec<Miles>,
}

#[inline(always)]
fn triangle_index(from: LocationIdx, to: LocationIdx) -> usize {
    let (row, col) = if from >= to {
        (from.get(), to.get())
    } else {
        (to.get(), from.get())
    };

    row * (row + 1) / 2 + col
}

impl DistanceMatrix {
    /// Builds the matrix from lower-triangular rows. Rows may be longer than
    /// `i + 1`, anything above the diagonal is ignored.
    pub fn from_lower_triangle(
        addresses: Vec<String>,
        rows: Vec<Vec<f64>>,
    ) -> Result<Self, MatrixError> {
        if rows.len() != addresses.len() {
            return Err(MatrixError::DimensionMismatch {
                rows: rows.len(),
                addresses: addresses.len(),
            });
        }

        let mut index = FxHashMap::default();
        for (i, address) in addresses.iter().enumerate() {
            if index.insert(address.clone(), LocationIdx::new(i)).is_some() {
                return Err(MatrixError::DuplicateAddress(address.clone()));
            }
        }

        let mut distances = Vec::with_capacity(addresses.len() * (addresses.len() + 1) / 2);
        for (row, cells) in rows.iter().enumerate() {
            if cells.len() < row + 1 {
                return Err(MatrixError::ShortRow {
                    row,
                    found: cells.len(),
                    expected: row + 1,
                });
            }

            for (col, &value) in cells.iter().take(row + 1).enumerate() {
                if !value.is_finite() || value < 0.0 {
                    return Err(MatrixError::InvalidDistance {
                        from: addresses[row].clone(),
                        to: addresses[col].clone(),
                        value,
                    });
                }

                if col != row && value == 0.0 {
                    warn!(
                        "Zero distance between '{}' and '{}'",
                        addresses[row], addresses[col]
                    );
                }

                distances.push(Miles::new(value));
            }
        }

        Ok(DistanceMatrix {
            locations: addresses.into_iter().map(Location::new).collect(),
            index,
            distances,
        })
    }

    /// Straight-line distances between planar points, one per address.
    pub fn from_euclidean(
        addresses: Vec<String>,
        points: &[geo::Point],
    ) -> Result<Self, MatrixError> {
        let rows = points
            .iter()
            .enumerate()
            .map(|(i, from)| {
                points[..=i]
                    .iter()
                    .map(|to| Euclidean.distance(from, to))
                    .collect()
            })
            .collect();

        DistanceMatrix::from_lower_triangle(addresses, rows)
    }

    #[inline(always)]
    pub fn distance(&self, from: LocationIdx, to: LocationIdx) -> Miles {
        if from == to {
            return Miles::ZERO;
        }

        self.distances[triangle_index(from, to)]
    }

    pub fn distance_between(&self, from: &str, to: &str) -> Result<Miles, MatrixError> {
        Ok(self.distance(self.location_id(from)?, self.location_id(to)?))
    }

    pub fn location_id(&self, address: &str) -> Result<LocationIdx, MatrixError> {
        self.index
            .get(address)
            .copied()
            .ok_or_else(|| MatrixError::UnknownAddress {
                address: address.to_owned(),
                known: self.addresses().map(str::to_owned).collect(),
            })
    }

    pub fn address(&self, location_id: LocationIdx) -> &str {
        self.locations[location_id].address()
    }

    pub fn addresses(&self) -> impl Iterator<Item = &str> {
        self.locations.iter().map(|location| location.address())
    }

    /// Length of a path visiting `stops` in order.
    pub fn path_distance(&self, stops: &[LocationIdx]) -> Miles {
        stops
            .windows(2)
            .map(|leg| self.distance(leg[0], leg[1]))
            .sum()
    }
}
