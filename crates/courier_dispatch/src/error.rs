use thiserror::Error;

use crate::problem::{distance_matrix::MatrixError, package::PackageId, vehicle::VehicleIdx};

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Matrix(#[from] MatrixError),

    #[error("package {0} not found")]
    PackageNotFound(PackageId),

    #[error("package {0} inserted twice")]
    DuplicatePackage(PackageId),

    #[error("package {0} is addressed to the depot")]
    PackageAtDepot(PackageId),

    #[error("package {0} is already delivered")]
    AlreadyDelivered(PackageId),

    #[error("vehicle #{} does not exist", .0.number())]
    UnknownVehicle(VehicleIdx),

    #[error("vehicle clock could not advance: {0}")]
    Clock(#[from] jiff::Error),

    #[error("invalid speed {0} mph")]
    InvalidSpeed(f64),

    #[error("no package could be placed in cycle {cycle}, still undelivered: {undelivered:?}")]
    Stalled {
        cycle: usize,
        undelivered: Vec<PackageId>,
    },
}
