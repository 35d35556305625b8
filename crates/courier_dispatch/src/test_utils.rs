use jiff::civil::Time;

use crate::{
    problem::{
        distance_matrix::DistanceMatrix,
        fleet::Fleet,
        location::LocationIdx,
        package::{PackageBuilder, PackageId},
        package_store::PackageStore,
        vehicle::Vehicle,
    },
    solver::{dispatch_context::DispatchContext, dispatch_params::DispatchParams},
};

pub fn location(index: usize) -> LocationIdx {
    LocationIdx::new(index)
}

pub fn address(index: usize) -> String {
    format!("STOP {index}")
}

/// Matrix over `STOP 0..n`, `STOP 0` being the depot.
pub fn create_matrix(points: &[(f64, f64)]) -> DistanceMatrix {
    let addresses = (0..points.len()).map(address).collect();
    let points = points
        .iter()
        .map(|&(x, y)| geo::Point::new(x, y))
        .collect::<Vec<_>>();

    DistanceMatrix::from_euclidean(addresses, &points).unwrap()
}

/// Plain end-of-day packages given as `(id, location)`.
pub fn create_store(packages: &[(u32, usize)]) -> PackageStore {
    let mut store = PackageStore::new();

    for &(id, index) in packages {
        store
            .insert(PackageBuilder::new(PackageId::new(id), address(index), location(index)).build())
            .unwrap();
    }

    store
}

pub fn create_fleet(starts: &[Time], capacity: usize) -> Fleet {
    Fleet::new(
        starts
            .iter()
            .map(|&start| Vehicle::new(capacity, start))
            .collect(),
    )
}

pub fn create_context(
    points: &[(f64, f64)],
    packages: PackageStore,
    fleet: Fleet,
    params: DispatchParams,
) -> DispatchContext {
    DispatchContext::new(packages, create_matrix(points), fleet, &address(0), params).unwrap()
}
