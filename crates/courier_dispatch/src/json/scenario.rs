use std::{fs::File, io::BufReader, path::Path};

use fxhash::{FxHashMap, FxHashSet};
use thiserror::Error;
use tracing::{Level, info, instrument, warn};

use crate::{
    error::DispatchError,
    json::types::{JsonPackage, JsonScenario},
    problem::{
        distance_matrix::{DistanceMatrix, MatrixError},
        fleet::Fleet,
        package::{Deadline, GroupId, PackageBuilder, PackageId, Priority},
        package_store::PackageStore,
        vehicle::{Vehicle, VehicleIdx},
    },
    solver::dispatch_context::DispatchContext,
};

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("could not open scenario: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid scenario: {0}")]
    Json(#[from] serde_json::Error),

    #[error("package {id} has an invalid deadline {value:?}: {source}")]
    Deadline {
        id: PackageId,
        value: String,
        source: jiff::Error,
    },

    #[error("package {id} has an invalid priority {value}, expected 0, 1 or 2")]
    Priority { id: PackageId, value: u8 },

    #[error("package {id} is forced onto vehicle #{number}, vehicles are numbered from 1")]
    VehicleNumber { id: PackageId, number: usize },

    #[error("group {group} is forced onto both vehicle #{first} and vehicle #{second}")]
    ConflictingForcedVehicles {
        group: GroupId,
        first: usize,
        second: usize,
    },

    #[error("scenario has no vehicles")]
    NoVehicles,

    #[error(transparent)]
    Matrix(#[from] MatrixError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

#[instrument(level = Level::DEBUG)]
pub fn load_scenario(path: &Path) -> Result<JsonScenario, ScenarioError> {
    let file = File::open(path)?;
    let scenario: JsonScenario = serde_json::from_reader(BufReader::new(file))?;

    info!(
        "Loaded scenario with {} addresses, {} packages and {} vehicles",
        scenario.addresses.len(),
        scenario.packages.len(),
        scenario.vehicles.len()
    );

    Ok(scenario)
}

/// Group id and forced vehicle shared by the members of one group.
struct ResolvedGroup {
    id: GroupId,
    forced_vehicle: Option<usize>,
}

/// Resolves `must_ship_with` into groups. Packages linked directly or through
/// other members form one group, identified by its largest member id. A
/// forced vehicle on any member applies to the whole group.
fn resolve_groups(
    packages: &[JsonPackage],
) -> Result<FxHashMap<PackageId, ResolvedGroup>, ScenarioError> {
    let known = packages
        .iter()
        .map(|package| package.id)
        .collect::<FxHashSet<_>>();

    let mut links: FxHashMap<PackageId, Vec<PackageId>> = FxHashMap::default();
    for package in packages {
        for &related in &package.must_ship_with {
            if !known.contains(&related) {
                warn!(
                    "Package {} must ship with unknown package {}, ignoring",
                    package.id, related
                );
                continue;
            }

            links.entry(package.id).or_default().push(related);
            links.entry(related).or_default().push(package.id);
        }

        // A package listing only unknown ids still forms its own group.
        if !package.must_ship_with.is_empty() {
            links.entry(package.id).or_default();
        }
    }

    let forced = packages
        .iter()
        .filter_map(|package| package.forced_vehicle.map(|number| (package.id, number)))
        .collect::<FxHashMap<_, _>>();

    let mut starts = links.keys().copied().collect::<Vec<_>>();
    starts.sort();

    let mut groups = FxHashMap::default();
    for start in starts {
        if groups.contains_key(&start) {
            continue;
        }

        let mut members = vec![start];
        let mut seen = FxHashSet::default();
        seen.insert(start);
        let mut cursor = 0;

        while cursor < members.len() {
            let current = members[cursor];
            cursor += 1;

            for &next in links.get(&current).into_iter().flatten() {
                if seen.insert(next) {
                    members.push(next);
                }
            }
        }

        members.sort();

        let id = members[members.len() - 1];
        let mut forced_vehicle: Option<usize> = None;
        for member in &members {
            match (forced_vehicle, forced.get(member)) {
                (Some(first), Some(&second)) if first != second => {
                    return Err(ScenarioError::ConflictingForcedVehicles {
                        group: id,
                        first,
                        second,
                    });
                }
                (None, Some(&number)) => forced_vehicle = Some(number),
                _ => {}
            }
        }

        for member in members {
            groups.insert(member, ResolvedGroup { id, forced_vehicle });
        }
    }

    Ok(groups)
}

fn derive_priority(
    package: &JsonPackage,
    grouped: bool,
    deadline: Deadline,
) -> Result<Priority, ScenarioError> {
    if let Some(value) = package.priority {
        return Priority::from_weight(value).ok_or(ScenarioError::Priority {
            id: package.id,
            value,
        });
    }

    let priority = if grouped {
        Priority::Grouped
    } else if package.delayed || !deadline.is_end_of_day() {
        Priority::TimeSensitive
    } else {
        Priority::Ordinary
    };

    Ok(priority)
}

impl JsonScenario {
    #[instrument(skip_all, level = Level::DEBUG)]
    pub fn build_context(self) -> Result<DispatchContext, ScenarioError> {
        if self.vehicles.is_empty() {
            return Err(ScenarioError::NoVehicles);
        }

        let matrix = DistanceMatrix::from_lower_triangle(self.addresses, self.distances)?;
        let groups = resolve_groups(&self.packages)?;

        let mut packages = PackageStore::new();
        for package in &self.packages {
            let deadline = match &package.deadline {
                Some(value) => value.parse::<Deadline>().map_err(|source| {
                    ScenarioError::Deadline {
                        id: package.id,
                        value: value.clone(),
                        source,
                    }
                })?,
                None => Deadline::EndOfDay,
            };

            let group = groups.get(&package.id);
            let priority = derive_priority(package, group.is_some(), deadline)?;

            let mut builder = PackageBuilder::new(
                package.id,
                package.address.clone(),
                matrix.location_id(&package.address)?,
            );

            builder.set_deadline(deadline).set_priority(priority);

            if let Some(city) = &package.city {
                builder.set_city(city.clone());
            }

            if let Some(zip) = &package.zip {
                builder.set_zip(zip.clone());
            }

            if let Some(weight) = package.weight {
                builder.set_weight(weight);
            }

            if let Some(group) = group {
                builder
                    .set_group(group.id)
                    .set_related_ids(package.must_ship_with.clone());
            }

            let forced_vehicle = group
                .and_then(|group| group.forced_vehicle)
                .or(package.forced_vehicle);

            if let Some(number) = forced_vehicle {
                let vehicle_id =
                    VehicleIdx::from_number(number).ok_or(ScenarioError::VehicleNumber {
                        id: package.id,
                        number,
                    })?;
                builder.set_forced_vehicle(vehicle_id);
            }

            builder.set_delayed(package.delayed);

            if let Some(corrected) = &package.corrected_address {
                builder.set_address_correction(corrected.clone(), matrix.location_id(corrected)?);
            }

            packages.insert(builder.build())?;
        }

        let fleet = Fleet::new(
            self.vehicles
                .iter()
                .map(|vehicle| {
                    Vehicle::new(
                        vehicle.capacity.unwrap_or(self.params.vehicle_capacity),
                        vehicle.start_time.unwrap_or(self.params.reference_start),
                    )
                })
                .collect(),
        );

        Ok(DispatchContext::new(
            packages,
            matrix,
            fleet,
            &self.depot,
            self.params,
        )?)
    }
}

#[cfg(test)]
mod tests {
    use jiff::civil::time;

    use super::*;

    fn scenario(packages: serde_json::Value) -> JsonScenario {
        serde_json::from_value(serde_json::json!({
            "depot": "HUB",
            "addresses": ["HUB", "A", "B", "C"],
            "distances": [[0.0], [2.0, 0.0], [3.0, 1.5, 0.0], [4.0, 2.5, 1.0, 0.0]],
            "packages": packages,
            "vehicles": [{}, { "start_time": "9:05 AM", "capacity": 4 }]
        }))
        .unwrap()
    }

    fn id(value: u32) -> PackageId {
        PackageId::new(value)
    }

    #[test]
    fn test_build_context() {
        let context = scenario(serde_json::json!([
            { "id": 1, "address": "A", "deadline": "10:30 AM", "city": "Salt Lake City" },
            { "id": 2, "address": "B" },
            { "id": 3, "address": "C", "delayed": true },
            { "id": 4, "address": "A", "corrected_address": "C" }
        ]))
        .build_context()
        .unwrap();

        let packages = context.packages();
        assert_eq!(packages.len(), 4);

        let first = packages.get(id(1)).unwrap();
        assert_eq!(first.deadline(), Deadline::At(time(10, 30, 0, 0)));
        assert_eq!(first.priority(), Priority::TimeSensitive);
        assert_eq!(first.city(), Some("Salt Lake City"));

        assert_eq!(packages.get(id(2)).unwrap().priority(), Priority::Ordinary);

        let delayed = packages.get(id(3)).unwrap();
        assert!(delayed.is_delayed());
        assert_eq!(delayed.priority(), Priority::TimeSensitive);

        let held = packages.get(id(4)).unwrap();
        assert!(held.is_held());
        assert_eq!(held.correction().unwrap().corrected_address(), "C");

        let fleet = context.fleet();
        assert_eq!(fleet.len(), 2);
        assert_eq!(fleet.vehicles()[0].capacity(), 16);
        assert_eq!(fleet.vehicles()[0].clock(), time(8, 0, 0, 0));
        assert_eq!(fleet.vehicles()[1].capacity(), 4);
        assert_eq!(fleet.vehicles()[1].clock(), time(9, 5, 0, 0));
    }

    #[test]
    fn test_groups_are_merged_transitively() {
        let context = scenario(serde_json::json!([
            { "id": 1, "address": "A", "must_ship_with": [2] },
            { "id": 2, "address": "B" },
            { "id": 3, "address": "C", "must_ship_with": [2], "forced_vehicle": 2 },
            { "id": 4, "address": "C", "must_ship_with": [99] },
            { "id": 5, "address": "A" }
        ]))
        .build_context()
        .unwrap();

        let packages = context.packages();
        for member in [1, 2, 3] {
            let package = packages.get(id(member)).unwrap();
            assert_eq!(package.group_id(), Some(id(3)));
            assert_eq!(package.priority(), Priority::Grouped);
            assert_eq!(package.forced_vehicle(), Some(VehicleIdx::new(1)));
        }

        // unknown related ids are dropped, the package stays a group of one
        assert_eq!(packages.get(id(4)).unwrap().group_id(), Some(id(4)));
        assert_eq!(packages.get(id(5)).unwrap().group_id(), None);
    }

    #[test]
    fn test_priority_override() {
        let context = scenario(serde_json::json!([
            { "id": 1, "address": "A", "priority": 2 }
        ]))
        .build_context()
        .unwrap();

        assert_eq!(
            context.packages().get(id(1)).unwrap().priority(),
            Priority::Grouped
        );

        let invalid = scenario(serde_json::json!([
            { "id": 1, "address": "A", "priority": 7 }
        ]))
        .build_context();
        assert!(matches!(invalid, Err(ScenarioError::Priority { value: 7, .. })));
    }

    #[test]
    fn test_invalid_scenarios() {
        let unknown = scenario(serde_json::json!([{ "id": 1, "address": "Z" }])).build_context();
        assert!(matches!(
            unknown,
            Err(ScenarioError::Matrix(MatrixError::UnknownAddress { .. }))
        ));

        let deadline = scenario(serde_json::json!([
            { "id": 1, "address": "A", "deadline": "noon" }
        ]))
        .build_context();
        assert!(matches!(deadline, Err(ScenarioError::Deadline { .. })));

        let corrected_to_depot = scenario(serde_json::json!([
            { "id": 1, "address": "A", "corrected_address": "HUB" },
            { "id": 2, "address": "B" }
        ]))
        .build_context();
        assert!(matches!(
            corrected_to_depot,
            Err(ScenarioError::Dispatch(DispatchError::PackageAtDepot(package))) if package == id(1)
        ));

        let duplicate = scenario(serde_json::json!([
            { "id": 1, "address": "A" },
            { "id": 1, "address": "B" }
        ]))
        .build_context();
        assert!(matches!(
            duplicate,
            Err(ScenarioError::Dispatch(DispatchError::DuplicatePackage(_)))
        ));

        let vehicle = scenario(serde_json::json!([
            { "id": 1, "address": "A", "forced_vehicle": 3 }
        ]))
        .build_context();
        assert!(matches!(
            vehicle,
            Err(ScenarioError::Dispatch(DispatchError::UnknownVehicle(_)))
        ));

        let conflict = scenario(serde_json::json!([
            { "id": 1, "address": "A", "must_ship_with": [2], "forced_vehicle": 1 },
            { "id": 2, "address": "B", "forced_vehicle": 2 }
        ]))
        .build_context();
        assert!(matches!(
            conflict,
            Err(ScenarioError::ConflictingForcedVehicles { .. })
        ));
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        let result = serde_json::from_value::<JsonScenario>(serde_json::json!({
            "depot": "HUB",
            "addresses": ["HUB"],
            "distances": [[0.0]],
            "packages": [],
            "vehicles": [{}],
            "trucks": 3
        }));

        assert!(result.is_err());
    }
}
