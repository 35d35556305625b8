use fxhash::FxHashMap;
use tracing::{Level, debug, instrument};

use crate::{
    error::DispatchError,
    problem::{
        fleet::Fleet,
        package::{GroupId, PackageId},
        package_store::PackageStore,
        vehicle::VehicleIdx,
    },
    solver::{dispatch_params::DispatchParams, score::priority_score},
};

/// Outcome of one assignment cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CycleAssignment {
    /// Packages placed on each vehicle, in load order.
    pub placements: Vec<(VehicleIdx, Vec<PackageId>)>,
    /// Packages left for a later cycle.
    pub deferred: Vec<PackageId>,
}

impl CycleAssignment {
    pub fn placed_count(&self) -> usize {
        self.placements.iter().map(|(_, ids)| ids.len()).sum()
    }
}

/// Orders undelivered packages by urgency and fills vehicle manifests.
///
/// Vehicles are always tried in `vehicle_order`, which makes the first-fit
/// tie-break explicit.
pub struct PriorityScheduler<'a> {
    params: &'a DispatchParams,
    vehicle_order: Vec<VehicleIdx>,
}

struct Group {
    id: GroupId,
    members: Vec<PackageId>,
}

impl<'a> PriorityScheduler<'a> {
    pub fn new(params: &'a DispatchParams, fleet: &Fleet) -> Result<Self, DispatchError> {
        Ok(PriorityScheduler {
            params,
            vehicle_order: params.vehicle_order(fleet)?,
        })
    }

    pub fn vehicle_order(&self) -> &[VehicleIdx] {
        &self.vehicle_order
    }

    /// Undelivered packages, most urgent first. Equal scores keep id order.
    pub fn sorted_undelivered(&self, packages: &PackageStore) -> Vec<PackageId> {
        let mut scored = packages
            .iter()
            .filter(|package| !package.is_delivered())
            .map(|package| (priority_score(package, self.params), package.id()))
            .collect::<Vec<_>>();

        scored.sort_by(|(a_score, a_id), (b_score, b_id)| {
            a_score.total_cmp(b_score).then(a_id.cmp(b_id))
        });

        scored.into_iter().map(|(_, id)| id).collect()
    }

    /// Runs one scheduling cycle: clears the manifests, then places groups
    /// and single packages onto vehicles.
    #[instrument(skip_all, level = Level::DEBUG)]
    pub fn assign(
        &self,
        packages: &mut PackageStore,
        fleet: &mut Fleet,
    ) -> Result<CycleAssignment, DispatchError> {
        let sorted = self.sorted_undelivered(packages);
        let (groups, singles) = Self::partition(packages, &sorted)?;

        fleet.clear_manifests();

        let mut placements: FxHashMap<VehicleIdx, Vec<PackageId>> = FxHashMap::default();
        let mut deferred = Vec::new();

        for group in &groups {
            match self.place_group(group, packages, fleet)? {
                Some(vehicle_id) => placements
                    .entry(vehicle_id)
                    .or_default()
                    .extend_from_slice(&group.members),
                None => {
                    debug!(
                        "Group {} ({} packages) deferred",
                        group.id,
                        group.members.len()
                    );
                    deferred.extend_from_slice(&group.members);
                }
            }
        }

        for &package_id in &singles {
            match self.place_single(package_id, packages, fleet)? {
                Some(vehicle_id) => placements.entry(vehicle_id).or_default().push(package_id),
                None => deferred.push(package_id),
            }
        }

        let placements = self
            .vehicle_order
            .iter()
            .filter_map(|vehicle_id| {
                placements
                    .remove(vehicle_id)
                    .map(|package_ids| (*vehicle_id, package_ids))
            })
            .collect::<Vec<_>>();

        for (vehicle_id, package_ids) in &placements {
            debug!(
                "Vehicle #{} loads {} packages: {:?}",
                vehicle_id.number(),
                package_ids.len(),
                package_ids
            );
        }

        Ok(CycleAssignment {
            placements,
            deferred,
        })
    }

    /// Splits the sorted ids into groups (ordered by first appearance) and
    /// single packages, keeping the sorted order inside each.
    fn partition(
        packages: &PackageStore,
        sorted: &[PackageId],
    ) -> Result<(Vec<Group>, Vec<PackageId>), DispatchError> {
        let mut groups: Vec<Group> = Vec::new();
        let mut positions: FxHashMap<GroupId, usize> = FxHashMap::default();
        let mut singles = Vec::new();

        for &package_id in sorted {
            match packages.get(package_id)?.group_id() {
                Some(group_id) => {
                    let position = *positions.entry(group_id).or_insert_with(|| {
                        groups.push(Group {
                            id: group_id,
                            members: Vec::new(),
                        });
                        groups.len() - 1
                    });
                    groups[position].members.push(package_id);
                }
                None => singles.push(package_id),
            }
        }

        Ok((groups, singles))
    }

    /// Places a whole group on one vehicle or nowhere.
    fn place_group(
        &self,
        group: &Group,
        packages: &mut PackageStore,
        fleet: &mut Fleet,
    ) -> Result<Option<VehicleIdx>, DispatchError> {
        let mut forced = None;
        for &member in &group.members {
            if let Some(vehicle_id) = packages.get(member)?.forced_vehicle() {
                forced = Some(vehicle_id);
                break;
            }
        }

        let target = match forced {
            Some(vehicle_id) => Some(vehicle_id).filter(|&vehicle_id| {
                fleet
                    .vehicle(vehicle_id)
                    .is_ok_and(|vehicle| vehicle.can_load(group.members.len()))
            }),
            None => self.first_fit(fleet, group.members.len()),
        };

        let Some(vehicle_id) = target else {
            return Ok(None);
        };

        if !fleet.vehicle_mut(vehicle_id)?.try_load(&group.members) {
            return Ok(None);
        }

        for &member in &group.members {
            packages.get_mut(member)?.assign(vehicle_id)?;
        }

        Ok(Some(vehicle_id))
    }

    fn place_single(
        &self,
        package_id: PackageId,
        packages: &mut PackageStore,
        fleet: &mut Fleet,
    ) -> Result<Option<VehicleIdx>, DispatchError> {
        self.open_gates(package_id, packages, fleet)?;

        let package = packages.get(package_id)?;
        if package.is_held() || package.is_delayed() {
            return Ok(None);
        }

        let target = match package.forced_vehicle() {
            Some(vehicle_id) => Some(vehicle_id).filter(|&vehicle_id| {
                fleet
                    .vehicle(vehicle_id)
                    .is_ok_and(|vehicle| vehicle.can_load(1))
            }),
            None => self.first_fit(fleet, 1),
        };

        let Some(vehicle_id) = target else {
            return Ok(None);
        };

        if !fleet.vehicle_mut(vehicle_id)?.try_load(&[package_id]) {
            return Ok(None);
        }
        packages.get_mut(package_id)?.assign(vehicle_id)?;

        Ok(Some(vehicle_id))
    }

    /// Releases time-gated packages once some vehicle's clock has reached the
    /// gate. A held package gets its corrected address and is pinned to the
    /// first such vehicle; a delayed package is pinned to the vehicle waiting
    /// for the delayed shipment.
    fn open_gates(
        &self,
        package_id: PackageId,
        packages: &mut PackageStore,
        fleet: &Fleet,
    ) -> Result<(), DispatchError> {
        let package = packages.get_mut(package_id)?;

        if package.is_held() {
            // First vehicle in dispatch order past the gate takes the package.
            // The correction is stamped once, with that vehicle's clock.
            let ready = self.vehicle_order.iter().find_map(|&vehicle_id| {
                fleet
                    .vehicle(vehicle_id)
                    .ok()
                    .filter(|vehicle| vehicle.clock() >= self.params.address_correction_at)
                    .map(|vehicle| (vehicle_id, vehicle.clock()))
            });

            if let Some((vehicle_id, clock)) = ready {
                if package.apply_address_correction(vehicle_id, clock) {
                    debug!(
                        "Package {} address corrected to '{}' at {}, pinned to vehicle #{}",
                        package_id,
                        package.address(),
                        clock,
                        vehicle_id.number()
                    );
                }
            }
        } else if package.is_delayed() {
            let ready = self.vehicle_order.iter().any(|&vehicle_id| {
                fleet
                    .vehicle(vehicle_id)
                    .is_ok_and(|vehicle| vehicle.clock() >= self.params.delayed_available_at)
            });

            if ready {
                let vehicle_id = self
                    .params
                    .delayed_vehicle_idx()
                    .filter(|&vehicle_id| fleet.contains(vehicle_id))
                    .ok_or(DispatchError::UnknownVehicle(VehicleIdx::new(
                        self.params.delayed_vehicle.saturating_sub(1),
                    )))?;

                package.release_delay(vehicle_id);
                debug!(
                    "Package {} released from delay, pinned to vehicle #{}",
                    package_id,
                    vehicle_id.number()
                );
            }
        }

        Ok(())
    }

    fn first_fit(&self, fleet: &Fleet, count: usize) -> Option<VehicleIdx> {
        self.vehicle_order.iter().copied().find(|&vehicle_id| {
            fleet
                .vehicle(vehicle_id)
                .is_ok_and(|vehicle| vehicle.can_load(count))
        })
    }
}
