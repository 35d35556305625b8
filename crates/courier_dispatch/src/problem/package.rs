use std::{fmt::Display, str::FromStr};

use jiff::civil::Time;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    error::DispatchError,
    problem::{location::LocationIdx, vehicle::VehicleIdx},
    utils::time::{format_clock_time, parse_clock_time},
};

#[derive(
    Serialize, Deserialize, JsonSchema, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
#[serde(transparent)]
pub struct PackageId(u32);

impl PackageId {
    pub const fn new(id: u32) -> Self {
        PackageId(id)
    }

    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl Display for PackageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Packages sharing a group id must leave on the same trip of the same vehicle.
/// The id is the largest package id among the members.
pub type GroupId = PackageId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Deadline {
    At(Time),
    EndOfDay,
}

impl Deadline {
    /// The clock time this deadline stands for, `end_of_day` for EOD.
    pub fn resolve(&self, end_of_day: Time) -> Time {
        match self {
            Deadline::At(time) => *time,
            Deadline::EndOfDay => end_of_day,
        }
    }

    pub fn is_end_of_day(&self) -> bool {
        matches!(self, Deadline::EndOfDay)
    }
}

impl FromStr for Deadline {
    type Err = jiff::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.trim().eq_ignore_ascii_case("EOD") {
            return Ok(Deadline::EndOfDay);
        }

        parse_clock_time(value).map(Deadline::At)
    }
}

impl Display for Deadline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Deadline::At(time) => write!(f, "{}", format_clock_time(*time)),
            Deadline::EndOfDay => write!(f, "EOD"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Default)]
pub enum Priority {
    #[default]
    Ordinary,
    TimeSensitive,
    Grouped,
}

impl Priority {
    pub fn weight(&self) -> i64 {
        match self {
            Priority::Ordinary => 0,
            Priority::TimeSensitive => 1,
            Priority::Grouped => 2,
        }
    }

    pub fn from_weight(weight: u8) -> Option<Self> {
        match weight {
            0 => Some(Priority::Ordinary),
            1 => Some(Priority::TimeSensitive),
            2 => Some(Priority::Grouped),
            _ => None,
        }
    }
}

/// Scheduling attributes resolved once during ingestion.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PackageConstraints {
    pub priority: Priority,
    pub group_id: Option<GroupId>,
    pub related_ids: Vec<PackageId>,
    pub forced_vehicle: Option<VehicleIdx>,
    pub delayed: bool,
    pub held: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DeliveryStatus {
    AtDepot,
    EnRoute(VehicleIdx),
    Delivered { time: Time, vehicle: VehicleIdx },
}

impl Display for DeliveryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeliveryStatus::AtDepot => write!(f, "At the depot"),
            DeliveryStatus::EnRoute(vehicle) => write!(f, "En route (vehicle #{})", vehicle.number()),
            DeliveryStatus::Delivered { time, vehicle } => write!(
                f,
                "Delivered at {} (vehicle #{})",
                format_clock_time(*time),
                vehicle.number()
            ),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AddressCorrection {
    original_address: String,
    original_location: LocationIdx,
    corrected_address: String,
    corrected_location: LocationIdx,
    corrected_at: Option<Time>,
}

impl AddressCorrection {
    pub fn original_address(&self) -> &str {
        &self.original_address
    }

    pub fn corrected_address(&self) -> &str {
        &self.corrected_address
    }

    pub fn corrected_at(&self) -> Option<Time> {
        self.corrected_at
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Package {
    id: PackageId,
    address: String,
    location_id: LocationIdx,
    city: Option<String>,
    zip: Option<String>,
    deadline: Deadline,
    weight: u32,
    constraints: PackageConstraints,
    correction: Option<AddressCorrection>,

    status: DeliveryStatus,
    assigned_vehicle: Option<VehicleIdx>,
    departed_at: Option<Time>,
    delivery_time: Option<Time>,
}

impl Package {
    pub fn id(&self) -> PackageId {
        self.id
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn location_id(&self) -> LocationIdx {
        self.location_id
    }

    pub fn city(&self) -> Option<&str> {
        self.city.as_deref()
    }

    pub fn zip(&self) -> Option<&str> {
        self.zip.as_deref()
    }

    pub fn deadline(&self) -> Deadline {
        self.deadline
    }

    pub fn weight(&self) -> u32 {
        self.weight
    }

    pub fn constraints(&self) -> &PackageConstraints {
        &self.constraints
    }

    pub fn priority(&self) -> Priority {
        self.constraints.priority
    }

    pub fn group_id(&self) -> Option<GroupId> {
        self.constraints.group_id
    }

    pub fn forced_vehicle(&self) -> Option<VehicleIdx> {
        self.constraints.forced_vehicle
    }

    pub fn is_delayed(&self) -> bool {
        self.constraints.delayed
    }

    pub fn is_held(&self) -> bool {
        self.constraints.held
    }

    pub fn correction(&self) -> Option<&AddressCorrection> {
        self.correction.as_ref()
    }

    pub fn status(&self) -> DeliveryStatus {
        self.status
    }

    pub fn assigned_vehicle(&self) -> Option<VehicleIdx> {
        self.assigned_vehicle
    }

    pub fn departed_at(&self) -> Option<Time> {
        self.departed_at
    }

    pub fn delivery_time(&self) -> Option<Time> {
        self.delivery_time
    }

    pub fn is_delivered(&self) -> bool {
        self.delivery_time.is_some()
    }

    /// Places the package into a manifest. Only allowed before delivery.
    pub(crate) fn assign(&mut self, vehicle: VehicleIdx) -> Result<(), DispatchError> {
        if self.is_delivered() {
            return Err(DispatchError::AlreadyDelivered(self.id));
        }

        self.assigned_vehicle = Some(vehicle);
        Ok(())
    }

    /// Replaces the address with the corrected one and pins the package to
    /// `vehicle`. Returns false if there was no pending correction.
    pub(crate) fn apply_address_correction(&mut self, vehicle: VehicleIdx, at: Time) -> bool {
        let Some(correction) = self.correction.as_mut() else {
            return false;
        };

        if !self.constraints.held {
            return false;
        }

        correction.corrected_at = Some(at);
        self.address = correction.corrected_address.clone();
        self.location_id = correction.corrected_location;
        self.constraints.held = false;
        self.constraints.forced_vehicle = Some(vehicle);

        true
    }

    pub(crate) fn release_delay(&mut self, vehicle: VehicleIdx) {
        self.constraints.delayed = false;
        self.constraints.forced_vehicle = Some(vehicle);
    }

    pub(crate) fn depart(&mut self, vehicle: VehicleIdx, at: Time) -> Result<(), DispatchError> {
        if self.is_delivered() {
            return Err(DispatchError::AlreadyDelivered(self.id));
        }

        self.status = DeliveryStatus::EnRoute(vehicle);
        self.departed_at = Some(at);
        Ok(())
    }

    /// Stamps the delivery. The delivery time is written once.
    pub(crate) fn mark_delivered(
        &mut self,
        vehicle: VehicleIdx,
        at: Time,
    ) -> Result<(), DispatchError> {
        if self.is_delivered() {
            return Err(DispatchError::AlreadyDelivered(self.id));
        }

        self.delivery_time = Some(at);
        self.assigned_vehicle = Some(vehicle);
        self.status = DeliveryStatus::Delivered { time: at, vehicle };
        Ok(())
    }

    pub fn status_at(&self, time: Time) -> DeliveryStatus {
        match (self.delivery_time, self.departed_at, self.assigned_vehicle) {
            (Some(delivered), _, Some(vehicle)) if delivered <= time => DeliveryStatus::Delivered {
                time: delivered,
                vehicle,
            },
            (_, Some(departed), Some(vehicle)) if departed <= time => {
                DeliveryStatus::EnRoute(vehicle)
            }
            _ => DeliveryStatus::AtDepot,
        }
    }

    /// The address a package carried at `time`: the pre-correction address
    /// until the correction happened.
    pub fn display_address_at(&self, time: Time) -> &str {
        match &self.correction {
            Some(correction) => match correction.corrected_at {
                Some(corrected_at) if time >= corrected_at => &self.address,
                _ => &correction.original_address,
            },
            None => &self.address,
        }
    }

    pub fn is_late(&self, end_of_day: Time) -> bool {
        self.delivery_time
            .is_some_and(|delivered| delivered > self.deadline.resolve(end_of_day))
    }
}

pub struct PackageBuilder {
    id: PackageId,
    address: String,
    location_id: LocationIdx,
    city: Option<String>,
    zip: Option<String>,
    deadline: Deadline,
    weight: u32,
    constraints: PackageConstraints,
    correction: Option<AddressCorrection>,
}

impl PackageBuilder {
    pub fn new(id: PackageId, address: impl Into<String>, location_id: LocationIdx) -> Self {
        PackageBuilder {
            id,
            address: address.into(),
            location_id,
            city: None,
            zip: None,
            deadline: Deadline::EndOfDay,
            weight: 0,
            constraints: PackageConstraints::default(),
            correction: None,
        }
    }

    pub fn set_city(&mut self, city: impl Into<String>) -> &mut PackageBuilder {
        self.city = Some(city.into());
        self
    }

    pub fn set_zip(&mut self, zip: impl Into<String>) -> &mut PackageBuilder {
        self.zip = Some(zip.into());
        self
    }

    pub fn set_deadline(&mut self, deadline: Deadline) -> &mut PackageBuilder {
        self.deadline = deadline;
        self
    }

    pub fn set_weight(&mut self, weight: u32) -> &mut PackageBuilder {
        self.weight = weight;
        self
    }

    pub fn set_priority(&mut self, priority: Priority) -> &mut PackageBuilder {
        self.constraints.priority = priority;
        self
    }

    pub fn set_group(&mut self, group_id: GroupId) -> &mut PackageBuilder {
        self.constraints.group_id = Some(group_id);
        self
    }

    pub fn set_related_ids(&mut self, related_ids: Vec<PackageId>) -> &mut PackageBuilder {
        self.constraints.related_ids = related_ids;
        self
    }

    pub fn set_forced_vehicle(&mut self, vehicle: VehicleIdx) -> &mut PackageBuilder {
        self.constraints.forced_vehicle = Some(vehicle);
        self
    }

    pub fn set_delayed(&mut self, delayed: bool) -> &mut PackageBuilder {
        self.constraints.delayed = delayed;
        self
    }

    /// Holds the package until its address is corrected to `address`.
    pub fn set_address_correction(
        &mut self,
        address: impl Into<String>,
        location_id: LocationIdx,
    ) -> &mut PackageBuilder {
        self.constraints.held = true;
        self.correction = Some(AddressCorrection {
            original_address: self.address.clone(),
            original_location: self.location_id,
            corrected_address: address.into(),
            corrected_location: location_id,
            corrected_at: None,
        });
        self
    }

    pub fn build(self) -> Package {
        Package {
            id: self.id,
            address: self.address,
            location_id: self.location_id,
            city: self.city,
            zip: self.zip,
            deadline: self.deadline,
            weight: self.weight,
            constraints: self.constraints,
            correction: self.correction,
            status: DeliveryStatus::AtDepot,
            assigned_vehicle: None,
            departed_at: None,
            delivery_time: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use jiff::civil::time;

    use super::*;

    fn package() -> Package {
        PackageBuilder::new(PackageId::new(1), "1 MAIN ST", LocationIdx::new(1)).build()
    }

    #[test]
    fn test_deadline_parsing() {
        assert_eq!("EOD".parse::<Deadline>().unwrap(), Deadline::EndOfDay);
        assert_eq!(
            "10:30 AM".parse::<Deadline>().unwrap(),
            Deadline::At(time(10, 30, 0, 0))
        );
        assert_eq!(Deadline::At(time(9, 0, 0, 0)).to_string(), "09:00 AM");
        assert!("whenever".parse::<Deadline>().is_err());
    }

    #[test]
    fn test_delivery_time_is_written_once() {
        let mut package = package();
        let vehicle = VehicleIdx::new(0);

        package.assign(vehicle).unwrap();
        package.depart(vehicle, time(8, 0, 0, 0)).unwrap();
        package.mark_delivered(vehicle, time(8, 30, 0, 0)).unwrap();

        assert!(matches!(
            package.mark_delivered(VehicleIdx::new(1), time(9, 0, 0, 0)),
            Err(DispatchError::AlreadyDelivered(_))
        ));
        assert!(package.assign(VehicleIdx::new(1)).is_err());
        assert_eq!(package.delivery_time(), Some(time(8, 30, 0, 0)));
        assert_eq!(package.assigned_vehicle(), Some(vehicle));
    }

    #[test]
    fn test_status_at() {
        let mut package = package();
        let vehicle = VehicleIdx::new(1);

        assert_eq!(package.status_at(time(12, 0, 0, 0)), DeliveryStatus::AtDepot);

        package.assign(vehicle).unwrap();
        package.depart(vehicle, time(9, 5, 0, 0)).unwrap();
        package.mark_delivered(vehicle, time(9, 40, 0, 0)).unwrap();

        assert_eq!(package.status_at(time(9, 0, 0, 0)), DeliveryStatus::AtDepot);
        assert_eq!(
            package.status_at(time(9, 5, 0, 0)),
            DeliveryStatus::EnRoute(vehicle)
        );
        assert_eq!(
            package.status_at(time(9, 39, 59, 0)),
            DeliveryStatus::EnRoute(vehicle)
        );
        assert_eq!(
            package.status_at(time(9, 40, 0, 0)),
            DeliveryStatus::Delivered {
                time: time(9, 40, 0, 0),
                vehicle
            }
        );
    }

    #[test]
    fn test_address_correction() {
        let mut builder = PackageBuilder::new(PackageId::new(9), "300 STATE ST", LocationIdx::new(3));
        builder.set_address_correction("410 S STATE ST", LocationIdx::new(4));
        let mut package = builder.build();

        assert!(package.is_held());
        assert_eq!(package.display_address_at(time(8, 0, 0, 0)), "300 STATE ST");

        assert!(package.apply_address_correction(VehicleIdx::new(0), time(10, 25, 0, 0)));
        assert!(!package.is_held());
        assert_eq!(package.location_id(), LocationIdx::new(4));
        assert_eq!(package.forced_vehicle(), Some(VehicleIdx::new(0)));

        assert_eq!(package.display_address_at(time(10, 24, 0, 0)), "300 STATE ST");
        assert_eq!(package.display_address_at(time(10, 25, 0, 0)), "410 S STATE ST");

        // a second correction is a no-op
        assert!(!package.apply_address_correction(VehicleIdx::new(1), time(11, 0, 0, 0)));
        assert_eq!(package.forced_vehicle(), Some(VehicleIdx::new(0)));
    }

    #[test]
    fn test_is_late() {
        let mut builder = PackageBuilder::new(PackageId::new(2), "2 MAIN ST", LocationIdx::new(2));
        builder.set_deadline(Deadline::At(time(10, 30, 0, 0)));
        let mut package = builder.build();
        let end_of_day = time(17, 0, 0, 0);

        assert!(!package.is_late(end_of_day));
        package
            .mark_delivered(VehicleIdx::new(0), time(10, 45, 0, 0))
            .unwrap();
        assert!(package.is_late(end_of_day));
    }
}
