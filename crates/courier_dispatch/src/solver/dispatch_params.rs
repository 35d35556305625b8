use jiff::{SignedDuration, civil::Time, civil::time};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    error::DispatchError,
    problem::{fleet::Fleet, mph::Mph, vehicle::VehicleIdx},
};

/// Policy constants of a dispatch run. Every field has a default, so a
/// scenario only needs to list what it changes.
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct DispatchParams {
    /// Reference clock for priority scores and default vehicle start.
    #[serde(with = "crate::utils::time::clock_time")]
    #[schemars(with = "String")]
    pub reference_start: Time,

    /// Literal time standing in for an "EOD" deadline.
    #[serde(with = "crate::utils::time::clock_time")]
    #[schemars(with = "String")]
    pub end_of_day: Time,

    /// Minutes subtracted from a score per priority point.
    pub priority_weight_minutes: i64,

    pub speed_mph: f64,

    /// Packages a vehicle carries per trip unless overridden per vehicle.
    pub vehicle_capacity: usize,

    /// Held packages stay unassigned on vehicles whose clock is before this.
    #[serde(with = "crate::utils::time::clock_time")]
    #[schemars(with = "String")]
    pub address_correction_at: Time,

    /// Delayed packages stay unassigned on vehicles whose clock is before this.
    #[serde(with = "crate::utils::time::clock_time")]
    #[schemars(with = "String")]
    pub delayed_available_at: Time,

    /// 1-based number of the vehicle that waits for delayed shipments.
    pub delayed_vehicle: usize,

    /// 1-based vehicle numbers in the order the scheduler tries them.
    /// Fleet order when absent.
    pub vehicle_order: Option<Vec<usize>>,
}

impl Default for DispatchParams {
    fn default() -> Self {
        DispatchParams {
            reference_start: time(8, 0, 0, 0),
            end_of_day: time(17, 0, 0, 0),
            priority_weight_minutes: 30,
            speed_mph: 18.0,
            vehicle_capacity: 16,
            address_correction_at: time(10, 20, 0, 0),
            delayed_available_at: time(9, 5, 0, 0),
            delayed_vehicle: 2,
            vehicle_order: None,
        }
    }
}

impl DispatchParams {
    pub fn speed(&self) -> Mph {
        Mph::new(self.speed_mph)
    }

    pub fn priority_weight(&self) -> SignedDuration {
        SignedDuration::from_mins(self.priority_weight_minutes)
    }

    pub fn delayed_vehicle_idx(&self) -> Option<VehicleIdx> {
        VehicleIdx::from_number(self.delayed_vehicle)
    }

    /// The scheduler's vehicle enumeration order, checked against `fleet`.
    pub fn vehicle_order(&self, fleet: &Fleet) -> Result<Vec<VehicleIdx>, DispatchError> {
        match &self.vehicle_order {
            Some(numbers) => numbers
                .iter()
                .map(|&number| {
                    VehicleIdx::from_number(number)
                        .filter(|&vehicle_id| fleet.contains(vehicle_id))
                        .ok_or(DispatchError::UnknownVehicle(VehicleIdx::new(
                            number.saturating_sub(1),
                        )))
                })
                .collect(),
            None => Ok(fleet.iter().map(|(vehicle_id, _)| vehicle_id).collect()),
        }
    }

    pub fn validate(&self, fleet: &Fleet) -> Result<(), DispatchError> {
        if !self.speed().is_valid() {
            return Err(DispatchError::InvalidSpeed(self.speed_mph));
        }

        self.vehicle_order(fleet)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::vehicle::Vehicle;

    fn fleet(size: usize) -> Fleet {
        Fleet::new(
            (0..size)
                .map(|_| Vehicle::new(16, time(8, 0, 0, 0)))
                .collect(),
        )
    }

    #[test]
    fn test_partial_params() {
        let params: DispatchParams =
            serde_json::from_str(r#"{ "speed_mph": 25.0, "delayed_available_at": "9:30 AM" }"#)
                .unwrap();

        assert_eq!(params.speed_mph, 25.0);
        assert_eq!(params.delayed_available_at, time(9, 30, 0, 0));
        assert_eq!(params.vehicle_capacity, 16);
        assert_eq!(params.end_of_day, time(17, 0, 0, 0));
    }

    #[test]
    fn test_vehicle_order() {
        let mut params = DispatchParams::default();
        assert_eq!(
            params.vehicle_order(&fleet(2)).unwrap(),
            vec![VehicleIdx::new(0), VehicleIdx::new(1)]
        );

        params.vehicle_order = Some(vec![2, 1]);
        assert_eq!(
            params.vehicle_order(&fleet(2)).unwrap(),
            vec![VehicleIdx::new(1), VehicleIdx::new(0)]
        );

        params.vehicle_order = Some(vec![3]);
        assert!(params.validate(&fleet(2)).is_err());
    }

    #[test]
    fn test_invalid_speed() {
        let params = DispatchParams {
            speed_mph: 0.0,
            ..DispatchParams::default()
        };

        assert!(matches!(
            params.validate(&fleet(1)),
            Err(DispatchError::InvalidSpeed(_))
        ));
    }
}
