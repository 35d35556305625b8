use jiff::civil::Time;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    problem::package::PackageId, solver::dispatch_params::DispatchParams,
    utils::time::optional_clock_time,
};

/// One batch run: the address book with its distances, the packages of the
/// day and the vehicles that carry them.
#[derive(Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields, rename = "Scenario")]
pub struct JsonScenario {
    /// Address of the hub every trip starts from and returns to.
    pub depot: String,

    /// Known addresses. Their order breaks ties between equidistant stops.
    pub addresses: Vec<String>,

    /// Lower-triangular distances in miles, row `i` holding at least `i + 1`
    /// entries.
    pub distances: Vec<Vec<f64>>,

    pub packages: Vec<JsonPackage>,
    pub vehicles: Vec<JsonVehicle>,

    #[serde(default)]
    pub params: DispatchParams,
}

#[derive(Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields, rename = "Package")]
pub struct JsonPackage {
    pub id: PackageId,
    pub address: String,
    pub city: Option<String>,
    pub zip: Option<String>,

    /// `EOD` or a clock time such as `10:30 AM`. EOD when absent.
    pub deadline: Option<String>,
    pub weight: Option<u32>,

    /// Packages that must leave on the same trip of the same vehicle.
    #[serde(default)]
    pub must_ship_with: Vec<PackageId>,

    /// 1-based vehicle number the package may only travel on.
    pub forced_vehicle: Option<usize>,

    /// Arrives at the depot late, see `DispatchParams::delayed_available_at`.
    #[serde(default)]
    pub delayed: bool,

    /// The listed address is wrong and is replaced by this one once the
    /// correction comes in. The package is held until then.
    pub corrected_address: Option<String>,

    /// Overrides the derived priority: 0 ordinary, 1 time sensitive, 2 grouped.
    pub priority: Option<u8>,
}

#[derive(Serialize, Deserialize, JsonSchema, Default)]
#[serde(deny_unknown_fields, rename = "Vehicle")]
pub struct JsonVehicle {
    /// Departure time of the first trip. `reference_start` when absent.
    #[serde(default, with = "optional_clock_time")]
    #[schemars(with = "Option<String>")]
    pub start_time: Option<Time>,
    pub capacity: Option<usize>,
}
