use courier_dispatch::{problem::package::PackageId, utils::time::parse_clock_time};
use jiff::civil::Time;

pub fn parse_time(input: &str) -> Result<Time, String> {
    parse_clock_time(input)
        .map_err(|_| format!("Invalid time {input:?}, expected 10:30, 10:30:00 or 10:30 AM"))
}

pub fn parse_package_id(input: &str) -> Result<PackageId, String> {
    input
        .trim()
        .parse::<u32>()
        .map(PackageId::new)
        .map_err(|_| format!("Invalid package id {input:?}"))
}
