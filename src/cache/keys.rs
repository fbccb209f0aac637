//! Cache key conventions
//!
//! Keys are colon-separated segments such as `device:<id>:latest` or
//! `gps:<id>:<range>:<limit>`. The cache never parses them; these helpers
//! only keep callers consistent so prefix invalidation works.

use std::fmt::Display;

pub const DEVICE_PREFIX: &str = "device";
pub const GPS_PREFIX: &str = "gps";
pub const AGGREGATION_PREFIX: &str = "aggregation";

/// Default number of GPS rows requested per series.
pub const DEFAULT_GPS_LIMIT: u32 = 50;

/// Joins `prefix` and `parts` with `:`.
pub fn generate_key<I>(prefix: &str, parts: I) -> String
where
    I: IntoIterator,
    I::Item: Display,
{
    let mut key = prefix.to_string();
    for part in parts {
        key.push(':');
        key.push_str(&part.to_string());
    }
    key
}

/// `device:<device_id>:<data_type>`
pub fn device_key(device_id: &str, data_type: &str) -> String {
    generate_key(DEVICE_PREFIX, [device_id, data_type])
}

/// `device:<device_id>:latest`
pub fn device_latest_key(device_id: &str) -> String {
    device_key(device_id, "latest")
}

/// `gps:<device_id>:<time_range>:<limit>`
pub fn gps_key(device_id: &str, time_range: &str, limit: u32) -> String {
    generate_key(GPS_PREFIX, [device_id, time_range, limit.to_string().as_str()])
}

/// `aggregation:<kind>:<param>...`
pub fn aggregation_key(kind: &str, params: &[&str]) -> String {
    generate_key(AGGREGATION_PREFIX, std::iter::once(kind).chain(params.iter().copied()))
}
