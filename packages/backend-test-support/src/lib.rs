//! Test support shared by the pickban integration suites: logging setup,
//! RFC 7807 problem assertions and unique identifiers.

pub mod logging;
pub mod problem_details;
pub mod unique_helpers;
