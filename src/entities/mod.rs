pub mod prelude;

pub mod accounts;
pub mod waypoint_sets;
pub mod waypoints;
