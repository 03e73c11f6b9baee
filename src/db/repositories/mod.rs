pub mod account;
pub mod waypoint;
