pub use super::accounts::Entity as Accounts;
pub use super::waypoint_sets::Entity as WaypointSets;
pub use super::waypoints::Entity as Waypoints;
