pub mod account_service;
pub mod account_service_impl;
pub mod credentials;
pub mod token_service;
pub mod waypoint_service;
pub mod waypoint_service_impl;

pub use account_service::{
    AccountError, AccountService, LoginOutcome, RegisterAccount, UpdateAccount,
};
pub use account_service_impl::SeaOrmAccountService;
pub use token_service::{Claims, TokenError, TokenService};
pub use waypoint_service::{UpsertWaypointSet, WaypointError, WaypointService};
pub use waypoint_service_impl::SeaOrmWaypointService;
