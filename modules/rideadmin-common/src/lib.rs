pub mod config;
pub mod decode;
pub mod error;
pub mod validation;

pub use config::{Config, IncompleteSchedulePolicy};
pub use decode::{decode_snapshot, parse_status};
pub use error::RideAdminError;
pub use rideadmin_world::*;
pub use validation::*;
