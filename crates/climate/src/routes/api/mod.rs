pub mod climate_routes;
pub mod health;

pub use climate_routes::*;
pub use health::*;
