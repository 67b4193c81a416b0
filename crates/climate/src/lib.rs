pub mod climate;
pub mod dates;
pub mod db;
pub mod routes;
mod startup;
mod templates;
mod utils;

pub use climate::{ClimateQueries, ErrorResponse, RangeRequest, RangeSummary};
pub use db::{
    ClimateData, ClimateDatabase, PrecipitationReading, StationName, TemperatureAggregate,
};
pub use routes::*;
pub use startup::*;
pub use utils::*;
