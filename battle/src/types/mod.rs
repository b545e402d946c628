//! Domain types shared by the belief state

mod conditions;
mod pokemon_type;
mod stats;
mod status;

pub use conditions::Weather;
pub use pokemon_type::{TYPE_CHART, Type, is_immune_to};
pub use stats::BoostTable;
pub use status::MajorStatus;
