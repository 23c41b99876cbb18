pub mod eviction;
pub mod origin;
pub mod record;
pub mod time_serde;

mod error;

pub use error::{Error, Result};
pub use eviction::EvictionPolicy;
pub use origin::Origin;
pub use record::QueryRecord;
