pub mod compactor;
pub mod config;
pub mod error;
pub mod limits;
pub mod manager;
pub mod model;
pub mod notify;
pub mod observability;
pub mod repository;
pub mod store;
pub mod timeframe;
pub mod wal;

pub use error::BookingError;
pub use manager::BookingManager;
pub use repository::Repository;
pub use store::BookingStore;
pub use timeframe::{convert_time, timeframes_conflict, Timeframe};
