pub mod config;
pub mod stats;
pub mod sync;
pub mod timer;
