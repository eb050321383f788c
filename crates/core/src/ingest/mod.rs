pub mod provider;
pub mod snapshots;
pub mod types;
