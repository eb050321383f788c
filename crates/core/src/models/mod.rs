pub mod advisory;
pub mod price;
pub mod stats;
pub mod yields;
