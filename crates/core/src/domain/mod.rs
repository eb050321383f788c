pub mod advisory;
pub mod contract;
pub mod price;
pub mod yields;
