pub mod access;
pub mod audit;
pub mod repair;
pub mod schema;
