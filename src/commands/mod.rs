pub mod entity;
pub mod extract;
pub mod health;
pub mod query;
pub mod stats;
