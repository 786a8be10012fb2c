//! sea-orm entities and connection helpers for the portfolio schema.

pub mod errors;
pub mod db;
pub mod setting;
pub mod user;

#[cfg(test)]
mod tests;
