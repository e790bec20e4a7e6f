//! Database module - MySQL implementations using SQLx
//!
//! This module provides:
//! - Connection pool management and embedded migrations
//! - The MySQL user and session repository

pub mod connection;
pub mod mysql;


// Re-export commonly used types
pub use connection::{DatabasePool, PoolStatistics};
pub use mysql::MySqlUserRepository;
