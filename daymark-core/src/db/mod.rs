/// Database layer for Daymark
///
/// This module provides database connection pooling and migrations.
/// Models live in the `models` module at crate root level.
///
/// # Modules
///
/// - `pool`: PostgreSQL connection pool management with health checks
/// - `migrations`: Database migration runner

pub mod migrations;
pub mod pool;
