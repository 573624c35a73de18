//! # lms-db
//!
//! Database layer implementing the lms-core repository traits with
//! PostgreSQL via SQLx.
//!
//! ## Overview
//!
//! - Connection pool management and schema migrations
//! - Database models with SQLx `FromRow` derives
//! - Model -> entity mappers
//! - Repository implementations, with copy-moving operations run in
//!   row-locking transactions
//!
//! ## Usage
//!
//! ```rust,ignore
//! use lms_db::pool::{create_pool, run_migrations, DatabaseConfig};
//! use lms_db::repositories::PgBookRepository;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = create_pool(&DatabaseConfig::from_env()).await?;
//!     run_migrations(&pool).await?;
//!     let books = PgBookRepository::new(pool);
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use pool::{create_pool, create_pool_from_env, run_migrations, DatabaseConfig, PgPool};
pub use repositories::{
    PgActivityLogRepository, PgAttendanceRepository, PgBookRepository, PgBorrowingRepository,
    PgCategoryRepository, PgLibraryRepository, PgMemberRepository, PgMessageRepository,
    PgReservationRepository,
};
