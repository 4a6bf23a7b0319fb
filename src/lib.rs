//! # entity-driver
//!
//! Per-table CRUD drivers over PostgreSQL for the `may` coroutine runtime.
//!
//! A driver is a [`DriverConfig`] (table, schema, order key, primary key)
//! bound to a [`Record`] type and a [`ConnectionPool`]. Record fields use
//! camelCase; columns use snake_case; values are rendered inline as escaped
//! SQL literals.
//!
//! ```no_run
//! use entity_driver::{entity, DatabaseConfig, DriverConfig, FindAllOptions, PostgresPool, TableDriver};
//! # use entity_driver::{DriverError, Entity, Record};
//! # struct Page { id: String, company_id: String }
//! # impl Record for Page {
//! #     const FIELDS: &'static [&'static str] = &["id", "companyId"];
//! #     fn to_entity(&self) -> Entity { entity! { "id" => self.id.as_str(), "companyId" => self.company_id.as_str() } }
//! #     fn from_entity(e: Entity) -> Result<Self, DriverError> {
//! #         Ok(Page {
//! #             id: entity_driver::entity::text_field(&e, "id")?,
//! #             company_id: entity_driver::entity::text_field(&e, "companyId")?,
//! #         })
//! #     }
//! # }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = DatabaseConfig::load()?;
//! let pool = PostgresPool::from_config(&config)?;
//! let pages: TableDriver<Page, _> = TableDriver::new(
//!     DriverConfig::new("company_press_release_page", "id", "id").with_schema(&config.schema),
//!     pool,
//! )?;
//!
//! let latest = pages.find_all(&FindAllOptions::new().limit(20))?;
//! let for_company = pages.find_by(&entity! { "companyId" => "c1" })?;
//! # Ok(())
//! # }
//! ```

pub mod case;
pub mod connection;
pub mod driver;
pub mod entity;
pub mod error;
pub mod executor;
mod macros;
pub mod metrics;
pub mod pool;
pub mod query;
pub mod row;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;
pub mod value;

pub use driver::{DriverConfig, TableDriver, DEFAULT_SCHEMA};
pub use entity::{Entity, Record};
pub use error::{DriverError, Result};
pub use executor::{Connection, MayPostgresConnection};
pub use pool::{ConnectionPool, DatabaseConfig, PostgresPool};
pub use query::FindAllOptions;
pub use value::Value;

#[doc(hidden)]
pub use may;
