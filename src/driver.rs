//! Per-table drivers.
//!
//! A [`DriverConfig`] names the table and the keys a driver orders and
//! matches by. A [`TableDriver`] pairs that configuration with a
//! [`ConnectionPool`] and a [`Record`] type and runs the CRUD operations:
//! convert keys, build the statement, execute it on one checked-out
//! connection, and convert rows back.

use std::marker::PhantomData;
use std::ops::Deref;

use crate::case::{to_external_keys, to_storage_key, to_storage_keys};
use crate::entity::{Entity, Record};
use crate::error::{DriverError, Result};
use crate::executor::Connection;
use crate::pool::ConnectionPool;
use crate::query::FindAllOptions;
use crate::value::Value;

/// Schema used when a driver does not name one.
pub const DEFAULT_SCHEMA: &str = "schema";

/// Table name, schema, ordering key and primary key of one driver.
///
/// `order_key` and `p_key` are field names in the external convention; the
/// builders use their storage-convention column names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverConfig {
    table: String,
    schema: String,
    order_key: String,
    p_key: String,
}

impl DriverConfig {
    pub fn new(
        table: impl Into<String>,
        order_key: impl Into<String>,
        p_key: impl Into<String>,
    ) -> Self {
        Self {
            table: table.into(),
            schema: DEFAULT_SCHEMA.to_string(),
            order_key: order_key.into(),
            p_key: p_key.into(),
        }
    }

    #[must_use]
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = schema.into();
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn order_key(&self) -> &str {
        &self.order_key
    }

    pub fn p_key(&self) -> &str {
        &self.p_key
    }

    /// `<schema>.<table>`, used verbatim in every statement.
    pub fn tablename(&self) -> String {
        format!("{}.{}", self.schema, self.table)
    }

    pub fn order_column(&self) -> String {
        to_storage_key(&self.order_key)
    }

    pub fn p_column(&self) -> String {
        to_storage_key(&self.p_key)
    }

    /// Check the configuration against a record's field names.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Configuration`] when the table or schema is
    /// empty, or the order or primary key is not one of `fields`.
    pub fn validate(&self, fields: &[&str]) -> Result<()> {
        if self.table.is_empty() {
            return Err(DriverError::Configuration("table name is empty".to_string()));
        }
        if self.schema.is_empty() {
            return Err(DriverError::Configuration(format!(
                "schema for table `{}` is empty",
                self.table
            )));
        }
        for (role, key) in [("order key", &self.order_key), ("primary key", &self.p_key)] {
            if !fields.iter().any(|f| *f == key.as_str()) {
                return Err(DriverError::Configuration(format!(
                    "{role} `{key}` is not a field of {} (fields: {})",
                    self.tablename(),
                    fields.join(", ")
                )));
            }
        }
        Ok(())
    }
}

/// CRUD access to one table for records of type `R` over pool `P`.
///
/// ```no_run
/// use entity_driver::{DatabaseConfig, DriverConfig, PostgresPool, TableDriver};
/// # use entity_driver::{DriverError, Entity, Record};
/// # struct Company { id: String }
/// # impl Record for Company {
/// #     const FIELDS: &'static [&'static str] = &["id"];
/// #     fn to_entity(&self) -> Entity { Entity::new().with("id", self.id.as_str()) }
/// #     fn from_entity(e: Entity) -> Result<Self, DriverError> {
/// #         Ok(Company { id: entity_driver::entity::text_field(&e, "id")? })
/// #     }
/// # }
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = PostgresPool::from_config(&DatabaseConfig::load()?)?;
/// let companies: TableDriver<Company, _> =
///     TableDriver::new(DriverConfig::new("company", "id", "id"), pool)?;
/// let total = companies.count_all()?;
/// # Ok(())
/// # }
/// ```
pub struct TableDriver<R, P> {
    config: DriverConfig,
    pool: P,
    _record: PhantomData<fn() -> R>,
}

impl<R, P> TableDriver<R, P>
where
    R: Record,
    P: ConnectionPool,
{
    /// # Errors
    ///
    /// Returns [`DriverError::Configuration`] if `config` does not fit `R`.
    pub fn new(config: DriverConfig, pool: P) -> Result<Self> {
        config.validate(R::FIELDS)?;
        Ok(Self {
            config,
            pool,
            _record: PhantomData,
        })
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    pub fn pool(&self) -> &P {
        &self.pool
    }

    /// Check out one connection, run `op` on it, and return it to the pool
    /// whether `op` succeeds, fails, or panics.
    pub fn run_query<T, F>(&self, op: F) -> Result<T>
    where
        F: FnOnce(&P::Connection) -> Result<T>,
    {
        let checkout = Checkout::acquire(&self.pool)?;
        op(&checkout)
    }

    /// Insert one record. Returns the affected row count.
    pub fn save(&self, record: &R) -> Result<u64> {
        let sql = self
            .config
            .create_insert_query(&to_storage_keys(record.to_entity()))?;
        self.run_query(|conn| conn.execute(&sql))
    }

    /// Insert records one statement at a time on a single connection.
    ///
    /// Statements are built up front, so a serialization failure aborts
    /// before anything is written. An execution failure stops at that
    /// record; earlier inserts stay.
    pub fn save_all(&self, records: &[R]) -> Result<u64> {
        let statements = records
            .iter()
            .map(|r| self.config.create_insert_query(&to_storage_keys(r.to_entity())))
            .collect::<Result<Vec<_>>>()?;
        self.run_query(|conn| {
            let mut affected = 0;
            for sql in &statements {
                affected += conn.execute(sql)?;
            }
            Ok(affected)
        })
    }

    /// Records matching every field of `filter` (external keys), ordered by
    /// the order key. An empty filter returns every row.
    pub fn find_by(&self, filter: &Entity) -> Result<Vec<R>> {
        self.check_fields(filter.keys())?;
        let sql = self
            .config
            .create_select_query(&to_storage_keys(filter.clone()))?;
        self.run_query(|conn| conn.query_all(&sql))?
            .into_iter()
            .map(|row| R::from_entity(to_external_keys(row)))
            .collect()
    }

    /// One page of records ordered by the order key.
    ///
    /// A projection in `opts.keys` that leaves out fields `R` needs fails
    /// with [`DriverError::Decode`]; use [`find_all_fields`](Self::find_all_fields)
    /// for partial rows.
    pub fn find_all(&self, opts: &FindAllOptions) -> Result<Vec<R>> {
        self.find_all_fields(opts)?
            .into_iter()
            .map(R::from_entity)
            .collect()
    }

    /// Like [`find_all`](Self::find_all) but returns raw entities with
    /// external keys, so projections may be partial.
    pub fn find_all_fields(&self, opts: &FindAllOptions) -> Result<Vec<Entity>> {
        let storage_opts = match &opts.keys {
            Some(keys) => {
                self.check_fields(keys.iter().map(String::as_str))?;
                FindAllOptions {
                    keys: Some(keys.iter().map(|k| to_storage_key(k)).collect()),
                    ..opts.clone()
                }
            }
            None => opts.clone(),
        };
        let sql = self.config.create_find_all_query(&storage_opts)?;
        let rows = self.run_query(|conn| conn.query_all(&sql))?;
        Ok(rows.into_iter().map(to_external_keys).collect())
    }

    /// Number of rows in the table.
    pub fn count_all(&self) -> Result<i64> {
        let sql = self.config.create_count_query();
        let rows = self.run_query(|conn| conn.query_all(&sql))?;
        match rows.first().and_then(|row| row.get("count")) {
            None | Some(Value::Null) => Ok(0),
            Some(Value::Int(n)) => Ok(*n),
            Some(Value::Text(s)) => s
                .parse()
                .map_err(|e| DriverError::Decode(format!("count `{s}` is not a number: {e}"))),
            Some(other) => Err(DriverError::Decode(format!(
                "count has unexpected value {other:?}"
            ))),
        }
    }

    /// Delete rows matching every field of `filter` (external keys).
    pub fn delete_by(&self, filter: &Entity) -> Result<u64> {
        self.check_fields(filter.keys())?;
        let sql = self
            .config
            .create_delete_query(&to_storage_keys(filter.clone()))?;
        self.run_query(|conn| conn.execute(&sql))
    }

    /// Update the row with the record's primary key, or insert it when no
    /// such row exists. A record with no field besides its primary key has
    /// nothing to update; finding its row returns `Ok(0)`.
    ///
    /// The existence check and the write run on one connection but not in a
    /// transaction; two callers upserting the same key can both insert, and
    /// the second hits the table's unique constraint.
    pub fn upsert_with(&self, record: &R) -> Result<u64> {
        let entity = to_storage_keys(record.to_entity());
        let p_column = self.config.p_column();
        let pk = match entity.get(&p_column) {
            Some(v) if !v.is_null() => v.clone(),
            _ => {
                return Err(DriverError::Validation(format!(
                    "upsert on {} requires a value for primary key `{p_column}`",
                    self.config.tablename()
                )));
            }
        };
        let exists_sql = self
            .config
            .create_select_query(&Entity::new().with(p_column, pk))?;
        let insert_sql = self.config.create_insert_query(&entity)?;
        let update_sql = if entity.len() > 1 {
            Some(self.config.create_update_query(entity)?)
        } else {
            None
        };

        self.run_query(|conn| {
            if conn.query_all(&exists_sql)?.is_empty() {
                conn.execute(&insert_sql)
            } else if let Some(update_sql) = &update_sql {
                conn.execute(update_sql)
            } else {
                log::debug!(
                    "{} already has this {}, nothing to update",
                    self.config.tablename(),
                    self.config.p_key()
                );
                Ok(0)
            }
        })
    }

    fn check_fields<'a>(&self, mut keys: impl Iterator<Item = &'a str>) -> Result<()> {
        match keys.find(|k| !R::FIELDS.iter().any(|f| f == k)) {
            Some(unknown) => Err(DriverError::Validation(format!(
                "`{unknown}` is not a field of {}",
                self.config.tablename()
            ))),
            None => Ok(()),
        }
    }
}

/// A connection checked out of a pool; released on drop.
struct Checkout<'p, P: ConnectionPool> {
    pool: &'p P,
    conn: Option<P::Connection>,
}

impl<'p, P: ConnectionPool> Checkout<'p, P> {
    fn acquire(pool: &'p P) -> Result<Self> {
        let conn = pool.acquire()?;
        Ok(Self {
            pool,
            conn: Some(conn),
        })
    }
}

impl<P: ConnectionPool> Deref for Checkout<'_, P> {
    type Target = P::Connection;

    fn deref(&self) -> &Self::Target {
        // Only taken in drop.
        match &self.conn {
            Some(conn) => conn,
            None => unreachable!("connection used after release"),
        }
    }
}

impl<P: ConnectionPool> Drop for Checkout<'_, P> {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            self.pool.release(conn);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{MockPool, MockResponse};

    struct Page {
        id: String,
        company_id: String,
        title: String,
    }

    impl Record for Page {
        const FIELDS: &'static [&'static str] = &["id", "companyId", "title"];

        fn to_entity(&self) -> Entity {
            Entity::new()
                .with("id", self.id.as_str())
                .with("companyId", self.company_id.as_str())
                .with("title", self.title.as_str())
        }

        fn from_entity(entity: Entity) -> Result<Self> {
            Ok(Page {
                id: crate::entity::text_field(&entity, "id")?,
                company_id: crate::entity::text_field(&entity, "companyId")?,
                title: crate::entity::text_field(&entity, "title")?,
            })
        }
    }

    fn page(id: &str) -> Page {
        Page {
            id: id.to_string(),
            company_id: "c1".to_string(),
            title: "Launch".to_string(),
        }
    }

    fn driver(pool: MockPool) -> TableDriver<Page, MockPool> {
        TableDriver::new(DriverConfig::new("page", "id", "id"), pool).unwrap()
    }

    #[test]
    fn test_tablename_and_columns() {
        let config = DriverConfig::new("press_release", "lastUpdatedAt", "pageId");
        assert_eq!(config.tablename(), "schema.press_release");
        assert_eq!(config.order_column(), "last_updated_at");
        assert_eq!(config.p_column(), "page_id");
        assert_eq!(config.with_schema("crawl").tablename(), "crawl.press_release");

        let config = DriverConfig::new("address", "address1", "line2Text");
        assert_eq!(config.order_column(), "address1");
        assert_eq!(config.p_column(), "line2_text");
    }

    #[test]
    fn test_validate_rejects_unknown_keys() {
        let config = DriverConfig::new("page", "createdAt", "id");
        assert!(matches!(
            config.validate(Page::FIELDS),
            Err(DriverError::Configuration(_))
        ));

        let config = DriverConfig::new("page", "id", "pageId");
        assert!(matches!(
            TableDriver::<Page, _>::new(config, MockPool::new()),
            Err(DriverError::Configuration(_))
        ));

        let config = DriverConfig::new("", "id", "id");
        assert!(matches!(
            config.validate(Page::FIELDS),
            Err(DriverError::Configuration(_))
        ));
    }

    #[test]
    fn test_run_query_releases_on_success() {
        let pool = MockPool::new();
        let driver = driver(pool.clone());
        let out = driver.run_query(|_| Ok(7)).unwrap();
        assert_eq!(out, 7);
        assert_eq!(pool.acquired(), 1);
        assert_eq!(pool.released(), 1);
    }

    #[test]
    fn test_run_query_releases_on_error() {
        let pool = MockPool::new();
        let driver = driver(pool.clone());
        let err = driver
            .run_query(|_| -> Result<()> { Err(DriverError::Query("boom".to_string())) })
            .unwrap_err();
        assert!(matches!(err, DriverError::Query(_)));
        assert_eq!(pool.acquired(), 1);
        assert_eq!(pool.released(), 1);
    }

    #[test]
    fn test_run_query_releases_on_panic() {
        let pool = MockPool::new();
        let driver = driver(pool.clone());
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            driver.run_query(|_| -> Result<()> { panic!("operation blew up") })
        }));
        assert!(result.is_err());
        assert_eq!(pool.acquired(), 1);
        assert_eq!(pool.released(), 1);
    }

    #[test]
    fn test_failed_acquire_releases_nothing() {
        let pool = MockPool::new();
        pool.fail_next_acquire();
        let driver = driver(pool.clone());
        assert!(matches!(driver.count_all(), Err(DriverError::PoolTimeout(_))));
        assert_eq!(pool.acquired(), 0);
        assert_eq!(pool.released(), 0);
    }

    #[test]
    fn test_save_converts_keys() {
        let pool = MockPool::new();
        driver(pool.clone()).save(&page("p1")).unwrap();
        assert_eq!(
            pool.statements(),
            vec!["INSERT INTO schema.page (id, company_id, title) VALUES('p1', 'c1', 'Launch');"]
        );
    }

    #[test]
    fn test_find_by_converts_rows_back() {
        let pool = MockPool::new();
        pool.push_response(MockResponse::Rows(vec![Entity::new()
            .with("id", "p1")
            .with("company_id", "c1")
            .with("title", "Launch")]));
        let found = driver(pool.clone())
            .find_by(&Entity::new().with("companyId", "c1"))
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].company_id, "c1");
        assert_eq!(
            pool.statements(),
            vec!["SELECT * FROM schema.page WHERE company_id = 'c1' ORDER BY id;"]
        );
    }

    #[test]
    fn test_find_by_rejects_unknown_field() {
        let pool = MockPool::new();
        let err = driver(pool.clone())
            .find_by(&Entity::new().with("author", "x"))
            .unwrap_err();
        assert!(matches!(err, DriverError::Validation(_)));
        assert_eq!(pool.acquired(), 0);
    }

    #[test]
    fn test_count_all() {
        let pool = MockPool::new();
        pool.push_response(MockResponse::Rows(vec![Entity::new().with("count", 42i64)]));
        pool.push_response(MockResponse::Rows(vec![]));
        let driver = driver(pool.clone());
        assert_eq!(driver.count_all().unwrap(), 42);
        assert_eq!(driver.count_all().unwrap(), 0);
    }

    #[test]
    fn test_upsert_inserts_when_missing() {
        let pool = MockPool::new();
        pool.push_response(MockResponse::Rows(vec![]));
        driver(pool.clone()).upsert_with(&page("p9")).unwrap();
        let statements = pool.statements();
        assert_eq!(statements.len(), 2);
        assert_eq!(statements[0], "SELECT * FROM schema.page WHERE id = 'p9' ORDER BY id;");
        assert!(statements[1].starts_with("INSERT INTO schema.page"));
        assert_eq!(pool.acquired(), 1);
        assert_eq!(pool.released(), 1);
    }

    #[test]
    fn test_upsert_updates_when_present() {
        let pool = MockPool::new();
        pool.push_response(MockResponse::Rows(vec![Entity::new().with("id", "p9")]));
        driver(pool.clone()).upsert_with(&page("p9")).unwrap();
        assert_eq!(
            pool.statements()[1],
            "UPDATE schema.page SET company_id = 'c1', title = 'Launch' WHERE id = 'p9';"
        );
    }

    struct Slug {
        slug: String,
    }

    impl Record for Slug {
        const FIELDS: &'static [&'static str] = &["slug"];

        fn to_entity(&self) -> Entity {
            Entity::new().with("slug", self.slug.as_str())
        }

        fn from_entity(entity: Entity) -> Result<Self> {
            Ok(Slug {
                slug: crate::entity::text_field(&entity, "slug")?,
            })
        }
    }

    #[test]
    fn test_upsert_key_only_record_already_present() {
        let pool = MockPool::new();
        pool.push_response(MockResponse::Rows(vec![Entity::new().with("slug", "launch")]));
        let slugs: TableDriver<Slug, _> =
            TableDriver::new(DriverConfig::new("slug", "slug", "slug"), pool.clone()).unwrap();
        let affected = slugs
            .upsert_with(&Slug {
                slug: "launch".to_string(),
            })
            .unwrap();
        assert_eq!(affected, 0);
        assert_eq!(
            pool.statements(),
            vec!["SELECT * FROM schema.slug WHERE slug = 'launch' ORDER BY slug;"]
        );
        assert_eq!(pool.released(), 1);
    }

    #[test]
    fn test_find_by_null_filter() {
        let pool = MockPool::new();
        pool.push_response(MockResponse::Rows(vec![]));
        driver(pool.clone())
            .find_by(&Entity::new().with("title", None::<String>))
            .unwrap();
        assert_eq!(
            pool.statements(),
            vec!["SELECT * FROM schema.page WHERE title IS NULL ORDER BY id;"]
        );
    }
}
