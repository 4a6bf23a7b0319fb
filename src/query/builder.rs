//! Statement builders.
//!
//! SELECT predicates are written `col = val`; DELETE predicates are written
//! `col=val`. Callers compare generated text byte for byte, so the two styles
//! stay distinct. A null in a WHERE predicate is written `col IS NULL`.

use crate::driver::DriverConfig;
use crate::entity::Entity;
use crate::error::{DriverError, Result};
use crate::query::options::FindAllOptions;

impl DriverConfig {
    /// `INSERT INTO <tablename> (k1, k2) VALUES(v1, v2);`
    ///
    /// # Errors
    ///
    /// [`DriverError::Validation`] for an empty entity,
    /// [`DriverError::Serialization`] for values that cannot be rendered.
    pub fn create_insert_query(&self, entity: &Entity) -> Result<String> {
        if entity.is_empty() {
            return Err(DriverError::Validation(format!(
                "cannot insert an empty entity into {}",
                self.tablename()
            )));
        }
        let columns = entity.keys().collect::<Vec<_>>().join(", ");
        let values = entity
            .iter()
            .map(|(_, v)| v.to_sql_literal())
            .collect::<Result<Vec<_>>>()?
            .join(", ");
        Ok(format!(
            "INSERT INTO {} ({columns}) VALUES({values});",
            self.tablename()
        ))
    }

    /// `SELECT * FROM <tablename> WHERE k1 = v1 AND k2 = v2 ORDER BY <order>;`
    ///
    /// An empty filter drops the WHERE clause and selects every row.
    pub fn create_select_query(&self, filter: &Entity) -> Result<String> {
        let mut sql = format!("SELECT * FROM {}", self.tablename());
        if !filter.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions(filter, " = ")?.join(" AND "));
        }
        sql.push_str(&format!(" ORDER BY {};", self.order_column()));
        Ok(sql)
    }

    /// `SELECT <cols> FROM <tablename> ORDER BY <order> LIMIT <n|ALL> OFFSET <m>;`
    ///
    /// # Errors
    ///
    /// [`DriverError::Validation`] when `keys` is given but empty.
    pub fn create_find_all_query(&self, opts: &FindAllOptions) -> Result<String> {
        let columns = match &opts.keys {
            None => "*".to_string(),
            Some(keys) if keys.is_empty() => {
                return Err(DriverError::Validation(
                    "find-all projection needs at least one column".to_string(),
                ));
            }
            Some(keys) => keys.join(", "),
        };
        Ok(format!(
            "SELECT {columns} FROM {} ORDER BY {} LIMIT {} OFFSET {};",
            self.tablename(),
            self.order_column(),
            opts.limit_clause(),
            opts.offset
        ))
    }

    /// `SELECT count(*) FROM <tablename>;`
    pub fn create_count_query(&self) -> String {
        format!("SELECT count(*) FROM {};", self.tablename())
    }

    /// `UPDATE <tablename> SET k1 = v1, k2 = v2 WHERE <pkey> = <pk value>;`
    ///
    /// The primary-key field is taken out of the entity and only used in the
    /// WHERE clause.
    ///
    /// # Errors
    ///
    /// [`DriverError::Validation`] when the primary key is absent or null, or
    /// when no other field is left to set.
    pub fn create_update_query(&self, mut entity: Entity) -> Result<String> {
        let p_column = self.p_column();
        let pk = match entity.remove(&p_column) {
            Some(v) if !v.is_null() => v,
            _ => {
                return Err(DriverError::Validation(format!(
                    "update on {} requires a value for primary key `{p_column}`",
                    self.tablename()
                )));
            }
        };
        if entity.is_empty() {
            return Err(DriverError::Validation(format!(
                "update on {} has no fields to set besides `{p_column}`",
                self.tablename()
            )));
        }
        Ok(format!(
            "UPDATE {} SET {} WHERE {p_column} = {};",
            self.tablename(),
            assignments(&entity)?.join(", "),
            pk.to_sql_literal()?
        ))
    }

    /// `DELETE FROM <tablename> WHERE k1=v1 AND k2=v2;`
    ///
    /// # Errors
    ///
    /// [`DriverError::Validation`] for an empty filter; a predicate-less
    /// DELETE is never emitted.
    pub fn create_delete_query(&self, filter: &Entity) -> Result<String> {
        if filter.is_empty() {
            return Err(DriverError::Validation(format!(
                "refusing to delete from {} without a filter",
                self.tablename()
            )));
        }
        Ok(format!(
            "DELETE FROM {} WHERE {};",
            self.tablename(),
            conditions(filter, "=")?.join(" AND ")
        ))
    }
}

fn assignments(entity: &Entity) -> Result<Vec<String>> {
    entity
        .iter()
        .map(|(k, v)| v.to_sql_literal().map(|literal| format!("{k} = {literal}")))
        .collect()
}

// `col = NULL` never matches, so null filters become `col IS NULL`.
fn conditions(filter: &Entity, eq: &str) -> Result<Vec<String>> {
    filter
        .iter()
        .map(|(k, v)| {
            if v.is_null() {
                Ok(format!("{k} IS NULL"))
            } else {
                v.to_sql_literal().map(|literal| format!("{k}{eq}{literal}"))
            }
        })
        .collect()
}
