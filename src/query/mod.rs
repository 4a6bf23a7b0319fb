//! SQL text builders for table drivers.
//!
//! All builders live on [`DriverConfig`](crate::DriverConfig) and take
//! entities whose keys are already column names (storage convention). Values
//! are rendered inline through [`Value::to_sql_literal`](crate::Value::to_sql_literal).
//!
//! | Builder | Output |
//! |---|---|
//! | `create_insert_query` | `INSERT INTO s.t (a, b) VALUES('x', 1);` |
//! | `create_select_query` | `SELECT * FROM s.t WHERE a = 'x' AND b = 1 ORDER BY k;` |
//! | `create_find_all_query` | `SELECT * FROM s.t ORDER BY k LIMIT ALL OFFSET 0;` |
//! | `create_count_query` | `SELECT count(*) FROM s.t;` |
//! | `create_update_query` | `UPDATE s.t SET a = 'x' WHERE k = 'id';` |
//! | `create_delete_query` | `DELETE FROM s.t WHERE a='x' AND b=1;` |

pub mod builder;
pub mod options;

#[doc(inline)]
pub use options::FindAllOptions;
