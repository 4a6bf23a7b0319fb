//! Decoding `may_postgres` rows into entities.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use may_postgres::types::{FromSql, Type};
use may_postgres::Row;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::entity::Entity;
use crate::error::{DriverError, Result};
use crate::value::Value;

/// Convert a row into an entity keyed by column name, in column order.
/// SQL NULL becomes [`Value::Null`].
///
/// # Errors
///
/// [`DriverError::Serialization`] for a column type with no [`Value`]
/// counterpart, [`DriverError::Execution`] if the driver fails to read a column.
pub fn row_to_entity(row: &Row) -> Result<Entity> {
    let mut entity = Entity::new();
    for (idx, column) in row.columns().iter().enumerate() {
        let value = decode_column(row, idx, column.type_()).map_err(|e| match e {
            DriverError::Serialization(msg) => {
                DriverError::Serialization(format!("column `{}`: {msg}", column.name()))
            }
            other => other,
        })?;
        entity.insert(column.name(), value);
    }
    Ok(entity)
}

fn decode_column(row: &Row, idx: usize, ty: &Type) -> Result<Value> {
    let value = match *ty {
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME => {
            get::<String>(row, idx)?.map(Value::Text)
        }
        Type::INT2 => get::<i16>(row, idx)?.map(|v| Value::Int(i64::from(v))),
        Type::INT4 => get::<i32>(row, idx)?.map(|v| Value::Int(i64::from(v))),
        Type::INT8 => get::<i64>(row, idx)?.map(Value::Int),
        Type::FLOAT4 => get::<f32>(row, idx)?.map(|v| Value::Float(f64::from(v))),
        Type::FLOAT8 => get::<f64>(row, idx)?.map(Value::Float),
        Type::NUMERIC => match get::<Decimal>(row, idx)? {
            Some(d) => Some(Value::Float(d.to_f64().ok_or_else(|| {
                DriverError::Serialization(format!("numeric {d} does not fit in f64"))
            })?)),
            None => None,
        },
        Type::BOOL => get::<bool>(row, idx)?.map(Value::Bool),
        Type::TIMESTAMP => get::<NaiveDateTime>(row, idx)?.map(Value::Timestamp),
        Type::TIMESTAMPTZ => get::<DateTime<Utc>>(row, idx)?
            .map(|ts| Value::Timestamp(ts.with_timezone(&Local).naive_local())),
        Type::DATE => get::<NaiveDate>(row, idx)?
            .map(|d| Value::Timestamp(d.and_time(NaiveTime::MIN))),
        Type::UUID => get::<uuid::Uuid>(row, idx)?.map(|u| Value::Text(u.to_string())),
        Type::JSON | Type::JSONB => {
            get::<serde_json::Value>(row, idx)?.map(|j| Value::Text(j.to_string()))
        }
        _ => {
            return Err(DriverError::Serialization(format!(
                "unsupported column type `{ty}`"
            )));
        }
    };
    Ok(value.unwrap_or(Value::Null))
}

fn get<'a, T: FromSql<'a>>(row: &'a Row, idx: usize) -> Result<Option<T>> {
    row.try_get::<usize, Option<T>>(idx)
        .map_err(DriverError::Execution)
}
