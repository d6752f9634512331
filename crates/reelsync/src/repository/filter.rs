//! Translation of storage-agnostic [`Filter`]s into sea-orm conditions.

use sea_orm::sea_query::{Expr, Func, LikeExpr};
use sea_orm::{ColumnTrait, Condition, Value};

use crate::entity::movie::{Column, search_key};
use crate::filter::{Filter, FilterCondition, QueryValue};

use super::errors::{RepositoryError, Result};

/// Escape character for LIKE patterns.
const LIKE_ESCAPE: char = '\\';

/// Build an AND condition over the movie table.
///
/// Field names are query-space names (`voteAverage`) or column names
/// (`vote_average`). Text values aimed at numeric columns are parsed.
///
/// # Errors
/// Returns `RepositoryError::InvalidInput` for unknown fields, values that
/// don't fit the column, or substring matches on numeric columns.
pub fn filter_condition(filter: &Filter) -> Result<Condition> {
    filter
        .conditions
        .iter()
        .try_fold(Condition::all(), |acc, condition| {
            Ok(acc.add(translate(condition)?))
        })
}

fn translate(condition: &FilterCondition) -> Result<Condition> {
    let field = condition.field();
    let column = Column::from_query_field(field)
        .ok_or_else(|| RepositoryError::invalid(format!("unknown filter field '{field}'")))?;

    match condition {
        FilterCondition::Eq { value, .. } => Ok(match value {
            QueryValue::Null => Condition::all().add(column.is_null()),
            value => Condition::all().add(column.eq(column_value(column, field, value)?)),
        }),
        FilterCondition::Contains { text, .. } => {
            if column.is_numeric() {
                return Err(RepositoryError::invalid(format!(
                    "substring match on numeric field '{field}'"
                )));
            }
            let pattern = LikeExpr::new(like_pattern(text)).escape(LIKE_ESCAPE);
            let matched = match column.search_column() {
                Some(folded) => Expr::col(folded).like(pattern),
                None => Expr::expr(Func::lower(Expr::col(column))).like(pattern),
            };
            Ok(Condition::all().add(matched))
        }
        FilterCondition::Range { gte, lte, .. } => {
            let mut range = Condition::all();
            if let Some(gte) = gte {
                range = range.add(column.gte(column_value(column, field, gte)?));
            }
            if let Some(lte) = lte {
                range = range.add(column.lte(column_value(column, field, lte)?));
            }
            Ok(range)
        }
    }
}

/// `%text%`, folded by [`search_key`], with LIKE metacharacters escaped.
fn like_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for ch in search_key(text).chars() {
        if matches!(ch, '%' | '_' | LIKE_ESCAPE) {
            pattern.push(LIKE_ESCAPE);
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

/// Coerce a query value into the column's storage type.
fn column_value(column: Column, field: &str, value: &QueryValue) -> Result<Value> {
    let mismatch =
        || RepositoryError::invalid(format!("value '{value}' does not fit field '{field}'"));

    if column.is_integer() {
        let n = match value {
            QueryValue::Int(n) => *n,
            QueryValue::Float(f) if f.fract() == 0.0 && f.is_finite() => *f as i64,
            QueryValue::Text(s) => s.trim().parse::<i64>().map_err(|_| mismatch())?,
            _ => return Err(mismatch()),
        };
        Ok(Value::from(n))
    } else if column.is_numeric() {
        let f = match value {
            QueryValue::Int(n) => *n as f64,
            QueryValue::Float(f) => *f,
            QueryValue::Text(s) => s.trim().parse::<f64>().map_err(|_| mismatch())?,
            _ => return Err(mismatch()),
        };
        Ok(Value::from(f))
    } else {
        match value {
            QueryValue::Null | QueryValue::Bool(_) => Err(mismatch()),
            other => Ok(Value::from(other.to_string())),
        }
    }
}
