//! Query Builder SQL generation (PostgreSQL placeholders)

use super::builder::Query;
use super::types::*;
use crate::backends::DatabaseValue;

impl Query {
    /// Generate SQL with `$n` placeholders and return the bound parameters
    pub fn to_sql_with_params(&self) -> (String, Vec<DatabaseValue>) {
        match self.query_type {
            QueryType::Select => self.build_select_sql(),
            QueryType::Insert => self.build_insert_sql(),
            QueryType::Update => self.build_update_sql(),
            QueryType::Delete => self.build_delete_sql(),
        }
    }

    /// SQL text only
    pub fn to_sql(&self) -> String {
        self.to_sql_with_params().0
    }

    fn from_clause(&self) -> String {
        if self.alias == self.table {
            self.table.clone()
        } else {
            format!("{} {}", self.table, self.alias)
        }
    }

    /// Build SELECT SQL with parameters
    fn build_select_sql(&self) -> (String, Vec<DatabaseValue>) {
        let mut sql = String::from("SELECT ");
        let mut params = Vec::new();
        let mut param_counter = 1;

        if self.select_fields.is_empty() {
            sql.push('*');
        } else {
            sql.push_str(&self.select_fields.join(", "));
        }

        sql.push_str(" FROM ");
        sql.push_str(&self.from_clause());

        self.build_where_clause(&mut sql, &mut params, &mut param_counter);

        if !self.order_by.is_empty() {
            sql.push_str(" ORDER BY ");
            let order_clauses: Vec<String> = self
                .order_by
                .iter()
                .map(|(column, direction)| format!("{} {}", column, direction))
                .collect();
            sql.push_str(&order_clauses.join(", "));
        }

        if let Some(limit) = self.limit_count {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        (sql, params)
    }

    /// Build INSERT SQL with parameters
    fn build_insert_sql(&self) -> (String, Vec<DatabaseValue>) {
        let mut sql = format!("INSERT INTO {}", self.table);
        let mut params = Vec::new();
        let mut param_counter = 1;

        if self.set_clauses.is_empty() {
            sql.push_str(" DEFAULT VALUES");
            return (sql, params);
        }

        let columns: Vec<&str> = self.set_clauses.iter().map(|c| c.column.as_str()).collect();
        sql.push_str(&format!(" ({}) VALUES (", columns.join(", ")));
        for (i, clause) in self.set_clauses.iter().enumerate() {
            if i > 0 {
                sql.push_str(", ");
            }
            if clause.value.is_null() {
                sql.push_str("NULL");
            } else {
                sql.push_str(&format!("${}", param_counter));
                params.push(clause.value.clone());
                param_counter += 1;
            }
        }
        sql.push(')');

        (sql, params)
    }

    /// Build UPDATE SQL with parameters
    fn build_update_sql(&self) -> (String, Vec<DatabaseValue>) {
        let mut sql = format!("UPDATE {}", self.table);
        let mut params = Vec::new();
        let mut param_counter = 1;

        if !self.set_clauses.is_empty() {
            sql.push_str(" SET ");
            for (i, clause) in self.set_clauses.iter().enumerate() {
                if i > 0 {
                    sql.push_str(", ");
                }
                sql.push_str(&format!("{} = ", clause.column));
                if clause.value.is_null() {
                    sql.push_str("NULL");
                } else {
                    sql.push_str(&format!("${}", param_counter));
                    params.push(clause.value.clone());
                    param_counter += 1;
                }
            }
        }

        self.build_where_clause(&mut sql, &mut params, &mut param_counter);

        (sql, params)
    }

    /// Build DELETE SQL with parameters
    fn build_delete_sql(&self) -> (String, Vec<DatabaseValue>) {
        let mut sql = format!("DELETE FROM {}", self.table);
        let mut params = Vec::new();
        let mut param_counter = 1;

        self.build_where_clause(&mut sql, &mut params, &mut param_counter);

        (sql, params)
    }

    /// Helper method to build WHERE clauses
    fn build_where_clause(
        &self,
        sql: &mut String,
        params: &mut Vec<DatabaseValue>,
        param_counter: &mut i32,
    ) {
        if self.where_conditions.is_empty() {
            return;
        }

        sql.push_str(" WHERE ");
        for (i, condition) in self.where_conditions.iter().enumerate() {
            if i > 0 {
                sql.push_str(" AND ");
            }

            sql.push_str(&condition.column);
            sql.push(' ');
            sql.push_str(&condition.operator.to_string());

            match condition.operator {
                QueryOperator::In | QueryOperator::NotIn => {
                    sql.push_str(" (");
                    for (j, value) in condition.values.iter().enumerate() {
                        if j > 0 {
                            sql.push_str(", ");
                        }
                        sql.push_str(&format!("${}", param_counter));
                        params.push(value.clone());
                        *param_counter += 1;
                    }
                    sql.push(')');
                }
                QueryOperator::IsNull | QueryOperator::IsNotNull => {}
                _ => {
                    if let Some(ref value) = condition.value {
                        sql.push_str(&format!(" ${}", param_counter));
                        params.push(value.clone());
                        *param_counter += 1;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::OrderDirection;

    #[test]
    fn test_select_with_alias_and_filters() {
        let query = Query::aliased("orders", "o")
            .where_eq("o.status", "open")
            .where_null("o.deleted")
            .order_by("o.id", OrderDirection::Desc)
            .limit(10);

        let (sql, params) = query.to_sql_with_params();
        assert_eq!(
            sql,
            "SELECT * FROM orders o WHERE o.status = $1 AND o.deleted IS NULL ORDER BY o.id DESC LIMIT 10"
        );
        assert_eq!(params, vec![DatabaseValue::String("open".to_string())]);
    }

    #[test]
    fn test_update_renders_null_literal() {
        let query = Query::new("orders")
            .update()
            .set_null("deleted")
            .set("status", "open")
            .where_eq("id", 7);

        let (sql, params) = query.to_sql_with_params();
        assert_eq!(sql, "UPDATE orders SET deleted = NULL, status = $1 WHERE id = $2");
        assert_eq!(
            params,
            vec![DatabaseValue::String("open".to_string()), DatabaseValue::Int64(7)]
        );
    }

    #[test]
    fn test_delete_with_in_clause() {
        let query = Query::new("orders").delete().where_in("id", vec![1, 2, 3]);
        let (sql, params) = query.to_sql_with_params();
        assert_eq!(sql, "DELETE FROM orders WHERE id IN ($1, $2, $3)");
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn test_insert() {
        let query = Query::new("orders")
            .insert()
            .set("id", 1)
            .set("status", "open")
            .set_null("deleted");
        assert_eq!(
            query.to_sql(),
            "INSERT INTO orders (id, status, deleted) VALUES ($1, $2, NULL)"
        );
    }
}
