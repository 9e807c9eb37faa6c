//! Rendering a MERGE snapshot into SQL text plus arguments.

use super::{MergeBuilder, MergeData};
use crate::error::{MergeError, MergeResult};
use crate::fragment::{Sqlizer, append_to_sql};
use crate::param::Param;

impl MergeData {
    /// Assemble the statement with generic `?` markers.
    pub(super) fn render(&self) -> MergeResult<(String, Vec<Param>)> {
        if self.into.is_empty() {
            return Err(MergeError::NoTable);
        }
        if self.values.is_empty() && self.select.is_none() {
            return Err(MergeError::NoValues);
        }

        let mut sql = String::with_capacity(128);
        let mut args = Vec::new();

        if !self.prefixes.is_empty() {
            append_to_sql(&self.prefixes, &mut sql, " ", &mut args)?;
            sql.push(' ');
        }

        sql.push_str("MERGE INTO ");
        sql.push_str(&self.into);
        sql.push(' ');

        sql.push_str("USING (");
        match &self.select {
            Some(select) => {
                let (select_sql, select_args) = Sqlizer::to_sql(select)?;
                sql.push_str(&select_sql);
                args.extend(select_args);
            }
            None => self.append_values(&mut sql, &mut args)?,
        }
        sql.push(')');

        if let Some(alias) = self.values_alias.as_deref().filter(|a| !a.is_empty()) {
            sql.push_str(" AS ");
            sql.push_str(alias);
            sql.push(' ');
        }

        if !self.columns.is_empty() {
            sql.push('(');
            sql.push_str(&self.columns.join(","));
            sql.push(')');
        }

        if let Some(on) = self.on.as_deref().filter(|on| !on.is_empty()) {
            sql.push_str(" ON ");
            sql.push_str(on);
        }

        if !self.when.is_empty() {
            sql.push_str(" WHEN ");
            sql.push_str(&self.when.join(" WHEN "));
        }

        if !self.suffixes.is_empty() {
            sql.push(' ');
            append_to_sql(&self.suffixes, &mut sql, " ", &mut args)?;
        }

        Ok((sql, args))
    }

    /// `VALUES (..),(..)`; rows and cells keep their insertion order.
    fn append_values(&self, sql: &mut String, args: &mut Vec<Param>) -> MergeResult<()> {
        sql.push_str("VALUES ");
        for (r, row) in self.values.iter().enumerate() {
            if r > 0 {
                sql.push(',');
            }
            sql.push('(');
            for (v, value) in row.iter().enumerate() {
                if v > 0 {
                    sql.push(',');
                }
                value.render(sql, args)?;
            }
            sql.push(')');
        }
        Ok(())
    }
}

impl MergeBuilder {
    /// Build the statement in the configured placeholder dialect.
    ///
    /// On error nothing is returned but the error.
    pub fn to_sql(&self) -> MergeResult<(String, Vec<Param>)> {
        let (sql, args) = self.data.render()?;
        Ok((self.data.placeholder_format.replace_placeholders(&sql), args))
    }

    /// Build the statement, panicking on error.
    ///
    /// # Panics
    /// If [`MergeBuilder::to_sql`] fails.
    pub fn must_sql(&self) -> (String, Vec<Param>) {
        match self.to_sql() {
            Ok(built) => built,
            Err(err) => panic!("{err}"),
        }
    }
}

// Nested use renders generic markers; the outer statement numbers them.
impl Sqlizer for MergeBuilder {
    fn to_sql(&self) -> MergeResult<(String, Vec<Param>)> {
        self.data.render()
    }
}
