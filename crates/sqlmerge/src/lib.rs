//! # sqlmerge
//!
//! A fluent, immutable builder for parameterized SQL `MERGE` (upsert) statements.
//!
//! ## Features
//!
//! - **Immutable snapshots**: every fluent call returns a new builder; the receiver is never modified
//! - **One rewrite pass**: statements are assembled with `?` markers and converted to the target
//!   dialect (`?`, `$n`, `:n`, `@pn`) once, so numbering is consistent across prefixes, values and suffixes
//! - **Composable fragments**: raw expressions, sorted equality maps, sub-selects and nested
//!   statements all implement [`Sqlizer`]
//! - **Optional execution**: bind a `tokio-postgres` client (or pool connection) with `run_with`,
//!   or pass one to the `*_on` terminals
//!
//! ## Example
//!
//! ```ignore
//! use sqlmerge::{merge, PlaceholderFormat, Value};
//!
//! let (sql, args) = merge("a")
//!     .prefix("WITH prefix AS ?", [Value::bind(0i32)])
//!     .row([1i32, 2])
//!     .values_alias("vals")
//!     .columns(["b", "c"])
//!     .on("a.b = vals.b AND a.c = vals.c")
//!     .when("MATCHED THEN UPDATE SET b = vals.b, c = vals.c")
//!     .when("NOT MATCHED THEN INSERT (b, c) VALUES (vals.b, vals.c)")
//!     .suffix("RETURNING a.b", [])
//!     .placeholder_format(PlaceholderFormat::Dollar)
//!     .to_sql()?;
//!
//! // Executing against a live connection
//! let affected = merge("a").row([1i32, 2]).run_with(client).exec().await?;
//! ```

pub mod condition;
pub mod config;
pub mod error;
pub mod fragment;
mod log;
pub mod merge;
pub mod param;
pub mod placeholder;
pub mod runner;
pub mod select;
pub mod snapshot;
pub mod value;

pub use condition::Eq;
pub use config::RunConfig;
pub use error::{MergeError, MergeResult};
pub use fragment::{Expr, Fragment, Sqlizer, expr};
pub use merge::{MergeBuilder, merge};
pub use param::{Param, params_ref};
pub use placeholder::{PlaceholderFormat, placeholders};
pub use runner::{CancelSupport, QueryRower, RowScanner, Runner};
pub use select::{SelectQb, select};
pub use value::Value;
