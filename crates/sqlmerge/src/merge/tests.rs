//! Rendering tests for the MERGE builder.

use crate::condition::Eq;
use crate::error::MergeError;
use crate::fragment::expr;
use crate::merge::merge;
use crate::param::Param;
use crate::placeholder::PlaceholderFormat;
use crate::select::select;
use crate::value::Value;

fn debug_args(args: &[Param]) -> String {
    format!("{args:?}")
}

#[test]
fn test_merge_to_sql() {
    let b = merge("a")
        .prefix("WITH prefix AS ?", [Value::bind(0i32)])
        .row([1i32, 2])
        .values_alias("vals")
        .columns(["b", "c"])
        .on("a.b = vals.b AND a.c = vals.c")
        .when("MATCHED THEN UPDATE SET b = vals.b, c = vals.c")
        .when("NOT MATCHED THEN INSERT (b, c) VALUES (vals.b, vals.c)")
        .suffix("RETURNING a.b", []);

    let (sql, args) = b.to_sql().unwrap();

    assert_eq!(
        sql,
        "WITH prefix AS ? MERGE INTO a USING (VALUES (?,?)) AS vals (b,c) ON a.b = vals.b AND a.c = vals.c \
         WHEN MATCHED THEN UPDATE SET b = vals.b, c = vals.c \
         WHEN NOT MATCHED THEN INSERT (b, c) VALUES (vals.b, vals.c) RETURNING a.b"
    );
    assert_eq!(debug_args(&args), "[0, 1, 2]");
}

#[test]
fn test_merge_dollar_numbers_whole_statement() {
    let (sql, args) = merge("a")
        .prefix("WITH prefix AS ?", [Value::bind(0i32)])
        .row([1i32, 2])
        .suffix("RETURNING ?", [Value::bind(3i32)])
        .placeholder_format(PlaceholderFormat::Dollar)
        .to_sql()
        .unwrap();
    assert_eq!(
        sql,
        "WITH prefix AS $1 MERGE INTO a USING (VALUES ($2,$3)) RETURNING $4"
    );
    assert_eq!(debug_args(&args), "[0, 1, 2, 3]");
}

#[test]
fn test_merge_errors() {
    let err = merge("").row([1i32]).to_sql().unwrap_err();
    assert!(matches!(err, MergeError::NoTable));

    let err = merge("x").to_sql().unwrap_err();
    assert!(matches!(err, MergeError::NoValues));

    // Table is checked before values.
    let err = merge("").to_sql().unwrap_err();
    assert!(matches!(err, MergeError::NoTable));
}

#[test]
#[should_panic(expected = "statement must specify a table")]
fn test_merge_must_sql_panics() {
    merge("").must_sql();
}

#[test]
fn test_merge_must_sql_ok() {
    let (sql, args) = merge("t").row([1i32]).must_sql();
    assert_eq!(sql, "MERGE INTO t USING (VALUES (?))");
    assert_eq!(args.len(), 1);
}

#[test]
fn test_merge_placeholders() {
    let b = merge("test").row([1i32, 2]);

    let (sql, args_q) = b
        .placeholder_format(PlaceholderFormat::Question)
        .to_sql()
        .unwrap();
    assert_eq!(sql, "MERGE INTO test USING (VALUES (?,?))");

    let (sql, args_d) = b
        .placeholder_format(PlaceholderFormat::Dollar)
        .to_sql()
        .unwrap();
    assert_eq!(sql, "MERGE INTO test USING (VALUES ($1,$2))");

    assert_eq!(debug_args(&args_q), debug_args(&args_d));
}

#[test]
fn test_merge_clause_omission() {
    let (sql, _) = merge("t").row([1i32, 2]).to_sql().unwrap();
    assert_eq!(sql, "MERGE INTO t USING (VALUES (?,?))");
}

#[test]
fn test_merge_empty_alias_and_on_are_skipped() {
    let (sql, _) = merge("t")
        .row([1i32])
        .values_alias("")
        .on("")
        .to_sql()
        .unwrap();
    assert_eq!(sql, "MERGE INTO t USING (VALUES (?))");
}

#[test]
fn test_merge_set_map() {
    let b = merge("table").set_map(
        Eq::new()
            .and("field2", 2i32)
            .and("field1", 1i32)
            .and("field3", 3i32),
    );

    let (sql, args) = b.to_sql().unwrap();
    assert_eq!(
        sql,
        "MERGE INTO table USING (VALUES (?,?,?))(field1,field2,field3)"
    );
    assert_eq!(debug_args(&args), "[1, 2, 3]");
}

#[test]
fn test_merge_set_map_replaces_rows() {
    let b = merge("t")
        .columns(["old"])
        .row([9i32, 9])
        .set_map(Eq::new().and("a", 1i32).null("b"));
    let (sql, args) = b.to_sql().unwrap();
    assert_eq!(sql, "MERGE INTO t USING (VALUES (?,NULL))(a,b)");
    assert_eq!(debug_args(&args), "[1]");
}

#[test]
fn test_merge_select_source() {
    let sb = select(["field1"])
        .from("table1")
        .where_eq(Eq::new().and("field1", 1i32));
    let b = merge("table2")
        .values_alias("vals")
        .on("table2.field1 = vals.field1")
        .columns(["field1"])
        .select(sb);

    let (sql, args) = b.to_sql().unwrap();
    assert_eq!(
        sql,
        "MERGE INTO table2 USING (SELECT field1 FROM table1 WHERE field1 = ?) AS vals (field1) ON table2.field1 = vals.field1"
    );
    assert_eq!(debug_args(&args), "[1]");
}

#[test]
fn test_merge_select_wins_over_values() {
    let (sql, args) = merge("t")
        .row([1i32, 2])
        .select(select(["x"]).from("s"))
        .to_sql()
        .unwrap();
    assert_eq!(sql, "MERGE INTO t USING (SELECT x FROM s)");
    assert!(args.is_empty());
}

#[test]
fn test_merge_select_error_propagates() {
    let err = merge("t")
        .select(select(Vec::<String>::new()).from("s"))
        .to_sql()
        .unwrap_err();
    assert!(matches!(err, MergeError::Validation(_)));
}

#[test]
fn test_merge_typed_and_nested_values() {
    let (sql, args) = merge("t")
        .values([
            Value::typed("uuid", "00000000-0000-0000-0000-000000000001"),
            Value::expr(expr("COALESCE(?, 0)").bind(5i32)),
            Value::expr(expr("NOW()")).cast("timestamptz"),
            Value::null(),
        ])
        .values([
            Value::bind("x"),
            Value::bind(6i32),
            Value::expr(expr("NOW()")),
            Value::bind(7i64),
        ])
        .placeholder_format(PlaceholderFormat::Dollar)
        .to_sql()
        .unwrap();
    assert_eq!(
        sql,
        "MERGE INTO t USING (VALUES ($1::uuid,COALESCE($2, 0),NOW()::timestamptz,NULL),($3,$4,NOW(),$5))"
    );
    assert_eq!(
        debug_args(&args),
        r#"["00000000-0000-0000-0000-000000000001", 5, "x", 6, 7]"#
    );
}

#[test]
fn test_merge_nested_fragment_error_aborts() {
    let err = merge("t")
        .values([Value::expr(expr("? + ?").bind(1i32))])
        .to_sql()
        .unwrap_err();
    assert!(matches!(err, MergeError::ArgCount { expected: 2, got: 1 }));

    let err = merge("t")
        .row([1i32])
        .suffix("RETURNING ?", [])
        .to_sql()
        .unwrap_err();
    assert!(matches!(err, MergeError::ArgCount { expected: 1, got: 0 }));
}

#[test]
fn test_merge_rows_are_not_width_checked() {
    let (sql, _) = merge("t")
        .row([1i32, 2])
        .row([3i32])
        .columns(["a", "b"])
        .to_sql()
        .unwrap();
    assert_eq!(sql, "MERGE INTO t USING (VALUES (?,?),(?))(a,b)");
}

#[test]
fn test_merge_escaped_marker_in_suffix() {
    let (sql, args) = merge("t")
        .row([1i32])
        .on("t.tags ?? 'x'")
        .suffix("RETURNING t.data ?? ?", [Value::bind("k")])
        .placeholder_format(PlaceholderFormat::Dollar)
        .to_sql()
        .unwrap();
    assert_eq!(
        sql,
        "MERGE INTO t USING (VALUES ($1)) ON t.tags ? 'x' RETURNING t.data ? $2"
    );
    assert_eq!(args.len(), 2);
}

#[test]
fn test_merge_determinism() {
    let b = merge("t")
        .prefix("WITH w AS (SELECT ?)", [Value::bind(1i32)])
        .set_map(Eq::new().and("b", 2i32).and("a", 1i32))
        .placeholder_format(PlaceholderFormat::Dollar);
    let first = b.to_sql().unwrap();
    let second = b.to_sql().unwrap();
    assert_eq!(first.0, second.0);
    assert_eq!(debug_args(&first.1), debug_args(&second.1));
}

#[test]
fn test_merge_branching_snapshots() {
    let base = merge("t").columns(["a"]).values_alias("v");
    let left = base.row([1i32]).on("t.a = v.a");
    let right = base.row([2i32]).when("MATCHED THEN DELETE");

    assert!(matches!(base.to_sql().unwrap_err(), MergeError::NoValues));
    assert_eq!(
        left.to_sql().unwrap().0,
        "MERGE INTO t USING (VALUES (?)) AS v (a) ON t.a = v.a"
    );
    assert_eq!(
        right.to_sql().unwrap().0,
        "MERGE INTO t USING (VALUES (?)) AS v (a) WHEN MATCHED THEN DELETE"
    );
}

#[test]
fn test_merge_into_table_retargets() {
    let (sql, _) = merge("")
        .into_table("accounts")
        .row([1i32])
        .to_sql()
        .unwrap();
    assert_eq!(sql, "MERGE INTO accounts USING (VALUES (?))");
}

#[test]
fn test_merge_as_nested_fragment_numbers_once() {
    let inner = merge("t")
        .row([1i32])
        .placeholder_format(PlaceholderFormat::Dollar);
    let (sql, args) = merge("u")
        .prefix_expr(expr("WITH m AS (?)").arg(Value::fragment(inner)))
        .row([2i32])
        .placeholder_format(PlaceholderFormat::Dollar)
        .to_sql()
        .unwrap();
    assert_eq!(
        sql,
        "WITH m AS (MERGE INTO t USING (VALUES ($1))) MERGE INTO u USING (VALUES ($2))"
    );
    assert_eq!(debug_args(&args), "[1, 2]");
}

#[test]
fn test_merge_debug_hides_runner() {
    let dbg = format!("{:?}", merge("t").row([1i32]));
    assert!(dbg.contains("runner: false"));
    assert!(dbg.contains("into: \"t\""));
}
