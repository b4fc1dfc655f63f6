use csv_loader::describe::table_columns;
use csv_loader::error::{IngestError, LoadError, SchemaError, Stage};
use csv_loader::ingest::{Dataset, ingest, ingest_with};
use csv_loader::load::{fill_absent, insert_statement, load_rows};
use csv_loader::schema::{create_table_statement, drop_table_statement, recreate_table};
use rusqlite::Connection;
use std::time::Duration;

mod common;
use common::{TestWorkspace, all_rows, strings};

fn column_names(conn: &Connection, table: &str) -> Vec<String> {
    table_columns(conn, table)
        .expect("table columns")
        .into_iter()
        .map(|c| c.name)
        .collect()
}

#[test]
fn ragged_scenario_loads_two_rows_with_sanitized_columns() {
    let mut conn = Connection::open_in_memory().expect("in-memory db");
    let dataset = Dataset::new("items", "Column (Name),Val\na,b\nc,d,extra\n");

    let summary = ingest_with(&mut conn, &dataset).expect("ingest");

    assert_eq!(summary.table, "items");
    assert_eq!(summary.columns, strings(&["Column_Name", "Val"]));
    assert_eq!(summary.rows_inserted, 2);
    assert_eq!(summary.truncated_rows, 1);
    assert_eq!(column_names(&conn, "items"), strings(&["Column_Name", "Val"]));
    assert_eq!(
        all_rows(&conn, "items"),
        vec![strings(&["a", "b"]), strings(&["c", "d"])]
    );
}

#[test]
fn every_column_is_declared_text() {
    let mut conn = Connection::open_in_memory().expect("in-memory db");
    ingest_with(&mut conn, &Dataset::new("typed", "n,when\n1,2024-01-01\n")).expect("ingest");
    let columns = table_columns(&conn, "typed").expect("columns");
    assert!(columns.iter().all(|c| c.declared_type == "TEXT"));
    assert_eq!(all_rows(&conn, "typed"), vec![strings(&["1", "2024-01-01"])]);
}

#[test]
fn header_only_input_creates_empty_table() {
    let mut conn = Connection::open_in_memory().expect("in-memory db");
    let summary = ingest_with(&mut conn, &Dataset::new("empty", "A B,(C)\n")).expect("ingest");

    assert_eq!(summary.rows_inserted, 0);
    assert_eq!(column_names(&conn, "empty"), strings(&["A_B", "C"]));
    assert!(all_rows(&conn, "empty").is_empty());
}

#[test]
fn reingesting_replaces_table_shape_and_rows() {
    let mut conn = Connection::open_in_memory().expect("in-memory db");
    ingest_with(&mut conn, &Dataset::new("t", "a,b,c\n1,2,3\n4,5,6\n7,8,9\n")).expect("first");
    let summary = ingest_with(&mut conn, &Dataset::new("t", "x\nonly\n")).expect("second");

    assert_eq!(summary.rows_inserted, 1);
    assert_eq!(column_names(&conn, "t"), strings(&["x"]));
    assert_eq!(all_rows(&conn, "t"), vec![strings(&["only"])]);
}

#[test]
fn round_trip_preserves_values_in_order() {
    let mut conn = Connection::open_in_memory().expect("in-memory db");
    let input = "id,note,amount\n3,\"comma, inside\",1.50\n1,\"quote \"\"q\"\"\",\n2,,x\n";
    ingest_with(&mut conn, &Dataset::new("notes", input)).expect("ingest");
    assert_eq!(
        all_rows(&conn, "notes"),
        vec![
            strings(&["3", "comma, inside", "1.50"]),
            strings(&["1", "quote \"q\"", ""]),
            strings(&["2", "", "x"]),
        ]
    );
}

#[test]
fn short_rows_are_filled_with_empty_text_on_load() {
    let mut conn = Connection::open_in_memory().expect("in-memory db");
    let summary =
        ingest_with(&mut conn, &Dataset::new("short", "a,b,c\n1,2,3\n4\n")).expect("ingest");

    assert_eq!(summary.rows_inserted, 2);
    assert_eq!(summary.padded_rows, 1);
    assert_eq!(
        all_rows(&conn, "short"),
        vec![strings(&["1", "2", "3"]), strings(&["4", "", ""])]
    );
    let nulls: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM \"short\" WHERE b IS NULL OR c IS NULL",
            [],
            |row| row.get(0),
        )
        .expect("count nulls");
    assert_eq!(nulls, 0);
}

#[test]
fn table_name_is_sanitized() {
    let mut conn = Connection::open_in_memory().expect("in-memory db");
    let summary =
        ingest_with(&mut conn, &Dataset::new("sales report (2024)", "id\n1\n")).expect("ingest");
    assert_eq!(summary.table, "sales_report_2024");
    assert_eq!(all_rows(&conn, "sales_report_2024"), vec![strings(&["1"])]);
}

#[test]
fn awkward_identifiers_are_quoted() {
    let mut conn = Connection::open_in_memory().expect("in-memory db");
    let summary = ingest_with(
        &mut conn,
        &Dataset::new("select", "from,\"we\"\"ird\",1st\nx,y,z\n"),
    )
    .expect("ingest");
    assert_eq!(summary.columns, strings(&["from", "we\"ird", "1st"]));
    assert_eq!(all_rows(&conn, "select"), vec![strings(&["x", "y", "z"])]);
}

#[test]
fn sanitized_collision_fails_at_schema_stage_and_keeps_previous_table() {
    let mut conn = Connection::open_in_memory().expect("in-memory db");
    ingest_with(&mut conn, &Dataset::new("dup", "keep\nme\n")).expect("seed");

    let err = ingest_with(&mut conn, &Dataset::new("dup", "A (1),A 1\nx,y\n"))
        .expect_err("collision");

    assert_eq!(err.stage(), Stage::Schema);
    assert_eq!(err.table(), "dup");
    assert!(matches!(
        err,
        IngestError::Schema {
            source: SchemaError::DuplicateColumn { .. },
            ..
        }
    ));
    assert_eq!(all_rows(&conn, "dup"), vec![strings(&["me"])]);
}

#[test]
fn empty_input_fails_at_decode_stage() {
    let mut conn = Connection::open_in_memory().expect("in-memory db");
    let err = ingest_with(&mut conn, &Dataset::new("nothing", "")).expect_err("empty");
    assert_eq!(err.stage(), Stage::Decode);
    assert!(err.to_string().contains("decode stage"));
}

#[test]
fn blank_table_name_fails_at_schema_stage() {
    let mut conn = Connection::open_in_memory().expect("in-memory db");
    let err = ingest_with(&mut conn, &Dataset::new(" () ", "a\n1\n")).expect_err("no name");
    assert!(matches!(
        err,
        IngestError::Schema {
            source: SchemaError::EmptyTableName { .. },
            ..
        }
    ));
}

#[test]
fn ingest_opens_configured_database() {
    let workspace = TestWorkspace::new();
    let config = workspace.config();

    ingest(&config, &Dataset::new("people", "name\nAda\nGrace\n")).expect("first");
    let summary = ingest(&config, &Dataset::new("people", "name\nLinus\n")).expect("second");
    assert_eq!(summary.rows_inserted, 1);

    let conn = workspace.connect();
    assert_eq!(all_rows(&conn, "people"), vec![strings(&["Linus"])]);
}

#[test]
fn unreachable_database_fails_at_connect_stage() {
    let workspace = TestWorkspace::new();
    let config =
        csv_loader::config::LoaderConfig::new(workspace.path().join("missing").join("x.db"));
    let err = ingest(&config, &Dataset::new("t", "a\n1\n")).expect_err("no directory");
    assert_eq!(err.stage(), Stage::Connect);
}

#[test]
fn overlong_row_aborts_load_and_rolls_back() {
    let mut conn = Connection::open_in_memory().expect("in-memory db");
    let headers = strings(&["a", "b"]);
    recreate_table(&mut conn, "t", &headers).expect("create");

    let rows = vec![strings(&["1", "2"]), strings(&["3", "4", "5"])];
    let err = load_rows(&mut conn, "t", &headers, rows).expect_err("mismatch");

    assert!(matches!(
        err,
        LoadError::ColumnCountMismatch {
            row: 2,
            expected: 2,
            found: 3,
            ..
        }
    ));
    assert!(all_rows(&conn, "t").is_empty());
}

#[test]
fn load_into_missing_table_reports_write_failure() {
    let mut conn = Connection::open_in_memory().expect("in-memory db");
    let err = load_rows(&mut conn, "ghost", &strings(&["a"]), vec![strings(&["1"])])
        .expect_err("missing table");
    assert!(matches!(err, LoadError::Prepare { .. }));
}

#[test]
fn statements_quote_every_identifier() {
    let columns = strings(&["Column_Name", "Val"]);
    assert_eq!(drop_table_statement("items"), "DROP TABLE IF EXISTS \"items\"");
    assert_eq!(
        create_table_statement("items", &columns),
        "CREATE TABLE \"items\" (\"Column_Name\" TEXT, \"Val\" TEXT)"
    );
    assert_eq!(
        insert_statement("items", &columns),
        "INSERT INTO \"items\" (\"Column_Name\", \"Val\") VALUES (?1, ?2)"
    );
}

#[test]
fn fill_absent_pads_but_rejects_overflow() {
    assert_eq!(fill_absent(strings(&["a"]), 3), Some(strings(&["a", "", ""])));
    assert_eq!(fill_absent(strings(&["a", "b"]), 2), Some(strings(&["a", "b"])));
    assert_eq!(fill_absent(strings(&["a", "b", "c"]), 2), None);
}

#[test]
fn blank_lines_load_as_rows_of_empty_text() {
    let mut conn = Connection::open_in_memory().expect("in-memory db");
    let summary =
        ingest_with(&mut conn, &Dataset::new("b", "a,b\n1,2\n\n3,4\n")).expect("ingest");

    assert_eq!(summary.rows_inserted, 3);
    assert_eq!(summary.padded_rows, 1);
    assert_eq!(
        all_rows(&conn, "b"),
        vec![strings(&["1", "2"]), strings(&["", ""]), strings(&["3", "4"])]
    );
}

#[test]
fn headers_differing_only_in_case_collide() {
    let mut conn = Connection::open_in_memory().expect("in-memory db");
    let err =
        ingest_with(&mut conn, &Dataset::new("cased", "Id,id\n1,2\n")).expect_err("collision");
    match err {
        IngestError::Schema {
            source: SchemaError::DuplicateColumn { first, second, .. },
            ..
        } => {
            assert_eq!(first, "Id");
            assert_eq!(second, "id");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn commit_failure_is_not_blamed_on_a_row() {
    let workspace = TestWorkspace::new();
    let headers = strings(&["a"]);
    let mut writer = workspace.connect();
    writer.busy_timeout(Duration::ZERO).expect("busy timeout");
    recreate_table(&mut writer, "locked", &headers).expect("create");

    // An open read transaction keeps a shared lock that blocks the commit.
    let reader = workspace.connect();
    reader.execute_batch("BEGIN").expect("begin read");
    let count: i64 = reader
        .query_row("SELECT COUNT(*) FROM \"locked\"", [], |row| row.get(0))
        .expect("read");
    assert_eq!(count, 0);

    let err = load_rows(&mut writer, "locked", &headers, vec![strings(&["1"])])
        .expect_err("commit blocked");
    assert!(matches!(err, LoadError::Commit { .. }));
    assert!(err.to_string().starts_with("Committing rows into 'locked'"));

    reader.execute_batch("COMMIT").expect("end read");
    assert!(all_rows(&writer, "locked").is_empty());
}
