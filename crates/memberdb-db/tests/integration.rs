use memberdb_db::{
    create_pool, ensure_schema, ConnectionProvider, DbRuntimeSettings, DirectProvider,
    PooledProvider,
};

fn member_count<P: ConnectionProvider>(provider: &P) -> i64 {
    let conn = provider.get_connection().expect("failed to get connection");
    conn.query_row("SELECT COUNT(*) FROM member", [], |row| row.get(0))
        .expect("failed to count members")
}

#[test]
fn db_initialization_works() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = dir.path().join("init.db");
    let path = path.to_str().expect("temp path should be utf-8");

    let pool = create_pool(path, DbRuntimeSettings::default()).expect("failed to create pool");
    let conn = pool.get().expect("failed to get connection");
    ensure_schema(&conn).expect("failed to create schema");

    let mut stmt = conn
        .prepare("SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' ORDER BY name")
        .expect("failed to prepare table query");
    let tables: Vec<String> = stmt
        .query_map([], |row| row.get(0))
        .expect("failed to execute table query")
        .map(|r| r.expect("failed to read table name"))
        .collect();

    assert_eq!(tables, vec!["member"]);
}

#[test]
fn direct_and_pooled_providers_see_the_same_rows() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = dir.path().join("shared.db");
    let path = path.to_str().expect("temp path should be utf-8");

    let direct = DirectProvider::new(path, DbRuntimeSettings::default());
    {
        let conn = direct.get_connection().expect("failed to get direct connection");
        ensure_schema(&conn).expect("failed to create schema");
        conn.execute(
            "insert into member(member_id, money) values (?1, ?2)",
            rusqlite::params!["shared", 1],
        )
        .expect("failed to insert through direct connection");
    }

    let pooled = PooledProvider::new(
        create_pool(path, DbRuntimeSettings::default()).expect("failed to create pool"),
    );

    assert_eq!(member_count(&direct), 1);
    assert_eq!(member_count(&pooled), 1);
}
