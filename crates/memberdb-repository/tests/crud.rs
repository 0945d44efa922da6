use std::sync::Arc;

use memberdb_db::{
    create_pool, ensure_schema, ConnectionProvider, DbRuntimeSettings, DirectProvider,
    PooledProvider,
};
use memberdb_repository::{MemberRepository, RepositoryError};
use memberdb_types::Member;

fn setup_db() -> (tempfile::TempDir, String) {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = dir
        .path()
        .join("crud.db")
        .to_str()
        .expect("temp path should be utf-8")
        .to_string();

    let provider = DirectProvider::new(path.as_str(), DbRuntimeSettings::default());
    let conn = provider.get_connection().expect("failed to open db");
    ensure_schema(&conn).expect("failed to create schema");

    (dir, path)
}

/// The same CRUD walk-through, written once against any provider.
fn crud<P: ConnectionProvider>(repository: &MemberRepository<P>) {
    // save
    let member = Member::new("memberVo", 10_000);
    let saved = repository.save(member.clone()).expect("save failed");
    assert_eq!(saved, member);

    // find_by_id
    let found = repository
        .find_by_id(&member.member_id)
        .expect("find_by_id failed");
    assert_eq!(found, member);

    // update: 10000 -> 20000
    repository
        .update(&member.member_id, 20_000)
        .expect("update failed");
    let updated = repository
        .find_by_id(&member.member_id)
        .expect("find_by_id after update failed");
    assert_eq!(updated.money, 20_000);

    // delete
    repository
        .delete(&member.member_id)
        .expect("delete failed");
    let err = repository
        .find_by_id(&member.member_id)
        .expect_err("member should be gone");
    assert!(matches!(err, RepositoryError::NotFound { .. }));
    assert_eq!(err.to_string(), "member not found: memberId = memberVo");
}

#[test]
fn crud_with_direct_connections() {
    let (_dir, path) = setup_db();
    let repository = MemberRepository::new(DirectProvider::new(path, DbRuntimeSettings::default()));
    crud(&repository);
}

#[test]
fn crud_with_connection_pool() {
    let (_dir, path) = setup_db();
    let pool = create_pool(&path, DbRuntimeSettings::default()).expect("failed to create pool");
    let repository = MemberRepository::new(PooledProvider::new(pool));
    crud(&repository);

    let state = repository.provider().pool().state();
    assert_eq!(
        state.idle_connections, state.connections,
        "all pooled connections should be back in the pool"
    );
}

#[test]
fn concurrent_saves_through_shared_pool() {
    let (_dir, path) = setup_db();
    let settings = DbRuntimeSettings {
        pool_max_size: 4,
        ..DbRuntimeSettings::default()
    };
    let pool = create_pool(&path, settings).expect("failed to create pool");
    let repository = Arc::new(MemberRepository::new(PooledProvider::new(pool)));

    std::thread::scope(|scope| {
        for worker in 0..4 {
            let repository = Arc::clone(&repository);
            scope.spawn(move || {
                for n in 0..10 {
                    let id = format!("w{worker}-m{n}");
                    repository
                        .save(Member::new(id, worker * 100 + n))
                        .expect("concurrent save failed");
                }
            });
        }
    });

    for worker in 0..4 {
        for n in 0..10 {
            let found = repository
                .find_by_id(&format!("w{worker}-m{n}"))
                .expect("saved member should be readable");
            assert_eq!(found.money, worker * 100 + n);
        }
    }
}
