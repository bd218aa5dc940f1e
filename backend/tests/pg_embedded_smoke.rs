//! Opt-in check that the embedded PostgreSQL binaries start on this host.
//! Run with `RUN_PG_EMBEDDED=1 cargo test --test pg_embedded_smoke -- --ignored`.

use pg_embedded_setup_unpriv::TestCluster;

#[test]
#[ignore = "downloads and starts PostgreSQL; opt in with RUN_PG_EMBEDDED=1"]
fn embedded_cluster_starts() {
    if std::env::var("RUN_PG_EMBEDDED").as_deref() != Ok("1") {
        eprintln!("SKIP-TEST-CLUSTER: set RUN_PG_EMBEDDED=1 to run");
        return;
    }

    let cluster = TestCluster::new().expect("embedded PostgreSQL should start");
    let connection = cluster.connection();
    assert!(connection.port() > 0);
    assert!(connection.database_url("fournil").starts_with("postgresql://"));
}
