//! Per-test databases cloned from a migrated template.
//!
//! The template name embeds a hash of `migrations/`, so a schema change
//! provisions a fresh template instead of cloning a stale one. Each test gets
//! its own database and drops it with the [`TestDatabase`].

use std::future::Future;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use std::time::Duration;

use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use fournil::outbound::persistence::{DbPool, PoolConfig};
use pg_embedded_setup_unpriv::test_support::hash_directory;
use pg_embedded_setup_unpriv::{ClusterHandle, TemporaryDatabase};
use postgres::types::ToSql;
use postgres::{Client, NoTls};
use tokio::runtime::Runtime;
use uuid::Uuid;

use super::{format_postgres_error, shared_cluster};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

static TEMPLATE_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

const TEMPLATE_NAME_PREFIX: &str = "fournil_template";
const PROVISION_RETRIES: usize = 5;
const PROVISION_RETRY_DELAY: Duration = Duration::from_millis(500);

fn template_database_name() -> Result<String, String> {
    let migrations = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("migrations");
    let hash = hash_directory(migrations).map_err(|err| format!("hash migrations: {err}"))?;
    let short_hash = hash.get(..8).unwrap_or(&hash);
    Ok(format!("{TEMPLATE_NAME_PREFIX}_{short_hash}"))
}

fn migrate_schema(url: &str) -> Result<(), String> {
    let mut conn = PgConnection::establish(url).map_err(|err| format!("connect: {err}"))?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|err| format!("migration: {err}"))?;
    Ok(())
}

/// Create the template on first use; later callers reuse it.
fn ensure_template_database(cluster: &ClusterHandle) -> Result<String, String> {
    let template_name = template_database_name()?;
    let _lock = TEMPLATE_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|err| err.into_inner());

    let exists = cluster
        .database_exists(template_name.as_str())
        .map_err(|err| format!("template check: {err:?}"))?;
    if !exists {
        cluster
            .create_database(template_name.as_str())
            .map_err(|err| format!("create template: {err:?}"))?;
        migrate_schema(&cluster.connection().database_url(&template_name))?;
    }
    Ok(template_name)
}

/// Clone a fresh database from the template, retrying transient failures.
pub fn provision_template_database(cluster: &ClusterHandle) -> Result<TemporaryDatabase, String> {
    let mut last_error = String::from("exhausted retries");
    for attempt in 1..=PROVISION_RETRIES {
        let provisioned = ensure_template_database(cluster).and_then(|template| {
            let name = format!("test_{}", Uuid::new_v4());
            cluster
                .temporary_database_from_template(name.as_str(), template.as_str())
                .map_err(|err| format!("clone template: {err:?}"))
        });
        match provisioned {
            Ok(database) => return Ok(database),
            Err(error) => last_error = format!("attempt {attempt}/{PROVISION_RETRIES}: {error}"),
        }
        if attempt < PROVISION_RETRIES {
            std::thread::sleep(PROVISION_RETRY_DELAY);
        }
    }
    Err(last_error)
}

/// A migrated database of its own, a pool onto it, and the runtime that
/// drives the async adapters from synchronous tests.
pub struct TestDatabase {
    pub runtime: Runtime,
    pub pool: DbPool,
    pub url: String,
    _database: TemporaryDatabase,
}

impl TestDatabase {
    pub fn open() -> Result<Self, String> {
        let runtime = Runtime::new().map_err(|err| err.to_string())?;
        let cluster = shared_cluster()?;
        let database = provision_template_database(cluster)?;
        let url = database.url().to_owned();
        let config = PoolConfig::new(url.as_str()).with_max_size(2);
        let pool = runtime
            .block_on(DbPool::new(config))
            .map_err(|err| err.to_string())?;
        Ok(Self {
            runtime,
            pool,
            url,
            _database: database,
        })
    }

    pub fn block_on<F: Future>(&self, work: F) -> F::Output {
        self.runtime.block_on(work)
    }

    /// Run a `count(*)` query with the plain client, bypassing the adapters.
    pub fn count(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> i64 {
        let mut client = Client::connect(&self.url, NoTls)
            .unwrap_or_else(|err| panic!("connect: {}", format_postgres_error(&err)));
        client
            .query_one(sql, params)
            .map(|row| row.get::<_, i64>(0))
            .unwrap_or_else(|err| panic!("{sql}: {}", format_postgres_error(&err)))
    }
}
