use std::path::Path;

use log::*;
use sqlx::{migrate::MigrateDatabase, Sqlite};

use crate::SqliteDatabase;

pub async fn prepare_test_env(url: &str) {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    debug!("🚀️ Logging initialised");
    create_database(url).await;
    run_migrations(url).await;
}

/// A fresh database file in the system temp directory
pub fn random_db_path() -> String {
    let path = std::env::temp_dir().join(format!("gsp_test_{}.db", rand::random::<u64>()));
    format!("sqlite://{}", path.display())
}

pub async fn run_migrations(url: &str) {
    let db = SqliteDatabase::new_with_url(url, 1).await.expect("Error creating connection to database");
    db.migrate().await.expect("Error running DB migrations");
    info!("🚀️ Migrations complete");
}

pub async fn create_database<P: AsRef<Path>>(path: P) {
    let p = path.as_ref().as_os_str().to_str().unwrap();
    if Sqlite::database_exists(p).await.unwrap_or(false) {
        if let Err(e) = Sqlite::drop_database(p).await {
            warn!("Error dropping database {p}: {e:?}");
        }
    }
    Sqlite::create_database(p).await.expect("Error creating database");
    info!("Created Sqlite database {p}");
}
