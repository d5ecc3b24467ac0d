//! Database bootstrap: create the target database when the server may connect but it does not exist yet.

use crate::error::{AppError, ConfigError};
use sqlx::ConnectOptions;
use std::str::FromStr;

/// Split a connection URL into (maintenance URL on the `postgres` database, target database name).
fn parse_db_name_from_url(url: &str) -> Result<(String, String), ConfigError> {
    let path_start = url.rfind('/').ok_or_else(|| ConfigError::Invalid {
        key: "DATABASE_URL",
        value: "no database path".into(),
    })? + 1;
    let path_and_query = url.get(path_start..).unwrap_or("");
    let db_name = path_and_query.split('?').next().unwrap_or("").trim();
    let base = url.get(..path_start).unwrap_or(url);
    Ok((format!("{}postgres", base), db_name.to_string()))
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Connect to the maintenance database and `CREATE DATABASE` if the target is missing.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let (admin_url, db_name) = parse_db_name_from_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = sqlx::postgres::PgConnectOptions::from_str(&admin_url).map_err(|e| ConfigError::Invalid {
        key: "DATABASE_URL",
        value: e.to_string(),
    })?;
    let mut conn: sqlx::PgConnection = opts.connect().await?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists.0 {
        tracing::info!(database = %db_name, "creating database");
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&db_name)))
            .execute(&mut conn)
            .await?;
    }
    Ok(())
}
