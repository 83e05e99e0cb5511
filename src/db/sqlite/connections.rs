//! Connection configuration lookups
//!
//! Jobs only read connections. Inserts come from the API or seeding.

use crate::error::{AppError, Result};
use crate::scraper::{ConnectionConfig, ConnectionType};
use rusqlite::{params, Connection, OptionalExtension};

type RawConnection = (i64, String, String, String);

fn read_raw(row: &rusqlite::Row) -> rusqlite::Result<RawConnection> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

fn into_config((id, name, base_url_template, connection_type): RawConnection) -> Result<ConnectionConfig> {
    let connection_type = ConnectionType::parse(&connection_type).ok_or_else(|| {
        AppError::Config(format!(
            "Connection {} has unknown type '{}'",
            id, connection_type
        ))
    })?;

    Ok(ConnectionConfig {
        id,
        name,
        base_url_template,
        connection_type,
    })
}

/// Get a connection configuration by id
pub fn get_connection(conn: &Connection, id: i64) -> Result<Option<ConnectionConfig>> {
    conn.query_row(
        "SELECT id, name, base_url_template, connection_type FROM connections WHERE id = ?1",
        params![id],
        read_raw,
    )
    .optional()?
    .map(into_config)
    .transpose()
}

/// All connections ordered by id
pub fn list_connections(conn: &Connection) -> Result<Vec<ConnectionConfig>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, base_url_template, connection_type FROM connections ORDER BY id",
    )?;

    let rows = stmt
        .query_map([], read_raw)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    rows.into_iter().map(into_config).collect()
}

/// Insert a connection and return its id
pub fn insert_connection(
    conn: &Connection,
    name: &str,
    base_url_template: &str,
    connection_type: ConnectionType,
) -> Result<i64> {
    if name.trim().is_empty() {
        return Err(AppError::Validation("Connection name is required".to_string()));
    }
    if !base_url_template.trim().is_empty() && !base_url_template.contains("{symbol}") {
        return Err(AppError::Validation(
            "base_url_template must contain {symbol}".to_string(),
        ));
    }

    let inserted = conn.execute(
        "INSERT INTO connections (name, base_url_template, connection_type) VALUES (?1, ?2, ?3)",
        params![name.trim(), base_url_template.trim(), connection_type.as_str()],
    );

    match inserted {
        Ok(_) => Ok(conn.last_insert_rowid()),
        Err(rusqlite::Error::SqliteFailure(e, _))
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            Err(AppError::Validation(format!(
                "Connection '{}' already exists",
                name.trim()
            )))
        }
        Err(e) => Err(e.into()),
    }
}
