//! Settings management

use crate::db::sqlite::models::{ScraperSettings, SettingsUpdate};
use crate::error::{AppError, Result};
use rusqlite::Connection;

/// Get settings
pub fn get_settings(conn: &Connection) -> Result<ScraperSettings> {
    let (api_host, api_port, fetch_timeout_secs, user_agent, default_url_template, max_job_errors, retention) =
        conn.query_row(
            "SELECT api_host, api_port, fetch_timeout_secs, user_agent, default_url_template,
                    max_job_errors, finished_job_retention_secs
             FROM settings WHERE id = 1",
            [],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, i64>(5)?,
                    row.get::<_, i64>(6)?,
                ))
            },
        )?;

    Ok(ScraperSettings {
        api_host,
        api_port: stored("api_port", api_port)?,
        fetch_timeout_secs: stored("fetch_timeout_secs", fetch_timeout_secs)?,
        user_agent,
        default_url_template,
        max_job_errors: stored("max_job_errors", max_job_errors)?,
        finished_job_retention_secs: stored("finished_job_retention_secs", retention)?,
    })
}

/// Convert a stored integer, rejecting values outside the field's range
fn stored<T: TryFrom<i64>>(column: &str, value: i64) -> Result<T> {
    T::try_from(value)
        .map_err(|_| AppError::Config(format!("settings.{} out of range: {}", column, value)))
}

/// Update settings
pub fn update_settings(conn: &Connection, update: SettingsUpdate) -> Result<ScraperSettings> {
    let mut updates = Vec::new();
    let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

    if let Some(h) = update.api_host {
        updates.push("api_host = ?");
        params.push(Box::new(h));
    }
    if let Some(p) = update.api_port {
        updates.push("api_port = ?");
        params.push(Box::new(p as i64));
    }
    if let Some(t) = update.fetch_timeout_secs {
        if t == 0 {
            return Err(AppError::Validation(
                "fetch_timeout_secs must be greater than zero".to_string(),
            ));
        }
        updates.push("fetch_timeout_secs = ?");
        params.push(Box::new(t as i64));
    }
    if let Some(ua) = update.user_agent {
        updates.push("user_agent = ?");
        params.push(Box::new(ua));
    }
    if let Some(template) = update.default_url_template {
        if !template.contains("{symbol}") {
            return Err(AppError::Validation(
                "default_url_template must contain {symbol}".to_string(),
            ));
        }
        updates.push("default_url_template = ?");
        params.push(Box::new(template));
    }
    if let Some(m) = update.max_job_errors {
        if m == 0 {
            return Err(AppError::Validation(
                "max_job_errors must be greater than zero".to_string(),
            ));
        }
        updates.push("max_job_errors = ?");
        params.push(Box::new(m as i64));
    }
    if let Some(r) = update.finished_job_retention_secs {
        updates.push("finished_job_retention_secs = ?");
        params.push(Box::new(r as i64));
    }

    if !updates.is_empty() {
        updates.push("updated_at = datetime('now')");

        let sql = format!("UPDATE settings SET {} WHERE id = 1", updates.join(", "));

        let params_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();
        conn.execute(&sql, params_refs.as_slice())?;
    }

    get_settings(conn)
}
