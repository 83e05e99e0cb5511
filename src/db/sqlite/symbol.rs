//! Symbol master storage and universe selection
//!
//! The universe filter below is the only place that decides which
//! instruments get scraped. Derivatives, indices, ETFs and inactive rows
//! never make it through.

use crate::db::sqlite::models::SymbolRow;
use crate::error::Result;
use crate::scraper::SymbolDescriptor;
use rusqlite::{params, Connection};

const UNIVERSE_QUERY: &str = "SELECT symbol, exchange
     FROM symtoken
     WHERE status = 'ACTIVE' AND instrument_type IN ('EQ', 'CASH')
     ORDER BY exchange ASC, symbol ASC";

/// Replace the symbol master (batch insert with transaction)
pub fn store_symbols(conn: &mut Connection, symbols: &[SymbolRow]) -> Result<()> {
    let tx = conn.transaction()?;

    // Clear existing symbols
    tx.execute("DELETE FROM symtoken", [])?;

    let mut stmt = tx.prepare(
        "INSERT INTO symtoken (symbol, token, exchange, name, instrument_type, status)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )?;

    for symbol in symbols {
        stmt.execute(params![
            symbol.symbol,
            symbol.token,
            symbol.exchange,
            symbol.name,
            symbol.instrument_type,
            symbol.status,
        ])?;
    }

    drop(stmt);
    tx.commit()?;

    tracing::info!("Stored {} symbols in database", symbols.len());
    Ok(())
}

/// Load the scrape universe: active cash equities ordered by (exchange, symbol)
pub fn load_universe(conn: &Connection) -> Result<Vec<SymbolDescriptor>> {
    let mut stmt = conn.prepare(UNIVERSE_QUERY)?;

    let symbols = stmt
        .query_map([], |row| {
            Ok(SymbolDescriptor {
                trading_symbol: row.get(0)?,
                exchange: row.get(1)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    tracing::debug!("Loaded universe of {} symbols", symbols.len());
    Ok(symbols)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::migrations::run_migrations;

    fn create_test_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn row(symbol: &str, exchange: &str, instrument_type: &str, status: &str) -> SymbolRow {
        SymbolRow {
            symbol: symbol.to_string(),
            token: format!("{}-{}", exchange, symbol),
            exchange: exchange.to_string(),
            name: symbol.to_string(),
            instrument_type: instrument_type.to_string(),
            status: status.to_string(),
        }
    }

    #[test]
    fn test_universe_filter_excludes_derivatives_and_inactive() {
        let mut conn = create_test_db();
        store_symbols(
            &mut conn,
            &[
                row("NIFTY24JANFUT", "NFO", "FUT", "ACTIVE"),
                row("OLDCO", "NSE", "EQ", "INACTIVE"),
                row("RELIANCE", "NSE", "EQ", "ACTIVE"),
            ],
        )
        .unwrap();

        let universe = load_universe(&conn).unwrap();
        assert_eq!(universe, vec![SymbolDescriptor::new("RELIANCE", "NSE")]);
    }

    #[test]
    fn test_universe_ordering_and_cash_instruments() {
        let mut conn = create_test_db();
        store_symbols(
            &mut conn,
            &[
                row("TCS", "NSE", "EQ", "ACTIVE"),
                row("INFY", "NSE", "EQ", "ACTIVE"),
                row("500325", "BSE", "CASH", "ACTIVE"),
                row("NIFTY 50", "NSE", "INDEX", "ACTIVE"),
                row("NIFTYBEES", "NSE", "ETF", "ACTIVE"),
                row("BANKNIFTY24JAN45000CE", "NFO", "OPT", "ACTIVE"),
            ],
        )
        .unwrap();

        let universe = load_universe(&conn).unwrap();
        let keys: Vec<String> = universe.iter().map(|s| s.to_string()).collect();
        assert_eq!(keys, vec!["BSE:500325", "NSE:INFY", "NSE:TCS"]);
    }

    #[test]
    fn test_empty_universe_is_not_an_error() {
        let conn = create_test_db();
        assert!(load_universe(&conn).unwrap().is_empty());
    }

    #[test]
    fn test_store_replaces_master() {
        let mut conn = create_test_db();
        store_symbols(&mut conn, &[row("TCS", "NSE", "EQ", "ACTIVE")]).unwrap();
        store_symbols(
            &mut conn,
            &[
                row("INFY", "NSE", "EQ", "ACTIVE"),
                row("WIPRO", "NSE", "EQ", "ACTIVE"),
            ],
        )
        .unwrap();

        let keys: Vec<String> = load_universe(&conn)
            .unwrap()
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(keys, vec!["NSE:INFY", "NSE:WIPRO"]);
    }
}
