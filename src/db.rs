use log::debug;
use rusqlite::Connection;

use crate::{config::LoaderConfig, error::ConnectivityError};

/// Opens a fresh connection for one unit of work. Dropping it closes it.
pub fn open_connection(config: &LoaderConfig) -> Result<Connection, ConnectivityError> {
    let conn = Connection::open(&config.database).map_err(|source| ConnectivityError::Open {
        path: config.database.clone(),
        source,
    })?;
    conn.busy_timeout(config.busy_timeout)
        .map_err(ConnectivityError::Configure)?;
    debug!("Opened database {:?}", config.database);
    Ok(conn)
}
