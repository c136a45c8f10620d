use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::SqliteConnection;
use log::{debug, warn};

use shipwatch_core::ais::{
    BulkLoadRepositoryTrait, LoadReport, ShipGeometry, ShipGeometryRepositoryTrait,
};
use shipwatch_core::errors::{Result, ValidationError};
use shipwatch_core::staging::{column_names, decode_payload, StagingBatch};

use super::model::{
    ShipGeometryDB, ShipInfoDB, StaleShipInfoDB, StagingRowDB, STAGING_COLUMNS,
};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::{ais_messages, ais_ship_geometries, ais_ship_infos, ais_staging};
use crate::utils::chunk_rows_for_sqlite;

const GEOMETRY_COLUMNS: usize = 5;

const SELECT_STALE_SHIP_INFOS: &str = "
    SELECT i.mmsi, i.time, i.ship_type, i.dim_bow, i.dim_stern, i.dim_port, i.dim_starboard
    FROM ais_ship_infos i
    LEFT JOIN ais_ship_geometries g ON g.mmsi = i.mmsi
    WHERE g.mmsi IS NULL OR g.last_update <> i.time";

/// Bulk loader and geometry store backed by SQLite.
///
/// Loads go through a temporary `ais_staging` table on the writer
/// connection, merged into `ais_ship_infos` (and `ais_messages` when history
/// is kept) in the same transaction.
pub struct AisRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
    keep_history: bool,
}

impl AisRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle, keep_history: bool) -> Self {
        AisRepository {
            pool,
            writer,
            keep_history,
        }
    }

    pub fn keep_history(&self) -> bool {
        self.keep_history
    }

    pub fn get_ship_info(&self, vessel: i64) -> Result<Option<ShipInfoDB>> {
        let mut conn = get_connection(&self.pool)?;
        ais_ship_infos::table
            .find(vessel)
            .select(ShipInfoDB::as_select())
            .first::<ShipInfoDB>(&mut conn)
            .optional()
            .into_core()
    }

    pub fn count_history(&self) -> Result<i64> {
        let mut conn = get_connection(&self.pool)?;
        ais_messages::table
            .count()
            .get_result::<i64>(&mut conn)
            .into_core()
    }

    pub fn count_ship_infos(&self) -> Result<i64> {
        let mut conn = get_connection(&self.pool)?;
        ais_ship_infos::table
            .count()
            .get_result::<i64>(&mut conn)
            .into_core()
    }
}

fn decode_rows(batch: &StagingBatch) -> Result<Vec<StagingRowDB>> {
    let rows = decode_payload(&batch.payload)?
        .into_iter()
        .map(StagingRowDB::from_cells)
        .collect::<Result<Vec<_>>>()?;

    if rows.len() != batch.records {
        return Err(ValidationError::InvalidInput(format!(
            "payload holds {} rows but the batch declares {}",
            rows.len(),
            batch.records
        ))
        .into());
    }
    Ok(rows)
}

fn create_staging(conn: &mut SqliteConnection) -> Result<()> {
    drop_staging(conn)?;
    diesel::sql_query(format!(
        "CREATE TEMP TABLE ais_staging AS SELECT {} FROM ais_ship_infos WHERE 0",
        column_names().join(", ")
    ))
    .execute(conn)
    .into_core()?;
    Ok(())
}

fn drop_staging(conn: &mut SqliteConnection) -> Result<()> {
    diesel::sql_query("DROP TABLE IF EXISTS temp.ais_staging")
        .execute(conn)
        .into_core()?;
    Ok(())
}

/// Upserts the newest staged row of each vessel. Ties on time go to the row
/// staged first; a stored row is only replaced by a strictly newer one.
fn merge_latest(conn: &mut SqliteConnection) -> Result<usize> {
    let columns = column_names();
    let list = columns.join(", ");
    let updates = columns
        .iter()
        .filter(|c| **c != "mmsi")
        .map(|c| format!("{c} = excluded.{c}"))
        .collect::<Vec<_>>()
        .join(", ");

    let sql = format!(
        "INSERT INTO ais_ship_infos ({list})
         SELECT {list} FROM (
             SELECT {list}, ROW_NUMBER() OVER (PARTITION BY mmsi ORDER BY time DESC, rowid ASC) AS arrival_rank
             FROM ais_staging
         ) WHERE arrival_rank = 1
         ON CONFLICT (mmsi) DO UPDATE SET {updates}
         WHERE ais_ship_infos.time < excluded.time"
    );
    diesel::sql_query(sql).execute(conn).into_core()
}

/// Appends staged rows whose (mmsi, time) is not yet in the history.
fn merge_history(conn: &mut SqliteConnection) -> Result<usize> {
    let list = column_names().join(", ");
    let sql = format!(
        "INSERT INTO ais_messages ({list})
         SELECT {list} FROM ais_staging WHERE true
         ON CONFLICT (mmsi, time) DO NOTHING"
    );
    diesel::sql_query(sql).execute(conn).into_core()
}

fn load_staged(
    conn: &mut SqliteConnection,
    rows: &[StagingRowDB],
    keep_history: bool,
) -> Result<LoadReport> {
    for chunk in chunk_rows_for_sqlite(rows, STAGING_COLUMNS) {
        diesel::insert_into(ais_staging::table)
            .values(chunk)
            .execute(conn)
            .map_err(StorageError::from)?;
    }

    let new_latest_rows = merge_latest(conn)?;
    let new_history_rows = if keep_history {
        merge_history(conn)?
    } else {
        0
    };

    Ok(LoadReport {
        total_input: rows.len(),
        new_history_rows,
        new_latest_rows,
        history_enabled: keep_history,
    })
}

#[async_trait]
impl BulkLoadRepositoryTrait for AisRepository {
    async fn load(&self, batch: StagingBatch) -> Result<LoadReport> {
        let keep_history = self.keep_history;
        if batch.is_empty() {
            return Ok(LoadReport {
                history_enabled: keep_history,
                ..LoadReport::default()
            });
        }

        let rows = decode_rows(&batch)?;
        let report = self
            .writer
            .exec(move |conn: &mut SqliteConnection| -> Result<LoadReport> {
                create_staging(conn)?;
                let outcome = load_staged(conn, &rows, keep_history);
                let dropped = drop_staging(conn);
                let report = outcome?;
                dropped?;
                Ok(report)
            })
            .await?;

        debug!(
            "Loaded {} staged rows: {} history, {} latest",
            report.total_input, report.new_history_rows, report.new_latest_rows
        );
        Ok(report)
    }
}

#[async_trait]
impl ShipGeometryRepositoryTrait for AisRepository {
    async fn refresh_geometries(&self) -> Result<usize> {
        self.writer
            .exec(|conn: &mut SqliteConnection| -> Result<usize> {
                let stale = diesel::sql_query(SELECT_STALE_SHIP_INFOS)
                    .load::<StaleShipInfoDB>(conn)
                    .map_err(StorageError::from)?;
                let geometries: Vec<ShipGeometryDB> =
                    stale.into_iter().map(ShipGeometryDB::from).collect();

                let mut written = 0;
                for chunk in chunk_rows_for_sqlite(&geometries, GEOMETRY_COLUMNS) {
                    written += diesel::replace_into(ais_ship_geometries::table)
                        .values(chunk)
                        .execute(conn)
                        .map_err(StorageError::from)?;
                }
                Ok(written)
            })
            .await
    }

    fn get_geometry(&self, vessel: i64) -> Result<Option<ShipGeometry>> {
        let mut conn = get_connection(&self.pool)?;
        let row = ais_ship_geometries::table
            .find(vessel)
            .select(ShipGeometryDB::as_select())
            .first::<ShipGeometryDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;

        match row {
            Some(row) => ShipGeometry::try_from(row).map(Some),
            None => {
                warn!("No geometry stored for MMSI {}", vessel);
                Ok(None)
            }
        }
    }
}
