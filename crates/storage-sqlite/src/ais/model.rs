//! Database models for AIS messages, latest ship state and ship geometry.

use std::fmt::Display;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use shipwatch_core::ais::ShipGeometry;
use shipwatch_core::errors::{Result, ValidationError};
use shipwatch_core::staging::{Field, FieldSpec, AIS_MESSAGE_FIELDS};

/// One row of the staging relation, decoded from a payload line.
///
/// Timestamps keep their fixed-width text form so they compare correctly as
/// text in SQL.
#[derive(Insertable, Debug, Clone, Default, PartialEq)]
#[diesel(table_name = crate::schema::ais_staging)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_default_value = false)]
pub struct StagingRowDB {
    pub mmsi: i64,
    pub time: String,
    pub point: Option<String>,
    pub valid_position: bool,
    pub cog: Option<f64>,
    pub sog: Option<f64>,
    pub heading: Option<i32>,
    pub pac: Option<bool>,
    pub rot: Option<i32>,
    pub navstat: Option<i32>,
    pub imo: Option<i64>,
    pub callsign: String,
    pub name: String,
    pub ship_type: Option<i32>,
    pub dim_bow: Option<i32>,
    pub dim_stern: Option<i32>,
    pub dim_port: Option<i32>,
    pub dim_starboard: Option<i32>,
    pub eta: Option<String>,
    pub draught: Option<f64>,
    pub destination: String,
}

/// Number of columns a staging row binds.
pub const STAGING_COLUMNS: usize = 21;

impl StagingRowDB {
    /// Builds a row from the cells of one payload line, in registry order.
    pub fn from_cells(cells: Vec<Option<String>>) -> Result<Self> {
        if cells.len() != AIS_MESSAGE_FIELDS.len() {
            return Err(ValidationError::InvalidInput(format!(
                "expected {} cells per line, got {}",
                AIS_MESSAGE_FIELDS.len(),
                cells.len()
            ))
            .into());
        }

        let mut row = StagingRowDB::default();
        for (column, cell) in AIS_MESSAGE_FIELDS.iter().zip(cells) {
            match column.field {
                Field::Mmsi => row.mmsi = required(column, parse(column, cell)?)?,
                Field::Time => row.time = required(column, timestamp(column, cell)?)?,
                Field::Point => row.point = cell,
                Field::ValidPosition => row.valid_position = required(column, parse(column, cell)?)?,
                Field::Cog => row.cog = parse(column, cell)?,
                Field::Sog => row.sog = parse(column, cell)?,
                Field::Heading => row.heading = parse(column, cell)?,
                Field::Pac => row.pac = parse(column, cell)?,
                Field::Rot => row.rot = parse(column, cell)?,
                Field::Navstat => row.navstat = parse(column, cell)?,
                Field::Imo => row.imo = parse(column, cell)?,
                Field::Callsign => row.callsign = cell.unwrap_or_default(),
                Field::Name => row.name = cell.unwrap_or_default(),
                Field::ShipType => row.ship_type = parse(column, cell)?,
                Field::DimBow => row.dim_bow = parse(column, cell)?,
                Field::DimStern => row.dim_stern = parse(column, cell)?,
                Field::DimPort => row.dim_port = parse(column, cell)?,
                Field::DimStarboard => row.dim_starboard = parse(column, cell)?,
                Field::Eta => row.eta = timestamp(column, cell)?,
                Field::Draught => row.draught = parse(column, cell)?,
                Field::Destination => row.destination = cell.unwrap_or_default(),
            }
        }
        Ok(row)
    }
}

fn parse<T>(column: &FieldSpec, cell: Option<String>) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    cell.map(|value| {
        value.parse::<T>().map_err(|e| {
            ValidationError::InvalidInput(format!("{} = '{}': {}", column.name, value, e)).into()
        })
    })
    .transpose()
}

fn timestamp(column: &FieldSpec, cell: Option<String>) -> Result<Option<String>> {
    match cell {
        Some(value) => {
            DateTime::parse_from_rfc3339(&value).map_err(|e| {
                ValidationError::InvalidInput(format!("{} = '{}': {}", column.name, value, e))
            })?;
            Ok(Some(value))
        }
        None => Ok(None),
    }
}

fn required<T>(column: &FieldSpec, value: Option<T>) -> Result<T> {
    value.ok_or_else(|| ValidationError::MissingField(column.name.to_string()).into())
}

/// Database model for the latest known state of a vessel
#[derive(Queryable, Selectable, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::ais_ship_infos)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ShipInfoDB {
    pub mmsi: i64,
    pub time: String,
    pub point: Option<String>,
    pub valid_position: bool,
    pub cog: Option<f64>,
    pub sog: Option<f64>,
    pub heading: Option<i32>,
    pub pac: Option<bool>,
    pub rot: Option<i32>,
    pub navstat: Option<i32>,
    pub imo: Option<i64>,
    pub callsign: String,
    pub name: String,
    pub ship_type: Option<i32>,
    pub dim_bow: Option<i32>,
    pub dim_stern: Option<i32>,
    pub dim_port: Option<i32>,
    pub dim_starboard: Option<i32>,
    pub eta: Option<String>,
    pub draught: Option<f64>,
    pub destination: String,
}

/// Latest-state columns needed to derive a geometry
#[derive(QueryableByName, Debug, Clone)]
pub struct StaleShipInfoDB {
    #[diesel(sql_type = diesel::sql_types::BigInt)]
    pub mmsi: i64,
    #[diesel(sql_type = diesel::sql_types::Text)]
    pub time: String,
    #[diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Integer>)]
    pub ship_type: Option<i32>,
    #[diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Integer>)]
    pub dim_bow: Option<i32>,
    #[diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Integer>)]
    pub dim_stern: Option<i32>,
    #[diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Integer>)]
    pub dim_port: Option<i32>,
    #[diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Integer>)]
    pub dim_starboard: Option<i32>,
}

/// Database model for ship geometry
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::ais_ship_geometries)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_default_value = false)]
pub struct ShipGeometryDB {
    pub mmsi: i64,
    pub length: Option<i32>,
    pub width: Option<i32>,
    pub category: Option<String>,
    pub last_update: String,
}

impl From<StaleShipInfoDB> for ShipGeometryDB {
    fn from(info: StaleShipInfoDB) -> Self {
        // Overflowing sums only come from corrupt dimensions; treat as unknown.
        let sum = |a: Option<i32>, b: Option<i32>| a.zip(b).and_then(|(a, b)| a.checked_add(b));
        Self {
            mmsi: info.mmsi,
            length: sum(info.dim_bow, info.dim_stern),
            width: sum(info.dim_port, info.dim_starboard),
            category: info
                .ship_type
                .and_then(shipwatch_feed::ship_type::lookup)
                .map(|t| t.short_name.to_string()),
            last_update: info.time,
        }
    }
}

impl TryFrom<ShipGeometryDB> for ShipGeometry {
    type Error = shipwatch_core::Error;

    fn try_from(db: ShipGeometryDB) -> Result<Self> {
        let last_update = DateTime::parse_from_rfc3339(&db.last_update)
            .map_err(ValidationError::from)?
            .with_timezone(&Utc);
        Ok(ShipGeometry {
            mmsi: db.mmsi,
            length: db.length,
            width: db.width,
            category: db.category,
            last_update,
        })
    }
}
