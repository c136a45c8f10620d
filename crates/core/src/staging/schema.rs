//! Field registry for AIS messages.
//!
//! The registry is declared once and sorted by column name. Both the
//! materializer and the bulk loader's staging relation follow this order.

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use shipwatch_feed::{GeoPoint, RawRecord};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Integer,
    Float,
    Boolean,
    Text,
    Timestamp,
    Point,
}

/// Every column of an AIS message row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    Mmsi,
    Time,
    Point,
    ValidPosition,
    Cog,
    Sog,
    Heading,
    Pac,
    Rot,
    Navstat,
    Imo,
    Callsign,
    Name,
    ShipType,
    DimBow,
    DimStern,
    DimPort,
    DimStarboard,
    Eta,
    Draught,
    Destination,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldSpec {
    pub field: Field,
    pub name: &'static str,
    pub kind: FieldKind,
    /// Not-null text columns store a missing value as the empty string.
    pub nullable: bool,
}

impl FieldSpec {
    const fn new(field: Field, name: &'static str, kind: FieldKind, nullable: bool) -> Self {
        Self {
            field,
            name,
            kind,
            nullable,
        }
    }
}

/// A single cell extracted from a record.
#[derive(Clone, Debug, PartialEq)]
pub enum CellValue<'a> {
    Null,
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(&'a str),
    Time(DateTime<Utc>),
    Point(GeoPoint),
}

impl<T: Into<i64>> From<Option<T>> for CellValue<'_> {
    fn from(value: Option<T>) -> Self {
        value.map_or(CellValue::Null, |v| CellValue::Int(v.into()))
    }
}

impl Field {
    /// Extracts this field from a record.
    pub fn value<'a>(&self, record: &'a RawRecord) -> CellValue<'a> {
        let position = &record.position;
        let info = &record.info;

        match self {
            Field::Mmsi => CellValue::Int(i64::from(record.mmsi.value())),
            Field::Time => CellValue::Time(record.time),
            Field::Point => match (position.valid, position.point) {
                (true, Some(point)) => CellValue::Point(point),
                _ => CellValue::Null,
            },
            Field::ValidPosition => CellValue::Bool(position.valid),
            Field::Cog => float(position.cog),
            Field::Sog => float(position.sog),
            Field::Heading => position.heading.into(),
            Field::Pac => position.pac.map_or(CellValue::Null, CellValue::Bool),
            Field::Rot => position.rot.into(),
            Field::Navstat => position.navstat.into(),
            Field::Imo => info.imo.into(),
            Field::Callsign => text(&info.callsign),
            Field::Name => text(&info.name),
            Field::ShipType => info.ship_type.into(),
            Field::DimBow => info.dim_bow.into(),
            Field::DimStern => info.dim_stern.into(),
            Field::DimPort => info.dim_port.into(),
            Field::DimStarboard => info.dim_starboard.into(),
            Field::Eta => info.eta.map_or(CellValue::Null, CellValue::Time),
            Field::Draught => float(info.draught),
            Field::Destination => text(&info.destination),
        }
    }
}

fn float<'a>(value: Option<f64>) -> CellValue<'a> {
    value.map_or(CellValue::Null, CellValue::Float)
}

fn text(value: &Option<String>) -> CellValue<'_> {
    CellValue::Text(value.as_deref().unwrap_or(""))
}

lazy_static! {
    /// AIS message columns, sorted by name.
    pub static ref AIS_MESSAGE_FIELDS: Vec<FieldSpec> = {
        use FieldKind::*;

        let mut fields = vec![
            FieldSpec::new(Field::Mmsi, "mmsi", Integer, false),
            FieldSpec::new(Field::Time, "time", Timestamp, false),
            FieldSpec::new(Field::Point, "point", Point, true),
            FieldSpec::new(Field::ValidPosition, "valid_position", Boolean, false),
            FieldSpec::new(Field::Cog, "cog", Float, true),
            FieldSpec::new(Field::Sog, "sog", Float, true),
            FieldSpec::new(Field::Heading, "heading", Integer, true),
            FieldSpec::new(Field::Pac, "pac", Boolean, true),
            FieldSpec::new(Field::Rot, "rot", Integer, true),
            FieldSpec::new(Field::Navstat, "navstat", Integer, true),
            FieldSpec::new(Field::Imo, "imo", Integer, true),
            FieldSpec::new(Field::Callsign, "callsign", Text, false),
            FieldSpec::new(Field::Name, "name", Text, false),
            FieldSpec::new(Field::ShipType, "ship_type", Integer, true),
            FieldSpec::new(Field::DimBow, "dim_bow", Integer, true),
            FieldSpec::new(Field::DimStern, "dim_stern", Integer, true),
            FieldSpec::new(Field::DimPort, "dim_port", Integer, true),
            FieldSpec::new(Field::DimStarboard, "dim_starboard", Integer, true),
            FieldSpec::new(Field::Eta, "eta", Timestamp, true),
            FieldSpec::new(Field::Draught, "draught", Float, true),
            FieldSpec::new(Field::Destination, "destination", Text, false),
        ];
        fields.sort_by_key(|f| f.name);
        fields
    };
}

/// Column names in payload order.
pub fn column_names() -> Vec<&'static str> {
    AIS_MESSAGE_FIELDS.iter().map(|f| f.name).collect()
}
