//! Staging payloads.
//!
//! Buffered records are materialized into a delimited text payload whose
//! column order is fixed by the schema descriptor. The bulk loader imports the
//! payload into its staging relation column by column, in that same order.

mod ewkb;
mod materializer;
mod schema;

pub use ewkb::encode_point;
pub use materializer::{decode_payload, materialize, StagingBatch, DELIMITER, ESCAPE, QUOTE};
pub use schema::{column_names, CellValue, Field, FieldKind, FieldSpec, AIS_MESSAGE_FIELDS};
