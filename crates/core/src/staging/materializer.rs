use chrono::SecondsFormat;
use shipwatch_feed::RawRecord;

use super::ewkb::encode_point;
use super::schema::{CellValue, AIS_MESSAGE_FIELDS};
use crate::errors::{Result, ValidationError};

pub const DELIMITER: char = '|';
pub const ESCAPE: char = '\\';
pub const QUOTE: char = '"';
/// Replaces quotes inside text values.
const QUOTE_REPLACEMENT: char = '\'';
const LINE_END: char = '\n';

/// Delimited text payload for one bulk-load call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StagingBatch {
    pub payload: String,
    pub records: usize,
}

impl StagingBatch {
    pub fn is_empty(&self) -> bool {
        self.records == 0
    }
}

/// Renders records as one delimited line each, columns in registry order.
///
/// Nulls are empty and unquoted, text is quoted with inner quotes replaced by
/// `'`, delimiters and escapes inside a value get a leading `\`.
pub fn materialize(records: &[RawRecord]) -> StagingBatch {
    let mut payload = String::with_capacity(records.len() * 160);

    for record in records {
        for (i, column) in AIS_MESSAGE_FIELDS.iter().enumerate() {
            if i > 0 {
                payload.push(DELIMITER);
            }
            write_cell(&mut payload, &column.field.value(record));
        }
        payload.push(LINE_END);
    }

    StagingBatch {
        payload,
        records: records.len(),
    }
}

fn write_cell(out: &mut String, value: &CellValue<'_>) {
    match value {
        CellValue::Null => {}
        CellValue::Int(v) => out.push_str(&v.to_string()),
        CellValue::Float(v) => out.push_str(&v.to_string()),
        CellValue::Bool(v) => out.push_str(if *v { "true" } else { "false" }),
        CellValue::Time(t) => out.push_str(&t.to_rfc3339_opts(SecondsFormat::Micros, true)),
        CellValue::Point(p) => out.push_str(&encode_point(p)),
        CellValue::Text(s) => {
            out.push(QUOTE);
            for c in s.chars() {
                match c {
                    QUOTE => out.push(QUOTE_REPLACEMENT),
                    DELIMITER | ESCAPE => {
                        out.push(ESCAPE);
                        out.push(c);
                    }
                    _ => out.push(c),
                }
            }
            out.push(QUOTE);
        }
    }
}

/// Parses a payload back into rows of cells.
///
/// A cell is `None` when it is empty and unquoted. Line ends inside quotes
/// belong to the value.
pub fn decode_payload(payload: &str) -> Result<Vec<Vec<Option<String>>>> {
    let mut rows = Vec::new();
    let mut row: Vec<Option<String>> = Vec::new();
    let mut cell = String::new();
    let mut quoted = false;
    let mut in_quotes = false;
    let mut chars = payload.chars();

    let finish_cell = |row: &mut Vec<Option<String>>, cell: &mut String, quoted: &mut bool| {
        let value = std::mem::take(cell);
        row.push(if value.is_empty() && !*quoted {
            None
        } else {
            Some(value)
        });
        *quoted = false;
    };

    while let Some(c) = chars.next() {
        match c {
            ESCAPE => match chars.next() {
                Some(escaped) => cell.push(escaped),
                None => {
                    return Err(ValidationError::InvalidInput(
                        "payload ends inside an escape sequence".to_string(),
                    )
                    .into())
                }
            },
            QUOTE => {
                in_quotes = !in_quotes;
                quoted = true;
            }
            DELIMITER if !in_quotes => finish_cell(&mut row, &mut cell, &mut quoted),
            LINE_END if !in_quotes => {
                finish_cell(&mut row, &mut cell, &mut quoted);
                rows.push(std::mem::take(&mut row));
            }
            _ => cell.push(c),
        }
    }

    if in_quotes {
        return Err(ValidationError::InvalidInput("unterminated quoted value".to_string()).into());
    }
    if !cell.is_empty() || quoted || !row.is_empty() {
        finish_cell(&mut row, &mut cell, &mut quoted);
        rows.push(row);
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::staging::column_names;
    use chrono::{TimeZone, Utc};
    use shipwatch_feed::{Mmsi, Position, StaticInfo};

    fn sample() -> RawRecord {
        let mut position = Position::from_coordinates(1.0, 2.0);
        position.cog = Some(0.1);
        position.heading = Some(171);
        position.pac = Some(false);

        RawRecord::new(
            Mmsi(232003233),
            Utc.with_ymd_and_hms(2019, 8, 29, 8, 48, 50).unwrap(),
            position,
            StaticInfo {
                name: Some("SVITZER \"MERCIA\"".to_string()),
                callsign: None,
                destination: Some("A|B\\C".to_string()),
                draught: Some(5.4),
                ..StaticInfo::default()
            },
        )
    }

    fn cell<'a>(row: &'a [Option<String>], column: &str) -> Option<&'a str> {
        let index = column_names().iter().position(|c| *c == column).unwrap();
        row[index].as_deref()
    }

    #[test]
    fn test_materialize_line_shape() {
        let batch = materialize(&[sample(), sample()]);
        assert_eq!(batch.records, 2);
        assert_eq!(batch.payload.lines().count(), 2);

        let first = batch.payload.lines().next().unwrap();
        assert!(first.starts_with("\"\"|0.1|\"A\\|B\\\\C\"|"));
        assert!(first.ends_with("|2019-08-29T08:48:50.000000Z|true"));
        assert!(first.contains("|\"SVITZER 'MERCIA'\"|"));
        assert!(first.contains("|0101000020E6100000000000000000F03F0000000000000040|"));
    }

    #[test]
    fn test_round_trip() {
        let batch = materialize(&[sample()]);
        let rows = decode_payload(&batch.payload).unwrap();
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.len(), column_names().len());

        assert_eq!(cell(row, "mmsi"), Some("232003233"));
        assert_eq!(cell(row, "name"), Some("SVITZER 'MERCIA'"));
        assert_eq!(cell(row, "destination"), Some("A|B\\C"));
        assert_eq!(cell(row, "callsign"), Some(""));
        assert_eq!(cell(row, "imo"), None);
        assert_eq!(cell(row, "draught"), Some("5.4"));
        assert_eq!(cell(row, "pac"), Some("false"));
        assert_eq!(cell(row, "valid_position"), Some("true"));
        assert_eq!(cell(row, "time"), Some("2019-08-29T08:48:50.000000Z"));
    }

    #[test]
    fn test_invalid_position_has_empty_point() {
        let mut record = sample();
        record.position = Position::invalid();
        let rows = decode_payload(&materialize(&[record]).payload).unwrap();
        assert_eq!(cell(&rows[0], "point"), None);
        assert_eq!(cell(&rows[0], "valid_position"), Some("false"));
    }

    #[test]
    fn test_line_end_inside_text() {
        let mut record = sample();
        record.info.name = Some("TWO\nLINES".to_string());
        let rows = decode_payload(&materialize(&[record]).payload).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(cell(&rows[0], "name"), Some("TWO\nLINES"));
    }

    #[test]
    fn test_empty_batch() {
        let batch = materialize(&[]);
        assert!(batch.is_empty());
        assert!(decode_payload(&batch.payload).unwrap().is_empty());
    }

    #[test]
    fn test_decode_rejects_broken_payload() {
        assert!(decode_payload("\"open|1\n").is_err());
        assert!(decode_payload("1|2\\").is_err());
    }
}
