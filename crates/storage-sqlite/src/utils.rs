//! Utility functions for SQLite storage operations.
//!
//! This module provides helpers for working with SQLite, including chunking
//! utilities to avoid parameter limits.

/// Maximum number of bound parameters per statement.
///
/// The bundled SQLite (3.32+) defaults SQLITE_MAX_VARIABLE_NUMBER to 32766.
/// Multi-row inserts bind one parameter per column per row, so they are split
/// to stay under this limit with some headroom.
pub const SQLITE_MAX_BIND_PARAMS: usize = 30_000;

/// Number of rows of `columns` columns that fit in one statement.
pub fn rows_per_statement(columns: usize) -> usize {
    (SQLITE_MAX_BIND_PARAMS / columns.max(1)).max(1)
}

/// Chunk rows into slices that can each be inserted with a single
/// multi-row `INSERT`.
///
/// # Example
///
/// ```ignore
/// for chunk in chunk_rows_for_sqlite(&rows, STAGING_COLUMNS) {
///     diesel::insert_into(ais_staging::table).values(chunk).execute(conn)?;
/// }
/// ```
pub fn chunk_rows_for_sqlite<T>(rows: &[T], columns: usize) -> impl Iterator<Item = &[T]> {
    rows.chunks(rows_per_statement(columns))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_rows_empty() {
        let rows: Vec<i32> = vec![];
        assert_eq!(chunk_rows_for_sqlite(&rows, 21).count(), 0);
    }

    #[test]
    fn test_rows_per_statement() {
        assert_eq!(rows_per_statement(21), 1428);
        assert_eq!(rows_per_statement(0), SQLITE_MAX_BIND_PARAMS);
        assert_eq!(rows_per_statement(usize::MAX), 1);
    }

    #[test]
    fn test_chunk_rows_over_limit() {
        let rows: Vec<i32> = (0..3000).collect();
        let chunks: Vec<_> = chunk_rows_for_sqlite(&rows, 21).collect();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 1428);
        assert_eq!(chunks[2].len(), 3000 - 2 * 1428);
    }
}
