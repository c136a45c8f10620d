//! AIS repository traits.
//!
//! These traits define the contract for the bulk loader and the geometry
//! store without any database-specific types.

use async_trait::async_trait;

use super::ais_model::{LoadReport, ShipGeometry};
use crate::errors::Result;
use crate::staging::StagingBatch;

/// Trait defining the contract for the staging-table bulk loader.
#[async_trait]
pub trait BulkLoadRepositoryTrait: Send + Sync {
    /// Imports a materialized batch into a staging relation and merges it
    /// into the latest-state table (and the history, when retained).
    ///
    /// The merge is all-or-nothing and the staging relation is always
    /// dropped, including on error.
    async fn load(&self, batch: StagingBatch) -> Result<LoadReport>;
}

/// Trait defining the contract for derived ship geometry.
#[async_trait]
pub trait ShipGeometryRepositoryTrait: Send + Sync {
    /// Derives geometry for vessels that have none, or whose latest state
    /// changed since it was derived.
    ///
    /// Returns the number of rows written.
    async fn refresh_geometries(&self) -> Result<usize>;

    /// Retrieves the geometry of one vessel.
    fn get_geometry(&self, mmsi: i64) -> Result<Option<ShipGeometry>>;
}
