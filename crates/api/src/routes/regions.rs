//! Region lookup.

use axum::{extract::State, Json};
use domain::models::Region;
use persistence::repositories::RegionRepository;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;

/// List every region, grouped by province.
///
/// GET /api/v1/regions
pub async fn list_regions(
    State(state): State<AppState>,
    _auth: UserAuth,
) -> Result<Json<Vec<Region>>, ApiError> {
    let regions = RegionRepository::new(state.pool.clone())
        .list()
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(regions))
}
