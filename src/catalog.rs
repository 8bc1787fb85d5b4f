//! Boundary to the spatial datastore that executes validated queries.
//! The interpreter never calls it; hosts plug in their own implementation.

use serde::{Deserialize, Serialize};

use crate::models::{SearchParams, LIMIT_MAX, LIMIT_MIN};

/// Page size used when the query sets no limit.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// WGS84 bounding box (degrees).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    /// None when the corners are inverted or outside valid coordinates.
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Option<Self> {
        let lon_ok = (-180.0..=180.0).contains(&min_lon) && (-180.0..=180.0).contains(&max_lon);
        let lat_ok = (-90.0..=90.0).contains(&min_lat) && (-90.0..=90.0).contains(&max_lat);
        (lon_ok && lat_ok && min_lon <= max_lon && min_lat <= max_lat).then_some(Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        })
    }
}

/// 1-based page request. Construction clamps both values into range, so
/// `page` and `limit` are never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(u32::from(LIMIT_MIN), u32::from(LIMIT_MAX)),
        }
    }

    /// First page, sized by the query's limit when present.
    pub fn for_params(params: &SearchParams) -> Self {
        Self::new(1, params.limit.map_or(DEFAULT_PAGE_SIZE, u32::from))
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }
}

/// One page of catalog results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u64,
}

impl<T> SearchPage<T> {
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            page: request.page(),
            limit: request.limit(),
            total_pages: total.div_ceil(u64::from(request.limit().max(1))),
        }
    }
}

/// Spatial datastore abstraction (allows mocking).
pub trait SpatialCatalog: Send + Sync {
    type Item;
    type Error: std::error::Error;

    fn search(
        &self,
        params: &SearchParams,
        bbox: Option<BoundingBox>,
        page: PageRequest,
    ) -> Result<SearchPage<Self::Item>, Self::Error>;
}
