use mongodb::bson::{doc, Document};
use serde::{Deserialize, Serialize};

use crate::{geo::{Coordinate, EARTH_RADIUS_METERS}, types::Post};

pub const WORLD_BOUND_X: f64 = 180.0;
pub const WORLD_BOUND_Y: f64 = 90.0;

// keeps points sitting exactly on the radius inside despite rounding
const PAD_DEGREES: f64 = 1e-7;

/// Lat/lng box in degrees. `top`/`bottom` are latitudes, `left`/`right` longitudes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox { pub top: f64, pub bottom: f64, pub left: f64, pub right: f64 }

impl BoundingBox {
    /// smallest box holding every point within `radius_meters` of `center`.
    ///
    /// `None` when that box would cover a pole or wrap the antimeridian; callers
    /// then skip prefiltering and rely on the exact distance check alone.
    pub fn around(center: &Coordinate, radius_meters: f64) -> Option<Self> {
        if !radius_meters.is_finite() || radius_meters < 0.0 { return None; }

        let angular = radius_meters / EARTH_RADIUS_METERS;
        let d_lat = angular.to_degrees() + PAD_DEGREES;

        // reaching a pole means every longitude is in range
        if center.latitude.abs() + d_lat >= WORLD_BOUND_Y { return None; }

        let ratio = angular.sin() / center.latitude.to_radians().cos();
        if ratio >= 1.0 { return None; }
        let d_lng = ratio.asin().to_degrees() + PAD_DEGREES;

        let bbox = Self {
            top: center.latitude + d_lat,
            bottom: center.latitude - d_lat,
            left: center.longitude - d_lng,
            right: center.longitude + d_lng,
        };
        bbox.within_world_bounds().then_some(bbox)
    }

    pub fn within_world_bounds(&self) -> bool {
        self.left >= -WORLD_BOUND_X && self.right <= WORLD_BOUND_X && self.bottom >= -WORLD_BOUND_Y && self.top <= WORLD_BOUND_Y
    }

    pub fn contains(&self, pos: &Coordinate) -> bool {
        (self.bottom..=self.top).contains(&pos.latitude) && (self.left..=self.right).contains(&pos.longitude)
    }

    /// in-memory twin of [`BoundingBox::as_post_filter`]
    pub fn admits(&self, post: &Post) -> bool {
        post.primary_coordinate().is_some_and(|pos| self.contains(&pos))
            || post.branches.iter().any(|b| b.coordinate().is_some_and(|pos| self.contains(&pos)))
    }

    fn lat_lng_range(&self) -> Document {
        doc! {
            "latitude": { "$gte": self.bottom, "$lte": self.top },
            "longitude": { "$gte": self.left, "$lte": self.right },
        }
    }

    /// matches a post whose own coordinate or any branch lies inside the box
    pub fn as_post_filter(&self) -> Document {
        doc! {
            "$or": [
                self.lat_lng_range(),
                { "branches": { "$elemMatch": self.lat_lng_range() } },
            ]
        }
    }
}
