use crate::{
    geo::Coordinate,
    pagination::{paginate, Page},
    ranking::{filter_category, order_by_recency, rank_by_proximity, NearbyPost},
    types::{Category, Post},
    BlogsphereError, Result,
};

pub const DEFAULT_RADIUS_METERS: f64 = 10_000.0;
pub const DEFAULT_PAGE_SIZE: usize = 12;

#[derive(Debug, Clone, PartialEq)]
pub struct NearbyQuery {
    pub category: Category,
    /// `None` switches to newest-first ordering
    pub origin: Option<Coordinate>,
    /// meters; `None` means no cutoff
    pub radius: Option<f64>,
    pub page: usize,
    pub page_size: usize,
}

impl NearbyQuery {
    pub fn new(category: Category) -> Self {
        Self {
            category,
            origin: None,
            radius: Some(DEFAULT_RADIUS_METERS),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn near(mut self, origin: Coordinate) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn within(mut self, radius: Option<f64>) -> Self {
        self.radius = radius;
        self
    }

    pub fn page(mut self, page: usize, page_size: usize) -> Self {
        self.page = page;
        self.page_size = page_size;
        self
    }
}

pub fn validate_radius(radius: f64) -> Result<f64> {
    if !radius.is_finite() || radius < 0.0 {
        return Err(BlogsphereError::InvalidRadius(radius));
    }
    Ok(radius)
}

/// Category-filtered posts from `corpus`, ranked by distance from the query's
/// origin, or newest first when there is no origin, then cut into one page.
pub fn nearby_posts(corpus: Vec<Post>, query: &NearbyQuery) -> Result<Page<NearbyPost>> {
    if let Some(radius) = query.radius {
        validate_radius(radius)?;
    }

    let candidates = filter_category(corpus, query.category);

    let ordered = match &query.origin {
        Some(origin) => rank_by_proximity(origin, candidates, query.radius),
        None => order_by_recency(candidates),
    };

    paginate(ordered, query.page, query.page_size)
}
