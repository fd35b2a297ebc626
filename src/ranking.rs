use std::cmp::Ordering;

use serde::Serialize;

use crate::{geo::Coordinate, types::{Category, Post}};

/// A post as returned by the nearby query. `distance` is meters from the
/// requester and only present when the list was ranked by proximity.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct NearbyPost {
    #[serde(flatten)]
    pub post: Post,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
}

/// The coordinate a post is ranked by: its first branch with a usable
/// coordinate, else its own coordinate.
///
/// Branch always wins over the post's own coordinate, for every category.
pub fn resolve_coordinate(post: &Post) -> Option<Coordinate> {
    post.branches.iter()
        .find_map(|branch| branch.coordinate())
        .or_else(|| post.primary_coordinate())
}

pub fn filter_category(corpus: Vec<Post>, category: Category) -> Vec<Post> {
    corpus.into_iter().filter(|post| post.category == category).collect()
}

/// Posts within `radius` meters of `origin` (inclusive), nearest first.
/// Posts with no resolvable coordinate are dropped, not sorted last.
pub fn rank_by_proximity(origin: &Coordinate, candidates: Vec<Post>, radius: Option<f64>) -> Vec<NearbyPost> {
    let mut ranked: Vec<NearbyPost> = candidates.into_iter()
        .filter_map(|post| {
            let pos = resolve_coordinate(&post)?;
            let distance = origin.distance_to(&pos);
            match radius {
                Some(r) if distance > r => None,
                _ => Some(NearbyPost { post, distance: Some(distance) }),
            }
        })
        .collect();

    // stable, so equidistant posts keep corpus order
    ranked.sort_by(|a, b| {
        a.distance.partial_cmp(&b.distance).unwrap_or(Ordering::Equal)
    });

    ranked
}

/// Newest first. No distance is attached, and posts without a location are kept.
pub fn order_by_recency(candidates: Vec<Post>) -> Vec<NearbyPost> {
    let mut ordered: Vec<NearbyPost> = candidates.into_iter()
        .map(|post| NearbyPost { post, distance: None })
        .collect();

    ordered.sort_by(|a, b| b.post.created.cmp(&a.post.created));
    ordered
}
