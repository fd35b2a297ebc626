use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{geo::Coordinate, BlogsphereError};

/// Closed set of post categories. Requests naming anything else are rejected.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Category { Food, Restaurant, Fashion, Travel, Gaming, Tech, Music }

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Food,
        Category::Restaurant,
        Category::Fashion,
        Category::Travel,
        Category::Gaming,
        Category::Tech,
        Category::Music,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Food => "food",
            Category::Restaurant => "restaurant",
            Category::Fashion => "fashion",
            Category::Travel => "travel",
            Category::Gaming => "gaming",
            Category::Tech => "tech",
            Category::Music => "music",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = BlogsphereError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Category::ALL.into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| BlogsphereError::UnknownCategory(s.to_string()))
    }
}

/// One physical venue of a post.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Branch {
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl Branch {
    pub fn coordinate(&self) -> Option<Coordinate> {
        Coordinate::from_parts(self.latitude, self.longitude)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Post {
    pub _id: String,
    pub author: String,
    pub category: Category,

    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub media: Vec<String>,

    #[serde(default)]
    pub offer: Option<String>,
    /// offer window, ms since the epoch
    #[serde(default)]
    pub valid_from: Option<u64>,
    #[serde(default)]
    pub valid_until: Option<u64>,

    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub branches: Vec<Branch>,

    /// ms since the epoch
    pub created: u64,
}

impl Post {
    /// the post's own location, ignoring branches
    pub fn primary_coordinate(&self) -> Option<Coordinate> {
        Coordinate::from_parts(self.latitude, self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn category_parses_case_insensitively() {
        assert_eq!(Category::Food, "food".parse().unwrap());
        assert_eq!(Category::Gaming, " Gaming ".parse().unwrap());
        assert!(matches!("cars".parse::<Category>(), Err(BlogsphereError::UnknownCategory(c)) if c == "cars"));
    }

    #[test]
    fn category_serializes_lowercase() {
        assert_eq!(json!("restaurant"), serde_json::to_value(Category::Restaurant).unwrap());
        for c in Category::ALL {
            assert_eq!(json!(c.as_str()), serde_json::to_value(c).unwrap());
        }
    }

    #[test]
    fn sparse_post_document_deserializes() {
        let post: Post = serde_json::from_value(json!({
            "_id": "abc",
            "author": "u1",
            "category": "music",
            "title": "open mic",
            "branches": [{ "name": "downtown", "latitude": 12.9 }],
            "created": 1_700_000_000_000u64,
        })).unwrap();

        assert_eq!(None, post.primary_coordinate());
        assert_eq!(None, post.branches[0].coordinate());
        assert!(post.media.is_empty());
    }

    #[test]
    fn stored_bson_document_deserializes() {
        use mongodb::bson::{doc, from_document};

        let post: Post = from_document(doc! {
            "_id": "deal",
            "author": "u2",
            "category": "food",
            "title": "two for one",
            "offer": "2x1",
            "valid_from": 1_700_000_000_000i64,
            "valid_until": 1_700_086_400_000i64,
            "latitude": 12.97,
            "longitude": 77.59,
            "created": 1_700_000_000_000i64,
        }).unwrap();

        assert_eq!(Some(1_700_000_000_000), post.valid_from);
        assert_eq!(Some(1_700_086_400_000), post.valid_until);
        assert_eq!(1_700_000_000_000, post.created);
        assert!(post.primary_coordinate().is_some());
    }
}
