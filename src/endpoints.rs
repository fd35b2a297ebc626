use std::sync::Arc;

use axum::{extract::{rejection::QueryRejection, Query}, routing::get, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    area::BoundingBox,
    clone_into_closure,
    config::Config,
    db::PostSource,
    geo::Coordinate,
    nearby::{nearby_posts, validate_radius, NearbyQuery},
    pagination::{page_window, validate_page, PageInfo},
    ranking::NearbyPost,
    types::Category,
    BlogsphereError, Result,
};

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct NearbyParams {
    category: Option<String>,
    lat: Option<f64>,
    lng: Option<f64>,
    radius: Option<f64>,
    page: Option<i64>,
    page_size: Option<i64>,
}

#[derive(Serialize, Debug)]
pub struct NearbyResponse {
    posts: Vec<NearbyPost>,
    pagination: PageInfo,
}

/// a requester coordinate has to come as a valid lat/lng pair or not at all
fn requester_origin(lat: Option<f64>, lng: Option<f64>) -> Result<Option<Coordinate>> {
    match (lat, lng) {
        (None, None) => Ok(None),
        (Some(lat), Some(lng)) => Coordinate::new(lat, lng)
            .map(Some)
            .ok_or_else(|| BlogsphereError::InvalidCoordinate(format!("({lat}, {lng}) is out of range"))),
        _ => Err(BlogsphereError::InvalidCoordinate("lat and lng must be given together".to_string())),
    }
}

fn build_query(params: &NearbyParams, config: &Config) -> Result<NearbyQuery> {
    let category: Category = params.category.as_deref()
        .ok_or(BlogsphereError::MissingParameter("category"))?
        .parse()?;

    let origin = requester_origin(params.lat, params.lng)?;
    let radius = validate_radius(params.radius.unwrap_or(config.default_radius_meters))?;
    let (page, page_size) = validate_page(
        params.page.unwrap_or(1),
        params.page_size.unwrap_or(config.default_page_size as i64),
        config.max_page_size,
    )?;

    let query = NearbyQuery::new(category).within(Some(radius)).page(page, page_size);
    Ok(match origin {
        Some(origin) => query.near(origin),
        None => query,
    })
}

async fn get_nearby(source: &dyn PostSource, config: &Config, params: NearbyParams) -> Result<Json<NearbyResponse>> {
    let query = build_query(&params, config)?;

    let (page, fetched) = match &query.origin {
        Some(origin) => {
            let within = query.radius.and_then(|radius| BoundingBox::around(origin, radius));

            let corpus = source.candidates(query.category, within.as_ref()).await?;
            let fetched = corpus.len();
            (nearby_posts(corpus, &query)?, fetched)
        }
        // newest first needs no distances, so storage cuts the page itself
        None => {
            let (posts, total) = source.recent(query.category, query.page, query.page_size).await?;
            let fetched = posts.len();
            let window = posts.into_iter().map(|post| NearbyPost { post, distance: None }).collect();
            (page_window(window, total, query.page, query.page_size)?, fetched)
        }
    };

    info!(
        category = %query.category,
        ranked = query.origin.is_some(),
        fetched,
        total = page.pagination.total_count,
        page = page.pagination.page,
        "served nearby posts"
    );

    Ok(Json(NearbyResponse { posts: page.items, pagination: page.pagination }))
}

pub fn get_endpoints_router(source: Arc<dyn PostSource>, config: Config) -> axum::Router {
    axum::Router::new()
        .route("/posts/nearby", get(
            clone_into_closure! {
                (source, config)
                move |params: std::result::Result<Query<NearbyParams>, QueryRejection>| async move {
                    match params {
                        Ok(Query(params)) => get_nearby(source.as_ref(), &config, params).await,
                        Err(rejection) => Err(BlogsphereError::InvalidParameter(rejection.body_text())),
                    }
                }
            }
        ))
}

#[cfg(test)]
mod tests {
    use axum::{body::{to_bytes, Body}, http::{Request, StatusCode}};
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::{db::InMemoryPosts, ranking::tests::post};

    use super::*;

    fn router() -> axum::Router {
        let source = InMemoryPosts::new(vec![
            post("A", Category::Food, None, &[(Some(12.97), Some(77.59))], 1),
            post("B", Category::Food, Some((13.00, 77.60)), &[], 2),
            post("C", Category::Food, None, &[], 3),
            post("D", Category::Music, Some((12.97, 77.59)), &[], 4),
        ]);
        get_endpoints_router(Arc::new(source), Config::default())
    }

    async fn get_json(uri: &str) -> (StatusCode, Value) {
        let res = router()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn ids(body: &Value) -> Vec<&str> {
        body["posts"].as_array().unwrap()
            .iter()
            .map(|p| p["_id"].as_str().unwrap())
            .collect()
    }

    #[tokio::test]
    async fn ranks_by_distance() {
        let (status, body) = get_json("/posts/nearby?category=food&lat=12.97&lng=77.59&radius=50000&page=1&pageSize=10").await;

        assert_eq!(StatusCode::OK, status);
        assert_eq!(vec!["A", "B"], ids(&body));
        assert!(body["posts"][0]["distance"].as_f64().unwrap() < 1e-6);
        assert!((body["posts"][1]["distance"].as_f64().unwrap() - 3_507.0).abs() < 50.0);

        assert_eq!(2, body["pagination"]["totalCount"]);
        assert_eq!(1, body["pagination"]["totalPages"]);
        assert_eq!(false, body["pagination"]["hasNextPage"]);
        assert_eq!(false, body["pagination"]["hasPrevPage"]);
        assert_eq!(10, body["pagination"]["pageSize"]);
    }

    #[tokio::test]
    async fn default_radius_drops_farther_posts() {
        let (status, body) = get_json("/posts/nearby?category=food&lat=12.90&lng=77.59").await;

        // B is ~11.1km away, A ~7.8km
        assert_eq!(StatusCode::OK, status);
        assert_eq!(vec!["A"], ids(&body));
        assert_eq!(12, body["pagination"]["pageSize"]);
    }

    #[tokio::test]
    async fn recency_without_location() {
        let (status, body) = get_json("/posts/nearby?category=food").await;

        assert_eq!(StatusCode::OK, status);
        assert_eq!(vec!["C", "B", "A"], ids(&body));
        assert!(body["posts"].as_array().unwrap().iter().all(|p| p.get("distance").is_none()));
        assert_eq!(3, body["pagination"]["totalCount"]);
    }

    #[tokio::test]
    async fn second_page() {
        let (status, body) = get_json("/posts/nearby?category=food&page=2&pageSize=2").await;

        assert_eq!(StatusCode::OK, status);
        assert_eq!(vec!["A"], ids(&body));
        assert_eq!(true, body["pagination"]["hasPrevPage"]);
        assert_eq!(false, body["pagination"]["hasNextPage"]);
    }

    #[tokio::test]
    async fn bad_requests() {
        for uri in [
            "/posts/nearby",
            "/posts/nearby?category=cars",
            "/posts/nearby?category=food&lat=12.97",
            "/posts/nearby?category=food&lat=91&lng=0",
            "/posts/nearby?category=food&lat=0&lng=0&radius=-1",
            "/posts/nearby?category=food&page=0",
            "/posts/nearby?category=food&pageSize=0",
            "/posts/nearby?category=food&pageSize=101",
            "/posts/nearby?category=food&lat=abc&lng=1",
            "/posts/nearby?category=food&page=1.5",
        ] {
            let (status, body) = get_json(uri).await;
            assert_eq!(StatusCode::BAD_REQUEST, status, "{uri}");
            assert!(body["error"].is_string(), "{uri}");
        }
    }

    #[tokio::test]
    async fn recency_pages_match_in_memory_ordering() {
        let corpus: Vec<_> = (0..9u64)
            .map(|i| post(&format!("p{i}"), if i % 3 == 0 { Category::Tech } else { Category::Food }, None, &[], (i * 7) % 5))
            .collect();
        let source = InMemoryPosts::new(corpus.clone());

        for page_size in 1..=4 {
            for page in 1..=5 {
                let params = NearbyParams {
                    category: Some("food".to_string()),
                    page: Some(page as i64),
                    page_size: Some(page_size as i64),
                    ..Default::default()
                };
                let Json(served) = get_nearby(&source, &Config::default(), params).await.unwrap();

                let expected = nearby_posts(
                    corpus.clone(),
                    &NearbyQuery::new(Category::Food).page(page, page_size),
                ).unwrap();

                assert_eq!(expected.items, served.posts, "page {page} of {page_size}");
                assert_eq!(expected.pagination, served.pagination, "page {page} of {page_size}");
            }
        }
    }

    #[test]
    fn origin_needs_both_halves() {
        assert!(requester_origin(None, None).unwrap().is_none());
        assert!(requester_origin(Some(1.0), Some(2.0)).unwrap().is_some());
        assert!(matches!(requester_origin(None, Some(2.0)), Err(BlogsphereError::InvalidCoordinate(_))));
    }
}
