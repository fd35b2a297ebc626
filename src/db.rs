use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{bson::{doc, Document}, Client, Collection, Database};
use tracing::{debug, error, info};

use crate::{area::BoundingBox, config::Config, ranking::order_by_recency, types::{Category, Post}, Result};

/// Where the nearby query gets its candidates from.
#[async_trait]
pub trait PostSource: Send + Sync {
    /// Every post in `category`, optionally narrowed to those with their own
    /// coordinate or a branch inside `within`. The box is a prefilter only;
    /// returning extra posts is fine, dropping one inside the box is not.
    async fn candidates(&self, category: Category, within: Option<&BoundingBox>) -> Result<Vec<Post>>;

    /// One page of `category`, newest first, plus the category's total count.
    /// Only the requested page is read.
    async fn recent(&self, category: Category, page: usize, page_size: usize) -> Result<(Vec<Post>, usize)>;
}

/// posts before `page`; `page` is 1-based
fn page_offset(page: usize, page_size: usize) -> usize {
    page.saturating_sub(1).saturating_mul(page_size)
}

#[derive(Clone)]
pub struct BlogsphereDB {
    pub db: Database
}
impl BlogsphereDB {
    pub async fn new(config: &Config) -> Result<Self> {
        let client = Client::with_uri_str(&config.mongodb_uri).await?;
        info!(database = %config.mongodb_database, "connected to mongodb");

        Ok(Self { db: client.database(&config.mongodb_database) })
    }

    fn posts(&self) -> Collection<Post> {
        self.db.collection::<Post>("posts")
    }
}

pub fn candidate_filter(category: Category, within: Option<&BoundingBox>) -> Document {
    let mut filter = doc! { "category": category.as_str() };
    if let Some(bbox) = within {
        filter.extend(bbox.as_post_filter());
    }
    filter
}

#[async_trait]
impl PostSource for BlogsphereDB {
    async fn candidates(&self, category: Category, within: Option<&BoundingBox>) -> Result<Vec<Post>> {
        let filter = candidate_filter(category, within);
        debug!(?filter, "fetching candidate posts");

        let cursor = match self.posts().find(filter).sort(doc! { "created": -1 }).await {
            Ok(cursor) => cursor,
            Err(mongo_err) => {
                error!(%category, "error querying posts: {}", mongo_err);
                return Err(mongo_err.into());
            }
        };

        match cursor.try_collect().await {
            Ok(posts) => Ok(posts),
            Err(mongo_err) => {
                error!(%category, "error reading posts cursor: {}", mongo_err);
                Err(mongo_err.into())
            }
        }
    }

    async fn recent(&self, category: Category, page: usize, page_size: usize) -> Result<(Vec<Post>, usize)> {
        let filter = candidate_filter(category, None);

        let total = self.posts().count_documents(filter.clone()).await
            .inspect_err(|mongo_err| error!(%category, "error counting posts: {}", mongo_err))?;

        // _id breaks ties so skip/limit pages never overlap
        let cursor = self.posts()
            .find(filter)
            .sort(doc! { "created": -1, "_id": 1 })
            .skip(page_offset(page, page_size) as u64)
            .limit(page_size as i64)
            .await
            .inspect_err(|mongo_err| error!(%category, page, "error querying recent posts: {}", mongo_err))?;

        let posts: Vec<Post> = cursor.try_collect().await
            .inspect_err(|mongo_err| error!(%category, page, "error reading recent posts cursor: {}", mongo_err))?;

        debug!(%category, page, fetched = posts.len(), total, "fetched recent posts");
        Ok((posts, total as usize))
    }
}

/// Fixed corpus held in memory, applying the same prefilter as the mongodb query.
#[derive(Clone, Debug, Default)]
pub struct InMemoryPosts {
    pub posts: Vec<Post>
}
impl InMemoryPosts {
    pub fn new(posts: Vec<Post>) -> Self {
        Self { posts }
    }
}

#[async_trait]
impl PostSource for InMemoryPosts {
    async fn candidates(&self, category: Category, within: Option<&BoundingBox>) -> Result<Vec<Post>> {
        Ok(
            self.posts.iter()
                .filter(|post| post.category == category)
                .filter(|post| within.map_or(true, |bbox| bbox.admits(post)))
                .cloned()
                .collect()
        )
    }

    async fn recent(&self, category: Category, page: usize, page_size: usize) -> Result<(Vec<Post>, usize)> {
        let in_category = self.posts.iter()
            .filter(|post| post.category == category)
            .cloned()
            .collect();

        let ordered = order_by_recency(in_category);
        let total = ordered.len();

        Ok((
            ordered.into_iter()
                .skip(page_offset(page, page_size))
                .take(page_size)
                .map(|ranked| ranked.post)
                .collect(),
            total,
        ))
    }
}
