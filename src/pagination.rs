use serde::Serialize;

use crate::{BlogsphereError, Result};

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub page: usize,
    pub page_size: usize,
    pub total_count: usize,
    pub total_pages: usize,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: PageInfo,
}

/// Checks a 1-based page number and a page size, rejecting anything below 1.
///
/// Takes signed input so that `0` and negatives from a query string surface as
/// errors instead of being clamped.
pub fn validate_page(page: i64, page_size: i64, max_page_size: usize) -> Result<(usize, usize)> {
    if page < 1 {
        return Err(BlogsphereError::InvalidPage(page));
    }
    if page_size < 1 {
        return Err(BlogsphereError::InvalidPageSize(page_size));
    }
    if page_size as u64 > max_page_size as u64 {
        return Err(BlogsphereError::PageSizeTooLarge(page_size, max_page_size));
    }

    Ok((page as usize, page_size as usize))
}

fn check_page(page: usize, page_size: usize) -> Result<()> {
    if page < 1 {
        return Err(BlogsphereError::InvalidPage(page as i64));
    }
    if page_size < 1 {
        return Err(BlogsphereError::InvalidPageSize(page_size as i64));
    }
    Ok(())
}

fn page_info(page: usize, page_size: usize, total_count: usize) -> PageInfo {
    let total_pages = total_count.div_ceil(page_size);
    PageInfo {
        page,
        page_size,
        total_count,
        total_pages,
        has_next_page: page < total_pages,
        has_prev_page: page > 1,
    }
}

/// Slices `[(page - 1) * page_size, page * page_size)` out of `items`.
/// A page past the end is empty, not an error.
pub fn paginate<T>(items: Vec<T>, page: usize, page_size: usize) -> Result<Page<T>> {
    check_page(page, page_size)?;

    let total_count = items.len();
    let start = (page - 1).saturating_mul(page_size).min(total_count);

    Ok(Page {
        items: items.into_iter().skip(start).take(page_size).collect(),
        pagination: page_info(page, page_size, total_count),
    })
}

/// Wraps a page that storage already cut out, given the size of the whole set.
pub fn page_window<T>(items: Vec<T>, total_count: usize, page: usize, page_size: usize) -> Result<Page<T>> {
    check_page(page, page_size)?;

    Ok(Page {
        items,
        pagination: page_info(page, page_size, total_count),
    })
}
