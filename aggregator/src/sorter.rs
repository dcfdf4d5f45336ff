use crate::types::{Post, SortDirection, SortField};
use std::cmp::Ordering;

/// Orders posts in place by `sort_by` and `direction`.
///
/// The sort is stable, posts comparing equal keep their input order in both
/// directions.
pub fn sort_posts(posts: &mut [Post], sort_by: SortField, direction: SortDirection) {
    posts.sort_by(|a, b| {
        let ordering = compare_by(a, b, sort_by);
        match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}

fn compare_by(a: &Post, b: &Post, sort_by: SortField) -> Ordering {
    match sort_by {
        SortField::Id => a.id.cmp(&b.id),
        SortField::Reads => a.reads.cmp(&b.reads),
        SortField::Likes => a.likes.cmp(&b.likes),
        SortField::Popularity => a.popularity.total_cmp(&b.popularity),
    }
}
