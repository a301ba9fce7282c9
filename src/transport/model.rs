use serde::Deserialize;
use strum::Display;

use crate::{
    components::data_table::{Pagination, SortConfig},
    reorder::Ticket,
    shared::{EntityId, OrderedEntity, RankAssignment},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Collection {
    #[strum(to_string = "banners")]
    Banners,
    #[strum(to_string = "categories")]
    Categories,
    #[strum(to_string = "career items")]
    CareerItems,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageQuery {
    pub page: u32,
    pub limit: u32,
    pub sort: Option<SortConfig>,
}

#[derive(Debug, Clone)]
pub enum Command {
    FetchPage {
        collection: Collection,
        /// Echoed back so answers to superseded fetches can be dropped.
        fetch_id: u64,
        query: PageQuery,
    },
    Reorder {
        collection: Collection,
        ticket: Ticket,
        ranks: Vec<RankAssignment>,
    },
}

#[derive(Debug, Clone)]
pub enum Event {
    PageLoaded {
        collection: Collection,
        fetch_id: u64,
        page: LoadedPage,
    },
    FetchFailed {
        collection: Collection,
        fetch_id: u64,
        message: String,
    },
    Reordered {
        collection: Collection,
        ticket: Ticket,
    },
    ReorderFailed {
        collection: Collection,
        ticket: Ticket,
        message: String,
    },
}

impl Event {
    pub fn collection(&self) -> Collection {
        match self {
            Event::PageLoaded { collection, .. }
            | Event::FetchFailed { collection, .. }
            | Event::Reordered { collection, .. }
            | Event::ReorderFailed { collection, .. } => *collection,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoadedPage {
    pub records: Records,
    pub pagination: Pagination,
}

#[derive(Debug, Clone)]
pub enum Records {
    Banners(Vec<Banner>),
    Categories(Vec<Category>),
    CareerItems(Vec<CareerItem>),
}

impl Records {
    pub fn count(&self) -> usize {
        match self {
            Records::Banners(items) => items.len(),
            Records::Categories(items) => items.len(),
            Records::CareerItems(items) => items.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Banner {
    pub id: EntityId,
    pub title: String,
    #[serde(alias = "order", alias = "sort_order", default)]
    pub rank: i64,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub link_url: Option<String>,
    #[serde(default)]
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Category {
    pub id: EntityId,
    pub name: String,
    #[serde(alias = "order", alias = "sort_order", default)]
    pub rank: i64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub item_count: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CareerItem {
    pub id: EntityId,
    pub title: String,
    #[serde(alias = "order", alias = "sort_order", default)]
    pub rank: i64,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default)]
    pub is_published: bool,
}

macro_rules! ordered_entity {
    ($($entity:ty),*) => {
        $(impl OrderedEntity for $entity {
            fn id(&self) -> &EntityId {
                &self.id
            }

            fn rank(&self) -> i64 {
                self.rank
            }
        })*
    };
}

ordered_entity!(Banner, Category, CareerItem);

/// List response of the CMS. Older endpoints name the array `data` or `list`, and
/// some return a bare array without any paging information.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(super) enum ListBody<T> {
    Paged(PageResponse<T>),
    Bare(Vec<T>),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PageResponse<T> {
    #[serde(alias = "data", alias = "list")]
    items: Vec<T>,
    #[serde(default)]
    total: Option<u64>,
    #[serde(default)]
    page: Option<u32>,
    #[serde(default)]
    limit: Option<u32>,
    #[serde(default, alias = "total_pages")]
    total_pages: Option<u32>,
}

impl<T> ListBody<T> {
    /// Splits into records and paging, filling gaps from what was asked for.
    pub(super) fn into_page(self, query: &PageQuery) -> (Vec<T>, Pagination) {
        match self {
            ListBody::Bare(items) => {
                let pagination = Pagination::new(1, items.len().max(1) as u32, items.len() as u64);
                (items, pagination)
            }
            ListBody::Paged(response) => {
                let total = response.total.unwrap_or(response.items.len() as u64);
                let limit = response.limit.unwrap_or(query.limit);
                let mut pagination =
                    Pagination::new(response.page.unwrap_or(query.page), limit, total);
                if let Some(total_pages) = response.total_pages.filter(|it| *it > 0) {
                    pagination.total_pages = total_pages;
                    pagination.page = pagination.page.clamp(1, total_pages);
                }
                (response.items, pagination)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const QUERY: PageQuery = PageQuery {
        page: 2,
        limit: 10,
        sort: None,
    };

    #[test]
    fn test_rank_field_aliases() {
        let banner: Banner =
            serde_json::from_str(r#"{"id": 3, "title": "春季招生", "order": 7}"#).expect("banner");
        let category: Category =
            serde_json::from_str(r#"{"id": "c-1", "name": "升学", "sort_order": 2}"#).expect("category");

        assert_eq!(banner.rank(), 7);
        assert_eq!(banner.id(), &EntityId::Int(3));
        assert_eq!(category.rank(), 2);
        assert_eq!(category.id(), &EntityId::Text("c-1".into()));
    }

    #[test]
    fn test_paged_response() {
        let json = r#"{
            "items": [{"id": 1, "title": "a", "order": 1}],
            "total": 31, "page": 2, "limit": 10, "totalPages": 4
        }"#;

        let body: ListBody<Banner> = serde_json::from_str(json).expect("paged body");
        let (items, pagination) = body.into_page(&QUERY);

        assert_eq!(items.len(), 1);
        assert_eq!(pagination, Pagination::new(2, 10, 31));
    }

    #[test]
    fn test_legacy_data_key_without_paging() {
        let json = r#"{"data": [{"id": 1, "name": "a"}, {"id": 2, "name": "b"}]}"#;

        let body: ListBody<Category> = serde_json::from_str(json).expect("data body");
        let (items, pagination) = body.into_page(&QUERY);

        assert_eq!(items.len(), 2);
        assert_eq!(pagination.total, 2);
        assert_eq!(pagination.page, 1);
        assert_eq!(pagination.limit, 10);
    }

    #[test]
    fn test_bare_array() {
        let json = r#"[{"id": 1, "title": "a", "sort_order": 1}]"#;

        let body: ListBody<CareerItem> = serde_json::from_str(json).expect("bare body");
        let (items, pagination) = body.into_page(&QUERY);

        assert_eq!(items[0].rank, 1);
        assert_eq!(pagination.total_pages, 1);
    }
}
