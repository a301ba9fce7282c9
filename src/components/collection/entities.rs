use ratatui::layout::Constraint;

use super::CollectionEntity;
use crate::{
    action::Page,
    components::data_table::{Column, SortKey},
    transport::{Banner, CareerItem, Category, Collection, Records},
};

fn flag(value: bool, yes: &str, no: &str) -> String {
    let text = if value { yes } else { no };
    text.to_owned()
}

fn optional(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| "-".to_owned())
}

// Column keys double as `sort_by` values for server-side sorting.

impl CollectionEntity for Banner {
    const COLLECTION: Collection = Collection::Banners;
    const PAGE: Page = Page::Banners;

    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("order", "排序", Constraint::Length(6), |it: &Banner| it.rank.to_string())
                .sortable(|it| SortKey::from(it.rank)),
            Column::new("title", "标题", Constraint::Fill(2), |it: &Banner| it.title.clone())
                .sortable(|it| SortKey::from(it.title.as_str())),
            Column::new("link_url", "链接", Constraint::Fill(3), |it: &Banner| optional(&it.link_url)),
            Column::new("is_active", "状态", Constraint::Length(6), |it: &Banner| {
                flag(it.is_active, "启用", "停用")
            })
            .sortable(|it| SortKey::from(i64::from(it.is_active))),
        ]
    }

    fn from_records(records: Records) -> Option<Vec<Self>> {
        match records {
            Records::Banners(items) => Some(items),
            _ => None,
        }
    }
}

impl CollectionEntity for Category {
    const COLLECTION: Collection = Collection::Categories;
    const PAGE: Page = Page::Categories;

    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("sort_order", "排序", Constraint::Length(6), |it: &Category| {
                it.rank.to_string()
            })
            .sortable(|it| SortKey::from(it.rank)),
            Column::new("name", "名称", Constraint::Fill(1), |it: &Category| it.name.clone())
                .sortable(|it| SortKey::from(it.name.as_str())),
            Column::new("description", "描述", Constraint::Fill(2), |it: &Category| {
                optional(&it.description)
            }),
            Column::new("item_count", "产品数", Constraint::Length(8), |it: &Category| {
                it.item_count.to_string()
            })
            .sortable(|it| SortKey::from(i64::from(it.item_count))),
        ]
    }

    fn from_records(records: Records) -> Option<Vec<Self>> {
        match records {
            Records::Categories(items) => Some(items),
            _ => None,
        }
    }
}

impl CollectionEntity for CareerItem {
    const COLLECTION: Collection = Collection::CareerItems;
    const PAGE: Page = Page::CareerItems;

    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("sort_order", "排序", Constraint::Length(6), |it: &CareerItem| {
                it.rank.to_string()
            })
            .sortable(|it| SortKey::from(it.rank)),
            Column::new("title", "标题", Constraint::Fill(2), |it: &CareerItem| it.title.clone())
                .sortable(|it| SortKey::from(it.title.as_str())),
            Column::new("category_name", "分类", Constraint::Fill(1), |it: &CareerItem| {
                optional(&it.category_name)
            })
            .sortable(|it| SortKey::from(it.category_name.as_deref().unwrap_or_default())),
            Column::new("is_published", "状态", Constraint::Length(6), |it: &CareerItem| {
                flag(it.is_published, "已发布", "草稿")
            }),
        ]
    }

    fn from_records(records: Records) -> Option<Vec<Self>> {
        match records {
            Records::CareerItems(items) => Some(items),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::shared::EntityId;

    #[test]
    fn test_records_of_other_collections_are_rejected() {
        let records = Records::Banners(vec![]);

        assert!(Category::from_records(records.clone()).is_none());
        assert_eq!(Banner::from_records(records), Some(vec![]));
    }

    #[test]
    fn test_missing_optional_cells() {
        let item = CareerItem {
            id: EntityId::Int(1),
            title: "职业测评".into(),
            rank: 1,
            category_name: None,
            is_published: false,
        };
        let cells: Vec<_> = CareerItem::columns().iter().map(|it| it.cell(&item)).collect();

        assert_eq!(cells, vec!["1", "职业测评", "-", "草稿"]);
    }
}
