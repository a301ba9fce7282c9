use std::time::Duration;

use color_eyre::{Result, eyre::WrapErr};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::model::{Collection, ListBody, LoadedPage, PageQuery, Records};
use crate::{
    components::data_table::Pagination,
    config::{ApiConfig, CollectionsConfig, ReorderMethod},
    shared::{EntityId, RankAssignment},
};

/// REST client for the collection list and reorder endpoints.
pub struct ApiClient {
    http: Client,
    base_url: String,
    auth_token: Option<String>,
    collections: CollectionsConfig,
}

impl ApiClient {
    pub fn new(api: &ApiConfig, collections: CollectionsConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(api.timeout_secs))
            .build()
            .wrap_err("building http client")?;
        Ok(Self {
            http,
            base_url: api.base_url.clone(),
            auth_token: api.auth_token.clone(),
            collections,
        })
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    pub async fn fetch_page(&self, collection: Collection, query: &PageQuery) -> Result<LoadedPage> {
        let endpoint = self.collections.endpoint(collection);
        let mut params = vec![
            ("page", query.page.to_string()),
            ("limit", query.limit.to_string()),
        ];
        if let Some(sort) = query.sort {
            params.push(("sort_by", sort.key.to_owned()));
            params.push(("order", sort.direction.as_query().to_owned()));
        }

        let request = self.http.get(self.url(&endpoint.list_path)).query(&params);
        let response = self
            .authorized(request)
            .send()
            .await
            .wrap_err_with(|| format!("requesting {collection} list"))?
            .error_for_status()
            .wrap_err_with(|| format!("listing {collection}"))?;

        let (records, pagination) = match collection {
            Collection::Banners => {
                let (items, pagination) = decode(response, query).await?;
                (Records::Banners(items), pagination)
            }
            Collection::Categories => {
                let (items, pagination) = decode(response, query).await?;
                (Records::Categories(items), pagination)
            }
            Collection::CareerItems => {
                let (items, pagination) = decode(response, query).await?;
                (Records::CareerItems(items), pagination)
            }
        };
        Ok(LoadedPage {
            records,
            pagination,
        })
    }

    /// Any 2xx answer counts as applied; the body is not looked at.
    pub async fn reorder(&self, collection: Collection, ranks: &[RankAssignment]) -> Result<()> {
        let endpoint = self.collections.endpoint(collection);
        let url = self.url(&endpoint.reorder_path);
        let request = match endpoint.reorder_method {
            ReorderMethod::Put => self.http.put(url),
            ReorderMethod::Post => self.http.post(url),
        };

        self.authorized(request)
            .json(&reorder_body(&endpoint.rank_field, ranks))
            .send()
            .await
            .wrap_err_with(|| format!("sending {collection} order"))?
            .error_for_status()
            .wrap_err_with(|| format!("reordering {collection}"))?;
        Ok(())
    }
}

async fn decode<T: DeserializeOwned>(
    response: Response,
    query: &PageQuery,
) -> Result<(Vec<T>, Pagination)> {
    let body: ListBody<T> = response.json().await.wrap_err("decoding list response")?;
    Ok(body.into_page(query))
}

/// `{"items": [{"id": .., "<rank_field>": ..}, ..]}`
pub fn reorder_body(rank_field: &str, ranks: &[RankAssignment]) -> Value {
    let items = ranks
        .iter()
        .map(|it| {
            let mut item = Map::new();
            let id = match &it.id {
                EntityId::Int(id) => Value::from(*id),
                EntityId::Text(id) => Value::from(id.as_str()),
            };
            item.insert("id".into(), id);
            item.insert(rank_field.into(), Value::from(it.rank));
            Value::Object(item)
        })
        .collect();
    let mut body = Map::new();
    body.insert("items".into(), Value::Array(items));
    Value::Object(body)
}
