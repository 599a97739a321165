//! REST client for the Persistence API.

use crate::config::ClientConfig;
use crate::error::ApiClientError;
use crate::types::{
    item_id_query, AddItemRequest, ApiErrorBody, CompleteListRequest, CompleteListResponse,
    CreateListRequest, CreateStoreRequest, DuplicateListRequest, ItemResponse, ListDetailResponse,
    ListResponse, PatchItemRequest, StoreResponse, SuggestionsResponse,
};
use async_trait::async_trait;
use basket_core::{EntityIdType, ItemId, ListId, ShoppingList, StoreId};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::multipart::{Form, Part};
use std::time::Duration;

/// The Persistence API as the synchronization layer sees it.
///
/// A trait so the sync layer can run against a mock in tests; the real
/// implementation is [`RestClient`].
#[async_trait]
pub trait PersistenceApi: Send + Sync {
    async fn list_lists(&self) -> Result<Vec<ShoppingList>, ApiClientError>;
    async fn get_list(&self, list_id: ListId) -> Result<ListDetailResponse, ApiClientError>;
    async fn create_list(&self, req: &CreateListRequest) -> Result<ListResponse, ApiClientError>;
    async fn add_item(&self, req: &AddItemRequest) -> Result<ItemResponse, ApiClientError>;
    async fn patch_item(
        &self,
        item_id: ItemId,
        req: &PatchItemRequest,
    ) -> Result<ItemResponse, ApiClientError>;
    async fn delete_item(&self, item_id: ItemId) -> Result<(), ApiClientError>;
    async fn complete_list(
        &self,
        req: &CompleteListRequest,
    ) -> Result<CompleteListResponse, ApiClientError>;
    async fn duplicate_list(
        &self,
        req: &DuplicateListRequest,
    ) -> Result<ListResponse, ApiClientError>;
    async fn fetch_suggestions(&self) -> Result<SuggestionsResponse, ApiClientError>;
    async fn scan_receipt(
        &self,
        name: &str,
        store_id: Option<StoreId>,
        image: Vec<u8>,
        file_name: &str,
    ) -> Result<ListResponse, ApiClientError>;
    async fn create_store(&self, req: &CreateStoreRequest)
        -> Result<StoreResponse, ApiClientError>;
}

#[derive(Clone)]
pub struct RestClient {
    client: reqwest::Client,
    base_url: String,
    auth_header: HeaderMap,
}

impl RestClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ApiClientError> {
        let timeout = Duration::from_millis(config.request_timeout_ms);
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        let auth_header = build_auth_headers(&config.auth)?;
        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            auth_header,
        })
    }

    async fn get_json<T>(&self, path: &str) -> Result<T, ApiClientError>
    where
        T: serde::de::DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .get(url)
            .headers(self.auth_header.clone())
            .send()
            .await?;
        parse_response(response).await
    }

    async fn post_json<T, B>(&self, path: &str, body: &B) -> Result<T, ApiClientError>
    where
        T: serde::de::DeserializeOwned,
        B: serde::Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .post(url)
            .headers(self.auth_header.clone())
            .json(body)
            .send()
            .await?;
        parse_response(response).await
    }
}

#[async_trait]
impl PersistenceApi for RestClient {
    async fn list_lists(&self) -> Result<Vec<ShoppingList>, ApiClientError> {
        self.get_json("/lists").await
    }

    async fn get_list(&self, list_id: ListId) -> Result<ListDetailResponse, ApiClientError> {
        let path = format!("/lists/{}", list_id.as_uuid());
        self.get_json(&path).await
    }

    async fn create_list(&self, req: &CreateListRequest) -> Result<ListResponse, ApiClientError> {
        self.post_json("/lists", req).await
    }

    async fn add_item(&self, req: &AddItemRequest) -> Result<ItemResponse, ApiClientError> {
        self.post_json("/lists/items", req).await
    }

    async fn patch_item(
        &self,
        item_id: ItemId,
        req: &PatchItemRequest,
    ) -> Result<ItemResponse, ApiClientError> {
        let url = format!("{}/lists/items", self.base_url);
        let response = self
            .client
            .patch(url)
            .headers(self.auth_header.clone())
            .query(&item_id_query(item_id))
            .json(req)
            .send()
            .await?;
        parse_response(response).await
    }

    async fn delete_item(&self, item_id: ItemId) -> Result<(), ApiClientError> {
        let url = format!("{}/lists/items", self.base_url);
        let response = self
            .client
            .delete(url)
            .headers(self.auth_header.clone())
            .query(&item_id_query(item_id))
            .send()
            .await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(error_from_response(response).await)
        }
    }

    async fn complete_list(
        &self,
        req: &CompleteListRequest,
    ) -> Result<CompleteListResponse, ApiClientError> {
        self.post_json("/lists/complete", req).await
    }

    async fn duplicate_list(
        &self,
        req: &DuplicateListRequest,
    ) -> Result<ListResponse, ApiClientError> {
        self.post_json("/lists/duplicate", req).await
    }

    async fn fetch_suggestions(&self) -> Result<SuggestionsResponse, ApiClientError> {
        self.get_json("/lists/suggestions").await
    }

    /// Upload a receipt photo for OCR extraction. This is the privileged
    /// action guarded by the external quota/ad gate; rejections come back as
    /// gate error codes and surface as [`ApiClientError::Gate`].
    async fn scan_receipt(
        &self,
        name: &str,
        store_id: Option<StoreId>,
        image: Vec<u8>,
        file_name: &str,
    ) -> Result<ListResponse, ApiClientError> {
        let url = format!("{}/lists/scan-receipt", self.base_url);
        let part = Part::bytes(image).file_name(file_name.to_string());
        let mut form = Form::new()
            .part("image", part)
            .text("name", name.to_string());
        if let Some(store_id) = store_id {
            form = form.text("store_id", store_id.as_uuid().to_string());
        }

        let response = self
            .client
            .post(url)
            .headers(self.auth_header.clone())
            .multipart(form)
            .send()
            .await?;
        parse_response(response).await
    }

    async fn create_store(
        &self,
        req: &CreateStoreRequest,
    ) -> Result<StoreResponse, ApiClientError> {
        self.post_json("/stores", req).await
    }
}

async fn parse_response<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ApiClientError> {
    let status = response.status();
    if status.is_success() {
        Ok(response.json::<T>().await?)
    } else {
        Err(error_from_response(response).await)
    }
}

async fn error_from_response(response: reqwest::Response) -> ApiClientError {
    let status = response.status();
    let text = match response.text().await {
        Ok(text) => text,
        Err(err) => return ApiClientError::Http(err),
    };
    if let Ok(body) = serde_json::from_str::<ApiErrorBody>(&text) {
        if let Some(gate) = body.as_gate_error() {
            return ApiClientError::Gate(gate);
        }
        return ApiClientError::Server {
            code: body.code,
            message: body.message,
        };
    }
    ApiClientError::InvalidResponse(format!("HTTP {}: {}", status.as_u16(), text))
}

fn build_auth_headers(auth: &crate::config::AuthConfig) -> Result<HeaderMap, ApiClientError> {
    let mut headers = HeaderMap::new();
    if let Some(api_key) = &auth.api_key {
        headers.insert(
            HeaderName::from_static("x-api-key"),
            HeaderValue::from_str(api_key).map_err(|e| ApiClientError::Config(e.to_string()))?,
        );
    }
    if let Some(token) = &auth.bearer_token {
        let value = format!("Bearer {}", token);
        headers.insert(
            HeaderName::from_static("authorization"),
            HeaderValue::from_str(&value).map_err(|e| ApiClientError::Config(e.to_string()))?,
        );
    }
    Ok(headers)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuthConfig;

    #[test]
    fn test_auth_headers_carry_both_credentials() {
        let auth = AuthConfig {
            api_key: Some("key".to_string()),
            bearer_token: Some("token".to_string()),
        };
        let headers = build_auth_headers(&auth).unwrap();
        assert_eq!(headers.get("x-api-key").unwrap(), "key");
        assert_eq!(headers.get("authorization").unwrap(), "Bearer token");
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let config: ClientConfig = toml::from_str(
            r#"
            api_base_url = "https://api.example.com/"
            request_timeout_ms = 5000
            max_receipt_image_bytes = 10000000

            [auth]
            api_key = "key"
            "#,
        )
        .unwrap();
        let client = RestClient::new(&config).unwrap();
        assert_eq!(client.base_url, "https://api.example.com");
    }
}
