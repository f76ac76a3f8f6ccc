use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{StatusCode, Url};

use crate::model::config::HttpConfig;
use crate::model::habit::{Habit, HabitInput, HabitPatch};
use crate::store::{HabitStore, StoreError};

/// Habit store backed by a remote collection endpoint.
///
/// Talks JSON to `{base_url}/{collection}` and `{base_url}/{collection}/{id}`,
/// authenticating with the `x-api-user`, `x-api-key` and `x-client` headers.
/// Calls block until the endpoint answers or the configured timeout expires.
pub struct HttpStore {
    client: Client,
    collection_url: Url,
}

impl HttpStore {
    pub fn new(config: &HttpConfig) -> Result<Self, StoreError> {
        if config.base_url.trim().is_empty() {
            return Err(StoreError::Config(
                "store.http.base_url is not set".to_string(),
            ));
        }
        let collection_url = Url::parse(&collection_url(&config.base_url, &config.collection))
            .map_err(|e| StoreError::Config(format!("store.http.base_url: {}", e)))?;
        if collection_url.cannot_be_a_base() {
            return Err(StoreError::Config(format!(
                "store.http.base_url is not a base URL: {}",
                config.base_url
            )));
        }

        let mut headers = HeaderMap::new();
        insert_header(&mut headers, "x-api-user", &config.user_id)?;
        insert_header(&mut headers, "x-api-key", &config.api_key)?;
        insert_header(&mut headers, "x-client", &config.client)?;

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(HttpStore {
            client,
            collection_url,
        })
    }

    /// `{collection}/{id}`, with the id percent-encoded as one path segment
    fn item_url(&self, id: &str) -> Result<Url, StoreError> {
        let mut url = self.collection_url.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::Config(format!("cannot append id to {}", self.collection_url)))?
            .pop_if_empty()
            .push(id);
        Ok(url)
    }
}

fn insert_header(headers: &mut HeaderMap, name: &'static str, value: &str) -> Result<(), StoreError> {
    if value.is_empty() {
        return Ok(());
    }
    let value = HeaderValue::from_str(value)
        .map_err(|e| StoreError::Transport(format!("invalid {} header: {}", name, e)))?;
    headers.insert(HeaderName::from_static(name), value);
    Ok(())
}

fn collection_url(base_url: &str, collection: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        collection.trim_matches('/')
    )
}

/// Turn a response into `T`, mapping non-success statuses to errors.
fn handle_response<T: serde::de::DeserializeOwned>(
    response: Response,
    id: Option<&str>,
) -> Result<T, StoreError> {
    if response.status() == StatusCode::NOT_FOUND {
        return Err(StoreError::NotFound(id.unwrap_or("collection").to_string()));
    }
    if !response.status().is_success() {
        let status = response.status().as_u16();
        let message = response.text().unwrap_or_default();
        return Err(StoreError::Status { status, message });
    }
    let text = response.text()?;
    let body = serde_json::from_str(&text)?;
    Ok(body)
}

impl HabitStore for HttpStore {
    fn list(&mut self) -> Result<Vec<Habit>, StoreError> {
        log::debug!("[STORE] GET {}", self.collection_url);
        let response = self.client.get(self.collection_url.clone()).send()?;
        handle_response(response, None)
    }

    fn create(&mut self, input: &HabitInput) -> Result<Habit, StoreError> {
        log::debug!("[STORE] POST {}", self.collection_url);
        let response = self
            .client
            .post(self.collection_url.clone())
            .json(input)
            .send()?;
        handle_response(response, None)
    }

    fn replace(&mut self, id: &str, habit: &Habit) -> Result<Habit, StoreError> {
        let url = self.item_url(id)?;
        log::debug!("[STORE] PUT {}", url);
        let response = self
            .client
            .put(url)
            .json(habit)
            .send()?;
        handle_response(response, Some(id))
    }

    fn patch(&mut self, id: &str, patch: &HabitPatch) -> Result<Habit, StoreError> {
        let url = self.item_url(id)?;
        log::debug!("[STORE] PATCH {}", url);
        let response = self
            .client
            .patch(url)
            .json(patch)
            .send()?;
        handle_response(response, Some(id))
    }

    fn delete(&mut self, id: &str) -> Result<(), StoreError> {
        let url = self.item_url(id)?;
        log::debug!("[STORE] DELETE {}", url);
        let response = self.client.delete(url).send()?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound(id.to_string()));
        }
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().unwrap_or_default();
            return Err(StoreError::Status { status, message });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_url_joins_without_double_slashes() {
        assert_eq!(
            collection_url("https://api.example.com/v3/", "/habits/"),
            "https://api.example.com/v3/habits"
        );
    }

    #[test]
    fn missing_base_url_is_rejected() {
        let config = HttpConfig::default();
        assert!(matches!(HttpStore::new(&config), Err(StoreError::Config(_))));
        let relative = HttpConfig {
            base_url: "not a url".into(),
            ..Default::default()
        };
        assert!(matches!(HttpStore::new(&relative), Err(StoreError::Config(_))));
    }

    #[test]
    fn item_url_appends_id() {
        let config = HttpConfig {
            base_url: "http://localhost:9".into(),
            user_id: "me".into(),
            api_key: "secret".into(),
            ..Default::default()
        };
        let store = HttpStore::new(&config).unwrap();
        assert_eq!(store.item_url("12").unwrap().as_str(), "http://localhost:9/habits/12");
        assert_eq!(
            store.item_url("a/b c").unwrap().as_str(),
            "http://localhost:9/habits/a%2Fb%20c"
        );
    }
}
