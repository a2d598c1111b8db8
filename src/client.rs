use crate::errors::ClientError;
use crate::models::{Activities, MessageResponse};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// The three backend calls the page depends on.
#[async_trait]
pub trait DataClient: Send + Sync + 'static {
    async fn list_activities(&self) -> Result<Activities, ClientError>;

    async fn sign_up(&self, activity: &str, email: &str) -> Result<MessageResponse, ClientError>;

    async fn unregister(&self, activity: &str, email: &str) -> Result<MessageResponse, ClientError>;
}

#[async_trait]
impl<T: DataClient + ?Sized> DataClient for Arc<T> {
    async fn list_activities(&self) -> Result<Activities, ClientError> {
        (**self).list_activities().await
    }

    async fn sign_up(&self, activity: &str, email: &str) -> Result<MessageResponse, ClientError> {
        (**self).sign_up(activity, email).await
    }

    async fn unregister(&self, activity: &str, email: &str) -> Result<MessageResponse, ClientError> {
        (**self).unregister(activity, email).await
    }
}

#[derive(Debug, Clone, Copy)]
enum RosterAction {
    Signup,
    Unregister,
}

impl RosterAction {
    fn segment(self) -> &'static str {
        match self {
            RosterAction::Signup => "signup",
            RosterAction::Unregister => "unregister",
        }
    }
}

/// `DataClient` over HTTP with reqwest.
#[derive(Clone)]
pub struct HttpDataClient {
    http: Client,
    base: String,
}

impl HttpDataClient {
    pub fn new(base: &Url) -> Self {
        Self::with_client(Client::new(), base)
    }

    pub fn with_client(http: Client, base: &Url) -> Self {
        Self {
            http,
            base: base.as_str().trim_end_matches('/').to_string(),
        }
    }

    pub fn activities_url(&self) -> String {
        format!("{}/activities", self.base)
    }

    fn roster_url(&self, activity: &str, email: &str, action: RosterAction) -> String {
        format!(
            "{}/activities/{}/{}?email={}",
            self.base,
            urlencoding::encode(activity),
            action.segment(),
            urlencoding::encode(email)
        )
    }

    async fn post_roster(
        &self,
        activity: &str,
        email: &str,
        action: RosterAction,
    ) -> Result<MessageResponse, ClientError> {
        let url = self.roster_url(activity, email, action);
        debug!(%url, "posting roster change");

        let response = self.http.post(&url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        let value: Value = serde_json::from_str(&body)?;

        if status.is_success() {
            Ok(serde_json::from_value(value)?)
        } else {
            debug!(%status, "backend rejected roster change");
            let detail = value
                .get("detail")
                .and_then(Value::as_str)
                .map(str::to_owned);
            Err(ClientError::request(detail))
        }
    }
}

#[async_trait]
impl DataClient for HttpDataClient {
    async fn list_activities(&self) -> Result<Activities, ClientError> {
        let response = self.http.get(self.activities_url()).send().await?;
        let body = response.text().await?;
        Ok(Activities::from_json(&body)?)
    }

    async fn sign_up(&self, activity: &str, email: &str) -> Result<MessageResponse, ClientError> {
        self.post_roster(activity, email, RosterAction::Signup).await
    }

    async fn unregister(&self, activity: &str, email: &str) -> Result<MessageResponse, ClientError> {
        self.post_roster(activity, email, RosterAction::Unregister).await
    }
}
