use crate::error::App;
use futures_util::future::{BoxFuture, FutureExt};
use log::debug;
use reqwest::{Client, Url};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub code: u16,
    pub body: String,
}

/// Issues GET requests. The returned future owns everything it needs so it
/// can run on a spawned task.
pub trait Transport: Send + Sync + 'static {
    fn get(&self, url: Url) -> BoxFuture<'static, Result<HttpReply, App>>;
}

#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, App> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: Url) -> BoxFuture<'static, Result<HttpReply, App>> {
        let client = self.client.clone();
        async move {
            debug!("GET {url}");
            let response = client.get(url).send().await?;
            let code = response.status().as_u16();
            let body = response.text().await?;
            Ok(HttpReply { code, body })
        }
        .boxed()
    }
}
