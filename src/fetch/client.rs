use async_trait::async_trait;
use reqwest::{Request, Response};

/// The one network seam of the pipeline: execute a request, hand back the response.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}
