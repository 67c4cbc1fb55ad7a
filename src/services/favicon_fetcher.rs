//! Favicon retrieval for service URLs.
//!
//! A fetch is a single best-effort GET of `/favicon.ico` on the service's
//! host: no retries, no cancellation. Failures never propagate past this
//! module's callback API, which substitutes the placeholder icon.

use std::future::Future;
use std::time::Duration;

use reqwest::Url;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::types::errors::FaviconError;
use crate::types::icon::Icon;
use crate::types::settings::NetworkSettings;

/// Rewrites user input into an https URL.
///
/// `http://` becomes `https://`, a missing scheme gets `https://`, anything
/// already https is returned trimmed.
pub fn to_https_url(input: &str) -> String {
    let trimmed = input.trim();
    if let Some(rest) = strip_scheme(trimmed, "https://") {
        format!("https://{}", rest)
    } else if let Some(rest) = strip_scheme(trimmed, "http://") {
        format!("https://{}", rest)
    } else {
        format!("https://{}", trimmed)
    }
}

fn strip_scheme<'a>(input: &'a str, scheme: &str) -> Option<&'a str> {
    let prefix = input.get(..scheme.len())?;
    if prefix.eq_ignore_ascii_case(scheme) {
        input.get(scheme.len()..)
    } else {
        None
    }
}

/// The `/favicon.ico` URL on the same scheme, host and port as `service_url`.
pub fn favicon_url(service_url: &str) -> Result<Url, FaviconError> {
    let mut url =
        Url::parse(service_url).map_err(|e| FaviconError::InvalidUrl(format!("{}: {}", service_url, e)))?;
    if url.host_str().is_none() {
        return Err(FaviconError::InvalidUrl(service_url.to_string()));
    }
    url.set_path("/favicon.ico");
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

/// Something that can fetch a favicon for a service URL.
pub trait NetworkServiceTrait {
    fn fetch_favicon(&self, service_url: &str) -> impl Future<Output = Result<Icon, FaviconError>> + Send;
}

/// `reqwest`-backed favicon fetcher. Cloning shares the connection pool.
#[derive(Clone)]
pub struct FaviconFetcher {
    client: reqwest::Client,
}

impl FaviconFetcher {
    /// Builds a fetcher with the configured timeout and user agent.
    pub fn new(settings: &NetworkSettings) -> Result<Self, FaviconError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.favicon_timeout_secs))
            .user_agent(settings.user_agent.clone())
            .build()
            .map_err(|e| FaviconError::NetworkError(e.to_string()))?;
        Ok(Self { client })
    }
}

impl NetworkServiceTrait for FaviconFetcher {
    /// GETs the favicon of `service_url` and decodes it.
    ///
    /// `service_url` is used as-is; callers normalize it with `to_https_url` first.
    async fn fetch_favicon(&self, service_url: &str) -> Result<Icon, FaviconError> {
        let url = favicon_url(service_url)?;
        log::debug!("fetching favicon from {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| FaviconError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FaviconError::NetworkError(format!("{} returned {}", url, status)));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FaviconError::NetworkError(e.to_string()))?;

        Icon::decode(body.to_vec())
    }
}

/// Fetches a favicon, degrading to the placeholder on any failure.
pub async fn fetch_favicon_or_placeholder<N: NetworkServiceTrait>(network: &N, service_url: &str) -> Icon {
    match network.fetch_favicon(service_url).await {
        Ok(icon) => icon,
        Err(e) => {
            log::warn!("favicon fetch for {} failed, using placeholder: {}", service_url, e);
            Icon::placeholder()
        }
    }
}

/// Starts a fetch for user-entered `url` on `handle` and returns immediately.
///
/// `on_complete` runs exactly once, on the runtime, with either the fetched
/// icon or the placeholder.
pub fn fetch_favicon_with<N, F>(network: &N, handle: &Handle, url: &str, on_complete: F) -> JoinHandle<()>
where
    N: NetworkServiceTrait + Clone + Send + Sync + 'static,
    F: FnOnce(Icon) + Send + 'static,
{
    let network = network.clone();
    let https_url = to_https_url(url);
    handle.spawn(async move {
        let icon = fetch_favicon_or_placeholder(&network, &https_url).await;
        on_complete(icon);
    })
}
