//! Blocking bridge over the asynchronous `reqwest` client.
//!
//! The ports in `sojourn-core` are synchronous so the engine stays embeddable
//! anywhere. HTTP adapters own a current-thread Tokio runtime and block on it
//! for each request, borrowing the caller's runtime when they are already
//! running inside a multi-threaded one.

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use thiserror::Error;
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};
use url::Url;

/// Error raised while constructing an HTTP-backed adapter.
#[derive(Debug, Error)]
pub enum ClientBuildError {
    /// A configured base URL could not be parsed.
    #[error("invalid base URL {url:?}: {source}")]
    BaseUrl {
        /// The rejected URL.
        url: String,
        /// Parser failure.
        #[source]
        source: url::ParseError,
    },
    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
    /// Failed to build the Tokio runtime.
    #[error("failed to build Tokio runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

/// A `reqwest` client paired with the runtime that drives it.
pub(crate) struct BlockingHttp {
    client: Client,
    runtime: Runtime,
    timeout: Duration,
}

impl std::fmt::Debug for BlockingHttp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockingHttp")
            .field("client", &self.client)
            .field("runtime", &"<tokio::runtime::Runtime>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl BlockingHttp {
    pub(crate) fn new(user_agent: &str, timeout: Duration) -> Result<Self, ClientBuildError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .map_err(ClientBuildError::HttpClient)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(ClientBuildError::Runtime)?;
        Ok(Self {
            client,
            runtime,
            timeout,
        })
    }

    pub(crate) const fn client(&self) -> &Client {
        &self.client
    }

    pub(crate) const fn timeout_secs(&self) -> u64 {
        self.timeout.as_secs()
    }

    /// Drive `future` to completion from synchronous code.
    ///
    /// Inside a multi-threaded runtime the caller's handle is used through
    /// [`tokio::task::block_in_place`]. Otherwise, including from a
    /// current-thread runtime, the adapter's own runtime runs the future;
    /// that may deadlock if the caller's runtime drives IO this request
    /// depends on.
    pub(crate) fn block_on<F: Future>(&self, future: F) -> F::Output {
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(future))
            }
            _ => self.runtime.block_on(future),
        }
    }
}

/// Parse and normalise a configured base URL, dropping any trailing slash.
pub(crate) fn parse_base_url(raw: &str) -> Result<Url, ClientBuildError> {
    Url::parse(raw.trim_end_matches('/')).map_err(|source| ClientBuildError::BaseUrl {
        url: raw.to_owned(),
        source,
    })
}

/// Join `segment` onto `base`, keeping any path the base already carries.
pub(crate) fn endpoint(base: &Url, segment: &str) -> String {
    format!(
        "{}/{}",
        base.as_str().trim_end_matches('/'),
        segment.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("http://osrm.example.com", "http://osrm.example.com/table")]
    #[case("http://osrm.example.com/", "http://osrm.example.com/table")]
    #[case("https://api.example.com/v1", "https://api.example.com/v1/table")]
    #[case("https://api.example.com/v1/", "https://api.example.com/v1/table")]
    fn joins_segments_without_double_slashes(#[case] base: &str, #[case] expected: &str) {
        let url = parse_base_url(base).expect("base URL parses");
        assert_eq!(endpoint(&url, "/table"), expected);
    }

    #[rstest]
    fn rejects_relative_base_urls() {
        let err = parse_base_url("/osrm").expect_err("relative URL");
        assert!(matches!(err, ClientBuildError::BaseUrl { .. }));
    }

    #[rstest]
    fn block_on_runs_outside_any_runtime() {
        let http = BlockingHttp::new("test-agent/1.0", Duration::from_secs(1)).expect("client");
        assert_eq!(http.block_on(async { 41 + 1 }), 42);
        assert_eq!(http.timeout_secs(), 1);
    }
}
