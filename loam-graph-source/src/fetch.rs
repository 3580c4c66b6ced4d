//! HTTP fetcher with an explicit redirect state machine.
//!
//! The client is built with `redirect::Policy::none()`: every hop is decided
//! here, not by the HTTP library. [`FetchState`] makes the walk visible and
//! testable; the driver loop in [`HttpFetcher::fetch`] maps each state to the
//! next until a terminal state converts to a `Result`.
//!
//! The bound is a constant, not a knob: issuing request number
//! [`REQUEST_LIMIT`]` + 1` is never attempted. There is no retry, timeout or
//! backoff at this layer.

use tracing::{debug, warn};

use crate::error::{Result, SourceError};

/// Hard bound on requests per fetch, the initial request included.
pub const REQUEST_LIMIT: u32 = 10;

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

/// One step of the redirect walk.
#[derive(Debug)]
pub enum FetchState {
    /// About to issue a request; `requests_sent` counts completed ones.
    Requesting { uri: String, requests_sent: u32 },
    /// A redirect response named a target to follow.
    Redirecting { target: String, requests_sent: u32 },
    /// Terminal: a 2xx response with its body.
    Succeeded(FetchResult),
    /// Terminal: a non-success, non-redirect status (or a redirect with no
    /// usable `Location`).
    FailedStatus { status: u16, uri: String },
    /// Terminal: connect, read or decode failure.
    FailedTransport { uri: String, error: reqwest::Error },
    /// Terminal: the next request would exceed [`REQUEST_LIMIT`].
    FailedTooManyRedirects { uri: String },
}

/// Successful fetch outcome.
#[derive(Debug, Clone)]
pub struct FetchResult {
    /// URI that produced the 2xx response.
    pub final_uri: String,
    pub status: u16,
    /// `Content-Type` with parameters stripped, when the server sent one.
    pub media_type: Option<String>,
    pub body: Vec<u8>,
    /// Redirect targets followed, in order; empty for a direct response.
    pub hops: Vec<String>,
}

// ---------------------------------------------------------------------------
// HttpFetcher
// ---------------------------------------------------------------------------

/// GET-only fetcher that owns redirect handling.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    http: reqwest::Client,
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::with_user_agent(None)
    }

    /// Create a fetcher, optionally with a `User-Agent` header on every
    /// request.
    pub fn with_user_agent(user_agent: Option<&str>) -> Self {
        let mut builder = reqwest::Client::builder().redirect(reqwest::redirect::Policy::none());
        if let Some(user_agent) = user_agent {
            builder = builder.user_agent(user_agent);
        }
        // Same failure surface as `reqwest::Client::new()`: only a broken TLS
        // backend can fail here.
        let http = builder.build().expect("failed to initialize HTTP client");
        HttpFetcher { http }
    }

    /// Fetch `uri`, sending `accept` unchanged on every hop.
    pub async fn fetch(&self, uri: &str, accept: &str) -> Result<FetchResult> {
        let origin = uri.to_string();
        let mut hops: Vec<String> = Vec::new();
        let mut state = FetchState::Requesting {
            uri: origin.clone(),
            requests_sent: 0,
        };

        loop {
            state = match state {
                FetchState::Requesting { uri, requests_sent } => {
                    self.step(uri, requests_sent, accept).await
                }
                FetchState::Redirecting {
                    target,
                    requests_sent,
                } => {
                    if requests_sent >= REQUEST_LIMIT {
                        FetchState::FailedTooManyRedirects {
                            uri: origin.clone(),
                        }
                    } else {
                        hops.push(target.clone());
                        FetchState::Requesting {
                            uri: target,
                            requests_sent,
                        }
                    }
                }
                FetchState::Succeeded(mut result) => {
                    result.hops = hops;
                    debug!(
                        uri = %result.final_uri,
                        status = result.status,
                        hops = result.hops.len(),
                        bytes = result.body.len(),
                        "fetch succeeded"
                    );
                    return Ok(result);
                }
                FetchState::FailedStatus { status, uri } => {
                    warn!(uri = %uri, status, "fetch failed with terminal status");
                    return Err(SourceError::status(status, uri));
                }
                FetchState::FailedTransport { uri, error } => {
                    warn!(uri = %uri, error = %error, "fetch failed in transport");
                    return Err(SourceError::transport(uri, error));
                }
                FetchState::FailedTooManyRedirects { uri } => {
                    warn!(uri = %uri, limit = REQUEST_LIMIT, "redirect chain exceeded request limit");
                    return Err(SourceError::too_many_redirects(REQUEST_LIMIT, uri));
                }
            };
        }
    }

    /// Issue one GET and classify the response into the next state.
    async fn step(&self, uri: String, requests_sent: u32, accept: &str) -> FetchState {
        debug!(uri = %uri, request = requests_sent + 1, "fetching");
        let response = match self
            .http
            .get(&uri)
            .header(reqwest::header::ACCEPT, accept)
            .send()
            .await
        {
            Ok(response) => response,
            Err(error) => return FetchState::FailedTransport { uri, error },
        };
        let requests_sent = requests_sent + 1;

        let status = response.status().as_u16();
        match status {
            200..=299 => {
                let media_type = content_type(&response);
                match response.bytes().await {
                    Ok(body) => FetchState::Succeeded(FetchResult {
                        final_uri: uri,
                        status,
                        media_type,
                        body: body.to_vec(),
                        hops: Vec::new(),
                    }),
                    Err(error) => FetchState::FailedTransport { uri, error },
                }
            }
            301 | 302 | 303 | 307 | 308 => match redirect_target(&response, &uri) {
                Some(target) => {
                    debug!(uri = %uri, target = %target, status, "following redirect");
                    FetchState::Redirecting {
                        target,
                        requests_sent,
                    }
                }
                // A redirect without a usable Location is a protocol failure.
                None => FetchState::FailedStatus { status, uri },
            },
            _ => FetchState::FailedStatus { status, uri },
        }
    }
}

/// `Content-Type` with parameters stripped; `None` when absent or unreadable.
fn content_type(response: &reqwest::Response) -> Option<String> {
    let value = response.headers().get(reqwest::header::CONTENT_TYPE)?;
    let text = value.to_str().ok()?;
    Some(crate::registry::normalize_media_type(text))
}

/// Absolute redirect target: `Location` resolved against the current URI.
fn redirect_target(response: &reqwest::Response, current: &str) -> Option<String> {
    let location = response
        .headers()
        .get(reqwest::header::LOCATION)?
        .to_str()
        .ok()?;
    match reqwest::Url::parse(current).and_then(|base| base.join(location)) {
        Ok(url) => Some(url.to_string()),
        // Pass the raw value through; an unusable target surfaces as a
        // transport failure on the next request.
        Err(_) => Some(location.to_string()),
    }
}
