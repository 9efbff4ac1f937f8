//! Generic dispatch over result shapes
//!
//! Every service method goes through [`Client::dispatch`], picking the
//! shape of the successful body with a type parameter:
//!
//! - [`One<T>`]: a single JSON object
//! - [`Many<T>`]: a JSON array
//! - [`Raw`]: the body verbatim
//! - [`NoContent`]: the body is discarded

use super::options::{DoConfig, DoOption, PreparedRequest};
use crate::client::Client;
use crate::error::{ApiError, Error, Result};
use crate::response::Response;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;

/// How a successful response body is turned into a value
pub trait ResponseShape {
    /// The decoded value
    type Output: Send;

    /// Skip reading the body entirely
    const DISCARDS_BODY: bool = false;

    /// Decode a body, returning a message on mismatch
    fn decode(body: Bytes) -> std::result::Result<Self::Output, String>;
}

/// A single JSON object
pub struct One<T>(PhantomData<fn() -> T>);

impl<T: DeserializeOwned + Send> ResponseShape for One<T> {
    type Output = T;

    fn decode(body: Bytes) -> std::result::Result<T, String> {
        if body.is_empty() {
            return Err("empty response body".to_string());
        }
        serde_json::from_slice(&body).map_err(|e| e.to_string())
    }
}

/// A JSON array
pub struct Many<T>(PhantomData<fn() -> T>);

impl<T: DeserializeOwned + Send> ResponseShape for Many<T> {
    type Output = Vec<T>;

    fn decode(body: Bytes) -> std::result::Result<Vec<T>, String> {
        if body.is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_slice(&body).map_err(|e| e.to_string())
    }
}

/// The body bytes, untouched
pub struct Raw;

impl ResponseShape for Raw {
    type Output = Bytes;

    fn decode(body: Bytes) -> std::result::Result<Bytes, String> {
        Ok(body)
    }
}

/// Marker for calls whose body carries nothing of interest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NoContent;

impl ResponseShape for NoContent {
    type Output = NoContent;
    const DISCARDS_BODY: bool = true;

    fn decode(_body: Bytes) -> std::result::Result<NoContent, String> {
        Ok(NoContent)
    }
}

impl Client {
    /// Describe, send and decode one call
    ///
    /// Exactly one round trip is made unless the transport was configured
    /// with retries. Response metadata is returned on success and carried
    /// inside [`Error::Api`] and [`Error::Decode`] on failure. Nothing is
    /// logged here; the transport records the call.
    pub async fn dispatch<S: ResponseShape>(
        &self,
        opts: Vec<DoOption<'_>>,
    ) -> Result<(S::Output, Response)> {
        let request = self.prepare(opts)?;
        let method = request.method.clone();
        let url = request.full_url();

        let http_response = self.http().send(request).await?;
        let response = Response::from_reqwest(&http_response);

        if !response.status.is_success() {
            let body = http_response.bytes().await?;
            return Err(ApiError::new(method, url.as_str(), &body, response).into());
        }

        if S::DISCARDS_BODY {
            return S::decode(Bytes::new())
                .map(|out| (out, response))
                .map_err(Error::Other);
        }

        let body = http_response.bytes().await?;
        match S::decode(body) {
            Ok(out) => Ok((out, response)),
            Err(message) => Err(Error::decode(message, response)),
        }
    }

    /// Apply options and build the request without sending it
    pub fn prepare(&self, opts: Vec<DoOption<'_>>) -> Result<PreparedRequest> {
        let mut config = DoConfig::default();
        for opt in opts {
            opt.apply(&mut config)?;
        }
        PreparedRequest::build(self.base_url(), config)
    }
}
