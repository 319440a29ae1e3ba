//! Unified call outcome: pre-flight error, live response, or buffered body.
//!
//! A [`RestResult`] is constructed in exactly one of three ways and exposes
//! the same read/consume surface for all of them. Reads are forward-only:
//! bytes handed to the caller are never replayed, and the one-shot
//! [`RestResult::json`] path drains whatever has not been read yet.

use std::sync::Arc;

use bytes::Bytes;
use reqwest::header::HeaderMap;

use crate::error::{ClientError, ClientResult};
use crate::event::RestEvent;
use crate::json::JsonResult;
use crate::traits::RestBuild;

enum Body {
    /// Pre-flight error; no body will ever exist
    None,
    /// Still-open response stream, with a spill buffer for chunk remainders
    Live {
        response: reqwest::Response,
        spill: Bytes,
    },
    /// Body already read by whoever built the result
    Buffered {
        data: Bytes,
        offset: usize,
        head: Option<(u16, HeaderMap)>,
    },
}

/// Outcome of one dispatched call.
pub struct RestResult {
    event: Box<dyn RestEvent>,
    build: Option<Arc<dyn RestBuild>>,
    err: Option<ClientError>,
    body: Body,
    finished: bool,
}

impl RestResult {
    /// Wrap a terminal error. The observer's finish callback fires now;
    /// every subsequent read returns the same error.
    pub fn from_error(err: ClientError, mut event: Box<dyn RestEvent>) -> Self {
        event.response_finish(Some(&err));
        Self {
            event,
            build: None,
            err: Some(err),
            body: Body::None,
            finished: true,
        }
    }

    /// Wrap a live response stream. The observer sees headers now; body
    /// bytes are delivered lazily through [`RestResult::read`].
    pub fn from_response(
        build: Arc<dyn RestBuild>,
        response: reqwest::Response,
        mut event: Box<dyn RestEvent>,
    ) -> Self {
        event.response_header(response.status().as_u16(), response.headers());
        Self {
            event,
            build: Some(build),
            err: None,
            body: Body::Live {
                response,
                spill: Bytes::new(),
            },
            finished: false,
        }
    }

    /// Wrap a body that was already fully read (test double, cached replay).
    /// No further I/O will happen, so headers (when present) and the nil
    /// finish are reported to the observer immediately.
    pub fn from_body(
        build: Option<Arc<dyn RestBuild>>,
        body: impl Into<String>,
        head: Option<(u16, HeaderMap)>,
        mut event: Box<dyn RestEvent>,
    ) -> Self {
        if let Some((status, headers)) = &head {
            event.response_header(*status, headers);
        }
        event.response_finish(None);
        Self {
            event,
            build,
            err: None,
            body: Body::Buffered {
                data: Bytes::from(body.into()),
                offset: 0,
                head,
            },
            finished: true,
        }
    }

    /// Terminal error, if any. Consumers must check this before trusting
    /// extracted data.
    pub fn err(&self) -> Option<&ClientError> {
        self.err.as_ref()
    }

    /// HTTP status, when a response was received.
    pub fn status(&self) -> Option<u16> {
        match &self.body {
            Body::Live { response, .. } => Some(response.status().as_u16()),
            Body::Buffered { head, .. } => head.as_ref().map(|(status, _)| *status),
            Body::None => None,
        }
    }

    /// Response headers, when a response was received.
    pub fn headers(&self) -> Option<&HeaderMap> {
        match &self.body {
            Body::Live { response, .. } => Some(response.headers()),
            Body::Buffered { head, .. } => head.as_ref().map(|(_, headers)| headers),
            Body::None => None,
        }
    }

    /// Read the next body bytes into `buf`, returning the count.
    ///
    /// `Ok(0)` signals that the body is exhausted. Reads never go backwards;
    /// a live stream mirrors every non-empty read to the observer and fires
    /// the finish callback exactly once at end of stream. A stream failure
    /// is recorded and returned by every later read.
    pub async fn read(&mut self, buf: &mut [u8]) -> ClientResult<usize> {
        if let Some(err) = &self.err {
            return Err(err.clone());
        }
        match &mut self.body {
            Body::None => Ok(0),
            Body::Buffered { data, offset, .. } => {
                let n = (data.len() - *offset).min(buf.len());
                buf[..n].copy_from_slice(&data[*offset..*offset + n]);
                *offset += n;
                Ok(n)
            }
            Body::Live { response, spill } => {
                if spill.is_empty() {
                    match response.chunk().await {
                        Ok(Some(chunk)) => {
                            self.event.response_read(&chunk);
                            *spill = chunk;
                        }
                        Ok(None) => {
                            if !self.finished {
                                self.finished = true;
                                self.event.response_finish(None);
                            }
                            return Ok(0);
                        }
                        Err(source) => {
                            let err = ClientError::Stream(source.to_string());
                            self.err = Some(err.clone());
                            if !self.finished {
                                self.finished = true;
                                self.event.response_finish(Some(&err));
                            }
                            return Err(err);
                        }
                    }
                }
                let n = spill.len().min(buf.len());
                buf[..n].copy_from_slice(&spill[..n]);
                let _ = spill.split_to(n);
                Ok(n)
            }
        }
    }

    /// Drain the remaining body, run the builder's envelope check, and
    /// return a queryable view over the parsed document.
    ///
    /// The observer's check callback fires exactly once, with the final
    /// error state, whatever the outcome. Consuming `self` makes this a
    /// one-shot: the result cannot be re-entered at a different offset.
    pub async fn json(mut self, base_path: Option<&str>) -> JsonResult {
        let view = self.materialize(base_path).await;
        self.event.response_check(self.err.as_ref());
        view
    }

    async fn materialize(&mut self, base_path: Option<&str>) -> JsonResult {
        if let Some(err) = &self.err {
            return JsonResult::from_error(err.clone());
        }
        let mut body = Vec::new();
        let mut buf = [0u8; 8192];
        loop {
            match self.read(&mut buf).await {
                Ok(0) => break,
                Ok(n) => body.extend_from_slice(&buf[..n]),
                Err(err) => return JsonResult::from_error(err),
            }
        }
        let body = String::from_utf8_lossy(&body).into_owned();

        if let Some(build) = &self.build {
            if let Err(err) = build.check_json_result(&body) {
                self.err = Some(err.clone());
                return JsonResult::from_error(err);
            }
        }
        JsonResult::new(&body, base_path.unwrap_or(""))
    }
}
