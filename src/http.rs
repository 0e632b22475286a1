use failure::{Error, Fail};
use futures::future;
use futures::prelude::*;
use hyper;
use hyper::client::HttpConnector;
use hyper::header::{ContentType, Headers};
use hyper::{Request, Uri};
use serde::de::Deserialize;
use serde_json;
use tokio_core::reactor::Handle;

use errors::Error as ErrorKind;

pub type HttpFuture = Box<dyn Future<Item = Response, Error = Error>>;

#[derive(Clone, Debug, PartialEq)]
pub struct Response(pub String);

pub trait HttpClient {
    fn cloned(&self) -> Box<dyn HttpClient>;

    fn request(&self, method: hyper::Method, url: String, body: Option<String>, headers: Option<Headers>) -> HttpFuture;

    fn get(&self, url: String, headers: Option<Headers>) -> HttpFuture {
        self.request(hyper::Method::Get, url, None, headers)
    }

    fn post(&self, url: String, body: Option<String>, headers: Option<Headers>) -> HttpFuture {
        self.request(hyper::Method::Post, url, body, headers)
    }
}

pub struct HttpClientWithDefaultHeaders<S: HttpClient> {
    inner: S,
    headers: Headers,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl Response {
    pub fn parse<T: for<'a> Deserialize<'a> + 'static>(&self) -> Result<T, Error> {
        let response = &self.0;
        let parsed = if response.is_empty() {
            serde_json::from_value(serde_json::Value::Null)
        } else {
            serde_json::from_str::<T>(&response)
        };
        parsed.map_err(|e| Error::from(e.context(ErrorKind::Parse)))
    }
}

impl<S: HttpClient> HttpClientWithDefaultHeaders<S> {
    pub fn new(client: S, headers: Headers) -> Self {
        Self { inner: client, headers }
    }
}

impl<S: HttpClient> HttpClient for HttpClientWithDefaultHeaders<S> {
    fn request(&self, method: hyper::Method, url: String, body: Option<String>, headers: Option<Headers>) -> HttpFuture {
        let headers = if let Some(headers) = headers {
            let mut existing_headers = self.headers.clone();
            existing_headers.extend(headers.iter());
            Some(existing_headers)
        } else {
            Some(self.headers.clone())
        };
        self.inner.request(method, url, body, headers)
    }

    fn cloned(&self) -> Box<dyn HttpClient> {
        Box::new(HttpClientWithDefaultHeaders {
            inner: self.inner.cloned(),
            headers: self.headers.clone(),
        })
    }
}

impl HttpClient for Box<dyn HttpClient> {
    fn request(&self, method: hyper::Method, url: String, body: Option<String>, headers: Option<Headers>) -> HttpFuture {
        (**self).request(method, url, body, headers)
    }

    fn cloned(&self) -> Box<dyn HttpClient> {
        (**self).cloned()
    }
}

/// JSON over hyper on the session's reactor
#[derive(Clone)]
pub struct HyperClient {
    client: hyper::Client<HttpConnector>,
}

impl HyperClient {
    pub fn new(handle: &Handle) -> Self {
        Self {
            client: hyper::Client::new(handle),
        }
    }
}

impl HttpClient for HyperClient {
    fn request(&self, method: hyper::Method, url: String, body: Option<String>, headers: Option<Headers>) -> HttpFuture {
        debug!("{} {}", method, url);

        let uri = match url.parse::<Uri>() {
            Ok(uri) => uri,
            Err(e) => {
                return Box::new(future::err::<Response, Error>(Error::from(
                    format_err!("Invalid url {}: {}", url, e).context(ErrorKind::HttpClient),
                )))
            }
        };

        let mut request = Request::new(method, uri);
        if let Some(headers) = headers {
            request.headers_mut().extend(headers.iter());
        }
        if let Some(body) = body {
            request.headers_mut().set(ContentType::json());
            request.set_body(body);
        }

        let res = self
            .client
            .request(request)
            .map_err(|e| Error::from(e.context(ErrorKind::HttpClient)))
            .and_then(move |response| {
                let status = response.status();
                response
                    .body()
                    .concat2()
                    .map_err(|e| Error::from(e.context(ErrorKind::HttpClient)))
                    .and_then(move |chunk| {
                        let body = String::from_utf8_lossy(&chunk).into_owned();
                        if status.is_success() {
                            Ok(Response(body))
                        } else {
                            Err(api_error(status.as_u16(), &body))
                        }
                    })
            });

        Box::new(res)
    }

    fn cloned(&self) -> Box<dyn HttpClient> {
        Box::new(self.clone())
    }
}

/// Non-2xx response. Keeps the server's `message` when the body carries one.
pub fn api_error(status: u16, body: &str) -> Error {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|body| body.message)
        .filter(|message| !message.trim().is_empty());
    format_err!("Api responded with {}: {}", status, body)
        .context(ErrorKind::Api { status, message })
        .into()
}
