use failure::Error;
use futures::{Future, IntoFuture};
use hyper::header::{Authorization, Bearer, Headers};
use hyper::Method;
use serde::de::Deserialize;
use serde::ser::Serialize;
use serde_json;

use http::HttpClient;
use models::AuthToken;

mod geocoder;
pub use self::geocoder::*;

mod inventory;
pub use self::inventory::*;

mod orders;
pub use self::orders::*;

pub type ApiFuture<T> = Box<dyn Future<Item = T, Error = Error>>;

fn request<C: HttpClient + 'static, T: Serialize, S: for<'a> Deserialize<'a> + 'static>(
    http_client: C,
    method: Method,
    url: String,
    payload: Option<T>,
    headers: Option<Headers>,
) -> ApiFuture<S> {
    let body = if let Some(payload) = payload {
        serde_json::to_string::<T>(&payload).map(Some)
    } else {
        Ok(None)
    };

    let result = body
        .into_future()
        .map_err(From::from)
        .and_then(move |serialized_body| http_client.request(method, url, serialized_body, headers))
        .and_then(|response| response.parse::<S>().into_future());
    Box::new(result)
}

fn bearer(token: &AuthToken) -> Headers {
    let mut headers = Headers::new();
    headers.set(Authorization(Bearer {
        token: token.as_str().to_string(),
    }));
    headers
}

#[cfg(test)]
pub mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use futures::future;
    use hyper::header::Headers;
    use hyper::Method;

    use errors::Error as ErrorKind;
    use http::{api_error, HttpClient, HttpFuture, Response};

    #[derive(Clone, Debug)]
    pub struct RecordedRequest {
        pub method: Method,
        pub url: String,
        pub body: Option<String>,
        pub headers: Option<Headers>,
    }

    /// Answers every request with the same canned body or status.
    #[derive(Clone)]
    pub struct CannedHttpClient {
        pub status: u16,
        pub body: String,
        pub requests: Rc<RefCell<Vec<RecordedRequest>>>,
    }

    impl CannedHttpClient {
        pub fn new(status: u16, body: &str) -> Self {
            Self {
                status,
                body: body.to_string(),
                requests: Rc::new(RefCell::new(vec![])),
            }
        }

        pub fn last_request(&self) -> RecordedRequest {
            self.requests.borrow().last().cloned().expect("no request recorded")
        }
    }

    impl HttpClient for CannedHttpClient {
        fn request(&self, method: Method, url: String, body: Option<String>, headers: Option<Headers>) -> HttpFuture {
            self.requests.borrow_mut().push(RecordedRequest {
                method,
                url,
                body,
                headers,
            });
            if self.status < 300 {
                Box::new(future::ok::<_, ::failure::Error>(Response(self.body.clone())))
            } else {
                Box::new(future::err::<Response, _>(api_error(self.status, &self.body)))
            }
        }

        fn cloned(&self) -> Box<dyn HttpClient> {
            Box::new(self.clone())
        }
    }

    #[test]
    fn canned_client_reports_api_errors() {
        use errors::error_kind;
        use futures::Future;

        let client = CannedHttpClient::new(500, "");
        let e = client.get("http://x.local".to_string(), None).wait().unwrap_err();
        match error_kind(&e) {
            Some(ErrorKind::Api { status: 500, .. }) => {}
            other => panic!("unexpected kind {:?}", other),
        }
    }
}
