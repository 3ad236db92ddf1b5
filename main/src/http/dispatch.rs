use std::collections::HashMap;
use std::sync::Arc;

use futures::future::BoxFuture;
use trace::{debug, warn};
use warp::hyper::body::Bytes;
use warp::reply::Response;

use crate::http::response::ResponseBuilder;

/// Everything a handler needs from the inbound request.
#[derive(Debug)]
pub struct HandlerRequest {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub body: Bytes,
}

pub type Handler = Arc<dyn Fn(HandlerRequest) -> BoxFuture<'static, Response> + Send + Sync>;

/// Exact (method, path) routing. Methods are compared case-insensitively,
/// paths exactly; there is no pattern matching. Re-registering a pair
/// silently replaces the previous handler. Unmatched requests get a 404
/// whose body names the received method and path and points at the
/// configured event listener root.
pub struct PathDispatcher {
    routes: HashMap<(String, String), Handler>,
    root_url: String,
}

impl PathDispatcher {
    pub fn new(root_url: impl Into<String>) -> Self {
        Self {
            routes: HashMap::new(),
            root_url: root_url.into(),
        }
    }

    pub fn register(&mut self, method: &str, path: &str, handler: Handler) {
        debug!("registering for {} at {}", method, path);
        self.routes
            .insert((method.to_uppercase(), path.to_string()), handler);
    }

    pub async fn dispatch(&self, request: HandlerRequest) -> Response {
        let key = (request.method.to_uppercase(), request.path.clone());
        match self.routes.get(&key) {
            Some(handler) => handler(request).await,
            None => {
                warn!("no handler for {} {}", request.method, request.path);
                ResponseBuilder::not_found(format!(
                    "{} {} is not a registered endpoint, POST events to {}",
                    request.method, request.path, self.root_url
                ))
            }
        }
    }
}
