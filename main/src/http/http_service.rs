use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use config::ListenerConfig;
use http_protocol::header::AUTHORIZATION;
use http_protocol::response::{ErrorResponse, RequestError};
use http_protocol::status_code::{ACCEPTED, BAD_REQUEST, NOT_FOUND, OK, UNAUTHORIZED};
use tokio::sync::oneshot;
use trace::{debug, info, warn};
use warp::http::Method;
use warp::hyper::body::Bytes;
use warp::path::FullPath;
use warp::reply::Response;
use warp::{reject, Filter, Rejection, Reply};

use super::dispatch::{Handler, HandlerRequest, PathDispatcher};
use super::response::ResponseBuilder;
use super::Error as HttpError;
use crate::auth::Credentials;
use crate::command::CommandSlot;
use crate::event::extract;
use crate::schema::{EventSchema, SchemaStore};
use crate::server;
use crate::server::ServiceHandle;
use crate::service::Service;
use crate::sink::RecordSink;
use crate::validate;
use crate::validate::Outcome;

const POLICY_EXCEPTION_ID: &str = "POL0001";
const POLICY_EXCEPTION_TEXT: &str = "Failed to authenticate";

/// Shared state every listener handler needs, built once at startup.
pub struct ListenerContext {
    pub credentials: Credentials,
    pub slot: CommandSlot,
    pub sink: Arc<dyn RecordSink>,
    pub record_unauthenticated: bool,
}

/// Registers the two route families: the event listener (plus the
/// client-throttling-state sub-path with its own schema) and the
/// unauthenticated test-control channel.
pub fn build_dispatcher(
    listener: &ListenerConfig,
    schemas: &SchemaStore,
    ctx: Arc<ListenerContext>,
) -> PathDispatcher {
    let root_url = listener.root_url();
    let mut dispatcher = PathDispatcher::new(root_url.clone());

    let event_handler = make_event_handler(ctx.clone(), schemas.event());
    dispatcher.register("GET", &root_url, event_handler.clone());
    dispatcher.register("POST", &root_url, event_handler);

    let throttle_url = listener.throttle_url();
    let throttle_handler = make_event_handler(ctx.clone(), schemas.throttle());
    dispatcher.register("GET", &throttle_url, throttle_handler.clone());
    dispatcher.register("POST", &throttle_url, throttle_handler);

    let test_control_url = listener.test_control_url();
    let test_control_handler = make_test_control_handler(ctx, schemas.test_control());
    dispatcher.register("GET", &test_control_url, test_control_handler.clone());
    dispatcher.register("POST", &test_control_url, test_control_handler);

    dispatcher
}

fn make_event_handler(ctx: Arc<ListenerContext>, schema: Option<Arc<EventSchema>>) -> Handler {
    Arc::new(move |request| {
        let ctx = ctx.clone();
        let schema = schema.clone();
        Box::pin(async move { event_listener(ctx, schema, request).await })
    })
}

fn make_test_control_handler(
    ctx: Arc<ListenerContext>,
    schema: Option<Arc<EventSchema>>,
) -> Handler {
    Arc::new(move |request| {
        let ctx = ctx.clone();
        let schema = schema.clone();
        Box::pin(async move { test_control(ctx, schema, request).await })
    })
}

/// Handler for the Vendor Event Listener REST API.
///
/// The body is decoded and validated whatever the authentication outcome;
/// the response is decided by the credentials alone. An authenticated
/// sender consumes any pending command list, an unauthenticated one gets
/// the policy-exception envelope.
async fn event_listener(
    ctx: Arc<ListenerContext>,
    schema: Option<Arc<EventSchema>>,
    request: HandlerRequest,
) -> Response {
    info!("got a vendor event request on {} {}", request.method, request.path);

    let outcome = validate::check_body(&request.body, schema.as_deref());
    let authenticated = ctx.credentials.verify(request.authorization.as_deref());

    let response = if authenticated {
        debug!("authenticated ok");
        match ctx.slot.consume() {
            Some(command_list) => {
                info!("sending pending command list in the response");
                ResponseBuilder::new(ACCEPTED).json(&command_list)
            }
            None => ResponseBuilder::new(ACCEPTED).empty(),
        }
    } else {
        warn!("failed to authenticate event sender");
        ResponseBuilder::new(UNAUTHORIZED).json(&RequestError::policy_exception(
            POLICY_EXCEPTION_ID,
            POLICY_EXCEPTION_TEXT,
        ))
    };

    if authenticated || ctx.record_unauthenticated {
        if let Outcome::Accepted { event, .. } = outcome {
            save_event(&ctx, &event).await;
        }
    }

    response
}

async fn save_event(ctx: &ListenerContext, event: &serde_json::Value) {
    match extract::extract(event) {
        Ok(writes) => {
            for write in writes {
                ctx.sink.send(write.event_type, &write.line).await;
            }
        }
        Err(e) => warn!("event not recorded: {}", e),
    }
}

/// Handler for the Test Collector Test Control API.
///
/// There is no authentication on this interface. A POST stores a command
/// list which will be sent in response to the next incoming event on the
/// listener interface; a GET reads the pending document without consuming
/// it. The slot is armed whenever the body parses, a schema violation is
/// logged but does not block the arm.
async fn test_control(
    ctx: Arc<ListenerContext>,
    schema: Option<Arc<EventSchema>>,
    request: HandlerRequest,
) -> Response {
    info!("got a test control input");

    if request.method.eq_ignore_ascii_case("GET") {
        return ResponseBuilder::new(OK).json(&ctx.slot.peek());
    }

    match validate::check_body(&request.body, schema.as_deref()) {
        Outcome::Malformed => ResponseBuilder::new(BAD_REQUEST)
            .json(&ErrorResponse::new("command list body is not valid JSON")),
        Outcome::Accepted { event, .. }
        | Outcome::Invalid { event }
        | Outcome::SchemaError { event } => {
            ctx.slot.arm(event);
            ResponseBuilder::new(ACCEPTED).empty()
        }
    }
}

pub struct HttpService {
    addr: SocketAddr,
    dispatcher: Arc<PathDispatcher>,
    handle: Option<ServiceHandle<()>>,
    body_limit: u64,
}

impl HttpService {
    pub fn new(dispatcher: Arc<PathDispatcher>, addr: SocketAddr, body_limit: u64) -> Self {
        Self {
            addr,
            dispatcher,
            handle: None,
            body_limit,
        }
    }

    fn routes(&self) -> impl Filter<Extract = (Response,), Error = Rejection> + Clone {
        let dispatcher = self.dispatcher.clone();
        let body_limit = self.body_limit;
        warp::method()
            .and(warp::path::full())
            .and(warp::header::optional::<String>(AUTHORIZATION.as_str()))
            .and(warp::body::bytes())
            .and_then(
                move |method: Method, path: FullPath, authorization: Option<String>, body: Bytes| {
                    let dispatcher = dispatcher.clone();
                    async move {
                        if body.len() as u64 > body_limit {
                            return Err(reject::custom(HttpError::BodyOversize {
                                size: body.len(),
                            }));
                        }
                        let request = HandlerRequest {
                            method: method.to_string(),
                            path: path.as_str().to_string(),
                            authorization,
                            body,
                        };
                        Ok::<_, Rejection>(dispatcher.dispatch(request).await)
                    }
                },
            )
    }
}

#[async_trait::async_trait]
impl Service for HttpService {
    fn start(&mut self) -> Result<(), server::Error> {
        let routes = self.routes().recover(handle_rejection);
        let (shutdown, rx) = oneshot::channel();
        let signal = async {
            rx.await.ok();
            info!("http server graceful shutdown!");
        };
        let (addr, server) = warp::serve(routes).bind_with_graceful_shutdown(self.addr, signal);
        info!("http server start addr: {}", addr);
        let join_handle = tokio::spawn(server);
        self.handle = Some(ServiceHandle::new(
            "http service".to_string(),
            join_handle,
            shutdown,
        ));
        Ok(())
    }

    async fn stop(&mut self, force: bool) {
        if let Some(stop) = self.handle.take() {
            stop.shutdown(force).await
        };
    }
}

// Custom rejection handler that maps rejections into responses.
async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    if let Some(e) = err.find::<HttpError>() {
        match e {
            HttpError::BodyOversize { size } => {
                warn!("rejecting oversized request body: {} bytes", size);
                Ok(ResponseBuilder::payload_too_large())
            }
        }
    } else if err.is_not_found() {
        Ok(NOT_FOUND.into_response())
    } else {
        Ok(ResponseBuilder::internal_server_error())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::sink::testing::MemorySink;

    struct TestCollector {
        service: HttpService,
        sink: Arc<MemorySink>,
        slot: CommandSlot,
    }

    fn test_collector(body_limit: u64) -> TestCollector {
        let listener = ListenerConfig {
            username: "willrule".to_string(),
            password: "williamr".to_string(),
            ..Default::default()
        };
        let sink = Arc::new(MemorySink::default());
        let slot = CommandSlot::default();
        let ctx = Arc::new(ListenerContext {
            credentials: Credentials::new(&listener.username, &listener.password),
            slot: slot.clone(),
            sink: sink.clone(),
            record_unauthenticated: listener.record_unauthenticated,
        });
        let dispatcher = build_dispatcher(&listener, &SchemaStore::default(), ctx);
        let service = HttpService::new(
            Arc::new(dispatcher),
            "127.0.0.1:0".parse().unwrap(),
            body_limit,
        );
        TestCollector {
            service,
            sink,
            slot,
        }
    }

    fn basic_auth(credentials: &str) -> String {
        format!("Basic {}", base64::encode(credentials))
    }

    fn heartbeat_event() -> String {
        json!({
            "event": {
                "commonEventHeader": {
                    "domain": "heartbeat",
                    "lastEpochMicrosec": 1544608845841000.0,
                    "reportingEntityName": "localhost-agent",
                    "sourceId": "vm01",
                    "sequence": 7,
                }
            }
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_authenticated_heartbeat_is_accepted_and_recorded() {
        let collector = test_collector(4 * 1024 * 1024);
        let routes = collector.service.routes().recover(handle_rejection);

        let resp = warp::test::request()
            .method("POST")
            .path("/eventListener/v5")
            .header(AUTHORIZATION.as_str(), basic_auth("willrule:williamr"))
            .body(heartbeat_event())
            .reply(&routes)
            .await;

        assert_eq!(resp.status(), ACCEPTED);
        assert!(resp.body().is_empty());

        let records = collector.sink.records.lock();
        assert_eq!(
            *records,
            vec![(
                "heartbeat".to_string(),
                "heartbeat,system=computehost-AGENT sequence=7".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn test_unauthenticated_sender_gets_policy_exception() {
        let collector = test_collector(4 * 1024 * 1024);
        let routes = collector.service.routes().recover(handle_rejection);

        let resp = warp::test::request()
            .method("POST")
            .path("/eventListener/v5")
            .header(AUTHORIZATION.as_str(), basic_auth("willrule:wrong"))
            .body(heartbeat_event())
            .reply(&routes)
            .await;

        assert_eq!(resp.status(), UNAUTHORIZED);
        assert_eq!(
            resp.body(),
            &r#"{"requestError":{"policyException":{"messageId":"POL0001","text":"Failed to authenticate"}}}"#[..]
        );

        // telemetry is still recorded for unauthenticated senders by default
        assert_eq!(collector.sink.records.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_pending_command_is_delivered_once() {
        let collector = test_collector(4 * 1024 * 1024);
        let routes = collector.service.routes().recover(handle_rejection);

        let resp = warp::test::request()
            .method("POST")
            .path("/testControl/v5/commandList")
            .body(r#"{"cmd":"throttle"}"#)
            .reply(&routes)
            .await;
        assert_eq!(resp.status(), ACCEPTED);
        assert!(resp.body().is_empty());

        let resp = warp::test::request()
            .method("POST")
            .path("/eventListener/v5")
            .header(AUTHORIZATION.as_str(), basic_auth("willrule:williamr"))
            .body(heartbeat_event())
            .reply(&routes)
            .await;
        assert_eq!(resp.status(), ACCEPTED);
        assert_eq!(resp.body(), &r#"{"cmd":"throttle"}"#[..]);

        let resp = warp::test::request()
            .method("POST")
            .path("/eventListener/v5")
            .header(AUTHORIZATION.as_str(), basic_auth("willrule:williamr"))
            .body(heartbeat_event())
            .reply(&routes)
            .await;
        assert_eq!(resp.status(), ACCEPTED);
        assert!(resp.body().is_empty());
    }

    #[tokio::test]
    async fn test_command_is_not_consumed_by_failed_auth() {
        let collector = test_collector(4 * 1024 * 1024);
        let routes = collector.service.routes().recover(handle_rejection);
        collector.slot.arm(json!({"cmd": "throttle"}));

        let resp = warp::test::request()
            .method("POST")
            .path("/eventListener/v5")
            .body(heartbeat_event())
            .reply(&routes)
            .await;
        assert_eq!(resp.status(), UNAUTHORIZED);
        assert_eq!(collector.slot.peek(), Some(json!({"cmd": "throttle"})));
    }

    #[tokio::test]
    async fn test_test_control_get_peeks_without_consuming() {
        let collector = test_collector(4 * 1024 * 1024);
        let routes = collector.service.routes().recover(handle_rejection);

        let resp = warp::test::request()
            .method("GET")
            .path("/testControl/v5/commandList")
            .reply(&routes)
            .await;
        assert_eq!(resp.status(), OK);
        assert_eq!(resp.body(), &"null"[..]);

        collector.slot.arm(json!({"cmd": "throttle"}));
        let resp = warp::test::request()
            .method("GET")
            .path("/testControl/v5/commandList")
            .reply(&routes)
            .await;
        assert_eq!(resp.status(), OK);
        assert_eq!(resp.body(), &r#"{"cmd":"throttle"}"#[..]);
        assert!(collector.slot.peek().is_some());
    }

    #[tokio::test]
    async fn test_test_control_rejects_undecodable_body() {
        let collector = test_collector(4 * 1024 * 1024);
        let routes = collector.service.routes().recover(handle_rejection);

        let resp = warp::test::request()
            .method("POST")
            .path("/testControl/v5/commandList")
            .body("{not json")
            .reply(&routes)
            .await;
        assert_eq!(resp.status(), BAD_REQUEST);
        assert_eq!(collector.slot.peek(), None);
    }

    #[tokio::test]
    async fn test_unmatched_path_references_root_url() {
        let collector = test_collector(4 * 1024 * 1024);
        let routes = collector.service.routes().recover(handle_rejection);

        let resp = warp::test::request()
            .method("GET")
            .path("/nonsense")
            .reply(&routes)
            .await;
        assert_eq!(resp.status(), NOT_FOUND);
        let body = String::from_utf8(resp.body().to_vec()).unwrap();
        assert!(body.contains("/eventListener/v5"));
        assert!(body.contains("GET"));
    }

    #[tokio::test]
    async fn test_throttle_sub_path_is_routed() {
        let collector = test_collector(4 * 1024 * 1024);
        let routes = collector.service.routes().recover(handle_rejection);

        let resp = warp::test::request()
            .method("POST")
            .path("/eventListener/v5/clientThrottlingState")
            .header(AUTHORIZATION.as_str(), basic_auth("willrule:williamr"))
            .body(heartbeat_event())
            .reply(&routes)
            .await;
        assert_eq!(resp.status(), ACCEPTED);
    }

    #[tokio::test]
    async fn test_oversized_body_is_rejected() {
        let collector = test_collector(16);
        let routes = collector.service.routes().recover(handle_rejection);

        let resp = warp::test::request()
            .method("POST")
            .path("/eventListener/v5")
            .body("x".repeat(64))
            .reply(&routes)
            .await;
        assert_eq!(resp.status(), http_protocol::status_code::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_malformed_event_body_still_answers() {
        let collector = test_collector(4 * 1024 * 1024);
        let routes = collector.service.routes().recover(handle_rejection);

        let resp = warp::test::request()
            .method("POST")
            .path("/eventListener/v5")
            .header(AUTHORIZATION.as_str(), basic_auth("willrule:williamr"))
            .body("{not json")
            .reply(&routes)
            .await;
        assert_eq!(resp.status(), ACCEPTED);
        assert!(collector.sink.records.lock().is_empty());
    }
}
