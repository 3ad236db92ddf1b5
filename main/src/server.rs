use std::net::SocketAddr;
use std::sync::Arc;

use snafu::Snafu;
use tokio::sync::oneshot::Sender;
use tokio::task::JoinHandle;
use trace::info;

use crate::auth::Credentials;
use crate::command::CommandSlot;
use crate::http::http_service::{build_dispatcher, HttpService, ListenerContext};
use crate::schema::SchemaStore;
use crate::service::ServiceRef;
use crate::sink::InfluxSink;

pub type Result<T, E = Error> = std::result::Result<T, E>;

const DEFAULT_NODE_IP: &str = "0.0.0.0";

/// Inbound event bodies above this size are rejected before dispatch.
const EVENT_BODY_LIMIT: u64 = 4 * 1024 * 1024;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("Invalid collector configuration: {}", reason))]
    ConfigInvalid { reason: String },

    #[snafu(display("Cannot parse listen address '{}': {}", addr, source))]
    AddrParse {
        addr: String,
        source: std::net::AddrParseError,
    },
}

pub struct ServiceHandle<R> {
    pub name: String,
    join_handle: JoinHandle<R>,
    shutdown: Sender<()>,
}

impl<R> ServiceHandle<R> {
    pub fn new(name: String, join_handle: JoinHandle<R>, shutdown: Sender<()>) -> Self {
        ServiceHandle {
            name,
            join_handle,
            shutdown,
        }
    }

    pub async fn shutdown(self, force: bool) {
        if force {
            self.join_handle.abort();
            return;
        }
        let _ = self.shutdown.send(());
        let msg = format!("shutting down service {}", self.name);
        self.join_handle.await.expect(&msg);
    }
}

#[derive(Default)]
pub struct Server {
    services: Vec<ServiceRef>,
}

impl Server {
    pub fn add_service(&mut self, service: ServiceRef) {
        self.services.push(service);
    }

    pub fn start(&mut self) -> Result<()> {
        for x in self.services.iter_mut() {
            x.start().expect("service start");
        }
        Ok(())
    }

    pub async fn stop(&mut self, force: bool) {
        for x in self.services.iter_mut() {
            x.stop(force).await;
        }
    }
}

pub struct ServiceBuilder {
    pub config: config::Config,
}

impl ServiceBuilder {
    /// Wires configuration into the collector's HTTP service. Configuration
    /// errors are the only fatal startup condition; a missing schema or an
    /// unreachable time-series backend degrades at request time instead.
    pub fn build_collector(&self, server: &mut Server) -> Result<()> {
        let check_results = self.config.check_all();
        if check_results.has_errors() {
            return Err(Error::ConfigInvalid {
                reason: check_results.error_messages().join("; "),
            });
        }

        let schemas = SchemaStore::load(&self.config.schema);

        let listener = &self.config.listener;
        let ctx = Arc::new(ListenerContext {
            credentials: Credentials::new(&listener.username, &listener.password),
            slot: CommandSlot::default(),
            sink: Arc::new(InfluxSink::new(&self.config.sink)),
            record_unauthenticated: listener.record_unauthenticated,
        });

        let dispatcher = Arc::new(build_dispatcher(listener, &schemas, ctx));

        let addr = build_default_address(listener.port)?;
        info!("event listener root: {}", listener.root_url());

        server.add_service(Box::new(HttpService::new(dispatcher, addr, EVENT_BODY_LIMIT)));
        Ok(())
    }
}

fn build_default_address(port: u16) -> Result<SocketAddr> {
    let addr = format!("{}:{}", DEFAULT_NODE_IP, port);
    addr.parse().map_err(|source| Error::AddrParse { addr, source })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_collector_rejects_bad_config() {
        let mut config = config::Config::default();
        config.listener.port = 80;
        let builder = ServiceBuilder { config };
        let mut server = Server::default();

        let err = builder.build_collector(&mut server).unwrap_err();
        assert!(matches!(err, Error::ConfigInvalid { .. }));
    }

    #[test]
    fn test_build_collector_with_defaults() {
        let builder = ServiceBuilder {
            config: config::Config::default(),
        };
        let mut server = Server::default();
        assert!(builder.build_collector(&mut server).is_ok());
    }
}
