//! HTTP/1.1 server

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::future::Future;
use std::net::SocketAddr;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info};

use crate::handlers::handle_request;
use crate::state::{AppState, Store};

pub struct FlipstockServer<S> {
    state: AppState<S>,
}

impl<S: Store> FlipstockServer<S> {
    pub fn new(state: AppState<S>) -> Self {
        Self { state }
    }

    /// Bind and serve until `shutdown` resolves
    pub async fn serve(
        self,
        addr: SocketAddr,
        shutdown: impl Future<Output = ()>,
    ) -> anyhow::Result<()> {
        let listener = TcpListener::bind(addr).await?;
        self.serve_listener(listener, shutdown).await
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    ///
    /// In-flight connections are left to finish on their own tasks.
    pub async fn serve_listener(
        self,
        listener: TcpListener,
        shutdown: impl Future<Output = ()>,
    ) -> anyhow::Result<()> {
        info!(addr = %listener.local_addr()?, "flipstock server listening");
        tokio::pin!(shutdown);

        loop {
            let (stream, remote_addr) = tokio::select! {
                accepted = listener.accept() => accepted?,
                _ = &mut shutdown => {
                    info!("shutdown requested, no longer accepting connections");
                    return Ok(());
                }
            };
            debug!(%remote_addr, "new connection");

            let state = self.state.clone();
            tokio::spawn(async move {
                if let Err(err) = Self::handle_connection(stream, state).await {
                    error!(%remote_addr, error = %err, "connection error");
                }
            });
        }
    }

    async fn handle_connection(stream: TcpStream, state: AppState<S>) -> hyper::Result<()> {
        let io = TokioIo::new(stream);

        let service = service_fn(move |req| handle_request(req, state.clone()));

        http1::Builder::new().serve_connection(io, service).await
    }
}
