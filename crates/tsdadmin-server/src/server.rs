//! Axum wiring and the serve loop.
//!
//! Every request, whatever its path or method, goes to the request
//! dispatcher through a single fallback handler. Each accepted TCP
//! connection is registered once with the connection registry; every request
//! on it carries that registration.

use std::convert::Infallible;
use std::future::{ready, IntoFuture, Ready};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use axum::{
    extract::{Request, State},
    middleware::AddExtension,
    response::Response,
    serve::IncomingStream,
    Extension, Router,
};
use tokio::net::TcpListener;
use tokio::sync::Notify;
use tower::{Layer, Service};

use tsdadmin_core::Result;

use crate::app_state::AppState;
use crate::collab::{ConnGuard, ConnectionRegistry, NetworkResources};

pub fn build_router(state: AppState) -> Router {
    Router::new().fallback(admin_entry).with_state(state)
}

async fn admin_entry(State(state): State<AppState>, request: Request) -> Response {
    // Requests that did not come through `TrackedConnections` (e.g. a router
    // driven in-process) count as a connection of their own.
    let guard = match request.extensions().get::<Arc<ConnGuard>>() {
        Some(guard) => Arc::clone(guard),
        None => Arc::new(state.connections().open(None)),
    };
    state.dispatcher().dispatch(request, guard.handle()).await
}

/// Make-service handing out one router per accepted connection, tagged with
/// that connection's registration. The registration drops when hyper drops
/// the connection's service, i.e. when the connection closes.
#[derive(Clone)]
pub struct TrackedConnections {
    router: Router,
    registry: Arc<ConnectionRegistry>,
}

impl TrackedConnections {
    pub fn new(router: Router, registry: Arc<ConnectionRegistry>) -> Self {
        Self { router, registry }
    }
}

impl<'a> Service<IncomingStream<'a>> for TrackedConnections {
    type Response = AddExtension<Router, Arc<ConnGuard>>;
    type Error = Infallible;
    type Future = Ready<std::result::Result<Self::Response, Infallible>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<std::result::Result<(), Infallible>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, stream: IncomingStream<'a>) -> Self::Future {
        let guard = Arc::new(self.registry.open(Some(stream.remote_addr())));
        tracing::debug!(conn = %guard.handle(), "connection accepted");
        ready(Ok(Extension(guard).layer(self.router.clone())))
    }
}

/// Lets the release thread wake the task that owns the runtime.
#[derive(Clone, Default)]
pub struct ServerHandle {
    released: Arc<Notify>,
}

impl ServerHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves once [`NetworkResources::release`] was called, even if it
    /// was called before this future was first polled.
    pub async fn released(&self) {
        self.released.notified().await;
    }
}

impl NetworkResources for ServerHandle {
    fn release(&self) {
        tracing::info!("releasing network resources");
        self.released.notify_one();
    }
}

/// Serve until the connection manager closes the listener and the open
/// connections drain, or until network resources are released. After a release
/// the in-flight replies get `shutdown_grace_ms` to finish.
pub async fn serve(state: AppState, listener: TcpListener) -> Result<()> {
    let grace = Duration::from_millis(state.cfg().server.shutdown_grace_ms);
    let handle = state.server_handle();
    let registry = state.connections();
    let closed = registry.closed();

    let app = TrackedConnections::new(build_router(state), registry);
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(closed)
        .into_future();
    tokio::pin!(server);

    tokio::select! {
        res = &mut server => res?,
        _ = handle.released() => {
            match tokio::time::timeout(grace, &mut server).await {
                Ok(res) => res?,
                Err(_) => tracing::warn!(
                    grace_ms = grace.as_millis() as u64,
                    "in-flight requests did not drain in time"
                ),
            }
        }
    }

    tracing::info!("tsdadmin-server stopped");
    Ok(())
}
