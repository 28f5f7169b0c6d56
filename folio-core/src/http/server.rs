//! hyper http1 server
//!
//! One task per connection. Ctrl-C stops accepting; connections already
//! accepted run to completion on their own tasks. When a client disconnects
//! mid-request hyper drops the handler future, which drops any in-flight
//! content read with it.

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;

use super::{log_access, HttpError, HttpResult, Req, RequestContext, Resp, Router};

pub struct HttpServer<S> {
    router: Arc<Router<S>>,
    state: Arc<S>,
}

impl<S> Clone for HttpServer<S> {
    fn clone(&self) -> Self {
        Self { router: self.router.clone(), state: self.state.clone() }
    }
}

impl<S: Send + Sync + 'static> HttpServer<S> {
    pub fn new(router: Router<S>, state: Arc<S>) -> Self {
        Self { router: Arc::new(router), state }
    }

    /// Bind `addr` and serve until Ctrl-C
    pub async fn serve(self, addr: &str) -> HttpResult<()> {
        let addr: SocketAddr = addr.parse().map_err(|_| HttpError::InvalidAddress(addr.to_string()))?;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| HttpError::Bind { addr: addr.to_string(), source })?;

        self.serve_listener(listener, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                log::error!("failed to listen for shutdown signal: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Serve on an already bound listener until `shutdown` resolves
    pub async fn serve_listener(
        self,
        listener: TcpListener,
        shutdown: impl Future<Output = ()>,
    ) -> HttpResult<()> {
        log::info!("listening on http://{}", listener.local_addr()?);
        tokio::pin!(shutdown);

        loop {
            let (stream, remote) = tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok(conn) => conn,
                    Err(e) => {
                        log::warn!("accept failed: {}", e);
                        continue;
                    }
                },
                _ = &mut shutdown => {
                    log::info!("shutdown signal received, no longer accepting connections");
                    return Ok(());
                }
            };

            let server = self.clone();
            tokio::spawn(async move {
                let service = service_fn(move |req: Req| {
                    let server = server.clone();
                    async move { Ok::<_, Infallible>(server.handle(req, remote).await) }
                });
                if let Err(err) =
                    http1::Builder::new().serve_connection(TokioIo::new(stream), service).await
                {
                    log::debug!("connection from {} closed: {}", remote, err);
                }
            });
        }
    }

    async fn handle(&self, req: Req, remote: SocketAddr) -> Resp {
        let start = Instant::now();
        let (parts, _body) = req.into_parts();
        let ctx = RequestContext::from_parts(&parts, Some(remote));
        let access = ctx.clone();

        let resp = self.router.dispatch(self.state.clone(), ctx).await;
        log_access(&access, &resp, start);
        resp
    }
}
