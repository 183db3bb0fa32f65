//! Blocking HTTP front end.

pub(crate) mod response;
pub(crate) mod routes;
pub(crate) mod state;

use std::{io::Read, net::SocketAddr, sync::Arc};

use anyhow::{Context, Result, anyhow};
use tiny_http::{Header, Request, Response, Server, StatusCode};

use self::{
    response::ApiResponse,
    routes::{ApiRequest, Method},
    state::AppState,
};

/// Bound server ready to accept requests.
pub struct BoundServer {
    server: Server,
    addr: Option<SocketAddr>,
    state: Arc<AppState>,
}

/// Bind the listen address from `state.config.bind` without starting the request loop.
pub fn bind(state: AppState) -> Result<BoundServer> {
    let server = Server::http(&state.config.bind)
        .map_err(|e| anyhow!("bind {}: {e}", state.config.bind))?;
    let addr = server.server_addr().to_ip();
    match addr {
        Some(addr) => tracing::info!("serving on http://{addr}"),
        None => tracing::info!("serving on {}", state.config.bind),
    }
    Ok(BoundServer {
        server,
        addr,
        state: Arc::new(state),
    })
}

impl BoundServer {
    /// Bound socket address, when listening on IP.
    pub fn addr(&self) -> Option<SocketAddr> {
        self.addr
    }

    /// Run the request loop (blocking).
    pub fn run(self) -> Result<()> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.state.config.workers.max(1))
            .thread_name(|i| format!("bunnywear-http-{i}"))
            .build()
            .context("create request thread pool")?;

        for request in self.server.incoming_requests() {
            let state = Arc::clone(&self.state);
            pool.spawn(move || {
                if let Err(e) = handle_request(request, &state) {
                    tracing::warn!("request error: {e:#}");
                }
            });
        }
        Ok(())
    }
}

fn handle_request(mut request: Request, state: &AppState) -> Result<()> {
    let method = match request.method() {
        tiny_http::Method::Get => Method::Get,
        tiny_http::Method::Post => Method::Post,
        tiny_http::Method::Put => Method::Put,
        _ => Method::Other,
    };
    let target = request.url().to_string();

    let limit = state.config.max_body_bytes;
    let mut body = Vec::new();
    request
        .as_reader()
        .take(limit as u64 + 1)
        .read_to_end(&mut body)
        .context("read request body")?;

    let resp = if body.len() > limit {
        ApiResponse::failure(413, "request body too large")
    } else {
        routes::dispatch(state, &ApiRequest::new(method, &target, body))
    };
    tracing::debug!(?method, %target, status = resp.status, "handled");
    respond(request, resp)
}

fn respond(request: Request, resp: ApiResponse) -> Result<()> {
    let mut response = Response::from_data(resp.body)
        .with_status_code(StatusCode(resp.status))
        .with_header(make_header("Content-Type", resp.content_type)?);
    for (name, value) in &resp.headers {
        response = response.with_header(make_header(name, value)?);
    }
    request.respond(response)?;
    Ok(())
}

fn make_header(key: &str, value: &str) -> Result<Header> {
    Header::from_bytes(key.as_bytes(), value.as_bytes())
        .map_err(|()| anyhow!("invalid header {key}: {value}"))
}
