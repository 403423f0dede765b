use crate::report::{ApiRequest, ApiResponse, Reporter};
use anyhow::Result;
use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderName, HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Response},
    routing::any,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = status;

        let headers = response.headers_mut();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        for (name, value) in self.headers {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(&value),
            ) {
                (Ok(name), Ok(value)) => {
                    headers.insert(name, value);
                }
                _ => error!("Dropping invalid response header {}", name),
            }
        }
        response
    }
}

async fn rates(State(reporter): State<Arc<Reporter>>, method: Method) -> ApiResponse {
    reporter.handle(&ApiRequest::new(method.as_str())).await
}

/// Every method is routed to the reporter so that it can answer 405 itself.
pub fn router(reporter: Arc<Reporter>) -> Router {
    Router::new()
        .route("/", any(rates))
        .route("/rates", any(rates))
        .with_state(reporter)
}

pub async fn serve(listener: TcpListener, reporter: Arc<Reporter>) -> Result<()> {
    axum::serve(listener, router(reporter)).await?;
    Ok(())
}

pub async fn run(addr: SocketAddr, reporter: Arc<Reporter>) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Listening on {}", listener.local_addr()?);
    serve(listener, reporter).await
}
