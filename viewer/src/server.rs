//! Read-only HTTP front end.
//!
//! Handlers share the store through an `Arc` and never lock: nothing is
//! written after startup.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::{Path, State};
use axum::http::{StatusCode, Uri, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use guide::DocumentStore;
use tokio::net::TcpListener;
use tracing::{debug, info};

use crate::navigate::{Navigator, render_index};
use crate::render::{HtmlRenderer, Renderer};

pub type SharedStore = Arc<DocumentStore>;

pub fn router(store: SharedStore) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/docs/{name}", get(show_document))
        .fallback(not_found)
        .with_state(store)
}

/// Bind `addr` and serve until the process ends.
pub async fn serve(store: SharedStore, addr: SocketAddr) -> io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    serve_listener(store, listener).await
}

pub async fn serve_listener(store: SharedStore, listener: TcpListener) -> io::Result<()> {
    info!(addr = %listener.local_addr()?, documents = store.len(), "serving guides");
    axum::serve(listener, router(store)).await
}

pub async fn index(State(store): State<SharedStore>) -> Html<String> {
    Html(render_index(&store))
}

pub async fn show_document(
    State(store): State<SharedStore>,
    Path(name): Path<String>,
) -> Response {
    let navigator = Navigator::new(&store);
    match navigator.resolve(&name) {
        Ok(document) => {
            debug!(guide = %document.name, "serving guide");
            let renderer = HtmlRenderer {
                standalone: true,
                index_href: Some("/".to_string()),
            };
            (
                [(header::CONTENT_TYPE, renderer.content_type())],
                renderer.render(document),
            )
                .into_response()
        }
        Err(err) => {
            info!(request = %name, "guide not found");
            (StatusCode::NOT_FOUND, err.to_string()).into_response()
        }
    }
}

pub async fn not_found(uri: Uri) -> (StatusCode, String) {
    debug!(%uri, "no route");
    (StatusCode::NOT_FOUND, format!("not found: {}", uri.path()))
}
