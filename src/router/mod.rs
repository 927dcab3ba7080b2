//! Mounting synthesized template routes onto an axum [`Router`].

use crate::route::builder::{normalize, to_axum_path};
use crate::route::{RouteCollection, RouteRecord};
use async_trait::async_trait;
use axum::{
    Router,
    extract::Path,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;

/// What a template route hands to the host when it is hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateRoute {
    pub name: String,
    pub controller: String,
    pub template: String,
    pub template_file: Option<PathBuf>,
}

impl TemplateRoute {
    fn from_record(record: &RouteRecord) -> Option<Self> {
        let template = record.defaults.template.clone()?;
        Some(Self {
            name: record.name.clone(),
            controller: record.defaults.controller.clone(),
            template,
            template_file: record.defaults.template_file.clone(),
        })
    }
}

/// Host-side renderer behind every template route.
#[async_trait]
pub trait SimpleRouteHandler: Send + Sync + 'static {
    async fn resolve_simple_route(
        &self,
        route: &TemplateRoute,
        params: HashMap<String, String>,
    ) -> anyhow::Result<Response>;
}

impl RouteCollection {
    /// `GET` routes for every template record, served by `handler`.
    ///
    /// Records without a template are left to the host. A path matching one
    /// that is already mounted, placeholder names aside, is skipped with a
    /// warning.
    pub fn into_router<S>(self, handler: Arc<dyn SimpleRouteHandler>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        let mut router = Router::new();
        let mut mounted = HashSet::new();

        for record in &self {
            let Some(route) = TemplateRoute::from_record(record) else {
                continue;
            };
            let path = to_axum_path(&record.path);
            if !mounted.insert(normalize(&record.path)) {
                tracing::warn!("Path {} already mounted, skipping route {}", path, record.name);
                continue;
            }

            tracing::debug!("Mounting {} at {}", route.name, path);
            let route = Arc::new(route);
            let handler = handler.clone();
            router = router.route(
                &path,
                get(move |params: Option<Path<HashMap<String, String>>>| {
                    let route = route.clone();
                    let handler = handler.clone();
                    async move {
                        let params = params.map(|Path(p)| p).unwrap_or_default();
                        match handler.resolve_simple_route(&route, params).await {
                            Ok(response) => response,
                            Err(e) => {
                                tracing::error!("Rendering {} failed: {:#}", route.name, e);
                                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
                            }
                        }
                    }
                }),
            );
        }
        router
    }
}
