//! # Pageroute
//!
//! Convention-based routes for template-backed page controllers.
//!
//! A controller marked with `template_routes` gets one route per template file
//! in its template directory, all served by the controller's shared
//! `resolve_simple_route` handler. Routes the controller declares explicitly
//! always win over synthesized ones.
//!
//! ## Features
//!
//! - **Route synthesis**: names and paths derived from the controller namespace and template file names
//! - **Explicit routes first**: declared method routes suppress conflicting candidates
//! - **Declarative controllers**: `#[controller(...)]` and `#[routes]` attribute macros
//! - **Route loaders**: merge synthesized and annotated routes with collision detection
//! - **Axum integration**: mount template routes onto an `axum::Router`
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pageroute::prelude::*;
//!
//! mod controller {
//!     pub mod pages {
//!         #[pageroute::controller(template_routes)]
//!         pub struct BlogController;
//!     }
//! }
//!
//! struct Renderer;
//!
//! #[async_trait]
//! impl SimpleRouteHandler for Renderer {
//!     async fn resolve_simple_route(
//!         &self,
//!         route: &TemplateRoute,
//!         _params: HashMap<String, String>,
//!     ) -> anyhow::Result<Response> {
//!         Ok(format!("rendering {}", route.template).into_response())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // templates/pages/blog/index.html -> pages_blog_index -> /blog
//!     let registry = ControllerRegistry::builder()
//!         .register::<controller::pages::BlogController>()
//!         .build();
//!
//!     let synthesizer = RouteSynthesizer::builder()
//!         .registry(Arc::new(registry))
//!         .config(RoutingConfig::from_env()?)
//!         .build()?;
//!
//!     let routes = synthesizer.synthesize_async().await?;
//!     let app: Router = routes.into_router(Arc::new(Renderer));
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

extern crate self as pageroute;

pub mod config;
pub mod controller;
pub mod error;
pub mod fs;
pub mod loader;
pub mod resolver;
pub mod route;
pub mod router;
pub mod synthesizer;

// Re-export core types
pub use config::{RoutingConfig, ScanDepth};
pub use controller::{Controller, ControllerRegistry, RouteDeclarations};
pub use error::{ResolutionError, Result, RoutingError};
pub use loader::{AnnotatedRouteLoader, RouteLoader, load_routes};
pub use route::{RouteCollection, RouteRecord, UrlGenerator};
pub use router::{SimpleRouteHandler, TemplateRoute};
pub use synthesizer::RouteSynthesizer;

// Re-export macros
pub use pageroute_macro::{controller, routes};

// Re-export commonly used types from dependencies
pub use async_trait::async_trait;
pub use axum;

/// Prelude module for convenient imports
///
/// ```
/// use pageroute::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::{RoutingConfig, ScanDepth};
    pub use crate::controller::{
        ClassRoute, Controller, ControllerRegistration, ControllerRegistry, MethodRoute,
        RouteDeclarations,
    };
    pub use crate::error::{Result, RoutingError};
    pub use crate::loader::{AnnotatedRouteLoader, RouteLoader, load_routes};
    pub use crate::resolver::{BundleRegistry, ProjectRoot};
    pub use crate::route::{RouteCollection, RouteRecord, UrlGenerator};
    pub use crate::router::{SimpleRouteHandler, TemplateRoute};
    pub use crate::synthesizer::RouteSynthesizer;
    pub use async_trait::async_trait;
    pub use axum::{
        Router,
        response::{IntoResponse, Response},
    };
    pub use std::collections::HashMap;
    pub use std::sync::Arc;
}
