//! Route loaders: named producers of route collections that a host merges
//! into its routing table.

use crate::controller::{ControllerRegistry, RouteIntrospector};
use crate::error::Result;
use crate::route::builder::{NAME_SEPARATOR, combine, words};
use crate::route::{RouteCollection, RouteRecord};
use crate::synthesizer::RouteSynthesizer;
use std::sync::Arc;

/// Resource name the template route loader answers to.
pub const TEMPLATE_ROUTES_RESOURCE: &str = "template_based_routes";

/// Resource name of [`AnnotatedRouteLoader`].
pub const ANNOTATED_ROUTES_RESOURCE: &str = "annotated_routes";

pub trait RouteLoader: Send + Sync {
    /// Resource name this loader is registered under.
    fn name(&self) -> &str;

    fn supports(&self, resource: &str) -> bool {
        resource == self.name()
    }

    fn load(&self) -> Result<RouteCollection>;
}

impl RouteLoader for RouteSynthesizer {
    fn name(&self) -> &str {
        TEMPLATE_ROUTES_RESOURCE
    }

    fn load(&self) -> Result<RouteCollection> {
        self.synthesize()
    }
}

/// Emits the explicitly declared method routes of every registered controller.
#[derive(Clone)]
pub struct AnnotatedRouteLoader {
    registry: Arc<ControllerRegistry>,
}

impl AnnotatedRouteLoader {
    pub fn new(registry: Arc<ControllerRegistry>) -> Self {
        Self { registry }
    }
}

impl RouteLoader for AnnotatedRouteLoader {
    fn name(&self) -> &str {
        ANNOTATED_ROUTES_RESOURCE
    }

    fn load(&self) -> Result<RouteCollection> {
        let mut routes = RouteCollection::new();

        for controller in self.registry.iter() {
            let declared = self.registry.declared_routes(controller);
            let name_prefix = declared.name_prefix().unwrap_or_default();
            let class_paths = match &declared.class {
                Some(class) if !class.paths.is_empty() => class.paths.clone(),
                _ => vec![String::new()],
            };
            let controller_words = words(
                controller
                    .short_name()
                    .strip_suffix("Controller")
                    .unwrap_or(controller.short_name()),
            );

            for method in &declared.methods {
                let base = match &method.name {
                    Some(name) => name.clone(),
                    None => controller_words
                        .iter()
                        .cloned()
                        .chain(words(&method.method))
                        .collect::<Vec<_>>()
                        .join(&NAME_SEPARATOR.to_string()),
                };
                let method_paths = if method.paths.is_empty() {
                    vec![String::new()]
                } else {
                    method.paths.clone()
                };

                let mut n = 0;
                for method_path in &method_paths {
                    for class_path in &class_paths {
                        let name = match n {
                            0 => format!("{name_prefix}{base}"),
                            n => format!("{name_prefix}{base}{NAME_SEPARATOR}{n}"),
                        };
                        routes.insert(RouteRecord::explicit(
                            name,
                            combine(class_path, method_path),
                            controller.type_name(),
                            &method.method,
                        ))?;
                        n += 1;
                    }
                }
            }
        }

        tracing::debug!("Loaded {} annotated routes", routes.len());
        Ok(routes)
    }
}

/// Runs `loaders` in order and merges their output. The first name collision
/// aborts the merge.
pub fn load_routes(loaders: &[&dyn RouteLoader]) -> Result<RouteCollection> {
    let mut routes = RouteCollection::new();
    for loader in loaders {
        let loaded = loader.load()?;
        tracing::info!("Loader {} produced {} routes", loader.name(), loaded.len());
        routes.extend(loaded)?;
    }
    Ok(routes)
}
