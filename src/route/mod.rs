//! Route records and the ordered, name-unique collection the synthesizer emits.

pub mod builder;
pub mod url;

pub use url::UrlGenerator;

use crate::error::{Result, RoutingError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Method every synthesized route dispatches to on its controller.
pub const SIMPLE_ROUTE_HANDLER: &str = "resolve_simple_route";

/// Default parameters attached to a route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteDefaults {
    /// `<controller type>::<method>`
    pub handler: String,
    pub controller: String,
    /// Template base name, for synthesized routes only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRecord {
    pub name: String,
    pub path: String,
    pub defaults: RouteDefaults,
}

impl RouteRecord {
    /// A route served by the shared simple-template handler of `controller`.
    pub fn template(
        name: impl Into<String>,
        path: impl Into<String>,
        controller: &str,
        template: impl Into<String>,
        template_file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            defaults: RouteDefaults {
                handler: format!("{controller}::{SIMPLE_ROUTE_HANDLER}"),
                controller: controller.to_string(),
                template: Some(template.into()),
                template_file: Some(template_file.into()),
            },
        }
    }

    /// A route served by a dedicated controller method.
    pub fn explicit(
        name: impl Into<String>,
        path: impl Into<String>,
        controller: &str,
        method: &str,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            defaults: RouteDefaults {
                handler: format!("{controller}::{method}"),
                controller: controller.to_string(),
                template: None,
                template_file: None,
            },
        }
    }

    pub fn is_template(&self) -> bool {
        self.defaults.template.is_some()
    }
}

/// Routes keyed by unique name, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteCollection {
    routes: Vec<RouteRecord>,
    index: HashMap<String, usize>,
}

impl RouteCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `route`, refusing a name that is already taken.
    pub fn insert(&mut self, route: RouteRecord) -> Result<()> {
        if let Some(&existing) = self.index.get(&route.name) {
            let existing = &self.routes[existing];
            return Err(RoutingError::NameCollision {
                name: route.name,
                existing: format!("{} ({})", existing.path, existing.defaults.handler),
                rejected: format!("{} ({})", route.path, route.defaults.handler),
            });
        }
        self.index.insert(route.name.clone(), self.routes.len());
        self.routes.push(route);
        Ok(())
    }

    /// Moves every route of `other` in, stopping at the first collision.
    pub fn extend(&mut self, other: RouteCollection) -> Result<()> {
        for route in other.routes {
            self.insert(route)?;
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&RouteRecord> {
        self.index.get(name).map(|&i| &self.routes[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RouteRecord> {
        self.routes.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.routes.iter().map(|r| r.name.as_str())
    }

    /// Routes whose handler lives on `controller`.
    pub fn routes_for_controller<'a>(
        &'a self,
        controller: &'a str,
    ) -> impl Iterator<Item = &'a RouteRecord> {
        self.routes
            .iter()
            .filter(move |r| r.defaults.controller == controller)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Route manifest as pretty-printed JSON, in insertion order.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl Serialize for RouteCollection {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.routes)
    }
}

impl IntoIterator for RouteCollection {
    type Item = RouteRecord;
    type IntoIter = std::vec::IntoIter<RouteRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.routes.into_iter()
    }
}

impl<'a> IntoIterator for &'a RouteCollection {
    type Item = &'a RouteRecord;
    type IntoIter = std::slice::Iter<'a, RouteRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.routes.iter()
    }
}
