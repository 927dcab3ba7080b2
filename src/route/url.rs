//! URL generation over a built [`RouteCollection`], for template helpers.

use super::RouteCollection;
use super::builder::{Piece, join_segments, normalize, pieces, split_segments};
use crate::error::{Result, RoutingError};
use std::collections::HashMap;

pub struct UrlGenerator<'a> {
    routes: &'a RouteCollection,
}

impl<'a> UrlGenerator<'a> {
    pub fn new(routes: &'a RouteCollection) -> Self {
        Self { routes }
    }

    /// Fills the placeholders of route `name` from `params`.
    ///
    /// Placeholders with a default fall back to it; a segment left empty by an
    /// optional placeholder is dropped.
    pub fn generate(&self, name: &str, params: &HashMap<String, String>) -> Result<String> {
        let route = self
            .routes
            .get(name)
            .ok_or_else(|| RoutingError::RouteNotFound {
                name: name.to_string(),
            })?;

        let mut segments = Vec::new();
        for segment in split_segments(&route.path) {
            let mut rendered = String::new();
            for piece in pieces(segment) {
                match piece {
                    Piece::Literal(text) => rendered.push_str(&text),
                    Piece::Param { name: param, default, .. } => {
                        let value = params.get(&param).cloned().or(default).ok_or_else(|| {
                            RoutingError::MissingParameter {
                                route: name.to_string(),
                                parameter: param.clone(),
                            }
                        })?;
                        rendered.push_str(&value);
                    }
                }
            }
            if !rendered.is_empty() {
                segments.push(rendered);
            }
        }
        Ok(join_segments(segments))
    }

    /// Whether route `name`, generated with `params`, points at `current_path`.
    ///
    /// Unknown routes and missing parameters simply are not current.
    pub fn is_current(
        &self,
        name: &str,
        params: &HashMap<String, String>,
        current_path: &str,
    ) -> bool {
        self.generate(name, params)
            .map(|generated| normalize(&generated) == normalize(current_path))
            .unwrap_or(false)
    }
}
