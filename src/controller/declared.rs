use super::ControllerDescriptor;
use crate::route::builder::combine;

/// Class-level route declaration: a name prefix and path prefixes shared by
/// every route of the controller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassRoute {
    pub name: Option<String>,
    pub paths: Vec<String>,
}

impl ClassRoute {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.paths.push(path.into());
        self
    }
}

/// Route declared on a single controller method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodRoute {
    pub method: String,
    pub name: Option<String>,
    pub paths: Vec<String>,
}

impl MethodRoute {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            name: None,
            paths: Vec::new(),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.paths.push(path.into());
        self
    }
}

/// Everything a controller declares explicitly, ancestors included.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeclaredRoutes {
    pub class: Option<ClassRoute>,
    pub methods: Vec<MethodRoute>,
}

impl DeclaredRoutes {
    /// Non-empty class-level name prefix.
    pub fn name_prefix(&self) -> Option<&str> {
        self.class
            .as_ref()
            .and_then(|c| c.name.as_deref())
            .filter(|n| !n.is_empty())
    }

    /// First non-empty class-level path prefix.
    pub fn path_prefix(&self) -> Option<&str> {
        self.class
            .as_ref()
            .and_then(|c| c.paths.first())
            .map(String::as_str)
            .filter(|p| !p.is_empty())
    }

    /// Every explicit path: class prefixes crossed with method paths.
    pub fn explicit_paths(&self) -> Vec<String> {
        let class_paths = match &self.class {
            Some(class) if !class.paths.is_empty() => class.paths.clone(),
            _ => vec![String::new()],
        };

        let mut paths = Vec::new();
        for method in &self.methods {
            let method_paths = if method.paths.is_empty() {
                vec![String::new()]
            } else {
                method.paths.clone()
            };
            for method_path in &method_paths {
                for class_path in &class_paths {
                    paths.push(combine(class_path, method_path));
                }
            }
        }
        paths
    }
}

/// Source of explicit route declarations, standing in for attribute reflection.
pub trait RouteIntrospector: Send + Sync {
    fn declared_routes(&self, controller: &ControllerDescriptor) -> DeclaredRoutes;
}
