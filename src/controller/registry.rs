use super::{
    ClassRoute, Controller, ControllerDescriptor, DeclaredRoutes, MethodRoute, RouteDeclarations,
    RouteIntrospector,
};
use std::collections::{HashMap, HashSet};

/// Raw metadata of one controller type, before inheritance is resolved.
///
/// Usually produced by `#[controller(...)]`; can be written by hand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerRegistration {
    type_name: String,
    bundle: Option<String>,
    template_dir: Option<String>,
    template_routes: bool,
    is_abstract: bool,
    extends: Option<String>,
    class_route: Option<ClassRoute>,
    method_routes: Vec<MethodRoute>,
}

impl ControllerRegistration {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            bundle: None,
            template_dir: None,
            template_routes: false,
            is_abstract: false,
            extends: None,
            class_route: None,
            method_routes: Vec::new(),
        }
    }

    pub fn bundle(mut self, bundle: impl Into<String>) -> Self {
        self.bundle = Some(bundle.into());
        self
    }

    pub fn template_dir(mut self, dir: impl Into<String>) -> Self {
        self.template_dir = Some(dir.into());
        self
    }

    /// Marks the type for template route synthesis; subtypes inherit the mark.
    pub fn template_routes(mut self) -> Self {
        self.template_routes = true;
        self
    }

    /// Takes part in inheritance resolution but is never yielded itself.
    pub fn abstract_controller(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    pub fn extends(mut self, parent_type_name: impl Into<String>) -> Self {
        self.extends = Some(parent_type_name.into());
        self
    }

    pub fn class_route(mut self, class_route: ClassRoute) -> Self {
        self.class_route = Some(class_route);
        self
    }

    pub fn method_route(mut self, route: MethodRoute) -> Self {
        self.method_routes.push(route);
        self
    }

    pub fn method_routes(mut self, routes: impl IntoIterator<Item = MethodRoute>) -> Self {
        self.method_routes.extend(routes);
        self
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }
}

/// Restartable source of controllers eligible for template routes.
pub trait ControllerSource: Send + Sync {
    fn template_controllers(&self) -> Box<dyn Iterator<Item = &ControllerDescriptor> + '_>;
}

#[derive(Debug, Clone)]
struct RegisteredController {
    descriptor: ControllerDescriptor,
    routes: DeclaredRoutes,
}

/// Every concrete controller of the application, inheritance resolved.
#[derive(Debug, Clone, Default)]
pub struct ControllerRegistry {
    entries: Vec<RegisteredController>,
    index: HashMap<String, usize>,
}

impl ControllerRegistry {
    pub fn builder() -> ControllerRegistryBuilder {
        ControllerRegistryBuilder::new()
    }

    /// Concrete controllers in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &ControllerDescriptor> {
        self.entries.iter().map(|e| &e.descriptor)
    }

    pub fn get(&self, type_name: &str) -> Option<&ControllerDescriptor> {
        self.index.get(type_name).map(|&i| &self.entries[i].descriptor)
    }

    pub fn declared(&self, type_name: &str) -> Option<&DeclaredRoutes> {
        self.index.get(type_name).map(|&i| &self.entries[i].routes)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ControllerSource for ControllerRegistry {
    fn template_controllers(&self) -> Box<dyn Iterator<Item = &ControllerDescriptor> + '_> {
        Box::new(self.iter().filter(|c| c.is_template_based()))
    }
}

impl RouteIntrospector for ControllerRegistry {
    fn declared_routes(&self, controller: &ControllerDescriptor) -> DeclaredRoutes {
        self.declared(controller.type_name())
            .cloned()
            .unwrap_or_default()
    }
}

/// Collects registrations, then resolves markers and route declarations
/// through `extends` chains once.
#[derive(Debug, Default)]
pub struct ControllerRegistryBuilder {
    registrations: Vec<ControllerRegistration>,
}

impl ControllerRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<T: Controller>(self) -> Self {
        self.add(T::registration())
    }

    pub fn register_with_routes<T: Controller + RouteDeclarations>(self) -> Self {
        self.add(T::registration().method_routes(T::method_routes()))
    }

    pub fn add(mut self, registration: ControllerRegistration) -> Self {
        self.registrations.push(registration);
        self
    }

    pub fn add_abstract(self, registration: ControllerRegistration) -> Self {
        self.add(registration.abstract_controller())
    }

    pub fn build(self) -> ControllerRegistry {
        let mut by_name: HashMap<&str, &ControllerRegistration> = HashMap::new();
        for registration in &self.registrations {
            by_name.entry(registration.type_name.as_str()).or_insert(registration);
        }

        let mut registry = ControllerRegistry::default();
        for registration in &self.registrations {
            if registration.is_abstract {
                continue;
            }
            if registry.index.contains_key(&registration.type_name) {
                tracing::warn!(
                    "Controller {} registered twice, keeping the first registration",
                    registration.type_name
                );
                continue;
            }

            let lineage = lineage(registration, &by_name);
            let template_based = lineage.iter().any(|r| r.template_routes);
            if template_based {
                tracing::debug!("Tagged {} for template routes", registration.type_name);
            }

            let mut descriptor = ControllerDescriptor::new(&registration.type_name)
                .template_based(template_based);
            if let Some(bundle) = lineage.iter().find_map(|r| r.bundle.as_ref()) {
                descriptor = descriptor.with_bundle(bundle);
            }
            if let Some(dir) = &registration.template_dir {
                descriptor = descriptor.with_template_dir(dir);
            }

            let routes = DeclaredRoutes {
                class: lineage.iter().find_map(|r| r.class_route.clone()),
                methods: lineage
                    .iter()
                    .flat_map(|r| r.method_routes.iter().cloned())
                    .collect(),
            };

            registry
                .index
                .insert(registration.type_name.clone(), registry.entries.len());
            registry
                .entries
                .push(RegisteredController { descriptor, routes });
        }
        registry
    }
}

/// `registration` followed by its ancestors, nearest first. Stops at unknown
/// parents and at cycles.
fn lineage<'a>(
    registration: &'a ControllerRegistration,
    by_name: &HashMap<&str, &'a ControllerRegistration>,
) -> Vec<&'a ControllerRegistration> {
    let mut chain = vec![registration];
    let mut seen = HashSet::from([registration.type_name.as_str()]);
    let mut current = registration;

    while let Some(parent) = current.extends.as_deref() {
        if !seen.insert(parent) {
            tracing::warn!("Inheritance cycle detected at {}", parent);
            break;
        }
        let Some(&next) = by_name.get(parent) else {
            break;
        };
        chain.push(next);
        current = next;
    }
    chain
}
