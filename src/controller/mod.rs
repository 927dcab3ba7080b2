// Controller metadata is usually declared through macros:
// - #[controller(...)] on the struct implements `Controller`
// - #[routes] on an impl block implements `RouteDeclarations`
//
// The registry turns those declarations into descriptors once, at startup.
mod declared;
mod descriptor;
mod registry;

pub use declared::{ClassRoute, DeclaredRoutes, MethodRoute, RouteIntrospector};
pub use descriptor::ControllerDescriptor;
pub use registry::{
    ControllerRegistration, ControllerRegistry, ControllerRegistryBuilder, ControllerSource,
};

/// Types that describe themselves as controllers.
///
/// Implemented by `#[controller(...)]`.
pub trait Controller {
    fn registration() -> ControllerRegistration;
}

/// Explicit routes declared on a controller's methods.
///
/// Implemented by `#[routes]`.
pub trait RouteDeclarations {
    fn method_routes() -> Vec<MethodRoute>;
}
