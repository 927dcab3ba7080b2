use proc_macro::TokenStream;

mod controller;
mod routes;

/// Attribute macro declaring a controller and its class-level route metadata
///
/// Implements `pageroute::controller::Controller` for the struct.
///
/// # Example
/// ```ignore
/// use pageroute::controller;
///
/// #[controller(path = "/blog", name = "blog_", bundle = "BlogBundle", template_routes)]
/// pub struct BlogController;
///
/// #[controller(extends = BlogController)]
/// pub struct NewsController;
/// ```
///
/// Supported keys:
/// - `path`, `name`: class route prefixes
/// - `bundle`, `template_dir`: where the templates live
/// - `template_routes`: synthesize routes from templates (inherited)
/// - `extends = Parent`: inherit markers and routes from another controller
/// - `abstract_controller`: only ever used as a parent
#[proc_macro_attribute]
pub fn controller(attr: TokenStream, item: TokenStream) -> TokenStream {
    controller::controller_attribute(attr, item)
}

/// Attribute macro collecting explicit method routes of an impl block
///
/// Implements `pageroute::controller::RouteDeclarations`. `#[route]` and the
/// HTTP method attributes are removed from the methods.
///
/// # Example
/// ```ignore
/// #[routes]
/// impl BlogController {
///     #[route("/feed", name = "blog_feed")]
///     async fn feed(&self) -> Response { ... }
///
///     #[get("/detail")]
///     async fn detail(&self) -> Response { ... }
/// }
/// ```
#[proc_macro_attribute]
pub fn routes(attr: TokenStream, item: TokenStream) -> TokenStream {
    routes::routes_attribute(attr, item)
}
