use pageroute::controller::{
    Controller, ControllerRegistry, ControllerSource, MethodRoute, RouteDeclarations,
    RouteIntrospector,
};

mod controller {
    pub mod pages {
        #[pageroute::controller(template_routes, bundle = "SiteBundle", abstract_controller)]
        pub struct BasePagesController;

        #[pageroute::controller(path = "/blog", name = "blog_", extends = BasePagesController)]
        pub struct BlogController;

        #[pageroute::routes]
        impl BlogController {
            #[route("/feed", name = "feed")]
            pub fn feed(&self) -> &'static str {
                "feed"
            }

            #[get("/detail")]
            #[post("/detail/edit")]
            pub fn detail(&self) -> &'static str {
                "detail"
            }

            pub fn helper(&self) -> &'static str {
                "helper"
            }
        }

        #[pageroute::controller(template_dir = "pages/about", extends = "BasePagesController")]
        pub struct AboutController;
    }
}

use controller::pages::{AboutController, BasePagesController, BlogController};

#[test]
fn test_controller_registration() {
    let registration = BlogController::registration();
    assert!(
        registration
            .type_name()
            .ends_with("controller::pages::BlogController")
    );
}

#[test]
fn test_method_routes_collected() {
    assert_eq!(
        BlogController::method_routes(),
        vec![
            MethodRoute::new("feed").name("feed").path("/feed"),
            MethodRoute::new("detail").path("/detail").path("/detail/edit"),
        ]
    );

    // attributes are stripped, methods stay callable
    let blog = BlogController;
    assert_eq!(blog.feed(), "feed");
    assert_eq!(blog.detail(), "detail");
    assert_eq!(blog.helper(), "helper");
}

#[test]
fn test_registry_from_macros() {
    let registry = ControllerRegistry::builder()
        .register::<BasePagesController>()
        .register_with_routes::<BlogController>()
        .register::<AboutController>()
        .build();

    assert_eq!(registry.len(), 2);
    assert_eq!(registry.template_controllers().count(), 2);

    let blog = registry
        .iter()
        .find(|c| c.short_name() == "BlogController")
        .unwrap();
    assert_eq!(blog.bundle(), Some("SiteBundle"));
    assert_eq!(blog.namespace_segments("controller"), vec!["pages", "Blog"]);

    let declared = registry.declared_routes(blog);
    assert_eq!(declared.name_prefix(), Some("blog_"));
    assert_eq!(declared.path_prefix(), Some("/blog"));
    assert_eq!(
        declared.explicit_paths(),
        vec!["/blog/feed", "/blog/detail", "/blog/detail/edit"]
    );

    let about = registry
        .iter()
        .find(|c| c.short_name() == "AboutController")
        .unwrap();
    assert_eq!(about.template_dir(), Some("pages/about"));
    assert!(about.is_template_based());
}
