use axum::{Json, routing::get};
use pageroute::prelude::*;
use std::path::PathBuf;

mod controller;

use controller::pages::{BlogController, HomeController, PagesController};

/// Reads the template file and fills `{{ key }}` markers.
struct FileRenderer;

#[async_trait]
impl SimpleRouteHandler for FileRenderer {
    async fn resolve_simple_route(
        &self,
        route: &TemplateRoute,
        params: HashMap<String, String>,
    ) -> anyhow::Result<Response> {
        let file = route
            .template_file
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("route {} has no template file", route.name))?;
        let mut html = tokio::fs::read_to_string(file).await?;

        let mut values = params;
        values.insert("route".to_string(), route.name.clone());
        values.insert("template".to_string(), route.template.clone());
        values.insert("controller".to_string(), route.controller.clone());
        for (key, value) in &values {
            html = html.replace(&format!("{{{{ {key} }}}}"), value);
        }
        Ok(axum::response::Html(html).into_response())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    tracing::info!("Starting pages server...");

    // 1. Configuration, templates next to the manifest unless overridden
    let mut config = RoutingConfig::from_env()?;
    if std::env::var_os("PAGEROUTE_TEMPLATE_ROOT").is_none() {
        config.template_root = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("templates");
    }

    // 2. Controllers
    let registry = Arc::new(
        ControllerRegistry::builder()
            .register::<PagesController>()
            .register::<HomeController>()
            .register_with_routes::<BlogController>()
            .build(),
    );

    // 3. Routes: explicit first, then synthesized
    let synthesizer = RouteSynthesizer::builder()
        .registry(registry.clone())
        .config(config)
        .build()?;
    let annotated = AnnotatedRouteLoader::new(registry);
    let routes = load_routes(&[&annotated, &synthesizer])?;
    for route in &routes {
        tracing::info!("{} -> {} ({})", route.name, route.path, route.defaults.handler);
    }

    let manifest = serde_json::to_value(&routes)?;
    let feed_url = UrlGenerator::new(&routes).generate("blog_feed", &HashMap::new())?;

    // 4. Router
    let router: Router = routes
        .into_router(Arc::new(FileRenderer))
        .route(&feed_url, get(BlogController::feed))
        .route("/_routes", get(move || async move { Json(manifest) }));

    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("{}:{}", host, port);

    tracing::info!("Server running on http://127.0.0.1:{}", port);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}
