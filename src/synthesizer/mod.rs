//! Template route synthesis.
//!
//! For every template-based page controller the synthesizer resolves its
//! template directory, lists the templates in it and turns each one into a
//! route served by the controller's simple-template handler. Paths that the
//! controller already declares explicitly are left alone.
//!
//! ```text
//! ControllerSource ──► TemplateDirResolver ──► FileLister
//!        │                                          │
//!        └──► RouteIntrospector ──► candidates ◄────┘
//!                                       │
//!                                 RouteCollection
//! ```

use crate::config::RoutingConfig;
use crate::controller::{ControllerDescriptor, ControllerSource, RouteIntrospector};
use crate::error::{ResolutionError, Result, RoutingError};
use crate::fs::{FileLister, TemplateFile, WalkDirLister};
use crate::resolver::{BundleLocator, BundleRegistry, ProjectRootProvider, TemplateDirResolver};
use crate::route::builder::{normalize, route_name, route_path};
use crate::route::{RouteCollection, RouteRecord};
use rayon::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;

/// Builds the template route collection.
///
/// Cheap to clone; every collaborator is shared.
#[derive(Clone)]
pub struct RouteSynthesizer {
    controllers: Arc<dyn ControllerSource>,
    introspector: Arc<dyn RouteIntrospector>,
    resolver: TemplateDirResolver,
    lister: Arc<dyn FileLister>,
    config: Arc<RoutingConfig>,
    pool: Option<Arc<rayon::ThreadPool>>,
}

impl RouteSynthesizer {
    pub fn builder() -> RouteSynthesizerBuilder {
        RouteSynthesizerBuilder::default()
    }

    pub fn config(&self) -> &RoutingConfig {
        &self.config
    }

    /// Runs one synthesis pass.
    ///
    /// Controllers whose templates cannot be located are skipped with a
    /// warning. A route name produced twice fails the whole pass.
    pub fn synthesize(&self) -> Result<RouteCollection> {
        let controllers: Vec<&ControllerDescriptor> =
            self.controllers.template_controllers().collect();

        let candidates: Vec<Vec<RouteRecord>> = match &self.pool {
            Some(pool) => pool.install(|| {
                controllers
                    .par_iter()
                    .map(|controller| self.candidates_for(controller))
                    .collect()
            }),
            None => controllers
                .iter()
                .map(|controller| self.candidates_for(controller))
                .collect(),
        };

        let mut routes = RouteCollection::new();
        for route in candidates.into_iter().flatten() {
            routes.insert(route)?;
        }

        tracing::info!(
            "Synthesized {} template routes from {} controllers",
            routes.len(),
            controllers.len()
        );
        Ok(routes)
    }

    /// [`synthesize`](Self::synthesize) on tokio's blocking pool.
    pub async fn synthesize_async(&self) -> Result<RouteCollection> {
        let synthesizer = self.clone();
        tokio::task::spawn_blocking(move || synthesizer.synthesize())
            .await
            .map_err(|e| RoutingError::Internal(format!("synthesis task failed: {e}")))?
    }

    /// Candidate routes of a single controller. Never fails: problems are
    /// logged and yield fewer candidates.
    fn candidates_for(&self, controller: &ControllerDescriptor) -> Vec<RouteRecord> {
        if !controller.is_template_based() {
            return Vec::new();
        }

        let segments = controller.namespace_segments(&self.config.controller_namespace);
        match segments.first() {
            Some(first) if first.eq_ignore_ascii_case(&self.config.root_segment) => {}
            _ => {
                tracing::debug!(
                    "Skipping {}: not under the `{}` namespace",
                    controller.type_name(),
                    self.config.root_segment
                );
                return Vec::new();
            }
        }

        let dir = match self.resolver.resolve(controller) {
            Ok(dir) => dir,
            Err(e) => {
                tracing::warn!("No template routes for {}: {}", controller.type_name(), e);
                return Vec::new();
            }
        };

        let files = match self
            .lister
            .list_files(&dir, &self.config.extension(), self.config.scan_depth)
        {
            Ok(files) => files,
            Err(source) => {
                let e = ResolutionError::Listing { path: dir, source };
                tracing::warn!("No template routes for {}: {}", controller.type_name(), e);
                return Vec::new();
            }
        };

        let declared = self.introspector.declared_routes(controller);
        let explicit: HashSet<String> = declared
            .explicit_paths()
            .iter()
            .map(|p| normalize(p))
            .collect();

        let route_segments = &segments[1..];
        let mut candidates = Vec::with_capacity(files.len());
        for file in files {
            if let Err(e) = check_template_name(&file) {
                tracing::warn!("Skipping template of {}: {}", controller.type_name(), e);
                continue;
            }

            let relative = file.relative_segments.as_slice();
            let name = match declared.name_prefix() {
                Some(prefix) => format!("{prefix}{}", route_name(relative, &file.base_name)),
                None => route_name(&[segments.as_slice(), relative].concat(), &file.base_name),
            };
            let path = match declared.path_prefix() {
                Some(prefix) => route_path(
                    relative,
                    &file.base_name,
                    Some(prefix),
                    &self.config.index_token,
                ),
                None => route_path(
                    &[route_segments, relative].concat(),
                    &file.base_name,
                    None,
                    &self.config.index_token,
                ),
            };

            if explicit.contains(&normalize(&path)) {
                tracing::debug!(
                    "{} already declares {}, not synthesizing {}",
                    controller.type_name(),
                    path,
                    name
                );
                continue;
            }

            tracing::debug!("Template route {} -> {}", name, path);
            candidates.push(RouteRecord::template(
                name,
                path,
                controller.type_name(),
                file.base_name,
                file.path,
            ));
        }
        candidates
    }
}

fn check_template_name(file: &TemplateFile) -> Result<()> {
    if route_name::<&str>(&[], &file.base_name).is_empty() {
        return Err(RoutingError::MalformedTemplateName {
            file: file.path.clone(),
        });
    }
    Ok(())
}

/// Constructor injection for [`RouteSynthesizer`].
#[derive(Default)]
pub struct RouteSynthesizerBuilder {
    controllers: Option<Arc<dyn ControllerSource>>,
    introspector: Option<Arc<dyn RouteIntrospector>>,
    bundles: Option<Arc<dyn BundleLocator>>,
    project: Option<Arc<dyn ProjectRootProvider>>,
    lister: Option<Arc<dyn FileLister>>,
    config: Option<RoutingConfig>,
}

impl RouteSynthesizerBuilder {
    pub fn controllers(mut self, controllers: Arc<dyn ControllerSource>) -> Self {
        self.controllers = Some(controllers);
        self
    }

    pub fn introspector(mut self, introspector: Arc<dyn RouteIntrospector>) -> Self {
        self.introspector = Some(introspector);
        self
    }

    /// Registry acting as both controller source and introspector.
    pub fn registry<R>(self, registry: Arc<R>) -> Self
    where
        R: ControllerSource + RouteIntrospector + 'static,
    {
        self.controllers(registry.clone()).introspector(registry)
    }

    pub fn bundles(mut self, bundles: Arc<dyn BundleLocator>) -> Self {
        self.bundles = Some(bundles);
        self
    }

    /// Defaults to the config's `template_root`.
    pub fn project_root(mut self, project: Arc<dyn ProjectRootProvider>) -> Self {
        self.project = Some(project);
        self
    }

    /// Defaults to [`WalkDirLister`].
    pub fn lister(mut self, lister: Arc<dyn FileLister>) -> Self {
        self.lister = Some(lister);
        self
    }

    pub fn config(mut self, config: RoutingConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn build(self) -> Result<RouteSynthesizer> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let controllers = self.controllers.ok_or_else(|| missing("controller source"))?;
        let introspector = self.introspector.ok_or_else(|| missing("route introspector"))?;
        let bundles = self
            .bundles
            .unwrap_or_else(|| Arc::new(BundleRegistry::new()));
        let project = self
            .project
            .unwrap_or_else(|| Arc::new(config.template_root.clone()));
        let lister = self.lister.unwrap_or_else(|| Arc::new(WalkDirLister));

        let pool = if config.parallelism > 1 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(config.parallelism)
                .thread_name(|i| format!("pageroute-{i}"))
                .build()?;
            Some(Arc::new(pool))
        } else {
            None
        };

        Ok(RouteSynthesizer {
            controllers,
            introspector,
            resolver: TemplateDirResolver::new(bundles, project, config.controller_namespace.clone()),
            lister,
            config: Arc::new(config),
            pool,
        })
    }
}

fn missing(what: &str) -> RoutingError {
    RoutingError::InvalidConfig {
        message: format!("no {what} given to the synthesizer"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScanDepth;
    use crate::controller::{ClassRoute, ControllerRegistration, ControllerRegistry, MethodRoute};
    use std::fs;
    use std::io;
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tracing_subscriber::Layer;
    use tracing_subscriber::layer::{Context, SubscriberExt};

    const BLOG: &str = "app::controller::pages::BlogController";
    const HOME: &str = "app::controller::pages::HomeController";

    #[derive(Clone, Default)]
    struct WarningCounter(Arc<AtomicUsize>);

    impl<S: tracing::Subscriber> Layer<S> for WarningCounter {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() == tracing::Level::WARN {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    fn count_warnings<T>(f: impl FnOnce() -> T) -> (T, usize) {
        let counter = WarningCounter::default();
        let subscriber = tracing_subscriber::registry().with(counter.clone());
        let result = tracing::subscriber::with_default(subscriber, f);
        (result, counter.0.load(Ordering::SeqCst))
    }

    fn touch(dir: &Path, files: &[&str]) {
        for file in files {
            let path = dir.join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "").unwrap();
        }
    }

    fn tpl_config() -> RoutingConfig {
        RoutingConfig {
            template_extension: ".tpl".to_string(),
            ..RoutingConfig::default()
        }
    }

    fn synthesizer(
        registry: ControllerRegistry,
        bundles: BundleRegistry,
        project: &Path,
        config: RoutingConfig,
    ) -> RouteSynthesizer {
        RouteSynthesizer::builder()
            .registry(Arc::new(registry))
            .bundles(Arc::new(bundles))
            .project_root(Arc::new(project.to_path_buf()))
            .config(config)
            .build()
            .unwrap()
    }

    /// Blog controller living in a bundle whose root holds the templates.
    fn blog_fixture(blog: ControllerRegistration) -> (tempfile::TempDir, RouteSynthesizer) {
        let root = tempfile::tempdir().unwrap();
        let bundle_root = root.path().join("templates/blog");
        touch(&bundle_root, &["index.tpl", "detail.tpl"]);

        let bundles = BundleRegistry::new();
        bundles.register("BlogBundle", &bundle_root);
        let registry = ControllerRegistry::builder()
            .add(blog.bundle("BlogBundle").template_dir("").template_routes())
            .build();
        let synthesizer = synthesizer(registry, bundles, root.path(), tpl_config());
        (root, synthesizer)
    }

    fn summary(routes: &RouteCollection) -> Vec<(String, String)> {
        routes
            .iter()
            .map(|r| (r.name.clone(), r.path.clone()))
            .collect()
    }

    #[test]
    fn test_blog_scenario() {
        let (_root, synthesizer) = blog_fixture(ControllerRegistration::new(BLOG));
        let routes = synthesizer.synthesize().unwrap();

        assert_eq!(
            summary(&routes),
            vec![
                ("pages_blog_detail".to_string(), "/blog/detail".to_string()),
                ("pages_blog_index".to_string(), "/blog".to_string()),
            ]
        );

        let index = routes.get("pages_blog_index").unwrap();
        assert_eq!(
            index.defaults.handler,
            "app::controller::pages::BlogController::resolve_simple_route"
        );
        assert_eq!(index.defaults.controller, BLOG);
        assert_eq!(index.defaults.template.as_deref(), Some("index"));
        assert!(index.defaults.template_file.as_ref().unwrap().ends_with("index.tpl"));
    }

    #[test]
    fn test_explicit_route_takes_precedence() {
        let feed = MethodRoute::new("feed").path("/blog/feed");
        let detail = MethodRoute::new("detail").name("blog_detail").path("/blog/detail");

        for methods in [
            vec![feed.clone(), detail.clone()],
            vec![detail.clone(), feed.clone()],
        ] {
            let (_root, synthesizer) =
                blog_fixture(ControllerRegistration::new(BLOG).method_routes(methods));
            let routes = synthesizer.synthesize().unwrap();

            assert_eq!(
                summary(&routes),
                vec![("pages_blog_index".to_string(), "/blog".to_string())]
            );
        }
    }

    #[test]
    fn test_inherited_explicit_route_takes_precedence() {
        let root = tempfile::tempdir().unwrap();
        let bundle_root = root.path().join("templates/blog");
        touch(&bundle_root, &["index.tpl", "detail.tpl"]);

        let bundles = BundleRegistry::new();
        bundles.register("BlogBundle", &bundle_root);
        let base = "app::controller::BasePagesController";
        let registry = ControllerRegistry::builder()
            .add(
                ControllerRegistration::new(BLOG)
                    .extends(base)
                    .template_dir("")
                    .method_route(MethodRoute::new("feed").path("/blog/feed")),
            )
            .add_abstract(
                ControllerRegistration::new(base)
                    .bundle("BlogBundle")
                    .template_routes()
                    .method_route(MethodRoute::new("detail").path("/blog/detail")),
            )
            .build();
        let synthesizer = synthesizer(registry, bundles, root.path(), tpl_config());

        let routes = synthesizer.synthesize().unwrap();
        assert_eq!(
            summary(&routes),
            vec![("pages_blog_index".to_string(), "/blog".to_string())]
        );
    }

    #[test]
    fn test_explicit_route_matched_after_normalization() {
        let (_root, synthesizer) = blog_fixture(
            ControllerRegistration::new(BLOG)
                .class_route(ClassRoute::new().path("/blog/"))
                .method_route(MethodRoute::new("detail").path("//detail/")),
        );
        let routes = synthesizer.synthesize().unwrap();

        assert!(!routes.contains("pages_blog_detail"));
        assert!(routes.iter().all(|r| r.path != "/blog/detail"));
    }

    #[test]
    fn test_class_route_prefix_overrides_derived_naming() {
        let (_root, synthesizer) = blog_fixture(
            ControllerRegistration::new(BLOG).class_route(ClassRoute::new().name("news_").path("/news")),
        );
        let routes = synthesizer.synthesize().unwrap();

        assert_eq!(
            summary(&routes),
            vec![
                ("news_detail".to_string(), "/news/detail".to_string()),
                ("news_index".to_string(), "/news".to_string()),
            ]
        );
    }

    #[test]
    fn test_missing_directory_skips_controller_with_one_warning() {
        let project = tempfile::tempdir().unwrap();
        touch(project.path(), &["pages/home/index.tpl"]);

        let registry = ControllerRegistry::builder()
            .add(
                ControllerRegistration::new(BLOG)
                    .template_dir("pages/missing")
                    .template_routes(),
            )
            .add(ControllerRegistration::new(HOME).template_routes())
            .build();
        let synthesizer = synthesizer(registry, BundleRegistry::new(), project.path(), tpl_config());

        let (routes, warnings) = count_warnings(|| synthesizer.synthesize());
        let routes = routes.unwrap();

        assert_eq!(warnings, 1);
        assert_eq!(
            summary(&routes),
            vec![("pages_home_index".to_string(), "/home".to_string())]
        );
    }

    #[test]
    fn test_name_collision_is_fatal() {
        let project = tempfile::tempdir().unwrap();
        touch(project.path(), &["pages/home/index.tpl", "shop/home/index.tpl"]);

        let registry = ControllerRegistry::builder()
            .add(ControllerRegistration::new(HOME).template_routes())
            .add(
                ControllerRegistration::new("shop::controller::pages::HomeController")
                    .template_dir("shop/home")
                    .template_routes(),
            )
            .build();
        let synthesizer = synthesizer(registry, BundleRegistry::new(), project.path(), tpl_config());

        let err = synthesizer.synthesize().unwrap_err();
        assert!(matches!(err, RoutingError::NameCollision { ref name, .. } if name == "pages_home_index"));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_idempotent() {
        let (_root, synthesizer) = blog_fixture(ControllerRegistration::new(BLOG));
        let first = synthesizer.synthesize().unwrap();
        let second = synthesizer.synthesize().unwrap();

        assert_eq!(first, second);
        assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
    }

    #[test]
    fn test_ineligible_controllers_skipped() {
        let project = tempfile::tempdir().unwrap();
        touch(
            project.path(),
            &["admin/dashboard/index.tpl", "pages/about/index.tpl", "pages/home/index.tpl"],
        );

        let registry = ControllerRegistry::builder()
            .add(ControllerRegistration::new("app::controller::admin::DashboardController").template_routes())
            .add(ControllerRegistration::new("app::controller::pages::AboutController"))
            .add(ControllerRegistration::new(HOME).template_routes())
            .build();
        let synthesizer = synthesizer(registry, BundleRegistry::new(), project.path(), tpl_config());

        let routes = synthesizer.synthesize().unwrap();
        assert_eq!(routes.names().collect::<Vec<_>>(), vec!["pages_home_index"]);
    }

    #[test]
    fn test_malformed_template_names_skipped() {
        let project = tempfile::tempdir().unwrap();
        touch(project.path(), &["pages/home/.tpl", "pages/home/---.tpl", "pages/home/index.tpl"]);

        let registry = ControllerRegistry::builder()
            .add(ControllerRegistration::new(HOME).template_routes())
            .build();
        let synthesizer = synthesizer(registry, BundleRegistry::new(), project.path(), tpl_config());

        let (routes, warnings) = count_warnings(|| synthesizer.synthesize());
        assert_eq!(routes.unwrap().names().collect::<Vec<_>>(), vec!["pages_home_index"]);
        assert_eq!(warnings, 2);
    }

    #[test]
    fn test_recursive_scan() {
        let project = tempfile::tempdir().unwrap();
        touch(
            project.path(),
            &[
                "pages/blog/index.tpl",
                "pages/blog/archive/index.tpl",
                "pages/blog/archive/2024/year-recap.tpl",
            ],
        );

        let registry = ControllerRegistry::builder()
            .add(ControllerRegistration::new(BLOG).template_routes())
            .build();
        let config = RoutingConfig {
            scan_depth: ScanDepth::Recursive,
            ..tpl_config()
        };
        let synthesizer = synthesizer(registry, BundleRegistry::new(), project.path(), config);

        let routes = synthesizer.synthesize().unwrap();
        assert_eq!(
            summary(&routes),
            vec![
                (
                    "pages_blog_archive_2024_year_recap".to_string(),
                    "/blog/archive/2024/year-recap".to_string()
                ),
                ("pages_blog_archive_index".to_string(), "/blog/archive".to_string()),
                ("pages_blog_index".to_string(), "/blog".to_string()),
            ]
        );
    }

    #[test]
    fn test_parallel_matches_serial() {
        let project = tempfile::tempdir().unwrap();
        let mut registry = ControllerRegistry::builder();
        for i in 0..12 {
            touch(
                project.path(),
                &[
                    &format!("pages/section{i}/index.tpl"),
                    &format!("pages/section{i}/about.tpl"),
                ],
            );
            registry = registry.add(
                ControllerRegistration::new(format!("app::controller::pages::Section{i}Controller"))
                    .template_routes(),
            );
        }
        let registry = Arc::new(registry.build());

        let build = |parallelism| {
            RouteSynthesizer::builder()
                .registry(registry.clone())
                .project_root(Arc::new(project.path().to_path_buf()))
                .config(RoutingConfig {
                    parallelism,
                    ..tpl_config()
                })
                .build()
                .unwrap()
        };

        let serial = build(1).synthesize().unwrap();
        let parallel = build(4).synthesize().unwrap();
        assert_eq!(serial.len(), 24);
        assert_eq!(serial, parallel);
    }

    struct FailingLister;

    impl FileLister for FailingLister {
        fn list_files(&self, _dir: &Path, _extension: &str, _depth: ScanDepth) -> io::Result<Vec<TemplateFile>> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
        }
    }

    #[test]
    fn test_listing_failure_is_not_fatal() {
        let project = tempfile::tempdir().unwrap();
        touch(project.path(), &["pages/home/index.tpl"]);
        let registry = Arc::new(
            ControllerRegistry::builder()
                .add(ControllerRegistration::new(HOME).template_routes())
                .build(),
        );

        let synthesizer = RouteSynthesizer::builder()
            .registry(registry)
            .project_root(Arc::new(project.path().to_path_buf()))
            .lister(Arc::new(FailingLister))
            .config(tpl_config())
            .build()
            .unwrap();

        let (routes, warnings) = count_warnings(|| synthesizer.synthesize());
        assert!(routes.unwrap().is_empty());
        assert_eq!(warnings, 1);
    }

    #[test]
    fn test_builder_requires_controllers() {
        let err = RouteSynthesizer::builder().build().err().unwrap();
        assert!(matches!(err, RoutingError::InvalidConfig { .. }));

        let err = RouteSynthesizer::builder()
            .registry(Arc::new(ControllerRegistry::default()))
            .config(RoutingConfig {
                parallelism: 0,
                ..RoutingConfig::default()
            })
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, RoutingError::InvalidConfig { .. }));
    }

    #[tokio::test]
    async fn test_synthesize_async() {
        let (_root, synthesizer) = blog_fixture(ControllerRegistration::new(BLOG));
        let routes = synthesizer.synthesize_async().await.unwrap();
        assert_eq!(routes.len(), 2);
        assert_eq!(routes, synthesizer.synthesize().unwrap());
    }

    #[test]
    fn test_default_project_root_from_config() {
        let project = tempfile::tempdir().unwrap();
        touch(project.path(), &["pages/home/index.tpl"]);
        let registry = Arc::new(
            ControllerRegistry::builder()
                .add(ControllerRegistration::new(HOME).template_routes())
                .build(),
        );

        let synthesizer = RouteSynthesizer::builder()
            .registry(registry)
            .config(RoutingConfig {
                template_root: PathBuf::from(project.path()),
                ..tpl_config()
            })
            .build()
            .unwrap();
        assert_eq!(synthesizer.synthesize().unwrap().len(), 1);
    }
}
