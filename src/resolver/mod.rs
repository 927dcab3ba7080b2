//! Locating the template directory of a controller.

use crate::controller::ControllerDescriptor;
use crate::error::ResolutionError;
use dashmap::DashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Maps bundle identifiers to their filesystem roots.
pub trait BundleLocator: Send + Sync {
    fn bundle_path(&self, bundle: &str) -> Option<PathBuf>;
}

/// Supplies the project-wide template root.
pub trait ProjectRootProvider: Send + Sync {
    fn template_root(&self) -> PathBuf;
}

impl ProjectRootProvider for PathBuf {
    fn template_root(&self) -> PathBuf {
        self.clone()
    }
}

/// Thread-safe in-memory bundle table.
#[derive(Clone, Default)]
pub struct BundleRegistry {
    bundles: Arc<DashMap<String, PathBuf>>,
}

impl BundleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, bundle: impl Into<String>, root: impl Into<PathBuf>) -> &Self {
        self.bundles.insert(bundle.into(), root.into());
        self
    }

    pub fn len(&self) -> usize {
        self.bundles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bundles.is_empty()
    }
}

impl BundleLocator for BundleRegistry {
    fn bundle_path(&self, bundle: &str) -> Option<PathBuf> {
        self.bundles.get(bundle).map(|root| root.value().clone())
    }
}

/// Fixed project template root.
#[derive(Debug, Clone)]
pub struct ProjectRoot(PathBuf);

impl ProjectRoot {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self(root.into())
    }
}

impl ProjectRootProvider for ProjectRoot {
    fn template_root(&self) -> PathBuf {
        self.0.clone()
    }
}

#[derive(Clone)]
pub struct TemplateDirResolver {
    bundles: Arc<dyn BundleLocator>,
    project: Arc<dyn ProjectRootProvider>,
    controller_namespace: String,
}

impl TemplateDirResolver {
    pub fn new(
        bundles: Arc<dyn BundleLocator>,
        project: Arc<dyn ProjectRootProvider>,
        controller_namespace: impl Into<String>,
    ) -> Self {
        Self {
            bundles,
            project,
            controller_namespace: controller_namespace.into(),
        }
    }

    /// Absolute, canonical template directory of `controller`.
    ///
    /// The bundle root (or the project template root without a bundle) joined
    /// with the declared template subdirectory, or with the one derived from
    /// the controller namespace when none is declared.
    pub fn resolve(&self, controller: &ControllerDescriptor) -> Result<PathBuf, ResolutionError> {
        let root = match controller.bundle() {
            Some(bundle) => self.bundles.bundle_path(bundle).ok_or_else(|| {
                ResolutionError::BundleNotFound {
                    controller: controller.type_name().to_string(),
                    bundle: bundle.to_string(),
                }
            })?,
            None => self.project.template_root(),
        };

        let subdir = controller
            .template_dir()
            .map(str::to_string)
            .unwrap_or_else(|| controller.default_template_dir(&self.controller_namespace));
        let dir = join_relative(&root, &subdir);

        let missing = || ResolutionError::DirectoryMissing {
            controller: controller.type_name().to_string(),
            path: dir.clone(),
        };
        let canonical = match dir.canonicalize() {
            Ok(canonical) => canonical,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(missing()),
            Err(source) => {
                return Err(ResolutionError::DirectoryUnreadable {
                    controller: controller.type_name().to_string(),
                    path: dir.clone(),
                    source,
                });
            }
        };
        if !canonical.is_dir() {
            return Err(missing());
        }
        Ok(canonical)
    }
}

fn join_relative(root: &Path, subdir: &str) -> PathBuf {
    let subdir = subdir.trim_start_matches(['/', '\\']);
    if subdir.is_empty() {
        root.to_path_buf()
    } else {
        root.join(subdir)
    }
}
