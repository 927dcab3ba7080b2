use crate::route::builder::words;

/// Identity of a controller type as seen by route synthesis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerDescriptor {
    type_name: String,
    bundle: Option<String>,
    template_dir: Option<String>,
    template_based: bool,
}

impl ControllerDescriptor {
    /// `type_name` is a `::`-separated path, as returned by `std::any::type_name`.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            bundle: None,
            template_dir: None,
            template_based: false,
        }
    }

    pub fn with_bundle(mut self, bundle: impl Into<String>) -> Self {
        self.bundle = Some(bundle.into());
        self
    }

    pub fn with_template_dir(mut self, dir: impl Into<String>) -> Self {
        self.template_dir = Some(dir.into());
        self
    }

    pub fn template_based(mut self, template_based: bool) -> Self {
        self.template_based = template_based;
        self
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn bundle(&self) -> Option<&str> {
        self.bundle.as_deref()
    }

    pub fn template_dir(&self) -> Option<&str> {
        self.template_dir.as_deref()
    }

    pub fn is_template_based(&self) -> bool {
        self.template_based
    }

    /// Last path segment of the type name, generics stripped.
    pub fn short_name(&self) -> &str {
        let path = strip_generics(&self.type_name);
        path.rsplit("::").next().unwrap_or(path)
    }

    /// Logical segments below the controller namespace module.
    ///
    /// For `app::controller::pages::BlogController` and namespace `controller`
    /// this is `["pages", "Blog"]`. The plural module name is accepted too.
    /// Types outside the namespace yield no segments.
    pub fn namespace_segments(&self, namespace: &str) -> Vec<String> {
        let path = strip_generics(&self.type_name);
        let parts: Vec<&str> = path.split("::").filter(|p| !p.is_empty()).collect();
        let plural = format!("{namespace}s");

        let Some(start) = parts
            .iter()
            .position(|p| p.eq_ignore_ascii_case(namespace) || p.eq_ignore_ascii_case(&plural))
        else {
            return Vec::new();
        };

        let mut segments: Vec<String> = parts[start + 1..].iter().map(|p| p.to_string()).collect();
        if let Some(last) = segments.pop() {
            let stem = last.strip_suffix("Controller").unwrap_or(&last);
            if !stem.is_empty() {
                segments.push(stem.to_string());
            }
        }
        segments
    }

    /// Template subdirectory used when none is declared: the namespace
    /// segments in snake case, joined with `/` (`pages/blog`).
    pub fn default_template_dir(&self, namespace: &str) -> String {
        self.namespace_segments(namespace)
            .iter()
            .map(|segment| words(segment).join("_"))
            .filter(|segment| !segment.is_empty())
            .collect::<Vec<_>>()
            .join("/")
    }
}

fn strip_generics(type_name: &str) -> &str {
    &type_name[..type_name.find('<').unwrap_or(type_name.len())]
}
