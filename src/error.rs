use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RoutingError>;

/// Why a controller's template directory could not be located.
///
/// Never fatal: the synthesizer logs it and moves on to the next controller.
#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("Bundle `{bundle}` of controller {controller} is not registered")]
    BundleNotFound { controller: String, bundle: String },

    #[error("Template directory {} of controller {controller} does not exist", path.display())]
    DirectoryMissing { controller: String, path: PathBuf },

    #[error("Template directory {} of controller {controller} is not accessible: {source}", path.display())]
    DirectoryUnreadable {
        controller: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to list templates in {}: {source}", path.display())]
    Listing {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum RoutingError {
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error("Route name collision: `{name}` is already bound to {existing}, refusing {rejected}")]
    NameCollision {
        name: String,
        existing: String,
        rejected: String,
    },

    #[error("Malformed template name: {}", file.display())]
    MalformedTemplateName { file: PathBuf },

    #[error("Route not found: {name}")]
    RouteNotFound { name: String },

    #[error("Missing parameter `{parameter}` for route `{route}`")]
    MissingParameter { route: String, parameter: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Thread pool construction failed: {0}")]
    ThreadPool(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl RoutingError {
    /// True for the conditions that must abort a synthesis pass.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            RoutingError::Resolution(_) | RoutingError::MalformedTemplateName { .. }
        )
    }
}

impl From<rayon::ThreadPoolBuildError> for RoutingError {
    fn from(err: rayon::ThreadPoolBuildError) -> Self {
        RoutingError::ThreadPool(err.to_string())
    }
}

impl axum::response::IntoResponse for RoutingError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            RoutingError::RouteNotFound { .. } => axum::http::StatusCode::NOT_FOUND,
            RoutingError::MissingParameter { .. } => axum::http::StatusCode::BAD_REQUEST,
            _ => axum::http::StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}
