//! Embeddable loader configuration.

use serde::{Deserialize, Serialize};

/// Loader settings a host application can carry in its own config file.
///
/// ```
/// use loam_graph_source::LoaderConfig;
///
/// let config: LoaderConfig = serde_json::from_str(
///     r#"{"default_format": "turtle", "user_agent": "loam/0.1"}"#,
/// ).unwrap();
/// assert_eq!(config.default_format.as_deref(), Some("turtle"));
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Fallback format id when neither hint nor response media type resolves.
    #[serde(default)]
    pub default_format: Option<String>,
    /// `User-Agent` header for network fetches; none is sent when unset.
    #[serde(default)]
    pub user_agent: Option<String>,
}
