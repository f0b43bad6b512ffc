use crate::canvas::{DEFAULT_BRUSH_WIDTH, MAX_BRUSH_WIDTH, MIN_BRUSH_WIDTH};

/// Path of the generation endpoint on the serving origin
pub const DEFAULT_ENDPOINT_PATH: &str = "/api/generate";

#[cfg(not(target_arch = "wasm32"))]
const DEFAULT_NATIVE_ORIGIN: &str = "http://127.0.0.1:5000";

/// User-adjustable settings.
///
/// Only the endpoint and brush width survive a restart; the prompt and the
/// drawing live for the session.
#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, PartialEq)]
#[serde(default)] // if we add new fields, give them default values when deserializing old state
pub struct Settings {
    /// Absolute URL, or a path resolved against the page origin on the web
    pub endpoint: String,
    pub brush_width: f32,
    #[serde(skip)]
    pub prompt: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            brush_width: DEFAULT_BRUSH_WIDTH,
            prompt: String::new(),
        }
    }
}

impl Settings {
    /// Restore settings from eframe storage, falling back to defaults
    pub fn load(storage: Option<&dyn eframe::Storage>) -> Self {
        let mut settings: Self = storage
            .and_then(|storage| eframe::get_value(storage, eframe::APP_KEY))
            .unwrap_or_default();
        settings.brush_width = settings.brush_width.clamp(MIN_BRUSH_WIDTH, MAX_BRUSH_WIDTH);
        settings
    }

    pub fn save(&self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, self);
    }

    /// The endpoint as an absolute URL the HTTP client can use
    pub fn resolved_endpoint(&self) -> String {
        resolve_endpoint(self.endpoint.trim(), &origin())
    }
}

fn resolve_endpoint(endpoint: &str, origin: &str) -> String {
    if endpoint.contains("://") {
        return endpoint.to_owned();
    }
    let origin = origin.trim_end_matches('/');
    if endpoint.starts_with('/') {
        format!("{origin}{endpoint}")
    } else {
        format!("{origin}/{endpoint}")
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn default_endpoint() -> String {
    format!("{DEFAULT_NATIVE_ORIGIN}{DEFAULT_ENDPOINT_PATH}")
}

#[cfg(target_arch = "wasm32")]
fn default_endpoint() -> String {
    DEFAULT_ENDPOINT_PATH.to_owned()
}

#[cfg(not(target_arch = "wasm32"))]
fn origin() -> String {
    DEFAULT_NATIVE_ORIGIN.to_owned()
}

#[cfg(target_arch = "wasm32")]
fn origin() -> String {
    web_sys::window()
        .and_then(|window| window.location().origin().ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_endpoints_are_kept() {
        assert_eq!(
            resolve_endpoint("https://example.com/gen", "http://localhost"),
            "https://example.com/gen"
        );
    }

    #[test]
    fn paths_are_joined_to_the_origin() {
        assert_eq!(
            resolve_endpoint("/api/generate", "http://localhost:5000/"),
            "http://localhost:5000/api/generate"
        );
        assert_eq!(
            resolve_endpoint("api/generate", "http://localhost:5000"),
            "http://localhost:5000/api/generate"
        );
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"brush_width":12.0}"#).unwrap();
        assert_eq!(settings.brush_width, 12.0);
        assert_eq!(settings.endpoint, default_endpoint());
        assert!(settings.prompt.is_empty());
    }

    #[test]
    fn prompt_is_not_persisted() {
        let settings = Settings {
            prompt: "a cat".to_owned(),
            ..Settings::default()
        };
        let json = serde_json::to_value(&settings).unwrap();
        assert!(json.get("prompt").is_none());
        assert!(json.get("endpoint").is_some());
        assert!(json.get("brush_width").is_some());

        let restored: Settings = serde_json::from_value(json).unwrap();
        assert!(restored.prompt.is_empty());
    }
}
