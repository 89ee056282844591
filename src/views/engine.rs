use crate::error::Error;
use minijinja::Environment;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Scoped sub-builder for view rendering, reached through
/// `WebServerBuilder::views()`.
///
/// Templates come from two places: inline registrations (validated when the
/// engine is assembled) and an optional template directory, where
/// `render("index")` resolves to `<dir>/index<suffix>`.
#[derive(Debug, Default)]
pub struct ViewsBuilder {
    templates: Vec<(String, String)>,
    dir: Option<PathBuf>,
    suffix: Option<String>,
}

impl ViewsBuilder {
    /// Register an inline template under `name`.
    ///
    /// The source is parsed at `run()` time; a syntax error fails assembly.
    pub fn template(&mut self, name: impl Into<String>, source: impl Into<String>) -> &mut Self {
        self.templates.push((name.into(), source.into()));
        self
    }

    /// Directory to resolve template names in when no inline template
    /// matches.
    pub fn dir(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.dir = Some(path.into());
        self
    }

    /// File suffix appended to template names for directory lookups
    /// (default `.html`).
    pub fn suffix(&mut self, suffix: impl Into<String>) -> &mut Self {
        self.suffix = Some(suffix.into());
        self
    }
}

/// Request-time rendering failure.
///
/// Surfaces as a 500 response for the request that triggered it; never a
/// configuration-time error and never fatal to the server process.
#[derive(Debug)]
pub enum RenderError {
    /// No inline template and no directory file under this name
    UnknownTemplate {
        /// The requested template name
        name: String,
    },
    /// The engine failed while parsing or rendering the template
    Template {
        /// The requested template name
        name: String,
        /// Engine failure
        source: minijinja::Error,
    },
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::UnknownTemplate { name } => {
                write!(f, "unknown view template '{name}'")
            }
            RenderError::Template { name, source } => {
                write!(f, "rendering view template '{name}' failed: {source}")
            }
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::Template { source, .. } => Some(source),
            RenderError::UnknownTemplate { .. } => None,
        }
    }
}

/// The assembled view engine.
///
/// Inline template sources are validated up front and rendered through a
/// fresh `minijinja` environment per request; directory templates are read
/// and rendered the same way. Template lookups never escape the configured
/// directory.
pub struct ViewEngine {
    templates: HashMap<String, String>,
    dir: Option<PathBuf>,
    suffix: String,
}

impl ViewEngine {
    /// Validate `builder`'s inline templates and assemble the engine.
    pub(crate) fn build(builder: ViewsBuilder) -> Result<Self, Error> {
        let mut templates = HashMap::new();
        for (name, source) in builder.templates {
            // Parse eagerly so a broken template fails assembly, not the
            // first request that renders it.
            {
                let mut env = Environment::new();
                env.add_template(&name, &source)
                    .map_err(|err| Error::Template {
                        name: name.clone(),
                        source: err,
                    })?;
            }
            templates.insert(name, source);
        }
        Ok(Self {
            templates,
            dir: builder.dir,
            suffix: builder.suffix.unwrap_or_else(|| ".html".to_string()),
        })
    }

    /// Render the template `name` with `model` as its variables.
    pub fn render(&self, name: &str, model: &Value) -> Result<String, RenderError> {
        let source = match self.templates.get(name) {
            Some(source) => source.clone(),
            None => self.load_from_dir(name)?,
        };
        Self::render_source(name, &source, model)
    }

    fn render_source(name: &str, source: &str, model: &Value) -> Result<String, RenderError> {
        let mut env = Environment::new();
        env.add_template("view", source)
            .map_err(|source| RenderError::Template {
                name: name.to_string(),
                source,
            })?;
        let template = env
            .get_template("view")
            .map_err(|source| RenderError::Template {
                name: name.to_string(),
                source,
            })?;
        template.render(model).map_err(|source| RenderError::Template {
            name: name.to_string(),
            source,
        })
    }

    fn load_from_dir(&self, name: &str) -> Result<String, RenderError> {
        let dir = self.dir.as_ref().ok_or_else(|| RenderError::UnknownTemplate {
            name: name.to_string(),
        })?;
        let path = Self::map_path(dir, name, &self.suffix).ok_or_else(|| {
            RenderError::UnknownTemplate {
                name: name.to_string(),
            }
        })?;
        fs::read_to_string(&path).map_err(|_| RenderError::UnknownTemplate {
            name: name.to_string(),
        })
    }

    /// Resolve a template name inside `dir`, rejecting any component that
    /// could escape it.
    fn map_path(dir: &Path, name: &str, suffix: &str) -> Option<PathBuf> {
        let mut pb = dir.to_path_buf();
        for comp in Path::new(name).components() {
            match comp {
                Component::Normal(s) => pb.push(s),
                Component::CurDir => {}
                _ => return None,
            }
        }
        let file_name = format!(
            "{}{}",
            pb.file_name()?.to_str()?,
            suffix
        );
        pb.set_file_name(file_name);
        Some(pb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn engine_with(name: &str, source: &str) -> ViewEngine {
        let mut builder = ViewsBuilder::default();
        builder.template(name, source);
        ViewEngine::build(builder).unwrap()
    }

    #[test]
    fn test_render_inline_template() {
        let engine = engine_with("greeting", "Hello {{ name }}!");
        let body = engine.render("greeting", &json!({ "name": "world" })).unwrap();
        assert_eq!(body, "Hello world!");
    }

    #[test]
    fn test_unknown_template_is_an_error() {
        let engine = engine_with("greeting", "Hello {{ name }}!");
        let err = engine.render("missing", &json!({})).unwrap_err();
        assert!(matches!(err, RenderError::UnknownTemplate { .. }));
    }

    #[test]
    fn test_invalid_inline_template_fails_assembly() {
        let mut builder = ViewsBuilder::default();
        builder.template("broken", "Hello {{ name !");
        assert!(matches!(
            ViewEngine::build(builder),
            Err(Error::Template { .. })
        ));
    }

    #[test]
    fn test_map_path_prevents_traversal() {
        assert!(ViewEngine::map_path(Path::new("templates"), "../secret", ".html").is_none());
        assert!(ViewEngine::map_path(Path::new("templates"), "/etc/passwd", ".html").is_none());
    }

    #[test]
    fn test_render_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("index.html"), "<h1>{{ title }}</h1>").unwrap();

        let mut builder = ViewsBuilder::default();
        builder.dir(dir.path());
        let engine = ViewEngine::build(builder).unwrap();

        let body = engine.render("index", &json!({ "title": "Home" })).unwrap();
        assert_eq!(body, "<h1>Home</h1>");
    }
}
