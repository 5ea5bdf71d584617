use std::{collections::HashMap, fmt, path::Path};

use itertools::Itertools;

use crate::{error::ImportError, project::ProjectModel, session::ImportTarget};

pub const CSPROJ_EXTENSION: &str = "csproj";

/// Handler of one kind of project file
pub trait ProjectProcessor {
    /// Id of module extension providing language support for `target`
    fn language_extension_id(&self, target: ImportTarget) -> &'static str;

    /// Extracts configurations, references and compile items from project file
    fn extract(&self, path: &Path) -> Result<ProjectModel, ImportError>;
}

/// C# project (`.csproj`) handler
#[derive(Debug, Default, Clone, Copy)]
pub struct CsProjProcessor;

impl ProjectProcessor for CsProjProcessor {
    fn language_extension_id(&self, target: ImportTarget) -> &'static str {
        match target {
            ImportTarget::DotNet => "microsoft-csharp",
            ImportTarget::Mono => "mono-csharp",
        }
    }

    fn extract(&self, path: &Path) -> Result<ProjectModel, ImportError> {
        ProjectModel::from_path(path)
    }
}

/// Project processors keyed by file extension.
/// Extensions are case insensitive and may be given with or without leading dot.
#[derive(Default)]
pub struct ProcessorRegistry {
    processors: HashMap<String, Box<dyn ProjectProcessor>>,
}

impl ProcessorRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with all built-in processors
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(CSPROJ_EXTENSION, CsProjProcessor);
        registry
    }

    /// Registers processor replacing previous one registered for the extension
    pub fn register<P: ProjectProcessor + 'static>(
        &mut self,
        extension: &str,
        processor: P,
    ) -> &mut Self {
        self.processors
            .insert(normalize(extension), Box::new(processor));
        self
    }

    #[must_use]
    pub fn find(&self, extension: &str) -> Option<&dyn ProjectProcessor> {
        self.processors.get(&normalize(extension)).map(Box::as_ref)
    }

    #[must_use]
    pub fn find_for_path(&self, path: &Path) -> Option<&dyn ProjectProcessor> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(|e| self.find(e))
    }

    /// Registered extensions in alphabetical order
    pub fn extensions(&self) -> impl Iterator<Item = &str> {
        self.processors.keys().map(String::as_str).sorted()
    }
}

impl fmt::Debug for ProcessorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.extensions()).finish()
    }
}

fn normalize(extension: &str) -> String {
    extension.trim_start_matches('.').to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    struct Fake;

    impl ProjectProcessor for Fake {
        fn language_extension_id(&self, _target: ImportTarget) -> &'static str {
            "fake"
        }

        fn extract(&self, _path: &Path) -> Result<ProjectModel, ImportError> {
            Ok(ProjectModel::default())
        }
    }

    #[rstest]
    #[case("csproj", true)]
    #[case("CSPROJ", true)]
    #[case(".CsProj", true)]
    #[case("vbproj", false)]
    #[case("", false)]
    #[trace]
    fn find_tests(#[case] extension: &str, #[case] expected: bool) {
        // Arrange
        let registry = ProcessorRegistry::with_defaults();

        // Act
        let actual = registry.find(extension);

        // Assert
        assert_eq!(actual.is_some(), expected);
    }

    #[rstest]
    #[case("/src/App/App.csproj", true)]
    #[case("/src/App/App.CSPROJ", true)]
    #[case("/src/App/App.fsproj", false)]
    #[case("/src/App/csproj", false)]
    #[trace]
    fn find_for_path_tests(#[case] path: &str, #[case] expected: bool) {
        // Arrange
        let registry = ProcessorRegistry::with_defaults();

        // Act
        let actual = registry.find_for_path(Path::new(path));

        // Assert
        assert_eq!(actual.is_some(), expected);
    }

    #[rstest]
    #[case(ImportTarget::DotNet, "microsoft-csharp")]
    #[case(ImportTarget::Mono, "mono-csharp")]
    #[trace]
    fn csproj_language_extension_tests(#[case] target: ImportTarget, #[case] expected: &str) {
        // Arrange
        let processor = CsProjProcessor;

        // Act
        let actual = processor.language_extension_id(target);

        // Assert
        assert_eq!(actual, expected);
    }

    #[test]
    fn register_replaces_and_lists_extensions() {
        // Arrange
        let mut registry = ProcessorRegistry::with_defaults();

        // Act
        registry.register(".VBPROJ", Fake).register("csproj", Fake);

        // Assert
        assert_eq!(registry.extensions().collect::<Vec<_>>(), vec!["csproj", "vbproj"]);
        assert_eq!(
            registry
                .find("csproj")
                .unwrap()
                .language_extension_id(ImportTarget::DotNet),
            "fake"
        );
        assert_eq!(format!("{registry:?}"), r#"{"csproj", "vbproj"}"#);
    }

    #[test]
    fn empty_registry_finds_nothing() {
        // Arrange
        let registry = ProcessorRegistry::new();

        // Act
        let actual = registry.find_for_path(Path::new("App.csproj"));

        // Assert
        assert!(actual.is_none());
        assert_eq!(registry.extensions().count(), 0);
    }
}
