use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

use serde::Serialize;
use thiserror::Error;

use crate::{
    error::ImportError,
    host::{ModuleId, ModuleModel, ModuleTarget},
    msbuild,
    parent_of,
    project::{ConfigurationGroup, ProjectModel},
    registry::ProcessorRegistry,
    solution::{self, SolutionProjectEntry},
};

/// Layer created for a project that declares no configurations
pub const DEFAULT_LAYER: &str = "Default";

/// Framework flavor modules are imported for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum ImportTarget {
    #[default]
    DotNet,
    Mono,
}

impl ImportTarget {
    /// Id of module extension providing framework support
    #[must_use]
    pub fn framework_extension_id(self) -> &'static str {
        match self {
            ImportTarget::DotNet => "microsoft-dotnet",
            ImportTarget::Mono => "mono-dotnet",
        }
    }

    #[must_use]
    pub fn presentable_name(self) -> &'static str {
        match self {
            ImportTarget::DotNet => ".NET",
            ImportTarget::Mono => "Mono",
        }
    }
}

impl fmt::Display for ImportTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.presentable_name())
    }
}

#[derive(Debug, Error)]
#[error("Unknown import target '{0}'. Use dotnet or mono")]
pub struct UnknownTargetError(String);

impl FromStr for ImportTarget {
    type Err = UnknownTargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dotnet" | ".net" | "net" => Ok(ImportTarget::DotNet),
            "mono" => Ok(ImportTarget::Mono),
            _ => Err(UnknownTargetError(s.to_owned())),
        }
    }
}

/// Import settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOptions {
    /// Target every scanned project starts with
    pub target: ImportTarget,
    /// Name of the layer created for projects without configurations
    pub default_layer: String,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            target: ImportTarget::default(),
            default_layer: DEFAULT_LAYER.to_owned(),
        }
    }
}

/// Project ready to be committed
#[derive(Debug, Clone, Serialize)]
pub struct ImportItem {
    pub project: SolutionProjectEntry,
    pub target: ImportTarget,
    /// Registry key (extension) of the processor that extracted the project
    pub processor: String,
    pub model: ProjectModel,
}

/// Project whose file could not be extracted
#[derive(Debug)]
pub struct ProjectFailure {
    pub project: SolutionProjectEntry,
    pub error: ImportError,
}

/// What [`ImportSession::commit`] did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReport {
    pub solution_module: ModuleId,
    /// Modules in item order
    pub project_modules: Vec<ModuleId>,
    pub failed: usize,
    pub unsupported: usize,
}

/// Scanned solution waiting to be committed into a module model.
///
/// Scanning never touches the model so targets may be changed per item
/// before commit.
pub struct ImportSession<'r> {
    registry: &'r ProcessorRegistry,
    options: ImportOptions,
    solution_path: PathBuf,
    items: Vec<ImportItem>,
    failures: Vec<ProjectFailure>,
    unsupported: Vec<SolutionProjectEntry>,
}

impl<'r> ImportSession<'r> {
    /// Parses solution file and extracts every project it declares.
    ///
    /// Only solution level errors are returned. Project errors are kept
    /// in [`failures`](Self::failures).
    pub fn scan(
        solution_path: &Path,
        registry: &'r ProcessorRegistry,
        options: ImportOptions,
    ) -> Result<Self, ImportError> {
        let entries = solution::scan_file(solution_path)?;
        Ok(Self::from_entries(solution_path, entries, registry, options))
    }

    /// Extracts projects already found in solution
    pub fn from_entries(
        solution_path: &Path,
        entries: impl IntoIterator<Item = SolutionProjectEntry>,
        registry: &'r ProcessorRegistry,
        options: ImportOptions,
    ) -> Self {
        let target = options.target;
        let mut session = Self {
            registry,
            options,
            solution_path: solution_path.to_path_buf(),
            items: Vec::new(),
            failures: Vec::new(),
            unsupported: Vec::new(),
        };

        for project in entries {
            let found = project
                .extension()
                .and_then(|ext| registry.find(&ext).map(|p| (ext, p)));
            let Some((key, processor)) = found else {
                tracing::debug!(
                    "No processor for project {} ({})",
                    project.name,
                    project.path.display()
                );
                session.unsupported.push(project);
                continue;
            };

            match processor.extract(&project.path) {
                Ok(model) => session.items.push(ImportItem {
                    project,
                    target,
                    processor: key,
                    model,
                }),
                Err(error) => {
                    tracing::warn!("Project {} skipped: {error}", project.name);
                    session.failures.push(ProjectFailure { project, error });
                }
            }
        }
        session
    }

    #[must_use]
    pub fn items(&self) -> &[ImportItem] {
        &self.items
    }

    pub fn items_mut(&mut self) -> &mut [ImportItem] {
        &mut self.items
    }

    /// Changes target of the item at `index`. Returns false if there is no such item
    pub fn set_target(&mut self, index: usize, target: ImportTarget) -> bool {
        match self.items.get_mut(index) {
            Some(item) => {
                item.target = target;
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn failures(&self) -> &[ProjectFailure] {
        &self.failures
    }

    #[must_use]
    pub fn unsupported(&self) -> &[SolutionProjectEntry] {
        &self.unsupported
    }

    #[must_use]
    pub fn solution_path(&self) -> &Path {
        &self.solution_path
    }

    #[must_use]
    pub fn options(&self) -> &ImportOptions {
        &self.options
    }

    /// Name of the directory containing solution or solution file stem
    /// if the directory has no name (root)
    #[must_use]
    pub fn solution_name(&self) -> String {
        parent_of(&self.solution_path)
            .file_name()
            .or_else(|| self.solution_path.file_stem())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Creates solution module and one module per item
    pub fn commit(&self, model: &mut dyn ModuleModel) -> ImportReport {
        let solution_module = model.create_module(
            &format!("{} (Solution)", self.solution_name()),
            parent_of(&self.solution_path),
        );

        let project_modules = self
            .items
            .iter()
            .map(|item| self.commit_item(item, model))
            .collect::<Vec<_>>();

        tracing::info!(
            "Imported {} projects from {} ({} failed, {} unsupported)",
            project_modules.len(),
            self.solution_path.display(),
            self.failures.len(),
            self.unsupported.len()
        );

        ImportReport {
            solution_module,
            project_modules,
            failed: self.failures.len(),
            unsupported: self.unsupported.len(),
        }
    }

    fn commit_item(&self, item: &ImportItem, model: &mut dyn ModuleModel) -> ModuleId {
        let module = model.create_module(&item.project.name, item.project.directory());
        let language = self
            .registry
            .find(&item.processor)
            .map(|p| p.language_extension_id(item.target));
        let mut setup = LayerSetup {
            model,
            module,
            item,
            language,
        };

        if item.model.configurations.is_empty() {
            let layer = self.options.default_layer.as_str();
            setup.apply(layer, &ConfigurationGroup::default());
            setup.model.set_current_layer(module, layer);
        } else {
            for (layer, group) in &item.model.configurations {
                setup.apply(layer, group);
            }
            if let Some(first) = item.model.configurations.keys().next() {
                setup.model.set_current_layer(module, first);
            }
        }
        module
    }
}

impl fmt::Debug for ImportSession<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImportSession")
            .field("solution_path", &self.solution_path)
            .field("options", &self.options)
            .field("items", &self.items)
            .field("failures", &self.failures)
            .field("unsupported", &self.unsupported)
            .finish_non_exhaustive()
    }
}

struct LayerSetup<'a, 'm> {
    model: &'m mut dyn ModuleModel,
    module: ModuleId,
    item: &'a ImportItem,
    language: Option<&'static str>,
}

impl LayerSetup<'_, '_> {
    fn apply(&mut self, layer: &str, group: &ConfigurationGroup) {
        let module = self.module;
        let target = self.item.target;
        let model = &mut *self.model;

        model.add_layer(module, layer);
        model.add_content_entry(module, layer, self.item.project.directory());

        model.enable_extension(module, layer, target.framework_extension_id());
        if let Some(language) = self.language {
            model.enable_extension(module, layer, language);
        }

        model.set_target(module, layer, ModuleTarget::from(group.output_type));
        model.set_debug_info(module, layer, group.debug_symbols_or_default());
        model.set_unsafe_code(module, layer, group.allow_unsafe_blocks_or_default());
        model.set_preprocessor_symbols(module, layer, group.define_constants_or_default());

        if let Some(version) = group.target_framework_version.as_deref() {
            let version = msbuild::framework_version(version);
            if !model.select_sdk(module, layer, version) {
                tracing::debug!(
                    "No {target} SDK {version} found for layer {layer} of {}",
                    self.item.project.name
                );
            }
        }

        for reference in &self.item.model.references {
            model.add_library_reference(module, layer, reference);
        }
        for path in &self.item.model.compile_items {
            model.add_content_entry(module, layer, path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{host::MemoryModel, registry::ProjectProcessor};
    use rstest::rstest;
    use std::fs;

    #[rstest]
    #[case("dotnet", Some(ImportTarget::DotNet))]
    #[case(".NET", Some(ImportTarget::DotNet))]
    #[case("Mono", Some(ImportTarget::Mono))]
    #[case("java", None)]
    #[case("", None)]
    #[trace]
    fn import_target_from_str_tests(#[case] value: &str, #[case] expected: Option<ImportTarget>) {
        // Arrange

        // Act
        let actual = value.parse::<ImportTarget>().ok();

        // Assert
        assert_eq!(actual, expected);
    }

    #[rstest]
    #[case(ImportTarget::DotNet, "microsoft-dotnet", ".NET")]
    #[case(ImportTarget::Mono, "mono-dotnet", "Mono")]
    #[trace]
    fn import_target_ids_tests(
        #[case] target: ImportTarget,
        #[case] extension: &str,
        #[case] name: &str,
    ) {
        // Arrange

        // Act & Assert
        assert_eq!(target.framework_extension_id(), extension);
        assert_eq!(target.presentable_name(), name);
        assert_eq!(target.to_string(), name);
    }

    struct Fixture {
        dir: tempfile::TempDir,
        solution: PathBuf,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("Calc");
        for project in ["App", "Empty", "Broken", "Native"] {
            fs::create_dir_all(root.join(project)).unwrap();
        }
        fs::write(root.join("App").join("App.csproj"), APP_PROJECT).unwrap();
        fs::write(root.join("App").join("Program.cs"), "class P {}").unwrap();
        fs::write(root.join("Empty").join("Empty.csproj"), "<Project/>").unwrap();
        fs::write(
            root.join("Broken").join("Broken.csproj"),
            "<Project><PropertyGroup Condition=\"'$(Platform)' == 'x86'\"/></Project>",
        )
        .unwrap();
        fs::write(root.join("Native").join("Native.vcxproj"), "<Project/>").unwrap();
        let solution = root.join("Calc.sln");
        fs::write(&solution, SOLUTION).unwrap();
        Fixture { dir, solution }
    }

    #[test]
    fn scan_keeps_order_and_records_failures() {
        // Arrange
        let fixture = fixture();
        let registry = ProcessorRegistry::with_defaults();

        // Act
        let session =
            ImportSession::scan(&fixture.solution, &registry, ImportOptions::default()).unwrap();

        // Assert
        assert_eq!(
            session
                .items()
                .iter()
                .map(|i| i.project.name.as_str())
                .collect::<Vec<_>>(),
            vec!["App", "Empty"]
        );
        assert_eq!(session.failures().len(), 1);
        assert_eq!(session.failures()[0].project.name, "Broken");
        assert!(matches!(
            session.failures()[0].error,
            ImportError::UnsupportedCondition { .. }
        ));
        assert_eq!(session.unsupported().len(), 1);
        assert_eq!(session.unsupported()[0].name, "Native");
        assert_eq!(session.solution_name(), "Calc");
        assert_eq!(session.items()[0].processor, "csproj");
        assert!(session.items().iter().all(|i| i.target == ImportTarget::DotNet));
    }

    #[test]
    fn scan_malformed_solution_fails() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let solution = dir.path().join("bad.sln");
        fs::write(&solution, "Project(\"{T}\") = \"App\"\n").unwrap();
        let registry = ProcessorRegistry::with_defaults();

        // Act
        let actual = ImportSession::scan(&solution, &registry, ImportOptions::default());

        // Assert
        assert!(matches!(
            actual,
            Err(ImportError::MalformedProjectLine { line: 1, .. })
        ));
    }

    #[test]
    fn commit_creates_layer_per_configuration() {
        // Arrange
        let fixture = fixture();
        let registry = ProcessorRegistry::with_defaults();
        let session =
            ImportSession::scan(&fixture.solution, &registry, ImportOptions::default()).unwrap();
        let mut model = MemoryModel::new()
            .with_sdk("Custom", "4.0.30319", false)
            .with_sdk("Bundled", "4.0.1", true);

        // Act
        let report = session.commit(&mut model);

        // Assert
        assert_eq!(report.project_modules.len(), 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.unsupported, 1);

        let solution = model.module(report.solution_module).unwrap();
        assert_eq!(solution.name, "Calc (Solution)");
        assert_eq!(solution.content_root, fixture.dir.path().join("Calc"));

        let app = model.module(report.project_modules[0]).unwrap();
        assert_eq!(app.name, "App");
        assert_eq!(app.content_root, fixture.dir.path().join("Calc").join("App"));
        assert_eq!(app.layers.keys().collect::<Vec<_>>(), vec!["Debug", "Release"]);
        assert_eq!(app.current_layer.as_deref(), Some("Debug"));

        let debug = &app.layers["Debug"];
        assert_eq!(debug.extensions, vec!["microsoft-dotnet", "microsoft-csharp"]);
        assert_eq!(debug.target, ModuleTarget::Library);
        assert!(debug.debug_info);
        assert!(!debug.unsafe_code);
        assert_eq!(debug.preprocessor_symbols, vec!["DEBUG", "TRACE"]);
        assert_eq!(debug.sdk.as_deref(), Some("Bundled"));
        assert_eq!(
            debug.content_entries,
            vec![
                fixture.dir.path().join("Calc").join("App"),
                fixture.dir.path().join("Calc").join("App").join("Program.cs"),
            ]
        );

        let release = &app.layers["Release"];
        assert!(!release.debug_info);
        assert!(release.unsafe_code);
        assert_eq!(release.references, debug.references);
        assert_eq!(release.references, vec!["System", "System.Data"]);
    }

    #[test]
    fn commit_project_without_configurations_creates_default_layer() {
        // Arrange
        let fixture = fixture();
        let registry = ProcessorRegistry::with_defaults();
        let options = ImportOptions {
            target: ImportTarget::Mono,
            ..ImportOptions::default()
        };
        let session = ImportSession::scan(&fixture.solution, &registry, options).unwrap();
        let mut model = MemoryModel::new();

        // Act
        let report = session.commit(&mut model);

        // Assert
        let empty = model.module(report.project_modules[1]).unwrap();
        assert_eq!(empty.layers.keys().collect::<Vec<_>>(), vec![DEFAULT_LAYER]);
        assert_eq!(empty.current_layer.as_deref(), Some(DEFAULT_LAYER));
        let layer = &empty.layers[DEFAULT_LAYER];
        assert_eq!(layer.target, ModuleTarget::Executable);
        assert!(!layer.debug_info);
        assert!(!layer.unsafe_code);
        assert!(layer.preprocessor_symbols.is_empty());
        assert_eq!(layer.extensions, vec!["mono-dotnet", "mono-csharp"]);
        assert_eq!(layer.sdk, None);
    }

    #[test]
    fn set_target_changes_committed_extensions() {
        // Arrange
        let fixture = fixture();
        let registry = ProcessorRegistry::with_defaults();
        let mut session =
            ImportSession::scan(&fixture.solution, &registry, ImportOptions::default()).unwrap();
        let mut model = MemoryModel::new();

        // Act
        let changed = session.set_target(0, ImportTarget::Mono);
        let missing = session.set_target(10, ImportTarget::Mono);
        let report = session.commit(&mut model);

        // Assert
        assert!(changed);
        assert!(!missing);
        let app = model.module(report.project_modules[0]).unwrap();
        assert_eq!(
            app.layers["Release"].extensions,
            vec!["mono-dotnet", "mono-csharp"]
        );
        let empty = model.module(report.project_modules[1]).unwrap();
        assert_eq!(
            empty.layers[DEFAULT_LAYER].extensions,
            vec!["microsoft-dotnet", "microsoft-csharp"]
        );
    }

    #[test]
    fn custom_processor_and_default_layer_name() {
        // Arrange
        struct Plain;
        impl ProjectProcessor for Plain {
            fn language_extension_id(&self, _target: ImportTarget) -> &'static str {
                "plain"
            }
            fn extract(&self, _path: &Path) -> Result<ProjectModel, ImportError> {
                Ok(ProjectModel::default())
            }
        }
        let mut registry = ProcessorRegistry::new();
        registry.register("vcxproj", Plain);
        let options = ImportOptions {
            default_layer: "Main".to_owned(),
            ..ImportOptions::default()
        };
        let entries = vec![SolutionProjectEntry {
            name: "Native".to_owned(),
            path: PathBuf::from("/src/Native/Native.VCXPROJ"),
            type_id: "{8BC9CEB8-8B4A-11D0-8D11-00A0C91BC942}".to_owned(),
            id: "{00000000-0000-0000-0000-000000000001}".to_owned(),
        }];
        let session =
            ImportSession::from_entries(Path::new("/src/All.sln"), entries, &registry, options);
        let mut model = MemoryModel::new();

        // Act
        let report = session.commit(&mut model);

        // Assert
        assert_eq!(session.solution_name(), "src");
        let native = model.module(report.project_modules[0]).unwrap();
        assert_eq!(native.current_layer.as_deref(), Some("Main"));
        assert_eq!(
            native.layers["Main"].extensions,
            vec!["microsoft-dotnet", "plain"]
        );
    }

    #[test]
    fn items_mut_retargets_before_commit() {
        // Arrange
        let fixture = fixture();
        let registry = ProcessorRegistry::with_defaults();
        let options = ImportOptions {
            default_layer: "Main".to_owned(),
            ..ImportOptions::default()
        };
        let mut session = ImportSession::scan(&fixture.solution, &registry, options).unwrap();
        let mut model = MemoryModel::new();

        // Act
        session
            .items_mut()
            .iter_mut()
            .for_each(|i| i.target = ImportTarget::Mono);
        let report = session.commit(&mut model);

        // Assert
        assert_eq!(session.options().default_layer, "Main");
        assert_eq!(session.options().target, ImportTarget::DotNet);
        assert!(session.items().iter().all(|i| i.target == ImportTarget::Mono));
        let empty = model.module(report.project_modules[1]).unwrap();
        assert_eq!(
            empty.layers["Main"].extensions,
            vec!["mono-dotnet", "mono-csharp"]
        );
    }

    #[test]
    fn solution_name_falls_back_to_file_stem() {
        // Arrange
        let registry = ProcessorRegistry::new();

        // Act
        let session = ImportSession::from_entries(
            Path::new("All.sln"),
            Vec::new(),
            &registry,
            ImportOptions::default(),
        );

        // Assert
        assert_eq!(session.solution_name(), "All");
    }

    const SOLUTION: &str = r#"
Microsoft Visual Studio Solution File, Format Version 12.00
Project("{FAE04EC0-301F-11D3-BF4B-00C04F79EFBC}") = "App", "App\App.csproj", "{A61CD222-0F3B-47B6-9F7F-25D658368EEC}"
EndProject
Project("{FAE04EC0-301F-11D3-BF4B-00C04F79EFBC}") = "Empty", "Empty\Empty.csproj", "{B61CD222-0F3B-47B6-9F7F-25D658368EEC}"
EndProject
Project("{FAE04EC0-301F-11D3-BF4B-00C04F79EFBC}") = "Broken", "Broken\Broken.csproj", "{C61CD222-0F3B-47B6-9F7F-25D658368EEC}"
EndProject
Project("{8BC9CEB8-8B4A-11D0-8D11-00A0C91BC942}") = "Native", "Native\Native.vcxproj", "{D61CD222-0F3B-47B6-9F7F-25D658368EEC}"
EndProject
Project("{FAE04EC0-301F-11D3-BF4B-00C04F79EFBC}") = "Missing", "Missing\Missing.csproj", "{E61CD222-0F3B-47B6-9F7F-25D658368EEC}"
EndProject
"#;

    const APP_PROJECT: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<Project ToolsVersion="12.0" xmlns="http://schemas.microsoft.com/developer/msbuild/2003">
  <PropertyGroup>
    <OutputType>Library</OutputType>
    <TargetFrameworkVersion>v4.0</TargetFrameworkVersion>
  </PropertyGroup>
  <PropertyGroup Condition=" '$(Configuration)|$(Platform)' == 'Debug|AnyCPU' ">
    <DebugSymbols>true</DebugSymbols>
    <DefineConstants>DEBUG;TRACE</DefineConstants>
  </PropertyGroup>
  <PropertyGroup Condition=" '$(Configuration)|$(Platform)' == 'Release|AnyCPU' ">
    <AllowUnsafeBlocks>true</AllowUnsafeBlocks>
  </PropertyGroup>
  <ItemGroup>
    <Reference Include="System" />
    <Reference Include="System.Data" />
  </ItemGroup>
  <ItemGroup>
    <Compile Include="Program.cs" />
  </ItemGroup>
</Project>"#;
}
