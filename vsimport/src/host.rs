use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Serialize;

use crate::project::OutputType;

/// Handle of a module created through [`ModuleModel`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ModuleId(usize);

/// Kind of artifact a module layer builds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum ModuleTarget {
    #[default]
    Executable,
    Library,
}

impl From<OutputType> for ModuleTarget {
    fn from(value: OutputType) -> Self {
        match value {
            OutputType::Library => ModuleTarget::Library,
            OutputType::Executable | OutputType::Unset => ModuleTarget::Executable,
        }
    }
}

/// Operations an IDE module model exposes to the importer.
///
/// Layer operations address a layer by module and layer name. The importer
/// always adds a layer before configuring it.
pub trait ModuleModel {
    /// Creates module with content root at `content_root`
    fn create_module(&mut self, name: &str, content_root: &Path) -> ModuleId;

    /// Registers build configuration layer
    fn add_layer(&mut self, module: ModuleId, layer: &str);

    fn set_current_layer(&mut self, module: ModuleId, layer: &str);

    /// Enables module extension (framework or language support) on the layer
    fn enable_extension(&mut self, module: ModuleId, layer: &str, extension_id: &str);

    fn set_target(&mut self, module: ModuleId, layer: &str, target: ModuleTarget);

    fn set_debug_info(&mut self, module: ModuleId, layer: &str, enabled: bool);

    fn set_unsafe_code(&mut self, module: ModuleId, layer: &str, enabled: bool);

    /// Replaces preprocessor symbols of the layer
    fn set_preprocessor_symbols(&mut self, module: ModuleId, layer: &str, symbols: &[String]);

    fn add_library_reference(&mut self, module: ModuleId, layer: &str, reference: &str);

    fn add_content_entry(&mut self, module: ModuleId, layer: &str, path: &Path);

    /// Selects SDK whose version starts with `version`.
    /// Returns false if none matches.
    fn select_sdk(&mut self, module: ModuleId, layer: &str, version: &str) -> bool;
}

/// SDK registered in [`MemoryModel`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sdk {
    pub name: String,
    pub version: String,
    /// Bundled SDKs are preferred over user defined ones
    pub predefined: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Layer {
    pub extensions: Vec<String>,
    pub target: ModuleTarget,
    pub debug_info: bool,
    pub unsafe_code: bool,
    pub preprocessor_symbols: Vec<String>,
    pub references: Vec<String>,
    pub content_entries: Vec<PathBuf>,
    /// Name of selected SDK
    pub sdk: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    pub name: String,
    pub content_root: PathBuf,
    pub layers: IndexMap<String, Layer>,
    pub current_layer: Option<String>,
}

/// [`ModuleModel`] that keeps everything in memory.
/// Used to preview an import outside of an IDE and in tests.
#[derive(Debug, Default)]
pub struct MemoryModel {
    modules: Vec<Module>,
    sdks: Vec<Sdk>,
}

impl MemoryModel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_sdk(mut self, name: &str, version: &str, predefined: bool) -> Self {
        self.sdks.push(Sdk {
            name: name.to_owned(),
            version: version.to_owned(),
            predefined,
        });
        self
    }

    #[must_use]
    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    #[must_use]
    pub fn module(&self, id: ModuleId) -> Option<&Module> {
        self.modules.get(id.0)
    }

    #[must_use]
    pub fn sdks(&self) -> &[Sdk] {
        &self.sdks
    }

    fn layer_mut(&mut self, module: ModuleId, layer: &str) -> Option<&mut Layer> {
        self.modules
            .get_mut(module.0)
            .map(|m| m.layers.entry(layer.to_owned()).or_default())
    }
}

impl ModuleModel for MemoryModel {
    fn create_module(&mut self, name: &str, content_root: &Path) -> ModuleId {
        self.modules.push(Module {
            name: name.to_owned(),
            content_root: content_root.to_path_buf(),
            layers: IndexMap::new(),
            current_layer: None,
        });
        ModuleId(self.modules.len() - 1)
    }

    fn add_layer(&mut self, module: ModuleId, layer: &str) {
        self.layer_mut(module, layer);
    }

    fn set_current_layer(&mut self, module: ModuleId, layer: &str) {
        if let Some(m) = self.modules.get_mut(module.0) {
            m.current_layer = Some(layer.to_owned());
        }
    }

    fn enable_extension(&mut self, module: ModuleId, layer: &str, extension_id: &str) {
        if let Some(l) = self.layer_mut(module, layer) {
            if !l.extensions.iter().any(|e| e == extension_id) {
                l.extensions.push(extension_id.to_owned());
            }
        }
    }

    fn set_target(&mut self, module: ModuleId, layer: &str, target: ModuleTarget) {
        if let Some(l) = self.layer_mut(module, layer) {
            l.target = target;
        }
    }

    fn set_debug_info(&mut self, module: ModuleId, layer: &str, enabled: bool) {
        if let Some(l) = self.layer_mut(module, layer) {
            l.debug_info = enabled;
        }
    }

    fn set_unsafe_code(&mut self, module: ModuleId, layer: &str, enabled: bool) {
        if let Some(l) = self.layer_mut(module, layer) {
            l.unsafe_code = enabled;
        }
    }

    fn set_preprocessor_symbols(&mut self, module: ModuleId, layer: &str, symbols: &[String]) {
        if let Some(l) = self.layer_mut(module, layer) {
            l.preprocessor_symbols.clear();
            l.preprocessor_symbols.extend_from_slice(symbols);
        }
    }

    fn add_library_reference(&mut self, module: ModuleId, layer: &str, reference: &str) {
        if let Some(l) = self.layer_mut(module, layer) {
            l.references.push(reference.to_owned());
        }
    }

    fn add_content_entry(&mut self, module: ModuleId, layer: &str, path: &Path) {
        if let Some(l) = self.layer_mut(module, layer) {
            l.content_entries.push(path.to_path_buf());
        }
    }

    fn select_sdk(&mut self, module: ModuleId, layer: &str, version: &str) -> bool {
        // predefined first, registration order otherwise
        let sdk = self
            .sdks
            .iter()
            .filter(|s| s.predefined)
            .chain(self.sdks.iter().filter(|s| !s.predefined))
            .find(|s| s.version.starts_with(version))
            .map(|s| s.name.clone());

        match (sdk, self.layer_mut(module, layer)) {
            (Some(name), Some(l)) => {
                l.sdk = Some(name);
                true
            }
            _ => false,
        }
    }
}
