use std::{
    fs,
    path::{Path, PathBuf},
};

use indexmap::IndexMap;
use roxmltree::{Document, Node};
use serde::Serialize;

use crate::{
    error::ImportError,
    make_path,
    msbuild::{self, ConditionKey},
    parent_of,
};

/// Kind of assembly a project produces
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum OutputType {
    Executable,
    Library,
    /// `OutputType` element is absent or has unrecognized value
    #[default]
    Unset,
}

impl OutputType {
    /// Maps `OutputType` element value. Only exact `WinExe` and `Library`
    /// are recognized.
    #[must_use]
    pub fn from_msbuild(value: &str) -> Self {
        match value {
            msbuild::OUTPUT_TYPE_EXECUTABLE => OutputType::Executable,
            msbuild::OUTPUT_TYPE_LIBRARY => OutputType::Library,
            _ => OutputType::Unset,
        }
    }

    #[must_use]
    pub fn is_unset(self) -> bool {
        self == OutputType::Unset
    }
}

/// Settings of one build configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConfigurationGroup {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    pub output_type: OutputType,
    pub target_framework_version: Option<String>,
    pub define_constants: Option<Vec<String>>,
    pub debug_symbols: Option<bool>,
    pub allow_unsafe_blocks: Option<bool>,
}

impl ConfigurationGroup {
    fn read(name: &str, platform: Option<&str>, group: Node<'_, '_>) -> Self {
        let output_type = child_text(group, msbuild::OUTPUT_TYPE)
            .map_or(OutputType::Unset, |t| OutputType::from_msbuild(&t));
        let target_framework_version = child_text(group, msbuild::TARGET_FRAMEWORK_VERSION);
        let define_constants = child_text(group, msbuild::DEFINE_CONSTANTS).map(|c| {
            c.split(msbuild::CONSTANTS_SEPARATOR)
                .map(str::to_owned)
                .collect()
        });
        let debug_symbols =
            child_text(group, msbuild::DEBUG_SYMBOLS).map(|v| msbuild::parse_bool(&v));
        let allow_unsafe_blocks =
            child_text(group, msbuild::ALLOW_UNSAFE_BLOCKS).map(|v| msbuild::parse_bool(&v));

        Self {
            name: name.to_owned(),
            platform: platform.map(str::to_owned),
            output_type,
            target_framework_version,
            define_constants,
            debug_symbols,
            allow_unsafe_blocks,
        }
    }

    /// Fills every setting not set explicitly by this group from `defaults`.
    /// Explicit values always win.
    pub fn inherit(&mut self, defaults: &ConfigurationGroup) {
        if self.output_type.is_unset() {
            self.output_type = defaults.output_type;
        }
        if self.target_framework_version.is_none() {
            self.target_framework_version
                .clone_from(&defaults.target_framework_version);
        }
        if self.define_constants.is_none() {
            self.define_constants.clone_from(&defaults.define_constants);
        }
        self.debug_symbols = self.debug_symbols.or(defaults.debug_symbols);
        self.allow_unsafe_blocks = self.allow_unsafe_blocks.or(defaults.allow_unsafe_blocks);
    }

    #[must_use]
    pub fn debug_symbols_or_default(&self) -> bool {
        self.debug_symbols.unwrap_or(false)
    }

    #[must_use]
    pub fn allow_unsafe_blocks_or_default(&self) -> bool {
        self.allow_unsafe_blocks.unwrap_or(false)
    }

    #[must_use]
    pub fn define_constants_or_default(&self) -> &[String] {
        self.define_constants.as_deref().unwrap_or_default()
    }
}

/// Everything importable extracted from a single project file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProjectModel {
    /// Configurations in declaration order with unconditional settings merged in
    pub configurations: IndexMap<String, ConfigurationGroup>,
    /// Referenced assemblies in document order
    pub references: Vec<String>,
    /// Existing compiled source files
    pub compile_items: Vec<PathBuf>,
}

impl ProjectModel {
    /// Reads and extracts project file
    pub fn from_path(path: &Path) -> Result<Self, ImportError> {
        let contents = fs::read_to_string(path).map_err(|e| ImportError::io(path, e))?;
        Self::parse(&contents, path)
    }

    /// Extracts project from its XML content.
    ///
    /// `project_path` names the project in errors and its directory is the
    /// base of compile items.
    ///
    /// Only direct children of the root element are examined.
    /// An unconditional `PropertyGroup` provides fallback values for every
    /// configuration. Conditional groups must use
    /// `'$(Configuration)|$(Platform)' == 'configuration|platform'` form and
    /// are keyed by configuration only, so a later group with the same
    /// configuration replaces an earlier one.
    pub fn parse(contents: &str, project_path: &Path) -> Result<Self, ImportError> {
        let document = Document::parse(contents).map_err(|source| ImportError::Xml {
            path: project_path.to_path_buf(),
            source,
        })?;
        let dir = parent_of(project_path);

        let mut model = ProjectModel::default();
        let mut defaults: Option<ConfigurationGroup> = None;

        for node in document.root_element().children() {
            if is_element_named(node, msbuild::ITEM_GROUP) {
                model.read_items(node, dir);
            } else if is_element_named(node, msbuild::PROPERTY_GROUP) {
                match node.attribute(msbuild::CONDITION) {
                    None => defaults = Some(ConfigurationGroup::read("", None, node)),
                    Some(condition) => {
                        let ConditionKey {
                            configuration,
                            platform,
                        } = msbuild::parse_condition(condition).ok_or_else(|| {
                            ImportError::UnsupportedCondition {
                                path: project_path.to_path_buf(),
                                condition: condition.to_owned(),
                            }
                        })?;
                        let group = ConfigurationGroup::read(configuration, Some(platform), node);
                        model
                            .configurations
                            .insert(configuration.to_owned(), group);
                    }
                }
            }
        }

        if let Some(defaults) = defaults {
            model
                .configurations
                .values_mut()
                .for_each(|g| g.inherit(&defaults));
        }

        Ok(model)
    }

    fn read_items(&mut self, group: Node<'_, '_>, dir: &Path) {
        for item in group.children() {
            if is_element_named(item, msbuild::REFERENCE) {
                if let Some(include) = item.attribute(msbuild::INCLUDE) {
                    self.references.push(include.to_owned());
                } else {
                    tracing::debug!("Reference without {} attribute ignored", msbuild::INCLUDE);
                }
            } else if is_element_named(item, msbuild::COMPILE) {
                let Some(include) = item.attribute(msbuild::INCLUDE) else {
                    continue;
                };
                let path = make_path(dir, include);
                if path.exists() {
                    self.compile_items.push(path);
                } else {
                    tracing::debug!("Compile item {} not found", path.display());
                }
            }
        }
    }
}

fn is_element_named(node: Node<'_, '_>, name: &str) -> bool {
    node.is_element()
        && node.tag_name().name() == name
        && node
            .tag_name()
            .namespace()
            .is_none_or(|ns| ns == msbuild::NAMESPACE)
}

/// Text of the first child element named so. All its text nodes are joined
/// so comments inside the value are dropped. Empty element gives empty string.
fn child_text(node: Node<'_, '_>, name: &str) -> Option<String> {
    node.children()
        .find(|c| is_element_named(*c, name))
        .map(|c| {
            c.children()
                .filter(Node::is_text)
                .filter_map(|t| t.text())
                .collect()
        })
}
