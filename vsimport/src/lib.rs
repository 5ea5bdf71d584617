/*!
A library for importing Microsoft Visual Studio solutions into a module model:
solution files are scanned for projects and C# project files are turned into
build configurations, references and sources.


## Example: scanning solution content from [&str]

```
use std::path::Path;
use vsimport::solution::parse_project_lines;

const SOLUTION: &str = r#"
Microsoft Visual Studio Solution File, Format Version 12.00
Project("{FAE04EC0-301F-11D3-BF4B-00C04F79EFBC}") = "bench", "bench\bench.csproj", "{A61CD222-0F3B-47B6-9F7F-25D658368EEC}"
EndProject
Global
    GlobalSection(SolutionConfigurationPlatforms) = preSolution
        Debug|Any CPU = Debug|Any CPU
        Release|Any CPU = Release|Any CPU
    EndGlobalSection
EndGlobal
"#;

let result = parse_project_lines(SOLUTION, Path::new("bench.sln"));
assert!(result.is_ok());
let projects = result.unwrap();
assert_eq!(projects.len(), 1);
assert_eq!(projects[0].name, "bench");
assert_eq!(projects[0].path, r"bench\bench.csproj");
```

## Example: extracting project configurations

```
use std::path::Path;
use vsimport::project::{OutputType, ProjectModel};

const PROJECT: &str = r#"<Project xmlns="http://schemas.microsoft.com/developer/msbuild/2003">
  <PropertyGroup>
    <OutputType>Library</OutputType>
  </PropertyGroup>
  <PropertyGroup Condition=" '$(Configuration)|$(Platform)' == 'Debug|AnyCPU' ">
    <DefineConstants>DEBUG;TRACE</DefineConstants>
  </PropertyGroup>
</Project>"#;

let model = ProjectModel::parse(PROJECT, Path::new("bench.csproj")).unwrap();
let debug = &model.configurations["Debug"];
assert_eq!(debug.output_type, OutputType::Library);
assert_eq!(debug.define_constants_or_default(), ["DEBUG", "TRACE"]);
```
*/

#![warn(unused_extern_crates)]
use std::path::{Path, PathBuf};

use jwalk::{Parallelism, WalkDir};

pub mod error;
pub mod host;
pub mod msbuild;
pub mod project;
pub mod registry;
pub mod session;
pub mod solution;

pub use error::ImportError;
pub use host::{MemoryModel, ModuleId, ModuleModel, ModuleTarget};
pub use project::{ConfigurationGroup, OutputType, ProjectModel};
pub use registry::{CsProjProcessor, ProcessorRegistry, ProjectProcessor};
pub use session::{ImportItem, ImportOptions, ImportReport, ImportSession, ImportTarget};
pub use solution::SolutionProjectEntry;

#[cfg(test)] // <-- not needed in integration tests
extern crate rstest;

/// Consume provides scanned [`ImportSession`] consumer
pub trait Consume {
    /// Called in case of success scanning
    fn ok(&mut self, session: &ImportSession);
    /// Called on error
    fn err(&mut self, path: &str);
}

/// `scan_solution` scans single solution file specified by path
/// and extracts all projects it declares.
///
/// # Errors
///
/// This function will return an error if file content cannot be read into memory
/// or solution file has malformed project declaration.
/// Project errors don't fail the scan, they are available in the session.
pub fn scan_solution(
    path: &str,
    registry: &ProcessorRegistry,
    options: &ImportOptions,
    consumer: &mut dyn Consume,
) -> miette::Result<()> {
    match ImportSession::scan(Path::new(path), registry, options.clone()) {
        Ok(session) => {
            consumer.ok(&session);
            Ok(())
        }
        Err(e) => {
            consumer.err(path);
            Err(e.into())
        }
    }
}

/// `scan_dir` scans only directory specified by path.
/// it finds all files with extension specified and scans them.
/// returns the number of scanned solutions
///
/// ## Remarks
/// Any errors occured during scanning of found files will be ignored (so scanning won't stopped)
/// but error paths will be added into error files list (using err function of [`Consume`] trait)
pub fn scan_dir(
    path: &str,
    extension: &str,
    registry: &ProcessorRegistry,
    options: &ImportOptions,
    consumer: &mut dyn Consume,
) -> usize {
    let iter = create_dir_iterator(path).max_depth(1);
    scan_dir_or_tree(iter, extension, registry, options, consumer)
}

/// `scan_dir_tree` scans directory specified by path. recursively
/// it finds all files with extension specified and scans them.
/// returns the number of scanned solutions
///
/// ## Remarks
/// Any errors occured during scanning of found files will be ignored (so scanning won't stopped)
/// but error paths will be added into error files list (using err function of [`Consume`] trait)
pub fn scan_dir_tree(
    path: &str,
    extension: &str,
    registry: &ProcessorRegistry,
    options: &ImportOptions,
    consumer: &mut dyn Consume,
) -> usize {
    let parallelism = Parallelism::RayonNewPool(num_cpus::get_physical());
    let iter = create_dir_iterator(path).parallelism(parallelism);
    scan_dir_or_tree(iter, extension, registry, options, consumer)
}

fn create_dir_iterator(path: &str) -> WalkDir {
    let root = decorate_path(path);
    WalkDir::new(root).skip_hidden(false).follow_links(false)
}

fn scan_dir_or_tree(
    iter: WalkDir,
    extension: &str,
    registry: &ProcessorRegistry,
    options: &ImportOptions,
    consumer: &mut dyn Consume,
) -> usize {
    let ext = extension.trim_start_matches('.');

    iter.into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|f| f.file_type().is_file())
        .map(|f| f.path())
        .filter(|p| {
            p.extension()
                .and_then(|s| s.to_str())
                .is_some_and(|s| s.eq_ignore_ascii_case(ext))
        })
        .map(|f| f.to_string_lossy().into_owned())
        .filter_map(|fp| {
            scan_solution(&fp, registry, options, consumer)
                .inspect_err(|e| tracing::debug!("{e:?}"))
                .ok()
        })
        .count()
}

/// Directory containing `path` or empty path if there is none
#[must_use]
pub fn parent_of(path: &Path) -> &Path {
    path.parent().unwrap_or_else(|| Path::new(""))
}

/// Joins path written in solution or project file to `dir`.
/// Such paths always use back slash (\) as separator so it's replaced
/// by native one outside Windows.
#[must_use]
pub fn make_path(dir: &Path, relative: &str) -> PathBuf {
    if cfg!(target_os = "windows") {
        dir.join(relative)
    } else {
        relative
            .split('\\')
            .filter(|s| !s.is_empty())
            .fold(dir.to_path_buf(), |acc, part| acc.join(part))
    }
}

/// On Windows trailing back slash (\) to be added if volume and colon passed (like c:).
/// It needed paths look to be more pleasant
#[cfg(target_os = "windows")]
fn decorate_path(path: &str) -> String {
    if path.len() == 2 && path.ends_with(':') {
        format!("{path}\\")
    } else {
        path.to_owned()
    }
}

/// On Unix just passthrough as is
#[cfg(not(target_os = "windows"))]
fn decorate_path(path: &str) -> String {
    path.to_owned()
}
