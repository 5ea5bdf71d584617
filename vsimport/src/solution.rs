use std::{
    fs,
    path::{Path, PathBuf},
    sync::LazyLock,
};

use miette::{NamedSource, SourceSpan};
use regex::Regex;
use serde::Serialize;

use crate::{error::ImportError, make_path, msbuild, parent_of};

const UTF8_BOM: &str = "\u{feff}";
const PROJECT_LINE_LOOKAHEAD: &str = "Project(";

static PROJECT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^Project\("([^"]+)"\)\s*=\s*"([^"]+)",\s*"([^"]+)",\s*"([^"]+)"$"#)
        .expect("project line pattern must compile")
});

/// Project declaration as written in the solution file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectLine<'a> {
    /// 1-based line number
    pub line: usize,
    pub type_id: &'a str,
    pub name: &'a str,
    pub path: &'a str,
    pub id: &'a str,
}

/// Project found in a solution whose file exists on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SolutionProjectEntry {
    pub name: String,
    pub path: PathBuf,
    pub type_id: String,
    pub id: String,
}

impl SolutionProjectEntry {
    /// Human-readable project type or type GUID if it's unknown
    #[must_use]
    pub fn type_description(&self) -> &str {
        msbuild::describe_project(&self.type_id)
    }

    /// Directory that contains project file
    #[must_use]
    pub fn directory(&self) -> &Path {
        parent_of(&self.path)
    }

    /// Lower case project file extension without dot
    #[must_use]
    pub fn extension(&self) -> Option<String> {
        self.path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
    }
}

/// Finds all project declarations inside solution content.
///
/// Only lines starting with `Project(` are considered. Any such line
/// that isn't a complete declaration fails the whole solution.
/// `solution_path` is used for error reporting only.
pub fn parse_project_lines<'a>(
    contents: &'a str,
    solution_path: &Path,
) -> Result<Vec<ProjectLine<'a>>, ImportError> {
    // Skip UTF-8 signature if necessary
    let input = contents.strip_prefix(UTF8_BOM).unwrap_or(contents);

    let mut projects = Vec::new();
    let mut offset = 0;
    for (ix, raw) in input.split_inclusive('\n').enumerate() {
        let start = offset;
        offset += raw.len();

        let line = raw.trim_end_matches(['\r', '\n']);
        if !line.starts_with(PROJECT_LINE_LOOKAHEAD) {
            continue;
        }

        let Some(captures) = PROJECT_LINE.captures(line) else {
            return Err(ImportError::MalformedProjectLine {
                path: solution_path.to_path_buf(),
                line: ix + 1,
                src: NamedSource::new(solution_path.to_string_lossy(), input.to_owned()),
                span: SourceSpan::new(start.into(), line.len()),
            });
        };

        let group = |n: usize| captures.get(n).map_or("", |m| m.as_str());
        projects.push(ProjectLine {
            line: ix + 1,
            type_id: group(1),
            name: group(2),
            path: group(3),
            id: group(4),
        });
    }
    Ok(projects)
}

/// Parses solution content and resolves project paths against
/// the directory of `solution_path`.
///
/// Projects whose path doesn't exist or points to a directory
/// (solution folders, web sites and so on) are skipped silently.
pub fn scan_str(
    contents: &str,
    solution_path: &Path,
) -> Result<Vec<SolutionProjectEntry>, ImportError> {
    let dir = parent_of(solution_path);
    let entries = parse_project_lines(contents, solution_path)?
        .into_iter()
        .filter_map(|p| {
            let path = make_path(dir, p.path);
            if is_existing_file(&path) {
                Some(SolutionProjectEntry {
                    name: p.name.to_owned(),
                    path,
                    type_id: p.type_id.to_owned(),
                    id: p.id.to_owned(),
                })
            } else if msbuild::is_solution_folder(p.type_id) || msbuild::is_web_site_project(p.type_id) {
                tracing::debug!(
                    "Skipping {} {} declared at line {}",
                    msbuild::describe_project(p.type_id),
                    p.name,
                    p.line
                );
                None
            } else {
                tracing::debug!(
                    "Skipping project {} declared at line {}: {} is not a file",
                    p.name,
                    p.line,
                    path.display()
                );
                None
            }
        })
        .collect();
    Ok(entries)
}

/// Reads solution file and returns all existing projects it declares
pub fn scan_file(solution_path: &Path) -> Result<Vec<SolutionProjectEntry>, ImportError> {
    let contents =
        fs::read_to_string(solution_path).map_err(|e| ImportError::io(solution_path, e))?;
    scan_str(&contents, solution_path)
}

fn is_existing_file(path: &Path) -> bool {
    fs::metadata(path).is_ok_and(|m| !m.is_dir())
}
