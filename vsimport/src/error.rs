use std::path::PathBuf;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Errors produced while scanning a solution or extracting a project.
///
/// Everything here is fatal for the file it names. Callers processing
/// several projects decide whether to skip the file or abort the batch.
#[derive(Debug, Error, Diagnostic)]
pub enum ImportError {
    #[error("Failed to read content from path: {}", path.display())]
    #[diagnostic(code(vsimport::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Expected the line {line} of {} to be a project declaration", path.display())]
    #[diagnostic(
        code(vsimport::solution::project_line),
        help(
            "Incorrect Visual Studio solution file syntax. Project lines look like: Project(\"<type>\") = \"<name>\", \"<path>\", \"<guid>\""
        )
    )]
    MalformedProjectLine {
        path: PathBuf,
        line: usize,
        #[source_code]
        src: NamedSource<String>,
        #[label("The problem is here")]
        span: SourceSpan,
    },

    #[error("Failed to parse project file: {}", path.display())]
    #[diagnostic(code(vsimport::project::xml))]
    Xml {
        path: PathBuf,
        #[source]
        source: roxmltree::Error,
    },

    #[error("Unsupported property group condition '{condition}' in {}", path.display())]
    #[diagnostic(
        code(vsimport::project::condition),
        help("Only '$(Configuration)|$(Platform)' == '<configuration>|<platform>' conditions are supported")
    )]
    UnsupportedCondition { path: PathBuf, condition: String },
}

impl ImportError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
