use std::fmt::{self, Display};

use serde_json::{Value, json};
use vsimport::{Consume, ImportSession};

/// Serializes scanned sessions. Several solutions are printed as JSON array
pub struct Json {
    serialized: Vec<Value>,
    pretty: bool,
}

impl Json {
    #[must_use]
    pub fn new(pretty: bool) -> Self {
        Self {
            serialized: vec![],
            pretty,
        }
    }
}

fn session_value(session: &ImportSession) -> Value {
    let failures = session
        .failures()
        .iter()
        .map(|f| {
            json!({
                "name": f.project.name,
                "path": f.project.path,
                "error": f.error.to_string(),
            })
        })
        .collect::<Vec<_>>();

    json!({
        "path": session.solution_path(),
        "name": session.solution_name(),
        "projects": session.items(),
        "failures": failures,
        "unsupported": session.unsupported(),
    })
}

impl Consume for Json {
    fn ok(&mut self, session: &ImportSession) {
        self.serialized.push(session_value(session));
    }

    fn err(&mut self, path: &str) {
        tracing::debug!("{path} not serialized");
    }
}

impl Display for Json {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let converter = if self.pretty {
            serde_json::to_string_pretty
        } else {
            serde_json::to_string
        };
        let value = match self.serialized.as_slice() {
            [single] => single.clone(),
            many => Value::Array(many.to_vec()),
        };
        let s = converter(&value).map_err(|_| fmt::Error)?;
        writeln!(f, "{s}")
    }
}
