#![no_main]
use std::path::Path;

use libfuzzer_sys::fuzz_target;
use vsimport::ProjectModel;

fuzz_target!(|data: &str| {
    let _ = ProjectModel::parse(data, Path::new("/nonexistent/fuzz.csproj"));
});
