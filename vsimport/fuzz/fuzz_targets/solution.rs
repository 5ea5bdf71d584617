#![no_main]
use std::path::Path;

use libfuzzer_sys::fuzz_target;
use vsimport::solution::parse_project_lines;

fuzz_target!(|data: &str| {
    let _ = parse_project_lines(data, Path::new("fuzz.sln"));
});
