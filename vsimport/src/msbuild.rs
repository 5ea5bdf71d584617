use std::sync::LazyLock;

use regex::Regex;

/// `MSBuild` 2003 schema namespace. Newer SDK style projects omit it so
/// element lookup compares local names only.
pub const NAMESPACE: &str = "http://schemas.microsoft.com/developer/msbuild/2003";

pub const PROPERTY_GROUP: &str = "PropertyGroup";
pub const ITEM_GROUP: &str = "ItemGroup";
pub const REFERENCE: &str = "Reference";
pub const COMPILE: &str = "Compile";
pub const INCLUDE: &str = "Include";
pub const CONDITION: &str = "Condition";

pub const OUTPUT_TYPE: &str = "OutputType";
pub const TARGET_FRAMEWORK_VERSION: &str = "TargetFrameworkVersion";
pub const DEFINE_CONSTANTS: &str = "DefineConstants";
pub const DEBUG_SYMBOLS: &str = "DebugSymbols";
pub const ALLOW_UNSAFE_BLOCKS: &str = "AllowUnsafeBlocks";

pub const OUTPUT_TYPE_EXECUTABLE: &str = "WinExe";
pub const OUTPUT_TYPE_LIBRARY: &str = "Library";

/// Separator of `DefineConstants` values
pub const CONSTANTS_SEPARATOR: char = ';';

static CONFIGURATION_CONDITION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?i:'\$\(Configuration\)\|\$\(Platform\)')\s*==\s*'([^']*)\|([^'|]*)'\s*$")
        .expect("configuration condition pattern must compile")
});

/// Configuration and platform pair taken from a property group condition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConditionKey<'a> {
    pub configuration: &'a str,
    pub platform: &'a str,
}

/// Splits `'$(Configuration)|$(Platform)' == 'Debug|AnyCPU'` into its
/// configuration and platform parts. Property names are case insensitive,
/// values are kept as written.
/// Returns `None` for any other condition shape.
#[must_use]
pub fn parse_condition(condition: &str) -> Option<ConditionKey<'_>> {
    let captures = CONFIGURATION_CONDITION.captures(condition)?;
    let configuration = captures.get(1)?.as_str();
    let platform = captures.get(2)?.as_str();
    Some(ConditionKey {
        configuration,
        platform,
    })
}

/// `MSBuild` boolean literal semantic: only case insensitive `true` is true
#[must_use]
pub fn parse_bool(value: &str) -> bool {
    value.eq_ignore_ascii_case("true")
}

/// Strips `v` prefix from `TargetFrameworkVersion` value (`v4.5` becomes `4.5`)
#[must_use]
pub fn framework_version(value: &str) -> &str {
    value.strip_prefix(['v', 'V']).unwrap_or(value)
}

/// Shows whether id specified is ID of
/// solution folder type project
#[must_use]
pub fn is_solution_folder(id: &str) -> bool {
    id.eq_ignore_ascii_case(ID_SOLUTION_FOLDER)
}

/// Shows whether id specified is ID of
/// Website type project
#[must_use]
pub fn is_web_site_project(id: &str) -> bool {
    id.eq_ignore_ascii_case(ID_WEB_SITE_PROJECT)
}

/// Describes project by id.
/// Returns human-readable description
/// or id itself if it's not match any
#[must_use]
pub fn describe_project(id: &str) -> &str {
    PROJECT_TYPES
        .get(id.to_ascii_uppercase().as_str())
        .copied()
        .unwrap_or(id)
}

const ID_SOLUTION_FOLDER: &str = "{2150E333-8FDC-42A3-9474-1A3956D46DE8}";
const ID_WEB_SITE_PROJECT: &str = "{E24C65DC-7377-472B-9ABA-BC803B73C61A}";

// Keys are upper case, lookups normalize the id before querying
static PROJECT_TYPES: phf::Map<&'static str, &'static str> = phf::phf_map! {
    "{FAE04EC0-301F-11D3-BF4B-00C04F79EFBC}" => "C#",
    "{9A19103F-16F7-4668-BE54-9A1E7A4F7556}" => "C# (.Net Core)",
    "{F184B08F-C81C-45F6-A57F-5ABD9991F28F}" => "VB.NET",
    "{778DAE3C-4631-46EA-AA77-85C1314464D9}" => "VB.NET",
    "{F2A71F9B-5D33-465A-A702-920D77279786}" => "F#",
    "{8BC9CEB8-8B4A-11D0-8D11-00A0C91BC942}" => "C++",
    "{E6FDF86B-F3D1-11D4-8576-0002A516ECE8}" => "J#",
    "{2150E333-8FDC-42A3-9474-1A3956D46DE8}" => "Solution Folder",
    "{E24C65DC-7377-472B-9ABA-BC803B73C61A}" => "Web Site",
    "{349C5851-65DF-11DA-9384-00065B846F21}" => "Web Application",
    "{3AC096D0-A1C2-E12C-1390-A8335801FDAB}" => "Test",
    "{60DC8134-EBA5-43B8-BCC9-BB4BC16C2548}" => "Windows Presentation Foundation (WPF)",
    "{786C830F-07A1-408B-BD7F-6EE04809D6DB}" => "Portable Class Library",
    "{A1591282-1198-4647-A2B1-27E5FF5F6F3B}" => "Silverlight",
    "{EFBA0AD7-5A72-4C68-AF49-83D382785DCF}" => "Mono for Android or Xamarin.Android",
    "{6BC8ED88-2882-458C-8E55-DFD12B67127B}" => "MonoTouch or Xamarin.iOS",
    "{86F6BF2A-E449-4B3E-813B-9ACC37E5545F}" => "MonoDevelop Addin",
    "{B69E3092-B931-443C-ABE7-7E7B65F2A37F}" => "Micro Framework",
    "{BAA0C2D2-18E2-41B9-852F-F413020CAA33}" => "Visual Studio Tools for Office (VSTO)",
    "{3D9AD99F-2412-4246-B90B-4EAA41C64699}" => "Windows Communication Foundation (WCF)",
    "{6D335F3A-9D43-41B4-9D22-F6F17C4BE596}" => "XNA (Windows)",
    "{930C7802-8A8C-48F9-8165-68863BCCD9DD}" => "WiX (Windows Installer XML)",
};
