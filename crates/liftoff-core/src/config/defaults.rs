//! Default configuration values

/// Default configuration file name (TOML)
pub const DEFAULT_CONFIG_TOML: &str = "liftoff.toml";

/// Default configuration file name (YAML)
pub const DEFAULT_CONFIG_YAML: &str = "liftoff.yaml";

/// Get list of config file names to search for
pub fn config_file_names() -> Vec<&'static str> {
    vec![
        DEFAULT_CONFIG_TOML,
        DEFAULT_CONFIG_YAML,
        ".liftoff.toml",
        ".liftoff.yaml",
    ]
}

/// Default configuration template
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# Liftoff Configuration

output_dir = "dist"
scripts = []

[store]
path = ".liftoff/hashes.json"

[git]
enabled = true
require_clean = true
commit_message = "chore(release): {name}@{version}"
tag_format = "{name}@{version}"
push = false
remote = "origin"

[commands]
build = "npm run build"
version = "npm version {bump} --no-git-tag-version"
publish = "npm publish"
"#;
