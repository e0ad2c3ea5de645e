//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::KeepsakeConfig;
use crate::domain::errors::KeepsakeError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into KeepsakeConfig
/// 4. Applies environment variable overrides (KEEPSAKE_* prefix)
/// 5. Validates the configuration
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - A referenced environment variable is not set
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use keepsake::config::loader::load_config;
///
/// let config = load_config("keepsake.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<KeepsakeConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(KeepsakeError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        KeepsakeError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let mut config = parse_config(&contents)?;

    apply_env_overrides(&mut config);

    config.validate().map_err(|e| {
        KeepsakeError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    tracing::debug!(path = %path.display(), "Loaded configuration");
    Ok(config)
}

/// Parses configuration text after environment substitution, without
/// overrides or validation
pub fn parse_config(contents: &str) -> Result<KeepsakeConfig> {
    let contents = substitute_env_vars(contents)?;
    let config: KeepsakeConfig = toml::from_str(&contents)?;
    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are copied unchanged.
///
/// # Errors
///
/// Returns an error listing every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| KeepsakeError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let processed = re.replace_all(line, |caps: &regex::Captures| {
            let var_name = &caps[1];
            match std::env::var(var_name) {
                Ok(value) => value,
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                    caps[0].to_string()
                }
            }
        });
        result.push_str(&processed);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(KeepsakeError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Overwrites `target` with the parsed value of `name`, if set and parseable
fn override_from_env<T: FromStr>(name: &str, target: &mut T) {
    if let Ok(val) = std::env::var(name) {
        match val.parse() {
            Ok(parsed) => *target = parsed,
            Err(_) => tracing::warn!(variable = name, value = %val, "Ignoring unparseable override"),
        }
    }
}

/// Applies environment variable overrides using KEEPSAKE_* prefix
///
/// Environment variables follow the pattern: KEEPSAKE_<SECTION>_<KEY>
/// For example: KEEPSAKE_STORAGE_BLOB_ROOT, KEEPSAKE_EXPORT_MAX_ARCHIVE_BYTES
fn apply_env_overrides(config: &mut KeepsakeConfig) {
    // Application overrides
    override_from_env("KEEPSAKE_APPLICATION_LOG_LEVEL", &mut config.application.log_level);
    override_from_env("KEEPSAKE_APPLICATION_DRY_RUN", &mut config.application.dry_run);

    // Storage overrides
    override_from_env("KEEPSAKE_STORAGE_BLOB_ROOT", &mut config.storage.blob_root);
    override_from_env("KEEPSAKE_STORAGE_METADATA_ROOT", &mut config.storage.metadata_root);

    // Export overrides
    let export = &mut config.export;
    override_from_env("KEEPSAKE_EXPORT_MAX_ARCHIVE_BYTES", &mut export.max_archive_bytes);
    override_from_env("KEEPSAKE_EXPORT_PARALLEL_BATCHES", &mut export.parallel_batches);
    override_from_env("KEEPSAKE_EXPORT_CATALOG_FILE_NAME", &mut export.catalog_file_name);
    override_from_env("KEEPSAKE_EXPORT_ARCHIVE_DIR", &mut export.archive_dir);
    override_from_env("KEEPSAKE_EXPORT_MAX_NAME_LENGTH", &mut export.max_name_length);
    override_from_env("KEEPSAKE_EXPORT_UPLOAD_MAX_RETRIES", &mut export.upload_max_retries);
    override_from_env("KEEPSAKE_EXPORT_DRY_RUN", &mut export.dry_run);

    // Logging overrides
    override_from_env("KEEPSAKE_LOGGING_LOCAL_ENABLED", &mut config.logging.local_enabled);
    override_from_env("KEEPSAKE_LOGGING_LOCAL_PATH", &mut config.logging.local_path);
    override_from_env("KEEPSAKE_LOGGING_LOCAL_ROTATION", &mut config.logging.local_rotation);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(contents: &str) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(contents.as_bytes()).unwrap();
        temp_file.flush().unwrap();
        temp_file
    }

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("KEEPSAKE_TEST_SUBST_ROOT", "/srv/blobs");
        let input = "blob_root = \"${KEEPSAKE_TEST_SUBST_ROOT}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "blob_root = \"/srv/blobs\"\n");
        std::env::remove_var("KEEPSAKE_TEST_SUBST_ROOT");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        let input = "blob_root = \"${KEEPSAKE_TEST_NEVER_SET}\"";
        let err = substitute_env_vars(input).unwrap_err();
        assert!(err.to_string().contains("KEEPSAKE_TEST_NEVER_SET"));
    }

    #[test]
    fn test_substitute_env_vars_skips_comments() {
        let input = "# blob_root = \"${KEEPSAKE_TEST_NEVER_SET}\"";
        assert_eq!(substitute_env_vars(input).unwrap(), format!("{input}\n"));
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("nonexistent-keepsake.toml");
        assert!(matches!(result, Err(KeepsakeError::Configuration(_))));
    }

    #[test]
    fn test_load_config_valid() {
        let file = write_config(
            r#"
[application]
log_level = "debug"

[storage]
blob_root = "/srv/keepsake/blobs"
metadata_root = "/srv/keepsake/metadata"

[export]
max_archive_bytes = 1073741824
parallel_batches = 2
"#,
        );

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.application.log_level, "debug");
        assert_eq!(config.storage.blob_root, "/srv/keepsake/blobs");
        assert_eq!(config.export.max_archive_bytes, 1_073_741_824);
        assert_eq!(config.export.parallel_batches, 2);
        assert_eq!(config.export.catalog_file_name, "catalog.xmp");
        assert_eq!(config.logging.local_rotation, "daily");
    }

    #[test]
    fn test_load_config_invalid_values() {
        let file = write_config(
            r#"
[storage]
blob_root = "/a"
metadata_root = "/b"

[export]
max_archive_bytes = 0
"#,
        );

        let err = load_config(file.path()).unwrap_err();
        assert!(err.to_string().contains("max_archive_bytes"));
    }

    #[test]
    fn test_parse_config_requires_storage_section() {
        let result = parse_config("[application]\nlog_level = \"info\"\n");
        assert!(matches!(result, Err(KeepsakeError::Configuration(_))));
    }

    #[test]
    fn test_override_from_env() {
        let mut value = 3u32;
        std::env::set_var("KEEPSAKE_TEST_OVERRIDE_NUM", "7");
        override_from_env("KEEPSAKE_TEST_OVERRIDE_NUM", &mut value);
        assert_eq!(value, 7);

        std::env::set_var("KEEPSAKE_TEST_OVERRIDE_NUM", "many");
        override_from_env("KEEPSAKE_TEST_OVERRIDE_NUM", &mut value);
        assert_eq!(value, 7);
        std::env::remove_var("KEEPSAKE_TEST_OVERRIDE_NUM");
    }
}
