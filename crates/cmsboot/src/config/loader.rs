use std::path::Path;

use crate::config::schema::Settings;
use crate::error::ConfigError;

pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_settings_from_str(&content)
}

pub fn load_settings_from_str(content: &str) -> Result<Settings, ConfigError> {
    let settings: Settings = serde_json::from_str(content)?;

    validate_settings(&settings)?;

    Ok(settings)
}

fn validate_settings(settings: &Settings) -> Result<(), ConfigError> {
    if settings.default_sources.is_empty() {
        return Err(ConfigError::Validation {
            message: "default_sources must name at least one source".to_string(),
        });
    }

    if let Some(blank) = settings
        .default_sources
        .iter()
        .find(|s| s.trim().is_empty())
    {
        return Err(ConfigError::Validation {
            message: format!("default_sources contains a blank entry: '{}'", blank),
        });
    }

    if settings.email_domain.as_deref().is_some_and(|d| d.contains('@')) {
        return Err(ConfigError::Validation {
            message: "email_domain must not contain '@'".to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::SectionKind;
    use std::io::Write;

    #[test]
    fn test_empty_object_uses_defaults() {
        let settings = load_settings_from_str("{}").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.default_sources, vec!["roles", "demo"]);
        assert!(settings.email_domain.is_none());
    }

    #[test]
    fn test_load_full_settings() {
        let settings = load_settings_from_str(
            r#"{
                "database_path": "/tmp/site.db",
                "default_sources": ["demo"],
                "email_domain": "example.org"
            }"#,
        )
        .unwrap();
        assert_eq!(settings.database_path, Path::new("/tmp/site.db"));
        assert_eq!(settings.default_sources, vec!["demo"]);
        assert_eq!(settings.email_domain.as_deref(), Some("example.org"));
    }

    #[test]
    fn test_empty_default_sources_rejected() {
        let err = load_settings_from_str(r#"{"default_sources": []}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { .. }));
    }

    #[test]
    fn test_email_domain_with_at_rejected() {
        let err = load_settings_from_str(r#"{"email_domain": "a@b.com"}"#).unwrap_err();
        assert!(err.to_string().contains("email_domain"));
    }

    #[test]
    fn test_sections_parse_by_field_name() {
        let settings = load_settings_from_str(r#"{"sections": ["users", "pages"]}"#).unwrap();
        assert_eq!(settings.sections, vec![SectionKind::Users, SectionKind::Pages]);
        assert_eq!(Settings::default().sections, SectionKind::ALL.to_vec());

        let err = load_settings_from_str(r#"{"sections": ["widgets"]}"#).unwrap_err();
        assert!(matches!(err, ConfigError::ParseJson(_)));
    }

    #[test]
    fn test_invalid_json() {
        let err = load_settings_from_str("{ nope").unwrap_err();
        assert!(matches!(err, ConfigError::ParseJson(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"default_sources": ["roles"]}}"#).unwrap();
        let settings = load_settings(file.path()).unwrap();
        assert_eq!(settings.default_sources, vec!["roles"]);
    }

    #[test]
    fn test_missing_file() {
        let err = load_settings("/nonexistent/cmsboot.json").unwrap_err();
        assert!(matches!(err, ConfigError::ReadFile { .. }));
    }
}
