//! Server configuration lookup and engine startup for CLI commands.

use crate::config::Config;
use crate::error::Result;
use folio_engine::QaEngine;
use folio_server::bootstrap::build_engine;
use folio_server::config::ServerConfig;
use std::path::PathBuf;

/// Work out which server configuration a command runs with
///
/// `--config` wins over the file named in the CLI settings; with neither, the
/// offline defaults are used. `--knowledge` replaces the knowledge path last.
pub fn resolve_server_config(
    config_flag: Option<&str>,
    knowledge_flag: Option<&str>,
    config: &Config,
) -> Result<ServerConfig> {
    let path = config_flag
        .map(PathBuf::from)
        .or_else(|| config.server_config.clone());

    let mut server_config = match path {
        Some(path) => ServerConfig::from_file(path)?,
        None => ServerConfig::default_test_config(),
    };

    if let Some(knowledge) = knowledge_flag {
        server_config.knowledge_path = PathBuf::from(knowledge);
    }

    Ok(server_config)
}

/// Knowledge file a command should read: an explicit path, else the configured one
pub fn knowledge_path(explicit: Option<&str>, server_config: &ServerConfig) -> PathBuf {
    explicit
        .map(PathBuf::from)
        .unwrap_or_else(|| server_config.knowledge_path.clone())
}

/// Load the knowledge file and build the engine
pub async fn load_engine(server_config: &ServerConfig) -> Result<QaEngine> {
    Ok(build_engine(server_config).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_without_config() {
        let server_config = resolve_server_config(None, None, &Config::default()).unwrap();
        assert_eq!(server_config.knowledge_path, PathBuf::from("data/portfolio.toml"));
    }

    #[test]
    fn test_knowledge_flag_overrides() {
        let server_config =
            resolve_server_config(None, Some("other.json"), &Config::default()).unwrap();
        assert_eq!(server_config.knowledge_path, PathBuf::from("other.json"));
    }

    #[test]
    fn test_config_file_from_settings() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "bind_address = \"0.0.0.0\"\nbind_port = 9000\nknowledge_path = \"/srv/portfolio.toml\""
        )
        .unwrap();

        let config = Config {
            server_config: Some(file.path().to_path_buf()),
            ..Config::default()
        };
        let server_config = resolve_server_config(None, None, &config).unwrap();
        assert_eq!(server_config.bind_port, 9000);
        assert_eq!(server_config.knowledge_path, PathBuf::from("/srv/portfolio.toml"));
    }

    #[test]
    fn test_missing_config_file_is_error() {
        let result = resolve_server_config(Some("/nonexistent/folio.toml"), None, &Config::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_explicit_knowledge_path() {
        let server_config = ServerConfig::default_test_config();
        assert_eq!(knowledge_path(Some("a.json"), &server_config), PathBuf::from("a.json"));
        assert_eq!(knowledge_path(None, &server_config), server_config.knowledge_path);
    }
}
