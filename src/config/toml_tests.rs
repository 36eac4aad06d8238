//! Tests for TOML configuration parsing.

use super::ConfigError;
use super::toml::{TomlConfig, default_config_template};

mod parsing {
    use super::*;

    #[test]
    fn parse_empty_config() {
        let config = TomlConfig::parse("").unwrap();

        assert!(config.server.listen.is_none());
        assert!(config.webhook.api_key.is_none());
        assert!(config.lastfm.api_key.is_none());
        assert!(config.retry.max_attempts.is_none());
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
            [server]
            listen = "127.0.0.1:8080"
            path = "/hooks/plex"

            [webhook]
            api_key = "hook"

            [lastfm]
            api_url = "http://localhost:9000/2.0/"
            api_key = "key"
            shared_secret = "secret"
            session_key = "session"

            [retry]
            max_attempts = 3
            delay_ms = 500
        "#;

        let config = TomlConfig::parse(toml).unwrap();

        assert_eq!(config.server.listen.as_deref(), Some("127.0.0.1:8080"));
        assert_eq!(config.server.path.as_deref(), Some("/hooks/plex"));
        assert_eq!(config.webhook.api_key.as_deref(), Some("hook"));
        assert_eq!(
            config.lastfm.api_url.as_deref(),
            Some("http://localhost:9000/2.0/")
        );
        assert_eq!(config.lastfm.api_key.as_deref(), Some("key"));
        assert_eq!(config.lastfm.shared_secret.as_deref(), Some("secret"));
        assert_eq!(config.lastfm.session_key.as_deref(), Some("session"));
        assert_eq!(config.retry.max_attempts, Some(3));
        assert_eq!(config.retry.delay_ms, Some(500));
    }

    #[test]
    fn partial_sections_leave_other_fields_unset() {
        let toml = r#"
            [lastfm]
            session_key = "session"
        "#;

        let config = TomlConfig::parse(toml).unwrap();

        assert_eq!(config.lastfm.session_key.as_deref(), Some("session"));
        assert!(config.lastfm.api_key.is_none());
        assert!(config.server.path.is_none());
    }
}

mod errors {
    use super::*;

    #[test]
    fn unknown_section_is_rejected() {
        let result = TomlConfig::parse("[monitor]\npoll_interval = 60\n");

        assert!(matches!(result, Err(ConfigError::TomlParse(_))));
    }

    #[test]
    fn unknown_key_is_rejected() {
        let result = TomlConfig::parse("[lastfm]\nusername = \"me\"\n");

        assert!(matches!(result, Err(ConfigError::TomlParse(_))));
    }

    #[test]
    fn wrong_type_is_rejected() {
        let result = TomlConfig::parse("[retry]\nmax_attempts = \"five\"\n");

        assert!(matches!(result, Err(ConfigError::TomlParse(_))));
    }

    #[test]
    fn missing_file_is_read_error() {
        let result = TomlConfig::load(std::path::Path::new("/nonexistent/relay.toml"));

        assert!(matches!(result, Err(ConfigError::FileRead { .. })));
    }
}

mod template {
    use super::*;

    #[test]
    fn template_parses_as_valid_config() {
        let config = TomlConfig::parse(&default_config_template()).unwrap();

        assert!(config.webhook.api_key.is_none());
    }

    #[test]
    fn template_mentions_environment_variables() {
        let template = default_config_template();

        for var in [
            "WEBHOOK_API_KEY",
            "LAST_FM_API_KEY",
            "LAST_FM_SHARED_SECRET",
            "LAST_FM_SESSION_KEY",
        ] {
            assert!(template.contains(var), "template should mention {var}");
        }
    }
}
