use ezo_config::EzoConfig;
use figment::Jail;
use pretty_assertions::assert_eq;

#[test]
fn legacy_env_names_map_to_fields() {
    Jail::expect_with(|jail| {
        jail.set_env("EZO_BASE_URL", "https://env.ezofficeinventory.com/");
        jail.set_env("EZO_TOKEN", "env-token");
        jail.set_env("EZO_TIMEOUT_SECS", "25");

        let config = EzoConfig::load().expect("config loads");
        assert_eq!(config.base_url, "https://env.ezofficeinventory.com/");
        assert_eq!(config.token, "env-token");
        assert_eq!(config.timeout_secs, 25);
        assert!(config.validate().is_ok());
        Ok(())
    });
}

#[test]
fn missing_token_fails_validation() {
    Jail::expect_with(|jail| {
        jail.set_env("EZO_BASE_URL", "https://env.ezofficeinventory.com/");

        let config = EzoConfig::load().expect("config loads");
        assert!(!config.is_configured());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("EZO_TOKEN"));
        Ok(())
    });
}

#[test]
fn numeric_looking_token_is_kept_verbatim() {
    Jail::expect_with(|jail| {
        jail.set_env("EZO_BASE_URL", "https://env.ezofficeinventory.com/");
        jail.set_env("EZO_TOKEN", "0123456789");

        let config = EzoConfig::load().expect("config loads");
        assert_eq!(config.token, "0123456789");
        Ok(())
    });
}

#[test]
fn boolean_looking_token_is_kept_verbatim() {
    Jail::expect_with(|jail| {
        jail.set_env("EZO_TOKEN", "true");

        let config = EzoConfig::load().expect("config loads");
        assert_eq!(config.token, "true");
        Ok(())
    });
}

#[test]
fn env_token_overrides_toml_token() {
    Jail::expect_with(|jail| {
        std::fs::create_dir(jail.directory().join(".ezo")).map_err(|e| e.to_string())?;
        jail.create_file(
            ".ezo/config.toml",
            r#"
            base_url = "https://toml.ezofficeinventory.com/"
            token = "toml-token"
            "#,
        )?;
        jail.set_env("EZO_TOKEN", "42");

        let config = EzoConfig::load().expect("config loads");
        assert_eq!(config.base_url, "https://toml.ezofficeinventory.com/");
        assert_eq!(config.token, "42");
        Ok(())
    });
}
