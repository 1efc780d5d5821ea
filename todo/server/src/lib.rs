pub mod config {
    use serde::Deserialize;
    use std::collections::HashMap;

    #[derive(Deserialize, Debug, Clone)]
    pub struct Config {
        #[serde(default = "default_db_url")]
        pub db_url: String,
        #[serde(default = "default_port")]
        pub port: u16,
        pub jwt_secret: String,
        /// Login credentials, keyed by username.
        #[serde(default)]
        pub users: HashMap<String, String>,
    }

    impl Config {
        /// Loads configuration from an optional `todo.toml` file, overridden by environment variables.
        ///
        /// Nested keys use `__` as separator, e.g. `USERS__ALICE=secret`.
        pub fn from_env() -> anyhow::Result<Self> {
            let builder = config::Config::builder()
                .add_source(config::File::with_name("todo").required(false))
                .add_source(config::Environment::default().separator("__"));
            Self::from_builder(builder)
        }

        fn from_builder(
            builder: config::ConfigBuilder<config::builder::DefaultState>,
        ) -> anyhow::Result<Self> {
            let settings = builder.build()?;
            let config: Config = settings.try_deserialize()?;
            Ok(config)
        }
    }

    fn default_port() -> u16 {
        8080
    }

    fn default_db_url() -> String {
        "sqlite://todo.db?mode=rwc".to_string()
    }

}
pub mod auth;
pub mod entities;
pub mod task;
pub mod web;
