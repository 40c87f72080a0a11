const PLACEHOLDER_ADMIN_PASSWORD: &str = "password";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    /// User created on first start when the store has no users.
    pub admin_user: String,
    pub admin_password: String,
    /// Tag created on first start when the store has no tags.
    pub default_tag: String,
    /// `TODO_ENV` (or `RUST_ENV`) is `production`.
    pub production: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            database_url: "postgres://localhost/todo".into(),
            admin_user: "admin".into(),
            admin_password: PLACEHOLDER_ADMIN_PASSWORD.into(),
            default_tag: "Unsorted".into(),
            production: false,
        }
    }
}

impl Config {
    /// Refuse to seed the placeholder admin password in production.
    /// Only `serve` bootstraps, so only `serve` calls this.
    pub fn check_bootstrap(&self) -> anyhow::Result<()> {
        if self.admin_password != PLACEHOLDER_ADMIN_PASSWORD {
            return Ok(());
        }
        if self.production {
            anyhow::bail!(
                "TODO_ADMIN_PASSWORD is not set. \
                 Set a real bootstrap password before running in production."
            );
        }
        tracing::warn!("TODO_ADMIN_PASSWORD is not set; bootstrap admin uses the insecure placeholder");
        Ok(())
    }
}

pub fn load() -> anyhow::Result<Config> {
    dotenvy::dotenv().ok();
    from_lookup(|key| std::env::var(key).ok())
}

/// Build a config from any key lookup; `load` passes the process environment.
pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> anyhow::Result<Config> {
    let defaults = Config::default();

    let env_mode = get("TODO_ENV")
        .or_else(|| get("RUST_ENV"))
        .unwrap_or_default();

    Ok(Config {
        port: get("TODO_PORT")
            .or_else(|| get("PORT"))
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.port),
        database_url: get("DATABASE_URL").unwrap_or(defaults.database_url),
        admin_user: get("TODO_ADMIN_USER")
            .filter(|u| !u.is_empty())
            .unwrap_or(defaults.admin_user),
        admin_password: get("TODO_ADMIN_PASSWORD")
            .filter(|p| !p.is_empty())
            .unwrap_or(defaults.admin_password),
        default_tag: get("TODO_DEFAULT_TAG")
            .filter(|t| !t.is_empty())
            .unwrap_or(defaults.default_tag),
        production: env_mode == "production",
    })
}
