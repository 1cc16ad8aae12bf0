// Credential lookup: environment first, then the per-user config file,
// then `.env` in the working directory. Each source must provide both
// values on its own; fields are never mixed across sources.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

pub const USERNAME_KEY: &str = "FRAENK_USERNAME";
pub const PASSWORD_KEY: &str = "FRAENK_PASSWORD";

/// Username and password for the carrier account.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    fn from_pair(username: Option<String>, password: Option<String>) -> Option<Self> {
        match (username, password) {
            (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
                Some(Credentials { username, password })
            }
            _ => None,
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Environment lookup used by the resolver; swapped out in tests.
pub type EnvLookup = fn(&str) -> Option<String>;

fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Resolves credentials from the three supported sources.
pub struct CredentialResolver {
    env: EnvLookup,
    user_config: Option<PathBuf>,
    local_file: PathBuf,
}

impl CredentialResolver {
    /// Resolver over the real process environment,
    /// `~/.config/fraenk/credentials` and `./.env`.
    pub fn new() -> Self {
        let local_file = std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(".env");
        CredentialResolver {
            env: process_env,
            user_config: default_user_config_path(),
            local_file,
        }
    }

    /// Resolver with explicit sources.
    pub fn with_sources(env: EnvLookup, user_config: Option<PathBuf>, local_file: PathBuf) -> Self {
        CredentialResolver {
            env,
            user_config,
            local_file,
        }
    }

    /// Return the first complete credential pair.
    pub fn resolve(&self) -> Result<Credentials> {
        let mut checked = vec![format!("environment ({USERNAME_KEY}/{PASSWORD_KEY})")];

        if let Some(creds) =
            Credentials::from_pair((self.env)(USERNAME_KEY), (self.env)(PASSWORD_KEY))
        {
            tracing::debug!("using credentials from environment");
            return Ok(creds);
        }

        let files = self.user_config.iter().chain(std::iter::once(&self.local_file));
        for path in files {
            checked.push(path.display().to_string());
            if let Some(creds) = load_file(path) {
                tracing::debug!(path = %path.display(), "using credentials from file");
                return Ok(creds);
            }
        }

        Err(Error::MissingCredentials { checked })
    }
}

impl Default for CredentialResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve credentials from the default sources.
pub fn resolve() -> Result<Credentials> {
    CredentialResolver::new().resolve()
}

/// `~/.config/fraenk/credentials`, if a home directory is known.
pub fn default_user_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config").join("fraenk").join("credentials"))
}

fn load_file(path: &Path) -> Option<Credentials> {
    if !path.exists() {
        return None;
    }
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "skipping unreadable credentials file");
            return None;
        }
    };
    match parse_key_values(&text) {
        Ok(mut values) => {
            Credentials::from_pair(values.remove(USERNAME_KEY), values.remove(PASSWORD_KEY))
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "skipping malformed credentials file");
            None
        }
    }
}

/// Parse `KEY=VALUE` lines. Blank lines and `#` comments are skipped and a
/// value wrapped in matching single or double quotes is unwrapped.
///
/// Returns the offending line number on a line without `=`.
pub fn parse_key_values(text: &str) -> std::result::Result<HashMap<String, String>, String> {
    let mut values = HashMap::new();
    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (key, value) = line
            .split_once('=')
            .ok_or_else(|| format!("line {} is not KEY=VALUE", idx + 1))?;
        values.insert(key.trim().to_string(), unquote(value.trim()).to_string());
    }
    Ok(values)
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn env_with_creds(key: &str) -> Option<String> {
        match key {
            USERNAME_KEY => Some("env_user".into()),
            PASSWORD_KEY => Some("env_pass".into()),
            _ => None,
        }
    }

    fn env_username_only(key: &str) -> Option<String> {
        (key == USERNAME_KEY).then(|| "env_user".to_string())
    }

    fn write(dir: &TempDir, name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut f = fs::File::create(&path).unwrap();
        f.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn environment_wins_over_both_files() {
        let dir = TempDir::new().unwrap();
        let config = write(&dir, "credentials", "FRAENK_USERNAME=cfg\nFRAENK_PASSWORD=cfgpw\n");
        let local = write(&dir, ".env", "FRAENK_USERNAME=local\nFRAENK_PASSWORD=localpw\n");

        let creds = CredentialResolver::with_sources(env_with_creds, Some(config), local)
            .resolve()
            .unwrap();
        assert_eq!(creds.username, "env_user");
        assert_eq!(creds.password, "env_pass");
    }

    #[test]
    fn user_config_wins_over_local_file() {
        let dir = TempDir::new().unwrap();
        let config = write(
            &dir,
            "credentials",
            "FRAENK_USERNAME=0151987654321\nFRAENK_PASSWORD=config_password456\n",
        );
        let local = write(&dir, ".env", "FRAENK_USERNAME=local\nFRAENK_PASSWORD=localpw\n");

        let creds = CredentialResolver::with_sources(no_env, Some(config), local)
            .resolve()
            .unwrap();
        assert_eq!(creds.username, "0151987654321");
        assert_eq!(creds.password, "config_password456");
    }

    #[test]
    fn partial_environment_is_not_mixed_with_files() {
        let dir = TempDir::new().unwrap();
        let local = write(&dir, ".env", "FRAENK_USERNAME=local\nFRAENK_PASSWORD=localpw\n");

        let creds = CredentialResolver::with_sources(env_username_only, None, local)
            .resolve()
            .unwrap();
        assert_eq!(creds.username, "local");
        assert_eq!(creds.password, "localpw");
    }

    #[test]
    fn incomplete_user_config_falls_through_to_local_file() {
        let dir = TempDir::new().unwrap();
        let config = write(&dir, "credentials", "FRAENK_USERNAME=cfg\n");
        let local = write(&dir, ".env", "FRAENK_USERNAME=local\nFRAENK_PASSWORD=localpw\n");

        let creds = CredentialResolver::with_sources(no_env, Some(config), local)
            .resolve()
            .unwrap();
        assert_eq!(creds.username, "local");
    }

    #[test]
    fn malformed_user_config_is_treated_as_absent() {
        let dir = TempDir::new().unwrap();
        let config = write(&dir, "credentials", "FRAENK_USERNAME=cfg\nthis line is broken\n");
        let local = write(&dir, ".env", "FRAENK_USERNAME=local\nFRAENK_PASSWORD=localpw\n");

        let creds = CredentialResolver::with_sources(no_env, Some(config), local)
            .resolve()
            .unwrap();
        assert_eq!(creds.username, "local");
    }

    #[test]
    fn missing_everywhere_names_all_locations() {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("nope").join("credentials");
        let local = dir.path().join(".env");

        let err = CredentialResolver::with_sources(no_env, Some(config.clone()), local.clone())
            .resolve()
            .unwrap_err();
        match &err {
            Error::MissingCredentials { checked } => {
                assert_eq!(checked.len(), 3);
                assert!(checked[0].contains(USERNAME_KEY));
                assert_eq!(checked[1], config.display().to_string());
                assert_eq!(checked[2], local.display().to_string());
            }
            other => panic!("unexpected error: {other:?}"),
        }
        let message = err.to_string();
        assert!(message.contains(".env"));
        assert!(message.contains("credentials"));
    }

    #[test]
    fn empty_values_do_not_count() {
        let dir = TempDir::new().unwrap();
        let local = write(&dir, ".env", "FRAENK_USERNAME=\nFRAENK_PASSWORD=pw\n");

        let err = CredentialResolver::with_sources(no_env, None, local)
            .resolve()
            .unwrap_err();
        assert!(matches!(err, Error::MissingCredentials { .. }));
    }

    #[test]
    fn parser_handles_comments_blanks_and_quotes() {
        let text = "# account\n\n  FRAENK_USERNAME = \"0151 123\"  \nFRAENK_PASSWORD='p=ss#word'\nOTHER=1\n";
        let values = parse_key_values(text).unwrap();
        assert_eq!(values[USERNAME_KEY], "0151 123");
        assert_eq!(values[PASSWORD_KEY], "p=ss#word");
        assert_eq!(values["OTHER"], "1");
    }

    #[test]
    fn parser_leaves_mismatched_quotes_alone() {
        let values = parse_key_values("A=\"open\nB='\n").unwrap();
        assert_eq!(values["A"], "\"open");
        assert_eq!(values["B"], "'");
    }

    #[test]
    fn parser_reports_line_without_equals() {
        let err = parse_key_values("A=1\n\nbroken\n").unwrap_err();
        assert!(err.contains("line 3"));
    }

    #[test]
    fn debug_output_redacts_password() {
        let creds = Credentials {
            username: "user".into(),
            password: "hunter2".into(),
        };
        let shown = format!("{creds:?}");
        assert!(shown.contains("user"));
        assert!(!shown.contains("hunter2"));
    }
}
