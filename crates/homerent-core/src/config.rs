/// Loads a service configuration struct from process environment variables.
///
/// Field `database_url` is read from `DATABASE_URL`, `auth_port` from `AUTH_PORT`, and so
/// on. Optional settings should be `Option<T>` or carry a `#[serde(default = ...)]`.
pub trait Config: Sized + serde::de::DeserializeOwned {
    fn from_env() -> Result<Self, envy::Error> {
        envy::from_env()
    }

    /// Same as [`Config::from_env`] but reads from an explicit key/value list. Used by tests
    /// so they do not race on the real process environment.
    fn from_iter<I>(vars: I) -> Result<Self, envy::Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter(vars)
    }
}
