//! Environment variable sources
//!
//! Resolution reads environment variables through the [`Environment`] trait
//! so the process environment can be swapped for a fixed map.

use std::collections::HashMap;
use std::hash::BuildHasher;

/// A source of environment variables
pub trait Environment {
    /// Value of the variable, or `None` when it is not set
    fn var(&self, name: &str) -> Option<String>;
}

/// The real process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl Environment for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        let value = std::env::var_os(name)?;
        match value.into_string() {
            Ok(s) => Some(s),
            Err(raw) => {
                log::debug!(
                    "Ignoring environment variable {}: not valid UTF-8 ({:?})",
                    name,
                    raw
                );
                None
            }
        }
    }
}

impl<S: BuildHasher> Environment for HashMap<String, String, S> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl<E: Environment + ?Sized> Environment for &E {
    fn var(&self, name: &str) -> Option<String> {
        (**self).var(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_env() {
        let env: HashMap<String, String> =
            [("REDIS_HOST".to_string(), "cache".to_string())].into();

        assert_eq!(env.var("REDIS_HOST"), Some("cache".into()));
        assert_eq!(env.var("REDIS_PORT"), None);
        assert_eq!((&env).var("REDIS_HOST"), Some("cache".into()));
    }

    #[test]
    fn test_process_env() {
        std::env::set_var("CTFD_CONFIG_TEST_PROCESS_ENV", "1");
        assert_eq!(ProcessEnv.var("CTFD_CONFIG_TEST_PROCESS_ENV"), Some("1".into()));
        std::env::remove_var("CTFD_CONFIG_TEST_PROCESS_ENV");
        assert_eq!(ProcessEnv.var("CTFD_CONFIG_TEST_PROCESS_ENV"), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_process_env_non_utf8_is_unset() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let name = "CTFD_CONFIG_TEST_NON_UTF8";
        std::env::set_var(name, OsStr::from_bytes(b"caf\xe9"));
        assert!(std::env::var_os(name).is_some());
        assert_eq!(ProcessEnv.var(name), None);
        std::env::remove_var(name);
    }
}
