//! Environment variable helpers

use std::env;

/// Environment variable utilities
#[derive(Debug)]
pub struct EnvUtils;

impl EnvUtils {
    /// Get an environment variable if it is set to valid unicode
    pub fn get_var(key: &str) -> Option<String> {
        env::var(key).ok()
    }

    /// Check whether an environment variable is present, whatever its value
    pub fn is_set(key: &str) -> bool {
        env::var_os(key).is_some()
    }

    /// Set environment variable (mainly for testing)
    pub fn set_var<K, V>(key: K, value: V)
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        unsafe { env::set_var(key.as_ref(), value.as_ref()) }
    }

    /// Remove environment variable (mainly for testing)
    pub fn remove_var<K: AsRef<str>>(key: K) {
        unsafe { env::remove_var(key.as_ref()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presence_ignores_value() {
        assert!(!EnvUtils::is_set("FIR_TEST_PRESENCE_12345"));

        EnvUtils::set_var("FIR_TEST_PRESENCE_12345", "");
        assert!(EnvUtils::is_set("FIR_TEST_PRESENCE_12345"));
        assert_eq!(EnvUtils::get_var("FIR_TEST_PRESENCE_12345").as_deref(), Some(""));

        EnvUtils::remove_var("FIR_TEST_PRESENCE_12345");
        assert!(!EnvUtils::is_set("FIR_TEST_PRESENCE_12345"));
        assert_eq!(EnvUtils::get_var("FIR_TEST_PRESENCE_12345"), None);
    }
}
