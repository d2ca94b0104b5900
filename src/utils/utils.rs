use std::env;

use rand::SeedableRng;
use rand::rngs::StdRng;

/// Returns the value of the environment variable `key`.
/// If the variable is not set, returns the provided fallback value or an
/// empty string if no fallback is provided.
pub fn get_env(key: &str, fallback: Option<&str>) -> String {
    env::var(key).unwrap_or_else(|_| fallback.unwrap_or("").to_string())
}

/// Seeded generator when `seed` is given, otherwise one seeded from the
/// thread-local generator.
pub fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_get_env_fallback() {
        assert_eq!(get_env("FILTER_SIM_SURELY_UNSET_VAR", Some("x")), "x");
        assert_eq!(get_env("FILTER_SIM_SURELY_UNSET_VAR", None), "");
    }

    #[test]
    fn test_seeded_rng_repeats() {
        let a: u64 = make_rng(Some(4)).random();
        let b: u64 = make_rng(Some(4)).random();
        assert_eq!(a, b);
    }
}
