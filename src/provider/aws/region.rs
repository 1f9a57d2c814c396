//! Region resolution from configuration and the process environment.

/// Environment variables checked in fallback order after configuration.
const FALLBACK_ENV_VARS: &[&str] = &["AWS_REGION", "AWS_DEFAULT_REGION"];

/// Resolves the provider region when configuration does not name one.
///
/// # Type Parameters
///
/// * `E` - An environment provider implementing the `mockable::Env` trait,
///   allowing for testable environment variable access.
///
/// # Example
///
/// ```ignore
/// use mockable::DefaultEnv;
/// use cfstack::provider::RegionResolver;
///
/// let env = DefaultEnv::new();
/// let resolver = RegionResolver::new(&env);
/// let region = resolver.resolve(None);
/// ```
pub struct RegionResolver<'a, E: mockable::Env> {
    env: &'a E,
}

impl<'a, E: mockable::Env> RegionResolver<'a, E> {
    /// Creates a new region resolver with the given environment provider.
    #[must_use]
    pub const fn new(env: &'a E) -> Self {
        Self { env }
    }

    /// Resolves the region from fallback environment variables.
    ///
    /// Checks `AWS_REGION`, then `AWS_DEFAULT_REGION`, skipping empty values.
    #[must_use]
    pub fn resolve_from_env(&self) -> Option<String> {
        FALLBACK_ENV_VARS
            .iter()
            .filter_map(|var_name| self.env.string(var_name))
            .find(|value| !value.trim().is_empty())
    }

    /// Resolves the region to connect to.
    ///
    /// Resolution order:
    /// 1. `config_region` (from CLI, config file, or `CFSTACK_REGION`)
    /// 2. `AWS_REGION`, `AWS_DEFAULT_REGION`
    ///
    /// `None` leaves the choice to the SDK's own provider chain (profile
    /// files, instance metadata).
    #[must_use]
    pub fn resolve(&self, config_region: Option<&str>) -> Option<String> {
        config_region
            .filter(|region| !region.trim().is_empty())
            .map(String::from)
            .or_else(|| self.resolve_from_env())
    }
}
