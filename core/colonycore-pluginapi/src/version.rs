/// Version of the plugin API the host was compiled with.
pub const API_VERSION: &str = "v1";

pub trait VersionProvider: Send + Sync {
    fn api_version(&self) -> &str;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultVersionProvider;

impl VersionProvider for DefaultVersionProvider {
    fn api_version(&self) -> &str {
        API_VERSION
    }
}

static DEFAULT_PROVIDER: DefaultVersionProvider = DefaultVersionProvider;

/// Process-wide provider.
#[must_use]
pub fn version_provider() -> &'static dyn VersionProvider {
    &DEFAULT_PROVIDER
}
