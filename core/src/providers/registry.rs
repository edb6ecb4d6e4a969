//! Provider registry built once at process start.
//!
//! Channel resolution is an explicit name-to-implementation map
//! constructed from configuration, so the set of available channels is
//! fixed and inspectable at startup. An unknown name at request time is
//! a caller error; an empty registry at construction time is fatal,
//! since the service is useless without a delivery channel.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::providers::template::{ProviderTemplates, TemplateError};
use crate::providers::ChannelProvider;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("no providers enabled")]
    NoProviders,

    #[error("duplicate provider `{0}`")]
    DuplicateProvider(String),

    #[error(transparent)]
    Template(#[from] TemplateError),
}

/// A provider together with its parsed message templates.
#[derive(Clone)]
pub struct RegisteredProvider {
    pub provider: Arc<dyn ChannelProvider>,
    pub templates: ProviderTemplates,
}

/// Name-keyed set of delivery channels available to the engine.
pub struct ProviderRegistry {
    providers: HashMap<String, RegisteredProvider>,
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.providers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ProviderRegistry {
    /// Build the registry from configured providers. Fails when no
    /// provider is enabled or a name is registered twice.
    pub fn new(
        entries: Vec<(Arc<dyn ChannelProvider>, ProviderTemplates)>,
    ) -> Result<Self, RegistryError> {
        let mut providers = HashMap::new();
        for (provider, templates) in entries {
            let name = provider.id().to_string();
            if providers
                .insert(name.clone(), RegisteredProvider { provider, templates })
                .is_some()
            {
                return Err(RegistryError::DuplicateProvider(name));
            }
        }

        if providers.is_empty() {
            return Err(RegistryError::NoProviders);
        }

        info!(
            providers = %providers.keys().cloned().collect::<Vec<_>>().join(", "),
            "enabled providers"
        );

        Ok(Self { providers })
    }

    /// Resolve a provider by exact name.
    pub fn get(&self, name: &str) -> Option<&RegisteredProvider> {
        self.providers.get(name)
    }

    /// Names of all enabled providers.
    pub fn names(&self) -> Vec<&str> {
        self.providers.keys().map(String::as_str).collect()
    }
}
