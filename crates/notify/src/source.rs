//! The notification source

use crate::errors::{NotifyError, Result};
use crate::locale::Locale;
use crate::provider::{ProviderCategory, ProviderFactory, SharedProviders};
use cachet_cache::Cache;
use once_cell::sync::OnceCell;
use std::fmt;

type Shared<F> = SharedProviders<
    <F as ProviderFactory>::Recipients,
    <F as ProviderFactory>::Dependency,
    <F as ProviderFactory>::Subscription,
>;

/// A named source of notifications and the providers it needs
///
/// Per-locale providers are kept in a cache with no addins, so each one is
/// built once and retained for the life of the source.
pub struct NotifySource<F: ProviderFactory> {
    id: String,
    name: Option<String>,
    factory: F,
    providers: Cache<(Locale, ProviderCategory), F::Provider>,
    shared: OnceCell<Shared<F>>,
}

impl<F: ProviderFactory> NotifySource<F> {
    pub fn new(id: impl Into<String>, factory: F) -> Result<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(NotifyError::EmptyId);
        }
        Ok(Self {
            id,
            name: None,
            factory,
            providers: Cache::new(),
            shared: OnceCell::new(),
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display name, falling back to the id
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// The provider of `category` for `locale`, built on first request
    pub fn provider(&self, locale: &Locale, category: ProviderCategory) -> Result<F::Provider> {
        let provider = self
            .providers
            .get_or_add((locale.clone(), category), || {
                tracing::debug!(source = %self.id, %locale, %category, "creating notify provider");
                self.factory.create(locale, category)
            })?;
        Ok(provider)
    }

    pub fn action_provider(&self, locale: &Locale) -> Result<F::Provider> {
        self.provider(locale, ProviderCategory::Action)
    }

    pub fn pattern_provider(&self, locale: &Locale) -> Result<F::Provider> {
        self.provider(locale, ProviderCategory::Pattern)
    }

    pub fn action_pattern_provider(&self, locale: &Locale) -> Result<F::Provider> {
        self.provider(locale, ProviderCategory::ActionPattern)
    }

    /// Number of per-locale providers built so far
    pub fn cached_providers(&self) -> usize {
        self.providers.len()
    }

    /// The locale-independent providers, built once on first call
    ///
    /// A failed build is returned to the caller and attempted again on the
    /// next call.
    pub fn shared(&self) -> Result<&Shared<F>> {
        self.shared.get_or_try_init(|| {
            tracing::debug!(source = %self.id, "initializing shared notify providers");
            self.factory.create_shared().map_err(|e| {
                tracing::warn!(source = %self.id, error = %e, "shared notify providers unavailable");
                e
            })
        })
    }

    pub fn recipients(&self) -> Result<&F::Recipients> {
        Ok(&self.shared()?.recipients)
    }

    pub fn dependency(&self) -> Result<&F::Dependency> {
        Ok(&self.shared()?.dependency)
    }

    pub fn subscription(&self) -> Result<&F::Subscription> {
        Ok(&self.shared()?.subscription)
    }
}

impl<F: ProviderFactory> fmt::Debug for NotifySource<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotifySource")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("cached_providers", &self.providers.len())
            .field("shared_ready", &self.shared.get().is_some())
            .finish()
    }
}
