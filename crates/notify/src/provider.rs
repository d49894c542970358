//! Provider categories and the factory a source builds them with

use crate::errors::{NotifyError, Result};
use crate::locale::Locale;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The locale-dependent provider kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderCategory {
    /// Which notification actions exist
    Action,
    /// Message templates
    Pattern,
    /// Which template each action uses
    ActionPattern,
}

impl ProviderCategory {
    pub const ALL: [ProviderCategory; 3] = [
        ProviderCategory::Action,
        ProviderCategory::Pattern,
        ProviderCategory::ActionPattern,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Action => "action",
            Self::Pattern => "pattern",
            Self::ActionPattern => "action_pattern",
        }
    }
}

impl fmt::Display for ProviderCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The locale-independent providers, built together once
#[derive(Debug)]
pub struct SharedProviders<R, D, S> {
    pub recipients: R,
    pub dependency: D,
    pub subscription: S,
}

/// Builds the providers a [`NotifySource`](crate::NotifySource) hands out
pub trait ProviderFactory: Send + Sync + 'static {
    /// A per-locale provider; usually an `Arc` so copies are cheap
    type Provider: Clone + Send + Sync + 'static;
    type Recipients: Send + Sync + 'static;
    type Dependency: Send + Sync + 'static;
    type Subscription: Send + Sync + 'static;

    /// Build the provider of `category` for `locale`
    fn create(&self, locale: &Locale, category: ProviderCategory) -> Self::Provider;

    fn create_recipients(&self) -> Option<Self::Recipients>;

    fn create_dependency(&self) -> Option<Self::Dependency>;

    /// Built after the recipients, which it may consult
    fn create_subscription(&self, recipients: &Self::Recipients) -> Option<Self::Subscription>;

    /// Build every shared provider, failing on the first one missing
    fn create_shared(
        &self,
    ) -> Result<SharedProviders<Self::Recipients, Self::Dependency, Self::Subscription>> {
        let recipients = self
            .create_recipients()
            .ok_or(NotifyError::ProviderNotInstanced { name: "recipients" })?;
        let dependency = self
            .create_dependency()
            .ok_or(NotifyError::ProviderNotInstanced { name: "dependency" })?;
        let subscription = self
            .create_subscription(&recipients)
            .ok_or(NotifyError::ProviderNotInstanced {
                name: "subscription",
            })?;
        Ok(SharedProviders {
            recipients,
            dependency,
            subscription,
        })
    }
}
