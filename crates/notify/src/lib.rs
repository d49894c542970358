//! Notification source with per-locale provider caching
//!
//! A [`NotifySource`] hands out action, pattern and action-pattern
//! providers for a locale, building each one once through a
//! [`ProviderFactory`] and keeping it for the life of the process. The
//! recipient, dependency and subscription providers do not depend on the
//! locale and are built once, on first use.

pub mod errors;
pub mod locale;
pub mod provider;
pub mod source;

pub use errors::{NotifyError, Result};
pub use locale::Locale;
pub use provider::{ProviderCategory, ProviderFactory, SharedProviders};
pub use source::NotifySource;
