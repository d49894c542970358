//! Provider caching under concurrent access

use cachet_notify::{Locale, NotifySource, ProviderCategory, ProviderFactory};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

/// Template provider for one locale
#[derive(Debug)]
struct Templates {
    locale: Locale,
    category: ProviderCategory,
}

#[derive(Default)]
struct SlowFactory {
    builds: Mutex<HashMap<(String, ProviderCategory), usize>>,
}

impl ProviderFactory for SlowFactory {
    type Provider = Arc<Templates>;
    type Recipients = Vec<&'static str>;
    type Dependency = ();
    type Subscription = ();

    fn create(&self, locale: &Locale, category: ProviderCategory) -> Self::Provider {
        thread::sleep(Duration::from_millis(30));
        *self
            .builds
            .lock()
            .entry((locale.to_string(), category))
            .or_default() += 1;
        Arc::new(Templates {
            locale: locale.clone(),
            category,
        })
    }

    fn create_recipients(&self) -> Option<Self::Recipients> {
        thread::sleep(Duration::from_millis(30));
        Some(vec!["ops"])
    }

    fn create_dependency(&self) -> Option<Self::Dependency> {
        Some(())
    }

    fn create_subscription(&self, _recipients: &Self::Recipients) -> Option<Self::Subscription> {
        Some(())
    }
}

#[test]
fn test_concurrent_requests_build_each_provider_once() {
    const THREADS: usize = 8;
    let source = NotifySource::new("alerts", SlowFactory::default()).unwrap();
    let barrier = Barrier::new(THREADS);
    let locales = [Locale::new("en-GB"), Locale::new("fr-FR")];

    thread::scope(|scope| {
        for t in 0..THREADS {
            let source = &source;
            let barrier = &barrier;
            let locale = &locales[t % locales.len()];
            scope.spawn(move || {
                barrier.wait();
                for category in ProviderCategory::ALL {
                    let provider = source.provider(locale, category).unwrap();
                    assert_eq!(&provider.locale, locale);
                    assert_eq!(provider.category, category);
                }
                assert_eq!(source.recipients().unwrap(), &vec!["ops"]);
            });
        }
    });

    let builds = source.factory().builds.lock();
    assert_eq!(builds.len(), locales.len() * ProviderCategory::ALL.len());
    assert!(builds.values().all(|&count| count == 1));
    assert_eq!(source.cached_providers(), 6);
}
