use fluent_bundle::concurrent::FluentBundle;
use fluent_bundle::{FluentArgs, FluentResource, FluentValue};
use unic_langid::LanguageIdentifier;
use std::sync::Arc;
use std::collections::HashMap;
use std::fs;
use anyhow::Result;
use lazy_static::lazy_static;

/// Languages the calculator ships labels for; Spanish is the default.
const SUPPORTED_LANGUAGES: [&str; 2] = ["es", "en"];
const DEFAULT_LANGUAGE: &str = "es";

/// Localization manager for the calculator UI labels
pub struct LocalizationManager {
    bundles: HashMap<String, Arc<FluentBundle<FluentResource>>>,
}

impl LocalizationManager {
    /// Create a new localization manager with all supported languages loaded
    pub fn new() -> Result<Self> {
        let mut bundles = HashMap::new();

        for lang in SUPPORTED_LANGUAGES {
            let locale: LanguageIdentifier = lang.parse()?;
            let bundle = Self::create_bundle(&locale)?;
            bundles.insert(lang.to_string(), Arc::new(bundle));
        }

        Ok(Self { bundles })
    }

    /// Create a fluent bundle for a specific locale
    fn create_bundle(locale: &LanguageIdentifier) -> Result<FluentBundle<FluentResource>> {
        let mut bundle = FluentBundle::new_concurrent(vec![locale.clone()]);

        // Load the main resource file
        let resource_path = format!("./locales/{}/main.ftl", locale);
        if let Ok(content) = fs::read_to_string(&resource_path) {
            if let Ok(resource) = FluentResource::try_new(content) {
                let _ = bundle.add_resource(resource);
            }
        }

        Ok(bundle)
    }

    /// Get a localized message in the default language
    pub fn get_message(&self, key: &str, args: Option<&HashMap<&str, &str>>) -> String {
        self.get_message_in_language(key, DEFAULT_LANGUAGE, args)
    }

    /// Get a localized message in a specific language, falling back to the
    /// default language when the requested one is not supported
    pub fn get_message_in_language(
        &self,
        key: &str,
        language: &str,
        args: Option<&HashMap<&str, &str>>,
    ) -> String {
        let bundle = self
            .bundles
            .get(language)
            .or_else(|| self.bundles.get(DEFAULT_LANGUAGE))
            .expect("default language bundle is always loaded");

        let msg = match bundle.get_message(key) {
            Some(msg) => msg,
            None => return format!("Missing translation: {}", key),
        };

        let pattern = match msg.value() {
            Some(pattern) => pattern,
            None => return format!("Missing value for key: {}", key),
        };

        let mut errors = vec![];

        if let Some(args) = args {
            let fluent_args = FluentArgs::from_iter(
                args.iter().map(|(k, v)| (*k, FluentValue::from(*v)))
            );

            bundle
                .format_pattern(pattern, Some(&fluent_args), &mut errors)
                .into_owned()
        } else {
            bundle.format_pattern(pattern, None, &mut errors).into_owned()
        }
    }

    /// Get a localized message with simple string arguments
    pub fn get_message_with_args(&self, key: &str, language: &str, args: &[(&str, &str)]) -> String {
        let args_map: HashMap<&str, &str> = args.iter().cloned().collect();
        self.get_message_in_language(key, language, Some(&args_map))
    }
}

lazy_static! {
    /// Global localization instance, loaded on first use
    static ref LOCALIZATION_MANAGER: LocalizationManager =
        LocalizationManager::new().expect("failed to load localization resources");
}

/// Normalize a language code to one of the supported languages.
///
/// Region subtags are stripped (`es-MX` → `es`); unsupported or missing
/// codes fall back to the default language.
pub fn detect_language(code: Option<&str>) -> &'static str {
    let primary = code
        .and_then(|c| c.split(['-', '_']).next())
        .unwrap_or(DEFAULT_LANGUAGE)
        .to_lowercase();
    SUPPORTED_LANGUAGES
        .iter()
        .find(|lang| **lang == primary)
        .copied()
        .unwrap_or(DEFAULT_LANGUAGE)
}

/// Convenience function to get a localized message in the default language
pub fn t(key: &str) -> String {
    LOCALIZATION_MANAGER.get_message(key, None)
}

/// Convenience function to get a localized message in a specific language
pub fn t_lang(key: &str, language: Option<&str>) -> String {
    LOCALIZATION_MANAGER.get_message_in_language(key, detect_language(language), None)
}

/// Convenience function to get a localized message with arguments
pub fn t_args_lang(key: &str, args: &[(&str, &str)], language: Option<&str>) -> String {
    LOCALIZATION_MANAGER.get_message_with_args(key, detect_language(language), args)
}
