use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Locale variables consulted in order, as gettext does.
const LOCALE_VARIABLES: [&str; 3] = ["LC_ALL", "LC_MESSAGES", "LANG"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    #[serde(alias = "zh-cn", alias = "zh_cn", alias = "chinese")]
    Zh,
}

#[derive(Error, Debug)]
#[error("unsupported language: {0}. Available: en, zh")]
pub struct UnsupportedLanguageError(String);

/// Plural form a count takes in a given language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluralCategory {
    One,
    Other,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::En, Language::Zh];

    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Zh => "zh",
        }
    }

    /// Reads a POSIX locale such as `zh_CN.UTF-8` or `en_US`. `C` and
    /// `POSIX` carry no language.
    pub fn from_locale(locale: &str) -> Option<Self> {
        let tag = locale
            .split(['.', '@'])
            .next()
            .unwrap_or_default()
            .to_lowercase();
        let primary = tag.split(['_', '-']).next().unwrap_or_default();

        match primary {
            "en" => Some(Language::En),
            "zh" => Some(Language::Zh),
            _ => None,
        }
    }

    /// Language named by the session's locale variables, English when none
    /// names a supported language.
    pub fn from_environment() -> Self {
        Self::detect(|name| std::env::var(name).ok())
    }

    fn detect(lookup: impl Fn(&str) -> Option<String>) -> Self {
        LOCALE_VARIABLES
            .iter()
            .filter_map(|name| lookup(name))
            .find(|value| !value.is_empty())
            .and_then(|value| Self::from_locale(&value))
            .unwrap_or_default()
    }

    pub fn plural_category(&self, count: u64) -> PluralCategory {
        match self {
            Language::En if count == 1 => PluralCategory::One,
            Language::En => PluralCategory::Other,
            Language::Zh => PluralCategory::Other,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = UnsupportedLanguageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "english" => Ok(Language::En),
            "chinese" | "中文" => Ok(Language::Zh),
            other => Self::from_locale(other).ok_or_else(|| UnsupportedLanguageError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::collections::HashMap;

    fn environment(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let variables: HashMap<String, String> = pairs
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        move |name| variables.get(name).cloned()
    }

    #[test]
    fn locale_tags_name_their_language() {
        assert_eq!(Language::from_locale("zh_CN.UTF-8"), Some(Language::Zh));
        assert_eq!(Language::from_locale("zh-TW"), Some(Language::Zh));
        assert_eq!(Language::from_locale("en_GB@euro"), Some(Language::En));
        assert_eq!(Language::from_locale("C.UTF-8"), None);
        assert_eq!(Language::from_locale("fr_FR.UTF-8"), None);
    }

    #[test]
    fn lc_all_wins_over_lang() {
        let lookup = environment(&[("LC_ALL", "zh_CN.UTF-8"), ("LANG", "en_US.UTF-8")]);
        assert_eq!(Language::detect(lookup), Language::Zh);
    }

    #[test]
    fn empty_variables_are_skipped() {
        let lookup = environment(&[("LC_ALL", ""), ("LANG", "zh_SG")]);
        assert_eq!(Language::detect(lookup), Language::Zh);
    }

    #[test]
    fn unknown_locale_falls_back_to_english() {
        assert_eq!(Language::detect(environment(&[("LANG", "de_DE")])), Language::En);
        assert_eq!(Language::detect(environment(&[])), Language::En);
    }

    #[test]
    fn parses_codes_names_and_locales() {
        assert_eq!("ZH".parse::<Language>().unwrap(), Language::Zh);
        assert_eq!("中文".parse::<Language>().unwrap(), Language::Zh);
        assert_eq!("en_US.UTF-8".parse::<Language>().unwrap(), Language::En);
        assert!("fr".parse::<Language>().is_err());
    }

    #[test]
    fn english_counts_one_apart() {
        assert_eq!(Language::En.plural_category(1), PluralCategory::One);
        assert_eq!(Language::En.plural_category(0), PluralCategory::Other);
        assert_eq!(Language::Zh.plural_category(1), PluralCategory::Other);
    }

    #[test]
    fn config_accepts_region_aliases() {
        #[derive(Deserialize)]
        struct General {
            language: Language,
        }

        let general: General = toml::from_str(r#"language = "zh-cn""#).unwrap();
        assert_eq!(general.language, Language::Zh);
    }
}
