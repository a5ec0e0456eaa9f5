use std::collections::HashMap;
use std::sync::OnceLock;

use super::language::{Language, PluralCategory};
use crate::domain::{Period, Phase};
use crate::ports::PopupKind;

const EN_SOURCE: &str = include_str!("locales/en.toml");
const ZH_SOURCE: &str = include_str!("locales/zh.toml");

/// Messages of one language keyed `section.name`. Parsed once per process.
#[derive(Debug, Default)]
struct Catalog {
    messages: HashMap<String, String>,
}

impl Catalog {
    fn of(language: Language) -> &'static Catalog {
        static EN: OnceLock<Catalog> = OnceLock::new();
        static ZH: OnceLock<Catalog> = OnceLock::new();

        match language {
            Language::En => EN.get_or_init(|| Catalog::parse(EN_SOURCE)),
            Language::Zh => ZH.get_or_init(|| Catalog::parse(ZH_SOURCE)),
        }
    }

    fn parse(source: &str) -> Self {
        let mut catalog = Catalog::default();
        if let Ok(toml::Value::Table(sections)) = source.parse::<toml::Value>() {
            for (section, value) in sections {
                catalog.flatten(&section, value);
            }
        }
        catalog
    }

    fn flatten(&mut self, prefix: &str, value: toml::Value) {
        match value {
            toml::Value::String(text) => {
                self.messages.insert(prefix.to_string(), text);
            }
            toml::Value::Table(entries) => {
                for (key, nested) in entries {
                    self.flatten(&format!("{}.{}", prefix, key), nested);
                }
            }
            _ => {}
        }
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.messages.get(key).map(String::as_str)
    }
}

/// Localized text for operator-facing messages. Keys missing from a
/// language fall back to English, then to the key itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct Translator {
    language: Language,
}

impl Translator {
    pub fn new(language: Language) -> Self {
        Self { language }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn get(&self, key: &str) -> String {
        lookup(Catalog::of(self.language), Catalog::of(Language::En), key)
    }

    /// Replaces `{name}` placeholders in one pass; substituted text is not
    /// scanned again and unknown placeholders are left as they are.
    pub fn format(&self, key: &str, args: &[(&str, &str)]) -> String {
        substitute(&self.get(key), args)
    }

    pub fn phase(&self, phase: Phase) -> String {
        self.get(&format!("phase.{}", phase.as_str()))
    }

    pub fn period(&self, period: Period) -> String {
        self.get(&format!("period.{}", period))
    }

    pub fn break_title(&self, kind: PopupKind) -> String {
        self.get(match kind {
            PopupKind::ShortBreak => "break.short_title",
            PopupKind::LongBreak => "break.long_title",
        })
    }

    pub fn break_over(&self, kind: PopupKind) -> String {
        self.get(match kind {
            PopupKind::ShortBreak => "break.short_over",
            PopupKind::LongBreak => "break.long_over",
        })
    }

    /// `1 minute`, `5 minutes`, `5 分钟`.
    pub fn minutes(&self, count: u64) -> String {
        let key = match self.language.plural_category(count) {
            PluralCategory::One => "unit.minute.one",
            PluralCategory::Other => "unit.minute.other",
        };
        self.format(key, &[("count", &count.to_string())])
    }
}

fn lookup(primary: &Catalog, fallback: &Catalog, key: &str) -> String {
    primary
        .get(key)
        .or_else(|| fallback.get(key))
        .unwrap_or(key)
        .to_string()
}

fn substitute(template: &str, args: &[(&str, &str)]) -> String {
    let mut output = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        output.push_str(&rest[..open]);
        let tail = &rest[open..];
        let Some(close) = tail.find('}') else {
            output.push_str(tail);
            return output;
        };

        let name = &tail[1..close];
        match args.iter().find(|(arg, _)| *arg == name) {
            Some((_, value)) => output.push_str(value),
            None => output.push_str(&tail[..=close]),
        }
        rest = &tail[close + 1..];
    }

    output.push_str(rest);
    output
}
