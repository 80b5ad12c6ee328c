//! Receipt boilerplate vocabularies
//!
//! Patterns are matched against normalized lines (lowercase, accents
//! folded), so they are written without diacritics.

use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static Regex {
            static R: OnceLock<Regex> = OnceLock::new();
            R.get_or_init(|| Regex::new($pat).expect("invalid regex"))
        }
    };
}

re!(re_spanish,
    r"(?i)\b(?:total|subtotal|iva|cambio|efectivo|tarjeta|visa|mastercard|nif|cif|gracias|ticket|factura|recibo)\b|\bbase\s*imp");
re!(re_english,
    r"(?i)\b(?:total|subtotal|tax|vat|change|cash|card|visa|mastercard|amex|tax\s*id|thank\s*you|ticket|invoice|receipt)\b");

/// Language of the receipts being scanned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// Spanish receipts (IVA, NIF/CIF, efectivo, tarjeta...)
    #[default]
    Es,
    /// English receipts (tax, VAT, cash, card...)
    En,
}

/// Fixed set of boilerplate words for one locale
#[derive(Debug, Clone, Copy)]
pub struct Vocabulary {
    locale: Locale,
    pattern: &'static Regex,
}

impl Vocabulary {
    pub fn new(locale: Locale) -> Self {
        let pattern = match locale {
            Locale::Es => re_spanish(),
            Locale::En => re_english(),
        };
        Self { locale, pattern }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// True if the line contains any boilerplate word
    pub fn matches(&self, normalized: &str) -> bool {
        self.pattern.is_match(normalized)
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::new(Locale::default())
    }
}
