//! Dashboard label translation lookup (§2 supplement, §4.5.5: missing translation → English).

use td_models::{Autopilot, Gear};

/// A dashboard label that needs localizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    UnitMph,
    UnitKmh,
    Gear(Gear),
    Autopilot(Autopilot),
}

/// Resolves a [`Label`] to display text for a language code. Implementations may pull from a
/// larger catalog; [`BuiltinTranslator`] covers the languages this engine ships with.
pub trait Translator: Send + Sync {
    fn translate(&self, label: Label, language: &str) -> String;
}

/// English + Spanish, falling back to English for any other language code or missing key.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinTranslator;

impl Translator for BuiltinTranslator {
    fn translate(&self, label: Label, language: &str) -> String {
        lookup(label, language).unwrap_or_else(|| lookup(label, "en").unwrap())
    }
}

fn lookup(label: Label, language: &str) -> Option<String> {
    let text = match (language, label) {
        ("en", Label::UnitMph) => "MPH",
        ("en", Label::UnitKmh) => "KM/H",
        ("en", Label::Gear(Gear::Park)) => "P",
        ("en", Label::Gear(Gear::Drive)) => "D",
        ("en", Label::Gear(Gear::Reverse)) => "R",
        ("en", Label::Gear(Gear::Neutral)) => "N",
        ("en", Label::Gear(Gear::Unknown)) => "-",
        ("en", Label::Autopilot(Autopilot::Manual)) => "MANUAL",
        ("en", Label::Autopilot(Autopilot::SelfDriving)) => "FULL SELF-DRIVING",
        ("en", Label::Autopilot(Autopilot::Autosteer)) => "AUTOSTEER",
        ("en", Label::Autopilot(Autopilot::Tacc)) => "TACC",

        ("es", Label::UnitMph) => "MPH",
        ("es", Label::UnitKmh) => "KM/H",
        ("es", Label::Gear(Gear::Park)) => "P",
        ("es", Label::Gear(Gear::Drive)) => "D",
        ("es", Label::Gear(Gear::Reverse)) => "R",
        ("es", Label::Gear(Gear::Neutral)) => "N",
        ("es", Label::Gear(Gear::Unknown)) => "-",
        ("es", Label::Autopilot(Autopilot::Manual)) => "MANUAL",
        ("es", Label::Autopilot(Autopilot::SelfDriving)) => "CONDUCCION AUTONOMA",
        ("es", Label::Autopilot(Autopilot::Autosteer)) => "AUTODIRECCION",
        ("es", Label::Autopilot(Autopilot::Tacc)) => "CONTROL DE CRUCERO",

        _ => return None,
    };
    Some(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_english_for_unknown_language() {
        let translator = BuiltinTranslator;
        assert_eq!(translator.translate(Label::UnitMph, "fr"), "MPH");
    }

    #[test]
    fn resolves_spanish_autopilot_label() {
        let translator = BuiltinTranslator;
        assert_eq!(
            translator.translate(Label::Autopilot(Autopilot::SelfDriving), "es"),
            "CONDUCCION AUTONOMA"
        );
    }
}
