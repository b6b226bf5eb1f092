//! Speech sanitizer
//!
//! The synthesis voice reads pictographs aloud by name (or chokes on them),
//! so emoji and symbol ranges are removed before synthesis.

use once_cell::sync::Lazy;
use regex::Regex;

static UNSPEAKABLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        "[",
        r"\x{1F600}-\x{1F64F}", // emoticons
        r"\x{1F300}-\x{1F5FF}", // symbols & pictographs
        r"\x{1F680}-\x{1F6FF}", // transport & map
        r"\x{1F1E0}-\x{1F1FF}", // flags
        r"\x{2500}-\x{2BEF}",
        r"\x{2702}-\x{27B0}",
        r"\x{24C2}-\x{1F251}",
        r"\x{1F900}-\x{1F9FF}",
        r"\x{1FA70}-\x{1FAFF}",
        r"\x{2600}-\x{26FF}",
        r"\x{1F700}-\x{1F77F}",
        "]+"
    ))
    .expect("sanitizer pattern is a valid regex")
});

/// Remove every character in the unspeakable ranges
///
/// Idempotent: `strip_unspeakable(&strip_unspeakable(x)) == strip_unspeakable(x)`.
pub fn strip_unspeakable(text: &str) -> String {
    UNSPEAKABLE.replace_all(text, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_emoji() {
        assert_eq!(
            strip_unspeakable("Tente ajustar sua pergunta! 😉"),
            "Tente ajustar sua pergunta! "
        );
        assert_eq!(strip_unspeakable("✨🚀 química 🙌"), " química ");
    }

    #[test]
    fn test_keeps_portuguese_text() {
        let text = "Oxidação é a perda de elétrons; reações químicas, ação e fé.";
        assert_eq!(strip_unspeakable(text), text);
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "Nada ainda! 🚀 Me envie outra pergunta!",
            "☀️ bom dia ➡️ aula",
            "sem símbolos",
            "",
        ];
        for sample in samples {
            let once = strip_unspeakable(sample);
            assert_eq!(strip_unspeakable(&once), once);
        }
    }
}
