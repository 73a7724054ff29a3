// Stable player identifiers derived from display names.

use deunicode::deunicode;

/// Derive the canonical player id for a display name.
///
/// Lowercases, folds diacritics, drops `.`, `'` and `,`, and joins the
/// remaining words with `_` (hyphens and runs of whitespace both become a
/// single separator). The same name always yields the same id so repeated
/// imports merge. Returns `None` for a blank name.
///
/// `"José Ramírez"` -> `"jose_ramirez"`, `"J.D. Martinez"` -> `"jd_martinez"`.
pub fn make_player_id(name: &str) -> Option<String> {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();

    // Transliterate before lowercasing so precomposed and combining-mark
    // spellings of the same name agree.
    let ascii = deunicode(name.trim());
    for c in ascii.chars().flat_map(char::to_lowercase) {
        if c.is_whitespace() || c == '-' || c == '_' {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
        } else if c.is_alphanumeric() {
            current.push(c);
        }
        // Any other punctuation is dropped without splitting the word.
    }
    if !current.is_empty() {
        words.push(current);
    }

    if words.is_empty() {
        None
    } else {
        Some(words.join("_"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_name() {
        assert_eq!(make_player_id("Aaron Judge").as_deref(), Some("aaron_judge"));
    }

    #[test]
    fn diacritics_are_folded() {
        assert_eq!(make_player_id("José Ramírez").as_deref(), Some("jose_ramirez"));
        assert_eq!(make_player_id("Ronald Acuña Jr.").as_deref(), Some("ronald_acuna_jr"));
    }

    #[test]
    fn composed_and_decomposed_spellings_agree() {
        assert_eq!(
            make_player_id("Kōdai Senga"),
            make_player_id("Ko\u{304}dai Senga")
        );
        assert_eq!(make_player_id("Kōdai Senga").as_deref(), Some("kodai_senga"));
        assert_eq!(
            make_player_id("Jose\u{301} Rami\u{301}rez").as_deref(),
            Some("jose_ramirez")
        );
    }

    #[test]
    fn letters_outside_the_accent_set_are_folded() {
        assert_eq!(make_player_id("Michał Kowalski").as_deref(), Some("michal_kowalski"));
        assert_eq!(make_player_id("Søren Šimek").as_deref(), Some("soren_simek"));
    }

    #[test]
    fn punctuation_is_stripped() {
        assert_eq!(make_player_id("J.D. Martinez").as_deref(), Some("jd_martinez"));
        assert_eq!(make_player_id("Travis d'Arnaud").as_deref(), Some("travis_darnaud"));
        assert_eq!(make_player_id("Smith, Will").as_deref(), Some("smith_will"));
    }

    #[test]
    fn hyphens_and_extra_spaces_become_single_separator() {
        assert_eq!(
            make_player_id("Isiah  Kiner-Falefa").as_deref(),
            Some("isiah_kiner_falefa")
        );
        assert_eq!(make_player_id("  Juan Soto  ").as_deref(), Some("juan_soto"));
    }

    #[test]
    fn same_name_same_id() {
        assert_eq!(make_player_id("Shohei Ohtani"), make_player_id("SHOHEI OHTANI"));
    }

    #[test]
    fn blank_name_has_no_id() {
        assert_eq!(make_player_id(""), None);
        assert_eq!(make_player_id("  . "), None);
    }
}
