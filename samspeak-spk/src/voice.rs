//! Local voice selection

use crate::local::Voice;

/// First English voice whose name contains one of `preferred`.
/// `None` means the platform default voice.
pub fn select_voice<'a>(voices: &'a [Voice], preferred: &[String]) -> Option<&'a Voice> {
    voices.iter().find(|voice| {
        voice.lang.starts_with("en") && preferred.iter().any(|name| voice.name.contains(name.as_str()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voice(name: &str, lang: &str) -> Voice {
        Voice {
            name: name.to_string(),
            lang: lang.to_string(),
        }
    }

    fn preferred() -> Vec<String> {
        vec!["Male".to_string(), "David".to_string(), "Fred".to_string()]
    }

    #[test]
    fn test_prefers_english_male_names() {
        let voices = vec![
            voice("Samantha", "en-US"),
            voice("Microsoft David", "en-US"),
            voice("Fred", "en-GB"),
        ];
        assert_eq!(select_voice(&voices, &preferred()).unwrap().name, "Microsoft David");
    }

    #[test]
    fn test_non_english_match_ignored() {
        let voices = vec![voice("David", "de-DE"), voice("Anna", "en-US")];
        assert!(select_voice(&voices, &preferred()).is_none());
    }

    #[test]
    fn test_empty_list() {
        assert!(select_voice(&[], &preferred()).is_none());
    }
}
