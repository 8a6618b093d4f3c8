/// File naming: base-name derivation, sanitization and candidate generation
use crate::media_store::join_path;
use rand::{distributions::Alphanumeric, Rng};
use reqwest::Url;

/// Longest base name kept after sanitization, in characters
const MAX_BASE_NAME_CHARS: usize = 120;

/// One proposed file name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateName {
    /// `{base}[-{suffix}].{ext}`
    pub file_name: String,
    /// `{directory}/{file_name}`, as handed to the storage adapter
    pub path: String,
}

/// Lazy, unbounded sequence of candidate names
///
/// Yields `base.ext` first, then `base-<suffix>.ext` forever with a fresh
/// random suffix each time. Suffixes may repeat; bounding the walk is the
/// caller's business.
#[derive(Debug, Clone)]
pub struct NameCandidates {
    directory: String,
    base: String,
    extension: String,
    suffix_length: usize,
    started: bool,
}

impl NameCandidates {
    pub fn new(directory: &str, base: &str, extension: &str, suffix_length: usize) -> Self {
        Self {
            directory: directory.to_string(),
            base: base.to_string(),
            extension: extension.to_string(),
            suffix_length,
            started: false,
        }
    }

    fn candidate(&self, file_name: String) -> CandidateName {
        CandidateName {
            path: join_path(&self.directory, &file_name),
            file_name,
        }
    }
}

impl Iterator for NameCandidates {
    type Item = CandidateName;

    fn next(&mut self) -> Option<CandidateName> {
        let file_name = if self.started {
            format!(
                "{}-{}.{}",
                self.base,
                random_suffix(self.suffix_length),
                self.extension
            )
        } else {
            self.started = true;
            format!("{}.{}", self.base, self.extension)
        };
        Some(self.candidate(file_name))
    }
}

/// Lowercase alphanumeric suffix, safe on case-insensitive filesystems
pub fn random_suffix(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect()
}

/// Make a string usable as a single path segment
pub fn sanitize_file_name(name: &str) -> String {
    let mut cleaned = String::with_capacity(name.len());
    let mut pending_space = false;

    for ch in name.chars() {
        if ch.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space && !cleaned.is_empty() {
            cleaned.push(' ');
        }
        pending_space = false;

        let illegal = ch.is_control()
            || matches!(
                ch,
                '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '#' | '^' | '[' | ']'
            );
        cleaned.push(if illegal { '_' } else { ch });
    }

    let truncated: String = cleaned.chars().take(MAX_BASE_NAME_CHARS).collect();
    truncated
        .trim_matches(|c: char| c == '.' || c == ' ')
        .to_string()
}

/// Strip a trailing `.{extension}` (case-insensitive; `jpg` also strips `.jpeg`)
pub fn strip_extension<'a>(name: &'a str, extension: &str) -> &'a str {
    let mut suffixes = vec![format!(".{}", extension)];
    if extension.eq_ignore_ascii_case("jpg") {
        suffixes.push(".jpeg".to_string());
    }

    for suffix in suffixes {
        if name.len() > suffix.len() {
            let split = name.len() - suffix.len();
            if name.is_char_boundary(split) && name[split..].eq_ignore_ascii_case(&suffix) {
                return &name[..split];
            }
        }
    }
    name
}

/// Pick the base name for a downloaded image
///
/// Preference: anchor text, then the last URL path segment, then the
/// configured template.
pub fn derive_base_name(anchor: &str, link: &Url, extension: &str, template: &str) -> String {
    let anchor = anchor.trim();

    let raw = if !anchor.is_empty() {
        anchor.to_string()
    } else {
        last_path_segment(link).unwrap_or_else(|| template.to_string())
    };

    let base = sanitize_file_name(strip_extension(&raw, extension));
    let base = strip_extension(&base, extension)
        .trim_end_matches(|c: char| c == '.' || c == ' ')
        .to_string();

    if base.is_empty() {
        let fallback = sanitize_file_name(template);
        if fallback.is_empty() {
            "image".to_string()
        } else {
            fallback
        }
    } else {
        base
    }
}

fn last_path_segment(link: &Url) -> Option<String> {
    let segment = link.path_segments()?.filter(|s| !s.is_empty()).last()?;
    let decoded = urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| segment.to_string());
    if decoded.trim().is_empty() {
        None
    } else {
        Some(decoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_first_candidate_has_no_suffix() {
        let mut candidates = NameCandidates::new("media", "cat", "png", 6);
        let first = candidates.next().unwrap();
        assert_eq!(first.file_name, "cat.png");
        assert_eq!(first.path, "media/cat.png");
    }

    #[test]
    fn test_later_candidates_carry_suffix() {
        let candidates = NameCandidates::new("media", "cat", "png", 6);

        for candidate in candidates.skip(1).take(20) {
            let stem = candidate.file_name.strip_prefix("cat-").unwrap();
            let suffix = stem.strip_suffix(".png").unwrap();
            assert_eq!(suffix.len(), 6);
            assert!(suffix
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
            assert_eq!(candidate.path, format!("media/{}", candidate.file_name));
        }
    }

    #[test]
    fn test_sanitize_replaces_illegal_characters() {
        assert_eq!(sanitize_file_name("a/b\\c:d*e?f"), "a_b_c_d_e_f");
        assert_eq!(sanitize_file_name("[tag] #1 ^x"), "_tag_ _1 _x");
        assert_eq!(sanitize_file_name("  lots   of\tspace  "), "lots of space");
        assert_eq!(sanitize_file_name("..hidden.."), "hidden");
        assert_eq!(sanitize_file_name("ok-name_1"), "ok-name_1");
    }

    #[test]
    fn test_sanitize_truncates_on_char_boundary() {
        let long = "é".repeat(300);
        let cleaned = sanitize_file_name(&long);
        assert_eq!(cleaned.chars().count(), MAX_BASE_NAME_CHARS);
    }

    #[test]
    fn test_strip_extension() {
        assert_eq!(strip_extension("cat.png", "png"), "cat");
        assert_eq!(strip_extension("cat.PNG", "png"), "cat");
        assert_eq!(strip_extension("cat.jpeg", "jpg"), "cat");
        assert_eq!(strip_extension("cat.gif", "png"), "cat.gif");
        assert_eq!(strip_extension(".png", "png"), ".png");
    }

    #[test]
    fn test_base_name_prefers_anchor() {
        let link = url("https://example.com/pics/cat.png");
        assert_eq!(derive_base_name("My Cat", &link, "png", "image"), "My Cat");
        assert_eq!(derive_base_name("diagram.png", &link, "png", "image"), "diagram");
    }

    #[test]
    fn test_base_name_from_url() {
        let link = url("https://example.com/pics/cat.png");
        assert_eq!(derive_base_name("", &link, "png", "image"), "cat");

        let encoded = url("https://example.com/pics/grumpy%20cat.png?size=large");
        assert_eq!(derive_base_name("  ", &encoded, "png", "image"), "grumpy cat");

        let trailing_slash = url("https://example.com/pics/cat/");
        assert_eq!(derive_base_name("", &trailing_slash, "png", "image"), "cat");
    }

    #[test]
    fn test_base_name_falls_back_to_template() {
        let link = url("https://example.com/");
        assert_eq!(derive_base_name("", &link, "png", "image"), "image");

        let dots_only = url("https://example.com/...");
        assert_eq!(derive_base_name("", &dots_only, "png", "pasted"), "pasted");
    }

    #[test]
    fn test_base_name_never_keeps_target_extension() {
        let link = url("https://example.com/x");
        let base = derive_base_name("photo.png.", &link, "png", "image");
        assert_eq!(base, "photo");

        let dotted = url("https://example.com/a..png%20");
        assert_eq!(derive_base_name("", &dotted, "png", "image"), "a");
    }
}
