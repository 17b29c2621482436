//! Caption → filesystem-safe slug.
//!
//! `normalize_caption` collapses layout whitespace; `transliterate` maps
//! Cyrillic letter by letter to lowercase ASCII, turns whitespace into `_`
//! and drops anything it has no mapping for. Its output only contains
//! `[a-z0-9_-]`, so running it again is a no-op.

/// Collapses newlines and runs of whitespace into single spaces, then trims.
pub fn normalize_caption(caption: &str) -> String {
    caption.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn cyrillic_to_ascii(ch: char) -> Option<&'static str> {
    let mapped = match ch {
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' => "g",
        'д' => "d",
        'е' => "e",
        'ё' => "e",
        'ж' => "zh",
        'з' => "z",
        'и' => "i",
        'й' => "y",
        'к' => "k",
        'л' => "l",
        'м' => "m",
        'н' => "n",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'у' => "u",
        'ф' => "f",
        'х' => "kh",
        'ц' => "ts",
        'ч' => "ch",
        'ш' => "sh",
        'щ' => "shch",
        'ъ' => "",
        'ы' => "y",
        'ь' => "",
        'э' => "e",
        'ю' => "yu",
        'я' => "ya",
        _ => return None,
    };
    Some(mapped)
}

pub fn transliterate(caption: &str) -> String {
    let mut slug = String::with_capacity(caption.len());
    for ch in normalize_caption(caption).chars().flat_map(char::to_lowercase) {
        if let Some(mapped) = cyrillic_to_ascii(ch) {
            slug.push_str(mapped);
        } else if ch.is_ascii_alphanumeric() || ch == '-' {
            slug.push(ch);
        } else if (ch == ' ' || ch == '_') && !slug.is_empty() && !slug.ends_with('_') {
            slug.push('_');
        }
    }
    while slug.ends_with('_') {
        slug.pop();
    }
    slug
}

/// File stem for a caption, falling back to the node id when the caption
/// has nothing transliterable.
pub fn file_stem(caption: &str, node_id: &str) -> String {
    let slug = transliterate(caption);
    if !slug.is_empty() {
        return slug;
    }
    node_id
        .chars()
        .map(|ch| if ch.is_ascii_alphanumeric() { ch } else { '-' })
        .collect()
}
