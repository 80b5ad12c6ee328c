//! Text normalization applied before the junk-line rules

/// Lowercase, trim and strip diacritics so printer/font differences in
/// accents don't affect rule matching
pub fn normalize(line: &str) -> String {
    line.trim()
        .to_lowercase()
        .chars()
        .filter(|c| !is_combining_mark(*c))
        .map(fold_accent)
        .collect()
}

/// Map an accented lowercase letter to its base letter
fn fold_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ä' | 'ã' | 'å' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'ö' | 'õ' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ñ' => 'n',
        'ç' => 'c',
        'ý' | 'ÿ' => 'y',
        other => other,
    }
}

/// Combining diacritical marks, left over when text arrives decomposed
fn is_combining_mark(c: char) -> bool {
    ('\u{0300}'..='\u{036f}').contains(&c)
}
