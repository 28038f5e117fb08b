//! ASCII folding of terms that carry diacritical marks.
//!
//! After all fields of a document are processed, every term containing a
//! character from [`APPROXIMATIONS`] gets an ASCII duplicate (`café` →
//! `cafe`) with the same weight and no positional data. Queries typed
//! without diacritics then still match; phrase and proximity matching only
//! work against the original terms.

use std::sync::LazyLock;

use ahash::{AHashMap, AHashSet};

use crate::indexing::term::TermSet;

/// Diacritic → ASCII approximation table for Latin-1 and Latin Extended-A.
pub const APPROXIMATIONS: &[(char, &str)] = &[
    ('À', "A"), ('Á', "A"), ('Â', "A"), ('Ã', "A"), ('Ä', "A"), ('Å', "A"), ('Æ', "AE"),
    ('Ç', "C"), ('È', "E"), ('É', "E"), ('Ê', "E"), ('Ë', "E"), ('Ì', "I"), ('Í', "I"),
    ('Î', "I"), ('Ï', "I"), ('Ð', "D"), ('Ñ', "N"), ('Ò', "O"), ('Ó', "O"), ('Ô', "O"),
    ('Õ', "O"), ('Ö', "O"), ('×', "x"), ('Ø', "O"), ('Ù', "U"), ('Ú', "U"), ('Û', "U"),
    ('Ü', "U"), ('Ý', "Y"), ('Þ', "Th"), ('ß', "ss"), ('à', "a"), ('á', "a"), ('â', "a"),
    ('ã', "a"), ('ä', "a"), ('å', "a"), ('æ', "ae"), ('ç', "c"), ('è', "e"), ('é', "e"),
    ('ê', "e"), ('ë', "e"), ('ì', "i"), ('í', "i"), ('î', "i"), ('ï', "i"), ('ð', "d"),
    ('ñ', "n"), ('ò', "o"), ('ó', "o"), ('ô', "o"), ('õ', "o"), ('ö', "o"), ('ø', "o"),
    ('ù', "u"), ('ú', "u"), ('û', "u"), ('ü', "u"), ('ý', "y"), ('þ', "th"), ('ÿ', "y"),
    ('Ā', "A"), ('ā', "a"), ('Ă', "A"), ('ă', "a"), ('Ą', "A"), ('ą', "a"), ('Ć', "C"),
    ('ć', "c"), ('Ĉ', "C"), ('ĉ', "c"), ('Ċ', "C"), ('ċ', "c"), ('Č', "C"), ('č', "c"),
    ('Ď', "D"), ('ď', "d"), ('Đ', "D"), ('đ', "d"), ('Ē', "E"), ('ē', "e"), ('Ĕ', "E"),
    ('ĕ', "e"), ('Ė', "E"), ('ė', "e"), ('Ę', "E"), ('ę', "e"), ('Ě', "E"), ('ě', "e"),
    ('Ĝ', "G"), ('ĝ', "g"), ('Ğ', "G"), ('ğ', "g"), ('Ġ', "G"), ('ġ', "g"), ('Ģ', "G"),
    ('ģ', "g"), ('Ĥ', "H"), ('ĥ', "h"), ('Ħ', "H"), ('ħ', "h"), ('Ĩ', "I"), ('ĩ', "i"),
    ('Ī', "I"), ('ī', "i"), ('Ĭ', "I"), ('ĭ', "i"), ('Į', "I"), ('į', "i"), ('İ', "I"),
    ('ı', "i"), ('Ĳ', "IJ"), ('ĳ', "ij"), ('Ĵ', "J"), ('ĵ', "j"), ('Ķ', "K"), ('ķ', "k"),
    ('ĸ', "k"), ('Ĺ', "L"), ('ĺ', "l"), ('Ļ', "L"), ('ļ', "l"), ('Ľ', "L"), ('ľ', "l"),
    ('Ŀ', "L"), ('ŀ', "l"), ('Ł', "L"), ('ł', "l"), ('Ń', "N"), ('ń', "n"), ('Ņ', "N"),
    ('ņ', "n"), ('Ň', "N"), ('ň', "n"), ('ŉ', "'n"), ('Ŋ', "NG"), ('ŋ', "ng"),
    ('Ō', "O"), ('ō', "o"), ('Ŏ', "O"), ('ŏ', "o"), ('Ő', "O"), ('ő', "o"), ('Œ', "OE"),
    ('œ', "oe"), ('Ŕ', "R"), ('ŕ', "r"), ('Ŗ', "R"), ('ŗ', "r"), ('Ř', "R"), ('ř', "r"),
    ('Ś', "S"), ('ś', "s"), ('Ŝ', "S"), ('ŝ', "s"), ('Ş', "S"), ('ş', "s"), ('Š', "S"),
    ('š', "s"), ('Ţ', "T"), ('ţ', "t"), ('Ť', "T"), ('ť', "t"), ('Ŧ', "T"), ('ŧ', "t"),
    ('Ũ', "U"), ('ũ', "u"), ('Ū', "U"), ('ū', "u"), ('Ŭ', "U"), ('ŭ', "u"), ('Ů', "U"),
    ('ů', "u"), ('Ű', "U"), ('ű', "u"), ('Ų', "U"), ('ų', "u"), ('Ŵ', "W"), ('ŵ', "w"),
    ('Ŷ', "Y"), ('ŷ', "y"), ('Ÿ', "Y"), ('Ź', "Z"), ('ź', "z"), ('Ż', "Z"), ('ż', "z"),
    ('Ž', "Z"), ('ž', "z"),
];

static APPROXIMATION_MAP: LazyLock<AHashMap<char, &'static str>> =
    LazyLock::new(|| APPROXIMATIONS.iter().copied().collect());

/// Whether `text` contains any character from the approximation table.
pub fn has_diacritics(text: &str) -> bool {
    text.chars().any(|c| APPROXIMATION_MAP.contains_key(&c))
}

/// Replace every diacritic in `text` by its ASCII approximation.
///
/// Returns `None` when nothing would change.
pub fn fold(text: &str) -> Option<String> {
    if !has_diacritics(text) {
        return None;
    }
    let mut folded = String::with_capacity(text.len());
    for c in text.chars() {
        match APPROXIMATION_MAP.get(&c) {
            Some(replacement) => folded.push_str(replacement),
            None => folded.push(c),
        }
    }
    Some(folded)
}

/// Post-processor adding ASCII-folded duplicates to a term set.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiacriticFolder;

impl DiacriticFolder {
    pub fn new() -> Self {
        DiacriticFolder
    }

    /// Add folded duplicates for every term whose full name (prefix
    /// included) has diacritics.
    ///
    /// A duplicate that already exists as a generated term is left alone;
    /// duplicates folded from several source terms accumulate their weights.
    /// Returns the number of duplicates added.
    pub fn process(&self, terms: &mut TermSet) -> usize {
        let literal: AHashSet<String> = terms.names().map(str::to_string).collect();
        let sources: Vec<_> = terms
            .iter()
            .filter(|term| has_diacritics(&term.term()))
            .collect();

        let mut added = AHashSet::new();
        for source in sources {
            let prefix = source.prefix.as_deref().unwrap_or("");
            let folded_prefix = fold(prefix).unwrap_or_else(|| prefix.to_string());
            let folded_text = fold(&source.text).unwrap_or_else(|| source.text.clone());
            let name = format!("{folded_prefix}{folded_text}");
            if literal.contains(&name) {
                continue;
            }
            terms.add_term(&folded_prefix, &folded_text, source.weight);
            added.insert(name);
        }

        if !added.is_empty() {
            log::trace!("added {} diacritic-folded terms", added.len());
        }
        added.len()
    }
}
