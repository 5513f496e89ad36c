//! RFC 1345 digraphs entered with `<C-k>{char1}{char2}`.
//!
//! Only the Latin-1 supplement and a handful of common symbols are covered.

const DIGRAPHS: &[(char, char, char)] = &[
    ('N', 'S', '\u{a0}'),
    ('!', 'I', '¡'),
    ('C', 't', '¢'),
    ('P', 'd', '£'),
    ('Y', 'e', '¥'),
    ('S', 'E', '§'),
    ('C', 'o', '©'),
    ('<', '<', '«'),
    ('R', 'g', '®'),
    ('D', 'G', '°'),
    ('+', '-', '±'),
    ('2', 'S', '²'),
    ('3', 'S', '³'),
    ('M', 'y', 'µ'),
    ('P', 'I', '¶'),
    ('.', 'M', '·'),
    ('1', 'S', '¹'),
    ('>', '>', '»'),
    ('1', '4', '¼'),
    ('1', '2', '½'),
    ('3', '4', '¾'),
    ('?', 'I', '¿'),
    ('A', '!', 'À'),
    ('A', '\'', 'Á'),
    ('A', '>', 'Â'),
    ('A', '?', 'Ã'),
    ('A', ':', 'Ä'),
    ('A', 'A', 'Å'),
    ('A', 'E', 'Æ'),
    ('C', ',', 'Ç'),
    ('E', '!', 'È'),
    ('E', '\'', 'É'),
    ('E', '>', 'Ê'),
    ('E', ':', 'Ë'),
    ('I', '!', 'Ì'),
    ('I', '\'', 'Í'),
    ('I', '>', 'Î'),
    ('I', ':', 'Ï'),
    ('N', '?', 'Ñ'),
    ('O', '!', 'Ò'),
    ('O', '\'', 'Ó'),
    ('O', '>', 'Ô'),
    ('O', '?', 'Õ'),
    ('O', ':', 'Ö'),
    ('*', 'X', '×'),
    ('O', '/', 'Ø'),
    ('U', '!', 'Ù'),
    ('U', '\'', 'Ú'),
    ('U', '>', 'Û'),
    ('U', ':', 'Ü'),
    ('Y', '\'', 'Ý'),
    ('s', 's', 'ß'),
    ('a', '!', 'à'),
    ('a', '\'', 'á'),
    ('a', '>', 'â'),
    ('a', '?', 'ã'),
    ('a', ':', 'ä'),
    ('a', 'a', 'å'),
    ('a', 'e', 'æ'),
    ('c', ',', 'ç'),
    ('e', '!', 'è'),
    ('e', '\'', 'é'),
    ('e', '>', 'ê'),
    ('e', ':', 'ë'),
    ('i', '!', 'ì'),
    ('i', '\'', 'í'),
    ('i', '>', 'î'),
    ('i', ':', 'ï'),
    ('n', '?', 'ñ'),
    ('o', '!', 'ò'),
    ('o', '\'', 'ó'),
    ('o', '>', 'ô'),
    ('o', '?', 'õ'),
    ('o', ':', 'ö'),
    ('-', ':', '÷'),
    ('o', '/', 'ø'),
    ('u', '!', 'ù'),
    ('u', '\'', 'ú'),
    ('u', '>', 'û'),
    ('u', ':', 'ü'),
    ('y', '\'', 'ý'),
    ('y', ':', 'ÿ'),
    ('E', 'u', '€'),
    ('T', 'M', '™'),
    ('-', 'N', '–'),
    ('-', 'M', '—'),
    ('\'', '6', '‘'),
    ('\'', '9', '’'),
    ('"', '6', '“'),
    ('"', '9', '”'),
    ('.', '.', '‥'),
    ('a', '*', 'α'),
    ('b', '*', 'β'),
    ('p', '*', 'π'),
    ('-', '>', '→'),
    ('<', '-', '←'),
    ('O', 'K', '✓'),
];

/// Resolves a digraph. The reversed pair is tried when the typed order is
/// unknown; if neither is known the second character is returned, as Vim does.
pub fn digraph(first: char, second: char) -> char {
    lookup(first, second)
        .or_else(|| lookup(second, first))
        .unwrap_or(second)
}

fn lookup(first: char, second: char) -> Option<char> {
    DIGRAPHS
        .iter()
        .find(|(a, b, _)| *a == first && *b == second)
        .map(|(_, _, c)| *c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_digraphs() {
        assert_eq!(digraph('e', ':'), 'ë');
        assert_eq!(digraph('C', 'o'), '©');
        assert_eq!(digraph('E', 'u'), '€');
    }

    #[test]
    fn test_reversed_pair() {
        assert_eq!(digraph(':', 'e'), 'ë');
    }

    #[test]
    fn test_unknown_pair_yields_second_char() {
        assert_eq!(digraph('q', 'z'), 'z');
    }
}
