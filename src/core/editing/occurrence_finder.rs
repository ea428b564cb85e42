// Literal occurrence search and the uniqueness gate.
//
// Matching is exact: case-sensitive, whitespace-sensitive, no pattern syntax.
// Matches never overlap; after a hit the scan resumes at the match end.

use super::edit_errors::{EditError, EditTarget};

/// One literal match, as byte offsets into the searched text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Occurrence {
    pub flat_start: usize,
    pub flat_end: usize,
}

impl Occurrence {
    pub fn len(&self) -> usize {
        self.flat_end - self.flat_start
    }

    pub fn is_empty(&self) -> bool {
        self.flat_end == self.flat_start
    }
}

/// Every non-overlapping match of `pattern`, left to right.
pub fn find_all(text: &str, pattern: &str) -> Result<Vec<Occurrence>, EditError> {
    find_all_where(text, pattern, |_| true)
}

/// Like [`find_all`], but candidates rejected by `accept` are skipped. A
/// rejected candidate only advances the scan by one character, so a valid
/// match starting inside it is still found.
pub fn find_all_where<F>(text: &str, pattern: &str, accept: F) -> Result<Vec<Occurrence>, EditError>
where
    F: Fn(&Occurrence) -> bool,
{
    if pattern.is_empty() {
        return Err(EditError::invalid("search text must not be empty"));
    }

    let mut occurrences = Vec::new();
    let mut cursor = 0;
    while let Some(found) = text[cursor..].find(pattern) {
        let flat_start = cursor + found;
        let candidate = Occurrence {
            flat_start,
            flat_end: flat_start + pattern.len(),
        };
        if accept(&candidate) {
            occurrences.push(candidate);
            cursor = candidate.flat_end;
        } else {
            let step = text[flat_start..]
                .chars()
                .next()
                .map(char::len_utf8)
                .unwrap_or(1);
            cursor = flat_start + step;
        }
        if cursor >= text.len() {
            break;
        }
    }
    Ok(occurrences)
}

/// Apply the uniqueness contract.
///
/// No match is `TextNotFound`; several matches without `replace_all` is
/// `AmbiguousMatch` carrying the count. Otherwise every match is returned.
pub fn select_targets(
    occurrences: Vec<Occurrence>,
    replace_all: bool,
    target: &EditTarget,
) -> Result<Vec<Occurrence>, EditError> {
    match occurrences.len() {
        0 => Err(EditError::TextNotFound {
            target: target.clone(),
        }),
        count if count > 1 && !replace_all => Err(EditError::AmbiguousMatch {
            target: target.clone(),
            count,
        }),
        _ => Ok(occurrences),
    }
}
