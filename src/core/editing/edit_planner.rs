// Turns occurrences into native edit operations.
//
// Range targets (documents) get Delete/Insert pairs ordered from the highest
// native offset to the lowest, each computed against the original offsets, so
// applying them in order never shifts an address that is still pending.
// Whole-value targets (cells, script files) are spliced into a new string.

use serde::Deserialize;

use super::edit_errors::{EditError, EditTarget};
use super::occurrence_finder::{find_all_where, select_targets, Occurrence};
use super::styles::{ParagraphStyle, TextStyle};
use super::text_indexer::{FlattenedText, NativeAddressing, DOC_BODY_BASE_INDEX};

// ============================================================================
// OPERATIONS
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum FormatStyle {
    Text(TextStyle),
    Paragraph(ParagraphStyle),
}

/// One native edit. Indices are in the target's own addressing.
#[derive(Debug, Clone, PartialEq)]
pub enum EditOperation {
    Delete {
        start: usize,
        end: usize,
    },
    Insert {
        index: usize,
        text: String,
    },
    FormatRange {
        start: usize,
        end: usize,
        style: FormatStyle,
    },
}

/// A find-and-replace request. The same replacement is used for every match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    pub old_text: String,
    pub new_text: String,
    pub replace_all: bool,
}

impl Substitution {
    pub fn new(old_text: impl Into<String>, new_text: impl Into<String>, replace_all: bool) -> Self {
        Self {
            old_text: old_text.into(),
            new_text: new_text.into(),
            replace_all,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubstitutionPlan {
    Operations(Vec<EditOperation>),
    WholeValue(String),
}

impl SubstitutionPlan {
    pub fn into_operations(self) -> Option<Vec<EditOperation>> {
        match self {
            SubstitutionPlan::Operations(operations) => Some(operations),
            SubstitutionPlan::WholeValue(_) => None,
        }
    }

    pub fn into_whole_value(self) -> Option<String> {
        match self {
            SubstitutionPlan::WholeValue(value) => Some(value),
            SubstitutionPlan::Operations(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlannedSubstitution {
    pub plan: SubstitutionPlan,
    pub replacements: usize,
}

// ============================================================================
// SUBSTITUTION
// ============================================================================

/// Delete (and re-insert) every occurrence, highest offset first.
pub fn plan<A>(
    occurrences: &[Occurrence],
    target: &A,
    replacement: &str,
) -> Result<Vec<EditOperation>, EditError>
where
    A: NativeAddressing + ?Sized,
{
    let mut ordered = occurrences.to_vec();
    ordered.sort_by(|a, b| b.flat_start.cmp(&a.flat_start));

    let mut operations = Vec::with_capacity(ordered.len() * 2);
    for occurrence in &ordered {
        let range = target.to_native_range(occurrence)?;
        operations.push(EditOperation::Delete {
            start: range.start,
            end: range.end,
        });
        // The Docs API has no replace primitive; re-insert at the same anchor.
        if !replacement.is_empty() {
            operations.push(EditOperation::Insert {
                index: range.start,
                text: replacement.to_string(),
            });
        }
    }
    Ok(operations)
}

/// Splice `replacement` over each occurrence of `source`.
pub fn plan_inline(source: &str, occurrences: &[Occurrence], replacement: &str) -> String {
    let mut ordered = occurrences.to_vec();
    ordered.sort();

    let mut output = String::with_capacity(source.len());
    let mut copied = 0;
    for occurrence in ordered {
        if occurrence.flat_start < copied {
            continue;
        }
        output.push_str(&source[copied..occurrence.flat_start]);
        output.push_str(replacement);
        copied = occurrence.flat_end;
    }
    output.push_str(&source[copied..]);
    output
}

/// The single substitution engine shared by documents, cells and script files.
pub fn plan_substitution<A>(
    adapter: &A,
    target: &EditTarget,
    substitution: &Substitution,
) -> Result<PlannedSubstitution, EditError>
where
    A: NativeAddressing + ?Sized,
{
    let text = adapter.searchable_text();
    let found = find_all_where(text, &substitution.old_text, |o| adapter.accepts(o))?;
    let selected = select_targets(found, substitution.replace_all, target)?;
    let replacements = selected.len();

    let plan = if adapter.is_whole_value_target() {
        SubstitutionPlan::WholeValue(plan_inline(text, &selected, &substitution.new_text))
    } else {
        SubstitutionPlan::Operations(plan(&selected, adapter, &substitution.new_text)?)
    };

    Ok(PlannedSubstitution { plan, replacements })
}

// ============================================================================
// INSERTION
// ============================================================================

/// Where to insert text. Decided once when the request is decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertPosition {
    /// End of the body, before the trailing newline.
    End,
    /// A flat character index; the native index is one past it.
    Index(usize),
    /// Right after the first occurrence of this text.
    After(String),
}

pub fn resolve_insert_index(
    flat: &FlattenedText,
    position: &InsertPosition,
) -> Result<usize, EditError> {
    match position {
        InsertPosition::End => Ok(flat.end_insert_index()),
        InsertPosition::Index(index) => {
            let native = index + DOC_BODY_BASE_INDEX;
            if native > flat.end_insert_index() {
                return Err(EditError::invalid(format!(
                    "Index {} is outside the document body (valid range 0-{}).",
                    index,
                    flat.end_insert_index() - DOC_BODY_BASE_INDEX
                )));
            }
            Ok(native)
        }
        InsertPosition::After(anchor) => {
            // First match wins; anchors carry no uniqueness requirement.
            let found = find_all_where(flat.text(), anchor, |o| flat.accepts(o))?;
            let first = found.first().ok_or_else(|| EditError::AnchorNotFound {
                anchor: anchor.clone(),
            })?;
            flat.native_at(first.flat_end, true)
                .ok_or_else(|| EditError::AnchorNotFound {
                    anchor: anchor.clone(),
                })
        }
    }
}

pub fn plan_insert(
    flat: &FlattenedText,
    position: &InsertPosition,
    text: &str,
) -> Result<Vec<EditOperation>, EditError> {
    if text.is_empty() {
        return Err(EditError::invalid("text to insert must not be empty"));
    }
    let index = resolve_insert_index(flat, position)?;
    Ok(vec![EditOperation::Insert {
        index,
        text: text.to_string(),
    }])
}

// ============================================================================
// FORMATTING
// ============================================================================

/// Format every occurrence. Formatting does not move text, so order is irrelevant.
pub fn plan_format<A>(
    occurrences: &[Occurrence],
    target: &A,
    text_style: &TextStyle,
    paragraph_style: &ParagraphStyle,
) -> Result<Vec<EditOperation>, EditError>
where
    A: NativeAddressing + ?Sized,
{
    if text_style.is_empty() && paragraph_style.is_empty() {
        return Err(EditError::invalid("No formatting options specified."));
    }

    let mut operations = Vec::new();
    for occurrence in occurrences {
        let range = target.to_native_range(occurrence)?;
        if !text_style.is_empty() {
            operations.push(EditOperation::FormatRange {
                start: range.start,
                end: range.end,
                style: FormatStyle::Text(text_style.clone()),
            });
        }
        if !paragraph_style.is_empty() {
            operations.push(EditOperation::FormatRange {
                start: range.start,
                end: range.end,
                style: FormatStyle::Paragraph(paragraph_style.clone()),
            });
        }
    }
    Ok(operations)
}

// ============================================================================
// RAW BATCHES
// ============================================================================

/// A client-supplied operation in flat character indices.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BatchOperation {
    Insert {
        index: usize,
        text: String,
    },
    Delete {
        #[serde(rename = "startIndex")]
        start_index: usize,
        #[serde(rename = "endIndex")]
        end_index: usize,
    },
    Format {
        #[serde(rename = "startIndex")]
        start_index: usize,
        #[serde(rename = "endIndex")]
        end_index: usize,
        #[serde(default)]
        bold: Option<bool>,
        #[serde(default)]
        italic: Option<bool>,
        #[serde(default)]
        underline: Option<bool>,
    },
}

/// Map raw operations to native ones with the +1 body convention. Format
/// operations without any style set are dropped.
pub fn plan_batch(operations: &[BatchOperation]) -> Result<Vec<EditOperation>, EditError> {
    let native = |index: usize| index + DOC_BODY_BASE_INDEX;
    let check = |start: usize, end: usize| {
        if start >= end {
            Err(EditError::invalid(format!(
                "Invalid range {}-{}: startIndex must be below endIndex.",
                start, end
            )))
        } else {
            Ok(())
        }
    };

    let mut planned = Vec::with_capacity(operations.len());
    for operation in operations {
        match operation {
            BatchOperation::Insert { index, text } => {
                if text.is_empty() {
                    continue;
                }
                planned.push(EditOperation::Insert {
                    index: native(*index),
                    text: text.clone(),
                });
            }
            BatchOperation::Delete {
                start_index,
                end_index,
            } => {
                check(*start_index, *end_index)?;
                planned.push(EditOperation::Delete {
                    start: native(*start_index),
                    end: native(*end_index),
                });
            }
            BatchOperation::Format {
                start_index,
                end_index,
                bold,
                italic,
                underline,
            } => {
                check(*start_index, *end_index)?;
                let style = TextStyle {
                    bold: *bold,
                    italic: *italic,
                    underline: *underline,
                    ..Default::default()
                };
                if style.is_empty() {
                    continue;
                }
                planned.push(EditOperation::FormatRange {
                    start: native(*start_index),
                    end: native(*end_index),
                    style: FormatStyle::Text(style),
                });
            }
        }
    }

    if planned.is_empty() {
        return Err(EditError::invalid("No valid operations provided."));
    }
    Ok(planned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::editing::edit_errors::ErrorKind;
    use crate::core::editing::occurrence_finder::find_all;
    use crate::core::editing::text_indexer::{flatten, Body, StructuralElement};

    fn doc(paragraphs: &[&str]) -> FlattenedText {
        flatten(&Body::new(
            paragraphs
                .iter()
                .map(|p| StructuralElement::paragraph(p))
                .collect(),
        ))
    }

    #[test]
    fn test_replace_all_plans_descending_delete_insert_pairs() {
        let flat = doc(&["cat and cat\n"]);
        let planned = plan_substitution(
            &flat,
            &EditTarget::Document,
            &Substitution::new("cat", "dog", true),
        )
        .unwrap();

        assert_eq!(planned.replacements, 2);
        assert_eq!(
            planned.plan,
            SubstitutionPlan::Operations(vec![
                EditOperation::Delete { start: 9, end: 12 },
                EditOperation::Insert {
                    index: 9,
                    text: "dog".to_string()
                },
                EditOperation::Delete { start: 1, end: 4 },
                EditOperation::Insert {
                    index: 1,
                    text: "dog".to_string()
                },
            ])
        );
    }

    #[test]
    fn test_ambiguous_without_replace_all() {
        let flat = doc(&["cat and cat\n"]);
        let err = plan_substitution(
            &flat,
            &EditTarget::Document,
            &Substitution::new("cat", "dog", false),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AmbiguousMatch);
        assert_eq!(err.match_count(), Some(2));
    }

    #[test]
    fn test_earlier_operations_keep_original_addresses() {
        // Occurrences at flat 2 and 10 in a 20-char text.
        let flat = doc(&["..ab......ab........"]);
        let occurrences = find_all(flat.text(), "ab").unwrap();
        assert_eq!(occurrences[0].flat_start, 2);
        assert_eq!(occurrences[1].flat_start, 10);

        let operations = plan(&occurrences, &flat, "XYZW").unwrap();
        // The offset-10 pair comes first and is computed from original offsets.
        assert_eq!(operations[0], EditOperation::Delete { start: 11, end: 13 });
        assert_eq!(operations[2], EditOperation::Delete { start: 3, end: 5 });

        // Apply in order to a model of the native text: index 0 is the
        // document-start marker.
        let mut native: Vec<char> = format!("^{}", flat.text()).chars().collect();
        for operation in &operations {
            match operation {
                EditOperation::Delete { start, end } => {
                    native.drain(*start..*end);
                }
                EditOperation::Insert { index, text } => {
                    for (i, c) in text.chars().enumerate() {
                        native.insert(index + i, c);
                    }
                }
                EditOperation::FormatRange { .. } => {}
            }
        }
        let result: String = native.into_iter().skip(1).collect();
        assert_eq!(result, "..XYZW......XYZW........");
    }

    #[test]
    fn test_empty_replacement_only_deletes() {
        let flat = doc(&["remove me please\n"]);
        let planned = plan_substitution(
            &flat,
            &EditTarget::Document,
            &Substitution::new("me ", "", false),
        )
        .unwrap();
        assert_eq!(
            planned.plan,
            SubstitutionPlan::Operations(vec![EditOperation::Delete { start: 8, end: 11 }])
        );
    }

    #[test]
    fn test_plan_inline_splices_every_occurrence() {
        let occurrences = vec![
            Occurrence {
                flat_start: 0,
                flat_end: 3,
            },
            Occurrence {
                flat_start: 8,
                flat_end: 11,
            },
        ];
        assert_eq!(plan_inline("foo-bar-foo", &occurrences, "baz"), "baz-bar-baz");
    }

    #[test]
    fn test_plan_inline_single_occurrence_matches_first_replace() {
        let occurrences = find_all("a-b", "b").unwrap();
        assert_eq!(plan_inline("a-b", &occurrences, ""), "a-");
    }

    #[test]
    fn test_insert_positions() {
        let flat = doc(&["Hello world\n"]);

        assert_eq!(resolve_insert_index(&flat, &InsertPosition::End).unwrap(), 12);
        assert_eq!(
            resolve_insert_index(&flat, &InsertPosition::Index(5)).unwrap(),
            6
        );
        assert_eq!(
            resolve_insert_index(&flat, &InsertPosition::After("Hello".to_string())).unwrap(),
            6
        );

        let missing = resolve_insert_index(&flat, &InsertPosition::After("nope".to_string()))
            .unwrap_err();
        assert_eq!(missing.kind(), ErrorKind::NotFound);

        let out_of_range =
            resolve_insert_index(&flat, &InsertPosition::Index(40)).unwrap_err();
        assert_eq!(out_of_range.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_anchor_takes_first_match_without_uniqueness() {
        let flat = doc(&["x y x\n"]);
        let index =
            resolve_insert_index(&flat, &InsertPosition::After("x".to_string())).unwrap();
        assert_eq!(index, 2);
    }

    #[test]
    fn test_plan_insert_rejects_empty_text() {
        let flat = doc(&["Hello\n"]);
        assert!(plan_insert(&flat, &InsertPosition::End, "").is_err());
        assert_eq!(
            plan_insert(&flat, &InsertPosition::End, "!").unwrap(),
            vec![EditOperation::Insert {
                index: 6,
                text: "!".to_string()
            }]
        );
    }

    #[test]
    fn test_plan_format_covers_all_occurrences() {
        let flat = doc(&["todo: a, todo: b\n"]);
        let occurrences = find_all(flat.text(), "todo").unwrap();
        let bold = TextStyle {
            bold: Some(true),
            ..Default::default()
        };
        let operations =
            plan_format(&occurrences, &flat, &bold, &ParagraphStyle::default()).unwrap();
        assert_eq!(operations.len(), 2);
        assert!(matches!(
            operations[1],
            EditOperation::FormatRange { start: 10, end: 14, .. }
        ));

        let err = plan_format(
            &occurrences,
            &flat,
            &TextStyle::default(),
            &ParagraphStyle::default(),
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "No formatting options specified.");
    }

    #[test]
    fn test_plan_batch_shifts_indices_and_drops_empty_formats() {
        let operations: Vec<BatchOperation> = serde_json::from_value(serde_json::json!([
            { "type": "insert", "index": 0, "text": "Hi " },
            { "type": "delete", "startIndex": 4, "endIndex": 8 },
            { "type": "format", "startIndex": 0, "endIndex": 2 },
            { "type": "format", "startIndex": 0, "endIndex": 2, "italic": true }
        ]))
        .unwrap();

        let planned = plan_batch(&operations).unwrap();
        assert_eq!(planned.len(), 3);
        assert_eq!(
            planned[0],
            EditOperation::Insert {
                index: 1,
                text: "Hi ".to_string()
            }
        );
        assert_eq!(planned[1], EditOperation::Delete { start: 5, end: 9 });
    }

    #[test]
    fn test_plan_batch_rejects_empty_and_inverted() {
        assert_eq!(
            plan_batch(&[]).unwrap_err().to_string(),
            "No valid operations provided."
        );
        let inverted = [BatchOperation::Delete {
            start_index: 5,
            end_index: 5,
        }];
        assert!(plan_batch(&inverted).is_err());
    }
}
