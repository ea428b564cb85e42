// Heading-delimited sections of a document body.
//
// Sections are derived on every call and never stored: their indices are only
// valid against the body they were computed from.

use super::edit_errors::EditError;
use super::edit_planner::EditOperation;
use super::styles::NamedStyle;
use super::text_indexer::{flatten, Body, ElementKind, FlattenedText, DOC_BODY_BASE_INDEX};

/// Where a section's heading came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingSource {
    Named(NamedStyle),
    /// A paragraph starting with `#` marks.
    Markdown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub name: String,
    /// 0 for title/subtitle, 1-6 for heading depth.
    pub level: u8,
    pub start_index: usize,
    /// Exclusive: the next heading's start, or the end of the body.
    pub end_index: usize,
    /// End of the heading paragraph itself.
    pub heading_end_index: usize,
    /// Position in the derived list; not stable across edits.
    pub ordinal: usize,
    pub heading: HeadingSource,
}

/// How a caller names a section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionIdentifier {
    Ordinal(usize),
    /// Matched case-insensitively.
    Name(String),
}

/// Where a section should be moved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionTarget {
    Start,
    End,
    /// Before the section currently at this ordinal; `len` means the end.
    Ordinal(usize),
    /// Before the named section.
    Name(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SectionEdit {
    pub section: Section,
    pub operations: Vec<EditOperation>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SectionMove {
    Planned {
        section: Section,
        target_index: usize,
        operations: Vec<EditOperation>,
    },
    /// The target already sits at the section's position.
    Unchanged { section: Section },
}

// ============================================================================
// DERIVATION
// ============================================================================

/// Parse `#`..`######` at the start of the (trimmed) paragraph text.
pub fn markdown_heading(text: &str) -> Option<(u8, String)> {
    let trimmed = text.trim();
    let hashes = trimmed.chars().take_while(|c| *c == '#').count();
    if hashes == 0 {
        return None;
    }
    let level = hashes.min(6);
    Some((level as u8, trimmed[level..].trim().to_string()))
}

pub fn sections(body: &Body) -> Vec<Section> {
    sections_in(body, &flatten(body))
}

fn sections_in(body: &Body, flat: &FlattenedText) -> Vec<Section> {
    let mut found: Vec<Section> = Vec::new();

    for span in flat.elements() {
        let Some(paragraph) = body.content[span.element].as_paragraph() else {
            continue;
        };

        // A named heading style wins over markdown in the text.
        let heading = match paragraph.named_style.heading_level() {
            Some(level) => Some((
                level,
                paragraph.text().trim().to_string(),
                HeadingSource::Named(paragraph.named_style),
            )),
            None => markdown_heading(&paragraph.text())
                .map(|(level, name)| (level, name, HeadingSource::Markdown)),
        };

        if let Some((level, name, source)) = heading {
            if let Some(previous) = found.last_mut() {
                previous.end_index = span.native_start;
            }
            found.push(Section {
                name,
                level,
                start_index: span.native_start,
                end_index: span.native_start,
                heading_end_index: span.native_end,
                ordinal: found.len(),
                heading: source,
            });
        }
    }

    if let Some(last) = found.last_mut() {
        last.end_index = flat.body_end().max(last.start_index + 1);
    }
    found
}

pub fn locate<'a>(
    sections: &'a [Section],
    identifier: &SectionIdentifier,
) -> Result<&'a Section, EditError> {
    match identifier {
        SectionIdentifier::Ordinal(index) => {
            sections
                .get(*index)
                .ok_or(EditError::SectionIndexOutOfRange {
                    index: *index,
                    count: sections.len(),
                })
        }
        SectionIdentifier::Name(name) => {
            let wanted = name.to_lowercase();
            sections
                .iter()
                .find(|s| s.name.to_lowercase() == wanted)
                .ok_or_else(|| EditError::SectionNotFound {
                    identifier: name.clone(),
                    available: sections.iter().map(|s| s.name.clone()).collect(),
                })
        }
    }
}

// ============================================================================
// PLANNING
// ============================================================================

/// Deleting through the terminal newline is rejected by the API.
fn clamp_end(end: usize, body_end: usize) -> usize {
    if end >= body_end {
        body_end.saturating_sub(1)
    } else {
        end
    }
}

fn indexed(body: &Body) -> (FlattenedText, Vec<Section>) {
    let flat = flatten(body);
    let sections = sections_in(body, &flat);
    (flat, sections)
}

pub fn plan_delete_section(
    body: &Body,
    identifier: &SectionIdentifier,
) -> Result<SectionEdit, EditError> {
    let (flat, sections) = indexed(body);
    let section = locate(&sections, identifier)?.clone();

    let end = clamp_end(section.end_index, flat.body_end());
    if section.start_index >= end {
        return Err(EditError::invalid(format!(
            "Section \"{}\" has no deletable content.",
            section.name
        )));
    }

    let operations = vec![EditOperation::Delete {
        start: section.start_index,
        end,
    }];
    Ok(SectionEdit {
        section,
        operations,
    })
}

fn resolve_target(
    flat: &FlattenedText,
    sections: &[Section],
    target: &SectionTarget,
) -> Result<usize, EditError> {
    match target {
        SectionTarget::Start => Ok(DOC_BODY_BASE_INDEX),
        SectionTarget::End => Ok(flat.end_insert_index()),
        SectionTarget::Ordinal(position) => {
            if *position > sections.len() {
                return Err(EditError::invalid(format!(
                    "Target position {} out of range (0-{}).",
                    position,
                    sections.len()
                )));
            }
            if *position == 0 {
                Ok(DOC_BODY_BASE_INDEX)
            } else if *position >= sections.len() {
                Ok(flat.end_insert_index())
            } else {
                Ok(sections[*position].start_index)
            }
        }
        SectionTarget::Name(name) => {
            let found = locate(sections, &SectionIdentifier::Name(name.clone()))?;
            Ok(found.start_index)
        }
    }
}

/// Paragraph text of the section, as it reads in the flattened document.
fn section_text(body: &Body, flat: &FlattenedText, section: &Section) -> Result<String, EditError> {
    let mut text = String::new();
    for span in flat.elements() {
        if span.native_start < section.start_index || span.native_start >= section.end_index {
            continue;
        }
        match &body.content[span.element].kind {
            ElementKind::Paragraph(_) => text.push_str(flat.flat_slice(span.flat_start, span.flat_end)),
            ElementKind::Table(_) => {
                return Err(EditError::invalid(format!(
                    "Section \"{}\" contains a table and cannot be moved as text.",
                    section.name
                )));
            }
            ElementKind::Other => {}
        }
    }
    Ok(text)
}

pub fn plan_move_section(
    body: &Body,
    identifier: &SectionIdentifier,
    target: &SectionTarget,
) -> Result<SectionMove, EditError> {
    let (flat, sections) = indexed(body);
    let section = locate(&sections, identifier)?.clone();
    let target_index = resolve_target(&flat, &sections, target)?;

    if (section.start_index..=section.end_index).contains(&target_index) {
        return Ok(SectionMove::Unchanged { section });
    }

    let mut text = section_text(body, &flat, &section)?;
    if text.is_empty() {
        return Err(EditError::invalid(format!(
            "Section \"{}\" has no text to move.",
            section.name
        )));
    }
    // At the end of the body the insert lands before the last paragraph's
    // newline, so the moved heading needs one of its own in front.
    if target_index == flat.end_insert_index() {
        text = format!("\n{}", text.trim_end_matches('\n'));
    }

    let delete = EditOperation::Delete {
        start: section.start_index,
        end: clamp_end(section.end_index, flat.body_end()),
    };
    let insert = EditOperation::Insert {
        index: target_index,
        text,
    };
    // Whichever edit sits higher in the document goes first so the other
    // one's addresses stay valid.
    let operations = if target_index > section.end_index {
        vec![insert, delete]
    } else {
        vec![delete, insert]
    };

    Ok(SectionMove::Planned {
        section,
        target_index,
        operations,
    })
}

pub fn plan_replace_section(
    body: &Body,
    identifier: &SectionIdentifier,
    content: &str,
    preserve_heading: bool,
) -> Result<SectionEdit, EditError> {
    let (flat, sections) = indexed(body);
    let section = locate(&sections, identifier)?.clone();

    let delete_start = if preserve_heading {
        section.heading_end_index
    } else {
        section.start_index
    };
    let delete_end = clamp_end(section.end_index, flat.body_end());

    let mut operations = Vec::with_capacity(2);
    let insert_at = if delete_start < delete_end {
        operations.push(EditOperation::Delete {
            start: delete_start,
            end: delete_end,
        });
        delete_start
    } else {
        delete_start.min(flat.end_insert_index())
    };
    if !content.is_empty() {
        operations.push(EditOperation::Insert {
            index: insert_at,
            text: content.to_string(),
        });
    }

    if operations.is_empty() {
        return Err(EditError::invalid(format!(
            "Section \"{}\" has no content to replace and no new content was given.",
            section.name
        )));
    }
    Ok(SectionEdit {
        section,
        operations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::editing::edit_errors::ErrorKind;
    use crate::core::editing::text_indexer::StructuralElement;

    /// "# Intro\n" [1,9) "Hello\n" [9,15) "# Plan\n" [15,22) "Steps\n" [22,28)
    fn markdown_doc() -> Body {
        Body::new(vec![
            StructuralElement::paragraph("# Intro\n"),
            StructuralElement::paragraph("Hello\n"),
            StructuralElement::paragraph("# Plan\n"),
            StructuralElement::paragraph("Steps\n"),
        ])
    }

    #[test]
    fn test_sections_partition_between_headings() {
        let body = Body::new(vec![
            StructuralElement::styled("A\n", NamedStyle::Heading(1)).at(0, 2),
            StructuralElement::paragraph("body\n").at(2, 50),
            StructuralElement::styled("B\n", NamedStyle::Heading(2)).at(50, 52),
            StructuralElement::paragraph("body\n").at(52, 120),
            StructuralElement::styled("C\n", NamedStyle::Heading(2)).at(120, 122),
            StructuralElement::paragraph("body\n").at(122, 200),
        ]);
        let found = sections(&body);
        let bounds: Vec<(usize, usize)> =
            found.iter().map(|s| (s.start_index, s.end_index)).collect();
        assert_eq!(bounds, vec![(0, 50), (50, 120), (120, 200)]);
        assert_eq!(found[2].ordinal, 2);
        assert_eq!(found[1].level, 2);
    }

    #[test]
    fn test_markdown_heading_detection() {
        assert_eq!(markdown_heading("## Goals\n"), Some((2, "Goals".to_string())));
        assert_eq!(markdown_heading("  #Tight"), Some((1, "Tight".to_string())));
        assert_eq!(markdown_heading("####### Deep"), Some((6, "# Deep".to_string())));
        assert_eq!(markdown_heading("No heading"), None);
    }

    #[test]
    fn test_named_style_takes_precedence_over_markdown() {
        let body = Body::new(vec![
            StructuralElement::styled("# Odd\n", NamedStyle::Heading(3)),
            StructuralElement::styled("Title\n", NamedStyle::Title),
        ]);
        let found = sections(&body);
        assert_eq!(found[0].level, 3);
        assert_eq!(found[0].name, "# Odd");
        assert_eq!(found[0].heading, HeadingSource::Named(NamedStyle::Heading(3)));
        assert_eq!(found[1].level, 0);
    }

    #[test]
    fn test_locate_by_name_and_ordinal() {
        let found = sections(&markdown_doc());
        assert_eq!(
            locate(&found, &SectionIdentifier::Name("pLaN".to_string()))
                .unwrap()
                .start_index,
            15
        );
        assert_eq!(
            locate(&found, &SectionIdentifier::Ordinal(0)).unwrap().name,
            "Intro"
        );

        let err = locate(&found, &SectionIdentifier::Name("Budget".to_string())).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(err.to_string().ends_with("Available sections: Intro, Plan"));

        let err = locate(&found, &SectionIdentifier::Ordinal(5)).unwrap_err();
        assert_eq!(err.to_string(), "Section index 5 not found. Document has 2 sections.");
    }

    #[test]
    fn test_delete_last_section_stops_before_terminal_newline() {
        let edit =
            plan_delete_section(&markdown_doc(), &SectionIdentifier::Ordinal(1)).unwrap();
        assert_eq!(
            edit.operations,
            vec![EditOperation::Delete { start: 15, end: 27 }]
        );
    }

    #[test]
    fn test_move_towards_start_deletes_first() {
        let moved = plan_move_section(
            &markdown_doc(),
            &SectionIdentifier::Name("Plan".to_string()),
            &SectionTarget::Start,
        )
        .unwrap();
        match moved {
            SectionMove::Planned {
                target_index,
                operations,
                ..
            } => {
                assert_eq!(target_index, 1);
                assert_eq!(
                    operations,
                    vec![
                        EditOperation::Delete { start: 15, end: 27 },
                        EditOperation::Insert {
                            index: 1,
                            text: "# Plan\nSteps\n".to_string()
                        },
                    ]
                );
            }
            SectionMove::Unchanged { .. } => panic!("expected a planned move"),
        }
    }

    #[test]
    fn test_move_towards_end_inserts_first() {
        let moved = plan_move_section(
            &markdown_doc(),
            &SectionIdentifier::Ordinal(0),
            &SectionTarget::End,
        )
        .unwrap();
        match moved {
            SectionMove::Planned { operations, .. } => {
                assert_eq!(
                    operations,
                    vec![
                        EditOperation::Insert {
                            index: 27,
                            text: "\n# Intro\nHello".to_string()
                        },
                        EditOperation::Delete { start: 1, end: 15 },
                    ]
                );
            }
            SectionMove::Unchanged { .. } => panic!("expected a planned move"),
        }
    }

    #[test]
    fn test_moved_section_keeps_its_heading_at_end_of_body() {
        let body = markdown_doc();
        let moved = plan_move_section(&body, &SectionIdentifier::Ordinal(0), &SectionTarget::End)
            .unwrap();
        let SectionMove::Planned { operations, .. } = moved else {
            panic!("expected a planned move");
        };

        // Replay the batch on the flat text; every index here is ASCII.
        let mut text: String = body
            .content
            .iter()
            .filter_map(|e| e.as_paragraph())
            .map(|p| p.text())
            .collect();
        for operation in &operations {
            match operation {
                EditOperation::Insert { index, text: inserted } => {
                    text.insert_str(index - DOC_BODY_BASE_INDEX, inserted)
                }
                EditOperation::Delete { start, end } => {
                    text.replace_range(start - DOC_BODY_BASE_INDEX..end - DOC_BODY_BASE_INDEX, "")
                }
                other => panic!("unexpected operation {:?}", other),
            }
        }
        assert_eq!(text, "# Plan\nSteps\n# Intro\nHello\n");

        let replayed = Body::new(
            text.split_inclusive('\n')
                .map(StructuralElement::paragraph)
                .collect(),
        );
        let names: Vec<String> = sections(&replayed).into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["Plan".to_string(), "Intro".to_string()]);
    }

    #[test]
    fn test_move_to_own_position_is_unchanged() {
        let moved = plan_move_section(
            &markdown_doc(),
            &SectionIdentifier::Ordinal(0),
            &SectionTarget::Ordinal(1),
        )
        .unwrap();
        assert!(matches!(moved, SectionMove::Unchanged { .. }));

        let err = plan_move_section(
            &markdown_doc(),
            &SectionIdentifier::Ordinal(0),
            &SectionTarget::Ordinal(3),
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Target position 3 out of range (0-2).");
    }

    #[test]
    fn test_replace_section_preserving_heading() {
        let edit = plan_replace_section(
            &markdown_doc(),
            &SectionIdentifier::Name("intro".to_string()),
            "Fresh\n",
            true,
        )
        .unwrap();
        assert_eq!(
            edit.operations,
            vec![
                EditOperation::Delete { start: 9, end: 15 },
                EditOperation::Insert {
                    index: 9,
                    text: "Fresh\n".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_replace_whole_section_including_heading() {
        let edit = plan_replace_section(
            &markdown_doc(),
            &SectionIdentifier::Ordinal(1),
            "# Done\n",
            false,
        )
        .unwrap();
        assert_eq!(
            edit.operations[0],
            EditOperation::Delete { start: 15, end: 27 }
        );
    }
}
