// Flattens a structured document body into one searchable string and keeps
// a segment map from flat (byte) offsets back to native Docs indices.
//
// Native indices count UTF-16 code units, the way the Docs API does. Flat
// offsets are byte offsets into `FlattenedText::text`, so every match found by
// a literal search lands on a char boundary.

use super::edit_errors::EditError;
use super::occurrence_finder::Occurrence;
use super::styles::NamedStyle;

/// Structural index 0 is the document-start marker; body content starts at 1.
pub const DOC_BODY_BASE_INDEX: usize = 1;

// ============================================================================
// DOCUMENT BODY MODEL
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Body {
    pub content: Vec<StructuralElement>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructuralElement {
    /// API `startIndex`, when the source provides one.
    pub start_index: Option<usize>,
    pub end_index: Option<usize>,
    pub kind: ElementKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ElementKind {
    Paragraph(Paragraph),
    Table(Table),
    /// Section breaks, tables of contents and anything else without text we edit.
    Other,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Paragraph {
    pub runs: Vec<TextRun>,
    pub named_style: NamedStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub start_index: Option<usize>,
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    /// Rows of cells; each cell is itself a body.
    pub rows: Vec<Vec<Body>>,
}

impl Paragraph {
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.content.as_str()).collect()
    }
}

impl StructuralElement {
    /// A normal-text paragraph with one run and no API indices.
    pub fn paragraph(text: &str) -> Self {
        Self::styled(text, NamedStyle::NormalText)
    }

    pub fn styled(text: &str, named_style: NamedStyle) -> Self {
        Self {
            start_index: None,
            end_index: None,
            kind: ElementKind::Paragraph(Paragraph {
                runs: vec![TextRun {
                    start_index: None,
                    content: text.to_string(),
                }],
                named_style,
            }),
        }
    }

    pub fn table(rows: Vec<Vec<Body>>) -> Self {
        Self {
            start_index: None,
            end_index: None,
            kind: ElementKind::Table(Table { rows }),
        }
    }

    /// Pin the element (and its first run) to explicit API indices.
    pub fn at(mut self, start: usize, end: usize) -> Self {
        self.start_index = Some(start);
        self.end_index = Some(end);
        if let ElementKind::Paragraph(paragraph) = &mut self.kind {
            if let Some(run) = paragraph.runs.first_mut() {
                run.start_index = Some(start);
            }
        }
        self
    }

    pub fn as_paragraph(&self) -> Option<&Paragraph> {
        match &self.kind {
            ElementKind::Paragraph(p) => Some(p),
            _ => None,
        }
    }
}

impl Body {
    pub fn new(content: Vec<StructuralElement>) -> Self {
        Self { content }
    }
}

// ============================================================================
// FLATTENED TEXT
// ============================================================================

/// A run of matchable text and where it lives natively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub native_start: usize,
    pub native_end: usize,
    pub flat_start: usize,
    pub flat_end: usize,
}

/// Native and flat extent of one top-level body element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementSpan {
    /// Position of the element in `Body::content`.
    pub element: usize,
    pub native_start: usize,
    pub native_end: usize,
    pub flat_start: usize,
    pub flat_end: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlattenedText {
    text: String,
    segments: Vec<Segment>,
    elements: Vec<ElementSpan>,
    body_end: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeRange {
    pub start: usize,
    pub end: usize,
}

/// Translates flat-text matches into a target system's own addressing.
///
/// Implemented once per target: the Docs range adapter (`FlattenedText`), the
/// Sheets cell adapter and the script file adapter.
pub trait NativeAddressing {
    /// The text occurrences are searched in.
    fn searchable_text(&self) -> &str;

    fn to_native_range(&self, occurrence: &Occurrence) -> Result<NativeRange, EditError>;

    /// Whole-value targets are rewritten by splicing rather than by range operations.
    fn is_whole_value_target(&self) -> bool;

    /// Whether a match may be edited at all.
    fn accepts(&self, _occurrence: &Occurrence) -> bool {
        true
    }
}

pub fn utf16_len(text: &str) -> usize {
    text.encode_utf16().count()
}

pub fn flatten(body: &Body) -> FlattenedText {
    let mut flattener = Flattener {
        text: String::new(),
        segments: Vec::new(),
        cursor: DOC_BODY_BASE_INDEX,
    };
    let mut elements = Vec::with_capacity(body.content.len());

    for (position, element) in body.content.iter().enumerate() {
        if let Some(start) = element.start_index {
            flattener.cursor = start;
        }
        let native_start = flattener.cursor;
        let flat_start = flattener.text.len();

        flattener.element(element);

        let native_end = element.end_index.unwrap_or(flattener.cursor);
        flattener.cursor = native_end;
        elements.push(ElementSpan {
            element: position,
            native_start,
            native_end,
            flat_start,
            flat_end: flattener.text.len(),
        });
    }

    let body_end = elements
        .last()
        .map(|span| span.native_end)
        .unwrap_or(DOC_BODY_BASE_INDEX);

    FlattenedText {
        text: flattener.text,
        segments: flattener.segments,
        elements,
        body_end,
    }
}

struct Flattener {
    text: String,
    segments: Vec<Segment>,
    cursor: usize,
}

impl Flattener {
    fn element(&mut self, element: &StructuralElement) {
        match &element.kind {
            ElementKind::Paragraph(paragraph) => {
                for run in &paragraph.runs {
                    self.run(run);
                }
            }
            ElementKind::Table(table) => {
                for row in &table.rows {
                    for cell in row {
                        for nested in &cell.content {
                            if let Some(start) = nested.start_index {
                                self.cursor = start;
                            }
                            self.element(nested);
                            if let Some(end) = nested.end_index {
                                self.cursor = end;
                            }
                        }
                        self.text.push('\t');
                    }
                    self.text.push('\n');
                }
            }
            ElementKind::Other => {}
        }
    }

    fn run(&mut self, run: &TextRun) {
        let native_start = run.start_index.unwrap_or(self.cursor);
        let native_end = native_start + utf16_len(&run.content);
        if !run.content.is_empty() {
            let flat_start = self.text.len();
            self.text.push_str(&run.content);
            self.segments.push(Segment {
                native_start,
                native_end,
                flat_start,
                flat_end: self.text.len(),
            });
        }
        self.cursor = native_end;
    }
}

impl FlattenedText {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn elements(&self) -> &[ElementSpan] {
        &self.elements
    }

    /// `endIndex` of the last body element, the document's terminal index.
    pub fn body_end(&self) -> usize {
        self.body_end
    }

    /// Last index text may be inserted at: just before the trailing newline.
    pub fn end_insert_index(&self) -> usize {
        self.body_end.saturating_sub(1).max(DOC_BODY_BASE_INDEX)
    }

    pub fn flat_slice(&self, flat_start: usize, flat_end: usize) -> &str {
        self.text.get(flat_start..flat_end).unwrap_or("")
    }

    /// Native index of a flat offset. `at_end` picks the segment the offset
    /// closes rather than the one it opens.
    pub fn native_at(&self, offset: usize, at_end: bool) -> Option<usize> {
        let position = if at_end {
            self.segments.partition_point(|s| s.flat_end < offset)
        } else {
            self.segments.partition_point(|s| s.flat_end <= offset)
        };
        let segment = self.segments.get(position)?;
        let inside = if at_end {
            segment.flat_start < offset && offset <= segment.flat_end
        } else {
            segment.flat_start <= offset && offset < segment.flat_end
        };
        if !inside {
            return None;
        }
        let prefix = self.text.get(segment.flat_start..offset)?;
        Some(segment.native_start + utf16_len(prefix))
    }

    /// True when `[flat_start, flat_end)` is covered by contiguous segments,
    /// i.e. it does not touch a table separator.
    pub fn is_addressable(&self, flat_start: usize, flat_end: usize) -> bool {
        if flat_start >= flat_end {
            return false;
        }
        let mut position = self.segments.partition_point(|s| s.flat_end <= flat_start);
        let Some(first) = self.segments.get(position) else {
            return false;
        };
        if first.flat_start > flat_start {
            return false;
        }
        let mut reached = first.flat_end;
        while reached < flat_end {
            position += 1;
            match self.segments.get(position) {
                Some(next) if next.flat_start == reached => reached = next.flat_end,
                _ => return false,
            }
        }
        true
    }
}

impl NativeAddressing for FlattenedText {
    fn searchable_text(&self) -> &str {
        &self.text
    }

    fn to_native_range(&self, occurrence: &Occurrence) -> Result<NativeRange, EditError> {
        let start = self.native_at(occurrence.flat_start, false);
        let end = self.native_at(occurrence.flat_end, true);
        match (start, end) {
            (Some(start), Some(end)) => Ok(NativeRange { start, end }),
            _ => Err(EditError::invalid(format!(
                "Matched text at offset {} cannot be addressed in the document.",
                occurrence.flat_start
            ))),
        }
    }

    fn is_whole_value_target(&self) -> bool {
        false
    }

    fn accepts(&self, occurrence: &Occurrence) -> bool {
        self.is_addressable(occurrence.flat_start, occurrence.flat_end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(text: &str) -> Body {
        Body::new(vec![StructuralElement::paragraph(text)])
    }

    #[test]
    fn test_empty_body_flattens_to_nothing() {
        let flat = flatten(&Body::default());
        assert_eq!(flat.text(), "");
        assert!(flat.segments().is_empty());
        assert_eq!(flat.end_insert_index(), DOC_BODY_BASE_INDEX);
    }

    #[test]
    fn test_flatten_is_idempotent() {
        let body = Body::new(vec![
            StructuralElement::paragraph("Hello world\n"),
            StructuralElement::table(vec![vec![cell("a\n"), cell("b\n")]]),
        ]);
        assert_eq!(flatten(&body), flatten(&body));
    }

    #[test]
    fn test_plain_body_uses_plus_one_convention() {
        let body = Body::new(vec![StructuralElement::paragraph("Hello world\n")]);
        let flat = flatten(&body);

        let occurrence = Occurrence {
            flat_start: 6,
            flat_end: 11,
        };
        let range = flat.to_native_range(&occurrence).unwrap();
        assert_eq!(range, NativeRange { start: 7, end: 12 });
        assert_eq!(flat.body_end(), 13);
        assert_eq!(flat.end_insert_index(), 12);
    }

    #[test]
    fn test_api_indices_override_the_cursor() {
        let body = Body::new(vec![
            StructuralElement {
                start_index: Some(0),
                end_index: Some(1),
                kind: ElementKind::Other,
            },
            StructuralElement::paragraph("Intro\n").at(1, 7),
            StructuralElement::paragraph("Later\n").at(40, 46),
        ]);
        let flat = flatten(&body);
        assert_eq!(flat.text(), "Intro\nLater\n");

        let later = Occurrence {
            flat_start: 6,
            flat_end: 11,
        };
        assert_eq!(
            flat.to_native_range(&later).unwrap(),
            NativeRange { start: 40, end: 45 }
        );
        assert_eq!(flat.body_end(), 46);
    }

    #[test]
    fn test_native_offsets_count_utf16_units() {
        // The emoji is 4 bytes and 2 UTF-16 code units.
        let body = Body::new(vec![StructuralElement::paragraph("😀 done\n")]);
        let flat = flatten(&body);
        let start = flat.text().find("done").unwrap();
        let occurrence = Occurrence {
            flat_start: start,
            flat_end: start + 4,
        };
        assert_eq!(
            flat.to_native_range(&occurrence).unwrap(),
            NativeRange { start: 4, end: 8 }
        );
    }

    #[test]
    fn test_table_separators_are_not_addressable() {
        let body = Body::new(vec![StructuralElement::table(vec![vec![
            cell("left"),
            cell("right"),
        ]])]);
        let flat = flatten(&body);
        assert_eq!(flat.text(), "left\tright\t\n");

        assert!(flat.is_addressable(0, 4));
        assert!(!flat.is_addressable(2, 7));
        assert!(!flat.accepts(&Occurrence {
            flat_start: 4,
            flat_end: 5
        }));
    }

    #[test]
    fn test_element_spans_follow_body_order() {
        let body = Body::new(vec![
            StructuralElement::paragraph("One\n"),
            StructuralElement::paragraph("Two\n"),
        ]);
        let flat = flatten(&body);
        let spans = flat.elements();
        assert_eq!(spans.len(), 2);
        assert_eq!((spans[0].native_start, spans[0].native_end), (1, 5));
        assert_eq!((spans[1].native_start, spans[1].native_end), (5, 9));
        assert_eq!(flat.flat_slice(spans[1].flat_start, spans[1].flat_end), "Two\n");
    }
}
