// Google Sheets cell editing.
//
// A cell is a whole-value target: the engine splices the replacement into
// the cell's text and the whole value is written back. Edits read cells with
// formulas unrendered so writing the value back never flattens a formula.

use async_trait::async_trait;
use serde_json::Value;

use crate::core::auth::Credential;
use crate::core::editing::edit_planner::plan_inline;
use crate::core::editing::{
    find_all, parse_a1, plan_substitution, select_targets, A1Range, ApiError, EditError,
    EditTarget, NativeAddressing, NativeRange, Occurrence, Substitution,
};

/// A cell value as the Sheets API returns it: string, number or boolean.
pub type CellValue = Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueRender {
    /// What the user sees in the grid.
    Formatted,
    /// Formulas as typed; plain values unformatted.
    Formula,
}

/// Content source and applier for Google Sheets values.
#[async_trait]
pub trait SheetsApi: Send + Sync {
    async fn get_values(
        &self,
        credential: &Credential,
        spreadsheet_id: &str,
        range: &str,
        render: ValueRender,
    ) -> Result<Vec<Vec<CellValue>>, ApiError>;

    /// Write values with user-entered semantics, as if typed into the grid.
    async fn update_values(
        &self,
        credential: &Credential,
        spreadsheet_id: &str,
        range: &str,
        values: &[Vec<CellValue>],
    ) -> Result<(), ApiError>;
}

/// Text of a cell, or `None` when the cell is empty.
pub fn cell_text(value: &CellValue) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(if *b { "TRUE" } else { "FALSE" }.to_string()),
        other => Some(other.to_string()),
    }
}

/// One cell's text, addressed by plain offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetCell {
    value: String,
}

impl SheetCell {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

impl NativeAddressing for SheetCell {
    fn searchable_text(&self) -> &str {
        &self.value
    }

    fn to_native_range(&self, occurrence: &Occurrence) -> Result<NativeRange, EditError> {
        Ok(NativeRange {
            start: occurrence.flat_start,
            end: occurrence.flat_end,
        })
    }

    fn is_whole_value_target(&self) -> bool {
        true
    }
}

fn parse_range(range: &str) -> Result<A1Range, EditError> {
    parse_a1(range).ok_or_else(|| EditError::invalid(format!("Invalid range format: {}", range)))
}

fn parse_cell(cell: &str) -> Result<A1Range, EditError> {
    let parsed = parse_range(cell)?;
    if !parsed.is_single_cell() {
        return Err(EditError::invalid(format!(
            "Cell reference must name a single cell: {}",
            cell
        )));
    }
    Ok(parsed)
}

pub struct SheetService<C: SheetsApi> {
    client: C,
}

impl<C: SheetsApi> SheetService<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub async fn read_range(
        &self,
        credential: &Credential,
        spreadsheet_id: &str,
        range: &str,
    ) -> Result<Vec<Vec<CellValue>>, EditError> {
        Ok(self
            .client
            .get_values(credential, spreadsheet_id, range, ValueRender::Formatted)
            .await?)
    }

    pub async fn set_cell(
        &self,
        credential: &Credential,
        spreadsheet_id: &str,
        cell: &str,
        value: CellValue,
    ) -> Result<(), EditError> {
        parse_cell(cell)?;
        self.client
            .update_values(credential, spreadsheet_id, cell, &[vec![value]])
            .await?;
        tracing::info!(spreadsheet_id, cell, "Set cell value");
        Ok(())
    }

    /// Unique-match replacement inside one cell.
    pub async fn edit_cell(
        &self,
        credential: &Credential,
        spreadsheet_id: &str,
        cell: &str,
        substitution: &Substitution,
    ) -> Result<usize, EditError> {
        parse_cell(cell)?;

        let values = self
            .client
            .get_values(credential, spreadsheet_id, cell, ValueRender::Formula)
            .await?;
        let text = values
            .first()
            .and_then(|row| row.first())
            .and_then(cell_text)
            .ok_or_else(|| EditError::EmptyCell {
                cell: cell.to_string(),
            })?;

        let planned = plan_substitution(
            &SheetCell::new(text),
            &EditTarget::Cell(cell.to_string()),
            substitution,
        )?;
        let replacements = planned.replacements;
        let updated = planned
            .plan
            .into_whole_value()
            .ok_or_else(|| EditError::invalid("Cell edits must plan a whole value."))?;

        self.client
            .update_values(
                credential,
                spreadsheet_id,
                cell,
                &[vec![Value::String(updated)]],
            )
            .await?;
        tracing::info!(spreadsheet_id, cell, replacements, "Edited cell");
        Ok(replacements)
    }

    /// Replacement across every cell of a range. Uniqueness is counted over
    /// the whole range, so one match in each of two cells is ambiguous.
    pub async fn edit_range(
        &self,
        credential: &Credential,
        spreadsheet_id: &str,
        range: &str,
        substitution: &Substitution,
    ) -> Result<usize, EditError> {
        parse_range(range)?;
        if substitution.old_text.is_empty() {
            return Err(EditError::invalid("search text must not be empty"));
        }

        let grid = self
            .client
            .get_values(credential, spreadsheet_id, range, ValueRender::Formula)
            .await?;

        let mut hits: Vec<(usize, usize, String, Vec<Occurrence>)> = Vec::new();
        for (r, row) in grid.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                let Some(text) = cell_text(value) else {
                    continue;
                };
                let found = find_all(&text, &substitution.old_text)?;
                if !found.is_empty() {
                    hits.push((r, c, text, found));
                }
            }
        }

        let all: Vec<Occurrence> = hits
            .iter()
            .flat_map(|(_, _, _, found)| found.iter().copied())
            .collect();
        let replacements = select_targets(
            all,
            substitution.replace_all,
            &EditTarget::Range(range.to_string()),
        )?
        .len();

        // Sheets skips null cells on write, so only the edited cells are
        // re-entered and every other cell keeps its stored value.
        let mut updates: Vec<Vec<CellValue>> = grid
            .iter()
            .map(|row| vec![Value::Null; row.len()])
            .collect();
        for (r, c, text, found) in &hits {
            updates[*r][*c] = Value::String(plan_inline(text, found, &substitution.new_text));
        }

        self.client
            .update_values(credential, spreadsheet_id, range, &updates)
            .await?;
        tracing::info!(
            spreadsheet_id,
            range,
            cells = hits.len(),
            replacements,
            "Edited range"
        );
        Ok(replacements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::editing::ErrorKind;
    use serde_json::json;
    use std::sync::Mutex;

    struct MockSheetsApi {
        values: Vec<Vec<CellValue>>,
        written: Mutex<Vec<(String, Vec<Vec<CellValue>>)>>,
    }

    impl MockSheetsApi {
        fn new(values: Vec<Vec<CellValue>>) -> Self {
            Self {
                values,
                written: Mutex::new(Vec::new()),
            }
        }

        fn writes(&self) -> Vec<(String, Vec<Vec<CellValue>>)> {
            self.written.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SheetsApi for MockSheetsApi {
        async fn get_values(
            &self,
            _credential: &Credential,
            _spreadsheet_id: &str,
            _range: &str,
            _render: ValueRender,
        ) -> Result<Vec<Vec<CellValue>>, ApiError> {
            Ok(self.values.clone())
        }

        async fn update_values(
            &self,
            _credential: &Credential,
            _spreadsheet_id: &str,
            range: &str,
            values: &[Vec<CellValue>],
        ) -> Result<(), ApiError> {
            self.written
                .lock()
                .unwrap()
                .push((range.to_string(), values.to_vec()));
            Ok(())
        }
    }

    fn credential() -> Credential {
        Credential::new("token")
    }

    #[test]
    fn test_cell_text_of_api_values() {
        assert_eq!(cell_text(&json!("x")), Some("x".to_string()));
        assert_eq!(cell_text(&json!(4.5)), Some("4.5".to_string()));
        assert_eq!(cell_text(&json!(true)), Some("TRUE".to_string()));
        assert_eq!(cell_text(&json!("")), None);
        assert_eq!(cell_text(&Value::Null), None);
    }

    #[tokio::test]
    async fn test_edit_cell_replaces_unique_match() {
        let service = SheetService::new(MockSheetsApi::new(vec![vec![json!("Total: 10")]]));

        let replaced = service
            .edit_cell(
                &credential(),
                "sheet",
                "Sheet1!B2",
                &Substitution::new("10", "12", false),
            )
            .await
            .unwrap();

        assert_eq!(replaced, 1);
        assert_eq!(
            service.client.writes(),
            vec![("Sheet1!B2".to_string(), vec![vec![json!("Total: 12")]])]
        );
    }

    #[tokio::test]
    async fn test_edit_cell_ambiguous_names_the_cell() {
        let service = SheetService::new(MockSheetsApi::new(vec![vec![json!("a a")]]));

        let err = service
            .edit_cell(&credential(), "sheet", "C3", &Substitution::new("a", "b", false))
            .await
            .unwrap_err();

        assert_eq!(err.match_count(), Some(2));
        assert!(err.to_string().contains("in cell C3"));
        assert!(service.client.writes().is_empty());
    }

    #[tokio::test]
    async fn test_edit_empty_cell_fails() {
        let service = SheetService::new(MockSheetsApi::new(Vec::new()));

        let err = service
            .edit_cell(&credential(), "sheet", "A1", &Substitution::new("a", "b", false))
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Cell A1 is empty. Cannot perform text replacement on empty cell."
        );
    }

    #[tokio::test]
    async fn test_bad_references_are_rejected_before_any_call() {
        let service = SheetService::new(MockSheetsApi::new(Vec::new()));

        let err = service
            .set_cell(&credential(), "sheet", "bad", json!(1))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid range format: bad");

        let err = service
            .set_cell(&credential(), "sheet", "A1:B2", json!(1))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[tokio::test]
    async fn test_edit_range_counts_across_cells() {
        let grid = vec![
            vec![json!("draft"), json!(3)],
            vec![Value::Null, json!("final draft")],
        ];
        let service = SheetService::new(MockSheetsApi::new(grid));

        let err = service
            .edit_range(
                &credential(),
                "sheet",
                "A1:B2",
                &Substitution::new("draft", "v1", false),
            )
            .await
            .unwrap_err();
        assert_eq!(err.match_count(), Some(2));
        assert!(err.to_string().contains("in range A1:B2"));

        let replaced = service
            .edit_range(
                &credential(),
                "sheet",
                "A1:B2",
                &Substitution::new("draft", "v1", true),
            )
            .await
            .unwrap();
        assert_eq!(replaced, 2);

        let (_, written) = &service.client.writes()[0];
        assert_eq!(written[0], vec![json!("v1"), Value::Null]);
        assert_eq!(written[1], vec![Value::Null, json!("final v1")]);
    }

    #[tokio::test]
    async fn test_edit_range_leaves_unmatched_cells_unwritten() {
        let grid = vec![vec![json!("0012"), json!("draft"), json!("=SUM(1,2)")]];
        let service = SheetService::new(MockSheetsApi::new(grid));

        let replaced = service
            .edit_range(
                &credential(),
                "sheet",
                "A1:C1",
                &Substitution::new("draft", "v1", false),
            )
            .await
            .unwrap();
        assert_eq!(replaced, 1);

        let (range, written) = &service.client.writes()[0];
        assert_eq!(range, "A1:C1");
        assert_eq!(written, &vec![vec![Value::Null, json!("v1"), Value::Null]]);
    }
}
