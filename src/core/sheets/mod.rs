pub mod sheet_service;

pub use sheet_service::{CellValue, SheetCell, SheetService, SheetsApi, ValueRender};
