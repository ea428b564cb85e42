pub mod edit_errors;
pub mod edit_planner;
pub mod occurrence_finder;
pub mod range_addressing;
pub mod section_model;
pub mod styles;
pub mod text_indexer;

pub use edit_errors::{ApiError, EditError, EditTarget, ErrorKind};
pub use edit_planner::{
    plan_substitution, BatchOperation, EditOperation, FormatStyle, InsertPosition,
    PlannedSubstitution, Substitution, SubstitutionPlan,
};
pub use occurrence_finder::{find_all, find_all_where, select_targets, Occurrence};
pub use range_addressing::{column_to_index, parse_a1, A1Range};
pub use section_model::{Section, SectionIdentifier, SectionMove, SectionTarget};
pub use styles::{Alignment, NamedStyle, ParagraphStyle, RgbColor, TextStyle};
pub use text_indexer::{
    flatten, Body, FlattenedText, NativeAddressing, NativeRange, StructuralElement,
};
