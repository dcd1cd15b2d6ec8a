use std::collections::{BTreeSet, HashSet};

use proptest::prelude::*;
use rowguard_model::{ColumnDefinition, ColumnType, ErrorKind, Rule, Schema};
use rowguard_validate::{
    CUSTOM_BASE, ErrorBitmap, ErrorPage, MAX_RULE_CODE, UNIQUE_CODE, ValidationEngine,
};

fn engine() -> ValidationEngine {
    let schema = Schema::new()
        .column(
            ColumnDefinition::new("code", ColumnType::String)
                .rule(Rule::Required)
                .rule(Rule::pattern("^[a-c0-9]+$"))
                .rule(Rule::Unique)
                .rule(Rule::custom(|v: &str| v.len() < 3, "at most two characters")),
        )
        .column(
            ColumnDefinition::new("n", ColumnType::Integer)
                .rule(Rule::min(0.0))
                .rule(Rule::max(50.0)),
        )
        .column(ColumnDefinition::new("flag", ColumnType::Boolean).rule(Rule::Unique));
    ValidationEngine::from_schema(&schema).expect("schema compiles")
}

fn dataset() -> impl Strategy<Value = Vec<Vec<String>>> {
    let cell = prop_oneof![
        "[a-d0-9]{0,3}",
        "-?[0-9]{1,3}",
        Just("true".to_string()),
        Just("no".to_string()),
    ];
    prop::collection::vec(prop::collection::vec(cell, 0..5), 0..40)
}

proptest! {
    /// Every view of the error set agrees on its size.
    #[test]
    fn error_counts_agree(data in dataset()) {
        let engine = engine();
        let result = engine.validate_all_bitmap(&data);
        let errors = result.all_errors();

        prop_assert_eq!(result.error_count(), errors.len());
        prop_assert_eq!(result.bitmap().iter().count(), errors.len());
        prop_assert_eq!(result.is_valid(), errors.is_empty());
        prop_assert_eq!(result.error_summary().values().sum::<usize>(), errors.len());
        prop_assert_eq!(result.column_error_summary().values().sum::<usize>(), errors.len());

        let rows: HashSet<usize> = errors.iter().map(|e| e.row).collect();
        prop_assert_eq!(result.error_row_count(), rows.len());
    }

    /// A bit is set exactly when the stored code is non-zero, and codes stay in their bands.
    #[test]
    fn bitmap_and_code_map_stay_in_step(data in dataset()) {
        let engine = engine();
        let result = engine.validate_all_bitmap(&data);

        for row in 0..result.row_count() {
            for col in 0..result.col_count() {
                let code = result.raw_code(row, col);
                prop_assert_eq!(result.bitmap().has_error(row, col), code != 0);
                prop_assert!(
                    code <= MAX_RULE_CODE || (CUSTOM_BASE..=UNIQUE_CODE).contains(&code),
                    "code {} outside the reserved bands", code
                );
            }
        }
    }

    /// Empty required cells report one `REQUIRED` error and nothing else.
    #[test]
    fn empty_required_cells_report_required(data in dataset()) {
        let engine = engine();
        let result = engine.validate_all_bitmap(&data);

        for (row, cells) in data.iter().enumerate() {
            let empty = cells.first().is_none_or(|value| value.is_empty());
            let error = result.cell_error(row, 0);
            if empty {
                prop_assert_eq!(error.map(|e| e.code), Some(ErrorKind::RequiredMissing));
            } else {
                prop_assert_ne!(error.map(|e| e.code), Some(ErrorKind::RequiredMissing));
            }
        }
    }

    /// Consecutive pages reassemble the full error list.
    #[test]
    fn pages_cover_all_errors(data in dataset(), size in 1usize..7) {
        let engine = engine();
        let result = engine.validate_all_bitmap(&data);
        let all = result.all_errors();

        let mut paged = Vec::new();
        let mut offset = 0;
        loop {
            let page = result.errors(ErrorPage::new(offset, size));
            if page.is_empty() {
                break;
            }
            prop_assert!(page.len() <= size);
            offset += page.len();
            paged.extend(page);
        }
        prop_assert_eq!(paged, all);
    }

    /// Storage size depends only on the matrix shape.
    #[test]
    fn memory_follows_shape(data in dataset()) {
        let engine = engine();
        let result = engine.validate_all_bitmap(&data);
        let cells = data.len() * 3;
        let usage = result.memory_usage();

        prop_assert_eq!(usage.bitmap_bytes, cells.div_ceil(32) * 4);
        prop_assert_eq!(usage.code_map_bytes, cells);
        prop_assert_eq!(usage.total_bytes, usage.bitmap_bytes + usage.code_map_bytes);
    }

    /// Re-running on the same data gives the same answer.
    #[test]
    fn validation_is_repeatable(data in dataset()) {
        let engine = engine();
        let first = engine.validate_all(&data);
        let second = engine.validate_all(&data);
        prop_assert_eq!(first, second);
    }

    /// Iteration yields exactly the set cells, ascending.
    #[test]
    fn bitmap_iteration_matches_set_cells(
        rows in 0usize..20,
        cols in 1usize..9,
        picks in prop::collection::vec((0usize..20, 0usize..9), 0..60),
    ) {
        let mut bitmap = ErrorBitmap::new(rows, cols);
        let mut expected = BTreeSet::new();
        for (row, col) in picks {
            if row < rows && col < cols {
                bitmap.set_error(row, col);
                expected.insert(row * cols + col);
            }
        }

        prop_assert_eq!(bitmap.count_errors(), expected.len());
        prop_assert_eq!(bitmap.iter().collect::<Vec<_>>(), expected.into_iter().collect::<Vec<_>>());
    }
}
