//! Contract tests for the row executor.
//!
//! These tests verify the execution contracts:
//! - Null inputs never reach the operation
//! - Strict execution stops at the first row error
//! - Try-mode casts visit every row and annotate failures

use vexec::adapter::{Primitive, Struct, Varchar};
use vexec::executor::{CastMode, ErrorPolicy, ExecutionStats, Executor, RowError};
use vexec::types::LogicalType;
use vexec::vector::Vector;
use vexec::VexecError;

use crate::double_tiny;

fn numbers(n: usize, failing: usize) -> Vector {
    let values: Vec<Option<i32>> = (0..n)
        .map(|i| Some(if i == failing { -1 } else { i as i32 }))
        .collect();
    Vector::from_values(&values)
}

#[test]
fn test_null_inputs_never_invoke_operation() {
    // Contract: if any input is null the operation is not called and the row is null
    let left = Vector::from_values(&[None, Some(2_i32), Some(3), None]);
    let right = Vector::from_strings(&[Some("a"), None, Some("c"), None]);
    let mut output = Vector::new(LogicalType::varchar(), 4);
    let mut seen = Vec::new();

    Executor::new(ErrorPolicy::Strict)
        .execute_binary::<Primitive<i32>, Varchar, Varchar, _>(&left, &right, &mut output, 4, |n, s| {
            seen.push(n);
            Ok(Some(format!("{n}{}", s.to_str()?)))
        })
        .unwrap();

    assert_eq!(seen, vec![3]);
    assert!(!output.is_valid(0));
    assert!(!output.is_valid(1));
    assert_eq!(output.string_at(2).unwrap(), "3c");
    assert!(!output.is_valid(3));
}

#[test]
fn test_null_struct_input_never_invokes_operation() {
    // Contract: null propagation holds for struct-typed inputs too
    let input = Vector::from_struct(
        vec![
            ("v1".to_string(), Vector::from_values(&[Some(1_u8), Some(2)])),
            ("v2".to_string(), Vector::from_values(&[Some(10_u8), Some(20)])),
        ],
        Some(&[false, true]),
    )
    .unwrap();
    let mut output = Vector::new(LogicalType::utinyint(), 2);
    let mut calls = 0;

    Executor::new(ErrorPolicy::Strict)
        .execute_unary::<Struct<(Primitive<u8>, Primitive<u8>)>, Primitive<u8>, _>(
            &input,
            &mut output,
            2,
            |(a, b)| {
                calls += 1;
                Ok(Some(a + b))
            },
        )
        .unwrap();

    assert_eq!(calls, 1);
    assert!(!output.is_valid(0));
    assert_eq!(output.values::<u8>().unwrap()[1], 22);
}

#[test]
fn test_null_struct_input_never_invokes_binary_operation() {
    // Contract: a null struct row on either side of a binary operation nulls the output
    let pairs = Vector::from_struct(
        vec![
            ("v1".to_string(), Vector::from_values(&[Some(1_i32), Some(2), Some(3), Some(4)])),
            ("v2".to_string(), Vector::from_strings(&[Some("a"), Some("b"), Some("c"), Some("d")])),
        ],
        Some(&[true, false, true, true]),
    )
    .unwrap();
    let scale = Vector::from_values(&[Some(10_i32), Some(20), None, Some(40)]);
    let mut output = Vector::new(LogicalType::varchar(), 4);
    let mut seen = Vec::new();

    Executor::new(ErrorPolicy::Strict)
        .execute_binary::<Struct<(Primitive<i32>, Varchar)>, Primitive<i32>, Varchar, _>(
            &pairs,
            &scale,
            &mut output,
            4,
            |(n, label), factor| {
                seen.push(n);
                Ok(Some(format!("{}={}", label.to_str()?, n * factor)))
            },
        )
        .unwrap();

    assert_eq!(seen, vec![1, 4]);
    assert_eq!(output.string_at(0).unwrap(), "a=10");
    assert!(!output.is_valid(1));
    assert!(!output.is_valid(2));
    assert_eq!(output.string_at(3).unwrap(), "d=160");
}

#[test]
fn test_strict_abort_stops_at_failing_row() {
    // Contract: rows 0..=k are visited, rows after k never are
    for failing in 1..7 {
        let input = numbers(8, failing);
        let mut output = Vector::new(LogicalType::integer(), 8);
        let mut executor = Executor::new(ErrorPolicy::Strict);
        let mut calls = 0;

        let result = executor.execute_unary::<Primitive<i32>, Primitive<i32>, _>(
            &input,
            &mut output,
            8,
            |value| {
                calls += 1;
                if value < 0 {
                    Err(RowError::new("negative value"))
                } else {
                    Ok(Some(value + 100))
                }
            },
        );

        assert!(matches!(result, Err(VexecError::RowFailed { row, .. }) if row == failing));
        assert_eq!(calls, failing + 1);
        assert!(!executor.success());
        assert_eq!(executor.stats().rows_visited, failing + 1);
        assert_eq!(executor.failure().unwrap().message, "negative value");
        assert_eq!(output.values::<i32>().unwrap()[failing - 1], (failing - 1) as i32 + 100);
    }
}

#[test]
fn test_try_mode_visits_every_row() {
    // Contract: best-effort continues past errors and records them per row
    let input = numbers(8, 4);
    let mut output = Vector::new(LogicalType::integer(), 8);
    let mut executor = Executor::new(ErrorPolicy::Cast(CastMode::Try));
    let mut calls = 0;

    executor
        .execute_unary::<Primitive<i32>, Primitive<i32>, _>(&input, &mut output, 8, |value| {
            calls += 1;
            if value < 0 {
                Err(RowError::new("negative value"))
            } else {
                Ok(Some(value))
            }
        })
        .unwrap();

    assert_eq!(calls, 8);
    assert!(executor.success());
    assert_eq!(
        executor.stats(),
        ExecutionStats {
            rows_visited: 8,
            null_rows: 0,
            error_rows: 1
        }
    );
    assert_eq!(output.row_errors().len(), 1);
    assert_eq!(output.row_errors()[0].row, 4);
    assert!(!output.is_valid(4));
    assert_eq!(output.values::<i32>().unwrap()[7], 7);
}

#[test]
fn test_normal_cast_behaves_like_strict_but_annotates() {
    // Contract: non-try casts abort on the first error and still annotate the row
    let input = numbers(5, 2);
    let mut output = Vector::new(LogicalType::integer(), 5);
    let mut executor = Executor::new(ErrorPolicy::Cast(CastMode::Normal));

    let result = executor.execute_unary::<Primitive<i32>, Primitive<i32>, _>(
        &input,
        &mut output,
        5,
        |value| {
            if value < 0 {
                Err(RowError::new("negative value"))
            } else {
                Ok(Some(value))
            }
        },
    );

    assert!(result.is_err());
    assert!(!executor.success());
    assert_eq!(executor.stats().rows_visited, 3);
    assert_eq!(output.row_errors()[0].row, 2);
}

#[test]
fn test_row_count_bounds_checked_before_loop() {
    // Contract: asking for more rows than a vector holds fails before any row runs
    let input = Vector::from_values(&[Some(1_u8), Some(2)]);
    let mut output = Vector::new(LogicalType::utinyint(), 2);
    let mut executor = Executor::new(ErrorPolicy::Strict);

    let err = executor
        .execute_unary::<Primitive<u8>, Primitive<u8>, _>(&input, &mut output, 3, double_tiny)
        .unwrap_err();

    assert!(err.is_contract_violation());
    assert_eq!(executor.stats().rows_visited, 0);
}

#[test]
fn test_zero_rows_is_a_successful_batch() {
    let input = Vector::from_values::<u8>(&[]);
    let mut output = Vector::new(LogicalType::utinyint(), 0);
    let mut executor = Executor::new(ErrorPolicy::Strict);

    executor
        .execute_unary::<Primitive<u8>, Primitive<u8>, _>(&input, &mut output, 0, double_tiny)
        .unwrap();

    assert!(executor.success());
    assert_eq!(executor.stats(), ExecutionStats::default());
}
