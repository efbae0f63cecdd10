//! Contract tests for bound functions.
//!
//! These tests verify the binder contracts:
//! - Declared types come from the adapters
//! - Auxiliary state is built once per invocation
//! - Scalar functions run strict, casts follow the host's mode

use std::sync::atomic::{AtomicUsize, Ordering};

use vexec::adapter::{FieldNames, Primitive, Struct, Varchar};
use vexec::executor::{CastMode, RowError, RowResult};
use vexec::function::{
    BinaryFunction, BinaryOperation, CastFunction, CastInfo, CastOperation, FunctionSignature,
    ScalarFunction, StandardCastFunction, UnaryFunction, UnaryOperation,
};
use vexec::types::{LogicalType, StringT};
use vexec::vector::{DataChunk, Vector};
use vexec::VexecError;

// -----------------------------------------------------------------------------
// Operations under test
// -----------------------------------------------------------------------------

struct DoubleTiny;

impl UnaryOperation<'_> for DoubleTiny {
    type Input = Primitive<u8>;
    type Output = Primitive<u8>;
    type State = ();

    fn operation(input: u8, _state: &()) -> RowResult<u8> {
        crate::double_tiny(input)
    }
}

static SEPARATOR_BUILDS: AtomicUsize = AtomicUsize::new(0);

/// Shared setup for [`Join`], counted on construction.
struct Separator(String);

impl Default for Separator {
    fn default() -> Self {
        SEPARATOR_BUILDS.fetch_add(1, Ordering::SeqCst);
        Separator(" / ".to_string())
    }
}

struct Join;

impl<'a> BinaryOperation<'a> for Join {
    type Left = Varchar;
    type Right = Varchar;
    type Output = Varchar;
    type State = Separator;

    fn operation(left: StringT<'a>, right: StringT<'a>, state: &Separator) -> RowResult<String> {
        Ok(Some(format!("{}{}{}", left.to_str()?, state.0, right.to_str()?)))
    }
}

struct Span;

impl FieldNames for Span {
    const NAMES: &'static [&'static str] = &["start", "length"];
}

struct ParseSpan;

impl<'a> CastOperation<'a> for ParseSpan {
    type Source = Varchar;
    type Target = Struct<(Primitive<i64>, Primitive<u16>), Span>;
    type State = ();

    fn cast(input: StringT<'a>, _state: &()) -> RowResult<(i64, u16)> {
        let text = input.to_str()?;
        let Some((start, length)) = text.split_once('+') else {
            return Err(RowError::new(format!("Could not parse span '{text}'")));
        };
        let start = start
            .parse::<i64>()
            .map_err(|e| RowError::new(format!("Invalid span start: {e}")))?;
        let length = length
            .parse::<u16>()
            .map_err(|e| RowError::new(format!("Invalid span length: {e}")))?;
        Ok(Some((start, length)))
    }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------

#[test]
fn test_declared_types_come_from_adapters() {
    // Contract: argument and return types are the adapters' declared types
    let unary = UnaryFunction::<DoubleTiny>::new();
    assert_eq!(unary.arguments(), vec![LogicalType::utinyint()]);
    assert_eq!(unary.return_type(), LogicalType::utinyint());

    let binary = BinaryFunction::<Join>::new();
    assert_eq!(binary.signature().to_string(), "(VARCHAR, VARCHAR) -> VARCHAR");

    let cast = StandardCastFunction::<ParseSpan>::new();
    assert_eq!(cast.source_type(), LogicalType::varchar());
    assert_eq!(
        cast.target_type().to_string(),
        "STRUCT(start BIGINT, length USMALLINT)"
    );
    assert_eq!(cast.implicit_cast_cost(), -1);
}

#[test]
fn test_signature_serializes() {
    // Contract: declared metadata can be shipped to a registration routine
    let signature = StandardCastFunction::<ParseSpan>::new().signature();
    let bytes = bincode::serialize(&signature).expect("serialize signature");
    let restored: FunctionSignature = bincode::deserialize(&bytes).expect("deserialize signature");
    assert_eq!(restored, signature);
}

#[test]
fn test_state_built_once_per_invocation() {
    // Contract: auxiliary state is constructed once per batch, not per row
    let function = BinaryFunction::<Join>::new();
    let entry = function.function();
    let chunk = DataChunk::new(
        vec![
            Vector::from_strings(&[Some("a"), Some("b"), None, Some("d")]),
            Vector::from_strings(&[Some("1"), Some("2"), Some("3"), Some("4")]),
        ],
        4,
    )
    .unwrap();

    let before = SEPARATOR_BUILDS.load(Ordering::SeqCst);
    for _ in 0..3 {
        let mut output = Vector::new(LogicalType::varchar(), 4);
        entry(&chunk, &mut output).unwrap();
        assert_eq!(output.string_at(3).unwrap(), "d / 4");
        assert!(!output.is_valid(2));
    }
    assert_eq!(SEPARATOR_BUILDS.load(Ordering::SeqCst) - before, 3);
}

#[test]
fn test_scalar_entry_is_strict() {
    // Contract: a plain scalar function fails the whole call on the first row error
    let chunk = DataChunk::new(vec![Vector::from_values(&[Some(3_u8), None, Some(255)])], 3).unwrap();
    let mut output = Vector::new(LogicalType::utinyint(), 3);

    let err = (UnaryFunction::<DoubleTiny>::new().function())(&chunk, &mut output).unwrap_err();

    assert!(matches!(err, VexecError::RowFailed { row: 2, .. }));
    assert!(output.row_errors().is_empty());
}

#[test]
fn test_scalar_entry_uses_chunk_size() {
    // Contract: the row count comes from the chunk, not the vector capacity
    let chunk = DataChunk::new(vec![Vector::from_values(&[Some(1_u8), Some(2), Some(255)])], 2).unwrap();
    let mut output = Vector::new(LogicalType::utinyint(), 3);

    (UnaryFunction::<DoubleTiny>::new().function())(&chunk, &mut output).unwrap();

    assert_eq!(&output.values::<u8>().unwrap()[..2], &[2, 4]);
}

#[test]
fn test_same_cast_under_both_modes() {
    // Contract: the policy is chosen by the entry point's mode, not the operation
    let cast = StandardCastFunction::<ParseSpan>::new();
    let entry = cast.function();
    let input = Vector::from_strings(&[Some("10+3"), Some("oops"), Some("-4+70000"), Some("7+0")]);

    let mut output = Vector::new(cast.target_type(), 4);
    entry(&CastInfo::new(CastMode::Try), 4, &input, &mut output).unwrap();
    let errors: Vec<usize> = output.row_errors().iter().map(|e| e.row).collect();
    assert_eq!(errors, vec![1, 2]);
    assert!(output.row_errors()[1].message.starts_with("Invalid span length"));
    assert!(output.is_valid(0));
    assert!(!output.is_valid(1));
    assert!(!output.child(0).unwrap().is_valid(1));
    assert_eq!(output.child(0).unwrap().values::<i64>().unwrap()[3], 7);

    let mut output = Vector::new(cast.target_type(), 4);
    let err = entry(&CastInfo::new(CastMode::Normal), 4, &input, &mut output).unwrap_err();
    assert_eq!(err.row_message(), Some("Could not parse span 'oops'"));
    assert_eq!(output.row_errors().len(), 1);
}
