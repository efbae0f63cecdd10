//! Unary and binary scalar functions.

use std::marker::PhantomData;

use super::{check_argument_count, ScalarFunction, ScalarFunctionPtr};
use crate::adapter::{ReadAdapter, ValueAdapter, WriteAdapter};
use crate::error::Result;
use crate::executor::{ErrorPolicy, Executor, RowResult};
use crate::types::LogicalType;
use crate::vector::{DataChunk, Vector};

/// A row operation over one argument.
///
/// `State` is built once per invocation and shared by every row; use `()`
/// when the operation needs none.
///
/// ```
/// use vexec::adapter::Primitive;
/// use vexec::executor::{RowError, RowResult};
/// use vexec::function::UnaryOperation;
///
/// struct DoubleTiny;
///
/// impl UnaryOperation<'_> for DoubleTiny {
///     type Input = Primitive<u8>;
///     type Output = Primitive<u8>;
///     type State = ();
///
///     fn operation(input: u8, _state: &()) -> RowResult<u8> {
///         input
///             .checked_mul(2)
///             .map(Some)
///             .ok_or_else(|| RowError::new("value out of range"))
///     }
/// }
/// ```
pub trait UnaryOperation<'a>: 'static {
    type Input: ReadAdapter<'a>;
    type Output: for<'w> WriteAdapter<'w>;
    type State: Default;

    fn operation(
        input: <Self::Input as ReadAdapter<'a>>::Arg,
        state: &Self::State,
    ) -> RowResult<<Self::Output as ValueAdapter>::Value>;
}

/// A row operation over two arguments.
pub trait BinaryOperation<'a>: 'static {
    type Left: ReadAdapter<'a>;
    type Right: ReadAdapter<'a>;
    type Output: for<'w> WriteAdapter<'w>;
    type State: Default;

    fn operation(
        left: <Self::Left as ReadAdapter<'a>>::Arg,
        right: <Self::Right as ReadAdapter<'a>>::Arg,
        state: &Self::State,
    ) -> RowResult<<Self::Output as ValueAdapter>::Value>;
}

/// Binds a [`UnaryOperation`] as a strict scalar function.
#[derive(Debug, Clone, Copy)]
pub struct UnaryFunction<OP>(PhantomData<fn() -> OP>);

impl<OP> UnaryFunction<OP> {
    #[must_use]
    pub fn new() -> Self {
        UnaryFunction(PhantomData)
    }
}

impl<OP> Default for UnaryFunction<OP> {
    fn default() -> Self {
        Self::new()
    }
}

fn execute_unary<'c, OP>(args: &'c DataChunk, output: &mut Vector) -> Result<()>
where
    OP: for<'a> UnaryOperation<'a>,
{
    check_argument_count(args, 1)?;
    let input = args.vector(0)?;
    let state = <OP as UnaryOperation<'c>>::State::default();
    Executor::new(ErrorPolicy::Strict).execute_unary::<
        <OP as UnaryOperation<'c>>::Input,
        <OP as UnaryOperation<'c>>::Output,
        _,
    >(input, output, args.size(), |value| {
        <OP as UnaryOperation<'c>>::operation(value, &state)
    })
}

impl<OP> ScalarFunction for UnaryFunction<OP>
where
    OP: for<'a> UnaryOperation<'a>,
{
    fn arguments(&self) -> Vec<LogicalType> {
        vec![<<OP as UnaryOperation<'static>>::Input as ValueAdapter>::logical_type()]
    }

    fn return_type(&self) -> LogicalType {
        <<OP as UnaryOperation<'static>>::Output as ValueAdapter>::logical_type()
    }

    fn function(&self) -> ScalarFunctionPtr {
        execute_unary::<OP>
    }
}

/// Binds a [`BinaryOperation`] as a strict scalar function.
#[derive(Debug, Clone, Copy)]
pub struct BinaryFunction<OP>(PhantomData<fn() -> OP>);

impl<OP> BinaryFunction<OP> {
    #[must_use]
    pub fn new() -> Self {
        BinaryFunction(PhantomData)
    }
}

impl<OP> Default for BinaryFunction<OP> {
    fn default() -> Self {
        Self::new()
    }
}

fn execute_binary<'c, OP>(args: &'c DataChunk, output: &mut Vector) -> Result<()>
where
    OP: for<'a> BinaryOperation<'a>,
{
    check_argument_count(args, 2)?;
    let left = args.vector(0)?;
    let right = args.vector(1)?;
    let state = <OP as BinaryOperation<'c>>::State::default();
    Executor::new(ErrorPolicy::Strict).execute_binary::<
        <OP as BinaryOperation<'c>>::Left,
        <OP as BinaryOperation<'c>>::Right,
        <OP as BinaryOperation<'c>>::Output,
        _,
    >(left, right, output, args.size(), |a, b| {
        <OP as BinaryOperation<'c>>::operation(a, b, &state)
    })
}

impl<OP> ScalarFunction for BinaryFunction<OP>
where
    OP: for<'a> BinaryOperation<'a>,
{
    fn arguments(&self) -> Vec<LogicalType> {
        vec![
            <<OP as BinaryOperation<'static>>::Left as ValueAdapter>::logical_type(),
            <<OP as BinaryOperation<'static>>::Right as ValueAdapter>::logical_type(),
        ]
    }

    fn return_type(&self) -> LogicalType {
        <<OP as BinaryOperation<'static>>::Output as ValueAdapter>::logical_type()
    }

    fn function(&self) -> ScalarFunctionPtr {
        execute_binary::<OP>
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::adapter::{Primitive, Struct, Varchar};
    use crate::error::VexecError;
    use crate::executor::RowError;
    use crate::types::{Hugeint, StringT};

    struct AddHugeint;

    impl BinaryOperation<'_> for AddHugeint {
        type Left = Primitive<Hugeint>;
        type Right = Primitive<Hugeint>;
        type Output = Primitive<Hugeint>;
        type State = ();

        fn operation(left: Hugeint, right: Hugeint, _state: &()) -> RowResult<Hugeint> {
            Ok(Some(left.add(right)?))
        }
    }

    static PATTERN_BUILDS: AtomicUsize = AtomicUsize::new(0);

    struct Pattern(String);

    impl Default for Pattern {
        fn default() -> Self {
            PATTERN_BUILDS.fetch_add(1, Ordering::SeqCst);
            Pattern("needle".to_string())
        }
    }

    struct Contains;

    impl<'a> UnaryOperation<'a> for Contains {
        type Input = Varchar;
        type Output = Primitive<bool>;
        type State = Pattern;

        fn operation(input: StringT<'a>, state: &Pattern) -> RowResult<bool> {
            Ok(Some(input.to_str()?.contains(state.0.as_str())))
        }
    }

    struct Describe;

    impl<'a> UnaryOperation<'a> for Describe {
        type Input = Primitive<i32>;
        type Output = Struct<(Primitive<bool>, Varchar)>;
        type State = ();

        fn operation(input: i32, _state: &()) -> RowResult<(bool, String)> {
            Ok(Some((input % 2 == 0, input.to_string())))
        }
    }

    #[test]
    fn test_unary_metadata() {
        let function = UnaryFunction::<Contains>::new();
        assert_eq!(function.arguments(), vec![LogicalType::varchar()]);
        assert_eq!(function.return_type(), LogicalType::boolean());
        assert_eq!(function.signature().to_string(), "(VARCHAR) -> BOOLEAN");
    }

    #[test]
    fn test_struct_return_metadata() {
        let function = UnaryFunction::<Describe>::new();
        assert_eq!(
            function.return_type().to_string(),
            "STRUCT(v1 BOOLEAN, v2 VARCHAR)"
        );
    }

    #[test]
    fn test_state_built_once_per_call() {
        let function = UnaryFunction::<Contains>::new();
        let input = Vector::from_strings(&[Some("haystack with needle"), None, Some("nothing"), Some("needle")]);
        let chunk = DataChunk::new(vec![input], 4).unwrap();
        let mut output = Vector::new(LogicalType::boolean(), 4);

        let before = PATTERN_BUILDS.load(Ordering::SeqCst);
        (function.function())(&chunk, &mut output).unwrap();
        assert_eq!(PATTERN_BUILDS.load(Ordering::SeqCst) - before, 1);

        assert_eq!(output.values::<bool>().unwrap(), &[true, false, false, true]);
        assert!(!output.is_valid(1));
    }

    #[test]
    fn test_binary_function_strict_failure() {
        let function = BinaryFunction::<AddHugeint>::new();
        let left = Vector::from_values(&[Some(Hugeint::from(1_i64)), Some(Hugeint::MAX)]);
        let right = Vector::from_values(&[Some(Hugeint::from(2_i64)), Some(Hugeint::from(1_i64))]);
        let chunk = DataChunk::new(vec![left, right], 2).unwrap();
        let mut output = Vector::new(LogicalType::hugeint(), 2);

        let err = (function.function())(&chunk, &mut output).unwrap_err();

        assert_eq!(err.row_message(), Some("Failed to add hugeint: out of range"));
        assert_eq!(output.values::<Hugeint>().unwrap()[0], Hugeint::from(3_i64));
    }

    #[test]
    fn test_struct_output() {
        let function = UnaryFunction::<Describe>::new();
        let chunk = DataChunk::new(vec![Vector::from_values(&[Some(4), None])], 2).unwrap();
        let mut output = Vector::new(function.return_type(), 2);

        (function.function())(&chunk, &mut output).unwrap();

        assert!(output.child(0).unwrap().values::<bool>().unwrap()[0]);
        assert_eq!(output.child(1).unwrap().string_at(0).unwrap(), "4");
        assert!(!output.is_valid(1));
        assert!(!output.child(1).unwrap().is_valid(1));
    }

    #[test]
    fn test_argument_count_checked() {
        let function = BinaryFunction::<AddHugeint>::new();
        let chunk = DataChunk::new(vec![Vector::from_values(&[Some(Hugeint::from(1_i64))])], 1).unwrap();
        let mut output = Vector::new(LogicalType::hugeint(), 1);

        let err = (function.function())(&chunk, &mut output).unwrap_err();
        assert!(matches!(err, VexecError::ArgumentCountMismatch { expected: 2, actual: 1 }));
    }

    #[test]
    fn test_row_error_from_operation() {
        struct Reject;

        impl UnaryOperation<'_> for Reject {
            type Input = Primitive<i32>;
            type Output = Primitive<i32>;
            type State = ();

            fn operation(_input: i32, _state: &()) -> RowResult<i32> {
                Err(RowError::new("rejected"))
            }
        }

        let chunk = DataChunk::new(vec![Vector::from_values(&[Some(1_i32)])], 1).unwrap();
        let mut output = Vector::new(LogicalType::integer(), 1);
        let err = (UnaryFunction::<Reject>::new().function())(&chunk, &mut output).unwrap_err();
        assert!(matches!(err, VexecError::RowFailed { row: 0, .. }));
    }
}
