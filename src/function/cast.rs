//! Cast functions.

use std::marker::PhantomData;

use super::{CastFunction, CastFunctionPtr, CastInfo};
use crate::adapter::{ReadAdapter, ValueAdapter, WriteAdapter};
use crate::error::Result;
use crate::executor::{ErrorPolicy, Executor, RowResult};
use crate::types::LogicalType;
use crate::vector::Vector;

/// A conversion from one logical type to another.
///
/// The same row logic runs under either cast mode; the host picks the mode
/// per call.
pub trait CastOperation<'a>: 'static {
    type Source: ReadAdapter<'a>;
    type Target: for<'w> WriteAdapter<'w>;
    type State: Default;

    /// Ranking cost for implicit casts. Negative means explicit only.
    const IMPLICIT_CAST_COST: i64 = -1;

    fn cast(
        input: <Self::Source as ReadAdapter<'a>>::Arg,
        state: &Self::State,
    ) -> RowResult<<Self::Target as ValueAdapter>::Value>;
}

/// Binds a [`CastOperation`] as a cast function.
#[derive(Debug, Clone, Copy)]
pub struct StandardCastFunction<OP>(PhantomData<fn() -> OP>);

impl<OP> StandardCastFunction<OP> {
    #[must_use]
    pub fn new() -> Self {
        StandardCastFunction(PhantomData)
    }
}

impl<OP> Default for StandardCastFunction<OP> {
    fn default() -> Self {
        Self::new()
    }
}

fn execute_cast<'c, OP>(
    info: &CastInfo,
    count: usize,
    input: &'c Vector,
    output: &mut Vector,
) -> Result<()>
where
    OP: for<'a> CastOperation<'a>,
{
    let state = <OP as CastOperation<'c>>::State::default();
    Executor::new(ErrorPolicy::Cast(info.mode())).execute_unary::<
        <OP as CastOperation<'c>>::Source,
        <OP as CastOperation<'c>>::Target,
        _,
    >(input, output, count, |value| {
        <OP as CastOperation<'c>>::cast(value, &state)
    })
}

impl<OP> CastFunction for StandardCastFunction<OP>
where
    OP: for<'a> CastOperation<'a>,
{
    fn source_type(&self) -> LogicalType {
        <<OP as CastOperation<'static>>::Source as ValueAdapter>::logical_type()
    }

    fn target_type(&self) -> LogicalType {
        <<OP as CastOperation<'static>>::Target as ValueAdapter>::logical_type()
    }

    fn implicit_cast_cost(&self) -> i64 {
        <OP as CastOperation<'static>>::IMPLICIT_CAST_COST
    }

    fn function(&self) -> CastFunctionPtr {
        execute_cast::<OP>
    }
}
