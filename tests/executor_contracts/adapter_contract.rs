//! Contract tests for value adapters.
//!
//! These tests verify the adapter contracts:
//! - Reading state is derived once and rejects mismatched layouts
//! - Output validity is created on the first null and reused afterwards
//! - Struct nulls propagate into every child column

use vexec::adapter::{Primitive, ReadAdapter, RowWriter, Struct, ValueAdapter, Varchar, WriteAdapter};
use vexec::types::{Hugeint, LogicalType};
use vexec::vector::Vector;
use vexec::VexecError;

type Triple = Struct<(Primitive<bool>, Varchar, Struct<(Primitive<Hugeint>,)>)>;

#[test]
fn test_prepare_rejects_layout_mismatch() {
    // Contract: a mismatched physical layout is a contract violation, not a row error
    let input = Vector::from_strings(&[Some("1")]);
    let err = <Primitive<i32> as ReadAdapter>::prepare(&input, 1).unwrap_err();
    assert!(err.is_contract_violation());

    let err = <Triple as ReadAdapter>::prepare(&input, 1).unwrap_err();
    assert!(matches!(err, VexecError::TypeMismatch { .. }));
}

#[test]
fn test_validity_created_on_first_null_only() {
    // Contract: no bitmap until the first SetNull, then the same bitmap is reused
    let mut output = Vector::new(LogicalType::usmallint(), 128);
    {
        let mut writer = Primitive::<u16>::prepare_write(&mut output, 128).unwrap();
        for row in 0..64 {
            writer.write(row, 1);
        }
    }
    assert!(output.validity().is_none(), "writes alone must not allocate validity");

    let mask_ptr;
    {
        let mut writer = Primitive::<u16>::prepare_write(&mut output, 128).unwrap();
        writer.set_null(64);
        writer.write(65, 2);
        writer.set_null(127);
    }
    {
        let mask = output.validity().expect("validity after first null");
        mask_ptr = mask.as_ptr();
        assert_eq!(mask.len(), 128);
        assert!(mask.is_valid(0));
        assert!(!mask.is_valid(64));
        assert!(mask.is_valid(65));
        assert!(!mask.is_valid(127));
    }
    {
        let mut writer = Primitive::<u16>::prepare_write(&mut output, 128).unwrap();
        writer.set_null(3);
    }
    assert_eq!(output.validity().unwrap().as_ptr(), mask_ptr);
}

#[test]
fn test_struct_set_null_recurses() {
    // Contract: SetNull on a struct row marks every child, recursively, at that row
    let mut output = Vector::new(Triple::logical_type(), 2);
    {
        let mut writer = Triple::prepare_write(&mut output, 2).unwrap();
        writer.write(0, (true, "first".to_string(), (Hugeint::from(9_i64),)));
        writer.set_null(1);
    }

    assert!(!output.is_valid(1));
    assert!(!output.child(0).unwrap().is_valid(1));
    assert!(!output.child(1).unwrap().is_valid(1));
    let nested = output.child(2).unwrap();
    assert!(!nested.is_valid(1));
    assert!(!nested.child(0).unwrap().is_valid(1));

    assert!(output.child(0).unwrap().is_valid(0));
    assert!(nested.child(0).unwrap().is_valid(0));
}

#[test]
fn test_struct_round_trip_reads_declared_order() {
    // Contract: struct reads and writes go field by field in declared order
    let mut output = Vector::new(Triple::logical_type(), 1);
    {
        let mut writer = Triple::prepare_write(&mut output, 1).unwrap();
        writer.write(0, (false, "second field".to_string(), (Hugeint::MIN,)));
    }
    let state = <Triple as ReadAdapter>::prepare(&output, 1).unwrap();
    let (flag, text, (huge,)) = Triple::read(&state, 0);
    assert!(!flag);
    assert_eq!(text, "second field");
    assert_eq!(huge, Hugeint::MIN);
}

#[test]
fn test_struct_parent_bit_is_authoritative() {
    // Contract: a valid struct row is valid even when a child is null there
    let input = Vector::from_struct(
        vec![
            ("v1".to_string(), Vector::from_values(&[None::<bool>])),
            ("v2".to_string(), Vector::from_strings(&[Some("x")])),
            (
                "v3".to_string(),
                Vector::from_struct(
                    vec![("v1".to_string(), Vector::from_values(&[Some(Hugeint::from(1_i64))]))],
                    None,
                )
                .unwrap(),
            ),
        ],
        None,
    )
    .unwrap();
    let state = <Triple as ReadAdapter>::prepare(&input, 1).unwrap();
    assert!(Triple::is_valid(&state, 0));
}
