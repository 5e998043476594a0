mod common;
use basic::mach::Runtime;
use common::*;

#[test]
fn test_input_with_prompt() {
    let mut r = Runtime::default();
    r.enter(r#"10 INPUT "NAME"; N$"#);
    r.enter(r#"20 PRINT "HI " + N$"#);
    r.console_mut().push_input("Ada");
    r.enter(r#"RUN"#);
    assert_eq!(exec(&mut r), "NAME? Ada\nHI Ada\n");
}

#[test]
fn test_input_splits_fields() {
    let mut r = Runtime::default();
    r.console_mut().push_input("3, 1.5");
    r.enter(r#"INPUT A#, B%: PRINT A# + B%"#);
    assert_eq!(exec(&mut r), "? 3, 1.5\n4.5\n");
}

#[test]
fn test_input_missing_fields_are_zero() {
    let mut r = Runtime::default();
    r.console_mut().push_input("2.9");
    r.enter(r#"INPUT A#, B#: PRINT A#; B#"#);
    assert_eq!(exec(&mut r), "? 2.9\n20\n");
}

#[test]
fn test_input_to_array() {
    let mut r = Runtime::default();
    r.console_mut().push_input("9");
    r.enter(r#"DIM A#(3): INPUT A#(2): PRINT A#(2)"#);
    assert_eq!(exec(&mut r), "? 9\n9\n");
}

#[test]
fn test_input_not_a_number() {
    let mut r = Runtime::default();
    r.console_mut().push_input("ABC");
    r.enter(r#"INPUT A#"#);
    assert_eq!(
        exec(&mut r),
        "? ABC\n?RUNTIME ERROR: TYPE MISMATCH; ABC IS NOT A NUMBER\n"
    );
}

#[test]
fn test_input_at_end_of_input() {
    let mut r = Runtime::default();
    r.enter(r#"10 INPUT A#"#);
    r.enter(r#"20 PRINT "NEVER""#);
    r.enter(r#"RUN"#);
    assert_eq!(exec(&mut r), "? BREAK IN 10\n");
}
