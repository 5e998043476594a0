mod common;
use basic::mach::Runtime;
use common::*;

#[test]
fn test_abs_sgn_mod() {
    let mut r = Runtime::default();
    r.enter(r#"PRINT ABS(-3); ABS(-1.5); SGN(-2.5); SGN(0); MOD(7, 3)"#);
    assert_eq!(exec(&mut r), "31.5-101\n");
}

#[test]
fn test_chr_hex_str_val() {
    let mut r = Runtime::default();
    r.enter(r#"PRINT CHR(65); HEX(255); STR(42) + "!""#);
    assert_eq!(exec(&mut r), "A0xff42!\n");
    r.enter(r#"PRINT VAL("2.5") * 2"#);
    assert_eq!(exec(&mut r), "5\n");
    r.enter(r#"PRINT VAL("X")"#);
    assert_eq!(exec(&mut r), "?RUNTIME ERROR: TYPE MISMATCH; X IS NOT A NUMBER\n");
}

#[test]
fn test_string_slicing() {
    let mut r = Runtime::default();
    r.enter(r#"A$ = "HELLO""#);
    r.enter(r#"PRINT LEFT(A$, 2); ","; RIGHT(A$, 3); ","; MID(A$, 2, 3); ","; MID(A$, 4)"#);
    assert_eq!(exec(&mut r), "HE,LLO,ELL,LO\n");
    r.enter(r#"PRINT LEFT(A$, 10); ","; MID(A$, 9); ","; LEN(A$)"#);
    assert_eq!(exec(&mut r), "HELLO,,5\n");
    r.enter(r#"PRINT LEFT(A$, -1)"#);
    assert_eq!(exec(&mut r), "?RUNTIME ERROR: ILLEGAL QUANTITY; -1 IS NEGATIVE\n");
    r.enter(r#"PRINT MID(A$, 0)"#);
    assert_eq!(exec(&mut r), "?RUNTIME ERROR: ILLEGAL QUANTITY; MID STARTS AT 1\n");
}

#[test]
fn test_instr() {
    let mut r = Runtime::default();
    r.enter(r#"PRINT INSTR("HELLO", "LL"); INSTR("HELLO", "Z")"#);
    assert_eq!(exec(&mut r), "30\n");
}

#[test]
fn test_bit_functions() {
    let mut r = Runtime::default();
    r.enter(r#"PRINT SHL(1, 4); " "; SHR(16, 2); " "; XOR(12, 10)"#);
    assert_eq!(exec(&mut r), "16 4 6\n");
}

#[test]
fn test_trig_and_log() {
    let mut r = Runtime::default();
    r.enter(r#"PRINT COS(0); " "; SIN(0); " "; RAD(180) > 3.1415 AND RAD(180) < 3.1416"#);
    assert_eq!(exec(&mut r), "1 0 -1\n");
    r.enter(r#"PRINT LOG(0)"#);
    assert_eq!(
        exec(&mut r),
        "?RUNTIME ERROR: ILLEGAL QUANTITY; LOG OF A NUMBER NOT ABOVE ZERO\n"
    );
}

#[test]
fn test_spc() {
    let mut r = Runtime::default();
    r.enter(r#"PRINT "A"; SPC(3); "B""#);
    assert_eq!(exec(&mut r), "A   B\n");
}

#[test]
fn test_spc_is_capped() {
    let mut r = Runtime::default();
    r.enter(r#"PRINT LEN(SPC(9223372036854775807))"#);
    assert_eq!(
        exec(&mut r),
        "?RUNTIME ERROR: OUT OF MEMORY; STRING TOO LONG\n"
    );
    r.enter(r#"PRINT LEN(SPC(1000))"#);
    assert_eq!(exec(&mut r), "1000\n");
}

#[test]
fn test_wrong_arity() {
    let mut r = Runtime::default();
    r.enter(r#"PRINT ABS(1, 2)"#);
    assert_eq!(
        exec(&mut r),
        "?PARSE ERROR: WRONG NUMBER OF ARGUMENTS; ABS TAKES 1 TO 1 ARGUMENTS, GOT 2\n"
    );
}

#[test]
fn test_rnd() {
    let mut r = Runtime::default();
    r.enter(r#"A% = RND(-7): B% = RND(-7): PRINT A% = B%"#);
    assert_eq!(exec(&mut r), "-1\n");
    r.enter(r#"A% = RND(1): PRINT RND(0) = A%; A% >= 0 AND A% < 1"#);
    assert_eq!(exec(&mut r), "-1-1\n");
}

#[test]
fn test_def_inline() {
    let mut r = Runtime::default();
    r.enter(r#"5 X# = 3"#);
    r.enter(r#"10 DEF SQ(X#) = X# * X#"#);
    r.enter(r#"20 PRINT SQ(7); " "; X#"#);
    r.enter(r#"RUN"#);
    assert_eq!(exec(&mut r), "49 3\n");
}

#[test]
fn test_def_direct() {
    let mut r = Runtime::default();
    r.enter(r#"DEF AREA(W%, H%) = W% * H%"#);
    r.enter(r#"PRINT AREA(2, 1.5)"#);
    assert_eq!(exec(&mut r), "3\n");
    r.enter(r#"PRINT AREA(2)"#);
    assert_eq!(
        exec(&mut r),
        "?PARSE ERROR: WRONG NUMBER OF ARGUMENTS; AREA TAKES 2 TO 2 ARGUMENTS, GOT 1\n"
    );
}

#[test]
fn test_def_with_body_lines() {
    let mut r = Runtime::default();
    r.enter(r#"10 DEF TWICE(N#)"#);
    r.enter(r#"20 RETURN N# * 2"#);
    r.enter(r#"30 PRINT TWICE(21)"#);
    r.enter(r#"RUN"#);
    assert_eq!(exec(&mut r), "42\n");
}

#[test]
fn test_def_recursion() {
    let mut r = Runtime::default();
    r.enter(r#"10 DEF FACT(N#)"#);
    r.enter(r#"20 IF N# <= 1 THEN RETURN 1"#);
    r.enter(r#"30 RETURN N# * FACT(N# - 1)"#);
    r.enter(r#"40 PRINT FACT(5)"#);
    r.enter(r#"RUN"#);
    assert_eq!(exec(&mut r), "120\n");
}

#[test]
#[cfg(target_endian = "little")]
fn test_pointer_peek_poke() {
    let mut r = Runtime::default();
    r.enter(r#"10 A# = 258"#);
    r.enter(r#"20 P# = POINTER(A#)"#);
    r.enter(r#"30 PRINT PEEK(P#)"#);
    r.enter(r#"40 POKE P#, 7"#);
    r.enter(r#"50 PRINT A#"#);
    r.enter(r#"RUN"#);
    assert_eq!(exec(&mut r), "2\n263\n");
}

#[test]
fn test_memory_errors() {
    let mut r = Runtime::default();
    r.enter(r#"PRINT PEEK(0)"#);
    assert_eq!(
        exec(&mut r),
        "?RUNTIME ERROR: ILLEGAL QUANTITY; INVALID ADDRESS\n"
    );
    r.enter(r#"A# = 1: POKE POINTER(A#), 300"#);
    assert_eq!(
        exec(&mut r),
        "?RUNTIME ERROR: ILLEGAL QUANTITY; 300 IS NOT A BYTE\n"
    );
    r.enter(r#"PRINT POINTERVAR(A#) <> 0"#);
    assert_eq!(exec(&mut r), "-1\n");
}
