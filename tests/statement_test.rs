mod common;
use basic::mach::Runtime;
use common::*;

#[test]
fn test_for_loop_counts_up() {
    let mut r = Runtime::default();
    r.enter(r#"10 FOR I# = 1 TO 3"#);
    r.enter(r#"20 PRINT I#"#);
    r.enter(r#"30 NEXT I#"#);
    r.enter(r#"RUN"#);
    assert_eq!(exec(&mut r), "1\n2\n3\n");
}

#[test]
fn test_for_loop_falls_through_with_last_value() {
    let mut r = Runtime::default();
    r.enter(r#"5 I# = 0"#);
    r.enter(r#"10 FOR I# = 1 TO 3"#);
    r.enter(r#"20 PRINT I#"#);
    r.enter(r#"30 NEXT I#"#);
    r.enter(r#"40 PRINT "AFTER"; I#"#);
    r.enter(r#"RUN"#);
    assert_eq!(exec(&mut r), "1\n2\n3\nAFTER3\n");
}

#[test]
fn test_for_loop_step_down() {
    let mut r = Runtime::default();
    r.enter(r#"FOR I# = 3 TO 1 STEP -1: PRINT I#;: NEXT"#);
    assert_eq!(exec(&mut r), "321");
}

#[test]
fn test_for_loop_float_step() {
    let mut r = Runtime::default();
    r.enter(r#"FOR X% = 0 TO 1 STEP 0.5: PRINT X%; " ";: NEXT X%"#);
    assert_eq!(exec(&mut r), "0 0.5 1 ");
}

#[test]
fn test_for_loop_can_run_zero_times() {
    let mut r = Runtime::default();
    r.enter(r#"FOR I# = 1 TO 0: PRINT "BODY": NEXT: PRINT "AFTER""#);
    assert_eq!(exec(&mut r), "AFTER\n");
}

#[test]
fn test_statements_before_for_keep_their_variables() {
    let mut r = Runtime::default();
    r.enter(r#"10 A# = 5: FOR I# = 1 TO 2: NEXT I#"#);
    r.enter(r#"20 PRINT A#"#);
    r.enter(r#"RUN"#);
    assert_eq!(exec(&mut r), "5\n");
    r.enter(r#"B$ = "KEPT": FOR I# = 1 TO 2: NEXT I#: PRINT B$"#);
    assert_eq!(exec(&mut r), "KEPT\n");
}

#[test]
fn test_nested_for_loops() {
    let mut r = Runtime::default();
    r.enter(r#"10 FOR I# = 1 TO 2"#);
    r.enter(r#"20 FOR J# = 1 TO 2"#);
    r.enter(r#"30 PRINT I# * 10 + J#"#);
    r.enter(r#"40 NEXT J#"#);
    r.enter(r#"50 NEXT I#"#);
    r.enter(r#"RUN"#);
    assert_eq!(exec(&mut r), "11\n12\n21\n22\n");
}

#[test]
fn test_nested_for_loops_on_one_line() {
    let mut r = Runtime::default();
    r.enter(r#"FOR I# = 1 TO 2: FOR J# = 1 TO 2: PRINT I# * 10 + J#; " ";: NEXT J#: NEXT I#"#);
    assert_eq!(exec(&mut r), "11 12 21 22 ");
}

#[test]
fn test_skipped_nested_loops_wait_for_their_own_next() {
    let mut r = Runtime::default();
    r.enter(r#"10 FOR I# = 1 TO 0"#);
    r.enter(r#"20 FOR J# = 1 TO 2"#);
    r.enter(r#"30 PRINT "INNER""#);
    r.enter(r#"40 NEXT J#"#);
    r.enter(r#"50 PRINT "SKIPPED""#);
    r.enter(r#"60 NEXT I#"#);
    r.enter(r#"70 PRINT "DONE""#);
    r.enter(r#"RUN"#);
    assert_eq!(exec(&mut r), "DONE\n");
}

#[test]
fn test_breaking_out_of_for_loop_with_goto() {
    let mut r = Runtime::default();
    r.enter(r#"10 FOR Y# = 1 TO 2"#);
    r.enter(r#"20 FOR X# = 8 TO 9"#);
    r.enter(r#"30 PRINT Y# * 10 + X#"#);
    r.enter(r#"40 GOTO 60"#);
    r.enter(r#"50 NEXT X#"#);
    r.enter(r#"60 NEXT Y#"#);
    r.enter(r#"RUN"#);
    assert_eq!(exec(&mut r), "18\n28\n");
}

#[test]
fn test_exit_leaves_loop() {
    let mut r = Runtime::default();
    r.enter(r#"10 FOR I# = 1 TO 10"#);
    r.enter(r#"20 IF I# = 3 THEN EXIT"#);
    r.enter(r#"30 PRINT I#"#);
    r.enter(r#"40 NEXT I#"#);
    r.enter(r#"50 PRINT "OUT""#);
    r.enter(r#"RUN"#);
    assert_eq!(exec(&mut r), "1\n2\nOUT\n");
}

#[test]
fn test_next_without_for() {
    let mut r = Runtime::default();
    r.enter(r#"10 NEXT"#);
    r.enter(r#"RUN"#);
    assert_eq!(exec(&mut r), "?RUNTIME ERROR: NEXT WITHOUT FOR IN 10\n");
}

#[test]
fn test_exit_without_for() {
    let mut r = Runtime::default();
    r.enter(r#"EXIT"#);
    assert_eq!(exec(&mut r), "?RUNTIME ERROR: EXIT WITHOUT FOR\n");
}

#[test]
fn test_gosub_returns_after_call() {
    let mut r = Runtime::default();
    r.enter(r#"10 GOSUB 100"#);
    r.enter(r#"20 PRINT "BACK""#);
    r.enter(r#"30 END"#);
    r.enter(r#"100 PRINT "SUB""#);
    r.enter(r#"110 RETURN"#);
    r.enter(r#"RUN"#);
    assert_eq!(exec(&mut r), "SUB\nBACK\n");
}

#[test]
fn test_gosub_falling_into_subroutine() {
    let mut r = Runtime::default();
    r.enter(r#"10 GOSUB 100"#);
    r.enter(r#"20 PRINT "BACK""#);
    r.enter(r#"100 PRINT "SUB""#);
    r.enter(r#"110 RETURN"#);
    r.enter(r#"RUN"#);
    assert_eq!(
        exec(&mut r),
        "SUB\nBACK\nSUB\n?RUNTIME ERROR: RETURN WITHOUT GOSUB IN 110\n"
    );
}

#[test]
fn test_nested_gosub() {
    let mut r = Runtime::default();
    r.enter(r#"10 GOSUB 100"#);
    r.enter(r#"20 PRINT "C""#);
    r.enter(r#"30 END"#);
    r.enter(r#"100 GOSUB 200"#);
    r.enter(r#"110 PRINT "B""#);
    r.enter(r#"120 RETURN"#);
    r.enter(r#"200 PRINT "A""#);
    r.enter(r#"210 RETURN"#);
    r.enter(r#"RUN"#);
    assert_eq!(exec(&mut r), "A\nB\nC\n");
}

#[test]
fn test_return_from_inside_loop() {
    let mut r = Runtime::default();
    r.enter(r#"10 GOSUB 100"#);
    r.enter(r#"20 PRINT "BACK""#);
    r.enter(r#"30 END"#);
    r.enter(r#"100 FOR I# = 1 TO 5"#);
    r.enter(r#"110 IF I# = 2 THEN RETURN"#);
    r.enter(r#"120 NEXT I#"#);
    r.enter(r#"RUN"#);
    assert_eq!(exec(&mut r), "BACK\n");
}

#[test]
fn test_return_without_gosub() {
    let mut r = Runtime::default();
    r.enter(r#"10 RETURN"#);
    r.enter(r#"RUN"#);
    assert_eq!(exec(&mut r), "?RUNTIME ERROR: RETURN WITHOUT GOSUB IN 10\n");
}

#[test]
fn test_gosub_from_direct_line() {
    let mut r = Runtime::default();
    r.enter(r#"100 PRINT "SUB""#);
    r.enter(r#"110 RETURN"#);
    r.enter(r#"GOSUB 100: PRINT "BACK""#);
    assert_eq!(exec(&mut r), "SUB\nBACK\n");
    r.enter(r#"FOR I# = 1 TO 2: GOSUB 100: NEXT I#: PRINT "DONE""#);
    assert_eq!(exec(&mut r), "SUB\nSUB\nDONE\n");
}

#[test]
fn test_read_skips_to_data() {
    let mut r = Runtime::default();
    r.enter(r#"10 READ X#"#);
    r.enter(r#"20 PRINT "SKIPPED""#);
    r.enter(r#"30 DATA 7"#);
    r.enter(r#"40 PRINT X#"#);
    r.enter(r#"RUN"#);
    assert_eq!(exec(&mut r), "SKIPPED\n7\n");
}

#[test]
fn test_read_across_data_statements() {
    let mut r = Runtime::default();
    r.enter(r#"10 READ A#, B$, C%"#);
    r.enter(r#"20 PRINT A#; B$; C%"#);
    r.enter(r#"30 END"#);
    r.enter(r#"40 DATA 1, "TWO""#);
    r.enter(r#"50 DATA -2.5"#);
    r.enter(r#"RUN"#);
    assert_eq!(exec(&mut r), "1TWO-2.5\n");
}

#[test]
fn test_read_out_of_data() {
    let mut r = Runtime::default();
    r.enter(r#"10 READ A#"#);
    r.enter(r#"20 PRINT "NEVER""#);
    r.enter(r#"RUN"#);
    assert_eq!(exec(&mut r), "?RUNTIME ERROR: OUT OF DATA IN 10\n");
}

#[test]
fn test_if_then() {
    let mut r = Runtime::default();
    r.enter(r#"if 1 then ? "one""#);
    assert_eq!(exec(&mut r), "one\n");
}

#[test]
fn test_if_then_else() {
    let mut r = Runtime::default();
    r.enter(r#"IF 0 THEN PRINT "ONE" ELSE PRINT "TWO": PRINT 2"#);
    assert_eq!(exec(&mut r), "TWO\n2\n");
    r.enter(r#"IF 1 THEN PRINT "ONE" ELSE PRINT "TWO": PRINT 2"#);
    assert_eq!(exec(&mut r), "ONE\n");
    r.enter(r#"IF 1 THEN PRINT "ONE";: PRINT 2"#);
    assert_eq!(exec(&mut r), "ONE2\n");
    r.enter(r#"IF 0 THEN PRINT "ONE";: PRINT 2"#);
    assert_eq!(exec(&mut r), "");
}

#[test]
fn test_if_then_line_number() {
    let mut r = Runtime::default();
    r.enter(r#"10 IF 1 < 2 THEN 30"#);
    r.enter(r#"20 PRINT "NO""#);
    r.enter(r#"30 PRINT "YES""#);
    r.enter(r#"RUN"#);
    assert_eq!(exec(&mut r), "YES\n");
}

#[test]
fn test_for_inside_if_is_refused() {
    let mut r = Runtime::default();
    r.enter(r#"10 IF 1 THEN FOR I# = 1 TO 3: PRINT I#: NEXT I#"#);
    r.enter(r#"20 PRINT "END""#);
    r.enter(r#"RUN"#);
    assert_eq!(
        exec(&mut r),
        "?PARSE ERROR: SYNTAX ERROR IN 10; FOR CANNOT BE INSIDE IF\n"
    );
    r.enter(r#"IF 0 THEN FOR I# = 1 TO 3"#);
    assert_eq!(
        exec(&mut r),
        "?PARSE ERROR: SYNTAX ERROR; FOR CANNOT BE INSIDE IF\n"
    );
    r.enter(r#"NEXT I#"#);
    assert_eq!(exec(&mut r), "?RUNTIME ERROR: NEXT WITHOUT FOR\n");
}

#[test]
fn test_if_string_condition() {
    let mut r = Runtime::default();
    r.enter(r#"IF "X" THEN PRINT 1"#);
    assert_eq!(
        exec(&mut r),
        "?RUNTIME ERROR: TYPE MISMATCH; A STRING IS NOT A CONDITION\n"
    );
}

#[test]
fn test_goto_label() {
    let mut r = Runtime::default();
    r.enter(r#"10 LABEL START"#);
    r.enter(r#"20 N# = N# + 1"#);
    r.enter(r#"30 IF N# < 3 THEN GOTO START"#);
    r.enter(r#"40 PRINT N#"#);
    r.enter(r#"RUN"#);
    assert_eq!(exec(&mut r), "3\n");
}

#[test]
fn test_goto_missing_targets() {
    let mut r = Runtime::default();
    r.enter(r#"10 GOTO NOWHERE"#);
    r.enter(r#"RUN"#);
    assert_eq!(
        exec(&mut r),
        "?RUNTIME ERROR: UNDEFINED LINE IN 10; NO LABEL NOWHERE\n"
    );
    r.enter(r#"10 GOTO 50"#);
    r.enter(r#"RUN"#);
    assert_eq!(exec(&mut r), "?RUNTIME ERROR: UNDEFINED LINE IN 10; 50\n");
}

#[test]
fn test_stop_and_end() {
    let mut r = Runtime::default();
    r.enter(r#"10 PRINT "A""#);
    r.enter(r#"20 STOP"#);
    r.enter(r#"30 PRINT "B""#);
    r.enter(r#"RUN"#);
    assert_eq!(exec(&mut r), "A\nBREAK IN 20\n");
    r.enter(r#"20 END"#);
    r.enter(r#"RUN"#);
    assert_eq!(exec(&mut r), "A\n");
}

#[test]
fn test_run_from_line() {
    let mut r = Runtime::default();
    r.enter(r#"10 PRINT "A""#);
    r.enter(r#"20 PRINT "B""#);
    r.enter(r#"RUN 20"#);
    assert_eq!(exec(&mut r), "B\n");
}

#[test]
fn test_run_clears_variables() {
    let mut r = Runtime::default();
    r.enter(r#"10 A# = A# + 1"#);
    r.enter(r#"20 PRINT A#"#);
    r.enter(r#"A# = 5"#);
    r.enter(r#"RUN"#);
    assert_eq!(exec(&mut r), "1\n");
    r.enter(r#"RUN"#);
    assert_eq!(exec(&mut r), "1\n");
}

#[test]
fn test_lines_run_in_numeric_order() {
    let mut r = Runtime::default();
    r.enter(r#"20 PRINT "SECOND""#);
    r.enter(r#"10 PRINT "FIRST""#);
    r.enter(r#"30 PRINT "GONE""#);
    r.enter(r#"30"#);
    r.enter(r#"20 PRINT "REPLACED""#);
    r.enter(r#"RUN"#);
    assert_eq!(exec(&mut r), "FIRST\nREPLACED\n");
}

#[test]
fn test_direct_variables_persist() {
    let mut r = Runtime::default();
    r.enter(r#"LET A$ = "HI""#);
    r.enter(r#"PRINT A$, A$"#);
    assert_eq!(exec(&mut r), "HI\tHI\n");
}

#[test]
fn test_bad_line_stops_run() {
    let mut r = Runtime::default();
    r.enter(r#"10 PRINT "A""#);
    r.enter(r#"20 PRINT (1"#);
    r.enter(r#"30 PRINT "B""#);
    r.enter(r#"RUN"#);
    assert_eq!(
        exec(&mut r),
        "A\n?PARSE ERROR: UNBALANCED PARENTHESES IN 20; EXPECTED RIGHT PARENTHESIS\n"
    );
}

#[test]
fn test_unknown_command() {
    let mut r = Runtime::default();
    r.enter(r#"FROB"#);
    assert_eq!(exec(&mut r), "?PARSE ERROR: UNKNOWN COMMAND; FROB\n");
}

#[test]
fn test_rejected_lines() {
    let mut r = Runtime::default();
    assert!(!r.enter(r#"10 PRINT "OPEN"#));
    assert_eq!(
        exec(&mut r),
        "?LEX ERROR: UNTERMINATED STRING LITERAL IN 10\n"
    );
    assert!(!r.enter(r#"64000 PRINT 1"#));
    assert_eq!(exec(&mut r), "?LEX ERROR: LINE NUMBER OUT OF RANGE; 64000\n");
    assert!(r.listing().is_empty());
}

#[test]
fn test_remark_ends_line() {
    let mut r = Runtime::default();
    r.enter(r#"PRINT 1: REM PRINT 2"#);
    assert_eq!(exec(&mut r), "1\n");
}
