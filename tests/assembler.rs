use scoreboard_tea_sim::assembler::assemble;

#[test]
fn full_program_assembles_to_fixed_width_lines() {
    let src = r#"
        // initialize and loop
        start:
        ADD R1, R0, 1
        LOOP R1, start
    "#;
    let lines = assemble(src).unwrap();
    assert_eq!(lines.len(), 2);
    for line in &lines {
        assert_eq!(line.len(), 21);
        assert!(line.chars().all(|c| c == '0' || c == '1'));
    }
}

#[test]
fn stor_to_r0_is_rejected() {
    let src = "STOR R0, R1, R2\n";
    let err = assemble(src).unwrap_err();
    assert!(err.message.contains("R0"));
}

#[test]
fn immediates_accept_zero_to_255_reject_256() {
    assert!(assemble("ADD R1, R2, 255\n").is_ok());
    assert!(assemble("ADD R1, R2, 256\n").is_err());
}

#[test]
fn branch_tags_accept_zero_to_8191_reject_8192() {
    assert!(assemble("LOOP R1, 8191\n").is_ok());
    assert!(assemble("LOOP R1, 8192\n").is_err());
}

#[test]
fn unknown_label_is_reported() {
    let err = assemble("LOOP R1, nowhere\n").unwrap_err();
    assert!(err.message.contains("nowhere"));
}
