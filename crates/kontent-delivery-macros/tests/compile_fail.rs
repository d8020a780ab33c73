//! Inputs #[derive(ContentShape)] rejects at compile time.

#[test]
fn test_rejected_inputs() {
    let cases = trybuild::TestCases::new();
    cases.compile_fail("tests/trybuild/*.rs");
}
