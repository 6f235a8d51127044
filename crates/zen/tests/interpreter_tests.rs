use zen::{CollectOutput, Interpreter, RunConfig, lex};

// ===== Arithmetic and printing =====

#[test]
fn prints_sum_of_two_numbers() {
    let mut interp = Interpreter::with_output(RunConfig::default(), Box::new(CollectOutput::new()));
    let tokens = lex("print(1 + 2)");
    interp.exec_program(&tokens);
    let any: &dyn std::any::Any = &*interp.out;
    let collected = any.downcast_ref::<CollectOutput>().expect("sink is still a CollectOutput");
    assert_eq!(collected.output(), "3\n");
}

// ===== Array indexing and assignment =====

#[test]
fn array_index_assignment_updates_single_element() {
    let mut interp = Interpreter::new(RunConfig::default());
    let tokens = lex("let a = [10, 20, 30]; a[1] = 99;");
    interp.exec_program(&tokens);
    assert_eq!(interp.env.get("a"), Some(&zen::Value::Array(vec![
        zen::Value::Number(10.0),
        zen::Value::Number(99.0),
        zen::Value::Number(30.0),
    ])));
}

#[test]
fn deep_copy_semantics_on_assignment() {
    let mut interp = Interpreter::new(RunConfig::default());
    let tokens = lex("let a = [1, 2, 3]; let b = a; b[0] = 9;");
    interp.exec_program(&tokens);
    assert_eq!(interp.env.get("a").unwrap().to_string(), "[1, 2, 3]");
    assert_eq!(interp.env.get("b").unwrap().to_string(), "[9, 2, 3]");
}

// ===== Functions and recursion =====

#[test]
fn user_defined_function_returns_sum() {
    let mut interp = Interpreter::new(RunConfig::default());
    let tokens = lex("func add(x, y) { return x + y } let r = add(2, 3);");
    interp.exec_program(&tokens);
    assert_eq!(interp.env.get("r"), Some(&zen::Value::Number(5.0)));
}

#[test]
fn recursive_factorial() {
    let mut interp = Interpreter::new(RunConfig::default());
    let tokens = lex("func f(n) { if (n == 0) { return 1 } return n * f(n - 1) } let r = f(5);");
    interp.exec_program(&tokens);
    assert_eq!(interp.env.get("r"), Some(&zen::Value::Number(120.0)));
}

#[test]
fn variable_table_length_restored_after_call() {
    let mut interp = Interpreter::new(RunConfig::default());
    let tokens = lex("func noop(a, b) { let inner = 1; return inner } noop(1, 2);");
    let before = interp.env.len();
    interp.exec_program(&tokens);
    assert_eq!(interp.env.len(), before);
    assert!(!interp.is_returning());
}

// ===== Ranges and loops =====

#[test]
fn range_then_sum_via_while_loop() {
    let mut interp = Interpreter::new(RunConfig::default());
    let tokens = lex(
        "let nums = range(5); let sum = 0; let i = 0; \
         while (i < length(nums)) { sum = sum + nums[i]; i = i + 1 }",
    );
    interp.exec_program(&tokens);
    assert_eq!(interp.env.get("sum"), Some(&zen::Value::Number(10.0)));
}

// ===== Const discipline =====

#[test]
fn const_reassignment_is_rejected_and_value_is_preserved() {
    let mut interp = Interpreter::new(RunConfig::default());
    let tokens = lex("const x = 1; x = 2;");
    interp.exec_program(&tokens);
    assert_eq!(interp.env.get("x"), Some(&zen::Value::Number(1.0)));
}

// ===== elif chains =====

#[test]
fn elif_chain_picks_matching_branch() {
    let mut interp = Interpreter::new(RunConfig::default());
    let tokens = lex(
        "let n = 2; let label = \"\"; \
         if (n == 1) { label = \"one\" } elif (n == 2) { label = \"two\" } else { label = \"other\" }",
    );
    interp.exec_program(&tokens);
    assert_eq!(interp.env.get("label"), Some(&zen::Value::String("two".to_string())));
}

#[test]
fn elif_chain_falls_through_to_else() {
    let mut interp = Interpreter::new(RunConfig::default());
    let tokens = lex(
        "let n = 9; let label = \"\"; \
         if (n == 1) { label = \"one\" } elif (n == 2) { label = \"two\" } else { label = \"other\" }",
    );
    interp.exec_program(&tokens);
    assert_eq!(interp.env.get("label"), Some(&zen::Value::String("other".to_string())));
}

// ===== Numeric equality tolerance =====

#[test]
fn numeric_equality_uses_tolerance() {
    let mut interp = Interpreter::new(RunConfig::default());
    // No arbitrary subexpression parenthesisation: the right-associative,
    // no-precedence evaluator needs the sum isolated as its own statement
    // before the comparison runs against it.
    let tokens = lex("let sum = 0.1 + 0.2; let eq = sum == 0.3;");
    interp.exec_program(&tokens);
    assert_eq!(interp.env.get("eq"), Some(&zen::Value::Bool(true)));
}

// ===== String concatenation coercion =====

#[test]
fn string_concat_coerces_number_and_bool() {
    let mut interp = Interpreter::new(RunConfig::default());
    let tokens = lex("let a = \"a\" + 1; let b = \"a\" + true;");
    interp.exec_program(&tokens);
    assert_eq!(interp.env.get("a"), Some(&zen::Value::String("a1".to_string())));
    assert_eq!(interp.env.get("b"), Some(&zen::Value::String("atrue".to_string())));
}

// ===== Dict assignment =====

#[test]
fn dict_key_assignment_inserts_preserving_order() {
    let mut interp = Interpreter::new(RunConfig::default());
    let tokens = lex("let d = {a: 1}; d[\"b\"] = 2;");
    interp.exec_program(&tokens);
    assert_eq!(interp.env.get("d").unwrap().to_string(), "{a: 1, b: 2}");
}

// ===== Module import =====

#[test]
fn import_of_missing_module_does_not_bind_and_does_not_panic() {
    let mut interp = Interpreter::new(RunConfig::default());
    let tokens = lex("import does_not_exist;");
    interp.exec_program(&tokens);
    assert_eq!(interp.env.get("does_not_exist"), None);
}

// ===== Recursion limit =====

#[test]
fn recursion_limit_is_enforced() {
    let mut config = RunConfig::default();
    config.max_call_depth = 16;
    let mut interp = Interpreter::new(config);
    let tokens = lex("func loop(n) { return loop(n + 1) } let r = loop(0);");
    interp.exec_program(&tokens);
    // The call aborts via the recursion guard; `r` never gets assigned.
    assert_eq!(interp.env.get("r"), None);
}
