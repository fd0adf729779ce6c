use super::*;
use crate::builder::{BuildContext, build_function};
use crate::phi::PhiRecorder;
use jssa_ast::{Expr, Function, LogicalOperator, Stmt};
use jssa_ir::{BlockId, InstrId, Opcode, Operand, stringify};

fn render(body: Vec<Stmt>) -> String {
    let cfgs = construct(&Program { body }).unwrap();
    stringify(&cfgs)
}

// =========================================================================
// Phi recording
// =========================================================================

#[test]
fn test_phi_recorder_keeps_contribution_order() {
    let mut phis = PhiRecorder::default();
    phis.open(InstrId(4), BlockId(3));
    phis.contribute(InstrId(4), BlockId(1), Operand::Instr(InstrId(2))).unwrap();
    phis.contribute(InstrId(4), BlockId(2), Operand::Local("a".into())).unwrap();

    let table = phis.finish().unwrap();
    let entry = table.get(InstrId(4)).unwrap();
    assert_eq!(entry.block, BlockId(3));
    let from: Vec<_> = entry.inputs.iter().map(|input| input.from).collect();
    assert_eq!(from, [BlockId(1), BlockId(2)]);
    assert_eq!(entry.inputs[1].value, Operand::Local("a".into()));
}

#[test]
fn test_phi_recorder_rejects_unknown_phi() {
    let mut phis = PhiRecorder::default();
    let err = phis
        .contribute(InstrId(9), BlockId(0), Operand::Instr(InstrId(1)))
        .unwrap_err();
    assert_eq!(err, BuildError::UnresolvedPhi { phi: InstrId(9) });
}

#[test]
fn test_phi_recorder_rejects_phi_without_inputs() {
    let mut phis = PhiRecorder::default();
    phis.open(InstrId(2), BlockId(1));
    let err = phis.finish().unwrap_err();
    assert_eq!(err.to_string(), "phi i2 has no contributions");
}

// =========================================================================
// Function building
// =========================================================================

#[test]
fn test_nested_functions_queue_innermost_first() {
    let inner = Stmt::function(Function::new(Some("inner"), &[], vec![]));
    let outer = Stmt::function(Function::new(Some("outer"), &[], vec![inner]));
    let body = vec![outer];

    let mut ctx = BuildContext::new(IdCounters::new());
    let main = build_function(&mut ctx, None, &[], &body).unwrap();

    assert_eq!(main.entry, BlockId(0));
    assert_eq!(ctx.worklist.len(), 2);
    let names: Vec<_> = ctx.worklist.drain().map(|cfg| cfg.name).collect();
    assert_eq!(names, [Some("inner".to_string()), Some("outer".to_string())]);
    assert!(ctx.worklist.is_empty());
}

#[test]
fn test_prologue_binds_params_vars_then_functions() {
    let f = Function::new(
        Some("f"),
        &["p"],
        vec![Stmt::var("v", None), Stmt::function(Function::new(Some("g"), &[], vec![]))],
    );
    let body = vec![Stmt::function(f)];

    let mut ctx = BuildContext::new(IdCounters::new());
    build_function(&mut ctx, None, &[], &body).unwrap();
    let cfgs: Vec<_> = ctx.worklist.drain().collect();
    let f = &cfgs[1];

    let bound: Vec<_> = f
        .instructions()
        .map(|instr| (instr.binding.as_deref(), instr.opcode))
        .collect();
    assert_eq!(
        bound,
        [
            (Some("p"), Opcode::LoadArg),
            (Some("v"), Opcode::Literal),
            (Some("g"), Opcode::Fn),
        ]
    );
}

#[test]
fn test_copy_between_locals_goes_through_nop() {
    let out = render(vec![
        Stmt::var("a", None),
        Stmt::var("b", Some(Expr::num(1.0))),
        Stmt::expr(Expr::assign(Expr::ident("a"), Expr::ident("b"))),
    ]);
    assert!(out.contains("@a = nop @b"), "{out}");
}

#[test]
fn test_phi_value_bound_to_local_through_nop() {
    let value = Expr::logical(Expr::ident("b"), LogicalOperator::Or, Expr::ident("c"));
    let out = render(vec![Stmt::var("a", Some(value))]);
    assert!(out.contains("i4 = phi\n  @a = nop i4"), "{out}");
}

#[test]
fn test_context_reads_count_function_levels() {
    let c = Function::new(Some("c"), &[], vec![Stmt::ret(Some(Expr::ident("x")))]);
    let b = Function::new(Some("b"), &[], vec![Stmt::function(c)]);
    let a = Function::new(
        Some("a"),
        &[],
        vec![Stmt::var("x", None), Stmt::function(b)],
    );

    let out = render(vec![Stmt::function(a)]);
    assert!(out.contains("= loadContext %2, %0"), "{out}");
}

#[test]
fn test_own_name_read_from_nested_function_uses_context() {
    let g = Function::new(Some("g"), &[], vec![Stmt::ret(Some(Expr::ident("f")))]);
    let f = Function::new(Some("f"), &[], vec![Stmt::function(g)]);

    let cfgs = construct(&Program {
        body: vec![Stmt::function(f)],
    })
    .unwrap();
    let out = stringify(&cfgs);

    // `f` stores itself into its last slot on entry; `g` reads it one level up.
    assert!(out.contains("= self\n"), "{out}");
    assert!(out.contains("= storeContext %0, %0, i"), "{out}");
    assert!(out.contains("= loadContext %1, %0"), "{out}");
}

#[test]
fn test_write_to_own_name_is_global_store() {
    let f = Function::new(
        Some("f"),
        &[],
        vec![Stmt::expr(Expr::assign(Expr::ident("f"), Expr::num(1.0)))],
    );
    let out = render(vec![Stmt::expr(Expr::function(f))]);
    assert!(out.contains(r#"storeGlobal %"f", i"#), "{out}");
}
