use jssa_ir::*;
use smallvec::smallvec;

fn instr(id: u32, opcode: Opcode, operands: Vec<Operand>) -> Instruction {
    Instruction::new(InstrId(id), opcode, operands.into_iter().collect())
}

fn bound(name: &str, mut instr: Instruction) -> Instruction {
    instr.binding = Some(name.to_string());
    instr
}

#[test]
fn test_emit_constants() {
    let cases = [
        (Constant::Undefined, "%undefined"),
        (Constant::Null, "%null"),
        (Constant::Bool(true), "%true"),
        (Constant::Number(1.0), "%1"),
        (Constant::Number(-0.0), "%0"),
        (Constant::Number(2.5), "%2.5"),
        (Constant::Number(1e15), "%1000000000000000"),
        (Constant::Number(1e20), "%100000000000000000000"),
        (Constant::Number(1e21), "%1e+21"),
        (Constant::Number(-1.5e300), "%-1.5e+300"),
        (Constant::Number(0.000001), "%0.000001"),
        (Constant::Number(1.5e-7), "%1.5e-7"),
        (Constant::Number(f64::NAN), "%NaN"),
        (Constant::Number(f64::NEG_INFINITY), "%-Infinity"),
        (Constant::string("+"), "%\"+\""),
        (Constant::string("say \"hi\"\n"), "%\"say \\\"hi\\\"\\n\""),
    ];
    for (constant, expected) in cases {
        assert_eq!(Operand::Constant(constant).to_string(), expected);
    }
}

#[test]
fn test_emit_operands() {
    assert_eq!(Operand::Instr(InstrId(7)).to_string(), "i7");
    assert_eq!(Operand::Local("a".into()).to_string(), "@a");
    assert_eq!(Operand::Count(3).to_string(), "%3");
    assert_eq!(Operand::Block(BlockId(1)).to_string(), "%\"B1\"");
}

#[test]
fn test_emit_instructions() {
    let binary = instr(
        8,
        Opcode::Binary,
        vec![
            Operand::Constant(Constant::string("<")),
            Operand::Local("i".into()),
            Operand::Instr(InstrId(6)),
        ],
    );
    assert_eq!(binary.to_string(), "i8 = binary %\"<\", @i, i6");

    let global = instr(11, Opcode::Global, vec![]);
    assert_eq!(global.to_string(), "i11 = global");

    let literal = bound("a", instr(1, Opcode::Literal, vec![Operand::Constant(Constant::Undefined)]));
    assert_eq!(literal.to_string(), "@a = literal %undefined");
}

#[test]
fn test_emit_cfgs() {
    let main = Cfg {
        entry: BlockId(0),
        name: None,
        blocks: vec![
            Block {
                id: BlockId(0),
                instructions: vec![
                    instr(1, Opcode::LoadGlobal, vec![Operand::Constant(Constant::string("a"))]),
                    instr(3, Opcode::Branch, vec![Operand::Instr(InstrId(1))]),
                ],
                successors: smallvec![BlockId(1), BlockId(2)],
            },
            Block {
                id: BlockId(1),
                instructions: vec![],
                successors: smallvec![BlockId(2)],
            },
            Block {
                id: BlockId(2),
                instructions: vec![instr(4, Opcode::Ret, vec![Operand::Instr(InstrId(1))])],
                successors: smallvec![],
            },
        ],
        phis: PhiTable::default(),
    };
    let callee = Cfg {
        entry: BlockId(3),
        name: Some("f".into()),
        blocks: vec![Block::new(BlockId(3))],
        phis: PhiTable::default(),
    };

    let expected = "\
block B0 -> B1, B2
  i1 = loadGlobal %\"a\"
  i3 = branch i1
block B1 -> B2
block B2
  i4 = ret i1
block B3";
    assert_eq!(stringify(&[main, callee]), expected);
    assert_eq!(stringify(&[]), "");
}
