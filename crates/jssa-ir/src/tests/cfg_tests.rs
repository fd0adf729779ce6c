use super::*;
use smallvec::smallvec;

fn block(id: u32, successors: &[u32], instructions: Vec<Instruction>) -> Block {
    Block {
        id: BlockId(id),
        instructions,
        successors: successors.iter().map(|s| BlockId(*s)).collect(),
    }
}

fn ret(id: u32) -> Instruction {
    Instruction::new(InstrId(id), Opcode::Ret, smallvec![Operand::Constant(Constant::Undefined)])
}

#[test]
fn test_block_termination() {
    assert!(!block(0, &[], vec![]).is_terminated());
    assert!(block(0, &[1], vec![]).is_terminated());
    assert!(block(0, &[], vec![ret(0)]).is_terminated());
}

#[test]
fn test_predecessors_follow_successor_edges() {
    let cfg = Cfg {
        entry: BlockId(0),
        name: None,
        blocks: vec![
            block(0, &[1, 2], vec![]),
            block(1, &[3], vec![]),
            block(2, &[3], vec![]),
            block(3, &[], vec![ret(4)]),
        ],
        phis: PhiTable::default(),
    };

    let preds = cfg.predecessors();
    assert!(preds[&BlockId(0)].is_empty());
    assert_eq!(preds[&BlockId(1)].as_slice(), &[BlockId(0)]);
    assert_eq!(preds[&BlockId(3)].as_slice(), &[BlockId(1), BlockId(2)]);
    assert_eq!(cfg.instruction(InstrId(4)).map(|i| i.opcode), Some(Opcode::Ret));
    assert!(cfg.block(BlockId(7)).is_none());
}

#[test]
fn test_void_opcodes() {
    assert!(Opcode::Literal.produces_value());
    assert!(Opcode::Call.produces_value());
    assert!(Opcode::Phi.produces_value());
    assert!(!Opcode::StoreProperty.produces_value());
    assert!(!Opcode::ToPhi.produces_value());
    assert!(!Opcode::Branch.produces_value());
}
