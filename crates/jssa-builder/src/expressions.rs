//! Expression lowering.
//!
//! Operands are evaluated left to right unless noted otherwise; every value
//! handle draws an id from the shared counter at the point it is created, so
//! the order of calls here is observable in the output numbering.

use jssa_ast::{
    AssignOperator, BinaryOperator, Expr, Literal, LogicalOperator, Property, PropertyKind, UnaryOperator,
    UpdateOperator,
};
use jssa_ir::{Constant, Opcode, Operand};

use crate::builder::FunctionBuilder;
use crate::error::{BuildError, Result};

/// Resolved location of a member assignment: `object[key]`.
struct MemberTarget {
    object: Operand,
    key: Operand,
}

fn constant_of(literal: &Literal) -> Constant {
    match literal {
        Literal::Null => Constant::Null,
        Literal::Bool(b) => Constant::Bool(*b),
        Literal::Number(n) => Constant::Number(*n),
        Literal::String(s) => Constant::String(s.clone()),
    }
}

impl<'a> FunctionBuilder<'a, '_> {
    pub(crate) fn lower_expr(&mut self, expr: &'a Expr) -> Result<Operand> {
        match expr {
            Expr::Ident(ident) => Ok(self.read_name(&ident.name)),
            Expr::Literal(literal) => Ok(self.literal(constant_of(literal))),
            Expr::This => Ok(Operand::Instr(self.emit(Opcode::This, []))),
            Expr::Array(elements) => self.lower_array(elements),
            Expr::Object(properties) => self.lower_object(properties),
            Expr::Function(f) => self.function_literal(f),
            Expr::Unary {
                operator: UnaryOperator::Delete,
                argument,
            } => self.lower_delete(argument),
            Expr::Unary { operator, argument } => {
                let value = self.lower_expr(argument)?;
                let op = self.operator(operator.as_str());
                Ok(Operand::Instr(self.emit(Opcode::Unary, [op, value])))
            }
            Expr::Update {
                operator,
                prefix,
                argument,
            } => self.lower_update(*operator, *prefix, argument),
            Expr::Binary { operator, left, right } => {
                let left = self.lower_expr(left)?;
                let right = self.lower_expr(right)?;
                Ok(self.binary(*operator, left, right))
            }
            Expr::Logical { operator, left, right } => self.lower_logical(*operator, left, right),
            Expr::Assign { operator, left, right } => self.lower_assign(*operator, left, right),
            Expr::Conditional {
                test,
                consequent,
                alternate,
            } => self.lower_conditional(test, consequent, alternate),
            Expr::Sequence(expressions) => {
                let mut last = None;
                for e in expressions {
                    last = Some(self.lower_expr(e)?);
                }
                Ok(match last {
                    Some(value) => value,
                    None => self.literal(Constant::Undefined),
                })
            }
            Expr::Member {
                object,
                property,
                computed,
            } => {
                let key = self.member_key(property, *computed)?;
                let object = self.lower_expr(object)?;
                Ok(Operand::Instr(self.emit(Opcode::LoadProperty, [object, key])))
            }
            Expr::Call { callee, arguments } => self.lower_call(callee, arguments),
            Expr::New { callee, arguments } => {
                let callee = self.lower_expr(callee)?;
                let argc = self.push_args(arguments)?;
                Ok(Operand::Instr(self.emit(Opcode::New, [callee, argc])))
            }
            Expr::Unsupported(kind) => Err(BuildError::unsupported(kind.as_str())),
        }
    }

    /// `binary %"op", left, right`
    fn binary(&mut self, operator: BinaryOperator, left: Operand, right: Operand) -> Operand {
        let op = self.operator(operator.as_str());
        Operand::Instr(self.emit(Opcode::Binary, [op, left, right]))
    }

    // =========================================================================
    // Literals
    // =========================================================================

    fn lower_array(&mut self, elements: &'a [Option<Expr>]) -> Result<Operand> {
        let len = self.count(elements.len() as u32);
        let array = Operand::Instr(self.emit(Opcode::Array, [len]));
        for (i, element) in elements.iter().enumerate() {
            let Some(element) = element else {
                continue;
            };
            let value = self.lower_expr(element)?;
            let index = self.literal(Constant::Number(i as f64));
            self.emit(Opcode::StoreProperty, [array.clone(), index, value]);
        }
        Ok(array)
    }

    fn lower_object(&mut self, properties: &'a [Property]) -> Result<Operand> {
        let len = self.count(properties.len() as u32);
        let object = Operand::Instr(self.emit(Opcode::Object, [len]));
        for property in properties {
            if property.kind != PropertyKind::Init {
                return Err(BuildError::unsupported("property accessor"));
            }
            if property.computed {
                return Err(BuildError::unsupported("computed property key"));
            }
            let key = match &property.key {
                Expr::Ident(ident) => self.literal(Constant::string(ident.name.as_str())),
                Expr::Literal(literal) => self.literal(constant_of(literal)),
                other => return Err(BuildError::unsupported(format!("property key {}", other.kind()))),
            };
            let value = self.lower_expr(&property.value)?;
            self.emit(Opcode::StoreProperty, [object.clone(), key, value]);
        }
        Ok(object)
    }

    // =========================================================================
    // Members
    // =========================================================================

    /// Key of `object.name` (a string literal) or `object[expr]`.
    fn member_key(&mut self, property: &'a Expr, computed: bool) -> Result<Operand> {
        if computed {
            return self.lower_expr(property);
        }
        match property {
            Expr::Ident(ident) => Ok(self.literal(Constant::string(ident.name.as_str()))),
            other => Err(BuildError::unsupported(format!("member name {}", other.kind()))),
        }
    }

    /// Evaluate the object and key an assignment to `target` stores into:
    /// keys from the outermost member inwards, then the base object, then the
    /// loads walking back out to the object holding the final key.
    fn member_target(&mut self, target: &'a Expr) -> Result<MemberTarget> {
        let mut keys = Vec::new();
        let mut base = target;
        while let Expr::Member {
            object,
            property,
            computed,
        } = base
        {
            keys.push(self.member_key(property, *computed)?);
            base = object;
        }
        let mut object = self.lower_expr(base)?;
        let mut keys = keys.into_iter().rev();
        let mut key = match keys.next() {
            Some(key) => key,
            None => return Err(BuildError::unsupported(format!("assignment to {}", target.kind()))),
        };
        for outer in keys {
            object = Operand::Instr(self.emit(Opcode::LoadProperty, [object, key]));
            key = outer;
        }
        Ok(MemberTarget { object, key })
    }

    fn load_member(&mut self, target: &MemberTarget) -> Operand {
        Operand::Instr(self.emit(Opcode::LoadProperty, [target.object.clone(), target.key.clone()]))
    }

    fn store_member(&mut self, target: MemberTarget, value: Operand) {
        self.emit(Opcode::StoreProperty, [target.object, target.key, value]);
    }

    // =========================================================================
    // Assignment
    // =========================================================================

    fn lower_assign(&mut self, operator: AssignOperator, left: &'a Expr, right: &'a Expr) -> Result<Operand> {
        match (left, operator.binary()) {
            (Expr::Ident(ident), None) => {
                let value = self.lower_expr(right)?;
                Ok(self.write_name(&ident.name, value))
            }
            (Expr::Ident(ident), Some(op)) => {
                let op = self.operator(op.as_str());
                let rhs = self.lower_expr(right)?;
                let current = self.read_name(&ident.name);
                let result = Operand::Instr(self.emit(Opcode::Binary, [op, current, rhs]));
                Ok(self.write_name(&ident.name, result))
            }
            (Expr::Member { .. }, None) => {
                let value = self.lower_expr(right)?;
                let target = self.member_target(left)?;
                self.store_member(target, value.clone());
                Ok(value)
            }
            (Expr::Member { .. }, Some(op)) => {
                let op = self.operator(op.as_str());
                let rhs = self.lower_expr(right)?;
                let target = self.member_target(left)?;
                let current = self.load_member(&target);
                let result = Operand::Instr(self.emit(Opcode::Binary, [op, current, rhs]));
                self.store_member(target, result.clone());
                Ok(result)
            }
            (other, _) => Err(BuildError::unsupported(format!("assignment to {}", other.kind()))),
        }
    }

    /// Prefix updates yield the new value, postfix updates a `nop` snapshot of
    /// the old one.
    fn lower_update(&mut self, operator: UpdateOperator, prefix: bool, argument: &'a Expr) -> Result<Operand> {
        let op = operator.binary();
        match argument {
            Expr::Ident(ident) if prefix => {
                let op = self.operator(op.as_str());
                let one = self.literal(Constant::Number(1.0));
                let current = self.read_name(&ident.name);
                let result = Operand::Instr(self.emit(Opcode::Binary, [op, current, one]));
                Ok(self.write_name(&ident.name, result))
            }
            Expr::Ident(ident) => {
                let current = self.read_name(&ident.name);
                let old = Operand::Instr(self.emit(Opcode::Nop, [current]));
                let result = self.increment(op, old.clone());
                self.write_name(&ident.name, result);
                Ok(old)
            }
            Expr::Member { .. } if prefix => {
                let op = self.operator(op.as_str());
                let one = self.literal(Constant::Number(1.0));
                let target = self.member_target(argument)?;
                let current = self.load_member(&target);
                let result = Operand::Instr(self.emit(Opcode::Binary, [op, current, one]));
                self.store_member(target, result.clone());
                Ok(result)
            }
            Expr::Member { .. } => {
                let target = self.member_target(argument)?;
                let current = self.load_member(&target);
                let old = Operand::Instr(self.emit(Opcode::Nop, [current]));
                let result = self.increment(op, old.clone());
                self.store_member(target, result);
                Ok(old)
            }
            other => Err(BuildError::unsupported(format!("update of {}", other.kind()))),
        }
    }

    /// `binary %"op", value, 1`
    fn increment(&mut self, op: BinaryOperator, value: Operand) -> Operand {
        let op = self.operator(op.as_str());
        let one = self.literal(Constant::Number(1.0));
        Operand::Instr(self.emit(Opcode::Binary, [op, value, one]))
    }

    fn lower_delete(&mut self, argument: &'a Expr) -> Result<Operand> {
        match argument {
            // Bare names always delete by name, whatever they resolve to.
            Expr::Ident(ident) => {
                let name = self.constant(Constant::string(ident.name.as_str()));
                Ok(Operand::Instr(self.emit(Opcode::DeleteGlobal, [name])))
            }
            Expr::Member {
                object,
                property,
                computed,
            } => {
                let key = self.member_key(property, *computed)?;
                let object = self.lower_expr(object)?;
                Ok(Operand::Instr(self.emit(Opcode::DeleteProperty, [object, key])))
            }
            other => {
                self.lower_expr(other)?;
                Ok(self.literal(Constant::Bool(true)))
            }
        }
    }

    // =========================================================================
    // Calls
    // =========================================================================

    fn lower_call(&mut self, callee: &'a Expr, arguments: &'a [Expr]) -> Result<Operand> {
        let (function, receiver) = match callee {
            Expr::Member {
                object,
                property,
                computed,
            } => {
                let key = self.member_key(property, *computed)?;
                let object = self.lower_expr(object)?;
                let function = Operand::Instr(self.emit(Opcode::LoadProperty, [object.clone(), key]));
                (function, Some(object))
            }
            other => (self.lower_expr(other)?, None),
        };
        let (receiver, argc) = self.push_args_then(arguments, receiver)?;
        Ok(Operand::Instr(self.emit(Opcode::Call, [function, receiver, argc])))
    }

    /// Evaluate arguments, push them last to first, then the receiver
    /// (`global` when the callee is not a member) and the argument count.
    fn push_args_then(&mut self, arguments: &'a [Expr], receiver: Option<Operand>) -> Result<(Operand, Operand)> {
        let values = self.lower_args(arguments)?;
        self.push_values(values);
        let receiver = match receiver {
            Some(receiver) => receiver,
            None => Operand::Instr(self.emit(Opcode::Global, [])),
        };
        let argc = self.count(arguments.len() as u32);
        Ok((receiver, argc))
    }

    /// Evaluate and push arguments for `new`; returns the argument count.
    fn push_args(&mut self, arguments: &'a [Expr]) -> Result<Operand> {
        let values = self.lower_args(arguments)?;
        self.push_values(values);
        Ok(self.count(arguments.len() as u32))
    }

    fn lower_args(&mut self, arguments: &'a [Expr]) -> Result<Vec<Operand>> {
        arguments.iter().map(|a| self.lower_expr(a)).collect()
    }

    fn push_values(&mut self, values: Vec<Operand>) {
        for value in values.into_iter().rev() {
            self.emit(Opcode::PushArg, [value]);
        }
    }

    // =========================================================================
    // Merging expressions
    // =========================================================================

    /// `a || b` / `a && b`: the short-circuit arm forwards the left value,
    /// the other arm evaluates the right operand; both feed one phi.
    fn lower_logical(&mut self, operator: LogicalOperator, left: &'a Expr, right: &'a Expr) -> Result<Operand> {
        let left = self.lower_expr(left)?;
        let phi = self.reserve_phi();
        self.emit(Opcode::Branch, [left.clone()]);

        let on_true = self.new_block();
        let on_false = self.new_block();
        let join = self.new_block();
        self.open_phi(phi, join);
        self.link(self.current(), &[on_true, on_false]);

        let (short_circuit, evaluate) = match operator {
            LogicalOperator::Or => (on_true, on_false),
            LogicalOperator::And => (on_false, on_true),
        };

        self.switch_to(short_circuit);
        self.contribute_phi(phi, left)?;
        self.link(self.current(), &[join]);

        self.switch_to(evaluate);
        let right = self.lower_expr(right)?;
        self.contribute_phi(phi, right)?;
        self.link(self.current(), &[join]);

        self.enter_join(join, phi);
        Ok(Operand::Instr(phi))
    }

    /// The head block ends in `branch` and links to both arms; each arm feeds
    /// the join's phi.
    fn lower_conditional(&mut self, test: &'a Expr, consequent: &'a Expr, alternate: &'a Expr) -> Result<Operand> {
        let test = self.lower_expr(test)?;
        let phi = self.reserve_phi();
        self.emit(Opcode::Branch, [test]);

        let then_block = self.new_block();
        let else_block = self.new_block();
        let join = self.new_block();
        self.open_phi(phi, join);
        self.link(self.current(), &[then_block, else_block]);

        for (block, arm) in [(then_block, consequent), (else_block, alternate)] {
            self.switch_to(block);
            let value = self.lower_expr(arm)?;
            self.contribute_phi(phi, value)?;
            self.link(self.current(), &[join]);
        }

        self.enter_join(join, phi);
        Ok(Operand::Instr(phi))
    }
}
