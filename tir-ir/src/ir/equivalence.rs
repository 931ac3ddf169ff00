//! Structural comparison of modules
//!
//! Two modules are equivalent when their attached trees match: same
//! functions in the same order, same attributes and types, and the same
//! operand wiring by position. Arena ids and detached entities are ignored,
//! so a module and the result of re-parsing its printed form compare equal.

use std::collections::HashMap;
use std::mem::discriminant;
use crate::ir::{BlockId, FunctionRef, Module, ValueId};

impl Module {
    pub fn is_equivalent(&self, other: &Module) -> bool {
        if self.name() != other.name() || self.function_count() != other.function_count() {
            return false;
        }
        self.functions()
            .zip(other.functions())
            .all(|(a, b)| functions_equivalent(self, &a, other, &b))
    }
}

fn functions_equivalent(lhs: &Module, a: &FunctionRef<'_>, rhs: &Module, b: &FunctionRef<'_>) -> bool {
    if a.name() != b.name() || a.visibility() != b.visibility() || a.signature() != b.signature() {
        return false;
    }
    match (a.entry_block(), b.entry_block()) {
        (Some(x), Some(y)) => blocks_equivalent(lhs, x, rhs, y),
        (None, None) => true,
        _ => false,
    }
}

fn blocks_equivalent(lhs: &Module, a: BlockId, rhs: &Module, b: BlockId) -> bool {
    let (block_a, block_b) = (lhs.block(a), rhs.block(b));
    if block_a.arguments().len() != block_b.arguments().len()
        || block_a.operations().len() != block_b.operations().len()
    {
        return false;
    }

    // lhs value -> rhs value, filled in definition order
    let mut mapping: HashMap<ValueId, ValueId> = HashMap::new();
    for (&x, &y) in block_a.arguments().iter().zip(block_b.arguments()) {
        if lhs.value_type(x) != rhs.value_type(y) {
            return false;
        }
        mapping.insert(x, y);
    }

    for (&op_a, &op_b) in block_a.operations().iter().zip(block_b.operations()) {
        let (oa, ob) = (lhs.operation(op_a), rhs.operation(op_b));
        if discriminant(oa.kind()) != discriminant(ob.kind())
            || oa.operands().len() != ob.operands().len()
            || oa.results().len() != ob.results().len()
        {
            return false;
        }
        let wired_alike = oa
            .operands()
            .iter()
            .zip(ob.operands())
            .all(|(x, y)| mapping.get(x) == Some(y));
        if !wired_alike {
            return false;
        }
        for (&x, &y) in oa.results().iter().zip(ob.results()) {
            if lhs.value_type(x) != rhs.value_type(y) {
                return false;
            }
            mapping.insert(x, y);
        }
    }
    true
}
