//! IR pretty-printer
//!
//! Emits the textual form of a `Module`. Output is deterministic: functions
//! are printed in insertion order and operations in block order. Values are
//! renamed `%0, %1, ...` per function in definition order (arguments first),
//! which is also the order in which they first appear in the text.

use log::debug;
use std::collections::HashMap;
use std::fmt;
use tir_common::IrResult;
use crate::ir::{write_result_types, FunctionRef, Module, OpId, OpKind, ValueId, Visibility};

const INDENT: &str = "  ";

/// Verify `module` and render it as text.
pub fn print_module(module: &Module) -> IrResult<String> {
    module.verify()?;
    let text = ModulePrinter::new(module).to_string();
    debug!("printed module with {} functions ({} bytes)", module.function_count(), text.len());
    Ok(text)
}

/// `Display` adapter for a module. Does not verify; see [`print_module`].
pub struct ModulePrinter<'m> {
    module: &'m Module,
}

/// Per-function value numbering
#[derive(Default)]
struct ValueNames {
    numbers: HashMap<ValueId, usize>,
}

impl ValueNames {
    fn define(&mut self, value: ValueId) -> String {
        let next = self.numbers.len();
        let number = *self.numbers.entry(value).or_insert(next);
        format!("%{number}")
    }

    fn get(&self, value: ValueId) -> String {
        match self.numbers.get(&value) {
            Some(number) => format!("%{number}"),
            None => "%<undefined>".to_string(),
        }
    }

    fn list(&self, values: &[ValueId]) -> String {
        values.iter().map(|&v| self.get(v)).collect::<Vec<_>>().join(", ")
    }
}

impl<'m> ModulePrinter<'m> {
    pub fn new(module: &'m Module) -> Self {
        Self { module }
    }

    fn types(&self, values: &[ValueId]) -> String {
        values
            .iter()
            .map(|&v| self.module.value_type(v).to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn print_function(&self, f: &mut fmt::Formatter<'_>, func: &FunctionRef<'_>, depth: usize) -> fmt::Result {
        let indent = INDENT.repeat(depth);
        let mut names = ValueNames::default();

        write!(f, "{indent}func.func ")?;
        if func.visibility() == Visibility::Private {
            write!(f, "private ")?;
        }
        write!(f, "@{}(", func.name())?;
        for (i, &arg) in func.arguments().iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", names.define(arg), self.module.value_type(arg))?;
        }
        write!(f, ")")?;
        let results = &func.signature().results;
        if !results.is_empty() {
            write!(f, " -> ")?;
            write_result_types(f, results)?;
        }
        writeln!(f, " {{")?;

        for &op in func.operations() {
            write!(f, "{indent}{INDENT}")?;
            self.print_operation(f, op, &mut names)?;
            writeln!(f)?;
        }
        writeln!(f, "{indent}}}")
    }

    fn print_operation(&self, f: &mut fmt::Formatter<'_>, op: OpId, names: &mut ValueNames) -> fmt::Result {
        let operation = self.module.operation(op);
        let operands = operation.operands();

        if !operation.results().is_empty() {
            let bound: Vec<String> = operation.results().iter().map(|&r| names.define(r)).collect();
            write!(f, "{} = ", bound.join(", "))?;
        }
        write!(f, "{}", operation.name())?;

        match operation.kind() {
            OpKind::TensorAlloc => {
                write!(f, "() : {}", self.types(operation.results()))
            }
            OpKind::MatMul => {
                let (inputs, outputs) = operands.split_at(2);
                write!(
                    f,
                    " ins({} : {}) outs({} : {})",
                    names.list(inputs),
                    self.types(inputs),
                    names.list(outputs),
                    self.types(outputs)
                )?;
                if !operation.results().is_empty() {
                    write!(f, " -> {}", self.types(operation.results()))?;
                }
                Ok(())
            }
            OpKind::Return => {
                if !operands.is_empty() {
                    write!(f, " {} : {}", names.list(operands), self.types(operands))?;
                }
                Ok(())
            }
            // Functions only live at module scope
            OpKind::FuncDefine { name, .. } => write!(f, " @{name}"),
        }
    }
}

impl fmt::Display for ModulePrinter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "builtin.module")?;
        if let Some(name) = self.module.name() {
            write!(f, " @{name}")?;
        }
        writeln!(f, " {{")?;
        for func in self.module.functions() {
            self.print_function(f, &func, 1)?;
        }
        writeln!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{make_function_type, make_memref_type, make_tensor_type, ElementType, IrBuilder};
    use pretty_assertions::assert_eq;
    use tir_common::IrError;

    #[test]
    fn test_print_empty_module() {
        assert_eq!(print_module(&Module::new()).unwrap(), "builtin.module {\n}\n");
        assert_eq!(print_module(&Module::with_name("m").unwrap()).unwrap(), "builtin.module @m {\n}\n");
    }

    #[test]
    fn test_print_buffer_matmul() {
        let ty = make_memref_type(&[8, 8], ElementType::F32).unwrap();
        let mut module = Module::new();
        let mut builder = IrBuilder::new(&mut module);
        let (entry, args) = builder.create_entry_block(&[ty.clone(), ty.clone(), ty.clone()]).unwrap();
        assert_eq!(builder.matmul(args[0], args[1], args[2]).unwrap(), None);
        builder.func_return(vec![]).unwrap();
        let sig = make_function_type(vec![ty.clone(), ty.clone(), ty], vec![]);
        builder.define_function("mm", Visibility::Public, sig, entry).unwrap();

        let expected = "\
builtin.module {
  func.func @mm(%0: memref<8x8xf32>, %1: memref<8x8xf32>, %2: memref<8x8xf32>) {
    linalg.matmul ins(%0, %1 : memref<8x8xf32>, memref<8x8xf32>) outs(%2 : memref<8x8xf32>)
    func.return
  }
}
";
        assert_eq!(print_module(&module).unwrap(), expected);
    }

    #[test]
    fn test_print_multiple_results() {
        let a = make_tensor_type(&[2], ElementType::I32).unwrap();
        let b = make_tensor_type(&[3], ElementType::I64).unwrap();
        let mut module = Module::new();
        let mut builder = IrBuilder::new(&mut module);
        let (entry, args) = builder.create_entry_block(&[a.clone(), b.clone()]).unwrap();
        builder.func_return(vec![args[1], args[0]]).unwrap();
        let sig = make_function_type(vec![a.clone(), b.clone()], vec![b, a]);
        builder.define_function("swap", Visibility::Private, sig, entry).unwrap();

        let expected = "\
builtin.module {
  func.func private @swap(%0: tensor<2xi32>, %1: tensor<3xi64>) -> (tensor<3xi64>, tensor<2xi32>) {
    func.return %1, %0 : tensor<3xi64>, tensor<2xi32>
  }
}
";
        assert_eq!(print_module(&module).unwrap(), expected);
    }

    #[test]
    fn test_print_verifies_return_types() {
        let a = make_tensor_type(&[2, 2], ElementType::F32).unwrap();
        let mut module = Module::new();
        let mut builder = IrBuilder::new(&mut module);
        let (entry, _args) = builder.create_entry_block(&[a.clone()]).unwrap();
        builder.func_return(vec![]).unwrap();
        let sig = make_function_type(vec![a.clone()], vec![a]);
        builder.define_function("f", Visibility::Public, sig, entry).unwrap();

        let err = print_module(&module).unwrap_err();
        assert!(matches!(err, IrError::SignatureMismatch { .. }));
    }

    #[test]
    fn test_print_requires_terminator() {
        let mut module = Module::new();
        let mut builder = IrBuilder::new(&mut module);
        let (entry, _) = builder.create_entry_block(&[]).unwrap();
        builder.define_function("empty", Visibility::Public, make_function_type(vec![], vec![]), entry).unwrap();

        let err = print_module(&module).unwrap_err();
        assert_eq!(err, IrError::MissingTerminator { function: "empty".to_string() });
    }
}
