//! Ready-made matmul modules
//!
//! The tensor form multiplies two tensors into a fresh `tensor.empty`
//! destination and returns the result. The buffer form takes all three
//! operands as `memref` arguments, writes the product into the last one and
//! returns nothing.

use tir_common::IrResult;
use crate::ir::{
    make_function_type, make_memref_type, make_tensor_type, ElementType, IrBuilder, Module, Visibility,
};

/// Buffer matmul over dynamically sized operands, spread across lines the
/// way hand-written IR often is.
pub const DYNAMIC_BUFFER_MATMUL: &str = r#"
builtin.module {
  func.func @matmul(%A: memref<?x?xf32>, %B: memref<?x?xf32>, %C: memref<?x?xf32>) {
    linalg.matmul ins(%A, %B : memref<?x?xf32>, memref<?x?xf32>)
                  outs(%C : memref<?x?xf32>)
    func.return
  }
}
"#;

/// `@matmul(A: MxK, B: KxN) -> MxN` over f32 tensors.
pub fn matmul_tensor_module(m: i64, k: i64, n: i64, visibility: Visibility) -> IrResult<Module> {
    let a = make_tensor_type(&[m, k], ElementType::F32)?;
    let b = make_tensor_type(&[k, n], ElementType::F32)?;
    let c = make_tensor_type(&[m, n], ElementType::F32)?;

    let mut module = Module::new();
    let mut builder = IrBuilder::new(&mut module);
    let (entry, args) = builder.create_entry_block(&[a.clone(), b.clone()])?;
    let init = builder.tensor_empty(c.shape.clone(), c.element)?;
    let product = builder.matmul(args[0], args[1], init)?;
    builder.func_return(product.into_iter().collect())?;
    builder.define_function("matmul", visibility, make_function_type(vec![a, b], vec![c]), entry)?;
    Ok(module)
}

/// `@name(A: MxK, B: KxN, C: MxN)` writing `A * B` into the `C` buffer.
pub fn matmul_buffer_module(name: &str, m: i64, k: i64, n: i64) -> IrResult<Module> {
    let a = make_memref_type(&[m, k], ElementType::F32)?;
    let b = make_memref_type(&[k, n], ElementType::F32)?;
    let c = make_memref_type(&[m, n], ElementType::F32)?;
    let inputs = vec![a, b, c];

    let mut module = Module::new();
    let mut builder = IrBuilder::new(&mut module);
    let (entry, args) = builder.create_entry_block(&inputs)?;
    builder.matmul(args[0], args[1], args[2])?;
    builder.func_return(Vec::new())?;
    builder.define_function(name, Visibility::Public, make_function_type(inputs, Vec::new()), entry)?;
    Ok(module)
}
