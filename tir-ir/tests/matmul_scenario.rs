use pretty_assertions::assert_eq;
use tir_ir::ir::{Dim, OpKind};
use tir_ir::samples::{matmul_buffer_module, matmul_tensor_module, DYNAMIC_BUFFER_MATMUL};
use tir_ir::{
    make_function_type, make_tensor_type, parse_module, print_module, ElementType, IrBuilder, IrError,
    Module, SourceLocation, TensorType, Visibility,
};

const TENSOR_MATMUL: &str = "\
builtin.module {
  func.func private @matmul(%0: tensor<128x64xf32>, %1: tensor<64x256xf32>) -> tensor<128x256xf32> {
    %2 = tensor.empty() : tensor<128x256xf32>
    %3 = linalg.matmul ins(%0, %1 : tensor<128x64xf32>, tensor<64x256xf32>) outs(%2 : tensor<128x256xf32>) -> tensor<128x256xf32>
    func.return %3 : tensor<128x256xf32>
  }
}
";

#[test]
fn test_tensor_matmul_prints_deterministically() {
    let module = matmul_tensor_module(128, 64, 256, Visibility::Private).unwrap();
    let first = print_module(&module).unwrap();
    assert_eq!(first, TENSOR_MATMUL);
    assert_eq!(print_module(&module).unwrap(), first);
}

#[test]
fn test_parse_tensor_matmul_structure() {
    let module = parse_module(TENSOR_MATMUL).unwrap();
    assert_eq!(module.function_count(), 1);

    let func = module.lookup_function("matmul").unwrap();
    let region = module.region(func.body());
    assert_eq!(region.blocks().len(), 1);
    assert_eq!(func.arguments().len(), 2);

    let a = make_tensor_type(&[128, 64], ElementType::F32).unwrap();
    let b = make_tensor_type(&[64, 256], ElementType::F32).unwrap();
    let c = make_tensor_type(&[128, 256], ElementType::F32).unwrap();
    assert_eq!(module.value_type(func.arguments()[0]), &a);
    assert_eq!(module.value_type(func.arguments()[1]), &b);
    assert_eq!(func.signature(), &make_function_type(vec![a, b], vec![c.clone()]));

    let ops = func.operations();
    assert_eq!(ops.len(), 3);
    assert_eq!(module.operation(ops[0]).kind(), &OpKind::TensorAlloc);
    assert_eq!(module.operation(ops[1]).kind(), &OpKind::MatMul);
    assert_eq!(module.operation(ops[2]).kind(), &OpKind::Return);

    let product = module.operation(ops[1]).result().unwrap();
    assert_eq!(module.value_type(product), &c);
    assert_eq!(module.operation(ops[2]).operands(), &[product]);
}

#[test]
fn test_round_trip_is_equivalent() {
    let modules = vec![
        matmul_tensor_module(128, 64, 256, Visibility::Private).unwrap(),
        matmul_tensor_module(3, 5, 7, Visibility::Public).unwrap(),
        matmul_buffer_module("matmul_1024", 1024, 1024, 1024).unwrap(),
        Module::with_name("empty").unwrap(),
    ];
    for module in modules {
        let text = print_module(&module).unwrap();
        let parsed = parse_module(&text).unwrap();
        assert!(module.is_equivalent(&parsed), "round trip changed:\n{text}");
        assert_eq!(print_module(&parsed).unwrap(), text);
    }
}

fn add_identity(module: &mut Module, name: &str, visibility: Visibility, types: &[TensorType]) {
    let mut builder = IrBuilder::new(module);
    let (entry, args) = builder.create_entry_block(types).unwrap();
    builder.func_return(args).unwrap();
    let sig = make_function_type(types.to_vec(), types.to_vec());
    builder.define_function(name, visibility, sig, entry).unwrap();
}

fn add_matmul(module: &mut Module, name: &str, lhs: TensorType, rhs: TensorType, dest: TensorType) {
    let mut builder = IrBuilder::new(module);
    let (entry, args) = builder.create_entry_block(&[lhs.clone(), rhs.clone()]).unwrap();
    let init = builder.tensor_empty(dest.shape.clone(), dest.element).unwrap();
    let product = builder.matmul(args[0], args[1], init).unwrap().unwrap();
    builder.func_return(vec![product]).unwrap();
    let sig = make_function_type(vec![lhs, rhs], vec![dest]);
    builder.define_function(name, Visibility::Public, sig, entry).unwrap();
}

#[test]
fn test_round_trip_varied_modules() {
    let half = |shape: Vec<Dim>| TensorType::tensor(shape, ElementType::F16);
    let scalar = TensorType::tensor(vec![], ElementType::I64);
    let widest = TensorType::tensor(vec![Dim::Static(u64::MAX)], ElementType::F32);
    let buffer = TensorType::memref(vec![Dim::Static(0), Dim::Dynamic], ElementType::F64);

    let mut kernels = Module::with_name("kernels.v2").unwrap();
    add_matmul(
        &mut kernels,
        "mm_f16",
        half(vec![Dim::Dynamic, Dim::Static(8)]),
        half(vec![Dim::Static(8), Dim::Dynamic]),
        half(vec![Dim::Dynamic, Dim::Dynamic]),
    );
    add_identity(&mut kernels, "pair", Visibility::Private, &[scalar.clone(), widest.clone()]);
    add_identity(&mut kernels, "nothing", Visibility::Public, &[]);

    let mut edges = Module::new();
    add_identity(&mut edges, "_", Visibility::Public, &[scalar]);
    add_identity(&mut edges, "k.v2$-x", Visibility::Private, &[widest]);
    add_identity(&mut edges, "buf", Visibility::Public, &[buffer.clone(), buffer]);

    let mut mixed = matmul_buffer_module("into_buffer", 2, 3, 4).unwrap();
    add_matmul(
        &mut mixed,
        "into_tensor",
        make_tensor_type(&[2, 3], ElementType::I32).unwrap(),
        make_tensor_type(&[3, 4], ElementType::I32).unwrap(),
        make_tensor_type(&[2, 4], ElementType::I32).unwrap(),
    );

    for module in [kernels, edges, mixed] {
        let text = print_module(&module).unwrap();
        let parsed = parse_module(&text).unwrap();
        assert!(module.is_equivalent(&parsed), "round trip changed:\n{text}");
        assert_eq!(print_module(&parsed).unwrap(), text);
    }
}

#[test]
fn test_round_trip_text_of_edge_cases() {
    let mut module = Module::with_name("m").unwrap();
    let widest = TensorType::tensor(vec![Dim::Static(u64::MAX)], ElementType::F32);
    let scalar = TensorType::tensor(vec![], ElementType::I64);
    add_identity(&mut module, "k.v2$-x", Visibility::Private, &[widest, scalar]);

    let expected = "\
builtin.module @m {
  func.func private @k.v2$-x(%0: tensor<18446744073709551615xf32>, %1: tensor<i64>) -> (tensor<18446744073709551615xf32>, tensor<i64>) {
    func.return %0, %1 : tensor<18446744073709551615xf32>, tensor<i64>
  }
}
";
    assert_eq!(print_module(&module).unwrap(), expected);
    assert!(module.is_equivalent(&parse_module(expected).unwrap()));
}

#[test]
fn test_hand_written_buffer_matmul_parses() {
    let module = parse_module(DYNAMIC_BUFFER_MATMUL).unwrap();
    let func = module.lookup_function("matmul").unwrap();
    assert!(func.signature().results.is_empty());
    assert_eq!(func.arguments().len(), 3);
    for &arg in func.arguments() {
        assert_eq!(module.value_type(arg).shape, vec![Dim::Dynamic, Dim::Dynamic]);
        assert!(module.value_type(arg).is_buffer());
    }

    let expected = "\
builtin.module {
  func.func @matmul(%0: memref<?x?xf32>, %1: memref<?x?xf32>, %2: memref<?x?xf32>) {
    linalg.matmul ins(%0, %1 : memref<?x?xf32>, memref<?x?xf32>) outs(%2 : memref<?x?xf32>)
    func.return
  }
}
";
    assert_eq!(print_module(&module).unwrap(), expected);
}

#[test]
fn test_mismatched_inner_dimensions() {
    let a = make_tensor_type(&[4, 3], ElementType::F32).unwrap();
    let b = make_tensor_type(&[5, 6], ElementType::F32).unwrap();
    let mut module = Module::new();
    let mut builder = IrBuilder::new(&mut module);
    let (_, args) = builder.create_entry_block(&[a, b]).unwrap();
    let dest = builder.tensor_empty(vec![Dim::Static(4), Dim::Static(6)], ElementType::F32).unwrap();

    let err = builder.matmul(args[0], args[1], dest).unwrap_err();
    assert!(matches!(err, IrError::ShapeMismatch { .. }));
}

#[test]
fn test_dynamic_dimensions_relax_checks() {
    let lhs = TensorType::tensor(vec![Dim::Dynamic, Dim::Static(64)], ElementType::F32);
    let rhs = TensorType::tensor(vec![Dim::Dynamic, Dim::Static(256)], ElementType::F32);
    let dest_ty = TensorType::tensor(vec![Dim::Static(128), Dim::Dynamic], ElementType::F32);

    let mut module = Module::new();
    let mut builder = IrBuilder::new(&mut module);
    let (entry, args) = builder.create_entry_block(&[lhs.clone(), rhs.clone()]).unwrap();
    let dest = builder.tensor_empty(dest_ty.shape.clone(), dest_ty.element).unwrap();
    let product = builder.matmul(args[0], args[1], dest).unwrap().unwrap();
    builder.func_return(vec![product]).unwrap();
    let sig = make_function_type(vec![lhs, rhs], vec![dest_ty.clone()]);
    builder.define_function("dyn", Visibility::Public, sig, entry).unwrap();

    assert_eq!(module.value_type(product), &dest_ty);
    let text = print_module(&module).unwrap();
    assert!(text.contains("tensor<?x64xf32>"), "{text}");
    assert!(module.is_equivalent(&parse_module(&text).unwrap()));
}

#[test]
fn test_duplicate_function_in_text() {
    let text = "\
builtin.module {
  func.func @matmul() {
    func.return
  }
  func.func private @matmul() {
    func.return
  }
}
";
    assert_eq!(
        parse_module(text).unwrap_err(),
        IrError::DuplicateSymbol { name: "matmul".to_string() }
    );
}

#[test]
fn test_moved_destination_in_text() {
    let text = "\
builtin.module {
  func.func @f(%a: tensor<2x2xf32>, %b: tensor<2x2xf32>) -> tensor<2x2xf32> {
    %c = tensor.empty() : tensor<2x2xf32>
    %d = linalg.matmul ins(%a, %b : tensor<2x2xf32>, tensor<2x2xf32>) outs(%c : tensor<2x2xf32>) -> tensor<2x2xf32>
    %e = linalg.matmul ins(%a, %b : tensor<2x2xf32>, tensor<2x2xf32>) outs(%c : tensor<2x2xf32>) -> tensor<2x2xf32>
    func.return %e : tensor<2x2xf32>
  }
}
";
    assert!(matches!(parse_module(text), Err(IrError::ValueConsumed { .. })));
}

#[test]
fn test_syntax_error_location() {
    let text = "\
builtin.module {
  func.func @f(%a: tensor<2x2xf32>) -> tensor<2x2xf32> {
    func.return %b : tensor<2x2xf32>
  }
}
";
    let err = parse_module(text).unwrap_err();
    assert_eq!(err.location(), Some(&SourceLocation::new(3, 17)));
    assert_eq!(err.to_string(), "syntax error at 3:17: use of undefined value %b");
}

#[test]
fn test_negative_size_in_text() {
    let text = "builtin.module {\n  func.func @f(%a: tensor<-4x2xf32>) {\n    func.return\n  }\n}\n";
    assert!(matches!(parse_module(text), Err(IrError::InvalidShape { .. })));
}

#[test]
fn test_json_snapshot_round_trip() {
    let module = matmul_tensor_module(8, 4, 2, Visibility::Public).unwrap();
    let json = serde_json::to_string(&module).unwrap();
    let back: Module = serde_json::from_str(&json).unwrap();
    assert_eq!(back, module);
    assert_eq!(print_module(&back).unwrap(), print_module(&module).unwrap());
}

#[test]
fn test_module_is_shareable() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Module>();
}
