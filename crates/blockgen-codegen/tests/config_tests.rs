//! Integration tests for JSON-configured generators.
//!
//! Tests validate:
//! - Keyword tables, indent and reserved words loaded from JSON
//! - Templates loaded from a directory per target system
//! - System-restricted blocks

use blockgen_codegen::{CodeGenerator, DirTemplateSource};
use blockgen_types::{BlockNode, BlockTree, ErrorCollector, ErrorKind, GeneratorConfig};

// ══════════════════════════════════════════════════════════════════════════════
// Helpers
// ══════════════════════════════════════════════════════════════════════════════

const CALLIOPE: &str = r#"{
    "system_prefix": "calliope",
    "indent": "\t",
    "keywords": [["NUMBER", "int"], ["HIGH", "1"], ["LOW", "0"]],
    "reserved_words": ["int", "void", "loop"]
}"#;

fn generator(json: &str) -> CodeGenerator {
    let config = GeneratorConfig::from_json(json).unwrap();
    let mut gen = CodeGenerator::new(config).unwrap();
    gen.registry_mut()
        .register_template("main_loop", "#", ["S_STATEMENTS"])
        .register_template("write", "digitalWrite(#, #);", ["F_PIN", "F_LEVEL"])
        .register_function("led_matrix", |block, gen| {
            gen.check_system(block, &["calliope"]);
            "matrix.show();".to_string()
        })
        .register_function("var_decl", |block, gen| {
            let name = gen.field_to_code(block, "NAME");
            if gen.is_reserved(&name) {
                format!("int _{name};")
            } else {
                format!("int {name};")
            }
        });
    gen.set_code_template("void loop() {\n###main###}\n");
    gen
}

fn main_loop(head: BlockNode) -> BlockTree {
    BlockTree::new(vec![
        BlockNode::new("main", "main_loop").with_statements("STATEMENTS", Some(head))
    ])
}

// ══════════════════════════════════════════════════════════════════════════════
// Tests
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_keywords_and_indent_from_json() {
    let gen = generator(CALLIOPE);
    let workspace = main_loop(
        BlockNode::new("w", "write")
            .with_field("PIN", "13")
            .with_field("LEVEL", "LOW"),
    );
    let mut errors = ErrorCollector::new();
    let code = gen.workspace_to_code(&workspace, &mut errors).unwrap();
    assert_eq!(code, "void loop() {\n\tdigitalWrite(13, 0);\n}\n");
    assert!(errors.is_empty());
}

#[test]
fn test_reserved_words_from_json() {
    let gen = generator(CALLIOPE);
    let workspace = main_loop(
        BlockNode::new("a", "var_decl")
            .with_field("NAME", "Loop")
            .with_next(BlockNode::new("b", "var_decl").with_field("NAME", "count")),
    );
    let mut errors = ErrorCollector::new();
    let code = gen.workspace_to_code(&workspace, &mut errors).unwrap();
    assert!(code.contains("int _Loop;"));
    assert!(code.contains("int count;"));
}

#[test]
fn test_system_restricted_block() {
    let workspace = main_loop(BlockNode::new("m", "led_matrix"));
    let mut errors = ErrorCollector::new();

    generator(CALLIOPE)
        .workspace_to_code(&workspace, &mut errors)
        .unwrap();
    assert!(errors.is_empty());

    generator(r#"{ "system_prefix": "arduino" }"#)
        .workspace_to_code(&workspace, &mut errors)
        .unwrap();
    assert_eq!(errors.count_of(ErrorKind::IncompatibleSystem), 1);
    assert_eq!(errors.for_block("m").count(), 1);
}

#[test]
fn test_templates_loaded_per_system() {
    let root = std::env::temp_dir().join(format!("blockgen-config-{}", std::process::id()));
    std::fs::create_dir_all(root.join("calliope")).unwrap();
    std::fs::write(
        root.join("calliope/code_template"),
        "#include \"MicroBit.h\"\n###main###",
    )
    .unwrap();

    let mut gen = generator(CALLIOPE);
    gen.init(&DirTemplateSource::new(&root));
    let workspace = main_loop(BlockNode::new("m", "led_matrix"));
    let mut errors = ErrorCollector::new();
    let code = gen.workspace_to_code(&workspace, &mut errors).unwrap();
    assert_eq!(code, "#include \"MicroBit.h\"\n\tmatrix.show();\n");

    std::fs::remove_dir_all(&root).unwrap();
}
