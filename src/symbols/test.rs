use super::*;

#[test]
fn test_insert_and_find() {
    let mut table = SymTable::new();
    assert!(table.insert("x", Symbol::new("x", "int")));
    assert_eq!(table.find("x"), Some(&Symbol::new("x", "int")));
    assert_eq!(table.find("y"), None);
}

#[test]
fn test_duplicate_in_same_scope() {
    let mut table = SymTable::new();
    assert!(table.insert("x", Symbol::new("x", "int")));
    assert!(!table.insert("x", Symbol::new("x", "char")));
    assert_eq!(table.find("x").unwrap().ty, "int");
}

#[test]
fn test_shadowing() {
    let mut table = SymTable::new();
    table.insert("x", Symbol::new("x", "int"));

    table.push_scope();
    table.insert("y", Symbol::new("y", "float"));
    assert_eq!(table.find("y").unwrap().ty, "float");
    assert_eq!(table.find("x").unwrap().ty, "int");

    assert!(table.insert("x", Symbol::new("x", "char")));
    assert_eq!(table.find("x").unwrap().ty, "char");

    let inner = table.pop_scope().unwrap();
    assert_eq!(inner.keys().collect::<Vec<_>>(), vec!["y", "x"]);
    assert_eq!(table.find("x").unwrap().ty, "int");
    assert_eq!(table.find("y"), None);
}

#[test]
fn test_global_scope_is_never_popped() {
    let mut table = SymTable::new();
    assert_eq!(table.depth(), 1);
    table.push_scope();
    table.push_scope();
    assert_eq!(table.depth(), 3);
    assert!(table.pop_scope().is_some());
    assert!(table.pop_scope().is_some());
    assert!(table.pop_scope().is_none());
    assert_eq!(table.depth(), 1);
}

#[test]
fn test_current_scope_keeps_declaration_order() {
    let mut table = SymTable::new();
    for name in ["c", "a", "b"] {
        table.insert(name, Symbol::new(name, "int"));
    }
    let rendered: Vec<String> = table.current().values().map(|s| s.to_string()).collect();
    assert_eq!(rendered, vec!["c : int", "a : int", "b : int"]);
}
