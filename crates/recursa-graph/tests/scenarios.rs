//! End-to-end scenarios: records in, verdicts out.

use recursa_core::{parse_records, DeclarationRecord, ResolvedSymbol, VertexKey};
use recursa_graph::{
    assert_no_recursion, assert_recursion, build_graph, BuildConfig, DispatchPolicy,
};
use std::collections::BTreeSet;

fn sym(owner: &str, name: &str, types: &[&str]) -> ResolvedSymbol {
    ResolvedSymbol::new(owner, name, types.iter().copied())
}

fn vk(owner: &str, name: &str, types: &[&str]) -> VertexKey {
    VertexKey::new(owner, name, types.iter().copied())
}

fn cycles_of(records: &[DeclarationRecord]) -> BTreeSet<VertexKey> {
    let (graph, _) = build_graph(records, &BuildConfig::default()).unwrap();
    graph.find_cycles().into_members()
}

#[test]
fn scenario_a_direct_recursion() {
    let records = vec![DeclarationRecord::new(sym("A", "f", &[])).with_call(sym("A", "f", &[]))];
    assert_eq!(cycles_of(&records), BTreeSet::from([vk("A", "f", &[])]));
}

#[test]
fn scenario_b_mutual_recursion_across_types() {
    let records = vec![
        DeclarationRecord::new(sym("A", "f", &[])).with_call(sym("B", "g", &[])),
        DeclarationRecord::new(sym("B", "g", &[])).with_call(sym("A", "f", &[])),
    ];
    assert_eq!(
        cycles_of(&records),
        BTreeSet::from([vk("A", "f", &[]), vk("B", "g", &[])])
    );
}

#[test]
fn scenario_c_overload_chain_is_not_recursion() {
    // factorial(int) calls factorial(double), which calls nothing.
    let records = vec![
        DeclarationRecord::new(sym("org.example.FactorialCalculator", "factorial", &["int"]))
            .with_call(sym("org.example.FactorialCalculator", "factorial", &["double"])),
        DeclarationRecord::new(sym("org.example.FactorialCalculator", "factorial", &["double"])),
    ];
    assert!(cycles_of(&records).is_empty());

    let (graph, _) = build_graph(&records, &BuildConfig::default()).unwrap();
    assert_eq!(graph.vertex_count(), 2);
    assert!(assert_no_recursion(&graph, None).is_ok());
}

#[test]
fn scenario_d_extracted_chain() {
    let records = vec![
        DeclarationRecord::new(sym("A", "f", &[])).with_call(sym("B", "g", &[])),
        DeclarationRecord::new(sym("B", "g", &[])).with_call(sym("C", "h", &[])),
        DeclarationRecord::new(sym("C", "h", &[])),
    ];
    let (graph, _) = build_graph(&records, &BuildConfig::default()).unwrap();

    let sub = graph.extract_subgraph(&vk("A", "f", &[])).unwrap();
    assert_eq!(sub.vertex_count(), 3);
    assert_eq!(sub.edge_count(), 2);
    assert!(sub.find_cycles().is_empty());
}

#[test]
fn scenario_e_unrelated_chains() {
    let records = vec![
        DeclarationRecord::new(sym("X", "a", &[])).with_call(sym("X", "b", &[])),
        DeclarationRecord::new(sym("X", "b", &[])).with_call(sym("X", "a", &[])),
        DeclarationRecord::new(sym("Y", "c", &[])).with_call(sym("Y", "d", &[])),
        DeclarationRecord::new(sym("Y", "d", &[])),
    ];
    assert_eq!(
        cycles_of(&records),
        BTreeSet::from([vk("X", "a", &[]), vk("X", "b", &[])])
    );

    let (graph, _) = build_graph(&records, &BuildConfig::default()).unwrap();
    assert!(assert_no_recursion(&graph, Some(&vk("Y", "c", &[]))).is_ok());
    assert!(assert_recursion(&graph, Some(&vk("X", "a", &[]))).is_ok());
}

#[test]
fn recursion_through_interface_dispatch() {
    // Visitor.visit(Node) calls Node.accept(Visitor); Leaf.accept overrides it
    // and calls back into visit.
    let records = vec![
        DeclarationRecord::new(sym("app.Visitor", "visit", &["app.Node"]))
            .with_call(sym("app.Node", "accept", &["app.Visitor"])),
        DeclarationRecord::new(sym("app.Leaf", "accept", &["app.Visitor"]))
            .with_override(sym("app.Node", "accept", &["app.Visitor"]))
            .with_call(sym("app.Visitor", "visit", &["app.Node"])),
    ];

    let (fan_out, _) = build_graph(&records, &BuildConfig::default()).unwrap();
    let start = vk("app.Visitor", "visit", &["app.Node"]);
    let err = assert_no_recursion(&fan_out, Some(&start)).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Unwanted recursion found:\n\
         app.Leaf.accept(app.Visitor), app.Visitor.visit(app.Node)"
    );

    let static_only = BuildConfig {
        dispatch: DispatchPolicy::StaticTarget,
        ..Default::default()
    };
    let (graph, _) = build_graph(&records, &static_only).unwrap();
    assert!(assert_no_recursion(&graph, None).is_ok());
}

#[test]
fn super_call_from_override_is_not_recursion() {
    // class Sub extends Base { void describe() { super.describe(); } }
    let records = vec![
        DeclarationRecord::new(sym("app.Base", "describe", &[])),
        DeclarationRecord::new(sym("app.Sub", "describe", &[]))
            .with_override(sym("app.Base", "describe", &[]))
            .with_special_call(sym("app.Base", "describe", &[])),
        DeclarationRecord::new(sym("app.Main", "show", &["app.Base"]))
            .with_call(sym("app.Base", "describe", &[])),
    ];
    let (graph, _) = build_graph(&records, &BuildConfig::default()).unwrap();

    assert!(assert_no_recursion(&graph, None).is_ok());
    let show = vk("app.Main", "show", &["app.Base"]);
    let reachable: Vec<String> = graph
        .reachable_from(&show)
        .unwrap()
        .into_iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(
        reachable,
        vec!["app.Base.describe()", "app.Main.show(app.Base)", "app.Sub.describe()"]
    );
}

#[test]
fn overloads_on_same_simple_name_stay_distinct() {
    // f(java.util.Date) converts and calls f(java.sql.Date), which calls nothing.
    let records = vec![
        DeclarationRecord::new(sym("app.A", "f", &["java.util.Date"]))
            .with_call(sym("app.A", "f", &["java.sql.Date"])),
        DeclarationRecord::new(sym("app.A", "f", &["java.sql.Date"])),
    ];
    let (graph, report) = build_graph(&records, &BuildConfig::default()).unwrap();

    assert_eq!(graph.vertex_count(), 2);
    assert_eq!(report.merged_declarations, 0);
    assert!(assert_no_recursion(&graph, None).is_ok());
}

#[test]
fn reflective_recursion_is_reported_as_skipped() {
    let input = r#"[
        {
            "declaration": {"owner": "org.example.ReflectionRecursion.Example", "name": "someMethod"},
            "calls": [
                {"status": "resolved", "target": {"owner": "java.io.PrintStream", "name": "println", "types": ["java.lang.String"]}},
                {"status": "resolved", "target": {"owner": "java.lang.Class", "name": "getMethod", "types": ["java.lang.String"]}},
                {"status": "unresolved", "expression": "method.invoke(this)", "reason": "reflective invocation", "line": 10}
            ]
        }
    ]"#;
    let records = parse_records(input).unwrap();
    let (graph, report) = build_graph(&records, &BuildConfig::default()).unwrap();
    assert_eq!(report.unresolved_calls, 1);

    let start = vk("org.example.ReflectionRecursion.Example", "someMethod", &[]);
    let err = assert_recursion(&graph, Some(&start)).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("No recursive call detected"));
    assert!(message.contains("`method.invoke(this)`"));
}

#[test]
fn recursion_through_anonymous_class() {
    // The anonymous MyFunction.apply calls back into performOperation, which
    // invokes the interface method apply.
    let records = vec![
        DeclarationRecord::new(sym(
            "org.example.AnonymousFunc.RecursiveExample",
            "performOperation",
            &["int", "org.example.AnonymousFunc.MyFunction"],
        ))
        .with_call(sym("org.example.AnonymousFunc.MyFunction", "apply", &["int"])),
        DeclarationRecord::new(sym(
            "org.example.AnonymousFunc.RecursiveExample$1",
            "apply",
            &["int"],
        ))
        .with_override(sym("org.example.AnonymousFunc.MyFunction", "apply", &["int"]))
        .with_call(sym(
            "org.example.AnonymousFunc.RecursiveExample",
            "performOperation",
            &["int", "org.example.AnonymousFunc.MyFunction"],
        )),
    ];
    let (graph, _) = build_graph(&records, &BuildConfig::default()).unwrap();

    let start = vk(
        "org.example.AnonymousFunc.RecursiveExample",
        "performOperation",
        &["int", "org.example.AnonymousFunc.MyFunction"],
    );
    assert!(assert_recursion(&graph, Some(&start)).is_ok());
    assert!(graph
        .find_cycles()
        .contains(&vk("org.example.AnonymousFunc.RecursiveExample.1", "apply", &["int"])));
}

#[test]
fn excluding_main_breaks_a_cycle_through_it() {
    let records = vec![
        DeclarationRecord::new(sym("app.Main", "main", &["String[]"]))
            .with_call(sym("app.Main", "run", &[])),
        DeclarationRecord::new(sym("app.Main", "run", &[]))
            .with_call(sym("app.Main", "main", &["[Ljava.lang.String;"])),
    ];
    let (graph, _) = build_graph(&records, &BuildConfig::default()).unwrap();
    assert!(graph.has_cycle());

    let config = BuildConfig {
        exclude: vec!["app.Main.main(String[])".to_string()],
        ..Default::default()
    };
    let (graph, _) = build_graph(&records, &config).unwrap();
    assert!(!graph.has_cycle());
}
