//! Property tests: a declaration and a call to it produce the same key.

use proptest::prelude::*;
use recursa_core::{CanonicalizationConfig, ResolvedSymbol, TypeCanonicalizer, VertexKey};

fn simple_name() -> impl Strategy<Value = String> {
    "[A-Z][a-zA-Z0-9_]{0,8}"
}

fn package() -> impl Strategy<Value = String> {
    "[a-z]{1,6}(\\.[a-z]{1,6}){0,3}"
}

fn simple_names() -> TypeCanonicalizer {
    TypeCanonicalizer::new(CanonicalizationConfig {
        strip_qualifiers: true,
        ..Default::default()
    })
}

proptest! {
    #[test]
    fn java_lang_names_coincide_with_simple_names(name in simple_name()) {
        let canon = TypeCanonicalizer::default();
        prop_assert_eq!(canon.canonicalize(&format!("java.lang.{name}")), name.clone());
        prop_assert_eq!(canon.canonicalize(&name), name);
    }

    #[test]
    fn packages_keep_same_simple_names_apart(
        name in simple_name(),
        first in package(),
        second in package(),
    ) {
        prop_assume!(first != second && first != "java.lang" && second != "java.lang");
        let canon = TypeCanonicalizer::default();
        prop_assert_ne!(
            canon.canonicalize(&format!("{first}.{name}")),
            canon.canonicalize(&format!("{second}.{name}"))
        );
        prop_assert_eq!(
            simple_names().canonicalize(&format!("{first}.{name}")),
            simple_names().canonicalize(&format!("{second}.{name}"))
        );
    }

    #[test]
    fn generic_arguments_are_erased(
        name in simple_name(),
        arg in simple_name(),
        pkg in package(),
    ) {
        let canon = TypeCanonicalizer::default();
        let declared = format!("{pkg}.{name}<{arg}>");
        let resolved = format!("{pkg}.{name}<java.lang.{arg}>");
        prop_assert_eq!(canon.canonicalize(&declared), canon.canonicalize(&resolved));
        prop_assert!(!canon.canonicalize(&declared).contains('<'));
    }

    #[test]
    fn varargs_and_binary_arrays_coincide(name in simple_name(), pkg in package()) {
        let canon = TypeCanonicalizer::default();
        let varargs = canon.canonicalize(&format!("{pkg}.{name}..."));
        let binary = canon.canonicalize(&format!("[L{pkg}.{name};"));
        let slashed = canon.canonicalize(&format!("[L{};", format!("{pkg}.{name}").replace('.', "/")));
        prop_assert!(varargs.ends_with("[]"));
        prop_assert_eq!(&varargs, &binary);
        prop_assert_eq!(varargs, slashed);
    }

    #[test]
    fn canonicalization_is_idempotent(
        name in simple_name(),
        arg in simple_name(),
        pkg in package(),
        spaces in " {0,3}",
    ) {
        for canon in [TypeCanonicalizer::default(), simple_names()] {
            for descriptor in [
                format!("{pkg}.{name}"),
                format!("{name}{spaces}<{spaces}{arg}{spaces}>"),
                format!("{name}{spaces}..."),
                format!("[[L{pkg}.{name};"),
            ] {
                let once = canon.canonicalize(&descriptor);
                prop_assert_eq!(canon.canonicalize(&once), once.clone());
            }
        }
    }

    #[test]
    fn recursive_call_lands_on_its_declaration(
        owner in simple_name(),
        pkg in package(),
        method in "[a-z][a-zA-Z0-9]{0,8}",
        param in simple_name(),
    ) {
        let canon = TypeCanonicalizer::default();
        let owner = format!("{pkg}.{owner}");
        let declaration = ResolvedSymbol::new(
            owner.clone(),
            method.clone(),
            [format!("{pkg}.{param}..."), "String".to_string()],
        );
        let call = ResolvedSymbol::new(
            owner,
            method,
            [format!("[L{pkg}.{param};"), "java.lang.String".to_string()],
        );
        prop_assert_eq!(
            VertexKey::from_symbol(&declaration, &canon),
            VertexKey::from_symbol(&call, &canon)
        );
    }
}
