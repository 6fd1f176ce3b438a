//! Property-based tests for the directive filter and run determinism.

use cppsim::output::BufferSink;
use cppsim::parser::lexer::{tokenize, Token};
use cppsim::parser::preprocessor::filter;
use cppsim::{run, ErrorKind, InterpreterError, MacroTable};
use proptest::prelude::*;

fn arb_word() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z_][a-z0-9_]{0,6}",
        "[1-9][0-9]{0,4}",
        "[-+*/;(){}<>=,.!]",
        Just("\"text\"".to_string()),
        Just("'c'".to_string()),
    ]
}

fn arb_source() -> impl Strategy<Value = String> {
    prop::collection::vec(arb_word(), 0..40).prop_map(|words| words.join(" "))
}

fn arb_macros() -> impl Strategy<Value = MacroTable> {
    prop::collection::vec("[A-Z]{1,5}", 0..4).prop_map(|names| names.into_iter().collect())
}

fn ident_names(tokens: &[Token]) -> Vec<String> {
    tokens
        .iter()
        .filter_map(|t| match t {
            Token::Ident(name, _) => Some(name.clone()),
            _ => None,
        })
        .collect()
}

proptest! {
    #[test]
    fn filter_is_identity_without_directives(source in arb_source(), macros in arb_macros()) {
        let tokens = tokenize(&source).unwrap();
        let filtered = filter(tokens.clone(), &macros).unwrap();
        prop_assert_eq!(filtered, tokens);
    }

    #[test]
    fn ifdef_keeps_block_only_when_defined(name in "[A-Z]{1,6}", defined in any::<bool>()) {
        let source = format!("#ifdef {name}\nkept\n#endif\ntail\n");
        let names = if defined { vec![name.clone()] } else { vec![] };
        let macros: MacroTable = names.into_iter().collect();
        let filtered = filter(tokenize(&source).unwrap(), &macros).unwrap();
        let expected = if defined { vec!["kept", "tail"] } else { vec!["tail"] };
        prop_assert_eq!(ident_names(&filtered), expected);
    }

    #[test]
    fn ifndef_is_the_complement(name in "[A-Z]{1,6}", defined in any::<bool>()) {
        let source = format!("#ifndef {name}\na\n#else\nb\n#endif\n");
        let mut macros = MacroTable::new();
        if defined {
            macros.define(name.clone());
        }
        let filtered = filter(tokenize(&source).unwrap(), &macros).unwrap();
        let expected = if defined { vec!["b"] } else { vec!["a"] };
        prop_assert_eq!(ident_names(&filtered), expected);
    }

    #[test]
    fn unbalanced_directives_fail(opens in prop::collection::vec(any::<bool>(), 1..12)) {
        // true opens a block, false closes one
        let mut depth: i32 = 0;
        let mut balanced = true;
        let mut source = String::new();
        for open in &opens {
            if *open {
                depth += 1;
                source.push_str("#ifdef X\nx\n");
            } else {
                depth -= 1;
                source.push_str("#endif\n");
            }
            balanced &= depth >= 0;
        }
        balanced &= depth == 0;

        let result = filter(tokenize(&source).unwrap(), &MacroTable::new());
        prop_assert_eq!(result.is_ok(), balanced);
        if let Err(err) = result {
            prop_assert_eq!(InterpreterError::from(err).kind(), ErrorKind::UnbalancedDirective);
        }
    }

    #[test]
    fn runs_are_deterministic(values in prop::collection::vec(-1000i32..1000, 1..10), debug in any::<bool>()) {
        let mut body = String::new();
        for (i, v) in values.iter().enumerate() {
            body.push_str(&format!("    total = total + {v};\n    cout << {i} << \":\" << total << \" \" << total * 0.5 << endl;\n"));
        }
        let source = format!(
            "using namespace std;\nint main() {{\n    int total = 0;\n{body}#ifdef DEBUG\n    cout << \"debug\" << endl;\n#endif\n    return 0;\n}}\n"
        );
        let names = if debug { vec!["DEBUG"] } else { vec![] };
        let macros: MacroTable = names.into_iter().collect();

        let mut first = BufferSink::new();
        let mut second = BufferSink::new();
        let a = run(&source, &macros, &mut first).unwrap();
        let b = run(&source, &macros, &mut second).unwrap();
        prop_assert_eq!(a, b);
        prop_assert_eq!(first.contents(), second.contents());
        prop_assert_eq!(first.lines().len(), values.len() + usize::from(debug));
    }
}
