//! Bracketed rendering of a result tree.
//!
//! `[ app [ -x <123> ] <value> ]`: commands and options are bracketed,
//! argument values are angle-bracketed. A node with errors is prefixed with
//! `!`, one synthesized from a default with `*`. Arguments are bracketed
//! with their name when their command declares more than one. Unmatched
//! tokens follow as `   ???--> a b`.

use command_line_core::Value;

use crate::result::{ParseResult, ResultKind, SymbolResult};

pub(crate) fn render(result: &ParseResult<'_>) -> String {
    let mut out = String::new();
    node(&mut out, result.root_result());

    let unmatched = result.unmatched_tokens();
    if !unmatched.is_empty() {
        out.push_str("   ???--> ");
        out.push_str(&unmatched.join(" "));
    }
    out
}

fn marker(out: &mut String, result: SymbolResult<'_>) {
    if result.has_errors() {
        out.push('!');
    }
    if result.is_implicit() {
        out.push('*');
    }
}

fn values(out: &mut String, result: SymbolResult<'_>) {
    if result.is_implicit() {
        let mut items = Vec::new();
        match result.value() {
            Some(Value::List(list)) => items.extend(list),
            Some(value) => items.push(value),
            None => {}
        }
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            out.push_str(&format!("<{item}>"));
        }
        return;
    }
    for (i, token) in result.tokens().iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(&format!("<{}>", token.value));
    }
}

fn node(out: &mut String, result: SymbolResult<'_>) {
    marker(out, result);
    match result.kind() {
        ResultKind::Command => {
            let name = result
                .occurrences()
                .iter()
                .find(|t| t.kind == crate::TokenKind::Command)
                .map_or(result.name(), |t| t.value.as_str());
            out.push_str("[ ");
            out.push_str(name);
            for child in result.children() {
                out.push(' ');
                node(out, child);
            }
            out.push_str(" ]");
        }
        ResultKind::Option => {
            let alias = result
                .token()
                .map_or(result.declaration().display_alias(), |t| t.value.as_str());
            out.push_str("[ ");
            out.push_str(alias);
            if !result.tokens().is_empty() || result.is_implicit() {
                out.push(' ');
                values(out, result);
            }
            out.push_str(" ]");
        }
        ResultKind::Argument => {
            let named = result
                .parent()
                .and_then(|p| p.declaration().as_command().map(|c| c.arguments().len() > 1))
                .unwrap_or(false);
            if named {
                out.push_str("[ ");
                out.push_str(result.name());
                out.push(' ');
                values(out, result);
                out.push_str(" ]");
            } else {
                values(out, result);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use command_line_core::*;

    use crate::Parser;

    #[test]
    fn test_diagram_option_and_argument() {
        let schema = CommandSchema::new("app")
            .with_option(OptionSchema::new(["-x"], ValueType::Int))
            .with_argument(ArgumentSchema::new("value", ValueType::String));
        let tree = SymbolTree::from_schema(&schema).unwrap();
        let result = Parser::new(&tree).parse(&["-x", "123", "value"]);
        assert_eq!(result.diagram(), "[ app [ -x <123> ] <value> ]");
    }

    #[test]
    fn test_diagram_marks_errors_implicit_and_unmatched() {
        let schema = CommandSchema::new("app")
            .with_option(OptionSchema::new(["-x"], ValueType::Int))
            .with_option(OptionSchema::new(["--level"], ValueType::Int).with_default(3))
            .allow_unmatched_tokens();
        let tree = SymbolTree::from_schema(&schema).unwrap();
        let result = Parser::new(&tree).parse(&["-x", "abc", "extra", "--nope"]);
        assert_eq!(
            result.diagram(),
            "[ app ![ -x <abc> ] *[ --level <3> ] ]   ???--> extra --nope"
        );
    }

    #[test]
    fn test_diagram_names_arguments_when_several() {
        let schema = CommandSchema::new("cp")
            .with_subcommand(
                CommandSchema::new("copy")
                    .with_alias("c")
                    .with_argument(ArgumentSchema::new("from", ValueType::Path))
                    .with_argument(ArgumentSchema::new("to", ValueType::Path)),
            )
            .with_handler("cp");
        let tree = SymbolTree::from_schema(&schema).unwrap();
        let result = Parser::new(&tree).parse(&["c", "a", "b"]);
        assert_eq!(result.diagram(), "[ cp [ c [ from <a> ] [ to <b> ] ] ]");
    }
}
