//! Message catalog
//!
//! Diagnostics are built from stable message keys plus positional arguments.
//! The catalog maps each key to an English template with `{0}`, `{1}`, …
//! placeholders.

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MessageKey {
    Expected,
    ExpectedKey,
    ExpectedValue,
    ExpectedIdentifier,
    ExpectedType,
    ExpectedDeclaration,
    ExpectedResourceLocation,
    TrailingSeparation,
    UnterminatedString,
    DocCommentNotAttached,
    UndefinedModuleSegment,
    EmptyModuleSegment,
    DuplicatedIdentifier,
    DuplicatedIdentifierRelated,
    DuplicatedModuleDeclaration,
    DuplicatedModuleDeclarationRelated,
    NonExistentModule,
    SuperFromRoot,
    UnknownModule,
    UnknownIdentifier,
    CircularModuleDependency,
    PathTooDeep,
    UnmatchedInjection,
    CompoundDefinition,
    EnumDefinition,
}

impl MessageKey {
    /// Stable identifier of the message, independent of its wording
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Expected => "schemata.parser.expected",
            Self::ExpectedKey => "schemata.parser.expected-key",
            Self::ExpectedValue => "schemata.parser.expected-value",
            Self::ExpectedIdentifier => "schemata.parser.expected-identifier",
            Self::ExpectedType => "schemata.parser.expected-type",
            Self::ExpectedDeclaration => "schemata.parser.expected-declaration",
            Self::ExpectedResourceLocation => "schemata.parser.expected-resource-location",
            Self::TrailingSeparation => "schemata.parser.trailing-separation",
            Self::UnterminatedString => "schemata.parser.unterminated-string",
            Self::DocCommentNotAttached => "schemata.parser.doc-comment-not-attached",
            Self::UndefinedModuleSegment => "schemata.checker.entry.undefined-mod-seg",
            Self::EmptyModuleSegment => "schemata.checker.entry.empty-mod-seg",
            Self::DuplicatedIdentifier => "schemata.checker.duplicated-identifier",
            Self::DuplicatedIdentifierRelated => "schemata.checker.duplicated-identifier.related",
            Self::DuplicatedModuleDeclaration => "schemata.checker.module-declaration.duplicated",
            Self::DuplicatedModuleDeclarationRelated => {
                "schemata.checker.module-declaration.duplicated.related"
            }
            Self::NonExistentModule => "schemata.checker.module-declaration.non-existent",
            Self::SuperFromRoot => "schemata.checker.ident-path.super-from-root",
            Self::UnknownModule => "schemata.checker.ident-path.unknown-module",
            Self::UnknownIdentifier => "schemata.checker.ident-path.unknown-identifier",
            Self::CircularModuleDependency => "schemata.checker.ident-path.circular-dependency",
            Self::PathTooDeep => "schemata.checker.ident-path.too-deep",
            Self::UnmatchedInjection => "schemata.checker.inject-clause.unmatched-injection",
            Self::CompoundDefinition => "schemata.node.compound-definition",
            Self::EnumDefinition => "schemata.node.enum-definition",
        }
    }

    fn template(&self) -> &'static str {
        match self {
            Self::Expected => "Expected {0}",
            Self::ExpectedKey => "Expected a key",
            Self::ExpectedValue => "Expected a value",
            Self::ExpectedIdentifier => "Expected an identifier",
            Self::ExpectedType => "Expected a type",
            Self::ExpectedDeclaration => "Expected a declaration",
            Self::ExpectedResourceLocation => "Expected a resource location",
            Self::TrailingSeparation => "Trailing separation",
            Self::UnterminatedString => "Unterminated string",
            Self::DocCommentNotAttached => "Doc comment is not attached to a declaration",
            Self::UndefinedModuleSegment => {
                "Undefined module segment: this file is not part of any registered module"
            }
            Self::EmptyModuleSegment => {
                "Empty module segment: declarations in this file belong to the root module"
            }
            Self::DuplicatedIdentifier => "Duplicated identifier {0}",
            Self::DuplicatedIdentifierRelated => "{0} is first declared here",
            Self::DuplicatedModuleDeclaration => "Duplicated module declaration {0}",
            Self::DuplicatedModuleDeclarationRelated => "Module {0} is first declared here",
            Self::NonExistentModule => "Module {0} does not exist",
            Self::SuperFromRoot => "Cannot go above root with \"super\"",
            Self::UnknownModule => "Unknown module {0}",
            Self::UnknownIdentifier => "Unknown identifier {0} in module {1}",
            Self::CircularModuleDependency => "Circular module dependency on {0}",
            Self::PathTooDeep => "Identifier path exceeds the maximum depth of {0}",
            Self::UnmatchedInjection => "Unmatched injection: cannot inject {1} into {0}",
            Self::CompoundDefinition => "struct",
            Self::EnumDefinition => "enum",
        }
    }
}

impl fmt::Display for MessageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Render a message from its key and positional arguments
///
/// Placeholders without a matching argument are left untouched.
pub fn message(key: MessageKey, args: &[&str]) -> String {
    let template = key.template();
    let mut out = String::with_capacity(template.len() + 16);
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let index = after
            .find('}')
            .and_then(|close| after[..close].parse::<usize>().ok().map(|i| (i, close)));
        match index {
            Some((i, close)) if i < args.len() => {
                out.push_str(args[i]);
                rest = &after[close + 1..];
            }
            _ => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Wrap a value in quotes for use as a message argument
pub fn quote(value: &str) -> String {
    format!("\"{value}\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_substitution() {
        assert_eq!(
            message(MessageKey::Expected, &[&quote("{")]),
            "Expected \"{\""
        );
        assert_eq!(
            message(MessageKey::UnknownIdentifier, &["\"Foo\"", "\"::a::b\""]),
            "Unknown identifier \"Foo\" in module \"::a::b\""
        );
    }

    #[test]
    fn test_message_missing_argument_keeps_placeholder() {
        assert_eq!(message(MessageKey::UnknownModule, &[]), "Unknown module {0}");
    }

    #[test]
    fn test_argument_order_is_positional() {
        let rendered = message(MessageKey::UnmatchedInjection, &["struct", "enum"]);
        assert_eq!(rendered, "Unmatched injection: cannot inject enum into struct");
    }

    #[test]
    fn test_keys_are_unique() {
        use std::collections::HashSet;

        let keys = [
            MessageKey::Expected,
            MessageKey::ExpectedKey,
            MessageKey::ExpectedValue,
            MessageKey::DuplicatedIdentifier,
            MessageKey::DuplicatedIdentifierRelated,
            MessageKey::UnknownModule,
            MessageKey::UnknownIdentifier,
            MessageKey::UnmatchedInjection,
        ];
        let unique: HashSet<_> = keys.iter().map(|k| k.as_str()).collect();
        assert_eq!(unique.len(), keys.len());
    }
}
