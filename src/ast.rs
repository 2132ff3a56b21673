//! The grammar AST produced by a PEG front end and consumed by the passes
//! and emitter in this crate.
//!
//! Every node carries a `resultStackDepth` / `posStackDepth` pair once the
//! stack-depth pass (`passes::stack_depth`) has run; before that they sit
//! at zero. Modeling the operators as a single tagged enum, rather than a
//! trait object per node kind, lets the compiler enforce that every pass
//! and the emitter handle every variant (see `visitor`).

use indexmap::IndexMap;
use smol_str::SmolStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A single inclusive range, or a lone character, inside a character class.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum ClassPart {
    Char(char),
    Range(char, char),
}

/// A PEG expression node. `kind` carries the operator; `result_stack_depth`
/// and `pos_stack_depth` are filled in by `passes::stack_depth::annotate`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Expr {
    pub kind: ExprKind,
    #[cfg_attr(feature = "serde", serde(default))]
    pub result_stack_depth: usize,
    #[cfg_attr(feature = "serde", serde(default))]
    pub pos_stack_depth: usize,
}

/// The PEG operators, see §3.1 of the grammar model: ordered choice,
/// sequencing, the four lookahead/predicate forms, the two repetition
/// forms, actions, rule references and the three terminal matchers.
///
/// Serialized adjacently-tagged (`type` + `value`) rather than internally
/// tagged: several variants here (`Choice`, `Sequence`) wrap a bare
/// `Vec<Expr>`, and serde's internally tagged representation only supports
/// newtype variants that serialize to a map — flattening a sequence into
/// the tag object isn't representable. Adjacent tagging keeps the `type`
/// discriminator §3.1 describes without that restriction.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(tag = "type", content = "value", rename_all = "snake_case")
)]
pub enum ExprKind {
    Choice(Vec<Expr>),
    Sequence(Vec<Expr>),
    Labeled {
        label: SmolStr,
        expression: Box<Expr>,
    },
    SimpleAnd(Box<Expr>),
    SimpleNot(Box<Expr>),
    SemanticAnd {
        code: String,
    },
    SemanticNot {
        code: String,
    },
    Optional(Box<Expr>),
    ZeroOrMore(Box<Expr>),
    OneOrMore(Box<Expr>),
    Action {
        expression: Box<Expr>,
        code: String,
    },
    RuleRef {
        name: SmolStr,
    },
    Literal {
        value: String,
    },
    Any,
    Class {
        parts: Vec<ClassPart>,
        inverted: bool,
        raw_text: String,
    },
}

impl Expr {
    fn new(kind: ExprKind) -> Self {
        Expr {
            kind,
            result_stack_depth: 0,
            pos_stack_depth: 0,
        }
    }

    pub fn choice(alternatives: Vec<Expr>) -> Self {
        Expr::new(ExprKind::Choice(alternatives))
    }

    pub fn sequence(elements: Vec<Expr>) -> Self {
        Expr::new(ExprKind::Sequence(elements))
    }

    pub fn labeled(label: impl Into<SmolStr>, expression: Expr) -> Self {
        Expr::new(ExprKind::Labeled {
            label: label.into(),
            expression: Box::new(expression),
        })
    }

    pub fn simple_and(expression: Expr) -> Self {
        Expr::new(ExprKind::SimpleAnd(Box::new(expression)))
    }

    pub fn simple_not(expression: Expr) -> Self {
        Expr::new(ExprKind::SimpleNot(Box::new(expression)))
    }

    pub fn semantic_and(code: impl Into<String>) -> Self {
        Expr::new(ExprKind::SemanticAnd { code: code.into() })
    }

    pub fn semantic_not(code: impl Into<String>) -> Self {
        Expr::new(ExprKind::SemanticNot { code: code.into() })
    }

    pub fn optional(expression: Expr) -> Self {
        Expr::new(ExprKind::Optional(Box::new(expression)))
    }

    pub fn zero_or_more(expression: Expr) -> Self {
        Expr::new(ExprKind::ZeroOrMore(Box::new(expression)))
    }

    pub fn one_or_more(expression: Expr) -> Self {
        Expr::new(ExprKind::OneOrMore(Box::new(expression)))
    }

    pub fn action(expression: Expr, code: impl Into<String>) -> Self {
        Expr::new(ExprKind::Action {
            expression: Box::new(expression),
            code: code.into(),
        })
    }

    pub fn rule_ref(name: impl Into<SmolStr>) -> Self {
        Expr::new(ExprKind::RuleRef { name: name.into() })
    }

    pub fn literal(value: impl Into<String>) -> Self {
        Expr::new(ExprKind::Literal {
            value: value.into(),
        })
    }

    pub fn any() -> Self {
        Expr::new(ExprKind::Any)
    }

    pub fn class(parts: Vec<ClassPart>, inverted: bool, raw_text: impl Into<String>) -> Self {
        Expr::new(ExprKind::Class {
            parts,
            inverted,
            raw_text: raw_text.into(),
        })
    }

    /// True for a rule body that is exactly a `rule_ref` — the definition
    /// of a proxy rule used by `passes::proxy`.
    pub fn is_bare_rule_ref(&self) -> bool {
        matches!(self.kind, ExprKind::RuleRef { .. })
    }
}

/// Raw host-language code inserted verbatim at the top of the emitted
/// parser, visible to every action and semantic-predicate block.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Initializer {
    pub code: String,
}

/// One named production. `display_name`, when set, is used instead of the
/// raw rule name in "Expected ..." error messages.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rule {
    pub name: SmolStr,
    pub display_name: Option<String>,
    pub expression: Expr,
    #[cfg_attr(feature = "serde", serde(default))]
    pub result_stack_depth: usize,
    #[cfg_attr(feature = "serde", serde(default))]
    pub pos_stack_depth: usize,
}

impl Rule {
    pub fn new(name: impl Into<SmolStr>, expression: Expr) -> Self {
        Rule {
            name: name.into(),
            display_name: None,
            expression,
            result_stack_depth: 0,
            pos_stack_depth: 0,
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }
}

/// The top-level grammar: an optional initializer, the designated start
/// rule, and the rule table. Insertion order of `rules` is not semantically
/// significant (§3.1); passes that need a deterministic traversal order
/// sort rule names instead of relying on it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Grammar {
    pub initializer: Option<Initializer>,
    pub start_rule: SmolStr,
    pub rules: IndexMap<SmolStr, Rule>,
}

impl Grammar {
    pub fn new(start_rule: impl Into<SmolStr>, rules: IndexMap<SmolStr, Rule>) -> Self {
        Grammar {
            initializer: None,
            start_rule: start_rule.into(),
            rules,
        }
    }

    pub fn with_initializer(mut self, code: impl Into<String>) -> Self {
        self.initializer = Some(Initializer { code: code.into() });
        self
    }
}
