//! Declaration model
//!
//! Plain, immutable values describing the types and methods of a
//! compilation unit. Every value here has structural equality so that
//! anything derived from it can be compared and cached by value.
//!
//! Identity is carried by [`TypeId`] and [`MethodId`] handles. Two types
//! that happen to share a display name are still distinct symbols.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Nesting deeper than this is treated as a broken containing-type chain
const MAX_NESTING_DEPTH: usize = 256;

/// Identity handle of a type symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeId(pub u32);

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "type#{}", self.0)
    }
}

/// Identity handle of a method symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MethodId(pub u32);

impl fmt::Display for MethodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "method#{}", self.0)
    }
}

/// Declared accessibility of a type or method
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Accessibility {
    /// No accessibility applies (or none was written)
    #[default]
    NotApplicable,
    Private,
    /// `private protected`
    #[serde(alias = "private_protected")]
    ProtectedAndInternal,
    Protected,
    Internal,
    /// `protected internal`
    #[serde(alias = "protected_internal")]
    ProtectedOrInternal,
    Public,
}

impl Accessibility {
    /// Canonical modifier keywords, including the trailing space.
    ///
    /// Returns an empty string when no modifier should be written.
    pub fn modifier(self) -> &'static str {
        match self {
            Accessibility::Public => "public ",
            Accessibility::Private => "private ",
            Accessibility::Internal => "internal ",
            Accessibility::Protected => "protected ",
            Accessibility::ProtectedOrInternal => "protected internal ",
            Accessibility::ProtectedAndInternal => "private protected ",
            Accessibility::NotApplicable => "",
        }
    }
}

/// Structural kind of a type declaration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    #[default]
    Class,
    Struct,
    Interface,
    Record,
    RecordStruct,
    Enum,
    Delegate,
}

impl TypeKind {
    /// Declaration keyword; kinds without their own wrapper form fall back to `class`
    pub fn keyword(self) -> &'static str {
        match self {
            TypeKind::Class => "class",
            TypeKind::Struct => "struct",
            TypeKind::Interface => "interface",
            _ => "class",
        }
    }
}

/// How an argument is passed to a parameter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefKind {
    /// By value
    #[default]
    None,
    /// By reference (`ref`)
    Ref,
    /// Output only (`out`)
    Out,
    /// Input only (`in`)
    In,
}

impl RefKind {
    pub fn keyword(self) -> &'static str {
        match self {
            RefKind::None => "",
            RefKind::Ref => "ref",
            RefKind::Out => "out",
            RefKind::In => "in",
        }
    }
}

/// Which half of a split (partial) method a declaration is
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartialKind {
    /// An ordinary, complete method
    #[default]
    None,
    /// Forward declaration without a body, awaiting completion
    Definition,
    /// The completing half that carries the body
    Implementation,
}

/// A compile-time constant value
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstantValue {
    String(String),
    Integer(i64),
    Boolean(bool),
    Null,
}

/// One argument of an annotation
///
/// Manifest forms: `{ string = "Login" }`, `{ integer = 3 }`,
/// `{ boolean = true }`, `"null"` and `{ expression = "Names.Login()" }`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeArgument {
    /// Argument the host folded to a constant
    Constant(ConstantValue),
    /// Argument that could not be folded; kept as source text
    Expression { expression: String },
}

impl AttributeArgument {
    /// The argument as a string constant, if it is one
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeArgument::Constant(ConstantValue::String(s)) => Some(s),
            _ => None,
        }
    }
}

/// An annotation applied to a declaration
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Attribute {
    /// Name as written at the use site (`OnEvent`, `OnEventAttribute`, `Ns.OnEvent`)
    pub name: String,
    #[serde(default)]
    pub arguments: Vec<AttributeArgument>,
}

impl Attribute {
    /// Whether this annotation names `expected`.
    ///
    /// The long `...Attribute` form and namespace-qualified forms name the
    /// same annotation as the short form.
    pub fn is(&self, expected: &str) -> bool {
        let simple = self.name.rsplit('.').next().unwrap_or(&self.name);
        let simple = simple.strip_prefix("global::").unwrap_or(simple);
        simple == expected || simple.strip_suffix("Attribute") == Some(expected)
    }

    /// The single argument, when the annotation has exactly one
    pub fn single_argument(&self) -> Option<&AttributeArgument> {
        match self.arguments.as_slice() {
            [arg] => Some(arg),
            _ => None,
        }
    }
}

/// A method parameter
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    /// Display text of the resolved parameter type
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub ref_kind: RefKind,
    /// Display text of an explicit default value
    #[serde(default, rename = "default")]
    pub default_value: Option<String>,
}

/// A named type (class, struct, interface, ...)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeSymbol {
    pub id: TypeId,
    /// Simple name, without type parameters
    pub name: String,
    /// Namespace; only meaningful on an outermost type
    pub namespace: Option<String>,
    /// Immediately enclosing type, `None` for a top-level type
    pub containing_type: Option<TypeId>,
    pub kind: TypeKind,
    pub accessibility: Accessibility,
    pub is_abstract: bool,
    pub is_sealed: bool,
    pub is_static: bool,
    pub type_parameters: Vec<String>,
}

impl TypeSymbol {
    pub fn is_generic(&self) -> bool {
        !self.type_parameters.is_empty()
    }

    /// Simple name with its type parameter list (`Cache<K, V>`)
    pub fn display_name(&self) -> String {
        if self.is_generic() {
            format!("{}<{}>", self.name, self.type_parameters.join(", "))
        } else {
            self.name.clone()
        }
    }
}

/// A method declaration
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodSymbol {
    pub id: MethodId,
    pub name: String,
    pub containing_type: TypeId,
    pub accessibility: Accessibility,
    pub is_static: bool,
    pub partial: PartialKind,
    /// Display text of the return type (`void` for none)
    pub return_type: String,
    pub type_parameters: Vec<String>,
    pub parameters: Vec<Parameter>,
    /// Annotations in source order
    pub attributes: Vec<Attribute>,
}

impl MethodSymbol {
    pub fn returns_void(&self) -> bool {
        self.return_type.trim() == "void"
    }

    /// Whether this is a forward declaration awaiting a generated body
    pub fn is_forward_declaration(&self) -> bool {
        self.partial == PartialKind::Definition
    }

    /// Annotations named `name`, in source order
    pub fn attributes_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Attribute> {
        self.attributes.iter().filter(move |attr| attr.is(name))
    }
}

/// Broken symbol table invariants
///
/// These are consistency failures of the table itself, never user-level
/// outcomes: a well-formed table cannot produce them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolError {
    /// A handle that the table does not know
    UnknownType(TypeId),
    /// A containing-type chain that loops back on itself
    CyclicNesting(TypeId),
}

impl fmt::Display for SymbolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymbolError::UnknownType(id) => write!(f, "unknown type symbol {}", id),
            SymbolError::CyclicNesting(id) => {
                write!(f, "containing-type chain of {} is cyclic", id)
            }
        }
    }
}

impl std::error::Error for SymbolError {}

/// Read-only access to the declarations of a compilation unit
///
/// Implementations only need to enumerate methods and look types up by
/// handle; nesting and naming are derived from those two operations.
pub trait SymbolTable: Sync {
    /// All method declarations, in source order
    fn methods(&self) -> &[MethodSymbol];

    /// Look a type up by its handle
    fn type_symbol(&self, id: TypeId) -> Option<&TypeSymbol>;

    /// Ancestors of `id` including itself, outermost first
    fn containing_chain(&self, id: TypeId) -> Result<Vec<&TypeSymbol>, SymbolError> {
        let mut chain: Vec<&TypeSymbol> = Vec::new();
        let mut next = Some(id);
        while let Some(current) = next {
            if chain.len() >= MAX_NESTING_DEPTH || chain.iter().any(|ty| ty.id == current) {
                return Err(SymbolError::CyclicNesting(id));
            }
            let ty = self
                .type_symbol(current)
                .ok_or(SymbolError::UnknownType(current))?;
            chain.push(ty);
            next = ty.containing_type;
        }
        chain.reverse();
        Ok(chain)
    }

    /// Fully qualified display name (`Game.Hooks.Inner<T>`)
    fn qualified_name(&self, id: TypeId) -> Result<String, SymbolError> {
        let chain = self.containing_chain(id)?;
        Ok(qualify(&chain))
    }
}

/// Fully qualified display name of an outer → inner chain
pub fn qualify(chain: &[&TypeSymbol]) -> String {
    let mut name = String::new();
    if let Some(ns) = chain.first().and_then(|ty| ty.namespace.as_deref())
        && !ns.is_empty()
    {
        name.push_str(ns);
        name.push('.');
    }
    let parts: Vec<String> = chain.iter().map(|ty| ty.display_name()).collect();
    name.push_str(&parts.join("."));
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_type(id: u32, name: &str, containing: Option<u32>) -> TypeSymbol {
        TypeSymbol {
            id: TypeId(id),
            name: name.to_string(),
            namespace: None,
            containing_type: containing.map(TypeId),
            kind: TypeKind::Class,
            accessibility: Accessibility::Public,
            is_abstract: false,
            is_sealed: false,
            is_static: false,
            type_parameters: vec![],
        }
    }

    struct Types(Vec<TypeSymbol>);

    impl SymbolTable for Types {
        fn methods(&self) -> &[MethodSymbol] {
            &[]
        }

        fn type_symbol(&self, id: TypeId) -> Option<&TypeSymbol> {
            self.0.iter().find(|ty| ty.id == id)
        }
    }

    #[test]
    fn test_accessibility_modifiers() {
        assert_eq!(Accessibility::Public.modifier(), "public ");
        assert_eq!(Accessibility::Private.modifier(), "private ");
        assert_eq!(Accessibility::Internal.modifier(), "internal ");
        assert_eq!(Accessibility::Protected.modifier(), "protected ");
        assert_eq!(
            Accessibility::ProtectedOrInternal.modifier(),
            "protected internal "
        );
        assert_eq!(
            Accessibility::ProtectedAndInternal.modifier(),
            "private protected "
        );
        assert_eq!(Accessibility::NotApplicable.modifier(), "");
    }

    #[test]
    fn test_type_kind_fallback() {
        assert_eq!(TypeKind::Struct.keyword(), "struct");
        assert_eq!(TypeKind::Interface.keyword(), "interface");
        assert_eq!(TypeKind::Enum.keyword(), "class");
        assert_eq!(TypeKind::RecordStruct.keyword(), "class");
    }

    #[test]
    fn test_attribute_name_forms() {
        let attr = |name: &str| Attribute {
            name: name.to_string(),
            arguments: vec![],
        };
        assert!(attr("OnEvent").is("OnEvent"));
        assert!(attr("OnEventAttribute").is("OnEvent"));
        assert!(attr("Game.Events.OnEvent").is("OnEvent"));
        assert!(attr("global::Game.OnEventAttribute").is("OnEvent"));
        assert!(!attr("OnEvents").is("OnEvent"));
        assert!(!attr("GeneratedEvent").is("OnEvent"));
    }

    #[test]
    fn test_single_argument() {
        let attr = Attribute {
            name: "OnEvent".to_string(),
            arguments: vec![
                AttributeArgument::Constant(ConstantValue::String("A".to_string())),
                AttributeArgument::Constant(ConstantValue::String("B".to_string())),
            ],
        };
        assert!(attr.single_argument().is_none());

        let arg = AttributeArgument::Constant(ConstantValue::Integer(3));
        assert_eq!(arg.as_str(), None);
        let arg = AttributeArgument::Expression {
            expression: "Names.Login()".to_string(),
        };
        assert_eq!(arg.as_str(), None);
    }

    #[test]
    fn test_containing_chain_outer_first() {
        let table = Types(vec![
            make_type(0, "Outer", None),
            make_type(1, "Middle", Some(0)),
            make_type(2, "Inner", Some(1)),
        ]);
        let chain = table.containing_chain(TypeId(2)).unwrap();
        let names: Vec<&str> = chain.iter().map(|ty| ty.name.as_str()).collect();
        assert_eq!(names, vec!["Outer", "Middle", "Inner"]);
    }

    #[test]
    fn test_containing_chain_cycle() {
        let table = Types(vec![make_type(0, "A", Some(1)), make_type(1, "B", Some(0))]);
        assert_eq!(
            table.containing_chain(TypeId(0)),
            Err(SymbolError::CyclicNesting(TypeId(0)))
        );
    }

    #[test]
    fn test_containing_chain_dangling() {
        let table = Types(vec![make_type(0, "A", Some(9))]);
        assert_eq!(
            table.containing_chain(TypeId(0)),
            Err(SymbolError::UnknownType(TypeId(9)))
        );
    }

    #[test]
    fn test_qualified_name_with_generics() {
        let mut outer = make_type(0, "Cache", None);
        outer.namespace = Some("Game.Data".to_string());
        outer.type_parameters = vec!["K".to_string(), "V".to_string()];
        let table = Types(vec![outer, make_type(1, "Events", Some(0))]);
        assert_eq!(
            table.qualified_name(TypeId(1)).unwrap(),
            "Game.Data.Cache<K, V>.Events"
        );
    }

    #[test]
    fn test_qualified_name_global_namespace() {
        let table = Types(vec![make_type(0, "Hooks", None)]);
        assert_eq!(table.qualified_name(TypeId(0)).unwrap(), "Hooks");
    }
}
