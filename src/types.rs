//! Canonical semantic type representation used throughout lowering.
//!
//! Variants are intentionally closed: lowering pattern-matches exhaustively
//! over `Type` everywhere it cares about shape, and a new primitive or
//! composite kind is meant to be a conscious, localized change rather than
//! something the rest of the crate silently ignores.

use std::fmt::{self, Debug, Display};
use std::sync::atomic::{AtomicU64, Ordering};

/// Source for fresh `Unknown` identities.
///
/// Identity, not value, is what makes two unknowns distinct: the counter
/// only needs to hand out values nothing else will reuse for the lifetime
/// of the process.
static NEXT_UNKNOWN_ID: AtomicU64 = AtomicU64::new(0);

/// A freshly minted id for a new `Type::Unknown`, guaranteed distinct from
/// every id handed out before it in this process.
pub fn fresh_unknown_id() -> u64 {
    NEXT_UNKNOWN_ID.fetch_add(1, Ordering::Relaxed)
}

#[derive(Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Int,
    Int8,
    Int32,
    Bool,
    Void,
    /// `...` in a variadic C-style parameter list; not a first-class value type.
    CVarArgs,
    Pointer(Box<Type>),
    Function {
        params: Vec<Type>,
        return_type: Box<Type>,
        variadic: bool,
    },
    Struct(StructType),
    /// A type not yet resolved by the (external) type checker. Distinct
    /// `Unknown`s never compare equal, even if constructed identically.
    Unknown(u64),
}

#[derive(Clone, Eq)]
pub struct StructType {
    pub name: String,
    pub fields: Vec<(String, Type)>,
    pub methods: Vec<(String, FunctionType)>,
}

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct FunctionType {
    pub params: Vec<Type>,
    pub return_type: Box<Type>,
    pub variadic: bool,
}

impl PartialEq for StructType {
    /// Struct equality is nominal: two `StructType`s with the same name are
    /// the same struct even if their field lists were constructed
    /// independently. See `Type::same_type` for why.
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl std::hash::Hash for StructType {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl Type {
    pub fn pointer_to(pointee: Type) -> Type {
        Type::Pointer(Box::new(pointee))
    }

    pub fn function(params: Vec<Type>, return_type: Type, variadic: bool) -> Type {
        Type::Function {
            params,
            return_type: Box::new(return_type),
            variadic,
        }
    }

    pub fn fresh_unknown() -> Type {
        Type::Unknown(fresh_unknown_id())
    }

    pub fn is_pointer(&self) -> bool {
        matches!(self, Type::Pointer(_))
    }

    /// The pointee of a pointer type, if this is one.
    pub fn pointee(&self) -> Option<&Type> {
        match self {
            Type::Pointer(inner) => Some(inner),
            _ => None,
        }
    }

    /// Structural equality for primitives/pointers/functions, nominal
    /// equality for structs, identity equality for `Unknown`.
    ///
    /// This is deliberately *not* the same relation as `PartialEq` would
    /// derive for `Unknown` if we didn't special-case it: two `Unknown`
    /// variants with the same id are the same placeholder, but two
    /// `Unknown`s are never interchangeable just because they were both
    /// constructed as "unknown".
    pub fn same_type(&self, other: &Type) -> bool {
        match (self, other) {
            (Type::Int, Type::Int) => true,
            (Type::Int8, Type::Int8) => true,
            (Type::Int32, Type::Int32) => true,
            (Type::Bool, Type::Bool) => true,
            (Type::Void, Type::Void) => true,
            (Type::CVarArgs, Type::CVarArgs) => true,
            (Type::Pointer(l), Type::Pointer(r)) => l.same_type(r),
            (
                Type::Function {
                    params: lp,
                    return_type: lr,
                    variadic: lv,
                },
                Type::Function {
                    params: rp,
                    return_type: rr,
                    variadic: rv,
                },
            ) => {
                lv == rv
                    && lr.same_type(rr)
                    && lp.len() == rp.len()
                    && lp.iter().zip(rp.iter()).all(|(a, b)| a.same_type(b))
            }
            (Type::Struct(l), Type::Struct(r)) => l.name == r.name,
            (Type::Unknown(l), Type::Unknown(r)) => l == r,
            _ => false,
        }
    }

    /// Whether a value of `self` may be used where `other` is expected
    /// without an explicit cast.
    pub fn implicitly_convertible(&self, other: &Type) -> bool {
        match (self, other) {
            (Type::Unknown(_), _) | (_, Type::Unknown(_)) => false,
            (Type::Pointer(l), Type::Pointer(r)) => l.implicitly_convertible(r),
            (Type::Function { .. }, Type::Function { .. }) => self.same_type(other),
            (Type::Struct(_), Type::Struct(_)) => self.same_type(other),
            _ => self.same_type(other),
        }
    }

    /// False if this type (or any type it is built from) contains an
    /// `Unknown`.
    pub fn is_concrete(&self) -> bool {
        match self {
            Type::Unknown(_) => false,
            Type::Pointer(inner) => inner.is_concrete(),
            Type::Function {
                params,
                return_type,
                ..
            } => return_type.is_concrete() && params.iter().all(Type::is_concrete),
            Type::Struct(s) => s.fields.iter().all(|(_, t)| t.is_concrete()),
            _ => true,
        }
    }

    /// Canonical string form, used for debug printing and as the
    /// keyed/deterministic part of error messages. Not guaranteed stable
    /// across crate versions.
    pub fn type_id(&self) -> String {
        match self {
            Type::Int => "Int".to_string(),
            Type::Int8 => "Int8".to_string(),
            Type::Int32 => "Int32".to_string(),
            Type::Bool => "Bool".to_string(),
            Type::Void => "Void".to_string(),
            Type::CVarArgs => "...".to_string(),
            Type::Pointer(inner) => format!("*{}", inner.type_id()),
            Type::Function {
                params,
                return_type,
                variadic,
            } => {
                let mut parts: Vec<String> = params.iter().map(Type::type_id).collect();
                if *variadic {
                    parts.push("...".to_string());
                }
                format!("({}) -> {}", parts.join(", "), return_type.type_id())
            }
            Type::Struct(s) => s.name.clone(),
            Type::Unknown(id) => format!("?{id}"),
        }
    }
}

impl Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_id())
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_id())
    }
}

impl Debug for StructType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!("struct {}", self.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitives_are_structurally_equal() {
        assert!(Type::Int.same_type(&Type::Int));
        assert!(!Type::Int.same_type(&Type::Int32));
        assert!(!Type::Int.same_type(&Type::Bool));
    }

    #[test]
    fn pointers_compare_pointee() {
        let a = Type::pointer_to(Type::Int8);
        let b = Type::pointer_to(Type::Int8);
        let c = Type::pointer_to(Type::Bool);
        assert!(a.same_type(&b));
        assert!(!a.same_type(&c));
    }

    #[test]
    fn unknowns_are_never_equal_across_instances() {
        let a = Type::fresh_unknown();
        let b = Type::fresh_unknown();
        assert!(!a.same_type(&b));
        assert!(a.same_type(&a.clone()));
    }

    #[test]
    fn structs_compare_nominally() {
        let point_a = Type::Struct(StructType {
            name: "Point".to_string(),
            fields: vec![("x".to_string(), Type::Int)],
            methods: vec![],
        });
        let point_b = Type::Struct(StructType {
            name: "Point".to_string(),
            fields: vec![],
            methods: vec![],
        });
        assert!(point_a.same_type(&point_b));
    }

    #[test]
    fn implicit_conversion_is_reflexive_on_concrete_types() {
        assert!(Type::Int.implicitly_convertible(&Type::Int));
        assert!(!Type::fresh_unknown().implicitly_convertible(&Type::Int));
    }

    #[test]
    fn concreteness_propagates_through_composites() {
        assert!(Type::pointer_to(Type::Int).is_concrete());
        assert!(!Type::pointer_to(Type::fresh_unknown()).is_concrete());
        let func = Type::function(vec![Type::Int, Type::fresh_unknown()], Type::Void, false);
        assert!(!func.is_concrete());
    }

    #[test]
    fn type_id_is_readable_and_injective_over_concrete_shapes() {
        assert_eq!(Type::Int.type_id(), "Int");
        assert_eq!(Type::pointer_to(Type::Int8).type_id(), "*Int8");
        let func = Type::function(vec![Type::Int, Type::Bool], Type::Void, false);
        assert_eq!(func.type_id(), "(Int, Bool) -> Void");
        let variadic = Type::function(vec![Type::Int32], Type::Int, true);
        assert_eq!(variadic.type_id(), "(Int32, ...) -> Int");
    }
}
