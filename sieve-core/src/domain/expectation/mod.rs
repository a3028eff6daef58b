// sieve-core/src/domain/expectation/mod.rs

pub mod kind;
pub mod literal;
pub mod naming;
pub mod result;

pub use kind::{Category, ExpectationKind, TargetColumn};
pub use literal::Literal;
pub use result::ExpectationResult;

/// One configured expectation together with its raw disposition action.
///
/// The action stays a string here: values other than `skip`/`failure` are
/// tolerated and simply yield no policy entry.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpectationDecl {
    pub kind: ExpectationKind,
    pub action: Option<String>,
}

impl ExpectationDecl {
    pub fn new(kind: ExpectationKind, action: Option<&str>) -> Self {
        Self {
            kind,
            action: action.map(str::to_string),
        }
    }
}
