// The formula algebra: an immutable term representation for propositional
// and first-order formulas, plus the small library of partial operations
// that encode the logical semantics the inference rules in `rules.rs` lean
// on.
//
// Children are `Rc` so cloning a `Prop` is O(1) and structural equality/hash
// falls straight out of `#[derive]`. Two formulas are equal iff structurally
// identical; there is no normalization on construction.
//
// A quantifier's bound variable is itself a `Prop` (a `ModelRef`, or a
// `ModelRefHole` inside a rewrite-rule template) rather than a bare
// `String`. That's what lets `unify` treat "unify both the bound variable
// and body" (spec) as nothing more than the same two-child recursion it
// already does for `And`/`Or`/`Imp`.

use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Prop {
    /// An atomic propositional variable, e.g. `P`.
    Base(String),

    /// A pattern hole matching any formula. Only ever appears inside
    /// rewrite-rule templates.
    PropHole(String),

    And(Rc<Prop>, Rc<Prop>),
    Or(Rc<Prop>, Rc<Prop>),
    Imp(Rc<Prop>, Rc<Prop>),

    True,
    False,

    /// An n-ary predicate applied to model references.
    Predicate(String, Vec<Prop>),

    /// A first-order term: a variable or constant of the model. Syntax
    /// alone doesn't distinguish the two; scope tracking does.
    ModelRef(String),

    /// A pattern hole that only ever binds to a `ModelRef`.
    ModelRefHole(String),

    /// `var` is always a `ModelRef` (in a formula parsed from a proof) or a
    /// `ModelRefHole` (in a rewrite-rule template).
    ForAll(Rc<Prop>, Rc<Prop>),
    Exists(Rc<Prop>, Rc<Prop>),
}

impl Prop {
    pub fn and(p: Prop, q: Prop) -> Prop {
        Prop::And(Rc::new(p), Rc::new(q))
    }

    pub fn or(p: Prop, q: Prop) -> Prop {
        Prop::Or(Rc::new(p), Rc::new(q))
    }

    pub fn imp(p: Prop, q: Prop) -> Prop {
        Prop::Imp(Rc::new(p), Rc::new(q))
    }

    pub fn not(p: Prop) -> Prop {
        Prop::imp(p, Prop::False)
    }

    pub fn base(name: impl Into<String>) -> Prop {
        Prop::Base(name.into())
    }

    pub fn model_ref(name: impl Into<String>) -> Prop {
        Prop::ModelRef(name.into())
    }

    pub fn forall(var: Prop, body: Prop) -> Prop {
        Prop::ForAll(Rc::new(var), Rc::new(body))
    }

    pub fn exists(var: Prop, body: Prop) -> Prop {
        Prop::Exists(Rc::new(var), Rc::new(body))
    }

    /// Convenience constructor for the common case of binding a plain
    /// (non-hole) variable name, as the parser does.
    pub fn forall_named(var: impl Into<String>, body: Prop) -> Prop {
        Prop::forall(Prop::model_ref(var), body)
    }

    pub fn exists_named(var: impl Into<String>, body: Prop) -> Prop {
        Prop::exists(Prop::model_ref(var), body)
    }

    pub fn is_hole(&self) -> bool {
        matches!(self, Prop::PropHole(_) | Prop::ModelRefHole(_))
    }

    /// The name of this node if it's a `ModelRef` or `ModelRefHole`.
    pub fn model_ref_name(&self) -> Option<&str> {
        match self {
            Prop::ModelRef(name) | Prop::ModelRefHole(name) => Some(name.as_str()),
            _ => None,
        }
    }

    /// The free model-reference names mentioned anywhere in this formula,
    /// including bound occurrences (the checker is responsible for
    /// excluding bound occurrences where that distinction matters, e.g. in
    /// `alpha_renaming`).
    pub fn symbols(&self) -> std::collections::HashSet<String> {
        let mut out = std::collections::HashSet::new();
        self.collect_symbols(&mut out);
        out
    }

    fn collect_symbols(&self, out: &mut std::collections::HashSet<String>) {
        match self {
            Prop::Base(_) | Prop::PropHole(_) | Prop::True | Prop::False => {}
            Prop::ModelRef(name) | Prop::ModelRefHole(name) => {
                out.insert(name.clone());
            }
            Prop::And(p, q) | Prop::Or(p, q) | Prop::Imp(p, q) => {
                p.collect_symbols(out);
                q.collect_symbols(out);
            }
            Prop::Predicate(_, args) => {
                for arg in args {
                    arg.collect_symbols(out);
                }
            }
            Prop::ForAll(var, body) | Prop::Exists(var, body) => {
                var.collect_symbols(out);
                body.collect_symbols(out);
            }
        }
    }

    /// The free model-reference names mentioned in this formula — unlike
    /// `symbols`, a name only ever occurring bound under an enclosing
    /// `forall`/`exists` is excluded. Used wherever "free symbols of a
    /// formula" has a precise logical meaning, e.g. the UG eigenvariable
    /// side condition.
    pub fn free_symbols(&self) -> std::collections::HashSet<String> {
        let mut out = std::collections::HashSet::new();
        let mut bound = std::collections::HashSet::new();
        self.collect_free_symbols(&mut bound, &mut out);
        out
    }

    fn collect_free_symbols(
        &self,
        bound: &mut std::collections::HashSet<String>,
        out: &mut std::collections::HashSet<String>,
    ) {
        match self {
            Prop::Base(_) | Prop::PropHole(_) | Prop::True | Prop::False => {}
            Prop::ModelRef(name) | Prop::ModelRefHole(name) => {
                if !bound.contains(name) {
                    out.insert(name.clone());
                }
            }
            Prop::And(p, q) | Prop::Or(p, q) | Prop::Imp(p, q) => {
                p.collect_free_symbols(bound, out);
                q.collect_free_symbols(bound, out);
            }
            Prop::Predicate(_, args) => {
                for arg in args {
                    arg.collect_free_symbols(bound, out);
                }
            }
            Prop::ForAll(var, body) | Prop::Exists(var, body) => {
                match var.model_ref_name() {
                    Some(name) => {
                        let newly_bound = bound.insert(name.to_string());
                        body.collect_free_symbols(bound, out);
                        if newly_bound {
                            bound.remove(name);
                        }
                    }
                    None => body.collect_free_symbols(bound, out),
                }
            }
        }
    }

    /// Whether `name` occurs anywhere in this formula as a model reference
    /// (free or bound). Used by the UI side condition ("does `t` appear in
    /// `φ`?").
    pub fn uses(&self, name: &str) -> bool {
        match self {
            Prop::Base(_) | Prop::PropHole(_) | Prop::True | Prop::False => false,
            Prop::ModelRef(n) | Prop::ModelRefHole(n) => n == name,
            Prop::And(p, q) | Prop::Or(p, q) | Prop::Imp(p, q) => p.uses(name) || q.uses(name),
            Prop::Predicate(_, args) => args.iter().any(|a| a.uses(name)),
            Prop::ForAll(var, body) | Prop::Exists(var, body) => {
                var.uses(name) || body.uses(name)
            }
        }
    }
}

impl fmt::Display for Prop {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Prop::Base(name) => write!(f, "{}", name),
            Prop::PropHole(name) => write!(f, "?{}", name),
            Prop::And(p, q) => write!(f, "({} /\\ {})", p, q),
            Prop::Or(p, q) => write!(f, "({} \\/ {})", p, q),
            Prop::Imp(p, q) => write!(f, "({} -> {})", p, q),
            Prop::True => write!(f, "true"),
            Prop::False => write!(f, "false"),
            Prop::Predicate(name, args) => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
            Prop::ModelRef(name) => write!(f, "{}", name),
            Prop::ModelRefHole(name) => write!(f, "?{}", name),
            Prop::ForAll(var, body) => write!(f, "forall {}, {}", var, body),
            Prop::Exists(var, body) => write!(f, "exists {}, {}", var, body),
        }
    }
}

/// A domain error: a partial helper's precondition failed. Kept separate
/// from `CheckError` because these helpers don't know which proof line
/// they're being used from; callers in `rules.rs` attach the line number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainError(pub String);

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

fn fail(message: impl Into<String>) -> DomainError {
    DomainError(message.into())
}

/// `apply(f, x)`: requires `f = Imp(a,b)` and `a = x`; returns `b`.
pub fn apply(f: &Prop, x: &Prop) -> DomainResult<Prop> {
    match f {
        Prop::Imp(a, b) => {
            if a.as_ref() == x {
                Ok(b.as_ref().clone())
            } else {
                Err(fail(format!("implication expects {}, got {}", a, x)))
            }
        }
        _ => Err(fail(format!("{} is not an implication", f))),
    }
}

/// `compose(f, g)`: requires both implications and `f.q = g.p`; returns
/// `Imp(f.p, g.q)`.
pub fn compose(f: &Prop, g: &Prop) -> DomainResult<Prop> {
    match (f, g) {
        (Prop::Imp(fp, fq), Prop::Imp(gp, gq)) => {
            if fq.as_ref() == gp.as_ref() {
                Ok(Prop::imp(fp.as_ref().clone(), gq.as_ref().clone()))
            } else {
                Err(fail(format!("cannot compose {} and {}: {} != {}", f, g, fq, gp)))
            }
        }
        (Prop::Imp(_, _), _) => Err(fail(format!("{} is not an implication", g))),
        _ => Err(fail(format!("{} is not an implication", f))),
    }
}

/// `proj_L(p)`: requires `p = And(a, b)`; returns `a`.
pub fn proj_l(p: &Prop) -> DomainResult<Prop> {
    match p {
        Prop::And(a, _) => Ok(a.as_ref().clone()),
        _ => Err(fail(format!("{} is not a conjunction", p))),
    }
}

/// `proj_R(p)`: requires `p = And(a, b)`; returns `b`.
pub fn proj_r(p: &Prop) -> DomainResult<Prop> {
    match p {
        Prop::And(_, b) => Ok(b.as_ref().clone()),
        _ => Err(fail(format!("{} is not a conjunction", p))),
    }
}

/// `inspect_not(p)`: requires `p = Imp(a, False)`; returns `a`.
pub fn inspect_not(p: &Prop) -> DomainResult<Prop> {
    match p {
        Prop::Imp(a, q) if q.as_ref() == &Prop::False => Ok(a.as_ref().clone()),
        _ => Err(fail(format!("{} is not a negation", p))),
    }
}

/// `univ_coprod(f, g)`: requires `f.q = g.q`; returns
/// `Imp(Or(f.p, g.p), f.q)`, the universal property used by disjunctive
/// elimination.
pub fn univ_coprod(f: &Prop, g: &Prop) -> DomainResult<Prop> {
    match (f, g) {
        (Prop::Imp(fp, fq), Prop::Imp(gp, gq)) => {
            if fq.as_ref() == gq.as_ref() {
                Ok(Prop::imp(
                    Prop::or(fp.as_ref().clone(), gp.as_ref().clone()),
                    fq.as_ref().clone(),
                ))
            } else {
                Err(fail(format!("codomains of {} and {} do not match", f, g)))
            }
        }
        (Prop::Imp(_, _), _) => Err(fail(format!("{} is not an implication", g))),
        _ => Err(fail(format!("{} is not an implication", f))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p() -> Prop {
        Prop::base("P")
    }
    fn q() -> Prop {
        Prop::base("Q")
    }
    fn r() -> Prop {
        Prop::base("R")
    }

    #[test]
    fn test_apply() {
        let imp = Prop::imp(p(), q());
        assert_eq!(apply(&imp, &p()).unwrap(), q());
        assert!(apply(&imp, &r()).is_err());
        assert!(apply(&p(), &p()).is_err());
    }

    #[test]
    fn test_compose() {
        let f = Prop::imp(p(), q());
        let g = Prop::imp(q(), r());
        assert_eq!(compose(&f, &g).unwrap(), Prop::imp(p(), r()));
    }

    #[test]
    fn test_compose_matches_apply() {
        let a = Prop::base("A");
        let b = Prop::base("B");
        let c = Prop::base("C");
        let f = Prop::imp(a.clone(), b.clone());
        let g = Prop::imp(b, c.clone());
        assert_eq!(compose(&f, &g).unwrap(), Prop::imp(a, c));
    }

    #[test]
    fn test_projections() {
        let conj = Prop::and(p(), q());
        assert_eq!(proj_l(&conj).unwrap(), p());
        assert_eq!(proj_r(&conj).unwrap(), q());
        assert!(proj_l(&p()).is_err());
    }

    #[test]
    fn test_inspect_not() {
        let neg = Prop::not(p());
        assert_eq!(inspect_not(&neg).unwrap(), p());
        assert!(inspect_not(&p()).is_err());
    }

    #[test]
    fn test_univ_coprod() {
        let f = Prop::imp(p(), r());
        let g = Prop::imp(q(), r());
        assert_eq!(
            univ_coprod(&f, &g).unwrap(),
            Prop::imp(Prop::or(p(), q()), r())
        );
        let bad = Prop::imp(q(), p());
        assert!(univ_coprod(&f, &bad).is_err());
    }

    #[test]
    fn test_uses_and_symbols() {
        let phi = Prop::Predicate("P".to_string(), vec![Prop::model_ref("x")]);
        let forall = Prop::forall_named("x", phi.clone());
        assert!(forall.uses("x"));
        assert!(!forall.uses("y"));
        assert!(forall.symbols().contains("x"));
    }

    #[test]
    fn test_free_symbols_excludes_rebound_name() {
        // forall x, exists d, R(x,d) — `d` is bound here, not free, even
        // though the same name might denote a free constant elsewhere.
        let inner = Prop::Predicate(
            "R".to_string(),
            vec![Prop::model_ref("x"), Prop::model_ref("d")],
        );
        let body = Prop::exists_named("d", inner);
        let whole = Prop::forall_named("x", body);
        assert!(whole.symbols().contains("d"));
        assert!(!whole.free_symbols().contains("d"));
        assert!(!whole.free_symbols().contains("x"));
    }

    #[test]
    fn test_free_symbols_keeps_free_occurrence_alongside_shadowing() {
        // p(d) /\ (exists d, q(d)) — the first `d` is free, the second is
        // bound; `d` must still show up as free overall.
        let free_part = Prop::Predicate("p".to_string(), vec![Prop::model_ref("d")]);
        let bound_part =
            Prop::exists_named("d", Prop::Predicate("q".to_string(), vec![Prop::model_ref("d")]));
        let whole = Prop::and(free_part, bound_part);
        assert!(whole.free_symbols().contains("d"));
    }
}
