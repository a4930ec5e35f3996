// Syntactic unification of formula patterns with holes, structural diffing,
// and alpha-renaming. This is the "hard part" the spec calls out: everything
// in `rewrite.rs` and the quantifier rules in `rules.rs` is built on top of
// these few functions.

use std::collections::HashMap;

use crate::prop::{DomainError, DomainResult, Prop};

/// Bindings discovered for `PropHole`s.
pub type Subst = HashMap<String, Prop>;

/// Bindings discovered for `ModelRefHole`s. Each binds to a `Prop::ModelRef`
/// (never anything else — see `unify`'s `ModelRefHole` arm).
pub type VarSubst = HashMap<String, Prop>;

/// Syntactic unification of two formulas which may contain `PropHole`s and
/// `ModelRefHole`s. Returns whether unification succeeded; `subst` and
/// `var_subst` accumulate the bindings discovered along the way (and may
/// already hold bindings from a previous call — consistency is checked
/// against whatever's already there).
pub fn unify(p: &Prop, q: &Prop, subst: &mut Subst, var_subst: &mut VarSubst) -> bool {
    // A PropHole against any formula binds it; if it's already bound, the
    // existing binding must match. Checked before anything else, since it
    // binds regardless of what's on the other side (including another,
    // distinctly-named PropHole).
    if let Prop::PropHole(h) = p {
        return bind_prop(h, q, subst);
    }
    if let Prop::PropHole(h) = q {
        return bind_prop(h, p, subst);
    }

    match (p, q) {
        (Prop::ModelRefHole(h), _) => bind_model_ref(h, q, var_subst),
        (_, Prop::ModelRefHole(h)) => bind_model_ref(h, p, var_subst),

        (Prop::And(a, b), Prop::And(c, d))
        | (Prop::Or(a, b), Prop::Or(c, d))
        | (Prop::Imp(a, b), Prop::Imp(c, d)) => {
            unify(a, c, subst, var_subst) && unify(b, d, subst, var_subst)
        }

        (Prop::ForAll(v1, b1), Prop::ForAll(v2, b2))
        | (Prop::Exists(v1, b1), Prop::Exists(v2, b2)) => {
            unify(v1, v2, subst, var_subst) && unify(b1, b2, subst, var_subst)
        }

        (Prop::Predicate(n1, args1), Prop::Predicate(n2, args2)) => {
            n1 == n2
                && args1.len() == args2.len()
                && args1
                    .iter()
                    .zip(args2.iter())
                    .all(|(a, b)| unify(a, b, subst, var_subst))
        }

        (Prop::Base(a), Prop::Base(b)) => a == b,
        (Prop::ModelRef(a), Prop::ModelRef(b)) => a == b,
        (Prop::True, Prop::True) | (Prop::False, Prop::False) => true,

        _ => false,
    }
}

fn bind_prop(hole: &str, formula: &Prop, subst: &mut Subst) -> bool {
    match subst.get(hole) {
        Some(existing) => existing == formula,
        None => {
            subst.insert(hole.to_string(), formula.clone());
            true
        }
    }
}

fn bind_model_ref(hole: &str, formula: &Prop, var_subst: &mut VarSubst) -> bool {
    if !matches!(formula, Prop::ModelRef(_)) {
        return false;
    }
    match var_subst.get(hole) {
        Some(existing) => existing == formula,
        None => {
            var_subst.insert(hole.to_string(), formula.clone());
            true
        }
    }
}

/// Descends structurally until exactly one child differs, returning the
/// pair of subterms at that point. If both children differ at a node, that
/// pair is returned outright — this is a known limitation (spec §9): a
/// change that touches both sides of a connective in one step can't be
/// localized, so the rewrite rules built on `diff_tree` can't express it.
pub fn diff_tree(p: &Prop, q: &Prop) -> DomainResult<(Prop, Prop)> {
    match (p, q) {
        (Prop::And(a, b), Prop::And(c, d))
        | (Prop::Or(a, b), Prop::Or(c, d))
        | (Prop::Imp(a, b), Prop::Imp(c, d)) => {
            if a != c && b != d {
                Ok((p.clone(), q.clone()))
            } else if a == c {
                diff_tree(b, d)
            } else if b == d {
                diff_tree(a, c)
            } else {
                Err(DomainError(format!("{} == {}", p, q)))
            }
        }
        _ => Ok((p.clone(), q.clone())),
    }
}

/// Traverses `orig` and `new` in lockstep, looking for a single-variable
/// substitution `orig_var ↦ t` that witnesses `new = orig[orig_var := t]`.
/// Both formulas must be structurally identical up to occurrences of
/// `orig_var`; every occurrence fixes one substitution target and all of
/// them must agree. A quantifier in `orig` that rebinds `orig_var` shadows
/// it: descent stops there and the two subtrees must be literally equal
/// (nothing underneath could have changed). A quantifier in `orig` that
/// binds a name equal to the already-chosen target is rejected outright —
/// instantiating into that bound variable would capture it.
///
/// Returns whether the traversal was consistent; the witnessed target (if
/// any occurrence of `orig_var` was found) ends up in `subst[orig_var]`.
pub fn alpha_renaming(orig: &Prop, new: &Prop, orig_var: &str, subst: &mut HashMap<String, String>) -> bool {
    match (orig, new) {
        (Prop::ModelRef(n), _) => {
            if n == orig_var {
                match new {
                    Prop::ModelRef(m) => match subst.get(orig_var) {
                        Some(existing) => existing == m,
                        None => {
                            subst.insert(orig_var.to_string(), m.clone());
                            true
                        }
                    },
                    _ => false,
                }
            } else {
                matches!(new, Prop::ModelRef(m) if m == n)
            }
        }
        (Prop::Base(a), Prop::Base(b)) => a == b,
        (Prop::True, Prop::True) | (Prop::False, Prop::False) => true,
        (Prop::And(a1, b1), Prop::And(a2, b2))
        | (Prop::Or(a1, b1), Prop::Or(a2, b2))
        | (Prop::Imp(a1, b1), Prop::Imp(a2, b2)) => {
            alpha_renaming(a1, a2, orig_var, subst) && alpha_renaming(b1, b2, orig_var, subst)
        }
        (Prop::Predicate(n1, args1), Prop::Predicate(n2, args2)) => {
            n1 == n2
                && args1.len() == args2.len()
                && args1
                    .iter()
                    .zip(args2.iter())
                    .all(|(a, b)| alpha_renaming(a, b, orig_var, subst))
        }
        (Prop::ForAll(v1, body1), Prop::ForAll(v2, body2))
        | (Prop::Exists(v1, body1), Prop::Exists(v2, body2)) => {
            let v1_name = v1.model_ref_name();
            if v1_name == Some(orig_var) {
                // `orig_var` is shadowed from here down: nothing beneath
                // could have been substituted, so the subtrees must match
                // exactly.
                v1 == v2 && body1 == body2
            } else {
                if let (Some(target), Some(v1_name)) = (subst.get(orig_var), v1_name) {
                    if target == v1_name {
                        return false;
                    }
                }
                v1 == v2 && alpha_renaming(body1, body2, orig_var, subst)
            }
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unify_symmetric_for_hole_free() {
        let p = Prop::and(Prop::base("A"), Prop::base("B"));
        let q = p.clone();
        let mut subst = Subst::new();
        let mut var_subst = VarSubst::new();
        assert!(unify(&p, &q, &mut subst, &mut var_subst));
        assert!(subst.is_empty());

        let r = Prop::and(Prop::base("A"), Prop::base("C"));
        let mut subst2 = Subst::new();
        let mut var_subst2 = VarSubst::new();
        assert!(!unify(&p, &r, &mut subst2, &mut var_subst2));
    }

    #[test]
    fn test_unify_prop_hole_binds() {
        let pat = Prop::PropHole("a".to_string());
        let target = Prop::base("P");
        let mut subst = Subst::new();
        let mut var_subst = VarSubst::new();
        assert!(unify(&pat, &target, &mut subst, &mut var_subst));
        assert_eq!(subst.get("a"), Some(&target));
    }

    #[test]
    fn test_unify_prop_hole_consistency() {
        let pat = Prop::and(Prop::PropHole("a".to_string()), Prop::PropHole("a".to_string()));
        let ok = Prop::and(Prop::base("P"), Prop::base("P"));
        let bad = Prop::and(Prop::base("P"), Prop::base("Q"));
        let mut subst = Subst::new();
        let mut var_subst = VarSubst::new();
        assert!(unify(&pat, &ok, &mut subst, &mut var_subst));

        let mut subst2 = Subst::new();
        let mut var_subst2 = VarSubst::new();
        assert!(!unify(&pat, &bad, &mut subst2, &mut var_subst2));
    }

    #[test]
    fn test_unify_model_ref_hole_only_matches_model_ref() {
        let pat = Prop::ModelRefHole("t".to_string());
        let mut subst = Subst::new();
        let mut var_subst = VarSubst::new();
        assert!(unify(&pat, &Prop::model_ref("x"), &mut subst, &mut var_subst));

        let mut subst2 = Subst::new();
        let mut var_subst2 = VarSubst::new();
        assert!(!unify(&pat, &Prop::base("P"), &mut subst2, &mut var_subst2));
    }

    #[test]
    fn test_diff_tree_single_difference() {
        let a = Prop::and(Prop::base("A"), Prop::base("B"));
        let b = Prop::and(Prop::base("A"), Prop::base("C"));
        let (old, new) = diff_tree(&a, &b).unwrap();
        assert_eq!(old, Prop::base("B"));
        assert_eq!(new, Prop::base("C"));
    }

    #[test]
    fn test_diff_tree_both_children_differ() {
        let a = Prop::and(Prop::base("A"), Prop::base("B"));
        let b = Prop::and(Prop::base("C"), Prop::base("D"));
        let (old, new) = diff_tree(&a, &b).unwrap();
        assert_eq!(old, a);
        assert_eq!(new, b);
    }

    #[test]
    fn test_alpha_renaming_produces_exact_substitution() {
        // alpha_renaming(phi, phi[v:=t], v) produces {v -> t} exactly.
        let phi = Prop::Predicate("P".to_string(), vec![Prop::model_ref("x")]);
        let renamed = Prop::Predicate("P".to_string(), vec![Prop::model_ref("c")]);
        let mut subst = HashMap::new();
        assert!(alpha_renaming(&phi, &renamed, "x", &mut subst));
        assert_eq!(subst.get("x"), Some(&"c".to_string()));
    }

    #[test]
    fn test_alpha_renaming_rejects_shadowed_mismatch() {
        let inner = Prop::Predicate("P".to_string(), vec![Prop::model_ref("x")]);
        let orig = Prop::forall_named("x", inner.clone());
        let new = Prop::forall_named("x", Prop::Predicate("Q".to_string(), vec![Prop::model_ref("x")]));
        let mut subst = HashMap::new();
        // x is rebound inside, so the subtrees must match exactly; they don't.
        assert!(!alpha_renaming(&orig, &new, "x", &mut subst));
    }

    #[test]
    fn test_alpha_renaming_rejects_capture() {
        // orig: P(x) /\ forall c, Q(c)   new: P(c) /\ forall c, Q(c)
        // substituting x -> c would be captured by the inner forall c.
        let orig = Prop::and(
            Prop::Predicate("P".to_string(), vec![Prop::model_ref("x")]),
            Prop::forall_named("c", Prop::Predicate("Q".to_string(), vec![Prop::model_ref("c")])),
        );
        let new = Prop::and(
            Prop::Predicate("P".to_string(), vec![Prop::model_ref("c")]),
            Prop::forall_named("c", Prop::Predicate("Q".to_string(), vec![Prop::model_ref("c")])),
        );
        let mut subst = HashMap::new();
        assert!(!alpha_renaming(&orig, &new, "x", &mut subst));
    }
}
