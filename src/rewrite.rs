// The equivalence rewrite engine: a table of named bidirectional rewrite
// rules, and the single-point-of-difference matcher (`try_rewrite`) that
// every equivalence rule in `rules.rs` is built on top of.

use crate::prop::{DomainError, DomainResult, Prop};
use crate::unify::{self, Subst, VarSubst};

/// If `before == after`, succeeds vacuously (empty substitutions).
/// Otherwise finds the single point where `before` and `after` differ
/// (`unify::diff_tree`) and tries to unify that pair against `(lhs, rhs)`.
/// If that fails, retries against the swapped pair `(rhs, lhs)` — rules are
/// bidirectional. Fails if neither orientation unifies.
pub fn try_rewrite(
    before: &Prop,
    after: &Prop,
    lhs: &Prop,
    rhs: &Prop,
) -> DomainResult<(Subst, VarSubst)> {
    if before == after {
        return Ok((Subst::new(), VarSubst::new()));
    }

    let (old, new) = unify::diff_tree(before, after)?;

    let try_orientation = |old_r: &Prop, new_r: &Prop| -> Option<(Subst, VarSubst)> {
        let mut subst = Subst::new();
        let mut var_subst = VarSubst::new();
        if unify::unify(&old, old_r, &mut subst, &mut var_subst)
            && unify::unify(&new, new_r, &mut subst, &mut var_subst)
        {
            Some((subst, var_subst))
        } else {
            None
        }
    };

    try_orientation(lhs, rhs)
        .or_else(|| try_orientation(rhs, lhs))
        .ok_or_else(|| {
            DomainError(format!(
                "failed to apply rule {} <=> {} to {} => {}",
                lhs, rhs, before, after
            ))
        })
}

/// A named bidirectional rewrite rule: an unordered pair of formula
/// templates treated as equivalent.
pub struct RewriteRule {
    pub name: &'static str,
    pub lhs: Prop,
    pub rhs: Prop,
}

fn hole(name: &str) -> Prop {
    Prop::PropHole(name.to_string())
}

fn not(p: Prop) -> Prop {
    Prop::not(p)
}

/// Builds the table of rewrite rules. Constructed fresh on each lookup
/// (these are tiny trees; there's no benefit to caching them statically,
/// and it keeps the table free of `lazy_static`/`once_cell` machinery the
/// teacher doesn't otherwise use).
pub fn rule_table() -> Vec<RewriteRule> {
    let (a, b, c) = (hole("a"), hole("b"), hole("c"));
    let v = Prop::ModelRefHole("v".to_string());

    vec![
        RewriteRule {
            name: "or_comm",
            lhs: Prop::or(a.clone(), b.clone()),
            rhs: Prop::or(b.clone(), a.clone()),
        },
        RewriteRule {
            name: "and_comm",
            lhs: Prop::and(a.clone(), b.clone()),
            rhs: Prop::and(b.clone(), a.clone()),
        },
        RewriteRule {
            name: "or_assoc",
            lhs: Prop::or(Prop::or(a.clone(), b.clone()), c.clone()),
            rhs: Prop::or(a.clone(), Prop::or(b.clone(), c.clone())),
        },
        RewriteRule {
            name: "and_assoc",
            lhs: Prop::and(Prop::and(a.clone(), b.clone()), c.clone()),
            rhs: Prop::and(a.clone(), Prop::and(b.clone(), c.clone())),
        },
        RewriteRule {
            name: "dn",
            lhs: a.clone(),
            rhs: not(not(a.clone())),
        },
        RewriteRule {
            name: "cp",
            lhs: Prop::imp(a.clone(), b.clone()),
            rhs: Prop::imp(not(b.clone()), not(a.clone())),
        },
        RewriteRule {
            name: "imp",
            lhs: Prop::imp(a.clone(), b.clone()),
            rhs: Prop::or(not(a.clone()), b.clone()),
        },
        RewriteRule {
            name: "dist_ao",
            lhs: Prop::and(a.clone(), Prop::or(b.clone(), c.clone())),
            rhs: Prop::or(
                Prop::and(a.clone(), b.clone()),
                Prop::and(a.clone(), c.clone()),
            ),
        },
        RewriteRule {
            name: "dist_oa",
            lhs: Prop::or(a.clone(), Prop::and(b.clone(), c.clone())),
            rhs: Prop::and(
                Prop::or(a.clone(), b.clone()),
                Prop::or(a.clone(), c.clone()),
            ),
        },
        RewriteRule {
            name: "dm_ao",
            lhs: not(Prop::and(a.clone(), b.clone())),
            rhs: Prop::or(not(a.clone()), not(b.clone())),
        },
        // `dm` is the bare name spec.md §8's literal scenario 1 actually
        // writes (`2. ~Q \/ ~~Z dm 1;`); kept as an alias of `dm_ao` rather
        // than folding the two orientations together, since `dm_oa` is still
        // its own distinct justification name elsewhere.
        RewriteRule {
            name: "dm",
            lhs: not(Prop::and(a.clone(), b.clone())),
            rhs: Prop::or(not(a.clone()), not(b.clone())),
        },
        RewriteRule {
            name: "dm_oa",
            lhs: not(Prop::or(a.clone(), b.clone())),
            rhs: Prop::and(not(a.clone()), not(b.clone())),
        },
        RewriteRule {
            name: "dm_fe",
            lhs: not(Prop::forall(v.clone(), a.clone())),
            rhs: Prop::exists(v.clone(), not(a.clone())),
        },
        RewriteRule {
            name: "dm_ef",
            lhs: not(Prop::exists(v.clone(), a.clone())),
            rhs: Prop::forall(v.clone(), not(a.clone())),
        },
        RewriteRule {
            name: "exp",
            lhs: Prop::imp(a.clone(), Prop::imp(b.clone(), c.clone())),
            rhs: Prop::imp(Prop::and(a.clone(), b.clone()), c.clone()),
        },
        RewriteRule {
            name: "or_self",
            lhs: Prop::or(a.clone(), a.clone()),
            rhs: a.clone(),
        },
        RewriteRule {
            name: "and_self",
            lhs: Prop::and(a.clone(), a.clone()),
            rhs: a,
        },
    ]
}

/// Looks up a rewrite rule by its justification name.
pub fn find_rule(name: &str) -> Option<RewriteRule> {
    rule_table().into_iter().find(|r| r.name == name)
}

/// Whether `name` names an equivalence rule (as opposed to a propositional
/// or quantifier inference rule).
pub fn is_rewrite_rule_name(name: &str) -> bool {
    rule_table().iter().any(|r| r.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_rewrite_vacuous() {
        let x = Prop::base("A");
        for rule in rule_table() {
            assert!(try_rewrite(&x, &x, &rule.lhs, &rule.rhs).is_ok());
        }
    }

    #[test]
    fn test_every_rule_applies_in_both_directions() {
        let (p, q, r) = (Prop::base("P"), Prop::base("Q"), Prop::base("R"));
        let ground = |template: &Prop| -> Prop {
            fn go(t: &Prop, p: &Prop, q: &Prop, r: &Prop) -> Prop {
                match t {
                    Prop::PropHole(name) => match name.as_str() {
                        "a" => p.clone(),
                        "b" => q.clone(),
                        "c" => r.clone(),
                        _ => unreachable!(),
                    },
                    Prop::ModelRefHole(name) => Prop::model_ref(name.clone()),
                    Prop::And(a, b) => Prop::and(go(a, p, q, r), go(b, p, q, r)),
                    Prop::Or(a, b) => Prop::or(go(a, p, q, r), go(b, p, q, r)),
                    Prop::Imp(a, b) => Prop::imp(go(a, p, q, r), go(b, p, q, r)),
                    Prop::ForAll(v, b) => Prop::forall(go(v, p, q, r), go(b, p, q, r)),
                    Prop::Exists(v, b) => Prop::exists(go(v, p, q, r), go(b, p, q, r)),
                    other => other.clone(),
                }
            }
            go(template, &p, &q, &r)
        };

        for rule in rule_table() {
            let lg = ground(&rule.lhs);
            let rg = ground(&rule.rhs);
            assert!(
                try_rewrite(&lg, &rg, &rule.lhs, &rule.rhs).is_ok(),
                "rule {} forwards",
                rule.name
            );
            assert!(
                try_rewrite(&rg, &lg, &rule.lhs, &rule.rhs).is_ok(),
                "rule {} backwards",
                rule.name
            );
        }
    }

    #[test]
    fn test_wrong_commutation_is_rejected() {
        // commutativity of `/\` must not rewrite `A \/ B` into `B \/ A`.
        let and_comm = find_rule("and_comm").unwrap();
        let before = Prop::or(Prop::base("A"), Prop::base("B"));
        let after = Prop::or(Prop::base("B"), Prop::base("A"));
        assert!(try_rewrite(&before, &after, &and_comm.lhs, &and_comm.rhs).is_err());
    }
}
