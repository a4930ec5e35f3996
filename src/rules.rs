// The inference-rule library: one checker per rule name, dispatched from
// `checker.rs` once a line's justification has been resolved against the
// context. Propositional rules and quantifier rules have different shapes
// (the former typecheck a precomputed conclusion; the latter also mutate a
// line's `vars` map), so they're split into two entry points rather than
// forced into one signature.

use crate::line::VarsMap;
use crate::prop::{self, Prop};
use crate::rewrite;
use crate::unify;

/// What a propositional rule concludes, before comparison against the
/// line's asserted `typ`. Kept distinct from a plain `Prop` so `checker.rs`
/// can tell "the rule computed the wrong formula" (an equality error) apart
/// from "the rule's own precondition failed" (a shape error) without this
/// module having to know about `CheckError`'s line-number plumbing.
pub enum Outcome {
    /// The rule determined a single conclusion; equality error if it
    /// doesn't match what was asserted.
    Single(Prop),

    /// The rule only constrains the asserted conclusion to be one of a few
    /// formulas (`simp`, `add`, `ds`); equality error if the asserted
    /// formula isn't among them.
    OneOf(Vec<Prop>),

    /// The rule holds regardless of what's asserted (`hyp`/`prem`), or has
    /// already checked the asserted formula itself and found it acceptable
    /// (equivalence rules, via `try_rewrite`).
    Accepted,
}

/// A rule's precondition failed (wrong shape of cited formula).
pub struct ShapeError(pub String);

/// A cited equivalence rule failed to rewrite the source line into the
/// asserted one, in either orientation.
pub struct RewriteError(pub String);

pub enum PropositionalError {
    Shape(ShapeError),
    Rewrite(RewriteError),
    UnknownRule(String),
    WrongArity { expected: &'static str, got: usize },
}

impl From<prop::DomainError> for ShapeError {
    fn from(e: prop::DomainError) -> ShapeError {
        ShapeError(e.0)
    }
}

/// Evaluates a propositional (non-quantifier) rule against its cited lines'
/// formulas and the formula asserted for the new line. `expected` is
/// needed up front (not just for comparison) by `add`, `ded`'s caller-side
/// wrapper, and the equivalence rules, which check against it directly.
pub fn evaluate_propositional(
    name: &str,
    cited: &[&Prop],
    expected: &Prop,
) -> Result<Outcome, PropositionalError> {
    use PropositionalError::*;

    match name {
        "hyp" | "prem" => Ok(Outcome::Accepted),

        "mp" => {
            let [imp, ante] = require2(cited)?;
            let conclusion = prop::apply(imp, ante).map_err(ShapeError::from)?;
            Ok(Outcome::Single(conclusion))
        }

        "mt" => {
            let [imp, cont] = require2(cited)?;
            prop::inspect_not(cont)
                .map_err(|_| Shape(ShapeError(format!("{} is not a negation", cont))))?;
            let conclusion = prop::compose(imp, cont).map_err(ShapeError::from)?;
            Ok(Outcome::Single(conclusion))
        }

        "hs" => {
            let [imp1, imp2] = require2(cited)?;
            let conclusion = prop::compose(imp1, imp2).map_err(ShapeError::from)?;
            Ok(Outcome::Single(conclusion))
        }

        "simp" => {
            let [conj] = require1(cited)?;
            let l = prop::proj_l(conj).map_err(ShapeError::from)?;
            let r = prop::proj_r(conj).map_err(ShapeError::from)?;
            Ok(Outcome::OneOf(vec![l, r]))
        }

        "add" => {
            let [disj] = require1(cited)?;
            match expected {
                Prop::Or(a, b) => Ok(Outcome::OneOf(vec![
                    a.as_ref().clone(),
                    b.as_ref().clone(),
                ])
                .filter_contains(disj)),
                _ => Err(Shape(ShapeError(format!(
                    "{} is not a disjunction",
                    expected
                )))),
            }
        }

        "conj" => {
            let [p, q] = require2(cited)?;
            Ok(Outcome::Single(Prop::and(p.clone(), q.clone())))
        }

        "disj" => {
            let [p, q] = require2(cited)?;
            Ok(Outcome::Single(Prop::or(p.clone(), q.clone())))
        }

        "ds" => {
            let [disj, neg] = require2(cited)?;
            let (a, b) = match disj {
                Prop::Or(a, b) => (a.as_ref().clone(), b.as_ref().clone()),
                _ => {
                    return Err(Shape(ShapeError(format!(
                        "{} is not a disjunction",
                        disj
                    ))))
                }
            };
            let x = prop::inspect_not(neg).map_err(ShapeError::from)?;
            if x != a && x != b {
                return Err(Shape(ShapeError(format!(
                    "{} is not one of the disjuncts of {}",
                    x, disj
                ))));
            }
            Ok(Outcome::OneOf(vec![a, b]))
        }

        "de" => {
            let [disj, imp1, imp2] = require3(cited)?;
            let coprod = prop::univ_coprod(imp1, imp2).map_err(ShapeError::from)?;
            let conclusion = prop::apply(&coprod, disj).map_err(ShapeError::from)?;
            Ok(Outcome::Single(conclusion))
        }

        other => {
            if rewrite::is_rewrite_rule_name(other) {
                let [before] = require1(cited)?;
                let rule = rewrite::find_rule(other).expect("checked by is_rewrite_rule_name");
                match rewrite::try_rewrite(before, expected, &rule.lhs, &rule.rhs) {
                    Ok(_) => Ok(Outcome::Accepted),
                    Err(e) => Err(Rewrite(RewriteError(e.0))),
                }
            } else {
                Err(UnknownRule(other.to_string()))
            }
        }
    }
}

impl Outcome {
    fn filter_contains(self, needle: &Prop) -> Outcome {
        match self {
            Outcome::OneOf(candidates) if candidates.iter().any(|c| c == needle) => {
                Outcome::Accepted
            }
            other => other,
        }
    }
}

fn require1<'a>(cited: &[&'a Prop]) -> Result<[&'a Prop; 1], PropositionalError> {
    cited
        .try_into()
        .map_err(|_| PropositionalError::WrongArity {
            expected: "1",
            got: cited.len(),
        })
}

fn require2<'a>(cited: &[&'a Prop]) -> Result<[&'a Prop; 2], PropositionalError> {
    cited
        .try_into()
        .map_err(|_| PropositionalError::WrongArity {
            expected: "2",
            got: cited.len(),
        })
}

fn require3<'a>(cited: &[&'a Prop]) -> Result<[&'a Prop; 3], PropositionalError> {
    cited
        .try_into()
        .map_err(|_| PropositionalError::WrongArity {
            expected: "3",
            got: cited.len(),
        })
}

/// A quantifier rule's side condition failed.
pub struct QuantifierError(pub String);

/// Universal instantiation: `quant.typ = forall v, phi(v)`, `conclusion =
/// phi[v := t]`. On success, if `t` is (syntactically) `v` itself or
/// doesn't occur free in `phi`, registers `t` as a fresh UI scope entry on
/// `vars` (empty dependent set); otherwise leaves `vars` untouched (`t` was
/// already some other in-scope name, not a new one).
pub fn check_ui(quant: &Prop, conclusion: &Prop, vars: &mut VarsMap) -> Result<(), QuantifierError> {
    let (v, phi) = match quant {
        Prop::ForAll(v, phi) => (v.as_ref(), phi.as_ref()),
        _ => {
            return Err(QuantifierError(format!(
                "{} is not universally quantified",
                quant
            )))
        }
    };
    let var_name = v
        .model_ref_name()
        .ok_or_else(|| QuantifierError(format!("{} is not a bound model reference", v)))?;

    let mut subst = std::collections::HashMap::new();
    unify::alpha_renaming(phi, conclusion, var_name, &mut subst);
    let target = subst
        .get(var_name)
        .ok_or_else(|| QuantifierError("could not determine a unique substitution".to_string()))?;

    if target == var_name || !phi.uses(target) {
        vars.insert(target.clone(), im::HashSet::new());
    }
    Ok(())
}

/// Universal generalization: `conclusion.typ = forall v, psi(v)`, source
/// `form = psi[v := u]`. Requires `u` to be currently in scope (introduced
/// by a not-yet-discharged UI) and its recorded EI dependents to be
/// disjoint from `psi`'s free symbols (the eigenvariable condition). On
/// success, removes `u` from scope.
pub fn check_ug(
    form: &Prop,
    conclusion_typ: &Prop,
    vars: &mut VarsMap,
) -> Result<(), QuantifierError> {
    let (v, psi) = match conclusion_typ {
        Prop::ForAll(v, psi) => (v.as_ref(), psi.as_ref()),
        _ => {
            return Err(QuantifierError(format!(
                "{} is not universally quantified",
                conclusion_typ
            )))
        }
    };
    let var_name = v
        .model_ref_name()
        .ok_or_else(|| QuantifierError(format!("{} is not a bound model reference", v)))?;

    let mut subst = std::collections::HashMap::new();
    unify::alpha_renaming(psi, form, var_name, &mut subst);
    let target = subst
        .get(var_name)
        .ok_or_else(|| QuantifierError("could not determine a unique substitution".to_string()))?;

    let dependents = vars.get(target).cloned().ok_or_else(|| {
        QuantifierError(format!(
            "cannot generalize `{}`: variable not instantiated",
            target
        ))
    })?;

    let free = psi.free_symbols();
    let still_dependent: Vec<&String> = dependents.iter().filter(|d| free.contains(*d)).collect();
    if !still_dependent.is_empty() {
        return Err(QuantifierError(format!(
            "cannot generalize `{}`: dependent existentially-introduced constants are still in scope ({})",
            target,
            still_dependent
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )));
    }

    vars.remove(target);
    Ok(())
}

/// Existential instantiation: `quant.typ = exists v, phi(v)`, `conclusion =
/// phi[v := c]`. Requires `c` to be a fresh constant: a model reference not
/// already mentioned anywhere in the proof so far (`constants_in_scope`,
/// which `checker.rs` grows with every successfully checked line — not just
/// prior `ei` witnesses, but also `prem`-introduced and `ui`-instantiated
/// names). Records `c` as a dependent of every UI name currently in scope.
pub fn check_ei(
    quant: &Prop,
    conclusion: &Prop,
    vars: &mut VarsMap,
    constants_in_scope: &std::collections::HashSet<String>,
) -> Result<(), QuantifierError> {
    let (v, phi) = match quant {
        Prop::Exists(v, phi) => (v.as_ref(), phi.as_ref()),
        _ => {
            return Err(QuantifierError(format!(
                "{} is not existentially quantified",
                quant
            )))
        }
    };
    let var_name = v
        .model_ref_name()
        .ok_or_else(|| QuantifierError(format!("{} is not a bound model reference", v)))?;

    let mut subst = std::collections::HashMap::new();
    unify::alpha_renaming(phi, conclusion, var_name, &mut subst);
    let target = subst
        .get(var_name)
        .ok_or_else(|| QuantifierError("could not determine a unique substitution".to_string()))?
        .clone();

    if constants_in_scope.contains(&target) {
        return Err(QuantifierError(format!(
            "`{}` is not a fresh constant",
            target
        )));
    }

    let ui_names: Vec<String> = vars.keys().cloned().collect();
    for ui in ui_names {
        let mut dependents = vars.get(&ui).cloned().unwrap_or_default();
        dependents.insert(target.clone());
        vars.insert(ui, dependents);
    }

    Ok(())
}

/// Existential generalization: `conclusion.typ = exists v, psi(v)`, source
/// `form = psi[v := t]`. Removes `t` from every UI's dependent set in
/// `vars` (it has just been existentially closed, so it no longer blocks a
/// later UG).
pub fn check_eg(
    form: &Prop,
    conclusion_typ: &Prop,
    vars: &mut VarsMap,
) -> Result<(), QuantifierError> {
    let (v, psi) = match conclusion_typ {
        Prop::Exists(v, psi) => (v.as_ref(), psi.as_ref()),
        _ => {
            return Err(QuantifierError(format!(
                "{} is not existentially quantified",
                conclusion_typ
            )))
        }
    };
    let var_name = v
        .model_ref_name()
        .ok_or_else(|| QuantifierError(format!("{} is not a bound model reference", v)))?;

    let mut subst = std::collections::HashMap::new();
    unify::alpha_renaming(psi, form, var_name, &mut subst);
    let target = subst
        .get(var_name)
        .ok_or_else(|| QuantifierError("could not determine a unique substitution".to_string()))?
        .clone();

    let ui_names: Vec<String> = vars.keys().cloned().collect();
    for ui in ui_names {
        if let Some(mut dependents) = vars.get(&ui).cloned() {
            dependents.remove(&target);
            vars.insert(ui, dependents);
        }
    }

    Ok(())
}

/// Deduction: the cited sub-proof must have exactly one hypothesis `h`,
/// and `expected` must be `Imp(h, d)` for some `d` among its conclusions.
pub fn check_deduction<'a>(
    hypotheses: &std::collections::HashSet<Prop>,
    conclusions: &'a std::collections::HashSet<Prop>,
    expected: &Prop,
) -> Result<(), ShapeError> {
    if hypotheses.len() != 1 {
        return Err(ShapeError(format!(
            "a proof with {} hypotheses cannot be used in the deduction rule",
            hypotheses.len()
        )));
    }
    let (h, d) = match expected {
        Prop::Imp(h, d) => (h.as_ref(), d.as_ref()),
        _ => {
            return Err(ShapeError(format!(
                "{} is not an implication",
                expected
            )))
        }
    };
    let hyp = hypotheses.iter().next().unwrap();
    if hyp != h {
        return Err(ShapeError(format!(
            "proof does not take `{}` as its hypothesis",
            h
        )));
    }
    if !conclusions.contains(d) {
        return Err(ShapeError(format!("cannot deduce `{}` from proof", d)));
    }
    Ok(())
}

pub const QUANTIFIER_RULE_NAMES: &[&str] = &["ui", "ug", "ei", "eg"];

pub fn is_quantifier_rule_name(name: &str) -> bool {
    QUANTIFIER_RULE_NAMES.contains(&name)
}
