// Top-level bookkeeping: all lines across every (sub-)proof, the proofs
// themselves keyed by their sorted line-number range, each proof's
// compiled (hypotheses, conclusions) pair once it's complete, and the
// outermost proof. Populated during parsing, consulted and extended
// during checking, frozen once checking finishes.

use std::collections::{HashMap, HashSet};

use crate::line::Line;
use crate::prop::Prop;
use crate::unify::{Subst, VarSubst};

/// An ordered set of lines sharing a contiguous source range. The "range"
/// is its sorted tuple of line numbers, which also doubles as the key
/// proofs are looked up by — so `ded 1-2` can cite a sub-proof without the
/// parser having to thread parent/child pointers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proof {
    pub line_nums: Vec<i64>,
}

impl Proof {
    pub fn new(mut line_nums: Vec<i64>) -> Proof {
        line_nums.sort_unstable();
        Proof { line_nums }
    }

    pub fn key(&self) -> Vec<i64> {
        self.line_nums.clone()
    }
}

#[derive(Debug, Default)]
pub struct Context {
    pub lines: HashMap<i64, Line>,
    pub proofs: HashMap<Vec<i64>, Proof>,
    pub proof_types: HashMap<Vec<i64>, (HashSet<Prop>, HashSet<Prop>)>,
    pub main_proof: Option<Vec<i64>>,

    /// Every model-reference name that has appeared (free or bound) in any
    /// successfully checked line's formula so far — populated generically
    /// in `checker::check_context`, not just from `ei` lines. A name
    /// already in this set denotes a specific individual and so can't be
    /// reused as a fresh `ei` witness — see `rules::check_ei`.
    pub constants_in_scope: HashSet<String>,

    /// Line numbers that have successfully verified so far. A sub-proof
    /// compiles only once every one of its lines appears here.
    pub checked: HashSet<i64>,
}

impl Context {
    pub fn new() -> Context {
        Context::default()
    }

    /// Registers a freshly-parsed proof (and its lines) into the context.
    /// The most recently registered proof becomes the new `main_proof` —
    /// parsing finishes with the outermost proof registered last, since
    /// sub-proofs are fully parsed (and so registered) before the block
    /// enclosing them finishes.
    pub fn add_proof(&mut self, proof: Proof, lines: Vec<Line>) {
        for line in lines {
            self.lines.insert(line.num, line);
        }
        let key = proof.key();
        self.proofs.insert(key.clone(), proof);
        self.main_proof = Some(key);
    }

    /// Compiles a proof's lines into `(hypotheses, conclusions)`, per the
    /// resolved reading of the "does compile() include hypotheses in
    /// conclusions too" open question (see DESIGN.md): yes, so that `ded`
    /// can cite a bare hypothesis line of the sub-proof as its consequent.
    pub fn compile_proof(&self, proof: &Proof) -> (HashSet<Prop>, HashSet<Prop>) {
        let mut hypotheses = HashSet::new();
        let mut conclusions = HashSet::new();
        for num in &proof.line_nums {
            let line = &self.lines[num];
            if line.just.is_hypothesis() {
                hypotheses.insert(line.typ.clone());
            }
            conclusions.insert(line.typ.clone());
        }
        (hypotheses, conclusions)
    }

    /// Registers `proof`'s compiled type, if not already present.
    pub fn register_type_if_absent(&mut self, proof: &Proof) {
        let key = proof.key();
        if !self.proof_types.contains_key(&key) {
            let typ = self.compile_proof(proof);
            self.proof_types.insert(key, typ);
        }
    }
}

/// Whether `p` unifies (in either orientation) with `a ∨ ¬a`, i.e. is a
/// literal instance of excluded middle. Per spec §4.6/§9, only this exact
/// surface shape is recognized — `¬¬a ∨ ¬a` or other equivalent formulas
/// are not suppressed, preserving the source's behavior.
pub fn is_axiom(p: &Prop) -> bool {
    let a = Prop::PropHole("a".to_string());
    let not_a = Prop::not(a.clone());
    let pattern1 = Prop::or(a.clone(), not_a.clone());
    let pattern2 = Prop::or(not_a, a);

    let mut subst = Subst::new();
    let mut var_subst = VarSubst::new();
    if crate::unify::unify(p, &pattern1, &mut subst, &mut var_subst) {
        return true;
    }
    let mut subst = Subst::new();
    let mut var_subst = VarSubst::new();
    crate::unify::unify(p, &pattern2, &mut subst, &mut var_subst)
}

/// The result of discharging one obligation: the non-axiom hypotheses of
/// the main proof, paired with the obligation itself.
pub struct Sequent {
    pub hypotheses: Vec<Prop>,
    pub obligation: Prop,
}

/// For each obligation, requires it to be among the main proof's
/// conclusions and emits the sequent `{non-axiom hypotheses} |- obligation`.
/// Fails (naming the first unmet obligation) otherwise.
pub fn discharge_obligations(
    ctx: &Context,
    obligations: &[Prop],
) -> Result<Vec<Sequent>, String> {
    let main = ctx
        .main_proof
        .as_ref()
        .ok_or_else(|| "no proof was registered".to_string())?;
    let (hypotheses, conclusions) = ctx
        .proof_types
        .get(main)
        .ok_or_else(|| "main proof was never compiled".to_string())?;

    let mut non_axiom_hyp: Vec<Prop> = hypotheses.iter().filter(|h| !is_axiom(h)).cloned().collect();
    non_axiom_hyp.sort_by_key(|p| p.to_string());

    let mut sequents = Vec::with_capacity(obligations.len());
    for obligation in obligations {
        if !conclusions.contains(obligation) {
            return Err(format!("proof obligation `{}` not met", obligation));
        }
        sequents.push(Sequent {
            hypotheses: non_axiom_hyp.clone(),
            obligation: obligation.clone(),
        });
    }
    Ok(sequents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_axiom_recognizes_literal_excluded_middle() {
        let p = Prop::base("P");
        assert!(is_axiom(&Prop::or(p.clone(), Prop::not(p.clone()))));
        assert!(is_axiom(&Prop::or(Prop::not(p.clone()), p.clone())));
        assert!(!is_axiom(&p));
    }

    #[test]
    fn test_is_axiom_does_not_recognize_double_negated_variant() {
        let p = Prop::base("P");
        let dn = Prop::not(Prop::not(p.clone()));
        assert!(!is_axiom(&Prop::or(dn, Prop::not(p))));
    }

    #[test]
    fn test_compile_proof_includes_hypotheses_in_conclusions() {
        let mut ctx = Context::new();
        let a = Prop::base("A");
        let l1 = Line::new(1, a.clone(), crate::line::Justification::new("prem", vec![]));
        let l2 = Line::new(
            2,
            Prop::imp(a.clone(), a.clone()),
            crate::line::Justification::new("mp", vec![1, 1]),
        );
        let proof = Proof::new(vec![1, 2]);
        ctx.add_proof(proof.clone(), vec![l1, l2]);
        let (hyp, conc) = ctx.compile_proof(&proof);
        assert!(hyp.contains(&a));
        assert!(conc.contains(&a));
    }
}
