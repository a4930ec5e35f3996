// The line-ordered verification driver: walks every line across the whole
// context in ascending line-number order, resolves its justification,
// invokes the right rule checker, and — once a sub-proof's lines are all
// checked — compiles it into its `(hypotheses, conclusions)` type.

use crate::context::{Context, Proof};
use crate::error::CheckError;
use crate::line::{merge_vars, VarsMap};
use crate::rules::{self, Outcome, PropositionalError, QuantifierError};

/// Invoked once per line, after it either passes (`ok = true`) or the run
/// is about to abort on it (`ok = false`), so the CLI can print the ✓/✗
/// progress line spec.md calls for without this module depending on a
/// logging crate the teacher itself doesn't use (see DESIGN.md).
pub fn check_context(
    ctx: &mut Context,
    mut on_line: impl FnMut(&crate::line::Line, bool),
) -> Result<(), CheckError> {
    let mut nums: Vec<i64> = ctx.lines.keys().cloned().collect();
    nums.sort_unstable();

    for num in nums {
        match check_line(ctx, num) {
            Ok(()) => {
                on_line(&ctx.lines[&num], true);
                ctx.checked.insert(num);
                ctx.constants_in_scope
                    .extend(ctx.lines[&num].typ.symbols());
                compile_newly_complete_proofs(ctx);
            }
            Err(e) => {
                on_line(&ctx.lines[&num], false);
                return Err(e);
            }
        }
    }
    Ok(())
}

fn check_line(ctx: &mut Context, num: i64) -> Result<(), CheckError> {
    let just = ctx.lines[&num].just.clone();
    let expected = ctx.lines[&num].typ.clone();

    for &arg in &just.args {
        if !ctx.checked.contains(&arg) {
            return Err(CheckError::structure(
                num,
                format!("cited line {} does not exist", arg),
            ));
        }
    }

    let merged_vars: VarsMap = merge_vars(just.args.iter().map(|a| &ctx.lines[a].vars));

    if just.is_deduction() {
        return check_deduction_line(ctx, num, &just.args, &expected, merged_vars);
    }

    if rules::is_quantifier_rule_name(&just.name) {
        return check_quantifier_line(ctx, num, &just.name, &just.args, &expected, merged_vars);
    }

    let cited: Vec<&crate::prop::Prop> = just.args.iter().map(|a| &ctx.lines[a].typ).collect();
    match rules::evaluate_propositional(&just.name, &cited, &expected) {
        Ok(Outcome::Accepted) => {}
        Ok(Outcome::Single(conclusion)) => {
            if conclusion != expected {
                return Err(CheckError::equality(
                    num,
                    format!("expected `{}`, but rule produces `{}`", expected, conclusion),
                ));
            }
        }
        Ok(Outcome::OneOf(candidates)) => {
            if !candidates.iter().any(|c| c == &expected) {
                return Err(CheckError::equality(
                    num,
                    format!(
                        "expected `{}` to be one of [{}]",
                        expected,
                        candidates
                            .iter()
                            .map(|c| c.to_string())
                            .collect::<Vec<_>>()
                            .join(", ")
                    ),
                ));
            }
        }
        Err(PropositionalError::Shape(e)) => return Err(CheckError::shape(num, e.0)),
        Err(PropositionalError::Rewrite(e)) => return Err(CheckError::rewrite(num, e.0)),
        Err(PropositionalError::UnknownRule(name)) => {
            return Err(CheckError::structure(
                num,
                format!("`{}` is not a recognized justification", name),
            ))
        }
        Err(PropositionalError::WrongArity { expected: n, got }) => {
            return Err(CheckError::shape(
                num,
                format!("rule `{}` expects {} argument(s), got {}", just.name, n, got),
            ))
        }
    }

    ctx.lines.get_mut(&num).unwrap().vars = merged_vars;
    Ok(())
}

fn check_quantifier_line(
    ctx: &mut Context,
    num: i64,
    name: &str,
    args: &[i64],
    expected: &crate::prop::Prop,
    mut merged_vars: VarsMap,
) -> Result<(), CheckError> {
    let to_quantifier_err = |e: QuantifierError| CheckError::quantifier(num, e.0);

    match name {
        "ui" => {
            let [quant_line] = require1(args, num)?;
            let quant = ctx.lines[&quant_line].typ.clone();
            rules::check_ui(&quant, expected, &mut merged_vars).map_err(to_quantifier_err)?;
        }
        "ug" => {
            let [form_line] = require1(args, num)?;
            let form = ctx.lines[&form_line].typ.clone();
            rules::check_ug(&form, expected, &mut merged_vars).map_err(to_quantifier_err)?;
        }
        "ei" => {
            let [quant_line] = require1(args, num)?;
            let quant = ctx.lines[&quant_line].typ.clone();
            rules::check_ei(&quant, expected, &mut merged_vars, &ctx.constants_in_scope)
                .map_err(to_quantifier_err)?;
        }
        "eg" => {
            let [form_line] = require1(args, num)?;
            let form = ctx.lines[&form_line].typ.clone();
            rules::check_eg(&form, expected, &mut merged_vars).map_err(to_quantifier_err)?;
        }
        _ => unreachable!("is_quantifier_rule_name guards this"),
    }

    ctx.lines.get_mut(&num).unwrap().vars = merged_vars;
    Ok(())
}

fn check_deduction_line(
    ctx: &mut Context,
    num: i64,
    args: &[i64],
    expected: &crate::prop::Prop,
    merged_vars: VarsMap,
) -> Result<(), CheckError> {
    let mut sorted_args = args.to_vec();
    sorted_args.sort_unstable();

    let proof = ctx.proofs.get(&sorted_args).cloned().ok_or_else(|| {
        CheckError::structure(
            num,
            format!(
                "{}-{} does not denote a complete proof",
                sorted_args.first().copied().unwrap_or_default(),
                sorted_args.last().copied().unwrap_or_default()
            ),
        )
    })?;

    let (hypotheses, conclusions) = ctx
        .proof_types
        .get(&proof.key())
        .cloned()
        .ok_or_else(|| CheckError::structure(num, "cited sub-proof has not yet been compiled"))?;

    rules::check_deduction(&hypotheses, &conclusions, expected)
        .map_err(|e| CheckError::shape(num, e.0))?;

    ctx.lines.get_mut(&num).unwrap().vars = merged_vars;
    Ok(())
}

fn require1(args: &[i64], num: i64) -> Result<[i64; 1], CheckError> {
    args.try_into().map_err(|_| {
        CheckError::shape(
            num,
            format!("rule expects 1 argument, got {}", args.len()),
        )
    })
}

/// Compiles every registered sub-proof whose line-set is now a subset of
/// the checked lines and which hasn't been compiled yet (spec §4.5 step 5).
fn compile_newly_complete_proofs(ctx: &mut Context) {
    let candidates: Vec<Proof> = ctx
        .proofs
        .values()
        .filter(|p| !ctx.proof_types.contains_key(&p.key()))
        .filter(|p| p.line_nums.iter().all(|n| ctx.checked.contains(n)))
        .cloned()
        .collect();

    for proof in candidates {
        ctx.register_type_if_absent(&proof);
    }
}
