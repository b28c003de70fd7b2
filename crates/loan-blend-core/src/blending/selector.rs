use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, warn};

use crate::amortization::{monthly_payment, total_interest};
use crate::blending::model::BlendModel;
use crate::blending::ratio_search::{scan_ratios, SearchConfig};
use crate::error::LoanBlendError;
use crate::types::{with_metadata, ComputationOutput, LoanOffer, LoanTerm, Money};
use crate::LoanBlendResult;

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BestCombinationInput {
    /// The given long-term loan every candidate is blended with.
    pub reference: LoanOffer,
    /// Short-term offers to evaluate.
    pub candidates: Vec<LoanOffer>,
    #[serde(default)]
    pub config: SearchConfig,
}

/// The winning candidate and split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestCombination {
    /// Percent of the notional placed in the candidate loan.
    pub ratio: Decimal,
    /// Lifetime interest of the blended structure on the notional.
    pub interest: Money,
    pub loan: LoanOffer,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateEvaluation {
    pub index: usize,
    pub loan: LoanOffer,
    pub ratio: Decimal,
    pub monthly_payment: Money,
    pub interest: Money,
    pub feasible: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedCandidate {
    pub index: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BestCombinationOutput {
    pub best: BestCombination,
    /// Interest of the reference loan alone on the same notional.
    pub reference_interest: Money,
    pub interest_saving: Money,
    pub evaluations: Vec<CandidateEvaluation>,
    pub skipped: Vec<SkippedCandidate>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Blend every candidate with the reference loan at its optimal ratio and
/// pick the lowest-interest structure.
///
/// Malformed candidates are skipped with a warning. The call fails when the
/// reference is invalid, the candidate list is empty, nothing survives
/// validation, or the winning ratio is zero.
pub fn select_best_combination(
    input: &BestCombinationInput,
) -> LoanBlendResult<ComputationOutput<BestCombinationOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let reference = input.reference.to_term("reference")?;
    if input.candidates.is_empty() {
        return Err(LoanBlendError::invalid(
            "candidates",
            "At least one candidate loan is required",
        ));
    }
    input.config.validate()?;

    let mut evaluations: Vec<CandidateEvaluation> = Vec::with_capacity(input.candidates.len());
    let mut skipped: Vec<SkippedCandidate> = Vec::new();
    let mut best: Option<(usize, LoanTerm, Decimal, Money)> = None;

    for (index, offer) in input.candidates.iter().enumerate() {
        let evaluated = offer
            .to_term(&format!("candidates[{index}]"))
            .and_then(|term| evaluate_candidate(&term, &reference, &input.config).map(|e| (term, e)));

        let (term, (ratio, payment, interest)) = match evaluated {
            Ok(v) => v,
            Err(e) => {
                warn!(index, error = %e, "skipping candidate loan");
                warnings.push(format!("Candidate {index} skipped: {e}"));
                skipped.push(SkippedCandidate {
                    index,
                    reason: e.to_string(),
                });
                continue;
            }
        };

        evaluations.push(CandidateEvaluation {
            index,
            loan: offer.clone(),
            ratio,
            monthly_payment: payment,
            interest,
            feasible: ratio > Decimal::ZERO,
        });

        let improves = match best {
            Some((_, _, _, best_interest)) => interest < best_interest,
            None => true,
        };
        if improves {
            best = Some((index, term, ratio, interest));
        }
    }

    let (best_index, best_term, best_ratio, best_interest) = best.ok_or_else(|| {
        LoanBlendError::Infeasible("every candidate loan was invalid".into())
    })?;

    if best_ratio.is_zero() {
        return Err(LoanBlendError::Infeasible(format!(
            "candidate {best_index} has the lowest interest but no split covers the reference loan's interest"
        )));
    }

    let reference_interest = total_interest(
        monthly_payment(input.config.total_amount, reference.annual_rate(), reference.duration_months())?,
        input.config.total_amount,
        reference.duration_months(),
    )?;
    let interest_saving = reference_interest
        .checked_sub(best_interest)
        .ok_or_else(|| LoanBlendError::overflow("interest saving"))?;

    debug!(
        index = best_index,
        ratio = %best_ratio,
        interest = %best_interest,
        "best combination selected"
    );

    let output = BestCombinationOutput {
        best: BestCombination {
            ratio: best_ratio,
            interest: best_interest,
            loan: LoanOffer::from_term(&best_term),
        },
        reference_interest,
        interest_saving,
        evaluations,
        skipped,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "reference_months": reference.duration_months(),
        "total_amount": input.config.total_amount.to_string(),
        "precision": input.config.precision.to_string(),
        "candidates_supplied": input.candidates.len(),
    });

    Ok(with_metadata(
        "Best short/long blend by minimum lifetime interest",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Returns (ratio, smoothed payment, lifetime interest) for one candidate.
fn evaluate_candidate(
    candidate: &LoanTerm,
    reference: &LoanTerm,
    config: &SearchConfig,
) -> LoanBlendResult<(Decimal, Money, Money)> {
    let scan = scan_ratios(candidate, reference, config)?;
    let blend = BlendModel::new(*candidate, *reference)?.evaluate(scan.ratio, config.total_amount)?;
    Ok((scan.ratio, blend.monthly_payment, blend.total_interest))
}
