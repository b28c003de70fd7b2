use napi::Result as NapiResult;
use napi_derive::napi;

use loan_blend_core::amortization::{self, PaymentInput};
use loan_blend_core::blending::model::{self, BlendInput};
use loan_blend_core::blending::ratio_search::{self, RatioSearchInput};
use loan_blend_core::blending::selector::{self, BestCombinationInput};
use loan_blend_core::schedule::{self, ScheduleInput};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Amortisation
// ---------------------------------------------------------------------------

#[napi]
pub fn loan_payment(input_json: String) -> NapiResult<String> {
    let input: PaymentInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = amortization::calculate_payment(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn amortization_schedule(input_json: String) -> NapiResult<String> {
    let input: ScheduleInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = schedule::build_schedule(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Blending
// ---------------------------------------------------------------------------

#[napi]
pub fn blended_payment(input_json: String) -> NapiResult<String> {
    let input: BlendInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = model::calculate_blend(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn optimal_ratio(input_json: String) -> NapiResult<String> {
    let input: RatioSearchInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = ratio_search::search_ratio(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn best_combination(input_json: String) -> NapiResult<String> {
    let input: BestCombinationInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = selector::select_best_combination(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
