//! Example: Clean, prepare and score a customer table
//!
//! This example walks through the churnkit workflow on synthetic telecom data:
//! 1. Coercing numeric text columns
//! 2. Applying a cleaning plan (imputations and excluded columns)
//! 3. Fitting a preparer with date decomposition
//! 4. Bundling the preparer with a classifier and round-tripping it as JSON
//! 5. Scoring a fresh batch that contains unseen categories
//!
//! Run with: `RUST_LOG=debug cargo run --example score_customers`

use churnkit::{
    model::{
        BundledClassifier, DataFramePreparer, LogisticClassifier, ModelBundle, PreparerConfig,
        RiskSummary,
    },
    primitives::ConfusionMatrix,
    traits::FrameTransform,
    utils::{
        CleaningPlan, CoercionConfig, ImputationDirective, ImputeStrategy, coerce_numeric_columns,
    },
};
use polars::prelude::*;
use rand::{Rng, SeedableRng, rngs::StdRng};
use rand_distr::{Distribution, Normal};
use tracing_subscriber::EnvFilter;

const CONTRACTS: &[&str] = &["Month-to-month", "One year", "Two year"];
const PAYMENTS: &[&str] = &["Electronic check", "Mailed check", "Bank transfer", "Credit card"];

/// Hand-picked weights for the demo classifier, by prepared column name.
const WEIGHTS: &[(&str, f64)] = &[
    ("tenure", -1.2),
    ("MonthlyCharges", 0.6),
    ("Contract_Month-to-month", 1.4),
    ("Contract_Two year", -1.6),
    ("PaymentMethod_Electronic check", 0.8),
];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== churnkit: score customers ===\n");

    // =========================================================================
    // SYNTHETIC TRAINING DATA
    // =========================================================================

    let mut rng = StdRng::seed_from_u64(7);
    let raw = synthetic_customers(&mut rng, 500, PAYMENTS)?;
    println!("Raw training table:\n{}\n", raw.head(Some(5)));

    // =========================================================================
    // CLEANING
    // =========================================================================

    let (coerced, decisions) = coerce_numeric_columns(&raw, &CoercionConfig::default())?;
    for d in &decisions {
        println!("  {:<16} nan_ratio={:.2} converted={}", d.column, d.nan_ratio, d.converted);
    }

    let mut plan = CleaningPlan::new();
    plan.upsert(ImputationDirective::new("TotalCharges", ImputeStrategy::Median))
        .upsert(ImputationDirective::new("PaymentMethod", ImputeStrategy::Mode))
        .exclude("customerID");
    let clean = plan.apply(&coerced)?;
    println!("\nClean table shape: {:?}\n", clean.shape());

    // =========================================================================
    // PREPARATION
    // =========================================================================

    let mut preparer = DataFramePreparer::with_config(PreparerConfig::with_dates())?;
    preparer.fit(&clean.drop("Churn")?)?;

    println!("Numeric columns:     {:?}", preparer.numeric_columns());
    println!("Categorical columns: {:?}", preparer.categorical_columns());
    println!("Output columns ({}):", preparer.output_columns().len());
    for name in preparer.output_columns() {
        println!("  {name}");
    }

    // =========================================================================
    // BUNDLE
    // =========================================================================

    let coefficients: Vec<f64> = preparer
        .output_columns()
        .iter()
        .map(|name| WEIGHTS.iter().find(|(w, _)| *w == name.as_str()).map_or(0.0, |(_, v)| *v))
        .collect();
    let importances: Vec<f64> = coefficients.iter().map(|c| c.abs()).collect();

    let mut bundle = ModelBundle::new(
        &preparer,
        BundledClassifier::Logistic(LogisticClassifier::new(coefficients, -0.3)),
    )?;
    bundle.raw_features = clean.get_column_names().iter().map(|c| c.to_string()).collect();
    bundle.feature_importances = Some(importances);
    bundle.confusion_matrix = Some(ConfusionMatrix(vec![vec![310, 52], vec![41, 97]]));
    bundle.validate()?;

    let json = bundle.to_json()?;
    println!("\nBundle JSON: {} bytes", json.len());
    let bundle = ModelBundle::from_json(&json)?;
    if let Some(accuracy) = bundle.confusion_matrix.as_ref().and_then(ConfusionMatrix::accuracy) {
        println!("Hold-out accuracy: {:.1}%", accuracy * 100.0);
    }

    println!("\nTop drivers:");
    for fi in bundle.ranked_importances(Some(3)) {
        println!("  {:<32} {:.2}", fi.feature, fi.importance);
    }

    // =========================================================================
    // SCORING
    // =========================================================================

    // new batch with a payment method never seen in training
    let fresh = synthetic_customers(&mut rng, 8, &["Electronic check", "Crypto wallet"])?;
    let (fresh, _) = coerce_numeric_columns(&fresh, &CoercionConfig::default())?;
    let fresh = plan.apply(&fresh)?;

    let predictions = bundle.score(&fresh)?;
    println!("\n{:<4} {:>11} {:>6} {:>7}", "row", "probability", "churn", "risk");
    for (i, p) in predictions.iter().enumerate() {
        println!("{i:<4} {:>11.3} {:>6} {:>7}", p.probability, p.churn, p.risk_level().to_string());
    }

    let summary = RiskSummary::from_predictions(&predictions);
    println!(
        "\nlow={} medium={} high={} churn_rate={:.1}%",
        summary.low,
        summary.medium,
        summary.high,
        summary.churn_rate().unwrap_or(0.0) * 100.0
    );

    Ok(())
}

/// Build a raw telecom-style table: charges stored as text with blanks,
/// a few missing payment methods, a signup date and a `Churn` label.
fn synthetic_customers(
    rng: &mut StdRng,
    n: usize,
    payments: &[&str],
) -> Result<DataFrame, Box<dyn std::error::Error>> {
    let charges_dist: Normal<f64> = Normal::new(65.0, 25.0)?;

    let mut ids = Vec::with_capacity(n);
    let mut tenure = Vec::with_capacity(n);
    let mut monthly = Vec::with_capacity(n);
    let mut total = Vec::with_capacity(n);
    let mut contract = Vec::with_capacity(n);
    let mut payment = Vec::with_capacity(n);
    let mut signup = Vec::with_capacity(n);
    let mut churn = Vec::with_capacity(n);

    for i in 0..n {
        let months: i64 = rng.gen_range(0..72);
        let charge = charges_dist.sample(rng).clamp(18.0, 120.0);
        let plan = CONTRACTS[rng.gen_range(0..CONTRACTS.len())];

        ids.push(format!("C{i:05}"));
        tenure.push(months);
        monthly.push(charge);
        total.push(if months == 0 {
            " ".to_string()
        } else {
            format!("{:.2}", charge * months as f64)
        });
        contract.push(plan);
        payment.push(rng.gen_bool(0.95).then(|| payments[rng.gen_range(0..payments.len())]));
        signup.push(format!("2019-{:02}-{:02}", rng.gen_range(1..=12), rng.gen_range(1..=28)));

        let risk = (if plan == "Month-to-month" { 0.45 } else { 0.1 })
            + (if months < 12 { 0.2 } else { 0.0 });
        churn.push(if rng.gen_bool(risk) { "Yes" } else { "No" });
    }

    Ok(df! {
        "customerID" => ids,
        "tenure" => tenure,
        "MonthlyCharges" => monthly,
        "TotalCharges" => total,
        "Contract" => contract,
        "PaymentMethod" => payment,
        "signup_date" => signup,
        "Churn" => churn,
    }?)
}
