//! Derived ratio and trend features

use polars::prelude::*;

pub const ANNUAL_INCOME: &str = "Annual_Income";
pub const OUTSTANDING_DEBT: &str = "Outstanding_Debt";
pub const MONTHLY_INHAND_SALARY: &str = "Monthly_Inhand_Salary";
pub const TOTAL_EMI_PER_MONTH: &str = "Total_EMI_per_month";
pub const CREDIT_UTILIZATION_RATIO: &str = "Credit_Utilization_Ratio";
pub const NUM_OF_DELAYED_PAYMENT: &str = "Num_of_Delayed_Payment";
pub const DELAY_FROM_DUE_DATE: &str = "Delay_from_due_date";

pub const DEBT_TO_INCOME_RATIO: &str = "Debt_to_Income_Ratio";
pub const EMI_BURDEN_RATIO: &str = "EMI_Burden_Ratio";
pub const CREDIT_UTILIZATION_TREND: &str = "Credit_Utilization_Trend";
pub const DELINQUENCY_SCORE: &str = "Delinquency_Score";

/// Columns read by `derived_features`
pub const DERIVED_INPUTS: [&str; 7] = [
    ANNUAL_INCOME,
    OUTSTANDING_DEBT,
    MONTHLY_INHAND_SALARY,
    TOTAL_EMI_PER_MONTH,
    CREDIT_UTILIZATION_RATIO,
    NUM_OF_DELAYED_PAYMENT,
    DELAY_FROM_DUE_DATE,
];

const IDEAL_UTILIZATION: f64 = 0.3;
const UTILIZATION_SPAN: f64 = 0.7;
const DELAYED_PAYMENT_WEIGHT: f64 = 0.4;
const DELAY_DAYS_WEIGHT: f64 = 0.6;

fn f64_col(name: &str) -> Expr {
    col(name).cast(DataType::Float64)
}

/// `numerator / denominator` when the denominator is positive, null otherwise
pub fn guarded_ratio(numerator: &str, denominator: &str) -> Expr {
    when(f64_col(denominator).gt(lit(0.0)))
        .then(f64_col(numerator) / f64_col(denominator))
        .otherwise(lit(NULL))
        .cast(DataType::Float64)
}

/// Debt-to-income, EMI burden, utilization trend and delinquency score
pub fn derived_features() -> [Expr; 4] {
    [
        guarded_ratio(OUTSTANDING_DEBT, ANNUAL_INCOME).alias(DEBT_TO_INCOME_RATIO),
        guarded_ratio(TOTAL_EMI_PER_MONTH, MONTHLY_INHAND_SALARY).alias(EMI_BURDEN_RATIO),
        ((f64_col(CREDIT_UTILIZATION_RATIO) - lit(IDEAL_UTILIZATION)) / lit(UTILIZATION_SPAN))
            .alias(CREDIT_UTILIZATION_TREND),
        (f64_col(NUM_OF_DELAYED_PAYMENT) * lit(DELAYED_PAYMENT_WEIGHT)
            + f64_col(DELAY_FROM_DUE_DATE) * lit(DELAY_DAYS_WEIGHT))
        .alias(DELINQUENCY_SCORE),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(df: &DataFrame, name: &str) -> Vec<Option<f64>> {
        let s = df.column(name).unwrap().as_materialized_series();
        s.f64().unwrap().into_iter().collect()
    }

    #[test]
    fn test_debt_to_income_null_guard() {
        let df = df! {
            "Outstanding_Debt" => &[Some(500.0), Some(500.0), Some(500.0), None],
            "Annual_Income" => &[Some(1000.0), Some(0.0), None, Some(-5.0)],
        }
        .unwrap();

        let out = df
            .lazy()
            .with_column(guarded_ratio(OUTSTANDING_DEBT, ANNUAL_INCOME).alias(DEBT_TO_INCOME_RATIO))
            .collect()
            .unwrap();

        assert_eq!(
            values(&out, DEBT_TO_INCOME_RATIO),
            vec![Some(0.5), None, None, None]
        );
    }

    #[test]
    fn test_all_derived_features() {
        let df = df! {
            "Annual_Income" => &[120_000.0],
            "Outstanding_Debt" => &[30_000.0],
            "Monthly_Inhand_Salary" => &[8_000.0],
            "Total_EMI_per_month" => &[2_000.0],
            "Credit_Utilization_Ratio" => &[1.0],
            "Num_of_Delayed_Payment" => &[5],
            "Delay_from_due_date" => &[10],
        }
        .unwrap();

        let out = df.lazy().with_columns(derived_features()).collect().unwrap();

        assert_eq!(values(&out, DEBT_TO_INCOME_RATIO), vec![Some(0.25)]);
        assert_eq!(values(&out, EMI_BURDEN_RATIO), vec![Some(0.25)]);
        let trend = values(&out, CREDIT_UTILIZATION_TREND)[0].unwrap();
        assert!((trend - 1.0).abs() < 1e-12);
        let score = values(&out, DELINQUENCY_SCORE)[0].unwrap();
        assert!((score - 8.0).abs() < 1e-12);
    }

    #[test]
    fn test_trend_has_no_null_guard_for_zero_utilization() {
        let df = df! { "Credit_Utilization_Ratio" => &[0.0] }.unwrap();

        let out = df
            .lazy()
            .with_column(
                ((f64_col(CREDIT_UTILIZATION_RATIO) - lit(IDEAL_UTILIZATION))
                    / lit(UTILIZATION_SPAN))
                .alias(CREDIT_UTILIZATION_TREND),
            )
            .collect()
            .unwrap();

        let trend = values(&out, CREDIT_UTILIZATION_TREND)[0].unwrap();
        assert!((trend + 0.3 / 0.7).abs() < 1e-12);
    }
}
