//! Pipeline configuration
//!
//! Column lists and label parameters are plain values injected into the
//! pipelines. The defaults reproduce the production gold tables; tests and
//! synthetic schemas override them.

use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CUSTOMER_ID: &str = "Customer_ID";
pub const SNAPSHOT_DATE: &str = "snapshot_date";
pub const LOAN_ID: &str = "loan_id";
pub const LOAN_START_DATE: &str = "loan_start_date";
pub const INSTALLMENT_NUM: &str = "installment_num";
pub const OVERDUE_AMT: &str = "overdue_amt";

pub const DEFAULT_DPD: i32 = 30;
pub const DEFAULT_MOB: i32 = 6;

/// Columns removed after the feature join
pub const DEFAULT_DENY_LIST: &[&str] = &[
    "label",
    "target",
    "Name",
    "SSN",
    "Occupation",
    "Payment_of_Min_Amount",
    "Payment_Behaviour",
    "fe_sum",
    "fe_1",
    "fe_2",
    "fe_3",
    "fe_4",
    "fe_5",
    "fe_6",
    "fe_7",
    "fe_8",
    "fe_9",
    "fe_10",
    "fe_11",
    "fe_12",
    "fe_13",
    "fe_14",
    "fe_15",
    "fe_16",
    "fe_17",
    "fe_18",
    "fe_19",
    "fe_20",
    "Changed_Credit_Limit",
    "Credit_History_Age",
    "Amount_invested_monthly",
    "Type_of_Loan",
];

/// Case-insensitive prefixes that mark a label/target column
pub const DEFAULT_LEAKAGE_PREFIXES: &[&str] = &["label", "target"];

/// Numeric columns cast to Float64 with nulls kept as nulls
pub const DEFAULT_NUMERIC_COLUMNS: &[&str] = &[
    "Monthly_Balance",
    "Annual_Income",
    "Monthly_Inhand_Salary",
    "Outstanding_Debt",
    "Num_Credit_Inquiries",
    "Credit_Utilization_Ratio",
    "Total_EMI_per_month",
    "Num_Bank_Accounts",
    "Num_Credit_Card",
    "Interest_Rate",
    "Num_of_Loan",
    "Delay_from_due_date",
    "Num_of_Delayed_Payment",
];

/// Columns kept in the gold feature table besides the identity columns
pub const DEFAULT_ESSENTIAL_FEATURES: &[&str] = &[
    "Annual_Income",
    "Outstanding_Debt",
    "Credit_Utilization_Ratio",
    "Total_EMI_per_month",
    "Num_of_Delayed_Payment",
    "Debt_to_Income_Ratio",
    "EMI_Burden_Ratio",
    "Credit_Mix_encoded",
];

fn owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// Label definition parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelConfig {
    /// Days-past-due threshold at or above which a loan is labelled 1
    #[serde(default = "default_dpd")]
    pub dpd: i32,

    /// Months on book at which the label is observed
    #[serde(default = "default_mob")]
    pub mob: i32,
}

fn default_dpd() -> i32 {
    DEFAULT_DPD
}

fn default_mob() -> i32 {
    DEFAULT_MOB
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            dpd: DEFAULT_DPD,
            mob: DEFAULT_MOB,
        }
    }
}

impl LabelConfig {
    pub fn new(dpd: i32, mob: i32) -> Self {
        Self { dpd, mob }
    }

    /// Versioning tag written next to every label, e.g. `30dpd_6mob`
    pub fn label_def(&self) -> String {
        format!("{}dpd_{}mob", self.dpd, self.mob)
    }

    pub fn validate(&self) -> Result<()> {
        if self.mob < 0 {
            return Err(PipelineError::Config(format!(
                "mob must be non-negative, got {}",
                self.mob
            )));
        }
        Ok(())
    }
}

/// Column lists driving the feature pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureColumns {
    pub identity: Vec<String>,
    pub deny_list: Vec<String>,
    pub leakage_prefixes: Vec<String>,
    pub numeric: Vec<String>,
    pub essential: Vec<String>,
}

impl Default for FeatureColumns {
    fn default() -> Self {
        Self {
            identity: owned(&[CUSTOMER_ID, SNAPSHOT_DATE]),
            deny_list: owned(DEFAULT_DENY_LIST),
            leakage_prefixes: owned(DEFAULT_LEAKAGE_PREFIXES),
            numeric: owned(DEFAULT_NUMERIC_COLUMNS),
            essential: owned(DEFAULT_ESSENTIAL_FEATURES),
        }
    }
}

impl FeatureColumns {
    /// Whether `column` matches a leakage prefix, ignoring case
    pub fn is_leakage(&self, column: &str) -> bool {
        let lower = column.to_lowercase();
        self.leakage_prefixes
            .iter()
            .any(|prefix| lower.starts_with(&prefix.to_lowercase()))
    }

    pub fn is_denied(&self, column: &str) -> bool {
        self.deny_list.iter().any(|c| c == column)
    }

    pub fn validate(&self) -> Result<()> {
        if self.identity.is_empty() {
            return Err(PipelineError::Config(
                "at least one identity column is required".to_string(),
            ));
        }
        if let Some(id) = self.identity.iter().find(|c| self.is_denied(c)) {
            return Err(PipelineError::Config(format!(
                "identity column {} is on the deny-list",
                id
            )));
        }
        Ok(())
    }
}

/// How `Occupation` categories are mapped to integer codes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum OccupationEncoding {
    /// Codes assigned from the categories seen in the current run
    #[default]
    Dynamic,
    /// Codes read from, and extended into, a JSON lookup table
    Persisted { path: PathBuf },
}

/// Feature pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FeatureConfig {
    pub columns: FeatureColumns,
    pub occupation: OccupationEncoding,
}

/// Combined configuration for both pipelines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PipelineConfig {
    pub label: LabelConfig,
    pub features: FeatureConfig,
}

impl PipelineConfig {
    /// Load a pipeline configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.label.validate()?;
        self.features.columns.validate()
    }
}
