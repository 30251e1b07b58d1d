//! Validation stage.
//!
//! Checks extracted invoice fields against business rules. Rules are
//! evaluated independently and all violations are reported, in order.

use serde::Serialize;

use crate::document::InvoiceMetadata;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationOutcome {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

/// Pure business-rule check over an extracted metadata record.
pub fn validate(metadata: &InvoiceMetadata) -> ValidationOutcome {
    let mut errors = Vec::new();

    if metadata.invoice_number.is_none() {
        errors.push("Missing invoice number".to_string());
    }
    if metadata.customer.is_none() {
        errors.push("Missing customer".to_string());
    }
    if metadata.amount <= 0.0 {
        errors.push("Invalid amount".to_string());
    }

    ValidationOutcome {
        is_valid: errors.is_empty(),
        errors,
    }
}
