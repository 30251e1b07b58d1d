//! Extraction stage.
//!
//! Derives structured invoice fields from recognized text with three
//! independent pattern rules. Pure: no I/O, no failure path.

use regex::Regex;

use crate::document::InvoiceMetadata;

pub struct MetadataExtractor {
    invoice_number: Regex,
    customer: Regex,
    amount: Regex,
}

impl MetadataExtractor {
    pub fn new() -> Self {
        // Hard-coded patterns, known to compile.
        Self {
            invoice_number: Regex::new(r"Invoice #(\S+)").expect("invoice pattern compiles"),
            customer: Regex::new(r"Customer: ([^\n]+)").expect("customer pattern compiles"),
            amount: Regex::new(r"Amount: \$([0-9.]+)").expect("amount pattern compiles"),
        }
    }

    /// Extracts the invoice fields. Missing markers leave the field absent;
    /// a missing or unparsable amount yields zero.
    pub fn extract(&self, text: &str) -> InvoiceMetadata {
        InvoiceMetadata {
            invoice_number: self.first_capture(&self.invoice_number, text),
            customer: self.first_capture(&self.customer, text),
            amount: self
                .first_capture(&self.amount, text)
                .and_then(|raw| raw.parse::<f64>().ok())
                .unwrap_or(0.0),
        }
    }

    fn first_capture(&self, pattern: &Regex, text: &str) -> Option<String> {
        pattern
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }
}

impl Default for MetadataExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_all_fields() {
        let extractor = MetadataExtractor::new();
        let metadata =
            extractor.extract("Invoice #INV-001\nCustomer: Acme Corp\nAmount: $150.00");
        assert_eq!(metadata.invoice_number.as_deref(), Some("INV-001"));
        assert_eq!(metadata.customer.as_deref(), Some("Acme Corp"));
        assert_eq!(metadata.amount, 150.0);
    }

    #[test]
    fn test_no_markers_yields_absent_fields() {
        let extractor = MetadataExtractor::new();
        let metadata = extractor.extract("no structured fields here");
        assert!(metadata.invoice_number.is_none());
        assert!(metadata.customer.is_none());
        assert_eq!(metadata.amount, 0.0);
    }

    #[test]
    fn test_invoice_number_stops_at_whitespace() {
        let extractor = MetadataExtractor::new();
        let metadata = extractor.extract("Invoice #INV-42 issued today");
        assert_eq!(metadata.invoice_number.as_deref(), Some("INV-42"));
    }

    #[test]
    fn test_customer_runs_to_end_of_line() {
        let extractor = MetadataExtractor::new();
        let metadata = extractor.extract("Customer: Acme Corp Ltd.\nAmount: $10");
        assert_eq!(metadata.customer.as_deref(), Some("Acme Corp Ltd."));
    }

    #[test]
    fn test_unparsable_amount_yields_zero() {
        let extractor = MetadataExtractor::new();
        // "[0-9.]+" can match dots-only runs, which do not parse as f64.
        let metadata = extractor.extract("Amount: $...");
        assert_eq!(metadata.amount, 0.0);
    }

    #[test]
    fn test_zero_amount_is_kept() {
        let extractor = MetadataExtractor::new();
        let metadata = extractor.extract("Invoice #X\nCustomer: Y\nAmount: $0");
        assert_eq!(metadata.amount, 0.0);
        assert_eq!(metadata.invoice_number.as_deref(), Some("X"));
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let extractor = MetadataExtractor::new();
        let text = "Invoice #A1\nCustomer: B\nAmount: $2.50";
        assert_eq!(extractor.extract(text), extractor.extract(text));
    }
}
