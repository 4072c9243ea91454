use std::path::Path;

use anyhow::{Context, Result};
use recurra_core::recurrence::expand;
use recurra_core::rule::RuleDocument;
use recurra_core::summary::pluralize;
use recurra_core::{RecurraError, RecurraResult};

use crate::render::{bold, green, red, yellow};

pub fn run(file: &Path) -> Result<()> {
    let doc = RuleDocument::load(file)
        .with_context(|| format!("Failed to load rule file {}", file.display()))?;

    match check_document(&doc) {
        Ok(report) => {
            print!("{}", report);
            Ok(())
        }
        Err(RecurraError::Validation { field, message }) => {
            println!("{} {} {}", red("✗"), bold(&field), message);
            anyhow::bail!("{} is not a valid rule", file.display());
        }
        Err(e) => Err(e.into()),
    }
}

/// Validate a rule document and summarize what it would produce.
pub fn check_document(doc: &RuleDocument) -> RecurraResult<String> {
    let rule = doc.rule.validate()?;

    // Series id and capacity don't affect which dates are produced
    let occurrences = expand(&rule, "check", 0);

    let mut report = String::new();
    for key in doc.unknown_keys() {
        report.push_str(&format!("{} unknown key {} is ignored\n", yellow("!"), bold(key)));
    }

    match (occurrences.first(), occurrences.last()) {
        (Some(first), Some(last)) => report.push_str(&format!(
            "{} valid: {} {}, {} to {}\n",
            green("✓"),
            occurrences.len(),
            pluralize("occurrence", occurrences.len()),
            first.date,
            last.date
        )),
        _ => report.push_str(&format!(
            "{} valid, but produces no occurrences\n",
            yellow("✓")
        )),
    }

    Ok(report)
}
