use std::path::Path;

use anyhow::{Context, Result};
use recurra_core::rule::RuleDocument;
use recurra_core::summary::describe;

use crate::render::bold;

pub fn run(file: &Path) -> Result<()> {
    let doc = RuleDocument::load(file)
        .with_context(|| format!("Failed to load rule file {}", file.display()))?;
    print!("{}", describe_document(&doc)?);
    Ok(())
}

/// Title (when set) and a one-line summary of the rule.
pub fn describe_document(doc: &RuleDocument) -> Result<String> {
    let rule = doc.rule.validate()?;

    let mut text = String::new();
    if let Some(ref title) = doc.title {
        text.push_str(&bold(title));
        text.push('\n');
    }
    text.push_str(&describe(&rule));
    text.push('\n');
    Ok(text)
}
