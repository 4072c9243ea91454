use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use owo_colors::{OwoColorize, Stream};
use recurra_core::ics::{IcsOptions, generate_ics};
use recurra_core::occurrence::to_json;
use recurra_core::recurrence::expand;
use recurra_core::rule::RuleDocument;
use recurra_core::summary::describe;

use crate::config::{Config, OutputFormat};
use crate::render::{bold, dimmed, render_occurrences};

/// Command-line overrides for `recurra expand`
#[derive(Debug, Default, Clone)]
pub struct ExpandOptions {
    pub series: Option<String>,
    pub capacity: Option<u32>,
    pub format: Option<OutputFormat>,
    pub output: Option<PathBuf>,
}

pub fn run(file: &Path, options: ExpandOptions, config: &Config) -> Result<()> {
    let doc = RuleDocument::load(file)
        .with_context(|| format!("Failed to load rule file {}", file.display()))?;

    let series_id = match options.series.clone().or_else(|| doc.series_id.clone()) {
        Some(id) => id,
        None => {
            let id = uuid::Uuid::new_v4().to_string();
            eprintln!(
                "{} {} {}",
                "No seriesId in rule file, generated"
                    .if_supports_color(Stream::Stderr, |t| t.dimmed()),
                id,
                "(pass --series to keep ids stable)"
                    .if_supports_color(Stream::Stderr, |t| t.dimmed())
            );
            id
        }
    };

    // Files never get terminal styling
    if options.output.is_some() {
        owo_colors::set_override(false);
    }
    let output = expand_document(&doc, &series_id, &options, config)?;

    match &options.output {
        Some(path) => {
            std::fs::write(path, &output)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("Wrote {}", path.display());
        }
        None => print!("{}", output),
    }

    Ok(())
}

/// Expand a loaded rule document and render it in the requested format.
pub fn expand_document(
    doc: &RuleDocument,
    series_id: &str,
    options: &ExpandOptions,
    config: &Config,
) -> Result<String> {
    let rule = doc.rule.validate()?;
    let capacity = options
        .capacity
        .or(doc.capacity)
        .unwrap_or(config.default_capacity);

    let occurrences = expand(&rule, series_id, capacity);
    tracing::info!(series_id, count = occurrences.len(), "expanded rule");

    let format = options.format.unwrap_or(config.default_format);
    let output = match format {
        OutputFormat::Table => {
            let mut lines = Vec::new();
            let title = doc.title.as_deref().unwrap_or(&config.default_title);
            lines.push(bold(title));
            lines.push(dimmed(&describe(&rule)));
            lines.push(String::new());
            lines.extend(render_occurrences(&occurrences));
            let mut text = lines.join("\n");
            text.push('\n');
            text
        }
        OutputFormat::Json => {
            let mut json = to_json(&occurrences)?;
            json.push('\n');
            json
        }
        OutputFormat::Ics => {
            let ics_options = IcsOptions {
                title: doc.title.clone().unwrap_or_else(|| config.default_title.clone()),
                location: doc.location.clone(),
                timezone: config.timezone.clone(),
                generated_at: None,
            };
            generate_ics(&occurrences, &ics_options)?
        }
    };

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use recurra_core::ActivityOccurrence;

    const RULE: &str = r#"
title = "Morning yoga"
capacity = 12
kind = "weekly"
startDate = "2024-01-01"
endDate = "2024-01-14"
daysOfWeek = [1, 3, 5]
startTime = "07:00"
endTime = "08:00"

[modifiedOccurrences."2024-01-10"]
isCancelled = true
cancellationReason = "Studio closed"
"#;

    fn doc() -> RuleDocument {
        RuleDocument::from_toml_str(RULE).unwrap()
    }

    #[test]
    fn json_output_uses_document_capacity() {
        let options = ExpandOptions {
            format: Some(OutputFormat::Json),
            ..Default::default()
        };

        let json = expand_document(&doc(), "yoga", &options, &Config::default()).unwrap();
        let occurrences: Vec<ActivityOccurrence> = serde_json::from_str(&json).unwrap();

        assert_eq!(occurrences.len(), 6);
        assert!(occurrences.iter().all(|o| o.capacity == 12));
        assert_eq!(occurrences.iter().filter(|o| !o.is_available).count(), 1);
        assert_eq!(occurrences[0].id, "yoga-20240101-0700");
    }

    #[test]
    fn flag_capacity_beats_document_and_config() {
        let options = ExpandOptions {
            capacity: Some(3),
            format: Some(OutputFormat::Json),
            ..Default::default()
        };

        let json = expand_document(&doc(), "yoga", &options, &Config::default()).unwrap();
        let occurrences: Vec<ActivityOccurrence> = serde_json::from_str(&json).unwrap();
        assert!(occurrences.iter().all(|o| o.capacity == 3));
    }

    #[test]
    fn config_capacity_is_the_fallback() {
        let mut doc = doc();
        doc.capacity = None;
        let config = Config {
            default_capacity: 20,
            ..Default::default()
        };
        let options = ExpandOptions {
            format: Some(OutputFormat::Json),
            ..Default::default()
        };

        let json = expand_document(&doc, "yoga", &options, &config).unwrap();
        let occurrences: Vec<ActivityOccurrence> = serde_json::from_str(&json).unwrap();
        assert!(occurrences.iter().all(|o| o.capacity == 20));
    }

    #[test]
    fn table_output_has_title_and_summary() {
        let table = expand_document(&doc(), "yoga", &ExpandOptions::default(), &Config::default())
            .unwrap();

        assert!(table.contains("Morning yoga"));
        assert!(table.contains("Weekly on Mon, Wed, Fri"));
        assert!(table.contains("Studio closed"));
        assert!(table.contains("6 occurrences, 1 cancelled"));
    }

    #[test]
    fn ics_output_from_config_format() {
        let config = Config {
            default_format: OutputFormat::Ics,
            ..Default::default()
        };

        let ics = expand_document(&doc(), "yoga", &ExpandOptions::default(), &config).unwrap();
        assert_eq!(ics.matches("BEGIN:VEVENT").count(), 6);
        assert!(ics.contains("SUMMARY:Morning yoga"));
        assert!(ics.contains("STATUS:CANCELLED"));
    }

    #[test]
    fn invalid_rule_produces_no_output() {
        let mut doc = doc();
        doc.rule.end_date = Some("next week".to_string());

        let err = expand_document(&doc, "yoga", &ExpandOptions::default(), &Config::default())
            .unwrap_err();
        assert!(err.to_string().contains("endDate"));
    }

    #[test]
    fn run_writes_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let rule_path = dir.path().join("yoga.toml");
        let out_path = dir.path().join("yoga.json");
        std::fs::write(&rule_path, RULE).unwrap();

        let options = ExpandOptions {
            series: Some("yoga".to_string()),
            format: Some(OutputFormat::Json),
            output: Some(out_path.clone()),
            ..Default::default()
        };
        run(&rule_path, options, &Config::default()).unwrap();

        let written = std::fs::read_to_string(&out_path).unwrap();
        let occurrences: Vec<ActivityOccurrence> = serde_json::from_str(&written).unwrap();
        assert_eq!(occurrences.len(), 6);
        assert_eq!(occurrences[0].series_id, "yoga");
    }

    #[test]
    fn table_written_to_file_is_plain_text() {
        let dir = tempfile::tempdir().unwrap();
        let rule_path = dir.path().join("yoga.toml");
        let out_path = dir.path().join("yoga.txt");
        std::fs::write(&rule_path, RULE).unwrap();

        let options = ExpandOptions {
            series: Some("yoga".to_string()),
            format: Some(OutputFormat::Table),
            output: Some(out_path.clone()),
            ..Default::default()
        };
        run(&rule_path, options, &Config::default()).unwrap();

        let written = std::fs::read_to_string(&out_path).unwrap();
        assert!(written.starts_with("Morning yoga\n"));
        assert!(written.contains("6 occurrences, 1 cancelled"));
        assert!(!written.contains('\x1b'));
    }
}
