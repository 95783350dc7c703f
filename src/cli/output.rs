//! Output formatting for multiple formats
//!
//! Resolutions, failures, table documents and configuration can each be
//! rendered as JSON, YAML or human-readable text.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::config::WheelmatchConfig;
use crate::extractors::{Table, TableDocument};
use crate::matcher::{Resolution, ResolutionFailure};

const RULE: &str = "\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}";

/// Output format enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON format (machine-readable)
    Json,
    /// YAML format
    Yaml,
    /// Human-readable formatted text
    Human,
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn format_resolution(&self, resolution: &Resolution) -> Result<String> {
        match self.format {
            OutputFormat::Json => to_json(resolution, "resolution"),
            OutputFormat::Yaml => to_yaml(resolution, "resolution"),
            // Plain URL so the output can be piped straight into an installer.
            OutputFormat::Human => Ok(format!("{}\n", resolution.url)),
        }
    }

    /// Detailed human view of a resolution, for verbose runs.
    pub fn format_resolution_details(&self, resolution: &Resolution) -> Result<String> {
        if self.format != OutputFormat::Human {
            return self.format_resolution(resolution);
        }

        let artifact = &resolution.artifact;
        let published = |value: &Option<String>| value.clone().unwrap_or_else(|| "(any)".to_string());

        let mut output = String::new();
        output.push_str("\u{2713} Resolved\n");
        output.push_str(RULE);
        output.push_str("\n\n");
        output.push_str(&format!("URL:        {}\n", resolution.url));
        output.push_str(&format!("Package:    {}\n", artifact.package));
        if let Some(ref variant) = artifact.variant {
            output.push_str(&format!("Variant:    {}\n", variant));
        }
        output.push_str("\nArtifact:\n");
        output.push_str(&format!(
            "\u{251C}\u{2500} Framework:    {}\n",
            published(&artifact.framework_version)
        ));
        output.push_str(&format!(
            "\u{251C}\u{2500} Accelerator:  {}\n",
            published(&artifact.accelerator)
        ));
        output.push_str(&format!(
            "\u{2514}\u{2500} Language:     {}\n\n",
            published(&artifact.language)
        ));
        output.push_str(&format!(
            "Matched by {} strategy at {}\n",
            resolution.strategy, resolution.attempt
        ));
        if let Some(score) = resolution.score {
            output.push_str(&format!("Score: {}\n", score));
        }

        Ok(output)
    }

    pub fn format_failure(&self, failure: &ResolutionFailure) -> Result<String> {
        match self.format {
            OutputFormat::Json => to_json(failure, "resolution failure"),
            OutputFormat::Yaml => to_yaml(failure, "resolution failure"),
            OutputFormat::Human => Ok(format!("\u{2717} {}\n", failure)),
        }
    }

    pub fn format_tables(&self, tables: &[Table]) -> Result<String> {
        let document = TableDocument::new(tables);
        match self.format {
            OutputFormat::Json => document.to_json(),
            OutputFormat::Yaml => to_yaml(&document, "table document"),
            OutputFormat::Human => Ok(self.format_tables_human(tables)),
        }
    }

    fn format_tables_human(&self, tables: &[Table]) -> String {
        let mut output = format!("{} table(s)\n{}\n", tables.len(), RULE);
        for table in tables {
            output.push_str(&format!(
                "\n[{}] #{}  {} column(s), {} row(s)\n",
                table.heading,
                table.ordinal,
                table.header.len(),
                table.rows.len()
            ));
            output.push_str(&format!("  {}\n", table.header.join(" | ")));
        }
        output
    }

    pub fn format_config(&self, config: &WheelmatchConfig) -> Result<String> {
        let map = config.to_display_map();
        match self.format {
            OutputFormat::Json => to_json(&map, "config"),
            OutputFormat::Yaml => to_yaml(&map, "config"),
            OutputFormat::Human => Ok(config.to_string()),
        }
    }

    pub fn format_tag(&self, tag: &str, dotted: &str) -> Result<String> {
        #[derive(Serialize)]
        struct TagOutput<'a> {
            tag: &'a str,
            dotted: &'a str,
        }

        let value = TagOutput { tag, dotted };
        match self.format {
            OutputFormat::Json => to_json(&value, "tag"),
            OutputFormat::Yaml => to_yaml(&value, "tag"),
            OutputFormat::Human => Ok(format!("{}\n", dotted)),
        }
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T, what: &str) -> Result<String> {
    serde_json::to_string_pretty(value).with_context(|| format!("Failed to serialize {} to JSON", what))
}

fn to_yaml<T: Serialize + ?Sized>(value: &T, what: &str) -> Result<String> {
    serde_yaml::to_string(value).with_context(|| format!("Failed to serialize {} to YAML", what))
}
