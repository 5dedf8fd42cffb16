pub mod cli;
pub mod criteria;
pub mod display;
pub mod entity;
pub mod records;
pub mod store;

use anyhow::{Context, Result};
use colored::Colorize;
use serde_json::json;
use std::path::Path;

pub use cli::{Cli, ColorMode, Commands, FilterCommands, OutputFormat, cli_parse};
pub use criteria::{
    ALL_OPERATORS, CriteriaExpression, CriteriaParseError, Criterion, Operator, apply_criteria,
    compare_by_field, lookup_path, matches_criterion, print_criteria_warnings,
};
pub use entity::{EntityType, FieldDef, FieldKind};
pub use records::{RecordsError, load_records, normalize_record};
pub use store::{FilterPatch, FilterStore, JsonFileStore, NewFilter, SavedFilter, StoreError};

use crate::display::{
    describe_criteria, generate_apply_json, render_field_coverage, render_filters_table,
    render_operator_table, render_records_table,
};

fn write_output_file(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write output file '{}'", path.display()))
}

pub fn run() -> Result<()> {
    let cli = cli_parse();
    let format = cli.format;
    let output = &cli.output;
    let color_mode = cli.color;
    let verbose = cli.verbose;
    let quiet = cli.quiet;

    // Set up color handling based on user preference
    match color_mode {
        ColorMode::Always => {
            // Force colors on
            unsafe {
                std::env::set_var("CLICOLOR_FORCE", "1");
            }
        }
        ColorMode::Never => {
            // Disable colors
            unsafe {
                std::env::set_var("NO_COLOR", "1");
            }
        }
        ColorMode::Auto => {
            // Default behavior - let the terminal decide
        }
    }

    // If in verbose mode, display some diagnostic information
    if verbose > 0 && !quiet {
        eprintln!("Verbosity level: {}", verbose);
        eprintln!("Color mode: {:?}", color_mode);
        eprintln!("Filter store: {}", cli.store.display());
        if let Some(out_path) = output {
            eprintln!("Output will be written to: {}", out_path.display());
        }
    }

    match &cli.command {
        Commands::Apply {
            records,
            entity,
            criteria,
            saved,
            sort_by,
            limit,
        } => {
            let store = JsonFileStore::new(&cli.store);
            let mut entity = *entity;
            let mut all_criteria: Vec<Criterion> = Vec::new();

            // Saved criteria first, then inline terms; everything is AND-ed
            if let Some(saved_ref) = saved {
                let filter = store
                    .resolve(saved_ref)
                    .with_context(|| format!("Failed to load saved filter '{}'", saved_ref))?;
                if entity.is_none() {
                    entity = Some(filter.entity_type);
                }
                if verbose > 0 && !quiet {
                    eprintln!(
                        "Saved filter '{}': {}",
                        filter.name,
                        describe_criteria(&filter.criteria)
                    );
                }
                all_criteria.extend(filter.criteria);
            }
            if let Some(expr) = criteria {
                let parsed = CriteriaExpression::parse(expr)
                    .context("Invalid criteria expression")?;
                all_criteria.extend(parsed.criteria);
            }

            let all_records = load_records(records, entity)
                .with_context(|| format!("Failed to load records from '{}'", records.display()))?;

            if !quiet {
                print_criteria_warnings(&all_criteria, entity);
            }

            let mut matched = apply_criteria(&all_records, &all_criteria);
            if let Some(field) = sort_by {
                matched.sort_by(|a, b| compare_by_field(a, b, field));
            }

            let matched_count = matched.len();
            if let Some(limit) = limit {
                matched.truncate(*limit);
            }

            match format {
                OutputFormat::Text => {
                    let table = render_records_table(&matched, entity);
                    print!("{table}");
                    if !quiet {
                        let summary = format!(
                            "Matched {} of {} records with: {}",
                            matched_count,
                            all_records.len(),
                            describe_criteria(&all_criteria)
                        );
                        if matched.len() < matched_count {
                            println!("{} (showing first {})", summary.cyan(), matched.len());
                        } else {
                            println!("{}", summary.cyan());
                        }
                    }
                    if let Some(path) = output {
                        write_output_file(path, &table)?;
                    }
                }
                OutputFormat::Json => {
                    let json_output = generate_apply_json(&matched, all_records.len(), &all_criteria);
                    println!("{}", json_output);
                    if let Some(path) = output {
                        write_output_file(path, &json_output)?;
                    }
                }
            }
        }
        Commands::Info { records, entity } => {
            let all_records = load_records(records, *entity)
                .with_context(|| format!("Failed to load records from '{}'", records.display()))?;

            let coverage = render_field_coverage(&all_records, *entity);
            print!("{coverage}");
            println!(
                "{} records in '{}'{}",
                all_records.len(),
                records.display(),
                entity
                    .map(|e| format!(" ({})", e.canonical_name()))
                    .unwrap_or_default()
            );
            if let Some(path) = output {
                write_output_file(path, &coverage)?;
            }
        }
        Commands::Operators => match format {
            OutputFormat::Text => {
                let table = render_operator_table();
                print!("{table}");
                if let Some(path) = output {
                    write_output_file(path, &table)?;
                }
            }
            OutputFormat::Json => {
                let operators: Vec<_> = ALL_OPERATORS
                    .iter()
                    .map(|op| {
                        json!({
                            "name": op.canonical_name(),
                            "takes_second_value": op.takes_second_value(),
                            "description": op.description(),
                        })
                    })
                    .collect();
                let json_output = serde_json::to_string_pretty(&operators)
                    .context("Failed to serialize operator vocabulary")?;
                println!("{}", json_output);
                if let Some(path) = output {
                    write_output_file(path, &json_output)?;
                }
            }
        },
        Commands::Filters { command } => {
            let mut store = JsonFileStore::new(&cli.store);
            run_filter_command(&mut store, command, format, output.as_deref(), quiet)?;
        }
    }

    Ok(())
}

fn run_filter_command(
    store: &mut JsonFileStore,
    command: &FilterCommands,
    format: OutputFormat,
    output: Option<&Path>,
    quiet: bool,
) -> Result<()> {
    match command {
        FilterCommands::List { entity } => {
            let filters = store.list(*entity).context("Failed to list saved filters")?;
            match format {
                OutputFormat::Text => {
                    if filters.is_empty() {
                        println!("No saved filters in '{}'", store.path().display());
                        return Ok(());
                    }
                    let table = render_filters_table(&filters);
                    print!("{table}");
                    if let Some(path) = output {
                        write_output_file(path, &table)?;
                    }
                }
                OutputFormat::Json => {
                    let json_output = serde_json::to_string_pretty(&filters)
                        .context("Failed to serialize saved filters")?;
                    println!("{}", json_output);
                    if let Some(path) = output {
                        write_output_file(path, &json_output)?;
                    }
                }
            }
        }
        FilterCommands::Show { id_or_name } => {
            let filter = store
                .resolve(id_or_name)
                .with_context(|| format!("Failed to load saved filter '{}'", id_or_name))?;
            match format {
                OutputFormat::Text => {
                    println!("#{} {}", filter.id, filter.name.bold());
                    println!("  Entity:   {}", filter.entity_type);
                    if let Some(description) = &filter.description {
                        println!("  About:    {}", description);
                    }
                    if !filter.tags.is_empty() {
                        println!("  Tags:     {}", filter.tags.join(", "));
                    }
                    println!("  Criteria: {}", describe_criteria(&filter.criteria));
                    println!("  Created:  {}", filter.created_at.to_rfc3339());
                    println!("  Updated:  {}", filter.updated_at.to_rfc3339());
                }
                OutputFormat::Json => {
                    let json_output = serde_json::to_string_pretty(&filter)
                        .context("Failed to serialize saved filter")?;
                    println!("{}", json_output);
                    if let Some(path) = output {
                        write_output_file(path, &json_output)?;
                    }
                }
            }
        }
        FilterCommands::Save {
            name,
            entity,
            criteria,
            description,
            tags,
        } => {
            let parsed =
                CriteriaExpression::parse(criteria).context("Invalid criteria expression")?;
            if !quiet {
                print_criteria_warnings(&parsed.criteria, Some(*entity));
            }

            let filter = store
                .create(NewFilter {
                    name: name.clone(),
                    description: description.clone(),
                    entity_type: *entity,
                    criteria: parsed.criteria,
                    tags: tags.clone(),
                })
                .context("Failed to save filter")?;

            match format {
                OutputFormat::Text => println!(
                    "Saved filter '{}' (id {}) for {}: {}",
                    filter.name,
                    filter.id,
                    filter.entity_type,
                    describe_criteria(&filter.criteria)
                ),
                OutputFormat::Json => {
                    let json_output = serde_json::to_string_pretty(&filter)
                        .context("Failed to serialize saved filter")?;
                    println!("{}", json_output);
                }
            }
        }
        FilterCommands::Delete { id_or_name } => {
            let filter = store
                .resolve(id_or_name)
                .with_context(|| format!("Failed to load saved filter '{}'", id_or_name))?;
            let deleted = store
                .delete(filter.id)
                .context("Failed to delete saved filter")?;
            if deleted {
                println!("Deleted filter '{}' (id {})", filter.name, filter.id);
            } else {
                println!("Filter '{}' was already gone", id_or_name);
            }
        }
    }

    Ok(())
}
