//! Import command - resolve every coordinate in a survey CSV export.

use std::path::Path;

use bathyquery::config::ConfigFile;
use bathyquery::import::{read_survey_file, SurveyLayout};
use console::style;

use super::common::{print_summary, resolve_settings, run_resolution, start_logging, RunArgs};
use super::output::write_results;
use crate::error::CliError;

/// Run the import command.
pub fn run(file: &Path, args: RunArgs) -> Result<(), CliError> {
    let config = ConfigFile::load()?;
    let _logging = start_logging(&config, args.verbose)?;
    let settings = resolve_settings(&args, &config)?;

    let survey = read_survey_file(file, &SurveyLayout::default())?;
    eprintln!(
        "Imported {} coordinates from {}",
        survey.coordinates.len(),
        file.display()
    );
    if !survey.skipped.is_empty() {
        eprintln!(
            "{} {} rows skipped",
            style("Warning:").yellow().bold(),
            survey.skipped.len()
        );
        for row in &survey.skipped {
            eprintln!("  line {}: {}", row.line, row.reason);
        }
    }
    if survey.coordinates.is_empty() {
        eprintln!("Nothing to resolve.");
        return Ok(());
    }

    let (results, snapshot) = run_resolution(survey.coordinates, &settings)?;

    let stdout = std::io::stdout();
    write_results(
        &mut stdout.lock(),
        &results,
        &settings.provider.depth_field,
        settings.format,
    )?;
    print_summary(&snapshot);
    Ok(())
}
