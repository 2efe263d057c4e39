//! Resolve command - look up depths for coordinates given on the command line.

use bathyquery::config::ConfigFile;
use bathyquery::coord::Coordinate;

use super::common::{print_summary, resolve_settings, run_resolution, start_logging, RunArgs};
use super::output::write_results;
use crate::error::CliError;

/// Run the resolve command.
///
/// `points` holds flattened `LAT LON` pairs as typed.
pub fn run(points: Vec<String>, args: RunArgs) -> Result<(), CliError> {
    let config = ConfigFile::load()?;
    let _logging = start_logging(&config, args.verbose)?;
    let settings = resolve_settings(&args, &config)?;

    let coords = pair_points(&points)?;
    let (results, snapshot) = run_resolution(coords, &settings)?;

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

/// Group flattened `--point` values into coordinates.
fn pair_points(points: &[String]) -> Result<Vec<Coordinate>, CliError> {
    if points.is_empty() || points.len() % 2 != 0 {
        return Err(CliError::Config(
            "each --point needs a latitude and a longitude".to_string(),
        ));
    }
    Ok(points
        .chunks(2)
        .map(|pair| Coordinate::new(pair[0].trim(), pair[1].trim()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_points_keeps_text() {
        let points: Vec<String> = ["-2,21", "-47.43", "abc", "1"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let coords = pair_points(&points).unwrap();
        assert_eq!(
            coords,
            vec![Coordinate::new("-2,21", "-47.43"), Coordinate::new("abc", "1")]
        );
    }

    #[test]
    fn test_pair_points_rejects_odd_count() {
        let points = vec!["-2.21".to_string()];
        assert!(pair_points(&points).is_err());
        assert!(pair_points(&[]).is_err());
    }
}
