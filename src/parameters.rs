//! Construction parameters for a [`Simulation`](crate::simulation::Simulation).
//!
//! Parameters can be assembled in code with [`ParametersBuilder`] or loaded from a JSON file.
//! Fields missing from a JSON file take their default values, so a config file only needs to
//! name the values it changes:
//!
//! ```json
//! { "population_size": 400, "moving_probability": 0.5, "seed": 42 }
//! ```
use std::fs;
use std::path::Path;

use derive_builder::Builder;
use log::trace;
use serde::{Deserialize, Serialize};

use crate::error::GridSpreadError;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Builder)]
#[serde(default)]
pub struct Parameters {
    #[builder(default = "100")]
    pub population_size: usize,

    #[builder(default = "5")]
    pub initial_infected: usize,

    /// People with a comorbidity. They are drawn from the people who are not initially infected.
    #[builder(default = "10")]
    pub comorbid_count: usize,

    #[builder(default = "0.8")]
    pub moving_probability: f64,

    #[builder(default = "20")]
    pub width: usize,

    #[builder(default = "20")]
    pub height: usize,

    /// When absent, a seed is drawn from the operating system and logged.
    #[builder(default, setter(strip_option))]
    pub seed: Option<u64>,
}

impl Default for Parameters {
    fn default() -> Self {
        ParametersBuilder::default()
            .build()
            .expect("every parameter has a default")
    }
}

impl Parameters {
    /// Reads parameters from a JSON file.
    ///
    /// # Errors
    /// Returns a `GridSpreadError` if the file cannot be read or is not valid JSON. The values
    /// are not validated here; see [`Parameters::validate`].
    pub fn from_json_file(path: &Path) -> Result<Parameters, GridSpreadError> {
        trace!("loading parameters from {}", path.display());
        let data = fs::read_to_string(path)?;
        let parameters = serde_json::from_str(&data)?;
        Ok(parameters)
    }

    /// Checks the parameters and reports the first problem found.
    ///
    /// # Errors
    /// Returns `GridSpreadError::ParameterError` describing the invalid value.
    pub fn validate(&self) -> Result<(), GridSpreadError> {
        if self.population_size == 0 {
            return Err(GridSpreadError::ParameterError(
                "population_size must be positive".to_string(),
            ));
        }
        if self.initial_infected > self.population_size {
            return Err(GridSpreadError::ParameterError(format!(
                "initial_infected ({}) exceeds population_size ({})",
                self.initial_infected, self.population_size
            )));
        }
        match self.initial_infected.checked_add(self.comorbid_count) {
            Some(total) if total <= self.population_size => {}
            _ => {
                return Err(GridSpreadError::ParameterError(format!(
                    "initial_infected ({}) plus comorbid_count ({}) exceeds population_size ({})",
                    self.initial_infected, self.comorbid_count, self.population_size
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.moving_probability) {
            return Err(GridSpreadError::ParameterError(format!(
                "moving_probability must be within [0, 1], got {}",
                self.moving_probability
            )));
        }
        if self.width == 0 || self.height == 0 {
            return Err(GridSpreadError::ParameterError(format!(
                "grid dimensions must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if self.width.checked_mul(self.height).is_none() {
            return Err(GridSpreadError::ParameterError(format!(
                "grid of {}x{} cells is too large",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    fn assert_parameter_error(parameters: &Parameters, expected: &str) {
        match parameters.validate() {
            Err(GridSpreadError::ParameterError(msg)) => {
                assert!(msg.contains(expected), "unexpected message: {msg}");
            }
            other => panic!("expected a parameter error, got {other:?}"),
        }
    }

    #[test]
    fn defaults_are_valid() {
        let parameters = Parameters::default();
        assert_eq!(parameters.population_size, 100);
        assert_eq!(parameters.initial_infected, 5);
        assert_eq!(parameters.comorbid_count, 10);
        assert_eq!(parameters.width, 20);
        assert_eq!(parameters.height, 20);
        assert_eq!(parameters.seed, None);
        assert!(parameters.validate().is_ok());
    }

    #[test]
    fn builder_overrides_defaults() {
        let parameters = ParametersBuilder::default()
            .population_size(4)
            .initial_infected(1)
            .comorbid_count(0)
            .seed(42)
            .build()
            .unwrap();
        assert_eq!(parameters.population_size, 4);
        assert_eq!(parameters.seed, Some(42));
        assert_eq!(parameters.moving_probability, 0.8);
    }

    #[test]
    fn rejects_empty_population() {
        let parameters = ParametersBuilder::default()
            .population_size(0)
            .initial_infected(0)
            .comorbid_count(0)
            .build()
            .unwrap();
        assert_parameter_error(&parameters, "population_size must be positive");
    }

    #[test]
    fn rejects_too_many_infected() {
        let parameters = ParametersBuilder::default()
            .population_size(3)
            .initial_infected(4)
            .comorbid_count(0)
            .build()
            .unwrap();
        assert_parameter_error(&parameters, "initial_infected (4) exceeds");
    }

    #[test]
    fn rejects_infected_plus_comorbid_over_population() {
        let parameters = ParametersBuilder::default()
            .population_size(10)
            .initial_infected(5)
            .comorbid_count(6)
            .build()
            .unwrap();
        assert_parameter_error(&parameters, "plus comorbid_count (6)");

        let parameters = ParametersBuilder::default()
            .population_size(10)
            .initial_infected(5)
            .comorbid_count(usize::MAX)
            .build()
            .unwrap();
        assert_parameter_error(&parameters, "plus comorbid_count");
    }

    #[test]
    fn rejects_bad_moving_probability() {
        for value in [-0.1, 1.5, f64::NAN] {
            let parameters = ParametersBuilder::default()
                .moving_probability(value)
                .build()
                .unwrap();
            assert_parameter_error(&parameters, "moving_probability");
        }
    }

    #[test]
    fn rejects_empty_grid() {
        let parameters = ParametersBuilder::default().width(0).build().unwrap();
        assert_parameter_error(&parameters, "grid dimensions must be positive");
    }

    #[test]
    fn loads_partial_json_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{ "population_size": 40, "seed": 7 }}"#).unwrap();
        let parameters = Parameters::from_json_file(file.path()).unwrap();
        assert_eq!(parameters.population_size, 40);
        assert_eq!(parameters.seed, Some(7));
        assert_eq!(parameters.width, 20);
    }

    #[test]
    fn negative_counts_fail_to_parse() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{ "initial_infected": -1 }}"#).unwrap();
        let result = Parameters::from_json_file(file.path());
        assert!(matches!(result, Err(GridSpreadError::JsonError(_))));
    }
}
