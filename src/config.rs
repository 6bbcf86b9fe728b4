/*
MIT License

Copyright (c) 2026 Raja Lehtihet and Wael El Oraiby

Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the "Software"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE.
*/

//! TOML problem definitions.
//!
//! ```toml
//! [bindings]
//! xmax = 1.2
//!
//! [[objectives]]
//! name = "ref_loss"
//! expr = "(Y_pred - Yf) ** 2"
//!
//! [[constraints]]
//! name = "y_up"
//! expr = "(Y_pred <= xmax)^2"
//! weight = 0.1
//!
//! [dataset]
//! nsteps = 32
//! norm = "zero-one"
//! split_ratio = [60.0, 20.0]
//! ```
//!
//! Expressions and constraints are compiled with the text syntax; compile
//! diagnostics carry the term name as their source label.

use crate::compiler::{Bindings, compile_constraint_in_source, compile_expression_in_source};
use crate::data::DataDict;
use crate::dataset::{DatasetError, NormKind, SequenceSplits};
use crate::diagnostics::CompileError;
use crate::problem::{Objective, Problem, ProblemError};
use crate::tensor;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Errors raised while loading or building a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid TOML syntax: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("{0}")]
    Compile(#[from] CompileError),
    #[error("{0}")]
    Problem(#[from] ProblemError),
    #[error("Invalid configuration value: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

fn default_weight() -> f64 {
    1.0
}

/// One named objective or constraint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TermConfig {
    pub name: String,
    /// Expression (objectives) or constraint (constraints) text.
    pub expr: String,
    #[serde(default = "default_weight")]
    pub weight: f64,
}

/// Windowing and normalization for sequence data.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatasetConfig {
    pub nsteps: usize,
    #[serde(default)]
    pub norm: NormKind,
    /// Train and dev percentages; thirds when absent.
    #[serde(default)]
    pub split_ratio: Option<[f64; 2]>,
    #[serde(default)]
    pub moving_horizon: bool,
}

impl DatasetConfig {
    /// Normalizes, splits and windows `data` with these settings.
    pub fn splits(&self, data: &DataDict) -> Result<SequenceSplits, DatasetError> {
        SequenceSplits::new(
            data,
            self.nsteps,
            self.norm,
            self.split_ratio,
            self.moving_horizon,
        )
    }
}

/// Declarative problem: bindings, weighted terms and optional dataset
/// settings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProblemConfig {
    /// Named scalar constants available to every expression.
    #[serde(default)]
    pub bindings: BTreeMap<String, f64>,
    #[serde(default)]
    pub objectives: Vec<TermConfig>,
    #[serde(default)]
    pub constraints: Vec<TermConfig>,
    #[serde(default)]
    pub dataset: Option<DatasetConfig>,
}

impl ProblemConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let config: ProblemConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> ConfigResult<()> {
        if let Some(dataset) = &self.dataset {
            if dataset.nsteps == 0 {
                return Err(ConfigError::Invalid(
                    "dataset.nsteps must be at least 1".to_string(),
                ));
            }
        }
        let terms = self.objectives.iter().chain(&self.constraints);
        for term in terms {
            if term.name.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "term with expression '{}' has an empty name",
                    term.expr
                )));
            }
            if !term.weight.is_finite() {
                return Err(ConfigError::Invalid(format!(
                    "weight of '{}' must be finite",
                    term.name
                )));
            }
        }
        Ok(())
    }

    /// Bindings as rank-0 tensors.
    pub fn bindings(&self) -> Bindings {
        self.bindings
            .iter()
            .map(|(name, value)| (name.clone(), tensor::scalar(*value)))
            .collect()
    }

    /// Compiles every term and assembles the [`Problem`].
    pub fn build_problem(&self) -> ConfigResult<Problem> {
        let bindings = self.bindings();

        let mut objectives = Vec::with_capacity(self.objectives.len());
        for term in &self.objectives {
            let expr = compile_expression_in_source(&term.expr, &term.name, &bindings)?;
            objectives.push(Objective::new(term.name.clone(), expr).weighted(term.weight));
        }

        let mut constraints = Vec::with_capacity(self.constraints.len());
        for term in &self.constraints {
            let constraint = compile_constraint_in_source(&term.expr, &term.name, &bindings)?;
            constraints.push(constraint.named(term.name.clone()).weighted(term.weight));
        }

        Ok(Problem::new(objectives, constraints)?)
    }
}

/// Reads and validates a problem configuration file.
pub fn load_config(path: &Path) -> ConfigResult<ProblemConfig> {
    let content = fs::read_to_string(path)?;
    let config = ProblemConfig::from_toml_str(&content)?;
    info!(
        path = %path.display(),
        objectives = config.objectives.len(),
        constraints = config.constraints.len(),
        "loaded problem configuration"
    );
    Ok(config)
}
