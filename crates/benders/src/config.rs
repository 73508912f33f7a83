use std::path::Path;
use std::str::FromStr;

use benders_solver::SolverParams;
use serde::{Deserialize, Serialize};

use crate::error::{BendersError, Result};

/// How master and subproblems are coordinated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Framework {
    /// Cuts are added as lazy constraints inside one branch-and-bound run
    #[default]
    Callback,
    /// Master and subproblems are solved alternately until the gap closes
    Iterative,
}

/// Whether subproblems are posed as the block LP or as its dual
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LpForm {
    #[default]
    Primal,
    Dual,
}

/// How cut coefficients are read off a subproblem solve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubproblemReturn {
    /// Complicating variables appear in the subproblem and their reduced
    /// costs form the cut
    #[default]
    Subgradient,
    /// Row multipliers are combined with the coupling matrix
    Duals,
}

macro_rules! impl_from_str {
    ($ty:ty, $label:literal, { $($text:literal => $variant:expr),+ $(,)? }) => {
        impl FromStr for $ty {
            type Err = BendersError;

            fn from_str(s: &str) -> Result<Self> {
                match s.to_ascii_lowercase().as_str() {
                    $($text => Ok($variant),)+
                    other => Err(BendersError::Config(format!(
                        "unknown {} '{}' (expected one of: {})",
                        $label,
                        other,
                        [$($text),+].join(", ")
                    ))),
                }
            }
        }
    };
}

impl_from_str!(Framework, "framework", {
    "callback" => Framework::Callback,
    "iterative" => Framework::Iterative,
});
impl_from_str!(LpForm, "lp form", {
    "primal" => LpForm::Primal,
    "dual" => LpForm::Dual,
});
impl_from_str!(SubproblemReturn, "subproblem return", {
    "subgradient" => SubproblemReturn::Subgradient,
    "duals" => SubproblemReturn::Duals,
});

/// Termination criteria of the iterative framework
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IterativeParams {
    pub max_iterations: usize,
    /// Relative gap between upper and lower bound
    pub optimality_gap: f64,
    /// Wall-clock seconds. `None` means no limit.
    pub timelimit: Option<f64>,
}

impl Default for IterativeParams {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            optimality_gap: 1e-8,
            timelimit: None,
        }
    }
}

/// Immutable settings for one decomposition run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub framework: Framework,
    pub lp_form: LpForm,
    pub sub_return: SubproblemReturn,
    /// Discard subproblem solver state before every solve
    pub reset_subproblem: bool,
    /// Lower bound on every theta variable
    pub theta_lb: f64,
    pub iterative: IterativeParams,
    pub master_params: SolverParams,
    pub subproblem_params: SolverParams,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            framework: Framework::default(),
            lp_form: LpForm::default(),
            sub_return: SubproblemReturn::default(),
            reset_subproblem: false,
            theta_lb: -10000.0,
            iterative: IterativeParams::default(),
            master_params: SolverParams::default(),
            subproblem_params: SolverParams::default(),
        }
    }
}

impl Config {
    pub fn from_json(source: &str) -> Result<Self> {
        let config: Config =
            serde_json::from_str(source).map_err(|e| BendersError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_json(&source)
    }

    pub fn validate(&self) -> Result<()> {
        if self.iterative.max_iterations == 0 {
            return Err(BendersError::Config(
                "iterative.max_iterations must be positive".to_string(),
            ));
        }
        if !(self.iterative.optimality_gap >= 0.0) {
            return Err(BendersError::Config(format!(
                "iterative.optimality_gap must be non-negative, got {}",
                self.iterative.optimality_gap
            )));
        }
        if let Some(limit) = self.iterative.timelimit {
            if !(limit > 0.0) {
                return Err(BendersError::Config(format!(
                    "iterative.timelimit must be positive, got {}",
                    limit
                )));
            }
        }
        if !self.theta_lb.is_finite() {
            return Err(BendersError::Config("theta_lb must be finite".to_string()));
        }
        for (label, params) in [
            ("master_params", &self.master_params),
            ("subproblem_params", &self.subproblem_params),
        ] {
            if let Some(reason) = params.invalid_reason() {
                return Err(BendersError::Config(format!("{}: {}", label, reason)));
            }
        }
        Ok(())
    }

    /// The default configuration as pretty-printed JSON
    pub fn example() -> String {
        serde_json::to_string_pretty(&Config::default()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.framework, Framework::Callback);
        assert_eq!(config.lp_form, LpForm::Primal);
        assert_eq!(config.sub_return, SubproblemReturn::Subgradient);
        assert!(!config.reset_subproblem);
        assert_eq!(config.theta_lb, -10000.0);
        assert_eq!(config.iterative.max_iterations, 1000);
        assert_eq!(config.iterative.optimality_gap, 1e-8);
        assert_eq!(config.iterative.timelimit, None);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = Config::from_json(
            r#"{
                "framework": "iterative",
                "lp_form": "dual",
                "iterative": { "timelimit": 100 },
                "master_params": { "mip_gap": 0.001 }
            }"#,
        )
        .unwrap();
        assert_eq!(config.framework, Framework::Iterative);
        assert_eq!(config.lp_form, LpForm::Dual);
        assert_eq!(config.sub_return, SubproblemReturn::Subgradient);
        assert_eq!(config.iterative.timelimit, Some(100.0));
        assert_eq!(config.iterative.max_iterations, 1000);
        assert_eq!(config.master_params.mip_gap, 0.001);
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let err = Config::from_json(r#"{ "env_params": {} }"#).unwrap_err();
        assert!(matches!(err, BendersError::Config(_)), "{}", err);
        assert!(err.to_string().contains("env_params"));
    }

    #[test]
    fn test_validation() {
        let err = Config::from_json(r#"{ "iterative": { "max_iterations": 0 } }"#).unwrap_err();
        assert!(matches!(err, BendersError::Config(_)));

        let mut config = Config::default();
        config.iterative.optimality_gap = -1.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.subproblem_params.iteration_limit = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_example_round_trips() {
        let example = Config::example();
        assert_eq!(Config::from_json(&example).unwrap(), Config::default());
    }

    #[test]
    fn test_from_str() {
        assert_eq!("Iterative".parse::<Framework>().unwrap(), Framework::Iterative);
        assert_eq!("duals".parse::<SubproblemReturn>().unwrap(), SubproblemReturn::Duals);
        assert!("simplex".parse::<LpForm>().is_err());
    }
}
