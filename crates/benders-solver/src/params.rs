/// Parameters passed to a backend when a model is loaded
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct SolverParams {
    /// Wall-clock limit in seconds. `None` means no limit.
    pub time_limit: Option<f64>,
    /// Branch-and-bound node limit. `None` means no limit.
    pub node_limit: Option<u64>,
    /// Simplex pivots per LP solve
    pub iteration_limit: usize,
    /// Relative MIP gap at which the search stops
    pub mip_gap: f64,
    /// Primal feasibility tolerance
    pub feasibility_tol: f64,
    /// Integrality tolerance
    pub int_feas_tol: f64,
}

impl Default for SolverParams {
    fn default() -> Self {
        Self {
            time_limit: None,
            node_limit: None,
            iteration_limit: 100_000,
            mip_gap: 1e-6,
            feasibility_tol: 1e-7,
            int_feas_tol: 1e-6,
        }
    }
}

impl SolverParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_time_limit(mut self, seconds: f64) -> Self {
        self.time_limit = Some(seconds);
        self
    }

    pub fn with_node_limit(mut self, nodes: u64) -> Self {
        self.node_limit = Some(nodes);
        self
    }

    pub fn with_iteration_limit(mut self, iterations: usize) -> Self {
        self.iteration_limit = iterations;
        self
    }

    pub fn with_mip_gap(mut self, gap: f64) -> Self {
        self.mip_gap = gap;
        self
    }

    pub fn with_feasibility_tol(mut self, tol: f64) -> Self {
        self.feasibility_tol = tol;
        self
    }

    /// Human-readable reason the parameters are unusable, if any
    pub fn invalid_reason(&self) -> Option<String> {
        if let Some(limit) = self.time_limit {
            if !(limit > 0.0) {
                return Some(format!("time_limit must be positive, got {}", limit));
            }
        }
        if self.node_limit == Some(0) {
            return Some("node_limit must be positive".to_string());
        }
        if self.iteration_limit == 0 {
            return Some("iteration_limit must be positive".to_string());
        }
        if !(self.mip_gap >= 0.0) {
            return Some(format!("mip_gap must be non-negative, got {}", self.mip_gap));
        }
        if !(self.feasibility_tol > 0.0) || !(self.int_feas_tol > 0.0) {
            return Some("tolerances must be positive".to_string());
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_pattern() {
        let params = SolverParams::new()
            .with_time_limit(60.0)
            .with_node_limit(500)
            .with_mip_gap(0.01);
        assert_eq!(params.time_limit, Some(60.0));
        assert_eq!(params.node_limit, Some(500));
        assert_eq!(params.mip_gap, 0.01);
        assert!(params.invalid_reason().is_none());
    }

    #[test]
    fn test_invalid_reason() {
        assert!(SolverParams::new().with_time_limit(0.0).invalid_reason().is_some());
        assert!(SolverParams::new().with_mip_gap(-1.0).invalid_reason().is_some());
        assert!(SolverParams::new().with_iteration_limit(0).invalid_reason().is_some());
    }
}
