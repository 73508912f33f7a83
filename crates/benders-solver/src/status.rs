/// Outcome of the most recent optimize call on a solver model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Status {
    /// Loaded or modified, not solved yet
    #[default]
    Loaded,
    Optimal,
    Infeasible,
    /// The solver proved one of the two but not which
    InfeasibleOrUnbounded,
    Unbounded,
    IterationLimit,
    NodeLimit,
    TimeLimit,
    /// Stopped by an incumbent callback
    Interrupted,
    /// Lazy constraints stopped cutting off the relaxation at a node
    LazyStall,
}

impl Status {
    pub fn is_optimal(self) -> bool {
        matches!(self, Status::Optimal)
    }

    pub fn is_infeasible(self) -> bool {
        matches!(self, Status::Infeasible | Status::InfeasibleOrUnbounded)
    }

    pub fn is_unbounded(self) -> bool {
        matches!(self, Status::Unbounded | Status::InfeasibleOrUnbounded)
    }

    /// A limit stopped the search before optimality was proven
    pub fn is_limit(self) -> bool {
        matches!(
            self,
            Status::IterationLimit | Status::NodeLimit | Status::TimeLimit
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Loaded => "loaded",
            Status::Optimal => "optimal",
            Status::Infeasible => "infeasible",
            Status::InfeasibleOrUnbounded => "infeasible_or_unbounded",
            Status::Unbounded => "unbounded",
            Status::IterationLimit => "iteration_limit",
            Status::NodeLimit => "node_limit",
            Status::TimeLimit => "time_limit",
            Status::Interrupted => "interrupted",
            Status::LazyStall => "lazy_stall",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
