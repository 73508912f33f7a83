use std::time::Instant;

use crate::backend::{CallbackAction, Incumbent, IncumbentCallback};
use crate::model::{Model, VarType};
use crate::simplex::Simplex;
use crate::solution::MipSolution;
use crate::status::Status;

/// Depth-first branch-and-bound over [`Simplex`] relaxations
#[derive(Debug, Clone)]
pub struct BranchAndBound {
    simplex: Simplex,
    int_tol: f64,
    feasibility_tol: f64,
    mip_gap: f64,
    node_limit: Option<u64>,
    time_limit: Option<f64>,
    /// Lazy re-solves allowed at one node
    lazy_round_limit: usize,
}

impl Default for BranchAndBound {
    fn default() -> Self {
        Self {
            simplex: Simplex::default(),
            int_tol: 1e-6,
            feasibility_tol: 1e-7,
            mip_gap: 1e-6,
            node_limit: None,
            time_limit: None,
            lazy_round_limit: 10_000,
        }
    }
}

struct Node {
    bounds: Vec<(f64, f64)>,
    /// Parent relaxation objective, minimization sense
    estimate: f64,
}

impl BranchAndBound {
    pub fn new(simplex: Simplex) -> Self {
        Self {
            simplex,
            ..Self::default()
        }
    }

    pub fn with_int_tol(mut self, tol: f64) -> Self {
        self.int_tol = tol;
        self
    }

    pub fn with_feasibility_tol(mut self, tol: f64) -> Self {
        self.feasibility_tol = tol;
        self
    }

    pub fn with_mip_gap(mut self, gap: f64) -> Self {
        self.mip_gap = gap;
        self
    }

    pub fn with_node_limit(mut self, limit: Option<u64>) -> Self {
        self.node_limit = limit;
        self
    }

    pub fn with_time_limit(mut self, seconds: Option<f64>) -> Self {
        self.time_limit = seconds;
        self
    }

    pub fn with_lazy_round_limit(mut self, rounds: usize) -> Self {
        self.lazy_round_limit = rounds;
        self
    }

    /// Search for an optimal integer point of `model`.
    ///
    /// Every integer-feasible relaxation optimum is offered to `callback`
    /// first. Constraints it returns are appended to `model`; when the
    /// candidate violates one of them the node is solved again. A node whose
    /// re-solve returns the rejected point again, or that runs out of lazy
    /// rounds, ends the search with `Status::LazyStall`.
    pub fn solve(
        &self,
        model: &mut Model,
        mut callback: Option<&mut dyn IncumbentCallback>,
    ) -> MipSolution {
        let start = Instant::now();
        let sign = model.sense.sign();

        let mut stack = vec![Node {
            bounds: root_bounds(model, self.int_tol),
            estimate: f64::NEG_INFINITY,
        }];
        // (values, objective in minimization sense)
        let mut incumbent: Option<(Vec<f64>, f64)> = None;
        let mut node_count = 0;
        let mut stopped = None;

        'search: while let Some(node) = stack.pop() {
            if self.time_limit.is_some_and(|limit| start.elapsed().as_secs_f64() >= limit) {
                stack.push(node);
                stopped = Some(Status::TimeLimit);
                break;
            }
            if self.node_limit.is_some_and(|limit| node_count >= limit) {
                stack.push(node);
                stopped = Some(Status::NodeLimit);
                break;
            }
            let incumbent_key = incumbent.as_ref().map(|(_, key)| *key);
            if self.prunable(node.estimate, incumbent_key) {
                continue;
            }
            node_count += 1;
            let mut lazy_rounds = 0;
            let mut rejected: Option<Vec<f64>> = None;

            loop {
                let relaxation = self.simplex.solve_with_bounds(model, &node.bounds);
                match relaxation.status {
                    Status::Optimal => {}
                    Status::Infeasible => continue 'search,
                    status => {
                        return finish(status, incumbent, None, node_count, sign);
                    }
                }

                let key = sign * relaxation.objective_value;
                let incumbent_key = incumbent.as_ref().map(|(_, key)| *key);
                if self.prunable(key, incumbent_key) {
                    continue 'search;
                }

                if let Some(j) = self.branching_variable(model, &relaxation.values) {
                    let value = relaxation.values[j];
                    let (lb, ub) = node.bounds[j];
                    let mut down = node.bounds.clone();
                    down[j] = (lb, value.floor());
                    let mut up = node.bounds;
                    up[j] = (value.ceil(), ub);

                    // Explore the nearer child first
                    let (first, second) = if value - value.floor() >= 0.5 {
                        (up, down)
                    } else {
                        (down, up)
                    };
                    stack.push(Node {
                        bounds: second,
                        estimate: key,
                    });
                    stack.push(Node {
                        bounds: first,
                        estimate: key,
                    });
                    continue 'search;
                }

                let mut values = relaxation.values;
                for (x, var) in values.iter_mut().zip(&model.variables) {
                    if !var.vtype.is_continuous() {
                        *x = x.round();
                    }
                }
                let objective = model.objective_value(&values);

                if let Some(callback) = callback.as_deref_mut() {
                    let candidate = Incumbent {
                        objective,
                        values: &values,
                        node_count,
                    };
                    match callback.on_incumbent(&candidate) {
                        CallbackAction::Abort => {
                            return finish(Status::Interrupted, incumbent, None, node_count, sign);
                        }
                        CallbackAction::Continue(lazy) => {
                            let first = model.num_constraints();
                            for constraint in lazy {
                                model.add_constr(constraint);
                            }
                            // Same scale the simplex accepts phase one at
                            let tol = self.feasibility_tol * (1.0 + rhs_scale(model));
                            let violated = model.constraints[first..]
                                .iter()
                                .any(|c| c.violation(&values) > tol);
                            if violated {
                                let repeated = rejected
                                    .as_ref()
                                    .is_some_and(|prev| same_point(prev, &values, self.int_tol));
                                if repeated || lazy_rounds >= self.lazy_round_limit {
                                    return finish(
                                        Status::LazyStall,
                                        incumbent,
                                        None,
                                        node_count,
                                        sign,
                                    );
                                }
                                lazy_rounds += 1;
                                rejected = Some(values);
                                continue;
                            }
                        }
                    }
                }

                let key = sign * objective;
                if incumbent.as_ref().is_none_or(|(_, best)| key < *best) {
                    incumbent = Some((values, key));
                }
                continue 'search;
            }
        }

        match stopped {
            Some(status) => {
                let open = stack.iter().map(|node| node.estimate).fold(f64::INFINITY, f64::min);
                finish(status, incumbent, Some(open), node_count, sign)
            }
            None if incumbent.is_some() => {
                finish(Status::Optimal, incumbent, None, node_count, sign)
            }
            None => finish(Status::Infeasible, None, None, node_count, sign),
        }
    }

    fn prunable(&self, key: f64, incumbent: Option<f64>) -> bool {
        match incumbent {
            Some(best) => key >= best - (self.mip_gap * best.abs()).max(1e-9),
            None => false,
        }
    }

    /// Most fractional integer variable, if any
    fn branching_variable(&self, model: &Model, values: &[f64]) -> Option<usize> {
        model
            .variables
            .iter()
            .zip(values)
            .enumerate()
            .filter(|(_, (var, _))| !var.vtype.is_continuous())
            .map(|(j, (_, &x))| {
                let frac = x - x.floor();
                (j, frac.min(1.0 - frac))
            })
            .filter(|&(_, score)| score > self.int_tol)
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(j, _)| j)
    }
}

/// Variable bounds with integer bounds rounded inward
fn root_bounds(model: &Model, int_tol: f64) -> Vec<(f64, f64)> {
    model
        .variables
        .iter()
        .map(|var| match var.vtype {
            VarType::Continuous => (var.lb, var.ub),
            VarType::Integer => ((var.lb - int_tol).ceil(), (var.ub + int_tol).floor()),
            VarType::Binary => (
                (var.lb - int_tol).ceil().max(0.0),
                (var.ub + int_tol).floor().min(1.0),
            ),
        })
        .collect()
}

/// Largest right-hand side magnitude over the rows of `model`
fn rhs_scale(model: &Model) -> f64 {
    model.constraints.iter().fold(0.0, |acc: f64, c| acc.max(c.rhs.abs()))
}

fn same_point(a: &[f64], b: &[f64], tol: f64) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| (x - y).abs() <= tol)
}

/// Assemble the outcome. `open` is the best estimate among unexplored nodes
/// when a limit stopped the search.
fn finish(
    status: Status,
    incumbent: Option<(Vec<f64>, f64)>,
    open: Option<f64>,
    node_count: u64,
    sign: f64,
) -> MipSolution {
    let best = incumbent.as_ref().map(|(_, key)| *key);
    let bound = match (best, open) {
        (Some(best), Some(open)) => Some(best.min(open)),
        (None, Some(open)) if open.is_finite() => Some(open),
        (best, _) => best,
    };
    let (values, objective_value) = match incumbent {
        Some((values, key)) => (Some(values), Some(sign * key)),
        None => (None, None),
    };
    MipSolution {
        status,
        values,
        objective_value,
        bound: bound.map(|key| sign * key),
        node_count,
    }
}
