//! MILP roster formulation.
//!
//! Bridges roster domain models to a solver-neutral mixed-integer linear
//! program. `RosterModelBuilder` emits variables, constraints and the cost
//! objective into a `MilpModel`; a `MilpSolver` backend solves it.
//!
//! The model is plain data: every constraint is a named, family-tagged
//! linear row, so the formulation can be inspected and checked against a
//! candidate assignment without a solver.
//!
//! # Reference
//! - Ernst et al. (2004), "Staff scheduling and rostering: A review of
//!   applications, methods and models"
//! - Wolsey (1998), "Integer Programming", Ch. 1

mod builder;
mod solver;

pub use builder::{RosterModel, RosterModelBuilder, RosterVariables, TIE_BREAK_WEIGHT};
pub use solver::{MicroLpSolver, MilpSolver, SolveBudget, SolveStatus, SolverOutput};

use std::fmt;

/// Index of a variable in a `MilpModel`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(usize);

impl VarId {
    /// Position in the model's variable list.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Variable domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    Integer,
    Continuous,
}

/// A decision variable.
#[derive(Debug, Clone, PartialEq)]
pub struct VarSpec {
    /// Unique name, e.g. `assigned[3,Night,Nurses]`.
    pub name: String,
    pub kind: VarKind,
    /// Lower bound.
    pub lower: f64,
    /// Upper bound (`None` = unbounded above).
    pub upper: Option<f64>,
}

impl VarSpec {
    /// Non-negative integer variable.
    pub fn integer(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: VarKind::Integer,
            lower: 0.0,
            upper: None,
        }
    }

    /// Non-negative continuous variable.
    pub fn continuous(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: VarKind::Continuous,
            lower: 0.0,
            upper: None,
        }
    }
}

/// Affine expression `Σ coef × var + constant`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinearExpr {
    terms: Vec<(VarId, f64)>,
    constant: f64,
}

impl LinearExpr {
    /// Empty expression (zero).
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `coef × var`.
    pub fn add_term(&mut self, var: VarId, coef: f64) {
        if coef != 0.0 {
            self.terms.push((var, coef));
        }
    }

    /// Adds `coef × var` (builder form).
    pub fn with_term(mut self, var: VarId, coef: f64) -> Self {
        self.add_term(var, coef);
        self
    }

    /// Adds a constant.
    pub fn add_constant(&mut self, value: f64) {
        self.constant += value;
    }

    /// Terms in insertion order.
    pub fn terms(&self) -> &[(VarId, f64)] {
        &self.terms
    }

    pub fn constant(&self) -> f64 {
        self.constant
    }

    /// Value of the expression under an assignment indexed by `VarId`.
    pub fn eval(&self, values: &[f64]) -> f64 {
        self.terms
            .iter()
            .map(|(v, c)| c * values.get(v.index()).copied().unwrap_or(0.0))
            .sum::<f64>()
            + self.constant
    }
}

/// Relation between a constraint's expression and its right-hand side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// `expr <= rhs`
    Le,
    /// `expr >= rhs`
    Ge,
    /// `expr == rhs`
    Eq,
}

/// Roster rule a constraint row implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintFamily {
    Coverage,
    WeeklyCap,
    ContractHours,
    RestPeriod,
    ShiftDistribution,
    OvertimeEligibility,
    OvertimeLimit,
    DailyPool,
    Continuity,
    HiringLimit,
    HeadcountLimit,
}

impl ConstraintFamily {
    /// All families, in emission order.
    pub const ALL: [ConstraintFamily; 11] = [
        ConstraintFamily::Coverage,
        ConstraintFamily::WeeklyCap,
        ConstraintFamily::ContractHours,
        ConstraintFamily::RestPeriod,
        ConstraintFamily::ShiftDistribution,
        ConstraintFamily::OvertimeEligibility,
        ConstraintFamily::OvertimeLimit,
        ConstraintFamily::DailyPool,
        ConstraintFamily::Continuity,
        ConstraintFamily::HiringLimit,
        ConstraintFamily::HeadcountLimit,
    ];
}

impl fmt::Display for ConstraintFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A linear constraint row.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearConstraint {
    /// Unique name, e.g. `coverage[0,Morning,Caregivers]`.
    pub name: String,
    pub family: ConstraintFamily,
    pub expr: LinearExpr,
    pub cmp: Comparison,
    pub rhs: f64,
}

impl LinearConstraint {
    /// Amount by which an assignment violates this row (0.0 if satisfied).
    pub fn violation(&self, values: &[f64]) -> f64 {
        let lhs = self.expr.eval(values);
        match self.cmp {
            Comparison::Le => (lhs - self.rhs).max(0.0),
            Comparison::Ge => (self.rhs - lhs).max(0.0),
            Comparison::Eq => (lhs - self.rhs).abs(),
        }
    }

    /// Whether an assignment satisfies this row within `tolerance`.
    pub fn is_satisfied(&self, values: &[f64], tolerance: f64) -> bool {
        self.violation(values) <= tolerance
    }
}

/// A mixed-integer linear program (minimization).
#[derive(Debug, Clone, Default)]
pub struct MilpModel {
    name: String,
    vars: Vec<VarSpec>,
    constraints: Vec<LinearConstraint>,
    objective: LinearExpr,
    tie_break: Option<LinearExpr>,
    incumbent: Option<Vec<f64>>,
}

impl MilpModel {
    /// Creates an empty model.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Adds a variable.
    pub fn add_var(&mut self, spec: VarSpec) -> VarId {
        self.vars.push(spec);
        VarId(self.vars.len() - 1)
    }

    /// Adds a constraint row.
    pub fn add_constraint(
        &mut self,
        name: impl Into<String>,
        family: ConstraintFamily,
        expr: LinearExpr,
        cmp: Comparison,
        rhs: f64,
    ) {
        self.constraints.push(LinearConstraint {
            name: name.into(),
            family,
            expr,
            cmp,
            rhs,
        });
    }

    /// Sets the cost objective (minimized).
    pub fn set_objective(&mut self, objective: LinearExpr) {
        self.objective = objective;
    }

    /// Sets a secondary objective term, minimized together with the cost
    /// objective but kept out of the reported cost.
    pub fn set_tie_break(&mut self, tie_break: LinearExpr) {
        self.tie_break = Some(tie_break);
    }

    /// Registers a feasible assignment the solver may fall back to when
    /// its time budget runs out.
    pub fn set_incumbent(&mut self, values: Vec<f64>) {
        self.incumbent = Some(values);
    }

    pub fn vars(&self) -> &[VarSpec] {
        &self.vars
    }

    pub fn var(&self, id: VarId) -> &VarSpec {
        &self.vars[id.index()]
    }

    pub fn constraints(&self) -> &[LinearConstraint] {
        &self.constraints
    }

    pub fn objective(&self) -> &LinearExpr {
        &self.objective
    }

    pub fn tie_break(&self) -> Option<&LinearExpr> {
        self.tie_break.as_ref()
    }

    pub fn incumbent(&self) -> Option<&[f64]> {
        self.incumbent.as_deref()
    }

    pub fn var_count(&self) -> usize {
        self.vars.len()
    }

    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Number of rows of a family.
    pub fn count_by_family(&self, family: ConstraintFamily) -> usize {
        self.constraints.iter().filter(|c| c.family == family).count()
    }

    /// Cost objective value of an assignment.
    pub fn objective_value(&self, values: &[f64]) -> f64 {
        self.objective.eval(values)
    }

    /// Checks an assignment against bounds, integrality and every row.
    ///
    /// Returns a description of each failed check; empty means feasible.
    pub fn check_feasible(&self, values: &[f64], tolerance: f64) -> Vec<String> {
        let mut failures = Vec::new();
        if values.len() != self.vars.len() {
            failures.push(format!(
                "assignment has {} values for {} variables",
                values.len(),
                self.vars.len()
            ));
            return failures;
        }
        for (spec, &v) in self.vars.iter().zip(values) {
            if !v.is_finite() {
                failures.push(format!("{} is not finite", spec.name));
                continue;
            }
            if v < spec.lower - tolerance {
                failures.push(format!("{} = {v} below lower bound {}", spec.name, spec.lower));
            }
            if let Some(upper) = spec.upper {
                if v > upper + tolerance {
                    failures.push(format!("{} = {v} above upper bound {upper}", spec.name));
                }
            }
            if spec.kind == VarKind::Integer && (v - v.round()).abs() > tolerance {
                failures.push(format!("{} = {v} is not integral", spec.name));
            }
        }
        for c in &self.constraints {
            let violation = c.violation(values);
            if violation > tolerance {
                failures.push(format!("{} violated by {violation}", c.name));
            }
        }
        failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_model() -> (MilpModel, VarId, VarId) {
        let mut m = MilpModel::new("test");
        let x = m.add_var(VarSpec::integer("x"));
        let y = m.add_var(VarSpec::continuous("y"));
        m.add_constraint(
            "sum",
            ConstraintFamily::Coverage,
            LinearExpr::new().with_term(x, 1.0).with_term(y, 1.0),
            Comparison::Ge,
            3.0,
        );
        m.set_objective(LinearExpr::new().with_term(x, 2.0).with_term(y, 3.0));
        (m, x, y)
    }

    #[test]
    fn test_expr_eval() {
        let mut e = LinearExpr::new().with_term(VarId(0), 2.0).with_term(VarId(1), -1.0);
        e.add_constant(5.0);
        assert_eq!(e.eval(&[3.0, 4.0]), 7.0);
        // zero coefficients are dropped
        e.add_term(VarId(0), 0.0);
        assert_eq!(e.terms().len(), 2);
    }

    #[test]
    fn test_constraint_violation() {
        let (m, _, _) = small_model();
        let c = &m.constraints()[0];
        assert_eq!(c.violation(&[1.0, 1.0]), 1.0);
        assert!(c.is_satisfied(&[2.0, 1.0], 1e-9));
    }

    #[test]
    fn test_check_feasible() {
        let (m, _, _) = small_model();
        assert!(m.check_feasible(&[3.0, 0.0], 1e-6).is_empty());
        let failures = m.check_feasible(&[1.5, 0.0], 1e-6);
        assert!(failures.iter().any(|f| f.contains("not integral")));
        assert!(failures.iter().any(|f| f.contains("sum violated")));
        assert!(!m.check_feasible(&[1.0], 1e-6).is_empty());
        assert!(!m.check_feasible(&[-1.0, 4.0], 1e-6).is_empty());
    }

    #[test]
    fn test_counts_and_objective() {
        let (m, x, _) = small_model();
        assert_eq!(m.var_count(), 2);
        assert_eq!(m.constraint_count(), 1);
        assert_eq!(m.count_by_family(ConstraintFamily::Coverage), 1);
        assert_eq!(m.count_by_family(ConstraintFamily::RestPeriod), 0);
        assert_eq!(m.objective_value(&[1.0, 1.0]), 5.0);
        assert_eq!(m.var(x).kind, VarKind::Integer);
    }
}
