// Reading a solved blend back into kilograms and percentages.
//
// Nutrient totals use the raw solved weights. The dosing policy only changes
// the per-ingredient weights shown and the total batch weight built from them.

use std::fmt;

use super::error::FeedResult;
use super::ingredient::Ingredient;
use super::targets::FeedTargets;
use crate::domain::{Dosing, Nutrient, SolutionStatus, SolveSession, SolverStatistics};

#[derive(Debug, Clone, PartialEq)]
pub struct ReportLine {
    pub label: String,
    pub dosing: Dosing,
    /// Raw solved weight, kg
    pub solved_weight: f64,
    /// Weight after the dosing policy, kg
    pub weight: f64,
}

#[derive(Debug, Clone)]
pub struct FeedReport {
    pub solver: String,
    pub status: SolutionStatus,
    pub statistics: SolverStatistics,
    pub objective_value: f64,
    pub target_feed_weight: f64,
    pub lines: Vec<ReportLine>,
    pub calcium_weight: f64,
    pub salt_weight: f64,
    pub methionine_weight: f64,
    pub protein_weight: f64,
    pub methionine_target: f64,
}

impl FeedReport {
    /// Collect the report from a session that solved to optimality.
    pub fn collect(
        session: &SolveSession,
        ingredients: &[Ingredient],
        targets: &FeedTargets,
    ) -> FeedResult<Self> {
        let lines = ingredients
            .iter()
            .map(|ingredient| -> FeedResult<ReportLine> {
                Ok(ReportLine {
                    label: ingredient.label(),
                    dosing: ingredient.dosing(),
                    solved_weight: ingredient.solved_weight(session)?,
                    weight: ingredient.weight(session)?,
                })
            })
            .collect::<FeedResult<Vec<_>>>()?;

        let nutrient_total = |nutrient: Nutrient| -> f64 {
            ingredients
                .iter()
                .zip(&lines)
                .map(|(ingredient, line)| ingredient.fraction(nutrient) * line.solved_weight)
                .sum()
        };

        Ok(Self {
            solver: session.solver_name().to_string(),
            status: session.status().unwrap_or(SolutionStatus::Optimal),
            statistics: session.statistics().cloned().unwrap_or_default(),
            objective_value: session.objective_value()?,
            target_feed_weight: targets.total_feed_weight,
            calcium_weight: nutrient_total(Nutrient::Calcium),
            salt_weight: nutrient_total(Nutrient::Salt),
            methionine_weight: nutrient_total(Nutrient::Methionine),
            protein_weight: nutrient_total(Nutrient::Protein),
            methionine_target: targets.methionine,
            lines,
        })
    }

    /// Sum of reported weights, i.e. what actually goes into the batch.
    pub fn total_feed_weight(&self) -> f64 {
        self.lines.iter().map(|line| line.weight).sum()
    }

    /// Sum of raw solved weights.
    pub fn solved_feed_weight(&self) -> f64 {
        self.lines.iter().map(|line| line.solved_weight).sum()
    }

    pub fn protein_percentage(&self) -> f64 {
        self.objective_value / self.target_feed_weight * 100.0
    }

    pub fn methionine_percentage(&self) -> f64 {
        self.methionine_weight / self.target_feed_weight * 100.0
    }

    pub fn methionine_target_percentage(&self) -> f64 {
        self.methionine_target * 100.0
    }

    pub fn line(&self, label: &str) -> Option<&ReportLine> {
        self.lines.iter().find(|line| line.label == label)
    }
}

impl fmt::Display for FeedReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Status: {}", self.status)?;
        writeln!(f, "================= Solution =================")?;
        write!(f, "Solved in {:.2} milliseconds", self.statistics.solve_time_ms)?;
        if let Some(iterations) = self.statistics.simplex_iterations {
            write!(f, " in {} iterations", iterations)?;
        }
        writeln!(f, " using {}", self.solver)?;
        writeln!(f)?;
        writeln!(f, "Objective Value = {:.4}", self.objective_value)?;
        writeln!(f, "Optimal Protein % = {:.2}", self.protein_percentage())?;
        writeln!(f)?;
        writeln!(f, "Feed Weights:")?;
        for line in &self.lines {
            writeln!(f, "{} : {:.2} kg", line.label, line.weight)?;
        }
        writeln!(f)?;
        writeln!(f, "Total Feed Weight {:.2} kg", self.total_feed_weight())?;
        writeln!(f, "Total Calcium Weight {:.4} kg", self.calcium_weight)?;
        write!(
            f,
            "Total Methionine Percentage {:.2} target {:.2}",
            self.methionine_percentage(),
            self.methionine_target_percentage()
        )
    }
}
