//! Piecewise decision rules over normalized features.
//!
//! A shallow regression tree written as nested threshold tests, so the
//! mortality estimate can be used inside solver constraints. Samples with
//! `feature <= threshold` take the `below` branch.

#[cfg(test)]
mod tests;

use std::fmt;

use musselforge_core::{Feature, Features, MusselError};
use musselforge_learn::{RegressionTree, TreeNode, TREATMENT_C, TREATMENT_T};
use musselforge_smt::Quantity;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Deepest tree accepted as rules.
pub const MAX_DEPTH: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleNode {
    Split {
        feature: Feature,
        threshold: f64,
        below: Box<RuleNode>,
        above: Box<RuleNode>,
    },
    Leaf(f64),
}

fn split(feature: Feature, threshold: f64, below: RuleNode, above: RuleNode) -> RuleNode {
    RuleNode::Split {
        feature,
        threshold,
        below: Box::new(below),
        above: Box::new(above),
    }
}

fn leaf(value: f64) -> RuleNode {
    RuleNode::Leaf(value)
}

impl RuleNode {
    fn depth(&self) -> usize {
        match self {
            RuleNode::Leaf(_) => 0,
            RuleNode::Split { below, above, .. } => 1 + below.depth().max(above.depth()),
        }
    }

    fn evaluate(&self, features: &Features<Quantity>) -> Quantity {
        match self {
            RuleNode::Leaf(value) => Quantity::Concrete(*value),
            RuleNode::Split {
                feature,
                threshold,
                below,
                above,
            } => Quantity::ite(
                features.get(*feature).le(*threshold),
                below.evaluate(features),
                above.evaluate(features),
            ),
        }
    }

    fn predict(&self, features: &Features<f64>) -> f64 {
        match self {
            RuleNode::Leaf(value) => *value,
            RuleNode::Split {
                feature,
                threshold,
                below,
                above,
            } => {
                if *features.get(*feature) <= *threshold {
                    below.predict(features)
                } else {
                    above.predict(features)
                }
            }
        }
    }

    // Each split must cut the interval its ancestors leave open for that
    // feature.
    fn check(&self, open: &mut Vec<(Feature, f64, f64)>) -> std::result::Result<(), String> {
        match self {
            RuleNode::Leaf(value) if (0.0..=1.0).contains(value) => Ok(()),
            RuleNode::Leaf(value) => Err(format!("leaf value {value} is outside [0, 1]")),
            RuleNode::Split {
                feature,
                threshold,
                below,
                above,
            } => {
                if !threshold.is_finite() {
                    return Err(format!("threshold on {feature} is not finite"));
                }
                let (lo, hi) = open
                    .iter()
                    .rev()
                    .find(|(f, _, _)| f == feature)
                    .map_or((f64::NEG_INFINITY, f64::INFINITY), |&(_, lo, hi)| (lo, hi));
                if *threshold <= lo || *threshold >= hi {
                    return Err(format!(
                        "threshold {threshold} on {feature} is unreachable within ({lo}, {hi}]"
                    ));
                }
                open.push((*feature, lo, *threshold));
                let left = below.check(open);
                open.pop();
                left?;
                open.push((*feature, *threshold, hi));
                let right = above.check(open);
                open.pop();
                right
            }
        }
    }

    fn render(&self, indent: usize, out: &mut String) {
        let bar = "|   ".repeat(indent);
        match self {
            RuleNode::Leaf(value) => {
                out.push_str(&format!("{bar}|--- value: [{value:.2}]\n"));
            }
            RuleNode::Split {
                feature,
                threshold,
                below,
                above,
            } => {
                out.push_str(&format!("{bar}|--- {feature} <= {threshold:.2}\n"));
                below.render(indent + 1, out);
                out.push_str(&format!("{bar}|--- {feature} >  {threshold:.2}\n"));
                above.render(indent + 1, out);
            }
        }
    }
}

/// A validated rule tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRules {
    root: RuleNode,
}

impl DecisionRules {
    /// # Errors
    ///
    /// [`MusselError::InvalidRules`] when the tree is deeper than
    /// [`MAX_DEPTH`], a leaf lies outside `[0, 1]`, or a threshold cannot be
    /// reached given its ancestors.
    pub fn new(root: RuleNode) -> Result<Self> {
        let depth = root.depth();
        if depth > MAX_DEPTH {
            return Err(MusselError::InvalidRules(format!(
                "depth {depth} exceeds {MAX_DEPTH}"
            ))
            .into());
        }
        root.check(&mut Vec::new())
            .map_err(MusselError::InvalidRules)?;
        Ok(Self { root })
    }

    /// The hand-extracted depth-5 tree fitted on the tank experiment.
    pub fn reference() -> Self {
        use Feature::{Copper as Cu, DissolvedOxygen as Do, Ph, Temperature as Temp, Treatment};

        let cool = split(
            Ph,
            0.46,
            split(
                Do,
                0.40,
                split(
                    Cu,
                    0.42,
                    split(Cu, 0.29, leaf(0.95), leaf(0.98)),
                    split(Do, 0.16, leaf(0.99), leaf(1.00)),
                ),
                split(
                    Cu,
                    0.45,
                    split(Ph, 0.40, leaf(0.92), leaf(0.99)),
                    split(Do, 0.47, leaf(0.78), leaf(0.88)),
                ),
            ),
            split(
                Do,
                0.52,
                split(
                    Temp,
                    0.06,
                    leaf(0.90),
                    split(Do, 0.43, leaf(0.82), leaf(0.79)),
                ),
                split(
                    Cu,
                    0.87,
                    split(Do, 0.61, leaf(0.99), leaf(0.95)),
                    split(Do, 0.60, leaf(0.92), leaf(0.88)),
                ),
            ),
        );
        let warm = split(
            Cu,
            0.51,
            split(
                Treatment,
                0.50,
                leaf(0.00),
                split(
                    Cu,
                    0.37,
                    split(Do, 0.94, leaf(0.28), leaf(0.31)),
                    split(Ph, 0.97, leaf(0.20), leaf(0.24)),
                ),
            ),
            split(
                Ph,
                0.52,
                split(
                    Ph,
                    0.50,
                    leaf(0.62),
                    split(Cu, 0.67, leaf(0.70), leaf(0.62)),
                ),
                split(Do, 0.52, leaf(0.53), leaf(0.60)),
            ),
        );
        Self {
            root: split(Temp, 0.25, cool, warm),
        }
    }

    /// Transcribes a fitted tree over the six encoded columns.
    ///
    /// A split on the `Treatment_C` column becomes a split on the treatment
    /// indicator with its branches swapped.
    pub fn from_tree(tree: &RegressionTree) -> Result<Self> {
        fn convert(nodes: &[TreeNode], id: usize) -> std::result::Result<RuleNode, String> {
            match nodes.get(id) {
                None => Err(format!("node {id} does not exist")),
                Some(TreeNode::Leaf { value }) => Ok(RuleNode::Leaf(*value)),
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let below = convert(nodes, *left)?;
                    let above = convert(nodes, *right)?;
                    let (feature, threshold, below, above) = match *feature {
                        0 => (Feature::Copper, *threshold, below, above),
                        1 => (Feature::Temperature, *threshold, below, above),
                        2 => (Feature::Ph, *threshold, below, above),
                        3 => (Feature::DissolvedOxygen, *threshold, below, above),
                        TREATMENT_C => (Feature::Treatment, 1.0 - threshold, above, below),
                        TREATMENT_T => (Feature::Treatment, *threshold, below, above),
                        other => return Err(format!("column {other} has no feature")),
                    };
                    Ok(split(feature, threshold, below, above))
                }
            }
        }
        let root = convert(tree.nodes(), 0).map_err(MusselError::InvalidRules)?;
        Self::new(root)
    }

    pub fn root(&self) -> &RuleNode {
        &self.root
    }

    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    /// Mortality estimate over normalized features; symbolic inputs yield a
    /// nested if-then-else term.
    pub fn evaluate(&self, features: &Features<Quantity>) -> Quantity {
        self.root.evaluate(features)
    }

    pub fn predict(&self, features: &Features<f64>) -> f64 {
        self.root.predict(features)
    }

    /// Indented text form, one line per test or leaf.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.root.render(0, &mut out);
        out
    }
}

impl fmt::Display for DecisionRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
