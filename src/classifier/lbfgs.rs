//! Limited-memory BFGS minimiser with an Armijo backtracking line search,
//! with an orthant-wise variant for L1-penalised objectives.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

const ARMIJO: f64 = 1e-4;
const MAX_LINE_SEARCH_STEPS: usize = 40;
const IMPROVEMENT_WINDOW: usize = 5;

pub trait Objective {
    /// Returns the value at `x` and writes the gradient into `grad`.
    fn evaluate(&self, x: &[f64], grad: &mut [f64]) -> f64;
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LbfgsSettings {
    pub history_size: usize,
    pub tolerance: f64,
    pub max_iterations: usize,
}

#[derive(Debug, Clone)]
pub struct Minimum {
    pub x: Vec<f64>,
    pub value: f64,
    pub iterations: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LbfgsError {
    NonFinite { iteration: usize },
    LineSearchFailed { iteration: usize },
    IterationLimit { iterations: usize },
}

impl LbfgsError {
    pub fn iterations(&self) -> usize {
        match self {
            LbfgsError::NonFinite { iteration } | LbfgsError::LineSearchFailed { iteration } => {
                *iteration
            }
            LbfgsError::IterationLimit { iterations } => *iterations,
        }
    }
}

impl std::fmt::Display for LbfgsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LbfgsError::NonFinite { iteration } => {
                write!(f, "objective became non-finite at iteration {}", iteration)
            }
            LbfgsError::LineSearchFailed { iteration } => {
                write!(f, "line search found no descent at iteration {}", iteration)
            }
            LbfgsError::IterationLimit { iterations } => {
                write!(f, "not converged within {} iterations", iterations)
            }
        }
    }
}

struct Correction {
    s: Vec<f64>,
    y: Vec<f64>,
    rho: f64,
}

/// `weight * sum(|x_j|)` over the first `count` coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct L1Penalty {
    pub weight: f64,
    pub count: usize,
}

#[cfg(test)]
pub fn minimize<O: Objective>(
    objective: &O,
    x0: Vec<f64>,
    settings: &LbfgsSettings,
) -> Result<Minimum, LbfgsError> {
    minimize_l1(objective, x0, settings, L1Penalty::default())
}

/// Orthant-wise L-BFGS (OWL-QN): minimises `objective + penalty`. Steps never
/// cross zero on a penalised coordinate, so weights the penalty pushes to
/// zero land on exactly 0.0. A zero penalty is plain L-BFGS.
pub fn minimize_l1<O: Objective>(
    objective: &O,
    x0: Vec<f64>,
    settings: &LbfgsSettings,
    penalty: L1Penalty,
) -> Result<Minimum, LbfgsError> {
    let n = x0.len();
    let c = penalty.weight;
    let l1 = if c > 0.0 { penalty.count.min(n) } else { 0 };
    let total = |x: &[f64], smooth: f64| smooth + c * x[..l1].iter().map(|v| v.abs()).sum::<f64>();

    let mut x = x0;
    let mut grad = vec![0.0; n];
    let mut value = total(&x, objective.evaluate(&x, &mut grad));

    if !value.is_finite() {
        return Err(LbfgsError::NonFinite { iteration: 0 });
    }

    let mut pgrad = vec![0.0; n];
    pseudo_gradient(&x, &grad, c, l1, &mut pgrad);

    let mut history: VecDeque<Correction> = VecDeque::with_capacity(settings.history_size);
    let mut improvements: VecDeque<f64> = VecDeque::with_capacity(IMPROVEMENT_WINDOW);
    let mut x_next = vec![0.0; n];
    let mut grad_next = vec![0.0; n];

    for iteration in 1..=settings.max_iterations {
        if norm(&pgrad) <= settings.tolerance * norm(&x).max(1.0) {
            return Ok(Minimum {
                x,
                value,
                iterations: iteration - 1,
            });
        }

        let mut direction = search_direction(&pgrad, &history);
        for j in 0..l1 {
            if direction[j] * pgrad[j] >= 0.0 {
                direction[j] = 0.0;
            }
        }
        let slope = dot(&direction, &pgrad);
        if slope >= 0.0 {
            history.clear();
            direction = pgrad.iter().map(|g| -g).collect();
        }

        let orthant: Vec<f64> = (0..l1)
            .map(|j| if x[j] != 0.0 { sign(x[j]) } else { -sign(pgrad[j]) })
            .collect();

        let mut step = if history.is_empty() {
            (1.0 / norm(&pgrad)).min(1.0)
        } else {
            1.0
        };

        let mut next_value = None;
        for _ in 0..MAX_LINE_SEARCH_STEPS {
            for i in 0..n {
                x_next[i] = x[i] + step * direction[i];
            }
            for j in 0..l1 {
                if x_next[j] * orthant[j] <= 0.0 {
                    x_next[j] = 0.0;
                }
            }
            let candidate = total(&x_next, objective.evaluate(&x_next, &mut grad_next));
            let decrease: f64 = pgrad
                .iter()
                .zip(x_next.iter().zip(&x))
                .map(|(g, (a, b))| g * (a - b))
                .sum();
            if candidate.is_finite() && candidate <= value + ARMIJO * decrease {
                next_value = Some(candidate);
                break;
            }
            step *= 0.5;
        }

        let next_value = match next_value {
            Some(v) => v,
            None => {
                let stalled = improvements
                    .back()
                    .map(|last| *last <= settings.tolerance.sqrt())
                    .unwrap_or(false);
                if stalled || norm(&pgrad) <= settings.tolerance.sqrt() * norm(&x).max(1.0) {
                    return Ok(Minimum {
                        x,
                        value,
                        iterations: iteration - 1,
                    });
                }
                return Err(LbfgsError::LineSearchFailed { iteration });
            }
        };

        let s: Vec<f64> = x_next.iter().zip(&x).map(|(a, b)| a - b).collect();
        let y: Vec<f64> = grad_next.iter().zip(&grad).map(|(a, b)| a - b).collect();
        let sy = dot(&s, &y);
        if sy > 1e-10 {
            if history.len() == settings.history_size {
                history.pop_front();
            }
            if settings.history_size > 0 {
                history.push_back(Correction { s, y, rho: 1.0 / sy });
            }
        }

        let improvement = (value - next_value) / value.abs().max(next_value.abs()).max(1.0);
        if improvements.len() == IMPROVEMENT_WINDOW {
            improvements.pop_front();
        }
        improvements.push_back(improvement);

        std::mem::swap(&mut x, &mut x_next);
        std::mem::swap(&mut grad, &mut grad_next);
        value = next_value;
        pseudo_gradient(&x, &grad, c, l1, &mut pgrad);

        if improvements.len() == IMPROVEMENT_WINDOW
            && improvements.iter().sum::<f64>() / IMPROVEMENT_WINDOW as f64 <= settings.tolerance
        {
            return Ok(Minimum {
                x,
                value,
                iterations: iteration,
            });
        }
    }

    Err(LbfgsError::IterationLimit {
        iterations: settings.max_iterations,
    })
}

/// Steepest-descent subgradient of `smooth + c * |x[..l1]|`.
fn pseudo_gradient(x: &[f64], grad: &[f64], c: f64, l1: usize, out: &mut [f64]) {
    for (j, (xj, gj)) in x.iter().zip(grad).enumerate() {
        out[j] = if j >= l1 {
            *gj
        } else if *xj < 0.0 {
            gj - c
        } else if *xj > 0.0 {
            gj + c
        } else if gj + c < 0.0 {
            gj + c
        } else if gj - c > 0.0 {
            gj - c
        } else {
            0.0
        };
    }
}

fn sign(v: f64) -> f64 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Two-loop recursion: approximates `-H^-1 * grad` from the stored corrections.
fn search_direction(grad: &[f64], history: &VecDeque<Correction>) -> Vec<f64> {
    let mut q = grad.to_vec();
    let mut alphas = vec![0.0; history.len()];

    for (i, c) in history.iter().enumerate().rev() {
        let alpha = c.rho * dot(&c.s, &q);
        axpy(-alpha, &c.y, &mut q);
        alphas[i] = alpha;
    }

    let gamma = history
        .back()
        .map(|c| dot(&c.s, &c.y) / dot(&c.y, &c.y))
        .filter(|g| g.is_finite() && *g > 0.0)
        .unwrap_or(1.0);
    q.iter_mut().for_each(|v| *v *= gamma);

    for (i, c) in history.iter().enumerate() {
        let beta = c.rho * dot(&c.y, &q);
        axpy(alphas[i] - beta, &c.s, &mut q);
    }

    q.iter().map(|v| -v).collect()
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn norm(a: &[f64]) -> f64 {
    dot(a, a).sqrt()
}

fn axpy(alpha: f64, x: &[f64], y: &mut [f64]) {
    for (yi, xi) in y.iter_mut().zip(x) {
        *yi += alpha * xi;
    }
}
