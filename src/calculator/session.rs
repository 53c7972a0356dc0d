use anyhow::{bail, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::f64::consts::{E, PI};

use super::expr::{evaluate, format_number};

/// Shown after a failed evaluation.
pub const ERROR_DISPLAY: &str = "Error";

const INITIAL_DISPLAY: &str = "0";
const OPERATORS: [char; 7] = ['+', '-', '−', '*', '×', '/', '÷'];

/// Largest n whose factorial is finite in f64.
const MAX_FACTORIAL: u32 = 170;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AngleMode {
    #[default]
    Degrees,
    Radians,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constant {
    Pi,
    E,
}

/// State of one calculator: the display line and the angle mode.
#[derive(Debug, Clone)]
pub struct CalculatorSession {
    display: String,
    angle_mode: AngleMode,
}

impl Default for CalculatorSession {
    fn default() -> Self {
        Self::new(AngleMode::default())
    }
}

impl CalculatorSession {
    pub fn new(angle_mode: AngleMode) -> Self {
        Self {
            display: INITIAL_DISPLAY.to_string(),
            angle_mode,
        }
    }

    pub fn display(&self) -> &str {
        &self.display
    }

    pub fn angle_mode(&self) -> AngleMode {
        self.angle_mode
    }

    pub fn set_angle_mode(&mut self, mode: AngleMode) {
        self.angle_mode = mode;
    }

    fn is_fresh(&self) -> bool {
        self.display == INITIAL_DISPLAY || self.display == ERROR_DISPLAY
    }

    /// The number currently being typed, i.e. the text after the last operator.
    fn current_number(&self) -> &str {
        self.display.rsplit(&OPERATORS[..]).next().unwrap_or_default()
    }

    /// Type a key. A fresh display is replaced; a second decimal point in the
    /// same number is ignored.
    pub fn append(&mut self, key: &str) {
        if self.is_fresh() {
            self.display = if key == "." {
                "0.".to_string()
            } else {
                key.to_string()
            };
            return;
        }
        if key == "." && self.current_number().contains('.') {
            return;
        }
        self.display.push_str(key);
    }

    pub fn clear(&mut self) {
        self.display = INITIAL_DISPLAY.to_string();
    }

    pub fn delete_last(&mut self) {
        self.display.pop();
        if self.display.is_empty() {
            self.display = INITIAL_DISPLAY.to_string();
        }
    }

    /// Type the constant's digits and return its value.
    pub fn insert_constant(&mut self, constant: Constant) -> f64 {
        let value = match constant {
            Constant::Pi => PI,
            Constant::E => E,
        };
        if self.is_fresh() {
            self.display = value.to_string();
        } else {
            self.display.push_str(&value.to_string());
        }
        value
    }

    /// Evaluate the display. On failure the display shows the error marker.
    pub fn evaluate(&mut self) -> Result<f64> {
        match evaluate(&self.display) {
            Ok(value) => {
                self.display = format_number(value);
                Ok(value)
            }
            Err(e) => {
                debug!("Evaluation of '{}' failed: {}", self.display, e);
                self.display = ERROR_DISPLAY.to_string();
                Err(e)
            }
        }
    }

    fn show(&mut self, value: f64) -> Result<f64> {
        if !value.is_finite() {
            bail!("Result is not a finite number");
        }
        self.display = value.to_string();
        Ok(value)
    }

    fn to_radians(&self, angle: f64) -> f64 {
        match self.angle_mode {
            AngleMode::Degrees => angle.to_radians(),
            AngleMode::Radians => angle,
        }
    }

    pub fn sin(&mut self, angle: f64) -> Result<f64> {
        let value = self.to_radians(angle).sin();
        self.show(value)
    }

    pub fn cos(&mut self, angle: f64) -> Result<f64> {
        let value = self.to_radians(angle).cos();
        self.show(value)
    }

    pub fn tan(&mut self, angle: f64) -> Result<f64> {
        let value = self.to_radians(angle).tan();
        self.show(value)
    }

    /// Logarithm of `n` to `base`.
    pub fn log(&mut self, base: f64, n: f64) -> Result<f64> {
        if base.is_nan() || base <= 0.0 || base == 1.0 {
            bail!("Base must be greater than 0 and not equal to 1");
        }
        if n.is_nan() || n <= 0.0 {
            bail!("Argument must be greater than 0");
        }
        self.show(n.ln() / base.ln())
    }

    pub fn ln(&mut self, n: f64) -> Result<f64> {
        if n.is_nan() || n <= 0.0 {
            bail!("Argument must be greater than 0");
        }
        self.show(n.ln())
    }

    pub fn power(&mut self, base: f64, exponent: f64) -> Result<f64> {
        self.show(base.powf(exponent))
    }

    pub fn sqrt(&mut self, n: f64) -> Result<f64> {
        if n.is_nan() || n < 0.0 {
            bail!("Argument must not be negative");
        }
        self.show(n.sqrt())
    }

    pub fn square(&mut self, n: f64) -> Result<f64> {
        self.show(n * n)
    }

    pub fn cube(&mut self, n: f64) -> Result<f64> {
        self.show(n * n * n)
    }

    pub fn factorial(&mut self, n: u32) -> Result<f64> {
        self.show(factorial(n)?)
    }

    /// Number of ways to choose `m` of `n` items, order ignored.
    pub fn combination(&mut self, n: u32, m: u32) -> Result<f64> {
        check_choose(n, m)?;
        let k = m.min(n - m);
        let value = (0..k).fold(1.0, |acc, i| acc * f64::from(n - i) / f64::from(i + 1));
        self.show(value.round())
    }

    /// Number of ordered arrangements of `m` of `n` items.
    pub fn permutation(&mut self, n: u32, m: u32) -> Result<f64> {
        check_choose(n, m)?;
        let value = (0..m).fold(1.0, |acc, i| acc * f64::from(n - i));
        self.show(value)
    }
}

fn check_choose(n: u32, m: u32) -> Result<()> {
    if m > n {
        bail!("m must not exceed n (got n = {}, m = {})", n, m);
    }
    Ok(())
}

pub fn factorial(n: u32) -> Result<f64> {
    if n > MAX_FACTORIAL {
        bail!("Factorial of {} is too large (max {})", n, MAX_FACTORIAL);
    }
    Ok((2..=n).fold(1.0, |acc, i| acc * f64::from(i)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_new_session_shows_zero() {
        let session = CalculatorSession::default();
        assert_eq!(session.display(), "0");
        assert_eq!(session.angle_mode(), AngleMode::Degrees);
    }

    #[test]
    fn test_append_replaces_initial_zero() {
        let mut session = CalculatorSession::default();
        session.append("7");
        session.append("+");
        session.append("2");
        assert_eq!(session.display(), "7+2");
    }

    #[test]
    fn test_append_decimal_point_rules() {
        let mut session = CalculatorSession::default();
        session.append(".");
        assert_eq!(session.display(), "0.");
        session.append("5");
        session.append(".");
        assert_eq!(session.display(), "0.5");
        session.append("×");
        session.append("1");
        session.append(".");
        session.append("2");
        assert_eq!(session.display(), "0.5×1.2");
    }

    #[test]
    fn test_delete_last_and_clear() {
        let mut session = CalculatorSession::default();
        session.append("1");
        session.append("2");
        session.delete_last();
        assert_eq!(session.display(), "1");
        session.delete_last();
        assert_eq!(session.display(), "0");
        session.append("9");
        session.clear();
        assert_eq!(session.display(), "0");
    }

    #[test]
    fn test_evaluate_success_and_error() {
        let mut session = CalculatorSession::default();
        for key in ["0", ".", "7", "×", "0", ".", "8"] {
            session.append(key);
        }
        assert!(approx(session.evaluate().unwrap(), 0.56));
        assert_eq!(session.display(), "0.56");

        session.append("/");
        session.append("0");
        assert!(session.evaluate().is_err());
        assert_eq!(session.display(), ERROR_DISPLAY);

        // next key starts over
        session.append("3");
        assert_eq!(session.display(), "3");
    }

    #[test]
    fn test_deep_nesting_shows_error() {
        let mut session = CalculatorSession::default();
        for _ in 0..1000 {
            session.append("(");
        }
        session.append("1");
        assert!(session.evaluate().is_err());
        assert_eq!(session.display(), ERROR_DISPLAY);
    }

    #[test]
    fn test_constants() {
        let mut session = CalculatorSession::default();
        assert_eq!(session.insert_constant(Constant::Pi), PI);
        assert_eq!(session.display(), PI.to_string());
        session.append("*");
        session.append("2");
        session.evaluate().unwrap();
        assert_eq!(session.display(), "6.28318530718");
    }

    #[test]
    fn test_trig_respects_angle_mode() {
        let mut session = CalculatorSession::new(AngleMode::Degrees);
        assert!(approx(session.sin(30.0).unwrap(), 0.5));
        assert!(approx(session.cos(60.0).unwrap(), 0.5));
        assert!(approx(session.tan(45.0).unwrap(), 1.0));

        session.set_angle_mode(AngleMode::Radians);
        assert!(approx(session.sin(PI / 2.0).unwrap(), 1.0));
    }

    #[test]
    fn test_log_validation() {
        let mut session = CalculatorSession::default();
        assert!(approx(session.log(2.0, 8.0).unwrap(), 3.0));
        assert!(session.log(1.0, 8.0).is_err());
        assert!(session.log(-2.0, 8.0).is_err());
        assert!(session.log(10.0, 0.0).is_err());
        assert!(session.ln(0.0).is_err());
        assert!(approx(session.ln(E).unwrap(), 1.0));
    }

    #[test]
    fn test_invalid_input_leaves_display() {
        let mut session = CalculatorSession::default();
        session.append("5");
        assert!(session.sqrt(-1.0).is_err());
        assert_eq!(session.display(), "5");
    }

    #[test]
    fn test_powers_and_roots() {
        let mut session = CalculatorSession::default();
        assert_eq!(session.power(2.0, 10.0).unwrap(), 1024.0);
        assert_eq!(session.sqrt(81.0).unwrap(), 9.0);
        assert_eq!(session.square(-3.0).unwrap(), 9.0);
        assert_eq!(session.cube(2.0).unwrap(), 8.0);
        assert_eq!(session.display(), "8");
    }

    #[test]
    fn test_factorial() {
        assert_eq!(factorial(0).unwrap(), 1.0);
        assert_eq!(factorial(1).unwrap(), 1.0);
        assert_eq!(factorial(5).unwrap(), 120.0);
        assert!(factorial(170).unwrap().is_finite());
        assert!(factorial(171).is_err());
    }

    #[test]
    fn test_combination_and_permutation() {
        let mut session = CalculatorSession::default();
        assert_eq!(session.combination(5, 2).unwrap(), 10.0);
        assert_eq!(session.combination(5, 0).unwrap(), 1.0);
        assert_eq!(session.combination(52, 5).unwrap(), 2_598_960.0);
        assert_eq!(session.permutation(5, 2).unwrap(), 20.0);
        assert_eq!(session.permutation(4, 0).unwrap(), 1.0);
        assert!(session.combination(2, 3).is_err());
        assert!(session.permutation(2, 3).is_err());
    }
}
