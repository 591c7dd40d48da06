//! Frame shift drive physics: fuel per jump, current jump range, refuelling.
//!
//! [`ShipModel`] is an immutable value; [`ShipModel::jump`] returns a new
//! ship rather than mutating. The router relies on this to explore
//! alternative paths without corrupting ship state along rejected branches.
//!
//! https://elite-dangerous.fandom.com/wiki/Frame_Shift_Drive#Hyperspace_Fuel_Equation

use std::str::FromStr;

use crate::error::{Error, Result};

/// FSD rating letter; decides the linear constant of the fuel equation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsdRating {
    A,
    B,
    C,
    D,
    E,
}

impl FsdRating {
    /// Linear constant of the hyperspace fuel equation for this rating.
    pub fn linear_constant(self) -> f64 {
        match self {
            FsdRating::A => 12.0,
            FsdRating::B => 10.0,
            FsdRating::C => 8.0,
            FsdRating::D => 10.0,
            FsdRating::E => 11.0,
        }
    }
}

impl FromStr for FsdRating {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Ok(FsdRating::A),
            "B" => Ok(FsdRating::B),
            "C" => Ok(FsdRating::C),
            "D" => Ok(FsdRating::D),
            "E" => Ok(FsdRating::E),
            other => Err(Error::UnknownFsdRating {
                rating: other.to_string(),
            }),
        }
    }
}

/// Power constant of the fuel equation, keyed by FSD class size.
fn power_constant(class: u8) -> Result<f64> {
    match class {
        2 => Ok(2.00),
        3 => Ok(2.15),
        4 => Ok(2.30),
        5 => Ok(2.45),
        6 => Ok(2.60),
        7 => Ok(2.75),
        8 => Ok(2.90),
        other => Err(Error::UnknownFsdClass { class: other }),
    }
}

/// A ship as the router sees it. Every jump produces a new value with
/// reduced fuel and mass; rejected search branches leave no trace.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShipModel {
    /// Tank size in tons.
    pub fuel_tank: f64,
    /// Fuel currently in the tank, in tons.
    pub fuel_remaining: f64,
    /// Full operating mass with a full tank, in tons.
    pub mass: f64,
    /// Operating mass right now; drops as fuel burns.
    pub current_mass: f64,
    /// FSD optimal mass, in tons.
    pub fsd_optimal_mass: f64,
    /// Most fuel the drive can burn in a single jump, in tons.
    pub max_fuel_per_jump: f64,
    /// Flat range bonus from a Guardian FSD booster, in light-years.
    pub guardian_booster_range: f64,
    /// Fuel scoop throughput from the module description, in kg/s.
    pub scoop_rate: f64,

    linear_constant: f64,
    power_constant: f64,
}

impl ShipModel {
    /// Build a ship from game stats. Starts with a full tank.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        fuel_tank: f64,
        mass: f64,
        fsd_optimal_mass: f64,
        max_fuel_per_jump: f64,
        guardian_booster_range: f64,
        scoop_rate: f64,
        rating: FsdRating,
        class: u8,
    ) -> Result<Self> {
        Ok(Self {
            fuel_tank,
            fuel_remaining: fuel_tank,
            mass,
            current_mass: mass,
            fsd_optimal_mass,
            max_fuel_per_jump,
            guardian_booster_range,
            scoop_rate,
            linear_constant: rating.linear_constant(),
            power_constant: power_constant(class)?,
        })
    }

    /// Fuel in tons a jump of `distance` light-years would burn right now.
    ///
    /// Jumps shorter than the booster bonus burn no fuel: the surplus is
    /// clamped at zero, since a negative base under the fractional power
    /// exponent would be NaN.
    pub fn fuel_to_jump(&self, distance: f64) -> f64 {
        let boosted = (distance - self.guardian_booster_range).max(0.0);
        self.linear_constant
            * 0.001
            * ((boosted * self.current_mass) / self.fsd_optimal_mass).powf(self.power_constant)
    }

    /// Perform a jump, returning the ship as it arrives.
    ///
    /// Fuel and mass both drop by the burned amount. Fails with
    /// [`Error::NotEnoughFuel`] when the tank cannot cover the jump.
    pub fn jump(self, distance: f64) -> Result<Self> {
        let fuel = self.fuel_to_jump(distance);
        if fuel > self.fuel_remaining {
            return Err(Error::NotEnoughFuel {
                required: fuel,
                available: self.fuel_remaining,
            });
        }
        Ok(Self {
            fuel_remaining: self.fuel_remaining - fuel,
            current_mass: self.current_mass - fuel,
            ..self
        })
    }

    /// Current maximum jump distance in light-years.
    ///
    /// Grows as fuel burns off because the drive pushes less mass. Assumes
    /// 0 t of cargo.
    pub fn jump_range(&self) -> f64 {
        (self.fsd_optimal_mass / self.current_mass)
            * (1000.0 * self.max_fuel_per_jump / self.linear_constant)
                .powf(1.0 / self.power_constant)
            + self.guardian_booster_range
    }

    /// The ship after topping the tank off at a scoopable star.
    pub fn refuel(self) -> Self {
        Self {
            fuel_remaining: self.fuel_tank,
            current_mass: self.mass,
            ..self
        }
    }

    /// Seconds a full refuel takes at the ship's scoop rate.
    pub fn seconds_to_scoop(&self) -> f64 {
        ((self.fuel_tank - self.fuel_remaining) * 100.0) / self.scoop_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn anaconda() -> ShipModel {
        ShipModel::new(32.0, 346.9, 1692.6, 5.0, 10.5, 878.0, FsdRating::A, 5)
            .expect("valid FSD class")
    }

    #[test]
    fn initial_jump_range() {
        let range = anaconda().jump_range();
        assert!((range - 67.73366678246619).abs() < EPS, "range = {range}");
    }

    #[test]
    fn max_range_jump_burns_max_fuel() {
        let ship = anaconda();
        let distance = ship.jump_range();
        let fuel = ship.fuel_to_jump(distance);
        assert!((fuel - 5.0).abs() < EPS, "fuel = {fuel}");

        let arrived = ship.jump(distance).expect("enough fuel");
        assert!((arrived.fuel_remaining - 27.0).abs() < EPS);
        assert!((arrived.current_mass - 341.9).abs() < EPS);
    }

    #[test]
    fn jump_range_grows_as_fuel_burns() {
        let ship = anaconda();
        let arrived = ship.jump(ship.jump_range()).expect("enough fuel");
        let new_range = arrived.jump_range();
        assert!(
            (new_range - 68.57066103199041).abs() < EPS,
            "range = {new_range}"
        );
    }

    #[test]
    fn repeated_max_jumps_exhaust_fuel_after_six() {
        let mut ship = anaconda();
        let mut jumps = 0;
        let err = loop {
            match ship.jump(ship.jump_range()) {
                Ok(next) => {
                    ship = next;
                    jumps += 1;
                }
                Err(err) => break err,
            }
        };

        assert!(matches!(err, Error::NotEnoughFuel { .. }));
        assert_eq!(jumps, 6);
        assert!((ship.fuel_remaining - 2.0).abs() < EPS);
        assert!((ship.mass - ship.current_mass - 30.0).abs() < EPS);
        assert!((ship.current_mass - 316.9).abs() < EPS);
    }

    #[test]
    fn jump_shorter_than_the_booster_bonus_is_free() {
        // Inside the 10.5 ly booster bonus the distance surplus is
        // negative; the cost must clamp to zero, not go NaN.
        let ship = anaconda();
        assert_eq!(ship.fuel_to_jump(5.0), 0.0);

        let arrived = ship.jump(5.0).expect("no fuel needed");
        assert_eq!(arrived.fuel_remaining, 32.0);
        assert_eq!(arrived.current_mass, 346.9);
        assert!(arrived.jump_range().is_finite());
        assert!(arrived.fuel_to_jump(arrived.jump_range()).is_finite());
    }

    #[test]
    fn refuel_restores_tank_and_mass() {
        let ship = anaconda();
        let arrived = ship.jump(ship.jump_range()).expect("enough fuel");
        let refuelled = arrived.refuel();
        assert_eq!(refuelled.fuel_remaining, 32.0);
        assert_eq!(refuelled.current_mass, 346.9);
    }

    #[test]
    fn seconds_to_scoop_scales_with_missing_fuel() {
        let ship = anaconda();
        assert_eq!(ship.seconds_to_scoop(), 0.0);

        let arrived = ship.jump(ship.jump_range()).expect("enough fuel");
        let expect = ((32.0 - arrived.fuel_remaining) * 100.0) / 878.0;
        assert!((arrived.seconds_to_scoop() - expect).abs() < EPS);
    }

    #[test]
    fn unknown_fsd_class_is_rejected() {
        let result = ShipModel::new(32.0, 346.9, 1692.6, 5.0, 10.5, 878.0, FsdRating::A, 9);
        assert!(matches!(result, Err(Error::UnknownFsdClass { class: 9 })));
    }

    #[test]
    fn rating_parses_case_insensitively() {
        assert_eq!("a".parse::<FsdRating>().unwrap(), FsdRating::A);
        assert_eq!("E".parse::<FsdRating>().unwrap(), FsdRating::E);
        assert!("F".parse::<FsdRating>().is_err());
    }
}
