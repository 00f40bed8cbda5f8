//! # Flight モジュール
//!
//! 飛翔時間の求め方を切り替える2つの飛翔モデルを提供します。
//!
//! - [`ClosedFormModel`]: 目標距離に到達する時刻を対数式で求め、その時刻の高さの誤差を見る。
//!   砲口の真上・真下付近の目標だけは水平を一致とみなし、鉛直の通過時刻を逐次計算で求める
//! - [`TickSimulationModel`]: tickごとに弾道を進め、水平・鉛直の両方が許容誤差に入るtickを探す
//!
//! どちらも目標位置は砲口から測ります。方式は [`TimeOfFlightStrategy`] で設定時に選びます。

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::models::common::math_utils;
use crate::models::error::ModelError;
use crate::models::physics::PhysicsParams;
use crate::models::traits::IFlightModel;
use crate::models::trajectory::{self, Trajectory};

/// 砲の回転軸から見た目標と砲身の幾何
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AimPoint {
    /// 回転軸から目標までの水平距離 [m]
    pub distance: f64,
    /// 回転軸から目標までの高さ [m]（負も可）
    pub height: f64,
    /// 砲身長 [m]
    pub cannon_length: f64,
    /// 回転軸から砲口までの水平オフセット [m]
    pub axis_offset: f64,
}

impl AimPoint {
    pub fn new(distance: f64, height: f64, cannon_length: f64, axis_offset: f64) -> Self {
        Self {
            distance,
            height,
            cannon_length,
            axis_offset,
        }
    }

    /// 仰角 `angle_deg` のときの砲口から見た目標位置 (水平, 鉛直)
    pub fn from_muzzle(&self, angle_deg: f64) -> (f64, f64) {
        let angle_rad = math_utils::deg_to_rad(angle_deg);
        let muzzle_x = self.cannon_length * angle_rad.cos() + self.axis_offset;
        let muzzle_y = self.cannon_length * angle_rad.sin();
        (self.distance - muzzle_x, self.height - muzzle_y)
    }
}

/// 1つの仰角に対する評価結果
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AngleEvaluation {
    /// 目標距離に到達しない（砲口の後方、水平速度不足など）
    NoLanding,
    /// 到達するが許容誤差の外
    Miss,
    /// 許容誤差内に到達
    Hit { error: f64, time_in_air_ticks: f64 },
    /// tick上限を超えた（探索全体を中止する）
    Exhausted,
}

/// 閉形式（対数式）で目標距離に到達する時刻を求め、その時刻の高さを比較する
#[derive(Debug, Clone, Copy)]
pub struct ClosedFormModel {
    physics: PhysicsParams,
}

impl ClosedFormModel {
    pub fn new(physics: PhysicsParams) -> Self {
        Self { physics }
    }
}

impl IFlightModel for ClosedFormModel {
    fn evaluate(&self, v0: f64, angle_deg: f64, aim: &AimPoint) -> AngleEvaluation {
        let tolerance = self.physics.tolerance(v0);
        let (vx0, vy0) = trajectory::initial_velocity(v0, angle_deg, &self.physics);
        let (target_x, target_y) = aim.from_muzzle(angle_deg);

        let t = if target_x > 0.0 {
            let Some(t) = trajectory::time_to_distance(vx0, target_x, &self.physics) else {
                return AngleEvaluation::NoLanding;
            };
            t
        } else if target_x > -tolerance {
            // 砲口の真上・真下: 水平は許容誤差内なので鉛直の通過時刻で評価する
            let Some(t) = trajectory::time_to_height(v0, angle_deg, target_y, &self.physics) else {
                return AngleEvaluation::NoLanding;
            };
            if (trajectory::distance_at(vx0, t, &self.physics) - target_x).abs() >= tolerance {
                return AngleEvaluation::Miss;
            }
            t
        } else {
            return AngleEvaluation::NoLanding;
        };

        let error = (target_y - trajectory::height_at(vy0, t, &self.physics)).abs();
        if error < tolerance {
            AngleEvaluation::Hit {
                error,
                time_in_air_ticks: t,
            }
        } else {
            AngleEvaluation::Miss
        }
    }

    fn allows_early_exit(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "closed_form"
    }
}

/// tickごとに弾道を進め、水平・鉛直の両方が許容誤差に入るtickを探す
#[derive(Debug, Clone, Copy)]
pub struct TickSimulationModel {
    physics: PhysicsParams,
}

impl TickSimulationModel {
    pub fn new(physics: PhysicsParams) -> Self {
        Self { physics }
    }
}

impl IFlightModel for TickSimulationModel {
    fn evaluate(&self, v0: f64, angle_deg: f64, aim: &AimPoint) -> AngleEvaluation {
        let tolerance = self.physics.tolerance(v0);
        let (target_x, target_y) = aim.from_muzzle(angle_deg);
        let mut best: Option<(f64, u32)> = None;

        for sample in Trajectory::new(v0, angle_deg, &self.physics) {
            if sample.tick > self.physics.max_ticks_per_angle {
                trace!("tick上限超過: 角度 {:.2}°", angle_deg);
                return AngleEvaluation::Exhausted;
            }
            if sample.x > target_x + self.physics.overshoot_distance
                || sample.y < target_y - self.physics.drop_margin
            {
                break;
            }

            let error_x = (sample.x - target_x).abs();
            let error_y = (sample.y - target_y).abs();
            if error_x < tolerance && error_y < tolerance {
                let error = error_x + error_y;
                if best.is_none_or(|(best_error, _)| error < best_error) {
                    best = Some((error, sample.tick));
                }
            }
        }

        match best {
            Some((error, tick)) => AngleEvaluation::Hit {
                error,
                time_in_air_ticks: tick as f64,
            },
            None => AngleEvaluation::Miss,
        }
    }

    fn allows_early_exit(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "tick_simulation"
    }
}

/// 飛翔時間の計算方式（設定時に選択）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfFlightStrategy {
    #[default]
    ClosedForm,
    TickSimulation,
}

impl FromStr for TimeOfFlightStrategy {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "closed_form" | "closed" | "log" => Ok(TimeOfFlightStrategy::ClosedForm),
            "tick_simulation" | "tick" | "simulation" => Ok(TimeOfFlightStrategy::TickSimulation),
            _ => Err(ModelError::InvalidStrategy(s.to_string())),
        }
    }
}

impl fmt::Display for TimeOfFlightStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeOfFlightStrategy::ClosedForm => write!(f, "closed_form"),
            TimeOfFlightStrategy::TickSimulation => write!(f, "tick_simulation"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LENGTH: f64 = 3.0;

    /// 仰角 `angle_deg` で `tick` 後に弾が通過する点を目標にした AimPoint
    fn aim_on_trajectory(v0: f64, angle_deg: f64, tick: usize, physics: &PhysicsParams) -> AimPoint {
        let sample = Trajectory::new(v0, angle_deg, physics).nth(tick - 1).unwrap();
        let rad = math_utils::deg_to_rad(angle_deg);
        AimPoint::new(
            sample.x + LENGTH * rad.cos(),
            sample.y + LENGTH * rad.sin(),
            LENGTH,
            0.0,
        )
    }

    #[test]
    fn test_muzzle_relative_target() {
        let aim = AimPoint::new(100.0, 0.0, 3.0, 1.0);
        let (x, y) = aim.from_muzzle(90.0);
        assert!((x - 99.0).abs() < 1e-9);
        assert!((y + 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_closed_form_hits_point_on_trajectory() {
        let physics = PhysicsParams::default();
        let aim = aim_on_trajectory(60.0, 25.0, 40, &physics);
        match ClosedFormModel::new(physics).evaluate(60.0, 25.0, &aim) {
            AngleEvaluation::Hit {
                error,
                time_in_air_ticks,
            } => {
                assert!(error < 1e-6);
                assert!((time_in_air_ticks - 40.0).abs() < 1e-6);
            }
            other => panic!("unexpected evaluation: {:?}", other),
        }
    }

    #[test]
    fn test_tick_simulation_hits_point_on_trajectory() {
        let physics = PhysicsParams::default();
        let aim = aim_on_trajectory(60.0, 25.0, 40, &physics);
        match TickSimulationModel::new(physics).evaluate(60.0, 25.0, &aim) {
            AngleEvaluation::Hit {
                error,
                time_in_air_ticks,
            } => {
                assert!(error < 1e-6);
                assert_eq!(time_in_air_ticks, 40.0);
            }
            other => panic!("unexpected evaluation: {:?}", other),
        }
    }

    #[test]
    fn test_closed_form_target_behind_muzzle() {
        let physics = PhysicsParams::default();
        // 砲口が目標より許容誤差以上先にある
        let aim = AimPoint::new(0.0, 0.0, LENGTH, 1.0);
        assert_eq!(
            ClosedFormModel::new(physics).evaluate(50.0, 0.0, &aim),
            AngleEvaluation::NoLanding
        );
    }

    #[test]
    fn test_closed_form_target_at_pivot_near_vertical() {
        let physics = PhysicsParams::default();
        let aim = AimPoint::new(0.0, 0.0, LENGTH, 0.0);
        let model = ClosedFormModel::new(physics);
        match model.evaluate(160.0, 89.72, &aim) {
            AngleEvaluation::Hit {
                error,
                time_in_air_ticks,
            } => {
                assert!(error < physics.tolerance(160.0));
                assert!(time_in_air_ticks > 200.0);
            }
            other => panic!("unexpected evaluation: {:?}", other),
        }
        // 水平に流れて目標から外れる
        assert_eq!(model.evaluate(160.0, 60.0, &aim), AngleEvaluation::Miss);
    }

    #[test]
    fn test_tick_simulation_exhausted_on_deep_target() {
        let physics = PhysicsParams::default();
        // 水平には届かず、落下にも上限tick以上かかる目標
        let aim = AimPoint::new(1_000_000.0, -100_000.0, LENGTH, 0.0);
        assert_eq!(
            TickSimulationModel::new(physics).evaluate(50.0, 10.0, &aim),
            AngleEvaluation::Exhausted
        );
    }

    #[test]
    fn test_far_target_is_a_miss() {
        let physics = PhysicsParams::default();
        let aim = AimPoint::new(10_000.0, 0.0, LENGTH, 0.0);
        assert_eq!(
            TickSimulationModel::new(physics).evaluate(50.0, 45.0, &aim),
            AngleEvaluation::Miss
        );
        assert_eq!(
            ClosedFormModel::new(physics).evaluate(50.0, 45.0, &aim),
            AngleEvaluation::NoLanding
        );
    }

    #[test]
    fn test_strategy_parsing() {
        assert_eq!(
            "tick-simulation".parse::<TimeOfFlightStrategy>(),
            Ok(TimeOfFlightStrategy::TickSimulation)
        );
        assert_eq!(TimeOfFlightStrategy::default(), TimeOfFlightStrategy::ClosedForm);
        assert!("euler".parse::<TimeOfFlightStrategy>().is_err());
    }
}
