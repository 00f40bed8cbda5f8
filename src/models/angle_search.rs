//! # Angle Search モジュール
//!
//! 仰角範囲テーブルの各区間を一定刻みで走査し、目標に最も近く着弾する仰角を探します。
//!
//! - 区間は順に、互いに独立して評価されます（区間ごとに最大1解）
//! - 許容誤差内に入った角度のうち誤差最小のものを採用します
//! - 飛翔モデルが許す場合、誤差が許容誤差の `early_exit_ratio` 未満になった時点で
//!   その区間の探索を打ち切ります
//! - tick上限を超えた角度が出た時点で探索全体を中止します

use tracing::debug;

use crate::models::cannon::PitchRange;
use crate::models::flight::{AimPoint, AngleEvaluation};
use crate::models::physics::PhysicsParams;
use crate::models::report::{AngleSolution, FailureReason};
use crate::models::traits::IFlightModel;

/// 全区間の解を探す
///
/// 1つも解がなければ `FailureReason::OutOfRange`、tick上限を超えた場合は
/// `FailureReason::TooManyCalculations` を返す。
pub fn find_angles<M: IFlightModel + ?Sized>(
    model: &M,
    physics: &PhysicsParams,
    v0: f64,
    aim: &AimPoint,
    pitch_ranges: &[PitchRange],
) -> Result<Vec<AngleSolution>, FailureReason> {
    let mut solutions = Vec::new();

    for range in pitch_ranges {
        if let Some(solution) = search_range(model, physics, v0, aim, range)? {
            solutions.push(solution);
        }
    }

    if solutions.is_empty() {
        debug!("解なし: 距離 {:.2}m, 高さ {:.2}m", aim.distance, aim.height);
        return Err(FailureReason::OutOfRange);
    }
    Ok(solutions)
}

/// 1区間を走査して最良の角度を返す
fn search_range<M: IFlightModel + ?Sized>(
    model: &M,
    physics: &PhysicsParams,
    v0: f64,
    aim: &AimPoint,
    range: &PitchRange,
) -> Result<Option<AngleSolution>, FailureReason> {
    let good_enough = physics.tolerance(v0) * physics.early_exit_ratio;
    let mut best: Option<(f64, AngleSolution)> = None;

    for angle_deg in range.sweep(physics.angle_step_deg) {
        match model.evaluate(v0, angle_deg, aim) {
            AngleEvaluation::Exhausted => {
                debug!(
                    "{}: 計算量上限に到達 (区間 [{}, {}), 角度 {:.2}°)",
                    model.name(),
                    range.min_deg,
                    range.max_deg,
                    angle_deg
                );
                return Err(FailureReason::TooManyCalculations);
            }
            AngleEvaluation::Hit {
                error,
                time_in_air_ticks,
            } => {
                if best.as_ref().is_none_or(|(best_error, _)| error < *best_error) {
                    best = Some((
                        error,
                        AngleSolution {
                            angle_deg,
                            time_in_air_ticks,
                        },
                    ));
                    if model.allows_early_exit() && error < good_enough {
                        break;
                    }
                }
            }
            AngleEvaluation::NoLanding | AngleEvaluation::Miss => {}
        }
    }

    if let Some((error, solution)) = &best {
        debug!(
            "{}: 区間 [{}, {}) → {:.2}° (誤差 {:.3}m, {:.1}tick)",
            model.name(),
            range.min_deg,
            range.max_deg,
            solution.angle_deg,
            error,
            solution.time_in_air_ticks
        );
    }
    Ok(best.map(|(_, solution)| solution))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::cannon::CannonType;
    use crate::models::flight::{ClosedFormModel, TickSimulationModel};
    use crate::models::trajectory::Trajectory;

    const V0: f64 = 160.0;

    fn aim(distance: f64, height: f64) -> AimPoint {
        AimPoint::new(distance, height, 3.0, 0.0)
    }

    /// 解の角度で弾道を再計算し、許容誤差内を通過するか
    fn passes_target(v0: f64, solution: &AngleSolution, aim: &AimPoint, physics: &PhysicsParams) -> bool {
        let tolerance = physics.tolerance(v0);
        let (target_x, target_y) = aim.from_muzzle(solution.angle_deg);
        Trajectory::new(v0, solution.angle_deg, physics)
            .take(physics.max_ticks_per_angle as usize)
            .any(|s| (s.x - target_x).abs() < tolerance && (s.y - target_y).abs() < tolerance)
    }

    #[test]
    fn test_closed_form_finds_low_and_high_arc() {
        let physics = PhysicsParams::default();
        let model = ClosedFormModel::new(physics);
        let ranges = CannonType::Normal.pitch_ranges();
        let solutions = find_angles(&model, &physics, V0, &aim(400.0, 0.0), &ranges).unwrap();

        assert_eq!(solutions.len(), 2);
        assert!(ranges[0].contains(solutions[0].angle_deg));
        assert!(ranges[1].contains(solutions[1].angle_deg));
        assert!(solutions[0].time_in_air_ticks < solutions[1].time_in_air_ticks);
    }

    #[test]
    fn test_tick_simulation_solutions_stay_in_range() {
        let physics = PhysicsParams::default();
        let model = TickSimulationModel::new(physics);
        let ranges = CannonType::Normal.pitch_ranges();
        let target = aim(400.0, 0.0);
        let solutions = find_angles(&model, &physics, V0, &target, &ranges).unwrap();

        assert_eq!(solutions.len(), 2);
        for solution in &solutions {
            assert!(ranges.iter().any(|r| r.contains(solution.angle_deg)));
            assert!(passes_target(V0, solution, &target, &physics));
        }
    }

    #[test]
    fn test_closed_form_solution_lands_near_target() {
        let physics = PhysicsParams::default();
        let model = ClosedFormModel::new(physics);
        let target = aim(250.0, 10.0);
        let solutions =
            find_angles(&model, &physics, V0, &target, &CannonType::Normal.pitch_ranges()).unwrap();

        for solution in &solutions {
            assert!(passes_target(V0, solution, &target, &physics));
        }
    }

    #[test]
    fn test_out_of_range_target() {
        let physics = PhysicsParams::default();
        let ranges = CannonType::Normal.pitch_ranges();
        let target = aim(5_000.0, 0.0);

        let closed = ClosedFormModel::new(physics);
        assert_eq!(
            find_angles(&closed, &physics, V0, &target, &ranges),
            Err(FailureReason::OutOfRange)
        );
        let tick = TickSimulationModel::new(physics);
        assert_eq!(
            find_angles(&tick, &physics, V0, &target, &ranges),
            Err(FailureReason::OutOfRange)
        );
    }

    #[test]
    fn test_runaway_simulation_aborts_search() {
        let physics = PhysicsParams::default();
        let model = TickSimulationModel::new(physics);
        let target = aim(1_000_000.0, -100_000.0);
        assert_eq!(
            find_angles(&model, &physics, V0, &target, &CannonType::Normal.pitch_ranges()),
            Err(FailureReason::TooManyCalculations)
        );
    }

    #[test]
    fn test_empty_range_yields_nothing() {
        let physics = PhysicsParams::default();
        let model = ClosedFormModel::new(physics);
        let ranges = [PitchRange::new(10.0, 10.0)];
        assert_eq!(
            find_angles(&model, &physics, V0, &aim(50.0, 0.0), &ranges),
            Err(FailureReason::OutOfRange)
        );
    }
}
