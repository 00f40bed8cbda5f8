//! # Ballistics モジュール
//!
//! 射撃計算の窓口となる計算エンジンを提供します。
//!
//! 砲と目標の位置から水平距離・高低差・方向差を求め、仰角探索とヨー計算を組み合わせて
//! 1つの [`Report`] にまとめます。計算は入力だけに依存する純粋な処理で、
//! 呼び出し間で共有される状態はありません。
//!
//! ## 処理順序
//!
//! 1. **方向コードの解決**: 未知のコードなら計算せずに失敗レポートを返す
//! 2. **幾何の計算**: dx, dz, 水平距離, 高低差
//! 3. **仰角探索**: 設定された飛翔モデルで各仰角区間を走査
//! 4. **レポート生成**: 解の一覧とヨー、または失敗理由
//!
//! 複数目標の一括計算は [`BallisticEngine::solve_batch`] で並列に実行できます。

use thiserror::Error;
use tracing::{debug, info};

use crate::models::cannon::validate_mount;
use crate::models::*;

/// 1回の射撃計算の入力
#[derive(Debug, Clone, PartialEq)]
pub struct FiringRequest {
    pub origin: Position3D,
    pub target: Position3D,
    /// 設置方向コード（north/south/east/west または n/s/e/w）
    pub direction_code: String,
    pub yaw_offset_deg: f64,
    pub cannon_length: f64,
    pub axis_offset: f64,
    /// 初速 V0 [m/s]
    pub launch_speed: f64,
    pub pitch_ranges: Vec<PitchRange>,
}

impl FiringRequest {
    /// 検証済みの砲構成と目標位置から入力を組み立てる
    pub fn from_cannon(cannon: &CannonConfig, target: Position3D) -> Self {
        Self {
            origin: cannon.position,
            target,
            direction_code: cannon.direction.to_string(),
            yaw_offset_deg: cannon.yaw_offset_deg,
            cannon_length: cannon.length,
            axis_offset: cannon.axis_offset,
            launch_speed: cannon.muzzle_velocity.speed(),
            pitch_ranges: cannon.pitch_ranges().to_vec(),
        }
    }

    /// 入力フォームと同じ順序・文言で数値を検証する
    ///
    /// 砲の設置構成と同じ検証に、目標座標が有限であることを加えたもの。
    /// 計算本体は検証済みの入力を前提とし、再検証しない。
    pub fn validate(&self) -> Result<(), ModelError> {
        let (o, t) = (self.origin, self.target);
        validate_mount(
            &[o.x, o.y, o.z, t.x, t.y, t.z],
            self.cannon_length,
            self.launch_speed,
            self.yaw_offset_deg,
            self.axis_offset,
        )
    }
}

/// 一括計算のエラー
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("ランタイムの作成に失敗しました: {0}")]
    Runtime(#[from] std::io::Error),
    #[error("計算タスクが異常終了しました: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// 射撃計算エンジン
#[derive(Debug, Clone, Copy)]
pub struct BallisticEngine {
    pub physics: PhysicsParams,
    pub strategy: TimeOfFlightStrategy,
}

impl BallisticEngine {
    pub fn new(physics: PhysicsParams, strategy: TimeOfFlightStrategy) -> Self {
        Self { physics, strategy }
    }

    /// 設定された方式の飛翔モデル
    pub fn flight_model(&self) -> Box<dyn IFlightModel + Send + Sync> {
        match self.strategy {
            TimeOfFlightStrategy::ClosedForm => Box::new(ClosedFormModel::new(self.physics)),
            TimeOfFlightStrategy::TickSimulation => Box::new(TickSimulationModel::new(self.physics)),
        }
    }

    /// 射撃計算（仰角の解とヨー、または失敗理由）
    pub fn ballistic_calc(&self, request: &FiringRequest) -> Report {
        let delta = request.target - request.origin;

        let yaw = match resolve_yaw_code(delta.x, delta.z, &request.direction_code, request.yaw_offset_deg) {
            Ok(yaw) => yaw,
            Err(reason) => {
                debug!("方向コードが不正です: {}", request.direction_code);
                return Report::Failed(reason);
            }
        };

        let aim = AimPoint::new(
            request.origin.distance_xz(&request.target),
            delta.y,
            request.cannon_length,
            request.axis_offset,
        );
        debug!(
            "射撃計算: 距離 {:.2}m, 高低差 {:.2}m, V0 {:.1}m/s, 方式 {}",
            aim.distance, aim.height, request.launch_speed, self.strategy
        );

        let model = self.flight_model();
        match find_angles(&*model, &self.physics, request.launch_speed, &aim, &request.pitch_ranges) {
            Ok(angles) => Report::solved(angles, yaw, &self.physics),
            Err(reason) => Report::Failed(reason),
        }
    }

    /// 複数の目標を並列に計算する
    ///
    /// 各計算は互いに独立しているため、ブロッキングタスクとしてそのまま並列実行する。
    /// 結果は入力と同じ順序で返す。
    pub fn solve_batch(
        &self,
        requests: Vec<(String, FiringRequest)>,
    ) -> Result<Vec<(String, Report)>, EngineError> {
        let runtime = tokio::runtime::Builder::new_multi_thread().build()?;
        let engine = *self;
        let total = requests.len();

        let results = runtime.block_on(async move {
            let handles: Vec<_> = requests
                .into_iter()
                .map(|(id, request)| {
                    tokio::task::spawn_blocking(move || {
                        let report = engine.ballistic_calc(&request);
                        (id, report)
                    })
                })
                .collect();

            let mut results = Vec::with_capacity(handles.len());
            for handle in handles {
                results.push(handle.await?);
            }
            Ok::<_, EngineError>(results)
        })?;

        let solved = results.iter().filter(|(_, report)| report.is_solved()).count();
        info!("一括計算完了: {}件中 {}件で解あり", total, solved);
        Ok(results)
    }
}

impl Default for BallisticEngine {
    fn default() -> Self {
        Self::new(PhysicsParams::default(), TimeOfFlightStrategy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::cannon::CannonDirection;
    use crate::models::report::{FailureReason, RotationDirection};

    fn request(target: Position3D, speed: f64) -> FiringRequest {
        FiringRequest {
            origin: Position3D::new(0.0, 0.0, 0.0),
            target,
            direction_code: "east".to_string(),
            yaw_offset_deg: 0.0,
            cannon_length: 3.0,
            axis_offset: 0.0,
            launch_speed: speed,
            pitch_ranges: CannonType::Normal.pitch_ranges().to_vec(),
        }
    }

    #[test]
    fn test_target_due_east_needs_no_turn() {
        for strategy in [TimeOfFlightStrategy::ClosedForm, TimeOfFlightStrategy::TickSimulation] {
            let engine = BallisticEngine::new(PhysicsParams::default(), strategy);
            let report = engine.ballistic_calc(&request(Position3D::new(400.0, 0.0, 0.0), 160.0));
            match &report {
                Report::Solved { angles, yaw, .. } => {
                    assert!(!angles.is_empty() && angles.len() <= 2);
                    assert_eq!(yaw.rotation, RotationDirection::NotApplicable);
                }
                Report::Failed(reason) => panic!("{}: {}", strategy, reason),
            }
            let text = report.to_string();
            assert!(text.contains("Yaw: 0.00°"));
            assert!(text.ends_with("Rotation Direction: N/A"));
        }
    }

    #[test]
    fn test_target_at_pivot_solves_near_vertical() {
        for strategy in [TimeOfFlightStrategy::ClosedForm, TimeOfFlightStrategy::TickSimulation] {
            let engine = BallisticEngine::new(PhysicsParams::default(), strategy);
            let mut req = request(Position3D::new(0.0, 0.0, 0.0), 160.0);
            req.pitch_ranges = CannonType::NoLimit.pitch_ranges().to_vec();
            match engine.ballistic_calc(&req) {
                Report::Solved { angles, yaw, .. } => {
                    assert!(!angles.is_empty());
                    assert!(angles.iter().all(|a| a.angle_deg > 80.0 && a.angle_deg < 90.0));
                    assert_eq!(yaw.rotation, RotationDirection::NotApplicable);
                }
                Report::Failed(reason) => panic!("{}: {}", strategy, reason),
            }
        }
    }

    #[test]
    fn test_target_at_pivot_out_of_reach_for_low_pitch_cannon() {
        let engine = BallisticEngine::default();
        let report = engine.ballistic_calc(&request(Position3D::new(0.0, 0.0, 0.0), 160.0));
        assert_eq!(report, Report::Failed(FailureReason::OutOfRange));
    }

    #[test]
    fn test_slow_projectile_is_out_of_range() {
        // 50 m/s では水平到達距離が 100m に満たない
        let engine = BallisticEngine::default();
        let report = engine.ballistic_calc(&request(Position3D::new(100.0, 0.0, 0.0), 50.0));
        assert_eq!(report.to_string(), "Out of fire range");
    }

    #[test]
    fn test_runaway_simulation_report() {
        let engine = BallisticEngine::new(PhysicsParams::default(), TimeOfFlightStrategy::TickSimulation);
        let report = engine.ballistic_calc(&request(Position3D::new(1_000_000.0, -100_000.0, 0.0), 160.0));
        assert_eq!(report.to_string(), "Too many calculations");
    }

    #[test]
    fn test_invalid_direction_fails_fast() {
        let engine = BallisticEngine::default();
        let mut req = request(Position3D::new(400.0, 0.0, 0.0), 160.0);
        req.direction_code = "up".to_string();
        assert_eq!(
            engine.ballistic_calc(&req),
            Report::Failed(FailureReason::InvalidDirection("up".to_string()))
        );
    }

    #[test]
    fn test_request_validation_messages() {
        let base = request(Position3D::new(400.0, 0.0, 0.0), 160.0);
        assert!(base.validate().is_ok());

        let mut req = base.clone();
        req.cannon_length = 1.0;
        assert_eq!(req.validate(), Err(ModelError::InvalidCannonLength));

        let mut req = base.clone();
        req.launch_speed = 0.5;
        assert_eq!(req.validate(), Err(ModelError::InvalidMuzzleVelocity));

        let mut req = base.clone();
        req.yaw_offset_deg = -181.0;
        assert_eq!(req.validate(), Err(ModelError::InvalidYawOffset));
        assert_eq!(ModelError::InvalidYawOffset.to_string(), "Invalid yaw offset");

        let mut req = base;
        req.target.z = f64::NAN;
        assert_eq!(req.validate(), Err(ModelError::MissingValue));
    }

    #[test]
    fn test_from_cannon_converts_powder_charge() {
        let cannon = CannonConfig {
            position: Position3D::new(1.0, 2.0, 3.0),
            direction: CannonDirection::North,
            yaw_offset_deg: 0.0,
            length: 5.0,
            axis_offset: 1.0,
            muzzle_velocity: MuzzleVelocity::new(4.0, VelocityUnit::PowderCharge),
            cannon_type: CannonType::NoLimit,
        };
        let req = FiringRequest::from_cannon(&cannon, Position3D::new(0.0, 0.0, 0.0));
        assert_eq!(req.launch_speed, 160.0);
        assert_eq!(req.direction_code, "north");
        assert_eq!(req.pitch_ranges[1], PitchRange::new(30.0, 90.0));
    }

    #[test]
    fn test_batch_keeps_input_order() {
        let engine = BallisticEngine::default();
        let requests = vec![
            ("far".to_string(), request(Position3D::new(5_000.0, 0.0, 0.0), 160.0)),
            ("near".to_string(), request(Position3D::new(400.0, 0.0, 0.0), 160.0)),
        ];
        let results = engine.solve_batch(requests).unwrap();
        assert_eq!(results[0].0, "far");
        assert!(!results[0].1.is_solved());
        assert_eq!(results[1].0, "near");
        assert!(results[1].1.is_solved());
    }
}
