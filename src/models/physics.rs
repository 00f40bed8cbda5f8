use serde::{Deserialize, Serialize};

use crate::models::error::ModelError;

/// 物理・探索パラメータ
///
/// 弾道モデル（速度の減衰と重力）と角度探索の定数を一か所にまとめたもの。
/// 既定値はゲーム側の挙動（20tick/秒、毎tick 0.99倍の減衰、0.05の重力）に合わせてある。
/// シナリオファイルの `solver.physics` で個別に上書きできる。
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PhysicsParams {
    /// 毎tickの速度減衰率
    pub drag_factor: f64,
    /// 毎tickの鉛直速度の減少量 [m/tick]
    pub gravity: f64,
    /// 1秒あたりのtick数
    pub ticks_per_second: f64,
    /// 角度探索の刻み [deg]
    pub angle_step_deg: f64,
    /// 許容誤差の基本値 [m]
    pub tolerance_base: f64,
    /// 初速1 m/sあたりの許容誤差の増分 [m]
    pub tolerance_per_speed: f64,
    /// 許容誤差に対してこの割合を下回ったら探索を打ち切る（閉形式のみ）
    pub early_exit_ratio: f64,
    /// 1角度あたりの最大シミュレーションtick数（tickシミュレーションのみ）
    pub max_ticks_per_angle: u32,
    /// 目標距離をこれだけ超えたらシミュレーションを終了 [m]
    pub overshoot_distance: f64,
    /// 目標高度をこれだけ下回ったらシミュレーションを終了 [m]
    pub drop_margin: f64,
}

impl Default for PhysicsParams {
    fn default() -> Self {
        Self {
            drag_factor: 0.99,
            gravity: 0.05,
            ticks_per_second: 20.0,
            angle_step_deg: 0.01,
            tolerance_base: 2.0,
            tolerance_per_speed: 0.01,
            early_exit_ratio: 0.01,
            max_ticks_per_angle: 10_000,
            overshoot_distance: 10.0,
            drop_margin: 50.0,
        }
    }
}

impl PhysicsParams {
    /// 命中とみなす許容誤差（初速が大きいほど広い）
    pub fn tolerance(&self, v0: f64) -> f64 {
        self.tolerance_base + v0 * self.tolerance_per_speed
    }

    /// 初速 [m/s] を1tickあたりの移動量に変換
    pub fn per_tick_speed(&self, v0: f64) -> f64 {
        v0 / self.ticks_per_second
    }

    /// tick数を秒に換算
    pub fn ticks_to_seconds(&self, ticks: f64) -> f64 {
        ticks / self.ticks_per_second
    }

    /// 終端速度係数 g/(1-k)
    pub fn terminal_drop(&self) -> f64 {
        self.gravity / (1.0 - self.drag_factor)
    }

    /// 幾何級数の極限 1/(1-k)
    pub fn decay_sum(&self) -> f64 {
        1.0 / (1.0 - self.drag_factor)
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if !(self.drag_factor > 0.0 && self.drag_factor < 1.0) {
            return Err(ModelError::InvalidPhysics(format!(
                "drag_factor must be in (0, 1): {}",
                self.drag_factor
            )));
        }
        if !(self.gravity >= 0.0) {
            return Err(ModelError::InvalidPhysics(format!(
                "gravity must be non-negative: {}",
                self.gravity
            )));
        }
        if !(self.ticks_per_second > 0.0) {
            return Err(ModelError::InvalidPhysics(format!(
                "ticks_per_second must be positive: {}",
                self.ticks_per_second
            )));
        }
        if !(self.angle_step_deg > 0.0) {
            return Err(ModelError::InvalidPhysics(format!(
                "angle_step_deg must be positive: {}",
                self.angle_step_deg
            )));
        }
        if !(self.tolerance_base > 0.0) || !(self.tolerance_per_speed >= 0.0) {
            return Err(ModelError::InvalidPhysics(
                "tolerance must be positive".to_string(),
            ));
        }
        if self.max_ticks_per_angle == 0 {
            return Err(ModelError::InvalidPhysics(
                "max_ticks_per_angle must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
