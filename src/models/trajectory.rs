//! # Trajectory モジュール
//!
//! 減衰速度モデルによる弾道を計算します。
//!
//! 毎tick、位置に現在の速度を加えた後、速度を `drag_factor` 倍し、
//! 鉛直速度からさらに `gravity` を引きます。
//!
//! ```text
//! x(t+1)  = x(t) + Vx(t)
//! y(t+1)  = y(t) + Vy(t)
//! Vx(t+1) = Vx(t) * k
//! Vy(t+1) = Vy(t) * k - g
//! ```
//!
//! 逐次計算には [`Trajectory`] を、目標距離に到達する時刻を直接求めるには
//! 閉形式の [`time_to_distance`] / [`height_at`] / [`distance_at`] を使います。
//! 両者は整数tickで一致します。
//!
//! 鉛直方向の到達時刻は閉形式で解けないため、[`time_to_height`] は逐次計算で
//! 通過するtickを探して補間します。

use crate::models::common::math_utils;
use crate::models::physics::PhysicsParams;

/// 発射からの経過tickと砲口からの相対位置
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectorySample {
    pub tick: u32,
    /// 水平方向の移動距離 [m]
    pub x: f64,
    /// 鉛直方向の変位 [m]
    pub y: f64,
}

/// 弾道の逐次計算
///
/// tick 1 から順に [`TrajectorySample`] を返す無限イテレータ。
#[derive(Debug, Clone)]
pub struct Trajectory {
    x: f64,
    y: f64,
    vx: f64,
    vy: f64,
    tick: u32,
    drag_factor: f64,
    gravity: f64,
}

impl Trajectory {
    /// 初速 V0 [m/s] と仰角 [deg] から弾道を開始する
    pub fn new(v0: f64, angle_deg: f64, physics: &PhysicsParams) -> Self {
        let (vx, vy) = initial_velocity(v0, angle_deg, physics);
        Self {
            x: 0.0,
            y: 0.0,
            vx,
            vy,
            tick: 0,
            drag_factor: physics.drag_factor,
            gravity: physics.gravity,
        }
    }
}

impl Iterator for Trajectory {
    type Item = TrajectorySample;

    fn next(&mut self) -> Option<Self::Item> {
        self.x += self.vx;
        self.y += self.vy;
        self.vx *= self.drag_factor;
        self.vy = self.vy * self.drag_factor - self.gravity;
        self.tick = self.tick.saturating_add(1);

        Some(TrajectorySample {
            tick: self.tick,
            x: self.x,
            y: self.y,
        })
    }
}

/// 1tickあたりの初速成分 (Vx0, Vy0)
pub fn initial_velocity(v0: f64, angle_deg: f64, physics: &PhysicsParams) -> (f64, f64) {
    let angle_rad = math_utils::deg_to_rad(angle_deg);
    let speed = physics.per_tick_speed(v0);
    (speed * angle_rad.cos(), speed * angle_rad.sin())
}

/// 水平距離 `distance` に到達するまでの時間 [tick]
///
/// 水平速度が尽きて届かない場合、距離が負（砲口の後方）の場合、
/// 結果が有限でない場合は `None`。
pub fn time_to_distance(vx0: f64, distance: f64, physics: &PhysicsParams) -> Option<f64> {
    if vx0 <= 0.0 || distance < 0.0 {
        return None;
    }
    let remaining = 1.0 - distance / (physics.decay_sum() * vx0);
    if remaining <= 0.0 {
        return None;
    }
    let t = remaining.ln() / physics.drag_factor.ln();
    if t.is_finite() && t >= 0.0 { Some(t) } else { None }
}

/// 時刻 `t` [tick] での鉛直位置
pub fn height_at(vy0: f64, t: f64, physics: &PhysicsParams) -> f64 {
    let terminal = physics.terminal_drop();
    (vy0 + terminal) * physics.decay_sum() * (1.0 - physics.drag_factor.powf(t)) - terminal * t
}

/// 時刻 `t` [tick] での水平位置
pub fn distance_at(vx0: f64, t: f64, physics: &PhysicsParams) -> f64 {
    vx0 * physics.decay_sum() * (1.0 - physics.drag_factor.powf(t))
}

/// 高さ `height` を最初に通過する時刻 [tick]
///
/// 通過した前後のtickの間を線形補間する。tick 0 の発射点そのものは通過とみなさない。
/// 下降しながら `height - drop_margin` より下に落ちた場合、
/// または `max_ticks_per_angle` 以内に通過しない場合は `None`。
pub fn time_to_height(v0: f64, angle_deg: f64, height: f64, physics: &PhysicsParams) -> Option<f64> {
    let mut previous_offset = -height;
    let mut previous_y = 0.0;

    for sample in Trajectory::new(v0, angle_deg, physics).take(physics.max_ticks_per_angle as usize) {
        let offset = sample.y - height;
        if (previous_offset > 0.0) != (offset > 0.0) {
            let t = (sample.tick - 1) as f64 + previous_offset / (previous_offset - offset);
            if t > 0.0 {
                return Some(t);
            }
        }
        if sample.y < previous_y && sample.y < height - physics.drop_margin {
            return None;
        }
        previous_offset = offset;
        previous_y = sample.y;
    }
    None
}
