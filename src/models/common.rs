use std::ops::Sub;

/// 3次元位置を表す構造体（ワールド座標、yが鉛直上向き）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position3D {
    pub x: f64, // m
    pub y: f64, // m (高さ)
    pub z: f64, // m
}

impl Position3D {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// 水平面（XZ平面）での2次元距離を計算
    pub fn distance_xz(&self, other: &Position3D) -> f64 {
        ((self.x - other.x).powi(2) + (self.z - other.z).powi(2)).sqrt()
    }

    /// 全ての座標が有限値かどうか
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl Sub for Position3D {
    type Output = Self;

    fn sub(self, other: Self) -> Self::Output {
        Self::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

/// 数学ユーティリティ関数
pub mod math_utils {
    /// 度をラジアンに変換
    pub fn deg_to_rad(degrees: f64) -> f64 {
        degrees * std::f64::consts::PI / 180.0
    }

    /// ラジアンを度に変換
    pub fn rad_to_deg(radians: f64) -> f64 {
        radians * 180.0 / std::f64::consts::PI
    }

    /// 角度を-180度〜180度の範囲に正規化
    ///
    /// 入力は atan2 の結果（±180度）からオフセット（±180度）を引いた値を想定しているため、
    /// 360度の加減算は一度だけ行う。
    pub fn normalize_angle(angle_deg: f64) -> f64 {
        if angle_deg > 180.0 {
            angle_deg - 360.0
        } else if angle_deg < -180.0 {
            angle_deg + 360.0
        } else {
            angle_deg
        }
    }
}
