//! # Cannon モジュール
//!
//! 砲の設置方向・種類・初速単位と、それらをまとめた砲の設置構成を定義します。
//! 数値の検証は入力フォームと同じ順序・文言で行います。

use std::fmt;
use std::str::FromStr;

use crate::models::common::Position3D;
use crate::models::error::ModelError;

/// 砲の設置方向（東西南北）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CannonDirection {
    North,
    South,
    East,
    West,
}

impl FromStr for CannonDirection {
    type Err = ModelError;

    /// `north` / `n` のどちらの表記も受け付ける
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "north" | "n" => Ok(CannonDirection::North),
            "south" | "s" => Ok(CannonDirection::South),
            "east" | "e" => Ok(CannonDirection::East),
            "west" | "w" => Ok(CannonDirection::West),
            _ => Err(ModelError::InvalidDirection(s.to_string())),
        }
    }
}

impl fmt::Display for CannonDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CannonDirection::North => "north",
            CannonDirection::South => "south",
            CannonDirection::East => "east",
            CannonDirection::West => "west",
        };
        write!(f, "{}", name)
    }
}

/// 仰角の可動範囲 `[min, max)` [deg]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitchRange {
    pub min_deg: f64,
    pub max_deg: f64,
}

impl PitchRange {
    pub const fn new(min_deg: f64, max_deg: f64) -> Self {
        Self { min_deg, max_deg }
    }

    /// 範囲内の角度かどうか（上端は含まない）
    pub fn contains(&self, angle_deg: f64) -> bool {
        angle_deg >= self.min_deg && angle_deg < self.max_deg
    }

    /// `step` 刻みで候補角度を列挙する
    ///
    /// 加算を繰り返さず `min + i * step` で計算するため、誤差が蓄積しない。
    pub fn sweep(&self, step_deg: f64) -> impl Iterator<Item = f64> {
        let range = *self;
        let count = if range.max_deg > range.min_deg {
            ((range.max_deg - range.min_deg) / step_deg).round() as usize
        } else {
            0
        };
        (0..count)
            .map(move |i| range.min_deg + i as f64 * step_deg)
            .filter(move |angle| range.contains(*angle))
    }
}

/// 砲の種類（仰角の可動範囲を決める）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CannonType {
    Normal,
    UpsideDown,
    NoLimit,
}

impl CannonType {
    /// 仰角範囲テーブル（常に2区間、順に評価される）
    pub fn pitch_ranges(&self) -> [PitchRange; 2] {
        match self {
            CannonType::Normal => [PitchRange::new(-30.0, 30.0), PitchRange::new(30.0, 60.0)],
            CannonType::UpsideDown => [PitchRange::new(-90.0, 0.0), PitchRange::new(0.0, 15.0)],
            CannonType::NoLimit => [PitchRange::new(-90.0, 30.0), PitchRange::new(30.0, 90.0)],
        }
    }
}

impl FromStr for CannonType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "normal" => Ok(CannonType::Normal),
            "upsidedown" | "upside_down" | "upside-down" => Ok(CannonType::UpsideDown),
            "nolimit" | "no_limit" | "no-limit" => Ok(CannonType::NoLimit),
            _ => Err(ModelError::InvalidCannonType(s.to_string())),
        }
    }
}

impl fmt::Display for CannonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CannonType::Normal => "normal",
            CannonType::UpsideDown => "upsideDown",
            CannonType::NoLimit => "noLimit",
        };
        write!(f, "{}", name)
    }
}

/// 初速の入力単位
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VelocityUnit {
    /// 装薬数（1装薬 = 40 m/s）
    PowderCharge,
    MetersPerSecond,
}

impl FromStr for VelocityUnit {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "powdercharge" | "powder_charge" | "charge" => Ok(VelocityUnit::PowderCharge),
            "m/s" | "mps" | "meters_per_second" => Ok(VelocityUnit::MetersPerSecond),
            _ => Err(ModelError::InvalidVelocityUnit(s.to_string())),
        }
    }
}

/// 装薬1つあたりの初速 [m/s]
pub const SPEED_PER_POWDER_CHARGE: f64 = 40.0;

/// 入力された初速（単位付き）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MuzzleVelocity {
    pub value: f64,
    pub unit: VelocityUnit,
}

impl MuzzleVelocity {
    pub fn new(value: f64, unit: VelocityUnit) -> Self {
        Self { value, unit }
    }

    /// m/s に換算した初速 V0
    pub fn speed(&self) -> f64 {
        match self.unit {
            VelocityUnit::PowderCharge => self.value * SPEED_PER_POWDER_CHARGE,
            VelocityUnit::MetersPerSecond => self.value,
        }
    }
}

/// 砲の設置構成
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CannonConfig {
    /// 砲の回転軸の位置
    pub position: Position3D,
    pub direction: CannonDirection,
    /// 設置時のヨーのずれ [deg]
    pub yaw_offset_deg: f64,
    /// 砲身長 [m]
    pub length: f64,
    /// 回転軸から砲口までの水平オフセット [m]
    pub axis_offset: f64,
    pub muzzle_velocity: MuzzleVelocity,
    pub cannon_type: CannonType,
}

impl CannonConfig {
    pub fn pitch_ranges(&self) -> [PitchRange; 2] {
        self.cannon_type.pitch_ranges()
    }

    /// 砲の設置構成の数値を検証
    pub fn validate(&self) -> Result<(), ModelError> {
        let p = self.position;
        validate_mount(
            &[p.x, p.y, p.z, self.muzzle_velocity.value],
            self.length,
            self.muzzle_velocity.speed(),
            self.yaw_offset_deg,
            self.axis_offset,
        )
    }
}

/// 入力フォームと同じ順序・文言での数値検証
///
/// `values` には座標など、有限であることだけを確認する値を渡す。
pub fn validate_mount(
    values: &[f64],
    length: f64,
    speed: f64,
    yaw_offset_deg: f64,
    axis_offset: f64,
) -> Result<(), ModelError> {
    let all_finite = values
        .iter()
        .chain([length, speed, yaw_offset_deg, axis_offset].iter())
        .all(|v| v.is_finite());
    if !all_finite {
        return Err(ModelError::MissingValue);
    }
    if length <= 1.0 {
        return Err(ModelError::InvalidCannonLength);
    }
    if speed <= 1.0 {
        return Err(ModelError::InvalidMuzzleVelocity);
    }
    if !(-180.0..=180.0).contains(&yaw_offset_deg) {
        return Err(ModelError::InvalidYawOffset);
    }
    Ok(())
}
