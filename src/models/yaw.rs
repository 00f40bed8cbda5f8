//! # Yaw モジュール
//!
//! 砲から目標への水平方向の差を、設置方向を正面とした旋回量と旋回方向に変換します。
//! 方向コードが未知の場合は計算せずに失敗理由を返します。

use crate::models::cannon::CannonDirection;
use crate::models::common::math_utils;
use crate::models::report::{FailureReason, RotationDirection, YawSolution};

/// 目標方向 (dx, dz) を砲の設置方向基準のヨーに変換する
///
/// 北は -Z、東は +X。設置方向の正面が 0 度で、`yaw_offset_deg` は設置時のずれとして差し引く。
/// 目標が真上・真下（dx = dz = 0）のときは旋回不要として 0 度を返す。
pub fn resolve_yaw(dx: f64, dz: f64, direction: CannonDirection, yaw_offset_deg: f64) -> YawSolution {
    if dx == 0.0 && dz == 0.0 {
        return YawSolution {
            yaw_deg: 0.0,
            rotation: RotationDirection::NotApplicable,
        };
    }

    let raw = match direction {
        CannonDirection::North => (-dx).atan2(-dz),
        CannonDirection::South => dx.atan2(dz),
        CannonDirection::East => (-dz).atan2(dx),
        CannonDirection::West => dz.atan2(-dx),
    };
    let yaw = math_utils::normalize_angle(math_utils::rad_to_deg(raw) - yaw_offset_deg);

    YawSolution {
        yaw_deg: yaw.abs(),
        rotation: RotationDirection::from_signed_yaw(yaw),
    }
}

/// 方向コード（文字列）からヨーを求める
///
/// 未知のコードは計算せずに `FailureReason::InvalidDirection` を返す。
pub fn resolve_yaw_code(
    dx: f64,
    dz: f64,
    direction_code: &str,
    yaw_offset_deg: f64,
) -> Result<YawSolution, FailureReason> {
    let direction: CannonDirection = direction_code
        .parse()
        .map_err(|_| FailureReason::InvalidDirection(direction_code.to_string()))?;
    Ok(resolve_yaw(dx, dz, direction, yaw_offset_deg))
}
