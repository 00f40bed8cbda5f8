use thiserror::Error;

/// 入力値・設定値の検証エラー
///
/// 計算そのものの失敗（射程外など）はエラーではなく `Report::Failed` として返す。
/// ここに現れるのは計算を始める前に弾くべき入力だけである。
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("Need value input")]
    MissingValue,
    #[error("Invalid cannon length")]
    InvalidCannonLength,
    #[error("Invalid muzzle velocity")]
    InvalidMuzzleVelocity,
    #[error("Invalid yaw offset")]
    InvalidYawOffset,
    #[error("Invalid direction: {0}")]
    InvalidDirection(String),
    #[error("Invalid cannon type: {0} (normal, upsideDown, noLimit)")]
    InvalidCannonType(String),
    #[error("Invalid muzzle velocity unit: {0} (powderCharge, m/s)")]
    InvalidVelocityUnit(String),
    #[error("Invalid solver strategy: {0} (closed_form, tick_simulation)")]
    InvalidStrategy(String),
    #[error("Invalid physics parameter: {0}")]
    InvalidPhysics(String),
}
