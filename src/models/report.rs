//! # Report モジュール
//!
//! 射撃計算の結果を表す型と、その文字列表現を定義します。

use std::fmt;

use crate::models::physics::PhysicsParams;

/// 1つの仰角区間で見つかった解
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngleSolution {
    /// 仰角 [deg]
    pub angle_deg: f64,
    /// 飛翔時間 [tick]
    pub time_in_air_ticks: f64,
}

/// 旋回方向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationDirection {
    Left,
    Right,
    /// 旋回不要、または左右どちらでも同じ（±180度）
    NotApplicable,
}

impl RotationDirection {
    /// 正規化済みのヨー（符号付き）から旋回方向を決める
    pub fn from_signed_yaw(yaw_deg: f64) -> Self {
        if yaw_deg > -180.0 && yaw_deg < 0.0 {
            RotationDirection::Left
        } else if yaw_deg > 0.0 && yaw_deg < 180.0 {
            RotationDirection::Right
        } else {
            RotationDirection::NotApplicable
        }
    }
}

impl fmt::Display for RotationDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RotationDirection::Left => write!(f, "Left"),
            RotationDirection::Right => write!(f, "Right"),
            RotationDirection::NotApplicable => write!(f, "N/A"),
        }
    }
}

/// 水平照準の解
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YawSolution {
    /// 旋回量 [deg]（0〜180）
    pub yaw_deg: f64,
    pub rotation: RotationDirection,
}

/// 解が得られなかった理由
#[derive(Debug, Clone, PartialEq)]
pub enum FailureReason {
    OutOfRange,
    TooManyCalculations,
    InvalidDirection(String),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::OutOfRange => write!(f, "Out of fire range"),
            FailureReason::TooManyCalculations => write!(f, "Too many calculations"),
            FailureReason::InvalidDirection(code) => write!(f, "Invalid direction: {}", code),
        }
    }
}

/// 射撃計算の結果
///
/// 解の一覧とヨーの組か、失敗理由のどちらか一方だけを持つ。
#[derive(Debug, Clone, PartialEq)]
pub enum Report {
    Solved {
        angles: Vec<AngleSolution>,
        yaw: YawSolution,
        /// 飛翔時間の秒換算に使う物理パラメータ
        physics: PhysicsParams,
    },
    Failed(FailureReason),
}

impl Report {
    pub fn solved(angles: Vec<AngleSolution>, yaw: YawSolution, physics: &PhysicsParams) -> Self {
        Report::Solved {
            angles,
            yaw,
            physics: *physics,
        }
    }

    pub fn is_solved(&self) -> bool {
        matches!(self, Report::Solved { .. })
    }
}

impl fmt::Display for Report {
    /// 1行1解、続いてヨーと旋回方向。失敗時はその理由のみ。
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Report::Solved {
                angles,
                yaw,
                physics,
            } => {
                for (index, solution) in angles.iter().enumerate() {
                    writeln!(
                        f,
                        "Angle{}: {:>5.2}°  Time in air: {:>5.2}s",
                        index + 1,
                        solution.angle_deg,
                        physics.ticks_to_seconds(solution.time_in_air_ticks)
                    )?;
                }
                writeln!(f, "Yaw: {:.2}°", yaw.yaw_deg)?;
                write!(f, "Rotation Direction: {}", yaw.rotation)
            }
            Report::Failed(reason) => write!(f, "{}", reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_direction_boundaries() {
        assert_eq!(RotationDirection::from_signed_yaw(-90.0), RotationDirection::Left);
        assert_eq!(RotationDirection::from_signed_yaw(45.0), RotationDirection::Right);
        assert_eq!(RotationDirection::from_signed_yaw(0.0), RotationDirection::NotApplicable);
        assert_eq!(RotationDirection::from_signed_yaw(180.0), RotationDirection::NotApplicable);
        assert_eq!(RotationDirection::from_signed_yaw(-180.0), RotationDirection::NotApplicable);
    }

    #[test]
    fn test_solved_report_text() {
        let report = Report::solved(
            vec![
                AngleSolution {
                    angle_deg: 5.0,
                    time_in_air_ticks: 30.0,
                },
                AngleSolution {
                    angle_deg: 54.96,
                    time_in_air_ticks: 200.8,
                },
            ],
            YawSolution {
                yaw_deg: 12.346,
                rotation: RotationDirection::Left,
            },
            &PhysicsParams::default(),
        );
        assert_eq!(
            report.to_string(),
            "Angle1:  5.00°  Time in air:  1.50s\n\
             Angle2: 54.96°  Time in air: 10.04s\n\
             Yaw: 12.35°\n\
             Rotation Direction: Left"
        );
    }

    #[test]
    fn test_time_in_air_follows_tick_rate() {
        let physics = PhysicsParams {
            ticks_per_second: 10.0,
            ..PhysicsParams::default()
        };
        let report = Report::solved(
            vec![AngleSolution {
                angle_deg: 45.0,
                time_in_air_ticks: 30.0,
            }],
            YawSolution {
                yaw_deg: 0.0,
                rotation: RotationDirection::NotApplicable,
            },
            &physics,
        );
        assert!(report.to_string().starts_with("Angle1: 45.00°  Time in air:  3.00s\n"));
    }

    #[test]
    fn test_failed_report_is_reason_only() {
        assert_eq!(Report::Failed(FailureReason::OutOfRange).to_string(), "Out of fire range");
        assert_eq!(
            Report::Failed(FailureReason::TooManyCalculations).to_string(),
            "Too many calculations"
        );
        assert!(!Report::Failed(FailureReason::OutOfRange).is_solved());
    }
}
