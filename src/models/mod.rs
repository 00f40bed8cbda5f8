// 基本的なデータ型と数学ユーティリティ
pub mod common;
pub mod error;

// 物理定数と砲の構成
pub mod physics;
pub mod cannon;

// 飛翔モデルのインターフェース（trait）定義
pub mod traits;

// 弾道・探索・照準の実装
pub mod trajectory;
pub mod flight;
pub mod angle_search;
pub mod yaw;
pub mod report;

// 便利な re-export
pub use common::*;
pub use error::ModelError;
pub use physics::PhysicsParams;
pub use cannon::{CannonConfig, CannonType, MuzzleVelocity, PitchRange, VelocityUnit};
pub use traits::*;
pub use flight::{AimPoint, ClosedFormModel, TickSimulationModel, TimeOfFlightStrategy};
pub use angle_search::find_angles;
pub use yaw::resolve_yaw_code;
pub use report::Report;
