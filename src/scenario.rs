use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::ballistics::{BallisticEngine, FiringRequest};
use crate::models::{
    CannonConfig, ModelError, MuzzleVelocity, PhysicsParams, Position3D, TimeOfFlightStrategy,
};

/// シナリオメタデータ
#[derive(Debug, Deserialize, Serialize)]
pub struct ScenarioMeta {
    pub version: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct PositionConfig {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl From<PositionConfig> for Position3D {
    fn from(p: PositionConfig) -> Self {
        Position3D::new(p.x, p.y, p.z)
    }
}

/// 初速設定（値と単位）
#[derive(Debug, Deserialize, Serialize)]
pub struct MuzzleVelocityConfig {
    pub value: f64,
    #[serde(default = "default_velocity_unit")]
    pub unit: String,
}

fn default_velocity_unit() -> String {
    "m/s".to_string()
}

fn default_cannon_type() -> String {
    "normal".to_string()
}

/// 砲の設置設定
#[derive(Debug, Deserialize, Serialize)]
pub struct CannonSetupConfig {
    pub position: PositionConfig,
    /// north/south/east/west（n/s/e/w も可）
    pub direction: String,
    #[serde(default)]
    pub yaw_offset_deg: f64,
    #[serde(default = "default_cannon_type")]
    pub cannon_type: String,
    pub length: f64,
    #[serde(default)]
    pub axis_offset: f64,
    pub muzzle_velocity: MuzzleVelocityConfig,
}

/// 計算方式の設定
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct SolverConfig {
    #[serde(default)]
    pub strategy: TimeOfFlightStrategy,
    #[serde(default)]
    pub physics: PhysicsParams,
}

/// 目標設定
#[derive(Debug, Deserialize, Serialize)]
pub struct TargetConfig {
    pub id: String,
    pub position: PositionConfig,
}

/// 完全なシナリオ設定
#[derive(Debug, Deserialize, Serialize)]
pub struct ScenarioConfig {
    pub meta: ScenarioMeta,
    pub cannon: CannonSetupConfig,
    #[serde(default)]
    pub solver: SolverConfig,
    pub targets: Vec<TargetConfig>,
}

impl ScenarioConfig {
    /// YAMLファイルからシナリオ設定を読み込み
    ///
    /// 読み込みと解析のみ行う。内容の検証は [`ScenarioConfig::validate`] で行う。
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();

        // ファイル存在チェック
        if !path.exists() {
            return Err(ScenarioError::FileNotFound(path.to_path_buf()));
        }

        let contents = fs::read_to_string(path)
            .map_err(|e| ScenarioError::IoError(path.to_path_buf(), e))?;

        serde_yaml::from_str(&contents).map_err(|e| ScenarioError::ParseError(path.to_path_buf(), e))
    }

    /// 設定の検証
    ///
    /// 方向・種類・単位の表記、物理パラメータ、砲の数値、目標の一覧を確認し、
    /// 検証済みの砲の設置構成を返す。
    pub fn validate(&self) -> Result<CannonConfig, ScenarioError> {
        self.solver.physics.validate()?;

        let cannon = self.cannon_config()?;
        cannon
            .validate()
            .map_err(|e| ScenarioError::ValidationError(format!("cannon: {}", e)))?;

        if self.targets.is_empty() {
            return Err(ScenarioError::ValidationError("targets must not be empty".to_string()));
        }

        for (index, target) in self.targets.iter().enumerate() {
            if self.targets[..index].iter().any(|t| t.id == target.id) {
                return Err(ScenarioError::ValidationError(format!(
                    "duplicate target id: {}",
                    target.id
                )));
            }
            if !Position3D::from(target.position).is_finite() {
                return Err(ScenarioError::ValidationError(format!(
                    "{}: {}",
                    target.id,
                    ModelError::MissingValue
                )));
            }
        }

        Ok(cannon)
    }

    /// 砲の設置設定を型付きの構成に変換
    pub fn cannon_config(&self) -> Result<CannonConfig, ModelError> {
        let cannon = &self.cannon;
        Ok(CannonConfig {
            position: cannon.position.into(),
            direction: cannon.direction.parse()?,
            yaw_offset_deg: cannon.yaw_offset_deg,
            length: cannon.length,
            axis_offset: cannon.axis_offset,
            muzzle_velocity: MuzzleVelocity::new(
                cannon.muzzle_velocity.value,
                cannon.muzzle_velocity.unit.parse()?,
            ),
            cannon_type: cannon.cannon_type.parse()?,
        })
    }

    /// 検証済みの砲の設置構成から目標ごとの射撃計算入力を作る
    pub fn requests(&self, cannon: &CannonConfig) -> Vec<(String, FiringRequest)> {
        self.targets
            .iter()
            .map(|t| (t.id.clone(), FiringRequest::from_cannon(cannon, t.position.into())))
            .collect()
    }

    /// 設定に従った計算エンジン
    pub fn engine(&self) -> BallisticEngine {
        BallisticEngine::new(self.solver.physics, self.solver.strategy)
    }

    /// シナリオの概要を表示
    pub fn print_summary(&self) {
        println!("=== シナリオ情報 ===");
        println!("名前: {}", self.meta.name);
        println!("説明: {}", self.meta.description);
        println!("バージョン: {}", self.meta.version);
        println!();

        let cannon = &self.cannon;
        println!("=== 砲の設置 ===");
        println!(
            "位置: ({:.1}, {:.1}, {:.1})",
            cannon.position.x, cannon.position.y, cannon.position.z
        );
        println!("方向: {} (ずれ {:.1}°)", cannon.direction, cannon.yaw_offset_deg);
        println!("種類: {}", cannon.cannon_type);
        println!("砲身長: {:.1}m / 軸オフセット: {:.1}m", cannon.length, cannon.axis_offset);
        println!(
            "初速: {} {}",
            cannon.muzzle_velocity.value, cannon.muzzle_velocity.unit
        );
        println!();

        println!("=== 計算設定 ===");
        println!("方式: {}", self.solver.strategy);
        println!(
            "減衰率: {} / 重力: {} / {}tick/秒",
            self.solver.physics.drag_factor,
            self.solver.physics.gravity,
            self.solver.physics.ticks_per_second
        );
        println!();

        println!("=== 目標 ===");
        println!("目標数: {}", self.targets.len());
        for target in &self.targets {
            println!(
                "  {}: ({:.1}, {:.1}, {:.1})",
                target.id, target.position.x, target.position.y, target.position.z
            );
        }
    }
}

/// シナリオ読み込みエラー
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("シナリオファイルが見つかりません: {}", .0.display())]
    FileNotFound(PathBuf),
    #[error("ファイル読み込みエラー {}: {}", .0.display(), .1)]
    IoError(PathBuf, std::io::Error),
    #[error("YAML解析エラー {}: {}", .0.display(), .1)]
    ParseError(PathBuf, serde_yaml::Error),
    #[error("設定検証エラー: {0}")]
    ValidationError(String),
    #[error("設定検証エラー: {0}")]
    Model(#[from] ModelError),
}
