use crate::models::flight::{AimPoint, AngleEvaluation};

/// 飛翔時間の求め方（閉形式／tickシミュレーション）を抽象化するインターフェース
///
/// 角度探索はこのトレイトだけに依存し、どちらの方式でも同じ探索手順を使う。
pub trait IFlightModel {
    /// 仰角 `angle_deg` で発射した弾が目標に届くかを評価
    fn evaluate(&self, v0: f64, angle_deg: f64, aim: &AimPoint) -> AngleEvaluation;

    /// 十分に小さい誤差が見つかった時点で区間の探索を打ち切ってよいか
    fn allows_early_exit(&self) -> bool;

    /// 方式名（ログ出力用）
    fn name(&self) -> &'static str;
}
