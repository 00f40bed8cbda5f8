mod ballistics;
mod logging;
mod models;
mod scenario;

use clap::{Arg, ArgMatches, Command};
use tracing::{error, info};

use ballistics::{BallisticEngine, FiringRequest};
use logging::{LogConfig, LogOutput};
use models::*;
use scenario::ScenarioConfig;

fn main() {
    let matches = build_cli().get_matches();

    let verbose_level = matches.get_count("verbose");
    let log_config = LogConfig {
        level: matches
            .get_one::<String>("log-level")
            .map(|s| logging::parse_log_level(s))
            .unwrap_or_else(|| logging::level_for_verbosity(verbose_level)),
        output: *matches
            .get_one::<LogOutput>("log-output")
            .unwrap_or(&LogOutput::Console),
        ..LogConfig::default()
    };
    let _log_guard = match logging::init_logging(log_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("ログ初期化に失敗しました: {}", e);
            None
        }
    };

    let result = if let Some(scenario_path) = matches.get_one::<String>("scenario") {
        run_scenario(scenario_path, matches.get_flag("info"))
    } else if matches.contains_id("from") && matches.contains_id("to") {
        run_single(&matches)
    } else {
        show_default_help();
        Ok(())
    };

    if let Err(e) = result {
        error!("{}", e);
        eprintln!("エラー: {}", e);
        std::process::exit(1);
    }
}

fn build_cli() -> Command {
    Command::new("cannon-calc")
        .version(env!("CARGO_PKG_VERSION"))
        .about("砲撃計算機 (Cannon Ballistic Calculator)")
        .long_about(
            "砲の位置・設置方向と目標位置から、ヨー（水平旋回）と仰角を計算します。\n\
             弾道は毎tick速度が減衰し重力で鉛直速度が減る簡易モデルで計算します。",
        )
        .arg(
            Arg::new("scenario")
                .short('s')
                .long("scenario")
                .value_name("FILE")
                .help("シナリオファイル(.yaml)のパスを指定")
                .conflicts_with_all(["from", "to"]),
        )
        .arg(
            Arg::new("info")
                .short('i')
                .long("info")
                .action(clap::ArgAction::SetTrue)
                .requires("scenario")
                .help("シナリオの情報のみ表示して終了"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(clap::ArgAction::Count)
                .help("詳細出力レベル (-v: 基本, -vv: 詳細, -vvv: デバッグ)"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_name("LEVEL")
                .help("ログレベル (trace, debug, info, warn, error)"),
        )
        .arg(
            Arg::new("log-output")
                .long("log-output")
                .value_name("TARGET")
                .value_parser(|s: &str| s.parse::<LogOutput>())
                .help("ログ出力先 (console, file, both)"),
        )
        .arg(
            Arg::new("from")
                .long("from")
                .value_name("X,Y,Z")
                .value_parser(parse_position)
                .allow_hyphen_values(true)
                .requires("to")
                .help("砲の回転軸の座標"),
        )
        .arg(
            Arg::new("to")
                .long("to")
                .value_name("X,Y,Z")
                .value_parser(parse_position)
                .allow_hyphen_values(true)
                .requires("from")
                .help("目標の座標"),
        )
        .arg(
            Arg::new("direction")
                .long("direction")
                .value_name("DIR")
                .default_value("east")
                .help("砲の設置方向 (north/south/east/west, n/s/e/w)"),
        )
        .arg(
            Arg::new("yaw-offset")
                .long("yaw-offset")
                .value_name("DEG")
                .value_parser(clap::value_parser!(f64))
                .allow_hyphen_values(true)
                .default_value("0")
                .help("設置時のヨーのずれ [deg]"),
        )
        .arg(
            Arg::new("length")
                .long("length")
                .value_name("M")
                .value_parser(clap::value_parser!(f64))
                .help("砲身長 [m]"),
        )
        .arg(
            Arg::new("axis-offset")
                .long("axis-offset")
                .value_name("M")
                .value_parser(clap::value_parser!(f64))
                .allow_hyphen_values(true)
                .default_value("0")
                .help("回転軸から砲口までの水平オフセット [m]"),
        )
        .arg(
            Arg::new("velocity")
                .long("velocity")
                .value_name("VALUE")
                .value_parser(clap::value_parser!(f64))
                .help("初速（--unit の単位）"),
        )
        .arg(
            Arg::new("unit")
                .long("unit")
                .value_name("UNIT")
                .value_parser(|s: &str| s.parse::<VelocityUnit>())
                .default_value("m/s")
                .help("初速の単位 (powderCharge, m/s)"),
        )
        .arg(
            Arg::new("cannon-type")
                .long("cannon-type")
                .value_name("TYPE")
                .value_parser(|s: &str| s.parse::<CannonType>())
                .default_value("normal")
                .help("砲の種類 (normal, upsideDown, noLimit)"),
        )
        .arg(
            Arg::new("strategy")
                .long("strategy")
                .value_name("STRATEGY")
                .value_parser(|s: &str| s.parse::<TimeOfFlightStrategy>())
                .default_value("closed_form")
                .help("飛翔時間の計算方式 (closed_form, tick_simulation)"),
        )
}

/// "x,y,z" 形式の座標を解析
fn parse_position(s: &str) -> Result<Position3D, String> {
    let values: Vec<f64> = s
        .split(',')
        .map(|v| v.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .map_err(|e| format!("座標の解析に失敗しました '{}': {}", s, e))?;
    match values.as_slice() {
        [x, y, z] => Ok(Position3D::new(*x, *y, *z)),
        _ => Err(format!("座標は X,Y,Z の3値で指定してください: '{}'", s)),
    }
}

/// コマンドライン引数から1目標だけ計算する
fn run_single(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    // 未入力の数値はNaNとして検証に回す
    let number = |id: &str| matches.get_one::<f64>(id).copied().unwrap_or(f64::NAN);

    let muzzle_velocity = MuzzleVelocity::new(
        number("velocity"),
        *matches
            .get_one::<VelocityUnit>("unit")
            .unwrap_or(&VelocityUnit::MetersPerSecond),
    );
    let cannon_type = *matches
        .get_one::<CannonType>("cannon-type")
        .unwrap_or(&CannonType::Normal);
    let strategy = *matches
        .get_one::<TimeOfFlightStrategy>("strategy")
        .unwrap_or(&TimeOfFlightStrategy::ClosedForm);

    let request = FiringRequest {
        origin: *matches.get_one::<Position3D>("from").ok_or(ModelError::MissingValue)?,
        target: *matches.get_one::<Position3D>("to").ok_or(ModelError::MissingValue)?,
        direction_code: matches
            .get_one::<String>("direction")
            .cloned()
            .unwrap_or_default(),
        yaw_offset_deg: number("yaw-offset"),
        cannon_length: number("length"),
        axis_offset: number("axis-offset"),
        launch_speed: muzzle_velocity.speed(),
        pitch_ranges: cannon_type.pitch_ranges().to_vec(),
    };
    request.validate()?;

    let engine = BallisticEngine::new(PhysicsParams::default(), strategy);
    info!("計算方式: {}, 砲の種類: {}", strategy, cannon_type);
    println!("{}", engine.ballistic_calc(&request));

    Ok(())
}

/// シナリオファイルを読み込んで実行
fn run_scenario(scenario_path: &str, info_only: bool) -> Result<(), Box<dyn std::error::Error>> {
    let scenario = ScenarioConfig::from_file(scenario_path)?;
    let cannon = scenario.validate()?;
    info!("シナリオファイル読み込み完了: {}", scenario_path);

    if info_only {
        scenario.print_summary();
        return Ok(());
    }

    let engine = scenario.engine();
    let results = engine.solve_batch(scenario.requests(&cannon))?;

    for (index, (id, report)) in results.iter().enumerate() {
        if index > 0 {
            println!();
        }
        println!("[{}]", id);
        println!("{}", report);
    }

    Ok(())
}

/// デフォルトヘルプを表示
fn show_default_help() {
    println!("使用方法:");
    println!("  cannon-calc [オプション]");
    println!();
    println!("オプション:");
    println!("  -s, --scenario <FILE>   シナリオファイルの全目標を計算");
    println!("  -i, --info              シナリオ情報のみ表示");
    println!("      --from X,Y,Z --to X,Y,Z --length M --velocity V");
    println!("                          1目標だけ計算");
    println!("  -v, --verbose           詳細出力 (複数指定で詳細レベル上昇)");
    println!("  -h, --help              全オプションを表示");
    println!();
    println!("利用可能なシナリオファイル:");
    println!("  scenarios/basic.yaml        - 1門・複数目標の基本例");
    println!("  scenarios/tick_sim.yaml     - tickシミュレーション方式の例");
    println!();
    println!("例:");
    println!("  cannon-calc -s scenarios/basic.yaml");
    println!("  cannon-calc -s scenarios/basic.yaml -i");
    println!("  cannon-calc --from 0,64,0 --to 400,64,0 --length 3 --velocity 4 --unit powderCharge");
}
