use clap::Parser;
use env_logger::Builder;
use log::LevelFilter;
use std::io::Write;

use lsb_carrier::{
    cli::{Cli, Commands},
    handler::{handle_hide, handle_inspect, handle_recover},
};

/// 初始化日志：`--log-level` 作为默认级别，`RUST_LOG` 可以覆盖。
fn init_logger(level: LevelFilter) {
    Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] [{}] {}",
                buf.timestamp_seconds(),
                record.level(),
                record.args()
            )
        })
        .filter_level(level)
        .parse_default_env()
        .init();
}

/// 程序的主入口点
///
/// 负责解析命令行参数，并根据指定的子命令（`hide`、`recover` 或 `inspect`）
/// 将执行分派到相应的处理函数
fn main() -> anyhow::Result<()> {
    // 解析命令行参数
    let cli = Cli::parse();
    init_logger(cli.log_level);

    // 根据子命令调用相应的处理函数
    match cli.command {
        Commands::Hide(args) => handle_hide(args),
        Commands::Recover(args) => handle_recover(args),
        Commands::Inspect(args) => handle_inspect(args),
    }
}
