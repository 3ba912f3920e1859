use clap::Parser;

use lsb_hide::{
    cli::{Cli, Commands},
    handler::{handle_capacity, handle_convert, handle_hide, handle_recover},
};

/// 程序的主入口点
///
/// 初始化日志 (默认级别 `warn`，可通过 `RUST_LOG` 覆盖)，解析命令行参数，
/// 并根据指定的子命令将执行分派到相应的处理函数
fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    // 解析命令行参数
    let cli = Cli::parse();

    // 根据子命令调用相应的处理函数
    match cli.command {
        Commands::Hide(args) => handle_hide(args),
        Commands::Recover(args) => handle_recover(args),
        Commands::Capacity(args) => handle_capacity(args),
        Commands::Convert(args) => handle_convert(args),
    }
}
