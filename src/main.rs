use clap::Parser;
use clap::error::ErrorKind;
use env_logger::{Env, Target};

use bmp_lsb::{
    cli::{Cli, Commands, classify_parse_error},
    handler::{handle_capacity, handle_hide, handle_recover},
};

/// 程序的主入口点
///
/// 负责初始化日志、解析命令行参数，并根据指定的子命令
/// 将执行分派到相应的处理函数。
/// 进度信息写到标准输出，错误信息由 `anyhow` 写到标准错误并以非零状态退出。
fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Stdout)
        .init();

    // 解析命令行参数，帮助和版本信息照常输出并退出
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err)
            if matches!(
                err.kind(),
                ErrorKind::DisplayHelp
                    | ErrorKind::DisplayVersion
                    | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
            ) =>
        {
            err.exit()
        }
        Err(err) => {
            let _ = err.print();
            return Err(classify_parse_error(&err).into());
        }
    };

    // 根据子命令调用相应的处理函数
    match cli.command {
        Commands::Encode(args) => handle_hide(args),
        Commands::Decode(args) => handle_recover(args),
        Commands::Capacity(args) => handle_capacity(args),
    }
}
