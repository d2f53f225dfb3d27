use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// keyed-container - 检查容器清单
#[derive(Parser, Debug)]
#[command(name = "keyed-container")]
#[command(about = "加载 TOML 容器清单，查看别名解析结果并检索参数")]
pub struct Args {
    /// 子命令
    #[command(subcommand)]
    pub command: Command,

    /// 输出调试日志
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// 列出清单中的参数键与已解析的别名
    Inspect {
        /// 清单路径
        manifest: PathBuf,
        /// 以 JSON 输出
        #[arg(long)]
        json: bool,
    },
    /// 经别名解析后检索一个参数
    Get {
        /// 清单路径
        manifest: PathBuf,
        /// 要检索的键
        key: String,
    },
}
