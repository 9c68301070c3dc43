use anyhow::{Context, Result};
use course_select::{logging, App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    logging::init();

    // 加载配置
    let config = Config::from_env().context("加载配置文件失败")?;

    // 初始化并运行应用
    let _report = App::initialize(config)?.run().await;

    Ok(())
}
