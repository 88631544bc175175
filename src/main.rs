use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

use math_guru::models::load_image;
use math_guru::views::{render_state, terminal::render_solution};
use math_guru::{App, AppError, Config, RequestState, Submission};

/// 命令行参数
#[derive(Debug, Parser)]
#[command(name = "math_guru", version, about = "MathGuru: giải toán THPT theo 4 bước")]
struct Args {
    /// 题目图片
    #[arg(long, value_name = "PATH")]
    image: Option<PathBuf>,

    /// 把详细解答导出为 PNG
    #[arg(long)]
    export: bool,

    /// 保存 API key
    #[arg(long, value_name = "KEY")]
    set_key: Option<String>,

    /// 清除已保存的 API key
    #[arg(long)]
    clear_key: bool,

    /// 题目文字
    note: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // 加载配置
    let config = Config::from_env();

    // 初始化日志
    math_guru::utils::logging::init(config.verbose_logging);

    // 初始化应用
    let app = App::initialize(config).await?;

    if args.clear_key {
        app.clear_credential()?;
        println!("Đã xóa API key.");
    }
    if let Some(key) = &args.set_key {
        if let Err(e) = app.save_credential(key) {
            error!("保存 API key 失败: {}", e);
            println!("{}", e.user_message());
            return Ok(());
        }
        println!("Đã lưu API key.");
    }

    let image = match &args.image {
        Some(path) => Some(load_image(path).await?),
        None => None,
    };
    let note = args.note.join(" ");

    if image.is_none() && note.trim().is_empty() {
        if args.set_key.is_none() && !args.clear_key {
            print!("{}", render_state(&RequestState::Idle));
        }
        return Ok(());
    }

    print!("{}", render_state(&RequestState::Resolving));

    let state = match app.submit(Submission::new(note, image)).await {
        Ok(state) => state,
        Err(e) => {
            error!("{}", e);
            println!("{}", e.user_message());
            return Ok(());
        }
    };

    match &state {
        RequestState::Resolved { solution, origin } => print!("{}", render_solution(solution, *origin)),
        other => print!("{}", render_state(other)),
    }

    if args.export {
        match app.export_current().await {
            Ok(path) => println!("Đã lưu ảnh: {}", path.display()),
            Err(AppError::Export(e)) => println!("{}", e.user_message()),
            Err(e) => return Err(e.into()),
        }
    }

    info!("完成: {}", state.label());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_note_and_flags() {
        let args = Args::try_parse_from([
            "math_guru", "--export", "--image", "bai.png", "tính", "đạo", "hàm",
        ])
        .unwrap();
        assert!(args.export);
        assert!(!args.clear_key);
        assert_eq!(args.note.join(" "), "tính đạo hàm");
        assert_eq!(args.image, Some(PathBuf::from("bai.png")));
    }

    #[test]
    fn test_parse_missing_value() {
        assert!(Args::try_parse_from(["math_guru", "--set-key"]).is_err());
        assert!(Args::try_parse_from(["math_guru", "--unknown"]).is_err());
    }
}
