//! Warehub 재고 관리 서버
//!
//! 상품 REST API를 실행하거나 JSON 파일에서 상품을 적재합니다.

use anyhow::{Context, Result};
use shared::logging::{init_logging, ServiceType};
use std::path::Path;
use tracing::{error, info};
use warehub::app::{AppConfig, WarehubApp};
use warehub::populate::populate_from_file;

async fn run_server() -> Result<()> {
    let app = WarehubApp::bootstrap(AppConfig::from_env()).await?;
    let result = app.run_http_server().await;
    app.shutdown().await;
    result
}

async fn run_populate(file: &str) -> Result<()> {
    let app = WarehubApp::bootstrap(AppConfig::from_env()).await?;
    let result = populate_from_file(app.product_service(), Path::new(file)).await;
    app.shutdown().await;

    let report = result.context("상품 적재 실패")?;
    println!(
        "Added {} products ({} skipped, {} failed)",
        report.added, report.skipped, report.failed
    );
    Ok(())
}

fn print_help() {
    println!("Warehub 재고 관리 서버");
    println!();
    println!("사용법: cargo run -p warehub [COMMAND]");
    println!();
    println!("COMMANDS:");
    println!("  start              REST API 서버 실행 (기본값)");
    println!("  populate <FILE>    JSON 파일의 상품 적재");
    println!("  help               도움말 출력");
    println!();
    println!("ENVIRONMENT:");
    println!("  http_host, http_port       바인드 주소 (기본값 127.0.0.1:8080)");
    println!("  WAREHUB_PROFILE            appsettings.{{profile}}.json (기본값 dev)");
    println!("  DB_TARGET                  ConnectionStrings 항목 (기본값 localhost)");
    println!("  DB_URL_<TARGET>            연결 문자열 직접 지정");
    println!("  DB_CONNECTION_POLICY       per_operation | shared");
    println!("  RUST_LOG, LOG_LEVEL        로그 레벨");
}

#[actix_web::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(|s| s.as_str()).unwrap_or("start");

    let result = match command {
        "start" => {
            init_logging(ServiceType::ApiServer);
            run_server().await
        }
        "populate" => {
            init_logging(ServiceType::Populator);
            match args.get(2) {
                Some(file) => run_populate(file).await,
                None => Err(anyhow::anyhow!("populate 명령에는 JSON 파일 경로가 필요합니다")),
            }
        }
        "--help" | "-h" | "help" => {
            print_help();
            Ok(())
        }
        other => Err(anyhow::anyhow!("알 수 없는 명령: {}", other)),
    };

    if let Err(e) = &result {
        error!("실행 실패: {:#}", e);
    } else {
        info!("종료");
    }
    result
}
