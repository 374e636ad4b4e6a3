//! JSON 파일에서 상품을 적재합니다.

use crate::api::product_api::ProductRequest;
use crate::service::product_service::ProductService;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::{error, info, warn};

/// 적재 결과
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PopulateReport {
    pub added: usize,
    /// 검증에 실패한 항목
    pub skipped: usize,
    /// 저장에 실패한 항목
    pub failed: usize,
}

/// `path`의 JSON 배열을 읽어 상품을 하나씩 추가합니다.
///
/// 파일을 읽을 수 없거나 JSON이 잘못되었으면 에러입니다. 개별 항목의 실패는 보고서에만 남습니다.
pub async fn populate_from_file(service: &ProductService, path: &Path) -> Result<PopulateReport> {
    info!("상품 적재 시작: {}", path.display());

    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("상품 파일 읽기 실패: {}", path.display()))?;

    let requests: Vec<ProductRequest> =
        serde_json::from_str(&content).context("상품 JSON 파싱 실패")?;

    if requests.is_empty() {
        warn!("상품 파일이 비어 있습니다: {}", path.display());
    }

    let mut report = PopulateReport::default();
    for request in requests {
        if let Err(e) = request.validate() {
            warn!("상품 '{}' 건너뜀: {}", request.name, e);
            report.skipped += 1;
            continue;
        }

        let product = request.into_product();
        let name = product.name.clone();
        if service.add_product(product).await {
            report.added += 1;
        } else {
            error!("상품 '{}' 추가 실패", name);
            report.failed += 1;
        }
    }

    info!(
        "상품 적재 완료: 추가 {}, 건너뜀 {}, 실패 {}",
        report.added, report.skipped, report.failed
    );
    Ok(report)
}
